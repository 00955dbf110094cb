//! # Lifecycle Integration Tests
//!
//! Status monotonicity across the whole graph and membership release once a
//! manifest has arrived.

#[cfg(test)]
mod tests {
    use crate::support::World;
    use lm_01_manifest_engine::{
        ManifestApi, ManifestError, ManifestStatus, ScanClassification, ScanRequest,
        ValidationFlags,
    };
    use shared_types::{ShipmentStatus, TrackingEventCode};

    const EDITABLE: [ManifestStatus; 3] = [
        ManifestStatus::Draft,
        ManifestStatus::Open,
        ManifestStatus::Building,
    ];

    #[tokio::test]
    async fn test_no_return_to_editable_after_close() -> anyhow::Result<()> {
        let world = World::new();
        let manifest = world.open_manifest().await?;

        let path = [
            ManifestStatus::Closed,
            ManifestStatus::Departed,
            ManifestStatus::Arrived,
            ManifestStatus::Reconciled,
        ];
        for step in path {
            world.advance(manifest.id, &[step]).await?;
            for target in EDITABLE {
                let err = world
                    .engine
                    .transition_status(world.org, manifest.id, target, None)
                    .await
                    .unwrap_err();
                assert!(
                    matches!(err, ManifestError::InvalidTransition { .. }),
                    "{step} -> {target} must be rejected"
                );
            }
            let stored = world.engine.get_manifest(world.org, manifest.id).await?;
            assert_eq!(stored.status, step);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_open_and_building_toggle() -> anyhow::Result<()> {
        let world = World::new();
        let manifest = world.open_manifest().await?;

        let building = world.advance(manifest.id, &[ManifestStatus::Building]).await?;
        assert_eq!(building.status, ManifestStatus::Building);
        let reopened = world.advance(manifest.id, &[ManifestStatus::Open]).await?;
        assert_eq!(reopened.status, ManifestStatus::Open);
        Ok(())
    }

    #[tokio::test]
    async fn test_arrival_releases_membership() -> anyhow::Result<()> {
        let world = World::new();
        let first = world.open_manifest().await?;
        let shipment = world.book("123-45678901", 1, 1.0);
        world.scan(first.id, "12345678901").await?;

        world
            .advance(
                first.id,
                &[
                    ManifestStatus::Closed,
                    ManifestStatus::Departed,
                    ManifestStatus::Arrived,
                ],
            )
            .await?;
        let arrived = world.shipments.snapshot(shipment.id).expect("stored");
        assert_eq!(arrived.status, ShipmentStatus::ReceivedAtDestHub);

        let codes: Vec<_> = world
            .tracking
            .for_shipment(shipment.id)
            .iter()
            .map(|event| event.event_code)
            .collect();
        assert_eq!(codes, vec![TrackingEventCode::Departed, TrackingEventCode::Arrived]);

        // A second leg may pick the shipment up once status checks are relaxed
        let second = world.open_manifest().await?;
        let outcome = world
            .engine
            .ingest_scan(
                ScanRequest::new(world.org, second.id, "12345678901")
                    .with_flags(ValidationFlags::none()),
            )
            .await?;
        assert_eq!(outcome.classification, ScanClassification::Success);
        Ok(())
    }

    #[tokio::test]
    async fn test_retired_manifest_disappears() -> anyhow::Result<()> {
        let world = World::new();
        let manifest = world.open_manifest().await?;

        world
            .engine
            .retire_manifest(world.org, manifest.id, None)
            .await?;

        let err = world
            .engine
            .get_manifest(world.org, manifest.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ManifestError::ManifestNotFound { .. }));

        let outcome = world.scan(manifest.id, "12345678901").await?;
        assert_eq!(outcome.classification, ScanClassification::ManifestNotFound);
        Ok(())
    }
}
