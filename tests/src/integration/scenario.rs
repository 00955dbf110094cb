//! # Load-and-Depart Scenario
//!
//! A dock operator loads one manifest and sends it off:
//!
//! ```text
//! scan S1 ──→ SUCCESS            (totals 1 / P / W)
//! scan S1 ──→ SUCCESS_DUPLICATE  (totals unchanged)
//! scan S2 ──→ WRONG_DESTINATION  (S2 bound elsewhere)
//! CLOSED ──→ DEPARTED            (S1 in transit, one DEPARTED event)
//! DEPARTED again ──→ rejected    (still one event)
//! ```

#[cfg(test)]
mod tests {
    use crate::support::World;
    use lm_01_manifest_engine::{ManifestApi, ManifestError, ManifestStatus, ScanClassification};
    use shared_bus::{EventFilter, EventTopic, LogisticsEvent};
    use shared_types::{HubId, ShipmentStatus, TrackingEventCode};

    #[tokio::test]
    async fn test_load_and_depart() -> anyhow::Result<()> {
        let world = World::new();
        let m1 = world.open_manifest().await?;
        let s1 = world
            .book("123-45678901", 3, 12.5)
            .with_status(ShipmentStatus::ReceivedAtOriginHub);
        world.shipments.insert(s1.clone());
        let s2 = world.book_to("999-00000001", HubId::new(), 1, 2.0);

        // 1. First scan attaches
        let first = world.scan(m1.id, "12345678901").await?;
        assert_eq!(first.classification, ScanClassification::Success);
        let totals = first.totals.expect("totals on success");
        assert_eq!(totals.shipment_count, 1);
        assert_eq!(totals.package_count, 3);
        assert_eq!(totals.total_weight_kg, 12.5);

        // 2. Retried scan is a duplicate, totals unchanged
        let retry = world.scan(m1.id, "123-45678901").await?;
        assert_eq!(retry.classification, ScanClassification::SuccessDuplicate);
        assert_eq!(retry.totals, Some(totals));
        assert_eq!(world.manifests.items_in(m1.id), 1);

        // 3. Shipment bound for another hub
        let wrong = world.scan(m1.id, &s2.awb_number).await?;
        assert_eq!(wrong.classification, ScanClassification::WrongDestination);
        assert_eq!(world.manifests.items_in(m1.id), 1);

        // 4. Close then depart
        let mut tracking = world
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Tracking]));
        let departed = world
            .advance(m1.id, &[ManifestStatus::Closed, ManifestStatus::Departed])
            .await?;
        assert_eq!(departed.status, ManifestStatus::Departed);
        assert!(departed.departed_at.is_some());

        let loaded = world.shipments.snapshot(s1.id).expect("s1 stored");
        assert_eq!(loaded.status, ShipmentStatus::InTransitToDestination);
        assert_eq!(loaded.manifest_id, Some(m1.id));

        let events = world.tracking.for_shipment(s1.id);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_code, TrackingEventCode::Departed);
        assert_eq!(events[0].hub_id, world.origin);

        let published = tracking.drain();
        assert_eq!(published.len(), 1);
        assert!(matches!(
            &published[0],
            LogisticsEvent::ShipmentTracked(tracked) if tracked.shipment_id == s1.id
        ));

        // 5. Departing again is rejected and emits nothing
        let err = world
            .engine
            .transition_status(world.org, m1.id, ManifestStatus::Departed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidTransition { .. }));
        assert_eq!(world.tracking.for_shipment(s1.id).len(), 1);
        assert!(tracking.drain().is_empty());

        // One audit record per scan attempt
        assert_eq!(world.audit.count_for(m1.id), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_then_rescan() -> anyhow::Result<()> {
        let world = World::new();
        let manifest = world.open_manifest().await?;
        let shipment = world.book("123-45678901", 2, 4.0);

        world.scan(manifest.id, "12345678901").await?;
        let removal = world
            .engine
            .remove_shipment(world.org, manifest.id, shipment.id, None)
            .await?;
        assert!(removal.removed);
        let emptied = world.engine.get_manifest(world.org, manifest.id).await?;
        assert_eq!(emptied.totals.shipment_count, 0);

        let reverted = world.shipments.snapshot(shipment.id).expect("stored");
        assert_eq!(reverted.status, ShipmentStatus::Created);
        assert_eq!(reverted.manifest_id, None);

        // Removing again is a no-op
        let again = world
            .engine
            .remove_shipment(world.org, manifest.id, shipment.id, None)
            .await?;
        assert!(!again.removed);

        let rescan = world.scan(manifest.id, "12345678901").await?;
        assert_eq!(rescan.classification, ScanClassification::Success);
        Ok(())
    }
}
