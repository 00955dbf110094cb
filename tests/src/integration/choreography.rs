//! # Event Choreography Tests
//!
//! Consumers learn about manifest activity only through the shared bus:
//!
//! ```text
//! [Manifest Engine] ──EngineEvent──→ EventBusNotifier ──→ [Event Bus]
//!                                                            │
//!                     ┌────────────────┬─────────────────────┤
//!                     ↓                ↓                     ↓
//!                 Lifecycle        Membership             Tracking
//!              (created, status)  (attached, detached)  (DEPARTED, ARRIVED)
//! ```
//!
//! ## Test Categories
//!
//! 1. **Topic routing**: each event lands on its topic only
//! 2. **Organization scoping**: subscribers for another org see nothing
//! 3. **Retry safety**: a cascade retried after a storage fault publishes
//!    each tracking event once

#[cfg(test)]
mod tests {
    use crate::support::World;
    use lm_01_manifest_engine::{ManifestApi, ManifestStatus};
    use shared_bus::{EventFilter, EventTopic, LogisticsEvent};
    use shared_types::{OrgId, TrackingEventCode};

    #[tokio::test]
    async fn test_events_routed_by_topic() -> anyhow::Result<()> {
        let world = World::new();
        let mut lifecycle = world
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Lifecycle]));
        let mut membership = world
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Membership]));

        let manifest = world.open_manifest().await?;
        let shipment = world.book("123-45678901", 1, 1.0);
        world.scan(manifest.id, "12345678901").await?;
        world
            .engine
            .remove_shipment(world.org, manifest.id, shipment.id, None)
            .await?;
        world.advance(manifest.id, &[ManifestStatus::Closed]).await?;

        let lifecycle_events = lifecycle.drain();
        assert_eq!(lifecycle_events.len(), 2);
        assert!(matches!(
            &lifecycle_events[0],
            LogisticsEvent::ManifestCreated { manifest_no, .. } if *manifest_no == manifest.manifest_no
        ));
        assert!(matches!(
            &lifecycle_events[1],
            LogisticsEvent::ManifestStatusChanged { from, to, .. } if from == "OPEN" && to == "CLOSED"
        ));

        assert_eq!(world.bus.listeners(EventTopic::Membership), 1);
        assert_eq!(world.bus.published_on(EventTopic::Tracking), 0);

        let membership_events = membership.drain();
        assert_eq!(membership_events.len(), 2);
        assert!(matches!(
            membership_events[0],
            LogisticsEvent::ShipmentManifested { .. }
        ));
        assert!(matches!(
            membership_events[1],
            LogisticsEvent::ShipmentUnmanifested { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_other_org_sees_nothing() -> anyhow::Result<()> {
        let world = World::new();
        let mut outsider = world.bus.subscribe(EventFilter::for_orgs(vec![OrgId::new()]));
        let mut insider = world.bus.subscribe(EventFilter::for_orgs(vec![world.org]));

        let manifest = world.open_manifest().await?;
        world.book("123-45678901", 1, 1.0);
        world.scan(manifest.id, "12345678901").await?;

        assert!(outsider.drain().is_empty());
        assert!(insider
            .drain()
            .iter()
            .all(|event| event.org_id() == world.org));
        Ok(())
    }

    #[tokio::test]
    async fn test_retried_departure_publishes_once() -> anyhow::Result<()> {
        let world = World::new();
        let manifest = world.open_manifest().await?;
        for awb in ["100-00000001", "100-00000002", "100-00000003"] {
            world.book(awb, 1, 1.0);
            world.scan(manifest.id, awb).await?;
        }
        world.advance(manifest.id, &[ManifestStatus::Closed]).await?;

        let mut tracking = world
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Tracking]));

        // Second tracking write fails mid-cascade
        world.tracking.faults().fail_writes_after(1);
        let failed = world
            .engine
            .transition_status(world.org, manifest.id, ManifestStatus::Departed, None)
            .await;
        assert!(failed.is_err());
        let still_closed = world.engine.get_manifest(world.org, manifest.id).await?;
        assert_eq!(still_closed.status, ManifestStatus::Closed);

        world.tracking.faults().clear();
        world.advance(manifest.id, &[ManifestStatus::Departed]).await?;

        assert_eq!(world.tracking.len(), 3);
        let published = tracking.drain();
        assert_eq!(published.len(), 3);
        assert_eq!(world.bus.published_on(EventTopic::Tracking), 3);
        assert!(published.iter().all(|event| matches!(
            event,
            LogisticsEvent::ShipmentTracked(tracked)
                if tracked.event_code == TrackingEventCode::Departed
        )));
        Ok(())
    }
}
