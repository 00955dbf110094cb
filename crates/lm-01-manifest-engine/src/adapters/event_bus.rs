//! Event Bus Notifier
//!
//! Implements the `EventNotifier` port by publishing `LogisticsEvent`s on
//! the shared bus. Billing, notification and tracking consumers subscribe
//! there instead of being called by the engine.

use crate::domain::{EngineEvent, TrackingEvent};
use crate::ports::EventNotifier;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_bus::{EventPublisher, InMemoryEventBus, LogisticsEvent, ShipmentTracked};
use std::sync::Arc;
use tracing::{debug, info};

/// Publishes engine events to the shared bus.
pub struct EventBusNotifier {
    event_bus: Arc<InMemoryEventBus>,
}

impl EventBusNotifier {
    pub fn new(event_bus: Arc<InMemoryEventBus>) -> Self {
        Self { event_bus }
    }
}

impl From<TrackingEvent> for ShipmentTracked {
    fn from(event: TrackingEvent) -> Self {
        ShipmentTracked {
            org_id: event.org_id,
            shipment_id: event.shipment_id,
            awb_number: event.awb_number,
            event_code: event.event_code,
            hub_id: event.hub_id,
            actor: event.actor,
            manifest_id: event.manifest_id,
            manifest_no: event.manifest_no,
            occurred_at: event.occurred_at,
        }
    }
}

impl From<EngineEvent> for LogisticsEvent {
    fn from(event: EngineEvent) -> Self {
        match event {
            EngineEvent::ManifestCreated {
                org_id,
                manifest_id,
                manifest_no,
            } => LogisticsEvent::ManifestCreated {
                org_id,
                manifest_id,
                manifest_no,
            },
            EngineEvent::StatusChanged {
                org_id,
                manifest_id,
                manifest_no,
                from,
                to,
                actor,
            } => LogisticsEvent::ManifestStatusChanged {
                org_id,
                manifest_id,
                manifest_no,
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
                actor,
            },
            EngineEvent::ManifestRetired {
                org_id,
                manifest_id,
            } => LogisticsEvent::ManifestRetired {
                org_id,
                manifest_id,
            },
            EngineEvent::ShipmentAttached {
                org_id,
                manifest_id,
                shipment_id,
                item_id,
            } => LogisticsEvent::ShipmentManifested {
                org_id,
                manifest_id,
                shipment_id,
                item_id,
            },
            EngineEvent::ShipmentDetached {
                org_id,
                manifest_id,
                shipment_id,
            } => LogisticsEvent::ShipmentUnmanifested {
                org_id,
                manifest_id,
                shipment_id,
            },
            EngineEvent::ShipmentTracked(tracked) => LogisticsEvent::ShipmentTracked(tracked.into()),
        }
    }
}

#[async_trait]
impl EventNotifier for EventBusNotifier {
    async fn notify(&self, event: EngineEvent) {
        let name = event.name();
        let org_id = event.org_id();
        let receivers = self.event_bus.publish(event.into()).await;

        if receivers == 0 {
            debug!(event = name, %org_id, "[lm-01] no subscribers for event");
        } else {
            info!(event = name, %org_id, receivers, "[lm-01] 📤 published event");
        }
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl EventNotifier for NoopNotifier {
    async fn notify(&self, _event: EngineEvent) {}
}

/// In-memory notifier for tests.
#[derive(Default)]
pub struct RecordingNotifier {
    events: RwLock<Vec<EngineEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.read().clone()
    }

    /// Count of events with the given name.
    pub fn count(&self, name: &str) -> usize {
        self.events.read().iter().filter(|e| e.name() == name).count()
    }
}

#[async_trait]
impl EventNotifier for RecordingNotifier {
    async fn notify(&self, event: EngineEvent) {
        self.events.write().push(event);
    }
}
