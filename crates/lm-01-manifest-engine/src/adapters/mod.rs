//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound ports in process memory, plus the event bus
//! notifier that hands engine events to other services.

mod clock;
mod event_bus;
mod faults;
mod journal;
mod manifest_store;
mod shipment_store;

pub use clock::ManualClock;
pub use event_bus::{EventBusNotifier, NoopNotifier, RecordingNotifier};
pub use faults::FaultSwitch;
pub use journal::{InMemoryScanAuditLog, InMemoryTrackingLog};
pub use manifest_store::InMemoryManifestStore;
pub use shipment_store::InMemoryShipmentStore;
