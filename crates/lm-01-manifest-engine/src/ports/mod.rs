//! Ports layer
//!
//! - `inbound`: what callers drive (`ManifestApi`)
//! - `outbound`: what the engine drives (stores, sinks, clock)

pub mod inbound;
pub mod outbound;

pub use inbound::{ManifestApi, ScanRequest};
pub use outbound::{
    AttachResult, DetachResult, EventNotifier, ManifestStore, RetireResult, ScanAuditSink,
    ShipmentStore, StatusCommit, StoreResult, SystemTimeSource, TimeSource, TrackingEventSink,
};
