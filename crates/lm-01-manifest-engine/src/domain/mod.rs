//! Domain layer: pure rules with no I/O

pub mod eligibility;
pub mod entities;
pub mod events;
pub mod outcome;
pub mod status;
pub mod token;
pub mod totals;

pub use eligibility::{
    EligibilityValidator, MembershipView, Rejection, ValidationFlags, DEFAULT_ELIGIBLE_STATUSES,
};
pub use entities::{
    EventSource, Manifest, ManifestFilter, ManifestItem, ManifestTotals, NewManifest,
    ScanAuditRecord, ScanSource, Shipment, TrackingEvent, TrackingKey, TransportDetails,
    TransportType,
};
pub use events::EngineEvent;
pub use outcome::{RemovalOutcome, ScanClassification, ScanOutcome};
pub use status::{EntryEffect, ManifestStatus};
pub use token::{is_valid_awb_format, normalize, parse_scan, ScanToken, TokenRejection};
