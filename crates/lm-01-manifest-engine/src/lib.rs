//! # lm-01-manifest-engine
//!
//! Manifest lifecycle state machine and idempotent scan ingestion.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Scan ingestion**: token normalization, ordered eligibility checks and
//!   a guarded conditional insert, so retried and concurrent scans converge
//!   on one membership row
//! - **Lifecycle**: a fixed status graph with departure and arrival cascades
//!   that emit one tracking event per member shipment
//! - **Totals**: always recomputed from current membership
//!
//! ## Architecture
//!
//! ```text
//! Scanner ──ScanRequest──→ Manifest Engine (lm-01)
//!                              │
//!                              ├── ManifestStore / ShipmentStore
//!                              ├── ScanAuditSink (one record per attempt)
//!                              ├── TrackingEventSink (keyed, idempotent)
//!                              │
//!                              └── LogisticsEvent ──→ shared bus
//! ```
//!
//! ## Status Graph
//!
//! ```text
//! [DRAFT] ──→ [OPEN] ⇄ [BUILDING] ──→ [CLOSED] ──→ [DEPARTED] ──→ [ARRIVED] ──→ [RECONCILED]
//!    │                                   ↑
//!    └───────────────────────────────────┘
//! ```
//!
//! Only DRAFT, OPEN and BUILDING accept membership changes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lm_01_manifest_engine::{EngineConfig, ManifestService, ScanRequest};
//! use lm_01_manifest_engine::ports::inbound::ManifestApi;
//!
//! let service = ManifestService::new(
//!     EngineConfig::default(),
//!     manifests,
//!     shipments,
//!     tracking,
//!     audit,
//! );
//!
//! let outcome = service
//!     .ingest_scan(ScanRequest::new(org_id, manifest_id, "123-45678901"))
//!     .await?;
//! assert!(outcome.is_success());
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use domain::{
    EngineEvent, Manifest, ManifestFilter, ManifestItem, ManifestStatus, ManifestTotals,
    NewManifest, RemovalOutcome, ScanAuditRecord, ScanClassification, ScanOutcome, ScanSource,
    Shipment, TrackingEvent, TransportDetails, TransportType, ValidationFlags,
};
pub use error::{ManifestError, ManifestResult};
pub use ports::inbound::{ManifestApi, ScanRequest};
pub use service::ManifestService;
