//! Error types for the manifest engine
//!
//! Scan validation failures are not errors: they travel as a
//! `ScanClassification` inside `ScanOutcome`. This enum covers structural
//! failures of explicit operations and infrastructure faults.

use crate::domain::status::ManifestStatus;
use shared_types::{ManifestId, ShipmentId, StoreError};
use thiserror::Error;

/// Manifest engine errors
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest does not exist in the caller's organization (or was retired)
    #[error("Manifest not found: {manifest_id}")]
    ManifestNotFound { manifest_id: ManifestId },

    /// No manifest carries this number in the caller's organization
    #[error("Manifest not found: {manifest_no}")]
    ManifestNumberNotFound { manifest_no: String },

    /// Membership changes attempted outside the editable states
    #[error("Manifest {manifest_id} is not editable in status {status}")]
    ManifestNotEditable {
        manifest_id: ManifestId,
        status: ManifestStatus,
    },

    /// Target status is not reachable from the current status
    #[error("Invalid manifest transition: cannot go from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Retirement requested while shipments are still attached
    #[error("Manifest {manifest_id} still holds {members} shipment(s)")]
    ManifestNotEmpty {
        manifest_id: ManifestId,
        members: usize,
    },

    /// Manifest creation input rejected
    #[error("Invalid manifest: {reason}")]
    InvalidManifest { reason: String },

    /// Shipment referenced by id does not exist
    #[error("Shipment not found: {shipment_id}")]
    ShipmentNotFound { shipment_id: ShipmentId },

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ManifestError {
    pub(crate) fn invalid_transition(from: ManifestStatus, to: ManifestStatus) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Infrastructure faults are the only retryable errors.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(StoreError::Unavailable(_)))
    }
}

/// Result type for manifest engine operations
pub type ManifestResult<T> = Result<T, ManifestError>;
