//! Scan and removal outcomes returned to callers

use super::entities::{ManifestTotals, Shipment};
use serde::{Deserialize, Serialize};
use shared_types::{ManifestId, ManifestItemId, ShipmentId, ShipmentStatus};
use std::fmt;

/// Classification of a scan attempt. Exactly one per attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanClassification {
    Success,
    SuccessDuplicate,
    NotFound,
    InvalidToken,
    WrongDestination,
    WrongStatus,
    AlreadyManifested,
    ManifestClosed,
    ManifestNotFound,
    Cancelled,
}

impl ScanClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanClassification::Success => "SUCCESS",
            ScanClassification::SuccessDuplicate => "SUCCESS_DUPLICATE",
            ScanClassification::NotFound => "NOT_FOUND",
            ScanClassification::InvalidToken => "INVALID_TOKEN",
            ScanClassification::WrongDestination => "WRONG_DESTINATION",
            ScanClassification::WrongStatus => "WRONG_STATUS",
            ScanClassification::AlreadyManifested => "ALREADY_MANIFESTED",
            ScanClassification::ManifestClosed => "MANIFEST_CLOSED",
            ScanClassification::ManifestNotFound => "MANIFEST_NOT_FOUND",
            ScanClassification::Cancelled => "CANCELLED",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ScanClassification::Success | ScanClassification::SuccessDuplicate
        )
    }

    /// Rejections caused by the scanned shipment.
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            ScanClassification::NotFound
                | ScanClassification::InvalidToken
                | ScanClassification::WrongDestination
                | ScanClassification::WrongStatus
                | ScanClassification::AlreadyManifested
        )
    }

    /// Rejections caused by the target manifest.
    pub fn is_structural_failure(&self) -> bool {
        matches!(
            self,
            ScanClassification::ManifestClosed | ScanClassification::ManifestNotFound
        )
    }
}

impl fmt::Display for ScanClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a scan attempt as rendered by a scanning terminal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub classification: ScanClassification,
    pub message: String,
    pub raw_token: String,
    pub normalized_token: Option<String>,
    pub shipment_id: Option<ShipmentId>,
    pub awb_number: Option<String>,
    pub receiver_name: Option<String>,
    pub sender_name: Option<String>,
    pub manifest_item_id: Option<ManifestItemId>,
    /// Set for `WRONG_STATUS`.
    pub current_status: Option<ShipmentStatus>,
    /// Set for `ALREADY_MANIFESTED`.
    pub holding_manifest_id: Option<ManifestId>,
    /// Totals after the scan, for success classifications.
    pub totals: Option<ManifestTotals>,
}

impl ScanOutcome {
    pub fn new(
        classification: ScanClassification,
        message: impl Into<String>,
        raw_token: impl Into<String>,
    ) -> Self {
        Self {
            classification,
            message: message.into(),
            raw_token: raw_token.into(),
            normalized_token: None,
            shipment_id: None,
            awb_number: None,
            receiver_name: None,
            sender_name: None,
            manifest_item_id: None,
            current_status: None,
            holding_manifest_id: None,
            totals: None,
        }
    }

    pub fn with_token(mut self, normalized: impl Into<String>) -> Self {
        self.normalized_token = Some(normalized.into());
        self
    }

    pub fn with_shipment(mut self, shipment: &Shipment) -> Self {
        self.shipment_id = Some(shipment.id);
        self.awb_number = Some(shipment.awb_number.clone());
        self.receiver_name = shipment.receiver_name.clone();
        self.sender_name = shipment.sender_name.clone();
        self
    }

    pub fn with_item(mut self, item_id: ManifestItemId) -> Self {
        self.manifest_item_id = Some(item_id);
        self
    }

    pub fn with_totals(mut self, totals: ManifestTotals) -> Self {
        self.totals = Some(totals);
        self
    }

    pub fn is_success(&self) -> bool {
        self.classification.is_success()
    }

    pub fn is_duplicate(&self) -> bool {
        self.classification == ScanClassification::SuccessDuplicate
    }
}

/// Result of a removal request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalOutcome {
    /// False when the shipment was not a member (no-op).
    pub removed: bool,
}
