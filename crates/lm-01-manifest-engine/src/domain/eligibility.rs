//! Eligibility rules for attaching a shipment to a manifest
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! | # | Check | Failure |
//! |---|-------|---------|
//! | 1 | token resolves to exactly one shipment | `NOT_FOUND` |
//! | 2 | no active membership in another manifest | `ALREADY_MANIFESTED` |
//! | 3 | destination hub matches (optional) | `WRONG_DESTINATION` |
//! | 4 | shipment status is pre-manifest (optional) | `WRONG_STATUS` |

use super::entities::{Manifest, Shipment};
use super::outcome::ScanClassification;
use serde::{Deserialize, Serialize};
use shared_types::{HubId, ManifestId, ShipmentStatus};
use std::collections::HashSet;

/// Statuses a shipment may have when it is scanned onto a manifest.
pub const DEFAULT_ELIGIBLE_STATUSES: [ShipmentStatus; 3] = [
    ShipmentStatus::Created,
    ShipmentStatus::PickedUp,
    ShipmentStatus::ReceivedAtOriginHub,
];

/// Caller-supplied toggles for the optional checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFlags {
    pub validate_destination: bool,
    pub validate_status: bool,
}

impl Default for ValidationFlags {
    fn default() -> Self {
        Self {
            validate_destination: true,
            validate_status: true,
        }
    }
}

impl ValidationFlags {
    pub fn none() -> Self {
        Self {
            validate_destination: false,
            validate_status: false,
        }
    }
}

/// A failed eligibility check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    NotFound { matches: usize },
    AlreadyManifested { holding_manifest: ManifestId },
    WrongDestination { expected: HubId, actual: HubId },
    WrongStatus { current: ShipmentStatus },
}

impl Rejection {
    pub fn classification(&self) -> ScanClassification {
        match self {
            Rejection::NotFound { .. } => ScanClassification::NotFound,
            Rejection::AlreadyManifested { .. } => ScanClassification::AlreadyManifested,
            Rejection::WrongDestination { .. } => ScanClassification::WrongDestination,
            Rejection::WrongStatus { .. } => ScanClassification::WrongStatus,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Rejection::NotFound { matches: 0 } => "Shipment not found".to_string(),
            Rejection::NotFound { matches } => {
                format!("Token matches {matches} shipments; scan a unique AWB")
            }
            Rejection::AlreadyManifested { holding_manifest } => {
                format!("Shipment is already on manifest {holding_manifest}")
            }
            Rejection::WrongDestination { .. } => {
                "Shipment destination does not match manifest destination".to_string()
            }
            Rejection::WrongStatus { current } => {
                format!("Shipment status {current} is not eligible for manifesting")
            }
        }
    }
}

/// What the validator needs to know about the candidate beyond the shipment row.
#[derive(Clone, Copy, Debug, Default)]
pub struct MembershipView {
    /// Active manifest (other than the target) currently holding the shipment.
    pub held_elsewhere: Option<ManifestId>,
    /// Shipment already belongs to the target manifest.
    pub already_member: bool,
}

/// Evaluates the ordered eligibility checks.
#[derive(Clone, Debug)]
pub struct EligibilityValidator {
    eligible_statuses: HashSet<ShipmentStatus>,
}

impl EligibilityValidator {
    pub fn new(eligible_statuses: impl IntoIterator<Item = ShipmentStatus>) -> Self {
        Self {
            eligible_statuses: eligible_statuses.into_iter().collect(),
        }
    }

    pub fn is_eligible_status(&self, status: ShipmentStatus) -> bool {
        self.eligible_statuses.contains(&status)
    }

    /// Check 1: the token must resolve to exactly one shipment.
    pub fn resolve_single(&self, mut candidates: Vec<Shipment>) -> Result<Shipment, Rejection> {
        match candidates.len() {
            1 => Ok(candidates.remove(0)),
            matches => Err(Rejection::NotFound { matches }),
        }
    }

    /// Checks 2 to 4 against a resolved shipment.
    pub fn check(
        &self,
        manifest: &Manifest,
        shipment: &Shipment,
        membership: MembershipView,
        flags: ValidationFlags,
    ) -> Result<(), Rejection> {
        if let Some(holding_manifest) = membership.held_elsewhere {
            return Err(Rejection::AlreadyManifested { holding_manifest });
        }

        if flags.validate_destination && shipment.destination_hub != manifest.destination_hub {
            return Err(Rejection::WrongDestination {
                expected: manifest.destination_hub,
                actual: shipment.destination_hub,
            });
        }

        // A member's status was advanced by this very manifest
        if flags.validate_status
            && !membership.already_member
            && !self.is_eligible_status(shipment.status)
        {
            return Err(Rejection::WrongStatus {
                current: shipment.status,
            });
        }

        Ok(())
    }
}

impl Default for EligibilityValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ELIGIBLE_STATUSES)
    }
}
