//! # Core Domain Entities
//!
//! Identifiers and enumerations shared by every logistics crate.
//!
//! ## Clusters
//!
//! - **Identity**: `OrgId`, `ManifestId`, `ManifestItemId`, `ShipmentId`, `HubId`, `StaffId`
//! - **Shipment**: `ShipmentStatus`
//! - **Tracking**: `TrackingEventCode`
//! - **Time**: `Timestamp`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

uuid_id!(
    /// Tenant boundary. Every read and write is scoped by an organization.
    OrgId
);
uuid_id!(
    /// Identifier of a manifest (a bundle of shipments moving together).
    ManifestId
);
uuid_id!(
    /// Identifier of a single manifest membership row.
    ManifestItemId
);
uuid_id!(
    /// Identifier of a shipment.
    ShipmentId
);
uuid_id!(
    /// Identifier of a hub (origin or destination facility).
    HubId
);
uuid_id!(
    /// Identifier of a staff member performing an action.
    StaffId
);

// =============================================================================
// CLUSTER B: SHIPMENT
// =============================================================================

/// Lifecycle status of a shipment.
///
/// The manifest engine only ever moves shipments between
/// `LoadedForLinehaul`, `InTransitToDestination` and `ReceivedAtDestHub`
/// (and back to the status recorded at attach time on removal). All other
/// transitions belong to the surrounding shipment workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Created,
    PickedUp,
    ReceivedAtOriginHub,
    LoadedForLinehaul,
    InTransitToDestination,
    ReceivedAtDestHub,
    OutForDelivery,
    Delivered,
    ExceptionRaised,
    ExceptionResolved,
    Cancelled,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 11] = [
        ShipmentStatus::Created,
        ShipmentStatus::PickedUp,
        ShipmentStatus::ReceivedAtOriginHub,
        ShipmentStatus::LoadedForLinehaul,
        ShipmentStatus::InTransitToDestination,
        ShipmentStatus::ReceivedAtDestHub,
        ShipmentStatus::OutForDelivery,
        ShipmentStatus::Delivered,
        ShipmentStatus::ExceptionRaised,
        ShipmentStatus::ExceptionResolved,
        ShipmentStatus::Cancelled,
    ];

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Created => "CREATED",
            ShipmentStatus::PickedUp => "PICKED_UP",
            ShipmentStatus::ReceivedAtOriginHub => "RECEIVED_AT_ORIGIN_HUB",
            ShipmentStatus::LoadedForLinehaul => "LOADED_FOR_LINEHAUL",
            ShipmentStatus::InTransitToDestination => "IN_TRANSIT_TO_DESTINATION",
            ShipmentStatus::ReceivedAtDestHub => "RECEIVED_AT_DEST_HUB",
            ShipmentStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::ExceptionRaised => "EXCEPTION_RAISED",
            ShipmentStatus::ExceptionResolved => "EXCEPTION_RESOLVED",
            ShipmentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Terminal statuses never re-enter a manifest.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Cancelled)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ShipmentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        ShipmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

// =============================================================================
// CLUSTER C: TRACKING
// =============================================================================

/// Code of a tracking event emitted by a manifest movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingEventCode {
    /// The manifest carrying the shipment left its origin hub.
    Departed,
    /// The manifest carrying the shipment reached its destination hub.
    Arrived,
}

impl TrackingEventCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingEventCode::Departed => "DEPARTED",
            TrackingEventCode::Arrived => "ARRIVED",
        }
    }
}

impl fmt::Display for TrackingEventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
