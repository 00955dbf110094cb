//! Manifest status graph
//!
//! ```text
//!           ┌──────────┐
//!           │  DRAFT   │──────────────────────┐
//!           └──────────┘                      │
//!             │      │                        │
//!             ▼      ▼                        │
//!       ┌──────┐  ┌──────────┐                │
//!       │ OPEN │◄─┤ BUILDING │                │
//!       │      ├─►│          │                │
//!       └──────┘  └──────────┘                │
//!             │      │                        │
//!             ▼      ▼                        ▼
//!           ┌────────────────────────────────────┐
//!           │               CLOSED               │
//!           └────────────────────────────────────┘
//!                  │
//!                  ▼
//!             DEPARTED ──► ARRIVED ──► RECONCILED
//! ```
//!
//! Every edge not drawn is rejected. Only the editable states accept
//! membership changes.

use serde::{Deserialize, Serialize};
use shared_types::{ShipmentStatus, TrackingEventCode};
use std::fmt;
use std::str::FromStr;

/// Manifest lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManifestStatus {
    #[default]
    Draft,
    Open,
    Building,
    Closed,
    Departed,
    Arrived,
    Reconciled,
}

/// Side effect attached to entering a status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryEffect {
    /// Timestamp stamp only
    None,
    /// Recompute totals once the status is committed
    FinalizeTotals,
    /// Advance every member shipment and emit one tracking event each
    Cascade {
        event_code: TrackingEventCode,
        shipment_status: ShipmentStatus,
    },
}

impl ManifestStatus {
    pub const ALL: [ManifestStatus; 7] = [
        ManifestStatus::Draft,
        ManifestStatus::Open,
        ManifestStatus::Building,
        ManifestStatus::Closed,
        ManifestStatus::Departed,
        ManifestStatus::Arrived,
        ManifestStatus::Reconciled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestStatus::Draft => "DRAFT",
            ManifestStatus::Open => "OPEN",
            ManifestStatus::Building => "BUILDING",
            ManifestStatus::Closed => "CLOSED",
            ManifestStatus::Departed => "DEPARTED",
            ManifestStatus::Arrived => "ARRIVED",
            ManifestStatus::Reconciled => "RECONCILED",
        }
    }

    /// Static adjacency table.
    pub fn allowed_targets(&self) -> &'static [ManifestStatus] {
        use ManifestStatus::*;
        match self {
            Draft => &[Building, Open, Closed],
            Open => &[Building, Closed],
            Building => &[Open, Closed],
            Closed => &[Departed],
            Departed => &[Arrived],
            Arrived => &[Reconciled],
            Reconciled => &[],
        }
    }

    pub fn can_transition_to(&self, target: ManifestStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Membership may change only in these states.
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            ManifestStatus::Draft | ManifestStatus::Open | ManifestStatus::Building
        )
    }

    /// Manifests in these states hold their shipments exclusively.
    pub fn holds_active_membership(&self) -> bool {
        self.is_editable() || matches!(self, ManifestStatus::Closed | ManifestStatus::Departed)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// What entering this status triggers.
    pub fn entry_effect(&self) -> EntryEffect {
        match self {
            ManifestStatus::Closed => EntryEffect::FinalizeTotals,
            ManifestStatus::Departed => EntryEffect::Cascade {
                event_code: TrackingEventCode::Departed,
                shipment_status: ShipmentStatus::InTransitToDestination,
            },
            ManifestStatus::Arrived => EntryEffect::Cascade {
                event_code: TrackingEventCode::Arrived,
                shipment_status: ShipmentStatus::ReceivedAtDestHub,
            },
            _ => EntryEffect::None,
        }
    }

    /// Whether reaching this status records the acting staff member.
    pub fn records_actor(&self) -> bool {
        matches!(self, ManifestStatus::Closed | ManifestStatus::Reconciled)
    }
}

impl fmt::Display for ManifestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        ManifestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| format!("unknown manifest status: {s}"))
    }
}
