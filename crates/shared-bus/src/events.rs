//! # Logistics Events
//!
//! Defines all event types that flow through the shared bus.
//! Every event is scoped to the organization that produced it.

use serde::{Deserialize, Serialize};
use shared_types::entities::{
    HubId, ManifestId, ManifestItemId, OrgId, ShipmentId, StaffId, Timestamp, TrackingEventCode,
};

/// A shipment tracking record produced by a manifest movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentTracked {
    pub org_id: OrgId,
    pub shipment_id: ShipmentId,
    pub awb_number: String,
    pub event_code: TrackingEventCode,
    /// Origin hub on departure, destination hub on arrival.
    pub hub_id: HubId,
    pub actor: Option<StaffId>,
    pub manifest_id: ManifestId,
    pub manifest_no: String,
    pub occurred_at: Timestamp,
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogisticsEvent {
    // =========================================================================
    // MANIFEST LIFECYCLE
    // =========================================================================
    /// A manifest was created and assigned its number.
    ManifestCreated {
        org_id: OrgId,
        manifest_id: ManifestId,
        manifest_no: String,
    },

    /// A manifest moved along its status graph.
    ManifestStatusChanged {
        org_id: OrgId,
        manifest_id: ManifestId,
        manifest_no: String,
        from: String,
        to: String,
        actor: Option<StaffId>,
    },

    /// A manifest was soft-retired.
    ManifestRetired {
        org_id: OrgId,
        manifest_id: ManifestId,
    },

    // =========================================================================
    // MEMBERSHIP
    // =========================================================================
    /// A shipment was attached to a manifest by a scan.
    ShipmentManifested {
        org_id: OrgId,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
        item_id: ManifestItemId,
    },

    /// A shipment was detached from a manifest.
    ShipmentUnmanifested {
        org_id: OrgId,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
    },

    // =========================================================================
    // TRACKING
    // =========================================================================
    /// A departure or arrival was recorded for a member shipment.
    ShipmentTracked(ShipmentTracked),
}

impl LogisticsEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ManifestCreated { .. }
            | Self::ManifestStatusChanged { .. }
            | Self::ManifestRetired { .. } => EventTopic::Lifecycle,
            Self::ShipmentManifested { .. } | Self::ShipmentUnmanifested { .. } => {
                EventTopic::Membership
            }
            Self::ShipmentTracked(_) => EventTopic::Tracking,
        }
    }

    /// Get the organization that owns this event.
    #[must_use]
    pub fn org_id(&self) -> OrgId {
        match self {
            Self::ManifestCreated { org_id, .. }
            | Self::ManifestStatusChanged { org_id, .. }
            | Self::ManifestRetired { org_id, .. }
            | Self::ShipmentManifested { org_id, .. }
            | Self::ShipmentUnmanifested { org_id, .. } => *org_id,
            Self::ShipmentTracked(tracked) => tracked.org_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Manifest creation, status changes and retirement.
    Lifecycle,
    /// Shipments joining or leaving manifests.
    Membership,
    /// Shipment tracking records.
    Tracking,
    /// All events (no filtering).
    All,
}

impl EventTopic {
    /// Topics an event is actually published on.
    pub const ROUTED: [EventTopic; 3] = [
        EventTopic::Lifecycle,
        EventTopic::Membership,
        EventTopic::Tracking,
    ];
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Organizations to include. Empty means all organizations.
    pub orgs: Vec<OrgId>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            orgs: Vec::new(),
        }
    }

    /// Create a filter for events of specific organizations.
    #[must_use]
    pub fn for_orgs(orgs: Vec<OrgId>) -> Self {
        Self {
            topics: Vec::new(),
            orgs,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LogisticsEvent) -> bool {
        let org_match = self.orgs.is_empty() || self.orgs.contains(&event.org_id());
        self.accepts_topic(event.topic()) && org_match
    }

    /// Whether events on `topic` can pass this filter.
    #[must_use]
    pub fn accepts_topic(&self, topic: EventTopic) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&topic)
    }
}
