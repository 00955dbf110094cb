//! Domain events raised by the engine

use super::entities::TrackingEvent;
use super::status::ManifestStatus;
use shared_types::{ManifestId, ManifestItemId, OrgId, ShipmentId, StaffId};

/// Something observable happened to a manifest or its membership.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    ManifestCreated {
        org_id: OrgId,
        manifest_id: ManifestId,
        manifest_no: String,
    },
    StatusChanged {
        org_id: OrgId,
        manifest_id: ManifestId,
        manifest_no: String,
        from: ManifestStatus,
        to: ManifestStatus,
        actor: Option<StaffId>,
    },
    ManifestRetired {
        org_id: OrgId,
        manifest_id: ManifestId,
    },
    ShipmentAttached {
        org_id: OrgId,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
        item_id: ManifestItemId,
    },
    ShipmentDetached {
        org_id: OrgId,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
    },
    /// Recorded for the first time; re-recordings are not announced.
    ShipmentTracked(TrackingEvent),
}

impl EngineEvent {
    pub fn org_id(&self) -> OrgId {
        match self {
            EngineEvent::ManifestCreated { org_id, .. }
            | EngineEvent::StatusChanged { org_id, .. }
            | EngineEvent::ManifestRetired { org_id, .. }
            | EngineEvent::ShipmentAttached { org_id, .. }
            | EngineEvent::ShipmentDetached { org_id, .. } => *org_id,
            EngineEvent::ShipmentTracked(event) => event.org_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::ManifestCreated { .. } => "manifest_created",
            EngineEvent::StatusChanged { .. } => "status_changed",
            EngineEvent::ManifestRetired { .. } => "manifest_retired",
            EngineEvent::ShipmentAttached { .. } => "shipment_attached",
            EngineEvent::ShipmentDetached { .. } => "shipment_detached",
            EngineEvent::ShipmentTracked(_) => "shipment_tracked",
        }
    }
}
