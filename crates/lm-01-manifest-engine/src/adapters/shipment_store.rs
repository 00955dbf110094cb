//! In-memory shipment collaborator

use super::faults::FaultSwitch;
use crate::domain::{normalize, Shipment};
use crate::ports::{ShipmentStore, StoreResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ManifestId, OrgId, ShipmentId, ShipmentStatus, Timestamp};
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryShipmentStore {
    shipments: RwLock<HashMap<ShipmentId, Shipment>>,
    faults: FaultSwitch,
}

impl InMemoryShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a shipment.
    pub fn insert(&self, shipment: Shipment) {
        self.shipments.write().insert(shipment.id, shipment);
    }

    pub fn snapshot(&self, shipment_id: ShipmentId) -> Option<Shipment> {
        self.shipments.read().get(&shipment_id).cloned()
    }

    pub fn faults(&self) -> &FaultSwitch {
        &self.faults
    }

    fn update<F>(&self, org_id: OrgId, shipment_id: ShipmentId, apply: F) -> Option<Shipment>
    where
        F: FnOnce(&mut Shipment),
    {
        let mut shipments = self.shipments.write();
        let shipment = shipments
            .get_mut(&shipment_id)
            .filter(|s| s.org_id == org_id)?;
        apply(shipment);
        Some(shipment.clone())
    }
}

#[async_trait]
impl ShipmentStore for InMemoryShipmentStore {
    async fn resolve(&self, org_id: OrgId, token: &str) -> StoreResult<Vec<Shipment>> {
        self.faults.check_read()?;
        let shipments = self.shipments.read();
        let mut matches: Vec<Shipment> = shipments
            .values()
            .filter(|s| s.org_id == org_id)
            .filter(|s| normalize(&s.awb_number) == token || normalize(&s.id.to_string()) == token)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.awb_number.cmp(&b.awb_number));
        Ok(matches)
    }

    async fn get(&self, org_id: OrgId, shipment_id: ShipmentId) -> StoreResult<Option<Shipment>> {
        self.faults.check_read()?;
        Ok(self
            .shipments
            .read()
            .get(&shipment_id)
            .filter(|s| s.org_id == org_id)
            .cloned())
    }

    async fn get_many(&self, shipment_ids: &[ShipmentId]) -> StoreResult<Vec<Shipment>> {
        self.faults.check_read()?;
        let shipments = self.shipments.read();
        Ok(shipment_ids
            .iter()
            .filter_map(|id| shipments.get(id).cloned())
            .collect())
    }

    async fn link(
        &self,
        org_id: OrgId,
        shipment_id: ShipmentId,
        manifest_id: Option<ManifestId>,
        status: ShipmentStatus,
        now: Timestamp,
    ) -> StoreResult<Option<Shipment>> {
        self.faults.check_write()?;
        Ok(self.update(org_id, shipment_id, |s| {
            s.manifest_id = manifest_id;
            s.status = status;
            s.updated_at = now;
        }))
    }

    async fn unlink(
        &self,
        org_id: OrgId,
        shipment_id: ShipmentId,
        from: ManifestId,
        status: ShipmentStatus,
        now: Timestamp,
    ) -> StoreResult<Option<Shipment>> {
        self.faults.check_write()?;
        let mut shipments = self.shipments.write();
        let Some(shipment) = shipments
            .get_mut(&shipment_id)
            .filter(|s| s.org_id == org_id && s.manifest_id == Some(from))
        else {
            return Ok(None);
        };
        shipment.manifest_id = None;
        shipment.status = status;
        shipment.updated_at = now;
        Ok(Some(shipment.clone()))
    }

    async fn set_status(
        &self,
        org_id: OrgId,
        shipment_id: ShipmentId,
        status: ShipmentStatus,
        now: Timestamp,
    ) -> StoreResult<Option<Shipment>> {
        self.faults.check_write()?;
        Ok(self.update(org_id, shipment_id, |s| {
            s.status = status;
            s.updated_at = now;
        }))
    }
}
