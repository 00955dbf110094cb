//! Append-only logs: tracking events and scan audit records

use super::faults::FaultSwitch;
use crate::domain::{ScanAuditRecord, TrackingEvent, TrackingKey};
use crate::ports::{ScanAuditSink, StoreResult, TrackingEventSink};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ManifestId, OrgId, ShipmentId};
use std::collections::HashMap;

#[derive(Default)]
struct TrackingTable {
    keys: HashMap<TrackingKey, usize>,
    events: Vec<TrackingEvent>,
}

/// Tracking log keyed by (manifest, shipment, event code).
#[derive(Default)]
pub struct InMemoryTrackingLog {
    table: RwLock<TrackingTable>,
    faults: FaultSwitch,
}

impl InMemoryTrackingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events in insertion order.
    pub fn events(&self) -> Vec<TrackingEvent> {
        self.table.read().events.clone()
    }

    pub fn for_shipment(&self, shipment_id: ShipmentId) -> Vec<TrackingEvent> {
        self.table
            .read()
            .events
            .iter()
            .filter(|e| e.shipment_id == shipment_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn faults(&self) -> &FaultSwitch {
        &self.faults
    }
}

#[async_trait]
impl TrackingEventSink for InMemoryTrackingLog {
    async fn record(&self, event: TrackingEvent) -> StoreResult<bool> {
        self.faults.check_write()?;
        let mut table = self.table.write();
        let key = event.key();
        if table.keys.contains_key(&key) {
            return Ok(false);
        }
        let position = table.events.len();
        table.keys.insert(key, position);
        table.events.push(event);
        Ok(true)
    }
}

/// Scan audit log.
#[derive(Default)]
pub struct InMemoryScanAuditLog {
    records: RwLock<Vec<ScanAuditRecord>>,
    faults: FaultSwitch,
}

impl InMemoryScanAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ScanAuditRecord> {
        self.records.read().clone()
    }

    pub fn count_for(&self, manifest_id: ManifestId) -> usize {
        self.records
            .read()
            .iter()
            .filter(|r| r.manifest_id == manifest_id)
            .count()
    }

    pub fn faults(&self) -> &FaultSwitch {
        &self.faults
    }
}

#[async_trait]
impl ScanAuditSink for InMemoryScanAuditLog {
    async fn append(&self, record: ScanAuditRecord) -> StoreResult<()> {
        self.faults.check_write()?;
        self.records.write().push(record);
        Ok(())
    }

    async fn recent(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        limit: usize,
    ) -> StoreResult<Vec<ScanAuditRecord>> {
        self.faults.check_read()?;
        Ok(self
            .records
            .read()
            .iter()
            .rev()
            .filter(|r| r.org_id == org_id && r.manifest_id == manifest_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
