//! In-memory manifest store
//!
//! Every mutating call takes the table write lock once and performs its
//! guards and its write under that lock, which gives the same guarantees
//! as a unique index plus a conditional update in a relational store.

use super::faults::FaultSwitch;
use crate::domain::{
    Manifest, ManifestFilter, ManifestItem, ManifestStatus, ManifestTotals,
};
use crate::ports::{
    AttachResult, DetachResult, ManifestStore, RetireResult, StatusCommit, StoreResult,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{ManifestId, OrgId, ShipmentId, StaffId, StoreError, Timestamp};
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Default)]
struct Tables {
    manifests: HashMap<ManifestId, Manifest>,
    numbers: HashMap<(OrgId, String), ManifestId>,
    items: HashMap<(ManifestId, ShipmentId), ManifestItem>,
    /// Manifests that have (or had) an item for a shipment.
    by_shipment: HashMap<ShipmentId, HashSet<ManifestId>>,
    sequences: HashMap<(OrgId, i32), u64>,
}

impl Tables {
    fn visible(&self, org_id: OrgId, manifest_id: ManifestId) -> Option<&Manifest> {
        self.manifests
            .get(&manifest_id)
            .filter(|m| m.org_id == org_id && !m.is_retired())
    }

    fn member_count(&self, manifest_id: ManifestId) -> usize {
        self.items.keys().filter(|(m, _)| *m == manifest_id).count()
    }

    fn active_holder(
        &self,
        org_id: OrgId,
        shipment_id: ShipmentId,
        excluding: ManifestId,
    ) -> Option<ManifestId> {
        let holders = self.by_shipment.get(&shipment_id)?;
        holders
            .iter()
            .filter(|id| **id != excluding)
            .filter(|id| self.items.contains_key(&(**id, shipment_id)))
            .filter_map(|id| self.visible(org_id, *id))
            .find(|m| m.status.holds_active_membership())
            .map(|m| m.id)
    }
}

/// Manifest store backed by process memory.
#[derive(Default)]
pub struct InMemoryManifestStore {
    tables: RwLock<Tables>,
    faults: FaultSwitch,
}

impl InMemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn faults(&self) -> &FaultSwitch {
        &self.faults
    }

    /// Number of items across all manifests.
    pub fn item_count(&self) -> usize {
        self.tables.read().items.len()
    }

    /// Number of items on one manifest.
    pub fn items_in(&self, manifest_id: ManifestId) -> usize {
        self.tables.read().member_count(manifest_id)
    }

    /// Raw row lookup, including retired manifests.
    pub fn snapshot(&self, manifest_id: ManifestId) -> Option<Manifest> {
        self.tables.read().manifests.get(&manifest_id).cloned()
    }
}

#[async_trait]
impl ManifestStore for InMemoryManifestStore {
    async fn next_sequence(&self, org_id: OrgId, year: i32) -> StoreResult<u64> {
        self.faults.check_write()?;
        let mut tables = self.tables.write();
        let seq = tables.sequences.entry((org_id, year)).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    async fn insert(&self, manifest: Manifest) -> StoreResult<()> {
        self.faults.check_write()?;
        let mut tables = self.tables.write();
        let number_key = (manifest.org_id, manifest.manifest_no.clone());
        if tables.numbers.contains_key(&number_key) {
            return Err(StoreError::WriteFailed(format!(
                "manifest number {} already assigned",
                manifest.manifest_no
            )));
        }
        tables.numbers.insert(number_key, manifest.id);
        tables.manifests.insert(manifest.id, manifest);
        Ok(())
    }

    async fn get(&self, org_id: OrgId, manifest_id: ManifestId) -> StoreResult<Option<Manifest>> {
        self.faults.check_read()?;
        Ok(self.tables.read().visible(org_id, manifest_id).cloned())
    }

    async fn find_by_number(
        &self,
        org_id: OrgId,
        manifest_no: &str,
    ) -> StoreResult<Option<Manifest>> {
        self.faults.check_read()?;
        let tables = self.tables.read();
        let key = (org_id, manifest_no.trim().to_ascii_uppercase());
        Ok(tables
            .numbers
            .get(&key)
            .and_then(|id| tables.visible(org_id, *id))
            .cloned())
    }

    async fn list(&self, org_id: OrgId, filter: &ManifestFilter) -> StoreResult<Vec<Manifest>> {
        self.faults.check_read()?;
        let tables = self.tables.read();
        let mut manifests: Vec<Manifest> = tables
            .manifests
            .values()
            .filter(|m| m.org_id == org_id && !m.is_retired() && filter.matches(m))
            .cloned()
            .collect();
        manifests.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.manifest_no.cmp(&a.manifest_no))
        });
        if let Some(limit) = filter.limit {
            manifests.truncate(limit);
        }
        Ok(manifests)
    }

    async fn find_item(
        &self,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
    ) -> StoreResult<Option<ManifestItem>> {
        self.faults.check_read()?;
        Ok(self
            .tables
            .read()
            .items
            .get(&(manifest_id, shipment_id))
            .cloned())
    }

    async fn items(&self, manifest_id: ManifestId) -> StoreResult<Vec<ManifestItem>> {
        self.faults.check_read()?;
        let tables = self.tables.read();
        let mut items: Vec<ManifestItem> = tables
            .items
            .iter()
            .filter(|((m, _), _)| *m == manifest_id)
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_by(|a, b| a.scanned_at.cmp(&b.scanned_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn active_holder(
        &self,
        org_id: OrgId,
        shipment_id: ShipmentId,
        excluding: ManifestId,
    ) -> StoreResult<Option<ManifestId>> {
        self.faults.check_read()?;
        Ok(self
            .tables
            .read()
            .active_holder(org_id, shipment_id, excluding))
    }

    async fn attach(&self, item: ManifestItem) -> StoreResult<AttachResult> {
        self.faults.check_write()?;
        let mut tables = self.tables.write();

        let Some(manifest) = tables.visible(item.org_id, item.manifest_id) else {
            return Ok(AttachResult::ManifestMissing);
        };
        if !manifest.status.is_editable() {
            return Ok(AttachResult::ManifestLocked(manifest.status));
        }

        let key = (item.manifest_id, item.shipment_id);
        if let Some(existing) = tables.items.get(&key) {
            debug!(item_id = %existing.id, "[lm-01] attach conflict on (manifest, shipment)");
            return Ok(AttachResult::Duplicate(existing.clone()));
        }

        if let Some(holder) = tables.active_holder(item.org_id, item.shipment_id, item.manifest_id)
        {
            return Ok(AttachResult::HeldElsewhere(holder));
        }

        tables
            .by_shipment
            .entry(item.shipment_id)
            .or_default()
            .insert(item.manifest_id);
        tables.items.insert(key, item.clone());
        Ok(AttachResult::Attached(item))
    }

    async fn detach(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
    ) -> StoreResult<DetachResult> {
        self.faults.check_write()?;
        let mut tables = self.tables.write();

        let Some(manifest) = tables.visible(org_id, manifest_id) else {
            return Ok(DetachResult::ManifestMissing);
        };
        if !manifest.status.is_editable() {
            return Ok(DetachResult::ManifestLocked(manifest.status));
        }

        match tables.items.remove(&(manifest_id, shipment_id)) {
            Some(item) => {
                if let Some(holders) = tables.by_shipment.get_mut(&shipment_id) {
                    holders.remove(&manifest_id);
                }
                Ok(DetachResult::Detached(item))
            }
            None => Ok(DetachResult::NotMember),
        }
    }

    async fn commit_status(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        expected: ManifestStatus,
        target: ManifestStatus,
        actor: Option<StaffId>,
        now: Timestamp,
    ) -> StoreResult<StatusCommit> {
        self.faults.check_write()?;
        let mut tables = self.tables.write();

        let visible = tables.visible(org_id, manifest_id).is_some();
        let Some(manifest) = tables.manifests.get_mut(&manifest_id).filter(|_| visible) else {
            return Ok(StatusCommit::ManifestMissing);
        };
        if manifest.status != expected {
            return Ok(StatusCommit::Conflict(manifest.status));
        }

        manifest.apply_status(target, actor, now);
        Ok(StatusCommit::Committed(manifest.clone()))
    }

    async fn write_totals(
        &self,
        manifest_id: ManifestId,
        totals: ManifestTotals,
        now: Timestamp,
    ) -> StoreResult<bool> {
        self.faults.check_write()?;
        let mut tables = self.tables.write();
        match tables.manifests.get_mut(&manifest_id) {
            Some(manifest) => {
                manifest.totals = totals;
                manifest.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn retire(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        now: Timestamp,
    ) -> StoreResult<RetireResult> {
        self.faults.check_write()?;
        let mut tables = self.tables.write();

        let Some(status) = tables.visible(org_id, manifest_id).map(|m| m.status) else {
            return Ok(RetireResult::ManifestMissing);
        };
        if !status.is_editable() {
            return Ok(RetireResult::NotEditable(status));
        }
        let members = tables.member_count(manifest_id);
        if members > 0 {
            return Ok(RetireResult::NotEmpty(members));
        }

        let Some(manifest) = tables.manifests.get_mut(&manifest_id) else {
            return Ok(RetireResult::ManifestMissing);
        };
        manifest.retired_at = Some(now);
        manifest.updated_at = now;
        Ok(RetireResult::Retired(manifest.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewManifest, ScanSource, TransportDetails};
    use shared_types::{HubId, ManifestItemId, ShipmentStatus};

    fn manifest(org: OrgId, no: &str, status: ManifestStatus) -> Manifest {
        let mut manifest =
            NewManifest::new(TransportDetails::air("AI101"), HubId::new(), HubId::new())
                .into_manifest(org, no.to_string(), 1);
        manifest.status = status;
        manifest
    }

    fn item(org: OrgId, manifest_id: ManifestId, shipment_id: ShipmentId) -> ManifestItem {
        ManifestItem {
            id: ManifestItemId::new(),
            org_id: org,
            manifest_id,
            shipment_id,
            scanned_by: None,
            scan_source: ScanSource::Manual,
            prior_status: ShipmentStatus::Created,
            scanned_at: 5,
        }
    }

    #[tokio::test]
    async fn test_sequences_are_per_org_and_year() {
        let store = InMemoryManifestStore::new();
        let (a, b) = (OrgId::new(), OrgId::new());
        assert_eq!(store.next_sequence(a, 2026).await.unwrap(), 1);
        assert_eq!(store.next_sequence(a, 2026).await.unwrap(), 2);
        assert_eq!(store.next_sequence(b, 2026).await.unwrap(), 1);
        assert_eq!(store.next_sequence(a, 2027).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_number_rejected() {
        let store = InMemoryManifestStore::new();
        let org = OrgId::new();
        store
            .insert(manifest(org, "MNF-2026-000001", ManifestStatus::Open))
            .await
            .unwrap();
        let err = store
            .insert(manifest(org, "MNF-2026-000001", ManifestStatus::Open))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed(_)));
    }

    #[tokio::test]
    async fn test_org_scoping() {
        let store = InMemoryManifestStore::new();
        let org = OrgId::new();
        let m = manifest(org, "MNF-2026-000001", ManifestStatus::Open);
        let id = m.id;
        store.insert(m).await.unwrap();

        assert!(store.get(org, id).await.unwrap().is_some());
        assert!(store.get(OrgId::new(), id).await.unwrap().is_none());
        assert!(store
            .find_by_number(org, "mnf-2026-000001")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_attach_guards() {
        let store = InMemoryManifestStore::new();
        let org = OrgId::new();
        let open = manifest(org, "MNF-2026-000001", ManifestStatus::Open);
        let other = manifest(org, "MNF-2026-000002", ManifestStatus::Building);
        let closed = manifest(org, "MNF-2026-000003", ManifestStatus::Closed);
        let (open_id, other_id, closed_id) = (open.id, other.id, closed.id);
        for m in [open, other, closed] {
            store.insert(m).await.unwrap();
        }
        let shipment = ShipmentId::new();

        let first = store.attach(item(org, open_id, shipment)).await.unwrap();
        let AttachResult::Attached(stored) = first else {
            panic!("expected attach, got {first:?}");
        };

        let again = store.attach(item(org, open_id, shipment)).await.unwrap();
        assert_eq!(again, AttachResult::Duplicate(stored));

        let elsewhere = store.attach(item(org, other_id, shipment)).await.unwrap();
        assert_eq!(elsewhere, AttachResult::HeldElsewhere(open_id));

        let locked = store
            .attach(item(org, closed_id, ShipmentId::new()))
            .await
            .unwrap();
        assert_eq!(locked, AttachResult::ManifestLocked(ManifestStatus::Closed));

        let missing = store
            .attach(item(org, ManifestId::new(), shipment))
            .await
            .unwrap();
        assert_eq!(missing, AttachResult::ManifestMissing);
        assert_eq!(store.item_count(), 1);
        assert_eq!(store.items_in(open_id), 1);
        assert_eq!(store.items_in(closed_id), 0);
    }

    #[tokio::test]
    async fn test_arrived_manifest_releases_membership() {
        let store = InMemoryManifestStore::new();
        let org = OrgId::new();
        let first = manifest(org, "MNF-2026-000001", ManifestStatus::Open);
        let second = manifest(org, "MNF-2026-000002", ManifestStatus::Open);
        let (first_id, second_id) = (first.id, second.id);
        store.insert(first).await.unwrap();
        store.insert(second).await.unwrap();
        let shipment = ShipmentId::new();
        store.attach(item(org, first_id, shipment)).await.unwrap();

        for (from, to) in [
            (ManifestStatus::Open, ManifestStatus::Closed),
            (ManifestStatus::Closed, ManifestStatus::Departed),
            (ManifestStatus::Departed, ManifestStatus::Arrived),
        ] {
            store
                .commit_status(org, first_id, from, to, None, 10)
                .await
                .unwrap();
        }

        let result = store.attach(item(org, second_id, shipment)).await.unwrap();
        assert!(matches!(result, AttachResult::Attached(_)));
    }

    #[tokio::test]
    async fn test_commit_status_is_compare_and_set() {
        let store = InMemoryManifestStore::new();
        let org = OrgId::new();
        let m = manifest(org, "MNF-2026-000001", ManifestStatus::Open);
        let id = m.id;
        store.insert(m).await.unwrap();

        let committed = store
            .commit_status(org, id, ManifestStatus::Open, ManifestStatus::Closed, None, 9)
            .await
            .unwrap();
        assert!(matches!(committed, StatusCommit::Committed(ref m) if m.closed_at == Some(9)));

        let stale = store
            .commit_status(org, id, ManifestStatus::Open, ManifestStatus::Closed, None, 10)
            .await
            .unwrap();
        assert_eq!(stale, StatusCommit::Conflict(ManifestStatus::Closed));
    }

    #[tokio::test]
    async fn test_detach_and_retire() {
        let store = InMemoryManifestStore::new();
        let org = OrgId::new();
        let m = manifest(org, "MNF-2026-000001", ManifestStatus::Draft);
        let id = m.id;
        store.insert(m).await.unwrap();
        let shipment = ShipmentId::new();
        store.attach(item(org, id, shipment)).await.unwrap();

        assert_eq!(store.retire(org, id, 3).await.unwrap(), RetireResult::NotEmpty(1));
        assert!(matches!(
            store.detach(org, id, shipment).await.unwrap(),
            DetachResult::Detached(_)
        ));
        assert_eq!(
            store.detach(org, id, shipment).await.unwrap(),
            DetachResult::NotMember
        );
        assert!(matches!(
            store.retire(org, id, 4).await.unwrap(),
            RetireResult::Retired(ref m) if m.retired_at == Some(4)
        ));
        assert!(store.get(org, id).await.unwrap().is_none());
        assert!(store.snapshot(id).is_some());
    }

    #[tokio::test]
    async fn test_unavailable_store_errors() {
        let store = InMemoryManifestStore::new();
        store.faults().set_unavailable(true);
        let err = store.get(OrgId::new(), ManifestId::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
