//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Membership writes are single atomic calls carrying their own guards.
//! The engine never holds a lock across an await; every race is settled
//! inside the store.

use crate::domain::{
    EngineEvent, Manifest, ManifestFilter, ManifestItem, ManifestStatus, ManifestTotals,
    ScanAuditRecord, Shipment, TrackingEvent,
};
use async_trait::async_trait;
use shared_types::{
    ManifestId, OrgId, ShipmentId, ShipmentStatus, StaffId, StoreError, Timestamp,
};

/// Result type for storage adapters
pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a guarded membership insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttachResult {
    /// New item stored.
    Attached(ManifestItem),
    /// An item for (manifest, shipment) already existed; it is returned.
    Duplicate(ManifestItem),
    /// Manifest left the editable states.
    ManifestLocked(ManifestStatus),
    ManifestMissing,
    /// Another active manifest holds the shipment.
    HeldElsewhere(ManifestId),
}

/// Result of a guarded membership delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetachResult {
    Detached(ManifestItem),
    NotMember,
    ManifestLocked(ManifestStatus),
    ManifestMissing,
}

/// Result of a compare-and-set status change.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusCommit {
    Committed(Manifest),
    /// Status was no longer the expected one.
    Conflict(ManifestStatus),
    ManifestMissing,
}

/// Result of a soft retirement.
#[derive(Clone, Debug, PartialEq)]
pub enum RetireResult {
    Retired(Manifest),
    NotEditable(ManifestStatus),
    NotEmpty(usize),
    ManifestMissing,
}

/// Manifest and membership storage.
///
/// Retired manifests are invisible to every method.
#[async_trait]
pub trait ManifestStore: Send + Sync {
    /// Next per-organization, per-year manifest sequence value (starts at 1).
    async fn next_sequence(&self, org_id: OrgId, year: i32) -> StoreResult<u64>;

    /// Insert a new manifest. Fails if the number is already taken.
    async fn insert(&self, manifest: Manifest) -> StoreResult<()>;

    async fn get(&self, org_id: OrgId, manifest_id: ManifestId) -> StoreResult<Option<Manifest>>;

    async fn find_by_number(&self, org_id: OrgId, manifest_no: &str)
        -> StoreResult<Option<Manifest>>;

    /// Newest first.
    async fn list(&self, org_id: OrgId, filter: &ManifestFilter) -> StoreResult<Vec<Manifest>>;

    async fn find_item(
        &self,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
    ) -> StoreResult<Option<ManifestItem>>;

    /// Complete current membership, oldest scan first.
    async fn items(&self, manifest_id: ManifestId) -> StoreResult<Vec<ManifestItem>>;

    /// Active manifest other than `excluding` that holds the shipment.
    async fn active_holder(
        &self,
        org_id: OrgId,
        shipment_id: ShipmentId,
        excluding: ManifestId,
    ) -> StoreResult<Option<ManifestId>>;

    /// Atomically: editable check, (manifest, shipment) uniqueness,
    /// exclusive active membership, insert.
    async fn attach(&self, item: ManifestItem) -> StoreResult<AttachResult>;

    /// Atomically: editable check, delete.
    async fn detach(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
    ) -> StoreResult<DetachResult>;

    /// Move from `expected` to `target` only if the status is still `expected`.
    async fn commit_status(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        expected: ManifestStatus,
        target: ManifestStatus,
        actor: Option<StaffId>,
        now: Timestamp,
    ) -> StoreResult<StatusCommit>;

    /// Overwrite all three totals in one update. Returns `false` when the
    /// manifest does not exist.
    async fn write_totals(
        &self,
        manifest_id: ManifestId,
        totals: ManifestTotals,
        now: Timestamp,
    ) -> StoreResult<bool>;

    /// Soft-retire an empty, editable manifest.
    async fn retire(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        now: Timestamp,
    ) -> StoreResult<RetireResult>;
}

/// Shipment collaborator.
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    /// Shipments whose normalized AWB or id equals the token.
    async fn resolve(&self, org_id: OrgId, token: &str) -> StoreResult<Vec<Shipment>>;

    async fn get(&self, org_id: OrgId, shipment_id: ShipmentId) -> StoreResult<Option<Shipment>>;

    async fn get_many(&self, shipment_ids: &[ShipmentId]) -> StoreResult<Vec<Shipment>>;

    /// Set the manifest reference and status together.
    async fn link(
        &self,
        org_id: OrgId,
        shipment_id: ShipmentId,
        manifest_id: Option<ManifestId>,
        status: ShipmentStatus,
        now: Timestamp,
    ) -> StoreResult<Option<Shipment>>;

    /// Clear the manifest reference and restore `status`, but only while
    /// the shipment still points at `from`. `None` when it points elsewhere
    /// or does not exist.
    async fn unlink(
        &self,
        org_id: OrgId,
        shipment_id: ShipmentId,
        from: ManifestId,
        status: ShipmentStatus,
        now: Timestamp,
    ) -> StoreResult<Option<Shipment>>;

    /// Set the status, leaving the manifest reference untouched.
    async fn set_status(
        &self,
        org_id: OrgId,
        shipment_id: ShipmentId,
        status: ShipmentStatus,
        now: Timestamp,
    ) -> StoreResult<Option<Shipment>>;
}

/// Tracking log with idempotent append.
#[async_trait]
pub trait TrackingEventSink: Send + Sync {
    /// Returns `false` when an event with the same key already exists.
    async fn record(&self, event: TrackingEvent) -> StoreResult<bool>;
}

/// Append-only scan audit log.
#[async_trait]
pub trait ScanAuditSink: Send + Sync {
    async fn append(&self, record: ScanAuditRecord) -> StoreResult<()>;

    /// Newest first, at most `limit` records.
    async fn recent(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        limit: usize,
    ) -> StoreResult<Vec<ScanAuditRecord>>;
}

/// Best-effort announcement of engine events.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn notify(&self, event: EngineEvent);
}

/// Time source abstraction for testability.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}
