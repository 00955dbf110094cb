//! Driving Ports (API - Inbound)

use crate::domain::{
    Manifest, ManifestFilter, ManifestItem, ManifestStatus, ManifestTotals, NewManifest,
    RemovalOutcome, ScanAuditRecord, ScanOutcome, ScanSource, ValidationFlags,
};
use crate::error::ManifestResult;
use async_trait::async_trait;
use shared_types::{ManifestId, OrgId, ShipmentId, StaffId};
use tokio_util::sync::CancellationToken;

/// One scan as submitted by a terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanRequest {
    pub org_id: OrgId,
    pub manifest_id: ManifestId,
    pub raw_token: String,
    pub actor: Option<StaffId>,
    pub source: ScanSource,
    /// `None` uses the configured defaults.
    pub flags: Option<ValidationFlags>,
}

impl ScanRequest {
    pub fn new(org_id: OrgId, manifest_id: ManifestId, raw_token: impl Into<String>) -> Self {
        Self {
            org_id,
            manifest_id,
            raw_token: raw_token.into(),
            actor: None,
            source: ScanSource::default(),
            flags: None,
        }
    }

    pub fn by(mut self, actor: StaffId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn from_source(mut self, source: ScanSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_flags(mut self, flags: ValidationFlags) -> Self {
        self.flags = Some(flags);
        self
    }
}

/// Manifest engine API
///
/// Every call is scoped by an explicit organization.
#[async_trait]
pub trait ManifestApi: Send + Sync {
    /// Attach the scanned shipment. Safe to repeat with identical arguments.
    async fn ingest_scan(&self, request: ScanRequest) -> ManifestResult<ScanOutcome>;

    /// Same as `ingest_scan`, giving up with `CANCELLED` if `cancel` fires
    /// before the membership write.
    async fn ingest_scan_cancellable(
        &self,
        request: ScanRequest,
        cancel: &CancellationToken,
    ) -> ManifestResult<ScanOutcome>;

    /// Detach a shipment. Removing a non-member is a successful no-op.
    async fn remove_shipment(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
        actor: Option<StaffId>,
    ) -> ManifestResult<RemovalOutcome>;

    /// Move the manifest along its status graph, running entry cascades.
    async fn transition_status(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        target: ManifestStatus,
        actor: Option<StaffId>,
    ) -> ManifestResult<Manifest>;

    /// Rebuild totals from current membership.
    async fn recompute_totals(&self, manifest_id: ManifestId) -> ManifestResult<ManifestTotals>;

    async fn create_manifest(
        &self,
        org_id: OrgId,
        draft: NewManifest,
    ) -> ManifestResult<Manifest>;

    async fn get_manifest(&self, org_id: OrgId, manifest_id: ManifestId)
        -> ManifestResult<Manifest>;

    async fn get_manifest_by_number(
        &self,
        org_id: OrgId,
        manifest_no: &str,
    ) -> ManifestResult<Manifest>;

    async fn list_manifests(
        &self,
        org_id: OrgId,
        filter: ManifestFilter,
    ) -> ManifestResult<Vec<Manifest>>;

    async fn manifest_items(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
    ) -> ManifestResult<Vec<ManifestItem>>;

    /// Scan attempts for a manifest, newest first.
    async fn scan_logs(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
    ) -> ManifestResult<Vec<ScanAuditRecord>>;

    /// Soft-retire an empty editable manifest.
    async fn retire_manifest(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        actor: Option<StaffId>,
    ) -> ManifestResult<Manifest>;
}
