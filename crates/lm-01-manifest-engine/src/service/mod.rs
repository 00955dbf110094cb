//! Manifest Service - Core business logic
//!
//! Owns no state of its own. Every race between concurrent requests is
//! settled inside the store's guarded calls, so the service can be shared
//! freely across tasks behind an `Arc`.

mod lifecycle;
mod queries;
mod scan;
mod totals;

use crate::adapters::NoopNotifier;
use crate::config::EngineConfig;
use crate::domain::{
    EligibilityValidator, EngineEvent, Manifest, ManifestFilter, ManifestItem, ManifestStatus,
    ManifestTotals, NewManifest, RemovalOutcome, ScanAuditRecord, ScanOutcome,
};
use crate::error::{ManifestError, ManifestResult};
use crate::ports::inbound::{ManifestApi, ScanRequest};
use crate::ports::outbound::{
    EventNotifier, ManifestStore, ScanAuditSink, ShipmentStore, SystemTimeSource, TimeSource,
    TrackingEventSink,
};
use async_trait::async_trait;
use shared_types::{ManifestId, OrgId, ShipmentId, StaffId, Timestamp};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Manifest Service implementation
pub struct ManifestService<M, S, T, A>
where
    M: ManifestStore,
    S: ShipmentStore,
    T: TrackingEventSink,
    A: ScanAuditSink,
{
    config: EngineConfig,
    validator: EligibilityValidator,
    manifests: Arc<M>,
    shipments: Arc<S>,
    tracking: Arc<T>,
    audit: Arc<A>,
    notifier: Arc<dyn EventNotifier>,
    time_source: Arc<dyn TimeSource>,
}

impl<M, S, T, A> ManifestService<M, S, T, A>
where
    M: ManifestStore,
    S: ShipmentStore,
    T: TrackingEventSink,
    A: ScanAuditSink,
{
    pub fn new(
        config: EngineConfig,
        manifests: Arc<M>,
        shipments: Arc<S>,
        tracking: Arc<T>,
        audit: Arc<A>,
    ) -> Self {
        let validator = EligibilityValidator::new(config.eligible_statuses.iter().copied());
        Self {
            config,
            validator,
            manifests,
            shipments,
            tracking,
            audit,
            notifier: Arc::new(NoopNotifier),
            time_source: Arc::new(SystemTimeSource),
        }
    }

    /// Announce engine events through `notifier` instead of dropping them.
    pub fn with_notifier(mut self, notifier: Arc<dyn EventNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    async fn notify(&self, event: EngineEvent) {
        self.notifier.notify(event).await;
    }

    /// Org-scoped, non-retired manifest or `ManifestNotFound`.
    async fn require_manifest(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
    ) -> ManifestResult<Manifest> {
        self.manifests
            .get(org_id, manifest_id)
            .await?
            .ok_or(ManifestError::ManifestNotFound { manifest_id })
    }
}

#[async_trait]
impl<M, S, T, A> ManifestApi for ManifestService<M, S, T, A>
where
    M: ManifestStore,
    S: ShipmentStore,
    T: TrackingEventSink,
    A: ScanAuditSink,
{
    async fn ingest_scan(&self, request: ScanRequest) -> ManifestResult<ScanOutcome> {
        self.ingest(request, None).await
    }

    async fn ingest_scan_cancellable(
        &self,
        request: ScanRequest,
        cancel: &CancellationToken,
    ) -> ManifestResult<ScanOutcome> {
        self.ingest(request, Some(cancel)).await
    }

    async fn remove_shipment(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
        actor: Option<StaffId>,
    ) -> ManifestResult<RemovalOutcome> {
        self.remove(org_id, manifest_id, shipment_id, actor).await
    }

    async fn transition_status(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        target: ManifestStatus,
        actor: Option<StaffId>,
    ) -> ManifestResult<Manifest> {
        self.transition(org_id, manifest_id, target, actor).await
    }

    async fn recompute_totals(&self, manifest_id: ManifestId) -> ManifestResult<ManifestTotals> {
        self.recompute(manifest_id).await
    }

    async fn create_manifest(
        &self,
        org_id: OrgId,
        draft: NewManifest,
    ) -> ManifestResult<Manifest> {
        self.create(org_id, draft).await
    }

    async fn get_manifest(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
    ) -> ManifestResult<Manifest> {
        self.require_manifest(org_id, manifest_id).await
    }

    async fn get_manifest_by_number(
        &self,
        org_id: OrgId,
        manifest_no: &str,
    ) -> ManifestResult<Manifest> {
        self.find_by_number(org_id, manifest_no).await
    }

    async fn list_manifests(
        &self,
        org_id: OrgId,
        filter: ManifestFilter,
    ) -> ManifestResult<Vec<Manifest>> {
        Ok(self.manifests.list(org_id, &filter).await?)
    }

    async fn manifest_items(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
    ) -> ManifestResult<Vec<ManifestItem>> {
        self.items_of(org_id, manifest_id).await
    }

    async fn scan_logs(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
    ) -> ManifestResult<Vec<ScanAuditRecord>> {
        self.recent_scans(org_id, manifest_id).await
    }

    async fn retire_manifest(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        actor: Option<StaffId>,
    ) -> ManifestResult<Manifest> {
        self.retire(org_id, manifest_id, actor).await
    }
}
