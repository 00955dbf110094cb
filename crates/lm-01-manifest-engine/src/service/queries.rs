//! Read-side operations

use super::ManifestService;
use crate::domain::{Manifest, ManifestItem, ScanAuditRecord};
use crate::error::{ManifestError, ManifestResult};
use crate::ports::outbound::{ManifestStore, ScanAuditSink, ShipmentStore, TrackingEventSink};
use shared_types::{ManifestId, OrgId};

impl<M, S, T, A> ManifestService<M, S, T, A>
where
    M: ManifestStore,
    S: ShipmentStore,
    T: TrackingEventSink,
    A: ScanAuditSink,
{
    pub(super) async fn find_by_number(
        &self,
        org_id: OrgId,
        manifest_no: &str,
    ) -> ManifestResult<Manifest> {
        self.manifests
            .find_by_number(org_id, manifest_no)
            .await?
            .ok_or_else(|| ManifestError::ManifestNumberNotFound {
                manifest_no: manifest_no.trim().to_string(),
            })
    }

    pub(super) async fn items_of(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
    ) -> ManifestResult<Vec<ManifestItem>> {
        self.require_manifest(org_id, manifest_id).await?;
        Ok(self.manifests.items(manifest_id).await?)
    }

    pub(super) async fn recent_scans(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
    ) -> ManifestResult<Vec<ScanAuditRecord>> {
        self.require_manifest(org_id, manifest_id).await?;
        Ok(self
            .audit
            .recent(org_id, manifest_id, self.config.scan_log_limit)
            .await?)
    }
}
