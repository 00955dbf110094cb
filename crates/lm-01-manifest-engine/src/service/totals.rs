use super::ManifestService;
use crate::domain::totals::aggregate;
use crate::domain::ManifestTotals;
use crate::error::{ManifestError, ManifestResult};
use crate::metrics;
use crate::ports::outbound::{ManifestStore, ScanAuditSink, ShipmentStore, TrackingEventSink};
use shared_types::{ManifestId, ShipmentId};
use tracing::debug;

impl<M, S, T, A> ManifestService<M, S, T, A>
where
    M: ManifestStore,
    S: ShipmentStore,
    T: TrackingEventSink,
    A: ScanAuditSink,
{
    /// Full recompute from current membership. Last write wins.
    pub(super) async fn recompute(&self, manifest_id: ManifestId) -> ManifestResult<ManifestTotals> {
        let items = self.manifests.items(manifest_id).await?;
        let shipment_ids: Vec<ShipmentId> = items.iter().map(|item| item.shipment_id).collect();
        let shipments = self.shipments.get_many(&shipment_ids).await?;
        let totals = aggregate(&items, &shipments);

        if !self
            .manifests
            .write_totals(manifest_id, totals, self.now())
            .await?
        {
            return Err(ManifestError::ManifestNotFound { manifest_id });
        }

        metrics::record_totals_recomputed();
        debug!(
            manifest_id = %manifest_id,
            shipments = totals.shipment_count,
            packages = totals.package_count,
            weight_kg = totals.total_weight_kg,
            "[lm-01] totals recomputed"
        );
        Ok(totals)
    }
}
