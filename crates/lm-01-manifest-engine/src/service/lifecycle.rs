//! Manifest creation, status transitions and retirement
//!
//! A transition runs in three steps:
//!
//! 1. validate the edge against the adjacency table
//! 2. run the entry cascade (DEPARTED, ARRIVED) while the manifest still
//!    shows its old status
//! 3. compare-and-set the status
//!
//! A failure in step 2 leaves the status untouched, so the caller simply
//! retries. Tracking events are keyed per (manifest, shipment, code) and are
//! never emitted twice.

use super::ManifestService;
use crate::domain::{
    EngineEvent, EntryEffect, EventSource, Manifest, ManifestStatus, NewManifest, TrackingEvent,
};
use crate::error::{ManifestError, ManifestResult};
use crate::metrics;
use crate::ports::outbound::{
    ManifestStore, RetireResult, ScanAuditSink, ShipmentStore, StatusCommit, TrackingEventSink,
};
use chrono::{DateTime, Datelike, Utc};
use manifest_telemetry::log_manifest_event;
use shared_types::{ManifestId, OrgId, ShipmentStatus, StaffId, Timestamp, TrackingEventCode};
use tracing::warn;

/// Calendar year (UTC) of a millisecond timestamp.
fn year_of(timestamp: Timestamp) -> i32 {
    i64::try_from(timestamp)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map_or(1970, |dt| dt.year())
}

impl<M, S, T, A> ManifestService<M, S, T, A>
where
    M: ManifestStore,
    S: ShipmentStore,
    T: TrackingEventSink,
    A: ScanAuditSink,
{
    pub(super) async fn create(
        &self,
        org_id: OrgId,
        draft: NewManifest,
    ) -> ManifestResult<Manifest> {
        draft
            .validate()
            .map_err(|reason| ManifestError::InvalidManifest { reason })?;

        let now = self.now();
        let year = year_of(now);
        let sequence = self.manifests.next_sequence(org_id, year).await?;
        let manifest_no = format!(
            "{}-{year}-{sequence:06}",
            self.config.manifest_number_prefix
        );

        let manifest = draft.into_manifest(org_id, manifest_no, now);
        self.manifests.insert(manifest.clone()).await?;

        log_manifest_event!(
            info,
            "lifecycle",
            "[lm-01] manifest created",
            org_id,
            manifest.id,
            manifest_no = %manifest.manifest_no,
            status = %manifest.status,
            transport = ?manifest.transport.transport_type()
        );
        self.notify(EngineEvent::ManifestCreated {
            org_id,
            manifest_id: manifest.id,
            manifest_no: manifest.manifest_no.clone(),
        })
        .await;

        Ok(manifest)
    }

    pub(super) async fn transition(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        target: ManifestStatus,
        actor: Option<StaffId>,
    ) -> ManifestResult<Manifest> {
        let manifest = self.require_manifest(org_id, manifest_id).await?;
        let from = manifest.status;

        if !from.can_transition_to(target) {
            log_manifest_event!(
                info,
                "lifecycle",
                "[lm-01] transition rejected",
                org_id,
                manifest_id,
                from = %from,
                to = %target
            );
            return Err(ManifestError::invalid_transition(from, target));
        }

        let effect = target.entry_effect();
        if let EntryEffect::Cascade {
            event_code,
            shipment_status,
        } = effect
        {
            self.cascade(&manifest, event_code, shipment_status, actor)
                .await?;
        }

        let committed = match self
            .manifests
            .commit_status(org_id, manifest_id, from, target, actor, self.now())
            .await?
        {
            StatusCommit::Committed(committed) => committed,
            StatusCommit::Conflict(current) => {
                return Err(ManifestError::invalid_transition(current, target))
            }
            StatusCommit::ManifestMissing => {
                return Err(ManifestError::ManifestNotFound { manifest_id })
            }
        };
        metrics::record_transition(from.as_str(), target.as_str());

        let committed = if effect == EntryEffect::FinalizeTotals {
            let totals = self.recompute(manifest_id).await?;
            Manifest {
                totals,
                ..committed
            }
        } else {
            committed
        };

        log_manifest_event!(
            info,
            "lifecycle",
            "[lm-01] manifest status changed",
            org_id,
            manifest_id,
            from = %from,
            to = %target,
            actor = ?actor
        );
        self.notify(EngineEvent::StatusChanged {
            org_id,
            manifest_id,
            manifest_no: committed.manifest_no.clone(),
            from,
            to: target,
            actor,
        })
        .await;

        Ok(committed)
    }

    /// Advance every member shipment and record one tracking event each.
    async fn cascade(
        &self,
        manifest: &Manifest,
        event_code: TrackingEventCode,
        shipment_status: ShipmentStatus,
        actor: Option<StaffId>,
    ) -> ManifestResult<()> {
        let hub_id = match event_code {
            TrackingEventCode::Departed => manifest.origin_hub,
            TrackingEventCode::Arrived => manifest.destination_hub,
        };
        let items = self.manifests.items(manifest.id).await?;
        let mut emitted = 0u64;

        for item in &items {
            let now = self.now();
            let Some(shipment) = self
                .shipments
                .set_status(manifest.org_id, item.shipment_id, shipment_status, now)
                .await?
            else {
                warn!(
                    manifest_id = %manifest.id,
                    shipment_id = %item.shipment_id,
                    "[lm-01] member shipment missing during cascade"
                );
                continue;
            };

            let event = TrackingEvent {
                org_id: manifest.org_id,
                shipment_id: shipment.id,
                awb_number: shipment.awb_number,
                event_code,
                hub_id,
                actor,
                source: EventSource::System,
                manifest_id: manifest.id,
                manifest_no: manifest.manifest_no.clone(),
                occurred_at: now,
            };
            if self.tracking.record(event.clone()).await? {
                emitted += 1;
                self.notify(EngineEvent::ShipmentTracked(event)).await;
            }
        }

        metrics::record_tracking_events(emitted);
        log_manifest_event!(
            debug,
            "lifecycle",
            "[lm-01] cascade applied",
            manifest.org_id,
            manifest.id,
            event_code = %event_code,
            members = items.len(),
            emitted
        );
        Ok(())
    }

    pub(super) async fn retire(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        actor: Option<StaffId>,
    ) -> ManifestResult<Manifest> {
        let retired = match self.manifests.retire(org_id, manifest_id, self.now()).await? {
            RetireResult::Retired(manifest) => manifest,
            RetireResult::NotEditable(status) => {
                return Err(ManifestError::ManifestNotEditable {
                    manifest_id,
                    status,
                })
            }
            RetireResult::NotEmpty(members) => {
                return Err(ManifestError::ManifestNotEmpty {
                    manifest_id,
                    members,
                })
            }
            RetireResult::ManifestMissing => {
                return Err(ManifestError::ManifestNotFound { manifest_id })
            }
        };

        log_manifest_event!(
            info,
            "lifecycle",
            "[lm-01] manifest retired",
            org_id,
            manifest_id,
            actor = ?actor
        );
        self.notify(EngineEvent::ManifestRetired {
            org_id,
            manifest_id,
        })
        .await;

        Ok(retired)
    }
}
