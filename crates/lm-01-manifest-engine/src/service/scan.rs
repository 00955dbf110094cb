//! Scan ingestion and shipment removal
//!
//! ```text
//! raw token ─► parse ─► manifest ─► resolve ─► validate ─► member? ─► attach
//!                │          │          │           │          │         │
//!                ▼          ▼          ▼           ▼          ▼         ▼
//!          INVALID_TOKEN  NOT_FOUND/  NOT_FOUND  rejection  DUPLICATE  SUCCESS
//!                         CLOSED
//! ```
//!
//! Every attempt, whatever its classification, leaves exactly one audit
//! record. Storage failures are the exception: they surface as `Err` and
//! leave none.

use super::ManifestService;
use crate::domain::{
    parse_scan, EngineEvent, Manifest, ManifestItem, MembershipView, Rejection, RemovalOutcome,
    ScanAuditRecord, ScanClassification, ScanOutcome, ScanToken, Shipment,
};
use crate::error::{ManifestError, ManifestResult};
use crate::metrics;
use crate::ports::inbound::ScanRequest;
use crate::ports::outbound::{
    AttachResult, DetachResult, ManifestStore, ScanAuditSink, ShipmentStore, TrackingEventSink,
};
use manifest_telemetry::{log_manifest_event, log_scan_event};
use shared_types::{ManifestId, ManifestItemId, OrgId, ShipmentId, ShipmentStatus, StaffId};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use uuid::Uuid;

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.is_some_and(CancellationToken::is_cancelled)
}

fn cancelled(token: &ScanToken) -> ScanOutcome {
    ScanOutcome::new(
        ScanClassification::Cancelled,
        "Scan cancelled",
        token.raw.clone(),
    )
    .with_token(token.normalized.clone())
}

fn manifest_not_found(token: &ScanToken) -> ScanOutcome {
    ScanOutcome::new(
        ScanClassification::ManifestNotFound,
        "Manifest not found",
        token.raw.clone(),
    )
    .with_token(token.normalized.clone())
}

fn manifest_closed(token: &ScanToken, status: impl std::fmt::Display) -> ScanOutcome {
    ScanOutcome::new(
        ScanClassification::ManifestClosed,
        format!("Manifest is {status} and no longer accepts shipments"),
        token.raw.clone(),
    )
    .with_token(token.normalized.clone())
}

fn rejected(token: &ScanToken, shipment: Option<&Shipment>, rejection: Rejection) -> ScanOutcome {
    let mut outcome = ScanOutcome::new(
        rejection.classification(),
        rejection.message(),
        token.raw.clone(),
    )
    .with_token(token.normalized.clone());
    if let Some(shipment) = shipment {
        outcome = outcome.with_shipment(shipment);
    }
    match rejection {
        Rejection::WrongStatus { current } => outcome.current_status = Some(current),
        Rejection::AlreadyManifested { holding_manifest } => {
            outcome.holding_manifest_id = Some(holding_manifest)
        }
        Rejection::NotFound { .. } | Rejection::WrongDestination { .. } => {}
    }
    outcome
}

impl<M, S, T, A> ManifestService<M, S, T, A>
where
    M: ManifestStore,
    S: ShipmentStore,
    T: TrackingEventSink,
    A: ScanAuditSink,
{
    pub(super) async fn ingest(
        &self,
        request: ScanRequest,
        cancel: Option<&CancellationToken>,
    ) -> ManifestResult<ScanOutcome> {
        let outcome = match self.evaluate_scan(&request, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    manifest_id = %request.manifest_id,
                    org_id = %request.org_id,
                    error = %e,
                    "[lm-01] scan aborted by storage failure"
                );
                return Err(e);
            }
        };

        self.audit_scan(&request, &outcome).await?;
        metrics::record_scan(outcome.classification.as_str());
        Self::log_outcome(request.manifest_id, &outcome);
        Ok(outcome)
    }

    async fn evaluate_scan(
        &self,
        request: &ScanRequest,
        cancel: Option<&CancellationToken>,
    ) -> ManifestResult<ScanOutcome> {
        let token = match parse_scan(&request.raw_token) {
            Ok(token) => token,
            Err(rejection) => {
                return Ok(ScanOutcome::new(
                    ScanClassification::InvalidToken,
                    rejection.to_string(),
                    request.raw_token.clone(),
                ))
            }
        };

        if is_cancelled(cancel) {
            return Ok(cancelled(&token));
        }
        let Some(manifest) = self
            .manifests
            .get(request.org_id, request.manifest_id)
            .await?
        else {
            return Ok(manifest_not_found(&token));
        };
        if !manifest.is_editable() {
            return Ok(manifest_closed(&token, manifest.status));
        }

        if is_cancelled(cancel) {
            return Ok(cancelled(&token));
        }
        let candidates = self
            .shipments
            .resolve(request.org_id, &token.normalized)
            .await?;
        let shipment = match self.validator.resolve_single(candidates) {
            Ok(shipment) => shipment,
            Err(rejection) => return Ok(rejected(&token, None, rejection)),
        };

        if is_cancelled(cancel) {
            return Ok(cancelled(&token));
        }
        let existing = self.manifests.find_item(manifest.id, shipment.id).await?;
        let held_elsewhere = self
            .manifests
            .active_holder(request.org_id, shipment.id, manifest.id)
            .await?;
        let membership = MembershipView {
            held_elsewhere,
            already_member: existing.is_some(),
        };
        let flags = request
            .flags
            .unwrap_or_else(|| self.config.default_flags());
        if let Err(rejection) = self.validator.check(&manifest, &shipment, membership, flags) {
            return Ok(rejected(&token, Some(&shipment), rejection));
        }

        if let Some(item) = existing {
            return self.complete_duplicate(&token, &manifest, shipment, item).await;
        }

        if is_cancelled(cancel) {
            return Ok(cancelled(&token));
        }
        let now = self.now();
        let item = ManifestItem {
            id: ManifestItemId::new(),
            org_id: request.org_id,
            manifest_id: manifest.id,
            shipment_id: shipment.id,
            scanned_by: request.actor,
            scan_source: request.source,
            prior_status: shipment.status,
            scanned_at: now,
        };

        // Committed from here on; cancellation no longer applies.
        match self.manifests.attach(item).await? {
            AttachResult::Attached(item) => self.complete_attach(&token, &manifest, shipment, item).await,
            AttachResult::Duplicate(item) => {
                self.complete_duplicate(&token, &manifest, shipment, item).await
            }
            AttachResult::ManifestLocked(status) => Ok(manifest_closed(&token, status)),
            AttachResult::ManifestMissing => Ok(manifest_not_found(&token)),
            AttachResult::HeldElsewhere(holding_manifest) => Ok(rejected(
                &token,
                Some(&shipment),
                Rejection::AlreadyManifested { holding_manifest },
            )),
        }
    }

    async fn complete_attach(
        &self,
        token: &ScanToken,
        manifest: &Manifest,
        shipment: Shipment,
        item: ManifestItem,
    ) -> ManifestResult<ScanOutcome> {
        let linked = self.link_member(manifest, shipment, &item).await?;
        let totals = self.recompute(manifest.id).await?;

        self.notify(EngineEvent::ShipmentAttached {
            org_id: manifest.org_id,
            manifest_id: manifest.id,
            shipment_id: linked.id,
            item_id: item.id,
        })
        .await;

        Ok(ScanOutcome::new(
            ScanClassification::Success,
            format!("Shipment {} added to manifest", linked.awb_number),
            token.raw.clone(),
        )
        .with_token(token.normalized.clone())
        .with_shipment(&linked)
        .with_item(item.id)
        .with_totals(totals))
    }

    /// The shipment is already a member. Heals a missing manifest reference
    /// left behind by an interrupted attach.
    async fn complete_duplicate(
        &self,
        token: &ScanToken,
        manifest: &Manifest,
        shipment: Shipment,
        item: ManifestItem,
    ) -> ManifestResult<ScanOutcome> {
        let (shipment, totals) = if shipment.manifest_id != Some(manifest.id) {
            let linked = self.link_member(manifest, shipment, &item).await?;
            (linked, self.recompute(manifest.id).await?)
        } else {
            let totals = self
                .manifests
                .get(manifest.org_id, manifest.id)
                .await?
                .map_or(manifest.totals, |fresh| fresh.totals);
            (shipment, totals)
        };

        Ok(ScanOutcome::new(
            ScanClassification::SuccessDuplicate,
            format!("Shipment {} is already on this manifest", shipment.awb_number),
            token.raw.clone(),
        )
        .with_token(token.normalized.clone())
        .with_shipment(&shipment)
        .with_item(item.id)
        .with_totals(totals))
    }

    /// Point the shipment at the manifest, then confirm the item survived.
    ///
    /// A removal can commit between the attach and this link; its revert
    /// would then be overwritten, so the revert is redone here.
    async fn link_member(
        &self,
        manifest: &Manifest,
        shipment: Shipment,
        item: &ManifestItem,
    ) -> ManifestResult<Shipment> {
        let org_id = manifest.org_id;
        let linked = self
            .shipments
            .link(
                org_id,
                shipment.id,
                Some(manifest.id),
                ShipmentStatus::LoadedForLinehaul,
                self.now(),
            )
            .await?
            .unwrap_or(shipment);
        if self.manifests.find_item(manifest.id, linked.id).await?.is_some() {
            return Ok(linked);
        }

        warn!(
            manifest_id = %manifest.id,
            shipment_id = %linked.id,
            "[lm-01] membership removed while linking, restoring shipment"
        );
        let holder = self
            .manifests
            .active_holder(org_id, linked.id, manifest.id)
            .await?;
        let restored = match holder {
            Some(holder) => {
                self.shipments
                    .link(
                        org_id,
                        linked.id,
                        Some(holder),
                        ShipmentStatus::LoadedForLinehaul,
                        self.now(),
                    )
                    .await?
            }
            None => {
                self.shipments
                    .unlink(org_id, linked.id, manifest.id, item.prior_status, self.now())
                    .await?
            }
        };
        Ok(restored.unwrap_or(linked))
    }

    async fn audit_scan(&self, request: &ScanRequest, outcome: &ScanOutcome) -> ManifestResult<()> {
        let classification = outcome.classification;
        let error_message = (!classification.is_success()
            && classification != ScanClassification::Cancelled)
            .then(|| outcome.message.clone());

        self.audit
            .append(ScanAuditRecord {
                id: Uuid::new_v4(),
                org_id: request.org_id,
                manifest_id: request.manifest_id,
                shipment_id: outcome.shipment_id,
                raw_token: request.raw_token.clone(),
                normalized_token: outcome.normalized_token.clone(),
                classification,
                scanned_by: request.actor,
                scan_source: request.source,
                error_message,
                created_at: self.now(),
            })
            .await?;
        Ok(())
    }

    fn log_outcome(manifest_id: ManifestId, outcome: &ScanOutcome) {
        let token = outcome.normalized_token.as_deref().unwrap_or("-");
        match outcome.classification {
            ScanClassification::Success => log_scan_event!(
                info,
                "[lm-01] ✅ shipment attached",
                manifest_id,
                outcome.classification,
                token
            ),
            ScanClassification::SuccessDuplicate | ScanClassification::Cancelled => {
                log_scan_event!(
                    debug,
                    "[lm-01] scan settled without change",
                    manifest_id,
                    outcome.classification,
                    token
                )
            }
            _ => log_scan_event!(
                info,
                "[lm-01] scan rejected",
                manifest_id,
                outcome.classification,
                token,
                reason = %outcome.message
            ),
        }
    }

    pub(super) async fn remove(
        &self,
        org_id: OrgId,
        manifest_id: ManifestId,
        shipment_id: ShipmentId,
        actor: Option<StaffId>,
    ) -> ManifestResult<RemovalOutcome> {
        let item = match self.manifests.detach(org_id, manifest_id, shipment_id).await? {
            DetachResult::Detached(item) => item,
            DetachResult::NotMember => return Ok(RemovalOutcome { removed: false }),
            DetachResult::ManifestLocked(status) => {
                return Err(ManifestError::ManifestNotEditable {
                    manifest_id,
                    status,
                })
            }
            DetachResult::ManifestMissing => {
                return Err(ManifestError::ManifestNotFound { manifest_id })
            }
        };

        // A scan still linking this item restores the shipment itself
        let reverted = self
            .shipments
            .unlink(org_id, shipment_id, manifest_id, item.prior_status, self.now())
            .await?
            .is_some();
        self.recompute(manifest_id).await?;

        self.notify(EngineEvent::ShipmentDetached {
            org_id,
            manifest_id,
            shipment_id,
        })
        .await;
        log_manifest_event!(
            info,
            "scan",
            "[lm-01] shipment removed from manifest",
            org_id,
            manifest_id,
            shipment_id = %shipment_id,
            restored_status = %item.prior_status,
            reverted,
            actor = ?actor
        );

        Ok(RemovalOutcome { removed: true })
    }
}
