//! # World Fixture
//!
//! One organization, two hubs and an engine wired to in-memory adapters,
//! publishing on a shared event bus.

use anyhow::{ensure, Context};
use lm_01_manifest_engine::adapters::{
    EventBusNotifier, InMemoryManifestStore, InMemoryScanAuditLog, InMemoryShipmentStore,
    InMemoryTrackingLog,
};
use lm_01_manifest_engine::{
    EngineConfig, Manifest, ManifestApi, ManifestService, ManifestStatus, NewManifest,
    ScanOutcome, ScanRequest, Shipment, TransportDetails,
};
use shared_bus::InMemoryEventBus;
use shared_types::{HubId, ManifestId, OrgId};
use std::sync::Arc;

pub type Engine = ManifestService<
    InMemoryManifestStore,
    InMemoryShipmentStore,
    InMemoryTrackingLog,
    InMemoryScanAuditLog,
>;

pub struct World {
    pub engine: Arc<Engine>,
    pub manifests: Arc<InMemoryManifestStore>,
    pub shipments: Arc<InMemoryShipmentStore>,
    pub tracking: Arc<InMemoryTrackingLog>,
    pub audit: Arc<InMemoryScanAuditLog>,
    pub bus: Arc<InMemoryEventBus>,
    pub org: OrgId,
    pub origin: HubId,
    pub destination: HubId,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        manifest_telemetry::try_init_for_tests();

        let manifests = Arc::new(InMemoryManifestStore::new());
        let shipments = Arc::new(InMemoryShipmentStore::new());
        let tracking = Arc::new(InMemoryTrackingLog::new());
        let audit = Arc::new(InMemoryScanAuditLog::new());
        let bus = Arc::new(InMemoryEventBus::new());

        let engine = ManifestService::new(
            config,
            Arc::clone(&manifests),
            Arc::clone(&shipments),
            Arc::clone(&tracking),
            Arc::clone(&audit),
        )
        .with_notifier(Arc::new(EventBusNotifier::new(Arc::clone(&bus))));

        Self {
            engine: Arc::new(engine),
            manifests,
            shipments,
            tracking,
            audit,
            bus,
            org: OrgId::new(),
            origin: HubId::new(),
            destination: HubId::new(),
        }
    }

    /// An OPEN air manifest from `origin` to `destination`.
    pub async fn open_manifest(&self) -> anyhow::Result<Manifest> {
        let draft = NewManifest::new(
            TransportDetails::air("AI101"),
            self.origin,
            self.destination,
        )
        .with_status(ManifestStatus::Open);
        let manifest = self
            .engine
            .create_manifest(self.org, draft)
            .await
            .context("create manifest")?;
        ensure!(manifest.status == ManifestStatus::Open, "manifest not open");
        Ok(manifest)
    }

    /// Book a shipment bound for the world's destination hub.
    pub fn book(&self, awb: &str, packages: u32, kg: f64) -> Shipment {
        self.book_to(awb, self.destination, packages, kg)
    }

    pub fn book_to(&self, awb: &str, destination: HubId, packages: u32, kg: f64) -> Shipment {
        let shipment = Shipment::new(self.org, awb, self.origin, destination)
            .with_packages(packages, kg)
            .with_parties("Sender Co", "Receiver Co");
        self.shipments.insert(shipment.clone());
        shipment
    }

    pub async fn scan(&self, manifest_id: ManifestId, token: &str) -> anyhow::Result<ScanOutcome> {
        let outcome = self
            .engine
            .ingest_scan(ScanRequest::new(self.org, manifest_id, token))
            .await
            .with_context(|| format!("scan {token}"))?;
        Ok(outcome)
    }

    /// Walk the manifest through `path`, one transition at a time.
    pub async fn advance(
        &self,
        manifest_id: ManifestId,
        path: &[ManifestStatus],
    ) -> anyhow::Result<Manifest> {
        let mut current = self.engine.get_manifest(self.org, manifest_id).await?;
        for target in path {
            current = self
                .engine
                .transition_status(self.org, manifest_id, *target, None)
                .await
                .with_context(|| format!("transition to {target}"))?;
        }
        Ok(current)
    }
}
