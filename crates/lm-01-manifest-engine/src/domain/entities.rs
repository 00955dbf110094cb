//! Manifest engine entities

use super::outcome::ScanClassification;
use super::status::ManifestStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::{
    HubId, ManifestId, ManifestItemId, OrgId, ShipmentId, ShipmentStatus, StaffId, Timestamp,
    TrackingEventCode,
};
use uuid::Uuid;

/// Minimum flight number length accepted for AIR manifests
pub const MIN_FLIGHT_NUMBER_LEN: usize = 3;
/// Minimum vehicle number length accepted for TRUCK manifests
pub const MIN_VEHICLE_NUMBER_LEN: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportType {
    Air,
    Truck,
}

/// Transport-specific manifest metadata. AIR and TRUCK details are
/// mutually exclusive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transport_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportDetails {
    Air {
        flight_number: String,
        flight_date: Option<NaiveDate>,
        airline_code: Option<String>,
    },
    Truck {
        vehicle_number: String,
        driver_name: Option<String>,
        driver_phone: Option<String>,
    },
}

impl TransportDetails {
    pub fn air(flight_number: impl Into<String>) -> Self {
        TransportDetails::Air {
            flight_number: flight_number.into(),
            flight_date: None,
            airline_code: None,
        }
    }

    pub fn truck(vehicle_number: impl Into<String>) -> Self {
        TransportDetails::Truck {
            vehicle_number: vehicle_number.into(),
            driver_name: None,
            driver_phone: None,
        }
    }

    pub fn transport_type(&self) -> TransportType {
        match self {
            TransportDetails::Air { .. } => TransportType::Air,
            TransportDetails::Truck { .. } => TransportType::Truck,
        }
    }

    /// Flight or vehicle number.
    pub fn carrier_reference(&self) -> &str {
        match self {
            TransportDetails::Air { flight_number, .. } => flight_number,
            TransportDetails::Truck { vehicle_number, .. } => vehicle_number,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let reference = self.carrier_reference().trim();
        match self.transport_type() {
            TransportType::Air if reference.chars().count() < MIN_FLIGHT_NUMBER_LEN => Err(
                format!("Flight number must be at least {MIN_FLIGHT_NUMBER_LEN} characters"),
            ),
            TransportType::Truck if reference.chars().count() < MIN_VEHICLE_NUMBER_LEN => Err(
                format!("Vehicle number must be at least {MIN_VEHICLE_NUMBER_LEN} characters"),
            ),
            _ => Ok(()),
        }
    }
}

/// Derived manifest counters. Never written except by a full recompute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestTotals {
    pub shipment_count: u32,
    pub package_count: u32,
    pub total_weight_kg: f64,
}

/// A bundle of shipments moving together between two hubs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub id: ManifestId,
    pub org_id: OrgId,
    /// Human-readable number, unique per organization, assigned once.
    pub manifest_no: String,
    pub status: ManifestStatus,
    pub transport: TransportDetails,
    pub origin_hub: HubId,
    pub destination_hub: HubId,
    pub totals: ManifestTotals,
    pub notes: Option<String>,
    pub etd: Option<Timestamp>,
    pub eta: Option<Timestamp>,
    pub created_by: Option<StaffId>,
    pub closed_by: Option<StaffId>,
    pub reconciled_by: Option<StaffId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    pub departed_at: Option<Timestamp>,
    pub arrived_at: Option<Timestamp>,
    pub reconciled_at: Option<Timestamp>,
    pub retired_at: Option<Timestamp>,
}

impl Manifest {
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    pub fn is_retired(&self) -> bool {
        self.retired_at.is_some()
    }

    /// Move to `target`, stamping the timestamp that belongs to it.
    ///
    /// Does not consult the adjacency table; callers validate first.
    pub fn apply_status(&mut self, target: ManifestStatus, actor: Option<StaffId>, now: Timestamp) {
        self.status = target;
        self.updated_at = now;
        match target {
            ManifestStatus::Closed => {
                self.closed_at = Some(now);
                self.closed_by = actor;
            }
            ManifestStatus::Departed => self.departed_at = Some(now),
            ManifestStatus::Arrived => self.arrived_at = Some(now),
            ManifestStatus::Reconciled => {
                self.reconciled_at = Some(now);
                self.reconciled_by = actor;
            }
            ManifestStatus::Draft | ManifestStatus::Open | ManifestStatus::Building => {}
        }
    }
}

/// Input for creating a manifest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewManifest {
    pub transport: TransportDetails,
    pub origin_hub: HubId,
    pub destination_hub: HubId,
    #[serde(default)]
    pub initial_status: ManifestStatus,
    pub notes: Option<String>,
    pub etd: Option<Timestamp>,
    pub eta: Option<Timestamp>,
    pub created_by: Option<StaffId>,
}

impl NewManifest {
    pub fn new(transport: TransportDetails, origin_hub: HubId, destination_hub: HubId) -> Self {
        Self {
            transport,
            origin_hub,
            destination_hub,
            initial_status: ManifestStatus::Draft,
            notes: None,
            etd: None,
            eta: None,
            created_by: None,
        }
    }

    pub fn with_status(mut self, status: ManifestStatus) -> Self {
        self.initial_status = status;
        self
    }

    pub fn created_by(mut self, staff: StaffId) -> Self {
        self.created_by = Some(staff);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.origin_hub == self.destination_hub {
            return Err("Origin and destination hubs must be different".to_string());
        }
        if !self.initial_status.is_editable() {
            return Err(format!(
                "Manifest cannot be created in status {}",
                self.initial_status
            ));
        }
        if let (Some(etd), Some(eta)) = (self.etd, self.eta) {
            if eta < etd {
                return Err("ETA cannot precede ETD".to_string());
            }
        }
        self.transport.validate()
    }

    /// Materialize the manifest once the store has allocated its number.
    pub fn into_manifest(self, org_id: OrgId, manifest_no: String, now: Timestamp) -> Manifest {
        Manifest {
            id: ManifestId::new(),
            org_id,
            manifest_no,
            status: self.initial_status,
            transport: self.transport,
            origin_hub: self.origin_hub,
            destination_hub: self.destination_hub,
            totals: ManifestTotals::default(),
            notes: self.notes,
            etd: self.etd,
            eta: self.eta,
            created_by: self.created_by,
            closed_by: None,
            reconciled_by: None,
            created_at: now,
            updated_at: now,
            closed_at: None,
            departed_at: None,
            arrived_at: None,
            reconciled_at: None,
            retired_at: None,
        }
    }
}

/// Query filter for listing manifests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestFilter {
    /// Empty means any status.
    #[serde(default)]
    pub statuses: Vec<ManifestStatus>,
    pub transport_type: Option<TransportType>,
    pub origin_hub: Option<HubId>,
    pub destination_hub: Option<HubId>,
    /// Case-insensitive substring match on the manifest number.
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl ManifestFilter {
    pub fn matches(&self, manifest: &Manifest) -> bool {
        (self.statuses.is_empty() || self.statuses.contains(&manifest.status))
            && self
                .transport_type
                .map_or(true, |t| manifest.transport.transport_type() == t)
            && self.origin_hub.map_or(true, |h| manifest.origin_hub == h)
            && self.destination_hub.map_or(true, |h| manifest.destination_hub == h)
            && self.search.as_deref().map_or(true, |needle| {
                manifest
                    .manifest_no
                    .to_ascii_uppercase()
                    .contains(&needle.trim().to_ascii_uppercase())
            })
    }
}

/// How a scan reached the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanSource {
    Camera,
    #[default]
    Manual,
    BarcodeScanner,
}

/// Membership of one shipment in one manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestItem {
    pub id: ManifestItemId,
    pub org_id: OrgId,
    pub manifest_id: ManifestId,
    pub shipment_id: ShipmentId,
    pub scanned_by: Option<StaffId>,
    pub scan_source: ScanSource,
    /// Shipment status at attach time; restored on removal.
    pub prior_status: ShipmentStatus,
    pub scanned_at: Timestamp,
}

/// Shipment as seen by the manifest engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub org_id: OrgId,
    pub awb_number: String,
    pub status: ShipmentStatus,
    pub origin_hub: HubId,
    pub destination_hub: HubId,
    pub package_count: u32,
    pub weight_kg: f64,
    pub manifest_id: Option<ManifestId>,
    pub receiver_name: Option<String>,
    pub sender_name: Option<String>,
    pub updated_at: Timestamp,
}

impl Shipment {
    /// A freshly booked shipment with one package.
    pub fn new(
        org_id: OrgId,
        awb_number: impl Into<String>,
        origin_hub: HubId,
        destination_hub: HubId,
    ) -> Self {
        Self {
            id: ShipmentId::new(),
            org_id,
            awb_number: awb_number.into(),
            status: ShipmentStatus::Created,
            origin_hub,
            destination_hub,
            package_count: 1,
            weight_kg: 0.0,
            manifest_id: None,
            receiver_name: None,
            sender_name: None,
            updated_at: 0,
        }
    }

    pub fn with_packages(mut self, package_count: u32, weight_kg: f64) -> Self {
        self.package_count = package_count;
        self.weight_kg = weight_kg;
        self
    }

    pub fn with_status(mut self, status: ShipmentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_parties(mut self, sender: impl Into<String>, receiver: impl Into<String>) -> Self {
        self.sender_name = Some(sender.into());
        self.receiver_name = Some(receiver.into());
        self
    }
}

/// Immutable record of one scan attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanAuditRecord {
    pub id: Uuid,
    pub org_id: OrgId,
    pub manifest_id: ManifestId,
    pub shipment_id: Option<ShipmentId>,
    pub raw_token: String,
    pub normalized_token: Option<String>,
    pub classification: ScanClassification,
    pub scanned_by: Option<StaffId>,
    pub scan_source: ScanSource,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

/// Who produced a tracking event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSource {
    #[default]
    System,
    Operator,
}

/// Idempotency key of a tracking event.
pub type TrackingKey = (ManifestId, ShipmentId, TrackingEventCode);

/// Tracking record emitted for each member shipment on departure or arrival.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub org_id: OrgId,
    pub shipment_id: ShipmentId,
    pub awb_number: String,
    pub event_code: TrackingEventCode,
    pub hub_id: HubId,
    pub actor: Option<StaffId>,
    pub source: EventSource,
    pub manifest_id: ManifestId,
    pub manifest_no: String,
    pub occurred_at: Timestamp,
}

impl TrackingEvent {
    pub fn key(&self) -> TrackingKey {
        (self.manifest_id, self.shipment_id, self.event_code)
    }
}
