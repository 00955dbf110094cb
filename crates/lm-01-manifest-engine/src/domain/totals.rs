//! Totals aggregation
//!
//! Totals are always recomputed from the complete membership. Counters are
//! never incremented in place, so any number of recomputes in any order
//! converges on the sum over current membership.

use super::entities::{ManifestItem, ManifestTotals, Shipment};
use shared_types::ShipmentId;
use std::collections::HashMap;

/// Aggregate totals over the current items.
///
/// `shipment_count` counts items. Package and weight sums cover the items
/// whose shipment row is available; a missing row contributes nothing.
pub fn aggregate(items: &[ManifestItem], shipments: &[Shipment]) -> ManifestTotals {
    let by_id: HashMap<ShipmentId, &Shipment> = shipments.iter().map(|s| (s.id, s)).collect();

    let mut totals = ManifestTotals {
        shipment_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
        ..ManifestTotals::default()
    };

    for item in items {
        if let Some(shipment) = by_id.get(&item.shipment_id) {
            totals.package_count = totals.package_count.saturating_add(shipment.package_count);
            totals.total_weight_kg += shipment.weight_kg;
        }
    }

    totals.total_weight_kg = round_weight(totals.total_weight_kg);
    totals
}

/// Weights are kept to gram precision.
fn round_weight(kg: f64) -> f64 {
    (kg * 1000.0).round() / 1000.0
}
