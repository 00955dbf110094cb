//! # Manifest Engine Metrics
//!
//! Prometheus metrics for scan ingestion and manifest lifecycle.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! lm-01-manifest-engine = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `manifest_scans_total` - Counter of scan attempts (by classification)
//! - `manifest_transitions_total` - Counter of committed status changes (by from, to)
//! - `manifest_totals_recomputed_total` - Counter of totals recomputations
//! - `manifest_tracking_events_emitted_total` - Counter of newly recorded tracking events

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Scan attempts, labeled by classification
    pub static ref SCANS: IntCounterVec = register_int_counter_vec!(
        "manifest_scans_total",
        "Total number of scan attempts",
        &["classification"]
    )
    .expect("Failed to create SCANS metric");

    /// Committed manifest status transitions
    pub static ref TRANSITIONS: IntCounterVec = register_int_counter_vec!(
        "manifest_transitions_total",
        "Total number of manifest status transitions",
        &["from", "to"]
    )
    .expect("Failed to create TRANSITIONS metric");

    /// Totals recomputations
    pub static ref TOTALS_RECOMPUTED: IntCounter = register_int_counter!(
        "manifest_totals_recomputed_total",
        "Total number of manifest totals recomputations"
    )
    .expect("Failed to create TOTALS_RECOMPUTED metric");

    /// Tracking events recorded for the first time
    pub static ref TRACKING_EVENTS: IntCounter = register_int_counter!(
        "manifest_tracking_events_emitted_total",
        "Total number of tracking events emitted"
    )
    .expect("Failed to create TRACKING_EVENTS metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a scan attempt
#[cfg(feature = "metrics")]
pub fn record_scan(classification: &str) {
    SCANS.with_label_values(&[classification]).inc();
}

/// Record a committed transition
#[cfg(feature = "metrics")]
pub fn record_transition(from: &str, to: &str) {
    TRANSITIONS.with_label_values(&[from, to]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_totals_recomputed() {
    TOTALS_RECOMPUTED.inc();
}

/// Record newly emitted tracking events
#[cfg(feature = "metrics")]
pub fn record_tracking_events(count: u64) {
    TRACKING_EVENTS.inc_by(count);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_scan(_classification: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_transition(_from: &str, _to: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_totals_recomputed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_tracking_events(_count: u64) {}
