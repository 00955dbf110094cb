//! Structured logging macros.
//!
//! Every line carries a `component` field so log pipelines can split engine
//! output by concern:
//! - `component`: scan, lifecycle, totals, store
//! - `org_id` / `manifest_id`: tenant and manifest correlation
//! - Additional context fields

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a manifest-scoped event with standard fields.
#[macro_export]
macro_rules! log_manifest_event {
    ($level:ident, $component:expr, $msg:expr, $org_id:expr, $manifest_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            org_id = %$org_id,
            manifest_id = %$manifest_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a scan attempt with standard fields.
#[macro_export]
macro_rules! log_scan_event {
    ($level:ident, $msg:expr, $manifest_id:expr, $classification:expr, $token:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = "scan",
            manifest_id = %$manifest_id,
            classification = %$classification,
            token = %$token,
            $($($field)*,)?
            $msg
        )
    };
}
