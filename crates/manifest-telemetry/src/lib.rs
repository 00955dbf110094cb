//! # Manifest Telemetry
//!
//! Structured logging for the manifest engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use manifest_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // engine code logs through `tracing` from here on
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LM_SERVICE_NAME` | `manifest-engine` | Service name on every line |
//! | `LM_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `LM_JSON_LOGS` | `false` | JSON output (defaults to true in containers) |
//! | `LM_CONSOLE_OUTPUT` | `true` | Disable to keep only the filter |
//! | `LM_ENVIRONMENT` | `development` | Deployment environment label |

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global tracing subscriber.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    tracing_setup::init_tracing(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Install the subscriber if none is installed yet.
///
/// Test binaries call this from many tests; only the first call wins.
pub fn try_init_for_tests() {
    let _ = tracing_setup::init_tracing(&TelemetryConfig::for_tests());
}

/// Guard that keeps telemetry active. Dropping it logs shutdown.
pub struct TelemetryGuard {
    service_name: String,
}

impl TelemetryGuard {
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Convenience macro for creating a span with component context.
#[macro_export]
macro_rules! component_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
