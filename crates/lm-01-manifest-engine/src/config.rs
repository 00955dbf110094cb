//! Engine configuration
//!
//! # Config File Format
//!
//! ```toml
//! [eligibility]
//! statuses = ["CREATED", "PICKED_UP", "RECEIVED_AT_ORIGIN_HUB"]
//! validate_destination = true
//! validate_status = true
//!
//! [numbering]
//! prefix = "MNF"
//!
//! [audit]
//! scan_log_limit = 100
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use crate::domain::{ValidationFlags, DEFAULT_ELIGIBLE_STATUSES};
use serde::Deserialize;
use shared_types::ShipmentStatus;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_MANIFEST_PREFIX: &str = "MNF";
pub const DEFAULT_SCAN_LOG_LIMIT: usize = 100;

/// Errors that can occur during config loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables of the manifest engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Shipment statuses a scan may attach from.
    pub eligible_statuses: Vec<ShipmentStatus>,
    /// Used when a scan request carries no flags of its own.
    pub validate_destination: bool,
    pub validate_status: bool,
    /// Leading part of generated manifest numbers.
    pub manifest_number_prefix: String,
    /// Maximum records returned by `scan_logs`.
    pub scan_log_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            eligible_statuses: DEFAULT_ELIGIBLE_STATUSES.to_vec(),
            validate_destination: true,
            validate_status: true,
            manifest_number_prefix: DEFAULT_MANIFEST_PREFIX.to_string(),
            scan_log_limit: DEFAULT_SCAN_LOG_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    eligibility: EligibilitySection,
    #[serde(default)]
    numbering: NumberingSection,
    #[serde(default)]
    audit: AuditSection,
}

#[derive(Debug, Deserialize, Default)]
struct EligibilitySection {
    statuses: Option<Vec<String>>,
    validate_destination: Option<bool>,
    validate_status: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct NumberingSection {
    prefix: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct AuditSection {
    scan_log_limit: Option<usize>,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let defaults = Self::default();

        let eligible_statuses = match file.eligibility.statuses {
            Some(names) => names
                .iter()
                .map(|name| {
                    name.parse::<ShipmentStatus>()
                        .map_err(|e| ConfigError::Invalid(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => defaults.eligible_statuses,
        };

        let config = Self {
            eligible_statuses,
            validate_destination: file
                .eligibility
                .validate_destination
                .unwrap_or(defaults.validate_destination),
            validate_status: file
                .eligibility
                .validate_status
                .unwrap_or(defaults.validate_status),
            manifest_number_prefix: file
                .numbering
                .prefix
                .map(|p| p.trim().to_ascii_uppercase())
                .unwrap_or(defaults.manifest_number_prefix),
            scan_log_limit: file
                .audit
                .scan_log_limit
                .unwrap_or(defaults.scan_log_limit),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.eligible_statuses.is_empty() {
            return Err(ConfigError::Invalid(
                "eligible status set must not be empty".to_string(),
            ));
        }
        if self.manifest_number_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "manifest number prefix must not be empty".to_string(),
            ));
        }
        if self.scan_log_limit == 0 {
            return Err(ConfigError::Invalid(
                "scan log limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Flags applied when a scan request does not override them.
    pub fn default_flags(&self) -> ValidationFlags {
        ValidationFlags {
            validate_destination: self.validate_destination,
            validate_status: self.validate_status,
        }
    }
}
