//! Cross-crate integration scenarios.

pub mod choreography;
pub mod concurrency;
pub mod config_file;
pub mod lifecycle;
pub mod scenario;
