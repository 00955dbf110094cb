//! # Manifest Engine Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Criterion benchmarks (token parsing, ingestion)
//! └── src/
//!     ├── support.rs    # World fixture: engine wired to the shared bus
//!     └── integration/  # Cross-crate scenarios
//!         ├── scenario.rs
//!         ├── lifecycle.rs
//!         ├── concurrency.rs
//!         ├── choreography.rs
//!         └── config_file.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p lm-tests
//!
//! # By category
//! cargo test -p lm-tests integration::concurrency::
//!
//! # Benchmarks
//! cargo bench -p lm-tests
//! ```

#![allow(dead_code)]

pub mod integration;
pub mod support;
