//! # Shared Types Crate
//!
//! Identifiers, shipment statuses and storage errors shared by the manifest
//! engine, the event bus and the integration suite.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Tenant Scoping**: Every entity carries an `OrgId`; no lookup is valid
//!   without one.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
