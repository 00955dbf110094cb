//! # Shared Bus - Event Bus for Logistics Events
//!
//! Carries manifest lifecycle, membership and tracking events from the
//! manifest engine to any interested consumer (tracking timeline, dashboards,
//! notification workers).
//!
//! ## Choreography
//!
//! ```text
//! ┌──────────────────┐                    ┌──────────────────┐
//! │ Manifest Engine  │                    │ Tracking Consumer│
//! │                  │    publish()       │                  │
//! │                  │ ──────┐            │                  │
//! └──────────────────┘       │            └──────────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐          │
//!                      │  Event Bus   │          │
//!                      │              │ ─────────┘
//!                      └──────────────┘  subscribe()
//! ```
//!
//! The bus is best-effort: events published with no subscriber are dropped.
//! Durable records (tracking log, scan audit) live in the engine's stores.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, LogisticsEvent, ShipmentTracked};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
