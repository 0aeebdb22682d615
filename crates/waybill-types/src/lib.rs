//! Common types module for the waybill system.
//!
//! This module defines the core data types and structures used throughout
//! the shipping-order workflow. It provides a centralized location for
//! shared types to ensure consistency across all waybill components.

/// Actor identity types stamped onto transition history records.
pub mod actor;
/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Board and view projection types for grouping orders by status.
pub mod board;
/// Event types for inter-service communication.
pub mod events;
/// Shipping order aggregate, history records and snapshots.
pub mod order;
/// Registry trait for wiring named implementations to their factories.
pub mod registry;
/// Lifecycle status enum and its canonical ordering.
pub mod status;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use actor::*;
pub use api::*;
pub use board::*;
pub use events::*;
pub use order::*;
pub use registry::*;
pub use status::*;
pub use validation::*;
