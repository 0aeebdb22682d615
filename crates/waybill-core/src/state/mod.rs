//! State management for shipping orders.
//!
//! This module provides the lifecycle rules and the state machine that
//! applies them, ensuring every status change is validated against the
//! forward path and persisted atomically per order.

pub mod order;
pub mod transition;

pub use order::{OrderStateError, OrderStateMachine};
pub use transition::{validate_transition, TransitionContext, TransitionError};
