//! Core workflow engine for the waybill order system.
//!
//! This crate owns the shipping order lifecycle: the pure transition rules,
//! the order state machine that applies them atomically against storage,
//! board projections over the stored orders, and the engine/builder pair
//! that assembles the pluggable backends into a running instance.

pub mod board;
pub mod builder;
pub mod engine;
pub mod state;
pub mod utils;

pub use board::BoardService;
pub use builder::{BuilderError, WaybillBuilder, WaybillFactories};
pub use engine::{event_bus::EventBus, EngineError, WaybillEngine};
pub use state::{OrderStateError, OrderStateMachine, TransitionContext, TransitionError};
