//! Core waybill engine that owns the assembled services.
//!
//! The engine is handed fully constructed backends by the builder and
//! exposes them to the service layer through accessors. Its run loop is
//! the audit trail: it subscribes to the event bus and logs every order
//! lifecycle event until shutdown.

pub mod event_bus;

use crate::board::BoardService;
use crate::state::OrderStateMachine;
use crate::utils::truncate_id;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;
use waybill_config::Config;
use waybill_identity::IdentityService;
use waybill_storage::StorageService;
use waybill_types::OrderEvent;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Service error: {0}")]
	Service(String),
}

/// Main engine that owns the order workflow services.
#[derive(Clone)]
pub struct WaybillEngine {
	/// Service configuration.
	pub(crate) config: Config,
	/// Storage service persisting orders.
	pub(crate) storage: Arc<StorageService>,
	/// Identity service resolving acting users.
	pub(crate) identity: Arc<IdentityService>,
	/// State machine applying order mutations.
	pub(crate) state_machine: Arc<OrderStateMachine>,
	/// Board projections over stored orders.
	pub(crate) board: Arc<BoardService>,
	/// Event bus for order lifecycle events.
	pub(crate) event_bus: event_bus::EventBus,
}

impl WaybillEngine {
	/// Creates a new engine around the given backends.
	pub fn new(
		config: Config,
		storage: Arc<StorageService>,
		identity: Arc<IdentityService>,
		event_bus: event_bus::EventBus,
	) -> Self {
		let state_machine = Arc::new(OrderStateMachine::new(
			storage.clone(),
			identity.clone(),
			event_bus.clone(),
		));
		let board = Arc::new(BoardService::new(state_machine.clone()));

		Self {
			config,
			storage,
			identity,
			state_machine,
			board,
			event_bus,
		}
	}

	/// Main execution loop: the audit trail.
	///
	/// Subscribes to the event bus and logs every lifecycle event with the
	/// office identity until ctrl-c. Events published before this method
	/// starts are not replayed.
	pub async fn run(&self) -> Result<(), EngineError> {
		let mut events = self.event_bus.subscribe();

		tracing::info!(
			office = %self.config.office.name,
			branch = %self.config.office.branch,
			"Engine started"
		);

		loop {
			tokio::select! {
				event = events.recv() => {
					match event {
						Ok(event) => self.log_event(&event),
						Err(RecvError::Lagged(missed)) => {
							tracing::warn!(missed, "Audit trail fell behind the event bus");
						}
						Err(RecvError::Closed) => break,
					}
				}

				// Shutdown signal
				signal = tokio::signal::ctrl_c() => {
					signal.map_err(|e| {
						EngineError::Service(format!("Failed to listen for shutdown: {}", e))
					})?;
					tracing::info!("Shutting down");
					break;
				}
			}
		}

		Ok(())
	}

	fn log_event(&self, event: &OrderEvent) {
		match event {
			OrderEvent::Created { order_id, actor_id, .. } => {
				tracing::info!(
					order_id = %truncate_id(order_id),
					actor_id = %actor_id,
					"Order created"
				);
			}
			OrderEvent::StatusChanged { order_id, from, to, actor_id, .. } => {
				tracing::info!(
					order_id = %truncate_id(order_id),
					from = %from,
					to = %to,
					actor_id = %actor_id,
					"Status changed"
				);
			}
			OrderEvent::DocumentsAttached { order_id, actor_id, .. } => {
				tracing::info!(
					order_id = %truncate_id(order_id),
					actor_id = %actor_id,
					"Documents attached"
				);
			}
			OrderEvent::WarehouseEntryRecorded { order_id, location, actor_id, .. } => {
				tracing::info!(
					order_id = %truncate_id(order_id),
					location = %location,
					actor_id = %actor_id,
					"Warehouse entry recorded"
				);
			}
		}
	}

	/// Returns a reference to the event bus.
	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}

	/// Returns a reference to the configuration.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Returns a reference to the storage service.
	pub fn storage(&self) -> &Arc<StorageService> {
		&self.storage
	}

	/// Returns a reference to the identity service.
	pub fn identity(&self) -> &Arc<IdentityService> {
		&self.identity
	}

	/// Returns a reference to the order state machine.
	pub fn state_machine(&self) -> &Arc<OrderStateMachine> {
		&self.state_machine
	}

	/// Returns a reference to the board service.
	pub fn board(&self) -> &Arc<BoardService> {
		&self.board
	}
}
