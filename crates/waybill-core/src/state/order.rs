//! Order state machine implementation.
//!
//! Applies the pure transition rules to stored orders with a check-then-act
//! guarantee: every mutation re-reads the order, validates against the live
//! status and runs under a per-order lock, so concurrent writers never
//! interleave. A competing writer is rejected with a conflict immediately
//! instead of waiting for the lock.

use crate::engine::event_bus::EventBus;
use crate::state::transition::{validate_transition, TransitionContext, TransitionError};
use crate::utils::truncate_id;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;
use uuid::Uuid;
use waybill_identity::{IdentityError, IdentityService};
use waybill_storage::{StorageError, StorageService, ORDERS_NAMESPACE};
use waybill_types::{
	OrderDetails, OrderEvent, OrderSnapshot, ShippingOrder, ShippingOrderStatus,
	TransitionRecord, WarehouseEntry,
};

/// Errors that can occur during order state management.
#[derive(Debug, Error)]
pub enum OrderStateError {
	/// Error from the order repository.
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	/// Error while resolving the acting user.
	#[error("Identity error: {0}")]
	Identity(#[from] IdentityError),
	/// The requested transition was rejected by the lifecycle rules.
	#[error(transparent)]
	Transition(#[from] TransitionError),
	/// The order does not exist.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// A concurrent update on the same order won the race.
	#[error("Conflict: {0}")]
	Conflict(String),
}

/// Manages order mutations and persistence.
///
/// All writes go through a per-order `tokio::sync::Mutex` held in a
/// [`DashMap`]; `try_lock` failure maps to [`OrderStateError::Conflict`]
/// without blocking. The storage layer's version check backs this up for
/// writers outside this process. Lock entries are never evicted; the order
/// count of a single office stays small.
pub struct OrderStateMachine {
	storage: Arc<StorageService>,
	identity: Arc<IdentityService>,
	event_bus: EventBus,
	locks: DashMap<String, Arc<Mutex<()>>>,
}

impl OrderStateMachine {
	pub fn new(
		storage: Arc<StorageService>,
		identity: Arc<IdentityService>,
		event_bus: EventBus,
	) -> Self {
		Self {
			storage,
			identity,
			event_bus,
			locks: DashMap::new(),
		}
	}

	/// Creates a new order in Draft on behalf of the resolved actor.
	#[instrument(skip_all, fields(actor_id = %actor_id))]
	pub async fn create_order(
		&self,
		details: OrderDetails,
		actor_id: &str,
	) -> Result<OrderSnapshot, OrderStateError> {
		let actor = self.identity.resolve(actor_id).await?;

		let id = Uuid::new_v4().to_string();
		let order = ShippingOrder::new(id, actor.id.clone(), details);
		self.save_order(&order).await?;

		tracing::info!(
			order_id = %truncate_id(&order.id),
			customer = %order.customer,
			"Order created"
		);
		self.event_bus
			.publish(OrderEvent::Created {
				order_id: order.id.clone(),
				actor_id: actor.id,
				at: order.created_at,
			})
			.ok();

		Ok(order.snapshot())
	}

	/// Moves an order to the requested status.
	///
	/// The target arrives as a wire name and is parsed before any other
	/// work. The whole check-then-act sequence runs under the per-order
	/// lock; a second writer that arrives mid-flight gets
	/// [`OrderStateError::Conflict`] immediately.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), target = %target))]
	pub async fn transition_order(
		&self,
		order_id: &str,
		target: &str,
		actor_id: &str,
	) -> Result<OrderSnapshot, OrderStateError> {
		let target: ShippingOrderStatus = target.parse().map_err(TransitionError::from)?;
		let actor = self.identity.resolve(actor_id).await?;

		let lock = self.order_lock(order_id);
		let _guard = lock
			.try_lock()
			.map_err(|_| self.conflict(order_id))?;

		let mut order = self.load_order(order_id).await?;

		let ctx = TransitionContext::from(&order);
		validate_transition(order.status, target, &ctx)?;

		let from = order.status;
		let now = Utc::now();
		order.status = target;
		order.history.push(TransitionRecord {
			from,
			to: target,
			at: now,
			actor_id: actor.id.clone(),
			actor_role: actor.role.clone(),
		});
		order.updated_at = now;
		order.version += 1;

		self.save_order(&order).await?;

		tracing::info!(
			from = %from,
			to = %target,
			actor_id = %actor.id,
			"Status changed"
		);
		self.event_bus
			.publish(OrderEvent::StatusChanged {
				order_id: order.id.clone(),
				from,
				to: target,
				actor_id: actor.id,
				at: now,
			})
			.ok();

		Ok(order.snapshot())
	}

	/// Marks the order's shipping documents as attached.
	///
	/// Opens the verification gate. Terminal orders reject the mutation.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id)))]
	pub async fn attach_documents(
		&self,
		order_id: &str,
		actor_id: &str,
	) -> Result<OrderSnapshot, OrderStateError> {
		let actor = self.identity.resolve(actor_id).await?;

		let lock = self.order_lock(order_id);
		let _guard = lock
			.try_lock()
			.map_err(|_| self.conflict(order_id))?;

		let mut order = self.load_order(order_id).await?;
		self.reject_terminal(&order)?;

		let now = Utc::now();
		order.documents_attached = true;
		order.updated_at = now;
		order.version += 1;

		self.save_order(&order).await?;

		tracing::info!(actor_id = %actor.id, "Documents attached");
		self.event_bus
			.publish(OrderEvent::DocumentsAttached {
				order_id: order.id.clone(),
				actor_id: actor.id,
				at: now,
			})
			.ok();

		Ok(order.snapshot())
	}

	/// Records the goods' arrival in the warehouse.
	///
	/// Opens the warehouse gate. Terminal orders reject the mutation.
	#[instrument(skip_all, fields(order_id = %truncate_id(order_id), location = %location))]
	pub async fn record_warehouse_entry(
		&self,
		order_id: &str,
		location: String,
		actor_id: &str,
	) -> Result<OrderSnapshot, OrderStateError> {
		let actor = self.identity.resolve(actor_id).await?;

		let lock = self.order_lock(order_id);
		let _guard = lock
			.try_lock()
			.map_err(|_| self.conflict(order_id))?;

		let mut order = self.load_order(order_id).await?;
		self.reject_terminal(&order)?;

		let now = Utc::now();
		order.warehouse_entry = Some(WarehouseEntry {
			location: location.clone(),
			recorded_at: now,
		});
		order.updated_at = now;
		order.version += 1;

		self.save_order(&order).await?;

		tracing::info!(actor_id = %actor.id, "Warehouse entry recorded");
		self.event_bus
			.publish(OrderEvent::WarehouseEntryRecorded {
				order_id: order.id.clone(),
				location,
				actor_id: actor.id,
				at: now,
			})
			.ok();

		Ok(order.snapshot())
	}

	/// Gets one order by id.
	pub async fn get_order(&self, order_id: &str) -> Result<OrderSnapshot, OrderStateError> {
		Ok(self.load_order(order_id).await?.snapshot())
	}

	/// Lists every stored order, oldest first.
	pub async fn list_orders(&self) -> Result<Vec<OrderSnapshot>, OrderStateError> {
		let mut orders: Vec<ShippingOrder> = self.storage.retrieve_all(ORDERS_NAMESPACE).await?;
		orders.sort_by(|a, b| {
			a.created_at
				.cmp(&b.created_at)
				.then_with(|| a.id.cmp(&b.id))
		});
		Ok(orders.iter().map(ShippingOrder::snapshot).collect())
	}

	/// Returns the per-order lock, creating it on first use.
	fn order_lock(&self, order_id: &str) -> Arc<Mutex<()>> {
		self.locks
			.entry(order_id.to_string())
			.or_insert_with(|| Arc::new(Mutex::new(())))
			.clone()
	}

	fn conflict(&self, order_id: &str) -> OrderStateError {
		OrderStateError::Conflict(format!(
			"another update is in progress for order {}",
			order_id
		))
	}

	fn reject_terminal(&self, order: &ShippingOrder) -> Result<(), OrderStateError> {
		if order.is_terminal() {
			return Err(TransitionError::TerminalState {
				status: order.status,
			}
			.into());
		}
		Ok(())
	}

	/// Loads an order, mapping a missing record to [`OrderStateError::NotFound`].
	async fn load_order(&self, order_id: &str) -> Result<ShippingOrder, OrderStateError> {
		match self.storage.retrieve(ORDERS_NAMESPACE, order_id).await {
			Ok(order) => Ok(order),
			Err(StorageError::NotFound) => Err(OrderStateError::NotFound(order_id.to_string())),
			Err(e) => Err(e.into()),
		}
	}

	/// Persists an order, mapping a stale-version write to Conflict.
	async fn save_order(&self, order: &ShippingOrder) -> Result<(), OrderStateError> {
		match self.storage.save_order(order).await {
			Ok(()) => Ok(()),
			Err(StorageError::VersionConflict { .. }) => Err(OrderStateError::Conflict(format!(
				"order {} was modified concurrently",
				order.id
			))),
			Err(e) => Err(e.into()),
		}
	}
}
