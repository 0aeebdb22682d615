//! Event types for inter-service communication.
//!
//! This module defines the events published on the engine's event bus after
//! a mutation has been persisted. Events are fire-and-forget notifications
//! for observers such as the audit log; publishing never gates or fails the
//! mutation that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ShippingOrderStatus;

/// Events emitted by the order workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEvent {
	/// A new order has been created in Draft.
	Created {
		order_id: String,
		actor_id: String,
		at: DateTime<Utc>,
	},
	/// An order moved to a new status via a validated transition.
	StatusChanged {
		order_id: String,
		from: ShippingOrderStatus,
		to: ShippingOrderStatus,
		actor_id: String,
		at: DateTime<Utc>,
	},
	/// Shipping documents were attached to an order.
	DocumentsAttached {
		order_id: String,
		actor_id: String,
		at: DateTime<Utc>,
	},
	/// Goods were received into the warehouse for an order.
	WarehouseEntryRecorded {
		order_id: String,
		location: String,
		actor_id: String,
		at: DateTime<Utc>,
	},
}

impl OrderEvent {
	/// Returns the id of the order this event concerns.
	pub fn order_id(&self) -> &str {
		match self {
			OrderEvent::Created { order_id, .. }
			| OrderEvent::StatusChanged { order_id, .. }
			| OrderEvent::DocumentsAttached { order_id, .. }
			| OrderEvent::WarehouseEntryRecorded { order_id, .. } => order_id,
		}
	}
}
