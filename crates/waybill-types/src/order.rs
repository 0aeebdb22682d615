//! Shipping order aggregate types.
//!
//! This module defines the order aggregate persisted by the repository, the
//! append-only transition history it carries, and the read-only snapshot
//! returned to callers of the workflow operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ShippingOrderStatus;

/// A shipping order moving through the back-office lifecycle.
///
/// The aggregate is mutated exclusively through validated transition
/// requests; `status` is never assigned directly by callers. `history` is
/// the audit trail: append-only, never truncated or reordered, with exactly
/// one record appended per status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingOrder {
	/// Unique identifier for this order. Immutable once created.
	pub id: String,
	/// Current lifecycle status.
	pub status: ShippingOrderStatus,
	/// Optimistic concurrency stamp, incremented on every persisted write.
	pub version: u64,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was last updated.
	pub updated_at: DateTime<Utc>,
	/// Identifier of the actor who created the order.
	pub creator_id: String,
	/// Branch office the order belongs to.
	pub branch: String,
	/// Customer the shipment is for.
	pub customer: String,
	/// Commodity description of the goods.
	pub commodity: String,
	/// Agreed freight charge for the shipment.
	pub freight_charge: Decimal,
	/// ISO currency code of the freight charge.
	pub currency: String,
	/// Whether shipping documents have been attached. Gates `DocsVerified`.
	#[serde(default)]
	pub documents_attached: bool,
	/// Warehouse receipt, if recorded. Gates `EntryInWarehouse`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub warehouse_entry: Option<WarehouseEntry>,
	/// Append-only log of every status change applied to this order.
	#[serde(default)]
	pub history: Vec<TransitionRecord>,
}

/// Descriptive payload supplied when creating an order.
///
/// None of these fields participate in the state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
	/// Branch office the order belongs to.
	pub branch: String,
	/// Customer the shipment is for.
	pub customer: String,
	/// Commodity description of the goods.
	pub commodity: String,
	/// Agreed freight charge for the shipment.
	pub freight_charge: Decimal,
	/// ISO currency code of the freight charge.
	pub currency: String,
}

/// Record of goods being received into the warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseEntry {
	/// Warehouse location or bay the goods were received at.
	pub location: String,
	/// Timestamp when the entry was recorded.
	pub recorded_at: DateTime<Utc>,
}

/// One entry of the order's audit trail.
///
/// Captures a single applied transition together with the identity that
/// requested it. Records are immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
	/// Status the order left.
	pub from: ShippingOrderStatus,
	/// Status the order entered.
	pub to: ShippingOrderStatus,
	/// Timestamp when the transition was applied.
	pub at: DateTime<Utc>,
	/// Identifier of the acting user.
	pub actor_id: String,
	/// Role of the acting user at the time of the transition.
	pub actor_role: String,
}

/// Read-only view of an order returned by workflow operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSnapshot {
	/// Unique identifier for this order.
	pub id: String,
	/// Current lifecycle status.
	pub status: ShippingOrderStatus,
	/// Optimistic concurrency stamp at the time of the snapshot.
	pub version: u64,
	/// Timestamp when this order was created.
	#[serde(rename = "createdAt")]
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was last updated.
	#[serde(rename = "updatedAt")]
	pub updated_at: DateTime<Utc>,
	/// Identifier of the actor who created the order.
	#[serde(rename = "creatorId")]
	pub creator_id: String,
	/// Branch office the order belongs to.
	pub branch: String,
	/// Customer the shipment is for.
	pub customer: String,
	/// Commodity description of the goods.
	pub commodity: String,
	/// Agreed freight charge for the shipment.
	#[serde(rename = "freightCharge")]
	pub freight_charge: Decimal,
	/// ISO currency code of the freight charge.
	pub currency: String,
	/// Whether shipping documents have been attached.
	#[serde(rename = "documentsAttached")]
	pub documents_attached: bool,
	/// Warehouse receipt, if recorded.
	#[serde(rename = "warehouseEntry", skip_serializing_if = "Option::is_none")]
	pub warehouse_entry: Option<WarehouseEntry>,
	/// Append-only log of every status change applied to this order.
	pub history: Vec<TransitionRecord>,
}

impl ShippingOrder {
	/// Creates a new order in `Draft` with an empty history.
	pub fn new(id: String, creator_id: String, details: OrderDetails) -> Self {
		let now = Utc::now();
		Self {
			id,
			status: ShippingOrderStatus::Draft,
			version: 0,
			created_at: now,
			updated_at: now,
			creator_id,
			branch: details.branch,
			customer: details.customer,
			commodity: details.commodity,
			freight_charge: details.freight_charge,
			currency: details.currency,
			documents_attached: false,
			warehouse_entry: None,
			history: Vec::new(),
		}
	}

	/// Returns true once the order has reached a terminal status.
	///
	/// Terminal orders are read-only: no transition or payload mutation is
	/// accepted for them.
	pub fn is_terminal(&self) -> bool {
		self.status.is_terminal()
	}

	/// Builds the read-only snapshot of this order.
	pub fn snapshot(&self) -> OrderSnapshot {
		OrderSnapshot {
			id: self.id.clone(),
			status: self.status,
			version: self.version,
			created_at: self.created_at,
			updated_at: self.updated_at,
			creator_id: self.creator_id.clone(),
			branch: self.branch.clone(),
			customer: self.customer.clone(),
			commodity: self.commodity.clone(),
			freight_charge: self.freight_charge,
			currency: self.currency.clone(),
			documents_attached: self.documents_attached,
			warehouse_entry: self.warehouse_entry.clone(),
			history: self.history.clone(),
		}
	}
}

impl From<&ShippingOrder> for OrderSnapshot {
	fn from(order: &ShippingOrder) -> Self {
		order.snapshot()
	}
}

/// Trait for records carrying an optimistic concurrency stamp.
///
/// The repository uses the stamp to reject writes computed against a stale
/// copy of the record.
pub trait Versioned {
	/// Returns the record's current version.
	fn version(&self) -> u64;
}

impl Versioned for ShippingOrder {
	fn version(&self) -> u64 {
		self.version
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal::Decimal;

	fn details() -> OrderDetails {
		OrderDetails {
			branch: "HQ".to_string(),
			customer: "Acme Trading".to_string(),
			commodity: "machine parts".to_string(),
			freight_charge: Decimal::new(125_000, 2),
			currency: "USD".to_string(),
		}
	}

	#[test]
	fn test_new_order_starts_in_draft() {
		let order = ShippingOrder::new("ord-1".to_string(), "u-1".to_string(), details());
		assert_eq!(order.status, ShippingOrderStatus::Draft);
		assert_eq!(order.version, 0);
		assert!(order.history.is_empty());
		assert!(!order.documents_attached);
		assert!(order.warehouse_entry.is_none());
		assert_eq!(order.created_at, order.updated_at);
	}

	#[test]
	fn test_snapshot_mirrors_order() {
		let mut order = ShippingOrder::new("ord-2".to_string(), "u-1".to_string(), details());
		order.documents_attached = true;
		let snapshot = order.snapshot();
		assert_eq!(snapshot.id, "ord-2");
		assert_eq!(snapshot.status, ShippingOrderStatus::Draft);
		assert!(snapshot.documents_attached);
		assert_eq!(snapshot.history, order.history);
	}

	#[test]
	fn test_snapshot_serializes_camel_case() {
		let order = ShippingOrder::new("ord-3".to_string(), "u-9".to_string(), details());
		let json = serde_json::to_value(order.snapshot()).unwrap();
		assert!(json.get("createdAt").is_some());
		assert!(json.get("creatorId").is_some());
		assert!(json.get("freightCharge").is_some());
		// Unset warehouse entry is omitted, not null.
		assert!(json.get("warehouseEntry").is_none());
	}
}
