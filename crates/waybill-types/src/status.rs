//! Lifecycle status types for shipping orders.
//!
//! This module defines the closed set of statuses an order moves through,
//! their canonical display ordering, and the strictly linear forward chain
//! used by the transition rules. Display order is for presentation only and
//! does not by itself imply reachability.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a status name does not belong to the closed set.
///
/// Carries the offending input so callers can surface it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status: {0}")]
pub struct InvalidStatus(pub String);

/// Status of a shipping order in the back-office workflow.
///
/// The set is closed: every order carries exactly one of these values at all
/// times. `Delivered` and `Cancelled` are terminal and have no outgoing
/// transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ShippingOrderStatus {
	/// Order captured but not yet submitted for approval.
	Draft,
	/// Submitted and awaiting back-office approval.
	PendingForApproval,
	/// Approved by the back office.
	Approved,
	/// Shipping documents checked and verified.
	DocsVerified,
	/// Goods physically received into the warehouse.
	EntryInWarehouse,
	/// Packed and cleared, ready to leave the warehouse.
	ReadyToExport,
	/// On the way to the destination.
	InTransit,
	/// Received by the consignee. Terminal.
	Delivered,
	/// Abandoned before delivery. Terminal.
	Cancelled,
}

impl ShippingOrderStatus {
	/// All statuses in canonical display order.
	pub const ALL: [ShippingOrderStatus; 9] = [
		ShippingOrderStatus::Draft,
		ShippingOrderStatus::PendingForApproval,
		ShippingOrderStatus::Approved,
		ShippingOrderStatus::DocsVerified,
		ShippingOrderStatus::EntryInWarehouse,
		ShippingOrderStatus::ReadyToExport,
		ShippingOrderStatus::InTransit,
		ShippingOrderStatus::Delivered,
		ShippingOrderStatus::Cancelled,
	];

	/// Returns the immediate successor in the linear forward chain.
	///
	/// `Delivered` has no successor; `Cancelled` sits outside the chain and
	/// is reached only through the cancellation side-exit.
	pub fn successor(&self) -> Option<ShippingOrderStatus> {
		match self {
			ShippingOrderStatus::Draft => Some(ShippingOrderStatus::PendingForApproval),
			ShippingOrderStatus::PendingForApproval => Some(ShippingOrderStatus::Approved),
			ShippingOrderStatus::Approved => Some(ShippingOrderStatus::DocsVerified),
			ShippingOrderStatus::DocsVerified => Some(ShippingOrderStatus::EntryInWarehouse),
			ShippingOrderStatus::EntryInWarehouse => Some(ShippingOrderStatus::ReadyToExport),
			ShippingOrderStatus::ReadyToExport => Some(ShippingOrderStatus::InTransit),
			ShippingOrderStatus::InTransit => Some(ShippingOrderStatus::Delivered),
			ShippingOrderStatus::Delivered | ShippingOrderStatus::Cancelled => None,
		}
	}

	/// Returns true for statuses with no legal outgoing transition.
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			ShippingOrderStatus::Delivered | ShippingOrderStatus::Cancelled
		)
	}

	/// Returns the wire name of the status (camelCase, matching serde).
	pub fn as_str(&self) -> &'static str {
		match self {
			ShippingOrderStatus::Draft => "draft",
			ShippingOrderStatus::PendingForApproval => "pendingForApproval",
			ShippingOrderStatus::Approved => "approved",
			ShippingOrderStatus::DocsVerified => "docsVerified",
			ShippingOrderStatus::EntryInWarehouse => "entryInWarehouse",
			ShippingOrderStatus::ReadyToExport => "readyToExport",
			ShippingOrderStatus::InTransit => "inTransit",
			ShippingOrderStatus::Delivered => "delivered",
			ShippingOrderStatus::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for ShippingOrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for ShippingOrderStatus {
	type Err = InvalidStatus;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"draft" => Ok(ShippingOrderStatus::Draft),
			"pendingForApproval" => Ok(ShippingOrderStatus::PendingForApproval),
			"approved" => Ok(ShippingOrderStatus::Approved),
			"docsVerified" => Ok(ShippingOrderStatus::DocsVerified),
			"entryInWarehouse" => Ok(ShippingOrderStatus::EntryInWarehouse),
			"readyToExport" => Ok(ShippingOrderStatus::ReadyToExport),
			"inTransit" => Ok(ShippingOrderStatus::InTransit),
			"delivered" => Ok(ShippingOrderStatus::Delivered),
			"cancelled" => Ok(ShippingOrderStatus::Cancelled),
			other => Err(InvalidStatus(other.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_round_trip() {
		for status in ShippingOrderStatus::ALL {
			let parsed: ShippingOrderStatus = status.as_str().parse().unwrap();
			assert_eq!(parsed, status);
		}
	}

	#[test]
	fn test_parse_rejects_unknown_name() {
		let err = "shipped".parse::<ShippingOrderStatus>().unwrap_err();
		assert_eq!(err, InvalidStatus("shipped".to_string()));
		// Parsing is exact-match; casing matters.
		assert!("Draft".parse::<ShippingOrderStatus>().is_err());
	}

	#[test]
	fn test_successor_chain_is_linear() {
		let mut current = ShippingOrderStatus::Draft;
		let mut visited = vec![current];
		while let Some(next) = current.successor() {
			visited.push(next);
			current = next;
		}
		assert_eq!(current, ShippingOrderStatus::Delivered);
		// The forward chain covers everything except Cancelled.
		assert_eq!(visited.len(), 8);
		assert!(!visited.contains(&ShippingOrderStatus::Cancelled));
	}

	#[test]
	fn test_cancelled_is_nobodys_successor() {
		for status in ShippingOrderStatus::ALL {
			assert_ne!(status.successor(), Some(ShippingOrderStatus::Cancelled));
		}
	}

	#[test]
	fn test_terminal_statuses() {
		assert!(ShippingOrderStatus::Delivered.is_terminal());
		assert!(ShippingOrderStatus::Cancelled.is_terminal());
		for status in ShippingOrderStatus::ALL {
			if !status.is_terminal() {
				assert!(status.successor().is_some());
			}
		}
	}

	#[test]
	fn test_serde_uses_camel_case() {
		let json = serde_json::to_string(&ShippingOrderStatus::PendingForApproval).unwrap();
		assert_eq!(json, "\"pendingForApproval\"");
		let back: ShippingOrderStatus = serde_json::from_str("\"entryInWarehouse\"").unwrap();
		assert_eq!(back, ShippingOrderStatus::EntryInWarehouse);
	}
}
