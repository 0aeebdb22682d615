//! Board and view projection types.
//!
//! This module defines the named operational views of the status board and
//! the column structure a projection produces. Each view maps to a fixed
//! subset of statuses; the mappings are configuration baked into the code,
//! not user-editable data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::{OrderSnapshot, ShippingOrderStatus};

/// Error returned when a view name does not match any named view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view: {0}")]
pub struct UnknownView(pub String);

/// Named operational views over the status board.
///
/// Every view selects a fixed subset of statuses. `List` is the catch-all
/// view showing every status column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum BoardView {
	/// Orders being captured: Draft and PendingForApproval.
	Draft,
	/// Approval queue: PendingForApproval and Approved.
	Approval,
	/// Document verification queue: Approved and DocsVerified.
	Verification,
	/// Warehouse intake: DocsVerified and EntryInWarehouse.
	Warehouse,
	/// Export preparation: EntryInWarehouse and ReadyToExport.
	Transit,
	/// Completed deliveries: Delivered only.
	Delivery,
	/// Every status, in canonical order.
	List,
}

impl BoardView {
	/// All named views.
	pub const ALL: [BoardView; 7] = [
		BoardView::Draft,
		BoardView::Approval,
		BoardView::Verification,
		BoardView::Warehouse,
		BoardView::Transit,
		BoardView::Delivery,
		BoardView::List,
	];

	/// Returns the fixed status subset this view displays, in column order.
	pub fn statuses(&self) -> &'static [ShippingOrderStatus] {
		match self {
			BoardView::Draft => &[
				ShippingOrderStatus::Draft,
				ShippingOrderStatus::PendingForApproval,
			],
			BoardView::Approval => &[
				ShippingOrderStatus::PendingForApproval,
				ShippingOrderStatus::Approved,
			],
			BoardView::Verification => &[
				ShippingOrderStatus::Approved,
				ShippingOrderStatus::DocsVerified,
			],
			BoardView::Warehouse => &[
				ShippingOrderStatus::DocsVerified,
				ShippingOrderStatus::EntryInWarehouse,
			],
			BoardView::Transit => &[
				ShippingOrderStatus::EntryInWarehouse,
				ShippingOrderStatus::ReadyToExport,
			],
			BoardView::Delivery => &[ShippingOrderStatus::Delivered],
			BoardView::List => &ShippingOrderStatus::ALL,
		}
	}

	/// Returns the wire name of the view (camelCase, matching serde).
	pub fn as_str(&self) -> &'static str {
		match self {
			BoardView::Draft => "draft",
			BoardView::Approval => "approval",
			BoardView::Verification => "verification",
			BoardView::Warehouse => "warehouse",
			BoardView::Transit => "transit",
			BoardView::Delivery => "delivery",
			BoardView::List => "list",
		}
	}
}

impl fmt::Display for BoardView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for BoardView {
	type Err = UnknownView;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"draft" => Ok(BoardView::Draft),
			"approval" => Ok(BoardView::Approval),
			"verification" => Ok(BoardView::Verification),
			"warehouse" => Ok(BoardView::Warehouse),
			"transit" => Ok(BoardView::Transit),
			"delivery" => Ok(BoardView::Delivery),
			"list" => Ok(BoardView::List),
			other => Err(UnknownView(other.to_string())),
		}
	}
}

/// One display column of a projected board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardColumn {
	/// Status this column groups.
	pub status: ShippingOrderStatus,
	/// Orders currently in this status, ordered by creation time ascending.
	pub orders: Vec<OrderSnapshot>,
}

/// A projected board: one column per requested status.
///
/// Columns appear in the order the statuses were requested. A status with no
/// matching orders still gets a column with an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
	/// The named view this board was projected from, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub view: Option<BoardView>,
	/// Display columns in request order.
	pub columns: Vec<BoardColumn>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_view_parse_round_trip() {
		for view in BoardView::ALL {
			let parsed: BoardView = view.as_str().parse().unwrap();
			assert_eq!(parsed, view);
		}
	}

	#[test]
	fn test_unknown_view_is_rejected() {
		let err = "archive".parse::<BoardView>().unwrap_err();
		assert_eq!(err, UnknownView("archive".to_string()));
	}

	#[test]
	fn test_view_status_sets_are_fixed() {
		assert_eq!(
			BoardView::Approval.statuses(),
			&[
				ShippingOrderStatus::PendingForApproval,
				ShippingOrderStatus::Approved,
			]
		);
		assert_eq!(
			BoardView::Delivery.statuses(),
			&[ShippingOrderStatus::Delivered]
		);
		assert_eq!(BoardView::List.statuses().len(), 9);
	}

	#[test]
	fn test_every_view_selects_known_statuses() {
		for view in BoardView::ALL {
			assert!(!view.statuses().is_empty());
			for status in view.statuses() {
				assert!(ShippingOrderStatus::ALL.contains(status));
			}
		}
	}
}
