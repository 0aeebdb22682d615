//! Board projections over shipping orders.
//!
//! A board is a read-only grouping of order snapshots into one column per
//! requested status. The named views cover the desks of a forwarding
//! office; ad-hoc status lists serve custom dashboards. Projections never
//! mutate orders.

use crate::state::{OrderStateError, OrderStateMachine};
use std::sync::Arc;
use waybill_types::{Board, BoardColumn, BoardView, OrderSnapshot, ShippingOrderStatus};

/// Projects orders onto a named board view.
pub fn project_view(view: BoardView, orders: &[OrderSnapshot]) -> Board {
	let mut board = project_statuses(view.statuses(), orders);
	board.view = Some(view);
	board
}

/// Projects orders onto one column per requested status, in request order.
///
/// Statuses without matching orders still yield a column, so consumers can
/// render a stable layout. Within a column, orders are sorted oldest first
/// with the id as a deterministic tie-break.
pub fn project_statuses(statuses: &[ShippingOrderStatus], orders: &[OrderSnapshot]) -> Board {
	let columns = statuses
		.iter()
		.map(|&status| {
			let mut column: Vec<OrderSnapshot> = orders
				.iter()
				.filter(|order| order.status == status)
				.cloned()
				.collect();
			column.sort_by(|a, b| {
				a.created_at
					.cmp(&b.created_at)
					.then_with(|| a.id.cmp(&b.id))
			});
			BoardColumn {
				status,
				orders: column,
			}
		})
		.collect();

	Board {
		view: None,
		columns,
	}
}

/// Read-side service producing boards from the stored orders.
pub struct BoardService {
	state_machine: Arc<OrderStateMachine>,
}

impl BoardService {
	pub fn new(state_machine: Arc<OrderStateMachine>) -> Self {
		Self { state_machine }
	}

	/// Builds the board for a named view.
	pub async fn board(&self, view: BoardView) -> Result<Board, OrderStateError> {
		let orders = self.state_machine.list_orders().await?;
		Ok(project_view(view, &orders))
	}

	/// Builds a board for an explicit status list.
	pub async fn board_for(
		&self,
		statuses: &[ShippingOrderStatus],
	) -> Result<Board, OrderStateError> {
		let orders = self.state_machine.list_orders().await?;
		Ok(project_statuses(statuses, &orders))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::DateTime;
	use rust_decimal::Decimal;
	use waybill_types::{OrderDetails, ShippingOrder};
	use ShippingOrderStatus::*;

	fn snapshot(id: &str, status: ShippingOrderStatus, created_offset: i64) -> OrderSnapshot {
		let mut order = ShippingOrder::new(
			id.to_string(),
			"ops-1".to_string(),
			OrderDetails {
				branch: "hamburg".to_string(),
				customer: "Acme".to_string(),
				commodity: "crates".to_string(),
				freight_charge: Decimal::new(9_900, 2),
				currency: "EUR".to_string(),
			},
		);
		order.status = status;
		order.created_at = DateTime::from_timestamp(1_700_000_000 + created_offset, 0).unwrap();
		order.snapshot()
	}

	#[test]
	fn test_columns_follow_request_order_and_include_empty() {
		let orders = vec![snapshot("a", Draft, 0)];
		let board = project_statuses(&[PendingForApproval, Draft], &orders);

		assert_eq!(board.view, None);
		assert_eq!(board.columns.len(), 2);
		assert_eq!(board.columns[0].status, PendingForApproval);
		assert!(board.columns[0].orders.is_empty());
		assert_eq!(board.columns[1].status, Draft);
		assert_eq!(board.columns[1].orders.len(), 1);
	}

	#[test]
	fn test_delivered_projection_is_exact_and_sorted() {
		let orders = vec![
			snapshot("late", Delivered, 30),
			snapshot("in-transit", InTransit, 10),
			snapshot("early", Delivered, 5),
			snapshot("cancelled", Cancelled, 1),
		];

		let board = project_statuses(&[Delivered], &orders);

		assert_eq!(board.columns.len(), 1);
		let ids: Vec<&str> = board.columns[0]
			.orders
			.iter()
			.map(|o| o.id.as_str())
			.collect();
		assert_eq!(ids, vec!["early", "late"]);
	}

	#[test]
	fn test_equal_timestamps_break_ties_by_id() {
		let orders = vec![
			snapshot("b", Draft, 0),
			snapshot("a", Draft, 0),
			snapshot("c", Draft, 0),
		];

		let board = project_statuses(&[Draft], &orders);
		let ids: Vec<&str> = board.columns[0]
			.orders
			.iter()
			.map(|o| o.id.as_str())
			.collect();
		assert_eq!(ids, vec!["a", "b", "c"]);
	}

	#[test]
	fn test_named_view_sets_view_and_fixed_columns() {
		let orders = vec![
			snapshot("draft", Draft, 0),
			snapshot("pending", PendingForApproval, 1),
			snapshot("approved", Approved, 2),
		];

		let board = project_view(BoardView::Approval, &orders);

		assert_eq!(board.view, Some(BoardView::Approval));
		assert_eq!(board.columns.len(), 2);
		assert_eq!(board.columns[0].status, PendingForApproval);
		assert_eq!(board.columns[1].status, Approved);
		assert_eq!(board.columns[0].orders[0].id, "pending");
		assert_eq!(board.columns[1].orders[0].id, "approved");
	}

	#[test]
	fn test_list_view_spans_every_status() {
		let board = project_view(BoardView::List, &[]);
		assert_eq!(board.columns.len(), ShippingOrderStatus::ALL.len());
	}
}
