//! Board endpoints for the waybill HTTP API.
//!
//! Projects the stored orders onto the status board, either through one of
//! the named operational views or through an explicit comma-separated
//! status list.

use serde_json::json;
use waybill_core::WaybillEngine;
use waybill_types::{ApiError, Board, BoardView, InvalidStatus, ShippingOrderStatus, UnknownView};

use super::map_state_error;

/// Builds the board for a named view.
pub async fn board_by_view(engine: &WaybillEngine, view: &str) -> Result<Board, ApiError> {
	let view: BoardView = view.parse().map_err(|e: UnknownView| ApiError::BadRequest {
		error_type: "UNKNOWN_VIEW".to_string(),
		message: e.to_string(),
		details: Some(json!({
			"known": BoardView::ALL.iter().map(BoardView::as_str).collect::<Vec<_>>(),
		})),
	})?;

	engine.board().board(view).await.map_err(map_state_error)
}

/// Builds a board for an explicit status list.
pub async fn board_by_statuses(engine: &WaybillEngine, statuses: &str) -> Result<Board, ApiError> {
	let statuses = parse_status_list(statuses)?;

	engine
		.board()
		.board_for(&statuses)
		.await
		.map_err(map_state_error)
}

/// Parses the `statuses` query parameter into status values.
///
/// The list keeps the caller's order, including duplicates; an unknown
/// name rejects the whole request.
fn parse_status_list(raw: &str) -> Result<Vec<ShippingOrderStatus>, ApiError> {
	let mut statuses = Vec::new();
	for part in raw.split(',') {
		let part = part.trim();
		if part.is_empty() {
			continue;
		}
		let status = part
			.parse()
			.map_err(|e: InvalidStatus| ApiError::BadRequest {
				error_type: "INVALID_STATUS".to_string(),
				message: e.to_string(),
				details: None,
			})?;
		statuses.push(status);
	}

	if statuses.is_empty() {
		return Err(ApiError::BadRequest {
			error_type: "VALIDATION_ERROR".to_string(),
			message: "Query parameter 'statuses' must name at least one status".to_string(),
			details: None,
		});
	}

	Ok(statuses)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_status_list_keeps_request_order() {
		let statuses = parse_status_list("delivered, draft,approved").unwrap();
		assert_eq!(
			statuses,
			vec![
				ShippingOrderStatus::Delivered,
				ShippingOrderStatus::Draft,
				ShippingOrderStatus::Approved,
			]
		);
	}

	#[test]
	fn test_parse_status_list_rejects_unknown_status() {
		let err = parse_status_list("draft,shipped").unwrap_err();
		assert_eq!(err.status_code(), 400);
		assert_eq!(err.to_error_response().error, "INVALID_STATUS");
	}

	#[test]
	fn test_parse_status_list_rejects_empty_input() {
		let err = parse_status_list(" , ,").unwrap_err();
		assert_eq!(err.status_code(), 400);
	}
}
