//! Order endpoints for the waybill HTTP API.
//!
//! Implements creation, retrieval and the three lifecycle mutations of a
//! shipping order. Each function takes the engine plus already-extracted
//! request parts and returns either the resulting order snapshot or the
//! API error the failure maps to.

use serde_json::Value;
use tracing::info;
use uuid::Uuid;
use waybill_core::WaybillEngine;
use waybill_types::{
	ApiError, CreateOrderRequest, OrderDetails, OrderSnapshot, OrdersResponse, TransitionRequest,
	WarehouseEntryRequest,
};

use super::{map_state_error, parse_body, require_non_blank};

/// Creates a new shipping order in Draft.
pub async fn create_order(
	engine: &WaybillEngine,
	actor_id: &str,
	payload: Value,
) -> Result<OrderSnapshot, ApiError> {
	let request: CreateOrderRequest = parse_body(payload)?;
	require_non_blank("branch", &request.branch)?;
	require_non_blank("customer", &request.customer)?;
	require_non_blank("commodity", &request.commodity)?;
	require_non_blank("currency", &request.currency)?;

	let details = OrderDetails {
		branch: request.branch,
		customer: request.customer,
		commodity: request.commodity,
		freight_charge: request.freight_charge,
		currency: request.currency,
	};

	engine
		.state_machine()
		.create_order(details, actor_id)
		.await
		.map_err(map_state_error)
}

/// Lists every stored order, oldest first.
pub async fn list_orders(engine: &WaybillEngine) -> Result<OrdersResponse, ApiError> {
	let orders = engine
		.state_machine()
		.list_orders()
		.await
		.map_err(map_state_error)?;
	Ok(OrdersResponse { orders })
}

/// Retrieves one order by id.
pub async fn get_order_by_id(
	engine: &WaybillEngine,
	id: &str,
) -> Result<OrderSnapshot, ApiError> {
	info!("Retrieving order with ID: {}", id);
	validate_order_id(id)?;

	engine
		.state_machine()
		.get_order(id)
		.await
		.map_err(map_state_error)
}

/// Applies a status transition requested by the acting user.
pub async fn transition_order(
	engine: &WaybillEngine,
	id: &str,
	actor_id: &str,
	payload: Value,
) -> Result<OrderSnapshot, ApiError> {
	validate_order_id(id)?;
	let request: TransitionRequest = parse_body(payload)?;

	engine
		.state_machine()
		.transition_order(id, &request.target_status, actor_id)
		.await
		.map_err(map_state_error)
}

/// Marks the order's shipping documents as attached.
pub async fn attach_documents(
	engine: &WaybillEngine,
	id: &str,
	actor_id: &str,
) -> Result<OrderSnapshot, ApiError> {
	validate_order_id(id)?;

	engine
		.state_machine()
		.attach_documents(id, actor_id)
		.await
		.map_err(map_state_error)
}

/// Records the goods' arrival in the warehouse.
pub async fn record_warehouse_entry(
	engine: &WaybillEngine,
	id: &str,
	actor_id: &str,
	payload: Value,
) -> Result<OrderSnapshot, ApiError> {
	validate_order_id(id)?;
	let request: WarehouseEntryRequest = parse_body(payload)?;
	require_non_blank("location", &request.location)?;

	engine
		.state_machine()
		.record_warehouse_entry(id, request.location, actor_id)
		.await
		.map_err(map_state_error)
}

/// Validates the order ID format.
///
/// Order ids are generated as UUIDs, so anything else is a malformed
/// request rather than a miss.
fn validate_order_id(order_id: &str) -> Result<(), ApiError> {
	if Uuid::parse_str(order_id).is_err() {
		return Err(ApiError::BadRequest {
			error_type: "INVALID_ORDER_ID".to_string(),
			message: format!("Order ID must be a valid UUID: {}", order_id),
			details: None,
		});
	}

	Ok(())
}
