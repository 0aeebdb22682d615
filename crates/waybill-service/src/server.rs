//! HTTP server for the waybill API.
//!
//! This module wires the order lifecycle and board endpoints into an axum
//! router and serves them on the host and port from the `[api]` section of
//! the configuration.

use axum::{
	extract::{Path, Query, State},
	http::HeaderMap,
	response::Json,
	routing::{get, post},
	Router,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};
use waybill_config::ApiConfig;
use waybill_core::WaybillEngine;
use waybill_types::{ApiError, Board, OrderSnapshot, OrdersResponse};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the engine for processing requests.
	pub engine: Arc<WaybillEngine>,
}

/// Query parameters for the explicit status-list board.
#[derive(Debug, Deserialize)]
struct BoardQuery {
	statuses: Option<String>,
}

/// Builds the router with all routes nested under `/api`.
fn api_router() -> Router<AppState> {
	Router::new().nest(
		"/api",
		Router::new()
			.route("/orders", post(handle_create_order).get(handle_list_orders))
			.route("/orders/{id}", get(handle_get_order_by_id))
			.route("/orders/{id}/transition", post(handle_transition_order))
			.route("/orders/{id}/documents", post(handle_attach_documents))
			.route(
				"/orders/{id}/warehouse-entry",
				post(handle_record_warehouse_entry),
			)
			.route("/boards", get(handle_board_by_statuses))
			.route("/boards/{view}", get(handle_board_by_view)),
	)
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for the endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<WaybillEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { engine };

	let app = api_router()
		.layer(
			ServiceBuilder::new()
				.layer(CorsLayer::permissive())
				.layer(TimeoutLayer::new(Duration::from_secs(
					api_config.timeout_seconds,
				))),
		)
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Waybill API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /api/orders requests.
async fn handle_create_order(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> Result<Json<OrderSnapshot>, ApiError> {
	let actor_id = crate::apis::actor_id(&headers)?;
	match crate::apis::order::create_order(&state.engine, &actor_id, payload).await {
		Ok(snapshot) => Ok(Json(snapshot)),
		Err(e) => {
			tracing::warn!("Order creation failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/orders requests.
async fn handle_list_orders(
	State(state): State<AppState>,
) -> Result<Json<OrdersResponse>, ApiError> {
	match crate::apis::order::list_orders(&state.engine).await {
		Ok(orders) => Ok(Json(orders)),
		Err(e) => {
			tracing::warn!("Order listing failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/orders/{id} requests.
async fn handle_get_order_by_id(
	Path(id): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<OrderSnapshot>, ApiError> {
	match crate::apis::order::get_order_by_id(&state.engine, &id).await {
		Ok(snapshot) => Ok(Json(snapshot)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/{id}/transition requests.
async fn handle_transition_order(
	Path(id): Path<String>,
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> Result<Json<OrderSnapshot>, ApiError> {
	let actor_id = crate::apis::actor_id(&headers)?;
	match crate::apis::order::transition_order(&state.engine, &id, &actor_id, payload).await {
		Ok(snapshot) => Ok(Json(snapshot)),
		Err(e) => {
			tracing::warn!("Transition failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/{id}/documents requests.
async fn handle_attach_documents(
	Path(id): Path<String>,
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<OrderSnapshot>, ApiError> {
	let actor_id = crate::apis::actor_id(&headers)?;
	match crate::apis::order::attach_documents(&state.engine, &id, &actor_id).await {
		Ok(snapshot) => Ok(Json(snapshot)),
		Err(e) => {
			tracing::warn!("Document attachment failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/{id}/warehouse-entry requests.
async fn handle_record_warehouse_entry(
	Path(id): Path<String>,
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<Value>,
) -> Result<Json<OrderSnapshot>, ApiError> {
	let actor_id = crate::apis::actor_id(&headers)?;
	match crate::apis::order::record_warehouse_entry(&state.engine, &id, &actor_id, payload).await
	{
		Ok(snapshot) => Ok(Json(snapshot)),
		Err(e) => {
			tracing::warn!("Warehouse entry failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/boards/{view} requests.
async fn handle_board_by_view(
	Path(view): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<Board>, ApiError> {
	match crate::apis::board::board_by_view(&state.engine, &view).await {
		Ok(board) => Ok(Json(board)),
		Err(e) => {
			tracing::warn!("Board projection failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/boards?statuses=a,b,c requests.
async fn handle_board_by_statuses(
	State(state): State<AppState>,
	Query(query): Query<BoardQuery>,
) -> Result<Json<Board>, ApiError> {
	let raw = query.statuses.ok_or_else(|| ApiError::BadRequest {
		error_type: "VALIDATION_ERROR".to_string(),
		message: "Query parameter 'statuses' is required".to_string(),
		details: None,
	})?;
	match crate::apis::board::board_by_statuses(&state.engine, &raw).await {
		Ok(board) => Ok(Json(board)),
		Err(e) => {
			tracing::warn!("Board projection failed: {}", e);
			Err(e)
		},
	}
}
