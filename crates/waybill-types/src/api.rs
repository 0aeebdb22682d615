//! API types for the waybill HTTP API.
//!
//! This module defines the request and response types for the shipping-order
//! endpoints, plus the structured error type handlers convert domain errors
//! into before they leave the service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::OrderSnapshot;

/// Request body for creating a shipping order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
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
}

/// Request body for a status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
	/// Wire name of the status to move to.
	#[serde(rename = "targetStatus")]
	pub target_status: String,
}

/// Request body for recording a warehouse entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseEntryRequest {
	/// Warehouse location or bay the goods were received at.
	pub location: String,
}

/// Response containing a list of order snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersResponse {
	/// Orders ordered by creation time ascending.
	pub orders: Vec<OrderSnapshot>,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	pub details: Option<serde_json::Value>,
	/// Suggested retry delay in seconds
	#[serde(rename = "retryAfter")]
	pub retry_after: Option<u64>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Bad request with validation errors (400)
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Requested resource does not exist (404)
	NotFound { error_type: String, message: String },
	/// Concurrent mutation detected; retry with fresh state (409)
	Conflict {
		error_type: String,
		message: String,
		retry_after: Option<u64>,
	},
	/// Unprocessable entity for workflow rule violations (422)
	UnprocessableEntity {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Service unavailable with optional retry information (503)
	ServiceUnavailable {
		error_type: String,
		message: String,
		retry_after: Option<u64>,
	},
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::NotFound { .. } => 404,
			ApiError::Conflict { .. } => 409,
			ApiError::UnprocessableEntity { .. } => 422,
			ApiError::ServiceUnavailable { .. } => 503,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			ApiError::BadRequest {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
				retry_after: None,
			},
			ApiError::NotFound {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
				retry_after: None,
			},
			ApiError::Conflict {
				error_type,
				message,
				retry_after,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
				retry_after: *retry_after,
			},
			ApiError::UnprocessableEntity {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
				retry_after: None,
			},
			ApiError::ServiceUnavailable {
				error_type,
				message,
				retry_after,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
				retry_after: *retry_after,
			},
			ApiError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
				retry_after: None,
			},
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			ApiError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			}
			ApiError::ServiceUnavailable { message, .. } => {
				write!(f, "Service Unavailable: {}", message)
			}
			ApiError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			}
		}
	}
}

impl std::error::Error for ApiError {}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = match self.status_code() {
			400 => StatusCode::BAD_REQUEST,
			404 => StatusCode::NOT_FOUND,
			409 => StatusCode::CONFLICT,
			422 => StatusCode::UNPROCESSABLE_ENTITY,
			503 => StatusCode::SERVICE_UNAVAILABLE,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
