//! Endpoint implementations for the waybill HTTP API.
//!
//! This module contains the business logic behind each route, separated from
//! the HTTP server layer, plus the shared plumbing every endpoint needs:
//! resolving the acting user from the `X-Actor-Id` header, decoding request
//! bodies, and mapping workflow errors onto API error responses.

pub mod board;
pub mod order;

use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use waybill_core::{OrderStateError, TransitionError};
use waybill_identity::IdentityError;
use waybill_types::ApiError;

/// Header carrying the id of the acting back-office user.
pub const ACTOR_HEADER: &str = "X-Actor-Id";

/// Extracts the acting user's id from the request headers.
///
/// The header must be present and non-blank; resolution against the
/// identity backend happens inside the workflow operations.
pub fn actor_id(headers: &HeaderMap) -> Result<String, ApiError> {
	headers
		.get(ACTOR_HEADER)
		.and_then(|value| value.to_str().ok())
		.map(str::trim)
		.filter(|value| !value.is_empty())
		.map(String::from)
		.ok_or_else(|| ApiError::BadRequest {
			error_type: "MISSING_ACTOR".to_string(),
			message: format!("{} header is required", ACTOR_HEADER),
			details: None,
		})
}

/// Decodes a JSON request body into the expected request type.
pub fn parse_body<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T, ApiError> {
	serde_json::from_value(payload).map_err(|e| ApiError::BadRequest {
		error_type: "INVALID_BODY".to_string(),
		message: format!("Invalid request body: {}", e),
		details: None,
	})
}

/// Rejects blank string fields in request payloads.
pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), ApiError> {
	if value.trim().is_empty() {
		return Err(ApiError::BadRequest {
			error_type: "VALIDATION_ERROR".to_string(),
			message: format!("Field '{}' must not be blank", field),
			details: None,
		});
	}
	Ok(())
}

/// Maps a workflow error onto the API error it surfaces as.
///
/// Lifecycle rule violations become 422s, a lost write race becomes a 409,
/// unknown orders and actors become 404s, and backend failures become 500s.
pub fn map_state_error(err: OrderStateError) -> ApiError {
	match err {
		OrderStateError::Transition(transition) => map_transition_error(transition),
		OrderStateError::Conflict(message) => ApiError::Conflict {
			error_type: "CONFLICT".to_string(),
			message,
			retry_after: Some(1),
		},
		OrderStateError::NotFound(id) => ApiError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message: format!("Order not found: {}", id),
		},
		OrderStateError::Identity(IdentityError::NotFound(id)) => ApiError::NotFound {
			error_type: "ACTOR_NOT_FOUND".to_string(),
			message: format!("Unknown actor: {}", id),
		},
		other => ApiError::InternalServerError {
			error_type: "INTERNAL_ERROR".to_string(),
			message: other.to_string(),
		},
	}
}

/// Maps a rejected transition onto the API error it surfaces as.
///
/// A malformed target status is the caller's input being wrong (400); the
/// remaining variants are well-formed requests the lifecycle rules refuse
/// (422).
fn map_transition_error(err: TransitionError) -> ApiError {
	let message = err.to_string();
	match err {
		TransitionError::InvalidStatus(_) => ApiError::BadRequest {
			error_type: "INVALID_STATUS".to_string(),
			message,
			details: None,
		},
		TransitionError::IllegalTransition { .. } => ApiError::UnprocessableEntity {
			error_type: "ILLEGAL_TRANSITION".to_string(),
			message,
			details: None,
		},
		TransitionError::TerminalState { .. } => ApiError::UnprocessableEntity {
			error_type: "TERMINAL_STATE".to_string(),
			message,
			details: None,
		},
		TransitionError::RequirementNotMet { .. } => ApiError::UnprocessableEntity {
			error_type: "REQUIREMENT_NOT_MET".to_string(),
			message,
			details: None,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::HeaderValue;

	#[test]
	fn test_actor_id_requires_header() {
		let headers = HeaderMap::new();
		let err = actor_id(&headers).unwrap_err();
		assert_eq!(err.status_code(), 400);

		let mut headers = HeaderMap::new();
		headers.insert(ACTOR_HEADER, HeaderValue::from_static("  "));
		assert_eq!(actor_id(&headers).unwrap_err().status_code(), 400);

		let mut headers = HeaderMap::new();
		headers.insert(ACTOR_HEADER, HeaderValue::from_static("ops-1"));
		assert_eq!(actor_id(&headers).unwrap(), "ops-1");
	}

	#[test]
	fn test_conflict_maps_to_409_with_retry() {
		let err = map_state_error(OrderStateError::Conflict(
			"another update is in progress for order ord-1".to_string(),
		));
		assert_eq!(err.status_code(), 409);
		assert_eq!(err.to_error_response().retry_after, Some(1));
	}

	#[test]
	fn test_lifecycle_violations_map_to_422() {
		use waybill_types::ShippingOrderStatus;

		let illegal = map_state_error(
			TransitionError::IllegalTransition {
				from: ShippingOrderStatus::Draft,
				to: ShippingOrderStatus::Approved,
			}
			.into(),
		);
		assert_eq!(illegal.status_code(), 422);

		let terminal = map_state_error(
			TransitionError::TerminalState {
				status: ShippingOrderStatus::Delivered,
			}
			.into(),
		);
		assert_eq!(terminal.status_code(), 422);

		let gate = map_state_error(
			TransitionError::RequirementNotMet {
				status: ShippingOrderStatus::DocsVerified,
				requirement: "shipping documents must be attached first",
			}
			.into(),
		);
		assert_eq!(gate.status_code(), 422);
		assert!(gate.to_error_response().message.contains("documents"));
	}

	#[test]
	fn test_unknown_actor_maps_to_404() {
		let err = map_state_error(OrderStateError::Identity(IdentityError::NotFound(
			"ghost".to_string(),
		)));
		assert_eq!(err.status_code(), 404);
		assert_eq!(err.to_error_response().error, "ACTOR_NOT_FOUND");
	}

	#[test]
	fn test_backend_failures_map_to_500() {
		let err = map_state_error(OrderStateError::Identity(IdentityError::Implementation(
			"roster backend offline".to_string(),
		)));
		assert_eq!(err.status_code(), 500);
	}
}
