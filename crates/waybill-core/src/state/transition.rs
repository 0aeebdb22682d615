//! Pure transition rules for the shipping order lifecycle.
//!
//! Orders move along a single forward path, one step at a time:
//! Draft -> PendingForApproval -> Approved -> DocsVerified ->
//! EntryInWarehouse -> ReadyToExport -> InTransit -> Delivered.
//! Cancelled is reachable from every non-terminal status. Two steps carry
//! gates: verification requires attached documents, and the warehouse step
//! requires a recorded warehouse entry.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use waybill_types::{InvalidStatus, ShippingOrder, ShippingOrderStatus};

/// Errors produced when a requested transition is rejected.
///
/// Rejections leave the order untouched; callers surface these to the
/// requesting actor rather than retrying.
#[derive(Debug, Error)]
pub enum TransitionError {
	/// The requested target is not a known status name.
	#[error(transparent)]
	InvalidStatus(#[from] InvalidStatus),
	/// The move is not on the lifecycle path.
	#[error("Illegal transition from {from} to {to}")]
	IllegalTransition {
		from: ShippingOrderStatus,
		to: ShippingOrderStatus,
	},
	/// The order already reached a terminal status and is read-only.
	#[error("Order is terminal in status {status}")]
	TerminalState { status: ShippingOrderStatus },
	/// The gate for the target status is not satisfied yet.
	#[error("Cannot enter {status}: {requirement}")]
	RequirementNotMet {
		status: ShippingOrderStatus,
		requirement: &'static str,
	},
}

/// Gate state consulted when validating a transition.
///
/// Carries the two payload facts the lifecycle gates on, decoupling the
/// pure rules from the full order record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionContext {
	/// Whether shipping documents have been attached to the order.
	pub documents_attached: bool,
	/// Whether a warehouse entry has been recorded for the order.
	pub warehouse_entry_recorded: bool,
}

impl From<&ShippingOrder> for TransitionContext {
	fn from(order: &ShippingOrder) -> Self {
		Self {
			documents_attached: order.documents_attached,
			warehouse_entry_recorded: order.warehouse_entry.is_some(),
		}
	}
}

/// Allowed moves per status. Terminal statuses map to empty sets.
static TRANSITIONS: Lazy<HashMap<ShippingOrderStatus, HashSet<ShippingOrderStatus>>> =
	Lazy::new(|| {
		let mut m = HashMap::new();
		for status in ShippingOrderStatus::ALL {
			let mut next = HashSet::new();
			if let Some(successor) = status.successor() {
				next.insert(successor);
				next.insert(ShippingOrderStatus::Cancelled);
			}
			m.insert(status, next);
		}
		m
	});

/// Checks whether a move is on the lifecycle path, ignoring gates.
pub fn is_valid_transition(from: ShippingOrderStatus, to: ShippingOrderStatus) -> bool {
	TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
}

/// Validates a requested transition against the lifecycle rules.
///
/// The checks are ordered: terminal state first, then the cancel
/// side-exit, then the strict successor step with its gate. Anything
/// else, including skipping ahead or moving backward, is illegal.
pub fn validate_transition(
	current: ShippingOrderStatus,
	target: ShippingOrderStatus,
	ctx: &TransitionContext,
) -> Result<(), TransitionError> {
	if current.is_terminal() {
		return Err(TransitionError::TerminalState { status: current });
	}

	if target == ShippingOrderStatus::Cancelled {
		return Ok(());
	}

	if current.successor() == Some(target) {
		return check_gate(target, ctx);
	}

	Err(TransitionError::IllegalTransition {
		from: current,
		to: target,
	})
}

/// Checks the entry gate of the target status, if it has one.
fn check_gate(
	target: ShippingOrderStatus,
	ctx: &TransitionContext,
) -> Result<(), TransitionError> {
	match target {
		ShippingOrderStatus::DocsVerified if !ctx.documents_attached => {
			Err(TransitionError::RequirementNotMet {
				status: target,
				requirement: "shipping documents must be attached first",
			})
		}
		ShippingOrderStatus::EntryInWarehouse if !ctx.warehouse_entry_recorded => {
			Err(TransitionError::RequirementNotMet {
				status: target,
				requirement: "a warehouse entry must be recorded first",
			})
		}
		_ => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ShippingOrderStatus::*;

	fn open_gates() -> TransitionContext {
		TransitionContext {
			documents_attached: true,
			warehouse_entry_recorded: true,
		}
	}

	#[test]
	fn test_successor_steps_are_accepted() {
		let ctx = open_gates();
		let mut status = Draft;
		while let Some(next) = status.successor() {
			assert!(
				validate_transition(status, next, &ctx).is_ok(),
				"step {} -> {} should be accepted",
				status,
				next
			);
			status = next;
		}
		assert_eq!(status, Delivered);
	}

	#[test]
	fn test_cancel_is_accepted_from_every_non_terminal() {
		let ctx = TransitionContext::default();
		for status in ShippingOrderStatus::ALL {
			let result = validate_transition(status, Cancelled, &ctx);
			if status.is_terminal() {
				assert!(matches!(
					result,
					Err(TransitionError::TerminalState { status: s }) if s == status
				));
			} else {
				assert!(result.is_ok(), "cancel from {} should be accepted", status);
			}
		}
	}

	#[test]
	fn test_terminal_statuses_reject_everything() {
		let ctx = open_gates();
		for terminal in [Delivered, Cancelled] {
			for target in ShippingOrderStatus::ALL {
				assert!(matches!(
					validate_transition(terminal, target, &ctx),
					Err(TransitionError::TerminalState { status }) if status == terminal
				));
			}
		}
	}

	#[test]
	fn test_skipping_a_step_is_illegal() {
		let ctx = open_gates();
		let err = validate_transition(Draft, Approved, &ctx).unwrap_err();
		assert!(matches!(
			err,
			TransitionError::IllegalTransition {
				from: Draft,
				to: Approved
			}
		));
	}

	#[test]
	fn test_moving_backward_is_illegal() {
		let ctx = open_gates();
		let err = validate_transition(Approved, PendingForApproval, &ctx).unwrap_err();
		assert!(matches!(err, TransitionError::IllegalTransition { .. }));
	}

	#[test]
	fn test_verification_gate_requires_documents() {
		let ctx = TransitionContext {
			documents_attached: false,
			warehouse_entry_recorded: true,
		};
		let err = validate_transition(Approved, DocsVerified, &ctx).unwrap_err();
		assert!(matches!(
			err,
			TransitionError::RequirementNotMet {
				status: DocsVerified,
				..
			}
		));

		let ctx = TransitionContext {
			documents_attached: true,
			..ctx
		};
		assert!(validate_transition(Approved, DocsVerified, &ctx).is_ok());
	}

	#[test]
	fn test_warehouse_gate_requires_recorded_entry() {
		let ctx = TransitionContext {
			documents_attached: true,
			warehouse_entry_recorded: false,
		};
		let err = validate_transition(DocsVerified, EntryInWarehouse, &ctx).unwrap_err();
		assert!(matches!(
			err,
			TransitionError::RequirementNotMet {
				status: EntryInWarehouse,
				..
			}
		));
	}

	#[test]
	fn test_transition_table_matches_successor_chain() {
		for from in ShippingOrderStatus::ALL {
			for to in ShippingOrderStatus::ALL {
				let expected =
					!from.is_terminal() && (from.successor() == Some(to) || to == Cancelled);
				assert_eq!(
					is_valid_transition(from, to),
					expected,
					"table disagrees for {} -> {}",
					from,
					to
				);
			}
		}
	}

	#[test]
	fn test_context_reads_gate_fields_from_order() {
		use rust_decimal::Decimal;
		use waybill_types::{OrderDetails, WarehouseEntry};

		let mut order = ShippingOrder::new(
			"ord-1".to_string(),
			"ops-1".to_string(),
			OrderDetails {
				branch: "hamburg".to_string(),
				customer: "Acme".to_string(),
				commodity: "machine parts".to_string(),
				freight_charge: Decimal::new(50_000, 2),
				currency: "EUR".to_string(),
			},
		);

		let ctx = TransitionContext::from(&order);
		assert!(!ctx.documents_attached);
		assert!(!ctx.warehouse_entry_recorded);

		order.documents_attached = true;
		order.warehouse_entry = Some(WarehouseEntry {
			location: "HH-03".to_string(),
			recorded_at: chrono::Utc::now(),
		});

		let ctx = TransitionContext::from(&order);
		assert!(ctx.documents_attached);
		assert!(ctx.warehouse_entry_recorded);
	}
}
