//! Actor identity types.
//!
//! The workflow core consumes an identity collaborator only to stamp
//! transition history records; role-gated permissions are layered on top by
//! callers and are out of scope here.

use serde::{Deserialize, Serialize};

/// An acting back-office user resolved by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
	/// Stable identifier of the user.
	pub id: String,
	/// Human-readable display name.
	pub name: String,
	/// Role label stamped onto history records (e.g. "clerk", "supervisor").
	pub role: String,
}

impl Actor {
	/// Creates a new actor.
	pub fn new(
		id: impl Into<String>,
		name: impl Into<String>,
		role: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			role: role.into(),
		}
	}
}
