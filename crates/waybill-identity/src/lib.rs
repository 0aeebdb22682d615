//! Identity module for the waybill system.
//!
//! This module provides abstractions for resolving acting back-office users.
//! The workflow core consumes resolved actors only to stamp transition
//! history records; authentication mechanics and role-gated permissions are
//! collaborator concerns layered on top.

use async_trait::async_trait;
use thiserror::Error;
use waybill_types::{Actor, ConfigSchema, ImplementationRegistry};

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

/// Errors that can occur during identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
	/// Error that occurs when an actor id is not known.
	#[error("Unknown actor: {0}")]
	NotFound(String),
	/// Error that occurs when the backend configuration is invalid.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
	/// Error that occurs when interacting with the identity implementation.
	#[error("Implementation error: {0}")]
	Implementation(String),
}

/// Trait defining the interface for identity implementations.
///
/// This trait must be implemented by any identity backend that wants to
/// integrate with the waybill system. It resolves actor ids to the identity
/// stamped onto history records.
#[async_trait]
pub trait IdentityInterface: Send + Sync {
	/// Returns the configuration schema for this identity implementation.
	///
	/// This allows each implementation to define its own configuration
	/// requirements with specific validation rules. The schema is used to
	/// validate TOML configuration before initializing the implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Resolves an actor id to the full actor identity.
	///
	/// Returns [`IdentityError::NotFound`] when the id is not known to this
	/// backend.
	async fn resolve(&self, actor_id: &str) -> Result<Actor, IdentityError>;
}

/// Type alias for identity factory functions.
///
/// This is the function signature that all identity implementations must
/// provide to create instances of their identity interface.
pub type IdentityFactory = fn(&toml::Value) -> Result<Box<dyn IdentityInterface>, IdentityError>;

/// Registry trait for identity implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// identity implementations must provide an IdentityFactory.
pub trait IdentityRegistry: ImplementationRegistry<Factory = IdentityFactory> {}

/// Get all registered identity implementations.
///
/// Returns a vector of (name, factory) tuples for all available identity
/// implementations. This is used by the factory registry to automatically
/// register all implementations.
pub fn get_all_implementations() -> Vec<(&'static str, IdentityFactory)> {
	use implementations::local;

	vec![(local::Registry::NAME, local::Registry::factory())]
}

/// Service that manages identity resolution.
///
/// This struct provides a high-level interface for identity operations,
/// wrapping an underlying identity implementation.
pub struct IdentityService {
	/// The underlying identity implementation.
	implementation: Box<dyn IdentityInterface>,
}

impl IdentityService {
	/// Creates a new IdentityService with the specified implementation.
	pub fn new(implementation: Box<dyn IdentityInterface>) -> Self {
		Self { implementation }
	}

	/// Resolves an actor id to the full actor identity.
	///
	/// This method delegates to the underlying implementation's resolve
	/// method.
	pub async fn resolve(&self, actor_id: &str) -> Result<Actor, IdentityError> {
		self.implementation.resolve(actor_id).await
	}
}
