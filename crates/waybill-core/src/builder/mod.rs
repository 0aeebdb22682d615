//! Builder pattern for constructing waybill engines.
//!
//! Provides a flexible way to compose a WaybillEngine from pluggable
//! backend implementations using factory functions. Storage and identity
//! backends are selected by name from the configuration.

use crate::engine::{event_bus::EventBus, WaybillEngine};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use waybill_config::Config;
use waybill_identity::{IdentityError, IdentityInterface, IdentityService};
use waybill_storage::{StorageError, StorageInterface, StorageService};

/// Errors that can occur during engine construction.
///
/// These errors indicate problems with configuration or missing required
/// components when building an engine instance.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Container for all factory functions needed to build a WaybillEngine.
///
/// Each factory map keys implementation names to factory functions taking
/// the implementation's TOML configuration table.
pub struct WaybillFactories<SF, IF> {
	pub storage_factories: HashMap<String, SF>,
	pub identity_factories: HashMap<String, IF>,
}

/// Builder for constructing a WaybillEngine with pluggable implementations.
pub struct WaybillBuilder {
	config: Config,
}

impl WaybillBuilder {
	/// Creates a new WaybillBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Builds the WaybillEngine using factories for each component type.
	///
	/// Every configured implementation is constructed; construction
	/// failures abort the build. The configured primary of each component
	/// must resolve to a registered factory.
	pub fn build<SF, IF>(
		self,
		factories: WaybillFactories<SF, IF>,
	) -> Result<WaybillEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		IF: Fn(&toml::Value) -> Result<Box<dyn IdentityInterface>, IdentityError>,
	{
		// Create storage implementations
		let mut storage_impls = HashMap::new();
		for (name, config) in &self.config.storage.implementations {
			if let Some(factory) = factories.storage_factories.get(name) {
				match factory(config) {
					Ok(implementation) => {
						// Validation already happened in the factory
						storage_impls.insert(name.clone(), implementation);
						let is_primary = &self.config.storage.primary == name;
						tracing::info!(component = "storage", implementation = %name, enabled = %is_primary, "Loaded");
					}
					Err(e) => {
						tracing::error!(
							component = "storage",
							implementation = %name,
							error = %e,
							"Failed to create storage implementation"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create storage implementation '{}': {}",
							name, e
						)));
					}
				}
			}
		}

		let primary_storage = &self.config.storage.primary;
		let storage_backend = storage_impls.remove(primary_storage).ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"storage implementation '{}'",
				primary_storage
			))
		})?;
		let storage = Arc::new(StorageService::new(storage_backend));

		// Create identity implementations
		let mut identity_impls = HashMap::new();
		for (name, config) in &self.config.identity.implementations {
			if let Some(factory) = factories.identity_factories.get(name) {
				match factory(config) {
					Ok(implementation) => {
						identity_impls.insert(name.clone(), implementation);
						let is_primary = &self.config.identity.primary == name;
						tracing::info!(component = "identity", implementation = %name, enabled = %is_primary, "Loaded");
					}
					Err(e) => {
						tracing::error!(
							component = "identity",
							implementation = %name,
							error = %e,
							"Failed to create identity implementation"
						);
						return Err(BuilderError::Config(format!(
							"Failed to create identity implementation '{}': {}",
							name, e
						)));
					}
				}
			}
		}

		let primary_identity = &self.config.identity.primary;
		let identity_backend = identity_impls.remove(primary_identity).ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"identity implementation '{}'",
				primary_identity
			))
		})?;
		let identity = Arc::new(IdentityService::new(identity_backend));

		Ok(WaybillEngine::new(
			self.config,
			storage,
			identity,
			EventBus::new(1000),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use waybill_identity::IdentityFactory;
	use waybill_storage::StorageFactory;

	const CONFIG: &str = r#"
[office]
name = "test-office"
branch = "hamburg"

[storage]
primary = "memory"
[storage.implementations.memory]

[identity]
primary = "local"
[identity.implementations.local]
[[identity.implementations.local.actors]]
id = "ops-1"
name = "Test Operator"
role = "operations"
"#;

	fn all_factories() -> WaybillFactories<StorageFactory, IdentityFactory> {
		WaybillFactories {
			storage_factories: waybill_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			identity_factories: waybill_identity::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}

	#[tokio::test]
	async fn test_build_with_registered_backends() {
		let config: Config = CONFIG.parse().unwrap();
		let engine = WaybillBuilder::new(config).build(all_factories()).unwrap();

		assert_eq!(engine.config().office.name, "test-office");

		// The assembled services are live.
		let orders = engine.state_machine().list_orders().await.unwrap();
		assert!(orders.is_empty());
	}

	#[test]
	fn test_build_fails_without_primary_factory() {
		let config: Config = CONFIG.parse().unwrap();
		let factories: WaybillFactories<StorageFactory, IdentityFactory> = WaybillFactories {
			storage_factories: HashMap::new(),
			identity_factories: waybill_identity::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		};

		let err = WaybillBuilder::new(config)
			.build(factories)
			.err()
			.expect("build should fail without a primary storage factory");
		assert!(matches!(err, BuilderError::MissingComponent(_)));
		assert!(err.to_string().contains("memory"));
	}

	#[test]
	fn test_build_fails_on_invalid_backend_config() {
		let config_str = CONFIG.replace(
			"[storage.implementations.memory]",
			"[storage.implementations.memory]\nflush_interval = 5",
		);
		let config: Config = config_str.parse().unwrap();

		let err = WaybillBuilder::new(config)
			.build(all_factories())
			.err()
			.expect("build should fail on an invalid backend config");
		assert!(matches!(err, BuilderError::Config(_)));
	}
}
