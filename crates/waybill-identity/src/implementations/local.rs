//! Local roster identity implementation for the waybill service.
//!
//! This module resolves actors from a static roster defined in the
//! configuration file. It is the default backend for single-office
//! deployments where the set of back-office users is small and managed by
//! hand.

use crate::{IdentityError, IdentityInterface};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use waybill_types::{Actor, ConfigSchema, Field, FieldType, Schema, ValidationError};

/// Configuration shape of the local roster.
#[derive(Debug, Deserialize)]
struct LocalRosterConfig {
	actors: Vec<ActorEntry>,
}

/// One roster entry from configuration.
#[derive(Debug, Deserialize)]
struct ActorEntry {
	id: String,
	name: String,
	role: String,
}

/// Identity implementation backed by a static in-config roster.
pub struct LocalRoster {
	/// Known actors keyed by id.
	actors: HashMap<String, Actor>,
}

impl LocalRoster {
	/// Builds a roster from configuration entries.
	///
	/// Rejects empty rosters, blank ids and duplicate ids so a misconfigured
	/// deployment fails at startup instead of on the first request.
	pub fn from_config(config: &toml::Value) -> Result<Self, IdentityError> {
		let roster: LocalRosterConfig = config
			.clone()
			.try_into()
			.map_err(|e| IdentityError::InvalidConfig(format!("Invalid roster config: {}", e)))?;

		if roster.actors.is_empty() {
			return Err(IdentityError::InvalidConfig(
				"actors must not be empty".to_string(),
			));
		}

		let mut actors = HashMap::new();
		for entry in roster.actors {
			if entry.id.trim().is_empty() {
				return Err(IdentityError::InvalidConfig(
					"actor id must not be empty".to_string(),
				));
			}
			if actors
				.insert(
					entry.id.clone(),
					Actor::new(entry.id.clone(), entry.name, entry.role),
				)
				.is_some()
			{
				return Err(IdentityError::InvalidConfig(format!(
					"duplicate actor id: {}",
					entry.id
				)));
			}
		}

		Ok(Self { actors })
	}
}

#[async_trait]
impl IdentityInterface for LocalRoster {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalRosterSchema)
	}

	async fn resolve(&self, actor_id: &str) -> Result<Actor, IdentityError> {
		self.actors
			.get(actor_id)
			.cloned()
			.ok_or_else(|| IdentityError::NotFound(actor_id.to_string()))
	}
}

/// Configuration schema for LocalRoster.
pub struct LocalRosterSchema;

impl ConfigSchema for LocalRosterSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new(
				"actors",
				FieldType::Array(Box::new(FieldType::Table(Schema::new(
					vec![
						Field::new("id", FieldType::String),
						Field::new("name", FieldType::String),
						Field::new("role", FieldType::String),
					],
					vec![],
				)))),
			)],
			vec![],
		);
		schema.validate(config)
	}
}

/// Factory function to create a local roster backend from configuration.
///
/// Configuration parameters:
/// - `actors`: array of tables with `id`, `name` and `role` (required,
///   non-empty, ids unique)
pub fn create_identity(config: &toml::Value) -> Result<Box<dyn IdentityInterface>, IdentityError> {
	LocalRosterSchema
		.validate(config)
		.map_err(|e| IdentityError::InvalidConfig(e.to_string()))?;

	let roster = LocalRoster::from_config(config)?;
	Ok(Box::new(roster))
}

/// Registry for the local roster identity implementation.
pub struct Registry;

impl waybill_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = crate::IdentityFactory;

	fn factory() -> Self::Factory {
		create_identity
	}
}

impl crate::IdentityRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn roster_config() -> toml::Value {
		toml::from_str(
			r#"
			[[actors]]
			id = "u-1"
			name = "Asha Okafor"
			role = "clerk"

			[[actors]]
			id = "u-2"
			name = "Mei Lin"
			role = "supervisor"
			"#,
		)
		.unwrap()
	}

	#[tokio::test]
	async fn test_resolves_known_actor() {
		let identity = create_identity(&roster_config()).unwrap();
		let actor = identity.resolve("u-2").await.unwrap();
		assert_eq!(actor.name, "Mei Lin");
		assert_eq!(actor.role, "supervisor");
	}

	#[tokio::test]
	async fn test_unknown_actor_is_not_found() {
		let identity = create_identity(&roster_config()).unwrap();
		let err = identity.resolve("u-99").await.unwrap_err();
		assert!(matches!(err, IdentityError::NotFound(id) if id == "u-99"));
	}

	#[test]
	fn test_rejects_duplicate_ids() {
		let config: toml::Value = toml::from_str(
			r#"
			[[actors]]
			id = "u-1"
			name = "A"
			role = "clerk"

			[[actors]]
			id = "u-1"
			name = "B"
			role = "clerk"
			"#,
		)
		.unwrap();
		assert!(matches!(
			create_identity(&config),
			Err(IdentityError::InvalidConfig(_))
		));
	}

	#[test]
	fn test_rejects_empty_roster() {
		let config: toml::Value = toml::from_str("actors = []").unwrap();
		assert!(matches!(
			create_identity(&config),
			Err(IdentityError::InvalidConfig(_))
		));
	}

	#[test]
	fn test_rejects_missing_role_field() {
		let config: toml::Value = toml::from_str(
			r#"
			[[actors]]
			id = "u-1"
			name = "A"
			"#,
		)
		.unwrap();
		assert!(matches!(
			create_identity(&config),
			Err(IdentityError::InvalidConfig(_))
		));
	}
}
