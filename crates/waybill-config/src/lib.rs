//! Configuration module for the waybill order system.
//!
//! This module provides structures and utilities for managing workflow configuration.
//! It supports loading configuration from TOML files and provides validation to ensure
//! all required configuration values are properly set.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files for better organization:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the waybill service.
///
/// This structure contains all configuration sections required for the
/// order workflow to operate: the office identity, the storage backend,
/// the actor roster, and the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration identifying this back office instance.
	pub office: OfficeConfig,
	/// Configuration for the order storage backend.
	pub storage: StorageConfig,
	/// Configuration for actor identity resolution.
	pub identity: IdentityConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration identifying the back office instance.
///
/// The office name and branch appear in startup logs so that operators
/// can tell instances apart when several branches run the same service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OfficeConfig {
	/// Name of the forwarding office running this instance.
	pub name: String,
	/// Branch the instance serves.
	pub branch: String,
}

/// Configuration for the order storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	/// Each implementation has its own configuration format stored as raw TOML values.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for actor identity resolution.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of identity implementation names to their configurations.
	/// The local roster of actors lives under `implementations.local`.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default = "default_api_enabled")]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Request timeout in seconds.
	#[serde(default = "default_api_timeout")]
	pub timeout_seconds: u64,
}

/// Returns the default enabled state for the API server.
///
/// Writing an `[api]` section at all signals intent to serve HTTP, so the
/// server defaults to enabled unless explicitly switched off.
fn default_api_enabled() -> bool {
	true
}

/// Returns the default API host.
///
/// This provides a default host address of 127.0.0.1 (localhost) for the API server
/// when no explicit host is configured.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
///
/// This provides a default port of 3000 for the API server
/// when no explicit port is configured.
fn default_api_port() -> u16 {
	3000
}

/// Returns the default API timeout in seconds.
///
/// This provides a default timeout of 30 seconds for API requests
/// when no explicit timeout is configured.
fn default_api_timeout() -> u64 {
	30
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file with include resolution.
	///
	/// This method supports modular configuration through include directives:
	/// - `include = ["file1.toml", "file2.toml"]` - Include specific files
	///
	/// Each top-level section must be unique across all configuration files.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// This method performs validation across all configuration sections:
	/// - Ensures office name and branch are not empty
	/// - Validates the primary storage backend is configured
	/// - Validates the primary identity implementation is configured
	/// - Checks the API server settings when the section is present
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate office config
		if self.office.name.is_empty() {
			return Err(ConfigError::Validation(
				"Office name cannot be empty".into(),
			));
		}
		if self.office.branch.is_empty() {
			return Err(ConfigError::Validation(
				"Office branch cannot be empty".into(),
			));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Storage primary implementation cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		// Validate identity config
		if self.identity.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one identity implementation must be configured".into(),
			));
		}
		if self.identity.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Identity primary implementation cannot be empty".into(),
			));
		}
		if !self
			.identity
			.implementations
			.contains_key(&self.identity.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary identity '{}' not found in implementations",
				self.identity.primary
			)));
		}

		// Validate API config if present
		if let Some(ref api) = self.api {
			if api.enabled {
				if api.port == 0 {
					return Err(ConfigError::Validation(
						"API port must be greater than 0".into(),
					));
				}
				if api.timeout_seconds == 0 {
					return Err(ConfigError::Validation(
						"API timeout_seconds must be greater than 0".into(),
					));
				}
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// This allows configuration to be parsed from TOML strings using the standard
/// string parsing interface. Environment variables are resolved and the
/// configuration is automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
