//! In-memory storage backend implementation for the waybill service.
//!
//! This module provides a memory-based implementation of the
//! StorageInterface trait, useful for testing and development scenarios
//! where persistence across restarts is not required.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use waybill_types::{ConfigSchema, Schema, ValidationError};

/// In-memory storage implementation.
///
/// This implementation stores data in a HashMap in memory, providing fast
/// access but no persistence across restarts.
pub struct MemoryStorage {
	/// The in-memory store protected by a read-write lock.
	store: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
	/// Creates a new MemoryStorage instance.
	pub fn new() -> Self {
		Self {
			store: Arc::new(RwLock::new(HashMap::new())),
		}
	}
}

impl Default for MemoryStorage {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let store = self.store.read().await;
		store.get(key).cloned().ok_or(StorageError::NotFound)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.insert(key.to_string(), value);
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let mut store = self.store.write().await;
		store.remove(key);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let store = self.store.read().await;
		Ok(store.contains_key(key))
	}

	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let store = self.store.read().await;
		let mut keys: Vec<String> = store
			.keys()
			.filter(|key| key.starts_with(prefix))
			.cloned()
			.collect();
		keys.sort();
		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}
}

/// Configuration schema for MemoryStorage.
pub struct MemoryStorageSchema;

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		// Memory storage has no required configuration
		let schema = Schema::new(vec![], vec![]);
		schema.validate(config)
	}
}

/// Factory function to create a memory storage backend from configuration.
///
/// Configuration parameters:
/// - None required for memory storage
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let storage = MemoryStorage::new();
	storage
		.config_schema()
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;
	Ok(Box::new(storage))
}

/// Registry for the memory storage implementation.
pub struct Registry;

impl waybill_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_basic_operations() {
		let storage = MemoryStorage::new();

		// Test set and get
		let key = "orders:test_key";
		let value = b"test_value".to_vec();
		storage.set_bytes(key, value.clone()).await.unwrap();

		let retrieved = storage.get_bytes(key).await.unwrap();
		assert_eq!(retrieved, value);

		// Test exists
		assert!(storage.exists(key).await.unwrap());

		// Test delete
		storage.delete(key).await.unwrap();
		assert!(!storage.exists(key).await.unwrap());

		// Test get after delete
		let result = storage.get_bytes(key).await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_overwrite() {
		let storage = MemoryStorage::new();

		let key = "orders:overwrite_key";
		let value1 = b"value1".to_vec();
		let value2 = b"value2".to_vec();

		// Set initial value
		storage.set_bytes(key, value1.clone()).await.unwrap();
		let retrieved = storage.get_bytes(key).await.unwrap();
		assert_eq!(retrieved, value1);

		// Overwrite with new value
		storage.set_bytes(key, value2.clone()).await.unwrap();
		let retrieved = storage.get_bytes(key).await.unwrap();
		assert_eq!(retrieved, value2);
	}

	#[tokio::test]
	async fn test_list_keys_filters_by_prefix() {
		let storage = MemoryStorage::new();
		storage.set_bytes("orders:a", b"1".to_vec()).await.unwrap();
		storage.set_bytes("orders:b", b"2".to_vec()).await.unwrap();
		storage.set_bytes("actors:c", b"3".to_vec()).await.unwrap();

		let keys = storage.list_keys("orders:").await.unwrap();
		assert_eq!(keys, vec!["orders:a".to_string(), "orders:b".to_string()]);
	}

	#[tokio::test]
	async fn test_factory_rejects_unknown_config_keys() {
		let config: toml::Value = toml::from_str("unexpected = true").unwrap();
		assert!(matches!(
			create_storage(&config),
			Err(StorageError::Configuration(_))
		));
	}
}
