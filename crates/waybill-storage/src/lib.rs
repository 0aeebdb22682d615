//! Storage module for the waybill system.
//!
//! This module provides abstractions for persistent storage of shipping
//! orders, supporting different backend implementations such as in-memory
//! or file-based storage. The high-level [`StorageService`] adds typed JSON
//! (de)serialization and an optimistic version check for order writes.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use waybill_types::{ConfigSchema, ImplementationRegistry, ShippingOrder, Versioned};

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Namespace under which shipping orders are stored.
pub const ORDERS_NAMESPACE: &str = "orders";

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs when a write was computed against a stale record.
	#[error("Version conflict: expected version {expected}, found {found}")]
	VersionConflict { expected: u64, found: u64 },
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the waybill system. It provides basic key-value
/// operations plus a prefix scan used to enumerate a namespace.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes under the given key, creating or overwriting.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns all keys starting with the given prefix.
	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
///
/// This trait extends the base ImplementationRegistry to specify that
/// storage implementations must provide a StorageFactory.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations. This is used by the factory registry to automatically
/// register all implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed data with automatic
/// serialization/deserialization. Keys are formed as `namespace:id`.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	/// Stores a serializable value, creating or overwriting.
	///
	/// The namespace and id are combined to form a unique key. The data is
	/// serialized to JSON before storage.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Retrieves and deserializes a value from storage.
	///
	/// The namespace and id are combined to form the lookup key. The
	/// retrieved bytes are deserialized from JSON.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes = self.backend.get_bytes(&key).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Retrieves and deserializes every value stored under a namespace.
	///
	/// Keys that disappear between the scan and the read are skipped, so a
	/// concurrent delete does not fail an unrelated listing.
	pub async fn retrieve_all<T: DeserializeOwned>(
		&self,
		namespace: &str,
	) -> Result<Vec<T>, StorageError> {
		let prefix = format!("{}:", namespace);
		let keys = self.backend.list_keys(&prefix).await?;

		let mut records = Vec::with_capacity(keys.len());
		for key in keys {
			match self.backend.get_bytes(&key).await {
				Ok(bytes) => {
					let record = serde_json::from_slice(&bytes)
						.map_err(|e| StorageError::Serialization(e.to_string()))?;
					records.push(record);
				}
				Err(StorageError::NotFound) => continue,
				Err(e) => return Err(e),
			}
		}
		Ok(records)
	}

	/// Removes a value from storage.
	///
	/// The namespace and id are combined to form the key to delete.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.delete(&key).await
	}

	/// Updates an existing value in storage.
	///
	/// This method first checks if the key exists, then updates the value.
	/// Returns an error if the key doesn't exist, making it semantically
	/// different from store() which will create or overwrite.
	pub async fn update<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);

		// Check if the key exists first
		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}

		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Stores a versioned record, rejecting writes computed from stale state.
	///
	/// The incoming record must carry a version exactly one above the stored
	/// record's (or version 0 when nothing is stored yet). Callers bump the
	/// version before saving; a mismatch means another writer got there
	/// first and surfaces as [`StorageError::VersionConflict`].
	///
	/// Writers on the same key are expected to be serialized by the caller;
	/// the check here catches stale writers that slipped past that, e.g.
	/// two processes sharing a file store.
	pub async fn store_versioned<T>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError>
	where
		T: Serialize + DeserializeOwned + Versioned,
	{
		let key = format!("{}:{}", namespace, id);

		let expected = match self.backend.get_bytes(&key).await {
			Ok(bytes) => {
				let stored: T = serde_json::from_slice(&bytes)
					.map_err(|e| StorageError::Serialization(e.to_string()))?;
				stored.version() + 1
			}
			Err(StorageError::NotFound) => 0,
			Err(e) => return Err(e),
		};

		if data.version() != expected {
			return Err(StorageError::VersionConflict {
				expected,
				found: data.version(),
			});
		}

		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Persists a shipping order under [`ORDERS_NAMESPACE`].
	///
	/// Applies the optimistic version check of [`store_versioned`], so a
	/// write computed from a stale read of the order fails with
	/// [`StorageError::VersionConflict`] instead of clobbering newer state.
	///
	/// [`store_versioned`]: StorageService::store_versioned
	pub async fn save_order(&self, order: &ShippingOrder) -> Result<(), StorageError> {
		self.store_versioned(ORDERS_NAMESPACE, &order.id, order).await
	}

	/// Checks if a value exists in storage.
	///
	/// The namespace and id are combined to form the lookup key. Returns
	/// true if the key exists, false otherwise.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.exists(&key).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;
	use serde::Deserialize;

	#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
	struct Record {
		id: String,
		version: u64,
		note: String,
	}

	impl Versioned for Record {
		fn version(&self) -> u64 {
			self.version
		}
	}

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::default()))
	}

	fn record(id: &str, version: u64) -> Record {
		Record {
			id: id.to_string(),
			version,
			note: "freight".to_string(),
		}
	}

	#[tokio::test]
	async fn test_store_and_retrieve() {
		let service = service();
		let rec = record("a", 0);
		service.store("orders", "a", &rec).await.unwrap();

		let loaded: Record = service.retrieve("orders", "a").await.unwrap();
		assert_eq!(loaded, rec);
	}

	#[tokio::test]
	async fn test_retrieve_missing_is_not_found() {
		let service = service();
		let err = service.retrieve::<Record>("orders", "nope").await.unwrap_err();
		assert!(matches!(err, StorageError::NotFound));
	}

	#[tokio::test]
	async fn test_update_requires_existing_key() {
		let service = service();
		let rec = record("a", 0);
		let err = service.update("orders", "a", &rec).await.unwrap_err();
		assert!(matches!(err, StorageError::NotFound));

		service.store("orders", "a", &rec).await.unwrap();
		assert!(service.update("orders", "a", &rec).await.is_ok());
	}

	#[tokio::test]
	async fn test_retrieve_all_scans_namespace_only() {
		let service = service();
		service.store("orders", "a", &record("a", 0)).await.unwrap();
		service.store("orders", "b", &record("b", 0)).await.unwrap();
		service.store("drafts", "c", &record("c", 0)).await.unwrap();

		let records: Vec<Record> = service.retrieve_all("orders").await.unwrap();
		assert_eq!(records.len(), 2);
		assert!(records.iter().all(|r| r.id != "c"));
	}

	#[tokio::test]
	async fn test_store_versioned_accepts_sequential_writes() {
		let service = service();
		service
			.store_versioned("orders", "a", &record("a", 0))
			.await
			.unwrap();
		service
			.store_versioned("orders", "a", &record("a", 1))
			.await
			.unwrap();

		let loaded: Record = service.retrieve("orders", "a").await.unwrap();
		assert_eq!(loaded.version, 1);
	}

	#[tokio::test]
	async fn test_store_versioned_rejects_stale_write() {
		let service = service();
		service
			.store_versioned("orders", "a", &record("a", 0))
			.await
			.unwrap();
		service
			.store_versioned("orders", "a", &record("a", 1))
			.await
			.unwrap();

		// A second writer that also loaded version 0 computes version 1 again.
		let err = service
			.store_versioned("orders", "a", &record("a", 1))
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			StorageError::VersionConflict {
				expected: 2,
				found: 1
			}
		));

		let loaded: Record = service.retrieve("orders", "a").await.unwrap();
		assert_eq!(loaded.version, 1);
	}

	#[tokio::test]
	async fn test_store_versioned_rejects_nonzero_first_write() {
		let service = service();
		let err = service
			.store_versioned("orders", "a", &record("a", 3))
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			StorageError::VersionConflict {
				expected: 0,
				found: 3
			}
		));
	}

	#[tokio::test]
	async fn test_remove_then_retrieve_fails() {
		let service = service();
		service.store("orders", "a", &record("a", 0)).await.unwrap();
		service.remove("orders", "a").await.unwrap();
		assert!(!service.exists("orders", "a").await.unwrap());
	}

	#[tokio::test]
	async fn test_save_order_round_trips_under_orders_namespace() {
		use waybill_types::OrderDetails;
		use rust_decimal::Decimal;

		let service = service();
		let order = ShippingOrder::new(
			"ord-1".to_string(),
			"ops-1".to_string(),
			OrderDetails {
				branch: "hamburg".to_string(),
				customer: "Norddeutsche Stahl".to_string(),
				commodity: "steel coils".to_string(),
				freight_charge: Decimal::new(125_000, 2),
				currency: "EUR".to_string(),
			},
		);

		service.save_order(&order).await.unwrap();

		let loaded: ShippingOrder = service.retrieve(ORDERS_NAMESPACE, "ord-1").await.unwrap();
		assert_eq!(loaded.id, order.id);
		assert_eq!(loaded.version, 0);

		// Saving the same version again is a stale write.
		let err = service.save_order(&order).await.unwrap_err();
		assert!(matches!(err, StorageError::VersionConflict { .. }));
	}
}
