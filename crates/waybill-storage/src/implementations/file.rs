//! File-based storage backend implementation for the waybill service.
//!
//! This module provides a file-per-key implementation of the
//! StorageInterface trait, giving simple persistence without external
//! dependencies. Each file carries a fixed-size header identifying the
//! format plus the original storage key, so a directory scan can map files
//! back to the keys they hold.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use waybill_types::{ConfigSchema, Field, FieldType, Schema, ValidationError};

#[allow(clippy::doc_nested_refdefs)]
/// Fixed-size file header.
///
/// Binary layout (16 bytes total):
/// - [0-3]: Magic bytes "WYBL"
/// - [4-5]: Format version (u16, little-endian)
/// - [6-7]: Length of the embedded key in bytes (u16, little-endian)
/// - [8-15]: Reserved/padding for future use
///
/// The original storage key follows the header, then the payload. Embedding
/// the key makes the file self-describing: key characters that are unsafe
/// in file names do not have to round-trip through the sanitized path.
#[derive(Debug, Clone)]
struct FileHeader {
	magic: [u8; 4],
	version: u16,
	key_len: u16,
	padding: [u8; 8],
}

impl FileHeader {
	const MAGIC: &'static [u8; 4] = b"WYBL";
	const VERSION: u16 = 1;
	const SIZE: usize = 16;

	/// Creates a new header for a key of the given length.
	fn new(key_len: u16) -> Self {
		Self {
			magic: *Self::MAGIC,
			version: Self::VERSION,
			key_len,
			padding: [0; 8],
		}
	}

	/// Serializes the header to bytes.
	fn serialize(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(&self.magic);
		bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
		bytes[6..8].copy_from_slice(&self.key_len.to_le_bytes());
		bytes[8..16].copy_from_slice(&self.padding);
		bytes
	}

	/// Deserializes a header from bytes.
	fn deserialize(bytes: &[u8]) -> Result<Self, StorageError> {
		if bytes.len() < Self::SIZE {
			return Err(StorageError::Backend("File too small for header".into()));
		}

		let mut magic = [0u8; 4];
		magic.copy_from_slice(&bytes[0..4]);

		if magic != *Self::MAGIC {
			return Err(StorageError::Backend("Not a waybill storage file".into()));
		}

		let version = u16::from_le_bytes([bytes[4], bytes[5]]);
		if version > Self::VERSION {
			return Err(StorageError::Backend(format!(
				"Unsupported file version: {}",
				version
			)));
		}

		let key_len = u16::from_le_bytes([bytes[6], bytes[7]]);

		let mut padding = [0u8; 8];
		padding.copy_from_slice(&bytes[8..16]);

		Ok(Self {
			magic,
			version,
			key_len,
			padding,
		})
	}
}

/// Splits a raw file into its embedded key and payload.
fn parse_file(data: &[u8]) -> Result<(String, Vec<u8>), StorageError> {
	let header = FileHeader::deserialize(data)?;
	let key_end = FileHeader::SIZE + header.key_len as usize;
	if data.len() < key_end {
		return Err(StorageError::Backend("File truncated before key".into()));
	}

	let key = std::str::from_utf8(&data[FileHeader::SIZE..key_end])
		.map_err(|e| StorageError::Backend(format!("Invalid key encoding: {}", e)))?
		.to_string();
	Ok((key, data[key_end..].to_vec()))
}

/// File-based storage implementation.
///
/// This implementation stores each key as a binary file on the filesystem.
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write never leaves a half-written record visible.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage instance with the specified base path.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	///
	/// Sanitizes the key by replacing problematic characters and appending
	/// a .bin extension.
	fn get_file_path(&self, key: &str) -> PathBuf {
		// Sanitize key to be filesystem-safe
		let safe_key = key.replace(['/', ':'], "_");
		self.base_path.join(format!("{}.bin", safe_key))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		let data = match fs::read(&path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound)
			}
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let (_, payload) = parse_file(&data)?;
		Ok(payload)
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let key_bytes = key.as_bytes();
		if key_bytes.len() > u16::MAX as usize {
			return Err(StorageError::Backend(format!(
				"Key too long: {} bytes",
				key_bytes.len()
			)));
		}

		let path = self.get_file_path(key);

		// Create parent directory if it doesn't exist
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		let header = FileHeader::new(key_bytes.len() as u16);
		let header_bytes = header.serialize();

		// Combine header, key and payload
		let mut file_data = Vec::with_capacity(FileHeader::SIZE + key_bytes.len() + value.len());
		file_data.extend_from_slice(&header_bytes);
		file_data.extend_from_slice(key_bytes);
		file_data.extend_from_slice(&value);

		// Write atomically by writing to temp file then renaming
		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, file_data)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.get_file_path(key);
		Ok(path.exists())
	}

	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let mut entries = match fs::read_dir(&self.base_path).await {
			Ok(entries) => entries,
			// A base path that was never written to holds no keys.
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut keys = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("bin")) {
				continue;
			}

			match fs::read(&path).await {
				Ok(data) => match parse_file(&data) {
					Ok((key, _)) => {
						if key.starts_with(prefix) {
							keys.push(key);
						}
					}
					Err(e) => {
						tracing::debug!("Skipping file {:?}: {}", path, e);
					}
				},
				Err(e) => {
					tracing::debug!("Skipping file {:?}: could not be read: {}", path, e);
				}
			}
		}

		keys.sort();
		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![], // No required fields
			vec![Field::new("storage_path", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for file storage (default: "./data/waybill")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/waybill")
		.to_string();

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl waybill_types::ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}
