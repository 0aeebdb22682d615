//! Registry trait for self-registering implementations.
//!
//! This module provides the base trait that pluggable waybill backends
//! implement to register themselves with their configuration name and
//! factory function.

/// Base trait for implementation registries.
///
/// Each backend module (storage, identity) provides a Registry struct that
/// implements this trait, declaring the name it is referenced by in the
/// configuration file and the factory that constructs it.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the key used in the TOML configuration, for example:
	/// - "memory" for storage.implementations.memory
	/// - "file" for storage.implementations.file
	/// - "local" for identity.implementations.local
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	///
	/// Each module defines its own factory type, for example StorageFactory
	/// for storage implementations or IdentityFactory for identity backends.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
