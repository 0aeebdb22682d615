//! Main entry point for the waybill service.
//!
//! This binary runs the shipping-order workflow for one back office: it
//! loads the office configuration, assembles the engine from pluggable
//! storage and identity implementations, and serves the order lifecycle
//! and status board over HTTP.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use waybill_config::Config;
use waybill_core::{WaybillBuilder, WaybillEngine, WaybillFactories};

mod apis;
mod server;

// Import implementations from individual crates
use waybill_identity::implementations::local::create_identity;
use waybill_storage::implementations::file::create_storage as create_file_storage;
use waybill_storage::implementations::memory::create_storage as create_memory_storage;

/// Command-line arguments for the waybill service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the waybill service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the engine with all implementations
/// 5. Runs the engine and the API server until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started waybill service");

	// Load configuration
	let config = Config::from_file(&args.config.to_string_lossy()).await?;
	tracing::info!(
		"Loaded configuration [{} / {}]",
		config.office.name,
		config.office.branch
	);

	// Build engine with implementations
	let engine = build_engine(config.clone())?;
	let engine = Arc::new(engine);

	// Check if API server should be started
	match config.api.clone().filter(|api| api.enabled) {
		Some(api_config) => {
			let api_engine = Arc::clone(&engine);

			// Run the audit loop and the API server concurrently
			let engine_task = engine.run();
			let api_task = server::start_server(api_config, api_engine);

			tokio::select! {
				result = engine_task => {
					tracing::info!("Engine finished");
					result?;
				}
				result = api_task => {
					tracing::info!("API server finished");
					result?;
				}
			}
		},
		None => {
			tracing::info!("Starting engine only");
			engine.run().await?;
		},
	}

	tracing::info!("Stopped waybill service");
	Ok(())
}

/// Macro to create a factory HashMap with the appropriate type aliases
macro_rules! create_factory_map {
    ($interface:path, $error:path, $( $name:literal => $factory:expr ),* $(,)?) => {{
        let mut factories = std::collections::HashMap::new();
        $(
            factories.insert(
                $name.to_string(),
                $factory as fn(&toml::Value) -> Result<Box<dyn $interface>, $error>
            );
        )*
        factories
    }};
}

/// Builds the waybill engine with all necessary implementations.
///
/// This function wires up the concrete implementations for:
/// - Storage backends (in-memory, file)
/// - Identity backends (local actor roster)
fn build_engine(config: Config) -> Result<WaybillEngine, Box<dyn std::error::Error>> {
	let builder = WaybillBuilder::new(config);

	let storage_factories = create_factory_map!(
		waybill_storage::StorageInterface,
		waybill_storage::StorageError,
		"file" => create_file_storage,
		"memory" => create_memory_storage,
	);

	let identity_factories = create_factory_map!(
		waybill_identity::IdentityInterface,
		waybill_identity::IdentityError,
		"local" => create_identity,
	);

	let factories = WaybillFactories {
		storage_factories,
		identity_factories,
	};

	Ok(builder.build(factories)?)
}
