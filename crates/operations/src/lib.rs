//! Operational setup for the paperkey key manager.
//!
//! - **Config**: YAML configuration with fail-fast validation
//! - **Observability**: `tracing` subscriber installation
//! - **Builder**: a [`KeyManager`](paperkey_protocol::KeyManager) over the
//!   configured store
//!
//! # Example
//!
//! ```no_run
//! use paperkey_operations::{build_key_manager, init_tracing_from_config, load_config};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("paperkey.yaml")?;
//!     init_tracing_from_config(&config.observability)?;
//!
//!     let manager = build_key_manager(&config)?;
//!     let _events = manager.subscribe();
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config;
pub mod errors;
pub mod observability;

pub use builder::{build_key_manager, ConfiguredStore};
pub use config::{
    load_config, load_config_from_str, validate_config, ObservabilityConfig, ProtocolConfig,
    StorageBackend,
};
pub use errors::ConfigError;
pub use observability::{init_tracing, init_tracing_from_config, parse_level, LogFormat};
