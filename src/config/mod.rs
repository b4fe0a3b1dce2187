//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (${VAR} substitution, parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SenderConfig (validated, immutable)
//!     → endpoint registry, chain client, verifier, submitter settings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; endpoint edits happen between sends
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BatchConfig, ConsensusConfig, NetworkConfig, ObservabilityConfig, RetryConfig, RpcConfig,
    SenderConfig,
};
