//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the sender.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::chain::types::Commitment;
use crate::endpoints::Endpoint;

/// Upper bound for a batch, keeps a transaction under size and compute limits.
pub const MAX_BATCH_SIZE: usize = 12;

/// Root configuration for the batch sender.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SenderConfig {
    /// Name of the active entry in `networks`.
    pub network: String,

    /// Endpoint lists keyed by network name.
    pub networks: HashMap<String, NetworkConfig>,

    /// Batch sizing.
    pub batch: BatchConfig,

    /// Delay between a failed bulk attempt and its simulated retry.
    pub retry: RetryConfig,

    /// Node client settings.
    pub rpc: RpcConfig,

    /// Multi-endpoint verification settings.
    pub consensus: ConsensusConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            network: "mainnet-beta".to_string(),
            networks: HashMap::new(),
            batch: BatchConfig::default(),
            retry: RetryConfig::default(),
            rpc: RpcConfig::default(),
            consensus: ConsensusConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl SenderConfig {
    /// The network named by `network`, if configured.
    pub fn active_network(&self) -> Option<&NetworkConfig> {
        self.networks.get(&self.network)
    }
}

/// Endpoints of a single network.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Id of the endpoint used for submissions.
    pub primary_endpoint: Option<String>,

    /// Endpoints that must report finalized for consensus.
    pub min_consensus: usize,

    /// Ordered endpoint list.
    pub endpoints: Vec<Endpoint>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            primary_endpoint: None,
            min_consensus: 2,
            endpoints: Vec::new(),
        }
    }
}

/// Batch sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Largest batch a caller may request.
    pub max_size: usize,

    /// Batch size used when the caller does not pick one.
    pub default_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_size: MAX_BATCH_SIZE,
            default_size: 8,
        }
    }
}

/// Retry backoff configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

/// Node client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,

    /// Interval between status polls while confirming, in milliseconds.
    pub poll_interval_ms: u64,

    /// Commitment a submission must reach to count as landed.
    pub confirm_commitment: Commitment,
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            poll_interval_ms: 500,
            confirm_commitment: Commitment::Confirmed,
        }
    }
}

/// Consensus verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Deadline for each endpoint's status query in seconds.
    pub query_timeout_secs: u64,

    /// Wait before querying, gives the transaction time to finalize.
    pub delay_ms: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: 10,
            delay_ms: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
