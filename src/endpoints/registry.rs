//! Endpoint registry.
//!
//! # Responsibilities
//! - Expose the enabled endpoints of the active network in configured order
//! - Resolve the primary endpoint
//! - Report the minimum consensus threshold

use crate::config::schema::SenderConfig;
use crate::config::ConfigError;
use crate::endpoints::endpoint::Endpoint;

/// Read-only view of the endpoints available to one send.
pub trait EndpointRegistry: Send + Sync {
    /// Enabled endpoints, in configured order.
    fn list_enabled_endpoints(&self) -> Vec<Endpoint>;

    /// Endpoint backing submissions, if any is enabled.
    fn primary_endpoint(&self) -> Option<Endpoint>;

    /// Number of endpoints that must report finalized for consensus.
    fn min_consensus_threshold(&self) -> usize;
}

/// Registry over a fixed endpoint list.
#[derive(Debug, Clone)]
pub struct StaticRegistry {
    endpoints: Vec<Endpoint>,
    primary_id: Option<String>,
    min_consensus: usize,
}

impl StaticRegistry {
    pub fn new(endpoints: Vec<Endpoint>, primary_id: Option<String>, min_consensus: usize) -> Self {
        Self {
            endpoints,
            primary_id,
            min_consensus,
        }
    }

    /// Build the registry for the configured active network.
    pub fn from_config(config: &SenderConfig) -> Result<Self, ConfigError> {
        let network = config
            .active_network()
            .ok_or_else(|| ConfigError::UnknownNetwork(config.network.clone()))?;

        Ok(Self::new(
            network.endpoints.clone(),
            network.primary_endpoint.clone(),
            network.min_consensus,
        ))
    }
}

impl EndpointRegistry for StaticRegistry {
    fn list_enabled_endpoints(&self) -> Vec<Endpoint> {
        self.endpoints.iter().filter(|e| e.enabled).cloned().collect()
    }

    /// Configured primary when present and enabled, else the first enabled endpoint.
    fn primary_endpoint(&self) -> Option<Endpoint> {
        let enabled = || self.endpoints.iter().filter(|e| e.enabled);

        if let Some(id) = &self.primary_id {
            if let Some(endpoint) = enabled().find(|e| &e.id == id) {
                return Some(endpoint.clone());
            }
            tracing::warn!(primary = %id, "Configured primary endpoint missing or disabled, falling back");
        }
        enabled().next().cloned()
    }

    fn min_consensus_threshold(&self) -> usize {
        self.min_consensus
    }
}
