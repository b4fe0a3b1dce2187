//! Multi-endpoint finality verification.
//!
//! # Responsibilities
//! - Query every enabled endpoint for a signature concurrently
//! - Fold each answer (or failure) into a `VerificationResult`
//! - Compare the finalized count against the registry threshold
//!
//! The verdict is advisory. Nothing here touches the progress ledger.

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use crate::chain::client::StatusSource;
use crate::chain::types::Signature;
use crate::config::ConsensusConfig;
use crate::consensus::outcome::{ConsensusOutcome, VerificationResult};
use crate::endpoints::EndpointRegistry;
use crate::observability::metrics;
use crate::resilience::within;

/// Cross-checks a signature's finality across the registry's endpoints.
pub struct ConsensusVerifier {
    registry: Arc<dyn EndpointRegistry>,
    source: Arc<dyn StatusSource>,
    /// Deadline for each endpoint query.
    query_timeout: Duration,
    /// Pause before querying, giving finality a chance to land.
    delay: Duration,
}

impl ConsensusVerifier {
    pub fn new(
        registry: Arc<dyn EndpointRegistry>,
        source: Arc<dyn StatusSource>,
        config: &ConsensusConfig,
    ) -> Self {
        Self {
            registry,
            source,
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            delay: Duration::from_millis(config.delay_ms),
        }
    }

    /// True when enough endpoints are enabled for the threshold to be met.
    pub fn quorum_reachable(&self) -> bool {
        self.registry.list_enabled_endpoints().len() >= self.registry.min_consensus_threshold()
    }

    /// Ask every enabled endpoint about `signature` and report the verdict.
    ///
    /// Never fails: endpoint errors and timeouts become `error` results.
    pub async fn verify(&self, signature: &Signature) -> ConsensusOutcome {
        let endpoints = self.registry.list_enabled_endpoints();
        let threshold = self.registry.min_consensus_threshold();

        if endpoints.is_empty() {
            tracing::warn!(signature = %signature, "No enabled endpoints, skipping consensus check");
            metrics::record_consensus(false);
            return ConsensusOutcome::empty();
        }
        if endpoints.len() < threshold {
            tracing::warn!(
                signature = %signature,
                enabled = endpoints.len(),
                threshold,
                "Fewer enabled endpoints than the consensus threshold, quorum cannot be reached"
            );
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let queries = endpoints.iter().map(|endpoint| async move {
            let query = within(
                self.query_timeout,
                self.source.signature_status(endpoint, signature),
            )
            .await;
            VerificationResult::from_query(&endpoint.label, query)
        });
        let results = join_all(queries).await;

        for result in &results {
            tracing::debug!(
                signature = %signature,
                endpoint = %result.endpoint_label,
                status = %result.status,
                error = result.error.as_deref().unwrap_or(""),
                "Endpoint verification result"
            );
        }

        let outcome = ConsensusOutcome::from_results(results, threshold);
        metrics::record_consensus(outcome.consensus_reached);

        if outcome.consensus_reached {
            tracing::info!(
                signature = %signature,
                confirmed = outcome.confirmed_count,
                total = outcome.total_count,
                "Consensus reached"
            );
        } else {
            tracing::warn!(
                signature = %signature,
                confirmed = outcome.confirmed_count,
                total = outcome.total_count,
                threshold,
                "Consensus not reached"
            );
        }

        outcome
    }
}
