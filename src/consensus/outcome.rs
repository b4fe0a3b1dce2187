//! Verification results and the quorum verdict.

use serde::Serialize;
use std::fmt;

use crate::chain::types::{ChainError, ConfirmationTier, SignatureStatus};

/// Status one endpoint reported for a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Finalized,
    Confirmed,
    Processed,
    NotFound,
    Error,
    Unknown,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Finalized => "finalized",
            VerificationStatus::Confirmed => "confirmed",
            VerificationStatus::Processed => "processed",
            VerificationStatus::NotFound => "not_found",
            VerificationStatus::Error => "error",
            VerificationStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One endpoint's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub endpoint_label: String,
    pub success: bool,
    pub status: VerificationStatus,
    pub error: Option<String>,
}

impl VerificationResult {
    /// Map a status query result to a verification result.
    ///
    /// Only `finalized` and `confirmed` count as success; a query failure is
    /// folded into an `error` result rather than returned.
    pub fn from_query(label: &str, query: Result<Option<SignatureStatus>, ChainError>) -> Self {
        let (success, status, error) = match query {
            Err(e) => (false, VerificationStatus::Error, Some(e.to_string())),
            Ok(None) => (false, VerificationStatus::NotFound, None),
            Ok(Some(SignatureStatus { err: Some(err), .. })) => {
                (false, VerificationStatus::Error, Some(err.to_string()))
            }
            Ok(Some(SignatureStatus { tier, err: None })) => match tier {
                ConfirmationTier::Finalized => (true, VerificationStatus::Finalized, None),
                ConfirmationTier::Confirmed => (true, VerificationStatus::Confirmed, None),
                ConfirmationTier::Processed => (false, VerificationStatus::Processed, None),
                ConfirmationTier::Unrecognized(_) => (false, VerificationStatus::Unknown, None),
            },
        };

        Self {
            endpoint_label: label.to_string(),
            success,
            status,
            error,
        }
    }
}

/// Quorum verdict across all queried endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsensusOutcome {
    pub consensus_reached: bool,
    /// Endpoints that reported `finalized`; `confirmed` does not count.
    pub confirmed_count: usize,
    pub total_count: usize,
    /// One entry per endpoint, in registry order.
    pub results: Vec<VerificationResult>,
}

impl ConsensusOutcome {
    pub fn from_results(results: Vec<VerificationResult>, threshold: usize) -> Self {
        let confirmed_count = results
            .iter()
            .filter(|r| r.status == VerificationStatus::Finalized)
            .count();
        Self {
            consensus_reached: confirmed_count >= threshold,
            confirmed_count,
            total_count: results.len(),
            results,
        }
    }

    /// Outcome when there is nothing to ask.
    pub fn empty() -> Self {
        Self {
            consensus_reached: false,
            confirmed_count: 0,
            total_count: 0,
            results: Vec::new(),
        }
    }
}
