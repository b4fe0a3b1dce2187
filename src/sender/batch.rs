//! Adaptive batch submission.
//!
//! # Responsibilities
//! - Attempt a batch as one atomic transaction
//! - Retry a failed batch once, simulating first to surface program logs
//! - Split a batch that still fails at its midpoint until each failure is
//!   isolated to a single recipient
//! - Leave every recipient of the batch completed or failed
//!
//! # Design Decisions
//! - Splits go through an explicit worklist, not recursion, with a depth guard
//! - The left half is always finished before the right half starts
//! - All attempt error kinds take the same retry/split path

use serde::Serialize;
use std::ops::Range;
use thiserror::Error;

use crate::chain::client::{ChainClient, TransactionSigner};
use crate::chain::types::{ChainError, Commitment, Signature};
use crate::config::RetryConfig;
use crate::consensus::{ConsensusOutcome, ConsensusVerifier};
use crate::observability::metrics;
use crate::recipients::Recipient;
use crate::resilience::retry_delay;
use crate::sender::builder::TransferBuilder;
use crate::sender::ledger::ProgressLedger;

/// Why one attempt at a batch did not land.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    /// Building, signing or broadcasting failed.
    #[error("submission failed: {0}")]
    Submission(String),

    /// The dry run was rejected.
    #[error("simulation failed: {message}")]
    Simulation { message: String, logs: Vec<String> },

    /// Broadcast succeeded but execution reported an error.
    #[error("transaction failed: {0}")]
    Confirmation(String),

    #[error("transaction not confirmed before its blockhash expired")]
    ConfirmationTimeout,
}

impl AttemptError {
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::Submission(_) => "submission_error",
            AttemptError::Simulation { .. } => "simulation_error",
            AttemptError::Confirmation(_) => "confirmation_error",
            AttemptError::ConfirmationTimeout => "confirmation_timeout",
        }
    }
}

/// A transaction that landed, with its advisory verification.
#[derive(Debug, Clone, Serialize)]
pub struct LandedTransaction {
    pub signature: Signature,
    /// Recipients carried by the transaction.
    pub size: usize,
    pub consensus: Option<ConsensusOutcome>,
}

/// Summary of one top-level batch after all splits are resolved.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub index: usize,
    pub size: usize,
    /// Source lines of recipients that landed in this run.
    pub completed: Vec<usize>,
    /// Source lines of recipients that failed permanently in this run.
    pub failed: Vec<usize>,
    pub splits: usize,
    pub attempts: usize,
    pub landed: Vec<LandedTransaction>,
}

impl BatchReport {
    fn new(index: usize, size: usize) -> Self {
        Self {
            index,
            size,
            ..Self::default()
        }
    }
}

/// Deepest split level allowed for batches of at most `max_size`.
pub fn max_split_depth(max_size: usize) -> u32 {
    let levels = max_size.max(1).next_power_of_two().trailing_zeros();
    levels + 1
}

/// Drives one batch to a terminal state for every recipient.
pub struct BatchSubmitter<'a> {
    chain: &'a dyn ChainClient,
    signer: &'a dyn TransactionSigner,
    builder: TransferBuilder<'a>,
    verifier: Option<&'a ConsensusVerifier>,
    retry: &'a RetryConfig,
    commitment: Commitment,
    max_depth: u32,
}

impl<'a> BatchSubmitter<'a> {
    pub fn new(
        chain: &'a dyn ChainClient,
        signer: &'a dyn TransactionSigner,
        builder: TransferBuilder<'a>,
        retry: &'a RetryConfig,
        commitment: Commitment,
        max_size: usize,
    ) -> Self {
        Self {
            chain,
            signer,
            builder,
            verifier: None,
            retry,
            commitment,
            max_depth: max_split_depth(max_size),
        }
    }

    /// Run consensus verification after each landed transaction.
    pub fn with_verifier(mut self, verifier: &'a ConsensusVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Process `batch` until every recipient in it is completed or failed.
    pub async fn process_batch(
        &self,
        index: usize,
        batch: &[Recipient],
        ledger: &mut dyn ProgressLedger,
    ) -> BatchReport {
        let mut report = BatchReport::new(index, batch.len());
        let mut worklist: Vec<(Range<usize>, u32)> = vec![(0..batch.len(), 0)];

        while let Some((range, depth)) = worklist.pop() {
            let items = &batch[range.clone()];
            if items.is_empty() {
                continue;
            }

            match self.attempt_with_retry(items, depth, &mut report).await {
                Ok(signature) => {
                    ledger.mark_completed(items, &signature);
                    report.completed.extend(items.iter().map(|r| r.line));
                    metrics::record_recipients("completed", items.len());
                    tracing::info!(
                        batch = index,
                        depth,
                        size = items.len(),
                        signature = %signature,
                        "Batch landed"
                    );

                    let consensus = match self.verifier {
                        Some(verifier) => Some(verifier.verify(&signature).await),
                        None => None,
                    };
                    report.landed.push(LandedTransaction {
                        signature,
                        size: items.len(),
                        consensus,
                    });
                }
                Err(err) if items.len() == 1 => {
                    let recipient = &items[0];
                    tracing::warn!(
                        batch = index,
                        depth,
                        line = recipient.line,
                        address = %recipient.address,
                        kind = err.kind(),
                        error = %err,
                        "Recipient failed permanently"
                    );
                    ledger.mark_failed(recipient, &err.to_string());
                    report.failed.push(recipient.line);
                    metrics::record_recipients("failed", 1);
                }
                Err(err) if depth >= self.max_depth => {
                    tracing::error!(
                        batch = index,
                        depth,
                        size = items.len(),
                        error = %err,
                        "Split depth exhausted, attempting remaining recipients one by one"
                    );
                    for at in range.rev() {
                        worklist.push((at..at + 1, depth + 1));
                    }
                }
                Err(err) => {
                    let mid = range.start + items.len() / 2;
                    report.splits += 1;
                    metrics::record_split();
                    tracing::info!(
                        batch = index,
                        depth,
                        size = items.len(),
                        left = mid - range.start,
                        right = range.end - mid,
                        kind = err.kind(),
                        "Splitting batch"
                    );
                    // Pushed right first so the left half is popped first
                    worklist.push((mid..range.end, depth + 1));
                    worklist.push((range.start..mid, depth + 1));
                }
            }
        }

        report
    }

    /// Bulk attempt, then one simulated retry after a backoff.
    async fn attempt_with_retry(
        &self,
        items: &[Recipient],
        depth: u32,
        report: &mut BatchReport,
    ) -> Result<Signature, AttemptError> {
        report.attempts += 1;
        let first = self.attempt(items, false).await;
        let err = match first {
            Ok(signature) => {
                metrics::record_attempt("success");
                return Ok(signature);
            }
            Err(err) => err,
        };
        metrics::record_attempt(err.kind());
        tracing::warn!(
            batch = report.index,
            depth,
            size = items.len(),
            kind = err.kind(),
            error = %err,
            "Batch attempt failed, retrying with simulation"
        );

        tokio::time::sleep(retry_delay(1, self.retry)).await;

        report.attempts += 1;
        let retried = self.attempt(items, true).await;
        match &retried {
            Ok(_) => metrics::record_attempt("success"),
            Err(err) => {
                metrics::record_attempt(err.kind());
                if let AttemptError::Simulation { logs, .. } = err {
                    for line in logs {
                        tracing::info!(batch = report.index, depth, log = %line, "Simulation log");
                    }
                }
                tracing::warn!(
                    batch = report.index,
                    depth,
                    size = items.len(),
                    kind = err.kind(),
                    error = %err,
                    "Batch retry failed"
                );
            }
        }
        retried
    }

    /// One atomic attempt: build, optionally simulate, sign, broadcast, confirm.
    async fn attempt(&self, items: &[Recipient], simulate: bool) -> Result<Signature, AttemptError> {
        let built = self
            .builder
            .build(items)
            .await
            .map_err(|e| AttemptError::Submission(e.to_string()))?;

        if simulate {
            let result = self
                .chain
                .simulate(&built.tx)
                .await
                .map_err(|e| AttemptError::Submission(e.to_string()))?;
            if let Some(err) = result.err {
                return Err(AttemptError::Simulation {
                    message: err.to_string(),
                    logs: result.logs,
                });
            }
        }

        let signed = self
            .signer
            .sign(built.tx)
            .await
            .map_err(|e| AttemptError::Submission(e.to_string()))?;
        let signature = self
            .chain
            .send_raw(&signed)
            .await
            .map_err(|e| AttemptError::Submission(e.to_string()))?;

        match self
            .chain
            .confirm(&signature, &built.blockhash, self.commitment)
            .await
        {
            Ok(None) => Ok(signature),
            Ok(Some(err)) => Err(AttemptError::Confirmation(err.to_string())),
            Err(ChainError::ConfirmationTimeout { .. }) => Err(AttemptError::ConfirmationTimeout),
            Err(e) => Err(AttemptError::Confirmation(e.to_string())),
        }
    }
}
