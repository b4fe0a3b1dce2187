//! Metrics collection.
//!
//! # Metrics
//! - `sender_batch_attempts_total` (counter): attempts by outcome `kind`
//! - `sender_batch_splits_total` (counter): midpoint splits
//! - `sender_recipients_total` (counter): terminal recipients by `state`
//! - `sender_consensus_checks_total` (counter): verifications by `reached`
//!
//! # Design Decisions
//! - Facade only; the embedding process installs an exporter if it wants one
//! - Labels are static strings to keep cardinality fixed

use metrics::counter;

pub const BATCH_ATTEMPTS: &str = "sender_batch_attempts_total";
pub const BATCH_SPLITS: &str = "sender_batch_splits_total";
pub const RECIPIENTS: &str = "sender_recipients_total";
pub const CONSENSUS_CHECKS: &str = "sender_consensus_checks_total";

/// Count one batch attempt; `kind` is `success` or an attempt error kind.
pub fn record_attempt(kind: &'static str) {
    counter!(BATCH_ATTEMPTS, "kind" => kind).increment(1);
}

pub fn record_split() {
    counter!(BATCH_SPLITS).increment(1);
}

/// Count recipients reaching a terminal state.
pub fn record_recipients(state: &'static str, count: usize) {
    counter!(RECIPIENTS, "state" => state).increment(count as u64);
}

pub fn record_consensus(reached: bool) {
    let reached = if reached { "true" } else { "false" };
    counter!(CONSENSUS_CHECKS, "reached" => reached).increment(1);
}
