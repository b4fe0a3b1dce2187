//! Per-recipient progress tracking.

use std::collections::BTreeMap;

use crate::chain::types::Signature;
use crate::recipients::Recipient;

/// Where a recipient stands within one send run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientState {
    Pending,
    Completed { signature: Signature },
    Failed { reason: String },
}

impl RecipientState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecipientState::Pending)
    }

    /// Label used for metrics and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientState::Pending => "pending",
            RecipientState::Completed { .. } => "completed",
            RecipientState::Failed { .. } => "failed",
        }
    }
}

/// Sink for recipient progress.
///
/// Only the batch submitter writes here, from a single task, so
/// implementations need no locking. Terminal states are final: a recipient
/// that is completed or failed must not change again within a run.
pub trait ProgressLedger: Send {
    /// Start a run: every listed recipient goes back to pending.
    fn mark_pending(&mut self, recipients: &[Recipient]);

    fn mark_completed(&mut self, recipients: &[Recipient], signature: &Signature);

    fn mark_failed(&mut self, recipient: &Recipient, reason: &str);

    /// State of the recipient on `line`, if it is known.
    fn state(&self, line: usize) -> Option<RecipientState>;
}

/// Ledger kept in memory, keyed by source line.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    entries: BTreeMap<usize, (Recipient, RecipientState)>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recipients currently in a state labelled `state`, in line order.
    pub fn in_state(&self, state: &str) -> Vec<Recipient> {
        self.entries
            .values()
            .filter(|(_, s)| s.as_str() == state)
            .map(|(r, _)| r.clone())
            .collect()
    }

    fn settle(&mut self, line: usize, next: RecipientState) {
        match self.entries.get_mut(&line) {
            Some((_, state)) if !state.is_terminal() => *state = next,
            Some((_, state)) => {
                tracing::warn!(line, current = state.as_str(), "Ignoring transition of settled recipient");
            }
            None => tracing::warn!(line, "Ignoring transition of unknown recipient"),
        }
    }
}

impl ProgressLedger for InMemoryLedger {
    fn mark_pending(&mut self, recipients: &[Recipient]) {
        for recipient in recipients {
            self.entries
                .insert(recipient.line, (recipient.clone(), RecipientState::Pending));
        }
    }

    fn mark_completed(&mut self, recipients: &[Recipient], signature: &Signature) {
        for recipient in recipients {
            self.settle(
                recipient.line,
                RecipientState::Completed {
                    signature: signature.clone(),
                },
            );
        }
    }

    fn mark_failed(&mut self, recipient: &Recipient, reason: &str) {
        self.settle(
            recipient.line,
            RecipientState::Failed {
                reason: reason.to_string(),
            },
        );
    }

    fn state(&self, line: usize) -> Option<RecipientState> {
        self.entries.get(&line).map(|(_, state)| state.clone())
    }
}
