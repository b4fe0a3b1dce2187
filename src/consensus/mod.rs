//! Consensus verification subsystem.
//!
//! # Data Flow
//! ```text
//! Landed signature
//!     → verifier.rs (enabled endpoints, concurrent status queries with deadlines)
//!     → outcome.rs (per-endpoint status mapping, finalized count vs threshold)
//!     → ConsensusOutcome (logged and attached to the batch report)
//! ```
//!
//! # Design Decisions
//! - Only `finalized` counts toward quorum; `confirmed` is still a successful lookup
//! - Results keep registry order regardless of which endpoint answers first
//! - A missed quorum is a warning, never a reason to retry or un-complete

pub mod outcome;
pub mod verifier;

pub use outcome::{ConsensusOutcome, VerificationResult, VerificationStatus};
pub use verifier::ConsensusVerifier;
