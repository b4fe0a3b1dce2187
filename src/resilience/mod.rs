//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Batch attempt fails:
//!     → backoff.rs (wait before the simulated retry)
//!
//! Endpoint status query:
//!     → timeouts.rs (per-endpoint deadline, expiry becomes a result, not a panic)
//! ```
//!
//! # Design Decisions
//! - Every verification query has a deadline
//! - Jittered backoff keeps retries from hitting the node in lockstep

pub mod backoff;
pub mod timeouts;

pub use backoff::{calculate_backoff, retry_delay};
pub use timeouts::within;
