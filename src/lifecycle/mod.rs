//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Stop (stop.rs):
//!     trigger() → flag set → checked at the top of the next batch → run ends
//! ```
//!
//! # Design Decisions
//! - No mid-batch cancellation: a broadcast submission is always awaited
//! - Recipients of unstarted batches stay pending and are reported as such

pub mod stop;

pub use stop::StopSignal;
