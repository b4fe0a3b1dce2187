//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Sender and verifier produce:
//!     → logging.rs (structured log events, one run_id span per send)
//!     → metrics.rs (attempt, split, recipient and consensus counters)
//!
//! Consumers:
//!     → stdout via the fmt layer
//!     → any metrics recorder the embedding process installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (`batch`, `depth`, `size`, `signature`, `endpoint`) over prose
//! - Endpoint URLs are never logged, only labels

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
