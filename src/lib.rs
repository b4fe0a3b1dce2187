//! Adaptive batch token sender with multi-endpoint finality verification.

pub mod chain;
pub mod config;
pub mod consensus;
pub mod endpoints;
pub mod lifecycle;
pub mod observability;
pub mod recipients;
pub mod resilience;
pub mod sender;

pub use config::schema::SenderConfig;
pub use consensus::{ConsensusOutcome, ConsensusVerifier};
pub use lifecycle::StopSignal;
pub use sender::{SendError, SendOutcome, SendRequest, SendSession};
