//! Batch sending subsystem.
//!
//! # Data Flow
//! ```text
//! SendRequest (mint, recipient text, batch size)
//!     → session.rs (validate, mark pending, batches in order, stop check)
//!     → batch.rs (attempt → simulated retry → midpoint split)
//!     → builder.rs (fresh account lookups and blockhash per attempt)
//!     → ChainClient / TransactionSigner
//!     → ledger.rs (completed / failed per recipient)
//!     → ConsensusVerifier (advisory, after each landed transaction)
//! ```
//!
//! # Design Decisions
//! - Batches never overlap: batch i+1 starts after batch i is fully resolved
//! - The ledger is written from one task only, so it needs no locking
//! - Every attempted recipient ends completed or failed

pub mod batch;
pub mod builder;
pub mod ledger;
pub mod session;

pub use batch::{AttemptError, BatchReport, BatchSubmitter, LandedTransaction};
pub use builder::{BuiltTransaction, TransferBuilder};
pub use ledger::{InMemoryLedger, ProgressLedger, RecipientState};
pub use session::{SendError, SendOutcome, SendRequest, SendSession, SessionBuilder};
