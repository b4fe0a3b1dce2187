//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Batch of recipients
//!     → TokenProgram (associated accounts, instruction composition)
//!     → TransactionSigner (sign)
//!     → ChainClient (simulate, broadcast, confirm)
//!
//! Consensus verification
//!     → StatusSource (signature status per endpoint)
//! ```
//!
//! # Security Constraints
//! - No key material is held here; signing is delegated
//! - Endpoint URLs may carry API keys and are never logged

pub mod client;
pub mod rpc;
pub mod types;

pub use client::{ChainClient, Instruction, SignerError, StatusSource, TokenProgram, TransactionSigner};
pub use rpc::JsonRpcClient;
pub use types::{
    AccountInfo, Address, AddressError, ChainError, ChainResult, Commitment, ConfirmationTier,
    LatestBlockhash, Signature, SignatureStatus, SignedTransaction, SimulationResult,
    UnsignedTransaction,
};
