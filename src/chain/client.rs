//! Contracts for the collaborators the sender drives.
//!
//! # Responsibilities
//! - `ChainClient`: submit, simulate, confirm and query against one node
//! - `TransactionSigner`: turn a composed transaction into a signed one
//! - `TokenProgram`: derive token accounts and compose instructions
//! - `StatusSource`: per-endpoint signature status lookups for verification
//!
//! Nothing here signs or encodes; implementations live outside the core
//! (see `rpc.rs` for the JSON-RPC node client).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chain::types::{
    AccountInfo, Address, ChainResult, Commitment, LatestBlockhash, Signature, SignatureStatus,
    SignedTransaction, SimulationResult, UnsignedTransaction,
};
use crate::endpoints::Endpoint;

/// Node operations used while submitting batches.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch an account, `None` when it does not exist.
    async fn get_account_info(
        &self,
        address: &Address,
        commitment: Commitment,
    ) -> ChainResult<Option<AccountInfo>>;

    async fn get_latest_blockhash(&self, commitment: Commitment) -> ChainResult<LatestBlockhash>;

    /// Dry-run a transaction and return the program logs.
    async fn simulate(&self, tx: &UnsignedTransaction) -> ChainResult<SimulationResult>;

    /// Broadcast a signed transaction.
    async fn send_raw(&self, tx: &SignedTransaction) -> ChainResult<Signature>;

    /// Wait until `signature` reaches `commitment` or `blockhash` expires.
    ///
    /// Returns the on-chain execution error, if any. Expiry is reported as
    /// [`ChainError::ConfirmationTimeout`](crate::chain::ChainError::ConfirmationTimeout).
    async fn confirm(
        &self,
        signature: &Signature,
        blockhash: &LatestBlockhash,
        commitment: Commitment,
    ) -> ChainResult<Option<serde_json::Value>>;

    async fn get_signature_status(
        &self,
        signature: &Signature,
        search_history: bool,
    ) -> ChainResult<Option<SignatureStatus>>;
}

/// Errors a signer may report.
#[derive(Debug, Clone, Error)]
pub enum SignerError {
    #[error("signing request rejected by user")]
    UserRejected,

    #[error("signing failed: {0}")]
    Other(String),
}

/// Holder of the fee-payer key.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// The paying (and token-owning) account.
    fn payer(&self) -> Address;

    async fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction, SignerError>;
}

/// One instruction of a batch transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    /// Create the associated token account `account` for `owner`.
    CreateAssociatedAccount {
        payer: Address,
        owner: Address,
        mint: Address,
        account: Address,
    },
    /// Move `amount` smallest units from `source` to `destination`.
    Transfer {
        source: Address,
        destination: Address,
        owner: Address,
        mint: Address,
        amount: u64,
    },
}

/// Token-program knowledge the core needs but does not own.
pub trait TokenProgram: Send + Sync {
    /// Deterministic token account for an owner and mint.
    fn associated_account(&self, owner: &Address, mint: &Address) -> ChainResult<Address>;

    /// Decimal places of a mint, decoded from its account data.
    fn mint_decimals(&self, mint_account: &AccountInfo) -> ChainResult<u8>;

    /// Serialize `instructions` into one transaction paid for by `payer`.
    fn compose(
        &self,
        payer: &Address,
        instructions: &[Instruction],
        blockhash: &LatestBlockhash,
    ) -> ChainResult<UnsignedTransaction>;
}

/// Signature status lookups against an arbitrary endpoint.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Query `signature` on `endpoint`, searching full history.
    async fn signature_status(
        &self,
        endpoint: &Endpoint,
        signature: &Signature,
    ) -> ChainResult<Option<SignatureStatus>>;
}
