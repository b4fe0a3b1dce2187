//! Chain value types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Decoded size of every account address.
pub const ADDRESS_LEN: usize = 32;

/// Account address: base58 text of a 32-byte public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

/// Reasons an address string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("not valid base58: {0}")]
    Decode(#[from] bs58::decode::Error),

    #[error("address decodes to {0} bytes, expected 32")]
    Length(usize),
}

impl Address {
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bs58::encode(bytes).into_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bytes = bs58::decode(s).into_vec()?;
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::Length(bytes.len()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction signature as reported by the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(pub String);

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Signature {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Commitment level requested from a node, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confirmation tier a node reports for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationTier {
    Processed,
    Confirmed,
    Finalized,
    /// Anything the node reported that is not a known tier (kept verbatim).
    Unrecognized(String),
}

impl ConfirmationTier {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "processed" => ConfirmationTier::Processed,
            "confirmed" => ConfirmationTier::Confirmed,
            "finalized" => ConfirmationTier::Finalized,
            other => ConfirmationTier::Unrecognized(other.to_string()),
        }
    }

    /// True when this tier is at least as strong as `commitment`.
    pub fn satisfies(&self, commitment: Commitment) -> bool {
        let reached = match self {
            ConfirmationTier::Processed => Commitment::Processed,
            ConfirmationTier::Confirmed => Commitment::Confirmed,
            ConfirmationTier::Finalized => Commitment::Finalized,
            ConfirmationTier::Unrecognized(_) => return false,
        };
        reached >= commitment
    }
}

/// A recent blockhash together with the last block height it is valid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: String,
    pub last_valid_block_height: u64,
}

/// Account state returned by `getAccountInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub owner: String,
    pub lamports: u64,
    pub data: Vec<u8>,
}

/// Result of a dry-run submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationResult {
    pub err: Option<serde_json::Value>,
    pub logs: Vec<String>,
}

/// Status of a signature as seen by one node.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureStatus {
    pub tier: ConfirmationTier,
    /// Raw execution error payload, if the transaction failed on-chain.
    pub err: Option<serde_json::Value>,
}

/// Serialized transaction awaiting a signature. Produced by a [`TokenProgram`](crate::chain::TokenProgram).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction(pub Vec<u8>);

/// Wire-ready signed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub bytes: Vec<u8>,
    pub signature: Signature,
}

/// Errors that can occur while talking to a node.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered with something we could not interpret.
    #[error("Malformed RPC response: {0}")]
    Malformed(String),

    /// The blockhash expired before the transaction reached the requested commitment.
    #[error("Transaction not confirmed before block height {last_valid_block_height}")]
    ConfirmationTimeout { last_valid_block_height: u64 },

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// Address derivation or transaction composition failed.
    #[error("Program error: {0}")]
    Program(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
