//! Recipient list parsing.

use thiserror::Error;

use crate::chain::types::{Address, AddressError};
use crate::recipients::amount::{parse_amount, AmountError};

/// One transfer line item.
///
/// `line` is the identity: the same address may appear on several lines and
/// each one is sent independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// 1-based line in the source list.
    pub line: usize,
    pub address: Address,
    /// Smallest units, always greater than zero.
    pub amount: u64,
}

/// Input problems that stop a send before anything is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("line {line}: expected `address, amount`, got {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("line {line}: invalid address {address:?}: {source}")]
    InvalidAddress {
        line: usize,
        address: String,
        source: AddressError,
    },

    #[error("line {line}: invalid amount {amount:?}: {source}")]
    InvalidAmount {
        line: usize,
        amount: String,
        source: AmountError,
    },

    #[error("line {line}: amount must be greater than zero")]
    NonPositiveAmount { line: usize },

    #[error("recipient list is empty")]
    EmptyList,

    #[error("mint is not configured")]
    MintNotConfigured,

    #[error("invalid mint address {address:?}: {source}")]
    InvalidMint {
        address: String,
        source: AddressError,
    },

    #[error("mint account {0} not found")]
    MintNotFound(String),

    #[error("batch size {size} is outside 1..={max}")]
    BatchSize { size: usize, max: usize },
}

/// Parse newline-delimited `address, amount` lines.
///
/// Fields may be separated by a comma, spaces or tabs. Blank lines and lines
/// starting with `#` are skipped. Amounts are decimal text converted with
/// `decimals`.
pub fn parse_recipients(text: &str, decimals: u8) -> Result<Vec<Recipient>, InputError> {
    let mut recipients = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        let [address, amount] = fields[..] else {
            return Err(InputError::MalformedLine {
                line,
                content: content.to_string(),
            });
        };

        let address: Address = address.parse().map_err(|source| InputError::InvalidAddress {
            line,
            address: address.to_string(),
            source,
        })?;

        if amount.starts_with('-') {
            return Err(InputError::NonPositiveAmount { line });
        }
        let units = parse_amount(amount, decimals).map_err(|source| InputError::InvalidAmount {
            line,
            amount: amount.to_string(),
            source,
        })?;
        if units == 0 {
            return Err(InputError::NonPositiveAmount { line });
        }

        recipients.push(Recipient {
            line,
            address,
            amount: units,
        });
    }

    if recipients.is_empty() {
        return Err(InputError::EmptyList);
    }
    Ok(recipients)
}

/// Split recipients into consecutive batches of at most `batch_size`, keeping order.
pub fn partition(
    recipients: &[Recipient],
    batch_size: usize,
    max_size: usize,
) -> Result<Vec<Vec<Recipient>>, InputError> {
    if batch_size == 0 || batch_size > max_size {
        return Err(InputError::BatchSize {
            size: batch_size,
            max: max_size,
        });
    }
    Ok(recipients.chunks(batch_size).map(<[Recipient]>::to_vec).collect())
}
