//! Recipient input handling.
//!
//! # Data Flow
//! ```text
//! "address, amount" lines
//!     → parser.rs (line validation, address parsing)
//!     → amount.rs (exact decimal → smallest units)
//!     → Vec<Recipient> → partition() → batches
//! ```
//!
//! # Design Decisions
//! - Every input problem is fatal and reported before any submission
//! - Amounts are integers end to end; no floating point

pub mod amount;
pub mod parser;

pub use amount::{format_amount, parse_amount, AmountError};
pub use parser::{parse_recipients, partition, InputError, Recipient};
