//! Exact decimal amounts.
//!
//! Token amounts travel as integers in the mint's smallest unit. These
//! helpers convert between that and the decimal text users type, without
//! ever going through floating point.

use thiserror::Error;

/// Reasons an amount string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("not a plain decimal number")]
    Invalid,

    #[error("{found} fractional digits, mint allows {max}")]
    TooManyDecimals { found: usize, max: u8 },

    #[error("amount does not fit in 64 bits")]
    Overflow,
}

/// Parse a decimal string into smallest units, e.g. `("1.5", 6)` → `1_500_000`.
pub fn parse_amount(input: &str, decimals: u8) -> Result<u64, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Invalid);
    }
    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(whole) || !digits_only(frac) {
        return Err(AmountError::Invalid);
    }
    if frac.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals {
            found: frac.len(),
            max: decimals,
        });
    }

    let scale = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or(AmountError::Overflow)?;
    // Both parts are all digits here, so a parse failure can only be overflow.
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| AmountError::Overflow)?
    };
    let frac_units = if frac.is_empty() {
        0
    } else {
        let padding = 10u64.pow((decimals as usize - frac.len()) as u32);
        frac.parse::<u64>().map_err(|_| AmountError::Overflow)? * padding
    };

    whole_units
        .checked_mul(scale)
        .and_then(|units| units.checked_add(frac_units))
        .ok_or(AmountError::Overflow)
}

/// Render smallest units as a decimal string with trailing zeros trimmed.
pub fn format_amount(units: u64, decimals: u8) -> String {
    if decimals == 0 {
        return units.to_string();
    }

    // Past u128 the scale exceeds any u64, so everything is fractional.
    let (whole, frac) = match 10u128.checked_pow(u32::from(decimals)) {
        Some(scale) => (u128::from(units) / scale, u128::from(units) % scale),
        None => (0, u128::from(units)),
    };
    if frac == 0 {
        return whole.to_string();
    }

    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
