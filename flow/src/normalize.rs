//! Free-text amount normalization.

use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Why a piece of text is not a usable amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatRejection {
    /// Nothing numeric left after stripping.
    #[error("no digits in input")]
    Empty,
    /// Digits present but not a decimal number.
    #[error("not a number")]
    NotANumber,
    /// Zero.
    #[error("amount must be greater than zero")]
    NotPositive,
    /// Minus sign in front of the number.
    #[error("amount cannot be negative")]
    Negative,
    /// Looks like a pasted `0x…` address.
    #[error("input looks like an address")]
    LooksLikeAddress,
}

fn is_separator(c: char) -> bool {
    c == '.' || c == ','
}

/// `0x` followed by a hex digit anywhere in the text, case-insensitive.
fn looks_like_address(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.windows(3).any(|w| {
        w[0] == b'0' && (w[1] == b'x' || w[1] == b'X') && w[2].is_ascii_hexdigit()
    })
}

/// A minus sign that comes before any digit or separator.
fn is_negative(raw: &str) -> bool {
    raw.chars()
        .find(|c| c.is_ascii_digit() || is_separator(*c) || *c == '-')
        == Some('-')
}

/// Parse user text into a strictly positive amount.
///
/// Everything except digits, `.` and `,` is discarded. Either separator is
/// read as a decimal point; when several appear the first one is the decimal
/// point and the rest are dropped, so `"1,234.5"` parses as `1.2345`.
pub fn normalize_amount(raw: &str) -> Result<Decimal, FormatRejection> {
    if looks_like_address(raw) {
        return Err(FormatRejection::LooksLikeAddress);
    }
    if is_negative(raw) {
        return Err(FormatRejection::Negative);
    }

    let mut cleaned = String::with_capacity(raw.len());
    let mut seen_separator = false;
    let mut any_kept = false;
    for c in raw.chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
            any_kept = true;
        } else if is_separator(c) {
            any_kept = true;
            if !seen_separator {
                seen_separator = true;
                cleaned.push('.');
            }
        }
    }

    if !any_kept {
        return Err(FormatRejection::Empty);
    }

    let cleaned = cleaned.trim_end_matches('.');
    if cleaned.is_empty() {
        return Err(FormatRejection::NotANumber);
    }
    let cleaned = if cleaned.starts_with('.') {
        format!("0{}", cleaned)
    } else {
        cleaned.to_string()
    };

    let value = Decimal::from_str(&cleaned).map_err(|_| FormatRejection::NotANumber)?;
    if value <= Decimal::ZERO {
        return Err(FormatRejection::NotPositive);
    }

    Ok(value.normalize())
}
