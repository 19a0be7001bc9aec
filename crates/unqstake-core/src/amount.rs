//! Conversion between raw integer balances and decimal display strings.
//!
//! All arithmetic is done on digit strings or [`Balance`] integers; amounts
//! never pass through floating point, so values of any magnitude keep every
//! digit.

use thiserror::Error;

use crate::types::Balance;

/// Fraction digits shown on screen unless a caller asks otherwise.
pub const DEFAULT_DISPLAY_DECIMALS: u8 = 4;

/// Label shown for a non-zero amount that truncates to zero.
pub const NEGLIGIBLE_LABEL: &str = "≈0";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount: {0:?}")]
    Invalid(String),

    #[error("Amount does not fit in a balance: {0}")]
    Overflow(String),
}

/// Display form of an amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedAmount {
    /// Truncated decimal text. `"0"` for zero and for negligible amounts.
    pub text: String,
    /// True when the amount is non-zero but every displayed digit is zero.
    pub is_negligible: bool,
    /// Every fraction digit, zero-padded to the token's decimals.
    pub full_precision: String,
}

impl FormattedAmount {
    /// Text to render, with negligible amounts shown as `≈0`.
    pub fn label(&self) -> &str {
        if self.is_negligible {
            NEGLIGIBLE_LABEL
        } else {
            &self.text
        }
    }
}

/// Digits of a raw integer string with leading zeros removed (`"0"` for
/// zero). `None` unless the trimmed input is a non-empty run of ASCII digits.
fn raw_digits(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let trimmed = raw.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed })
}

/// Parse a raw integer string such as `"1500000000000000000"`.
pub fn parse_raw(raw: &str) -> Option<Balance> {
    raw_digits(raw).and_then(|digits| Balance::from_dec_str(digits).ok())
}

/// `10^decimals`, the raw value of one whole token.
pub fn one_token(decimals: u8) -> Option<Balance> {
    Balance::from(10u8).checked_pow(Balance::from(decimals))
}

/// Split a digit string into whole digits and a fraction left-padded to
/// `decimals` digits.
fn split_digits(digits: &str, decimals: u8) -> (String, String) {
    let decimals = decimals as usize;
    if decimals == 0 {
        return (digits.to_string(), String::new());
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let split = padded.len() - decimals;
    (padded[..split].to_string(), padded[split..].to_string())
}

fn truncate_digits(digits: &str, decimals: u8, places: u8) -> String {
    let (whole, fraction) = split_digits(digits, decimals);
    let places = places as usize;
    if places == 0 {
        return whole;
    }
    let mut shown: String = fraction.chars().take(places).collect();
    while shown.len() < places {
        shown.push('0');
    }
    format!("{whole}.{shown}")
}

fn format_digits(digits: &str, decimals: u8, display_decimals: u8) -> FormattedAmount {
    let full_precision = truncate_digits(digits, decimals, decimals);
    if digits == "0" {
        return FormattedAmount {
            text: "0".to_string(),
            is_negligible: false,
            full_precision,
        };
    }

    let text = truncate_digits(digits, decimals, display_decimals);
    if text.bytes().all(|b| b == b'0' || b == b'.') {
        return FormattedAmount {
            text: "0".to_string(),
            is_negligible: true,
            full_precision,
        };
    }

    FormattedAmount {
        text,
        is_negligible: false,
        full_precision,
    }
}

/// Render with exactly `places` fraction digits, truncating (never rounding).
pub fn format_truncated(raw: Balance, decimals: u8, places: u8) -> String {
    truncate_digits(&raw.to_string(), decimals, places)
}

/// Render every fraction digit, e.g. `"1.500000000000000000"` at 18 decimals.
pub fn format_full_precision(raw: Balance, decimals: u8) -> String {
    format_truncated(raw, decimals, decimals)
}

/// Drop trailing fraction zeros (and a bare point) from a decimal string.
pub fn trim_fraction(text: &str) -> String {
    match text.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => text.to_string(),
    }
}

/// Full precision with trailing fraction zeros removed, e.g. `"100"`, `"0.15"`.
pub fn format_trimmed(raw: Balance, decimals: u8) -> String {
    trim_fraction(&format_full_precision(raw, decimals))
}

/// Format a raw balance for display, truncated to `display_decimals` digits.
pub fn format_display(raw: Balance, decimals: u8, display_decimals: u8) -> FormattedAmount {
    format_digits(&raw.to_string(), decimals, display_decimals)
}

/// Format a raw integer string of any length. `None` when it is not a run
/// of digits.
pub fn format_raw(raw: &str, decimals: u8, display_decimals: u8) -> Option<FormattedAmount> {
    raw_digits(raw).map(|digits| format_digits(digits, decimals, display_decimals))
}

/// Format a raw integer string. Malformed input formats as `"0"`.
pub fn display(raw: &str, decimals: u8, display_decimals: u8) -> String {
    match format_raw(raw, decimals, display_decimals) {
        Some(formatted) => formatted.text,
        None => {
            tracing::debug!("Unparseable raw amount {:?}, displaying as 0", raw);
            "0".to_string()
        }
    }
}

/// Convert a decimal amount string into a raw integer string.
///
/// Accepts `^\d+(\.\d+)?$` only. Fraction digits beyond `decimals` are
/// dropped, not rounded.
pub fn to_integer(amount: &str, decimals: u8) -> Result<String, AmountError> {
    let (whole, fraction) = match amount.split_once('.') {
        Some((whole, fraction)) => {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AmountError::Invalid(amount.to_string()));
            }
            (whole, fraction)
        }
        None => (amount, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::Invalid(amount.to_string()));
    }

    let decimals = decimals as usize;
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.extend(fraction.chars().take(decimals));
    for _ in fraction.len().min(decimals)..decimals {
        digits.push('0');
    }

    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        Ok("0".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

/// Convert a decimal amount string into a [`Balance`].
pub fn parse_decimal(amount: &str, decimals: u8) -> Result<Balance, AmountError> {
    let digits = to_integer(amount, decimals)?;
    Balance::from_dec_str(&digits).map_err(|_| AmountError::Overflow(amount.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: u128) -> Balance {
        Balance::from(n) * Balance::from(1_000_000_000_000_000_000u128)
    }

    // ==================== Display Tests ====================

    #[test]
    fn test_display_zero() {
        assert_eq!(display("0", 18, 4), "0");
        let formatted = format_display(Balance::zero(), 18, 4);
        assert!(!formatted.is_negligible);
        assert_eq!(formatted.label(), "0");
    }

    #[test]
    fn test_display_one_token() {
        assert_eq!(display("1000000000000000000", 18, 4), "1.0000");
    }

    #[test]
    fn test_display_truncates_not_rounds() {
        // 1.99999 UNQ
        assert_eq!(display("1999990000000000000", 18, 4), "1.9999");
    }

    #[test]
    fn test_display_negligible() {
        let formatted = format_display(Balance::one(), 18, 4);
        assert!(formatted.is_negligible);
        assert_eq!(formatted.text, "0");
        assert_eq!(formatted.label(), "≈0");
        assert_eq!(formatted.full_precision, "0.000000000000000001");
    }

    #[test]
    fn test_display_small_but_visible() {
        let formatted = format_display(Balance::from(100_000_000_000_000u64), 18, 4);
        assert!(!formatted.is_negligible);
        assert_eq!(formatted.text, "0.0001");
    }

    #[test]
    fn test_display_malformed_is_zero() {
        assert_eq!(display("abc", 18, 4), "0");
        assert_eq!(display("", 18, 4), "0");
        assert_eq!(display("-5", 18, 4), "0");
        assert_eq!(display("1.5", 18, 4), "0");
    }

    #[test]
    fn test_display_zero_decimals() {
        assert_eq!(display("12345", 0, 4), "12345.0000");
        assert_eq!(display("12345", 0, 0), "12345");
    }

    #[test]
    fn test_display_huge_value() {
        // Far beyond what an f64 can hold exactly.
        let raw = "123456789012345678901234567890123456789";
        assert_eq!(display(raw, 18, 4), "123456789012345678901.2345");
    }

    #[test]
    fn test_display_beyond_balance_width() {
        // 10^78 does not fit in 256 bits.
        let raw = format!("1{}", "0".repeat(78));
        assert!(parse_raw(&raw).is_none());
        assert_eq!(display(&raw, 18, 4), format!("1{}.0000", "0".repeat(60)));

        let full = display(&raw, 18, 18);
        assert_eq!(to_integer(&full, 18).unwrap(), raw);
    }

    #[test]
    fn test_format_raw_leading_zeros() {
        let formatted = format_raw("0001500000000000000000", 18, 4).unwrap();
        assert_eq!(formatted.text, "1.5000");
        assert_eq!(format_raw("000", 18, 4).unwrap().text, "0");
        assert!(format_raw("12a", 18, 4).is_none());
    }

    #[test]
    fn test_full_precision() {
        let raw = Balance::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_full_precision(raw, 18), "1.500000000000000000");
        assert_eq!(format_display(raw, 18, 4).text, "1.5000");
    }

    #[test]
    fn test_format_trimmed() {
        assert_eq!(format_trimmed(tokens(100), 18), "100");
        assert_eq!(
            format_trimmed(Balance::from(150_000_000_000_000_000u128), 18),
            "0.15"
        );
        assert_eq!(format_trimmed(Balance::zero(), 18), "0");
    }

    #[test]
    fn test_one_token() {
        assert_eq!(one_token(18), Some(tokens(1)));
        assert_eq!(one_token(0), Some(Balance::one()));
        assert_eq!(one_token(200), None);
    }

    // ==================== toInteger Tests ====================

    #[test]
    fn test_to_integer_whole() {
        assert_eq!(to_integer("100", 18).unwrap(), "100000000000000000000");
    }

    #[test]
    fn test_to_integer_fraction() {
        assert_eq!(to_integer("0.15", 18).unwrap(), "150000000000000000");
        assert_eq!(to_integer("1.5", 2).unwrap(), "150");
    }

    #[test]
    fn test_to_integer_truncates_excess_fraction() {
        assert_eq!(to_integer("1.23456", 2).unwrap(), "123");
    }

    #[test]
    fn test_to_integer_zero() {
        assert_eq!(to_integer("0", 18).unwrap(), "0");
        assert_eq!(to_integer("0.0", 18).unwrap(), "0");
        assert_eq!(to_integer("000.000", 4).unwrap(), "0");
    }

    #[test]
    fn test_to_integer_rejects_malformed() {
        for input in ["", ".", "1.", ".5", "-1", "1e5", "1,5", "1.2.3", " 1"] {
            assert!(
                matches!(to_integer(input, 18), Err(AmountError::Invalid(_))),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("999.85", 18).unwrap(), tokens(99985) / 100);
    }

    #[test]
    fn test_parse_decimal_overflow() {
        let huge = "9".repeat(90);
        assert!(matches!(
            parse_decimal(&huge, 18),
            Err(AmountError::Overflow(_))
        ));
    }
}
