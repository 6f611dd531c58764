use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

/// Money is persisted as integer cents to avoid floating-point precision issues.
/// For EUR/USD, 1 unit = 100 cents, so €50.00 = 5000 cents.
pub type Cents = i64;

/// Number of fractional digits kept for every amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Normalise an amount to exactly two fractional digits.
///
/// Amounts are magnitudes: negative input is rejected rather than silently flipped.
/// Extra precision is rounded half away from zero ("10.005" -> "10.01").
pub fn normalize_amount(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount < Decimal::ZERO {
        return Err(AmountError::Negative);
    }

    let mut rounded =
        amount.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AMOUNT_SCALE);
    if rounded.scale() != AMOUNT_SCALE {
        return Err(AmountError::OutOfRange);
    }
    Ok(rounded)
}

/// Convert an amount into cents, normalising it first.
/// Example: 50.00 -> 5000, 12.5 -> 1250
pub fn to_cents(amount: Decimal) -> Result<Cents, AmountError> {
    let normalized = normalize_amount(amount)?;
    Cents::try_from(normalized.mantissa()).map_err(|_| AmountError::OutOfRange)
}

/// Convert cents back into a two-digit decimal.
/// Example: 5000 -> 50.00, 1 -> 0.01
pub fn from_cents(cents: Cents) -> Decimal {
    Decimal::new(cents, AMOUNT_SCALE)
}

/// Parse a decimal string into a normalised amount.
/// Example: "50" -> 50.00, " 12.345 " -> 12.35
pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let parsed = Decimal::from_str(input.trim()).map_err(|_| AmountError::InvalidFormat)?;
    normalize_amount(parsed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    InvalidFormat,
    Negative,
    OutOfRange,
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::InvalidFormat => write!(f, "invalid money format"),
            AmountError::Negative => write!(f, "amount must not be negative"),
            AmountError::OutOfRange => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for AmountError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_normalize_pads_to_two_digits() {
        let amount = normalize_amount(dec("50")).unwrap();
        assert_eq!(amount.to_string(), "50.00");
        assert_eq!(amount.scale(), 2);
    }

    #[test]
    fn test_normalize_rounds_half_away_from_zero() {
        assert_eq!(normalize_amount(dec("10.005")).unwrap().to_string(), "10.01");
        assert_eq!(normalize_amount(dec("10.004")).unwrap().to_string(), "10.00");
        assert_eq!(normalize_amount(dec("0.125")).unwrap().to_string(), "0.13");
    }

    #[test]
    fn test_normalize_rejects_negative() {
        assert_eq!(normalize_amount(dec("-0.01")), Err(AmountError::Negative));
        assert_eq!(normalize_amount(dec("-0.001")), Err(AmountError::Negative));
    }

    #[test]
    fn test_zero_is_a_valid_amount() {
        assert_eq!(to_cents(Decimal::ZERO), Ok(0));
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(to_cents(dec("50.00")), Ok(5000));
        assert_eq!(to_cents(dec("12.5")), Ok(1250));
        assert_eq!(to_cents(dec("0.01")), Ok(1));
        assert_eq!(from_cents(5500).to_string(), "55.00");
        assert_eq!(from_cents(1).to_string(), "0.01");
    }

    #[test]
    fn test_cents_overflow() {
        assert_eq!(to_cents(Decimal::MAX), Err(AmountError::OutOfRange));
        assert_eq!(
            to_cents(dec("100000000000000000000")),
            Err(AmountError::OutOfRange)
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50").unwrap().to_string(), "50.00");
        assert_eq!(parse_amount(" 12.345 ").unwrap().to_string(), "12.35");
        assert_eq!(parse_amount("abc"), Err(AmountError::InvalidFormat));
        assert_eq!(parse_amount("12.34.56"), Err(AmountError::InvalidFormat));
        assert_eq!(parse_amount("-5"), Err(AmountError::Negative));
    }
}
