// ABOUTME: Monetary amounts as rust_decimal values with two-place precision
// ABOUTME: Converts to integer minor units for storage and formats grouped amounts for reports
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitClub Contributors

use crate::errors::{AppError, AppResult};
use rust_decimal::prelude::ToPrimitive;
pub use rust_decimal::Decimal;

/// Decimal places kept for every amount
pub const MONEY_SCALE: u32 = 2;

const MINOR_PER_MAJOR: i64 = 100;

/// Amount from stored minor units (kopecks, cents), always at two places
#[must_use]
pub fn from_minor(minor: i64) -> Decimal {
    Decimal::new(minor, MONEY_SCALE)
}

/// Amount in minor units for storage
///
/// # Errors
///
/// Returns `VALUE_OUT_OF_RANGE` when the amount has more than two decimal
/// places or does not fit in 64 bits of minor units
pub fn to_minor(field: &str, amount: Decimal) -> AppResult<i64> {
    validate_scale(field, amount)?;
    amount
        .checked_mul(Decimal::from(MINOR_PER_MAJOR))
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| AppError::out_of_range(field, "Amount is too large"))
}

/// Reject amounts with more than two significant decimal places
///
/// `10.50` and `10.500` are accepted, `10.005` is not.
///
/// # Errors
///
/// Returns `VALUE_OUT_OF_RANGE` naming the field
pub fn validate_scale(field: &str, amount: Decimal) -> AppResult<()> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AppError::out_of_range(
            field,
            "Amount must have at most two decimal places",
        ));
    }
    Ok(())
}

/// Render with thousands separators and two places, e.g. `12,500.00`
#[must_use]
pub fn grouped(amount: Decimal) -> String {
    let plain = format!("{:.2}", amount.round_dp(MONEY_SCALE));
    let (sign, rest) = plain
        .strip_prefix('-')
        .map_or(("", plain.as_str()), |r| ("-", r));
    let (whole, fraction) = rest.split_once('.').unwrap_or((rest, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(from_minor(150_050), dec("1500.50"));
        assert_eq!(from_minor(150_000).to_string(), "1500.00");
        assert_eq!(to_minor("amount", dec("1500.5")).unwrap(), 150_050);
        assert_eq!(to_minor("amount", dec("-12.30")).unwrap(), -1230);
        assert_eq!(to_minor("amount", dec("7.000")).unwrap(), 700);
        assert!(to_minor("amount", dec("12.345")).is_err());
    }

    #[test]
    fn test_grouping() {
        assert_eq!(grouped(dec("1234567.89")), "1,234,567.89");
        assert_eq!(grouped(dec("999")), "999.00");
        assert_eq!(grouped(dec("-1000")), "-1,000.00");
        assert_eq!(grouped(dec("0.5")), "0.50");
    }

    #[test]
    fn test_json_accepts_strings_and_numbers() {
        let from_str: Decimal = serde_json::from_str("\"2500.50\"").unwrap();
        let from_int: Decimal = serde_json::from_str("2500").unwrap();
        let from_float: Decimal = serde_json::from_str("19.99").unwrap();
        assert_eq!(from_str, dec("2500.5"));
        assert_eq!(from_int, dec("2500"));
        assert_eq!(from_float, dec("19.99"));
        assert_eq!(serde_json::to_string(&from_minor(1999)).unwrap(), "\"19.99\"");
    }
}
