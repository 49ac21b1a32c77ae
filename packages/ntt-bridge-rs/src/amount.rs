//! Token amount conversion
//!
//! Amounts arrive as decimal strings typed by the user and leave as raw token
//! units. Conversion is exact; there is no floating point anywhere on the path
//! to a transaction.

use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};

use crate::error::{TransferError, TransferResult};

fn invalid_amount(input: &str, reason: impl Into<String>) -> TransferError {
    TransferError::InvalidAmount(format!("{:?}: {}", input, reason.into()))
}

/// Split a decimal string into whole and fractional digits
fn split_decimal(trimmed: &str) -> TransferResult<(&str, &str)> {
    if trimmed.is_empty() {
        return Err(invalid_amount(trimmed, "amount is required"));
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid_amount(trimmed, "not a number"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid_amount(
            trimmed,
            "only digits and one decimal point are allowed",
        ));
    }
    Ok((whole, fraction))
}

/// Reject input that cannot be an amount for any token
///
/// Precision depends on the token's decimals and is left to [`parse_amount`].
pub fn check_amount_syntax(input: &str) -> TransferResult<()> {
    split_decimal(input.trim()).map(|_| ())
}

/// Convert a user-entered decimal string to raw units of a token with `decimals`
pub fn parse_amount(input: &str, decimals: u8) -> TransferResult<U256> {
    let trimmed = input.trim();
    let invalid = |reason: String| invalid_amount(trimmed, reason);

    let (whole, fraction) = split_decimal(trimmed)?;
    if fraction.len() > decimals as usize {
        return Err(invalid(format!(
            "token supports at most {} decimal places",
            decimals
        )));
    }

    let normalized = format!(
        "{}.{}",
        if whole.is_empty() { "0" } else { whole },
        if fraction.is_empty() { "0" } else { fraction }
    );

    let units = parse_units(&normalized, decimals)
        .map_err(|e| invalid(e.to_string()))?
        .get_absolute();

    if units.is_zero() {
        return Err(invalid("amount must be greater than zero".to_string()));
    }

    Ok(units)
}

/// Render raw units as a trimmed decimal string
pub fn format_amount(units: U256, decimals: u8) -> String {
    match format_units(units, decimals) {
        Ok(formatted) if formatted.contains('.') => {
            let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        }
        Ok(formatted) => formatted,
        Err(_) => units.to_string(),
    }
}
