//! Fixed-precision amounts and request field checks.
//!
//! Every balance and request amount carries at most eight fractional digits
//! (one satoshi). Values entering the ledger are validated here; values read
//! back from the store are normalized to the same scale.

use sea_orm::prelude::Decimal;

use crate::error::{ AppError, Result };

/// Number of fractional digits kept for every amount.
pub const SCALE: u32 = 8;

/// Rejects zero, negative, and over-precise amounts.
pub fn validate_positive(amount: Decimal, field: &str) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidInput(format!("{} must be greater than zero", field)));
    }

    if amount.normalize().scale() > SCALE {
        return Err(
            AppError::InvalidInput(
                format!("{} supports at most {} fractional digits", field, SCALE)
            )
        );
    }

    Ok(normalize(amount))
}

/// Rounds a stored value to the ledger scale.
pub fn normalize(amount: Decimal) -> Decimal {
    amount.round_dp(SCALE).normalize()
}

/// Rejects blank free-text references such as tx hashes and addresses.
pub fn require_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
