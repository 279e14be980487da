//! Conversion between smallest-unit integers and human-scale amounts.
//!
//! Display values are lossy `f64`s meant for presentation only. Anything that ends up on chain
//! goes through [`to_raw`], which scales with fixed-point arithmetic on [`U256`] and truncates
//! fractional digits beyond the unit's precision.

use crate::error::AmountError;
use alloy::primitives::{
    utils::{format_units, parse_units},
    U256,
};

/// Decimal precision of the chain's native asset.
pub const NATIVE_DECIMALS: u8 = 18;

/// Converts a raw smallest-unit amount into a display value.
///
/// Returns `0.0` while either the raw value or the precision is still unknown.
pub fn to_display(raw: Option<U256>, decimals: Option<u8>) -> f64 {
    let (Some(raw), Some(decimals)) = (raw, decimals) else {
        return 0.0;
    };
    format_units(raw, decimals).ok().and_then(|value| value.parse::<f64>().ok()).unwrap_or_default()
}

/// Scales a human-entered decimal amount into smallest units, truncating toward zero.
pub fn to_raw(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let normalized = normalize(amount, decimals)?;
    let scaled = parse_units(&normalized, decimals)?.get_absolute();

    // `parse_units` wraps on overflow, so recompute the whole part with checked math.
    let whole = normalized.split('.').next().unwrap_or_default();
    let unit = U256::from(10u64).pow(U256::from(decimals));
    let fits = U256::from_str_radix(whole, 10)
        .ok()
        .and_then(|whole| whole.checked_mul(unit))
        .is_some_and(|floor| scaled >= floor);
    if !fits {
        return Err(AmountError::Overflow(amount.to_string()));
    }

    Ok(scaled)
}

/// Validates `amount` as a non-negative decimal and drops fractional digits past `decimals`.
fn normalize(amount: &str, decimals: u8) -> Result<String, AmountError> {
    let trimmed = amount.trim();
    let (int, frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !is_digits(int) || !is_digits(frac) {
        return Err(AmountError::Invalid(amount.to_string()));
    }

    let int = if int.is_empty() { "0" } else { int };
    let frac = &frac[..frac.len().min(decimals as usize)];
    if frac.is_empty() {
        Ok(int.to_string())
    } else {
        Ok(format!("{int}.{frac}"))
    }
}
