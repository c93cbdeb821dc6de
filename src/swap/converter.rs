use crate::models::{Asset, PriceSnapshot, Side};
use bigdecimal::{BigDecimal, RoundingMode};
use num_traits::{ToPrimitive, Zero};
use std::str::FromStr;

/// Compute the amount for the side that was *not* edited.
///
/// `derived = amount * edited_price / other_price`, rounded half-up to two
/// decimals and always rendered with exactly two fractional digits.
///
/// Returns an empty string (clearing the other field) when `amount` is empty
/// or not a finite number, when either price is missing, or when the other
/// side's price is zero.
pub fn convert(
    amount: &str,
    edited_side: Side,
    from_asset: &Asset,
    to_asset: &Asset,
    snapshot: &PriceSnapshot,
) -> String {
    let Some(amount) = parse_amount(amount) else {
        return String::new();
    };

    let (edited, other) = match edited_side {
        Side::From => (from_asset, to_asset),
        Side::To => (to_asset, from_asset),
    };
    let (Some(edited_price), Some(other_price)) =
        (price_decimal(edited, snapshot), price_decimal(other, snapshot))
    else {
        return String::new();
    };
    if other_price.is_zero() {
        return String::new();
    }

    let derived = amount * edited_price / other_price;
    format_fixed_2(&derived)
}

/// USD value of `amount` of `asset` at the snapshot price, as `f64` for
/// display. `None` for invalid input or a missing price.
pub fn usd_value(amount: &str, asset: &Asset, snapshot: &PriceSnapshot) -> Option<f64> {
    let amount = parse_amount(amount)?;
    let price = price_decimal(asset, snapshot)?;
    (amount * price).to_f64().filter(|v| v.is_finite())
}

/// Parse the raw text of a numeric input field. Empty, whitespace,
/// non-numeric text (including `NaN`/`inf`) and values that overflow an
/// `f64` (`1e400`) yield `None`.
///
/// The decimal is rebuilt from the `f64`'s shortest string, which keeps the
/// digit count and exponent bounded for inputs like `1e-100000000`.
pub fn parse_amount(raw: &str) -> Option<BigDecimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = trimmed.parse::<f64>().ok().filter(|v| v.is_finite())?;
    BigDecimal::from_str(&value.to_string()).ok()
}

/// Lift an `f64` price into decimal form via its shortest round-trip string,
/// so `0.49` becomes exactly `0.49` rather than its binary expansion.
fn price_decimal(asset: &Asset, snapshot: &PriceSnapshot) -> Option<BigDecimal> {
    let price = asset.unit_price_usd(snapshot)?;
    if !price.is_finite() {
        return None;
    }
    BigDecimal::from_str(&price.to_string()).ok()
}

/// Round half-up to two decimals and render as `[-]<int>.<2 digits>`.
fn format_fixed_2(value: &BigDecimal) -> String {
    let rounded = value.with_scale_round(2, RoundingMode::HalfUp);
    let (mantissa, scale) = rounded.as_bigint_and_exponent();
    debug_assert_eq!(scale, 2);

    let digits = mantissa.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };
    let padded = format!("{digits:0>3}");
    let (int_part, frac_part) = padded.split_at(padded.len() - 2);
    format!("{sign}{int_part}.{frac_part}")
}
