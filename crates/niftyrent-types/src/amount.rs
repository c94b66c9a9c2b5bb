//! Fixed-point conversion between UI amounts and on-chain base units.
//!
//! The UI works with at most [`UI_PRECISION`] fractional digits. A token with
//! `decimals = d` is scaled as `milli_units * 10^(d - 3)`, so every base-unit
//! amount produced here is an exact integer. Going back with
//! [`from_base_units`] truncates anything below one milli-unit: it is a lossy
//! inverse, not a bug.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::RentalError;
use crate::token::TokenMetadata;

/// Fractional digits reserved for UI-facing amounts.
pub const UI_PRECISION: u8 = 3;

const MILLI: u128 = 1_000;

/// Quantity of a fungible token in its smallest indivisible unit.
///
/// Crosses every wire boundary as a decimal-integer string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(pub u128);

impl TokenAmount {
    pub const ZERO: Self = Self(0);

    pub fn as_u128(self) -> u128 {
        self.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

impl From<u128> for TokenAmount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenAmount {
    type Err = RentalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RentalError::InvalidAmount(format!(
                "expected decimal integer, got {s:?}"
            )));
        }
        s.parse::<u128>()
            .map(Self)
            .map_err(|_| RentalError::AmountOverflow)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = TokenAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal-integer string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(AmountVisitor)
    }
}

/// `10^(decimals - 3)`, the base units per UI milli-unit.
pub fn scale_factor(metadata: &TokenMetadata) -> Result<u128, RentalError> {
    let exponent = metadata
        .decimals
        .checked_sub(UI_PRECISION)
        .ok_or(RentalError::InvalidPrecision {
            decimals: metadata.decimals,
        })?;
    10u128
        .checked_pow(u32::from(exponent))
        .ok_or(RentalError::AmountOverflow)
}

/// `round(decimal_amount * 1000) * 10^(decimals - 3)`.
///
/// The float step only yields the integer milli-unit count; scaling is exact.
pub fn to_base_units(
    metadata: &TokenMetadata,
    decimal_amount: f64,
) -> Result<TokenAmount, RentalError> {
    if !decimal_amount.is_finite() || decimal_amount < 0.0 {
        return Err(RentalError::InvalidAmount(format!(
            "{decimal_amount} is not a non-negative number"
        )));
    }
    let scale = scale_factor(metadata)?;
    let milli = (decimal_amount * MILLI as f64).round();
    if milli >= u128::MAX as f64 {
        return Err(RentalError::AmountOverflow);
    }
    (milli as u128)
        .checked_mul(scale)
        .map(TokenAmount)
        .ok_or(RentalError::AmountOverflow)
}

/// Same conversion as [`to_base_units`] from decimal text, integers only.
/// Digits past the third fractional digit round half-up.
pub fn parse_to_base_units(
    metadata: &TokenMetadata,
    text: &str,
) -> Result<TokenAmount, RentalError> {
    let scale = scale_factor(metadata)?;
    let text = text.trim();
    let invalid = || RentalError::InvalidAmount(format!("{text:?} is not a decimal amount"));

    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| RentalError::AmountOverflow)?
    };
    let mut digits = fraction.bytes().map(|b| u128::from(b - b'0'));
    let mut milli_part = 0u128;
    for _ in 0..UI_PRECISION {
        milli_part = milli_part * 10 + digits.next().unwrap_or(0);
    }
    if digits.next().is_some_and(|d| d >= 5) {
        milli_part += 1;
    }

    whole
        .checked_mul(MILLI)
        .and_then(|m| m.checked_add(milli_part))
        .and_then(|m| m.checked_mul(scale))
        .map(TokenAmount)
        .ok_or(RentalError::AmountOverflow)
}

/// `integer_divide(amount, 10^(decimals - 3)) / 1000`, truncated to 3 digits.
pub fn from_base_units(metadata: &TokenMetadata, amount: TokenAmount) -> Result<f64, RentalError> {
    let scale = scale_factor(metadata)?;
    Ok((amount.0 / scale) as f64 / MILLI as f64)
}

/// Truncated display form of `amount`, e.g. `"1.5"` or `"12"`.
pub fn format_amount(metadata: &TokenMetadata, amount: TokenAmount) -> Result<String, RentalError> {
    let milli = amount.0 / scale_factor(metadata)?;
    let (whole, fraction) = (milli / MILLI, milli % MILLI);
    if fraction == 0 {
        return Ok(whole.to_string());
    }
    let fraction = format!("{fraction:03}");
    Ok(format!("{whole}.{}", fraction.trim_end_matches('0')))
}
