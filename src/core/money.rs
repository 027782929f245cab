use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::{AppError, Result};

/// Fractional digits carried by the wire format (billionths)
pub const MAX_SCALE: u32 = 9;

/// Sub-units per whole unit
pub const NANOS_PER_UNIT: i64 = 1_000_000_000;

/// Wire representation of a monetary value
///
/// `nanos` holds billionths of a unit and always carries the same sign as
/// `units` (or is zero). Equality is exact on all three fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub units: i64,
    pub nanos: i32,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        }
    }

    /// Convert a decimal to wire format, truncating and clamping first
    pub fn from_decimal(currency_code: impl Into<String>, value: Decimal) -> Self {
        let value = normalize(value);
        let whole = value.trunc();
        let saturated = if value.is_sign_negative() {
            -i64::MAX
        } else {
            i64::MAX
        };

        let units = whole.to_i64().unwrap_or(saturated);
        let nanos = ((value - whole) * Decimal::from(NANOS_PER_UNIT))
            .trunc()
            .to_i32()
            .unwrap_or(0);

        Self {
            currency_code: normalize_currency(&currency_code.into()),
            units,
            nanos,
        }
    }

    /// Convert the wire value back to a decimal
    pub fn to_decimal(&self) -> Result<Decimal> {
        if i64::from(self.nanos).abs() >= NANOS_PER_UNIT {
            return Err(AppError::invalid_argument(format!(
                "money nanos out of range: {}",
                self.nanos
            )));
        }

        if (self.units > 0 && self.nanos < 0) || (self.units < 0 && self.nanos > 0) {
            return Err(AppError::invalid_argument(format!(
                "money units ({}) and nanos ({}) carry different signs",
                self.units, self.nanos
            )));
        }

        let value = Decimal::from(self.units) + Decimal::new(i64::from(self.nanos), MAX_SCALE);
        Ok(normalize(value))
    }

    /// A usable amount needs a positive whole-unit part and a currency code.
    ///
    /// Anything else is treated as "amount pending" rather than an error.
    pub fn is_settable(&self) -> bool {
        self.units > 0 && !self.currency_code.trim().is_empty()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Ok(value) => write!(f, "{} {}", self.currency_code, value),
            Err(_) => write!(f, "{} {}.{:09}", self.currency_code, self.units, self.nanos),
        }
    }
}

/// A validated monetary amount held by entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: Decimal,
    pub currency: String,
}

impl Amount {
    pub fn new(value: Decimal, currency: impl Into<String>) -> Self {
        Self {
            value: normalize(value),
            currency: normalize_currency(&currency.into()),
        }
    }

    /// Build an amount from an optional wire value.
    ///
    /// Returns `Ok(None)` for blank or zero amounts, which callers keep
    /// unset, and an error only for malformed wire values.
    pub fn from_wire(money: Option<&Money>) -> Result<Option<Self>> {
        let Some(money) = money else {
            return Ok(None);
        };

        let value = money.to_decimal()?;
        if !money.is_settable() {
            return Ok(None);
        }

        Ok(Some(Self::new(value, money.currency_code.clone())))
    }

    pub fn to_wire(&self) -> Money {
        Money::from_decimal(self.currency.clone(), self.value)
    }
}

/// Largest magnitude representable on the wire: i64::MAX units plus 0.999999999
pub fn max_magnitude() -> Decimal {
    Decimal::from(i64::MAX) + Decimal::new(999_999_999, MAX_SCALE)
}

/// Truncate to nine fractional digits, then saturate to the wire bound
pub fn normalize(value: Decimal) -> Decimal {
    let truncated = value.round_dp_with_strategy(MAX_SCALE, RoundingStrategy::ToZero);
    let bound = max_magnitude();

    if truncated > bound {
        bound
    } else if truncated < -bound {
        -bound
    } else {
        truncated
    }
}

/// Parse a textual decimal, saturating values too large to represent
pub fn parse_decimal(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    if let Ok(value) = Decimal::from_str(trimmed) {
        return Ok(normalize(value));
    }

    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    let well_formed = !whole.is_empty()
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit());

    if !well_formed {
        return Err(AppError::invalid_argument(format!(
            "invalid decimal value: {}",
            input
        )));
    }

    // Only magnitude overflow reaches this point.
    let bound = max_magnitude();
    Ok(if negative { -bound } else { bound })
}

fn normalize_currency(code: &str) -> String {
    code.trim().to_uppercase()
}
