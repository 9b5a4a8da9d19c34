use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed amount in major currency units, held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Absolute distance between two amounts. Saturates at `Decimal::MAX` when
    /// the difference does not fit.
    pub fn abs_diff(self, other: Money) -> Money {
        Money(
            self.0
                .checked_sub(other.0)
                .map_or(Decimal::MAX, |d| d.abs()),
        )
    }

    /// Two-decimal rendering with the given decimal separator and no grouping,
    /// e.g. `45,00` or `-1234.50`.
    pub fn to_plain_string(self, decimal_separator: char) -> String {
        let rendered = format!("{:.2}", self.0);
        if decimal_separator == '.' {
            rendered
        } else {
            rendered.replace('.', &decimal_separator.to_string())
        }
    }
}

impl From<Decimal> for Money {
    fn from(decimal: Decimal) -> Self {
        Money::from_decimal(decimal)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
