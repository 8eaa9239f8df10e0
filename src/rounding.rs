//! Currency rounding service.
//!
//! Every monetary value the engine stores or compares is first rounded to the
//! minor-unit precision of the paying company's currency. Intermediate values
//! inside the allocation algorithm are deliberately left unrounded.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::Company;

/// Minor-unit digits used when no company context is available.
pub const DEFAULT_CURRENCY_DIGITS: u32 = 2;

/// A currency and its minor-unit precision.
///
/// # Example
///
/// ```
/// use royalty_engine::rounding::Currency;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let eur = Currency::new("EUR", 2);
/// assert_eq!(eur.round(Decimal::from_str("10.125").unwrap()), Decimal::from_str("10.12").unwrap());
/// assert_eq!(eur.minor_unit(), Decimal::from_str("0.01").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code (e.g. "EUR").
    pub code: String,
    /// Number of decimal digits of the minor unit.
    #[serde(default = "default_digits")]
    pub digits: u32,
}

fn default_digits() -> u32 {
    DEFAULT_CURRENCY_DIGITS
}

impl Currency {
    /// Creates a currency with the given code and minor-unit digits.
    pub fn new(code: impl Into<String>, digits: u32) -> Self {
        Self {
            code: code.into(),
            digits,
        }
    }

    /// Rounds an amount to this currency's precision.
    pub fn round(&self, amount: Decimal) -> Decimal {
        round(amount, self.digits)
    }

    /// The smallest representable amount (e.g. 0.01 for two digits).
    pub fn minor_unit(&self) -> Decimal {
        Decimal::new(1, self.digits)
    }

    /// Rounds toward zero, never producing a value larger in magnitude.
    pub fn truncate(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.digits, RoundingStrategy::ToZero)
    }
}

/// Rounds `amount` to `digits` decimal places.
///
/// Halfway cases round to the nearest even digit, as the accounting side of
/// the back office does, so repeated rounding does not drift in one direction.
pub fn round(amount: Decimal, digits: u32) -> Decimal {
    amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointNearestEven)
}

/// Minor-unit digits for the given company, or the default without one.
pub fn currency_digits(company: Option<&Company>) -> u32 {
    company
        .map(|c| c.currency.digits)
        .unwrap_or(DEFAULT_CURRENCY_DIGITS)
}
