//! Amount type for monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`. Amounts are stored in the
//! snapshot as plain JSON numbers and displayed with Indian digit grouping (`1,23,456.5`).

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// The currency symbol used when none is configured.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// One thousand trillion.
const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// At most this many fraction digits are shown when formatting.
const DISPLAY_DP: u32 = 3;

/// Represents a sum of money in the single, unconverted currency of the ledger.
///
/// # Examples
///
/// Parsing tolerates a currency symbol and grouping commas:
/// ```
/// # use voice_expenses::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₹1,50,000").unwrap();
/// assert_eq!(amount.to_string(), "1,50,000");
/// ```
///
/// Formatting drops trailing zeros and keeps at most three fraction digits:
/// ```
/// # use voice_expenses::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1234.5000").unwrap();
/// assert_eq!(amount.format_with("₹"), "₹1,234.5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The largest amount a single transaction may have.
    pub fn limit() -> Amount {
        Amount(Decimal::from(MAX_AMOUNT))
    }

    /// Returns true if the magnitude of the amount does not exceed `Amount::limit()`.
    pub fn is_within_limit(&self) -> bool {
        self.0.abs() <= Self::limit().0
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Formats the amount with `symbol` in front, e.g. `₹1,23,456.75`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0.is_sign_negative() && !self.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{symbol}{}", group_indian(self.0.abs()))
    }
}

/// Renders a non-negative value with the last three integer digits grouped together and every
/// two digits before that, the way the `en-IN` locale does.
fn group_indian(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::new();
    let head_len = digits.len().saturating_sub(3);
    for (i, c) in digits[..head_len].iter().enumerate() {
        if i > 0 && (head_len - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    if head_len > 0 {
        grouped.push(',');
    }
    grouped.extend(&digits[head_len..]);

    match frac_part {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let without_symbol = trimmed
            .strip_prefix(DEFAULT_CURRENCY_SYMBOL)
            .unwrap_or(trimmed);
        let without_commas = without_symbol.replace(',', "");
        let value = Decimal::from_str(without_commas.trim()).map_err(AmountError)?;
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with(""))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Snapshots hold plain numbers, written digit for digit
        rust_decimal::serde::arbitrary_precision::serialize(&self.0.normalize(), serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        rust_decimal::serde::arbitrary_precision::deserialize(deserializer)
            .map(|d| Amount(d.normalize()))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// Saturates at the bounds of `Decimal` instead of overflowing.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
