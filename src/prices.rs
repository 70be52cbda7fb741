//! Prices

use std::{fmt, ops::Deref};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by price arithmetic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PriceError {
    /// The amount was negative, which a charge can never be.
    #[error("amount cannot be negative")]
    Negative,

    /// The amount does not fit in minor units.
    #[error("amount is too large")]
    Overflow,
}

/// Represents a non-negative price in cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price {
    value: u64,
}

impl Price {
    /// Zero cents.
    pub const ZERO: Price = Price { value: 0 };

    /// Creates a new Price from cents.
    pub const fn new(cents: u64) -> Self {
        Price { value: cents }
    }

    /// Creates a new Price from whole currency units.
    pub const fn from_major(units: u64) -> Self {
        Price {
            value: units.saturating_mul(100),
        }
    }

    /// Amount in cents.
    pub const fn cents(self) -> u64 {
        self.value
    }

    /// Whether the amount is zero.
    pub const fn is_zero(self) -> bool {
        self.value == 0
    }

    /// Converts an amount in currency units, rounding half away from zero to the nearest cent.
    ///
    /// # Errors
    ///
    /// - [`PriceError::Negative`]: the amount is below zero.
    /// - [`PriceError::Overflow`]: the amount does not fit in cents.
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let cents = amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or(PriceError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        cents.to_u64().map(Price::new).ok_or(PriceError::Overflow)
    }

    /// Amount in currency units.
    pub fn to_decimal(self) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.value), 2)
    }

    /// Adds two prices.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the sum does not fit in cents.
    pub fn checked_add(self, other: Price) -> Result<Self, PriceError> {
        self.value
            .checked_add(other.value)
            .map(Price::new)
            .ok_or(PriceError::Overflow)
    }

    /// Subtracts `other`, stopping at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Price) -> Self {
        Price::new(self.value.saturating_sub(other.value))
    }

    /// Multiplies by a whole quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product does not fit in cents.
    pub fn checked_mul(self, quantity: u64) -> Result<Self, PriceError> {
        self.value
            .checked_mul(quantity)
            .map(Price::new)
            .ok_or(PriceError::Overflow)
    }

    /// Takes `percent` percent of this price, rounded to the nearest cent.
    ///
    /// # Errors
    ///
    /// - [`PriceError::Negative`]: the percentage is negative.
    /// - [`PriceError::Overflow`]: the result does not fit in cents.
    pub fn percent(self, percent: Decimal) -> Result<Self, PriceError> {
        let fraction = percent
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or(PriceError::Overflow)?;

        let amount = self
            .to_decimal()
            .checked_mul(fraction)
            .ok_or(PriceError::Overflow)?;

        Price::from_decimal(amount)
    }
}

impl Deref for Price {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.value / 100, self.value % 100)
    }
}

/// Sums prices, failing on overflow.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if the total does not fit in cents.
pub fn sum_prices(prices: impl IntoIterator<Item = Price>) -> Result<Price, PriceError> {
    prices
        .into_iter()
        .try_fold(Price::ZERO, |acc, price| acc.checked_add(price))
}
