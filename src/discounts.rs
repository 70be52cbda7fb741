//! Discounts
//!
//! Discount codes are checked through a fixed sequence of gates; the first
//! failing gate decides the error the customer sees. Validation has no side
//! effects: redemption counters are bumped by whoever persists the order.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ids::TypedUuid,
    prices::{Price, PriceError},
};

/// Discount code id
pub type DiscountCodeId = TypedUuid<DiscountCode>;

/// Errors raised while validating a discount code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscountError {
    /// No active code matches.
    #[error("Discount code {0} is not valid")]
    NotFound(String),

    /// The code's validity window has not opened.
    #[error("This discount code is not active yet")]
    NotYetActive,

    /// The code's validity window has closed.
    #[error("This discount code has expired")]
    Expired,

    /// The order is below the code's minimum.
    #[error("Minimum order amount of {minimum} required")]
    BelowMinimum {
        /// Minimum order amount
        minimum: Price,
    },

    /// The code has been redeemed as often as allowed.
    #[error("This discount code has reached its usage limit")]
    UsageLimitReached,

    /// Discount arithmetic failed.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// How a discount's value is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` percent of the subtotal
    Percentage,

    /// `value` currency units off the subtotal
    Fixed,
}

/// A discount code as configured in the back office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountCode {
    /// Code id
    pub id: DiscountCodeId,

    /// Code the customer types; matched case-insensitively
    pub code: String,

    /// Kind of discount
    #[serde(rename = "discount_type")]
    pub kind: DiscountKind,

    /// Percentage or currency amount, depending on `kind`
    pub value: Decimal,

    /// Smallest subtotal the code applies to
    #[serde(default)]
    pub min_order_amount: Price,

    /// Redemption cap; `None` is unlimited
    #[serde(default)]
    pub max_uses: Option<u32>,

    /// Times the code has been redeemed
    #[serde(default)]
    pub used_count: u32,

    /// Start of the validity window
    #[serde(default)]
    pub valid_from: Option<Timestamp>,

    /// End of the validity window
    #[serde(default)]
    pub valid_until: Option<Timestamp>,

    /// Whether the code can be used at all
    pub is_active: bool,
}

impl DiscountCode {
    /// Whether `input` names this code.
    pub fn matches(&self, input: &str) -> bool {
        self.code.trim().eq_ignore_ascii_case(input.trim())
    }

    /// Run the date, minimum and usage gates for a subtotal at `now`.
    ///
    /// # Errors
    ///
    /// - [`DiscountError::NotYetActive`]: `now` is before `valid_from`.
    /// - [`DiscountError::Expired`]: `now` is after `valid_until`.
    /// - [`DiscountError::BelowMinimum`]: the subtotal is under the minimum.
    /// - [`DiscountError::UsageLimitReached`]: the code is used up.
    pub fn check(&self, subtotal: Price, now: Timestamp) -> Result<(), DiscountError> {
        if self.valid_from.is_some_and(|from| now < from) {
            return Err(DiscountError::NotYetActive);
        }

        if self.valid_until.is_some_and(|until| now > until) {
            return Err(DiscountError::Expired);
        }

        if subtotal < self.min_order_amount {
            return Err(DiscountError::BelowMinimum {
                minimum: self.min_order_amount,
            });
        }

        if self.is_exhausted() {
            return Err(DiscountError::UsageLimitReached);
        }

        Ok(())
    }

    /// Whether another redemption would go over the cap.
    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.used_count >= max)
    }

    /// Discount this code gives on `subtotal`, never more than the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the value is negative or overflows.
    pub fn amount_for(&self, subtotal: Price) -> Result<Price, PriceError> {
        discount_amount(self.kind, self.value, subtotal)
    }
}

/// A validated discount attached to a checkout.
///
/// `amount` is what the code was worth when it was validated; callers that
/// reprice should use [`AppliedDiscount::amount_for`] against the new subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    /// Code id
    pub discount_id: DiscountCodeId,

    /// Code as configured
    pub code: String,

    /// Kind of discount
    pub kind: DiscountKind,

    /// Percentage or currency amount
    pub value: Decimal,

    /// Discount at validation time
    pub amount: Price,
}

impl AppliedDiscount {
    /// Discount on `subtotal`, never more than the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] if the value is negative or overflows.
    pub fn amount_for(&self, subtotal: Price) -> Result<Price, PriceError> {
        discount_amount(self.kind, self.value, subtotal)
    }
}

fn discount_amount(kind: DiscountKind, value: Decimal, subtotal: Price) -> Result<Price, PriceError> {
    let amount = match kind {
        DiscountKind::Percentage => subtotal.percent(value)?,
        DiscountKind::Fixed => Price::from_decimal(value)?,
    };

    Ok(amount.min(subtotal))
}

/// Find an active code by what the customer typed.
pub fn find_code<'a>(codes: &'a [DiscountCode], input: &str) -> Option<&'a DiscountCode> {
    codes
        .iter()
        .filter(|code| code.is_active)
        .find(|code| code.matches(input))
}

/// Validate `input` against `codes` for an order worth `subtotal`.
///
/// # Errors
///
/// - [`DiscountError::NotFound`]: no active code matches.
/// - Any error from [`DiscountCode::check`].
pub fn validate(
    codes: &[DiscountCode],
    input: &str,
    subtotal: Price,
    now: Timestamp,
) -> Result<AppliedDiscount, DiscountError> {
    let code =
        find_code(codes, input).ok_or_else(|| DiscountError::NotFound(input.trim().to_string()))?;

    apply(code, subtotal, now)
}

/// Run the gates for an already looked-up code and work out its amount.
///
/// # Errors
///
/// - [`DiscountError::NotFound`]: the code is inactive.
/// - Any error from [`DiscountCode::check`].
pub fn apply(
    code: &DiscountCode,
    subtotal: Price,
    now: Timestamp,
) -> Result<AppliedDiscount, DiscountError> {
    if !code.is_active {
        return Err(DiscountError::NotFound(code.code.clone()));
    }

    code.check(subtotal, now)?;

    Ok(AppliedDiscount {
        discount_id: code.id,
        code: code.code.clone(),
        kind: code.kind,
        value: code.value,
        amount: code.amount_for(subtotal)?,
    })
}
