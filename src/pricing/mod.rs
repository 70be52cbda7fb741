//! Pricing
//!
//! Pure functions turning checkout selections into a [`PriceBreakdown`].
//! Configuration (crew tiers, timing rules, holidays, add-on catalogue) is
//! passed in through [`PricingContext`]; nothing here reads global state.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::trees::RentalPeriod,
    delivery::DeliveryAddOn,
    discounts::AppliedDiscount,
    prices::{Price, PriceError, sum_prices},
};

pub mod men_power;
pub mod timing;

pub use men_power::{MenPowerTier, MenPowerTiers};
pub use timing::{DayType, HolidayCalendar, TimingSurcharge, TimingSurchargeId, day_type_surcharge};

/// Errors raised while pricing an order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// The rental period is not one of the offered periods.
    #[error("Rental period of {0} days is not available")]
    InvalidRentalPeriod(u16),

    /// The crew size cannot be priced.
    #[error("At least one installer is required, got {0}")]
    InvalidMenPower(u8),

    /// The men power table is malformed.
    #[error("invalid men power tiers: {0}")]
    InvalidMenPowerTiers(&'static str),

    /// Price arithmetic failed.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// Surcharge for renting a tree for `days`.
///
/// # Errors
///
/// Returns [`PricingError::InvalidRentalPeriod`] unless `days` is 45, 60 or 90.
pub fn rental_surcharge(days: u16) -> Result<Price, PricingError> {
    RentalPeriod::from_days(days)
        .map(RentalPeriod::surcharge)
        .ok_or(PricingError::InvalidRentalPeriod(days))
}

/// Enabled add-ons from `catalog` whose ids were selected, in catalogue order.
///
/// Unknown and disabled ids are skipped, so stale selections cost nothing.
pub fn selected_add_ons<'a>(
    selected_ids: &[String],
    catalog: &'a [DeliveryAddOn],
) -> impl Iterator<Item = &'a DeliveryAddOn> {
    catalog
        .iter()
        .filter(|add_on| add_on.enabled)
        .filter(move |add_on| selected_ids.iter().any(|id| *id == add_on.id))
}

/// Total fee of the selected delivery add-ons.
///
/// # Errors
///
/// Returns [`PricingError::Price`] if the total overflows.
pub fn delivery_add_on_total(
    selected_ids: &[String],
    catalog: &[DeliveryAddOn],
) -> Result<Price, PricingError> {
    Ok(sum_prices(
        selected_add_ons(selected_ids, catalog).map(|add_on| add_on.fee),
    )?)
}

/// Configuration every pricing call needs, fetched once per checkout session.
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'a> {
    /// Crew size tiers
    pub men_power: &'a MenPowerTiers,

    /// Weekend and holiday surcharge rules
    pub surcharges: &'a [TimingSurcharge],

    /// Holiday calendar
    pub holidays: &'a HolidayCalendar,

    /// Delivery add-on catalogue
    pub add_ons: &'a [DeliveryAddOn],
}

/// Everything chosen at checkout that affects the charge.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderCharges<'a> {
    /// Rental period in days, for tree rentals
    pub rental_days: Option<u16>,

    /// Installation crew size, when installers are booked
    pub men_power: Option<u8>,

    /// Installation date, set only when the installation service is selected
    pub installation: Option<Date>,

    /// Teardown date, set only when the teardown service is selected
    pub teardown: Option<Date>,

    /// Resolved delivery fee
    pub delivery_fee: Price,

    /// Selected delivery add-on ids
    pub add_on_ids: &'a [String],

    /// Discount to take off the subtotal
    pub discount: Option<&'a AppliedDiscount>,
}

/// Line-by-line breakdown of an order's charge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Product, service or gift card amount
    pub base: Price,

    /// Rental period surcharge
    pub rental: Price,

    /// Crew size surcharge
    pub men_power: Price,

    /// Weekend or holiday surcharge on the installation date
    pub installation: Price,

    /// Weekend or holiday surcharge on the teardown date
    pub teardown: Price,

    /// Delivery fee
    pub delivery: Price,

    /// Delivery add-ons
    pub add_ons: Price,

    /// Sum of everything above
    pub subtotal: Price,

    /// Discount taken off the subtotal
    pub discount: Price,

    /// Amount charged
    pub total: Price,
}

impl PriceBreakdown {
    /// Breakdown for a gift card: the card amount and nothing else.
    pub const fn gift_card(amount: Price) -> Self {
        Self {
            base: amount,
            rental: Price::ZERO,
            men_power: Price::ZERO,
            installation: Price::ZERO,
            teardown: Price::ZERO,
            delivery: Price::ZERO,
            add_ons: Price::ZERO,
            subtotal: amount,
            discount: Price::ZERO,
            total: amount,
        }
    }
}

/// Price an order.
///
/// The subtotal is the base price plus every surcharge, the delivery fee and
/// add-ons. The discount is worked out against that subtotal, capped at it,
/// and the total never goes below zero.
///
/// # Errors
///
/// - [`PricingError::InvalidRentalPeriod`]: the rental period is not offered.
/// - [`PricingError::InvalidMenPower`]: the crew size cannot be priced.
/// - [`PricingError::Price`]: an amount overflowed.
pub fn compute_order_total(
    base: Price,
    charges: &OrderCharges<'_>,
    context: &PricingContext<'_>,
) -> Result<PriceBreakdown, PricingError> {
    let rental = charges
        .rental_days
        .map_or(Ok(Price::ZERO), rental_surcharge)?;

    let men_power = charges
        .men_power
        .map_or(Ok(Price::ZERO), |workers| context.men_power.surcharge(workers))?;

    let on_date = |date: Option<Date>| {
        date.map_or(Price::ZERO, |date| {
            day_type_surcharge(date, context.surcharges, context.holidays)
        })
    };

    let installation = on_date(charges.installation);
    let teardown = on_date(charges.teardown);
    let add_ons = delivery_add_on_total(charges.add_on_ids, context.add_ons)?;

    let subtotal = sum_prices([
        base,
        rental,
        men_power,
        installation,
        teardown,
        charges.delivery_fee,
        add_ons,
    ])?;

    let discount = match charges.discount {
        Some(applied) => applied.amount_for(subtotal)?,
        None => Price::ZERO,
    };

    Ok(PriceBreakdown {
        base,
        rental,
        men_power,
        installation,
        teardown,
        delivery: charges.delivery_fee,
        add_ons,
        subtotal,
        discount,
        total: subtotal.saturating_sub(discount),
    })
}
