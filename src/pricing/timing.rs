//! Day-type surcharges

use std::collections::BTreeSet;

use jiff::civil::{Date, Weekday};
use serde::{Deserialize, Serialize};

use crate::{ids::TypedUuid, prices::Price};

/// Timing surcharge id
pub type TimingSurchargeId = TypedUuid<TimingSurcharge>;

/// Kind of day a surcharge applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    /// Saturday or Sunday
    Weekend,

    /// A date in the holiday calendar
    Holiday,
}

/// Surcharge for installing or tearing down on a weekend or holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSurcharge {
    /// Rule id
    pub id: TimingSurchargeId,

    /// Rule name
    pub name: String,

    /// Day type the rule applies to
    pub day_type: DayType,

    /// Surcharge amount
    pub amount: Price,

    /// Whether the rule is in effect
    pub is_active: bool,
}

/// Public holidays, supplied by the store owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayCalendar {
    dates: BTreeSet<Date>,
}

impl HolidayCalendar {
    /// Build a calendar from a list of dates.
    pub fn new(dates: impl IntoIterator<Item = Date>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Whether `date` is a holiday.
    pub fn contains(&self, date: Date) -> bool {
        self.dates.contains(&date)
    }
}

/// Whether `date` falls on a Saturday or Sunday.
pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

/// The rule that prices a service on `date`, if any.
///
/// Every active rule whose day type matches is a candidate; the highest
/// amount wins and equal amounts fall back to the lowest rule id.
pub fn winning_rule<'a>(
    date: Date,
    rules: &'a [TimingSurcharge],
    holidays: &HolidayCalendar,
) -> Option<&'a TimingSurcharge> {
    let weekend = is_weekend(date);
    let holiday = holidays.contains(date);

    rules
        .iter()
        .filter(|rule| rule.is_active)
        .filter(|rule| match rule.day_type {
            DayType::Weekend => weekend,
            DayType::Holiday => holiday,
        })
        .max_by(|a, b| a.amount.cmp(&b.amount).then_with(|| b.id.cmp(&a.id)))
}

/// Surcharge for a service on `date`. Weekdays that are not holidays cost nothing.
pub fn day_type_surcharge(
    date: Date,
    rules: &[TimingSurcharge],
    holidays: &HolidayCalendar,
) -> Price {
    winning_rule(date, rules, holidays).map_or(Price::ZERO, |rule| rule.amount)
}
