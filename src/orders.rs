//! Orders

use std::{fmt, str::FromStr};

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{EventServiceId, ProductId, trees::TreeOptions},
    customers::CustomerDetails,
    delivery::DeliveryAddOn,
    discounts::DiscountCodeId,
    gift_cards::GiftCardId,
    ids::TypedUuid,
    prices::Price,
    pricing::PriceBreakdown,
};

/// Order id
pub type OrderId = TypedUuid<Order>;

const SUFFIX_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_SPACE: u32 = 36 * 36 * 36;

/// Errors raised by order records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The text is not an order number.
    #[error("{0} is not a valid order number")]
    InvalidOrderNumber(String),

    /// Orders only move forward one status at a time.
    #[error("Cannot move an order from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: OrderStatus,

        /// Requested status
        to: OrderStatus,
    },
}

/// Human-typeable order number: `TJ-<6 digits>-<3 base36 chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Build an order number from the last six digits of a millisecond
    /// timestamp and three base36 characters drawn from `entropy`.
    pub fn from_parts(epoch_millis: i64, entropy: u32) -> Self {
        let digits = epoch_millis.rem_euclid(1_000_000);

        let mut rest = entropy % SUFFIX_SPACE;
        let mut suffix = ['0'; 3];

        for slot in suffix.iter_mut().rev() {
            let index = usize::try_from(rest % 36).unwrap_or_default();

            *slot = SUFFIX_ALPHABET
                .get(index)
                .map_or('0', |byte| char::from(*byte));

            rest /= 36;
        }

        let suffix: String = suffix.iter().collect();

        Self(format!("TJ-{digits:06}-{suffix}"))
    }

    /// Build an order number for `now`.
    pub fn generate(now: Timestamp, entropy: u32) -> Self {
        Self::from_parts(now.as_millisecond(), entropy)
    }

    /// The order number as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderNumber {
    type Err = OrderError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || OrderError::InvalidOrderNumber(input.to_string());

        let mut parts = input.trim().split('-');

        let (Some("TJ"), Some(digits), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let digits_ok = digits.len() == 6 && digits.bytes().all(|byte| byte.is_ascii_digit());
        let suffix_ok = suffix.len() == 3
            && suffix
                .bytes()
                .all(|byte| byte.is_ascii_digit() || byte.is_ascii_uppercase());

        if !digits_ok || !suffix_ok {
            return Err(invalid());
        }

        Ok(Self(format!("TJ-{digits}-{suffix}")))
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderNumber> for String {
    fn from(number: OrderNumber) -> Self {
        number.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Paid, not yet reviewed
    #[default]
    Pending,

    /// Accepted by the store
    Confirmed,

    /// Delivered or installed
    Delivered,

    /// Collected or closed
    Completed,
}

impl OrderStatus {
    /// Status that follows this one, if any.
    pub const fn next(self) -> Option<Self> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => Some(OrderStatus::Completed),
            OrderStatus::Completed => None,
        }
    }

    /// Move to `to`, which must be the next status.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidStatusTransition`] for anything but a
    /// single step forward.
    pub fn transition_to(self, to: OrderStatus) -> Result<OrderStatus, OrderError> {
        if self.next() == Some(to) {
            Ok(to)
        } else {
            Err(OrderError::InvalidStatusTransition { from: self, to })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
        })
    }
}

/// What was bought. Exactly one reference per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "order_type", rename_all = "snake_case")]
pub enum OrderLine {
    /// A catalogue product, with tree options for rentals
    Product {
        /// Product id
        product_id: ProductId,

        /// Product title at the time of ordering
        title: String,

        /// Tree customisation, for tree rentals
        #[serde(default)]
        tree: Option<TreeOptions>,
    },

    /// A gift card, persisted before the order
    GiftCard {
        /// Gift card id
        gift_card_id: GiftCardId,
    },

    /// An event service booking
    Event {
        /// Event service id
        event_service_id: EventServiceId,

        /// Service title at the time of ordering
        title: String,
    },
}

impl OrderLine {
    /// Short description for receipts and listings.
    pub fn description(&self) -> String {
        match self {
            OrderLine::Product {
                title,
                tree: Some(tree),
                ..
            } => format!("{title} ({} {})", tree.height(), tree.tree_type()),
            OrderLine::Product { title, .. } | OrderLine::Event { title, .. } => title.clone(),
            OrderLine::GiftCard { .. } => "Gift card".to_string(),
        }
    }
}

/// Delivery add-on as charged on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedAddOn {
    /// Add-on id
    pub id: String,

    /// Add-on name
    pub name: String,

    /// Fee charged
    pub fee: Price,
}

impl From<&DeliveryAddOn> for SelectedAddOn {
    fn from(add_on: &DeliveryAddOn) -> Self {
        Self {
            id: add_on.id.clone(),
            name: add_on.name.clone(),
            fee: add_on.fee,
        }
    }
}

/// Installation and teardown dates booked with the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDates {
    /// Installation date, when installation was booked
    #[serde(default)]
    pub installation_date: Option<Date>,

    /// Teardown date, when teardown was booked
    #[serde(default)]
    pub teardown_date: Option<Date>,
}

/// A paid order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order id
    pub id: OrderId,

    /// Order number shown to the customer
    pub order_number: OrderNumber,

    /// Customer and delivery details
    #[serde(flatten)]
    pub customer: CustomerDetails,

    /// What was bought
    #[serde(flatten)]
    pub line: OrderLine,

    /// Installers booked
    #[serde(default)]
    pub men_power: Option<u8>,

    /// Service dates
    #[serde(flatten)]
    pub dates: ServiceDates,

    /// Delivery add-ons charged
    #[serde(default)]
    pub add_ons: Vec<SelectedAddOn>,

    /// Discount code redeemed
    #[serde(default)]
    pub discount_code_id: Option<DiscountCodeId>,

    /// Price breakdown
    pub pricing: PriceBreakdown,

    /// Amount charged
    pub total_amount: Price,

    /// Fulfilment status
    #[serde(default)]
    pub status: OrderStatus,

    /// Payment intent that paid for the order
    #[serde(default)]
    pub payment_intent_id: Option<String>,

    /// When the order was placed
    pub created_at: Timestamp,
}

impl Order {
    /// Move the order one status forward.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidStatusTransition`] unless `to` directly
    /// follows the current status.
    pub fn advance_status(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        self.status = self.status.transition_to(to)?;

        Ok(())
    }
}
