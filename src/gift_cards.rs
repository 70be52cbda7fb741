//! Gift cards

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ids::TypedUuid, prices::Price};

/// Gift card id
pub type GiftCardId = TypedUuid<GiftCard>;

/// Smallest gift card amount.
pub const MIN_AMOUNT: Price = Price::new(1_000);

/// Largest gift card amount.
pub const MAX_AMOUNT: Price = Price::new(100_000);

/// Longest personal message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Errors raised while filling in a gift card.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GiftCardError {
    /// Amount outside the sold range.
    #[error("Gift card amount must be between {MIN_AMOUNT} and {MAX_AMOUNT}")]
    AmountOutOfRange(Price),

    /// A required field is blank.
    #[error("Please enter the {0}")]
    MissingField(&'static str),

    /// An email address is not usable.
    #[error("Please enter a valid {0}")]
    InvalidEmail(&'static str),

    /// The personal message is too long.
    #[error("Personal message must be {MAX_MESSAGE_CHARS} characters or fewer")]
    MessageTooLong(usize),

    /// A scheduled delivery date has already passed.
    #[error("Delivery date {0} is in the past")]
    ScheduledInPast(Date),
}

/// When the gift card is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "delivery_timing", rename_all = "snake_case")]
pub enum GiftCardDelivery {
    /// As soon as the order is paid
    #[default]
    Now,

    /// On a chosen date
    Scheduled {
        /// Delivery date
        date: Date,
    },
}

/// Gift card form as the customer filled it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCardRequest {
    /// Card amount
    pub amount: Price,

    /// Sender name
    pub sender_name: String,

    /// Sender email
    pub sender_email: String,

    /// Recipient name, ignored when buying for oneself
    #[serde(default)]
    pub recipient_name: String,

    /// Recipient email, ignored when buying for oneself
    #[serde(default)]
    pub recipient_email: String,

    /// Personal message
    #[serde(default)]
    pub message: String,

    /// Delivery timing
    #[serde(flatten)]
    pub delivery: GiftCardDelivery,

    /// Whether the buyer is also the recipient
    #[serde(default)]
    pub is_for_self: bool,
}

/// Recipient of a gift card bought for someone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Recipient name
    pub name: String,

    /// Recipient email
    pub email: String,
}

/// A validated gift card, ready to be paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCard {
    /// Gift card id
    pub id: GiftCardId,

    /// Card amount
    pub amount: Price,

    /// Sender name
    pub sender_name: String,

    /// Sender email
    pub sender_email: String,

    /// Recipient, `None` when bought for oneself
    pub recipient: Option<Recipient>,

    /// Personal message
    pub message: Option<String>,

    /// Delivery timing
    #[serde(flatten)]
    pub delivery: GiftCardDelivery,

    /// Whether the buyer is also the recipient
    pub is_for_self: bool,
}

impl GiftCard {
    /// Address the card is sent to.
    pub fn deliver_to(&self) -> &str {
        self.recipient
            .as_ref()
            .map_or(self.sender_email.as_str(), |recipient| {
                recipient.email.as_str()
            })
    }
}

/// Fail unless `amount` is within the sold range.
///
/// # Errors
///
/// Returns [`GiftCardError::AmountOutOfRange`] below [`MIN_AMOUNT`] or above [`MAX_AMOUNT`].
pub fn check_amount(amount: Price) -> Result<Price, GiftCardError> {
    if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&amount) {
        return Err(GiftCardError::AmountOutOfRange(amount));
    }

    Ok(amount)
}

fn required(value: &str, field: &'static str) -> Result<String, GiftCardError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(GiftCardError::MissingField(field));
    }

    Ok(value.to_string())
}

fn email(value: &str, field: &'static str) -> Result<String, GiftCardError> {
    let value = required(value, field)?;

    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(value),
        _ => Err(GiftCardError::InvalidEmail(field)),
    }
}

impl GiftCardRequest {
    /// Check the form and turn it into a [`GiftCard`].
    ///
    /// Recipient fields are only required when the card is for someone else.
    ///
    /// # Errors
    ///
    /// - [`GiftCardError::AmountOutOfRange`]: amount below [`MIN_AMOUNT`] or above [`MAX_AMOUNT`].
    /// - [`GiftCardError::MissingField`]: a required field is blank.
    /// - [`GiftCardError::InvalidEmail`]: an email address is malformed.
    /// - [`GiftCardError::MessageTooLong`]: the message is over [`MAX_MESSAGE_CHARS`].
    /// - [`GiftCardError::ScheduledInPast`]: the scheduled date is before `today`.
    pub fn validate(self, today: Date) -> Result<GiftCard, GiftCardError> {
        let amount = check_amount(self.amount)?;
        let sender_name = required(&self.sender_name, "sender name")?;
        let sender_email = email(&self.sender_email, "sender email")?;

        let recipient = if self.is_for_self {
            None
        } else {
            Some(Recipient {
                name: required(&self.recipient_name, "recipient name")?,
                email: email(&self.recipient_email, "recipient email")?,
            })
        };

        let length = self.message.chars().count();

        if length > MAX_MESSAGE_CHARS {
            return Err(GiftCardError::MessageTooLong(length));
        }

        if let GiftCardDelivery::Scheduled { date } = self.delivery
            && date < today
        {
            return Err(GiftCardError::ScheduledInPast(date));
        }

        let message = Some(self.message.trim().to_string()).filter(|message| !message.is_empty());

        Ok(GiftCard {
            id: GiftCardId::new(),
            amount,
            sender_name,
            sender_email,
            recipient,
            message,
            delivery: self.delivery,
            is_for_self: self.is_for_self,
        })
    }
}
