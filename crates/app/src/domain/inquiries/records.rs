//! Inquiry records.

use garland::{catalog::EventServiceId, ids::TypedUuid};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Inquiry id
pub type InquiryId = TypedUuid<Inquiry>;

/// A question sent from an event service page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: InquiryId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub event_service_id: Option<EventServiceId>,
    pub created_at: Timestamp,
}

/// Inquiry as typed into the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub event_service_id: Option<EventServiceId>,
}
