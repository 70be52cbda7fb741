//! Configuration records.

use garland::{delivery::DeliveryConfiguration, ids::TypedUuid};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Delivery configuration record id
pub type DeliveryConfigurationId = TypedUuid<DeliveryConfigurationRecord>;

/// Saved delivery configuration. Only the newest active record is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfigurationRecord {
    pub id: DeliveryConfigurationId,

    #[serde(flatten)]
    pub configuration: DeliveryConfiguration,

    pub is_active: bool,

    pub updated_at: Timestamp,
}
