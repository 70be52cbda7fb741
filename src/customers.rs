//! Customer details

use serde::{Deserialize, Serialize};

use crate::{delivery::ResolvedDelivery, prices::Price};

/// Contact and delivery details collected at checkout.
///
/// The delivery zone, area and fee can only be set from a
/// [`ResolvedDelivery`] by checkout, so a customer can never type in their
/// own fee:
///
/// ```compile_fail
/// use garland::{customers::CustomerDetails, delivery::ResolvedDelivery, prices::Price};
///
/// let mut details = CustomerDetails::default();
///
/// details.apply_delivery(&ResolvedDelivery {
///     fee: Price::ZERO,
///     zone_name: "Anywhere".to_string(),
/// });
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Full name
    pub name: String,

    /// Email address
    pub email: String,

    /// Phone number
    pub phone: String,

    /// Unit number
    #[serde(default)]
    pub unit_number: String,

    /// Building name
    #[serde(default)]
    pub building_name: String,

    /// Street address
    #[serde(default)]
    pub street_address: String,

    /// Postal code
    #[serde(default)]
    pub postal_code: Option<String>,

    #[serde(default)]
    delivery_zone: Option<String>,

    #[serde(default)]
    delivery_area: Option<String>,

    #[serde(default)]
    delivery_fee: Price,
}

impl CustomerDetails {
    /// Contact details with no address or delivery yet.
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    /// Resolved delivery zone name
    pub fn delivery_zone(&self) -> Option<&str> {
        self.delivery_zone.as_deref()
    }

    /// Delivery area, the zone name or a distance
    pub fn delivery_area(&self) -> Option<&str> {
        self.delivery_area.as_deref()
    }

    /// Delivery fee, zero until a delivery has been resolved
    pub fn delivery_fee(&self) -> Price {
        self.delivery_fee
    }

    /// Record the outcome of the delivery resolver.
    pub(crate) fn apply_delivery(&mut self, delivery: &ResolvedDelivery) {
        self.delivery_zone = Some(delivery.zone_name.clone());
        self.delivery_area = Some(delivery.zone_name.clone());
        self.delivery_fee = delivery.fee;
    }

    /// Forget a previously resolved delivery.
    pub(crate) fn clear_delivery(&mut self) {
        self.delivery_zone = None;
        self.delivery_area = None;
        self.delivery_fee = Price::ZERO;
    }

    /// Whether name, email and phone are all filled in.
    pub fn has_contact(&self) -> bool {
        [&self.name, &self.email, &self.phone]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Whether a delivery has been resolved and a street address given.
    pub fn has_delivery(&self) -> bool {
        self.delivery_zone.is_some() && !self.street_address.trim().is_empty()
    }

    /// Single-line delivery address.
    ///
    /// Blank parts are skipped; the unit number is prefixed with `#`.
    pub fn delivery_address(&self) -> String {
        let unit = self.unit_number.trim();
        let unit = (!unit.is_empty()).then(|| format!("#{}", unit.trim_start_matches('#')));

        let postal_code = self
            .postal_code
            .as_deref()
            .map(str::trim)
            .map(str::to_string);

        [
            unit,
            Some(self.building_name.trim().to_string()),
            Some(self.street_address.trim().to_string()),
            postal_code,
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}
