//! Delivery
//!
//! Resolves a customer's delivery selection against the active
//! [`DeliveryConfiguration`]. Error messages are written for the customer and
//! are shown as-is at the delivery step.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prices::{Price, PriceError};

/// Errors raised while resolving a delivery fee.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// No configured zone covers the selection.
    #[error("Sorry, we do not deliver to {0} yet")]
    ZoneNotFound(String),

    /// The distance is beyond the delivery range.
    #[error("Delivery distance of {distance} km exceeds our maximum range of {max} km")]
    OutOfRange {
        /// Requested distance
        distance: Decimal,

        /// Configured maximum
        max: Decimal,
    },

    /// The distance was negative.
    #[error("Delivery distance cannot be negative")]
    InvalidDistance(Decimal),

    /// The selection does not fit the configured delivery model.
    #[error("Delivery is calculated by {0}; please choose a matching delivery option")]
    ModelMismatch(DeliveryModel),

    /// Fee arithmetic failed.
    #[error(transparent)]
    Price(#[from] PriceError),
}

/// How delivery fees are charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryModel {
    /// Flat fee per postal zone.
    #[default]
    Zone,

    /// Base fee plus a per-kilometre charge.
    Distance,
}

impl std::fmt::Display for DeliveryModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryModel::Zone => f.write_str("zone"),
            DeliveryModel::Distance => f.write_str("distance"),
        }
    }
}

/// A named delivery zone with a flat fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryZone {
    /// Zone id
    pub id: String,

    /// Zone name shown to customers
    pub name: String,

    /// Full postal codes, or legacy two-character prefixes
    #[serde(default)]
    pub postal_codes: Vec<String>,

    /// Flat delivery fee
    pub fee: Price,
}

impl DeliveryZone {
    fn lists_code(&self, code: &str) -> bool {
        self.postal_codes.iter().any(|listed| listed.trim() == code)
    }

    fn lists_prefix(&self, prefix: &str) -> bool {
        self.postal_codes
            .iter()
            .map(|listed| listed.trim())
            .any(|listed| listed.len() == 2 && listed == prefix)
    }
}

/// Settings for distance-based delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Fee covering the first `base_distance_km`
    pub base_fee: Price,

    /// Distance included in the base fee
    pub base_distance_km: Decimal,

    /// Charge per kilometre beyond the base distance
    pub per_km_charge: Price,

    /// Furthest distance delivered to
    pub max_range_km: Decimal,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            base_fee: Price::from_major(40),
            base_distance_km: Decimal::from(10),
            per_km_charge: Price::new(150),
            max_range_km: Decimal::from(50),
        }
    }
}

/// Optional extra delivery service (stair carry, timed slot, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddOn {
    /// Add-on id
    pub id: String,

    /// Name shown to customers
    pub name: String,

    /// Fee charged when selected
    pub fee: Price,

    /// Whether the add-on can currently be selected
    #[serde(default)]
    pub enabled: bool,
}

/// Active delivery configuration for the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfiguration {
    /// Charging model
    #[serde(default)]
    pub model: DeliveryModel,

    /// Zones, matched in list order
    #[serde(default)]
    pub zones: Vec<DeliveryZone>,

    /// Distance settings
    #[serde(default)]
    pub distance: DistanceConfig,

    /// Add-on catalogue
    #[serde(default)]
    pub add_ons: Vec<DeliveryAddOn>,
}

impl Default for DeliveryConfiguration {
    /// Fallback used when no configuration has been saved: four regional zones
    /// keyed by legacy postal sector prefixes and no add-ons.
    fn default() -> Self {
        fn zone(id: &str, name: &str, prefixes: &[&str], fee: u64) -> DeliveryZone {
            DeliveryZone {
                id: id.to_string(),
                name: name.to_string(),
                postal_codes: prefixes.iter().map(|prefix| (*prefix).to_string()).collect(),
                fee: Price::from_major(fee),
            }
        }

        Self {
            model: DeliveryModel::Zone,
            zones: vec![
                zone(
                    "central",
                    "Central",
                    &["01", "02", "03", "04", "05", "06", "07", "08", "09", "10"],
                    40,
                ),
                zone(
                    "east",
                    "East",
                    &["38", "39", "40", "41", "42", "43", "44", "45", "46", "47", "48", "49"],
                    50,
                ),
                zone(
                    "west",
                    "West",
                    &["11", "12", "13", "60", "61", "62", "63", "64", "65", "66", "67", "68"],
                    50,
                ),
                zone(
                    "north",
                    "North",
                    &["72", "73", "75", "76", "77", "78", "79", "80"],
                    55,
                ),
            ],
            distance: DistanceConfig::default(),
            add_ons: Vec::new(),
        }
    }
}

impl DeliveryConfiguration {
    /// Look up an enabled add-on.
    pub fn enabled_add_on(&self, id: &str) -> Option<&DeliveryAddOn> {
        self.add_ons
            .iter()
            .find(|add_on| add_on.enabled && add_on.id == id)
    }
}

/// What the customer picked at the delivery step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum DeliverySelection {
    /// A zone chosen from the list, by id.
    Zone(String),

    /// A postal code to match against zone lists.
    PostalCode(String),

    /// A distance in kilometres.
    Distance(Decimal),
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDelivery {
    /// Delivery fee
    pub fee: Price,

    /// Zone name, or the distance for distance-based delivery
    pub zone_name: String,
}

/// Resolve a delivery selection to a fee.
///
/// Postal codes are matched in two passes: first the full code against every
/// zone's list, then the code's first two characters against two-character
/// entries. Within a pass the first zone in list order wins.
///
/// # Errors
///
/// - [`DeliveryError::ZoneNotFound`]: no zone covers the selection.
/// - [`DeliveryError::OutOfRange`]: the distance exceeds the maximum range.
/// - [`DeliveryError::InvalidDistance`]: the distance is negative.
/// - [`DeliveryError::ModelMismatch`]: the selection does not fit the model.
/// - [`DeliveryError::Price`]: fee arithmetic overflowed.
pub fn resolve(
    config: &DeliveryConfiguration,
    selection: &DeliverySelection,
) -> Result<ResolvedDelivery, DeliveryError> {
    match (config.model, selection) {
        (DeliveryModel::Zone, DeliverySelection::Zone(id)) => config
            .zones
            .iter()
            .find(|zone| zone.id == *id)
            .map(zone_delivery)
            .ok_or_else(|| DeliveryError::ZoneNotFound(id.clone())),
        (DeliveryModel::Zone, DeliverySelection::PostalCode(code)) => {
            resolve_postal_code(&config.zones, code)
        }
        (DeliveryModel::Distance, DeliverySelection::Distance(distance)) => {
            resolve_distance(&config.distance, *distance)
        }
        (DeliveryModel::Zone, DeliverySelection::Distance(_)) => {
            Err(DeliveryError::ModelMismatch(DeliveryModel::Zone))
        }
        (DeliveryModel::Distance, DeliverySelection::Zone(_) | DeliverySelection::PostalCode(_)) => {
            Err(DeliveryError::ModelMismatch(DeliveryModel::Distance))
        }
    }
}

fn zone_delivery(zone: &DeliveryZone) -> ResolvedDelivery {
    ResolvedDelivery {
        fee: zone.fee,
        zone_name: zone.name.clone(),
    }
}

fn resolve_postal_code(zones: &[DeliveryZone], code: &str) -> Result<ResolvedDelivery, DeliveryError> {
    let code = code.trim();

    let exact = zones.iter().find(|zone| zone.lists_code(code));

    let matched = exact.or_else(|| {
        let prefix = code.get(..2)?;

        zones.iter().find(|zone| zone.lists_prefix(prefix))
    });

    matched
        .map(zone_delivery)
        .ok_or_else(|| DeliveryError::ZoneNotFound(format!("postal code {code}")))
}

fn resolve_distance(
    config: &DistanceConfig,
    distance: Decimal,
) -> Result<ResolvedDelivery, DeliveryError> {
    if distance.is_sign_negative() && !distance.is_zero() {
        return Err(DeliveryError::InvalidDistance(distance));
    }

    if distance > config.max_range_km {
        return Err(DeliveryError::OutOfRange {
            distance,
            max: config.max_range_km,
        });
    }

    let extra_km = (distance - config.base_distance_km).max(Decimal::ZERO);

    let extra = config
        .per_km_charge
        .to_decimal()
        .checked_mul(extra_km)
        .ok_or(PriceError::Overflow)?;

    let fee = config.base_fee.checked_add(Price::from_decimal(extra)?)?;

    Ok(ResolvedDelivery {
        fee,
        zone_name: format!("{} km", distance.normalize()),
    })
}
