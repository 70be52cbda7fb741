//! Pricing settings
//!
//! Store-owner settings that rarely change: the crew tier table, the holiday
//! calendar, timing surcharges and the fallback delivery configuration. They
//! are kept in a YAML file so they can be edited without a release.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    delivery::DeliveryConfiguration,
    pricing::{HolidayCalendar, MenPowerTiers, PricingContext, TimingSurcharge},
};

/// Settings loading errors
#[derive(Debug, Error)]
pub enum SettingsError {
    /// IO error reading the settings file
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// Pricing configuration for a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Crew size tiers
    #[serde(default)]
    pub men_power: MenPowerTiers,

    /// Public holidays
    #[serde(default)]
    pub holidays: HolidayCalendar,

    /// Weekend and holiday surcharge rules
    #[serde(default)]
    pub timing_surcharges: Vec<TimingSurcharge>,

    /// Delivery configuration used when none is stored
    #[serde(default)]
    pub delivery: DeliveryConfiguration,
}

impl PricingSettings {
    /// Parse settings from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Yaml`] if the text is not valid settings.
    pub fn from_yaml(yaml: &str) -> Result<Self, SettingsError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Load settings from a YAML file.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Io`]: the file cannot be read.
    /// - [`SettingsError::Yaml`]: the file is not valid settings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Pricing context over these settings and a delivery configuration.
    pub fn context<'a>(&'a self, delivery: &'a DeliveryConfiguration) -> PricingContext<'a> {
        PricingContext {
            men_power: &self.men_power,
            surcharges: &self.timing_surcharges,
            holidays: &self.holidays,
            add_ons: &delivery.add_ons,
        }
    }
}
