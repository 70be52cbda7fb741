//! Process configuration shared by the CLI commands.

use std::path::PathBuf;

use clap::Args;
use garland::settings::{PricingSettings, SettingsError};
use tracing::info;

use crate::{blobs::StorageConfig, store::RestStoreConfig};

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Data store connection.
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// Project URL of the PostgREST endpoint
    #[arg(long, env = "STORE_URL")]
    pub store_url: String,

    /// API key for the data store
    #[arg(long, env = "STORE_API_KEY", hide_env_values = true)]
    pub store_api_key: String,
}

impl StoreArgs {
    #[must_use]
    pub fn rest_config(&self) -> RestStoreConfig {
        RestStoreConfig {
            url: self.store_url.clone(),
            api_key: self.store_api_key.clone(),
        }
    }

    /// Storage bucket on the same project.
    #[must_use]
    pub fn storage_config(&self, bucket: &str) -> StorageConfig {
        StorageConfig {
            url: self.store_url.clone(),
            api_key: self.store_api_key.clone(),
            bucket: bucket.to_string(),
        }
    }
}

/// Back-office account.
#[derive(Debug, Args)]
pub struct AdminArgs {
    /// Administrator email
    #[arg(long, env = "ADMIN_EMAIL")]
    pub admin_email: String,

    /// Administrator password
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,
}

/// Pricing settings file.
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// YAML file with crew tiers, holidays and fallback delivery settings
    #[arg(long, env = "PRICING_SETTINGS")]
    pub pricing_settings: Option<PathBuf>,
}

impl SettingsArgs {
    /// Load the settings file, or the built-in defaults when none is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> Result<PricingSettings, SettingsError> {
        let Some(path) = &self.pricing_settings else {
            return Ok(PricingSettings::default());
        };

        let settings = PricingSettings::load(path)?;

        info!(path = %path.display(), "loaded pricing settings");

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_path_uses_defaults() -> anyhow::Result<()> {
        let args = SettingsArgs {
            pricing_settings: None,
        };

        assert_eq!(args.load()?, PricingSettings::default());

        Ok(())
    }
}
