use std::sync::Arc;

use clap::Args;
use garland::delivery::{self, DeliverySelection};
use garland_app::{
    config::{SettingsArgs, StoreArgs},
    domain::configuration::{ConfigurationService, StoreConfigurationService},
    store::RestStore,
};
use rust_decimal::Decimal;

#[derive(Debug, Args)]
pub(crate) struct QuoteDeliveryArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Postal code to match against the zone lists
    #[arg(long, conflicts_with_all = ["zone", "distance_km"])]
    postal_code: Option<String>,

    /// Zone id
    #[arg(long, conflicts_with = "distance_km")]
    zone: Option<String>,

    /// Distance in kilometres
    #[arg(long)]
    distance_km: Option<Decimal>,
}

impl QuoteDeliveryArgs {
    fn selection(&self) -> Option<DeliverySelection> {
        if let Some(code) = &self.postal_code {
            return Some(DeliverySelection::PostalCode(code.clone()));
        }

        if let Some(zone) = &self.zone {
            return Some(DeliverySelection::Zone(zone.clone()));
        }

        self.distance_km.map(DeliverySelection::Distance)
    }
}

pub(crate) async fn run(args: QuoteDeliveryArgs) -> Result<(), String> {
    let selection = args
        .selection()
        .ok_or_else(|| "one of --postal-code, --zone or --distance-km is required".to_string())?;

    let service = StoreConfigurationService::new(Arc::new(RestStore::new(args.store.rest_config())));

    let stored = service
        .delivery_configuration()
        .await
        .map_err(|error| format!("failed to load delivery configuration: {error}"))?;

    let configuration = match stored {
        Some(configuration) => configuration,
        None => {
            args.settings
                .load()
                .map_err(|error| format!("failed to load pricing settings: {error}"))?
                .delivery
        }
    };

    let resolved = delivery::resolve(&configuration, &selection)
        .map_err(|error| format!("failed to quote delivery: {error}"))?;

    println!("zone: {}", resolved.zone_name);
    println!("fee: {}", resolved.fee);

    Ok(())
}
