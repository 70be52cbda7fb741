use clap::{Parser, Subcommand};
use garland_app::config::LoggingConfig;

mod delivery;
mod discount;
mod order;
mod settings;

#[derive(Debug, Parser)]
#[command(name = "garland", about = "Garland storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Quote the delivery fee for a postal code, zone or distance
    QuoteDelivery(delivery::QuoteDeliveryArgs),

    /// Check a discount code against a subtotal
    CheckDiscount(discount::CheckDiscountArgs),

    /// Move an order to its next status
    SetOrderStatus(order::SetOrderStatusArgs),

    /// Load a pricing settings file and print what it resolves to
    CheckSettings(settings::CheckSettingsArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::QuoteDelivery(args) => delivery::run(args).await,
            Commands::CheckDiscount(args) => discount::run(args).await,
            Commands::SetOrderStatus(args) => order::run(args).await,
            Commands::CheckSettings(args) => settings::run(args).await,
        }
    }
}
