use std::sync::Arc;

use clap::Args;
use garland::{discounts, prices::Price};
use garland_app::{
    config::StoreArgs,
    domain::discounts::{DiscountsService, StoreDiscountsService},
    store::RestStore,
};
use jiff::Timestamp;
use rust_decimal::Decimal;

#[derive(Debug, Args)]
pub(crate) struct CheckDiscountArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Code as a customer would type it
    code: String,

    /// Order subtotal in dollars, delivery included
    #[arg(long)]
    subtotal: Decimal,
}

pub(crate) async fn run(args: CheckDiscountArgs) -> Result<(), String> {
    let subtotal =
        Price::from_decimal(args.subtotal).map_err(|error| format!("invalid subtotal: {error}"))?;

    let service = StoreDiscountsService::new(Arc::new(RestStore::new(args.store.rest_config())));

    let codes = service
        .active_codes()
        .await
        .map_err(|error| format!("failed to load discount codes: {error}"))?;

    let applied = discounts::validate(&codes, &args.code, subtotal, Timestamp::now())
        .map_err(|error| error.to_string())?;

    println!("code: {}", applied.code);
    println!("discount: {}", applied.amount);
    println!("total: {}", subtotal.saturating_sub(applied.amount));

    Ok(())
}
