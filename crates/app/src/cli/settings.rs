use clap::Args;
use garland::pricing::timing;
use garland_app::config::SettingsArgs;
use jiff::civil::Date;

#[derive(Debug, Args)]
pub(crate) struct CheckSettingsArgs {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Service date to price the timing surcharge for
    #[arg(long)]
    date: Option<Date>,
}

pub(crate) async fn run(args: CheckSettingsArgs) -> Result<(), String> {
    let settings = args
        .settings
        .load()
        .map_err(|error| format!("failed to load pricing settings: {error}"))?;

    for tier in settings.men_power.tiers() {
        println!("crew {}+: {}", tier.min_workers, tier.surcharge);
    }

    println!("delivery_model: {:?}", settings.delivery.model);
    println!("delivery_zones: {}", settings.delivery.zones.len());

    if let Some(date) = args.date {
        match timing::winning_rule(date, &settings.timing_surcharges, &settings.holidays) {
            Some(rule) => println!("{date}: {} {}", rule.name, rule.amount),
            None => println!("{date}: no surcharge"),
        }
    }

    Ok(())
}
