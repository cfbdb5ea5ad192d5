use chrono::{Local, NaiveDate};
use clap::Parser;

use crate::{
    api::provider::PriceProvider,
    cli::{
        battery::BatteryArgs,
        consumption::ConsumptionArgs,
        price::PriceArgs,
        soc::StateOfChargeArgs,
        threshold::ThresholdArgs,
    },
    core::{
        dispatch::ThresholdPolicy,
        sizing::{DEFAULT_CAPACITIES, SizeComparison, most_profitable},
    },
    prelude::*,
    quantity::energy::KilowattHours,
    tables::build_sizing_table,
};

#[derive(Parser)]
pub struct CompareArgs {
    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub consumption: ConsumptionArgs,

    #[clap(flatten)]
    pub threshold: ThresholdArgs,

    #[clap(long = "policy", env = "THRESHOLD_POLICY", default_value = "strict-threshold")]
    pub policy: ThresholdPolicy,

    #[clap(flatten)]
    pub price: PriceArgs,

    #[clap(flatten)]
    pub state_of_charge: StateOfChargeArgs,

    /// Day to dispatch, today when omitted.
    #[clap(long = "on")]
    pub on: Option<NaiveDate>,

    /// Comma-separated candidate capacities in kilowatt-hours.
    #[clap(long = "capacities-kwh", value_delimiter = ',')]
    pub capacities: Vec<KilowattHours>,
}

#[instrument(skip_all)]
pub async fn compare(args: &CompareArgs) -> Result {
    let battery = args.battery.config()?;
    let consumption = args.consumption.load(None)?.profile;
    let threshold = args.threshold.resolve(&consumption, &battery);
    let on = args.on.unwrap_or_else(|| Local::now().date_naive());
    let capacities = if args.capacities.is_empty() {
        DEFAULT_CAPACITIES.map(KilowattHours::from).to_vec()
    } else {
        args.capacities.clone()
    };

    let grid_rates = args.price.provider()?.get_rates(on).await?;
    let initial_state_of_charge = args.state_of_charge.resolve(&battery).await;

    let outcomes = SizeComparison::builder()
        .consumption(&consumption)
        .grid_rates(&grid_rates)
        .threshold(threshold)
        .battery(&battery)
        .policy(args.policy)
        .state_of_charge(initial_state_of_charge.fraction(&battery))
        .build()
        .compare(&capacities)?;
    let best = most_profitable(&outcomes);
    println!("{}", build_sizing_table(&outcomes, best));
    if let Some(best) = best {
        info!(capacity = ?best.capacity, profit = ?best.summary.profit(), "most profitable");
    }
    Ok(())
}
