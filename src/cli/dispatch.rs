use chrono::{Local, NaiveDate};
use clap::Parser;
use itertools::Itertools;

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
        dispatch::{Dispatcher, ThresholdPolicy},
        sizing::required_capacity,
    },
    prelude::*,
    tables::{build_steps_table, build_summary_table},
};

#[derive(Parser)]
pub struct DispatchArgs {
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
}

#[instrument(skip_all)]
pub async fn dispatch(args: &DispatchArgs) -> Result {
    let battery = args.battery.config()?;
    let consumption = args.consumption.load(None)?.profile;
    let threshold = args.threshold.resolve(&consumption, &battery);
    let on = args.on.unwrap_or_else(|| Local::now().date_naive());

    let grid_rates = args.price.provider()?.get_rates(on).await?;
    let initial_state_of_charge = args.state_of_charge.resolve(&battery).await;

    let schedule = Dispatcher::builder()
        .consumption(&consumption)
        .grid_rates(&grid_rates)
        .threshold(threshold)
        .battery(&battery)
        .policy(args.policy)
        .build()
        .dispatch(initial_state_of_charge.fraction(&battery));
    let steps = schedule.steps(&consumption, &grid_rates).collect_vec();
    println!("{}", build_steps_table(&steps, threshold));
    println!("{}", build_summary_table(&schedule, &schedule.summary(&consumption, &grid_rates)));

    let violations = schedule.threshold_violations(threshold);
    if !violations.is_empty() {
        warn!(
            ?violations,
            required_capacity = ?required_capacity(&consumption, threshold),
            "the grid load stays above the threshold",
        );
    }
    Ok(())
}
