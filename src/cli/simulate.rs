use std::path::PathBuf;

use chrono::{Local, NaiveDate, TimeDelta};
use clap::Parser;

use crate::{
    api::provider::PriceProvider,
    cli::{
        battery::BatteryArgs,
        consumption::{ConsumptionArgs, metering_range},
        price::PriceArgs,
        soc::StateOfChargeArgs,
        threshold::ThresholdArgs,
    },
    core::{
        dispatch::ThresholdPolicy,
        driver::{Driver, date_range},
        estimate::{PeakShavingEstimate, Season},
    },
    export::export_csv,
    prelude::*,
    tables::{build_estimate_table, build_run_table},
};

/// Days simulated when the start of the range is omitted.
const DEFAULT_N_DAYS: i64 = 30;

#[derive(Parser)]
pub struct SimulateArgs {
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

    /// First simulated day, 30 days before the last one when omitted.
    ///
    /// When given, also restricts the metering export.
    #[clap(long = "since")]
    pub since: Option<NaiveDate>,

    /// Last simulated day, today when omitted.
    ///
    /// When given, also restricts the metering export.
    #[clap(long = "until")]
    pub until: Option<NaiveDate>,

    /// Write the hourly schedules into this CSV file.
    #[clap(long = "export")]
    pub export: Option<PathBuf>,
}

#[instrument(skip_all)]
pub async fn simulate(args: &SimulateArgs) -> Result {
    let battery = args.battery.config()?;
    let consumption = args.consumption.load(metering_range(args.since, args.until))?.profile;
    let threshold = args.threshold.resolve(&consumption, &battery);

    let until = args.until.unwrap_or_else(|| Local::now().date_naive());
    let since = args.since.unwrap_or(until - TimeDelta::days(DEFAULT_N_DAYS));
    let days = date_range(since, until)?;
    info!(%since, %until, n_days = days.len(), "simulating…");

    let mut prices = args.price.provider()?.prefetch(&days).await;
    let initial_state_of_charge = args.state_of_charge.resolve(&battery).await;
    let run = Driver::builder()
        .consumption(&consumption)
        .threshold(threshold)
        .battery(&battery)
        .policy(args.policy)
        .build()
        .run(days, &mut prices, initial_state_of_charge.fraction(&battery));
    println!("{}", build_run_table(&run));

    let estimates = [Season::Winter, Season::Summer]
        .map(|season| PeakShavingEstimate::new(&consumption, threshold, season));
    println!("{}", build_estimate_table(&estimates));

    if !run.skipped.is_empty() {
        warn!(n_skipped = run.skipped.len(), "some days have been skipped");
    }
    if let Some(path) = &args.export {
        export_csv(&run, path)?;
    }
    Ok(())
}
