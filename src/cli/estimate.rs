use chrono::NaiveDate;
use clap::Parser;

use crate::{
    cli::{
        battery::BatteryArgs,
        consumption::{ConsumptionArgs, metering_range},
        threshold::ThresholdArgs,
    },
    core::estimate::{PeakShavingEstimate, Season},
    prelude::*,
    tables::{build_estimate_table, build_top_hours_table},
};

#[derive(Parser)]
pub struct EstimateArgs {
    #[clap(flatten)]
    pub battery: BatteryArgs,

    #[clap(flatten)]
    pub consumption: ConsumptionArgs,

    #[clap(flatten)]
    pub threshold: ThresholdArgs,

    /// Number of the highest consumption hours of the metering export to list.
    #[clap(long = "top-hours", default_value = "3")]
    pub n_top_hours: usize,

    /// First day of the metering export to consider.
    #[clap(long = "since", requires = "metering_export")]
    pub since: Option<NaiveDate>,

    /// Last day of the metering export to consider.
    #[clap(long = "until", requires = "metering_export")]
    pub until: Option<NaiveDate>,
}

#[instrument(skip_all)]
pub fn estimate(args: &EstimateArgs) -> Result {
    let battery = args.battery.config()?;
    let consumption = args.consumption.load(metering_range(args.since, args.until))?;
    let threshold = args.threshold.resolve(&consumption.profile, &battery);

    let estimates = [Season::Winter, Season::Summer]
        .map(|season| PeakShavingEstimate::new(&consumption.profile, threshold, season));
    println!("{}", build_estimate_table(&estimates));

    if let Some(export) = &consumption.export {
        let top_hours = export.top_hours(args.n_top_hours);
        println!("{}", build_top_hours_table(&top_hours));
    }
    Ok(())
}
