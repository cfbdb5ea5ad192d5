use clap::Parser;

use crate::{
    core::{battery::BatteryConfig, series::Hourly, sizing::min_grid_threshold},
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

#[derive(Parser)]
pub struct ThresholdArgs {
    /// Grid import threshold in kilowatts, the lowest achievable one when omitted.
    #[clap(long = "threshold-kw", env = "GRID_THRESHOLD_KW")]
    pub threshold: Option<Kilowatts>,
}

impl ThresholdArgs {
    pub fn resolve(
        &self,
        consumption: &Hourly<KilowattHours>,
        battery: &BatteryConfig,
    ) -> Kilowatts {
        let min_threshold = min_grid_threshold(consumption, battery.power_limit);
        match self.threshold {
            Some(threshold) if threshold < min_threshold => {
                warn!(?threshold, ?min_threshold, "the battery power cannot hold the threshold");
                threshold
            }
            Some(threshold) => threshold,
            None => {
                info!(threshold = ?min_threshold, "using the minimum achievable threshold");
                min_threshold
            }
        }
    }
}
