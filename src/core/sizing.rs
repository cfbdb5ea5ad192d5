use std::cmp::Reverse;

use bon::Builder;
use chrono::TimeDelta;
use ordered_float::OrderedFloat;

use crate::{
    core::{
        battery::BatteryConfig,
        dispatch::{Dispatcher, ThresholdPolicy},
        schedule::DaySchedule,
        series::Hourly,
        summary::Summary,
    },
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts, rate::KilowattHourRate},
};

/// Candidate capacities compared by default, kilowatt-hours.
pub const DEFAULT_CAPACITIES: [f64; 5] = [0.0, 500.0, 1000.0, 1500.0, 2000.0];

/// Lowest threshold the battery power can hold the peak hour to.
pub fn min_grid_threshold(
    consumption: &Hourly<KilowattHours>,
    power_limit: Kilowatts,
) -> Kilowatts {
    (consumption.peak().1 / TimeDelta::hours(1) - power_limit).non_negative()
}

/// Energy it takes to keep every hour of the day under the threshold.
pub fn required_capacity(
    consumption: &Hourly<KilowattHours>,
    threshold: Kilowatts,
) -> KilowattHours {
    let threshold = threshold * TimeDelta::hours(1);
    consumption.iter().map(|consumption| (consumption - threshold).non_negative()).sum()
}

#[derive(Clone, Debug)]
pub struct SizingOutcome {
    pub capacity: KilowattHours,
    pub schedule: DaySchedule,
    pub summary: Summary,
}

/// Dispatches the same day with different battery capacities.
#[derive(Builder)]
pub struct SizeComparison<'a> {
    consumption: &'a Hourly<KilowattHours>,
    grid_rates: &'a Hourly<KilowattHourRate>,
    threshold: Kilowatts,

    /// Everything but the capacity is taken from here.
    battery: &'a BatteryConfig,

    #[builder(default)]
    policy: ThresholdPolicy,

    /// Starting state-of-charge fraction of every candidate.
    state_of_charge: f64,
}

impl SizeComparison<'_> {
    /// Every candidate gets its own battery state.
    #[instrument(skip_all)]
    pub fn compare(&self, capacities: &[KilowattHours]) -> Result<Vec<SizingOutcome>> {
        capacities
            .iter()
            .map(|&capacity| {
                let battery = self.battery.with_capacity(capacity)?;
                let schedule = Dispatcher::builder()
                    .consumption(self.consumption)
                    .grid_rates(self.grid_rates)
                    .threshold(self.threshold)
                    .battery(&battery)
                    .policy(self.policy)
                    .build()
                    .dispatch(self.state_of_charge);
                let summary = schedule.summary(self.consumption, self.grid_rates);
                info!(%capacity, profit = %summary.profit(), "compared");
                Ok(SizingOutcome { capacity, schedule, summary })
            })
            .collect()
    }
}

/// The most profitable outcome, the first one wins a tie.
#[must_use]
pub fn most_profitable(outcomes: &[SizingOutcome]) -> Option<&SizingOutcome> {
    outcomes.iter().min_by_key(|outcome| Reverse(OrderedFloat(outcome.summary.profit().0)))
}
