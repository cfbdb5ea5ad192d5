mod arbitrage;
mod enforcement;
mod peak_shaving;
mod plan;

use bon::Builder;

use self::plan::DayPlan;
use crate::{
    core::{battery::BatteryConfig, schedule::DaySchedule, series::Hourly},
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts, rate::KilowattHourRate},
};

/// What gives way when arbitrage charging competes with the grid import threshold.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum ThresholdPolicy {
    /// Arbitrage never charges past the threshold.
    #[default]
    #[value(name = "strict-threshold")]
    Strict,

    /// Arbitrage charges at full power, the enforcement pass then brings the load
    /// back under the threshold as far as the stored energy allows.
    #[value(name = "best-effort")]
    BestEffort,
}

/// Greedy single-day dispatcher: peak shaving, then arbitrage, then threshold enforcement.
#[derive(Builder)]
pub struct Dispatcher<'a> {
    consumption: &'a Hourly<KilowattHours>,
    grid_rates: &'a Hourly<KilowattHourRate>,

    /// Grid import threshold.
    threshold: Kilowatts,

    battery: &'a BatteryConfig,

    #[builder(default)]
    policy: ThresholdPolicy,
}

impl Dispatcher<'_> {
    /// Dispatch the day starting from the given state-of-charge fraction.
    #[instrument(skip(self))]
    pub fn dispatch(&self, state_of_charge: f64) -> DaySchedule {
        let clamped = self.battery.clamp_state_of_charge(state_of_charge);
        if !self.battery.admits_state_of_charge(state_of_charge) {
            warn!(state_of_charge, clamped, "starting state-of-charge is out of bounds");
        }

        if self.battery.is_degenerate() {
            debug!("no capacity, leaving the battery idle");
            return DaySchedule::idle(self.consumption, KilowattHours::ZERO, clamped);
        }

        let mut plan =
            DayPlan::new(self.consumption, self.grid_rates, self.threshold, self.battery, clamped);
        peak_shaving::shave_peaks(&mut plan);
        arbitrage::arbitrage(&mut plan, self.policy);
        enforcement::enforce(&mut plan);

        let schedule = plan.into_schedule();
        debug!(
            ending_state_of_charge = schedule.ending_state_of_charge,
            arbitrage_savings = ?schedule.arbitrage_savings,
            peak_shaving_energy = ?schedule.peak_shaving_energy,
            "dispatched",
        );
        schedule
    }
}
