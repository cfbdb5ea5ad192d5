use std::cmp::Reverse;

use itertools::Itertools;

use crate::{
    core::{
        dispatch::{ThresholdPolicy, plan::DayPlan},
        series::{Hourly, N_HOURS},
    },
    prelude::*,
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// Number of hours to charge in and, separately, to discharge in.
pub const N_ARBITRAGE_HOURS: usize = 3;

/// Cheapest hours, the earliest one wins a tie.
#[must_use]
pub fn cheapest_hours(grid_rates: &Hourly<KilowattHourRate>) -> Vec<usize> {
    (0..N_HOURS)
        .sorted_by_key(|&hour| (grid_rates[hour].ordered(), hour))
        .take(N_ARBITRAGE_HOURS)
        .collect()
}

/// Most expensive hours, the earliest one wins a tie.
///
/// May overlap with [`cheapest_hours`] on a flat day, the plan then refuses to discharge
/// in an hour that has charged.
#[must_use]
pub fn priciest_hours(grid_rates: &Hourly<KilowattHourRate>) -> Vec<usize> {
    (0..N_HOURS)
        .sorted_by_key(|&hour| (Reverse(grid_rates[hour].ordered()), hour))
        .take(N_ARBITRAGE_HOURS)
        .collect()
}

/// Charge in the cheapest hours and discharge in the most expensive ones.
///
/// Charging goes first, so that the discharging may spend the energy charged earlier in the day.
pub fn arbitrage(plan: &mut DayPlan, policy: ThresholdPolicy) {
    for hour in cheapest_hours(plan.grid_rates) {
        let requested = match policy {
            ThresholdPolicy::Strict => {
                plan.energy_limit.min((plan.threshold - plan.net_grid_load(hour)).non_negative())
            }
            ThresholdPolicy::BestEffort => plan.energy_limit,
        };
        let charged = plan.charge_up_to(hour, requested);
        plan.arbitrage_savings -= charged * plan.grid_rates[hour];
        debug!(hour, ?charged, rate = ?plan.grid_rates[hour], "charged");
    }

    for hour in priciest_hours(plan.grid_rates) {
        let discharged = plan.discharge_up_to(hour, plan.energy_limit);
        plan.arbitrage_savings += discharged * plan.grid_rates[hour];
        debug!(hour, ?discharged, rate = ?plan.grid_rates[hour], "discharged");
    }

    if plan.charge.iter().chain(plan.discharge.iter()).all(KilowattHours::is_negligible) {
        debug!("nothing to arbitrage");
    }
}
