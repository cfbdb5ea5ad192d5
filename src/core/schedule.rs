use chrono::TimeDelta;

use crate::{
    core::{
        series::{Hourly, N_HOURS},
        step::Step,
        summary::Summary,
        working_mode::WorkingMode,
    },
    quantity::{
        cost::Cost,
        energy::KilowattHours,
        power::Kilowatts,
        rate::KilowattHourRate,
    },
};

/// Dispatch outcome for a single day.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct DaySchedule {
    /// Energy drawn from the grid into the battery.
    pub charge: Hourly<KilowattHours>,

    /// Energy delivered by the battery.
    pub discharge: Hourly<KilowattHours>,

    /// Consumption minus discharge plus charge.
    pub net_grid_load: Hourly<KilowattHours>,

    /// Residual energy at each hour boundary, the last item is the end of the day.
    pub residual_energy: [KilowattHours; N_HOURS + 1],

    /// Residual energy at the end of the day as a fraction of the capacity.
    pub ending_state_of_charge: f64,

    /// Revenue of arbitrage discharging minus the cost of arbitrage charging.
    pub arbitrage_savings: Cost,

    /// Energy discharged to keep the grid load under the threshold.
    pub peak_shaving_energy: KilowattHours,
}

impl DaySchedule {
    /// Schedule that leaves the battery untouched.
    pub fn idle(
        consumption: &Hourly<KilowattHours>,
        residual_energy: KilowattHours,
        state_of_charge: f64,
    ) -> Self {
        Self {
            charge: Hourly::splat(KilowattHours::ZERO),
            discharge: Hourly::splat(KilowattHours::ZERO),
            net_grid_load: *consumption,
            residual_energy: [residual_energy; N_HOURS + 1],
            ending_state_of_charge: state_of_charge,
            arbitrage_savings: Cost::ZERO,
            peak_shaving_energy: KilowattHours::ZERO,
        }
    }

    pub fn working_mode(&self, hour: usize) -> WorkingMode {
        if !self.charge[hour].is_negligible() {
            WorkingMode::Charging
        } else if !self.discharge[hour].is_negligible() {
            WorkingMode::Discharging
        } else {
            WorkingMode::Idle
        }
    }

    /// Hours where the grid load stayed above the threshold.
    #[must_use]
    pub fn threshold_violations(&self, threshold: Kilowatts) -> Vec<usize> {
        let threshold = threshold * TimeDelta::hours(1);
        self.net_grid_load
            .enumerate()
            .filter(|(_, load)| !(*load - threshold).non_negative().is_negligible())
            .map(|(hour, _)| hour)
            .collect()
    }

    pub fn total_charge(&self) -> KilowattHours {
        self.charge.total()
    }

    pub fn total_discharge(&self) -> KilowattHours {
        self.discharge.total()
    }

    pub fn summary(
        &self,
        consumption: &Hourly<KilowattHours>,
        grid_rates: &Hourly<KilowattHourRate>,
    ) -> Summary {
        Summary {
            grid_cost: self.net_grid_load.zip_with(grid_rates, |load, rate| load * rate).total(),
            grid_cost_without_battery: consumption
                .zip_with(grid_rates, |consumption, rate| consumption * rate)
                .total(),
            peak_grid_consumption: self.net_grid_load.peak().1,
            peak_consumption: consumption.peak().1,
        }
    }

    pub fn steps<'a>(
        &'a self,
        consumption: &'a Hourly<KilowattHours>,
        grid_rates: &'a Hourly<KilowattHourRate>,
    ) -> impl Iterator<Item = Step> + 'a {
        (0..N_HOURS).map(move |hour| {
            let working_mode = self.working_mode(hour);
            Step {
                hour,
                grid_rate: grid_rates[hour],
                consumption: consumption[hour],
                working_mode,
                battery_energy: match working_mode {
                    WorkingMode::Charging => self.charge[hour],
                    WorkingMode::Discharging => self.discharge[hour],
                    WorkingMode::Idle => KilowattHours::ZERO,
                },
                residual_energy_before: self.residual_energy[hour],
                residual_energy_after: self.residual_energy[hour + 1],
                grid_consumption: self.net_grid_load[hour],
                grid_cost: self.net_grid_load[hour] * grid_rates[hour],
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_idle() {
        let consumption = Hourly::from_fn(|hour| KilowattHours::from(hour as f64));
        let schedule = DaySchedule::idle(&consumption, KilowattHours::from(50.0), 0.5);
        assert_eq!(schedule.net_grid_load, consumption);
        assert_eq!(schedule.working_mode(12), WorkingMode::Idle);
        assert_eq!(schedule.total_charge(), KilowattHours::ZERO);
        assert_abs_diff_eq!(schedule.ending_state_of_charge, 0.5);
    }

    #[test]
    fn test_threshold_violations() {
        let mut consumption = Hourly::splat(KilowattHours::from(5.0));
        consumption[7] = KilowattHours::from(8.0);
        consumption[19] = KilowattHours::from(6.5);
        let schedule = DaySchedule::idle(&consumption, KilowattHours::ZERO, 0.0);
        assert_eq!(schedule.threshold_violations(Kilowatts::from(6.0)), vec![7, 19]);
        assert!(schedule.threshold_violations(Kilowatts::from(8.0)).is_empty());
    }

    #[test]
    fn test_summary() {
        let consumption = Hourly::splat(KilowattHours::from(10.0));
        let mut schedule = DaySchedule::idle(&consumption, KilowattHours::from(100.0), 0.5);
        schedule.discharge[18] = KilowattHours::from(4.0);
        schedule.net_grid_load[18] = KilowattHours::from(6.0);
        let mut grid_rates = Hourly::splat(KilowattHourRate::from(1.0));
        grid_rates[18] = KilowattHourRate::from(3.0);

        let summary = schedule.summary(&consumption, &grid_rates);
        assert_abs_diff_eq!(summary.grid_cost_without_battery.0, 23.0 * 10.0 + 30.0);
        assert_abs_diff_eq!(summary.grid_cost.0, 23.0 * 10.0 + 18.0);
        assert_abs_diff_eq!(summary.profit().0, 12.0);
        assert_abs_diff_eq!(summary.peak_reduction().0, 0.0);
    }

    #[test]
    fn test_steps() {
        let consumption = Hourly::splat(KilowattHours::from(2.0));
        let mut schedule = DaySchedule::idle(&consumption, KilowattHours::from(10.0), 0.5);
        schedule.charge[3] = KilowattHours::from(1.0);
        let steps: Vec<Step> = schedule.steps(&consumption, &Hourly::splat(KilowattHourRate::ZERO)).collect();
        assert_eq!(steps.len(), N_HOURS);
        assert_eq!(steps[3].working_mode, WorkingMode::Charging);
        assert_eq!(steps[3].battery_energy, KilowattHours::from(1.0));
        assert_eq!(steps[4].working_mode, WorkingMode::Idle);
    }
}
