use crate::{
    core::{dispatch::plan::DayPlan, series::N_HOURS},
    prelude::*,
};

/// Discharge wherever the grid load exceeds the threshold, in chronological order.
///
/// Afterwards, every hour is at or under the threshold unless the battery ran out of power
/// or stored energy.
pub fn shave_peaks(plan: &mut DayPlan) {
    for hour in 0..N_HOURS {
        let excess = plan.excess(hour);
        if excess.is_negligible() {
            continue;
        }
        let discharged = plan.discharge_up_to(hour, excess);
        plan.peak_shaving_energy += discharged;
        debug!(hour, ?excess, ?discharged, "shaved");
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        core::{battery::BatteryConfig, series::Hourly},
        quantity::{energy::KilowattHours, power::Kilowatts, rate::KilowattHourRate},
    };

    #[test]
    fn test_shaves_every_peak_with_enough_energy() -> Result {
        let mut consumption = Hourly::splat(KilowattHours::from(4.0));
        consumption[8] = KilowattHours::from(9.0);
        consumption[18] = KilowattHours::from(12.0);
        let grid_rates = Hourly::splat(KilowattHourRate::ZERO);
        let battery = BatteryConfig::builder()
            .power_limit(Kilowatts::from(10.0))
            .capacity(KilowattHours::from(100.0))
            .efficiency(0.8)
            .build()?;
        let mut plan = DayPlan::new(&consumption, &grid_rates, Kilowatts::from(5.0), &battery, 0.5);

        shave_peaks(&mut plan);

        assert_abs_diff_eq!(plan.discharge[8].0, 4.0);
        assert_abs_diff_eq!(plan.discharge[18].0, 7.0);
        assert_abs_diff_eq!(plan.peak_shaving_energy.0, 11.0);
        assert_abs_diff_eq!(plan.state.ending_residual_energy().0, 36.25, epsilon = 1e-9);
        for hour in 0..N_HOURS {
            assert!(plan.net_grid_load(hour).0 <= 5.0 + 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_stops_at_floor() -> Result {
        let consumption = Hourly::splat(KilowattHours::from(10.0));
        let grid_rates = Hourly::splat(KilowattHourRate::ZERO);
        let battery = BatteryConfig::builder()
            .power_limit(Kilowatts::from(100.0))
            .capacity(KilowattHours::from(100.0))
            .efficiency(1.0)
            .min_state_of_charge(0.2)
            .max_state_of_charge(1.0)
            .build()?;
        let mut plan = DayPlan::new(&consumption, &grid_rates, Kilowatts::from(5.0), &battery, 0.5);

        shave_peaks(&mut plan);

        // 30 kWh above the floor cover six hours of 5 kWh excess.
        for hour in 0..6 {
            assert_abs_diff_eq!(plan.net_grid_load(hour).0, 5.0);
        }
        for hour in 6..N_HOURS {
            assert_abs_diff_eq!(plan.net_grid_load(hour).0, 10.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(plan.state.ending_residual_energy().0, 20.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_limited_by_power() -> Result {
        let mut consumption = Hourly::splat(KilowattHours::ZERO);
        consumption[12] = KilowattHours::from(50.0);
        let grid_rates = Hourly::splat(KilowattHourRate::ZERO);
        let battery = BatteryConfig::builder()
            .power_limit(Kilowatts::from(15.0))
            .capacity(KilowattHours::from(200.0))
            .build()?;
        let mut plan = DayPlan::new(&consumption, &grid_rates, Kilowatts::from(20.0), &battery, 0.9);

        shave_peaks(&mut plan);

        assert_abs_diff_eq!(plan.discharge[12].0, 15.0);
        assert_abs_diff_eq!(plan.excess(12).0, 15.0);
        Ok(())
    }
}
