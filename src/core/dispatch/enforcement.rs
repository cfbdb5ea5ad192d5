use crate::{
    core::{dispatch::plan::DayPlan, series::N_HOURS},
    prelude::*,
};

/// Repair whatever the earlier passes left over the threshold or below zero.
///
/// An hour over the threshold first gives back its own charge, and only then discharges.
/// An hour with negative grid load charges the surplus.
pub fn enforce(plan: &mut DayPlan) {
    for hour in 0..N_HOURS {
        let excess = plan.excess(hour);
        if !excess.is_negligible() {
            let cancelled = plan.cancel_charge_up_to(hour, excess);
            plan.arbitrage_savings += cancelled * plan.grid_rates[hour];
            let discharged = plan.discharge_up_to(hour, excess - cancelled);
            plan.peak_shaving_energy += discharged;
            let remaining = plan.excess(hour);
            if remaining.is_negligible() {
                debug!(hour, ?excess, ?cancelled, ?discharged, "enforced the threshold");
            } else {
                debug!(hour, ?remaining, "threshold is out of reach");
            }
        }

        let surplus = (-plan.net_grid_load(hour)).non_negative();
        if !surplus.is_negligible() {
            let charged = plan.charge_up_to(hour, surplus);
            debug!(hour, ?surplus, ?charged, "absorbed the surplus");
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::{
        core::{battery::BatteryConfig, series::Hourly},
        quantity::{
            energy::KilowattHours,
            power::Kilowatts,
            rate::KilowattHourRate,
        },
    };

    fn battery() -> Result<BatteryConfig> {
        BatteryConfig::builder()
            .power_limit(Kilowatts::from(20.0))
            .capacity(KilowattHours::from(100.0))
            .efficiency(1.0)
            .min_state_of_charge(0.0)
            .max_state_of_charge(1.0)
            .build()
    }

    #[test]
    fn test_discharges_excess() -> Result {
        let mut consumption = Hourly::splat(KilowattHours::from(5.0));
        consumption[10] = KilowattHours::from(15.0);
        let grid_rates = Hourly::splat(KilowattHourRate::from(1.0));
        let mut plan = DayPlan::new(&consumption, &grid_rates, Kilowatts::from(10.0), &battery()?, 0.5);

        enforce(&mut plan);

        assert_abs_diff_eq!(plan.discharge[10].0, 5.0);
        assert_abs_diff_eq!(plan.peak_shaving_energy.0, 5.0);
        assert_eq!(plan.arbitrage_savings.0, 0.0);
        Ok(())
    }

    #[test]
    fn test_cancels_own_charge_first() -> Result {
        let consumption = Hourly::splat(KilowattHours::from(5.0));
        let grid_rates = Hourly::splat(KilowattHourRate::from(2.0));
        let mut plan = DayPlan::new(&consumption, &grid_rates, Kilowatts::from(10.0), &battery()?, 0.5);
        plan.charge_up_to(3, KilowattHours::from(20.0));
        plan.arbitrage_savings -= KilowattHours::from(20.0) * grid_rates[3];

        enforce(&mut plan);

        assert_abs_diff_eq!(plan.charge[3].0, 5.0);
        assert_eq!(plan.discharge[3], KilowattHours::ZERO);
        assert_abs_diff_eq!(plan.net_grid_load(3).0, 10.0);
        assert_abs_diff_eq!(plan.arbitrage_savings.0, -10.0);
        Ok(())
    }

    #[test]
    fn test_absorbs_surplus() -> Result {
        let mut consumption = Hourly::splat(KilowattHours::from(1.0));
        consumption[12] = KilowattHours::from(-4.0);
        let grid_rates = Hourly::splat(KilowattHourRate::from(1.0));
        let mut plan = DayPlan::new(&consumption, &grid_rates, Kilowatts::from(10.0), &battery()?, 0.5);

        enforce(&mut plan);

        assert_abs_diff_eq!(plan.charge[12].0, 4.0);
        assert_abs_diff_eq!(plan.net_grid_load(12).0, 0.0);
        Ok(())
    }

    #[test]
    fn test_reports_out_of_reach() -> Result {
        let consumption = Hourly::splat(KilowattHours::from(50.0));
        let grid_rates = Hourly::splat(KilowattHourRate::from(1.0));
        let mut plan = DayPlan::new(&consumption, &grid_rates, Kilowatts::from(10.0), &battery()?, 0.5);

        enforce(&mut plan);

        // 50 kWh last for two and a half hours of 20 kW.
        assert_abs_diff_eq!(plan.discharge[0].0, 20.0);
        assert_abs_diff_eq!(plan.discharge[1].0, 20.0);
        assert_abs_diff_eq!(plan.discharge[2].0, 10.0);
        assert_eq!(plan.discharge[3], KilowattHours::ZERO);
        assert_abs_diff_eq!(plan.excess(3).0, 40.0);
        Ok(())
    }
}
