use chrono::TimeDelta;

use crate::{
    core::{
        battery::{BatteryConfig, DispatchState},
        schedule::DaySchedule,
        series::Hourly,
    },
    quantity::{
        cost::Cost,
        energy::KilowattHours,
        power::Kilowatts,
        rate::KilowattHourRate,
    },
};

/// Mutable state of a day being dispatched, shared by the passes.
///
/// Charge and discharge within the same hour are mutually exclusive: every method refuses
/// to add one while the other is present.
pub struct DayPlan<'a> {
    pub consumption: &'a Hourly<KilowattHours>,
    pub grid_rates: &'a Hourly<KilowattHourRate>,

    /// Grid import threshold per hour.
    pub threshold: KilowattHours,

    /// Battery power limit per hour.
    pub energy_limit: KilowattHours,

    pub charge: Hourly<KilowattHours>,
    pub discharge: Hourly<KilowattHours>,
    pub state: DispatchState,
    pub arbitrage_savings: Cost,
    pub peak_shaving_energy: KilowattHours,

    capacity: KilowattHours,
}

impl<'a> DayPlan<'a> {
    pub fn new(
        consumption: &'a Hourly<KilowattHours>,
        grid_rates: &'a Hourly<KilowattHourRate>,
        threshold: Kilowatts,
        battery: &BatteryConfig,
        state_of_charge: f64,
    ) -> Self {
        Self {
            consumption,
            grid_rates,
            threshold: threshold * TimeDelta::hours(1),
            energy_limit: battery.hourly_energy_limit(),
            charge: Hourly::splat(KilowattHours::ZERO),
            discharge: Hourly::splat(KilowattHours::ZERO),
            state: DispatchState::new(battery, state_of_charge),
            arbitrage_savings: Cost::ZERO,
            peak_shaving_energy: KilowattHours::ZERO,
            capacity: battery.capacity,
        }
    }

    pub fn net_grid_load(&self, hour: usize) -> KilowattHours {
        self.consumption[hour] - self.discharge[hour] + self.charge[hour]
    }

    /// Grid load above the threshold, zero if there is none.
    pub fn excess(&self, hour: usize) -> KilowattHours {
        (self.net_grid_load(hour) - self.threshold).non_negative()
    }

    /// Power still unused within the hour.
    fn remaining_energy_limit(&self, hour: usize) -> KilowattHours {
        (self.energy_limit - self.charge[hour] - self.discharge[hour]).non_negative()
    }

    /// Charge up to the requested energy, bounded by power and the capacity headroom.
    ///
    /// Returns the energy actually charged.
    pub fn charge_up_to(&mut self, hour: usize, requested: KilowattHours) -> KilowattHours {
        if !self.discharge[hour].is_negligible() {
            return KilowattHours::ZERO;
        }
        let energy = requested
            .min(self.remaining_energy_limit(hour))
            .min(self.state.charge_headroom(hour))
            .non_negative();
        if energy.is_negligible() {
            return KilowattHours::ZERO;
        }
        self.state.charge(hour, energy);
        self.charge[hour] += energy;
        energy
    }

    /// Discharge up to the requested energy, bounded by power, the stored energy above the floor,
    /// and the grid load so that nothing is exported.
    ///
    /// Returns the energy actually discharged.
    pub fn discharge_up_to(&mut self, hour: usize, requested: KilowattHours) -> KilowattHours {
        if !self.charge[hour].is_negligible() {
            return KilowattHours::ZERO;
        }
        let energy = requested
            .min(self.remaining_energy_limit(hour))
            .min(self.state.discharge_headroom(hour))
            .min(self.net_grid_load(hour))
            .non_negative();
        if energy.is_negligible() {
            return KilowattHours::ZERO;
        }
        self.state.discharge(hour, energy);
        self.discharge[hour] += energy;
        energy
    }

    /// Give back up to the requested part of the hour's charge.
    ///
    /// Returns the energy actually given back.
    pub fn cancel_charge_up_to(&mut self, hour: usize, requested: KilowattHours) -> KilowattHours {
        let energy = requested
            .min(self.charge[hour])
            .min(self.state.cancel_charge_headroom(hour))
            .non_negative();
        if energy.is_negligible() {
            return KilowattHours::ZERO;
        }
        self.state.cancel_charge(hour, energy);
        self.charge[hour] -= energy;
        energy
    }

    pub fn into_schedule(self) -> DaySchedule {
        let net_grid_load = Hourly::from_fn(|hour| self.net_grid_load(hour));
        let residual_energy = *self.state.residual_energy();
        DaySchedule {
            charge: self.charge,
            discharge: self.discharge,
            net_grid_load,
            ending_state_of_charge: self.state.ending_residual_energy().0 / self.capacity.0,
            residual_energy,
            arbitrage_savings: self.arbitrage_savings,
            peak_shaving_energy: self.peak_shaving_energy,
        }
    }
}
