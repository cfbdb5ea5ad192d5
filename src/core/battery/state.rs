use crate::{
    core::{battery::BatteryConfig, series::N_HOURS},
    quantity::energy::KilowattHours,
};

/// Residual energy at every hour boundary of the day being dispatched.
///
/// Boundary `k` is the start of hour `k`, boundary [`N_HOURS`] is the end of the day.
/// Charging or discharging within hour `h` shifts every boundary after `h`, so an action
/// is only admissible when none of those boundaries leaves the allowed range.
#[must_use]
#[derive(Clone, Debug)]
pub struct DispatchState {
    residual_energy: [KilowattHours; N_HOURS + 1],
    min_residual_energy: KilowattHours,
    max_residual_energy: KilowattHours,
    efficiency: f64,
}

impl DispatchState {
    pub fn new(config: &BatteryConfig, state_of_charge: f64) -> Self {
        Self {
            residual_energy: [config.capacity * state_of_charge; N_HOURS + 1],
            min_residual_energy: config.min_residual_energy(),
            max_residual_energy: config.max_residual_energy(),
            efficiency: config.efficiency,
        }
    }

    pub const fn residual_energy(&self) -> &[KilowattHours; N_HOURS + 1] {
        &self.residual_energy
    }

    pub const fn ending_residual_energy(&self) -> KilowattHours {
        self.residual_energy[N_HOURS]
    }

    /// Grid energy that may still be stored during the hour.
    pub fn charge_headroom(&self, hour: usize) -> KilowattHours {
        let peak = self.after(hour).fold(KilowattHours::ZERO, KilowattHours::max);
        ((self.max_residual_energy - peak) / self.efficiency).non_negative()
    }

    /// Energy that may still be delivered during the hour.
    pub fn discharge_headroom(&self, hour: usize) -> KilowattHours {
        (self.stored_above_floor(hour) * self.efficiency).non_negative()
    }

    /// Grid energy of an earlier charge within the hour that may be given back.
    pub fn cancel_charge_headroom(&self, hour: usize) -> KilowattHours {
        (self.stored_above_floor(hour) / self.efficiency).non_negative()
    }

    /// Store energy drawn from the grid within the hour, the caller checks the headroom.
    pub fn charge(&mut self, hour: usize, energy: KilowattHours) {
        self.shift(hour, energy * self.efficiency);
    }

    /// Deliver energy within the hour, the caller checks the headroom.
    pub fn discharge(&mut self, hour: usize, energy: KilowattHours) {
        self.shift(hour, -(energy / self.efficiency));
    }

    /// Undo a part of the charge within the hour, the caller checks the headroom.
    pub fn cancel_charge(&mut self, hour: usize, energy: KilowattHours) {
        self.shift(hour, -(energy * self.efficiency));
    }

    fn stored_above_floor(&self, hour: usize) -> KilowattHours {
        self.after(hour).fold(self.residual_energy[N_HOURS], KilowattHours::min)
            - self.min_residual_energy
    }

    fn after(&self, hour: usize) -> impl Iterator<Item = KilowattHours> + '_ {
        self.residual_energy[hour + 1..].iter().copied()
    }

    fn shift(&mut self, hour: usize, delta: KilowattHours) {
        for residual_energy in &mut self.residual_energy[hour + 1..] {
            *residual_energy += delta;
        }
    }
}
