use crate::{
    core::working_mode::WorkingMode,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// Single-hour view of a dispatched day.
#[derive(Copy, Clone, Debug)]
pub struct Step {
    pub hour: usize,
    pub grid_rate: KilowattHourRate,
    pub consumption: KilowattHours,
    pub working_mode: WorkingMode,

    /// Energy exchanged with the battery: charged or discharged, depending on the mode.
    pub battery_energy: KilowattHours,

    pub residual_energy_before: KilowattHours,
    pub residual_energy_after: KilowattHours,
    pub grid_consumption: KilowattHours,
    pub grid_cost: Cost,
}
