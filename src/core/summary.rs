use crate::quantity::{cost::Cost, energy::KilowattHours};

/// Grid cost of a dispatched day compared to the same day without a battery.
#[derive(Copy, Clone, Debug)]
pub struct Summary {
    pub grid_cost: Cost,
    pub grid_cost_without_battery: Cost,
    pub peak_grid_consumption: KilowattHours,
    pub peak_consumption: KilowattHours,
}

impl Summary {
    pub fn profit(&self) -> Cost {
        self.grid_cost_without_battery - self.grid_cost
    }

    pub fn peak_reduction(&self) -> KilowattHours {
        self.peak_consumption - self.peak_grid_consumption
    }
}
