//! Battery-related CLI arguments.

use clap::Parser;

use crate::{
    core::battery::{BatteryConfig, CRate},
    prelude::*,
    quantity::{energy::KilowattHours, percentage::Percentage, power::Kilowatts},
};

#[derive(Parser)]
pub struct BatteryArgs {
    /// Maximum charging and discharging power in kilowatts.
    #[clap(long = "battery-power-kw", env = "BATTERY_POWER_KW")]
    pub power_limit: Kilowatts,

    /// Nominal capacity in kilowatt-hours, derived from the C-rate when omitted.
    #[clap(long = "battery-capacity-kwh", env = "BATTERY_CAPACITY_KWH")]
    pub capacity: Option<KilowattHours>,

    #[clap(long = "c-rate", env = "BATTERY_C_RATE", default_value = "1")]
    pub c_rate: CRate,

    /// Round-trip efficiency percentage.
    #[clap(long = "efficiency-percent", env = "BATTERY_EFFICIENCY_PERCENT", default_value = "90")]
    pub efficiency: Percentage,

    #[clap(long = "min-soc-percent", env = "BATTERY_MIN_SOC_PERCENT", default_value = "10")]
    pub min_state_of_charge: Percentage,

    #[clap(long = "max-soc-percent", env = "BATTERY_MAX_SOC_PERCENT", default_value = "90")]
    pub max_state_of_charge: Percentage,
}

impl BatteryArgs {
    pub fn config(&self) -> Result<BatteryConfig> {
        let capacity = self.capacity.unwrap_or_else(|| self.c_rate.capacity_for(self.power_limit));
        let config = BatteryConfig::builder()
            .power_limit(self.power_limit)
            .capacity(capacity)
            .efficiency(self.efficiency.to_ratio())
            .min_state_of_charge(self.min_state_of_charge.to_ratio())
            .max_state_of_charge(self.max_state_of_charge.to_ratio())
            .build()
            .context("invalid battery parameters")?;
        info!(
            power_limit = ?config.power_limit,
            capacity = ?config.capacity,
            efficiency = ?self.efficiency,
            state_of_charge_limits = ?config.state_of_charge_limits,
            "battery",
        );
        Ok(config)
    }
}
