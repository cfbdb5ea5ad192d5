mod state;

use bon::bon;
use chrono::TimeDelta;

pub use self::state::DispatchState;
use crate::{
    ops::RangeInclusive,
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
};

/// States of charge closer to the limits than this count as within them.
const STATE_OF_CHARGE_TOLERANCE: f64 = 1e-9;

/// Immutable battery parameters shared by every dispatch within a run.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct BatteryConfig {
    pub power_limit: Kilowatts,

    /// Nominal capacity, zero means «no battery».
    pub capacity: KilowattHours,

    /// Round-trip efficiency, applied once on charging and once on discharging, `(0, 1]`.
    pub efficiency: f64,

    /// Allowed state-of-charge fractions of the capacity.
    pub state_of_charge_limits: RangeInclusive<f64>,
}

#[bon]
impl BatteryConfig {
    #[builder]
    pub fn new(
        power_limit: Kilowatts,
        capacity: KilowattHours,
        #[builder(default = 0.9)] efficiency: f64,
        #[builder(default = 0.1)] min_state_of_charge: f64,
        #[builder(default = 0.9)] max_state_of_charge: f64,
    ) -> Result<Self> {
        ensure!(
            power_limit.0.is_finite() && power_limit > Kilowatts::ZERO,
            "power limit must be positive, got {power_limit}",
        );
        ensure!(
            capacity.0.is_finite() && capacity >= KilowattHours::ZERO,
            "capacity must not be negative, got {capacity}",
        );
        ensure!(
            efficiency > 0.0 && efficiency <= 1.0,
            "efficiency must be within (0, 1], got {efficiency}",
        );
        ensure!(
            (0.0..=1.0).contains(&min_state_of_charge),
            "minimum state-of-charge must be within [0, 1], got {min_state_of_charge}",
        );
        ensure!(
            (0.0..=1.0).contains(&max_state_of_charge),
            "maximum state-of-charge must be within [0, 1], got {max_state_of_charge}",
        );
        ensure!(
            min_state_of_charge <= max_state_of_charge,
            "minimum state-of-charge ({min_state_of_charge}) exceeds maximum ({max_state_of_charge})",
        );
        Ok(Self {
            power_limit,
            capacity,
            efficiency,
            state_of_charge_limits: RangeInclusive::from(min_state_of_charge..=max_state_of_charge),
        })
    }
}

impl BatteryConfig {
    /// Copy of the configuration with another capacity, validated again.
    pub fn with_capacity(self, capacity: KilowattHours) -> Result<Self> {
        Self::builder()
            .power_limit(self.power_limit)
            .capacity(capacity)
            .efficiency(self.efficiency)
            .min_state_of_charge(self.state_of_charge_limits.min)
            .max_state_of_charge(self.state_of_charge_limits.max)
            .build()
    }

    pub fn min_residual_energy(&self) -> KilowattHours {
        self.capacity * self.state_of_charge_limits.min
    }

    pub fn max_residual_energy(&self) -> KilowattHours {
        self.capacity * self.state_of_charge_limits.max
    }

    /// Maximum energy the battery may exchange with the grid within one hour.
    pub fn hourly_energy_limit(&self) -> KilowattHours {
        self.power_limit * TimeDelta::hours(1)
    }

    #[must_use]
    pub fn clamp_state_of_charge(&self, fraction: f64) -> f64 {
        self.state_of_charge_limits.clamp(fraction)
    }

    /// Whether the fraction lies within the limits, numerical noise aside.
    #[must_use]
    pub fn admits_state_of_charge(&self, fraction: f64) -> bool {
        let RangeInclusive { min, max } = self.state_of_charge_limits;
        RangeInclusive::from(min - STATE_OF_CHARGE_TOLERANCE..=max + STATE_OF_CHARGE_TOLERANCE)
            .contains(fraction)
    }

    pub fn is_degenerate(&self) -> bool {
        self.capacity.0 <= 0.0
    }
}

/// Charge or discharge rate used to derive the capacity from the power limit.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum CRate {
    /// Full power for one hour.
    #[value(name = "1")]
    One,

    /// Full power for a bit more than two hours.
    #[value(name = "0.5")]
    Half,
}

impl CRate {
    pub fn capacity_for(self, power_limit: Kilowatts) -> KilowattHours {
        match self {
            Self::One => power_limit * TimeDelta::hours(1),
            Self::Half => power_limit * TimeDelta::hours(1) * 2.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn build(capacity: f64, efficiency: f64, min: f64, max: f64) -> Result<BatteryConfig> {
        BatteryConfig::builder()
            .power_limit(Kilowatts::from(100.0))
            .capacity(KilowattHours::from(capacity))
            .efficiency(efficiency)
            .min_state_of_charge(min)
            .max_state_of_charge(max)
            .build()
    }

    #[test]
    fn test_defaults() -> Result {
        let config = BatteryConfig::builder()
            .power_limit(Kilowatts::from(100.0))
            .capacity(KilowattHours::from(1000.0))
            .build()?;
        assert_abs_diff_eq!(config.efficiency, 0.9);
        assert_abs_diff_eq!(config.min_residual_energy().0, 100.0);
        assert_abs_diff_eq!(config.max_residual_energy().0, 900.0);
        assert_abs_diff_eq!(config.hourly_energy_limit().0, 100.0);
        Ok(())
    }

    #[test]
    fn test_rejects_inverted_limits() {
        assert!(build(1000.0, 0.9, 0.8, 0.2).is_err());
    }

    #[test]
    fn test_rejects_non_positive_power() {
        assert!(
            BatteryConfig::builder()
                .power_limit(Kilowatts::ZERO)
                .capacity(KilowattHours::from(10.0))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_rejects_negative_capacity() {
        assert!(build(-1.0, 0.9, 0.1, 0.9).is_err());
    }

    #[test]
    fn test_rejects_efficiency_out_of_range() {
        assert!(build(1000.0, 0.0, 0.1, 0.9).is_err());
        assert!(build(1000.0, 1.01, 0.1, 0.9).is_err());
        assert!(build(1000.0, 1.0, 0.1, 0.9).is_ok());
    }

    #[test]
    fn test_accepts_zero_capacity() -> Result {
        assert!(build(0.0, 0.9, 0.1, 0.9)?.is_degenerate());
        Ok(())
    }

    #[test]
    fn test_with_capacity() -> Result {
        let config = build(1000.0, 0.95, 0.2, 0.8)?.with_capacity(KilowattHours::from(500.0))?;
        assert_abs_diff_eq!(config.capacity.0, 500.0);
        assert_abs_diff_eq!(config.efficiency, 0.95);
        assert_abs_diff_eq!(config.min_residual_energy().0, 100.0);
        Ok(())
    }

    #[test]
    fn test_clamp_state_of_charge() -> Result {
        let config = build(1000.0, 0.9, 0.1, 0.9)?;
        assert_abs_diff_eq!(config.clamp_state_of_charge(0.0), 0.1);
        assert_abs_diff_eq!(config.clamp_state_of_charge(1.0), 0.9);
        assert_abs_diff_eq!(config.clamp_state_of_charge(0.5), 0.5);
        Ok(())
    }

    #[test]
    fn test_admits_state_of_charge() -> Result {
        let config = build(1000.0, 0.9, 0.1, 0.9)?;
        assert!(config.admits_state_of_charge(0.5));
        assert!(config.admits_state_of_charge(0.9));

        // Left over from the previous day's arithmetic.
        assert!(config.admits_state_of_charge(0.9 + 1e-12));
        assert!(config.admits_state_of_charge(0.1 - 1e-12));

        assert!(!config.admits_state_of_charge(0.95));
        assert!(!config.admits_state_of_charge(0.05));
        Ok(())
    }

    #[test]
    fn test_c_rate_capacity() {
        let power = Kilowatts::from(500.0);
        assert_abs_diff_eq!(CRate::One.capacity_for(power).0, 500.0);
        assert_abs_diff_eq!(CRate::Half.capacity_for(power).0, 1075.0);
    }
}
