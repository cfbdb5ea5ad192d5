use std::fmt::{Display, Formatter};

use chrono::TimeDelta;

use crate::{
    core::series::Hourly,
    quantity::{Quantity, cost::Cost, energy::KilowattHours, power::Kilowatts},
};

/// Number of months a demand tariff season lasts.
const N_SEASON_MONTHS: f64 = 6.0;

/// Demand tariff season: the monthly charge per kilowatt of the peak hour differs.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Season {
    /// October through March.
    #[default]
    Winter,

    /// April through September.
    Summer,
}

impl Season {
    /// Monthly demand charge per kilowatt of the billed peak.
    pub const fn monthly_demand_rate(self) -> Cost {
        match self {
            Self::Winter => Quantity(104.0),
            Self::Summer => Quantity(44.0),
        }
    }

    /// Savings per kilowatt-hour of peak reduction held through the whole season.
    pub fn billing_factor(self) -> Cost {
        self.monthly_demand_rate() * N_SEASON_MONTHS
    }
}

impl Display for Season {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winter => write!(f, "Winter"),
            Self::Summer => write!(f, "Summer"),
        }
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PeakShavingEstimate {
    pub season: Season,
    pub peak_consumption: KilowattHours,

    /// Worst hourly consumption above the threshold.
    pub peak_exceedance: KilowattHours,

    pub seasonal_savings: Cost,
}

impl PeakShavingEstimate {
    /// Value of cutting the worst hour of the profile down to the threshold.
    pub fn new(consumption: &Hourly<KilowattHours>, threshold: Kilowatts, season: Season) -> Self {
        let peak_consumption = consumption.iter().fold(KilowattHours::ZERO, KilowattHours::max);
        let peak_exceedance = (peak_consumption - threshold * TimeDelta::hours(1)).non_negative();
        Self {
            season,
            peak_consumption,
            peak_exceedance,
            seasonal_savings: season.billing_factor() * peak_exceedance.0,
        }
    }
}
