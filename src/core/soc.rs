use std::fmt::{Display, Formatter};

use crate::{core::battery::BatteryConfig, prelude::*, quantity::percentage::Percentage};

/// Starting state of charge for the first dispatched day, and where it came from.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub enum InitialStateOfCharge {
    /// Reported by the battery site.
    Measured(f64),

    /// Entered by the user.
    Manual(f64),

    /// Maximum allowed state of charge: the site is not configured or did not answer.
    Fallback { fraction: f64, reason: Option<String> },
}

impl InitialStateOfCharge {
    /// Pick the starting state of charge.
    ///
    /// A failed measurement is treated the same as a missing one.
    pub fn resolve(
        measured: Option<Result<Percentage>>,
        manual: Option<Percentage>,
        battery: &BatteryConfig,
    ) -> Self {
        let fallback = battery.state_of_charge_limits.max;
        match (measured, manual) {
            (Some(Ok(percentage)), _) => Self::Measured(percentage.to_ratio()),
            (Some(Err(error)), _) => {
                warn!("falling back to the maximum state of charge: {error:#}");
                Self::Fallback { fraction: fallback, reason: Some(format!("{error:#}")) }
            }
            (None, Some(percentage)) => Self::Manual(percentage.to_ratio()),
            (None, None) => Self::Fallback { fraction: fallback, reason: None },
        }
    }

    /// Fraction of the capacity, within the allowed limits.
    #[must_use]
    pub fn fraction(&self, battery: &BatteryConfig) -> f64 {
        let fraction = match self {
            Self::Measured(fraction) | Self::Manual(fraction) | Self::Fallback { fraction, .. } => {
                *fraction
            }
        };
        battery.clamp_state_of_charge(fraction)
    }
}

impl Display for InitialStateOfCharge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Measured(fraction) => {
                write!(f, "{} (measured)", Percentage::from_ratio(*fraction))
            }
            Self::Manual(fraction) => write!(f, "{} (manual)", Percentage::from_ratio(*fraction)),
            Self::Fallback { fraction, reason: None } => {
                write!(f, "{} (maximum)", Percentage::from_ratio(*fraction))
            }
            Self::Fallback { fraction, reason: Some(reason) } => {
                write!(f, "{} (maximum, {reason})", Percentage::from_ratio(*fraction))
            }
        }
    }
}
