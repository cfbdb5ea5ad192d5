use std::fmt::{Display, Formatter};

use comfy_table::Color;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum WorkingMode {
    /// Do not do anything.
    #[default]
    Idle,

    /// Draw energy from the grid into the battery.
    Charging,

    /// Cover the consumption from the battery.
    Discharging,
}

impl Display for WorkingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Charging => write!(f, "Charging"),
            Self::Discharging => write!(f, "Discharging"),
        }
    }
}

impl WorkingMode {
    pub const fn color(self) -> Color {
        match self {
            Self::Charging => Color::Green,
            Self::Discharging => Color::Blue,
            Self::Idle => Color::Reset,
        }
    }
}
