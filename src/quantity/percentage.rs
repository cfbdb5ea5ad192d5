use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Percentage as it is entered by users and reported by battery management systems.
#[derive(
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Deserialize,
    Serialize,
    derive_more::From,
    derive_more::FromStr,
)]
pub struct Percentage(pub f64);

impl Percentage {
    #[must_use]
    pub fn to_ratio(self) -> f64 {
        self.0 / 100.0
    }

    #[must_use]
    pub fn from_ratio(ratio: f64) -> Self {
        Self(ratio * 100.0)
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl Debug for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
