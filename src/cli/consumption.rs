use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::{
    core::series::Hourly,
    metering::MeteringExport,
    prelude::*,
    quantity::energy::KilowattHours,
};

#[derive(Parser)]
pub struct ConsumptionArgs {
    /// Comma-separated hourly consumption in kilowatt-hours, exactly 24 values.
    #[clap(
        long = "consumption-kwh",
        env = "CONSUMPTION_KWH",
        value_delimiter = ',',
        conflicts_with = "metering_export",
        required_unless_present = "metering_export"
    )]
    pub consumption: Option<Vec<KilowattHours>>,

    /// Metering export from the grid operator portal.
    #[clap(long = "metering-export", env = "METERING_EXPORT")]
    pub metering_export: Option<PathBuf>,

    /// Day of the metering export to take the profile from, the peak day when omitted.
    #[clap(long = "consumption-date", requires = "metering_export")]
    pub date: Option<NaiveDate>,
}

pub struct Consumption {
    /// Profile used for every dispatched day.
    pub profile: Hourly<KilowattHours>,

    pub export: Option<MeteringExport>,
}

/// Date range to restrict the metering export to, open ends extend to the whole export.
#[must_use]
pub fn metering_range(
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
) -> Option<(NaiveDate, NaiveDate)> {
    match (since, until) {
        (None, None) => None,
        (since, until) => Some((since.unwrap_or(NaiveDate::MIN), until.unwrap_or(NaiveDate::MAX))),
    }
}

impl ConsumptionArgs {
    /// Load the profile, taking the metering export days from the given range only.
    pub fn load(&self, range: Option<(NaiveDate, NaiveDate)>) -> Result<Consumption> {
        if let Some(values) = &self.consumption {
            let profile = Hourly::try_from(values.clone()).context("invalid consumption profile")?;
            ensure!(
                profile.iter().all(|consumption| consumption.0.is_finite() && consumption.0 >= 0.0),
                "consumption must be finite and non-negative",
            );
            return Ok(Consumption { profile, export: None });
        }
        let path = self.metering_export.as_ref().context("no consumption is given")?;
        let mut export = MeteringExport::from_path(path)?;
        if let Some((since, until)) = range {
            export = export.within(since, until)?;
        }
        let (date, profile) = export.profile(self.date)?;
        info!(%date, peak = ?profile.peak().1, "selected the consumption profile");
        Ok(Consumption { profile, export: Some(export) })
    }
}
