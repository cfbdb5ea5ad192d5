use std::{fs::File, io::Write, path::Path};

use chrono::NaiveDate;
use serde::Serialize;

use crate::{core::driver::RangeRun, prelude::*, quantity::energy::KilowattHours};

#[derive(Serialize)]
struct Row {
    date: NaiveDate,
    hour: usize,
    working_mode: String,

    #[serde(rename = "charge_kwh")]
    charge: KilowattHours,

    #[serde(rename = "discharge_kwh")]
    discharge: KilowattHours,

    #[serde(rename = "net_grid_load_kwh")]
    net_grid_load: KilowattHours,

    #[serde(rename = "residual_energy_kwh")]
    residual_energy: KilowattHours,
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn export_csv(run: &RangeRun, path: &Path) -> Result {
    let file =
        File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
    write_csv(run, file)?;
    info!(n_days = run.schedules.len(), "exported");
    Ok(())
}

/// One row per dispatched hour, the residual energy is taken at the end of the hour.
pub fn write_csv(run: &RangeRun, writer: impl Write) -> Result {
    let mut writer = csv::Writer::from_writer(writer);
    for (date, schedule) in &run.schedules {
        for hour in 0..schedule.charge.0.len() {
            writer.serialize(Row {
                date: *date,
                hour,
                working_mode: schedule.working_mode(hour).to_string(),
                charge: schedule.charge[hour],
                discharge: schedule.discharge[hour],
                net_grid_load: schedule.net_grid_load[hour],
                residual_energy: schedule.residual_energy[hour + 1],
            })?;
        }
    }
    writer.flush().context("failed to flush the export")?;
    Ok(())
}
