//! Consumption exports of Norwegian grid operators, as downloaded from their customer portals.

use std::{cmp::Reverse, collections::BTreeMap, fs::File, io::Read, path::Path};

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    core::series::{Hourly, N_HOURS},
    prelude::*,
    quantity::{Quantity, energy::KilowattHours},
};

const TIMESTAMP_COLUMN: &str = "Fra";

/// Hourly readings are preferred over quarter-hourly ones when both are present.
const CONSUMPTION_COLUMNS: [&str; 2] = ["KWH 60 Forbruk", "KWH 15 Forbruk"];

const TIMESTAMP_FORMATS: [&str; 4] =
    ["%d.%m.%Y %H:%M", "%d.%m.%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Complete days of hourly consumption.
#[must_use]
#[derive(Clone, Debug)]
pub struct MeteringExport(BTreeMap<NaiveDate, Hourly<KilowattHours>>);

#[must_use]
#[derive(Clone, Debug)]
pub struct TopHours {
    /// Highest first, chronological on ties.
    pub hours: Vec<(NaiveDateTime, KilowattHours)>,

    pub average: KilowattHours,
}

impl MeteringExport {
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_path(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
        Self::from_reader(file)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut reader =
            csv::ReaderBuilder::new().delimiter(b';').flexible(true).from_reader(reader);
        let headers = reader.headers().context("failed to read the header")?.clone();
        let column_index = |name: &str| {
            headers.iter().position(|header| header.trim_start_matches('\u{feff}').trim() == name)
        };
        let timestamp_index = column_index(TIMESTAMP_COLUMN)
            .with_context(|| format!("the `{TIMESTAMP_COLUMN}` column is missing"))?;
        let (consumption_column, consumption_index) = CONSUMPTION_COLUMNS
            .into_iter()
            .find_map(|name| Some((name, column_index(name)?)))
            .with_context(|| format!("none of the columns {CONSUMPTION_COLUMNS:?} is present"))?;
        info!(consumption_column, "reading the metering export…");

        let mut readings: BTreeMap<NaiveDate, [Option<KilowattHours>; N_HOURS]> = BTreeMap::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("failed to read record #{}", line + 1))?;
            let timestamp = record.get(timestamp_index).unwrap_or_default();
            let timestamp = parse_timestamp(timestamp)
                .with_context(|| format!("invalid timestamp on record #{}", line + 1))?;
            let Some(value) = record.get(consumption_index).and_then(parse_decimal) else {
                debug!(%timestamp, "no reading");
                continue;
            };
            ensure!(value >= 0.0, "negative consumption on record #{}: {value}", line + 1);
            let slot = &mut readings.entry(timestamp.date()).or_default()
                [timestamp.hour() as usize];
            *slot = Some(slot.unwrap_or_default() + Quantity(value));
        }

        let days: BTreeMap<_, _> = readings
            .into_iter()
            .filter_map(|(date, hours)| {
                if let Some(hours) = hours.into_iter().collect::<Option<Vec<_>>>() {
                    Hourly::try_from(hours).ok().map(|hours| (date, hours))
                } else {
                    let n_hours = hours.iter().flatten().count();
                    warn!(%date, n_hours, "skipping the incomplete day");
                    None
                }
            })
            .collect();
        ensure!(!days.is_empty(), "the export contains no complete days");
        info!(n_days = days.len(), "read the metering export");
        Ok(Self(days))
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &Hourly<KilowattHours>)> {
        self.0.iter().map(|(date, hours)| (*date, hours))
    }

    pub fn get(&self, date: NaiveDate) -> Option<&Hourly<KilowattHours>> {
        self.0.get(&date)
    }

    /// The day with the highest hourly consumption, the earliest one on ties.
    pub fn peak_day(&self) -> Option<(NaiveDate, &Hourly<KilowattHours>)> {
        self.days().min_by_key(|(_, hours)| Reverse(OrderedFloat(hours.peak().1.0)))
    }

    pub fn top_hours(&self, n: usize) -> TopHours {
        let hours = self
            .days()
            .flat_map(|(date, hours)| {
                hours.enumerate().filter_map(move |(hour, consumption)| {
                    Some((date.and_hms_opt(u32::try_from(hour).ok()?, 0, 0)?, consumption))
                })
            })
            .sorted_by_key(|(_, consumption)| Reverse(OrderedFloat(consumption.0)))
            .take(n)
            .collect_vec();
        #[expect(clippy::cast_precision_loss)]
        let average = if hours.is_empty() {
            KilowattHours::ZERO
        } else {
            hours.iter().map(|(_, consumption)| *consumption).sum::<KilowattHours>()
                / hours.len() as f64
        };
        TopHours { hours, average }
    }

    /// The profile of the given day, or of the peak day when none is given.
    pub fn profile(&self, date: Option<NaiveDate>) -> Result<(NaiveDate, Hourly<KilowattHours>)> {
        match date {
            Some(date) => {
                let profile =
                    self.get(date).with_context(|| format!("no complete readings on {date}"))?;
                Ok((date, *profile))
            }
            None => {
                let (date, profile) = self.peak_day().context("the export is empty")?;
                Ok((date, *profile))
            }
        }
    }

    /// Only keep the days from `since` through `until`.
    pub fn within(&self, since: NaiveDate, until: NaiveDate) -> Result<Self> {
        let days: BTreeMap<_, _> =
            self.0.range(since..=until).map(|(date, hours)| (*date, *hours)).collect();
        ensure!(!days.is_empty(), "the export has no complete days from {since} through {until}");
        Ok(Self(days))
    }
}

fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .with_context(|| format!("unrecognized timestamp: `{text}`"))
}

/// Parse a number written with either a decimal comma or a decimal point.
fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.replace(',', ".").parse::<f64>().ok().filter(|value| value.is_finite())
}
