//! [Hva koster strømmen](https://www.hvakosterstrommen.no/strompris-api) spot price client.

use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use itertools::Itertools;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    api::{client, provider::PriceProvider},
    core::series::Hourly,
    prelude::*,
    quantity::rate::KilowattHourRate,
};

/// Norwegian bidding zone.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum Region {
    /// Oslo and Eastern Norway.
    #[default]
    #[value(name = "NO1")]
    Oslo,

    /// Kristiansand and Southern Norway.
    #[value(name = "NO2")]
    Kristiansand,

    /// Trondheim and Central Norway.
    #[value(name = "NO3")]
    Trondheim,

    /// Tromsø and Northern Norway.
    #[value(name = "NO4")]
    Tromso,

    /// Bergen and Western Norway.
    #[value(name = "NO5")]
    Bergen,
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::Oslo => "NO1",
            Self::Kristiansand => "NO2",
            Self::Trondheim => "NO3",
            Self::Tromso => "NO4",
            Self::Bergen => "NO5",
        };
        write!(f, "{code}")
    }
}

pub struct Api {
    client: Client,
    region: Region,
}

impl Api {
    pub fn try_new(region: Region) -> Result<Self> {
        Ok(Self { client: client::try_new()?, region })
    }

    fn url(&self, on: NaiveDate) -> String {
        format!(
            "https://www.hvakosterstrommen.no/api/v1/prices/{}/{}_{}.json",
            on.format("%Y"),
            on.format("%m-%d"),
            self.region,
        )
    }
}

#[async_trait]
impl PriceProvider for Api {
    #[instrument(skip_all, fields(on = %on, region = %self.region))]
    async fn get_rates(&self, on: NaiveDate) -> Result<Hourly<KilowattHourRate>> {
        info!("fetching…");
        let entries = self
            .client
            .get(self.url(on))
            .send()
            .await
            .context("failed to call")?
            .error_for_status()
            .context("request failed")?
            .json::<Vec<Entry>>()
            .await
            .context("failed to deserialize the response")?;
        info!(n_entries = entries.len(), "fetched");
        to_hourly(entries)
    }
}

#[derive(Deserialize)]
struct Entry {
    #[serde(rename = "NOK_per_kWh")]
    rate: KilowattHourRate,

    time_start: DateTime<FixedOffset>,
}

/// Order the entries by time and require exactly one per hour.
///
/// Daylight saving days have 23 or 25 entries and are rejected.
fn to_hourly(entries: Vec<Entry>) -> Result<Hourly<KilowattHourRate>> {
    let rates = entries
        .into_iter()
        .sorted_by_key(|entry| entry.time_start)
        .map(|entry| {
            ensure!(entry.rate.0.is_finite(), "invalid rate at {}", entry.time_start);
            Ok(entry.rate)
        })
        .collect::<Result<Vec<_>>>()?;
    Hourly::try_from(rates)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::Local;

    use super::*;

    fn fixture(n_hours: usize) -> String {
        let entries = (0..n_hours)
            .rev()
            .map(|hour| {
                format!(
                    r#"{{"NOK_per_kWh":{}.5,"EUR_per_kWh":0.1,"EXR":11.5,"time_start":"2024-01-15T{hour:02}:00:00+01:00","time_end":"2024-01-15T{:02}:00:00+01:00"}}"#,
                    hour,
                    (hour + 1) % 24,
                )
            })
            .join(",");
        format!("[{entries}]")
    }

    #[test]
    fn test_url() -> Result {
        let api = Api::try_new(Region::Bergen)?;
        let on = NaiveDate::from_ymd_opt(2024, 3, 7).context("invalid date")?;
        assert_eq!(
            api.url(on),
            "https://www.hvakosterstrommen.no/api/v1/prices/2024/03-07_NO5.json",
        );
        Ok(())
    }

    #[test]
    fn test_to_hourly_sorts_entries() -> Result {
        let entries: Vec<Entry> = serde_json::from_str(&fixture(24))?;
        let rates = to_hourly(entries)?;
        assert_abs_diff_eq!(rates[0].0, 0.5);
        assert_abs_diff_eq!(rates[23].0, 23.5);
        Ok(())
    }

    #[test]
    fn test_to_hourly_rejects_daylight_saving_days() -> Result {
        let entries: Vec<Entry> = serde_json::from_str(&fixture(23))?;
        assert!(to_hourly(entries).is_err());
        Ok(())
    }

    #[test]
    fn test_negative_rate() -> Result {
        let entry: Entry = serde_json::from_str(
            r#"{"NOK_per_kWh":-0.01234,"time_start":"2024-06-01T13:00:00+02:00"}"#,
        )?;
        assert_abs_diff_eq!(entry.rate.0, -0.01234);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_get_rates_ok() -> Result {
        let today = Local::now().date_naive();
        let rates = Api::try_new(Region::Oslo)?.get_rates(today).await?;
        assert!(rates.iter().all(|rate| rate.0.is_finite()));
        Ok(())
    }
}
