//! [Greenerway](https://greenerway.no) energy management system client, only the live battery state.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_with::serde_as;

use crate::{
    api::{client, provider::StateOfChargeProvider},
    prelude::*,
    quantity::percentage::Percentage,
};

pub struct Api {
    client: Client,
    base_url: Url,
    site_id: String,
    username: String,
    password: String,
}

impl Api {
    pub fn try_new(
        base_url: Url,
        site_id: String,
        username: String,
        password: String,
    ) -> Result<Self> {
        Ok(Self { client: client::try_new()?, base_url, site_id, username, password })
    }

    fn url(&self) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .pop_if_empty()
            .extend(["api", "v1", "sites", &self.site_id, "measurements", "realtime"]);
        Ok(url)
    }
}

#[async_trait]
impl StateOfChargeProvider for Api {
    #[instrument(skip_all, fields(site_id = %self.site_id))]
    async fn get_state_of_charge(&self) -> Result<Percentage> {
        info!("fetching…");
        let measurements = self
            .client
            .get(self.url()?)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .context("failed to call")?
            .error_for_status()
            .context("request failed")?
            .json::<RealtimeMeasurements>()
            .await
            .context("failed to deserialize the response")?;
        measurements.state_of_charge()
    }
}

#[serde_as]
#[derive(Deserialize)]
struct RealtimeMeasurements {
    /// Some firmware versions report the value as a string.
    #[serde_as(as = "Option<serde_with::PickFirst<(_, serde_with::DisplayFromStr)>>")]
    #[serde(rename = "batterySoc")]
    battery_soc: Option<Percentage>,
}

impl RealtimeMeasurements {
    fn state_of_charge(&self) -> Result<Percentage> {
        let state_of_charge = self.battery_soc.context("the site reports no battery state")?;
        ensure!(
            (0.0..=100.0).contains(&state_of_charge.0),
            "state of charge is out of range: {state_of_charge}",
        );
        info!(%state_of_charge, "fetched");
        Ok(state_of_charge)
    }
}
