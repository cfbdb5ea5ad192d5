use clap::Parser;
use reqwest::Url;

use crate::{
    api::{greenerway, provider::StateOfChargeProvider},
    core::{battery::BatteryConfig, soc::InitialStateOfCharge},
    prelude::*,
    quantity::percentage::Percentage,
};

#[derive(Parser)]
pub struct StateOfChargeArgs {
    /// Site to read the live state of charge from.
    #[clap(long = "site-id", env = "SITE_ID")]
    pub site_id: Option<String>,

    #[clap(long = "soc-api-username", env = "SOC_API_USERNAME")]
    pub username: Option<String>,

    #[clap(long = "soc-api-password", env = "SOC_API_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[clap(
        long = "soc-api-base-url",
        env = "SOC_API_BASE_URL",
        default_value = "https://ems.greenerway.services"
    )]
    pub base_url: Url,

    /// Starting state of charge when there is no site to measure it.
    #[clap(long = "initial-soc-percent", env = "INITIAL_SOC_PERCENT", conflicts_with = "site_id")]
    pub initial_state_of_charge: Option<Percentage>,
}

impl StateOfChargeArgs {
    /// Starting state of charge: measured, then manual, then the maximum allowed one.
    pub async fn resolve(&self, battery: &BatteryConfig) -> InitialStateOfCharge {
        let measured = match &self.site_id {
            Some(site_id) => Some(self.measure(site_id).await),
            None => None,
        };
        let initial =
            InitialStateOfCharge::resolve(measured, self.initial_state_of_charge, battery);
        info!(%initial, "starting state of charge");
        initial
    }

    async fn measure(&self, site_id: &str) -> Result<Percentage> {
        let username = self.username.clone().context("the API username is not set")?;
        let password = self.password.clone().context("the API password is not set")?;
        greenerway::Api::try_new(self.base_url.clone(), site_id.to_string(), username, password)?
            .get_state_of_charge()
            .await
    }
}
