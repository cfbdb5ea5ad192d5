use clap::Parser;

use crate::{
    api::hvakosterstrommen::{Api, Region},
    prelude::*,
};

#[derive(Parser)]
pub struct PriceArgs {
    /// Spot price area.
    #[clap(long = "region", env = "PRICE_REGION", default_value = "NO1")]
    pub region: Region,
}

impl PriceArgs {
    pub fn provider(&self) -> Result<Api> {
        Api::try_new(self.region)
    }
}
