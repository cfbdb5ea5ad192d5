use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    core::{driver::PriceBook, series::Hourly},
    prelude::*,
    quantity::{percentage::Percentage, rate::KilowattHourRate},
};

#[async_trait]
pub trait PriceProvider: Sync {
    /// Fetch the rates of every day, keeping the failures for the caller to report.
    #[instrument(skip_all)]
    async fn prefetch(&self, days: &[NaiveDate]) -> PriceBook {
        let mut book = PriceBook::default();
        for &on in days {
            book.insert(on, self.get_rates(on).await);
        }
        info!(n_days = days.len(), "fetched energy rates");
        book
    }

    /// Get all 24 hourly rates on the specified day.
    async fn get_rates(&self, on: NaiveDate) -> Result<Hourly<KilowattHourRate>>;
}

#[async_trait]
pub trait StateOfChargeProvider: Sync {
    async fn get_state_of_charge(&self) -> Result<Percentage>;
}
