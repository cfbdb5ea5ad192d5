use std::collections::BTreeMap;

use bon::Builder;
use chrono::NaiveDate;
use itertools::Itertools;

use crate::{
    core::{
        battery::BatteryConfig,
        dispatch::{Dispatcher, ThresholdPolicy},
        schedule::DaySchedule,
        series::{Hourly, Series},
    },
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, power::Kilowatts, rate::KilowattHourRate},
};

/// Hourly grid rates on a given day.
pub trait PriceSource {
    /// Fails when the rates for the day are unavailable.
    fn hourly_rates(&mut self, on: NaiveDate) -> Result<Hourly<KilowattHourRate>>;
}

impl<F> PriceSource for F
where
    F: FnMut(NaiveDate) -> Result<Hourly<KilowattHourRate>>,
{
    fn hourly_rates(&mut self, on: NaiveDate) -> Result<Hourly<KilowattHourRate>> {
        self(on)
    }
}

/// Rates fetched beforehand, each day is handed out once.
#[must_use]
#[derive(Default)]
pub struct PriceBook(BTreeMap<NaiveDate, Result<Hourly<KilowattHourRate>>>);

impl PriceBook {
    pub fn insert(&mut self, on: NaiveDate, rates: Result<Hourly<KilowattHourRate>>) {
        self.0.insert(on, rates);
    }
}

impl FromIterator<(NaiveDate, Result<Hourly<KilowattHourRate>>)> for PriceBook {
    fn from_iter<T: IntoIterator<Item = (NaiveDate, Result<Hourly<KilowattHourRate>>)>>(
        iter: T,
    ) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl PriceSource for PriceBook {
    fn hourly_rates(&mut self, on: NaiveDate) -> Result<Hourly<KilowattHourRate>> {
        self.0.remove(&on).unwrap_or_else(|| Err(anyhow!("no rates fetched for {on}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedDay {
    pub date: NaiveDate,
    pub reason: String,
}

/// Outcome of a multi-day run.
#[must_use]
#[derive(Clone, Debug)]
pub struct RangeRun {
    /// Dispatched days in chronological order.
    pub schedules: Series<NaiveDate, DaySchedule>,

    pub skipped: Vec<SkippedDay>,
    pub total_arbitrage_savings: Cost,

    /// State-of-charge fraction carried into the next day.
    pub state_of_charge: f64,
}

impl RangeRun {
    const fn new(state_of_charge: f64) -> Self {
        Self {
            schedules: Vec::new(),
            skipped: Vec::new(),
            total_arbitrage_savings: Cost::ZERO,
            state_of_charge,
        }
    }

    pub fn total_peak_shaving_energy(&self) -> KilowattHours {
        self.schedules.iter().map(|(_, schedule)| schedule.peak_shaving_energy).sum()
    }
}

/// Dispatches consecutive days, carrying the state of charge from one day into the next.
#[derive(Builder)]
pub struct Driver<'a> {
    /// Consumption profile, the same for every day.
    consumption: &'a Hourly<KilowattHours>,

    threshold: Kilowatts,
    battery: &'a BatteryConfig,

    #[builder(default)]
    policy: ThresholdPolicy,
}

impl Driver<'_> {
    /// Dispatch the days in chronological order.
    ///
    /// A day without rates is skipped and leaves the carried state of charge untouched.
    #[instrument(skip_all)]
    pub fn run(
        &self,
        days: impl IntoIterator<Item = NaiveDate>,
        prices: &mut impl PriceSource,
        initial_state_of_charge: f64,
    ) -> RangeRun {
        let initial_state_of_charge = self.battery.clamp_state_of_charge(initial_state_of_charge);
        let days = days.into_iter().sorted().dedup();
        days.fold(RangeRun::new(initial_state_of_charge), |mut run, date| {
            let grid_rates = match prices.hourly_rates(date) {
                Ok(grid_rates) => grid_rates,
                Err(error) => {
                    warn!(%date, "skipping the day: {error:#}");
                    run.skipped.push(SkippedDay { date, reason: format!("{error:#}") });
                    return run;
                }
            };
            let schedule = Dispatcher::builder()
                .consumption(self.consumption)
                .grid_rates(&grid_rates)
                .threshold(self.threshold)
                .battery(self.battery)
                .policy(self.policy)
                .build()
                .dispatch(run.state_of_charge);
            info!(
                %date,
                arbitrage_savings = %schedule.arbitrage_savings,
                ending_state_of_charge = schedule.ending_state_of_charge,
                "dispatched",
            );
            run.total_arbitrage_savings += schedule.arbitrage_savings;
            run.state_of_charge = schedule.ending_state_of_charge;
            run.schedules.push((date, schedule));
            run
        })
    }
}

/// Every day from `since` through `until`, both inclusive.
pub fn date_range(since: NaiveDate, until: NaiveDate) -> Result<Vec<NaiveDate>> {
    ensure!(since <= until, "the range starts ({since}) after it ends ({until})");
    Ok(since.iter_days().take_while(|date| *date <= until).collect())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::Datelike;

    use super::*;

    fn battery() -> Result<BatteryConfig> {
        BatteryConfig::builder()
            .power_limit(Kilowatts::from(20.0))
            .capacity(KilowattHours::from(100.0))
            .efficiency(0.9)
            .build()
    }

    fn consumption() -> Hourly<KilowattHours> {
        Hourly::from_fn(|hour| KilowattHours::from(if (17..21).contains(&hour) { 30.0 } else { 10.0 }))
    }

    /// Rates rising through the day and, a little, from one day to the next.
    fn rates(on: NaiveDate) -> Hourly<KilowattHourRate> {
        let offset = f64::from(on.day());
        Hourly::from_fn(|hour| KilowattHourRate::from(0.5 + 0.01 * offset + 0.05 * hour as f64))
    }

    #[expect(clippy::unnecessary_wraps)]
    fn available(on: NaiveDate) -> Result<Hourly<KilowattHourRate>> {
        Ok(rates(on))
    }

    fn date(day: u32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 1, day).context("invalid date")
    }

    #[test]
    fn test_single_day_equals_direct_dispatch() -> Result {
        let (battery, consumption) = (battery()?, consumption());
        let on = date(15)?;
        let driver = Driver::builder()
            .consumption(&consumption)
            .threshold(Kilowatts::from(20.0))
            .battery(&battery)
            .build();
        let run = driver.run([on], &mut available, 0.6);

        let grid_rates = rates(on);
        let direct = Dispatcher::builder()
            .consumption(&consumption)
            .grid_rates(&grid_rates)
            .threshold(Kilowatts::from(20.0))
            .battery(&battery)
            .build()
            .dispatch(0.6);

        assert_eq!(run.schedules, vec![(on, direct.clone())]);
        assert_eq!(run.total_arbitrage_savings, direct.arbitrage_savings);
        assert_abs_diff_eq!(run.state_of_charge, direct.ending_state_of_charge);
        assert!(run.skipped.is_empty());
        Ok(())
    }

    #[test]
    fn test_carries_state_of_charge() -> Result {
        let (battery, consumption) = (battery()?, consumption());
        let driver = Driver::builder()
            .consumption(&consumption)
            .threshold(Kilowatts::from(20.0))
            .battery(&battery)
            .build();
        let run = driver.run([date(1)?, date(2)?], &mut available, 0.9);

        let grid_rates = rates(date(2)?);
        let second = Dispatcher::builder()
            .consumption(&consumption)
            .grid_rates(&grid_rates)
            .threshold(Kilowatts::from(20.0))
            .battery(&battery)
            .build()
            .dispatch(run.schedules[0].1.ending_state_of_charge);
        assert_eq!(run.schedules[1].1, second);
        assert_abs_diff_eq!(
            run.total_arbitrage_savings.0,
            run.schedules[0].1.arbitrage_savings.0 + second.arbitrage_savings.0,
        );
        Ok(())
    }

    #[test]
    fn test_skipped_day_keeps_state_of_charge() -> Result {
        let (battery, consumption) = (battery()?, consumption());
        let driver = Driver::builder()
            .consumption(&consumption)
            .threshold(Kilowatts::from(20.0))
            .battery(&battery)
            .build();
        let mut prices: PriceBook = [
            (date(1)?, Ok(rates(date(1)?))),
            (date(2)?, Err(anyhow!("expected 24 rates, got 23"))),
            (date(3)?, Ok(rates(date(3)?))),
        ]
        .into_iter()
        .collect();

        let run = driver.run([date(1)?, date(2)?, date(3)?], &mut prices, 0.5);

        assert_eq!(run.schedules.len(), 2);
        assert_eq!(
            run.skipped,
            [SkippedDay { date: date(2)?, reason: "expected 24 rates, got 23".to_string() }],
        );
        let skipped_on = date(2)?;
        assert!(run.schedules.iter().all(|(on, _)| *on != skipped_on));

        let grid_rates = rates(date(3)?);
        let third = Dispatcher::builder()
            .consumption(&consumption)
            .grid_rates(&grid_rates)
            .threshold(Kilowatts::from(20.0))
            .battery(&battery)
            .build()
            .dispatch(run.schedules[0].1.ending_state_of_charge);
        assert_eq!(run.schedules[1], (date(3)?, third));
        Ok(())
    }

    #[test]
    fn test_missing_day_in_price_book() -> Result {
        let (battery, consumption) = (battery()?, consumption());
        let driver = Driver::builder()
            .consumption(&consumption)
            .threshold(Kilowatts::from(20.0))
            .battery(&battery)
            .build();
        let run = driver.run([date(7)?], &mut PriceBook::default(), 0.5);
        assert!(run.schedules.is_empty());
        assert_eq!(run.skipped.len(), 1);
        assert_abs_diff_eq!(run.state_of_charge, 0.5);
        Ok(())
    }

    #[test]
    fn test_runs_chronologically() -> Result {
        let (battery, consumption) = (battery()?, consumption());
        let driver = Driver::builder()
            .consumption(&consumption)
            .threshold(Kilowatts::from(20.0))
            .battery(&battery)
            .build();
        let run = driver.run([date(3)?, date(1)?, date(2)?, date(1)?], &mut available, 0.5);
        let dates: Vec<NaiveDate> = run.schedules.iter().map(|(on, _)| *on).collect();
        assert_eq!(dates, [date(1)?, date(2)?, date(3)?]);
        Ok(())
    }

    #[test]
    fn test_date_range() -> Result {
        assert_eq!(date_range(date(30)?, date(30)?)?, [date(30)?]);
        assert_eq!(date_range(date(1)?, date(3)?)?.len(), 3);
        assert!(date_range(date(3)?, date(1)?).is_err());
        Ok(())
    }
}
