use std::iter::Sum;

use crate::prelude::*;

pub const N_HOURS: usize = 24;

pub type Point<K, V> = (K, V);
pub type Series<K, V> = Vec<Point<K, V>>;

/// One value per hour of a day, indexed by the hour `0..24`.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, derive_more::Index, derive_more::IndexMut)]
pub struct Hourly<T>(pub [T; N_HOURS]);

impl<T: Copy> Hourly<T> {
    pub const fn splat(value: T) -> Self {
        Self([value; N_HOURS])
    }

    pub fn from_fn(f: impl FnMut(usize) -> T) -> Self {
        Self(std::array::from_fn(f))
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.0.iter().copied()
    }

    /// Pair up each hour with its index.
    pub fn enumerate(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.iter().enumerate()
    }

    pub fn zip_with<R: Copy, O: Copy>(&self, rhs: &Hourly<R>, f: impl Fn(T, R) -> O) -> Hourly<O> {
        Hourly::from_fn(|hour| f(self.0[hour], rhs.0[hour]))
    }

    pub fn total(&self) -> T
    where
        T: Sum,
    {
        self.iter().sum()
    }
}

impl<T: Copy + PartialOrd> Hourly<T> {
    /// Peak value and the first hour it is reached.
    pub fn peak(&self) -> (usize, T) {
        self.enumerate().fold((0, self.0[0]), |(peak_hour, peak), (hour, value)| {
            if value > peak { (hour, value) } else { (peak_hour, peak) }
        })
    }
}

impl<T> TryFrom<Vec<T>> for Hourly<T> {
    type Error = Error;

    fn try_from(values: Vec<T>) -> Result<Self> {
        let len = values.len();
        let values: [T; N_HOURS] = values
            .try_into()
            .map_err(|_| anyhow!("expected exactly {N_HOURS} hourly values, got {len}"))?;
        Ok(Self(values))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_try_from_ok() -> Result {
        let series = Hourly::try_from((0..24).collect_vec())?;
        assert_eq!(series[23], 23);
        Ok(())
    }

    #[test]
    fn test_try_from_wrong_length() {
        let error = Hourly::try_from(vec![1.0; 23]).unwrap_err();
        assert_eq!(error.to_string(), "expected exactly 24 hourly values, got 23");
        assert!(Hourly::try_from(vec![1.0; 25]).is_err());
    }

    #[test]
    fn test_peak_takes_first_maximum() {
        let mut series = Hourly::splat(1);
        series[5] = 7;
        series[9] = 7;
        assert_eq!(series.peak(), (5, 7));
    }

    #[test]
    fn test_total() {
        assert_eq!(Hourly::from_fn(|hour| hour * 2).total(), 552);
    }
}
