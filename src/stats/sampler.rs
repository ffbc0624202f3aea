//! Date-window sampling: reduces each historical year to one value per variable,
//! averaged over a short day window around the target month-day.

use crate::config::ClimateConfig;
use crate::types::date_key::DateKey;
use crate::types::per_variable::PerVariable;
use crate::types::period::MonthDay;
use crate::types::raw_series::{DailySeries, RawSeries};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// One scalar per year for a single variable.
///
/// A year is present only if at least one non-missing daily value was found
/// in its window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearlyAggregate(BTreeMap<i32, f64>);

impl YearlyAggregate {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, year: i32, value: f64) -> Option<f64> {
        self.0.insert(year, value)
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.0.get(&year).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(year, value)` pairs in ascending year order.
    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.0.iter().map(|(y, v)| (*y, *v))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied()
    }
}

impl FromIterator<(i32, f64)> for YearlyAggregate {
    fn from_iter<I: IntoIterator<Item = (i32, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Samples a fixed day window around a target month-day in every historical year.
#[derive(Debug, Clone)]
pub struct DateWindowSampler {
    years: RangeInclusive<i32>,
    offsets: RangeInclusive<i64>,
}

impl DateWindowSampler {
    pub fn new(years: RangeInclusive<i32>, offsets: RangeInclusive<i64>) -> Self {
        Self { years, offsets }
    }

    pub fn from_config(config: &ClimateConfig) -> Self {
        Self::new(config.years(), config.window_offsets())
    }

    /// Window keys for `target` in `year`. Offsets use calendar arithmetic, so a
    /// Dec 30 window runs into the next January.
    pub fn window_keys(&self, target: MonthDay, year: i32) -> Vec<DateKey> {
        let Some(anchor) = target.in_year(year) else {
            return Vec::new();
        };
        self.offsets
            .clone()
            .filter_map(|offset| anchor.checked_add_signed(Duration::days(offset)))
            .map(DateKey::new)
            .collect()
    }

    /// Yearly means of the window samples for one variable's series.
    pub fn sample_series(&self, series: &DailySeries, target: MonthDay) -> YearlyAggregate {
        self.years
            .clone()
            .filter_map(|year| {
                let (sum, count) = self
                    .window_keys(target, year)
                    .into_iter()
                    .filter_map(|key| series.observed(key))
                    .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
                (count > 0).then(|| (year, sum / count as f64))
            })
            .collect()
    }

    /// Yearly aggregates for every variable.
    pub fn sample(&self, raw: &RawSeries, target: MonthDay) -> PerVariable<YearlyAggregate> {
        raw.per_variable()
            .map(|_, series| self.sample_series(series, target))
    }
}

impl Default for DateWindowSampler {
    fn default() -> Self {
        Self::from_config(&ClimateConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::variable::ClimateVariable;

    fn series(entries: &[((i32, u32, u32), f64)]) -> DailySeries {
        entries
            .iter()
            .map(|&((y, m, d), v)| (DateKey::from_ymd(y, m, d).unwrap(), v))
            .collect()
    }

    #[test]
    fn window_spans_minus_two_to_plus_four() {
        let sampler = DateWindowSampler::default();
        let keys: Vec<String> = sampler
            .window_keys(MonthDay::new(6, 15).unwrap(), 2000)
            .iter()
            .map(|k| k.to_string())
            .collect();
        assert_eq!(
            keys,
            vec!["20000613", "20000614", "20000615", "20000616", "20000617", "20000618", "20000619"]
        );
    }

    #[test]
    fn window_rolls_over_year_end() {
        let sampler = DateWindowSampler::default();
        let keys = sampler.window_keys(MonthDay::new(12, 30).unwrap(), 1999);
        assert_eq!(keys.first().unwrap().to_string(), "19991228");
        assert_eq!(keys.last().unwrap().to_string(), "20000103");
    }

    #[test]
    fn january_days_count_towards_the_previous_year() {
        let sampler = DateWindowSampler::new(1999..=2000, -2..=4);
        let data = series(&[((1999, 12, 28), 4.0), ((2000, 1, 3), 8.0)]);
        let yearly = sampler.sample_series(&data, MonthDay::new(12, 30).unwrap());
        assert_eq!(yearly.get(1999), Some(6.0));
        assert_eq!(yearly.get(2000), None);
        assert_eq!(yearly.len(), 1);
    }

    #[test]
    fn averages_retained_samples_and_skips_sentinels() {
        let sampler = DateWindowSampler::new(2000..=2001, -2..=4);
        let data = series(&[
            ((2000, 6, 14), 10.0),
            ((2000, 6, 15), -999.0),
            ((2000, 6, 16), 20.0),
            ((2001, 6, 15), -999.0),
        ]);
        let yearly = sampler.sample_series(&data, MonthDay::new(6, 15).unwrap());
        assert_eq!(yearly.get(2000), Some(15.0));
        // only sentinel values in 2001's window
        assert_eq!(yearly.get(2001), None);
        assert_eq!(yearly.len(), 1);
    }

    #[test]
    fn years_outside_range_are_ignored() {
        let sampler = DateWindowSampler::new(1981..=1982, -2..=4);
        let data = series(&[((1980, 3, 1), 1.0), ((1981, 3, 1), 2.0), ((1983, 3, 1), 3.0)]);
        let yearly = sampler.sample_series(&data, MonthDay::new(3, 1).unwrap());
        assert_eq!(yearly.points().collect::<Vec<_>>(), vec![(1981, 2.0)]);
    }

    #[test]
    fn missing_variable_yields_empty_aggregate() {
        let sampler = DateWindowSampler::default();
        let yearly = sampler.sample(&RawSeries::default(), MonthDay::new(1, 1).unwrap());
        assert!(yearly.get(ClimateVariable::Snowfall).is_empty());
    }
}
