//! Date-specific historical statistics: every raw daily value that falls on the
//! target month-day, in any year, contributes individually.

use crate::types::per_variable::PerVariable;
use crate::types::period::MonthDay;
use crate::types::raw_series::{DailySeries, RawSeries};
use crate::types::variable::ClimateVariable;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Precipitation above this (mm/day) counts as a rain day.
pub const RAIN_THRESHOLD: f64 = 0.1;
pub const HEAVY_RAIN_THRESHOLD: f64 = 10.0;
pub const EXTREME_RAIN_THRESHOLD: f64 = 25.0;
/// Half-width, in days, of the same-month window used for the weekly rain probability.
pub const WEEKLY_WINDOW_DAYS: u32 = 3;

const PERCENT: &str = "%";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateStatistic {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub years_of_data: usize,
    pub unit: String,
}

/// Probability metrics derived from precipitation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerivedMetric {
    RainProbabilityToday,
    HeavyRainProbabilityToday,
    ExtremeRainProbabilityToday,
    DryDayProbabilityToday,
    WeeklyRainProbability,
}

impl DerivedMetric {
    pub const ALL: [DerivedMetric; 5] = [
        DerivedMetric::RainProbabilityToday,
        DerivedMetric::HeavyRainProbabilityToday,
        DerivedMetric::ExtremeRainProbabilityToday,
        DerivedMetric::DryDayProbabilityToday,
        DerivedMetric::WeeklyRainProbability,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DerivedMetric::RainProbabilityToday => "RAIN_PROBABILITY_TODAY",
            DerivedMetric::HeavyRainProbabilityToday => "HEAVY_RAIN_PROBABILITY_TODAY",
            DerivedMetric::ExtremeRainProbabilityToday => "EXTREME_RAIN_PROBABILITY_TODAY",
            DerivedMetric::DryDayProbabilityToday => "DRY_DAY_PROBABILITY_TODAY",
            DerivedMetric::WeeklyRainProbability => "WEEKLY_RAIN_PROBABILITY",
        }
    }
}

impl fmt::Display for DerivedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-variable statistics for one target month-day, plus the derived rain metrics.
///
/// A variable or metric without a single matching value is `None` / absent,
/// which renderers show as "no data".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateSpecificAverages {
    pub variables: PerVariable<Option<DateStatistic>>,
    pub derived: BTreeMap<DerivedMetric, DateStatistic>,
}

impl DateSpecificAverages {
    /// Builds the statistics for `target` across every year of `raw`.
    pub fn build(raw: &RawSeries, target: MonthDay) -> Self {
        let variables = raw
            .per_variable()
            .map(|variable, series| variable_statistic(variable, series, target));
        let derived = derived_metrics(raw.series(ClimateVariable::Precipitation), target);
        Self { variables, derived }
    }

    pub fn variable(&self, variable: ClimateVariable) -> Option<&DateStatistic> {
        self.variables.get(variable).as_ref()
    }

    pub fn derived(&self, metric: DerivedMetric) -> Option<&DateStatistic> {
        self.derived.get(&metric)
    }
}

fn variable_statistic(
    variable: ClimateVariable,
    series: &DailySeries,
    target: MonthDay,
) -> Option<DateStatistic> {
    let matched: Vec<(i32, f64)> = series
        .iter_observed()
        .filter(|(key, _)| key.month_day() == target)
        .map(|(key, value)| (key.year(), value))
        .collect();
    if matched.is_empty() {
        return None;
    }

    let values = || matched.iter().map(|(_, v)| OrderedFloat(*v));
    let min = values().min()?.into_inner();
    let max = values().max()?.into_inner();
    let average = matched.iter().map(|(_, v)| v).sum::<f64>() / matched.len() as f64;
    let years: BTreeSet<i32> = matched.iter().map(|(y, _)| *y).collect();

    Some(DateStatistic {
        average,
        min,
        max,
        count: matched.len(),
        years_of_data: years.len(),
        unit: variable.unit().to_string(),
    })
}

fn derived_metrics(
    precipitation: &DailySeries,
    target: MonthDay,
) -> BTreeMap<DerivedMetric, DateStatistic> {
    let mut derived = BTreeMap::new();

    let today: Vec<(i32, f64)> = precipitation
        .iter_observed()
        .filter(|(key, _)| key.month_day() == target)
        .map(|(key, value)| (key.year(), value))
        .collect();

    if !today.is_empty() {
        let years = distinct_years(&today);
        let share = |threshold: f64| percentage(&today, |v| v > threshold);
        let rain = share(RAIN_THRESHOLD);

        let metric = |value: f64| probability_statistic(value, today.len(), years);
        derived.insert(DerivedMetric::RainProbabilityToday, metric(rain));
        derived.insert(
            DerivedMetric::HeavyRainProbabilityToday,
            metric(share(HEAVY_RAIN_THRESHOLD)),
        );
        derived.insert(
            DerivedMetric::ExtremeRainProbabilityToday,
            metric(share(EXTREME_RAIN_THRESHOLD)),
        );
        // Complement of the rounded rain share: the two partitions always sum to 100.
        derived.insert(
            DerivedMetric::DryDayProbabilityToday,
            metric(round_to_tenth(100.0 - rain)),
        );
    }

    // Same month only: windows near the 1st or the month end are shorter.
    let week: Vec<(i32, f64)> = precipitation
        .iter_observed()
        .filter(|(key, _)| {
            key.month() == target.month() && key.day().abs_diff(target.day()) <= WEEKLY_WINDOW_DAYS
        })
        .map(|(key, value)| (key.year(), value))
        .collect();

    if !week.is_empty() {
        let weekly = percentage(&week, |v| v > RAIN_THRESHOLD);
        derived.insert(
            DerivedMetric::WeeklyRainProbability,
            probability_statistic(weekly, week.len(), distinct_years(&week)),
        );
    }

    derived
}

fn distinct_years(values: &[(i32, f64)]) -> usize {
    values.iter().map(|(y, _)| *y).collect::<BTreeSet<_>>().len()
}

/// Share of `values` matching `predicate`, in percent rounded to one decimal.
fn percentage(values: &[(i32, f64)], predicate: impl Fn(f64) -> bool) -> f64 {
    let hits = values.iter().filter(|(_, v)| predicate(*v)).count();
    round_to_tenth(100.0 * hits as f64 / values.len() as f64)
}

fn probability_statistic(value: f64, count: usize, years_of_data: usize) -> DateStatistic {
    DateStatistic {
        average: value,
        min: value,
        max: value,
        count,
        years_of_data,
        unit: PERCENT.to_string(),
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
