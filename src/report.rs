//! Assembles the per-variable cards consumed by the rendering layer.

use crate::config::ClimateConfig;
use crate::stats::aggregate::{DateSpecificAverages, DateStatistic, DerivedMetric};
use crate::stats::distribution::{ConfidenceBands, Distribution};
use crate::stats::heatmap::HeatmapGrid;
use crate::stats::sampler::{DateWindowSampler, YearlyAggregate};
use crate::stats::trend::Trend;
use crate::types::location::Location;
use crate::types::per_variable::PerVariable;
use crate::types::period::MonthDay;
use crate::types::raw_series::RawSeries;
use crate::types::variable::ClimateVariable;
use chrono::{Datelike, DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

/// The historical store for one location, as fetched.
///
/// Passed explicitly to everything that needs climate data; a new location
/// produces a new snapshot rather than mutating this one.
#[derive(Debug, Clone)]
pub struct ClimateSnapshot {
    pub location: Location,
    pub raw: Arc<RawSeries>,
    pub fetched_at: DateTime<Utc>,
}

impl ClimateSnapshot {
    pub fn new(location: Location, raw: Arc<RawSeries>) -> Self {
        Self {
            location,
            raw,
            fetched_at: Utc::now(),
        }
    }

    pub fn heatmap(&self, variable: ClimateVariable) -> HeatmapGrid {
        HeatmapGrid::build(&self.raw, variable)
    }
}

/// Everything one card needs to render a variable for the target date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCard {
    pub variable: ClimateVariable,
    pub unit: &'static str,
    /// Direct historical statistics for the exact month-day.
    pub date_average: Option<DateStatistic>,
    /// Windowed yearly values the trend was fitted on.
    pub trend_series: YearlyAggregate,
    pub trend: Trend,
    /// Trend extrapolated to the target year.
    pub predicted_value: Option<f64>,
    pub distribution: Distribution,
    pub bands_around_average: Option<ConfidenceBands>,
    pub bands_around_prediction: Option<ConfidenceBands>,
}

impl VariableCard {
    fn build(
        variable: ClimateVariable,
        yearly: YearlyAggregate,
        date_average: Option<DateStatistic>,
        target_year: i32,
    ) -> Self {
        let trend = Trend::fit(&yearly);
        let distribution = Distribution::estimate(&yearly);
        let predicted_value = trend.predict(target_year);
        let bounding = variable.bounding();

        Self {
            variable,
            unit: variable.unit(),
            bands_around_average: date_average
                .as_ref()
                .and_then(|stat| distribution.bands(stat.average, bounding)),
            bands_around_prediction: predicted_value
                .and_then(|center| distribution.bands(center, bounding)),
            date_average,
            trend_series: yearly,
            trend,
            predicted_value,
            distribution,
        }
    }

    /// `true` when neither a historical average nor a yearly series exists.
    pub fn has_no_data(&self) -> bool {
        self.date_average.is_none() && self.trend_series.is_empty()
    }
}

/// All cards for one location and target date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateReport {
    pub location: Location,
    pub target_date: NaiveDate,
    pub cards: PerVariable<VariableCard>,
    pub date_averages: DateSpecificAverages,
    #[serde(skip)]
    raw: Arc<RawSeries>,
}

impl ClimateReport {
    pub fn build(snapshot: &ClimateSnapshot, target_date: NaiveDate, config: &ClimateConfig) -> Self {
        Self::from_raw(&snapshot.location, Arc::clone(&snapshot.raw), target_date, config)
    }

    pub fn from_raw(
        location: &Location,
        raw: Arc<RawSeries>,
        target_date: NaiveDate,
        config: &ClimateConfig,
    ) -> Self {
        let target = MonthDay::of(target_date);
        let yearly = DateWindowSampler::from_config(config).sample(&raw, target);
        let date_averages = DateSpecificAverages::build(&raw, target);

        let cards = PerVariable::from_fn(|variable| {
            VariableCard::build(
                variable,
                yearly.get(variable).clone(),
                date_averages.variable(variable).cloned(),
                target_date.year(),
            )
        });

        Self {
            location: location.clone(),
            target_date,
            cards,
            date_averages,
            raw,
        }
    }

    /// Year × month grid for `variable`, built from the same snapshot as the cards.
    pub fn heatmap(&self, variable: ClimateVariable) -> HeatmapGrid {
        HeatmapGrid::build(&self.raw, variable)
    }

    pub fn card(&self, variable: ClimateVariable) -> &VariableCard {
        self.cards.get(variable)
    }

    pub fn derived(&self, metric: DerivedMetric) -> Option<&DateStatistic> {
        self.date_averages.derived(metric)
    }

    /// `true` when the snapshot held nothing usable for this date.
    pub fn is_empty(&self) -> bool {
        self.cards.iter().all(|(_, card)| card.has_no_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::date_key::DateKey;

    fn location() -> Location {
        Location::new("De Bilt", 52.1015, 5.1779)
    }

    fn warming_store() -> Arc<RawSeries> {
        let mut raw = RawSeries::default();
        for year in 1981..=2024 {
            let warming = f64::from(year - 1981) * 0.05;
            for day in 10..=20 {
                let key = DateKey::from_ymd(year, 6, day).unwrap();
                raw.series_mut(ClimateVariable::TemperatureMean)
                    .insert(key, 15.0 + warming);
                raw.series_mut(ClimateVariable::Precipitation)
                    .insert(key, if year % 4 == 0 { 12.0 } else { 0.0 });
            }
        }
        Arc::new(raw)
    }

    #[test]
    fn builds_cards_for_every_variable() {
        let raw = warming_store();
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let report = ClimateReport::from_raw(&location(), Arc::clone(&raw), date, &ClimateConfig::default());

        let temperature = report.card(ClimateVariable::TemperatureMean);
        assert_eq!(temperature.trend_series.len(), 44);
        let Trend::Available { slope, .. } = temperature.trend else {
            panic!("expected a trend");
        };
        assert!((slope - 0.05).abs() < 1e-9);
        let predicted = temperature.predicted_value.unwrap();
        assert!((predicted - (15.0 + 44.0 * 0.05)).abs() < 1e-6);
        assert!(temperature.bands_around_average.is_some());
        assert!(temperature.bands_around_prediction.is_some());

        let snow = report.card(ClimateVariable::SnowDepth);
        assert!(snow.has_no_data());
        assert_eq!(snow.trend, Trend::Unavailable);
        assert_eq!(snow.distribution, Distribution::Unavailable);
        assert!(snow.bands_around_prediction.is_none());
        assert!(!report.is_empty());
    }

    #[test]
    fn precipitation_bands_never_go_negative() {
        let raw = warming_store();
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let report = ClimateReport::from_raw(&location(), Arc::clone(&raw), date, &ClimateConfig::default());

        let rain = report.card(ClimateVariable::Precipitation);
        let bands = rain.bands_around_average.unwrap();
        assert!(bands.three_std[0] >= 0);
        assert_eq!(
            report
                .derived(DerivedMetric::RainProbabilityToday)
                .map(|s| s.count),
            Some(44)
        );
    }

    #[test]
    fn empty_store_produces_an_empty_report() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let report = ClimateReport::from_raw(
            &location(),
            Arc::default(),
            date,
            &ClimateConfig::default(),
        );
        assert!(report.is_empty());
        assert!(report.date_averages.derived.is_empty());
        assert!(report.heatmap(ClimateVariable::Precipitation).is_empty());
    }

    #[test]
    fn heatmap_comes_from_the_report_snapshot() {
        let snapshot = ClimateSnapshot::new(location(), warming_store());
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let report = ClimateReport::build(&snapshot, date, &ClimateConfig::default());
        let grid = report.heatmap(ClimateVariable::TemperatureMean);
        assert_eq!(grid, snapshot.heatmap(ClimateVariable::TemperatureMean));
        assert_eq!(grid.grid.len(), 44);
        assert_eq!(grid.variable, "avgTemp");
        assert_eq!(grid.value(0, 0), None);
        assert_eq!(grid.value(0, 5), Some(15.0));
    }

    #[test]
    fn repeated_builds_are_identical() {
        let raw = warming_store();
        let date = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let config = ClimateConfig::default();
        assert_eq!(
            ClimateReport::from_raw(&location(), Arc::clone(&raw), date, &config),
            ClimateReport::from_raw(&location(), Arc::clone(&raw), date, &config)
        );
    }

    #[test]
    fn report_serializes_for_renderers() -> Result<(), serde_json::Error> {
        let raw = warming_store();
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let report = ClimateReport::from_raw(&location(), Arc::clone(&raw), date, &ClimateConfig::default());
        let json = serde_json::to_value(&report)?;
        assert_eq!(json["cards"]["temperatureMean"]["trend"]["status"], "available");
        assert_eq!(json["cards"]["snowDepth"]["trend"]["status"], "unavailable");
        assert_eq!(json["cards"]["humidity"]["unit"], "%");
        Ok(())
    }
}
