//! Year × month grid of monthly averages for long-range pattern display.

use crate::types::raw_series::{is_missing, DailySeries, RawSeries};
use crate::types::variable::ClimateVariable;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

const MONTHS: usize = 12;
/// Distance below the smallest monthly average at which filler cells are drawn.
const FILLER_OFFSET: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapGrid {
    /// Heatmap key of the variable, e.g. `rainFall`.
    pub variable: String,
    /// One row of 12 monthly values per year, January first.
    pub grid: Vec<Vec<f64>>,
    pub year_labels: Vec<String>,
    /// `false` where the cell holds the filler instead of an observed average.
    pub observed: Vec<Vec<bool>>,
    /// Value written into unobserved cells: the smallest monthly average minus 0.5.
    pub filler: Option<f64>,
}

impl HeatmapGrid {
    /// Builds the grid for one variable of a raw store.
    pub fn build(raw: &RawSeries, variable: ClimateVariable) -> Self {
        let mut grid = Self::from_series(raw.series(variable));
        grid.variable = variable.heatmap_key().to_string();
        grid
    }

    /// Walks `series` chronologically, flushing a monthly mean whenever the month
    /// changes and a year row whenever the year changes.
    ///
    /// Missing values add 0 to the running sum but still count towards the
    /// month's day count, which pulls sparse months towards zero.
    pub fn from_series(series: &DailySeries) -> Self {
        let mut rows: Vec<(i32, [Option<f64>; MONTHS])> = Vec::new();
        let mut current: Option<(i32, [Option<f64>; MONTHS])> = None;
        let mut bucket: Option<MonthBucket> = None;

        for (key, value) in series.iter() {
            let (year, month) = (key.year(), key.month());

            if let Some(open) = bucket.as_ref() {
                if open.year != year || open.month != month {
                    if let Some(done) = bucket.take() {
                        done.flush_into(&mut current);
                    }
                }
            }

            if current.as_ref().is_some_and(|(row_year, _)| *row_year != year) {
                if let Some(row) = current.take() {
                    let last_year = row.0;
                    rows.push(row);
                    // a year without a single key still gets its (filler) row
                    rows.extend((last_year + 1..year).map(|gap| (gap, [None; MONTHS])));
                }
            }
            current.get_or_insert((year, [None; MONTHS]));

            let open_bucket = bucket.get_or_insert(MonthBucket::new(year, month));
            open_bucket.add(if is_missing(value) { 0.0 } else { value });
        }

        if let Some(done) = bucket.take() {
            done.flush_into(&mut current);
        }
        if let Some(row) = current.take() {
            rows.push(row);
        }

        Self::finish(rows)
    }

    fn finish(rows: Vec<(i32, [Option<f64>; MONTHS])>) -> Self {
        let filler = rows
            .iter()
            .flat_map(|(_, months)| months.iter().flatten().copied())
            .map(OrderedFloat)
            .min()
            .map(|min| min.into_inner() - FILLER_OFFSET);

        let Some(filler_value) = filler else {
            return Self::default();
        };

        Self {
            variable: String::new(),
            grid: rows
                .iter()
                .map(|(_, months)| months.iter().map(|m| m.unwrap_or(filler_value)).collect())
                .collect(),
            year_labels: rows.iter().map(|(year, _)| year.to_string()).collect(),
            observed: rows
                .iter()
                .map(|(_, months)| months.iter().map(Option::is_some).collect())
                .collect(),
            filler,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Observed monthly average, `None` for filler cells. `month` is 0-based.
    pub fn value(&self, row: usize, month: usize) -> Option<f64> {
        if !*self.observed.get(row)?.get(month)? {
            return None;
        }
        self.grid.get(row)?.get(month).copied()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.year_labels.first()?.parse().ok()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.year_labels.last()?.parse().ok()
    }
}

struct MonthBucket {
    year: i32,
    month: u32,
    sum: f64,
    count: usize,
}

impl MonthBucket {
    fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            sum: 0.0,
            count: 0,
        }
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn flush_into(self, row: &mut Option<(i32, [Option<f64>; MONTHS])>) {
        if self.count == 0 {
            return;
        }
        let (_, months) = row.get_or_insert((self.year, [None; MONTHS]));
        months[self.month as usize - 1] = Some(self.sum / self.count as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::date_key::DateKey;
    use chrono::{Datelike, Duration, NaiveDate};

    fn daily(from: (i32, u32, u32), days: i64, value: impl Fn(NaiveDate) -> f64) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(from.0, from.1, from.2).unwrap();
        (0..days)
            .map(|i| start + Duration::days(i))
            .map(|d| (DateKey::new(d), value(d)))
            .collect()
    }

    #[test]
    fn averages_each_month() {
        let series = daily((2000, 1, 1), 366, |d| d.month() as f64);
        let heatmap = HeatmapGrid::from_series(&series);
        assert_eq!(heatmap.year_labels, vec!["2000"]);
        assert_eq!(
            heatmap.grid[0],
            (1..=12).map(f64::from).collect::<Vec<_>>()
        );
        assert_eq!(heatmap.filler, Some(0.5));
    }

    #[test]
    fn short_trailing_year_is_padded_below_the_minimum() {
        // 2001 only has January and February
        let series = daily((2000, 1, 1), 366 + 59, |_| 4.0);
        let heatmap = HeatmapGrid::from_series(&series);
        assert_eq!(heatmap.grid.len(), 2);
        assert!(heatmap.grid.iter().all(|row| row.len() == 12));
        assert_eq!(heatmap.grid[1][2], 3.5);
        assert_eq!(heatmap.value(1, 1), Some(4.0));
        assert_eq!(heatmap.value(1, 2), None);
        assert!(!heatmap.observed[1][11]);
    }

    #[test]
    fn missing_values_count_as_zero() {
        let mut series = daily((2000, 1, 1), 4, |_| 8.0);
        series.insert(DateKey::from_ymd(2000, 1, 2).unwrap(), -999.0);
        let heatmap = HeatmapGrid::from_series(&series);
        assert_eq!(heatmap.value(0, 0), Some(6.0));
    }

    #[test]
    fn row_count_spans_first_to_last_year() {
        let mut series = daily((1981, 1, 1), 31, |_| 1.0);
        series.insert(DateKey::from_ymd(1984, 5, 1).unwrap(), 2.0);
        let heatmap = HeatmapGrid::from_series(&series);
        assert_eq!(heatmap.year_labels, vec!["1981", "1982", "1983", "1984"]);
        assert_eq!(heatmap.grid.len(), 4);
        assert_eq!(heatmap.value(1, 0), None);
        assert_eq!(heatmap.value(3, 4), Some(2.0));
        assert_eq!(heatmap.first_year(), Some(1981));
        assert_eq!(heatmap.last_year(), Some(1984));
    }

    #[test]
    fn absent_variable_gives_empty_grid() {
        let heatmap = HeatmapGrid::build(&RawSeries::default(), ClimateVariable::SnowDepth);
        assert!(heatmap.is_empty());
        assert!(heatmap.year_labels.is_empty());
        assert_eq!(heatmap.filler, None);
    }

    #[test]
    fn mask_larger_than_grid_reads_as_missing() {
        let heatmap = HeatmapGrid {
            variable: "rainFall".to_string(),
            grid: vec![vec![1.0; 3]],
            year_labels: vec!["2000".to_string(), "2001".to_string()],
            observed: vec![vec![true; 12], vec![true; 12]],
            filler: Some(0.5),
        };
        assert_eq!(heatmap.value(0, 2), Some(1.0));
        assert_eq!(heatmap.value(0, 3), None);
        assert_eq!(heatmap.value(1, 0), None);
    }

    #[test]
    fn repeated_builds_are_identical() {
        let series = daily((1990, 3, 10), 800, |d| (d.ordinal() % 17) as f64 * 0.37);
        assert_eq!(HeatmapGrid::from_series(&series), HeatmapGrid::from_series(&series));
    }
}
