//! Ordinary least-squares trend over a yearly aggregate.
//!
//! The fitted line is the only forward-looking mechanism in the crate: a
//! prediction for year `Y` is `slope * Y + intercept`, a naive linear
//! extrapolation with no seasonal or autoregressive component.

use crate::stats::sampler::YearlyAggregate;
use serde::{Deserialize, Serialize};

/// Result of fitting a line through `(year, value)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Trend {
    Available { slope: f64, intercept: f64 },
    /// Fewer than two years, or all points share one year.
    Unavailable,
}

impl Trend {
    /// Fits `value = slope * year + intercept` with the standard OLS sums.
    ///
    /// # Examples
    ///
    /// ```
    /// use climatelens::{Trend, YearlyAggregate};
    ///
    /// let yearly: YearlyAggregate = [(2020, 10.0), (2021, 12.0), (2022, 14.0)].into_iter().collect();
    /// let trend = Trend::fit(&yearly);
    /// assert_eq!(trend, Trend::Available { slope: 2.0, intercept: -4030.0 });
    /// assert_eq!(trend.predict(2025), Some(20.0));
    /// ```
    pub fn fit(yearly: &YearlyAggregate) -> Trend {
        Self::fit_points(yearly.points().map(|(y, v)| (f64::from(y), v)))
    }

    pub fn fit_points(points: impl IntoIterator<Item = (f64, f64)>) -> Trend {
        let points: Vec<(f64, f64)> = points.into_iter().collect();
        if points.len() < 2 {
            return Trend::Unavailable;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (covariance, variance) =
            points
                .iter()
                .fold((0.0, 0.0), |(cov, var), (x, y)| {
                    let dx = x - mean_x;
                    (cov + dx * (y - mean_y), var + dx * dx)
                });
        if variance == 0.0 {
            return Trend::Unavailable;
        }

        let slope = covariance / variance;
        let intercept = mean_y - slope * mean_x;
        if !slope.is_finite() || !intercept.is_finite() {
            return Trend::Unavailable;
        }
        Trend::Available { slope, intercept }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Trend::Available { .. })
    }

    pub fn predict(&self, year: i32) -> Option<f64> {
        match *self {
            Trend::Available { slope, intercept } => Some(slope * f64::from(year) + intercept),
            Trend::Unavailable => None,
        }
    }

    /// The `(slope, intercept)` pair with `(0, 0)` standing in for "no trend",
    /// for renderers that suppress the chart on an all-zero pair.
    pub fn as_legacy_pair(&self) -> (f64, f64) {
        match *self {
            Trend::Available { slope, intercept } => (slope, intercept),
            Trend::Unavailable => (0.0, 0.0),
        }
    }

    /// Points of the fitted line for an overlay, one per requested year.
    pub fn fitted_line(&self, years: impl IntoIterator<Item = i32>) -> Vec<(i32, f64)> {
        years
            .into_iter()
            .filter_map(|year| self.predict(year).map(|v| (year, v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yearly(points: &[(i32, f64)]) -> YearlyAggregate {
        points.iter().copied().collect()
    }

    #[test]
    fn fits_the_documented_example() {
        let trend = Trend::fit(&yearly(&[(2020, 10.0), (2021, 12.0), (2022, 14.0)]));
        assert_eq!(
            trend,
            Trend::Available {
                slope: 2.0,
                intercept: -4030.0
            }
        );
        assert_eq!(trend.predict(2025), Some(20.0));
    }

    #[test]
    fn line_passes_through_the_means() {
        let data = yearly(&[(1981, 3.2), (1990, 4.1), (1995, 2.7), (2004, 5.9), (2023, 4.4)]);
        let trend = Trend::fit(&data);
        let n = data.len() as f64;
        let mean_x = data.points().map(|(y, _)| f64::from(y)).sum::<f64>() / n;
        let mean_y = data.values().sum::<f64>() / n;
        let Trend::Available { slope, intercept } = trend else {
            panic!("expected a trend");
        };
        assert!((slope * mean_x + intercept - mean_y).abs() < 1e-9);
    }

    #[test]
    fn degenerate_inputs_have_no_trend() {
        assert_eq!(Trend::fit(&YearlyAggregate::new()), Trend::Unavailable);
        assert_eq!(Trend::fit(&yearly(&[(2000, 1.0)])), Trend::Unavailable);
        assert_eq!(
            Trend::fit_points([(2000.0, 1.0), (2000.0, 3.0)]),
            Trend::Unavailable
        );
        assert_eq!(Trend::Unavailable.predict(2030), None);
        assert_eq!(Trend::Unavailable.as_legacy_pair(), (0.0, 0.0));
    }

    #[test]
    fn flat_series_is_a_real_zero_slope() {
        let trend = Trend::fit(&yearly(&[(2000, 0.0), (2001, 0.0), (2002, 0.0)]));
        // distinguishable from "no trend" even though the legacy pair is (0, 0)
        assert!(trend.is_available());
        assert_eq!(trend.predict(2010), Some(0.0));
    }

    #[test]
    fn fitted_line_covers_requested_years() {
        let trend = Trend::Available {
            slope: 0.5,
            intercept: -1000.0,
        };
        assert_eq!(
            trend.fitted_line([2000, 2002]),
            vec![(2000, 0.0), (2002, 1.0)]
        );
        assert!(Trend::Unavailable.fitted_line([2000]).is_empty());
    }
}
