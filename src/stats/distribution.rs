//! Population mean and standard deviation of a yearly aggregate, and the
//! ±1σ/±2σ/±3σ bands built from them.

use crate::stats::sampler::YearlyAggregate;
use crate::types::variable::Bounding;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Distribution {
    Available {
        mean: f64,
        #[serde(rename = "standardDeviation")]
        std_dev: f64,
    },
    /// No yearly values at all.
    Unavailable,
}

/// An inclusive `[low, high]` range of whole units.
pub type Band = [i64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBands {
    pub one_std: Band,
    pub two_std: Band,
    pub three_std: Band,
}

impl Distribution {
    /// Mean and population standard deviation (divisor `N`).
    pub fn estimate(yearly: &YearlyAggregate) -> Distribution {
        Self::from_values(yearly.values())
    }

    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Distribution {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Distribution::Unavailable;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        Distribution::Available {
            mean,
            std_dev: variance.sqrt(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Distribution::Available { .. })
    }

    pub fn mean(&self) -> Option<f64> {
        match *self {
            Distribution::Available { mean, .. } => Some(mean),
            Distribution::Unavailable => None,
        }
    }

    pub fn std_dev(&self) -> Option<f64> {
        match *self {
            Distribution::Available { std_dev, .. } => Some(std_dev),
            Distribution::Unavailable => None,
        }
    }

    /// Bands of width `k·σ` around `center`, rounded to whole units.
    ///
    /// Edges ending in exactly `.5` round away from zero, so `-2.5` becomes `-3`.
    ///
    /// # Examples
    ///
    /// ```
    /// use climatelens::{Bounding, Distribution};
    ///
    /// let distribution = Distribution::from_values([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
    /// let bands = distribution.bands(3.0, Bounding::NonNegative).unwrap();
    /// assert_eq!(bands.one_std, [1, 5]);
    /// assert_eq!(bands.three_std, [0, 9]);
    /// ```
    pub fn bands(&self, center: f64, bounding: Bounding) -> Option<ConfidenceBands> {
        let sigma = self.std_dev()?;
        let band = |k: f64| -> Band {
            let low = (center - k * sigma).round();
            let high = (center + k * sigma).round();
            match bounding {
                Bounding::NonNegative => [low.max(0.0) as i64, high.max(0.0) as i64],
                Bounding::Unbounded => [low as i64, high as i64],
            }
        };
        Some(ConfidenceBands {
            one_std: band(1.0),
            two_std: band(2.0),
            three_std: band(3.0),
        })
    }
}
