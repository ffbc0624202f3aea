//! Defines the fixed set of climate variables tracked for every location and the
//! per-variable metadata (provider parameter, heatmap key, unit, band bounding).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A daily climate variable retrieved from the historical data provider.
///
/// The set is closed: every statistic in this crate is computed for all nine
/// variables, and [`crate::PerVariable`] carries one field per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClimateVariable {
    /// Daily mean air temperature at 2 m.
    TemperatureMean,
    /// Daily maximum air temperature at 2 m.
    TemperatureMax,
    /// Daily minimum air temperature at 2 m.
    TemperatureMin,
    /// Bias-corrected total precipitation.
    Precipitation,
    /// Relative humidity at 2 m.
    Humidity,
    /// Cloud amount (share of sky covered).
    CloudAmount,
    /// Wind speed at 2 m.
    WindSpeed,
    /// Snow depth on land.
    SnowDepth,
    /// Snowfall (snow precipitation over land).
    Snowfall,
}

/// Whether confidence bands for a variable are clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bounding {
    /// Physical quantities that cannot go below zero (rain, wind, humidity, ...).
    NonNegative,
    /// Temperatures.
    Unbounded,
}

impl ClimateVariable {
    pub const ALL: [ClimateVariable; 9] = [
        ClimateVariable::TemperatureMean,
        ClimateVariable::TemperatureMax,
        ClimateVariable::TemperatureMin,
        ClimateVariable::Precipitation,
        ClimateVariable::Humidity,
        ClimateVariable::CloudAmount,
        ClimateVariable::WindSpeed,
        ClimateVariable::SnowDepth,
        ClimateVariable::Snowfall,
    ];

    /// NASA POWER parameter name.
    pub fn parameter(self) -> &'static str {
        match self {
            ClimateVariable::TemperatureMean => "T2M",
            ClimateVariable::TemperatureMax => "T2M_MAX",
            ClimateVariable::TemperatureMin => "T2M_MIN",
            ClimateVariable::Precipitation => "PRECTOTCORR",
            ClimateVariable::Humidity => "RH2M",
            ClimateVariable::CloudAmount => "CLOUD_AMT",
            ClimateVariable::WindSpeed => "WS2M",
            ClimateVariable::SnowDepth => "SNODP",
            ClimateVariable::Snowfall => "PRECSNOLAND",
        }
    }

    pub fn from_parameter(parameter: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.parameter() == parameter)
    }

    /// Key under which heatmap renderers look the variable up.
    pub fn heatmap_key(self) -> &'static str {
        match self {
            ClimateVariable::TemperatureMean => "avgTemp",
            ClimateVariable::TemperatureMax => "maxTemp",
            ClimateVariable::TemperatureMin => "minTemp",
            ClimateVariable::Precipitation => "rainFall",
            ClimateVariable::Humidity => "humidity",
            ClimateVariable::CloudAmount => "cloudCoverage",
            ClimateVariable::WindSpeed => "windSpeed",
            ClimateVariable::SnowDepth => "snowDepth",
            ClimateVariable::Snowfall => "snowFall",
        }
    }

    pub fn from_heatmap_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.heatmap_key() == key)
    }

    pub fn unit(self) -> &'static str {
        match self {
            ClimateVariable::TemperatureMean
            | ClimateVariable::TemperatureMax
            | ClimateVariable::TemperatureMin => "°C",
            ClimateVariable::Precipitation | ClimateVariable::Snowfall => "mm/day",
            ClimateVariable::Humidity | ClimateVariable::CloudAmount => "%",
            ClimateVariable::WindSpeed => "m/s",
            ClimateVariable::SnowDepth => "cm",
        }
    }

    pub fn bounding(self) -> Bounding {
        match self {
            ClimateVariable::TemperatureMean
            | ClimateVariable::TemperatureMax
            | ClimateVariable::TemperatureMin => Bounding::Unbounded,
            _ => Bounding::NonNegative,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ClimateVariable::TemperatureMean => "Average temperature",
            ClimateVariable::TemperatureMax => "Maximum temperature",
            ClimateVariable::TemperatureMin => "Minimum temperature",
            ClimateVariable::Precipitation => "Precipitation",
            ClimateVariable::Humidity => "Relative humidity",
            ClimateVariable::CloudAmount => "Cloud cover",
            ClimateVariable::WindSpeed => "Wind speed",
            ClimateVariable::SnowDepth => "Snow depth",
            ClimateVariable::Snowfall => "Snowfall",
        }
    }
}

/// Formats a variable using its heatmap key.
///
/// # Examples
///
/// ```
/// use climatelens::ClimateVariable;
///
/// assert_eq!(ClimateVariable::Precipitation.to_string(), "rainFall");
/// ```
impl fmt::Display for ClimateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.heatmap_key())
    }
}
