//! Tunables for retrieval, sampling and the session pipeline.

use bon::Builder;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

pub const DEFAULT_START_YEAR: i32 = 1981;
pub const DEFAULT_END_YEAR: i32 = 2024;
pub const DEFAULT_POWER_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Configuration shared by [`crate::ClimateLens`], the statistics builders and
/// [`crate::ClimateSession`].
///
/// Every field has a default, so a config can be deserialized from a partial
/// document or assembled with the builder.
///
/// # Examples
///
/// ```
/// use climatelens::ClimateConfig;
///
/// let config = ClimateConfig::builder().end_year(2020).debounce_ms(50).build();
/// assert_eq!(config.start_year, 1981);
/// assert_eq!(config.years().count(), 40);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct ClimateConfig {
    /// First historical year requested and sampled.
    #[builder(default = DEFAULT_START_YEAR)]
    pub start_year: i32,
    /// Last historical year requested and sampled.
    #[builder(default = DEFAULT_END_YEAR)]
    pub end_year: i32,
    /// First day offset (relative to the target month-day) of the sampling window.
    #[builder(default = -2)]
    pub window_start_offset: i64,
    /// Last day offset of the sampling window, inclusive.
    #[builder(default = 4)]
    pub window_end_offset: i64,
    /// Selections arriving closer together than this collapse into one.
    #[builder(default = 300)]
    pub debounce_ms: u64,
    #[builder(default = 30)]
    pub request_timeout_secs: u64,
    #[builder(default = DEFAULT_POWER_URL.to_string(), into)]
    pub power_base_url: String,
    #[builder(default = DEFAULT_FORECAST_URL.to_string(), into)]
    pub forecast_base_url: String,
    /// NASA POWER user community; selects unit conventions on the provider side.
    #[builder(default = "RE".to_string(), into)]
    pub community: String,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        ClimateConfig::builder().build()
    }
}

impl ClimateConfig {
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }

    pub fn window_offsets(&self) -> RangeInclusive<i64> {
        self.window_start_offset..=self.window_end_offset
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_behaviour() {
        let config = ClimateConfig::default();
        assert_eq!(config.years(), 1981..=2024);
        assert_eq!(config.window_offsets().count(), 7);
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.community, "RE");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() -> Result<(), serde_json::Error> {
        let config: ClimateConfig = serde_json::from_str(r#"{"end_year": 2022, "debounce_ms": 10}"#)?;
        assert_eq!(config.end_year, 2022);
        assert_eq!(config.debounce_ms, 10);
        assert_eq!(config.start_year, DEFAULT_START_YEAR);
        assert_eq!(config.power_base_url, DEFAULT_POWER_URL);
        Ok(())
    }
}
