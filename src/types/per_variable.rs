//! A record holding one value per tracked [`ClimateVariable`].

use crate::types::variable::ClimateVariable;
use serde::{Deserialize, Serialize};

/// One named field per climate variable.
///
/// Used instead of a variable-keyed map so that every statistic is produced for
/// every variable and lookups are checked by the compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerVariable<T> {
    pub temperature_mean: T,
    pub temperature_max: T,
    pub temperature_min: T,
    pub precipitation: T,
    pub humidity: T,
    pub cloud_amount: T,
    pub wind_speed: T,
    pub snow_depth: T,
    pub snowfall: T,
}

impl<T> PerVariable<T> {
    /// Builds the record by evaluating `f` once per variable, in [`ClimateVariable::ALL`] order.
    pub fn from_fn(mut f: impl FnMut(ClimateVariable) -> T) -> Self {
        Self {
            temperature_mean: f(ClimateVariable::TemperatureMean),
            temperature_max: f(ClimateVariable::TemperatureMax),
            temperature_min: f(ClimateVariable::TemperatureMin),
            precipitation: f(ClimateVariable::Precipitation),
            humidity: f(ClimateVariable::Humidity),
            cloud_amount: f(ClimateVariable::CloudAmount),
            wind_speed: f(ClimateVariable::WindSpeed),
            snow_depth: f(ClimateVariable::SnowDepth),
            snowfall: f(ClimateVariable::Snowfall),
        }
    }

    pub fn get(&self, variable: ClimateVariable) -> &T {
        match variable {
            ClimateVariable::TemperatureMean => &self.temperature_mean,
            ClimateVariable::TemperatureMax => &self.temperature_max,
            ClimateVariable::TemperatureMin => &self.temperature_min,
            ClimateVariable::Precipitation => &self.precipitation,
            ClimateVariable::Humidity => &self.humidity,
            ClimateVariable::CloudAmount => &self.cloud_amount,
            ClimateVariable::WindSpeed => &self.wind_speed,
            ClimateVariable::SnowDepth => &self.snow_depth,
            ClimateVariable::Snowfall => &self.snowfall,
        }
    }

    pub fn get_mut(&mut self, variable: ClimateVariable) -> &mut T {
        match variable {
            ClimateVariable::TemperatureMean => &mut self.temperature_mean,
            ClimateVariable::TemperatureMax => &mut self.temperature_max,
            ClimateVariable::TemperatureMin => &mut self.temperature_min,
            ClimateVariable::Precipitation => &mut self.precipitation,
            ClimateVariable::Humidity => &mut self.humidity,
            ClimateVariable::CloudAmount => &mut self.cloud_amount,
            ClimateVariable::WindSpeed => &mut self.wind_speed,
            ClimateVariable::SnowDepth => &mut self.snow_depth,
            ClimateVariable::Snowfall => &mut self.snowfall,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(ClimateVariable, &T) -> U) -> PerVariable<U> {
        PerVariable::from_fn(|variable| f(variable, self.get(variable)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClimateVariable, &T)> + '_ {
        ClimateVariable::ALL.into_iter().map(move |v| (v, self.get(v)))
    }
}
