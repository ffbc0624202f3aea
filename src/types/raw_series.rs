//! The raw climate store: every daily value retrieved for one location, per variable.

use crate::error::ClimateError;
use crate::types::date_key::DateKey;
use crate::types::per_variable::PerVariable;
use crate::types::variable::ClimateVariable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Values below this are the provider's "no observation" fill (NASA POWER uses -999).
pub const MISSING_VALUE_THRESHOLD: f64 = -200.0;

/// Returns `true` when `value` is the provider's missing-data sentinel.
pub fn is_missing(value: f64) -> bool {
    value < MISSING_VALUE_THRESHOLD || value.is_nan()
}

/// One variable's daily values, keyed and iterated in chronological order.
///
/// Values are stored exactly as delivered, sentinel included; each consumer
/// decides how a missing value is treated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailySeries(BTreeMap<DateKey, f64>);

impl DailySeries {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: DateKey, value: f64) -> Option<f64> {
        self.0.insert(key, value)
    }

    /// Raw lookup, sentinel values included.
    pub fn get(&self, key: DateKey) -> Option<f64> {
        self.0.get(&key).copied()
    }

    /// Lookup that treats sentinel values as absent.
    pub fn observed(&self, key: DateKey) -> Option<f64> {
        self.get(key).filter(|v| !is_missing(*v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Chronological iteration over every stored entry.
    pub fn iter(&self) -> impl Iterator<Item = (DateKey, f64)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Chronological iteration that skips sentinel values.
    pub fn iter_observed(&self) -> impl Iterator<Item = (DateKey, f64)> + '_ {
        self.iter().filter(|(_, v)| !is_missing(*v))
    }

    pub fn first_key(&self) -> Option<DateKey> {
        self.0.keys().next().copied()
    }

    pub fn last_key(&self) -> Option<DateKey> {
        self.0.keys().next_back().copied()
    }
}

impl FromIterator<(DateKey, f64)> for DailySeries {
    fn from_iter<I: IntoIterator<Item = (DateKey, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// All daily series retrieved for one location.
///
/// Created once per fetch and shared as an immutable snapshot; a new location
/// replaces it wholesale. A variable the provider did not return is an empty series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSeries(PerVariable<DailySeries>);

impl RawSeries {
    pub fn new(series: PerVariable<DailySeries>) -> Self {
        Self(series)
    }

    pub fn series(&self, variable: ClimateVariable) -> &DailySeries {
        self.0.get(variable)
    }

    pub fn series_mut(&mut self, variable: ClimateVariable) -> &mut DailySeries {
        self.0.get_mut(variable)
    }

    pub fn per_variable(&self) -> &PerVariable<DailySeries> {
        &self.0
    }

    /// Builds the store from the provider's nested `{parameter -> {YYYYMMDD -> value}}`
    /// mapping. Unknown parameters are ignored; a malformed date key is an error.
    pub fn from_nested<P, D, K>(nested: P) -> Result<Self, ClimateError>
    where
        P: IntoIterator<Item = (K, D)>,
        D: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut raw = RawSeries::default();
        for (parameter, values) in nested {
            let Some(variable) = ClimateVariable::from_parameter(parameter.as_ref()) else {
                continue;
            };
            let series = raw.series_mut(variable);
            for (key, value) in values {
                series.insert(key.as_ref().parse()?, value);
            }
        }
        Ok(raw)
    }

    /// `true` when no variable holds a single entry.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|(_, s)| s.is_empty())
    }

    /// First and last date key across all variables.
    pub fn date_span(&self) -> Option<(DateKey, DateKey)> {
        let first = self.0.iter().filter_map(|(_, s)| s.first_key()).min()?;
        let last = self.0.iter().filter_map(|(_, s)| s.last_key()).max()?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn sentinel_detection() {
        assert!(is_missing(-999.0));
        assert!(is_missing(f64::NAN));
        assert!(!is_missing(-45.0));
        assert!(!is_missing(0.0));
    }

    #[test]
    fn from_nested_maps_known_parameters() -> Result<(), ClimateError> {
        let mut nested: HashMap<String, HashMap<String, f64>> = HashMap::new();
        nested.insert(
            "PRECTOTCORR".into(),
            HashMap::from([("20200615".to_string(), 1.5), ("20200616".to_string(), -999.0)]),
        );
        nested.insert("QV2M".into(), HashMap::from([("20200615".to_string(), 7.0)]));

        let raw = RawSeries::from_nested(nested)?;
        let precipitation = raw.series(ClimateVariable::Precipitation);
        assert_eq!(precipitation.len(), 2);
        let key = DateKey::from_ymd(2020, 6, 16).unwrap();
        assert_eq!(precipitation.get(key), Some(-999.0));
        assert_eq!(precipitation.observed(key), None);
        assert!(raw.series(ClimateVariable::TemperatureMean).is_empty());
        Ok(())
    }

    #[test]
    fn from_nested_rejects_bad_keys() {
        let nested = vec![("T2M", vec![("2020-06-15", 20.0)])];
        assert!(matches!(
            RawSeries::from_nested(nested),
            Err(ClimateError::InvalidDateKey(_))
        ));
    }

    #[test]
    fn date_span_covers_all_variables() -> Result<(), ClimateError> {
        let raw = RawSeries::from_nested(vec![
            ("T2M", vec![("19810101", 1.0), ("19810102", 2.0)]),
            ("RH2M", vec![("19801231", 80.0), ("19810103", 70.0)]),
        ])?;
        let (first, last) = raw.date_span().unwrap();
        assert_eq!(first.to_string(), "19801231");
        assert_eq!(last.to_string(), "19810103");
        assert!(RawSeries::default().date_span().is_none());
        Ok(())
    }

    #[test]
    fn iteration_is_chronological() {
        let series: DailySeries = [
            (DateKey::from_ymd(2001, 1, 1).unwrap(), 3.0),
            (DateKey::from_ymd(1999, 1, 1).unwrap(), 1.0),
            (DateKey::from_ymd(2000, 1, 1).unwrap(), 2.0),
        ]
        .into_iter()
        .collect();
        let values: Vec<f64> = series.iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }
}
