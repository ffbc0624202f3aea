//! Conversion between a [`RawSeries`] and the wide frame stored in the parquet cache:
//! a `date` column of `YYYYMMDD` strings plus one nullable `f64` column per provider
//! parameter.

use crate::types::date_key::DateKey;
use crate::types::raw_series::RawSeries;
use crate::types::variable::ClimateVariable;
use polars::prelude::*;
use std::collections::BTreeSet;

pub(crate) const DATE_COLUMN: &str = "date";

pub(crate) fn raw_series_to_frame(raw: &RawSeries) -> PolarsResult<DataFrame> {
    let keys: BTreeSet<DateKey> = raw
        .per_variable()
        .iter()
        .flat_map(|(_, series)| series.iter().map(|(key, _)| key))
        .collect();

    let mut columns = Vec::with_capacity(ClimateVariable::ALL.len() + 1);
    columns.push(Column::new(
        DATE_COLUMN.into(),
        keys.iter().map(|k| k.to_string()).collect::<Vec<_>>(),
    ));
    for (variable, series) in raw.per_variable().iter() {
        let values: Vec<Option<f64>> = keys.iter().map(|k| series.get(*k)).collect();
        columns.push(Column::new(variable.parameter().into(), values));
    }
    DataFrame::new(columns)
}

/// Rebuilds the store; null cells are absent days, not sentinels.
pub(crate) fn frame_to_raw_series(df: &DataFrame) -> Result<RawSeries, String> {
    let dates = df
        .column(DATE_COLUMN)
        .and_then(|c| c.str())
        .map_err(|e| e.to_string())?;
    let keys: Vec<Option<DateKey>> = dates
        .into_iter()
        .map(|d| d.map(str::parse::<DateKey>).transpose())
        .collect::<Result<_, _>>()
        .map_err(|e| e.to_string())?;

    let mut raw = RawSeries::default();
    for variable in ClimateVariable::ALL {
        let Ok(column) = df.column(variable.parameter()) else {
            continue;
        };
        let values = column.f64().map_err(|e| e.to_string())?;
        let series = raw.series_mut(variable);
        for (key, value) in keys.iter().zip(values.into_iter()) {
            if let (Some(key), Some(value)) = (key, value) {
                series.insert(*key, value);
            }
        }
    }
    Ok(raw)
}
