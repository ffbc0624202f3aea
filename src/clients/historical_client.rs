//! Provides the `HistoricalClient` for requesting decades of daily climate data.
//!
//! This client acts as an intermediate builder, obtained via [`ClimateLens::historical()`],
//! allowing the user to pick the location and optionally narrow the year span before
//! executing the request.

use crate::report::ClimateSnapshot;
use crate::{ClimateError, ClimateLens, LatLon, Location, RawSeries};
use bon::bon;
use std::sync::Arc;

/// A client builder for historical daily series.
///
/// Calling `.location(..).call()` returns the shared raw store for a coordinate;
/// `.snapshot(..).call()` wraps it together with the [`Location`] it belongs to.
pub struct HistoricalClient<'a> {
    client: &'a ClimateLens,
}

#[bon]
impl<'a> HistoricalClient<'a> {
    pub(crate) fn new(client: &'a ClimateLens) -> Self {
        Self { client }
    }

    /// Fetches the daily series for a coordinate.
    ///
    /// Optional builder methods `.start_year(i32)` and `.end_year(i32)` override the
    /// configured span.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::PowerData`] if the download or the cache fails, and
    /// [`ClimateError::InvalidDate`] for a year chrono cannot represent.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use climatelens::{ClimateLens, ClimateError, ClimateVariable, LatLon};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ClimateError> {
    /// let lens = ClimateLens::new()?;
    /// let raw = lens
    ///     .historical()
    ///     .location(LatLon(52.1015, 5.1779))
    ///     .start_year(2000)
    ///     .call()
    ///     .await?;
    /// println!("{} days of rain data", raw.series(ClimateVariable::Precipitation).len());
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = location)]
    #[doc(hidden)]
    pub async fn build_location(
        &self,
        #[builder(start_fn)] coordinate: LatLon,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> Result<Arc<RawSeries>, ClimateError> {
        self.client
            .historical_data()
            .coordinate(coordinate)
            .maybe_start_year(start_year)
            .maybe_end_year(end_year)
            .call()
            .await
    }

    /// Fetches the daily series for a named place and returns it as a [`ClimateSnapshot`].
    #[builder(start_fn = snapshot)]
    #[doc(hidden)]
    pub async fn build_snapshot(
        &self,
        #[builder(start_fn)] location: &Location,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> Result<ClimateSnapshot, ClimateError> {
        let raw = self
            .location(location.coordinate())
            .maybe_start_year(start_year)
            .maybe_end_year(end_year)
            .call()
            .await?;
        Ok(ClimateSnapshot::new(location.clone(), raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClimateConfig, ClimateVariable};

    #[tokio::test]
    #[ignore = "requires network access to NASA POWER"]
    async fn snapshot_for_de_bilt() -> Result<(), ClimateError> {
        let lens = ClimateLens::new()?;
        let location = Location::new("De Bilt", 52.1015, 5.1779);
        let snapshot = lens
            .historical()
            .snapshot(&location)
            .start_year(2023)
            .end_year(2023)
            .call()
            .await?;
        assert_eq!(snapshot.location, location);
        assert_eq!(snapshot.raw.series(ClimateVariable::Humidity).len(), 365);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_provider_is_an_error() -> Result<(), ClimateError> {
        let config = ClimateConfig::builder()
            .power_base_url("http://127.0.0.1:9/power")
            .build();
        let lens = ClimateLens::with_config(config)?;
        let result = lens
            .historical()
            .location(LatLon(1.0, 1.0))
            .end_year(1990)
            .call()
            .await;
        assert!(result.is_err());
        Ok(())
    }
}
