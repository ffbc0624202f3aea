//! Provides the `ForecastClient` for requesting the short-term hourly forecast.

use crate::{ClimateError, ClimateLens, CurrentSummary, HourlyForecast, LatLon};
use bon::bon;
use chrono::{DateTime, Utc};

/// A client builder for Open-Meteo hourly forecasts, obtained via [`ClimateLens::forecast()`].
pub struct ForecastClient<'a> {
    client: &'a ClimateLens,
}

#[bon]
impl<'a> ForecastClient<'a> {
    pub(crate) fn new(client: &'a ClimateLens) -> Self {
        Self { client }
    }

    /// Fetches the hourly forecast for a coordinate.
    ///
    /// `.forecast_days(u8)` sets the horizon; it defaults to 3 days.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use climatelens::{ClimateLens, ClimateError, LatLon};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ClimateError> {
    /// let lens = ClimateLens::new()?;
    /// let forecast = lens
    ///     .forecast()
    ///     .location(LatLon(52.1015, 5.1779))
    ///     .forecast_days(1)
    ///     .call()
    ///     .await?;
    /// println!("{} forecast hours", forecast.hours.len());
    /// # Ok(())
    /// # }
    /// ```
    #[builder(start_fn = location)]
    #[doc(hidden)]
    pub async fn build_location(
        &self,
        #[builder(start_fn)] coordinate: LatLon,
        forecast_days: Option<u8>,
    ) -> Result<HourlyForecast, ClimateError> {
        Ok(self
            .client
            .forecast_data()
            .coordinate(coordinate)
            .maybe_forecast_days(forecast_days)
            .call()
            .await?)
    }

    /// Fetches a one-day forecast and returns the hour nearest to `now` (default: the
    /// current time).
    #[builder(start_fn = current)]
    #[doc(hidden)]
    pub async fn build_current(
        &self,
        #[builder(start_fn)] coordinate: LatLon,
        now: Option<DateTime<Utc>>,
    ) -> Result<Option<CurrentSummary>, ClimateError> {
        let forecast = self.location(coordinate).forecast_days(1).call().await?;
        Ok(forecast.current_summary(now.unwrap_or_else(Utc::now)))
    }
}
