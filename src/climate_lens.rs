//! This module provides the main entry point of the crate. [`ClimateLens`] owns the
//! HTTP clients for the historical and forecast providers and the caches in front of
//! them; the statistics themselves are computed from the snapshots it hands out.

use crate::clients::forecast_client::ForecastClient;
use crate::clients::historical_client::HistoricalClient;
use crate::config::ClimateConfig;
use crate::error::ClimateError;
use crate::forecast::error::ForecastError;
use crate::forecast::hourly::{CurrentSummary, HourlyForecast};
use crate::forecast::loader::{ForecastLoader, DEFAULT_FORECAST_DAYS};
use crate::power::fetcher::SnapshotFetcher;
use crate::power::loader::PowerLoader;
use crate::report::ClimateSnapshot;
use crate::session::HistoricalSource;
use crate::types::location::{LatLon, Location};
use crate::types::raw_series::RawSeries;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::join;
use reqwest::Client;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// The historical snapshot and short-term forecast for one location, fetched together.
///
/// The forecast is kept as its own `Result`: a forecast outage leaves the
/// historical statistics usable.
#[derive(Debug)]
pub struct LocationWeather {
    pub snapshot: ClimateSnapshot,
    pub forecast: Result<HourlyForecast, ForecastError>,
}

impl LocationWeather {
    pub fn current_summary(&self, now: DateTime<Utc>) -> Option<CurrentSummary> {
        self.forecast.as_ref().ok()?.current_summary(now)
    }
}

/// The main client for retrieving climate data.
///
/// Historical series are kept in memory per location for the lifetime of the
/// client. Create it with [`ClimateLens::new()`] to keep everything in memory, or
/// with [`ClimateLens::with_cache_folder()`] / [`ClimateLens::with_default_cache()`]
/// to also keep a parquet copy of every download on disk.
///
/// # Examples
///
/// ```no_run
/// # use climatelens::{ClimateLens, ClimateError, ClimateConfig, ClimateReport, Location};
/// # use chrono::NaiveDate;
/// # #[tokio::main]
/// # async fn main() -> Result<(), ClimateError> {
/// let lens = ClimateLens::new()?;
/// let de_bilt = Location::new("De Bilt", 52.1015, 5.1779);
///
/// let snapshot = lens.historical().snapshot(&de_bilt).call().await?;
/// let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
/// let report = ClimateReport::build(&snapshot, date, lens.config());
/// println!("{:?}", report.card(climatelens::ClimateVariable::TemperatureMax).predicted_value);
/// # Ok(())
/// # }
/// ```
pub struct ClimateLens {
    config: ClimateConfig,
    fetcher: SnapshotFetcher,
    forecast_loader: ForecastLoader,
}

#[bon]
impl ClimateLens {
    fn from_parts(config: ClimateConfig, cache_folder: Option<PathBuf>) -> Result<Self, ClimateError> {
        let download_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ClimateError::HttpClient)?;
        let power_loader = PowerLoader::new(
            download_client.clone(),
            config.power_base_url.clone(),
            config.community.clone(),
            cache_folder,
        );
        let forecast_loader = ForecastLoader::new(download_client, config.forecast_base_url.clone());
        Ok(Self {
            fetcher: SnapshotFetcher::new(power_loader),
            forecast_loader,
            config,
        })
    }

    /// Creates a client with default settings that keeps all data in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::HttpClient`] if the HTTP client cannot be initialised.
    pub fn new() -> Result<Self, ClimateError> {
        Self::from_parts(ClimateConfig::default(), None)
    }

    /// Creates an in-memory client with custom settings.
    pub fn with_config(config: ClimateConfig) -> Result<Self, ClimateError> {
        Self::from_parts(config, None)
    }

    /// Creates a client that also caches every download as parquet in `cache_folder`.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::CacheDirCreation`] if the directory cannot be created.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, ClimateError> {
        Self::configure().cache_folder(cache_folder).call().await
    }

    /// Like [`ClimateLens::with_cache_folder`], using the platform cache directory
    /// (e.g. `~/.cache/climatelens_cache` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`ClimateError::CacheDirResolution`] if no cache directory exists on this platform.
    pub async fn with_default_cache() -> Result<Self, ClimateError> {
        let cache_folder = get_cache_dir().map_err(ClimateError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    /// Creates a client from an optional config and an optional cache folder.
    ///
    /// ```no_run
    /// # use climatelens::{ClimateLens, ClimateConfig, ClimateError};
    /// # async fn run() -> Result<(), ClimateError> {
    /// let lens = ClimateLens::configure()
    ///     .config(ClimateConfig::builder().start_year(1991).build())
    ///     .cache_folder(std::env::temp_dir().join("climatelens"))
    ///     .call()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn configure(
        config: Option<ClimateConfig>,
        cache_folder: Option<PathBuf>,
    ) -> Result<Self, ClimateError> {
        if let Some(folder) = &cache_folder {
            ensure_cache_dir_exists(folder)
                .await
                .map_err(|e| ClimateError::CacheDirCreation(folder.clone(), e))?;
        }
        Self::from_parts(config.unwrap_or_default(), cache_folder)
    }

    pub fn config(&self) -> &ClimateConfig {
        &self.config
    }

    /// Starts a historical data request.
    pub fn historical(&self) -> HistoricalClient<'_> {
        HistoricalClient::new(self)
    }

    /// Starts a short-term forecast request.
    pub fn forecast(&self) -> ForecastClient<'_> {
        ForecastClient::new(self)
    }

    /// Daily series for `coordinate` over the configured (or given) year span.
    ///
    /// Repeated calls for the same rounded coordinate and span share one snapshot.
    #[builder]
    pub async fn historical_data(
        &self,
        coordinate: LatLon,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> Result<Arc<RawSeries>, ClimateError> {
        let start_year = start_year.unwrap_or(self.config.start_year);
        let end_year = end_year.unwrap_or(self.config.end_year);
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1)
            .ok_or_else(|| ClimateError::InvalidDate(format!("{start_year}-01-01")))?;
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31)
            .ok_or_else(|| ClimateError::InvalidDate(format!("{end_year}-12-31")))?;

        self.fetcher
            .get_snapshot(coordinate, start, end)
            .await
            .map_err(ClimateError::from)
    }

    #[builder]
    pub async fn forecast_data(
        &self,
        coordinate: LatLon,
        forecast_days: Option<u8>,
    ) -> Result<HourlyForecast, ForecastError> {
        self.forecast_loader
            .fetch(coordinate, forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS))
            .await
    }

    /// Fetches the historical snapshot and the forecast for `location` concurrently.
    ///
    /// # Errors
    ///
    /// Fails only when the historical fetch fails; a forecast failure is kept in
    /// [`LocationWeather::forecast`].
    pub async fn fetch_location(&self, location: &Location) -> Result<LocationWeather, ClimateError> {
        let coordinate = location.coordinate();
        let (historical, forecast) = join(
            self.historical_data().coordinate(coordinate).call(),
            self.forecast_data().coordinate(coordinate).call(),
        )
        .await;

        Ok(LocationWeather {
            snapshot: ClimateSnapshot::new(location.clone(), historical?),
            forecast,
        })
    }

    /// Drops every in-memory snapshot; the parquet cache, if any, is kept.
    pub async fn clear_memory_cache(&self) {
        self.fetcher.clear().await;
    }
}

impl HistoricalSource for ClimateLens {
    fn load(
        &self,
        location: &Location,
    ) -> impl Future<Output = Result<Arc<RawSeries>, ClimateError>> + Send {
        self.historical_data().coordinate(location.coordinate()).call()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::variable::ClimateVariable;

    fn unreachable_config() -> ClimateConfig {
        ClimateConfig::builder()
            .power_base_url("http://127.0.0.1:9/power")
            .forecast_base_url("http://127.0.0.1:9/forecast")
            .request_timeout_secs(2)
            .build()
    }

    #[tokio::test]
    async fn creates_missing_cache_folder() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempfile::tempdir()?;
        let folder = root.path().join("nested").join("cache");
        let lens = ClimateLens::with_cache_folder(folder.clone()).await?;
        assert!(folder.is_dir());
        assert_eq!(lens.config().start_year, 1981);
        Ok(())
    }

    #[tokio::test]
    async fn historical_failure_propagates() -> Result<(), ClimateError> {
        let lens = ClimateLens::with_config(unreachable_config())?;
        let location = Location::new("Nowhere", 10.0, 10.0);
        let result = lens.fetch_location(&location).await;
        assert!(matches!(
            result,
            Err(ClimateError::PowerData(
                crate::power::error::PowerDataError::NetworkRequest(..)
            ))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_year_is_rejected() -> Result<(), ClimateError> {
        let lens = ClimateLens::with_config(unreachable_config())?;
        let result = lens
            .historical_data()
            .coordinate(LatLon(0.0, 0.0))
            .start_year(i32::MAX)
            .call()
            .await;
        assert!(matches!(result, Err(ClimateError::InvalidDate(_))));
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires network access to NASA POWER and Open-Meteo"]
    async fn fetches_de_bilt() -> Result<(), ClimateError> {
        let lens = ClimateLens::with_config(
            ClimateConfig::builder().start_year(2020).end_year(2021).build(),
        )?;
        let weather = lens
            .fetch_location(&Location::new("De Bilt", 52.1015, 5.1779))
            .await?;
        assert_eq!(
            weather
                .snapshot
                .raw
                .series(ClimateVariable::TemperatureMean)
                .len(),
            731
        );
        assert!(weather.current_summary(Utc::now()).is_some());
        Ok(())
    }
}
