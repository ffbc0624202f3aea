use crate::power::error::PowerDataError;
use crate::power::frame::{frame_to_raw_series, raw_series_to_frame};
use crate::types::date_key::DateKey;
use crate::types::location::LatLon;
use crate::types::raw_series::RawSeries;
use crate::types::variable::ClimateVariable;
use chrono::NaiveDate;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::{fs, task};

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: Option<PowerProperties>,
    #[serde(default)]
    messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: BTreeMap<String, BTreeMap<String, Option<f64>>>,
}

/// Downloads daily point series from NASA POWER and optionally keeps a parquet
/// copy of every decoded response.
pub struct PowerLoader {
    download_client: Client,
    base_url: String,
    community: String,
    cache_dir: Option<PathBuf>,
}

impl PowerLoader {
    pub fn new(
        download_client: Client,
        base_url: impl Into<String>,
        community: impl Into<String>,
        cache_dir: Option<PathBuf>,
    ) -> PowerLoader {
        PowerLoader {
            download_client,
            base_url: base_url.into(),
            community: community.into(),
            cache_dir,
        }
    }

    pub fn request_url(&self, coordinate: LatLon, start: NaiveDate, end: NaiveDate) -> String {
        let parameters = ClimateVariable::ALL
            .iter()
            .map(|v| v.parameter())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}?parameters={}&community={}&longitude={}&latitude={}&start={}&end={}&format=JSON",
            self.base_url,
            parameters,
            self.community,
            coordinate.1,
            coordinate.0,
            DateKey::new(start),
            DateKey::new(end),
        )
    }

    /// Returns the raw store for `coordinate` between `start` and `end`, from
    /// the parquet cache when one is configured and populated.
    pub async fn fetch(
        &self,
        coordinate: LatLon,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawSeries, PowerDataError> {
        let Some(cache_dir) = &self.cache_dir else {
            return self.download(coordinate, start, end).await;
        };

        let (lat_key, lon_key) = coordinate.cache_key();
        let cache_filename = format!(
            "power_{}_{}_{}_{}.parquet",
            lat_key,
            lon_key,
            DateKey::new(start),
            DateKey::new(end)
        );
        let parquet_path = cache_dir.join(&cache_filename);

        if fs::metadata(&parquet_path).await.is_ok() {
            info!("Cache hit for {:?} at {:?}", coordinate, parquet_path);
            return Self::read_cached(parquet_path).await;
        }

        warn!(
            "Cache miss for {:?}. Downloading and processing.",
            coordinate
        );
        let raw = self.download(coordinate, start, end).await?;

        fs::create_dir_all(cache_dir)
            .await
            .map_err(|e| PowerDataError::CacheDirCreation(cache_dir.clone(), e))?;
        Self::cache_raw_series(&raw, cache_dir, &parquet_path).await?;
        info!("Cached data for {:?} to {:?}", coordinate, parquet_path);
        Ok(raw)
    }

    async fn download(
        &self,
        coordinate: LatLon,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawSeries, PowerDataError> {
        let url = self.request_url(coordinate, start, end);
        info!("Downloading data from {}", url);

        let response = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(|e| PowerDataError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    PowerDataError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    PowerDataError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| PowerDataError::NetworkRequest(url.clone(), e))?;
        let raw = decode_response(&url, &body)?;
        info!(
            "Decoded {} bytes into {} days of data",
            body.len(),
            raw.series(ClimateVariable::TemperatureMean).len()
        );
        Ok(raw)
    }

    async fn read_cached(path: PathBuf) -> Result<RawSeries, PowerDataError> {
        task::spawn_blocking(move || {
            let df = LazyFrame::scan_parquet(&path, Default::default())
                .map_err(|e| PowerDataError::ParquetScan(path.clone(), e))?
                .collect()
                .map_err(|e| PowerDataError::ParquetScan(path.clone(), e))?;
            frame_to_raw_series(&df).map_err(|message| PowerDataError::UnexpectedPayload {
                url: path.display().to_string(),
                message,
            })
        })
        .await?
    }

    /// Writes the frame next to its final location, then renames it into place
    /// so a concurrent reader never sees a half-written file.
    async fn cache_raw_series(
        raw: &RawSeries,
        cache_dir: &Path,
        path: &Path,
    ) -> Result<(), PowerDataError> {
        let mut df = raw_series_to_frame(raw)?;
        let dir = cache_dir.to_path_buf();
        let path_buf = path.to_path_buf();
        task::spawn_blocking(move || {
            let mut temp_file = NamedTempFile::new_in(&dir)
                .map_err(|e| PowerDataError::ParquetWriteIo(path_buf.clone(), e))?;
            ParquetWriter::new(temp_file.as_file_mut())
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| PowerDataError::ParquetWritePolars(path_buf.clone(), e))?;
            temp_file
                .persist(&path_buf)
                .map_err(|e| PowerDataError::CachePersist(path_buf.clone(), e.error))?;
            Ok::<(), PowerDataError>(())
        })
        .await??;
        Ok(())
    }
}

/// Decodes a POWER JSON body. Null values become NaN so they read as missing.
fn decode_response(url: &str, body: &[u8]) -> Result<RawSeries, PowerDataError> {
    let response: PowerResponse =
        serde_json::from_slice(body).map_err(|e| PowerDataError::Decode(url.to_string(), e))?;

    let Some(properties) = response.properties else {
        return Err(PowerDataError::UnexpectedPayload {
            url: url.to_string(),
            message: if response.messages.is_empty() {
                "missing properties.parameter".to_string()
            } else {
                response.messages.join("; ")
            },
        });
    };

    let nested = properties.parameter.into_iter().map(|(parameter, values)| {
        let values = values
            .into_iter()
            .map(|(key, value)| (key, value.unwrap_or(f64::NAN)));
        (parameter, values)
    });
    RawSeries::from_nested(nested).map_err(|e| PowerDataError::UnexpectedPayload {
        url: url.to_string(),
        message: e.to_string(),
    })
}
