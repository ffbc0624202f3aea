use crate::forecast::error::ForecastError;
use crate::forecast::hourly::{HourlyForecast, OpenMeteoResponse};
use crate::types::location::LatLon;
use log::{info, warn};
use reqwest::Client;

const HOURLY_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m,cloud_cover";
pub const DEFAULT_FORECAST_DAYS: u8 = 3;

pub struct ForecastLoader {
    download_client: Client,
    base_url: String,
}

impl ForecastLoader {
    pub fn new(download_client: Client, base_url: impl Into<String>) -> Self {
        Self {
            download_client,
            base_url: base_url.into(),
        }
    }

    pub fn request_url(&self, coordinate: LatLon, forecast_days: u8) -> String {
        format!(
            "{}?latitude={}&longitude={}&hourly={}&forecast_days={}",
            self.base_url, coordinate.0, coordinate.1, HOURLY_FIELDS, forecast_days
        )
    }

    pub async fn fetch(
        &self,
        coordinate: LatLon,
        forecast_days: u8,
    ) -> Result<HourlyForecast, ForecastError> {
        let url = self.request_url(coordinate, forecast_days);
        info!("Requesting forecast from {}", url);

        let response = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ForecastError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    ForecastError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    ForecastError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| ForecastError::NetworkRequest(url.clone(), e))?;
        let decoded: OpenMeteoResponse =
            serde_json::from_slice(&body).map_err(|e| ForecastError::Decode(url, e))?;
        HourlyForecast::try_from(decoded)
    }
}
