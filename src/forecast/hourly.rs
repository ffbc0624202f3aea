use crate::forecast::error::ForecastError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// One forecast hour as returned by Open-Meteo. Any field may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastHour {
    pub time: DateTime<Utc>,
    /// °C
    pub temperature: Option<f64>,
    /// %
    pub humidity: Option<f64>,
    /// mm
    pub precipitation: Option<f64>,
    /// km/h
    pub wind_speed: Option<f64>,
    /// %
    pub cloud_cover: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyForecast {
    pub latitude: f64,
    pub longitude: f64,
    pub hours: Vec<ForecastHour>,
}

/// The forecast hour closest to "now", as shown next to the historical cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrentSummary(pub ForecastHour);

#[derive(Debug, Deserialize)]
pub(crate) struct OpenMeteoResponse {
    latitude: f64,
    longitude: f64,
    hourly: OpenMeteoHourly,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoHourly {
    #[serde(deserialize_with = "deserialize_times")]
    time: Vec<DateTime<Utc>>,
    temperature_2m: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    precipitation: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
    cloud_cover: Vec<Option<f64>>,
}

fn deserialize_times<'de, D>(deserializer: D) -> Result<Vec<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    raw.iter()
        .map(|s| {
            NaiveDateTime::parse_from_str(s, TIME_FORMAT)
                .map(|t| t.and_utc())
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

impl TryFrom<OpenMeteoResponse> for HourlyForecast {
    type Error = ForecastError;

    fn try_from(response: OpenMeteoResponse) -> Result<Self, Self::Error> {
        let hourly = response.hourly;
        let expected = hourly.time.len();
        let check = |field: &'static str, values: &[Option<f64>]| {
            if values.len() == expected {
                Ok(())
            } else {
                Err(ForecastError::MismatchedSeries {
                    field,
                    expected,
                    found: values.len(),
                })
            }
        };
        check("temperature_2m", &hourly.temperature_2m)?;
        check("relative_humidity_2m", &hourly.relative_humidity_2m)?;
        check("precipitation", &hourly.precipitation)?;
        check("wind_speed_10m", &hourly.wind_speed_10m)?;
        check("cloud_cover", &hourly.cloud_cover)?;

        let hours = (0..expected)
            .map(|i| ForecastHour {
                time: hourly.time[i],
                temperature: hourly.temperature_2m[i],
                humidity: hourly.relative_humidity_2m[i],
                precipitation: hourly.precipitation[i],
                wind_speed: hourly.wind_speed_10m[i],
                cloud_cover: hourly.cloud_cover[i],
            })
            .collect();

        Ok(HourlyForecast {
            latitude: response.latitude,
            longitude: response.longitude,
            hours,
        })
    }
}

impl HourlyForecast {
    /// The hour whose timestamp is nearest to `now`; `None` for an empty forecast.
    pub fn current_summary(&self, now: DateTime<Utc>) -> Option<CurrentSummary> {
        self.hours
            .iter()
            .min_by_key(|hour| (hour.time - now).num_seconds().abs())
            .copied()
            .map(CurrentSummary)
    }
}

impl fmt::Display for CurrentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = &self.0;
        let mut parts = Vec::new();
        if let Some(t) = hour.temperature {
            parts.push(format!("{t:.1}°C"));
        }
        if let Some(h) = hour.humidity {
            parts.push(format!("humidity {h:.0}%"));
        }
        if let Some(p) = hour.precipitation {
            parts.push(format!("precipitation {p:.1} mm"));
        }
        if let Some(w) = hour.wind_speed {
            parts.push(format!("wind {w:.1} km/h"));
        }
        if let Some(c) = hour.cloud_cover {
            parts.push(format!("cloud cover {c:.0}%"));
        }
        if parts.is_empty() {
            return write!(f, "No current conditions at {}", hour.time.format("%H:%M UTC"));
        }
        write!(f, "{} at {}", parts.join(", "), hour.time.format("%H:%M UTC"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const BODY: &str = r#"{
        "latitude": 52.1,
        "longitude": 5.18,
        "generationtime_ms": 0.05,
        "timezone": "GMT",
        "hourly_units": {"time": "iso8601", "temperature_2m": "°C"},
        "hourly": {
            "time": ["2025-06-15T12:00", "2025-06-15T13:00", "2025-06-15T14:00"],
            "temperature_2m": [21.4, 22.0, null],
            "relative_humidity_2m": [60, 58, 57],
            "precipitation": [0.0, 0.4, 1.1],
            "wind_speed_10m": [11.2, 12.5, 13.0],
            "cloud_cover": [40, 75, 100]
        }
    }"#;

    fn forecast() -> HourlyForecast {
        let response: OpenMeteoResponse = serde_json::from_str(BODY).unwrap();
        HourlyForecast::try_from(response).unwrap()
    }

    #[test]
    fn decodes_hourly_columns() {
        let forecast = forecast();
        assert_eq!(forecast.hours.len(), 3);
        assert_eq!(
            forecast.hours[0].time,
            Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(forecast.hours[2].temperature, None);
        assert_eq!(forecast.hours[1].cloud_cover, Some(75.0));
    }

    #[test]
    fn picks_the_nearest_hour() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 13, 20, 0).unwrap();
        let summary = forecast().current_summary(now).unwrap();
        assert_eq!(summary.0.temperature, Some(22.0));
        assert_eq!(
            summary.to_string(),
            "22.0°C, humidity 58%, precipitation 0.4 mm, wind 12.5 km/h, cloud cover 75% at 13:00 UTC"
        );
    }

    #[test]
    fn rejects_ragged_series() {
        let body = BODY.replace("[40, 75, 100]", "[40, 75]");
        let response: OpenMeteoResponse = serde_json::from_str(&body).unwrap();
        match HourlyForecast::try_from(response) {
            Err(ForecastError::MismatchedSeries {
                field,
                expected,
                found,
            }) => {
                assert_eq!((field, expected, found), ("cloud_cover", 3, 2));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn empty_forecast_has_no_summary() {
        let forecast = HourlyForecast {
            latitude: 0.0,
            longitude: 0.0,
            hours: Vec::new(),
        };
        assert!(forecast.current_summary(Utc::now()).is_none());
    }
}
