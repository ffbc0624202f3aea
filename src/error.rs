use crate::forecast::error::ForecastError;
use crate::power::error::PowerDataError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimateError {
    #[error(transparent)]
    PowerData(#[from] PowerDataError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid date key '{0}', expected YYYYMMDD")]
    InvalidDateKey(String),

    #[error("Request was superseded by a newer selection")]
    Cancelled,

    #[error("Session worker has stopped")]
    SessionClosed,
}
