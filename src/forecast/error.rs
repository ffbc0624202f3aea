use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode forecast from {0}")]
    Decode(String, #[source] serde_json::Error),

    #[error("Hourly series '{field}' has {found} entries, expected {expected}")]
    MismatchedSeries {
        field: &'static str,
        expected: usize,
        found: usize,
    },
}
