mod climate_lens;
mod clients;
mod config;
mod context;
mod error;
mod forecast;
mod power;
mod report;
mod session;
mod stats;
mod types;
mod utils;

pub use climate_lens::*;
pub use config::*;
pub use context::weather_context;
pub use error::ClimateError;
pub use report::*;
pub use session::*;

pub use clients::forecast_client::*;
pub use clients::historical_client::*;

pub use forecast::hourly::{CurrentSummary, ForecastHour, HourlyForecast};
pub use forecast::loader::{ForecastLoader, DEFAULT_FORECAST_DAYS};
pub use power::fetcher::SnapshotFetcher;
pub use power::loader::PowerLoader;

pub use stats::aggregate::*;
pub use stats::distribution::*;
pub use stats::heatmap::HeatmapGrid;
pub use stats::sampler::*;
pub use stats::trend::Trend;

pub use types::date_key::DateKey;
pub use types::location::{LatLon, Location};
pub use types::per_variable::PerVariable;
pub use types::period::{parse_iso_date, MonthDay};
pub use types::raw_series::*;
pub use types::variable::{Bounding, ClimateVariable};

pub use forecast::error::ForecastError;
pub use power::error::PowerDataError;
