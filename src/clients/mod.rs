pub mod forecast_client;
pub mod historical_client;
