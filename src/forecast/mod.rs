//! Short-term hourly forecast from Open-Meteo.

pub mod error;
pub mod hourly;
pub mod loader;
