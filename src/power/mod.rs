//! Historical daily series from the NASA POWER point API.

pub mod error;
pub mod fetcher;
pub(crate) mod frame;
pub mod loader;
