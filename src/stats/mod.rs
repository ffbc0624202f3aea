//! The statistics engine. Every builder here is a pure function of a
//! [`crate::RawSeries`] snapshot and a target date.

pub mod aggregate;
pub mod distribution;
pub mod heatmap;
pub mod sampler;
pub mod trend;
