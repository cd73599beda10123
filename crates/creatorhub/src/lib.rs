//! Brand and creator marketplace core: campaign lifecycle, matching feeds, and the
//! HTTP surface consumed by the presentation layer.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
