//! The slide assembly pipeline.
//!
//! This module hosts the orchestrator that sequences the separation
//! stages per page, the configuration file loader, and run statistics.

pub mod config;
pub mod separator;
pub mod stats;

pub use config::{ConfigFormat, ConfigLoader};
pub use separator::{SlideSeparator, SlideSeparatorBuilder};
pub use stats::{SeparationStats, StatsManager};
