//! Platform-independent core: records, projections and codecs.

pub mod config;
pub mod error;
pub mod format;
pub mod metrics;
pub mod platform;
pub mod records;
pub mod sort;
pub mod tabular;
