//! Time-bucketed statistics over a user's transactions.
//!
//! The engine (`period`, `aggregate`, `extremes`, `breakdown`) is a set of pure
//! functions over already fetched transactions. `service` loads the snapshot
//! from the store and `handlers` exposes the results over HTTP.

pub mod aggregate;
pub mod breakdown;
pub mod extremes;
pub mod handlers;
pub mod models;
pub mod period;
pub mod service;

use std::fmt;

pub use aggregate::{aggregate, PeriodBucket};
pub use breakdown::{breakdown_by_category, CategoryBreakdown};
pub use extremes::{extremes_of_buckets, find_extremes, find_extremes_by, ExtremeRecord, Extremes};
pub use handlers::{get_extremes, get_periodic, get_stats};
pub use period::{bucket_key, Granularity, PeriodKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// Unsupported or missing period specifier
    InvalidGranularity(String),
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::InvalidGranularity(msg) => write!(f, "Invalid granularity: {msg}"),
        }
    }
}

impl std::error::Error for StatsError {}
