//! Timeframe resolution, the aggregation engine and the services built on them.

pub mod aggregation;
pub mod palette;
pub mod services;
pub mod time;
pub mod timeframe;
pub mod validation;

pub use time::{Clock, FixedClock, SystemClock};
pub use timeframe::{BucketKey, TimeWindow, Timeframe, TrendBuckets};
