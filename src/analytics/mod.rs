//! Payment analytics
//!
//! Rolls support events up into a snapshot of totals, per-kind counts,
//! unique supporters and hourly/daily chart buckets.
//!
//! - `types`: timeframe, snapshot and request types
//! - `service`: window resolution and the aggregation pass

mod service;
mod types;

pub use service::{compute_payment_analytics, resolve_window};
pub use types::{
    AnalyticsTimeframe, ComputeAnalyticsInput, PaymentAnalyticsSnapshot, PaymentEventCounts,
    PaymentTotals, TimeBucket,
};
