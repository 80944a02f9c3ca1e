//! Shared value types.

pub mod usage_metrics;
