// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::errors::MetricError;
use crate::metrics::Metric;

/// A registry of named counters that processors and handlers report into.
pub trait MetricProvider: Send + Sync {
    /// Register a counter. Fails on an empty or already registered name.
    fn add_metric(&self, metric: Metric) -> Result<(), MetricError>;

    /// Add `value` to a counter, creating it on first use if it was never added
    fn increment_metric(&self, name: &str, value: f64);

    fn get_metric(&self, name: &str) -> Option<Metric>;

    fn get_metrics(&self) -> HashMap<String, Metric>;
}
