// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory counter backend for [`MetricProvider`].

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::errors::MetricError;
use crate::traits::MetricProvider;

/// A single counter and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub description: String,
    pub value: f64,
}

impl Metric {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value: 0.0,
        }
    }
}

/// Counter registry keyed by metric name.
#[derive(Debug, Default)]
pub struct CounterProvider {
    metrics: RwLock<HashMap<String, Metric>>,
}

impl CounterProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricProvider for CounterProvider {
    fn add_metric(&self, metric: Metric) -> Result<(), MetricError> {
        if metric.name.is_empty() {
            return Err(MetricError::EmptyName);
        }
        let mut metrics = self.metrics.write();
        if metrics.contains_key(&metric.name) {
            return Err(MetricError::Duplicate(metric.name));
        }
        metrics.insert(metric.name.clone(), metric);
        Ok(())
    }

    fn increment_metric(&self, name: &str, value: f64) {
        let mut metrics = self.metrics.write();
        metrics
            .entry(name.to_string())
            .or_insert_with(|| Metric::new(name, ""))
            .value += value;
    }

    fn get_metric(&self, name: &str) -> Option<Metric> {
        self.metrics.read().get(name).cloned()
    }

    fn get_metrics(&self) -> HashMap<String, Metric> {
        self.metrics.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_increment_metric() {
        let provider = CounterProvider::new();
        provider
            .add_metric(Metric::new("printer_1_payloads_in", "payloads ingested"))
            .unwrap();

        provider.increment_metric("printer_1_payloads_in", 1.0);
        provider.increment_metric("printer_1_payloads_in", 2.0);

        let metric = provider.get_metric("printer_1_payloads_in").unwrap();
        assert_eq!(metric.value, 3.0);
        assert_eq!(metric.description, "payloads ingested");
    }

    #[test]
    fn test_duplicate_and_empty_names_are_rejected() {
        let provider = CounterProvider::new();
        provider.add_metric(Metric::new("a", "")).unwrap();

        assert_eq!(
            provider.add_metric(Metric::new("a", "")),
            Err(MetricError::Duplicate("a".to_string()))
        );
        assert_eq!(provider.add_metric(Metric::new("", "")), Err(MetricError::EmptyName));
    }

    #[test]
    fn test_increment_creates_unknown_counter() {
        let provider = CounterProvider::new();
        provider.increment_metric("listdir_1_failures", 1.0);

        assert_eq!(provider.get_metrics().len(), 1);
        assert_eq!(provider.get_metric("listdir_1_failures").unwrap().value, 1.0);
    }
}
