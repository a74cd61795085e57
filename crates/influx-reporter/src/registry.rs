// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Metric registries.
//!
//! The reporter only needs [`Registry::each`]. Implementations are shared
//! with the rest of the host process and must tolerate being mutated while a
//! flush enumerates them; a torn view across entries is acceptable.

use crate::error::RegistryError;
use crate::metric::Metric;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Enumerable name-to-metric mapping.
pub trait Registry: Send + Sync {
    /// Call `f` once per registered metric.
    fn each(&self, f: &mut dyn FnMut(&str, &Metric));
}

/// Simple thread-safe registry keyed by metric name.
#[derive(Default)]
pub struct MetricRegistry {
    metrics: RwLock<BTreeMap<String, Metric>>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metric under `name`. Fails if the name is taken.
    pub fn register(&self, name: impl Into<String>, metric: Metric) -> Result<(), RegistryError> {
        let name = name.into();
        let mut metrics = self.metrics.write();
        if metrics.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        metrics.insert(name, metric);
        Ok(())
    }

    /// Existing metric for `name`, or the one built by `init` (registered first).
    pub fn get_or_register(&self, name: &str, init: impl FnOnce() -> Metric) -> Metric {
        if let Some(existing) = self.metrics.read().get(name) {
            return existing.clone();
        }
        self.metrics
            .write()
            .entry(name.to_string())
            .or_insert_with(init)
            .clone()
    }

    pub fn get(&self, name: &str) -> Option<Metric> {
        self.metrics.read().get(name).cloned()
    }

    pub fn unregister(&self, name: &str) -> Option<Metric> {
        self.metrics.write().remove(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.read().is_empty()
    }
}

impl Registry for MetricRegistry {
    fn each(&self, f: &mut dyn FnMut(&str, &Metric)) {
        // Copy out so callbacks never run under the lock.
        let entries: Vec<(String, Metric)> = self
            .metrics
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        for (name, metric) in &entries {
            f(name, metric);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{CounterSnapshot, GaugeSnapshot};

    #[test]
    fn test_register_rejects_duplicates() {
        let registry = MetricRegistry::new();
        registry
            .register("requests", Metric::counter(CounterSnapshot { count: 1 }))
            .expect("first register");

        let err = registry
            .register("requests", Metric::counter(CounterSnapshot { count: 2 }))
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("requests".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_or_register_keeps_first() {
        let registry = MetricRegistry::new();
        registry.get_or_register("g", || Metric::gauge(GaugeSnapshot { value: 1 }));
        let m = registry.get_or_register("g", || Metric::gauge(GaugeSnapshot { value: 2 }));

        match m {
            Metric::Gauge(g) => assert_eq!(g.snapshot().value, 1),
            other => panic!("expected gauge, got {:?}", other),
        }
    }

    #[test]
    fn test_each_visits_in_name_order() {
        let registry = MetricRegistry::new();
        for name in ["b", "c", "a"] {
            registry
                .register(name, Metric::counter(CounterSnapshot::default()))
                .expect("register");
        }

        let mut seen = Vec::new();
        registry.each(&mut |name, _| seen.push(name.to_string()));
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_each_allows_reentrant_mutation() {
        let registry = MetricRegistry::new();
        registry
            .register("a", Metric::counter(CounterSnapshot::default()))
            .expect("register");

        // Would deadlock if the callback ran under the read lock.
        registry.each(&mut |name, _| {
            registry.unregister(name);
        });
        assert!(registry.is_empty());
    }
}
