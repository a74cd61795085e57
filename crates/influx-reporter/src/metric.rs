// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Metric kinds understood by the encoder.
//!
//! The set of kinds is closed ([`Metric`]). Each live kind exposes a
//! `snapshot()` returning plain numbers that stay valid while a flush encodes
//! them. Storage and aggregation belong to whoever implements these traits;
//! the snapshot structs themselves implement them too, so a frozen value can
//! be registered directly.

use std::fmt;
use std::sync::Arc;

/// Percentiles reported for histograms and timers.
pub const PERCENTILES: [f64; 6] = [0.5, 0.75, 0.95, 0.99, 0.999, 0.9999];

/// Monotonic count.
pub trait CounterMetric: Send + Sync {
    fn snapshot(&self) -> CounterSnapshot;
}

/// Integer point-in-time value.
pub trait GaugeMetric: Send + Sync {
    fn snapshot(&self) -> GaugeSnapshot;
}

/// Floating-point point-in-time value.
pub trait GaugeFloat64Metric: Send + Sync {
    fn snapshot(&self) -> GaugeFloat64Snapshot;
}

/// Distribution of integer observations.
pub trait HistogramMetric: Send + Sync {
    fn snapshot(&self) -> HistogramSnapshot;
}

/// Event rate.
pub trait MeterMetric: Send + Sync {
    fn snapshot(&self) -> MeterSnapshot;
}

/// Duration distribution plus event rate.
pub trait TimerMetric: Send + Sync {
    fn snapshot(&self) -> TimerSnapshot;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GaugeSnapshot {
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GaugeFloat64Snapshot {
    pub value: f64,
}

/// Histogram state: total observation count plus the retained sample.
///
/// `count` may exceed the sample size when the registry uses a bounded
/// reservoir. Every other statistic is computed over `values`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistogramSnapshot {
    count: i64,
    values: Vec<i64>,
}

impl HistogramSnapshot {
    /// Build a snapshot from the retained sample values (any order).
    pub fn new(count: i64, mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        Self { count, values }
    }

    /// Snapshot where every observation was retained.
    pub fn from_values(values: Vec<i64>) -> Self {
        let count = values.len() as i64;
        Self::new(count, values)
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn min(&self) -> i64 {
        self.values.first().copied().unwrap_or(0)
    }

    pub fn max(&self) -> i64 {
        self.values.last().copied().unwrap_or(0)
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let sum: i128 = self.values.iter().map(|v| *v as i128).sum();
        sum as f64 / self.values.len() as f64
    }

    /// Population variance of the sample.
    pub fn variance(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let sum: f64 = self
            .values
            .iter()
            .map(|v| {
                let d = *v as f64 - mean;
                d * d
            })
            .sum();
        sum / self.values.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Interpolated percentiles, one result per requested rank in `ps`.
    pub fn percentiles(&self, ps: &[f64]) -> Vec<f64> {
        let n = self.values.len();
        if n == 0 {
            return vec![0.0; ps.len()];
        }

        ps.iter()
            .map(|p| {
                let pos = p * (n + 1) as f64;
                if pos < 1.0 {
                    self.values[0] as f64
                } else if pos >= n as f64 {
                    self.values[n - 1] as f64
                } else {
                    let idx = pos as usize;
                    let lower = self.values[idx - 1] as f64;
                    let upper = self.values[idx] as f64;
                    lower + (pos - pos.floor()) * (upper - lower)
                }
            })
            .collect()
    }
}

/// Rolling and mean event rates, in events per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeterSnapshot {
    pub count: i64,
    pub rate1: f64,
    pub rate5: f64,
    pub rate15: f64,
    pub rate_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimerSnapshot {
    pub histogram: HistogramSnapshot,
    pub rates: MeterSnapshot,
}

impl TimerSnapshot {
    pub fn count(&self) -> i64 {
        self.histogram.count()
    }
}

impl CounterMetric for CounterSnapshot {
    fn snapshot(&self) -> CounterSnapshot {
        *self
    }
}

impl GaugeMetric for GaugeSnapshot {
    fn snapshot(&self) -> GaugeSnapshot {
        *self
    }
}

impl GaugeFloat64Metric for GaugeFloat64Snapshot {
    fn snapshot(&self) -> GaugeFloat64Snapshot {
        *self
    }
}

impl HistogramMetric for HistogramSnapshot {
    fn snapshot(&self) -> HistogramSnapshot {
        self.clone()
    }
}

impl MeterMetric for MeterSnapshot {
    fn snapshot(&self) -> MeterSnapshot {
        *self
    }
}

impl TimerMetric for TimerSnapshot {
    fn snapshot(&self) -> TimerSnapshot {
        self.clone()
    }
}

/// A registry entry.
#[derive(Clone)]
pub enum Metric {
    Counter(Arc<dyn CounterMetric>),
    Gauge(Arc<dyn GaugeMetric>),
    GaugeFloat64(Arc<dyn GaugeFloat64Metric>),
    Histogram(Arc<dyn HistogramMetric>),
    Meter(Arc<dyn MeterMetric>),
    Timer(Arc<dyn TimerMetric>),
    /// A kind the encoder does not report (health checks, raw EWMAs, ...).
    Unsupported(&'static str),
}

impl Metric {
    pub fn counter(m: impl CounterMetric + 'static) -> Self {
        Metric::Counter(Arc::new(m))
    }

    pub fn gauge(m: impl GaugeMetric + 'static) -> Self {
        Metric::Gauge(Arc::new(m))
    }

    pub fn gauge_f64(m: impl GaugeFloat64Metric + 'static) -> Self {
        Metric::GaugeFloat64(Arc::new(m))
    }

    pub fn histogram(m: impl HistogramMetric + 'static) -> Self {
        Metric::Histogram(Arc::new(m))
    }

    pub fn meter(m: impl MeterMetric + 'static) -> Self {
        Metric::Meter(Arc::new(m))
    }

    pub fn timer(m: impl TimerMetric + 'static) -> Self {
        Metric::Timer(Arc::new(m))
    }

    /// Short kind name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Metric::Counter(_) => "counter",
            Metric::Gauge(_) => "gauge",
            Metric::GaugeFloat64(_) => "gauge_f64",
            Metric::Histogram(_) => "histogram",
            Metric::Meter(_) => "meter",
            Metric::Timer(_) => "timer",
            Metric::Unsupported(kind) => *kind,
        }
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Metric").field(&self.kind()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_histogram_empty_is_all_zero() {
        let h = HistogramSnapshot::default();
        assert_eq!(h.count(), 0);
        assert_eq!(h.min(), 0);
        assert_eq!(h.max(), 0);
        assert_eq!(h.mean(), 0.0);
        assert_eq!(h.std_dev(), 0.0);
        assert_eq!(h.percentiles(&PERCENTILES), vec![0.0; 6]);
    }

    #[test]
    fn test_histogram_basic_statistics() {
        let h = HistogramSnapshot::from_values(vec![4, 2, 8, 6]);

        assert_eq!(h.count(), 4);
        assert_eq!(h.min(), 2);
        assert_eq!(h.max(), 8);
        assert!(approx(h.mean(), 5.0));
        // (9 + 1 + 1 + 9) / 4
        assert!(approx(h.variance(), 5.0));
        assert!(approx(h.std_dev(), 5.0_f64.sqrt()));
    }

    #[test]
    fn test_histogram_count_can_exceed_sample() {
        let h = HistogramSnapshot::new(1_000, vec![1, 2, 3]);
        assert_eq!(h.count(), 1_000);
        assert!(approx(h.mean(), 2.0));
    }

    #[test]
    fn test_histogram_percentiles_interpolate() {
        let h = HistogramSnapshot::from_values((1..=100).collect());
        let ps = h.percentiles(&[0.5, 0.75, 0.99]);

        // pos = 0.5 * 101 = 50.5 -> between 50 and 51
        assert!(approx(ps[0], 50.5));
        // pos = 75.75 -> 75 + 0.75
        assert!(approx(ps[1], 75.75));
        // pos = 99.99 -> 99 + 0.99
        assert!(approx(ps[2], 99.99));
    }

    #[test]
    fn test_histogram_percentiles_clamp_to_edges() {
        let h = HistogramSnapshot::from_values(vec![10, 20]);
        let ps = h.percentiles(&[0.1, 0.9999]);

        assert!(approx(ps[0], 10.0));
        assert!(approx(ps[1], 20.0));
    }

    #[test]
    fn test_snapshots_are_metrics() {
        let m = Metric::counter(CounterSnapshot { count: 3 });
        match m {
            Metric::Counter(c) => assert_eq!(c.snapshot().count, 3),
            other => panic!("expected counter, got {:?}", other),
        }

        let timer = TimerSnapshot {
            histogram: HistogramSnapshot::from_values(vec![1, 2, 3]),
            rates: MeterSnapshot::default(),
        };
        assert_eq!(timer.count(), 3);
        assert_eq!(Metric::timer(timer).kind(), "timer");
    }
}
