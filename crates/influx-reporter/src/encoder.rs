// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Metric to point encoding.
//!
//! ```text
//! Registry::each --> parse_name --> PointEncoder::encode --> Vec<Point>
//! ```
//!
//! Counters and gauges become one point. Histograms, meters and timers
//! become one point per statistic, told apart by a `bucket` tag, all
//! carrying the same `<name>.<kind>` field key.

use crate::metric::{HistogramSnapshot, Metric, MeterSnapshot, PERCENTILES};
use crate::point::{FieldValue, Point};
use crate::registry::Registry;
use crate::tags::{parse_name, with_bucket, TagSet};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Statistic names emitted for histograms, in emission order.
pub const HISTOGRAM_BUCKETS: [&str; 12] = [
    "count", "max", "mean", "min", "stddev", "variance", "p50", "p75", "p95", "p99", "p999",
    "p9999",
];

/// Statistic names emitted for meters.
pub const METER_BUCKETS: [&str; 5] = ["count", "m1", "m5", "m15", "mean"];

/// Rate statistics appended to the histogram ones for timers.
pub const TIMER_RATE_BUCKETS: [&str; 4] = ["m1", "m5", "m15", "meanrate"];

/// Timestamp shared by every point of one flush.
///
/// With `align` set, `now` is floored to a multiple of `interval` since the
/// Unix epoch so that series from different runs land on the same instants.
pub fn reference_time(now: DateTime<Utc>, interval: Duration, align: bool) -> DateTime<Utc> {
    if !align {
        return now;
    }
    let interval_ns = i64::try_from(interval.as_nanos()).unwrap_or(i64::MAX);
    if interval_ns == 0 {
        return now;
    }
    let Some(now_ns) = now.timestamp_nanos_opt() else {
        return now;
    };
    DateTime::from_timestamp_nanos(now_ns - now_ns.rem_euclid(interval_ns))
}

/// Converts registry entries into points for one measurement.
#[derive(Debug, Clone)]
pub struct PointEncoder {
    measurement: String,
}

impl PointEncoder {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
        }
    }

    /// Encode every registry entry, resolving inline tags against `base_tags`.
    pub fn encode_registry(
        &self,
        registry: &dyn Registry,
        base_tags: &TagSet,
        time: DateTime<Utc>,
    ) -> Vec<Point> {
        let mut points = Vec::new();
        registry.each(&mut |raw_name, metric| {
            let (name, tags) = parse_name(raw_name, base_tags);
            self.encode_into(&mut points, name, &tags, metric, time);
        });
        points
    }

    /// Encode one metric.
    pub fn encode(
        &self,
        name: &str,
        tags: &TagSet,
        metric: &Metric,
        time: DateTime<Utc>,
    ) -> Vec<Point> {
        let mut points = Vec::new();
        self.encode_into(&mut points, name, tags, metric, time);
        points
    }

    fn encode_into(
        &self,
        out: &mut Vec<Point>,
        name: &str,
        tags: &TagSet,
        metric: &Metric,
        time: DateTime<Utc>,
    ) {
        match metric {
            Metric::Counter(c) => {
                let ms = c.snapshot();
                out.push(Point::single(
                    &self.measurement,
                    tags.clone(),
                    format!("{}.count", name),
                    FieldValue::Integer(ms.count),
                    time,
                ));
            }
            Metric::Gauge(g) => {
                let ms = g.snapshot();
                out.push(Point::single(
                    &self.measurement,
                    tags.clone(),
                    format!("{}.gauge", name),
                    FieldValue::Integer(ms.value),
                    time,
                ));
            }
            Metric::GaugeFloat64(g) => {
                let ms = g.snapshot();
                out.push(Point::single(
                    &self.measurement,
                    tags.clone(),
                    format!("{}.gauge", name),
                    FieldValue::Float(ms.value),
                    time,
                ));
            }
            Metric::Histogram(h) => {
                let ms = h.snapshot();
                let stats = histogram_stats(&ms);
                self.push_buckets(out, &format!("{}.histogram", name), tags, &stats, time);
            }
            Metric::Meter(m) => {
                let ms = m.snapshot();
                let stats = meter_stats(&ms);
                self.push_buckets(out, &format!("{}.meter", name), tags, &stats, time);
            }
            Metric::Timer(t) => {
                let ms = t.snapshot();
                let mut stats = histogram_stats(&ms.histogram).to_vec();
                stats.extend(
                    TIMER_RATE_BUCKETS.iter().copied().zip([
                        ms.rates.rate1,
                        ms.rates.rate5,
                        ms.rates.rate15,
                        ms.rates.rate_mean,
                    ]),
                );
                self.push_buckets(out, &format!("{}.timer", name), tags, &stats, time);
            }
            Metric::Unsupported(kind) => {
                tracing::trace!(metric = name, kind = *kind, "skipping unsupported metric");
            }
        }
    }

    fn push_buckets(
        &self,
        out: &mut Vec<Point>,
        field: &str,
        tags: &TagSet,
        stats: &[(&str, f64)],
        time: DateTime<Utc>,
    ) {
        for (bucket, value) in stats {
            out.push(Point::single(
                &self.measurement,
                with_bucket(tags, bucket),
                field.to_string(),
                FieldValue::Float(*value),
                time,
            ));
        }
    }
}

fn histogram_stats(ms: &HistogramSnapshot) -> [(&'static str, f64); 12] {
    let ps = ms.percentiles(&PERCENTILES);
    let values = [
        ms.count() as f64,
        ms.max() as f64,
        ms.mean(),
        ms.min() as f64,
        ms.std_dev(),
        ms.variance(),
        ps[0],
        ps[1],
        ps[2],
        ps[3],
        ps[4],
        ps[5],
    ];

    let mut stats = [("", 0.0); 12];
    for (slot, (bucket, value)) in stats
        .iter_mut()
        .zip(HISTOGRAM_BUCKETS.iter().zip(values))
    {
        *slot = (*bucket, value);
    }
    stats
}

fn meter_stats(ms: &MeterSnapshot) -> [(&'static str, f64); 5] {
    [
        (METER_BUCKETS[0], ms.count as f64),
        (METER_BUCKETS[1], ms.rate1),
        (METER_BUCKETS[2], ms.rate5),
        (METER_BUCKETS[3], ms.rate15),
        (METER_BUCKETS[4], ms.rate_mean),
    ]
}
