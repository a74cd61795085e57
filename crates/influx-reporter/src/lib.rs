// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! InfluxDB Metrics Reporter
//!
//! Periodically snapshots a metrics registry and writes it to InfluxDB 1.x
//! over HTTP as one batch of line-protocol points per flush.
//!
//! This crate provides:
//! - A thread-safe metric registry with counters, gauges, histograms, meters and timers
//! - Inline tags in metric names (`"requests,route=/api"`)
//! - One field key per metric kind (`latency.histogram`, `hits.meter`, ...), with
//!   each statistic carried in a `bucket` tag (`bucket=p99`, `bucket=m1`, ...)
//! - A background loop with periodic flush, health check and reconnect
//! - YAML-based configuration
//!
//! # Overview
//!
//! ```text
//! Registry --> PointEncoder --> BatchSender --> Transport (HTTP /write)
//!                  ^                               ^
//!            tags::parse_name              Connection (ping / reconnect)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use influx_reporter::{Metric, MetricRegistry, Reporter, ReporterConfig};
//! use influx_reporter::metric::CounterSnapshot;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(MetricRegistry::new());
//! registry
//!     .register("requests,route=/api", Metric::counter(CounterSnapshot { count: 1 }))
//!     .unwrap();
//!
//! let config = ReporterConfig::new("http://localhost:8086", "telemetry", "app")
//!     .with_tag("host", "node-1");
//! let mut reporter = Reporter::start(registry, config).unwrap();
//! // ...
//! reporter.close();
//! ```

pub mod config;
pub mod connection;
pub mod encoder;
pub mod error;
pub mod events;
pub mod metric;
pub mod point;
pub mod registry;
pub mod reporter;
pub mod sender;
pub mod tags;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::ReporterConfig;
pub use error::StartupError;
pub use events::{EventSink, ReporterEvent, TracingSink};
pub use metric::Metric;
pub use point::{BatchPoints, Point};
pub use registry::{MetricRegistry, Registry};
pub use reporter::Reporter;
pub use tags::TagSet;
pub use transport::{Connector, HttpConnector, Transport};
