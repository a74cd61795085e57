// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reporter lifecycle events.
//!
//! After startup nothing is returned to the caller; every outcome of the
//! reporting loop goes to an [`EventSink`]. [`TracingSink`] is the default.

use crate::error::{ConnectionError, TransportError};
use std::time::Duration;

/// Something the reporting loop did or failed to do.
#[derive(Debug)]
pub enum ReporterEvent {
    /// Loop started.
    Started { url: String, database: String },
    /// Batch written.
    Flushed { points: usize },
    /// Batch write failed; the interval contributes no data.
    SendFailed { error: TransportError },
    /// Health check passed.
    ProbeSucceeded { rtt: Duration, version: String },
    /// Health check failed; a reconnect follows.
    ProbeFailed { error: TransportError },
    /// Transport handle replaced.
    Reconnected,
    /// Rebuilding the handle failed; retried on the next health tick.
    ReconnectFailed { error: ConnectionError },
    /// Final flush done, loop exited.
    Stopped,
}

/// Payload-free discriminant of [`ReporterEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Started,
    Flushed,
    SendFailed,
    ProbeSucceeded,
    ProbeFailed,
    Reconnected,
    ReconnectFailed,
    Stopped,
}

impl ReporterEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ReporterEvent::Started { .. } => EventKind::Started,
            ReporterEvent::Flushed { .. } => EventKind::Flushed,
            ReporterEvent::SendFailed { .. } => EventKind::SendFailed,
            ReporterEvent::ProbeSucceeded { .. } => EventKind::ProbeSucceeded,
            ReporterEvent::ProbeFailed { .. } => EventKind::ProbeFailed,
            ReporterEvent::Reconnected => EventKind::Reconnected,
            ReporterEvent::ReconnectFailed { .. } => EventKind::ReconnectFailed,
            ReporterEvent::Stopped => EventKind::Stopped,
        }
    }
}

/// Receiver of reporter events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ReporterEvent);
}

/// Logs events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &ReporterEvent) {
        match event {
            ReporterEvent::Started { url, database } => {
                tracing::info!(url = %url, database = %database, "InfluxDB reporter started");
            }
            ReporterEvent::Flushed { points } => {
                tracing::debug!(points, "sent metrics to InfluxDB");
            }
            ReporterEvent::SendFailed { error } => {
                tracing::warn!(error = %error, "unable to send metrics to InfluxDB");
            }
            ReporterEvent::ProbeSucceeded { rtt, version } => {
                tracing::trace!(rtt_us = rtt.as_micros() as u64, version = %version, "InfluxDB ping ok");
            }
            ReporterEvent::ProbeFailed { error } => {
                tracing::warn!(
                    error = %error,
                    "got error while sending a ping to InfluxDB, trying to recreate client"
                );
            }
            ReporterEvent::Reconnected => {
                tracing::info!("recreated InfluxDB client");
            }
            ReporterEvent::ReconnectFailed { error } => {
                tracing::error!(error = %error, "unable to make InfluxDB client");
            }
            ReporterEvent::Stopped => {
                tracing::info!("InfluxDB reporter stopped");
            }
        }
    }
}
