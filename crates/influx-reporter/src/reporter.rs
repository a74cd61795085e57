// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Background reporting loop.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Caller (sync)                             │
//! │   Reporter::start() ──────────┐      Reporter::close()       │
//! │                               │        │ shutdown_tx         │
//! └───────────────────────────────┼────────┼─────────────────────┘
//!                                 ▼        ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │           "influx-reporter" thread (current_thread rt)       │
//! │   select! {                                                  │
//! │     shutdown    -> final flush, Stopped                      │
//! │     flush tick  -> encode registry, send batch               │
//! │     health tick -> ping, reconnect on failure                │
//! │   }                                                          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All three event sources are handled by one task, one at a time, so a
//! flush never overlaps another flush or a reconnect.

use crate::config::ReporterConfig;
use crate::connection::Connection;
use crate::encoder::{reference_time, PointEncoder};
use crate::error::StartupError;
use crate::events::{EventSink, ReporterEvent, TracingSink};
use crate::registry::Registry;
use crate::sender::BatchSender;
use crate::tags::TagSet;
use crate::transport::{redacted, ConnectionParams, Connector, HttpConnector, DEFAULT_USER_AGENT};
use chrono::Utc;
use reqwest::Url;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Period of the transport health check, independent of the flush interval.
pub const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Loop lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Terminal.
    Stopped,
}

/// State owned by the reporting task.
pub(crate) struct ReportingLoop<C: Connector> {
    registry: Arc<dyn Registry>,
    encoder: PointEncoder,
    sender: BatchSender,
    base_tags: TagSet,
    interval: Duration,
    align: bool,
    connection: Connection<C>,
    sink: Arc<dyn EventSink>,
    state: LoopState,
}

impl<C: Connector> ReportingLoop<C> {
    pub(crate) fn new(
        config: &ReporterConfig,
        registry: Arc<dyn Registry>,
        connection: Connection<C>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            encoder: PointEncoder::new(config.measurement.clone()),
            sender: BatchSender::new(config.database.clone())
                .with_retention_policy(config.retention_policy.clone()),
            base_tags: config.tags.clone(),
            interval: config.flush_interval(),
            align: config.align_timestamps,
            connection,
            sink,
            state: LoopState::Running,
        }
    }

    /// Run until `shutdown` fires (or its sender is dropped).
    pub(crate) async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        self.sink.emit(&ReporterEvent::Started {
            url: redacted(&self.connection.params().url),
            database: self.sender.database().to_string(),
        });

        let start = Instant::now();
        let mut flush_ticker = time::interval_at(start + self.interval, self.interval);
        flush_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut health_ticker =
            time::interval_at(start + HEALTH_CHECK_INTERVAL, HEALTH_CHECK_INTERVAL);
        health_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        while self.state == LoopState::Running {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    self.flush().await;
                    self.state = LoopState::Stopped;
                }
                _ = flush_ticker.tick() => self.flush().await,
                _ = health_ticker.tick() => self.health_check().await,
            }
        }

        self.sink.emit(&ReporterEvent::Stopped);
    }

    /// Encode the whole registry and send it as one batch.
    async fn flush(&mut self) {
        let time = reference_time(Utc::now(), self.interval, self.align);
        let points = self
            .encoder
            .encode_registry(self.registry.as_ref(), &self.base_tags, time);

        match self.sender.send(self.connection.transport(), points).await {
            Ok(points) => self.sink.emit(&ReporterEvent::Flushed { points }),
            Err(error) => self.sink.emit(&ReporterEvent::SendFailed { error }),
        }
    }

    /// Ping the current handle; rebuild it if the ping fails.
    async fn health_check(&mut self) {
        match self.connection.probe().await {
            Ok(pong) => self.sink.emit(&ReporterEvent::ProbeSucceeded {
                rtt: pong.rtt,
                version: pong.version,
            }),
            Err(error) => {
                self.sink.emit(&ReporterEvent::ProbeFailed { error });
                match self.connection.reconnect() {
                    Ok(()) => self.sink.emit(&ReporterEvent::Reconnected),
                    Err(error) => self.sink.emit(&ReporterEvent::ReconnectFailed { error }),
                }
            }
        }
    }
}

/// Handle to a running reporter.
///
/// Dropping the handle closes the reporter.
pub struct Reporter {
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Reporter {
    /// Start reporting `registry` to InfluxDB over HTTP, logging through `tracing`.
    pub fn start(
        registry: Arc<dyn Registry>,
        config: ReporterConfig,
    ) -> Result<Self, StartupError> {
        Self::start_with(registry, config, HttpConnector, Arc::new(TracingSink))
    }

    /// Start with a custom transport connector and event sink.
    ///
    /// Fails if the configuration is invalid, the URL cannot be parsed or
    /// the initial transport cannot be built; no loop is started then.
    pub fn start_with<C: Connector>(
        registry: Arc<dyn Registry>,
        config: ReporterConfig,
        connector: C,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, StartupError> {
        let result = Self::spawn(registry, config, connector, sink);
        if let Err(ref e) = result {
            tracing::error!(error = %e, "InfluxDB reporter not started");
        }
        result
    }

    fn spawn<C: Connector>(
        registry: Arc<dyn Registry>,
        config: ReporterConfig,
        connector: C,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, StartupError> {
        config.validate()?;

        let url = Url::parse(&config.url).map_err(|e| StartupError::InvalidUrl {
            url: config.url.clone(),
            reason: e.to_string(),
        })?;
        let params = ConnectionParams {
            url,
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: config.timeout(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            tls_skip_verify: config.tls_skip_verify,
        };
        let connection = Connection::establish(connector, params)?;

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StartupError::Runtime)?;

        let reporting_loop = ReportingLoop::new(&config, registry, connection, sink);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let thread = thread::Builder::new()
            .name("influx-reporter".to_string())
            .spawn(move || rt.block_on(reporting_loop.run(shutdown_rx)))
            .map_err(StartupError::Spawn)?;

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// Whether the loop thread is still alive.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal shutdown and block until the final flush has completed.
    ///
    /// Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("InfluxDB reporter thread panicked");
            }
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.close();
    }
}
