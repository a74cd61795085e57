// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scriptable transport and event sink for unit tests.

use crate::error::{ConnectionError, TransportError};
use crate::events::{EventKind, EventSink, ReporterEvent};
use crate::point::BatchPoints;
use crate::transport::{ConnectionParams, Connector, Pong, Transport};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct MockState {
    connects: AtomicUsize,
    fail_connects: AtomicUsize,
    pings: AtomicUsize,
    fail_pings: AtomicUsize,
    write_attempts: AtomicUsize,
    fail_writes: AtomicUsize,
    /// (handle generation, batch) per successful write.
    writes: Mutex<Vec<(usize, BatchPoints)>>,
}

/// Decrement `counter` if non-zero; true when a failure was consumed.
fn take_failure(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    state: Arc<MockState>,
}

impl MockConnector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_connects(&self, n: usize) {
        self.state.fail_connects.store(n, Ordering::SeqCst);
    }

    pub(crate) fn fail_pings(&self, n: usize) {
        self.state.fail_pings.store(n, Ordering::SeqCst);
    }

    pub(crate) fn fail_writes(&self, n: usize) {
        self.state.fail_writes.store(n, Ordering::SeqCst);
    }

    pub(crate) fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn pings(&self) -> usize {
        self.state.pings.load(Ordering::SeqCst)
    }

    pub(crate) fn write_attempts(&self) -> usize {
        self.state.write_attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> Vec<(usize, BatchPoints)> {
        self.state.writes.lock().clone()
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    fn connect(&self, params: &ConnectionParams) -> Result<MockTransport, ConnectionError> {
        let generation = self.state.connects.fetch_add(1, Ordering::SeqCst) + 1;
        if take_failure(&self.state.fail_connects) {
            return Err(ConnectionError::MissingHost(params.url.to_string()));
        }
        Ok(MockTransport {
            generation,
            state: Arc::clone(&self.state),
        })
    }
}

pub(crate) struct MockTransport {
    generation: usize,
    state: Arc<MockState>,
}

impl MockTransport {
    /// Connect attempt number that produced this handle.
    pub(crate) fn generation(&self) -> usize {
        self.generation
    }
}

impl Transport for MockTransport {
    async fn write(&self, batch: &BatchPoints) -> Result<usize, TransportError> {
        self.state.write_attempts.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.state.fail_writes) {
            return Err(TransportError::Server {
                status: 500,
                message: "mock write failure".to_string(),
            });
        }
        self.state
            .writes
            .lock()
            .push((self.generation, batch.clone()));
        Ok(batch.len())
    }

    async fn ping(&self) -> Result<Pong, TransportError> {
        self.state.pings.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.state.fail_pings) {
            return Err(TransportError::UnexpectedStatus {
                endpoint: "ping",
                status: 503,
            });
        }
        Ok(Pong {
            rtt: Duration::from_millis(1),
            version: "mock".to_string(),
        })
    }
}

/// Records event kinds in emission order.
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<EventKind>>,
    started_url: Mutex<Option<String>>,
}

impl RecordingSink {
    /// URL published by the last `Started` event.
    pub(crate) fn started_url(&self) -> Option<String> {
        self.started_url.lock().clone()
    }

    pub(crate) fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().clone()
    }

    pub(crate) fn count(&self, kind: EventKind) -> usize {
        self.events.lock().iter().filter(|k| **k == kind).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &ReporterEvent) {
        if let ReporterEvent::Started { url, .. } = event {
            *self.started_url.lock() = Some(url.clone());
        }
        self.events.lock().push(event.kind());
    }
}
