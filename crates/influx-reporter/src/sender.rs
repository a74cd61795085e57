// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batch assembly and submission.

use crate::error::TransportError;
use crate::point::{BatchPoints, Point};
use crate::transport::Transport;

/// Wraps a flush's points into one write for the target database.
///
/// No retries and no partial-success handling: the write either succeeds as
/// a whole or the flush is lost.
#[derive(Debug, Clone)]
pub struct BatchSender {
    database: String,
    retention_policy: Option<String>,
}

impl BatchSender {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            retention_policy: None,
        }
    }

    pub fn with_retention_policy(mut self, policy: Option<String>) -> Self {
        self.retention_policy = policy;
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Build the batch for one flush.
    pub fn batch(&self, points: Vec<Point>) -> BatchPoints {
        BatchPoints {
            database: self.database.clone(),
            retention_policy: self.retention_policy.clone(),
            points,
        }
    }

    /// Write `points` in a single request. Returns the number of points written.
    ///
    /// Every call issues exactly one write, including for an empty flush.
    pub async fn send<T: Transport>(
        &self,
        transport: &T,
        points: Vec<Point>,
    ) -> Result<usize, TransportError> {
        let batch = self.batch(points);
        transport.write(&batch).await
    }
}
