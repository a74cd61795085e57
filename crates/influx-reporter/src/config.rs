// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reporter configuration.
//!
//! Supports both programmatic and YAML file configuration:
//!
//! ```yaml
//! url: "http://localhost:8086"
//! database: "telemetry"
//! measurement: "app"
//! username: "writer"
//! password: "secret"
//! flush_interval_ms: 10000
//! align_timestamps: true
//! tags:
//!   host: "node-1"
//! ```

use crate::error::ConfigError;
use crate::tags::TagSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default flush interval (milliseconds).
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 10_000;

/// Everything needed to start a reporter, apart from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// InfluxDB URL (e.g., "http://localhost:8086").
    pub url: String,
    /// Target database.
    pub database: String,
    /// Measurement name for every point.
    pub measurement: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Base tags added to every point.
    #[serde(default)]
    pub tags: TagSet,
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// Floor point timestamps to the flush interval.
    #[serde(default)]
    pub align_timestamps: bool,
    /// Retention policy to write into. None = database default.
    #[serde(default)]
    pub retention_policy: Option<String>,
    /// Request timeout in milliseconds. None = no client-side timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub tls_skip_verify: bool,
}

fn default_flush_interval_ms() -> u64 {
    DEFAULT_FLUSH_INTERVAL_MS
}

impl ReporterConfig {
    pub fn new(
        url: impl Into<String>,
        database: impl Into<String>,
        measurement: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            measurement: measurement.into(),
            username: String::new(),
            password: String::new(),
            tags: TagSet::new(),
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            align_timestamps: false,
            retention_policy: None,
            timeout_ms: None,
            tls_skip_verify: false,
        }
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ReporterConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_alignment(mut self, align: bool) -> Self {
        self.align_timestamps = align;
        self
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flush_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "flush_interval_ms must be greater than zero".into(),
            ));
        }
        if self.database.is_empty() {
            return Err(ConfigError::Invalid("database must not be empty".into()));
        }
        if self.measurement.is_empty() {
            return Err(ConfigError::Invalid("measurement must not be empty".into()));
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_ms must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}
