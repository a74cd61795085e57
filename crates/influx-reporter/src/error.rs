// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.
//!
//! Only [`StartupError`] ever reaches a caller. Everything raised after the
//! reporting loop is running is published as a
//! [`ReporterEvent`](crate::events::ReporterEvent) and then dropped.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failure to build a transport handle from connection parameters.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),

    #[error("URL '{0}' has no host")]
    MissingHost(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failure of a single write or ping against the database.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected status {status} from {endpoint}")]
    UnexpectedStatus { endpoint: &'static str, status: u16 },
}

/// Fatal errors raised while starting a reporter. No reporter exists afterwards.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("unable to parse InfluxDB url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unable to make InfluxDB client: {0}")]
    Connection(#[from] ConnectionError),

    #[error("failed to create tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to spawn reporter thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Registry mutation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("metric '{0}' is already registered")]
    Duplicate(String),
}
