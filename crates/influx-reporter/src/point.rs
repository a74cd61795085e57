// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Points, batches and their Line Protocol rendering.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 field1=val1,field2=val2 timestamp_ns
//! ```
//!
//! See: <https://docs.influxdata.com/influxdb/v1/write_protocols/line_protocol_reference/>

use crate::tags::TagSet;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// A value that can be stored in an InfluxDB field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// 64-bit floating point.
    Float(f64),
    /// 64-bit signed integer.
    Integer(i64),
}

impl FieldValue {
    /// Format this value for InfluxDB Line Protocol.
    ///
    /// - Float: written as-is (e.g., `3.14`)
    /// - Integer: suffixed with `i` (e.g., `42i`)
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(v) => format!("{}", v),
            FieldValue::Integer(v) => format!("{}i", v),
        }
    }

    /// NaN and infinities cannot be written.
    pub fn is_representable(&self) -> bool {
        match self {
            FieldValue::Float(v) => v.is_finite(),
            FieldValue::Integer(_) => true,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line_protocol())
    }
}

/// A single time-series point.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: TagSet,
    pub fields: BTreeMap<String, FieldValue>,
    pub time: DateTime<Utc>,
}

impl Point {
    /// Point with a single field, the shape every encoded metric uses.
    pub fn single(
        measurement: &str,
        tags: TagSet,
        field: String,
        value: FieldValue,
        time: DateTime<Utc>,
    ) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field, value);
        Self {
            measurement: measurement.to_string(),
            tags,
            fields,
            time,
        }
    }

    /// Render as one Line Protocol line.
    ///
    /// Returns `None` when no field is representable, since InfluxDB
    /// requires at least one field per point.
    pub fn to_line_protocol(&self) -> Option<String> {
        let fields: Vec<_> = self
            .fields
            .iter()
            .filter(|(_, v)| v.is_representable())
            .collect();
        if fields.is_empty() {
            return None;
        }

        let mut line = escape_measurement(&self.measurement);

        // BTreeMap keeps tags sorted by key (canonical form)
        for (key, value) in &self.tags {
            if value.is_empty() {
                continue;
            }
            line.push(',');
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&escape_key(value));
        }

        line.push(' ');

        for (i, (key, value)) in fields.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape_key(key));
            line.push('=');
            line.push_str(&value.to_line_protocol());
        }

        line.push(' ');
        line.push_str(&timestamp_ns(&self.time).to_string());

        Some(line)
    }
}

/// Points written together to one database.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPoints {
    pub database: String,
    pub retention_policy: Option<String>,
    pub points: Vec<Point>,
}

/// Rendered request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    pub body: String,
    pub lines: usize,
    pub dropped: usize,
}

impl BatchPoints {
    pub fn new(database: impl Into<String>, points: Vec<Point>) -> Self {
        Self {
            database: database.into(),
            retention_policy: None,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Newline-separated Line Protocol body; unrepresentable points are dropped.
    pub fn encode(&self) -> EncodedBatch {
        let mut body = String::new();
        let mut lines = 0;
        let mut dropped = 0;

        for point in &self.points {
            match point.to_line_protocol() {
                Some(line) => {
                    if lines > 0 {
                        body.push('\n');
                    }
                    body.push_str(&line);
                    lines += 1;
                }
                None => dropped += 1,
            }
        }

        EncodedBatch {
            body,
            lines,
            dropped,
        }
    }
}

/// Nanoseconds since the Unix epoch, saturating outside the i64 range.
pub fn timestamp_ns(time: &DateTime<Utc>) -> i64 {
    time.timestamp_nanos_opt().unwrap_or(if time.timestamp() < 0 {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Escape measurement name per Line Protocol escaping rules.
/// Spaces and commas must be escaped with backslash.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape tag keys, tag values and field keys per Line Protocol escaping rules.
/// Commas, equals signs, and spaces must be escaped.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}
