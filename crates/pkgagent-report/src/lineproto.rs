//! Line protocol metric model and encoder
//!
//! Wire syntax, one metric per line:
//!
//! ```text
//! measurement,tag1=v1,tag2=v2 field1="v1" <unix-nanoseconds>
//! ```
//!
//! Tags and fields keep insertion order, which fixes the byte layout of
//! every emitted line.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use pkgagent_pkg::SoftwarePackage;

use crate::error::EncodeError;

/// Measurement for one installed package
pub const MEASUREMENT: &str = "packages";
/// Measurement for a lister failure
pub const FAILURE_MEASUREMENT: &str = "packages_failed";
/// Tag holding the packaging system
pub const SYSTEM_TAG: &str = "system";
/// Tag holding the package name
pub const PACKAGE_TAG: &str = "package";
/// Tag holding the package architecture
pub const ARCH_TAG: &str = "arch";
/// Field holding the package version
pub const VERSION_FIELD: &str = "version";
/// Field holding the failure message
pub const ERROR_FIELD: &str = "error";

/// Value of a line protocol field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Quoted string
    String(String),
    /// Signed integer, written with an `i` suffix
    Integer(i64),
    /// 64-bit float
    Float(f64),
    /// Boolean
    Boolean(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

/// A single line protocol record
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    measurement: String,
    timestamp: DateTime<Utc>,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
}

impl Metric {
    /// Create a metric with no tags or fields
    pub fn new(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            timestamp,
            tags: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Append a tag
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Append a field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Measurement name
    #[must_use]
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Metric timestamp
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Tags in insertion order
    #[must_use]
    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    /// Fields in insertion order
    #[must_use]
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Look up a tag value by key
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Encode as a single line, including the trailing newline.
    ///
    /// Tags with an empty value are left out since line protocol cannot
    /// express them.
    ///
    /// # Errors
    /// Returns an `EncodeError` if the metric cannot be represented.
    pub fn encode(&self) -> Result<String, EncodeError> {
        if self.measurement.is_empty() {
            return Err(EncodeError::EmptyMeasurement);
        }
        if self.fields.is_empty() {
            return Err(EncodeError::NoFields(self.measurement.clone()));
        }
        let nanos = self
            .timestamp
            .timestamp_nanos_opt()
            .ok_or_else(|| EncodeError::TimestampOutOfRange(self.timestamp.to_rfc3339()))?;

        let mut line = String::with_capacity(128);
        escape_into(&mut line, &self.measurement, &[',', ' ']);

        for (key, value) in &self.tags {
            if key.is_empty() {
                return Err(EncodeError::EmptyKey(self.measurement.clone()));
            }
            if value.is_empty() {
                continue;
            }
            line.push(',');
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            escape_into(&mut line, value, &[',', '=', ' ']);
        }

        for (i, (key, value)) in self.fields.iter().enumerate() {
            if key.is_empty() {
                return Err(EncodeError::EmptyKey(self.measurement.clone()));
            }
            line.push(if i == 0 { ' ' } else { ',' });
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            write_field_value(&mut line, key, value)?;
        }

        // Writing to a String never fails
        let _ = writeln!(line, " {nanos}");
        Ok(line)
    }
}

fn escape_into(out: &mut String, raw: &str, specials: &[char]) {
    for c in raw.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{c}' => out.push_str("\\f"),
            c if specials.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}

fn write_field_value(out: &mut String, key: &str, value: &FieldValue) -> Result<(), EncodeError> {
    match value {
        FieldValue::String(s) => {
            out.push('"');
            for c in s.chars() {
                match c {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    '\n' => out.push_str("\\n"),
                    c => out.push(c),
                }
            }
            out.push('"');
        }
        FieldValue::Integer(i) => {
            let _ = write!(out, "{i}i");
        }
        FieldValue::Float(f) => {
            if !f.is_finite() {
                return Err(EncodeError::NonFiniteFloat(key.to_string()));
            }
            let _ = write!(out, "{f}");
        }
        FieldValue::Boolean(b) => {
            let _ = write!(out, "{b}");
        }
    }
    Ok(())
}

/// One `packages` metric per package, tagged with system, name and arch
#[must_use]
pub fn package_metrics(
    timestamp: DateTime<Utc>,
    system: &str,
    packages: &[SoftwarePackage],
) -> Vec<Metric> {
    packages
        .iter()
        .map(|pkg| {
            Metric::new(MEASUREMENT, timestamp)
                .with_tag(SYSTEM_TAG, system)
                .with_tag(PACKAGE_TAG, pkg.name.as_str())
                .with_tag(ARCH_TAG, pkg.arch.as_str())
                .with_field(VERSION_FIELD, pkg.version.as_str())
        })
        .collect()
}

/// A `packages_failed` metric carrying the error message
#[must_use]
pub fn failure_metric(
    timestamp: DateTime<Utc>,
    system: &str,
    error: &dyn std::error::Error,
) -> Metric {
    Metric::new(FAILURE_MEASUREMENT, timestamp)
        .with_tag(SYSTEM_TAG, system)
        .with_field(ERROR_FIELD, error.to_string())
}
