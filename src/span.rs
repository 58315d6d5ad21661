//! Finished-span input model.
//!
//! The instrumentation layer hands the reporter immutable records of
//! completed work. The reporter never mutates them; each is consumed once
//! when it is encoded into the wire representation.

use std::borrow::Cow;
use std::fmt;
use std::time::{Duration, SystemTime};

use typed_builder::TypedBuilder;

/// Substituted when a log payload cannot be rendered as JSON.
pub(crate) const ENCODING_ERROR_PLACEHOLDER: &str = "(encoding error)";

/// A completed span as produced by the instrumentation layer.
///
/// A span with no duration is still open at report time and yields only its
/// start milestone on the wire.
#[derive(Clone, Debug, TypedBuilder)]
pub struct FinishedSpan {
    /// Operation name of the unit of work.
    #[builder(setter(into))]
    pub operation_name: String,
    /// Identifier shared by all spans of one trace.
    pub trace_id: u64,
    /// Identifier of this span.
    pub span_id: u64,
    /// Identifier of the parent span, if any.
    #[builder(default)]
    pub parent_id: Option<u64>,
    /// Wall-clock start of the span.
    pub start_time: SystemTime,
    /// Elapsed time, unset while the span is still open.
    #[builder(default)]
    pub duration: Option<Duration>,
    /// Ordered tag set.
    #[builder(default)]
    pub tags: Vec<(String, Value)>,
    /// Ordered log entries.
    #[builder(default)]
    pub logs: Vec<LogRecord>,
}

/// A timestamped log entry attached to a span.
#[derive(Clone, Debug, TypedBuilder)]
pub struct LogRecord {
    /// When the event occurred.
    pub timestamp: SystemTime,
    /// Short, stable event name.
    #[builder(default, setter(strip_option, into))]
    pub event: Option<String>,
    /// Arbitrary structured payload, rendered as JSON on the wire.
    #[builder(default, setter(strip_option))]
    pub payload: Option<serde_json::Value>,
}

/// Closed set of scalar tag values.
///
/// Anything the instrumentation layer produces must fit one of these shapes;
/// each has a defined, infallible string form for transmission.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// String values.
    String(String),
    /// Signed integer values.
    I64(i64),
    /// Floating point values.
    F64(f64),
    /// Boolean values.
    Bool(bool),
    /// Opaque bytes, passed through unmodified.
    Bytes(Vec<u8>),
}

impl Value {
    /// Render the value as transmissible bytes. Never fails: strings are
    /// UTF-8 (with replacement applied when byte values are interpreted as
    /// text elsewhere), everything else goes through its canonical display
    /// form.
    pub(crate) fn coerce(&self) -> Vec<u8> {
        match self {
            Value::Bytes(bytes) => bytes.clone(),
            Value::String(s) => s.clone().into_bytes(),
            Value::I64(i) => i.to_string().into_bytes(),
            Value::F64(f) => f.to_string().into_bytes(),
            Value::Bool(b) => b.to_string().into_bytes(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::I64(i) => write!(f, "{i}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(s: Cow<'_, str>) -> Self {
        Value::String(s.into_owned())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::I64(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::F64(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

/// Render a structured log payload as a JSON string, substituting a fixed
/// placeholder if serialization fails.
pub(crate) fn render_payload(payload: &serde_json::Value) -> String {
    match payload {
        // Bare strings keep their text form rather than a quoted JSON literal.
        serde_json::Value::String(s) => s.clone(),
        other => serde_json::to_string(other)
            .unwrap_or_else(|_| ENCODING_ERROR_PLACEHOLDER.to_string()),
    }
}
