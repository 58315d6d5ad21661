//! Wire model for the Zipkin v1 collector.
//!
//! [`encode`] is a pure function from a finished span to its wire
//! representation: same inputs, byte-identical output, which is what makes
//! retried deliveries idempotent.

use std::time::{Duration, SystemTime};

use tracing::trace;

pub(crate) mod annotation;
pub(crate) mod endpoint;
mod span;

pub use annotation::{Annotation, AnnotationType, BinaryAnnotation};
pub use endpoint::Endpoint;
pub use span::{deserialize, serialize, Span};

use crate::id;
use crate::span::{render_payload, FinishedSpan};
use crate::Error;

/// Milestone label: client sent the request.
pub const CLIENT_SEND: &str = "cs";
/// Milestone label: client received the response.
pub const CLIENT_RECV: &str = "cr";
/// Milestone label: server received the request.
pub const SERVER_RECV: &str = "sr";
/// Milestone label: server sent the response.
pub const SERVER_SEND: &str = "ss";

/// Log event that adjusts which milestone annotations a single span emits.
/// Its payload names the included sides; the log itself is not transmitted.
pub const MILESTONE_CONTROL_EVENT: &str = "zipkin_ot.milestones";

/// Log event names above this size are truncated rather than rejected.
const MAX_LOG_EVENT_BYTES: usize = 1024;
/// Length oversized event names are truncated to.
const TRUNCATED_LOG_EVENT_LEN: usize = 984;

/// Which sides of a call a span's milestone annotations describe.
///
/// A single-process span can represent a full both-sided call, or only the
/// client or server half when the process is just one party to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MilestoneFilter {
    client: bool,
    server: bool,
}

impl MilestoneFilter {
    /// Both sides, the default for in-process spans.
    pub const BOTH: MilestoneFilter = MilestoneFilter {
        client: true,
        server: true,
    };
    /// Client-side milestones only (`cs`/`cr`).
    pub const CLIENT: MilestoneFilter = MilestoneFilter {
        client: true,
        server: false,
    };
    /// Server-side milestones only (`sr`/`ss`).
    pub const SERVER: MilestoneFilter = MilestoneFilter {
        client: false,
        server: true,
    };

    /// Parse a configured milestone set. Unknown names and the empty set are
    /// configuration errors, surfaced at construction rather than first
    /// flush.
    pub fn from_names<I, S>(names: I) -> Result<MilestoneFilter, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = MilestoneFilter {
            client: false,
            server: false,
        };
        for name in names {
            match name.as_ref() {
                "client" => filter.client = true,
                "server" => filter.server = true,
                other => return Err(Error::InvalidMilestone(other.to_string())),
            }
        }
        if filter == (MilestoneFilter { client: false, server: false }) {
            return Err(Error::EmptyMilestones);
        }
        Ok(filter)
    }
}

/// Encode a finished span into its wire representation.
///
/// Tags become binary annotations; log entries become `event@timestamp`
/// binary annotations (except the milestone control event, which only
/// adjusts this span's filter); milestone annotations are synthesized from
/// the span's start time and duration.
pub(crate) fn encode(
    span: &FinishedSpan,
    endpoint: &Endpoint,
    default_filter: MilestoneFilter,
) -> Span {
    let mut filter = default_filter;
    let host = Some(endpoint.clone());
    let start_micros = micros_since_epoch(span.start_time);

    let mut binary_annotations: Vec<BinaryAnnotation> = span
        .tags
        .iter()
        .map(|(key, value)| {
            BinaryAnnotation::builder()
                .key(key.clone())
                .value(value.coerce())
                .host(host.clone())
                .build()
        })
        .collect();

    for log in &span.logs {
        let timestamp = micros_since_epoch(log.timestamp);
        let event = log.event.as_deref().unwrap_or("");
        if event == MILESTONE_CONTROL_EVENT {
            match log.payload.as_ref().and_then(filter_from_payload) {
                Some(requested) => filter = requested,
                None => trace!(
                    target: "zipkin_ot_reporter",
                    "ignoring unrecognized milestone control payload"
                ),
            }
            continue;
        }
        let event = truncate_event(event);
        let value = log
            .payload
            .as_ref()
            .map(render_payload)
            .unwrap_or_default()
            .into_bytes();
        binary_annotations.push(
            BinaryAnnotation::builder()
                .key(format!("{event}@{timestamp}"))
                .value(value)
                .host(host.clone())
                .build(),
        );
    }

    let mut annotations = Vec::with_capacity(4);
    if filter.client {
        annotations.push(milestone(start_micros, CLIENT_SEND, &host));
    }
    if filter.server {
        annotations.push(milestone(start_micros, SERVER_RECV, &host));
    }
    // A still-open span has no end milestones yet.
    if let Some(duration) = span.duration {
        let end_micros = start_micros.saturating_add(duration.as_micros() as i64);
        if filter.server {
            annotations.push(milestone(end_micros, SERVER_SEND, &host));
        }
        if filter.client {
            annotations.push(milestone(end_micros, CLIENT_RECV, &host));
        }
    }

    Span::builder()
        .trace_id(id::signed_of(span.trace_id))
        .name(span.operation_name.clone())
        .id(id::signed_of(span.span_id))
        .parent_id(span.parent_id.map(id::signed_of))
        .annotations(annotations)
        .binary_annotations(binary_annotations)
        .build()
}

fn milestone(timestamp: i64, label: &str, host: &Option<Endpoint>) -> Annotation {
    Annotation::builder()
        .timestamp(timestamp)
        .value(label)
        .host(host.clone())
        .build()
}

/// Accepts `"client"`, `"server"`, a comma-separated combination, or a JSON
/// array of those names. Anything else leaves the filter unchanged.
fn filter_from_payload(payload: &serde_json::Value) -> Option<MilestoneFilter> {
    let names: Vec<String> = match payload {
        serde_json::Value::String(s) => {
            s.split(',').map(|name| name.trim().to_string()).collect()
        }
        serde_json::Value::Array(values) => values
            .iter()
            .map(|value| value.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?,
        _ => return None,
    };
    MilestoneFilter::from_names(&names).ok()
}

/// Oversized event names are truncated, never rejected; log data must not be
/// able to fail a `record` call.
fn truncate_event(event: &str) -> &str {
    if event.len() <= MAX_LOG_EVENT_BYTES {
        return event;
    }
    let mut end = TRUNCATED_LOG_EVENT_LEN;
    while !event.is_char_boundary(end) {
        end -= 1;
    }
    &event[..end]
}

fn micros_since_epoch(time: SystemTime) -> i64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_micros() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::{FinishedSpan, LogRecord, Value};
    use std::time::{Duration, SystemTime};

    fn test_endpoint() -> Endpoint {
        Endpoint::builder().service_name("test-service").port(8080).build()
    }

    fn base_span() -> FinishedSpan {
        FinishedSpan::builder()
            .operation_name("fetch")
            .trace_id(0x17133d482ba4f605)
            .span_id(0xb6dbb1c2b362bf51)
            .parent_id(Some(7))
            .start_time(SystemTime::UNIX_EPOCH + Duration::from_secs(1_502_787_600))
            .duration(Some(Duration::from_micros(150_000)))
            .build()
    }

    fn labels(span: &Span) -> Vec<&str> {
        span.annotations.iter().map(|a| a.value.as_str()).collect()
    }

    #[test]
    fn closed_span_emits_full_milestone_pairs() {
        let encoded = encode(&base_span(), &test_endpoint(), MilestoneFilter::BOTH);
        assert_eq!(labels(&encoded), vec!["cs", "sr", "ss", "cr"]);
        assert_eq!(encoded.annotations[0].timestamp, 1_502_787_600_000_000);
        assert_eq!(encoded.annotations[3].timestamp, 1_502_787_600_150_000);
    }

    #[test]
    fn open_span_emits_only_start_milestones() {
        let mut span = base_span();
        span.duration = None;
        let encoded = encode(&span, &test_endpoint(), MilestoneFilter::BOTH);
        assert_eq!(labels(&encoded), vec!["cs", "sr"]);
    }

    #[test]
    fn client_filter_keeps_client_side_only() {
        let encoded = encode(&base_span(), &test_endpoint(), MilestoneFilter::CLIENT);
        assert_eq!(labels(&encoded), vec!["cs", "cr"]);
    }

    #[test]
    fn identifiers_are_signed_on_the_wire() {
        let encoded = encode(&base_span(), &test_endpoint(), MilestoneFilter::BOTH);
        assert_eq!(encoded.trace_id, 1662740067609015813);
        assert_eq!(encoded.id, -5270423489115668655);
        assert_eq!(encoded.parent_id, Some(7));
    }

    #[test]
    fn tags_become_binary_annotations_in_order() {
        let mut span = base_span();
        span.tags = vec![
            ("http.url".to_string(), Value::from("http://example.com/")),
            ("retries".to_string(), Value::from(3i64)),
        ];
        let encoded = encode(&span, &test_endpoint(), MilestoneFilter::BOTH);
        assert_eq!(encoded.binary_annotations[0].key, "http.url");
        assert_eq!(encoded.binary_annotations[0].value, b"http://example.com/");
        assert_eq!(encoded.binary_annotations[1].key, "retries");
        assert_eq!(encoded.binary_annotations[1].value, b"3");
    }

    #[test]
    fn logs_become_event_at_timestamp_annotations() {
        let mut span = base_span();
        span.logs = vec![LogRecord::builder()
            .timestamp(SystemTime::UNIX_EPOCH + Duration::from_micros(5))
            .event("cache_miss")
            .payload(serde_json::json!({"key": "user:1"}))
            .build()];
        let encoded = encode(&span, &test_endpoint(), MilestoneFilter::BOTH);
        assert_eq!(encoded.binary_annotations[0].key, "cache_miss@5");
        assert_eq!(encoded.binary_annotations[0].value, b"{\"key\":\"user:1\"}");
    }

    #[test]
    fn control_log_rescopes_this_span_only() {
        let mut span = base_span();
        span.logs = vec![LogRecord::builder()
            .timestamp(SystemTime::UNIX_EPOCH)
            .event(MILESTONE_CONTROL_EVENT)
            .payload(serde_json::json!("server"))
            .build()];
        let encoded = encode(&span, &test_endpoint(), MilestoneFilter::BOTH);
        assert_eq!(labels(&encoded), vec!["sr", "ss"]);
        // The control log itself is not transmitted.
        assert!(encoded.binary_annotations.is_empty());
    }

    #[test]
    fn unrecognized_control_payload_is_ignored() {
        let mut span = base_span();
        span.logs = vec![LogRecord::builder()
            .timestamp(SystemTime::UNIX_EPOCH)
            .event(MILESTONE_CONTROL_EVENT)
            .payload(serde_json::json!(42))
            .build()];
        let encoded = encode(&span, &test_endpoint(), MilestoneFilter::CLIENT);
        assert_eq!(labels(&encoded), vec!["cs", "cr"]);
    }

    #[test]
    fn oversized_event_names_are_truncated() {
        let mut span = base_span();
        span.logs = vec![LogRecord::builder()
            .timestamp(SystemTime::UNIX_EPOCH)
            .event("e".repeat(5000))
            .build()];
        let encoded = encode(&span, &test_endpoint(), MilestoneFilter::BOTH);
        let key = &encoded.binary_annotations[0].key;
        assert!(key.starts_with(&"e".repeat(984)));
        assert_eq!(key.len(), 984 + "@0".len());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 2-byte chars around the truncation point must not split.
        let event = "é".repeat(600);
        let truncated = truncate_event(&event);
        assert!(truncated.len() <= TRUNCATED_LOG_EVENT_LEN);
        assert!(event.starts_with(truncated));
    }

    #[test]
    fn encode_is_deterministic() {
        let span = base_span();
        let endpoint = test_endpoint();
        let first = encode(&span, &endpoint, MilestoneFilter::BOTH);
        let second = encode(&span, &endpoint, MilestoneFilter::BOTH);
        assert_eq!(first, second);
        assert_eq!(
            serialize(&[first]).unwrap(),
            serialize(&[second]).unwrap()
        );
    }

    #[test]
    fn filter_parsing() {
        assert_eq!(
            MilestoneFilter::from_names(["client", "server"]).unwrap(),
            MilestoneFilter::BOTH
        );
        assert_eq!(
            MilestoneFilter::from_names(["client"]).unwrap(),
            MilestoneFilter::CLIENT
        );
        assert!(MilestoneFilter::from_names(["proxy"]).is_err());
        assert!(MilestoneFilter::from_names(Vec::<&str>::new()).is_err());
    }
}
