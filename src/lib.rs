//! Reports finished spans to a [Zipkin] collector over the v1 thrift
//! protocol.
//!
//! The entry point is the [`Recorder`]: instrumentation hands it finished
//! spans, and a bounded in-memory buffer plus a background flush thread take
//! care of batching, encoding, and HTTP delivery. Delivery is best-effort
//! and fail-silent; a broken collector never surfaces as an error in the
//! instrumented application's request path.
//!
//! [Zipkin]: https://zipkin.io/
//!
//! # Quickstart
//!
//! ```no_run
//! use std::time::{Duration, SystemTime};
//! use zipkin_ot_reporter::{FinishedSpan, Recorder};
//!
//! # fn main() -> Result<(), zipkin_ot_reporter::Error> {
//! let recorder = Recorder::builder("checkout-service")
//!     .with_collector_host("zipkin.internal")
//!     .with_collector_port(9411)
//!     .build()?;
//!
//! let start = SystemTime::now();
//! recorder.record(
//!     FinishedSpan::builder()
//!         .operation_name("charge-card")
//!         .trace_id(0x17133d482ba4f605)
//!         .span_id(0x27a2d81bcbdb443f)
//!         .start_time(start)
//!         .duration(Some(Duration::from_millis(42)))
//!         .build(),
//! );
//!
//! // Buffered spans flush periodically in the background; shut down to
//! // deliver whatever remains.
//! recorder.shutdown(true);
//! # Ok(())
//! # }
//! ```
//!
//! # Collector configuration
//!
//! The collector endpoint defaults to `http://localhost:9411/api/v1/spans`
//! and can be overridden per-builder or through the
//! `ZIPKIN_OT_COLLECTOR_ENDPOINT` environment variable; the flush interval
//! likewise through `ZIPKIN_OT_FLUSH_INTERVAL` (milliseconds).
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod env;
pub mod id;
pub mod model;
mod recorder;
mod span;
mod transport;

pub use recorder::{
    collector_url_from_hostport, Recorder, RecorderBuilder, DEFAULT_COLLECTOR_HOST,
    DEFAULT_COLLECTOR_PORT, DEFAULT_FLUSH_INTERVAL, DEFAULT_MAX_BUFFERED_SPANS,
};
pub use span::{FinishedSpan, LogRecord, Value};
pub use transport::{HttpTransport, Transport, TransportError};

pub use model::MilestoneFilter;

use thiserror::Error as ThisError;

/// Configuration and encoding failures surfaced by this crate.
///
/// Runtime delivery problems never appear here; they are reported through
/// the boolean results of [`Recorder::flush`] and [`Recorder::shutdown`].
#[derive(ThisError, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A milestone name other than `"client"` or `"server"`.
    #[error("unsupported milestone {0:?}, expected \"client\" or \"server\"")]
    InvalidMilestone(String),

    /// An empty milestone set, which would suppress every span.
    #[error("at least one milestone must be included")]
    EmptyMilestones,

    /// An identifier string that is not 64-bit hex.
    #[error("malformed identifier: {0}")]
    InvalidIdentifier(#[from] std::num::ParseIntError),

    /// A collector endpoint that does not parse as a URI.
    #[error("invalid collector endpoint: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// A thrift-level encoding or decoding failure.
    #[error("thrift codec error: {0}")]
    Codec(#[from] thrift::Error),

    /// Bytes that do not frame a list of span structs.
    #[error("malformed report payload: {0}")]
    MalformedPayload(String),

    /// Transport construction failures and other leaf errors.
    #[error("{0}")]
    Other(String),
}
