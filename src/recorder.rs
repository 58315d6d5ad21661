//! Span buffer, recorder, and background flush scheduler.
//!
//! The [`Recorder`] is the stateful core of the reporter: it converts each
//! finished span into its wire representation, holds the result in a
//! bounded, mutex-guarded buffer, and periodically (or on demand) drains
//! the buffer into a [`Transport`].
//!
//! The buffer lock is only ever held for queue manipulation; serialization
//! and the network round trip happen outside it, so concurrent `record`
//! calls are never blocked behind a slow collector.

use std::mem;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

use http::{header::CONTENT_TYPE, Method, Request, Uri};
use tracing::{debug, trace, warn};

use crate::model::{self, Endpoint, MilestoneFilter, Span};
use crate::span::FinishedSpan;
use crate::transport::{HttpTransport, Transport};
use crate::{env, Error};

/// Default bound on buffered spans.
pub const DEFAULT_MAX_BUFFERED_SPANS: usize = 1000;
/// Default periodic flush interval.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(2500);
/// Default Zipkin collector host.
pub const DEFAULT_COLLECTOR_HOST: &str = "localhost";
/// Default Zipkin collector port.
pub const DEFAULT_COLLECTOR_PORT: u16 = 9411;

const FLUSH_THREAD_NAME: &str = "zipkin-ot-flush";
const CONTENT_TYPE_THRIFT: &str = "application/x-thrift";

/// Build the collector URL for a host and port.
pub fn collector_url_from_hostport(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/api/v1/spans")
}

/// Buffers finished spans and reports them to a Zipkin collector.
///
/// `record` may be called from any number of threads concurrently with the
/// background scheduler and explicit `flush`/`shutdown` calls. The recorder
/// is fail-silent: delivery problems surface only through the boolean
/// results of `flush`/`shutdown` and verbosity-gated diagnostics, never as
/// errors in the host application's request path.
///
/// Dropping the recorder performs a final `shutdown(true)`, so the host's
/// own cleanup triggers the last best-effort delivery.
#[derive(Debug)]
pub struct Recorder {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    buffer: Mutex<Vec<Span>>,
    capacity: usize,
    local_endpoint: Endpoint,
    milestone_filter: MilestoneFilter,
    collector_url: Uri,
    flush_interval: Duration,
    verbosity: u8,
    transport: Arc<dyn Transport>,
    /// Terminal state flag; one-way `active -> shutdown`.
    is_shutdown: AtomicBool,
    /// Guards the shutdown sequence itself so the final flush runs once.
    shutdown_started: AtomicBool,
    scheduler: Mutex<Option<SchedulerHandle>>,
}

#[derive(Debug)]
struct SchedulerHandle {
    stop: SyncSender<()>,
    handle: thread::JoinHandle<()>,
}

impl Recorder {
    /// Start configuring a recorder for the given service.
    pub fn builder<T: Into<String>>(service_name: T) -> RecorderBuilder {
        RecorderBuilder::new(service_name.into())
    }

    /// Buffer one finished span for delivery.
    ///
    /// A no-op after shutdown. When the buffer is full the span is silently
    /// dropped: new arrivals are rejected rather than evicting older
    /// entries, favoring in-flight trace continuity under overload.
    pub fn record(&self, span: FinishedSpan) {
        if self.inner.is_shutdown.load(Ordering::Relaxed) {
            return;
        }
        self.ensure_scheduler();
        self.inner.record(span);
    }

    /// Immediately report all buffered spans through the default transport.
    ///
    /// Returns `true` when the buffer was empty or the collector accepted
    /// the batch; `false` after shutdown or on delivery failure (in which
    /// case the batch is restored for a later attempt).
    pub fn flush(&self) -> bool {
        if self.inner.is_shutdown.load(Ordering::Relaxed) {
            return false;
        }
        self.ensure_scheduler();
        let transport = Arc::clone(&self.inner.transport);
        self.inner.flush_with(transport.as_ref())
    }

    /// [`flush`](Recorder::flush) through an alternate transport, primarily
    /// a test seam.
    pub fn flush_with(&self, transport: &dyn Transport) -> bool {
        if self.inner.is_shutdown.load(Ordering::Relaxed) {
            return false;
        }
        self.ensure_scheduler();
        self.inner.flush_with(transport)
    }

    /// Start the periodic flush scheduler without recording anything.
    ///
    /// The scheduler otherwise starts lazily on the first `record` or
    /// `flush`; it is never started at construction, so a host that
    /// duplicates the process after constructing the recorder (fork-style)
    /// does not inherit a half-alive background thread. Reconstructing the
    /// recorder after duplication is the host's responsibility.
    pub fn start(&self) {
        if !self.inner.is_shutdown.load(Ordering::Relaxed) {
            self.ensure_scheduler();
        }
    }

    /// Disable the recorder, optionally flushing buffered spans first.
    ///
    /// Idempotent: the first call performs at most one flush attempt and
    /// returns its result; every later call is a no-op returning `false`.
    /// After shutdown, `record` and `flush` are silent no-ops.
    pub fn shutdown(&self, flush: bool) -> bool {
        if self.inner.shutdown_started.swap(true, Ordering::SeqCst) {
            return false;
        }
        let flushed = if flush {
            let transport = Arc::clone(&self.inner.transport);
            self.inner.flush_with(transport.as_ref())
        } else {
            false
        };
        self.inner.is_shutdown.store(true, Ordering::SeqCst);
        if let Ok(mut scheduler) = self.inner.scheduler.lock() {
            if let Some(SchedulerHandle { stop, handle }) = scheduler.take() {
                // An in-progress periodic flush is not interrupted; the stop
                // signal takes effect once it returns.
                let _ = stop.try_send(());
                let _ = handle.join();
            }
        }
        flushed
    }

    /// Idempotently start the flush scheduler. A zero interval disables
    /// periodic flushing entirely (warned about at construction).
    fn ensure_scheduler(&self) {
        if self.inner.flush_interval.is_zero() {
            return;
        }
        let Ok(mut scheduler) = self.inner.scheduler.lock() else {
            return;
        };
        if scheduler.is_some() || self.inner.is_shutdown.load(Ordering::Relaxed) {
            return;
        }
        let (stop, stop_signal) = sync_channel::<()>(1);
        let weak = Arc::downgrade(&self.inner);
        let interval = self.inner.flush_interval;
        let spawned = thread::Builder::new()
            .name(FLUSH_THREAD_NAME.to_string())
            .spawn(move || run_scheduler(&weak, &stop_signal, interval));
        match spawned {
            Ok(handle) => *scheduler = Some(SchedulerHandle { stop, handle }),
            Err(err) => warn!(
                target: "zipkin_ot_reporter",
                "failed to spawn flush thread: {err}"
            ),
        }
    }

    #[cfg(test)]
    fn buffered(&self) -> usize {
        self.inner.buffer.lock().map(|buffer| buffer.len()).unwrap_or(0)
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        let _ = self.shutdown(true);
    }
}

/// Periodic flush loop: sleep for one interval, flush, repeat until stopped
/// or the recorder is gone.
fn run_scheduler(
    inner: &Weak<Inner>,
    stop_signal: &std::sync::mpsc::Receiver<()>,
    interval: Duration,
) {
    loop {
        match stop_signal.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                let Some(inner) = inner.upgrade() else { break };
                if inner.is_shutdown.load(Ordering::Relaxed) {
                    break;
                }
                let transport = Arc::clone(&inner.transport);
                inner.flush_with(transport.as_ref());
            }
            // Stop requested, or the recorder was dropped.
            _ => break,
        }
    }
}

impl Inner {
    fn record(&self, span: FinishedSpan) {
        // Pre-check before encoding: a span that will be dropped anyway is
        // not worth converting, and the lock scope stays minimal. The drop
        // decision is re-checked after encoding since a flush may race in
        // between.
        {
            let Ok(buffer) = self.buffer.lock() else { return };
            if buffer.len() >= self.capacity {
                if self.verbosity >= 2 {
                    trace!(
                        target: "zipkin_ot_reporter",
                        "buffer full, dropping span {:?}",
                        span.operation_name
                    );
                }
                return;
            }
        }
        let encoded = model::encode(&span, &self.local_endpoint, self.milestone_filter);
        let Ok(mut buffer) = self.buffer.lock() else { return };
        if buffer.len() < self.capacity {
            buffer.push(encoded);
        }
    }

    fn flush_with(&self, transport: &dyn Transport) -> bool {
        if self.is_shutdown.load(Ordering::Relaxed) {
            return false;
        }
        let batch = {
            let Ok(mut buffer) = self.buffer.lock() else { return false };
            mem::take(&mut *buffer)
        };
        if batch.is_empty() {
            return true;
        }
        if self.verbosity >= 2 {
            trace!(
                target: "zipkin_ot_reporter",
                spans = batch.len(),
                "sending report to collector"
            );
        }
        let body = match model::serialize(&batch) {
            Ok(body) => body,
            Err(err) => {
                warn!(target: "zipkin_ot_reporter", "failed to serialize batch: {err}");
                self.restore(batch);
                return false;
            }
        };
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.collector_url.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_THRIFT)
            .body(body);
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                warn!(target: "zipkin_ot_reporter", "failed to build report request: {err}");
                self.restore(batch);
                return false;
            }
        };
        match transport.send(request) {
            Ok(response) if response.status().is_success() => {
                if self.verbosity >= 2 {
                    trace!(
                        target: "zipkin_ot_reporter",
                        status = response.status().as_u16(),
                        "received response from collector"
                    );
                }
                true
            }
            Ok(response) => {
                if self.verbosity >= 1 {
                    debug!(
                        target: "zipkin_ot_reporter",
                        status = response.status().as_u16(),
                        "collector rejected report"
                    );
                }
                self.restore(batch);
                false
            }
            Err(err) => {
                if self.verbosity >= 1 {
                    debug!(
                        target: "zipkin_ot_reporter",
                        "caught exception during report: {err}"
                    );
                }
                self.restore(batch);
                false
            }
        }
    }

    /// Move an undelivered batch back into the buffer, ahead of anything
    /// recorded since. When the combined length exceeds capacity the most
    /// recent entries win: under a sustained outage, older undelivered
    /// spans are sacrificed first.
    fn restore(&self, mut batch: Vec<Span>) {
        if self.is_shutdown.load(Ordering::Relaxed) {
            return;
        }
        let Ok(mut buffer) = self.buffer.lock() else { return };
        if buffer.len() >= self.capacity {
            return;
        }
        batch.append(&mut buffer);
        let overflow = batch.len().saturating_sub(self.capacity);
        if overflow > 0 {
            batch.drain(..overflow);
        }
        *buffer = batch;
    }
}

/// Configuration for a [`Recorder`], mirroring the reporter's recognized
/// options.
#[derive(Debug)]
pub struct RecorderBuilder {
    service_name: String,
    collector_host: String,
    collector_port: u16,
    collector_endpoint: Option<String>,
    service_addr: Option<SocketAddr>,
    max_buffered_spans: usize,
    flush_interval: Option<Duration>,
    verbosity: u8,
    included_milestones: Vec<String>,
    certificate_verification: bool,
    transport: Option<Arc<dyn Transport>>,
}

impl RecorderBuilder {
    fn new(service_name: String) -> Self {
        RecorderBuilder {
            service_name,
            collector_host: DEFAULT_COLLECTOR_HOST.to_string(),
            collector_port: DEFAULT_COLLECTOR_PORT,
            collector_endpoint: None,
            service_addr: None,
            max_buffered_spans: DEFAULT_MAX_BUFFERED_SPANS,
            flush_interval: None,
            verbosity: 0,
            included_milestones: vec!["client".to_string(), "server".to_string()],
            certificate_verification: true,
            transport: None,
        }
    }

    /// Assign the collector host to report to.
    pub fn with_collector_host<T: Into<String>>(mut self, host: T) -> Self {
        self.collector_host = host.into();
        self
    }

    /// Assign the collector port to report to.
    pub fn with_collector_port(mut self, port: u16) -> Self {
        self.collector_port = port;
        self
    }

    /// Assign a full collector endpoint URL, overriding host and port.
    pub fn with_collector_endpoint<T: Into<String>>(mut self, endpoint: T) -> Self {
        self.collector_endpoint = Some(endpoint.into());
        self
    }

    /// Assign the address advertised in this service's endpoint. Without
    /// one, the local host address is resolved best-effort.
    pub fn with_service_address(mut self, addr: SocketAddr) -> Self {
        self.service_addr = Some(addr);
        self
    }

    /// Bound the number of buffered spans.
    pub fn with_max_buffered_spans(mut self, max: usize) -> Self {
        self.max_buffered_spans = max;
        self
    }

    /// Assign the periodic flush interval. Zero disables periodic flushing;
    /// spans are then only reported on explicit `flush` or shutdown.
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /// Raise the diagnostic verbosity (0 = quiet, 1 = delivery failures,
    /// 2 = per-report detail).
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Restrict which call sides this process's spans describe; accepts
    /// `"client"` and `"server"`.
    pub fn with_included_milestones<I, S>(mut self, milestones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_milestones = milestones.into_iter().map(Into::into).collect();
        self
    }

    /// Control TLS certificate verification for the default transport.
    pub fn with_certificate_verification(mut self, verify: bool) -> Self {
        self.certificate_verification = verify;
        self
    }

    /// Assign an alternate transport implementation.
    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Construct the recorder, failing fast on configuration errors.
    pub fn build(self) -> Result<Recorder, Error> {
        let milestone_filter = MilestoneFilter::from_names(&self.included_milestones)?;
        let url = match self.collector_endpoint {
            Some(endpoint) => endpoint,
            None => env::get_endpoint().unwrap_or_else(|| {
                collector_url_from_hostport(&self.collector_host, self.collector_port)
            }),
        };
        let collector_url: Uri = url.parse()?;
        let flush_interval = self
            .flush_interval
            .or_else(env::get_flush_interval)
            .unwrap_or(DEFAULT_FLUSH_INTERVAL);
        if flush_interval.is_zero() {
            warn!(
                target: "zipkin_ot_reporter",
                "flush interval is zero; spans will only be reported on explicit flush"
            );
        }
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.certificate_verification)?),
        };
        let local_endpoint = Endpoint::new(self.service_name, self.service_addr);
        Ok(Recorder {
            inner: Arc::new(Inner {
                buffer: Mutex::new(Vec::new()),
                capacity: self.max_buffered_spans,
                local_endpoint,
                milestone_filter,
                collector_url,
                flush_interval,
                verbosity: self.verbosity,
                transport,
                is_shutdown: AtomicBool::new(false),
                shutdown_started: AtomicBool::new(false),
                scheduler: Mutex::new(None),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::deserialize;
    use crate::transport::testing::{CapturingTransport, FailingTransport, ServerErrorTransport};
    use std::time::SystemTime;

    fn dummy_span(i: u64) -> FinishedSpan {
        FinishedSpan::builder()
            .operation_name(i.to_string())
            .trace_id(1000 + i)
            .span_id(2000 + i)
            .start_time(SystemTime::now())
            .build()
    }

    fn test_recorder(transport: impl Transport + 'static) -> Recorder {
        Recorder::builder("rust/recorder_test")
            .with_collector_port(9411)
            .with_flush_interval(Duration::ZERO)
            .with_verbosity(1)
            .with_transport(transport)
            .build()
            .expect("valid test config")
    }

    fn delivered_names(transport: &CapturingTransport) -> Vec<String> {
        transport
            .bodies()
            .iter()
            .flat_map(|body| deserialize(body).expect("decodable payload"))
            .map(|span| span.name)
            .collect()
    }

    #[test]
    fn reports_spans_in_order() {
        let transport = CapturingTransport::default();
        let recorder = test_recorder(transport.clone());
        for i in 0..10 {
            recorder.record(dummy_span(i));
        }
        assert!(recorder.flush());
        let names: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(delivered_names(&transport), names);
    }

    #[test]
    fn report_request_shape() {
        temp_env::with_var("ZIPKIN_OT_COLLECTOR_ENDPOINT", None::<&str>, || {
            let transport = CapturingTransport::default();
            let recorder = test_recorder(transport.clone());
            recorder.record(dummy_span(0));
            assert!(recorder.flush());

            let requests = transport.requests.lock().unwrap();
            let request = &requests[0];
            assert_eq!(request.method(), Method::POST);
            assert_eq!(
                request.uri().to_string(),
                "http://localhost:9411/api/v1/spans"
            );
            assert_eq!(
                request.headers().get(CONTENT_TYPE).unwrap(),
                "application/x-thrift"
            );
        });
    }

    #[test]
    fn stress_spans() {
        let transport = CapturingTransport::default();
        let recorder = test_recorder(transport.clone());
        for i in 0..1000 {
            recorder.record(dummy_span(i));
        }
        assert!(recorder.flush());
        let names = delivered_names(&transport);
        assert_eq!(names.len(), 1000);
        for (i, name) in names.iter().enumerate() {
            assert_eq!(name, &i.to_string());
        }
    }

    #[test]
    fn buffer_limits() {
        let transport = CapturingTransport::default();
        let recorder = Recorder::builder("rust/recorder_test")
            .with_max_buffered_spans(88)
            .with_flush_interval(Duration::ZERO)
            .with_transport(transport.clone())
            .build()
            .unwrap();

        assert_eq!(recorder.buffered(), 0);
        for i in 0..10_000 {
            recorder.record(dummy_span(i));
        }
        assert_eq!(recorder.buffered(), 88);
        assert!(recorder.flush());

        // One payload, decoding to exactly the first 88 spans recorded:
        // new arrivals are dropped when the buffer is full.
        let bodies = transport.bodies();
        assert_eq!(bodies.len(), 1);
        let spans = deserialize(&bodies[0]).unwrap();
        assert_eq!(spans.len(), 88);
        for (i, span) in spans.iter().enumerate() {
            assert_eq!(span.name, i.to_string());
        }
    }

    #[test]
    fn empty_flush_is_success_without_requests() {
        let transport = CapturingTransport::default();
        let recorder = test_recorder(transport.clone());
        assert!(recorder.flush());
        assert!(transport.bodies().is_empty());
    }

    #[test]
    fn send_spans_after_shutdown() {
        let transport = CapturingTransport::default();
        let recorder = test_recorder(transport.clone());

        for i in 0..10 {
            recorder.record(dummy_span(i));
        }
        assert!(recorder.flush());
        assert_eq!(delivered_names(&transport).len(), 10);

        transport.requests.lock().unwrap().clear();
        assert!(recorder.shutdown(true));

        // Nothing gets through once shut down.
        for i in 0..10 {
            recorder.record(dummy_span(i));
        }
        assert_eq!(recorder.buffered(), 0);
        assert!(!recorder.flush());
        assert!(transport.bodies().is_empty());
    }

    #[test]
    fn shutdown_twice() {
        let recorder = test_recorder(CapturingTransport::default());
        assert!(recorder.shutdown(true));
        assert!(!recorder.shutdown(true));
    }

    #[test]
    fn shutdown_without_flush_skips_delivery() {
        let transport = CapturingTransport::default();
        let recorder = test_recorder(transport.clone());
        recorder.record(dummy_span(0));
        assert!(!recorder.shutdown(false));
        assert!(transport.bodies().is_empty());
    }

    #[test]
    fn failed_flush_restores_spans_in_order() {
        let failing = FailingTransport::default();
        let capturing = CapturingTransport::default();
        let recorder = test_recorder(capturing.clone());

        for i in 0..10 {
            recorder.record(dummy_span(i));
        }
        assert!(!recorder.flush_with(&failing));
        assert_eq!(*failing.attempts.lock().unwrap(), 1);
        assert_eq!(recorder.buffered(), 10);

        // A later successful flush delivers the restored batch unchanged.
        assert!(recorder.flush());
        let names: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(delivered_names(&capturing), names);
    }

    #[test]
    fn non_2xx_response_is_failure() {
        let recorder = test_recorder(ServerErrorTransport);
        recorder.record(dummy_span(0));
        assert!(!recorder.flush());
        assert_eq!(recorder.buffered(), 1);
    }

    #[test]
    fn restore_keeps_newest_on_overflow() {
        let failing = FailingTransport::default();
        let capturing = CapturingTransport::default();
        let recorder = Recorder::builder("rust/recorder_test")
            .with_max_buffered_spans(10)
            .with_flush_interval(Duration::ZERO)
            .with_transport(capturing.clone())
            .build()
            .unwrap();

        for i in 0..10 {
            recorder.record(dummy_span(i));
        }
        assert!(!recorder.flush_with(&failing));
        // Newer spans recorded after the failed attempt displace the oldest
        // undelivered ones.
        for i in 10..15 {
            recorder.record(dummy_span(i));
        }
        assert!(!recorder.flush_with(&failing));
        assert_eq!(recorder.buffered(), 10);

        assert!(recorder.flush());
        let names: Vec<String> = (5..15).map(|i| i.to_string()).collect();
        assert_eq!(delivered_names(&capturing), names);
    }

    #[test]
    fn drop_performs_final_flush() {
        let transport = CapturingTransport::default();
        {
            let recorder = test_recorder(transport.clone());
            recorder.record(dummy_span(0));
        }
        assert_eq!(delivered_names(&transport), vec!["0".to_string()]);
    }

    #[test]
    fn periodic_scheduler_flushes() {
        let transport = CapturingTransport::default();
        let recorder = Recorder::builder("rust/recorder_test")
            .with_flush_interval(Duration::from_millis(50))
            .with_transport(transport.clone())
            .build()
            .unwrap();
        recorder.record(dummy_span(0));
        std::thread::sleep(Duration::from_millis(500));
        assert_eq!(delivered_names(&transport), vec!["0".to_string()]);
        assert!(recorder.shutdown(true));
    }

    #[test]
    fn concurrent_recording_stays_bounded() {
        let transport = CapturingTransport::default();
        let recorder = std::sync::Arc::new(
            Recorder::builder("rust/recorder_test")
                .with_max_buffered_spans(64)
                .with_flush_interval(Duration::ZERO)
                .with_transport(transport.clone())
                .build()
                .unwrap(),
        );
        let mut handles = Vec::new();
        for t in 0..4 {
            let recorder = std::sync::Arc::clone(&recorder);
            handles.push(std::thread::spawn(move || {
                for i in 0..500 {
                    recorder.record(dummy_span(t * 1000 + i));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(recorder.buffered(), 64);
        assert!(recorder.flush());
        assert_eq!(delivered_names(&transport).len(), 64);
    }

    #[test]
    fn invalid_milestones_fail_at_construction() {
        let err = Recorder::builder("rust/recorder_test")
            .with_included_milestones(["proxy"])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMilestone(name) if name == "proxy"));

        let err = Recorder::builder("rust/recorder_test")
            .with_included_milestones(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::EmptyMilestones));
    }

    #[test]
    fn invalid_collector_endpoint_fails_at_construction() {
        let result = Recorder::builder("rust/recorder_test")
            .with_collector_endpoint("not a url")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn env_endpoint_override() {
        temp_env::with_var(
            "ZIPKIN_OT_COLLECTOR_ENDPOINT",
            Some("http://zipkin.internal:9999/api/v1/spans"),
            || {
                let transport = CapturingTransport::default();
                let recorder = test_recorder(transport.clone());
                recorder.record(dummy_span(0));
                assert!(recorder.flush());
                let requests = transport.requests.lock().unwrap();
                assert_eq!(
                    requests[0].uri().to_string(),
                    "http://zipkin.internal:9999/api/v1/spans"
                );
            },
        );
    }
}
