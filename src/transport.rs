//! HTTP delivery of encoded span batches.
//!
//! The [`Transport`] trait is the recorder's only I/O seam: the default
//! implementation POSTs to a Zipkin collector with a blocking client, and
//! tests substitute in-memory implementations for deterministic behavior.

use std::fmt::Debug;

use http::{Request, Response};
use tracing::warn;

use crate::Error;

/// Opaque transport-level failure. Any error is treated the same way by the
/// recorder: log, restore the batch, report the flush as failed.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A minimal interface for sending an encoded batch over HTTP.
///
/// Implementations receive the fully-formed request (collector URL, content
/// type header, serialized body) and return the response status; any
/// non-2xx status or transport error counts as a failed delivery.
pub trait Transport: Debug + Send + Sync {
    /// Send the request, returning the collector's response.
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError>;
}

/// Default transport over a blocking HTTP client.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build the default transport. Disabling certificate verification is
    /// honored but loudly discouraged, matching the reporter's configuration
    /// surface.
    pub fn new(certificate_verification: bool) -> Result<Self, Error> {
        if !certificate_verification {
            warn!(
                target: "zipkin_ot_reporter",
                "SSL certificate verification turned off; all collector requests are unverified"
            );
        }
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(!certificate_verification)
            .build()
            .map_err(|err| Error::Other(err.to_string()))?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransportError> {
        let request = reqwest::blocking::Request::try_from(request)?;
        let mut response = self.client.execute(request)?;
        let status = response.status();
        let mut body = Vec::new();
        response.copy_to(&mut body)?;
        Ok(Response::builder().status(status).body(body)?)
    }
}
