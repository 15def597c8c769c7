//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Every Ping.fm call is a form-encoded POST, so a request is just a URL and a
//! set of form fields. `PingClient::build_*` produces `HttpRequest` values and
//! `PingClient::parse_*` consumes `HttpResponse` values without touching the
//! network. Hosts that bring their own HTTP stack execute the request
//! themselves; everyone else plugs a [`Transport`] into the client and uses
//! the one-call operations. [`UreqTransport`] is the blocking default.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::error::TransportError;

/// Form fields of a request, sorted by key.
pub type FormParams = BTreeMap<String, String>;

/// A form POST described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub form: FormParams,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Executes a request and returns the raw response.
///
/// Implementations report non-2xx statuses as data in `HttpResponse`; the
/// client decides what a status means. Only failures that leave no response
/// at all should come back as `Err`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Bounds the whole round trip, connect through body read.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut response = self
            .agent
            .post(&request.url)
            .send_form(request.form.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        debug!(url = %request.url, status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }
}
