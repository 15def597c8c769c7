//! The Ping.fm client facade.
//!
//! # Design
//! `PingClient` holds the base URL, the immutable credentials and a
//! transport, and nothing else; calls share no state. Each operation is split
//! into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`. Hosts with their own HTTP stack
//! use that pair directly. The one-call methods (`validate`, `services`, ...)
//! run `build_*`, the transport and `parse_*` in sequence, one round trip per
//! call with no retry.

use tracing::{debug, info, warn};

use crate::config::{Config, Credentials, DEFAULT_BASE_URL};
use crate::envelope::Envelope;
use crate::error::{ApiError, ProtocolError, TransportError};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::mapper::{self, map_envelope, map_with};
use crate::request::OperationRequest;
use crate::types::{
    LatestQuery, Message, NewPost, Operation, Outcome, Payload, Service, Trigger, TriggerPost,
};

/// Client for the Ping.fm API.
#[derive(Debug, Clone)]
pub struct PingClient<T = UreqTransport> {
    base_url: String,
    credentials: Credentials,
    transport: T,
}

impl PingClient<UreqTransport> {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_transport(credentials, UreqTransport::new())
    }

    pub fn from_config(config: Config) -> Self {
        Self::new(config.credentials).with_base_url(&config.base_url)
    }
}

impl<T> PingClient<T> {
    pub fn with_transport(credentials: Credentials, transport: T) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials,
            transport,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Request for an arbitrary operation, credentials included.
    pub fn build(&self, request: OperationRequest) -> HttpRequest {
        HttpRequest {
            url: format!("{}/{}", self.base_url, request.operation.path()),
            form: request.into_form(&self.credentials),
        }
    }

    pub fn build_validate(&self) -> HttpRequest {
        self.build(OperationRequest::validate())
    }

    pub fn build_services(&self) -> HttpRequest {
        self.build(OperationRequest::services())
    }

    pub fn build_triggers(&self) -> HttpRequest {
        self.build(OperationRequest::triggers())
    }

    pub fn build_latest(&self, query: &LatestQuery) -> HttpRequest {
        self.build(OperationRequest::latest(query))
    }

    pub fn build_post(&self, post: &NewPost) -> HttpRequest {
        self.build(OperationRequest::post(post))
    }

    pub fn build_tpost(&self, post: &TriggerPost) -> HttpRequest {
        self.build(OperationRequest::tpost(post))
    }

    /// Parse the response to `operation` without a statically known payload.
    pub fn parse(
        &self,
        operation: Operation,
        response: HttpResponse,
    ) -> Result<Outcome<Payload>, ApiError> {
        parse_response(operation, response, |envelope| {
            map_envelope(operation, envelope)
        })
    }

    pub fn parse_validate(&self, response: HttpResponse) -> Result<Outcome<()>, ApiError> {
        parse_response(Operation::Validate, response, |envelope| {
            map_with(envelope, mapper::bare)
        })
    }

    pub fn parse_services(
        &self,
        response: HttpResponse,
    ) -> Result<Outcome<Vec<Service>>, ApiError> {
        parse_response(Operation::Services, response, |envelope| {
            map_with(envelope, mapper::services)
        })
    }

    pub fn parse_triggers(
        &self,
        response: HttpResponse,
    ) -> Result<Outcome<Vec<Trigger>>, ApiError> {
        parse_response(Operation::Triggers, response, |envelope| {
            map_with(envelope, mapper::triggers)
        })
    }

    pub fn parse_latest(
        &self,
        response: HttpResponse,
    ) -> Result<Outcome<Vec<Message>>, ApiError> {
        parse_response(Operation::Latest, response, |envelope| {
            map_with(envelope, mapper::messages)
        })
    }

    pub fn parse_post(&self, response: HttpResponse) -> Result<Outcome<()>, ApiError> {
        parse_response(Operation::Post, response, |envelope| {
            map_with(envelope, mapper::bare)
        })
    }

    pub fn parse_tpost(&self, response: HttpResponse) -> Result<Outcome<()>, ApiError> {
        parse_response(Operation::TPost, response, |envelope| {
            map_with(envelope, mapper::bare)
        })
    }
}

impl<T: Transport> PingClient<T> {
    /// Check that the API key and user application key are accepted.
    pub fn validate(&self) -> Result<Outcome<()>, ApiError> {
        let response = self.send(Operation::Validate, self.build_validate())?;
        self.parse_validate(response)
    }

    /// Services the user has set up.
    pub fn services(&self) -> Result<Outcome<Vec<Service>>, ApiError> {
        let response = self.send(Operation::Services, self.build_services())?;
        self.parse_services(response)
    }

    /// The user's custom triggers.
    pub fn triggers(&self) -> Result<Outcome<Vec<Trigger>>, ApiError> {
        let response = self.send(Operation::Triggers, self.build_triggers())?;
        self.parse_triggers(response)
    }

    /// Messages the user posted most recently.
    pub fn latest(&self, query: &LatestQuery) -> Result<Outcome<Vec<Message>>, ApiError> {
        let response = self.send(Operation::Latest, self.build_latest(query))?;
        self.parse_latest(response)
    }

    pub fn post(&self, post: &NewPost) -> Result<Outcome<()>, ApiError> {
        let response = self.send(Operation::Post, self.build_post(post))?;
        self.parse_post(response)
    }

    /// Post through one of the user's triggers.
    pub fn tpost(&self, post: &TriggerPost) -> Result<Outcome<()>, ApiError> {
        let response = self.send(Operation::TPost, self.build_tpost(post))?;
        self.parse_tpost(response)
    }

    /// Run any operation and return its payload as a [`Payload`].
    pub fn execute(&self, request: OperationRequest) -> Result<Outcome<Payload>, ApiError> {
        let operation = request.operation;
        let response = self.send(operation, self.build(request))?;
        self.parse(operation, response)
    }

    fn send(&self, operation: Operation, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(%operation, url = %request.url, "sending request");
        self.transport.execute(&request).map_err(|err| {
            warn!(%operation, error = %err, "transport failed");
            ApiError::from(err)
        })
    }
}

fn parse_response<U>(
    operation: Operation,
    response: HttpResponse,
    map: impl FnOnce(&Envelope<'_>) -> Result<Outcome<U>, ProtocolError>,
) -> Result<Outcome<U>, ApiError> {
    check_status(&response)?;
    let outcome = Envelope::parse(&response.body)
        .and_then(|envelope| map(&envelope))
        .map_err(|err| {
            warn!(%operation, error = %err, "response does not match the envelope schema");
            err
        })?;
    match &outcome {
        Outcome::Success(_) => debug!(%operation, "request succeeded"),
        Outcome::Failure { message } => {
            info!(%operation, reason = %message, "service rejected request")
        }
    }
    Ok(outcome)
}

/// Anything but 200 means no envelope was delivered.
fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if response.status == 200 {
        return Ok(());
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}
