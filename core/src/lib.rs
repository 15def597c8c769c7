//! Synchronous client for the Ping.fm social broadcasting API.
//!
//! # Overview
//! Ping.fm exposes six form-POST operations (`user.validate`,
//! `user.services`, `user.triggers`, `user.latest`, `user.post`,
//! `user.tpost`) that all answer with the same XML envelope:
//! `<rsp status="OK">` plus an operation-specific payload, or
//! `<rsp status="FAIL">` with a `<message>`. This crate turns that envelope
//! into one typed contract, `Result<Outcome<T>, ApiError>`, where `T` is the
//! payload of the operation that was called.
//!
//! # Design
//! - `PingClient` holds immutable credentials and a `Transport`; it keeps no
//!   state between calls.
//! - Every operation is also available as a `build_*` / `parse_*` pair so a
//!   host can execute the HTTP round trip itself (host-does-IO pattern).
//! - A `FAIL` answer is a value (`Outcome::Failure`). Responses that break the
//!   schema and transport failures are errors, so callers can tell a rejected
//!   request from a broken contract.
//!
//! ```no_run
//! use pingfm_core::{Config, LatestQuery, NewPost, Outcome, PingClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PingClient::from_config(Config::from_env()?);
//! if let Outcome::Failure { message } = client.post(&NewPost::new("hello"))? {
//!     eprintln!("rejected: {message}");
//! }
//! if let Outcome::Success(messages) = client.latest(&LatestQuery::default())? {
//!     for message in messages {
//!         println!("{} {}", message.rfc_date, message.body);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod mapper;
pub mod request;
pub mod types;

pub use client::PingClient;
pub use config::{Config, ConfigError, Credentials, DEFAULT_BASE_URL};
pub use error::{ApiError, ProtocolError, TransportError};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use request::OperationRequest;
pub use types::{
    LatestQuery, Message, NewPost, Operation, Order, Outcome, Payload, PostMethod, Service,
    ServiceRef, Trigger, TriggerPost,
};
