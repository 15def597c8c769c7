//! Error types for the Ping.fm client.
//!
//! # Design
//! A `FAIL` envelope is not an error: it is returned as `Outcome::Failure`.
//! What lands here is everything the caller cannot treat as a normal answer:
//! the network or HTTP layer broke (`TransportError`), or the service sent
//! something that does not match its schema (`ProtocolError`). Keeping the two
//! apart lets callers tell "my input was rejected" from "the contract broke".

use thiserror::Error;

/// Errors returned by `PingClient` operations and `parse_*` methods.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, ApiError::Protocol(_))
    }
}

/// The request never produced a usable response body.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-200 status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, TLS or I/O failure before a response was read.
    #[error("request failed: {0}")]
    Request(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => TransportError::Status {
                status,
                body: String::new(),
            },
            other => TransportError::Request(other.to_string()),
        }
    }
}

/// The response body does not follow the `<rsp>` envelope schema.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed response document: {0}")]
    Malformed(#[from] roxmltree::Error),

    #[error("expected <rsp> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("<rsp> has no status attribute")]
    MissingStatus,

    #[error("unknown response status {0:?}")]
    UnknownStatus(String),

    #[error("<{parent}> is missing required element <{element}>")]
    MissingElement {
        parent: String,
        element: &'static str,
    },

    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// A `<message>` has no wrapper element holding its title and body.
    #[error("message {id:?} has no content element")]
    MissingContent { id: String },

    /// More than one child of a `<message>` holds a `<body>`.
    #[error("message {id:?} has {count} content elements, expected one")]
    AmbiguousContent { id: String, count: usize },
}
