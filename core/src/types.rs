//! Domain records and call options for the Ping.fm API.
//!
//! # Design
//! Every record mirrors one element of the remote XML schema. Attribute and
//! text values are kept as owned `String`s exactly as the service sent them;
//! `Service::methods` stays the opaque comma-separated list and message dates
//! are not parsed. `Outcome<T>` is the success/failure contract every
//! operation returns, with `T` fixed by the operation at compile time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The six remote operations, one per API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Validate,
    Services,
    Triggers,
    Latest,
    Post,
    TPost,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Validate,
        Operation::Services,
        Operation::Triggers,
        Operation::Latest,
        Operation::Post,
        Operation::TPost,
    ];

    /// Path segment appended to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Operation::Validate => "user.validate",
            Operation::Services => "user.services",
            Operation::Triggers => "user.triggers",
            Operation::Latest => "user.latest",
            Operation::Post => "user.post",
            Operation::TPost => "user.tpost",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Result of a call the service answered.
///
/// `Failure` is the service rejecting the request (status `FAIL`) and is an
/// ordinary value. Broken responses and network errors never end up here;
/// they are reported as `ApiError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    Failure { message: String },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure { message } => Some(message.as_str()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure { message } => Outcome::Failure { message },
        }
    }
}

/// Success payload of any operation, for callers that dispatch on
/// [`Operation`] at runtime instead of calling a typed method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Empty,
    Services(Vec<Service>),
    Triggers(Vec<Trigger>),
    Messages(Vec<Message>),
}

/// A posting destination configured on the user's account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Comma-separated post methods the service accepts, e.g. `"blog,status"`.
    pub methods: String,
}

/// Service reference nested under a trigger or a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceRef {
    pub id: String,
    pub name: String,
}

/// A user-defined shortcut that fans a post out to a fixed set of services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trigger {
    pub id: String,
    pub method: String,
    pub services: Vec<ServiceRef>,
}

/// A previously posted message as reported by `user.latest`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub method: String,
    pub rfc_date: String,
    pub unix_date: String,
    /// Empty when the message was posted without a title.
    #[serde(default)]
    pub title: String,
    pub body: String,
    pub services: Vec<ServiceRef>,
}

/// Sort direction for `user.latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Post method understood by `user.post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostMethod {
    #[default]
    Default,
    Blog,
    Microblog,
    Status,
}

impl PostMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PostMethod::Default => "default",
            PostMethod::Blog => "blog",
            PostMethod::Microblog => "microblog",
            PostMethod::Status => "status",
        }
    }
}

/// Query options for `user.latest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestQuery {
    pub limit: u32,
    pub order: Order,
}

impl Default for LatestQuery {
    fn default() -> Self {
        Self {
            limit: 25,
            order: Order::Desc,
        }
    }
}

/// A message to publish through `user.post`.
///
/// `title` is required by the service for [`PostMethod::Blog`]; that rule is
/// left to the service to enforce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub body: String,
    pub title: String,
    pub method: PostMethod,
    /// Single service id to post to; empty posts to every matching service.
    pub service: String,
    /// When set the service validates the post without publishing it.
    pub debug: bool,
}

impl NewPost {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            title: String::new(),
            method: PostMethod::Default,
            service: String::new(),
            debug: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn method(mut self, method: PostMethod) -> Self {
        self.method = method;
        self
    }

    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// A message to publish through one of the user's triggers (`user.tpost`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPost {
    pub body: String,
    pub trigger: String,
    pub title: String,
    pub debug: bool,
}

impl TriggerPost {
    pub fn new(body: impl Into<String>, trigger: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            trigger: trigger.into(),
            title: String::new(),
            debug: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
