//! Mapping of parsed envelopes to typed outcomes.
//!
//! # Design
//! Which payload an `OK` envelope carries is decided by the operation that was
//! called, never by looking at what the document happens to contain. Each
//! payload shape has its own extractor; [`map_with`] applies one to an
//! envelope and [`map_envelope`] picks one from an [`Operation`].
//!
//! Extractors treat every attribute and element the schema guarantees as
//! required. The only optional field is a message's `<title>`. A missing list
//! container (`<services>`, `<triggers>`, `<messages>`) reads as an empty list.

use roxmltree::Node;

use crate::envelope::{child, children, required_attr, required_child, text, Envelope, Status};
use crate::error::ProtocolError;
use crate::types::{Message, Operation, Outcome, Payload, Service, ServiceRef, Trigger};

/// Map `envelope` to an outcome, extracting the success payload with `extract`.
///
/// A `FAIL` envelope becomes `Outcome::Failure` with the `<message>` text.
pub fn map_with<'input, T>(
    envelope: &Envelope<'input>,
    extract: impl FnOnce(Node<'_, 'input>) -> Result<T, ProtocolError>,
) -> Result<Outcome<T>, ProtocolError> {
    match envelope.status() {
        Status::Ok => extract(envelope.root()).map(Outcome::Success),
        Status::Fail => Ok(Outcome::Failure {
            message: envelope.failure_message()?,
        }),
    }
}

/// Map `envelope` for `operation`, with the payload chosen by the operation.
pub fn map_envelope(
    operation: Operation,
    envelope: &Envelope<'_>,
) -> Result<Outcome<Payload>, ProtocolError> {
    match operation {
        Operation::Validate | Operation::Post | Operation::TPost => {
            map_with(envelope, |root| bare(root).map(|()| Payload::Empty))
        }
        Operation::Services => map_with(envelope, |root| services(root).map(Payload::Services)),
        Operation::Triggers => map_with(envelope, |root| triggers(root).map(Payload::Triggers)),
        Operation::Latest => map_with(envelope, |root| messages(root).map(Payload::Messages)),
    }
}

/// Payload of `user.validate`, `user.post` and `user.tpost`: nothing.
pub fn bare(_root: Node<'_, '_>) -> Result<(), ProtocolError> {
    Ok(())
}

/// `rsp/services/service` elements.
pub fn services(root: Node<'_, '_>) -> Result<Vec<Service>, ProtocolError> {
    nested(root, "services", "service")
        .map(|node| {
            Ok(Service {
                id: required_attr(node, "id")?,
                name: required_attr(node, "name")?,
                methods: text(required_child(node, "methods")?),
            })
        })
        .collect()
}

/// `rsp/triggers/trigger` elements.
pub fn triggers(root: Node<'_, '_>) -> Result<Vec<Trigger>, ProtocolError> {
    nested(root, "triggers", "trigger")
        .map(|node| {
            Ok(Trigger {
                id: required_attr(node, "id")?,
                method: required_attr(node, "method")?,
                services: service_refs(node)?,
            })
        })
        .collect()
}

/// `rsp/messages/message` elements.
pub fn messages(root: Node<'_, '_>) -> Result<Vec<Message>, ProtocolError> {
    nested(root, "messages", "message").map(message).collect()
}

fn message(node: Node<'_, '_>) -> Result<Message, ProtocolError> {
    let id = required_attr(node, "id")?;
    let method = required_attr(node, "method")?;
    let date = required_child(node, "date")?;
    let content = content(node, &id)?;

    Ok(Message {
        rfc_date: required_attr(date, "rfc")?,
        unix_date: required_attr(date, "unix")?,
        title: child(content, "title").map(text).unwrap_or_default(),
        body: text(required_child(content, "body")?),
        services: service_refs(node)?,
        id,
        method,
    })
}

/// The element wrapping a message's title and body. Its tag follows the post
/// method, so it is found by shape: the one child holding a `<body>`. A child
/// holding only a `<title>` is taken when no child has a body, so the missing
/// body is reported against it. Unrelated siblings are ignored.
fn content<'a, 'input>(node: Node<'a, 'input>, id: &str) -> Result<Node<'a, 'input>, ProtocolError> {
    let holding = |tag: &'static str| {
        node.children()
            .filter(move |c| c.is_element() && child(*c, tag).is_some())
    };
    let mut with_body = holding("body");
    match (with_body.next(), with_body.count()) {
        (Some(wrapper), 0) => Ok(wrapper),
        (Some(_), extra) => Err(ProtocolError::AmbiguousContent {
            id: id.to_string(),
            count: extra + 1,
        }),
        (None, _) => holding("title")
            .next()
            .ok_or_else(|| ProtocolError::MissingContent { id: id.to_string() }),
    }
}

/// `services/service` under a trigger or message, in document order.
fn service_refs(node: Node<'_, '_>) -> Result<Vec<ServiceRef>, ProtocolError> {
    nested(node, "services", "service")
        .map(|service| {
            Ok(ServiceRef {
                id: required_attr(service, "id")?,
                name: required_attr(service, "name")?,
            })
        })
        .collect()
}

fn nested<'a, 'input>(
    node: Node<'a, 'input>,
    container: &'static str,
    item: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    children(node, container).flat_map(move |list| children(list, item))
}
