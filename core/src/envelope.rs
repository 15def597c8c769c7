//! Parsing of the `<rsp status="...">` response envelope.
//!
//! Only the envelope itself is checked here: the document must be well-formed,
//! rooted at `rsp`, and carry a known status. What sits under the root is the
//! mapper's business; this module just offers the lookups it needs.

use roxmltree::{Document, Node};

use crate::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Fail,
}

/// A parsed response document with a validated status.
#[derive(Debug)]
pub struct Envelope<'input> {
    doc: Document<'input>,
    status: Status,
}

impl<'input> Envelope<'input> {
    pub fn parse(text: &'input str) -> Result<Self, ProtocolError> {
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        if root.tag_name().name() != "rsp" {
            return Err(ProtocolError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }
        let status = match root.attribute("status") {
            Some("OK") => Status::Ok,
            Some("FAIL") => Status::Fail,
            Some(other) => return Err(ProtocolError::UnknownStatus(other.to_string())),
            None => return Err(ProtocolError::MissingStatus),
        };
        Ok(Self { doc, status })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The `<rsp>` element.
    pub fn root(&self) -> Node<'_, 'input> {
        self.doc.root_element()
    }

    /// Text of the `<message>` element of a `FAIL` envelope.
    pub fn failure_message(&self) -> Result<String, ProtocolError> {
        required_child(self.root(), "message").map(text)
    }
}

pub(crate) fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

pub(crate) fn child<'a, 'input>(node: Node<'a, 'input>, name: &'static str) -> Option<Node<'a, 'input>> {
    children(node, name).next()
}

pub(crate) fn required_child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, ProtocolError> {
    child(node, name).ok_or_else(|| ProtocolError::MissingElement {
        parent: node.tag_name().name().to_string(),
        element: name,
    })
}

pub(crate) fn required_attr(node: Node<'_, '_>, name: &'static str) -> Result<String, ProtocolError> {
    node.attribute(name)
        .map(str::to_string)
        .ok_or_else(|| ProtocolError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name,
        })
}

/// Text content of an element; an empty element yields `""`.
///
/// Only the first text node is read: anything after an embedded comment or
/// child element is dropped.
pub(crate) fn text(node: Node<'_, '_>) -> String {
    node.text().unwrap_or_default().to_string()
}
