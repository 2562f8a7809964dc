//! Reader Event Types
//!
//! Event types for pull-parser style processing. Names and raw sections
//! borrow from the source; text borrows unless entities had to be decoded.

use std::borrow::Cow;

/// Markup parsing event
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent<'a> {
    /// Start of an element: <name attrs...>
    StartElement(StartElement<'a>),
    /// End of an element: </name>
    EndElement(EndElement<'a>),
    /// Empty element: <name attrs.../>
    EmptyElement(StartElement<'a>),
    /// Text content between tags, entity-decoded
    Text(Cow<'a, str>),
    /// CDATA section content
    CData(&'a str),
    /// Comment content
    Comment(&'a str),
    /// Processing instruction: <?target data?>
    ProcessingInstruction { target: &'a str, data: &'a str },
    /// XML declaration: <?xml version="1.0"?>
    XmlDeclaration,
    /// DOCTYPE declaration, with its root name if present
    DocType { name: &'a str },
    /// End of document
    EndDocument,
}

/// Start element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement<'a> {
    /// Full element name (may include prefix)
    pub name: &'a str,
}

impl<'a> StartElement<'a> {
    pub fn new(name: &'a str) -> Self {
        StartElement { name }
    }

    /// Local name (after colon)
    pub fn local_name(&self) -> &'a str {
        split_name(self.name).1
    }
}

/// End element event data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndElement<'a> {
    /// Full element name
    pub name: &'a str,
}

impl<'a> EndElement<'a> {
    pub fn new(name: &'a str) -> Self {
        EndElement { name }
    }
}

/// Split a name into prefix and local name at the colon
fn split_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

impl<'a> XmlEvent<'a> {
    /// Get text content if applicable
    pub fn as_text(&self) -> Option<&str> {
        match self {
            XmlEvent::Text(t) => Some(t.as_ref()),
            XmlEvent::CData(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_element() {
        let elem = StartElement::new("div");
        assert_eq!(elem.name, "div");
        assert_eq!(elem.local_name(), "div");
    }

    #[test]
    fn test_namespaced_element() {
        let elem = StartElement::new("svg:rect");
        assert_eq!(elem.local_name(), "rect");
    }

    #[test]
    fn test_as_text() {
        assert_eq!(XmlEvent::CData("x").as_text(), Some("x"));
        assert_eq!(XmlEvent::Comment("x").as_text(), None);
    }
}
