//! Document Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of document node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Document root
    Document,
    /// `<!DOCTYPE ...>` declaration
    DocumentType,
    /// DTD notation declaration
    Notation,
    /// Element node
    Element,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
}

impl NodeKind {
    /// Text and CDATA nodes carry the document's character data
    #[inline]
    pub fn is_text_bearing(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::CData)
    }

    /// Kinds that are never part of their container's text content
    #[inline]
    pub fn is_excluded_from_text(self) -> bool {
        matches!(self, NodeKind::Comment | NodeKind::ProcessingInstruction)
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// Type of this node
    pub kind: NodeKind,
    /// Parent node (None for document root)
    pub parent: Option<NodeId>,
    /// First child node
    pub first_child: Option<NodeId>,
    /// Last child node
    pub last_child: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Index into string pool for the name (elements, PI targets, doctypes), or 0
    pub name_id: u32,
    /// Index into string pool for the value (text, CDATA, comment, PI data), or 0
    pub value_id: u32,
}

impl XmlNode {
    /// Create an unlinked node
    pub fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        XmlNode {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id: 0,
            value_id: 0,
        }
    }

    /// Create a new document root node
    pub fn document() -> Self {
        XmlNode::new(NodeKind::Document, None)
    }

    /// Check if this is an element node
    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }
}
