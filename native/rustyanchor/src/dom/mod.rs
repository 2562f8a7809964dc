//! DOM Module - Arena-based Document
//!
//! Implements an efficient DOM representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for names and values

pub mod document;
pub mod node;
pub mod strings;

pub use document::{DocumentBuilder, XmlDocument};
pub use node::{NodeId, NodeKind, XmlNode};
pub use strings::StringPool;

/// Read-only access to a document node tree
///
/// Text extraction and range reconstruction work through this trait, so any
/// tree that can report kinds, values and child order can be anchored.
pub trait DocumentAccess {
    /// The document node that owns the tree
    fn document_node_id(&self) -> NodeId;

    /// Get root element ID
    fn root_element_id(&self) -> Option<NodeId>;

    /// Kind of a node, or None if the id is not part of this tree
    fn node_kind(&self, id: NodeId) -> Option<NodeKind>;

    /// Element name or processing-instruction target
    fn node_name(&self, id: NodeId) -> Option<&str>;

    /// Value of a text, CDATA, comment or processing-instruction node
    fn node_value(&self, id: NodeId) -> Option<&str>;

    fn parent(&self, id: NodeId) -> Option<NodeId>;

    fn first_child(&self, id: NodeId) -> Option<NodeId>;

    fn next_sibling(&self, id: NodeId) -> Option<NodeId>;

    /// Next node in document order: first child, else the nearest following
    /// sibling of the node or one of its ancestors
    fn following(&self, id: NodeId) -> Option<NodeId> {
        if let Some(child) = self.first_child(id) {
            return Some(child);
        }
        let mut current = id;
        loop {
            if let Some(sibling) = self.next_sibling(current) {
                return Some(sibling);
            }
            current = self.parent(current)?;
        }
    }

    /// Children in document order
    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        let mut next = self.first_child(id);
        while let Some(child) = next {
            children.push(child);
            next = self.next_sibling(child);
        }
        children
    }

    /// Descendants in document order (depth-first, explicit stack)
    fn descendants_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children_vec(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children_vec(current).into_iter().rev());
        }
        result
    }
}

impl<T: DocumentAccess + ?Sized> DocumentAccess for &T {
    fn document_node_id(&self) -> NodeId {
        (**self).document_node_id()
    }

    fn root_element_id(&self) -> Option<NodeId> {
        (**self).root_element_id()
    }

    fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        (**self).node_kind(id)
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        (**self).node_name(id)
    }

    fn node_value(&self, id: NodeId) -> Option<&str> {
        (**self).node_value(id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        (**self).parent(id)
    }

    fn first_child(&self, id: NodeId) -> Option<NodeId> {
        (**self).first_child(id)
    }

    fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        (**self).next_sibling(id)
    }

    fn following(&self, id: NodeId) -> Option<NodeId> {
        (**self).following(id)
    }

    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        (**self).children_vec(id)
    }

    fn descendants_vec(&self, id: NodeId) -> Vec<NodeId> {
        (**self).descendants_vec(id)
    }
}
