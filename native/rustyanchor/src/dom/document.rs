//! Document - Arena-based DOM representation
//!
//! Efficient DOM storage with:
//! - Arena allocation for nodes
//! - NodeId indices for traversal
//! - String interning for names and values
//!
//! Documents come from the lenient reader (`XmlDocument::parse`) or are
//! assembled node by node with a `DocumentBuilder`.

use super::node::{NodeId, NodeKind, XmlNode};
use super::strings::StringPool;
use super::DocumentAccess;
use crate::core::encoding::decode_to_string;
use crate::error::ParseError;
use crate::reader::{SliceReader, XmlEvent};

/// A document stored in arena format
#[derive(Debug)]
pub struct XmlDocument {
    /// Arena of nodes; index 0 is the document node
    nodes: Vec<XmlNode>,
    /// Interned names and values
    pub strings: StringPool,
    /// Root element node ID (not document node)
    root_element: Option<NodeId>,
}

impl XmlDocument {
    /// Parse a document from text (lenient mode, never fails)
    pub fn parse(input: &str) -> Self {
        let mut builder = DocumentBuilder::with_capacity(input.len() / 16);

        for event in SliceReader::new(input) {
            match event {
                XmlEvent::StartElement(elem) => {
                    builder.element(elem.name);
                }
                XmlEvent::EmptyElement(elem) => {
                    builder.element(elem.name);
                    builder.close();
                }
                XmlEvent::EndElement(elem) => {
                    builder.close_named(elem.name);
                }
                XmlEvent::Text(content) => {
                    builder.text(&content);
                }
                XmlEvent::CData(content) => {
                    builder.cdata(content);
                }
                XmlEvent::Comment(content) => {
                    builder.comment(content);
                }
                XmlEvent::ProcessingInstruction { target, data } => {
                    builder.processing_instruction(target, data);
                }
                XmlEvent::DocType { name } => {
                    builder.doctype(name);
                }
                XmlEvent::XmlDeclaration | XmlEvent::EndDocument => {}
            }
        }

        builder.finish()
    }

    /// Parse raw bytes, detecting UTF-8 / UTF-16 input first
    pub fn parse_bytes(input: Vec<u8>) -> Result<Self, ParseError> {
        let text = decode_to_string(input)?;
        Ok(Self::parse(&text))
    }

    /// Get the document root node (index 0)
    pub fn document_node(&self) -> &XmlNode {
        &self.nodes[0]
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Get node name as string
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        if node.name_id == 0 {
            return None;
        }
        self.strings.get_str(node.name_id)
    }

    /// Get the value of a text, CDATA, comment or processing-instruction node
    pub fn node_value(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Text | NodeKind::CData | NodeKind::Comment | NodeKind::ProcessingInstruction => {
                self.strings.get_str(node.value_id)
            }
            _ => None,
        }
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Iterate over all descendants of a node in document order
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut iter = DescendantIter {
            doc: self,
            stack: Vec::new(),
        };
        iter.push_children(id);
        iter
    }

    /// Find the first element with the given name, in document order
    pub fn find_element(&self, name: &str) -> Option<NodeId> {
        self.descendants(0)
            .find(|&id| self.get_node(id).is_some_and(XmlNode::is_element) && self.node_name(id) == Some(name))
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d XmlDocument,
    next: Option<NodeId>,
}

impl<'d> Iterator for ChildIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes (depth-first, explicit stack)
pub struct DescendantIter<'d> {
    doc: &'d XmlDocument,
    stack: Vec<NodeId>,
}

impl<'d> DescendantIter<'d> {
    /// Push children in reverse order so the first child is visited first
    fn push_children(&mut self, id: NodeId) {
        let mut child_id = self.doc.get_node(id).and_then(|n| n.last_child);
        while let Some(cid) = child_id {
            self.stack.push(cid);
            child_id = self.doc.get_node(cid).and_then(|n| n.prev_sibling);
        }
    }
}

impl<'d> Iterator for DescendantIter<'d> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.push_children(current);
        Some(current)
    }
}

// =============================================================================
// DocumentBuilder
// =============================================================================

/// Incremental document construction
///
/// Nodes are appended to the currently open element (initially the document
/// node). `element` opens a new element, `close` ends the innermost one.
#[derive(Debug)]
pub struct DocumentBuilder {
    doc: XmlDocument,
    stack: Vec<NodeId>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(nodes: usize) -> Self {
        let mut arena = Vec::with_capacity(nodes.max(1));
        arena.push(XmlNode::document());
        DocumentBuilder {
            doc: XmlDocument {
                nodes: arena,
                strings: StringPool::new(),
                root_element: None,
            },
            stack: vec![0],
        }
    }

    /// Open an element as the last child of the current node
    pub fn element(&mut self, name: &str) -> NodeId {
        let name_id = self.doc.strings.intern(name);
        let id = self.append(NodeKind::Element, name_id, 0);
        if self.doc.root_element.is_none() && self.current() == 0 {
            self.doc.root_element = Some(id);
        }
        self.stack.push(id);
        id
    }

    /// Close the innermost open element; a no-op at document level
    pub fn close(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Close the nearest open element called `name` and everything opened
    /// inside it. An end tag with no matching open element is ignored.
    pub fn close_named(&mut self, name: &str) {
        let found = self
            .stack
            .iter()
            .rposition(|&id| id != 0 && self.doc.node_name(id) == Some(name));

        if let Some(pos) = found {
            self.stack.truncate(pos);
        }
    }

    pub fn text(&mut self, value: &str) -> NodeId {
        let value_id = self.doc.strings.intern(value);
        self.append(NodeKind::Text, 0, value_id)
    }

    pub fn cdata(&mut self, value: &str) -> NodeId {
        let value_id = self.doc.strings.intern(value);
        self.append(NodeKind::CData, 0, value_id)
    }

    pub fn comment(&mut self, value: &str) -> NodeId {
        let value_id = self.doc.strings.intern(value);
        self.append(NodeKind::Comment, 0, value_id)
    }

    pub fn processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        let name_id = self.doc.strings.intern(target);
        let value_id = self.doc.strings.intern(data);
        self.append(NodeKind::ProcessingInstruction, name_id, value_id)
    }

    pub fn doctype(&mut self, name: &str) -> NodeId {
        let name_id = self.doc.strings.intern(name);
        self.append(NodeKind::DocumentType, name_id, 0)
    }

    pub fn notation(&mut self, name: &str) -> NodeId {
        let name_id = self.doc.strings.intern(name);
        self.append(NodeKind::Notation, name_id, 0)
    }

    /// Finish construction; unclosed elements are closed implicitly
    pub fn finish(self) -> XmlDocument {
        self.doc
    }

    #[inline]
    fn current(&self) -> NodeId {
        *self.stack.last().unwrap_or(&0)
    }

    fn append(&mut self, kind: NodeKind, name_id: u32, value_id: u32) -> NodeId {
        let parent_id = self.current();
        let mut node = XmlNode::new(kind, Some(parent_id));
        node.name_id = name_id;
        node.value_id = value_id;

        let node_id = self.doc.nodes.len() as NodeId;
        self.doc.nodes.push(node);
        self.link_child(parent_id, node_id);
        node_id
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let nodes = &mut self.doc.nodes;
        let last_child_opt = nodes[parent_id as usize].last_child;

        if let Some(last_child_id) = last_child_opt {
            nodes[child_id as usize].prev_sibling = Some(last_child_id);
            nodes[last_child_id as usize].next_sibling = Some(child_id);
        } else {
            nodes[parent_id as usize].first_child = Some(child_id);
        }
        nodes[parent_id as usize].last_child = Some(child_id);
    }
}

// =============================================================================
// DocumentAccess trait implementation
// =============================================================================

impl DocumentAccess for XmlDocument {
    fn document_node_id(&self) -> NodeId {
        0
    }

    fn root_element_id(&self) -> Option<NodeId> {
        self.root_element
    }

    fn node_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get_node(id).map(|n| n.kind)
    }

    fn node_name(&self, id: NodeId) -> Option<&str> {
        XmlDocument::node_name(self, id)
    }

    fn node_value(&self, id: NodeId) -> Option<&str> {
        XmlDocument::node_value(self, id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.parent)
    }

    fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.first_child)
    }

    fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id).and_then(|n| n.next_sibling)
    }

    fn descendants_vec(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let doc = XmlDocument::parse("<root>hello</root>");
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.node_name(root), Some("root"));

        let text = doc.children(root).next().unwrap();
        assert_eq!(doc.node_kind(text), Some(NodeKind::Text));
        assert_eq!(doc.node_value(text), Some("hello"));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let doc = XmlDocument::parse("<root><a/><b><c/></b><d/></root>");
        let root = doc.root_element_id().unwrap();
        let names: Vec<_> = doc.descendants(root).filter_map(|id| doc.node_name(id)).collect();
        assert_eq!(names, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_following_matches_descendant_order() {
        let doc = XmlDocument::parse("<root><a>x</a><b><c/>y</b><d/></root>");
        let mut walked = Vec::new();
        let mut next = doc.following(doc.document_node_id());
        while let Some(id) = next {
            walked.push(id);
            next = doc.following(id);
        }
        assert_eq!(walked, doc.descendants_vec(doc.document_node_id()));
    }

    #[test]
    fn test_siblings() {
        let doc = XmlDocument::parse("<root><a/><b/><c/></root>");
        let root = doc.root_element_id().unwrap();
        let children: Vec<_> = doc.children(root).collect();
        assert_eq!(children.len(), 3);

        let first = doc.get_node(children[0]).unwrap();
        assert!(first.prev_sibling.is_none());
        assert_eq!(first.next_sibling, Some(children[1]));
    }

    #[test]
    fn test_leaf_values() {
        let doc = XmlDocument::parse("<div><!-- note --><![CDATA[raw]]><?pi data?></div>");
        let root = doc.root_element_id().unwrap();
        let kinds: Vec<_> = doc.children(root).filter_map(|id| doc.node_kind(id)).collect();
        assert_eq!(kinds, [NodeKind::Comment, NodeKind::CData, NodeKind::ProcessingInstruction]);

        let values: Vec<_> = doc.children(root).filter_map(|id| doc.node_value(id)).collect();
        assert_eq!(values, [" note ", "raw", "data"]);
    }

    #[test]
    fn test_doctype_node() {
        let doc = XmlDocument::parse("<!DOCTYPE html><html>x</html>");
        let first = doc.document_node().first_child.unwrap();
        assert_eq!(doc.node_kind(first), Some(NodeKind::DocumentType));
        assert_eq!(doc.node_name(doc.root_element_id().unwrap()), Some("html"));
    }

    #[test]
    fn test_lenient_mismatched_end_tags() {
        // </b> closes the unclosed <i>, the stray </x> is ignored
        let doc = XmlDocument::parse("<div><b><i>one</b></x>two</div>");
        let root = doc.root_element_id().unwrap();
        let children: Vec<_> = doc.children(root).collect();
        assert_eq!(children.len(), 2);
        assert_eq!(doc.node_value(children[1]), Some("two"));
    }

    #[test]
    fn test_unclosed_elements() {
        let doc = XmlDocument::parse("<div><p>open");
        let p = doc.find_element("p").unwrap();
        assert_eq!(doc.get_node(p).unwrap().parent, doc.root_element_id());
    }

    #[test]
    fn test_builder() {
        let mut builder = DocumentBuilder::new();
        let div = builder.element("div");
        builder.text("foo");
        builder.comment("bar");
        builder.close();
        builder.close(); // extra close at document level is a no-op
        let doc = builder.finish();

        assert_eq!(doc.root_element_id(), Some(div));
        assert_eq!(doc.children(div).count(), 2);
        assert_eq!(doc.node_count(), 4);
    }

    #[test]
    fn test_parse_bytes_utf16() {
        let mut input = vec![0xFF, 0xFE];
        for unit in "<p>hi</p>".encode_utf16() {
            input.extend_from_slice(&unit.to_le_bytes());
        }
        let doc = XmlDocument::parse_bytes(input).unwrap();
        assert_eq!(doc.node_name(doc.root_element_id().unwrap()), Some("p"));
    }
}
