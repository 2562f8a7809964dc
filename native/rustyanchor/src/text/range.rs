//! Text ranges anchored to (node, offset) boundary points

use super::offset_map::{find_last_not_greater_than, TextContentOffsetMap};
use super::{char_slice, char_tail};
use crate::dom::{DocumentAccess, NodeId};

/// A position inside a node, in chars from the start of the node's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        BoundaryPoint { node, offset }
    }
}

/// A span of document text between two boundary points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: BoundaryPoint,
    pub end: BoundaryPoint,
}

impl TextRange {
    pub fn new(start: BoundaryPoint, end: BoundaryPoint) -> Self {
        TextRange { start, end }
    }

    /// Empty range at a single point
    pub fn collapsed(node: NodeId, offset: usize) -> Self {
        let point = BoundaryPoint::new(node, offset);
        TextRange::new(point, point)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Text covered by the range
    ///
    /// Takes the tail of the start node, every text and CDATA node strictly
    /// between the endpoints in document order, and the head of the end node.
    /// A collapsed range, or one whose start follows its end, yields an
    /// empty string.
    pub fn to_text<D: DocumentAccess + ?Sized>(&self, doc: &D) -> String {
        if self.is_collapsed() {
            return String::new();
        }

        if self.start.node == self.end.node {
            return doc
                .node_value(self.start.node)
                .map(|value| char_slice(value, self.start.offset, self.end.offset).to_owned())
                .unwrap_or_default();
        }

        if doc.node_kind(self.start.node).is_none() || doc.node_kind(self.end.node).is_none() {
            return String::new();
        }

        let text_value = |id: NodeId| {
            doc.node_kind(id)
                .filter(|kind| kind.is_text_bearing())
                .and_then(|_| doc.node_value(id))
        };

        let mut out = String::new();
        if let Some(value) = text_value(self.start.node) {
            out.push_str(char_tail(value, self.start.offset));
        }

        // Walk forward from the start; running off the end means the end
        // point precedes the start
        let mut next = doc.following(self.start.node);
        loop {
            match next {
                Some(id) if id == self.end.node => break,
                Some(id) => {
                    if let Some(value) = text_value(id) {
                        out.push_str(value);
                    }
                    next = doc.following(id);
                }
                None => return String::new(),
            }
        }

        if let Some(value) = text_value(self.end.node) {
            out.push_str(char_slice(value, 0, self.end.offset));
        }
        out
    }
}

/// Convert a `[start, end)` char span of `map.text` into a `TextRange`
///
/// The endpoints may land in different nodes. An empty map yields a range
/// collapsed at the start of its root.
pub fn range_from_text_offsets(map: &TextContentOffsetMap, start: usize, end: usize) -> TextRange {
    if map.nodes.is_empty() {
        return TextRange::collapsed(map.root, 0);
    }

    let start_idx = find_last_not_greater_than(&map.offsets, start);
    let end_idx = find_last_not_greater_than(&map.offsets, end);

    TextRange::new(
        BoundaryPoint::new(map.nodes[start_idx], start.saturating_sub(map.offsets[start_idx])),
        BoundaryPoint::new(map.nodes[end_idx], end.saturating_sub(map.offsets[end_idx])),
    )
}
