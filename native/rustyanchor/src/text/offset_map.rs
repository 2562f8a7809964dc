//! Text content offset map
//!
//! Flattens the text under a node into one string and records, for every
//! contributing leaf, the char offset at which its text begins. Offsets are
//! non-decreasing, so the leaf owning any flat position is found by binary
//! search.

use crate::dom::{DocumentAccess, NodeId, NodeKind};

/// Mapping between a flattened text and the leaf nodes it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContentOffsetMap {
    /// Node the map was built from
    pub root: NodeId,
    /// Contributing leaves in document order
    pub nodes: Vec<NodeId>,
    /// Char offset in `text` of the first char of each leaf in `nodes`
    pub offsets: Vec<usize>,
    /// Concatenated text of all leaves
    pub text: String,
}

impl TextContentOffsetMap {
    /// Walk `root` in document order and collect its text content
    ///
    /// Elements contribute their children, skipping comment and
    /// processing-instruction children entirely. Text and CDATA contribute
    /// their value. A comment or processing instruction contributes only
    /// when it is `root` itself. Document, doctype and notation nodes
    /// contribute nothing.
    pub fn build<D: DocumentAccess + ?Sized>(doc: &D, root: NodeId) -> Self {
        let mut nodes = Vec::new();
        let mut offsets = Vec::new();
        let mut text = String::new();
        let mut len = 0usize;

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(kind) = doc.node_kind(id) else {
                continue;
            };

            match kind {
                NodeKind::Document | NodeKind::DocumentType | NodeKind::Notation => {}
                NodeKind::Element => {
                    let mut children = doc.children_vec(id);
                    children.retain(|&child| {
                        doc.node_kind(child)
                            .is_some_and(|k| !k.is_excluded_from_text())
                    });
                    stack.extend(children.into_iter().rev());
                }
                // Comment and PI children were filtered above, so reaching one
                // here means it is the traversal root.
                NodeKind::Text
                | NodeKind::CData
                | NodeKind::Comment
                | NodeKind::ProcessingInstruction => {
                    let value = doc.node_value(id).unwrap_or("");
                    nodes.push(id);
                    offsets.push(len);
                    len += value.chars().count();
                    text.push_str(value);
                }
            }
        }

        TextContentOffsetMap {
            root,
            nodes,
            offsets,
            text,
        }
    }

    /// Length of the flattened text in chars
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Flattened text content of `root`
pub fn text_content<D: DocumentAccess + ?Sized>(doc: &D, root: NodeId) -> String {
    TextContentOffsetMap::build(doc, root).text
}

/// Highest index in `offsets` whose value is `<= value`
///
/// `offsets` must be non-decreasing. Returns 0 for empty and single-element
/// slices.
pub fn find_last_not_greater_than(offsets: &[usize], value: usize) -> usize {
    let mut high = offsets.len();
    let mut low = 0;

    while high - low > 1 {
        let mid = (high + low).div_ceil(2);
        if offsets[mid] > value {
            high = mid;
        } else {
            low = mid;
        }
    }

    low
}
