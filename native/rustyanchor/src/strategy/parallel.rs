//! Parallel anchoring across independent documents
//!
//! Uses Rayon to run one synchronous anchoring call per document. Each call
//! only reads its own tree, so documents never share state.

use rayon::prelude::*;

use crate::anchor::{anchor_document, AnchorOptions, QuoteSelector};
use crate::dom::{DocumentAccess, XmlDocument};
use crate::error::{AnchorError, ParseError};
use crate::text::TextRange;

/// Anchor the same selectors in every document, results aligned with `docs`
pub fn anchor_parallel<D: DocumentAccess + Sync>(
    docs: &[D],
    selectors: &[QuoteSelector],
    options: &AnchorOptions,
) -> Vec<Result<Vec<Option<TextRange>>, AnchorError>> {
    docs.par_iter()
        .map(|doc| anchor_document(doc, selectors, options))
        .collect()
}

/// Parse many inputs in parallel, results aligned with `inputs`
pub fn parse_parallel(inputs: Vec<Vec<u8>>) -> Vec<Result<XmlDocument, ParseError>> {
    inputs.into_par_iter().map(XmlDocument::parse_bytes).collect()
}
