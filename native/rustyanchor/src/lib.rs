//! RustyAnchor - Fuzzy quote anchoring over XML/HTML documents
//!
//! Relocates previously captured text quotes in a document whose content may
//! have drifted, and reports where they landed as (node, offset) ranges.
//!
//! Pipeline:
//! - Parse: lenient reader builds an arena DOM (parse)
//! - Flatten: text content offset map over a subtree
//! - Match: exact search first, batched approximate search second (anchor)
//! - Parallel: many documents at once (anchor_parallel)

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

pub mod anchor;
pub mod core;
pub mod dom;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod reader;
pub mod strategy;
pub mod text;

mod resource;
mod term;

use dom::{DocumentAccess, XmlDocument};
use resource::{DocumentRef, DocumentResource};
use term::{decode_options, decode_range, decode_selectors, error_term, ranges_to_term, selector_to_term, str_to_binary};

pub use anchor::{anchor, anchor_one, anchor_with, describe, AnchorOptions, QuoteSelector};
pub use error::{AnchorError, MatchError, ParseError};
pub use text::TextRange;

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Documents
// ============================================================================

/// Parse a document (returns ResourceArc or {:error, reason})
/// Lenient mode - malformed markup never fails, undecodable bytes do
#[rustler::nif(schedule = "DirtyCpu")]
fn parse<'a>(env: Env<'a>, input: Binary<'a>) -> NifResult<Term<'a>> {
    let doc = XmlDocument::parse_bytes(input.as_slice().to_vec()).map_err(error_term)?;
    let arc = ResourceArc::new(DocumentResource::new(doc));
    Ok(arc.encode(env))
}

/// Flattened text content of the root element
#[rustler::nif]
fn text_content<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    let content = doc_ref
        .with_document(|doc| match doc.root_element_id() {
            Some(root) => text::text_content(doc, root),
            None => String::new(),
        })
        .map_err(error_term)?;
    Ok(str_to_binary(env, &content))
}

// ============================================================================
// Anchoring
// ============================================================================

/// Anchor selectors in a parsed document
/// Returns one range map or nil per selector, in order
#[rustler::nif(name = "anchor", schedule = "DirtyCpu")]
fn anchor_doc<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    selectors: Vec<Term<'a>>,
    opts: Term<'a>,
) -> NifResult<Term<'a>> {
    let selectors = decode_selectors(selectors)?;
    let options = decode_options(opts)?;

    doc_ref
        .with_document(|doc| {
            let ranges = anchor::anchor_document(doc, &selectors, &options).map_err(error_term)?;
            ranges_to_term(env, doc, &ranges)
        })
        .map_err(error_term)?
}

/// Parse and immediately anchor (convenience function)
#[rustler::nif(schedule = "DirtyCpu")]
fn parse_and_anchor<'a>(
    env: Env<'a>,
    input: Binary<'a>,
    selectors: Vec<Term<'a>>,
    opts: Term<'a>,
) -> NifResult<Term<'a>> {
    let selectors = decode_selectors(selectors)?;
    let options = decode_options(opts)?;
    let doc = XmlDocument::parse_bytes(input.as_slice().to_vec()).map_err(error_term)?;

    let ranges = anchor::anchor_document(&doc, &selectors, &options).map_err(error_term)?;
    ranges_to_term(env, &doc, &ranges)
}

/// Parse and anchor many documents in parallel
/// Returns, per input, a list of range maps / nils or {:error, reason}
#[rustler::nif(name = "anchor_parallel", schedule = "DirtyCpu")]
fn anchor_many<'a>(
    env: Env<'a>,
    inputs: Vec<Binary<'a>>,
    selectors: Vec<Term<'a>>,
    opts: Term<'a>,
) -> NifResult<Term<'a>> {
    let selectors = decode_selectors(selectors)?;
    let options = decode_options(opts)?;

    let owned: Vec<Vec<u8>> = inputs.iter().map(|b| b.as_slice().to_vec()).collect();
    let parsed = strategy::parse_parallel(owned);

    // Anchor only the documents that decoded; keep positions for the output
    let docs: Vec<&XmlDocument> = parsed.iter().filter_map(|r| r.as_ref().ok()).collect();
    let mut anchored = strategy::anchor_parallel(&docs, &selectors, &options).into_iter();

    let mut items = Vec::with_capacity(parsed.len());
    for result in &parsed {
        let item = match result {
            Ok(doc) => match anchored.next() {
                Some(Ok(ranges)) => ranges_to_term(env, doc, &ranges)?,
                Some(Err(e)) => (rustler::types::atom::error(), e.to_string()).encode(env),
                None => rustler::types::atom::nil().encode(env),
            },
            Err(e) => (rustler::types::atom::error(), e.to_string()).encode(env),
        };
        items.push(item);
    }

    let mut list = Term::list_new_empty(env);
    for item in items.into_iter().rev() {
        list = list.list_prepend(item);
    }
    Ok(list)
}

/// Capture the text of a range map as a selector map
#[rustler::nif(name = "describe")]
fn describe_range<'a>(env: Env<'a>, doc_ref: DocumentRef, range: Term<'a>) -> NifResult<Term<'a>> {
    let range = decode_range(range)?;
    let selector = doc_ref
        .with_document(|doc| anchor::describe(doc, &range))
        .map_err(error_term)?;
    selector_to_term(env, &selector)
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.RustyAnchor.Native");
