//! Elixir Term Conversion Utilities
//!
//! Decodes selector and option maps coming from Elixir and encodes ranges
//! back as maps:
//!
//! - selector: `%{exact: binary, prefix: binary | nil, suffix: binary | nil}`
//! - options: `%{max_error_count: integer, max_error_rate: number,
//!   normalize: :none | :ignore_case_and_whitespace}` (all keys optional)
//! - range: `%{start_node: integer, start_offset: integer, end_node: integer,
//!   end_offset: integer, text: binary}`

use rustler::types::atom;
use rustler::{Atom, Decoder, Encoder, Env, Error, NewBinary, NifResult, Term};

use crate::anchor::{AnchorOptions, QuoteSelector};
use crate::dom::DocumentAccess;
use crate::normalize::NormalizerKind;
use crate::text::{BoundaryPoint, TextRange};

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    exact,
    prefix,
    suffix,
    max_error_count,
    max_error_rate,
    normalize,
    start_node,
    start_offset,
    end_node,
    end_offset,
    text,
}

/// Build an `{:error, message}` result from any displayable error
pub fn error_term(err: impl std::fmt::Display) -> Error {
    Error::Term(Box::new(err.to_string()))
}

// ============================================================================
// Decoding
// ============================================================================

/// Read an optional map key; a missing key and `nil` both give `None`
fn optional_field<'a, T: Decoder<'a>>(map: Term<'a>, key: Atom) -> NifResult<Option<T>> {
    match map.map_get(key) {
        Ok(value) => value.decode::<Option<T>>(),
        Err(_) => Ok(None),
    }
}

/// Read a map key that must be present
fn required_field<'a>(map: Term<'a>, key: Atom, what: &str) -> NifResult<Term<'a>> {
    map.map_get(key)
        .map_err(|_| error_term(format!("{what} map is missing a required key")))
}

/// Decode a selector map
pub fn decode_selector(term: Term<'_>) -> NifResult<QuoteSelector> {
    let exact_value: String = required_field(term, exact(), "selector")?.decode()?;

    Ok(QuoteSelector {
        exact: exact_value,
        prefix: optional_field(term, prefix())?,
        suffix: optional_field(term, suffix())?,
    })
}

pub fn decode_selectors(terms: Vec<Term<'_>>) -> NifResult<Vec<QuoteSelector>> {
    terms.into_iter().map(decode_selector).collect()
}

/// Decode an options map; `nil` selects the defaults
pub fn decode_options(term: Term<'_>) -> NifResult<AnchorOptions> {
    let mut options = AnchorOptions::default();
    if term.is_atom() && term.decode::<Atom>()? == atom::nil() {
        return Ok(options);
    }
    if !term.is_map() {
        return Err(error_term("options must be a map"));
    }

    options.max_error_count = optional_field(term, max_error_count())?;

    // Accept integers for the rate as well, e.g. `max_error_rate: 0`
    if let Ok(value) = term.map_get(max_error_rate()) {
        options.max_error_rate = match value.decode::<Option<f64>>() {
            Ok(rate) => rate,
            Err(_) => Some(value.decode::<i64>()? as f64),
        };
    }

    if let Ok(value) = term.map_get(normalize()) {
        let name = value.atom_to_string()?;
        if name != "nil" {
            let kind = NormalizerKind::from_name(&name)
                .ok_or_else(|| error_term(format!("unknown normalizer: {name}")))?;
            options = options.with_normalizer_kind(kind);
        }
    }

    Ok(options)
}

/// Decode a range map (the `text` key is ignored)
pub fn decode_range(term: Term<'_>) -> NifResult<TextRange> {
    let start = BoundaryPoint::new(
        required_field(term, start_node(), "range")?.decode()?,
        required_field(term, start_offset(), "range")?.decode()?,
    );
    let end = BoundaryPoint::new(
        required_field(term, end_node(), "range")?.decode()?,
        required_field(term, end_offset(), "range")?.decode()?,
    );
    Ok(TextRange::new(start, end))
}

// ============================================================================
// Encoding
// ============================================================================

/// Convert a range to a map, including the text it covers
pub fn range_to_term<'a, D: DocumentAccess + ?Sized>(
    env: Env<'a>,
    doc: &D,
    range: &TextRange,
) -> NifResult<Term<'a>> {
    Term::map_new(env)
        .map_put(start_node(), range.start.node)?
        .map_put(start_offset(), range.start.offset)?
        .map_put(end_node(), range.end.node)?
        .map_put(end_offset(), range.end.offset)?
        .map_put(text(), str_to_binary(env, &range.to_text(doc)))
}

/// Convert anchoring results to a list of range maps and `nil`s
pub fn ranges_to_term<'a, D: DocumentAccess + ?Sized>(
    env: Env<'a>,
    doc: &D,
    ranges: &[Option<TextRange>],
) -> NifResult<Term<'a>> {
    let mut list = Term::list_new_empty(env);
    for range in ranges.iter().rev() {
        let item = match range {
            Some(range) => range_to_term(env, doc, range)?,
            None => atom::nil().encode(env),
        };
        list = list.list_prepend(item);
    }
    Ok(list)
}

/// Convert a selector to a map
pub fn selector_to_term<'a>(env: Env<'a>, selector: &QuoteSelector) -> NifResult<Term<'a>> {
    let optional = |value: &Option<String>| match value {
        Some(s) => str_to_binary(env, s),
        None => atom::nil().encode(env),
    };

    Term::map_new(env)
        .map_put(exact(), str_to_binary(env, &selector.exact))?
        .map_put(prefix(), optional(&selector.prefix))?
        .map_put(suffix(), optional(&selector.suffix))
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
