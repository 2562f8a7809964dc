//! Quote Anchoring Engine
//!
//! Relocates quotes in the text of a node tree:
//! 1. Flatten the tree once into an offset map and normalize its text
//! 2. Normalize each quote with the same normalizer
//! 3. Fast path: literal search of the normalized quote
//! 4. Slow path: remaining quotes, shortest first, go to the approximate
//!    matcher in groups of `GROUP_SIZE`
//! 5. Keep the candidate with the fewest errors (first one wins ties)
//! 6. Map normalized -> raw -> (node, offset)

pub mod options;
pub mod selector;

pub use options::{AnchorOptions, DEFAULT_MAX_ERROR_RATE, GROUP_SIZE};
pub use selector::{describe, QuoteSelector};

use memchr::memmem;
use tracing::{debug, trace};

use crate::dom::{DocumentAccess, NodeId};
use crate::error::{AnchorError, MatchError};
use crate::matcher::{ApproxMatcher, EditDistanceMatcher, Match, PatternQuery};
use crate::text::{range_from_text_offsets, TextContentOffsetMap, TextRange};

/// A selector's quote after normalization
struct NormalizedQuote {
    /// Position of the selector in the input
    index: usize,
    text: String,
    char_len: usize,
}

/// Anchor `selectors` in the text under `root` with the bundled matcher
///
/// Returns one entry per selector, in input order; `None` when no match is
/// within the error budget.
pub fn anchor<D: DocumentAccess + ?Sized>(
    doc: &D,
    root: NodeId,
    selectors: &[QuoteSelector],
    options: &AnchorOptions,
) -> Result<Vec<Option<TextRange>>, AnchorError> {
    anchor_with(doc, root, selectors, options, &EditDistanceMatcher)
}

/// Anchor `selectors` under the document's root element
///
/// A document without a root element has no text, so every selector
/// resolves against an empty map.
pub fn anchor_document<D: DocumentAccess + ?Sized>(
    doc: &D,
    selectors: &[QuoteSelector],
    options: &AnchorOptions,
) -> Result<Vec<Option<TextRange>>, AnchorError> {
    let root = doc.root_element_id().unwrap_or_else(|| doc.document_node_id());
    anchor(doc, root, selectors, options)
}

/// Anchor a single selector
pub fn anchor_one<D: DocumentAccess + ?Sized>(
    doc: &D,
    root: NodeId,
    selector: &QuoteSelector,
    options: &AnchorOptions,
) -> Result<Vec<Option<TextRange>>, AnchorError> {
    anchor(doc, root, std::slice::from_ref(selector), options)
}

/// Anchor `selectors` using a supplied approximate matcher
///
/// Matcher failures are returned as `AnchorError::Matcher`.
pub fn anchor_with<D, M>(
    doc: &D,
    root: NodeId,
    selectors: &[QuoteSelector],
    options: &AnchorOptions,
    matcher: &M,
) -> Result<Vec<Option<TextRange>>, AnchorError>
where
    D: DocumentAccess + ?Sized,
    M: ApproxMatcher + ?Sized,
{
    options.validate()?;

    let map = TextContentOffsetMap::build(doc, root);
    let normalizer = options.normalizer.as_ref();
    let mut normalized_doc = normalizer.normalize(&map.text);
    // Sentinel so a match ending at the end of the normalized text resolves
    normalized_doc.offsets.push(map.char_len());

    debug!(
        selectors = selectors.len(),
        text_len = map.char_len(),
        nodes = map.nodes.len(),
        "anchoring quotes"
    );

    let quotes: Vec<NormalizedQuote> = selectors
        .iter()
        .enumerate()
        .map(|(index, selector)| {
            let normalized = normalizer.normalize(&selector.exact);
            NormalizedQuote {
                index,
                char_len: normalized.char_len(),
                text: normalized.text,
            }
        })
        .collect();

    let mut candidates: Vec<Vec<Match>> = vec![Vec::new(); selectors.len()];

    // Fast path
    let haystack = normalized_doc.text.as_bytes();
    let mut pending = Vec::new();
    for quote in &quotes {
        match memmem::find(haystack, quote.text.as_bytes()) {
            Some(pos) => {
                let start = normalized_doc.text[..pos].chars().count();
                candidates[quote.index].push(Match {
                    start,
                    end: start + quote.char_len,
                    errors: 0,
                });
            }
            None => pending.push(quote),
        }
    }

    debug!(
        exact = quotes.len() - pending.len(),
        pending = pending.len(),
        "exact search done"
    );

    // Slow path
    pending.sort_by_key(|quote| quote.char_len);
    for (group_idx, group) in pending.chunks(GROUP_SIZE).enumerate() {
        let queries: Vec<PatternQuery<'_>> = group
            .iter()
            .map(|quote| PatternQuery {
                pattern: &quote.text,
                max_errors: options.max_errors_for(quote.char_len),
            })
            .collect();

        trace!(group = group_idx, patterns = queries.len(), "approximate search");
        let results = matcher.multi_search(&normalized_doc.text, &queries)?;
        if results.len() != group.len() {
            return Err(MatchError::new(format!(
                "expected {} result sets, got {}",
                group.len(),
                results.len()
            ))
            .into());
        }

        for (quote, matches) in group.iter().zip(results) {
            candidates[quote.index] = matches;
        }
    }

    let ranges = candidates
        .iter()
        .map(|matches| {
            matches
                .iter()
                .min_by_key(|m| m.errors)
                .map(|best| remap(&map, &normalized_doc.offsets, best))
                .transpose()
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        matched = ranges.iter().filter(|r| r.is_some()).count(),
        "anchoring done"
    );

    Ok(ranges)
}

/// Map a match in normalized coordinates to a range in the document
///
/// The raw end is one past the last matched char's raw offset, so chars the
/// normalizer dropped after the match are not included.
fn remap(map: &TextContentOffsetMap, offsets: &[usize], found: &Match) -> Result<TextRange, AnchorError> {
    let out_of_bounds = || {
        MatchError::new(format!(
            "match {}..{} outside text of {} chars",
            found.start,
            found.end,
            offsets.len() - 1
        ))
    };

    let raw_start = *offsets.get(found.start).ok_or_else(out_of_bounds)?;
    let raw_end = if found.end > found.start {
        offsets.get(found.end - 1).ok_or_else(out_of_bounds)? + 1
    } else {
        raw_start
    };

    Ok(range_from_text_offsets(map, raw_start, raw_end))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::dom::{NodeKind, XmlDocument};
    use crate::normalize::IgnoreCaseAndWhitespace;
    use crate::text::BoundaryPoint;

    fn anchor_texts(xml: &str, quotes: &[&str], options: &AnchorOptions) -> Vec<Option<String>> {
        let doc = XmlDocument::parse(xml);
        let root = doc.root_element_id().unwrap();
        let selectors: Vec<_> = quotes.iter().map(|&q| QuoteSelector::new(q)).collect();
        anchor(&doc, root, &selectors, options)
            .unwrap()
            .into_iter()
            .map(|range| range.map(|r| r.to_text(&doc)))
            .collect()
    }

    fn anchor_text(xml: &str, quote: &str, options: &AnchorOptions) -> Option<String> {
        anchor_texts(xml, &[quote], options).remove(0)
    }

    const GETTYSBURG: &str = "<div><i>four score and seven years ago</i></div>";

    #[test]
    fn test_exact_match() {
        let text = anchor_text(GETTYSBURG, "score and seven", &AnchorOptions::default());
        assert_eq!(text.as_deref(), Some("score and seven"));
    }

    #[test]
    fn test_close_match() {
        let text = anchor_text(GETTYSBURG, "score and sven", &AnchorOptions::default());
        assert_eq!(text.as_deref(), Some("score and seven"));
    }

    #[test]
    fn test_no_match() {
        let text = anchor_text(GETTYSBURG, "the worst of times", &AnchorOptions::default());
        assert_eq!(text, None);
    }

    #[test]
    fn test_multiple_selectors() {
        let texts = anchor_texts(GETTYSBURG, &["four score", "and seven"], &AnchorOptions::default());
        assert_eq!(
            texts,
            [Some("four score".to_string()), Some("and seven".to_string())]
        );
    }

    #[test]
    fn test_order_preserved_across_paths() {
        // The first quote needs the slow path, the second is exact
        let texts = anchor_texts(
            GETTYSBURG,
            &["yeers ago", "four", "nothing like it at all"],
            &AnchorOptions::default(),
        );
        assert_eq!(
            texts,
            [Some("years ago".to_string()), Some("four".to_string()), None]
        );
    }

    #[test]
    fn test_lowest_error_count_wins() {
        let text = anchor_text(
            "<div>Jack and Jill and Robin and Mary</div>",
            "Jill annd",
            &AnchorOptions::default(),
        );
        assert_eq!(text.as_deref(), Some("Jill and"));
    }

    #[test]
    fn test_max_error_count() {
        let xml = "<div>four score and seven</div>";
        let options = AnchorOptions::new().with_max_error_count(1);
        assert_eq!(anchor_text(xml, "fouur sccore", &options), None);

        let options = AnchorOptions::new().with_max_error_count(5);
        assert!(anchor_text(xml, "fouur sccore", &options).is_some());
    }

    #[test]
    fn test_max_error_rate() {
        let xml = "<div>four score and seven</div>";
        let options = AnchorOptions::new().with_max_error_rate(0.1);
        assert_eq!(anchor_text(xml, "fouur sccore", &options), None);

        let options = AnchorOptions::new().with_max_error_rate(0.3);
        assert!(anchor_text(xml, "fouur sccore", &options).is_some());
    }

    #[test]
    fn test_normalizes_document() {
        let options = AnchorOptions::new()
            .with_max_error_count(1)
            .with_normalizer(IgnoreCaseAndWhitespace);
        let text = anchor_text("<div>a b c d</div>", "abcd", &options);
        assert_eq!(text.as_deref(), Some("a b c d"));
    }

    #[test]
    fn test_normalizes_quote() {
        let options = AnchorOptions::new()
            .with_max_error_count(1)
            .with_normalizer(IgnoreCaseAndWhitespace);
        let text = anchor_text("<div>abcd</div>", "a b c d", &options);
        assert_eq!(text.as_deref(), Some("abcd"));
    }

    #[test]
    fn test_match_ending_before_removed_char() {
        let options = AnchorOptions::new().with_normalizer(IgnoreCaseAndWhitespace);
        let text = anchor_text("<div>one fine day</div>", "fine", &options);
        assert_eq!(text.as_deref(), Some("fine"));
    }

    #[test]
    fn test_normalized_multibyte() {
        let options = AnchorOptions::new().with_normalizer(IgnoreCaseAndWhitespace);
        let text = anchor_text("<p>Ça coûte cher</p>", "ÇA COÛTE", &options);
        assert_eq!(text.as_deref(), Some("Ça coûte"));
    }

    #[test]
    fn test_match_spanning_nodes() {
        let doc = XmlDocument::parse("<p>one <b>two</b> three</p>");
        let root = doc.root_element_id().unwrap();

        let ranges = anchor_one(&doc, root, &QuoteSelector::new("e two th"), &AnchorOptions::default()).unwrap();
        let range = ranges[0].unwrap();
        assert_ne!(range.start.node, range.end.node);
        assert_eq!(range.to_text(&doc), "e two th");
    }

    #[test]
    fn test_match_at_end_of_text() {
        let text = anchor_text(GETTYSBURG, "years agoo", &AnchorOptions::default());
        assert_eq!(text.as_deref(), Some("years ago"));
    }

    #[test]
    fn test_empty_quote_collapses_at_start() {
        let doc = XmlDocument::parse("<div>hello</div>");
        let root = doc.root_element_id().unwrap();
        let first_text = doc.children(root).next().unwrap();

        let ranges = anchor_one(&doc, root, &QuoteSelector::new(""), &AnchorOptions::default()).unwrap();
        let range = ranges[0].unwrap();
        assert!(range.is_collapsed());
        assert_eq!(range, TextRange::collapsed(first_text, 0));
    }

    #[test]
    fn test_empty_document() {
        let doc = XmlDocument::parse("<div></div>");
        let root = doc.root_element_id().unwrap();
        let selectors = [QuoteSelector::new("abc"), QuoteSelector::new("")];

        let ranges = anchor(&doc, root, &selectors, &AnchorOptions::default()).unwrap();
        assert_eq!(ranges[0], None);
        assert_eq!(ranges[1], Some(TextRange::collapsed(root, 0)));
    }

    #[test]
    fn test_document_without_root_element() {
        let doc = XmlDocument::parse("<?xml version=\"1.0\"?><!-- only a comment -->");
        assert_eq!(doc.root_element_id(), None);
        let selectors = [QuoteSelector::new("only"), QuoteSelector::new("")];

        let ranges = anchor_document(&doc, &selectors, &AnchorOptions::default()).unwrap();
        assert_eq!(ranges[0], None);
        assert_eq!(ranges[1], Some(TextRange::collapsed(doc.document_node_id(), 0)));
    }

    #[test]
    fn test_processing_instruction_as_root() {
        let doc = XmlDocument::parse("<div>x<?note keep this ?>y</div>");
        let root = doc.root_element_id().unwrap();
        let pi = doc
            .children(root)
            .find(|&id| doc.node_kind(id) == Some(NodeKind::ProcessingInstruction))
            .unwrap();

        let ranges = anchor(&doc, pi, &[QuoteSelector::new("keep this")], &AnchorOptions::default()).unwrap();
        let range = ranges[0].unwrap();
        assert_eq!(range, TextRange::new(BoundaryPoint::new(pi, 0), BoundaryPoint::new(pi, 9)));
        assert_eq!(range.to_text(&doc), "keep this");

        // The same text is not part of the element's content
        let ranges = anchor(&doc, root, &[QuoteSelector::new("keep this")], &AnchorOptions::default()).unwrap();
        assert_eq!(ranges[0], None);
    }

    #[test]
    fn test_no_selectors() {
        let doc = XmlDocument::parse("<div>text</div>");
        let root = doc.root_element_id().unwrap();
        assert!(anchor(&doc, root, &[], &AnchorOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_prefix_and_suffix_ignored() {
        let doc = XmlDocument::parse("<div>Jack and Jill and Robin</div>");
        let root = doc.root_element_id().unwrap();
        // Context points at the second "and", matching still picks the first
        let selector = QuoteSelector::new("and").with_prefix("Jill ").with_suffix(" Robin");

        let ranges = anchor_one(&doc, root, &selector, &AnchorOptions::default()).unwrap();
        assert_eq!(ranges[0].unwrap().start.offset, 5);
    }

    #[test]
    fn test_invalid_error_rate_rejected() {
        let doc = XmlDocument::parse("<div>text</div>");
        let root = doc.root_element_id().unwrap();
        let selectors = [QuoteSelector::new("text")];

        for rate in [-0.5, f64::NAN, f64::NEG_INFINITY] {
            let options = AnchorOptions::new().with_max_error_rate(rate);
            let result = anchor(&doc, root, &selectors, &options);
            assert!(matches!(result, Err(AnchorError::InvalidErrorRate(_))));
        }
    }

    struct FailingMatcher;

    impl ApproxMatcher for FailingMatcher {
        fn search(&self, _text: &str, _pattern: &str, _max_errors: usize) -> Result<Vec<Match>, MatchError> {
            Err(MatchError::new("backend unavailable"))
        }
    }

    #[test]
    fn test_matcher_error_propagates() {
        let doc = XmlDocument::parse(GETTYSBURG);
        let root = doc.root_element_id().unwrap();

        let result = anchor_with(
            &doc,
            root,
            &[QuoteSelector::new("score and sven")],
            &AnchorOptions::default(),
            &FailingMatcher,
        );
        assert_eq!(
            result,
            Err(AnchorError::Matcher(MatchError::new("backend unavailable")))
        );

        // Exact hits never reach the matcher
        let result = anchor_with(
            &doc,
            root,
            &[QuoteSelector::new("score and seven")],
            &AnchorOptions::default(),
            &FailingMatcher,
        );
        assert!(result.is_ok());
    }

    /// Returns fixed candidates and records each batch it receives
    #[derive(Default)]
    struct RecordingMatcher {
        batches: Mutex<Vec<Vec<(String, usize)>>>,
        candidates: Vec<Match>,
    }

    impl ApproxMatcher for RecordingMatcher {
        fn search(&self, _text: &str, _pattern: &str, _max_errors: usize) -> Result<Vec<Match>, MatchError> {
            Ok(self.candidates.clone())
        }

        fn multi_search(
            &self,
            text: &str,
            patterns: &[PatternQuery<'_>],
        ) -> Result<Vec<Vec<Match>>, MatchError> {
            self.batches.lock().unwrap().push(
                patterns
                    .iter()
                    .map(|q| (q.pattern.to_string(), q.max_errors))
                    .collect(),
            );
            patterns
                .iter()
                .map(|q| self.search(text, q.pattern, q.max_errors))
                .collect()
        }
    }

    #[test]
    fn test_slow_path_batches_shortest_first() {
        let doc = XmlDocument::parse("<div>abc</div>");
        let root = doc.root_element_id().unwrap();
        let quotes = ["zzzzzzz", "z", "zzzzz", "zz", "zzzzzzzzzz", "zzz", "zzzz"];
        let selectors: Vec<_> = quotes.iter().map(|&q| QuoteSelector::new(q)).collect();
        let matcher = RecordingMatcher::default();

        let ranges = anchor_with(&doc, root, &selectors, &AnchorOptions::default(), &matcher).unwrap();
        assert_eq!(ranges, vec![None; quotes.len()]);

        let batches = matcher.batches.lock().unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), GROUP_SIZE);
        let patterns: Vec<&str> = batches.iter().flatten().map(|(p, _)| p.as_str()).collect();
        assert_eq!(
            patterns,
            ["z", "zz", "zzz", "zzzz", "zzzzz", "zzzzzzz", "zzzzzzzzzz"]
        );
        // floor(0.22 * 10)
        assert_eq!(batches[1][1].1, 2);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let doc = XmlDocument::parse("<div>abc abe</div>");
        let root = doc.root_element_id().unwrap();
        let matcher = RecordingMatcher {
            candidates: vec![
                Match {
                    start: 4,
                    end: 7,
                    errors: 2,
                },
                Match {
                    start: 0,
                    end: 3,
                    errors: 1,
                },
                Match {
                    start: 4,
                    end: 7,
                    errors: 1,
                },
            ],
            ..Default::default()
        };

        let ranges = anchor_with(&doc, root, &[QuoteSelector::new("abd")], &AnchorOptions::default(), &matcher).unwrap();
        assert_eq!(ranges[0].unwrap().to_text(&doc), "abc");
    }

    #[test]
    fn test_out_of_bounds_candidate_is_an_error() {
        let doc = XmlDocument::parse("<div>abc</div>");
        let root = doc.root_element_id().unwrap();
        let matcher = RecordingMatcher {
            candidates: vec![Match {
                start: 10,
                end: 12,
                errors: 0,
            }],
            ..Default::default()
        };

        let result = anchor_with(&doc, root, &[QuoteSelector::new("xyz")], &AnchorOptions::default(), &matcher);
        assert!(matches!(result, Err(AnchorError::Matcher(_))));
    }
}
