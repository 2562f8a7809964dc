//! Text normalization strategies
//!
//! A normalizer turns raw text into the form quotes are matched in, keeping
//! for every normalized char the raw char index it came from. Offsets are
//! char indices and never decrease.

use std::sync::Arc;

/// Normalized text with a mapping back to raw char positions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText {
    pub text: String,
    /// `offsets[i]` is the raw char index of the `i`th char of `text`
    pub offsets: Vec<usize>,
}

impl NormalizedText {
    /// Number of chars in `text`
    pub fn char_len(&self) -> usize {
        self.offsets.len()
    }
}

/// Text normalization strategy
///
/// Implementations must be deterministic and produce exactly one offset per
/// output char.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> NormalizedText;
}

impl std::fmt::Debug for dyn Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Normalizer")
    }
}

/// Leaves text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn normalize(&self, raw: &str) -> NormalizedText {
        let len = raw.chars().count();
        NormalizedText {
            text: raw.to_owned(),
            offsets: (0..len).collect(),
        }
    }
}

/// Lower-cases all chars and drops whitespace
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCaseAndWhitespace;

impl Normalizer for IgnoreCaseAndWhitespace {
    fn normalize(&self, raw: &str) -> NormalizedText {
        let mut text = String::with_capacity(raw.len());
        let mut offsets = Vec::with_capacity(raw.len());

        for (i, c) in raw.chars().enumerate() {
            // Some chars lower-case to several; all of them map back to `i`
            for lower in c.to_lowercase() {
                if !lower.is_whitespace() {
                    text.push(lower);
                    offsets.push(i);
                }
            }
        }

        NormalizedText { text, offsets }
    }
}

/// Bundled normalizers selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizerKind {
    #[default]
    None,
    IgnoreCaseAndWhitespace,
}

impl NormalizerKind {
    /// Parse from a configuration name (`none`, `ignore_case_and_whitespace`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(NormalizerKind::None),
            "ignore_case_and_whitespace" => Some(NormalizerKind::IgnoreCaseAndWhitespace),
            _ => None,
        }
    }

    pub fn into_normalizer(self) -> Arc<dyn Normalizer> {
        match self {
            NormalizerKind::None => Arc::new(IdentityNormalizer),
            NormalizerKind::IgnoreCaseAndWhitespace => Arc::new(IgnoreCaseAndWhitespace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let normalized = IdentityNormalizer.normalize("Foo bär");
        assert_eq!(normalized.text, "Foo bär");
        assert_eq!(normalized.offsets, [0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_ignore_case_and_whitespace_text() {
        let normalized = IgnoreCaseAndWhitespace.normalize("foo BAR baz");
        assert_eq!(normalized.text, "foobarbaz");
    }

    #[test]
    fn test_ignore_case_and_whitespace_offsets() {
        let normalized = IgnoreCaseAndWhitespace.normalize("foo bar baz");
        assert_eq!(normalized.offsets, [0, 1, 2, 4, 5, 6, 8, 9, 10]);
    }

    #[test]
    fn test_all_whitespace_kinds_dropped() {
        let normalized = IgnoreCaseAndWhitespace.normalize("a\tb\nc\u{a0}d");
        assert_eq!(normalized.text, "abcd");
        assert_eq!(normalized.offsets, [0, 2, 4, 6]);
    }

    #[test]
    fn test_expanding_lowercase_repeats_offset() {
        // U+0130 lower-cases to 'i' followed by a combining dot
        let normalized = IgnoreCaseAndWhitespace.normalize("x\u{130}y");
        assert_eq!(normalized.text, "xi\u{307}y");
        assert_eq!(normalized.offsets, [0, 1, 1, 2]);
        assert_eq!(normalized.char_len(), normalized.text.chars().count());
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(NormalizerKind::from_name("none"), Some(NormalizerKind::None));
        assert_eq!(
            NormalizerKind::from_name("ignore_case_and_whitespace"),
            Some(NormalizerKind::IgnoreCaseAndWhitespace)
        );
        assert_eq!(NormalizerKind::from_name("nfc"), None);

        let normalizer = NormalizerKind::IgnoreCaseAndWhitespace.into_normalizer();
        assert_eq!(normalizer.normalize("A B").text, "ab");
    }
}
