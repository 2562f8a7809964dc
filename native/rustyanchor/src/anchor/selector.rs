//! Quote selectors

use crate::dom::DocumentAccess;
use crate::text::TextRange;

/// A quote to relocate in a document
///
/// `prefix` and `suffix` record the text around the quote when it was
/// captured. Matching does not use them yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuoteSelector {
    pub exact: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl QuoteSelector {
    pub fn new(exact: impl Into<String>) -> Self {
        QuoteSelector {
            exact: exact.into(),
            prefix: None,
            suffix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

impl From<&str> for QuoteSelector {
    fn from(exact: &str) -> Self {
        QuoteSelector::new(exact)
    }
}

/// Capture the text of `range` as an exact-match selector
pub fn describe<D: DocumentAccess + ?Sized>(doc: &D, range: &TextRange) -> QuoteSelector {
    QuoteSelector::new(range.to_text(doc))
}
