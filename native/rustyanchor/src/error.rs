//! Error types
//!
//! "No match" is not an error: anchoring reports it as `None` per selector.
//! These types cover input that cannot be decoded, configuration that cannot
//! be honoured, and failures raised by a supplied matcher.

use thiserror::Error;

/// Failure while turning input bytes into a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input bytes could not be decoded to UTF-8 text
    #[error("invalid {encoding} input: {message}")]
    Encoding {
        encoding: &'static str,
        message: String,
    },
}

/// Failure raised by an approximate matcher
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("approximate search failed: {message}")]
pub struct MatchError {
    pub message: String,
}

impl MatchError {
    pub fn new(message: impl Into<String>) -> Self {
        MatchError {
            message: message.into(),
        }
    }
}

/// Failure of an anchoring call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnchorError {
    /// `max_error_rate` must be a finite, non-negative fraction
    #[error("max_error_rate must be finite and non-negative, got {0}")]
    InvalidErrorRate(f64),

    /// The matcher failed; the error is passed through untranslated
    #[error(transparent)]
    Matcher(#[from] MatchError),
}
