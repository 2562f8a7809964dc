//! Anchoring configuration

use std::sync::Arc;

use crate::error::AnchorError;
use crate::normalize::{IdentityNormalizer, Normalizer, NormalizerKind};

/// Error rate used when neither a count nor a rate is configured
pub const DEFAULT_MAX_ERROR_RATE: f64 = 0.22;

/// Number of quotes handed to the matcher per approximate search call
pub const GROUP_SIZE: usize = 5;

/// Options for an anchoring call
///
/// `max_error_count` takes precedence over `max_error_rate`. With neither
/// set, `DEFAULT_MAX_ERROR_RATE` applies. Rates are a fraction of the
/// normalized quote length, rounded down to whole errors.
#[derive(Debug, Clone)]
pub struct AnchorOptions {
    pub max_error_count: Option<usize>,
    pub max_error_rate: Option<f64>,
    pub normalizer: Arc<dyn Normalizer>,
}

impl Default for AnchorOptions {
    fn default() -> Self {
        AnchorOptions {
            max_error_count: None,
            max_error_rate: None,
            normalizer: Arc::new(IdentityNormalizer),
        }
    }
}

impl AnchorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_error_count(mut self, count: usize) -> Self {
        self.max_error_count = Some(count);
        self
    }

    pub fn with_max_error_rate(mut self, rate: f64) -> Self {
        self.max_error_rate = Some(rate);
        self
    }

    pub fn with_normalizer<N: Normalizer + 'static>(mut self, normalizer: N) -> Self {
        self.normalizer = Arc::new(normalizer);
        self
    }

    pub fn with_normalizer_kind(mut self, kind: NormalizerKind) -> Self {
        self.normalizer = kind.into_normalizer();
        self
    }

    /// Reject rates that are negative, NaN or infinite
    pub fn validate(&self) -> Result<(), AnchorError> {
        match self.max_error_rate {
            Some(rate) if !rate.is_finite() || rate < 0.0 => Err(AnchorError::InvalidErrorRate(rate)),
            _ => Ok(()),
        }
    }

    /// Error budget for a normalized quote of `quote_len` chars
    pub fn max_errors_for(&self, quote_len: usize) -> usize {
        if let Some(count) = self.max_error_count {
            return count;
        }
        let rate = self.max_error_rate.unwrap_or(DEFAULT_MAX_ERROR_RATE);
        (rate * quote_len as f64).floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        let options = AnchorOptions::default();
        assert_eq!(options.max_errors_for(9), 1);
        assert_eq!(options.max_errors_for(14), 3);
        assert_eq!(options.max_errors_for(0), 0);
    }

    #[test]
    fn test_count_overrides_rate() {
        let options = AnchorOptions::new()
            .with_max_error_rate(0.5)
            .with_max_error_count(2);
        assert_eq!(options.max_errors_for(100), 2);
    }

    #[test]
    fn test_rate_rounds_down() {
        let options = AnchorOptions::new().with_max_error_rate(0.1);
        assert_eq!(options.max_errors_for(12), 1);

        let options = AnchorOptions::new().with_max_error_rate(0.3);
        assert_eq!(options.max_errors_for(12), 3);
    }

    #[test]
    fn test_validate() {
        assert!(AnchorOptions::new().validate().is_ok());
        assert!(AnchorOptions::new().with_max_error_rate(0.0).validate().is_ok());

        for rate in [-0.1, f64::NAN, f64::INFINITY] {
            let result = AnchorOptions::new().with_max_error_rate(rate).validate();
            assert!(matches!(result, Err(AnchorError::InvalidErrorRate(_))));
        }
    }

    #[test]
    fn test_normalizer_kind() {
        let options = AnchorOptions::new().with_normalizer_kind(NormalizerKind::IgnoreCaseAndWhitespace);
        assert_eq!(options.normalizer.normalize("A b").text, "ab");
    }
}
