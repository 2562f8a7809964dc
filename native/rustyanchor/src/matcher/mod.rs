//! Approximate string matching
//!
//! `ApproxMatcher` is the seam the anchoring engine searches through.
//! `EditDistanceMatcher` is the bundled implementation: Sellers' algorithm
//! with Ukkonen's cut-off to find match ends, then an end-anchored reverse
//! pass to recover each start.
//!
//! All positions are char indices into the haystack.

use crate::error::MatchError;

/// A match of a pattern in a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Start char index (inclusive)
    pub start: usize,
    /// End char index (exclusive)
    pub end: usize,
    /// Edit distance between the pattern and `text[start..end]`
    pub errors: usize,
}

/// One pattern of a batched search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternQuery<'a> {
    pub pattern: &'a str,
    pub max_errors: usize,
}

/// Bounded edit-distance search over a text
pub trait ApproxMatcher: Send + Sync {
    /// Every match of `pattern` in `text` with at most `max_errors` edits
    fn search(&self, text: &str, pattern: &str, max_errors: usize) -> Result<Vec<Match>, MatchError>;

    /// Search several patterns at once, results index-aligned with `patterns`
    ///
    /// Must return the same candidates as calling `search` per pattern.
    fn multi_search(
        &self,
        text: &str,
        patterns: &[PatternQuery<'_>],
    ) -> Result<Vec<Vec<Match>>, MatchError> {
        patterns
            .iter()
            .map(|query| self.search(text, query.pattern, query.max_errors))
            .collect()
    }
}

/// Levenshtein matcher with unit costs for insertion, deletion and substitution
#[derive(Debug, Clone, Copy, Default)]
pub struct EditDistanceMatcher;

impl EditDistanceMatcher {
    pub fn new() -> Self {
        EditDistanceMatcher
    }
}

impl ApproxMatcher for EditDistanceMatcher {
    fn search(&self, text: &str, pattern: &str, max_errors: usize) -> Result<Vec<Match>, MatchError> {
        let text: Vec<char> = text.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();
        Ok(find_matches(&text, &pattern, max_errors))
    }

    fn multi_search(
        &self,
        text: &str,
        patterns: &[PatternQuery<'_>],
    ) -> Result<Vec<Vec<Match>>, MatchError> {
        // Decode the haystack once for the whole batch
        let text: Vec<char> = text.chars().collect();
        Ok(patterns
            .iter()
            .map(|query| {
                let pattern: Vec<char> = query.pattern.chars().collect();
                find_matches(&text, &pattern, query.max_errors)
            })
            .collect())
    }
}

/// All matches within `k` errors, ordered by end position
fn find_matches(text: &[char], pattern: &[char], k: usize) -> Vec<Match> {
    let m = pattern.len();

    if m == 0 {
        return (0..=text.len())
            .map(|pos| Match {
                start: pos,
                end: pos,
                errors: 0,
            })
            .collect();
    }

    find_match_ends(text, pattern, k)
        .into_iter()
        .map(|(end, errors)| Match {
            start: find_match_start(text, pattern, end, errors),
            end,
            errors,
        })
        .collect()
}

/// Sellers' algorithm: end positions where some substring ending there is
/// within `k` edits of `pattern`, with that minimum error count
fn find_match_ends(text: &[char], pattern: &[char], k: usize) -> Vec<(usize, usize)> {
    let m = pattern.len();
    let cap = k.saturating_add(1);

    // col[i]: best distance between pattern[..i] and a substring ending at the
    // current text position. Values above `k` are clamped to `cap`.
    let mut col: Vec<usize> = (0..=m).map(|i| i.min(cap)).collect();
    let mut last_active = k.min(m);
    let mut ends = Vec::new();

    for (j, &tc) in text.iter().enumerate() {
        // Rows past last_active + 1 cannot drop to `k` or below this column
        let limit = (last_active + 1).min(m);
        let mut diag = col[0];

        for i in 1..=limit {
            let above = col[i];
            let cost = usize::from(pattern[i - 1] != tc);
            let value = (diag + cost).min(above + 1).min(col[i - 1] + 1).min(cap);
            diag = above;
            col[i] = value;
        }

        let mut active = limit;
        while active > 0 && col[active] > k {
            active -= 1;
        }
        last_active = active;

        if limit == m && col[m] <= k {
            ends.push((j + 1, col[m]));
        }
    }

    ends
}

/// Smallest start such that `pattern` is within `errors` edits of
/// `text[start..end]`
fn find_match_start(text: &[char], pattern: &[char], end: usize, errors: usize) -> usize {
    let m = pattern.len();
    let max_len = end.min(m + errors);

    // Reverse DP anchored at `end`: col[i] is the distance between the last
    // `i` pattern chars and the last `len` text chars before `end`.
    let mut col: Vec<usize> = (0..=m).collect();
    let mut best = if col[m] <= errors { end } else { usize::MAX };

    for len in 1..=max_len {
        let tc = text[end - len];
        let mut diag = col[0];
        col[0] = len;

        for i in 1..=m {
            let above = col[i];
            let cost = usize::from(pattern[m - i] != tc);
            let value = (diag + cost).min(above + 1).min(col[i - 1] + 1);
            diag = above;
            col[i] = value;
        }

        if col[m] <= errors {
            best = end - len;
        }
    }

    if best == usize::MAX {
        end.saturating_sub(m)
    } else {
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(text: &str, pattern: &str, k: usize) -> Vec<Match> {
        EditDistanceMatcher.search(text, pattern, k).unwrap()
    }

    fn levenshtein(a: &str, b: &str) -> usize {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        for i in 1..=a.len() {
            let mut cur = vec![i; b.len() + 1];
            for j in 1..=b.len() {
                let cost = usize::from(a[i - 1] != b[j - 1]);
                cur[j] = (prev[j - 1] + cost).min(prev[j] + 1).min(cur[j - 1] + 1);
            }
            prev = cur;
        }
        prev[b.len()]
    }

    fn slice(text: &str, m: &Match) -> String {
        text.chars().skip(m.start).take(m.end - m.start).collect()
    }

    #[test]
    fn test_exact_match() {
        let matches = search("four score and seven", "score", 0);
        assert_eq!(
            matches,
            [Match {
                start: 5,
                end: 10,
                errors: 0
            }]
        );
    }

    #[test]
    fn test_no_match_within_budget() {
        assert!(search("four score and seven", "the worst", 1).is_empty());
    }

    #[test]
    fn test_one_error() {
        let text = "four score and seven years ago";
        let matches = search(text, "score and sven", 1);
        assert!(!matches.is_empty());
        let best = matches.iter().min_by_key(|m| m.errors).unwrap();
        assert_eq!(best.errors, 1);
        assert_eq!(slice(text, best), "score and seven");
    }

    #[test]
    fn test_errors_match_reported_span() {
        let text = "Jack and Jill and Robin and Mary";
        let pattern = "Jill annd";
        for m in search(text, pattern, 3) {
            assert!(m.errors <= 3);
            assert_eq!(levenshtein(pattern, &slice(text, &m)), m.errors);
        }
    }

    #[test]
    fn test_longest_start_preferred() {
        let text = "Jack and Jill and Robin and Mary";
        let matches = search(text, "Jill annd", 1);
        assert_eq!(matches.len(), 1);
        assert_eq!(slice(text, &matches[0]), "Jill and");
    }

    #[test]
    fn test_ordered_by_end() {
        let matches = search("abcabcabc", "abc", 0);
        let ends: Vec<_> = matches.iter().map(|m| m.end).collect();
        assert_eq!(ends, [3, 6, 9]);
    }

    #[test]
    fn test_empty_pattern() {
        let matches = search("ab", "", 0);
        assert_eq!(matches.len(), 3);
        assert!(matches.iter().all(|m| m.errors == 0 && m.start == m.end));
    }

    #[test]
    fn test_empty_text() {
        assert!(search("", "abc", 1).is_empty());
        // Only non-empty spans are reported for a non-empty pattern
        assert!(search("", "ab", 2).is_empty());
    }

    #[test]
    fn test_budget_covering_whole_pattern() {
        let matches = search("xy", "ab", 2);
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.start < m.end && m.errors == 2));
    }

    #[test]
    fn test_multibyte_positions() {
        let matches = search("naïve café", "café", 0);
        assert_eq!(matches[0].start, 6);
        assert_eq!(matches[0].end, 10);
    }

    #[test]
    fn test_multi_search_equals_search() {
        let text = "four score and seven years ago";
        let queries = [
            PatternQuery {
                pattern: "sevn",
                max_errors: 1,
            },
            PatternQuery {
                pattern: "yeers",
                max_errors: 2,
            },
            PatternQuery {
                pattern: "zzzz",
                max_errors: 0,
            },
        ];

        let batched = EditDistanceMatcher.multi_search(text, &queries).unwrap();
        assert_eq!(batched.len(), queries.len());
        for (query, result) in queries.iter().zip(&batched) {
            assert_eq!(result, &search(text, query.pattern, query.max_errors));
        }
        assert!(batched[2].is_empty());
    }
}
