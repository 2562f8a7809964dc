//! String Interning Pool
//!
//! Element names, processing-instruction targets and node values are stored
//! once in a shared buffer and referenced by u32 id. Repeated strings
//! (tag names, whitespace-only text between tags) share a single entry.
//!
//! Uses hash-based lookup to avoid storing duplicate string data.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

/// Span of an interned string within the pool buffer
#[derive(Debug, Clone, Copy)]
struct Span {
    offset: u32,
    len: u32,
}

/// String interning pool
///
/// - `spans`: location of each interned string, indexed by id
/// - `data`: concatenated string bytes
/// - `hash_index`: hash -> list of ids (handles rare collisions)
#[derive(Debug)]
pub struct StringPool {
    spans: Vec<Span>,
    data: String,
    hash_index: HashMap<u64, Vec<u32>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    /// Create a new empty string pool
    pub fn new() -> Self {
        let mut pool = StringPool {
            spans: Vec::with_capacity(256),
            data: String::with_capacity(4096),
            hash_index: HashMap::new(),
        };
        // Id 0 is reserved for the empty string
        pool.spans.push(Span { offset: 0, len: 0 });
        pool
    }

    #[inline]
    fn compute_hash(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a string, returning its id
    pub fn intern(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return 0;
        }

        let hash = Self::compute_hash(s);

        if let Some(ids) = self.hash_index.get(&hash) {
            for &id in ids {
                if self.get_str(id) == Some(s) {
                    return id;
                }
            }
        }

        let offset = self.data.len() as u32;
        self.data.push_str(s);

        let id = self.spans.len() as u32;
        self.spans.push(Span {
            offset,
            len: s.len() as u32,
        });
        self.hash_index.entry(hash).or_default().push(id);

        id
    }

    /// Get a string by id
    pub fn get_str(&self, id: u32) -> Option<&str> {
        let span = self.spans.get(id as usize)?;
        let start = span.offset as usize;
        self.data.get(start..start + span.len as usize)
    }

    /// Number of unique strings stored (including the reserved empty string)
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Check if the pool holds nothing besides the reserved empty string
    pub fn is_empty(&self) -> bool {
        self.spans.len() <= 1
    }

    /// Total bytes of string data stored
    pub fn bytes_used(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_get() {
        let mut pool = StringPool::new();
        let id = pool.intern("hello");
        assert!(id > 0);
        assert_eq!(pool.get_str(id), Some("hello"));
    }

    #[test]
    fn test_intern_duplicate() {
        let mut pool = StringPool::new();
        let id1 = pool.intern("hello");
        let id2 = pool.intern("hello");
        assert_eq!(id1, id2);
        assert_eq!(pool.bytes_used(), 5);
    }

    #[test]
    fn test_intern_different() {
        let mut pool = StringPool::new();
        let id1 = pool.intern("hello");
        let id2 = pool.intern("world");
        assert_ne!(id1, id2);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_empty_string() {
        let mut pool = StringPool::new();
        assert_eq!(pool.intern(""), 0);
        assert_eq!(pool.get_str(0), Some(""));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_long_string_not_truncated() {
        let mut pool = StringPool::new();
        let long = "x".repeat(70_000);
        let id = pool.intern(&long);
        assert_eq!(pool.get_str(id).map(str::len), Some(70_000));
    }

    #[test]
    fn test_multibyte() {
        let mut pool = StringPool::new();
        let a = pool.intern("naïve");
        let b = pool.intern("café");
        assert_eq!(pool.get_str(a), Some("naïve"));
        assert_eq!(pool.get_str(b), Some("café"));
    }
}
