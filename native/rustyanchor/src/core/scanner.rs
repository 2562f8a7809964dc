//! SIMD-accelerated markup scanning using memchr
//!
//! The scanner walks a `&str` but searches its bytes. Every delimiter it looks
//! for is ASCII, so each position it reports is a char boundary and slicing
//! the source at it is always valid.

use memchr::memchr;
use memchr::memmem;

/// Cursor over document source
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Position one past the last byte of input
    #[inline]
    pub fn end(&self) -> usize {
        self.input.len()
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Skip ASCII whitespace (space, tab, newline, carriage return)
    #[inline]
    pub fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && matches!(bytes[self.pos], b' ' | b'\t' | b'\n' | b'\r') {
            self.pos += 1;
        }
    }

    #[inline]
    pub fn starts_with(&self, needle: &str) -> bool {
        self.input[self.pos..].starts_with(needle)
    }

    /// Find next '<' (tag start) using SIMD
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        memchr(b'<', &self.input.as_bytes()[self.pos..]).map(|i| self.pos + i)
    }

    /// Find the closing '>' of a tag, ignoring any inside quoted attribute values
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut quote: Option<u8> = None;

        for (i, &b) in self.input.as_bytes()[self.pos..].iter().enumerate() {
            match (quote, b) {
                (None, b'"' | b'\'') => quote = Some(b),
                (Some(q), _) if q == b => quote = None,
                (None, b'>') => return Some(self.pos + i),
                _ => {}
            }
        }
        None
    }

    /// Find the next occurrence of a terminator such as `-->` or `]]>`
    #[inline]
    pub fn find_str(&self, needle: &str) -> Option<usize> {
        memmem::find(&self.input.as_bytes()[self.pos..], needle.as_bytes()).map(|i| self.pos + i)
    }

    /// Read a markup name: everything up to whitespace, '/', '?' or '>'
    pub fn read_name(&mut self) -> Option<&'a str> {
        let start = self.pos;
        let bytes = self.input.as_bytes();

        if start >= bytes.len() || !is_name_start_char(bytes[start]) {
            return None;
        }

        self.pos += 1;
        while self.pos < bytes.len() && is_name_char(bytes[self.pos]) {
            self.pos += 1;
        }

        Some(&self.input[start..self.pos])
    }
}

/// Allows ASCII letters, underscore, colon, and non-ASCII (UTF-8 lead bytes)
#[inline]
fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

#[inline]
fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.' | b':') || b >= 0x80
}
