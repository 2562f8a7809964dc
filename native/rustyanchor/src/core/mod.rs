//! Core parsing primitives
//!
//! Building blocks shared by the reader:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Entities: entity decoding with Cow (zero-copy when possible)
//! - Encoding: UTF-16 detection and conversion to UTF-8

pub mod encoding;
pub mod entities;
pub mod scanner;
