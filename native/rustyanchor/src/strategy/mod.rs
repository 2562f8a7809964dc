//! Anchoring Strategy Module
//!
//! - Sequential: `anchor::anchor` on one tree (default)
//! - Parallel: independent documents anchored concurrently with Rayon

pub mod parallel;

pub use parallel::{anchor_parallel, parse_parallel};
