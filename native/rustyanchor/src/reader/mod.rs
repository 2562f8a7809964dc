//! Reader Module
//!
//! - SliceReader: zero-copy lenient pull parser
//! - Events: event types produced by the reader

pub mod events;
pub mod slice;

pub use events::XmlEvent;
pub use slice::SliceReader;
