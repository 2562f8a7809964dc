//! ResourceArc Wrappers
//!
//! Parsed documents live in Rust memory between NIF calls.

use crate::dom::XmlDocument;
use rustler::ResourceArc;
use std::sync::Mutex;

/// Wrapper for XmlDocument that can be stored in a ResourceArc
/// Parsed once, then anchored against any number of times.
pub struct DocumentResource {
    pub doc: Mutex<XmlDocument>,
}

impl DocumentResource {
    pub fn new(doc: XmlDocument) -> Self {
        DocumentResource {
            doc: Mutex::new(doc),
        }
    }

    /// Run `f` against the stored document
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the document mutex is poisoned.
    pub fn with_document<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&XmlDocument) -> R,
    {
        let guard = self.doc.lock().map_err(|_| "mutex_poisoned")?;
        Ok(f(&guard))
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

/// Type alias for document ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;
