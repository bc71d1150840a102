//! # Storage Layer
//!
//! This module defines the read-only content access abstraction. The
//! [`ContentStore`] trait lets the builder and service work against
//! different backends.
//!
//! ## Store Layout
//!
//! A store is one content tree plus the manifest that describes it:
//!
//! ```text
//! content/
//! ├── module.json            # Manifest: module id -> descriptor
//! ├── js/
//! │   ├── call_function/
//! │   │   └── HOF.md         # Documents, one or more per module folder
//! │   └── arrays/
//! │       └── Arrays.md
//! └── react/
//!     └── react-hooks/
//!         └── Hooks.markdown
//! ```
//!
//! Everything here is read-only: stores never create, move, or delete
//! content. Mutation is the content repository's business, not ours.
//!
//! ## Enumeration Contract
//!
//! [`ContentStore::list_documents`] produces a lazy, finite, restartable
//! sequence. Every existing document is enumerated exactly once; there is
//! no ordering guarantee. A missing or unreadable root fails eagerly,
//! per-entry failures surface as `Err` items in the sequence.
//!
//! Document paths are relative to the store root and forward-slash
//! separated, so they compare equal to the paths a manifest declares.
//!
//! ## Implementations
//!
//! - [`fs::FsStore`]: production store over a directory tree.
//! - [`memory::InMemoryStore`]: for testing logic without filesystem I/O.

use crate::error::ContentStoreError;
use crate::model::DocumentMeta;

pub mod fs;
pub mod memory;

/// Lazy document enumeration handle returned by [`ContentStore::list_documents`].
pub type DocumentIter<'a> = Box<dyn Iterator<Item = Result<DocumentMeta, ContentStoreError>> + 'a>;

/// Abstract read-only interface to a content tree and its manifest.
pub trait ContentStore {
    /// Read the manifest text from its fixed location in the store.
    fn read_manifest(&self) -> Result<String, ContentStoreError>;

    /// Enumerate every document in the store, lazily.
    fn list_documents(&self) -> Result<DocumentIter<'_>, ContentStoreError>;

    /// Read one document's text by store-relative path.
    ///
    /// Fails with [`ContentStoreError::NotFound`] if the path is absent at
    /// read time (the tree may have changed since enumeration).
    fn read_document(&self, path: &str) -> Result<String, ContentStoreError>;
}
