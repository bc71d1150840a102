use super::{ContentStore, DocumentIter};
use crate::error::ContentStoreError;
use crate::model::DocumentMeta;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory store for testing logic without filesystem I/O.
///
/// Interior mutability lets a test edit content and manifest through the
/// same shared handle a service holds, simulating external changes between
/// rebuilds.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    manifest: Option<String>,
    documents: BTreeMap<String, Doc>,
}

struct Doc {
    content: String,
    // Fixed at insertion so repeated enumerations agree
    modified: DateTime<Utc>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_manifest(&self, text: &str) {
        self.write().manifest = Some(text.to_string());
    }

    pub fn put_document(&self, path: &str, content: &str) {
        self.write().documents.insert(
            path.to_string(),
            Doc {
                content: content.to_string(),
                modified: Utc::now(),
            },
        );
    }

    pub fn remove_document(&self, path: &str) {
        self.write().documents.remove(path);
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ContentStore for InMemoryStore {
    fn read_manifest(&self) -> Result<String, ContentStoreError> {
        self.read()
            .manifest
            .clone()
            .ok_or_else(|| ContentStoreError::NotFound {
                path: PathBuf::from("module.json"),
            })
    }

    fn list_documents(&self) -> Result<DocumentIter<'_>, ContentStoreError> {
        let docs: Vec<Result<DocumentMeta, ContentStoreError>> = self
            .read()
            .documents
            .iter()
            .map(|(path, doc)| {
                Ok(DocumentMeta {
                    path: path.clone(),
                    size_bytes: doc.content.len() as u64,
                    last_modified: doc.modified,
                })
            })
            .collect();
        Ok(Box::new(docs.into_iter()))
    }

    fn read_document(&self, path: &str) -> Result<String, ContentStoreError> {
        self.read()
            .documents
            .get(path)
            .map(|doc| doc.content.clone())
            .ok_or_else(|| ContentStoreError::NotFound {
                path: PathBuf::from(path),
            })
    }
}

// --- Test Fixtures ---
