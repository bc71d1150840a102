use super::{ContentStore, DocumentIter};
use crate::config::CatalogConfig;
use crate::error::ContentStoreError;
use crate::model::DocumentMeta;
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

const DEFAULT_MANIFEST_NAME: &str = "module.json";
const DEFAULT_EXTENSIONS: &[&str] = &[".md", ".markdown", ".html"];

/// Production content store over a directory tree.
pub struct FsStore {
    root: PathBuf,
    manifest_name: String,
    extensions: Vec<String>,
}

impl FsStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        let mut store = Self::new(config.content_root.clone())
            .with_manifest_name(&config.manifest_name);
        store.extensions = config
            .document_extensions
            .iter()
            .map(|e| normalize_ext(e))
            .collect();
        store
    }

    pub fn with_manifest_name(mut self, name: &str) -> Self {
        self.manifest_name = name.to_string();
        self
    }

    /// Set the file extensions counted as documents (normalizes the leading dot).
    pub fn with_extensions(mut self, exts: &[&str]) -> Self {
        self.extensions = exts.iter().map(|e| normalize_ext(e)).collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn check_root(&self) -> Result<(), ContentStoreError> {
        if !self.root.exists() {
            return Err(ContentStoreError::NotFound {
                path: self.root.clone(),
            });
        }
        if !self.root.is_dir() {
            return Err(ContentStoreError::Unreadable {
                path: self.root.clone(),
                source: io::Error::other("content root is not a directory"),
            });
        }
        Ok(())
    }

    fn is_document(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_ascii_lowercase(),
            None => return false,
        };
        self.extensions
            .iter()
            .any(|ext| name.len() > ext.len() && name.ends_with(ext.as_str()))
    }

    /// Store-relative, forward-slash separated path for an absolute entry.
    fn rel_string(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn stat(&self, abs: &Path) -> Result<DocumentMeta, ContentStoreError> {
        let meta =
            fs::metadata(abs).map_err(|e| ContentStoreError::from_io(abs.to_path_buf(), e))?;
        let modified = meta
            .modified()
            .map_err(|e| ContentStoreError::from_io(abs.to_path_buf(), e))?;
        Ok(DocumentMeta {
            path: self.rel_string(abs),
            size_bytes: meta.len(),
            last_modified: DateTime::<Utc>::from(modified),
        })
    }
}

fn normalize_ext(ext: &str) -> String {
    let ext = if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    };
    ext.to_ascii_lowercase()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

impl ContentStore for FsStore {
    fn read_manifest(&self) -> Result<String, ContentStoreError> {
        let path = self.root.join(&self.manifest_name);
        fs::read_to_string(&path).map_err(|e| ContentStoreError::from_io(path, e))
    }

    fn list_documents(&self) -> Result<DocumentIter<'_>, ContentStoreError> {
        self.check_root()?;
        debug!(root = %self.root.display(), "scanning content tree");

        let iter = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() && self.is_document(entry.path()) => {
                    Some(self.stat(entry.path()))
                }
                Ok(_) => None,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.to_path_buf())
                        .unwrap_or_else(|| self.root.clone());
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
                    Some(Err(ContentStoreError::Unreadable { path, source }))
                }
            });

        Ok(Box::new(iter))
    }

    fn read_document(&self, path: &str) -> Result<String, ContentStoreError> {
        let abs = self.root.join(path);
        fs::read_to_string(&abs).map_err(|e| ContentStoreError::from_io(abs, e))
    }
}
