use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// I/O-layer failures, always localized to a single path.
#[derive(Error, Debug)]
pub enum ContentStoreError {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unreadable path {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ContentStoreError {
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Unreadable { path, source },
        }
    }
}

/// Manifest parse-time failures, reported with the offending id or field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("malformed manifest: {0}")]
    Malformed(String),

    #[error("duplicate module id: {0}")]
    DuplicateId(String),

    #[error("module {id}: missing required field `{field}`")]
    MissingField { id: String, field: &'static str },
}

/// Cross-validation failures. Every variant carries the complete list of
/// offending modules, never just the first one found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("dangling module references: {}", module_ids.join(", "))]
    DanglingReference { module_ids: Vec<String> },

    #[error("path {path} claimed by more than one module: {}", module_ids.join(", "))]
    DuplicatePath { path: String, module_ids: Vec<String> },

    #[error("category `{category}` is not in the configured ordering (used by: {})", module_ids.join(", "))]
    UnknownCategory { category: String, module_ids: Vec<String> },
}

/// Caller-facing lookup failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("module not found: {0}")]
    NotFound(String),

    #[error("catalog has not been built yet")]
    NotInitialized,
}

/// Anything that can abort a build pass. A failed build is discarded whole;
/// the previously served snapshot is never affected.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Store(#[from] ContentStoreError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("build cancelled")]
    Cancelled,

    #[error("build deadline exceeded")]
    DeadlineExceeded,
}

/// Configuration load/save failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
}
