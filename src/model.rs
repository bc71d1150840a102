use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One topic entry in the catalog, as declared by the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub category: String,
    /// Relative path of the primary document, forward-slash separated.
    pub path: String,
    /// Display ordering within the category; ties break on `id`.
    pub order: i64,
}

/// A file as enumerated by a content store, before ownership is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub path: String,
    pub size_bytes: u64,
    pub last_modified: DateTime<Utc>,
}

/// A content file after the builder assigned it to its owning module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub module_id: String,
    pub path: String,
    pub size_bytes: u64,
    pub last_modified: DateTime<Utc>,
}

impl Document {
    pub fn from_meta(module_id: &str, meta: &DocumentMeta) -> Self {
        Self {
            module_id: module_id.to_string(),
            path: meta.path.clone(),
            size_bytes: meta.size_bytes,
            last_modified: meta.last_modified,
        }
    }
}

/// A module plus every document living under its folder. The primary
/// document is always present, so `documents` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub module: Module,
    pub documents: Vec<Document>,
}

/// An ordered run of modules sharing a category. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub category: String,
    pub modules: Vec<CatalogEntry>,
}

/// One immutable, fully-built snapshot of the catalog.
///
/// Built once per load and swapped in whole; there is no way to mutate a
/// snapshot after construction.
#[derive(Debug)]
pub struct Catalog {
    groups: Vec<CategoryGroup>,
    // id -> (group index, module index) for O(1) lookup
    by_id: HashMap<String, (usize, usize)>,
    built_at: DateTime<Utc>,
}

impl Catalog {
    pub(crate) fn new(groups: Vec<CategoryGroup>) -> Self {
        let mut by_id = HashMap::new();
        for (gi, group) in groups.iter().enumerate() {
            for (mi, entry) in group.modules.iter().enumerate() {
                by_id.insert(entry.module.id.clone(), (gi, mi));
            }
        }
        Self {
            groups,
            by_id,
            built_at: Utc::now(),
        }
    }

    /// Category groups in display order.
    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.by_id
            .get(id)
            .map(|&(gi, mi)| &self.groups[gi].modules[mi])
    }

    pub fn category(&self, name: &str) -> Option<&CategoryGroup> {
        self.groups.iter().find(|g| g.category == name)
    }

    pub fn module_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Catalog lifecycle as seen by the service.
///
/// `Empty -> Building -> Ready -> Building -> Ready -> ...`; once `Ready`,
/// queries keep being served from the last completed snapshot even while a
/// rebuild is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogState {
    Empty,
    Building,
    Ready,
}
