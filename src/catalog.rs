//! # Catalog Construction
//!
//! [`build`] cross-validates parsed modules against a content store and
//! produces one immutable [`Catalog`] snapshot. It never mutates a prior
//! snapshot; a failed build leaves nothing behind.
//!
//! ## Validation
//!
//! Validation failures are collected, not fail-fast: a manifest with five
//! dangling paths reports all five in one error, so they can be fixed in a
//! single pass.
//!
//! ## Grouping
//!
//! Modules are grouped by category. Categories appear in manifest
//! first-seen order, unless an explicit `category_order` list is supplied —
//! that list then both orders the categories and acts as an allow-list.
//! Within a category, modules sort by `order` ascending, then by `id` as a
//! tie-break, so equal orders still produce deterministic output.
//!
//! ## Document Ownership
//!
//! A document belongs to the module whose folder (the parent of the
//! module's primary path) is the deepest prefix of the document's path. A
//! module's primary document always belongs to that module. Documents that
//! fall under no module folder — the corpus root tends to hold a `README.md`
//! or an `index.html` shell — are skipped, not fatal.
//!
//! ## Cancellation and Deadlines
//!
//! Builds are cooperative: the cancel flag and the deadline are checked
//! between documents. An interrupted build is discarded whole.

use crate::error::{BuildError, CatalogError};
use crate::model::{Catalog, CatalogEntry, CategoryGroup, Document, DocumentMeta, Module};
use crate::store::ContentStore;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Cooperative cancellation flag, shared between a build and its controller.
///
/// Cloning yields another handle to the same flag. Cancelling never affects
/// a snapshot that has already been published.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Controls for a single build pass.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Explicit category ordering and allow-list; `None` means manifest
    /// first-seen order.
    pub category_order: Option<Vec<String>>,
    /// Absolute deadline, checked between documents.
    pub deadline: Option<Instant>,
    /// Cooperative cancel flag, checked between documents.
    pub cancel: Option<CancelToken>,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category_order(mut self, order: Vec<String>) -> Self {
        self.category_order = Some(order);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.with_deadline(deadline)
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn check(&self) -> Result<(), BuildError> {
        if let Some(token) = &self.cancel {
            if token.is_cancelled() {
                return Err(BuildError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(BuildError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}

/// Cross-validate modules against the store and build a fresh snapshot.
pub fn build<S: ContentStore>(
    modules: &[Module],
    store: &S,
    opts: &BuildOptions,
) -> Result<Catalog, BuildError> {
    opts.check()?;

    // Drain the store once; every later lookup is in-memory.
    let mut documents: BTreeMap<String, DocumentMeta> = BTreeMap::new();
    for item in store.list_documents()? {
        opts.check()?;
        let meta = item?;
        documents.insert(meta.path.clone(), meta);
    }
    debug!(
        documents = documents.len(),
        modules = modules.len(),
        "content store drained"
    );

    // Every unresolved path, not just the first.
    let dangling: Vec<String> = modules
        .iter()
        .filter(|m| !documents.contains_key(&m.path))
        .map(|m| m.id.clone())
        .collect();
    if !dangling.is_empty() {
        return Err(CatalogError::DanglingReference {
            module_ids: dangling,
        }
        .into());
    }

    // A primary path may only be claimed once.
    let mut claims: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for module in modules {
        claims
            .entry(module.path.as_str())
            .or_default()
            .push(module.id.as_str());
    }
    for (path, ids) in claims {
        if ids.len() > 1 {
            return Err(CatalogError::DuplicatePath {
                path: path.to_string(),
                module_ids: ids.into_iter().map(String::from).collect(),
            }
            .into());
        }
    }

    opts.check()?;

    let mut owned = assign_documents(modules, &documents, opts)?;
    let order = category_order(modules, opts)?;

    let mut groups = Vec::new();
    for category in order {
        let mut entries: Vec<CatalogEntry> = modules
            .iter()
            .filter(|m| m.category == category)
            .map(|m| CatalogEntry {
                module: m.clone(),
                documents: owned.remove(m.id.as_str()).unwrap_or_default(),
            })
            .collect();
        if entries.is_empty() {
            // Categories are never empty when present
            continue;
        }
        entries.sort_by(|a, b| {
            a.module
                .order
                .cmp(&b.module.order)
                .then_with(|| a.module.id.cmp(&b.module.id))
        });
        groups.push(CategoryGroup { category, modules: entries });
    }

    let catalog = Catalog::new(groups);
    info!(
        modules = catalog.module_count(),
        categories = catalog.groups().len(),
        "catalog built"
    );
    Ok(catalog)
}

/// Assign each document to its owning module: the module's own primary path
/// first, otherwise the deepest module folder containing the document (ties
/// go to the earlier manifest entry).
fn assign_documents<'a>(
    modules: &'a [Module],
    documents: &BTreeMap<String, DocumentMeta>,
    opts: &BuildOptions,
) -> Result<HashMap<&'a str, Vec<Document>>, BuildError> {
    let primary: HashMap<&str, &Module> =
        modules.iter().map(|m| (m.path.as_str(), m)).collect();
    let folders: Vec<(String, &Module)> = modules
        .iter()
        .map(|m| (parent_folder(&m.path), m))
        .collect();

    let mut owned: HashMap<&str, Vec<Document>> = HashMap::new();
    let mut orphans = 0usize;
    for meta in documents.values() {
        opts.check()?;
        let owner = primary
            .get(meta.path.as_str())
            .copied()
            .or_else(|| deepest_owner(&meta.path, &folders));
        match owner {
            Some(module) => owned
                .entry(module.id.as_str())
                .or_default()
                .push(Document::from_meta(&module.id, meta)),
            None => {
                debug!(path = %meta.path, "document outside any module folder");
                orphans += 1;
            }
        }
    }
    if orphans > 0 {
        debug!(orphans, "documents not owned by any module");
    }
    Ok(owned)
}

fn parent_folder(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

fn in_folder(path: &str, folder: &str) -> bool {
    if folder.is_empty() {
        // Root-level module folder owns root-level documents
        !path.contains('/')
    } else {
        path.strip_prefix(folder)
            .map(|rest| rest.starts_with('/'))
            .unwrap_or(false)
    }
}

fn deepest_owner<'a>(path: &str, folders: &[(String, &'a Module)]) -> Option<&'a Module> {
    let mut best: Option<(&str, &Module)> = None;
    for (folder, module) in folders {
        if !in_folder(path, folder) {
            continue;
        }
        // Strictly deeper wins; equal depth keeps the earlier manifest entry
        let deeper = match best {
            Some((best_folder, _)) => folder.len() > best_folder.len(),
            None => true,
        };
        if deeper {
            best = Some((folder.as_str(), module));
        }
    }
    best.map(|(_, module)| module)
}

/// Category display order: the configured allow-list, or manifest
/// first-seen order.
fn category_order(modules: &[Module], opts: &BuildOptions) -> Result<Vec<String>, BuildError> {
    match &opts.category_order {
        Some(configured) => {
            let allowed: HashSet<&str> = configured.iter().map(String::as_str).collect();
            let mut unknown: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            for module in modules {
                if !allowed.contains(module.category.as_str()) {
                    unknown
                        .entry(module.category.as_str())
                        .or_default()
                        .push(module.id.as_str());
                }
            }
            if let Some((category, ids)) = unknown.into_iter().next() {
                return Err(CatalogError::UnknownCategory {
                    category: category.to_string(),
                    module_ids: ids.into_iter().map(String::from).collect(),
                }
                .into());
            }
            Ok(configured.clone())
        }
        None => {
            let mut seen = Vec::new();
            for module in modules {
                if !seen.contains(&module.category) {
                    seen.push(module.category.clone());
                }
            }
            Ok(seen)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::StoreFixture;

    fn ids(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.module.id.as_str()).collect()
    }

    fn modules_of(store: &crate::store::memory::InMemoryStore) -> Vec<Module> {
        crate::manifest::parse(&store.read_manifest().unwrap()).unwrap()
    }

    #[test]
    fn groups_by_first_seen_category() {
        let store = StoreFixture::new()
            .with_module("hof", "javascript", "js/call_function/HOF.md", 1)
            .with_module("hooks", "react", "react/react-hooks/Hooks.markdown", 1)
            .with_module("arrays", "javascript", "js/arrays/Arrays.md", 2)
            .build();

        let catalog = build(&modules_of(&store), &store, &BuildOptions::new()).unwrap();

        let categories: Vec<_> = catalog.groups().iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, vec!["javascript", "react"]);
        assert_eq!(ids(&catalog.groups()[0].modules), vec!["hof", "arrays"]);
        assert_eq!(ids(&catalog.groups()[1].modules), vec!["hooks"]);
    }

    #[test]
    fn equal_order_ties_break_on_id() {
        let store = StoreFixture::new()
            .with_module("zeta", "javascript", "js/zeta/Z.md", 1)
            .with_module("alpha", "javascript", "js/alpha/A.md", 1)
            .build();

        let catalog = build(&modules_of(&store), &store, &BuildOptions::new()).unwrap();
        assert_eq!(ids(&catalog.groups()[0].modules), vec!["alpha", "zeta"]);
    }

    #[test]
    fn dangling_references_are_aggregated_exactly() {
        let store = StoreFixture::new()
            .with_module("good", "javascript", "js/good/G.md", 1)
            .with_dangling_module("bad1", "javascript", "js/bad1/B.md")
            .with_dangling_module("bad2", "react", "react/bad2/B.md")
            .build();

        let err = build(&modules_of(&store), &store, &BuildOptions::new())
            .err()
            .unwrap();
        match err {
            BuildError::Catalog(CatalogError::DanglingReference { module_ids }) => {
                assert_eq!(module_ids, vec!["bad1".to_string(), "bad2".to_string()]);
            }
            other => panic!("expected DanglingReference, got {other:?}"),
        }
    }

    #[test]
    fn shared_primary_path_fails() {
        let store = StoreFixture::new()
            .with_module("a", "javascript", "js/shared/S.md", 1)
            .with_module("b", "javascript", "js/shared/S.md", 2)
            .build();

        let err = build(&modules_of(&store), &store, &BuildOptions::new())
            .err()
            .unwrap();
        match err {
            BuildError::Catalog(CatalogError::DuplicatePath { path, module_ids }) => {
                assert_eq!(path, "js/shared/S.md");
                assert_eq!(module_ids, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("expected DuplicatePath, got {other:?}"),
        }
    }

    #[test]
    fn secondary_documents_attach_to_their_module() {
        let store = StoreFixture::new()
            .with_module("hof", "javascript", "js/hof/HOF.md", 1)
            .with_document("js/hof/examples.md", "# Examples")
            .build();

        let catalog = build(&modules_of(&store), &store, &BuildOptions::new()).unwrap();
        let entry = catalog.get("hof").unwrap();
        let paths: Vec<_> = entry.documents.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["js/hof/HOF.md", "js/hof/examples.md"]);
        assert!(entry.documents.iter().all(|d| d.module_id == "hof"));
    }

    #[test]
    fn nested_folders_resolve_to_deepest_module() {
        let store = StoreFixture::new()
            .with_module("outer", "javascript", "js/topic/Topic.md", 1)
            .with_module("inner", "javascript", "js/topic/deep/Deep.md", 2)
            .with_document("js/topic/deep/extra.md", "# Extra")
            .build();

        let catalog = build(&modules_of(&store), &store, &BuildOptions::new()).unwrap();
        assert_eq!(catalog.get("inner").unwrap().documents.len(), 2);
        assert_eq!(catalog.get("outer").unwrap().documents.len(), 1);
    }

    #[test]
    fn orphan_documents_are_skipped_not_fatal() {
        let store = StoreFixture::new()
            .with_module("hof", "javascript", "js/hof/HOF.md", 1)
            .with_document("README.md", "# Corpus readme")
            .build();

        let catalog = build(&modules_of(&store), &store, &BuildOptions::new()).unwrap();
        assert_eq!(catalog.module_count(), 1);
        assert_eq!(catalog.get("hof").unwrap().documents.len(), 1);
    }

    #[test]
    fn configured_category_order_wins_over_first_seen() {
        let store = StoreFixture::new()
            .with_module("hof", "javascript", "js/hof/HOF.md", 1)
            .with_module("hooks", "react", "react/hooks/Hooks.md", 1)
            .build();

        let opts = BuildOptions::new()
            .with_category_order(vec!["react".to_string(), "javascript".to_string()]);
        let catalog = build(&modules_of(&store), &store, &opts).unwrap();

        let categories: Vec<_> = catalog.groups().iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, vec!["react", "javascript"]);
    }

    #[test]
    fn configured_order_rejects_unlisted_categories() {
        let store = StoreFixture::new()
            .with_module("hof", "javascript", "js/hof/HOF.md", 1)
            .with_module("mystery", "haskell", "js/mystery/M.md", 1)
            .build();

        let opts = BuildOptions::new().with_category_order(vec!["javascript".to_string()]);
        let err = build(&modules_of(&store), &store, &opts).err().unwrap();
        match err {
            BuildError::Catalog(CatalogError::UnknownCategory { category, module_ids }) => {
                assert_eq!(category, "haskell");
                assert_eq!(module_ids, vec!["mystery".to_string()]);
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn configured_order_with_no_modules_yields_no_empty_groups() {
        let store = StoreFixture::new()
            .with_module("hof", "javascript", "js/hof/HOF.md", 1)
            .build();

        let opts = BuildOptions::new()
            .with_category_order(vec!["javascript".to_string(), "react".to_string()]);
        let catalog = build(&modules_of(&store), &store, &opts).unwrap();
        assert_eq!(catalog.groups().len(), 1);
    }

    #[test]
    fn build_is_idempotent() {
        let store = StoreFixture::new()
            .with_module("hof", "javascript", "js/hof/HOF.md", 2)
            .with_module("arrays", "javascript", "js/arrays/Arrays.md", 1)
            .with_module("hooks", "react", "react/hooks/Hooks.md", 1)
            .build();

        let modules = modules_of(&store);
        let first = build(&modules, &store, &BuildOptions::new()).unwrap();
        let second = build(&modules, &store, &BuildOptions::new()).unwrap();
        assert_eq!(first.groups(), second.groups());
    }

    #[test]
    fn cancelled_token_aborts_build() {
        let store = StoreFixture::new()
            .with_module("hof", "javascript", "js/hof/HOF.md", 1)
            .build();

        let token = CancelToken::new();
        token.cancel();
        let opts = BuildOptions::new().with_cancel(token);
        let err = build(&modules_of(&store), &store, &opts).err().unwrap();
        assert!(matches!(err, BuildError::Cancelled));
    }

    #[test]
    fn expired_deadline_aborts_build() {
        let store = StoreFixture::new()
            .with_module("hof", "javascript", "js/hof/HOF.md", 1)
            .build();

        let opts = BuildOptions::new().with_deadline(Instant::now());
        let err = build(&modules_of(&store), &store, &opts).err().unwrap();
        assert!(matches!(err, BuildError::DeadlineExceeded));
    }

    #[test]
    fn empty_manifest_builds_empty_catalog() {
        let store = StoreFixture::new().build();
        let catalog = build(&[], &store, &BuildOptions::new()).unwrap();
        assert!(catalog.is_empty());
    }
}
