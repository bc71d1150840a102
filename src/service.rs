//! # Catalog Service
//!
//! The service is a **thin facade** over the build pipeline plus the one
//! piece of shared mutable state in the crate: the current snapshot
//! reference.
//!
//! ## Snapshot Discipline
//!
//! The slot holds an `Arc<Catalog>` behind an `RwLock`. It is written
//! exactly once per successful build (single writer — concurrent reloads
//! queue behind a gate) and read by cloning the `Arc` under a momentary
//! read lock. Readers therefore never block on a rebuild and never observe
//! a half-built catalog: they see either the previous snapshot or the new
//! one, whole.
//!
//! Build work — manifest read, parse, cross-validation, grouping — happens
//! entirely outside the lock. A failed, cancelled, or timed-out build is
//! discarded without touching the slot.
//!
//! ## Generic Over ContentStore
//!
//! `CatalogService<S: ContentStore>` is generic over the storage backend:
//! - Production: `CatalogService<FsStore>` (see [`CatalogService::open`])
//! - Testing: `CatalogService<InMemoryStore>`
//!
//! ## Lifecycle
//!
//! `Empty -> Building -> Ready -> Building -> Ready -> ...`. Queries issued
//! while `Building` are served from the previous `Ready` snapshot, or fail
//! with [`QueryError::NotInitialized`] if no build has ever completed. No
//! retry happens internally; callers decide when to re-trigger a build.

use crate::catalog::{self, BuildOptions};
use crate::config::CatalogConfig;
use crate::error::{BuildError, QueryError};
use crate::manifest;
use crate::model::{Catalog, CatalogEntry, CatalogState, CategoryGroup};
use crate::store::fs::FsStore;
use crate::store::ContentStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::info;

/// Serves read-only catalog queries while coordinating rebuilds.
pub struct CatalogService<S: ContentStore> {
    store: S,
    category_order: Option<Vec<String>>,
    current: RwLock<Option<Arc<Catalog>>>,
    // One logical builder: concurrent reload calls queue up here
    build_gate: Mutex<()>,
    building: AtomicBool,
}

impl CatalogService<FsStore> {
    /// Wire a service from configuration (the production path).
    pub fn open(config: &CatalogConfig) -> Self {
        Self::with_category_order(FsStore::from_config(config), config.category_order.clone())
    }
}

impl<S: ContentStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self::with_category_order(store, None)
    }

    pub fn with_category_order(store: S, category_order: Option<Vec<String>>) -> Self {
        Self {
            store,
            category_order,
            current: RwLock::new(None),
            build_gate: Mutex::new(()),
            building: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> CatalogState {
        if self.building.load(Ordering::Acquire) {
            return CatalogState::Building;
        }
        if self.read_current().is_some() {
            CatalogState::Ready
        } else {
            CatalogState::Empty
        }
    }

    /// Rebuild from the current manifest and content tree, then swap the new
    /// snapshot in atomically.
    pub fn reload(&self) -> Result<Arc<Catalog>, BuildError> {
        let opts = match &self.category_order {
            Some(order) => BuildOptions::new().with_category_order(order.clone()),
            None => BuildOptions::new(),
        };
        self.reload_with(opts)
    }

    /// Like [`reload`](Self::reload), with explicit build controls
    /// (category order, deadline, cancellation).
    pub fn reload_with(&self, opts: BuildOptions) -> Result<Arc<Catalog>, BuildError> {
        let _gate = self
            .build_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.building.store(true, Ordering::Release);
        let result = self.rebuild(&opts);
        self.building.store(false, Ordering::Release);
        result
    }

    fn rebuild(&self, opts: &BuildOptions) -> Result<Arc<Catalog>, BuildError> {
        let manifest_text = self.store.read_manifest()?;
        let modules = manifest::parse(&manifest_text)?;
        let catalog = Arc::new(catalog::build(&modules, &self.store, opts)?);

        // The swap itself: the only write this slot ever sees
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::clone(&catalog));
        drop(slot);

        info!(modules = catalog.module_count(), "catalog snapshot swapped in");
        Ok(catalog)
    }

    fn read_current(&self) -> Option<Arc<Catalog>> {
        // Clone the Arc and get out; a panicked writer must not wedge readers
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current snapshot handle, for callers that iterate repeatedly against
    /// one consistent view.
    pub fn snapshot(&self) -> Result<Arc<Catalog>, QueryError> {
        self.read_current().ok_or(QueryError::NotInitialized)
    }

    pub fn get_by_id(&self, id: &str) -> Result<CatalogEntry, QueryError> {
        let snap = self.snapshot()?;
        snap.get(id)
            .cloned()
            .ok_or_else(|| QueryError::NotFound(id.to_string()))
    }

    /// Modules of one category in display order. An unknown category is an
    /// empty listing, not an error.
    pub fn get_by_category(&self, category: &str) -> Result<Vec<CatalogEntry>, QueryError> {
        let snap = self.snapshot()?;
        Ok(snap
            .category(category)
            .map(|group| group.modules.clone())
            .unwrap_or_default())
    }

    /// Full ordered traversal of the current snapshot.
    pub fn list_all(&self) -> Result<Vec<CategoryGroup>, QueryError> {
        let snap = self.snapshot()?;
        Ok(snap.groups().to_vec())
    }
}
