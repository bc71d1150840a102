//! # modcat Architecture
//!
//! modcat is a **UI-agnostic module catalog library**. It indexes a
//! repository of learning-content folders, validates the manifest that
//! describes them, and serves an immutable table of contents to whatever
//! presentation layer sits on top. It is not an application; there is no
//! CLI, no server, and no opinion about how the catalog gets rendered.
//!
//! ## The Four-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Service Layer (service.rs)                                 │
//! │  - Lifecycle: Empty -> Building -> Ready -> ...             │
//! │  - Holds the one shared snapshot reference, swapped whole   │
//! │  - Read-only queries: by id, by category, full listing      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Build Layer (catalog.rs)                                   │
//! │  - Cross-validates modules against the content store        │
//! │  - Groups, orders, and assigns document ownership           │
//! │  - Cooperative cancellation and deadlines                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Manifest Layer (manifest.rs)                               │
//! │  - Pure text -> Module records, no filesystem access        │
//! │  - Strict: unknown fields, duplicates, gaps all rejected    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract ContentStore trait                              │
//! │  - FsStore (production), InMemoryStore (testing)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Snapshots, Never Mutation
//!
//! A [`model::Catalog`] is built once and never changed. A rebuild produces
//! a fresh snapshot that replaces the old one in a single swap, so readers
//! always see one coherent catalog — either the old one or the new one,
//! never a mixture. This is what makes concurrent reads during a rebuild
//! safe without reader-side locking.
//!
//! ## Key Principle: Errors Carry the Whole Story
//!
//! Validation failures aggregate every offender (all dangling references at
//! once, not just the first), so one failed build is enough to fix the
//! manifest in a single pass. See [`error`] for the full taxonomy.
//!
//! ## Testing Strategy
//!
//! 1. **Manifest** (`manifest.rs`): pure-function unit tests over text.
//! 2. **Build** (`catalog.rs`): unit tests against `InMemoryStore`.
//! 3. **Store** (`store/fs.rs`): tempdir-backed tests of real enumeration.
//! 4. **Service** (`service.rs` + `tests/`): lifecycle, failure isolation,
//!    and concurrent readers against an in-flight rebuild.
//!
//! ## Module Overview
//!
//! - [`service`]: The service facade — entry point for queries and reloads
//! - [`catalog`]: Snapshot construction and build controls
//! - [`manifest`]: Manifest parsing and validation
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Module`, `Document`, `Catalog`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod catalog;
pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod service;
pub mod store;
