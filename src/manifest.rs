//! # Manifest Parsing
//!
//! The manifest (`module.json`) is a single JSON object mapping module id to
//! its descriptor:
//!
//! ```json
//! {
//!   "hof": {
//!     "title": "Higher-Order Functions",
//!     "category": "javascript",
//!     "path": "js/call_function/HOF.md",
//!     "order": 1
//!   }
//! }
//! ```
//!
//! Parsing is a pure transformation with no filesystem access, so the whole
//! validation surface is unit-testable in isolation. Strictness lives here:
//! the rest of the crate only ever sees validated [`Module`] records.
//!
//! Entry order is preserved — it later drives first-seen category ordering
//! in the catalog. `order` is the only optional field (defaults to 0);
//! unknown fields are rejected rather than silently ignored, and a missing
//! or blank `title`/`category`/`path` fails with the offending id and field.

use crate::error::ManifestError;
use crate::model::Module;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// One raw manifest entry before validation. Required fields stay `Option`
/// so that missing-field reporting is ours instead of serde's.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    title: Option<String>,
    category: Option<String>,
    path: Option<String>,
    order: Option<i64>,
}

/// Manifest entries in document order, duplicates preserved.
///
/// `serde_json`'s map type silently keeps the last of two duplicate keys,
/// which would turn a duplicate id into data loss. Walking the map by hand
/// keeps every entry visible.
struct RawManifest(Vec<(String, RawEntry)>);

impl<'de> Deserialize<'de> for RawManifest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ManifestVisitor;

        impl<'de> Visitor<'de> for ManifestVisitor {
            type Value = RawManifest;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of module id to module descriptor")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((id, entry)) = map.next_entry::<String, RawEntry>()? {
                    entries.push((id, entry));
                }
                Ok(RawManifest(entries))
            }
        }

        deserializer.deserialize_map(ManifestVisitor)
    }
}

fn required(
    id: &str,
    field: &'static str,
    value: Option<String>,
) -> Result<String, ManifestError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        // A blank value is as useless as an absent one
        _ => Err(ManifestError::MissingField {
            id: id.to_string(),
            field,
        }),
    }
}

/// Parse manifest text into validated modules, preserving entry order.
///
/// Never returns a partial result: the first violation fails the whole
/// parse.
pub fn parse(manifest_text: &str) -> Result<Vec<Module>, ManifestError> {
    let raw: RawManifest = serde_json::from_str(manifest_text)
        .map_err(|e| ManifestError::Malformed(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut modules = Vec::with_capacity(raw.0.len());
    for (id, entry) in raw.0 {
        if id.trim().is_empty() {
            return Err(ManifestError::Malformed("empty module id".to_string()));
        }
        if !seen.insert(id.clone()) {
            return Err(ManifestError::DuplicateId(id));
        }

        let title = required(&id, "title", entry.title)?;
        let category = required(&id, "category", entry.category)?;
        let path = required(&id, "path", entry.path)?;

        modules.push(Module {
            id,
            title,
            category,
            path,
            order: entry.order.unwrap_or(0),
        });
    }

    debug!(modules = modules.len(), "parsed manifest");
    Ok(modules)
}
