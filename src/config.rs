use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "catalog.json";
const DEFAULT_MANIFEST_NAME: &str = "module.json";

/// Configuration for a catalog, stored as `catalog.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Root of the content tree, one folder per topic.
    pub content_root: PathBuf,

    /// Manifest file name, resolved against the content root.
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// File extensions counted as documents (e.g. ".md", ".html").
    #[serde(default = "default_document_extensions")]
    pub document_extensions: Vec<String>,

    /// Explicit category ordering. When set, it is also an allow-list:
    /// modules in a category outside it fail the build. When unset,
    /// categories appear in manifest first-seen order.
    #[serde(default)]
    pub category_order: Option<Vec<String>>,
}

fn default_manifest_name() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}

fn default_document_extensions() -> Vec<String> {
    vec![
        ".md".to_string(),
        ".markdown".to_string(),
        ".html".to_string(),
    ]
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from("."),
            manifest_name: default_manifest_name(),
            document_extensions: default_document_extensions(),
            category_order: None,
        }
    }
}

impl CatalogConfig {
    pub fn new<P: Into<PathBuf>>(content_root: P) -> Self {
        Self {
            content_root: content_root.into(),
            ..Self::default()
        }
    }

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: CatalogConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<(), ConfigError> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    /// Add a document extension (normalizes to start with a dot).
    pub fn add_document_extension(&mut self, ext: &str) {
        let ext = if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        };
        if !self.document_extensions.contains(&ext) {
            self.document_extensions.push(ext);
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.content_root.join(&self.manifest_name)
    }
}
