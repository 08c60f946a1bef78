use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::registry::Registry;

/// Persisted mapping from fully-qualified type name to the file that
/// declared it.
///
/// A dependent project loads the caches of its upstream projects to resolve
/// cross-project type names without re-parsing upstream sources. Merging is
/// a plain key overwrite: the last-loaded cache wins, and the current run's
/// discoveries are recorded last and take final precedence. Multiple
/// upstream caches may legitimately redeclare shared base types, so there is
/// no conflict detection.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MetadataCache {
    types: BTreeMap<String, PathBuf>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and merge the given cache files left to right.
    pub fn load(paths: &[PathBuf]) -> anyhow::Result<Self> {
        let mut merged = Self::default();
        for path in paths {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read metadata cache: {}", path.display()))?;
            let cache: MetadataCache = toml::from_str(&text)
                .with_context(|| format!("Malformed metadata cache: {}", path.display()))?;
            // plain key overwrite, last loaded wins
            merged.types.extend(cache.types);
        }
        Ok(merged)
    }

    /// Record every entity discovered in this run, overwriting upstream
    /// entries for the same names.
    pub fn record_registry(&mut self, registry: &Registry) {
        for ty in registry.types() {
            self.types
                .insert(ty.qualified_name.clone(), ty.declared_in.clone());
        }
        for en in registry.enums() {
            self.types
                .insert(en.qualified_name.clone(), en.declared_in.clone());
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let text = toml::to_string(self)
            .context("Failed to serialize metadata cache")?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write metadata cache: {}", path.display()))?;
        Ok(())
    }

    pub fn declaring_file(&self, qualified_name: &str) -> Option<&PathBuf> {
        self.types.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
