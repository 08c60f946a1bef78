use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use magpie_emit::{ArtifactNames, OutputMap};

/// One target input file, with optional overrides for its artifact names.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub file: PathBuf,
    pub registration: Option<String>,
    pub serialization: Option<String>,
}

/// Project configuration payload, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub output_dir: PathBuf,
    pub inputs: Vec<InputConfig>,
    /// Compiler-style flags handed to the AST provider.
    #[serde(default)]
    pub ast_flags: Vec<String>,
    /// Metadata caches of upstream projects, merged left to right.
    #[serde(default)]
    pub upstream_caches: Vec<PathBuf>,
    /// Where to persist this project's metadata cache.
    /// Defaults to `<output_dir>/metadata_cache.toml`.
    pub cache_file: Option<PathBuf>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: ProjectConfig = toml::from_str(&text)
            .with_context(|| format!("Malformed config: {}", path.display()))?;
        if config.inputs.is_empty() {
            bail!("Config names no input files: {}", path.display());
        }
        Ok(config)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_file
            .clone()
            .unwrap_or_else(|| self.output_dir.join("metadata_cache.toml"))
    }

    /// The set of files the walker is allowed to descend into.
    pub fn permitted_files(&self) -> HashSet<PathBuf> {
        self.inputs.iter().map(|input| input.file.clone()).collect()
    }

    pub fn output_map(&self) -> OutputMap {
        let mut map = OutputMap::new();
        for input in &self.inputs {
            let mut names = ArtifactNames::derived_from(&input.file);
            if let Some(registration) = &input.registration {
                names.registration = registration.clone();
            }
            if let Some(serialization) = &input.serialization {
                names.serialization = serialization.clone();
            }
            map.insert(input.file.clone(), names);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_with_artifact_overrides() {
        let dir = std::env::temp_dir().join(format!("magpie-config-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let path = dir.join("metagen.toml");
        fs::write(
            &path,
            r#"
output_dir = "generated"
ast_flags = ["-std=c++20"]
upstream_caches = ["deps/engine_cache.toml"]

[[inputs]]
file = "engine/Transform.h"

[[inputs]]
file = "engine/Scene.h"
registration = "scene_registration.cpp"
"#,
        )
        .unwrap();

        let config = ProjectConfig::load(&path).unwrap();
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.ast_flags, vec!["-std=c++20"]);
        assert_eq!(
            config.cache_path(),
            PathBuf::from("generated/metadata_cache.toml")
        );

        let map = config.output_map();
        let transform = map.names_for(Path::new("engine/Transform.h"));
        assert_eq!(transform.registration, "Transform.refl.gen.cpp");
        let scene = map.names_for(Path::new("engine/Scene.h"));
        assert_eq!(scene.registration, "scene_registration.cpp");
        assert_eq!(scene.serialization, "Scene.ser.gen.cpp");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_input_list_is_rejected() {
        let dir = std::env::temp_dir().join(format!("magpie-config-empty-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();

        let path = dir.join("metagen.toml");
        fs::write(&path, "output_dir = \"generated\"\ninputs = []\n").unwrap();
        assert!(ProjectConfig::load(&path).is_err());

        let _ = fs::remove_dir_all(&dir);
    }
}
