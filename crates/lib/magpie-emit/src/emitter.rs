use std::collections::HashMap;
use std::path::{Path, PathBuf};

use magpie_meta::{MetadataCache, Registry, TypeInfo};

use crate::context::{FileContext, ProjectContext};
use crate::engine::{template, TemplateEngine};

/// Whole-project artifact names.
const ALL_TYPES_ARTIFACT: &str = "all_reflected_types.gen.hpp";
const SEQUENCE_ARTIFACT: &str = "register_reflected_types.gen.cpp";

/// Output artifact names for one input file.
#[derive(Debug, Clone)]
pub struct ArtifactNames {
    pub registration: String,
    pub serialization: String,
}

impl ArtifactNames {
    /// Default names derived from the input file stem.
    pub fn derived_from(input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_owned());
        Self {
            registration: format!("{}.refl.gen.cpp", stem),
            serialization: format!("{}.ser.gen.cpp", stem),
        }
    }
}

/// Declared mapping from input file to its output artifact names.
#[derive(Debug, Default)]
pub struct OutputMap {
    entries: HashMap<PathBuf, ArtifactNames>,
}

impl OutputMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, input: impl Into<PathBuf>, names: ArtifactNames) {
        self.entries.insert(input.into(), names);
    }

    pub fn names_for(&self, input: &Path) -> ArtifactNames {
        self.entries
            .get(input)
            .cloned()
            .unwrap_or_else(|| ArtifactNames::derived_from(input))
    }
}

/// One generated output file, not yet written to disk.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub contents: String,
}

/// Renders the collected registry into named output artifacts.
pub struct CodeEmitter<'a> {
    engine: &'a dyn TemplateEngine,
}

impl<'a> CodeEmitter<'a> {
    pub fn new(engine: &'a dyn TemplateEngine) -> Self {
        Self { engine }
    }

    /// Produce the whole-project artifacts plus one registration and one
    /// serialization artifact per contributing input file. Files that
    /// contributed nothing produce no artifacts at all.
    pub fn emit(
        &self,
        registry: &Registry,
        order: &[&TypeInfo],
        outputs: &OutputMap,
        cache: &MetadataCache,
    ) -> anyhow::Result<Vec<Artifact>> {
        let mut artifacts = Vec::new();

        let mut mangled_names: Vec<String> = order
            .iter()
            .map(|ty| ty.mangled_name.clone())
            .collect();
        mangled_names.extend(registry.enums().iter().map(|en| en.mangled_name.clone()));

        let ordered_registrars: Vec<String> = mangled_names
            .iter()
            .map(|name| format!("Register_{}", name))
            .collect();

        let project = ProjectContext {
            mangled_names,
            ordered_registrars,
        };
        let project_value = serde_json::to_value(&project)?;

        artifacts.push(Artifact {
            file_name: ALL_TYPES_ARTIFACT.to_owned(),
            contents: self.engine.render(template::ALL_TYPES, &project_value)?,
        });
        artifacts.push(Artifact {
            file_name: SEQUENCE_ARTIFACT.to_owned(),
            contents: self
                .engine
                .render(template::REGISTRATION_SEQUENCE, &project_value)?,
        });

        for file in registry.contributing_files() {
            // per-file types in global dependency order, so bases register
            // before derivatives inside the file artifact as well
            let types: Vec<&TypeInfo> = order
                .iter()
                .filter(|ty| ty.declared_in == file)
                .copied()
                .collect();
            let enums: Vec<_> = registry.enums_in_file(&file).collect();

            let names = outputs.names_for(&file);
            let context = FileContext::build(&file, &types, &enums, cache);
            let context_value = serde_json::to_value(&context)?;

            artifacts.push(Artifact {
                file_name: names.registration,
                contents: self
                    .engine
                    .render(template::TYPE_REGISTRATION, &context_value)?,
            });

            // serialization shims only exist for types generated in default
            // mode; custom-serialization types are authored by hand
            let wants_shims = types.iter().any(|ty| {
                ty.serialization == magpie_meta::SerializationMode::Default
            });
            if wants_shims {
                artifacts.push(Artifact {
                    file_name: names.serialization,
                    contents: self
                        .engine
                        .render(template::TYPE_SERIALIZATION, &context_value)?,
                });
            }

            log::debug!(
                "emitted {} type(s), {} enum(s) for {}",
                types.len(),
                enums.len(),
                file.display()
            );
        }

        Ok(artifacts)
    }
}
