use std::fs;
use std::path::Path;

use anyhow::Context;

use magpie_ast::AstProvider;
use magpie_core::filesystem;
use magpie_emit::{CodeEmitter, TemplateEngine};
use magpie_meta::{registration_order, AstWalker, MetadataCache, Registry};

use crate::config::ProjectConfig;
use crate::diagnostics;
use crate::umbrella;

/// Result of one successful pipeline run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub types: usize,
    pub enums: usize,
    pub written: usize,
    pub unchanged: usize,
}

/// One run-to-completion metadata compilation.
///
/// Owns nothing shared: the registry, graph and cache live and die with the
/// run, and the provider session must not be reused across runs. Artifacts
/// are staged first and reconciled into the output folder only on success,
/// so a failed or cancelled run never disturbs the previous good output set.
pub struct Pipeline<'a> {
    config: ProjectConfig,
    provider: &'a dyn AstProvider,
    engine: &'a dyn TemplateEngine,
    verbose: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: ProjectConfig,
        provider: &'a dyn AstProvider,
        engine: &'a dyn TemplateEngine,
    ) -> Self {
        Self {
            config,
            provider,
            engine,
            verbose: false,
        }
    }

    /// Also surface Ignored/Note parse diagnostics.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn run(&self) -> anyhow::Result<RunSummary> {
        let staging = filesystem::create_staging(&self.config.output_dir)?;

        let result = self.run_staged(&staging);
        if result.is_err() {
            filesystem::discard_staging(&staging);
        }
        result
    }

    fn run_staged(&self, staging: &Path) -> anyhow::Result<RunSummary> {
        log::debug!("synthesizing umbrella header");
        let umbrella_path = umbrella::synthesize(staging, &self.config.inputs)?;

        log::debug!("parsing {}", umbrella_path.display());
        let unit = self
            .provider
            .parse(&umbrella_path, &self.config.ast_flags)
            .context("AST provider failed to parse the umbrella header")?;

        diagnostics::validate_diagnostics(&unit.diagnostics, self.verbose)?;

        log::debug!("walking the syntax tree");
        let permitted = self.config.permitted_files();
        let mut registry = Registry::new();
        AstWalker::new(&permitted, &mut registry).walk(&unit.root)?;
        log::info!(
            "collected {} type(s), {} enum(s)",
            registry.types().len(),
            registry.enums().len()
        );

        let order = registration_order(&registry)?;

        let mut cache = MetadataCache::load(&self.config.upstream_caches)?;
        if !cache.is_empty() {
            log::debug!("{} upstream type(s) known", cache.len());
        }
        cache.record_registry(&registry);

        log::debug!("emitting artifacts");
        let artifacts = CodeEmitter::new(self.engine).emit(
            &registry,
            &order,
            &self.config.output_map(),
            &cache,
        )?;
        for artifact in &artifacts {
            let path = staging.join(&artifact.file_name);
            fs::write(&path, &artifact.contents)
                .with_context(|| format!("Failed to stage artifact: {}", path.display()))?;
        }

        let reconciled = filesystem::reconcile_staging(staging, &self.config.output_dir)?;

        cache.save(&self.config.cache_path())?;

        Ok(RunSummary {
            types: registry.types().len(),
            enums: registry.enums().len(),
            written: reconciled.written,
            unchanged: reconciled.unchanged,
        })
    }
}
