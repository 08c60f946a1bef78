use magpie_ast::AstProvider;
use magpie_core::console::ConsoleVars;
use magpie_emit::BuiltinTemplates;
use magpie_pipeline::{Pipeline, ProjectConfig, RunSummary};

#[cfg(feature = "libclang")]
mod provider;

fn main() {
    let console_vars = magpie_core::console::from_args();

    magpie_core::log::init_log(magpie_core::log::LogConfig {
        level: console_vars.level,
    })
    .expect("Failed to initialize log module!");

    let exit_code = match run(&console_vars) {
        Ok(summary) => {
            log::info!(
                "done: {} type(s), {} enum(s), {} file(s) written, {} unchanged",
                summary.types,
                summary.enums,
                summary.written,
                summary.unchanged
            );
            0
        }
        Err(err) => {
            log::error!("{:#}", err);
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(console_vars: &ConsoleVars) -> anyhow::Result<RunSummary> {
    let config = ProjectConfig::load(&console_vars.config)?;
    let provider = make_provider()?;
    let engine = BuiltinTemplates;

    Pipeline::new(config, provider.as_ref(), &engine)
        .verbose(console_vars.verbose)
        .run()
}

#[cfg(feature = "libclang")]
fn make_provider() -> anyhow::Result<Box<dyn AstProvider>> {
    Ok(Box::new(provider::ClangProvider::new()?))
}

#[cfg(not(feature = "libclang"))]
fn make_provider() -> anyhow::Result<Box<dyn AstProvider>> {
    anyhow::bail!("metagen was built without an AST provider, rebuild with `--features libclang`")
}
