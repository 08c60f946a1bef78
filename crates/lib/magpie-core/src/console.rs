use std::path::PathBuf;

use structopt::StructOpt;

/// Collect console configuration into a struct.
pub fn from_args() -> ConsoleVars {
    let console_var = ConsoleVarsImpl::from_args();

    let level = match console_var.level.to_lowercase().trim() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => panic!("Unknown log level!"),
    };

    ConsoleVars {
        level,
        verbose: console_var.verbose,
        config: console_var.config,
    }
}

/// Console variables collect from console commands.
pub struct ConsoleVars {
    pub level: log::LevelFilter,
    /// Print Ignored/Note parse diagnostics as well.
    pub verbose: bool,
    pub config: PathBuf,
}

#[derive(Debug, StructOpt)]
#[structopt(name = "metagen", about = "Reflection metadata generator.")]
struct ConsoleVarsImpl {
    /// log level (please choose from trace, debug, info, warn, error)
    #[structopt(short, long, default_value = "info")]
    level: String,

    /// print ignored and note severity parse diagnostics
    #[structopt(short, long)]
    verbose: bool,

    /// path to the project configuration file
    #[structopt(parse(from_os_str))]
    config: PathBuf,
}
