use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::InputConfig;

/// Name of the synthesized umbrella header.
pub const UMBRELLA_ARTIFACT: &str = "all_headers.gen.hpp";

/// Write the umbrella header including every target file.
///
/// The annotation macros must be defined before any marked class uses them,
/// so headers under a Reflection path are included first. The umbrella lands
/// in the staging folder and reconciles into the output folder with the rest
/// of the artifacts.
pub fn synthesize(staging: &Path, inputs: &[InputConfig]) -> anyhow::Result<PathBuf> {
    let mut text = String::new();

    let reflection_first = inputs
        .iter()
        .filter(|input| input.file.to_string_lossy().contains("Reflection"));
    let everything_else = inputs
        .iter()
        .filter(|input| !input.file.to_string_lossy().contains("Reflection"));

    for input in reflection_first.chain(everything_else) {
        writeln!(text, "#include \"{}\"", input.file.display())?;
    }

    let path = staging.join(UMBRELLA_ARTIFACT);
    fs::write(&path, text)
        .with_context(|| format!("Failed to write umbrella header: {}", path.display()))?;
    Ok(path)
}
