use std::path::Path;

use crate::diagnostic::Diagnostic;
use crate::node::Node;

/// A parsed translation unit: the root of the syntax tree plus every
/// diagnostic the parser produced.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub root: Node,
    pub diagnostics: Vec<Diagnostic>,
}

/// The external parser boundary.
///
/// A provider session is scoped to exactly one pipeline run; implementations
/// must not share parser state across runs.
pub trait AstProvider {
    /// Parse the synthesized umbrella source with the given compiler-style
    /// flags. Only unrecoverable parser failures (e.g. unreadable input)
    /// surface as Err; source problems come back as diagnostics.
    fn parse(&self, umbrella: &Path, flags: &[String]) -> anyhow::Result<TranslationUnit>;
}
