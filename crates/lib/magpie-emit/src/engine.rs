/// Names of the templates the emitter renders.
pub mod template {
    /// Per-file registration glue.
    pub const TYPE_REGISTRATION: &str = "type_registration";
    /// Per-file serialization shims.
    pub const TYPE_SERIALIZATION: &str = "type_serialization";
    /// Whole-project mangled identifier enumeration.
    pub const ALL_TYPES: &str = "all_types";
    /// Whole-project dependency-ordered registration sequence.
    pub const REGISTRATION_SEQUENCE: &str = "registration_sequence";
}

/// The external text-rendering boundary.
///
/// Renders a named template against a context value into output text.
/// Purely functional: implementations must not have observable side effects,
/// and identical inputs must yield identical output so the staging reconcile
/// can skip unchanged files.
pub trait TemplateEngine {
    fn render(&self, template: &str, context: &serde_json::Value) -> anyhow::Result<String>;
}
