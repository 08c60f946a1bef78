mod engine;
mod context;
mod templates;
mod emitter;

pub use engine::{template, TemplateEngine};
pub use context::{EnumContext, FieldContext, FileContext, MethodContext, ProjectContext, TypeContext};
pub use templates::BuiltinTemplates;
pub use emitter::{Artifact, ArtifactNames, CodeEmitter, OutputMap};
