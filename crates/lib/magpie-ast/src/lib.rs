mod node;
mod types;
mod diagnostic;
mod provider;

pub use node::{Node, NodeKind, Visibility};
pub use types::{QualType, TypeKind, mangle_segments};
pub use diagnostic::{Diagnostic, Severity};
pub use provider::{AstProvider, TranslationUnit};
