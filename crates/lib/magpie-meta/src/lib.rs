mod model;
mod registry;
mod walker;
mod graph;
mod cache;

pub mod attributes;

pub use model::{
    ContainerShape, EnumInfo, FieldInfo, MethodInfo, ParticipationMode, SerializationMode,
    TypeInfo,
};
pub use registry::Registry;
pub use walker::{AstWalker, WalkError};
pub use graph::{registration_order, GraphError};
pub use cache::MetadataCache;
