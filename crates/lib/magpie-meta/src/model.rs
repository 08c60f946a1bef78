use std::path::PathBuf;

use magpie_ast::QualType;

/// Per-type policy controlling whether members must be explicitly marked to
/// participate, or participate by default unless explicitly excluded.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ParticipationMode {
    #[default]
    AllowList,
    DenyList,
}

/// Per-type policy controlling whether serialization shims are generated or
/// authored by hand.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum SerializationMode {
    #[default]
    Default,
    Custom,
}

/// Container shape of a reflected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerShape {
    Scalar,
    /// A native fixed-size array, e.g. `float[16]`.
    FixedArray { element: QualType, extent: usize },
    /// A dynamically sized sequence container, e.g. `std::vector<T>`.
    DynamicSequence { element: QualType },
    /// A fixed-size sequence container, e.g. `std::array<T, N>`.
    FixedSequence { element: QualType },
}

impl ContainerShape {
    pub fn classify(ty: &QualType) -> ContainerShape {
        if let (magpie_ast::TypeKind::ConstantArray, Some(inner)) = (ty.kind, &ty.inner) {
            return ContainerShape::FixedArray {
                element: (**inner).clone(),
                extent: ty.extent.unwrap_or(0),
            };
        }
        if ty.is_dynamic_sequence() {
            if let Some(element) = ty.template_args.first() {
                return ContainerShape::DynamicSequence {
                    element: element.clone(),
                };
            }
        }
        if ty.is_fixed_sequence() {
            if let Some(element) = ty.template_args.first() {
                return ContainerShape::FixedSequence {
                    element: element.clone(),
                };
            }
        }
        ContainerShape::Scalar
    }
}

/// A reflected data member.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub name: String,
    pub ty: QualType,
    pub shape: ContainerShape,
}

/// A reflected method. Constructors are represented as methods whose name
/// equals the owning type's name and whose return type is void.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub name: String,
    pub return_type: QualType,
    /// Reference-returning accessors need different calling-convention
    /// handling in the generated wrappers.
    pub returns_reference: bool,
    pub is_const: bool,
    pub arg_types: Vec<QualType>,
}

/// Everything collected about one reflected class or struct.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Fully qualified name, e.g. `Engine::Transform`. Unique registry key.
    pub qualified_name: String,
    /// Punctuation-free registration key, e.g. `Engine6Transform9`.
    pub mangled_name: String,
    pub declared_in: PathBuf,
    pub serialization: SerializationMode,
    /// Qualified names of declared base classes, in declaration order.
    pub base_types: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub constructors: Vec<MethodInfo>,
    pub methods: Vec<MethodInfo>,
    /// Fields marked for persistence. Driven independently of `fields`.
    pub serialized_fields: Vec<FieldInfo>,
    /// Smart-pointer element type names harvested from reflected fields.
    pub reflected_pointer_elements: Vec<String>,
    /// Smart-pointer element type names harvested from serialized fields.
    pub serialized_pointer_elements: Vec<String>,
}

impl TypeInfo {
    pub fn new(
        qualified_name: impl Into<String>,
        mangled_name: impl Into<String>,
        declared_in: impl Into<PathBuf>,
        serialization: SerializationMode,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            mangled_name: mangled_name.into(),
            declared_in: declared_in.into(),
            serialization,
            base_types: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            serialized_fields: Vec::new(),
            reflected_pointer_elements: Vec::new(),
            serialized_pointer_elements: Vec::new(),
        }
    }

    /// True if at least one member was collected. Marker-only classes and
    /// forward declarations never make it into the registry.
    pub fn has_members(&self) -> bool {
        !self.fields.is_empty()
            || !self.constructors.is_empty()
            || !self.methods.is_empty()
            || !self.serialized_fields.is_empty()
    }
}

/// A reflected enum: its identity plus enumerator names in declaration order.
#[derive(Debug, Clone)]
pub struct EnumInfo {
    pub qualified_name: String,
    pub mangled_name: String,
    pub declared_in: PathBuf,
    pub values: Vec<String>,
}
