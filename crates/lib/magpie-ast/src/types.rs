use std::collections::HashSet;

use lazy_static::lazy_static;

lazy_static! {
    static ref SMART_POINTER_NAMES: HashSet<&'static str> = HashSet::from([
        "shared_ptr",
        "unique_ptr",
        "weak_ptr",
    ]);
}

/// Shape of a resolved type, mirroring the kinds the AST provider reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Builtin scalar types (int, float, bool, ...). The spelling carries
    /// the provider's rendering of the type.
    Builtin,
    Pointer,
    LValueReference,
    RValueReference,
    ConstantArray,
    Record,
    Enum,
}

/// A resolved, possibly qualified type as reported by the AST provider.
///
/// Record and enum types carry their full scope path (e.g. `["Engine",
/// "Transform"]`), pointers, references and arrays wrap an inner type, and
/// template specializations carry their argument types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualType {
    pub kind: TypeKind,
    pub is_const: bool,
    pub spelling: String,
    pub path: Vec<String>,
    pub inner: Option<Box<QualType>>,
    pub extent: Option<usize>,
    pub template_args: Vec<QualType>,
}

impl QualType {
    fn empty(kind: TypeKind) -> Self {
        Self {
            kind,
            is_const: false,
            spelling: String::new(),
            path: Vec::new(),
            inner: None,
            extent: None,
            template_args: Vec::new(),
        }
    }

    pub fn builtin(spelling: impl Into<String>) -> Self {
        let mut ty = Self::empty(TypeKind::Builtin);
        ty.spelling = spelling.into();
        ty
    }

    pub fn void() -> Self {
        Self::builtin("void")
    }

    pub fn record<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Self {
        let mut ty = Self::empty(TypeKind::Record);
        ty.path = path.into_iter().map(Into::into).collect();
        ty
    }

    pub fn record_with_args<S: Into<String>>(
        path: impl IntoIterator<Item = S>,
        args: impl IntoIterator<Item = QualType>,
    ) -> Self {
        let mut ty = Self::record(path);
        ty.template_args = args.into_iter().collect();
        ty
    }

    pub fn enumeration<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Self {
        let mut ty = Self::empty(TypeKind::Enum);
        ty.path = path.into_iter().map(Into::into).collect();
        ty
    }

    pub fn pointer(pointee: QualType) -> Self {
        let mut ty = Self::empty(TypeKind::Pointer);
        ty.inner = Some(Box::new(pointee));
        ty
    }

    pub fn lvalue_reference(pointee: QualType) -> Self {
        let mut ty = Self::empty(TypeKind::LValueReference);
        ty.inner = Some(Box::new(pointee));
        ty
    }

    pub fn rvalue_reference(pointee: QualType) -> Self {
        let mut ty = Self::empty(TypeKind::RValueReference);
        ty.inner = Some(Box::new(pointee));
        ty
    }

    pub fn constant_array(element: QualType, extent: usize) -> Self {
        let mut ty = Self::empty(TypeKind::ConstantArray);
        ty.inner = Some(Box::new(element));
        ty.extent = Some(extent);
        ty
    }

    pub fn as_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, TypeKind::LValueReference | TypeKind::RValueReference)
    }

    /// Qualified name of a record/enum type including template arguments,
    /// e.g. `std::vector<Engine::GameObject *>`.
    pub fn qualified_name(&self) -> String {
        let mut name = self.path.join("::");
        if !self.template_args.is_empty() {
            let args = self
                .template_args
                .iter()
                .map(|arg| arg.full_name())
                .collect::<Vec<_>>()
                .join(", ");
            name.push('<');
            name.push_str(&args);
            name.push('>');
        }
        name
    }

    /// Full textual rendering of this type the way it appears in source,
    /// e.g. `const Engine::Transform &` or `float[16]`.
    pub fn full_name(&self) -> String {
        let mut result = String::new();
        if self.is_const {
            result.push_str("const ");
        }

        match self.kind {
            TypeKind::Pointer => {
                result.push_str(&self.inner_name());
                result.push_str(" *");
            }
            TypeKind::ConstantArray => {
                result.push_str(&self.inner_name());
                result.push_str(&format!("[{}]", self.extent.unwrap_or(0)));
            }
            TypeKind::LValueReference => {
                result.push_str(&self.inner_name());
                result.push_str(" &");
            }
            TypeKind::RValueReference => {
                result.push_str(&self.inner_name());
                result.push_str(" &&");
            }
            TypeKind::Record | TypeKind::Enum => {
                result.push_str(&self.qualified_name());
            }
            TypeKind::Builtin => {
                result.push_str(&self.spelling);
            }
        }
        result
    }

    /// Punctuation-free registration key of this type.
    pub fn mangled_name(&self) -> String {
        let mut result = String::new();
        if self.is_const {
            result.push_str("const");
        }

        match self.kind {
            TypeKind::Record | TypeKind::Enum => {
                let mut segments = self.path.clone();
                if !self.template_args.is_empty() {
                    if let Some(last) = segments.last_mut() {
                        let args = self
                            .template_args
                            .iter()
                            .map(|arg| arg.full_name())
                            .collect::<Vec<_>>()
                            .join(", ");
                        last.push('<');
                        last.push_str(&args);
                        last.push('>');
                    }
                }
                result.push_str(&mangle_segments(segments.iter().map(String::as_str)));
            }
            _ => result.push_str(&self.spelling),
        }
        result
    }

    /// Some(element type) if this is an owning or weak std smart pointer.
    pub fn smart_pointer_element(&self) -> Option<&QualType> {
        if self.kind != TypeKind::Record || self.path.len() != 2 || self.path[0] != "std" {
            return None;
        }
        if !SMART_POINTER_NAMES.contains(self.path[1].as_str()) {
            return None;
        }
        // smart pointers carry exactly one template argument of interest
        self.template_args.first()
    }

    /// A dynamically sized sequence container (std::vector).
    pub fn is_dynamic_sequence(&self) -> bool {
        self.kind == TypeKind::Record && self.path == ["std", "vector"]
    }

    /// A fixed size sequence container (std::array).
    pub fn is_fixed_sequence(&self) -> bool {
        self.kind == TypeKind::Record && self.path == ["std", "array"]
    }

    fn inner_name(&self) -> String {
        self.inner
            .as_ref()
            .map(|inner| inner.full_name())
            .unwrap_or_default()
    }
}

/// Flatten scope segments into a collision resistant identifier: every
/// segment has angle brackets replaced by underscores and is suffixed with
/// its own length, e.g. `["Engine", "Transform"]` -> `Engine6Transform9`.
pub fn mangle_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut result = String::new();
    for segment in segments {
        let flat = segment.replace('<', "_").replace('>', "_");
        result.push_str(&flat);
        result.push_str(&flat.len().to_string());
    }
    result
}
