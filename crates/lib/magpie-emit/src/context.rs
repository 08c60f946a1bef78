use std::path::Path;

use serde::{Deserialize, Serialize};

use magpie_meta::{
    ContainerShape, EnumInfo, FieldInfo, MetadataCache, MethodInfo, SerializationMode, TypeInfo,
};

/// Field as seen by the templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldContext {
    pub name: String,
    pub type_name: String,
    /// One of "scalar", "fixed_array", "dynamic_sequence", "fixed_sequence".
    pub shape: String,
    pub element: Option<String>,
    pub extent: Option<usize>,
}

impl FieldContext {
    fn from_info(info: &FieldInfo) -> Self {
        let (shape, element, extent) = match &info.shape {
            ContainerShape::Scalar => ("scalar", None, None),
            ContainerShape::FixedArray { element, extent } => {
                ("fixed_array", Some(element.full_name()), Some(*extent))
            }
            ContainerShape::DynamicSequence { element } => {
                ("dynamic_sequence", Some(element.full_name()), None)
            }
            ContainerShape::FixedSequence { element } => {
                ("fixed_sequence", Some(element.full_name()), None)
            }
        };
        Self {
            name: info.name.clone(),
            type_name: info.ty.full_name(),
            shape: shape.to_owned(),
            element,
            extent,
        }
    }
}

/// Method or constructor as seen by the templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodContext {
    pub name: String,
    pub return_type: String,
    pub returns_reference: bool,
    pub is_const: bool,
    pub arg_types: Vec<String>,
}

impl MethodContext {
    fn from_info(info: &MethodInfo) -> Self {
        Self {
            name: info.name.clone(),
            return_type: info.return_type.full_name(),
            returns_reference: info.returns_reference,
            is_const: info.is_const,
            arg_types: info.arg_types.iter().map(|ty| ty.full_name()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeContext {
    pub qualified_name: String,
    pub mangled_name: String,
    pub custom_serialization: bool,
    pub base_types: Vec<String>,
    pub fields: Vec<FieldContext>,
    pub constructors: Vec<MethodContext>,
    pub methods: Vec<MethodContext>,
    pub serialized_fields: Vec<FieldContext>,
    pub reflected_pointer_elements: Vec<String>,
    pub serialized_pointer_elements: Vec<String>,
}

impl TypeContext {
    pub fn from_info(info: &TypeInfo) -> Self {
        Self {
            qualified_name: info.qualified_name.clone(),
            mangled_name: info.mangled_name.clone(),
            custom_serialization: info.serialization == SerializationMode::Custom,
            base_types: info.base_types.clone(),
            fields: info.fields.iter().map(FieldContext::from_info).collect(),
            constructors: info.constructors.iter().map(MethodContext::from_info).collect(),
            methods: info.methods.iter().map(MethodContext::from_info).collect(),
            serialized_fields: info
                .serialized_fields
                .iter()
                .map(FieldContext::from_info)
                .collect(),
            reflected_pointer_elements: info.reflected_pointer_elements.clone(),
            serialized_pointer_elements: info.serialized_pointer_elements.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumContext {
    pub qualified_name: String,
    pub mangled_name: String,
    pub values: Vec<String>,
}

impl EnumContext {
    pub fn from_info(info: &EnumInfo) -> Self {
        Self {
            qualified_name: info.qualified_name.clone(),
            mangled_name: info.mangled_name.clone(),
            values: info.values.clone(),
        }
    }
}

/// Everything one input file contributed, plus the extra headers its
/// smart-pointer element types require.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContext {
    pub header: String,
    pub types: Vec<TypeContext>,
    pub enums: Vec<EnumContext>,
    /// Headers needed by reflected smart-pointer element types.
    pub reflection_includes: Vec<String>,
    /// Headers needed by serialized smart-pointer element types.
    pub serialization_includes: Vec<String>,
}

impl FileContext {
    pub fn build(
        header: &Path,
        types: &[&TypeInfo],
        enums: &[&EnumInfo],
        cache: &MetadataCache,
    ) -> Self {
        let reflection_includes = resolve_includes(
            types
                .iter()
                .flat_map(|ty| ty.reflected_pointer_elements.iter()),
            cache,
        );
        let serialization_includes = resolve_includes(
            types
                .iter()
                .flat_map(|ty| ty.serialized_pointer_elements.iter()),
            cache,
        );

        Self {
            header: header.display().to_string(),
            types: types.iter().map(|ty| TypeContext::from_info(ty)).collect(),
            enums: enums.iter().map(|en| EnumContext::from_info(en)).collect(),
            reflection_includes,
            serialization_includes,
        }
    }
}

/// Map smart-pointer element type names to their declaring headers through
/// the merged metadata cache. Unknown names (builtins, unreflected types)
/// contribute no include.
fn resolve_includes<'a>(
    elements: impl Iterator<Item = &'a String>,
    cache: &MetadataCache,
) -> Vec<String> {
    let mut includes = Vec::new();
    for element in elements {
        match cache.declaring_file(element) {
            Some(file) => {
                let include = file.display().to_string();
                if !includes.contains(&include) {
                    includes.push(include);
                }
            }
            None => log::debug!("no declaring header known for `{}`", element),
        }
    }
    includes
}

/// Whole-project artifact context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Mangled identifiers of every collected entity, in registration order.
    pub mangled_names: Vec<String>,
    /// Registrar function names in base-before-derivative order.
    pub ordered_registrars: Vec<String>,
}
