use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::model::{EnumInfo, TypeInfo};

/// Insertion-ordered storage for every entity collected during one run.
///
/// Keyed uniquely by qualified name. Insertion order is a preserved property:
/// the topological tie-break and deterministic emission both depend on it.
/// Re-inserting a known name is a no-op, which tolerates AST providers that
/// revisit forward declarations.
#[derive(Debug, Default)]
pub struct Registry {
    types: Vec<TypeInfo>,
    type_index: HashMap<String, usize>,
    enums: Vec<EnumInfo>,
    enum_index: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a type. Returns false (and changes nothing) if a type with the
    /// same qualified name is already registered.
    pub fn insert_type(&mut self, info: TypeInfo) -> bool {
        if self.type_index.contains_key(&info.qualified_name) {
            return false;
        }
        self.type_index
            .insert(info.qualified_name.clone(), self.types.len());
        self.types.push(info);
        true
    }

    /// Insert an enum. Same no-op semantics as [`Registry::insert_type`].
    pub fn insert_enum(&mut self, info: EnumInfo) -> bool {
        if self.enum_index.contains_key(&info.qualified_name) {
            return false;
        }
        self.enum_index
            .insert(info.qualified_name.clone(), self.enums.len());
        self.enums.push(info);
        true
    }

    pub fn types(&self) -> &[TypeInfo] {
        &self.types
    }

    pub fn enums(&self) -> &[EnumInfo] {
        &self.enums
    }

    pub fn get_type(&self, qualified_name: &str) -> Option<&TypeInfo> {
        self.type_index
            .get(qualified_name)
            .map(|&index| &self.types[index])
    }

    /// Insertion index of a type, used for deterministic tie-breaking.
    pub fn index_of(&self, qualified_name: &str) -> Option<usize> {
        self.type_index.get(qualified_name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.enums.is_empty()
    }

    /// Declaring files that contributed at least one entity, in first
    /// contribution order.
    pub fn contributing_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let type_files = self.types.iter().map(|ty| ty.declared_in.as_path());
        let enum_files = self.enums.iter().map(|en| en.declared_in.as_path());
        for file in type_files.chain(enum_files) {
            if !files.iter().any(|known: &PathBuf| known == file) {
                files.push(file.to_path_buf());
            }
        }
        files
    }

    /// Types declared in the given file, in insertion order.
    pub fn types_in_file<'a>(&'a self, file: &'a Path) -> impl Iterator<Item = &'a TypeInfo> {
        self.types.iter().filter(move |ty| ty.declared_in == file)
    }

    /// Enums declared in the given file, in insertion order.
    pub fn enums_in_file<'a>(&'a self, file: &'a Path) -> impl Iterator<Item = &'a EnumInfo> {
        self.enums.iter().filter(move |en| en.declared_in == file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SerializationMode;

    fn type_named(name: &str, file: &str) -> TypeInfo {
        let mut info = TypeInfo::new(name, name, file, SerializationMode::Default);
        info.constructors.push(crate::model::MethodInfo {
            name: name.to_owned(),
            return_type: magpie_ast::QualType::void(),
            returns_reference: false,
            is_const: false,
            arg_types: Vec::new(),
        });
        info
    }

    #[test]
    fn duplicate_insert_is_a_noop() {
        let mut registry = Registry::new();
        assert!(registry.insert_type(type_named("Engine::A", "a.h")));

        let mut second = type_named("Engine::A", "other.h");
        second.methods.push(crate::model::MethodInfo {
            name: "Extra".to_owned(),
            return_type: magpie_ast::QualType::void(),
            returns_reference: false,
            is_const: false,
            arg_types: Vec::new(),
        });
        assert!(!registry.insert_type(second));

        assert_eq!(registry.types().len(), 1);
        assert!(registry.types()[0].methods.is_empty());
        assert_eq!(registry.types()[0].declared_in, PathBuf::from("a.h"));
    }

    #[test]
    fn contributing_files_preserve_first_contribution_order() {
        let mut registry = Registry::new();
        registry.insert_type(type_named("B", "b.h"));
        registry.insert_type(type_named("A", "a.h"));
        registry.insert_type(type_named("C", "b.h"));

        let files = registry.contributing_files();
        assert_eq!(files, vec![PathBuf::from("b.h"), PathBuf::from("a.h")]);
    }
}
