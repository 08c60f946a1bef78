use std::collections::HashSet;
use std::path::PathBuf;

use magpie_ast::{Node, NodeKind, QualType};
use thiserror::Error;

use crate::attributes::{self, ClassMarker, Purpose};
use crate::model::{ContainerShape, EnumInfo, FieldInfo, MethodInfo, TypeInfo};
use crate::registry::Registry;

/// Usage errors detected during traversal. These indicate incorrect source
/// annotations and abort the run.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("reflection marker applied to unsupported {kind} `{name}`")]
    UnsupportedMarker { kind: &'static str, name: String },
}

/// Recursive visitor over the provider's syntax tree.
///
/// Subtrees declared outside the permitted file set are pruned, which bounds
/// cost and keeps unrelated library internals reachable through includes out
/// of the registry. Scope names are tracked on the way down so qualified
/// names never need parent pointers.
pub struct AstWalker<'a> {
    permitted: &'a HashSet<PathBuf>,
    registry: &'a mut Registry,
}

impl<'a> AstWalker<'a> {
    pub fn new(permitted: &'a HashSet<PathBuf>, registry: &'a mut Registry) -> Self {
        Self {
            permitted,
            registry,
        }
    }

    pub fn walk(&mut self, root: &Node) -> Result<(), WalkError> {
        let mut scope = Vec::new();
        self.visit(root, &mut scope)
    }

    fn visit(&mut self, node: &Node, scope: &mut Vec<String>) -> Result<(), WalkError> {
        for child in &node.children {
            if let Some(file) = &child.file {
                if !self.permitted.contains(file) {
                    // prune: do not recurse into foreign subtrees
                    continue;
                }
            }

            if let Some(marker) = attributes::class_marker(child) {
                match child.kind {
                    NodeKind::Class | NodeKind::Struct => self.extract_type(child, scope, marker),
                    NodeKind::Enum => self.extract_enum(child, scope),
                    kind => {
                        return Err(WalkError::UnsupportedMarker {
                            kind: kind.describe(),
                            name: child.spelling.clone(),
                        })
                    }
                }
            }

            match child.kind {
                // namespaces and record bodies open a new scope segment
                NodeKind::Namespace | NodeKind::Class | NodeKind::Struct => {
                    scope.push(child.spelling.clone());
                    self.visit(child, scope)?;
                    scope.pop();
                }
                // linkage specifications are transparent for naming
                NodeKind::LinkageSpec => self.visit(child, scope)?,
                // enumerators never declare further types
                NodeKind::Enum => {}
                _ => self.visit(child, scope)?,
            }
        }
        Ok(())
    }

    fn extract_type(&mut self, node: &Node, scope: &[String], marker: ClassMarker) {
        let mut segments: Vec<&str> = scope.iter().map(String::as_str).collect();
        segments.push(&node.spelling);

        let qualified_name = segments.join("::");
        let mangled_name = magpie_ast::mangle_segments(segments.iter().copied());

        let mut info = TypeInfo::new(
            qualified_name,
            mangled_name,
            node.file.clone().unwrap_or_default(),
            marker.serialization,
        );

        for child in &node.children {
            match child.kind {
                NodeKind::BaseSpecifier => {
                    if let Some(ty) = &child.ty {
                        info.base_types.push(ty.qualified_name());
                    }
                }
                // inner types are never merged into the outer type's members;
                // a marked nested type registers on its own during recursion
                NodeKind::Class | NodeKind::Struct | NodeKind::Enum => {}
                NodeKind::Field => self.collect_field(child, marker, &mut info),
                NodeKind::Constructor => {
                    if attributes::resolve(child, marker.participation, Purpose::Reflection) {
                        info.constructors.push(constructor_info(node, child));
                    }
                }
                NodeKind::Method => {
                    if attributes::resolve(child, marker.participation, Purpose::Reflection) {
                        info.methods.push(method_info(child));
                    }
                }
                _ => {}
            }
        }

        if !info.has_members() {
            log::debug!(
                "discarding `{}`: no reflected members collected",
                info.qualified_name
            );
            return;
        }

        if !self.registry.insert_type(info) {
            // providers revisit forward declarations, the second occurrence
            // is a silent no-op
            log::debug!("type re-encountered, keeping the first registration");
        }
    }

    fn collect_field(&mut self, node: &Node, marker: ClassMarker, info: &mut TypeInfo) {
        let reflected = attributes::resolve(node, marker.participation, Purpose::Reflection);
        let serialized = attributes::resolve(node, marker.participation, Purpose::Serialization);
        if !reflected && !serialized {
            return;
        }

        let ty = match &node.ty {
            Some(ty) => ty,
            None => return,
        };

        if ty.is_const {
            // generated code must default-construct and assign fields
            log::warn!(
                "const field `{}::{}` cannot be reflected, skipping",
                info.qualified_name,
                node.spelling
            );
            return;
        }

        let field = FieldInfo {
            name: node.spelling.clone(),
            shape: ContainerShape::classify(ty),
            ty: ty.clone(),
        };

        if reflected {
            harvest_pointer_elements(ty, &mut info.reflected_pointer_elements);
            info.fields.push(field.clone());
        }
        if serialized {
            harvest_pointer_elements(ty, &mut info.serialized_pointer_elements);
            info.serialized_fields.push(field);
        }
    }

    fn extract_enum(&mut self, node: &Node, scope: &[String]) {
        let mut segments: Vec<&str> = scope.iter().map(String::as_str).collect();
        segments.push(&node.spelling);

        let values: Vec<String> = node
            .children
            .iter()
            .filter(|child| child.kind == NodeKind::EnumConstant)
            .map(|child| child.spelling.clone())
            .collect();

        if values.is_empty() {
            log::debug!("discarding enum `{}`: no enumerators", segments.join("::"));
            return;
        }

        let info = EnumInfo {
            qualified_name: segments.join("::"),
            mangled_name: magpie_ast::mangle_segments(segments.iter().copied()),
            declared_in: node.file.clone().unwrap_or_default(),
            values,
        };
        self.registry.insert_enum(info);
    }
}

/// Walk a field type's template arguments (and wrapped element types) and
/// collect every owning/weak smart-pointer element name found.
fn harvest_pointer_elements(ty: &QualType, out: &mut Vec<String>) {
    if let Some(element) = ty.smart_pointer_element() {
        let name = element.full_name();
        if !out.contains(&name) {
            out.push(name);
        }
    }
    for arg in &ty.template_args {
        harvest_pointer_elements(arg, out);
    }
    if let Some(inner) = &ty.inner {
        harvest_pointer_elements(inner, out);
    }
}

fn constructor_info(owner: &Node, node: &Node) -> MethodInfo {
    MethodInfo {
        name: owner.spelling.clone(),
        return_type: QualType::void(),
        returns_reference: false,
        is_const: false,
        arg_types: param_types(node),
    }
}

fn method_info(node: &Node) -> MethodInfo {
    let return_type = node.ty.clone().unwrap_or_else(QualType::void);
    MethodInfo {
        name: node.spelling.clone(),
        returns_reference: return_type.is_reference(),
        is_const: node.is_const_method,
        return_type,
        arg_types: param_types(node),
    }
}

fn param_types(node: &Node) -> Vec<QualType> {
    node.children
        .iter()
        .filter(|child| child.kind == NodeKind::Param)
        .filter_map(|child| child.ty.clone())
        .collect()
}
