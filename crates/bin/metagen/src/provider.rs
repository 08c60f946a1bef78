//! libclang binding: translates clang entities into the provider-neutral
//! node tree the pipeline consumes. One provider session per pipeline run.

use std::path::Path;

use anyhow::Context;
use clang::{Accessibility, Clang, Entity, EntityKind, Index};

use magpie_ast::{
    AstProvider, Diagnostic, Node, NodeKind, QualType, Severity, TranslationUnit, Visibility,
};

pub struct ClangProvider {
    clang: Clang,
}

impl ClangProvider {
    pub fn new() -> anyhow::Result<Self> {
        let clang = Clang::new().map_err(anyhow::Error::msg)?;
        Ok(Self { clang })
    }
}

impl AstProvider for ClangProvider {
    fn parse(&self, umbrella: &Path, flags: &[String]) -> anyhow::Result<TranslationUnit> {
        let index = Index::new(&self.clang, false, false);
        let unit = index
            .parser(umbrella)
            .arguments(flags)
            .skip_function_bodies(true)
            .incomplete(true)
            .parse()
            .with_context(|| format!("Failed to parse {}", umbrella.display()))?;

        let root = convert_entity(&unit.get_entity());
        let diagnostics = unit
            .get_diagnostics()
            .iter()
            .map(convert_diagnostic)
            .collect();

        Ok(TranslationUnit { root, diagnostics })
    }
}

fn convert_entity(entity: &Entity) -> Node {
    let kind = convert_kind(entity.get_kind());

    let spelling = match kind {
        // the annotation payload lives in the display name
        NodeKind::Annotation => entity.get_display_name().unwrap_or_default(),
        _ => entity.get_name().unwrap_or_default(),
    };

    let mut node = Node::new(kind, spelling);

    node.visibility = match entity.get_accessibility() {
        Some(Accessibility::Protected) => Visibility::Protected,
        Some(Accessibility::Private) => Visibility::Private,
        _ => Visibility::Public,
    };

    node.file = entity
        .get_location()
        .and_then(|location| location.get_file_location().file)
        .map(|file| file.get_path());

    node.ty = match kind {
        NodeKind::Field | NodeKind::Param | NodeKind::BaseSpecifier => {
            entity.get_type().map(|ty| convert_type(&ty))
        }
        NodeKind::Method => entity.get_result_type().map(|ty| convert_type(&ty)),
        _ => None,
    };

    node.is_const_method = entity.is_const_method();

    node.children = entity
        .get_children()
        .iter()
        .map(convert_entity)
        .collect();

    node
}

fn convert_kind(kind: EntityKind) -> NodeKind {
    match kind {
        EntityKind::TranslationUnit => NodeKind::TranslationUnit,
        EntityKind::Namespace => NodeKind::Namespace,
        EntityKind::LinkageSpec => NodeKind::LinkageSpec,
        EntityKind::ClassDecl => NodeKind::Class,
        EntityKind::StructDecl => NodeKind::Struct,
        EntityKind::EnumDecl => NodeKind::Enum,
        EntityKind::FieldDecl => NodeKind::Field,
        EntityKind::Constructor => NodeKind::Constructor,
        EntityKind::Method => NodeKind::Method,
        EntityKind::ParmDecl => NodeKind::Param,
        EntityKind::BaseSpecifier => NodeKind::BaseSpecifier,
        EntityKind::EnumConstantDecl => NodeKind::EnumConstant,
        EntityKind::AnnotateAttr => NodeKind::Annotation,
        _ => NodeKind::Other,
    }
}

fn convert_type(ty: &clang::Type) -> QualType {
    use clang::TypeKind as CK;

    let mut converted = match ty.get_kind() {
        CK::Pointer => QualType::pointer(inner_or_void(ty.get_pointee_type())),
        CK::LValueReference => QualType::lvalue_reference(inner_or_void(ty.get_pointee_type())),
        CK::RValueReference => QualType::rvalue_reference(inner_or_void(ty.get_pointee_type())),
        CK::ConstantArray => QualType::constant_array(
            inner_or_void(ty.get_element_type()),
            ty.get_size().unwrap_or(0),
        ),
        CK::Record | CK::Elaborated | CK::Enum => {
            let path = declaration_path(ty);
            let args = ty
                .get_template_argument_types()
                .unwrap_or_default()
                .into_iter()
                .flatten()
                .map(|arg| convert_type(&arg))
                .collect::<Vec<_>>();
            let mut record = if ty.get_kind() == CK::Enum {
                QualType::enumeration(path)
            } else {
                QualType::record_with_args(path, args)
            };
            record.spelling = ty.get_display_name();
            record
        }
        _ => QualType::builtin(ty.get_display_name()),
    };

    if ty.is_const_qualified() {
        converted = converted.as_const();
    }
    converted
}

fn inner_or_void(ty: Option<clang::Type>) -> QualType {
    ty.map(|ty| convert_type(&ty)).unwrap_or_else(QualType::void)
}

/// Scope path of a record/enum declaration, outermost first, skipping the
/// translation unit and linkage specifications.
fn declaration_path(ty: &clang::Type) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = ty.get_declaration();
    while let Some(entity) = current {
        match entity.get_kind() {
            EntityKind::TranslationUnit | EntityKind::LinkageSpec => break,
            _ => {
                if let Some(name) = entity.get_name() {
                    segments.push(name);
                }
            }
        }
        current = entity.get_semantic_parent();
    }
    segments.reverse();
    segments
}

fn convert_diagnostic(diagnostic: &clang::diagnostic::Diagnostic) -> Diagnostic {
    use clang::diagnostic::Severity as CS;

    let severity = match diagnostic.get_severity() {
        CS::Ignored => Severity::Ignored,
        CS::Note => Severity::Note,
        CS::Warning => Severity::Warning,
        CS::Error => Severity::Error,
        CS::Fatal => Severity::Fatal,
    };

    let location = diagnostic.get_location().get_file_location();
    let mut converted = Diagnostic::new(severity, diagnostic.get_text());
    if let Some(file) = location.file {
        converted = converted.at(file.get_path(), location.line, location.column);
    }
    converted
}
