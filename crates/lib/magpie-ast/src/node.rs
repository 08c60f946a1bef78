use std::path::PathBuf;

use crate::types::QualType;

/// Syntactic kind of an AST node, as reported by the AST provider.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    TranslationUnit,
    Namespace,
    LinkageSpec,
    Class,
    Struct,
    Enum,
    Field,
    Constructor,
    Method,
    Param,
    BaseSpecifier,
    EnumConstant,
    Annotation,
    /// Anything the metadata pipeline does not care about (typedefs, free
    /// functions, using declarations, ...). Still recursed into.
    Other,
}

impl NodeKind {
    /// Human readable kind name used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "translation unit",
            NodeKind::Namespace => "namespace",
            NodeKind::LinkageSpec => "linkage specification",
            NodeKind::Class => "class",
            NodeKind::Struct => "struct",
            NodeKind::Enum => "enum",
            NodeKind::Field => "field",
            NodeKind::Constructor => "constructor",
            NodeKind::Method => "method",
            NodeKind::Param => "parameter",
            NodeKind::BaseSpecifier => "base specifier",
            NodeKind::EnumConstant => "enum constant",
            NodeKind::Annotation => "annotation",
            NodeKind::Other => "declaration",
        }
    }
}

/// Member visibility as reported by the AST provider.
///
/// Declarations outside of a class body are Public.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// A single node of the provider's syntax tree.
///
/// This is a plain value tree: the provider binding translates its native
/// cursors into these nodes once, and the walker runs over the result as a
/// pure visitor. The chainable constructors are used by provider bindings
/// and by tests to assemble translation units.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub spelling: String,
    pub visibility: Visibility,
    /// File this node was declared in. None for synthetic roots.
    pub file: Option<PathBuf>,
    /// Resolved type attached to this node: the field type for fields, the
    /// return type for methods, the parameter type for parameters and the
    /// named base class for base specifiers.
    pub ty: Option<QualType>,
    /// Only meaningful on methods.
    pub is_const_method: bool,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            visibility: Visibility::Public,
            file: None,
            ty: None,
            is_const_method: false,
            children: Vec::new(),
        }
    }

    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_type(mut self, ty: QualType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn const_method(mut self) -> Self {
        self.is_const_method = true;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Iterate over the direct annotation children of this node.
    pub fn annotations(&self) -> impl Iterator<Item = &Node> {
        self.children
            .iter()
            .filter(|child| child.kind == NodeKind::Annotation)
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}
