//! Annotation directives controlling member participation.
//!
//! Classes opt into reflection with a marker annotation carrying optional
//! mode tokens; members carry enable/disable directives scoped to either
//! reflection or serialization. The decision table in [`resolve`] determines
//! which members appear in generated code, so its order of evaluation is
//! load-bearing.

use magpie_ast::{Node, NodeKind};

use crate::model::{ParticipationMode, SerializationMode};

/// Class-level marker annotation, e.g. `%REFL_SER_CLASS BlackList`.
pub const CLASS_MARKER: &str = "%REFL_SER_CLASS";

const REFLECTION_DIRECTIVE: &str = "%REFLECTION";
const SERIALIZATION_DIRECTIVE: &str = "%SERIALIZATION";

const MODE_ALLOW_LIST: &str = "WhiteList";
const MODE_DENY_LIST: &str = "BlackList";
const MODE_DEFAULT_SERIALIZATION: &str = "DefaultSerialization";
const MODE_CUSTOM_SERIALIZATION: &str = "CustomSerialization";

/// Which generation path a directive applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Purpose {
    Reflection,
    Serialization,
}

impl Purpose {
    fn directive(&self) -> &'static str {
        match self {
            Purpose::Reflection => REFLECTION_DIRECTIVE,
            Purpose::Serialization => SERIALIZATION_DIRECTIVE,
        }
    }

    /// Syntactic kinds a member of this purpose may have.
    fn allows(&self, kind: NodeKind) -> bool {
        match self {
            Purpose::Reflection => matches!(
                kind,
                NodeKind::Field | NodeKind::Constructor | NodeKind::Method
            ),
            Purpose::Serialization => kind == NodeKind::Field,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Purpose::Reflection => "reflection",
            Purpose::Serialization => "serialization",
        }
    }
}

/// Modes parsed from the class marker, decided once per type.
#[derive(Debug, Default, Copy, Clone)]
pub struct ClassMarker {
    pub participation: ParticipationMode,
    pub serialization: SerializationMode,
}

/// Scan a node's annotations for the class marker. Returns None if the node
/// is not marked for reflection at all.
pub fn class_marker(node: &Node) -> Option<ClassMarker> {
    for annotation in node.annotations() {
        let spelling = annotation.spelling.trim();
        let rest = match spelling.strip_prefix(CLASS_MARKER) {
            Some(rest) => rest,
            None => continue,
        };

        let mut marker = ClassMarker::default();
        for token in rest.split_whitespace() {
            match token {
                MODE_ALLOW_LIST => marker.participation = ParticipationMode::AllowList,
                MODE_DENY_LIST => marker.participation = ParticipationMode::DenyList,
                MODE_DEFAULT_SERIALIZATION => marker.serialization = SerializationMode::Default,
                MODE_CUSTOM_SERIALIZATION => marker.serialization = SerializationMode::Custom,
                unknown => log::warn!(
                    "unknown mode token `{}` on reflection marker of `{}`",
                    unknown,
                    node.spelling
                ),
            }
        }
        return Some(marker);
    }
    None
}

/// Decide whether a member node participates in the given purpose.
///
/// The table is evaluated strictly in this order:
/// 1. both enable and disable present -> warn, not participating;
/// 2. enable present on a kind the purpose does not allow -> warn, not
///    participating;
/// 3. non-public member -> not participating (warn only when enable was
///    explicit, since that indicates annotation misuse);
/// 4. otherwise allow-list participates iff enabled, deny-list participates
///    iff not disabled.
pub fn resolve(node: &Node, mode: ParticipationMode, purpose: Purpose) -> bool {
    let mut enable = false;
    let mut disable = false;

    for annotation in node.annotations() {
        let spelling = annotation.spelling.trim();
        let rest = match spelling.strip_prefix(purpose.directive()) {
            Some(rest) => rest,
            None => continue,
        };
        match rest.trim() {
            "ENABLE" => enable = true,
            "DISABLE" => disable = true,
            unknown => log::warn!(
                "unknown {} directive `{}` on `{}`",
                purpose.describe(),
                unknown,
                node.spelling
            ),
        }
    }

    if enable && disable {
        log::warn!(
            "`{}` has both enable and disable {} directives, not participating",
            node.spelling,
            purpose.describe()
        );
        return false;
    }

    if enable && !purpose.allows(node.kind) {
        log::warn!(
            "{} `{}` cannot participate in {}",
            node.kind.describe(),
            node.spelling,
            purpose.describe()
        );
        return false;
    }

    if !node.is_public() {
        if enable {
            log::warn!(
                "non-public member `{}` is marked for {} and will be skipped",
                node.spelling,
                purpose.describe()
            );
        }
        return false;
    }

    match mode {
        ParticipationMode::AllowList => enable,
        ParticipationMode::DenyList => !disable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_ast::Visibility;

    fn member(
        enable: bool,
        disable: bool,
        kind_allowed: bool,
        is_public: bool,
    ) -> Node {
        // Field is allowed for both purposes, EnumConstant for neither.
        let kind = if kind_allowed {
            NodeKind::Field
        } else {
            NodeKind::EnumConstant
        };
        let visibility = if is_public {
            Visibility::Public
        } else {
            Visibility::Private
        };

        let mut node = Node::new(kind, "member").with_visibility(visibility);
        if enable {
            node = node.with_child(Node::new(NodeKind::Annotation, "%REFLECTION ENABLE"));
        }
        if disable {
            node = node.with_child(Node::new(NodeKind::Annotation, "%REFLECTION DISABLE"));
        }
        node
    }

    /// Exhaustive check of the decision table over all 32 combinations.
    #[test]
    fn decision_table_is_exact() {
        let modes = [ParticipationMode::AllowList, ParticipationMode::DenyList];
        for mode in modes {
            for bits in 0..16u8 {
                let enable = bits & 1 != 0;
                let disable = bits & 2 != 0;
                let kind_allowed = bits & 4 != 0;
                let is_public = bits & 8 != 0;

                let expected = if enable && disable {
                    false
                } else if enable && !kind_allowed {
                    false
                } else if !is_public {
                    false
                } else {
                    match mode {
                        ParticipationMode::AllowList => enable,
                        ParticipationMode::DenyList => !disable,
                    }
                };

                let node = member(enable, disable, kind_allowed, is_public);
                assert_eq!(
                    resolve(&node, mode, Purpose::Reflection),
                    expected,
                    "enable={} disable={} kind_allowed={} is_public={} mode={:?}",
                    enable,
                    disable,
                    kind_allowed,
                    is_public,
                    mode
                );
            }
        }
    }

    #[test]
    fn serialization_only_applies_to_fields() {
        let method = Node::new(NodeKind::Method, "Update")
            .with_child(Node::new(NodeKind::Annotation, "%SERIALIZATION ENABLE"));
        assert!(!resolve(
            &method,
            ParticipationMode::AllowList,
            Purpose::Serialization
        ));

        let field = Node::new(NodeKind::Field, "m_position")
            .with_child(Node::new(NodeKind::Annotation, "%SERIALIZATION ENABLE"));
        assert!(resolve(
            &field,
            ParticipationMode::AllowList,
            Purpose::Serialization
        ));
    }

    #[test]
    fn purposes_resolve_independently() {
        let field = Node::new(NodeKind::Field, "m_id")
            .with_child(Node::new(NodeKind::Annotation, "%SERIALIZATION ENABLE"));

        assert!(!resolve(&field, ParticipationMode::AllowList, Purpose::Reflection));
        assert!(resolve(&field, ParticipationMode::AllowList, Purpose::Serialization));
    }

    #[test]
    fn marker_tokens_parse_into_modes() {
        let class = Node::new(NodeKind::Class, "GameObject").with_child(Node::new(
            NodeKind::Annotation,
            "%REFL_SER_CLASS BlackList CustomSerialization",
        ));
        let marker = class_marker(&class).unwrap();
        assert_eq!(marker.participation, ParticipationMode::DenyList);
        assert_eq!(marker.serialization, SerializationMode::Custom);

        // bare marker falls back to the defaults
        let plain = Node::new(NodeKind::Class, "Transform")
            .with_child(Node::new(NodeKind::Annotation, "%REFL_SER_CLASS "));
        let marker = class_marker(&plain).unwrap();
        assert_eq!(marker.participation, ParticipationMode::AllowList);
        assert_eq!(marker.serialization, SerializationMode::Default);

        let unmarked = Node::new(NodeKind::Class, "Detail");
        assert!(class_marker(&unmarked).is_none());
    }
}
