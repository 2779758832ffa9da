use serde::Serialize;
use thiserror::Error;

use crate::ir::{NodeId, NodeKind, ViewTree};
use crate::scope::check_expression;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_STRUCTURAL: &str = "M-ERR-STRUCT-001";
pub const ERR_UNKNOWN_BLOCK: &str = "M-ERR-BLOCK-001";
pub const ERR_INVALID_INPUT: &str = "M-ERR-INPUT-001";

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_STRUCTURAL => "A view either morphs completely or produces no output at all.",
        ERR_UNKNOWN_BLOCK => "Every block resolves to a concrete component of the target backend.",
        ERR_INVALID_INPUT => "Only well-formed view trees and options reach the morpher.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MORPH ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MorphError {
    #[error("{path}: {reason}")]
    Structural { path: String, reason: String },

    #[error("{path}: unknown block <{name}>")]
    UnknownBlockKind { path: String, name: String },

    #[error("{reason}")]
    InvalidInput { reason: String },
}

impl MorphError {
    pub fn structural(tree: &ViewTree, id: NodeId, reason: impl Into<String>) -> Self {
        MorphError::Structural {
            path: tree.path(id),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            MorphError::Structural { .. } => ERR_STRUCTURAL,
            MorphError::UnknownBlockKind { .. } => ERR_UNKNOWN_BLOCK,
            MorphError::InvalidInput { .. } => ERR_INVALID_INPUT,
        }
    }

    pub fn guarantee(&self) -> &'static str {
        get_guarantee(self.code())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STRUCTURAL VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Checks that don't depend on the backend. Runs before the walk so a broken view
/// never leaves anything in the render buffer.
pub fn validate_tree(tree: &ViewTree) -> Result<(), MorphError> {
    for node in tree.iter() {
        match node.kind {
            NodeKind::Block => validate_block(tree, node.id)?,
            NodeKind::Text => {
                if node.value.is_none() {
                    return Err(MorphError::structural(tree, node.id, "text node without content"));
                }
            }
            NodeKind::Property | NodeKind::Value => {
                return Err(MorphError::structural(
                    tree,
                    node.id,
                    format!("detached {:?} node outside of a block", node.kind).to_lowercase(),
                ));
            }
        }

        if let Some(expr) = node.value.as_ref().and_then(|v| v.expression()) {
            check_expression(tree, node.id, expr)?;
        }
    }
    Ok(())
}

fn validate_block(tree: &ViewTree, id: NodeId) -> Result<(), MorphError> {
    let node = tree.node(id);

    for prop in &node.properties {
        if let Some(scope) = &prop.in_scope {
            if !node.scopes.contains(scope) {
                return Err(MorphError::structural(
                    tree,
                    id,
                    format!("'{}' is scoped to undeclared scope '{}'", prop.key, scope),
                ));
            }

            // Style overrides without a base collapse to null, which both style
            // targets treat as unset.
            let has_base = node
                .properties
                .iter()
                .any(|p| p.raw_key() == prop.raw_key() && !p.is_scoped());
            if !has_base && !prop.is_style() && !is_content_key(tree, id, prop.raw_key()) {
                return Err(MorphError::structural(
                    tree,
                    id,
                    format!(
                        "'{}' is overridden in scope '{}' but has no base value",
                        prop.key, scope
                    ),
                ));
            }
        }

        if let Some(expr) = prop.value.expression() {
            check_expression(tree, id, expr)?;
        }
    }

    if (node.is_list() || node.name == "Table") && !node.has_prop("from") {
        return Err(MorphError::structural(
            tree,
            id,
            format!("{} needs a 'from' property", node.name),
        ));
    }

    if node.is_list() {
        let blocks = node
            .children
            .iter()
            .filter(|c| tree.node(**c).is_block())
            .count();
        if blocks != 1 || node.children.len() != 1 {
            return Err(MorphError::structural(
                tree,
                id,
                format!(
                    "List expects one item block, found {} block(s) in {} child node(s)",
                    blocks,
                    node.children.len()
                ),
            ));
        }
    }

    Ok(())
}

/// Text content may come from a text child instead of a `text` property.
fn is_content_key(tree: &ViewTree, id: NodeId, key: &str) -> bool {
    let node = tree.node(id);
    key == "text"
        && node.is_text_block()
        && node
            .children
            .iter()
            .any(|c| tree.node(*c).kind == NodeKind::Text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{PropertyNode, RawNode, ValueNode};

    #[test]
    fn test_undeclared_scope() {
        let mut raw = RawNode::block("Text")
            .prop(PropertyNode::new("text", ValueNode::string("a")))
            .prop(PropertyNode::scoped("text", "props.isBig", ValueNode::string("b")));
        raw.scopes.clear();
        let err = validate_tree(&ViewTree::from_raw(raw)).unwrap_err();
        assert_eq!(err.code(), ERR_STRUCTURAL);
        assert!(err.to_string().contains("undeclared scope 'props.isBig'"));
    }

    #[test]
    fn test_scoped_override_without_base() {
        let raw = RawNode::block("Vertical")
            .named("Box")
            .prop(PropertyNode::scoped("onClick", "props.on", ValueNode::slot("props.go")));
        let err = validate_tree(&ViewTree::from_raw(raw)).unwrap_err();
        assert_eq!(
            err,
            MorphError::Structural {
                path: "Box".to_string(),
                reason: "'onClick' is overridden in scope 'props.on' but has no base value"
                    .to_string()
            }
        );
    }

    #[test]
    fn test_scoped_style_without_base_is_allowed() {
        let raw = RawNode::block("Vertical").prop(
            PropertyNode::scoped("color", "props.on", ValueNode::string("red"))
                .with_tag(crate::ir::Tag::Style),
        );
        assert!(validate_tree(&ViewTree::from_raw(raw)).is_ok());
    }

    #[test]
    fn test_list_needs_from() {
        let raw = RawNode::block("View")
            .child(RawNode::block("List").named("Items").child(RawNode::block("Row")));
        let err = validate_tree(&ViewTree::from_raw(raw)).unwrap_err();
        assert!(err.to_string().starts_with("View/Items:"));
        assert!(err.to_string().contains("'from'"));
    }

    #[test]
    fn test_list_item_must_be_a_block() {
        let raw = RawNode::block("List")
            .prop(PropertyNode::new("from", ValueNode::slot("props.items")))
            .child(RawNode::text(ValueNode::string("row")));
        let err = validate_tree(&ViewTree::from_raw(raw)).unwrap_err();
        assert_eq!(err.code(), ERR_STRUCTURAL);
        assert!(err.to_string().contains("List expects one item block, found 0 block(s)"));
    }

    #[test]
    fn test_detached_property_node() {
        let mut child = RawNode::block("color");
        child.kind = NodeKind::Property;
        let raw = RawNode::block("View").child(child);
        let err = validate_tree(&ViewTree::from_raw(raw)).unwrap_err();
        assert!(err.to_string().contains("detached property node"));
    }

    #[test]
    fn test_error_guarantee() {
        let err = MorphError::UnknownBlockKind {
            path: "View".to_string(),
            name: "blink".to_string(),
        };
        assert_eq!(err.code(), ERR_UNKNOWN_BLOCK);
        assert!(err.guarantee().contains("concrete component"));
    }
}
