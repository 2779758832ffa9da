//! Harness targets
//!
//! Tests, E2E and Data views don't render anything. They collect named entries
//! that codegen exports as one object.

use crate::block_name::resolve_block_name;
use crate::ir::{quote, NodeId, ValueNode, ViewTree};
use crate::scope::resolve_value;
use crate::validate::MorphError;
use crate::visitor::{Flow, MorphContext, MorphPass};

/// Harness modules are evaluated on their own, so a value must stand at module
/// scope: literals and code, never slots or scoped chains bound to props.
fn export_value(tree: &ViewTree, id: NodeId, key: &str) -> Result<Option<String>, MorphError> {
    let node = tree.node(id);
    if let Some(prop) = node
        .properties
        .iter()
        .find(|p| p.raw_key() == key && (p.is_scoped() || matches!(p.value, ValueNode::Slot(_))))
    {
        let reason = if prop.is_scoped() {
            format!("'{}' can't be scoped in an exported object", key)
        } else {
            format!(
                "'{}' is bound to `{}`, which isn't defined in an exported object",
                key,
                prop.value.raw()
            )
        };
        return Err(MorphError::structural(tree, id, reason));
    }
    Ok(resolve_value(node, key))
}

fn property_entries(tree: &ViewTree, id: NodeId) -> Result<Vec<(String, String)>, MorphError> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for prop in &tree.node(id).properties {
        let key = prop.raw_key();
        if entries.iter().any(|(k, _)| k == key) {
            continue;
        }
        if let Some(value) = export_value(tree, id, key)? {
            entries.push((key.to_string(), value));
        }
    }
    Ok(entries)
}

/// `{ "key": value, ... }` for a block's properties. Nested blocks become nested
/// objects under their name when `nested` is set.
pub fn object_of(tree: &ViewTree, id: NodeId, nested: bool) -> Result<String, MorphError> {
    let mut entries: Vec<String> = property_entries(tree, id)?
        .into_iter()
        .map(|(key, value)| format!("{}: {}", quote(&key), value))
        .collect();

    if nested {
        for child in &tree.node(id).children {
            let child = tree.node(*child);
            if child.is_block() {
                entries.push(format!(
                    "{}: {}",
                    quote(child.test_id()),
                    object_of(tree, child.id, true)?
                ));
            }
        }
    }

    Ok(if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", entries.join(", "))
    })
}

fn push_entry(cx: &mut MorphContext<'_>, key: String, value: String) {
    if !cx.state.entries.iter().any(|(k, _)| *k == key) {
        cx.state.entries.push((key, value));
    }
}

/// Every top-level block is a named scenario of props. A root without children is
/// a single scenario.
pub struct TestCase;

impl MorphPass for TestCase {
    fn enter(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<Flow, MorphError> {
        let node = cx.tree.node(id);
        if id == cx.tree.root && !node.children.is_empty() {
            return Ok(Flow::Continue);
        }

        let name = node.test_id().to_string();
        let props = object_of(cx.tree, id, false)?;
        push_entry(cx, name, props);
        Ok(Flow::Skip)
    }
}

/// Page object: one `Selector` per block, keyed by its name.
pub struct PageObjectEntry;

impl MorphPass for PageObjectEntry {
    fn enter(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<Flow, MorphError> {
        if cx.tree.node(id).flags.is_fragment {
            return Ok(Flow::Continue);
        }

        let name = resolve_block_name(cx, id)?;
        let test_id = if cx.tree.node(id).parent.is_some() {
            format!("{}.{}", cx.state.name, name)
        } else {
            name.clone()
        };
        let selector = format!(
            "Selector({})",
            quote(&format!("[{}=\"{}\"]", cx.state.test_id_key, test_id))
        );
        push_entry(cx, name, selector);
        Ok(Flow::Continue)
    }
}

/// Data views export the root's properties with nested blocks as sub-objects.
pub struct DataEntry;

impl MorphPass for DataEntry {
    fn enter(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<Flow, MorphError> {
        let mut entries = property_entries(cx.tree, id)?;
        for child in &cx.tree.node(id).children {
            let child = cx.tree.node(*child);
            if child.is_block() {
                entries.push((child.test_id().to_string(), object_of(cx.tree, child.id, true)?));
            }
        }

        for (key, value) in entries {
            push_entry(cx, key, value);
        }
        Ok(Flow::Skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::ir::{PropertyNode, RawNode, ValueNode};
    use crate::options::MorphOptions;
    use crate::state::MorphState;
    use crate::visitor::walk_view;

    fn entries(backend: Backend, raw: RawNode) -> Vec<(String, String)> {
        try_entries(backend, raw).unwrap()
    }

    fn try_entries(backend: Backend, raw: RawNode) -> Result<Vec<(String, String)>, MorphError> {
        let mut tree = ViewTree::from_raw(raw);
        let options = MorphOptions::new(backend, "Login");
        let mut state = MorphState::new(&options);
        {
            let mut cx = MorphContext {
                tree: &mut tree,
                state: &mut state,
                options: &options,
                profile: backend.profile(),
            };
            walk_view(&mut cx)?;
        }
        Ok(state.entries)
    }

    #[test]
    fn test_cases_are_top_level_blocks() {
        let raw = RawNode::block("Tests")
            .child(
                RawNode::block("Main")
                    .prop(PropertyNode::new("title", ValueNode::string("Hi")))
                    .prop(PropertyNode::new("count", ValueNode::number(3.0))),
            )
            .child(RawNode::block("Empty"));
        assert_eq!(
            entries(Backend::Tests, raw),
            vec![
                ("Main".to_string(), r#"{ "title": "Hi", "count": 3 }"#.to_string()),
                ("Empty".to_string(), "{}".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_object_selectors() {
        let raw = RawNode::block("Vertical")
            .named("Form")
            .child(RawNode::block("CaptureEmail").named("Email"))
            .child(RawNode::block("Vertical").named("Submit"));
        let out = entries(Backend::E2e, raw);
        assert_eq!(out[0], ("Form".to_string(), r#"Selector("[data-testid=\"Form\"]")"#.to_string()));
        assert_eq!(
            out[1],
            ("Email".to_string(), r#"Selector("[data-testid=\"Login.Email\"]")"#.to_string())
        );
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_data_object() {
        let raw = RawNode::block("Data")
            .prop(PropertyNode::new("name", ValueNode::string("Ada")))
            .child(RawNode::block("Address").prop(PropertyNode::new("city", ValueNode::string("London"))));
        assert_eq!(
            entries(Backend::Data, raw),
            vec![
                ("name".to_string(), r#""Ada""#.to_string()),
                ("Address".to_string(), r#"{ "city": "London" }"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_exported_values_must_stand_alone() {
        let raw = RawNode::block("Tests").child(
            RawNode::block("Main").prop(PropertyNode::new("items", ValueNode::slot("props.items"))),
        );
        let err = try_entries(Backend::Tests, raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Tests/Main: 'items' is bound to `props.items`, which isn't defined in an exported object"
        );

        let raw = RawNode::block("Data")
            .prop(PropertyNode::new("name", ValueNode::string("Ada")))
            .prop(PropertyNode::scoped("name", "props.formal", ValueNode::string("Ms Lovelace")));
        assert!(try_entries(Backend::Data, raw).is_err());

        let raw = RawNode::block("Data").prop(PropertyNode::new(
            "onSave",
            ValueNode::Code("() => {}".to_string()),
        ));
        assert_eq!(
            entries(Backend::Data, raw),
            vec![("onSave".to_string(), "() => {}".to_string())]
        );
    }
}
