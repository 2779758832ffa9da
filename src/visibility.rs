//! Conditional visibility
//!
//! `onWhen` blocks and flow stories render as `{cond ? <Block/> : null}`. Inside a
//! List the block already sits in an expression position, so the braces go.

use crate::ir::{NodeId, ViewTree};
use crate::scope::resolve_value;
use crate::state::MorphState;
use crate::validate::MorphError;
use crate::visitor::{Flow, MorphContext, MorphPass};

pub struct OffWhen;

impl MorphPass for OffWhen {
    fn enter(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<Flow, MorphError> {
        let node = cx.tree.node(id);
        if node.flags.is_fragment && node.children.is_empty() {
            return Ok(Flow::Continue);
        }

        let condition = match resolve_value(node, "onWhen") {
            Some(condition) => condition,
            None if is_story(cx.tree, cx.state, id) => {
                format!("flow.has(\"{}/{}\")", cx.state.path_to_story, node.test_id())
            }
            None => return Ok(Flow::Continue),
        };

        let braces = needs_braces(cx.tree, id);
        cx.tree.node_mut(id).flags.on_when = true;
        if braces {
            cx.state.render.push("{");
        }
        cx.state.render.push(format!("{} ? ", condition));
        Ok(Flow::Continue)
    }

    fn leave(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<(), MorphError> {
        if !cx.tree.node(id).flags.on_when {
            return Ok(());
        }
        cx.state.render.push(" : null");
        if needs_braces(cx.tree, id) {
            cx.state.render.push("}");
        }
        Ok(())
    }
}

/// The root is the `return (...)` expression itself; a List item is the body of
/// the `map` callback.
fn needs_braces(tree: &ViewTree, id: NodeId) -> bool {
    match tree.parent(id) {
        Some(parent) => !parent.is_list(),
        None => false,
    }
}

/// Stories are the view references directly under a `flow separate` root.
pub fn is_story(tree: &ViewTree, state: &MorphState, id: NodeId) -> bool {
    let node = tree.node(id);
    state.flow.as_deref() == Some("separate")
        && node.parent == Some(tree.root)
        && node.is_block()
        && !node.flags.is_basic
}
