use crate::backend::BackendProfile;
use crate::ir::{NodeId, NodeKind, ViewTree};
use crate::options::MorphOptions;
use crate::state::MorphState;
use crate::validate::MorphError;

/// Result of a pass's `enter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The node is fully rendered. Later passes and the children are skipped.
    Skip,
}

/// Everything a pass may read or write while visiting one node.
pub struct MorphContext<'a> {
    pub tree: &'a mut ViewTree,
    pub state: &'a mut MorphState,
    pub options: &'a MorphOptions,
    pub profile: &'static BackendProfile,
}

/// One stage of a backend pipeline.
///
/// Rules:
/// 1. `enter` hooks of a pipeline run in declaration order, `leave` hooks in reverse.
/// 2. A pass returning `Flow::Skip` stops the remaining `enter` hooks and the
///    children. Only the passes that already entered get their `leave`.
/// 3. Text nodes go to `visit_text` of every pass, in order.
/// 4. No manual recursion outside of the `walk_*` functions.
pub trait MorphPass {
    fn enter(&self, _cx: &mut MorphContext<'_>, _id: NodeId) -> Result<Flow, MorphError> {
        Ok(Flow::Continue)
    }

    fn leave(&self, _cx: &mut MorphContext<'_>, _id: NodeId) -> Result<(), MorphError> {
        Ok(())
    }

    fn visit_text(&self, _cx: &mut MorphContext<'_>, _id: NodeId) -> Result<(), MorphError> {
        // Leaf node, nothing to emit by default
        Ok(())
    }
}

pub fn walk_view(cx: &mut MorphContext<'_>) -> Result<(), MorphError> {
    let root = cx.tree.root;
    walk_node(cx, root)
}

pub fn walk_node(cx: &mut MorphContext<'_>, id: NodeId) -> Result<(), MorphError> {
    match cx.tree.node(id).kind {
        NodeKind::Block => walk_block(cx, id),
        NodeKind::Text => walk_text(cx, id),
        NodeKind::Property | NodeKind::Value => Err(MorphError::structural(
            cx.tree,
            id,
            "only blocks and text can be rendered",
        )),
    }
}

pub fn walk_block(cx: &mut MorphContext<'_>, id: NodeId) -> Result<(), MorphError> {
    let passes = cx.profile.passes;

    let mut entered = 0;
    let mut skipped = false;
    for pass in passes {
        match pass.enter(cx, id)? {
            Flow::Continue => entered += 1,
            Flow::Skip => {
                skipped = true;
                break;
            }
        }
    }

    if !skipped {
        walk_children(cx, id)?;
    }

    for pass in passes[..entered].iter().rev() {
        pass.leave(cx, id)?;
    }
    Ok(())
}

pub fn walk_children(cx: &mut MorphContext<'_>, id: NodeId) -> Result<(), MorphError> {
    let children = cx.tree.node(id).children.clone();
    for child in children {
        walk_node(cx, child)?;
    }
    Ok(())
}

pub fn walk_text(cx: &mut MorphContext<'_>, id: NodeId) -> Result<(), MorphError> {
    for pass in cx.profile.passes {
        pass.visit_text(cx, id)?;
    }
    Ok(())
}
