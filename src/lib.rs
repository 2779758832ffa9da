//! # Views Morph (native)
//!
//! Compiles a parsed view tree into the source of one target module.
//!
//! ## Pipeline
//!
//! 1. **Validate**: structural checks that don't depend on the backend. A view
//!    that fails here leaves no output behind.
//! 2. **Walk**: one depth-first traversal. Each block runs the backend's pass
//!    list (`enter` in order, `leave` in reverse); passes append to the render
//!    buffer and record what the view uses.
//! 3. **Dependencies**: usage sets become a sorted import block through the
//!    injected `MorphHost`. Unknown views get a placeholder and a warning.
//! 4. **Codegen**: module boilerplate, optional reprint, fingerprint.
//!
//! ## Invariants
//!
//! - Same tree and options, same bytes out.
//! - The render buffer is only appended to, in document order.
//! - Nothing here touches the filesystem; the host owns every lookup.

#[cfg(feature = "napi")]
use napi_derive::napi;

use rayon::prelude::*;
use serde::Serialize;

mod backend;
mod block_name;
mod codegen;
mod dependencies;
mod harness;
mod host;
mod ir;
mod options;
mod passes;
mod scope;
mod state;
mod text;
mod validate;
mod visibility;
mod visitor;


pub use backend::{Backend, BackendProfile};
pub use dependencies::Dependencies;
pub use host::{DefaultHost, FontDescriptor, ImportRequest, ImportResolution, MorphHost, Placeholder};
pub use ir::{
    AnimationKind, Literal, NodeKind, PropertyNode, RawNode, Tag, ValueNode, ViewNode, ViewTree,
};
pub use options::MorphOptions;
pub use validate::*;

use state::MorphState;
use visitor::{walk_view, MorphContext};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub code: String,
    pub warnings: Vec<String>,
    pub fingerprint: String,
    /// npm packages the generated module imports from.
    pub dependencies: Vec<String>,
}

/// Compiles one view. The input tree is never modified.
pub fn compile(
    tree: &ViewTree,
    options: &MorphOptions,
    host: &dyn MorphHost,
) -> Result<CompileResult, MorphError> {
    log::debug!(
        "morphing {} ({}) as {}",
        options.name,
        options.file.as_deref().unwrap_or("<inline>"),
        options.backend.as_str()
    );

    validate::validate_tree(tree)?;

    let mut tree = tree.clone();
    let mut state = MorphState::new(options);
    {
        let mut cx = MorphContext {
            tree: &mut tree,
            state: &mut state,
            options,
            profile: options.backend.profile(),
        };
        walk_view(&mut cx)?;
    }

    let deps = dependencies::get_dependencies(&state, options, host);
    let code = codegen::assemble(&state, &deps);
    let code = if options.pretty {
        codegen::prettify(&code)
    } else {
        code
    };

    log::debug!(
        "morphed {} ({} fragments, {} imports, {} warnings)",
        options.name,
        state.render.len(),
        deps.lines.len(),
        deps.warnings.len()
    );

    Ok(CompileResult {
        fingerprint: codegen::fingerprint(&code),
        code,
        warnings: deps.warnings,
        dependencies: deps.packages.into_iter().collect(),
    })
}

/// Compiles many views in parallel. Each view gets its own name in the options;
/// results come back in input order.
pub fn compile_all(
    views: &[(String, ViewTree)],
    options: &MorphOptions,
    host: &dyn MorphHost,
) -> Vec<(String, Result<CompileResult, MorphError>)> {
    views
        .par_iter()
        .map(|(name, tree)| {
            let options = MorphOptions {
                name: name.clone(),
                ..options.clone()
            };
            (name.clone(), compile(tree, &options, host))
        })
        .collect()
}

/// JSON entry point: a `RawNode` tree and `MorphOptions`, both camelCase.
pub fn compile_json(tree_json: &str, options_json: &str) -> Result<CompileResult, MorphError> {
    let tree = ViewTree::from_json(tree_json)?;
    let options = MorphOptions::from_json(options_json)?;
    compile(&tree, &options, &DefaultHost)
}

#[cfg(feature = "napi")]
#[napi]
pub fn morph_native(tree_json: String, options_json: String) -> napi::Result<serde_json::Value> {
    let result = compile_json(&tree_json, &options_json).map_err(|e| {
        napi::Error::from_reason(format!("[{}] {} ({})", e.code(), e, e.guarantee()))
    })?;
    serde_json::to_value(result).map_err(|e| napi::Error::from_reason(e.to_string()))
}
