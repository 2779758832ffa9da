//! Codegen module for the view morpher
//!
//! Wraps the render buffer and the import block in the module boilerplate of the
//! target, then optionally reprints it through `oxc_codegen`.

use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::SourceType;
use sha2::{Digest, Sha256};

use crate::backend::Boilerplate;
use crate::dependencies::Dependencies;
use crate::ir::quote;
use crate::state::MorphState;

pub fn assemble(state: &MorphState, deps: &Dependencies) -> String {
    let mut out = String::new();
    for line in &deps.lines {
        out.push_str(line);
        out.push('\n');
    }
    if !deps.lines.is_empty() {
        out.push('\n');
    }

    match state.backend.profile().boilerplate {
        Boilerplate::Component => out.push_str(&component(state)),
        Boilerplate::ExportObject => out.push_str(&export_object(state)),
    }
    out
}

fn component(state: &MorphState) -> String {
    let mut out = format!("let {} = (props) => {{\n", state.name);

    if state.uses_flow {
        out.push_str("  let flow = ViewsUseFlow()\n");
    }
    if state.track {
        out.push_str("  let track = React.useContext(TrackContext)\n");
    }

    let render = state.render.concat();
    let body = if render.is_empty() {
        "null".to_string()
    } else if state.has_locals() {
        format!(
            "<Subscribe to={{[LocalContainer]}}>{{local => (\n{}\n)}}</Subscribe>",
            render
        )
    } else {
        render
    };

    out.push_str(&format!("  return (\n{}\n  )\n}}\n", body));
    out.push_str(&format!("export default {}\n", state.name));
    out
}

fn export_object(state: &MorphState) -> String {
    let mut out = String::from("export default {\n");
    for (key, value) in &state.entries {
        out.push_str(&format!("  {}: {},\n", quote(key), value));
    }
    out.push_str("}\n");
    out
}

/// Reprints the module. Output that doesn't parse is returned untouched.
pub fn prettify(code: &str) -> String {
    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_typescript(false)
        .with_module(true)
        .with_jsx(true);

    let ret = Parser::new(&allocator, code, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let detail = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser panicked".to_string());
        log::warn!("skipping pretty print, generated code doesn't parse: {}", detail);
        return code.to_string();
    }

    Codegen::new().build(&ret.program).code
}

pub fn fingerprint(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::options::MorphOptions;

    fn state(backend: Backend) -> MorphState {
        MorphState::new(&MorphOptions::new(backend, "Login"))
    }

    #[test]
    fn test_component_boilerplate() {
        let mut state = state(Backend::ReactDom);
        state.render.push("<div>");
        state.render.push("</div>");
        state.track = true;
        let deps = Dependencies {
            lines: vec!["import React from 'react'".to_string()],
            ..Default::default()
        };
        assert_eq!(
            assemble(&state, &deps),
            "import React from 'react'\n\n\
             let Login = (props) => {\n  \
             let track = React.useContext(TrackContext)\n  \
             return (\n<div></div>\n  )\n}\n\
             export default Login\n"
        );
    }

    #[test]
    fn test_locals_wrap_render() {
        let mut state = state(Backend::ReactDom);
        state.render.push("<span />");
        state.locals.insert("Title".to_string(), Default::default());
        let out = assemble(&state, &Dependencies::default());
        assert!(out.contains("<Subscribe to={[LocalContainer]}>{local => (\n<span />\n)}</Subscribe>"));
    }

    #[test]
    fn test_export_object() {
        let mut state = state(Backend::E2e);
        state
            .entries
            .push(("Email".to_string(), "Selector('[data-testid=\"Login.Email\"]')".to_string()));
        let out = assemble(&state, &Dependencies::default());
        assert_eq!(
            out,
            "export default {\n  \"Email\": Selector('[data-testid=\"Login.Email\"]'),\n}\n"
        );
    }

    #[test]
    fn test_prettify_keeps_unparsable_code() {
        let broken = "let X = (props) => { return (<div> }";
        assert_eq!(prettify(broken), broken);
        let pretty = prettify("let   X = (props) => { return (<div  />) }");
        assert!(pretty.contains("let X"));
        assert!(!pretty.contains("let   X"));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint("a"), fingerprint("a"));
        assert_ne!(fingerprint("a"), fingerprint("b"));
        assert_eq!(fingerprint("").len(), 64);
    }
}
