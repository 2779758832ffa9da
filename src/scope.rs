//! Scoped values
//!
//! A property may be declared once unscoped and re-declared under any number of
//! scopes (`when props.isSelected`). The scopes become a ternary chain in which
//! the last declared scope is tested first and the unscoped value is the fallback.

use oxc_allocator::Allocator;
use oxc_ast::ast::{BindingIdentifier, Expression, IdentifierReference};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::collections::HashSet;

use crate::ir::{NodeId, PropertyNode, Tag, ViewNode, ViewTree};
use crate::validate::MorphError;

/// Loop variables bound by a List's `map` callback.
const LOOP_LOCALS: [&str; 2] = ["item", "index"];

/// The property's value as JS. `code`-tagged properties are emitted verbatim.
pub fn property_js(prop: &PropertyNode) -> String {
    if prop.tags.contains(&Tag::Code) {
        prop.value.raw()
    } else {
        prop.value.to_js()
    }
}

pub fn has_scopes(node: &ViewNode, key: &str) -> bool {
    node.has_scoped(key)
}

/// Builds `S2 ? C : S1 ? B : A` for a key declared as `A`, then `(S1) B`, then `(S2) C`.
/// Without an unscoped declaration the chain ends in `null`.
pub fn resolve_scoped_value(node: &ViewNode, key: &str) -> String {
    let base = node
        .properties
        .iter()
        .find(|p| p.raw_key() == key && !p.is_scoped())
        .map(property_js)
        .unwrap_or_else(|| "null".to_string());
    scoped_chain(node, key, base)
}

/// Folds the scoped declarations of `key` over `fallback`.
pub fn scoped_chain(node: &ViewNode, key: &str, fallback: String) -> String {
    let mut conditional = fallback;
    for prop in node.properties.iter().filter(|p| p.raw_key() == key) {
        if let Some(scope) = &prop.in_scope {
            conditional = format!("{} ? {} : {}", scope, property_js(prop), conditional);
        }
    }

    conditional
}

/// Value of `key` on `node`, folding in scoped overrides when there are any.
pub fn resolve_value(node: &ViewNode, key: &str) -> Option<String> {
    if has_scopes(node, key) {
        Some(resolve_scoped_value(node, key))
    } else {
        node.prop(key).map(property_js)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSION CHECKING
// ═══════════════════════════════════════════════════════════════════════════════

/// Dynamic values must parse as JS expressions, and loop variables may only be
/// referenced inside a List.
pub fn check_expression(tree: &ViewTree, id: NodeId, code: &str) -> Result<(), MorphError> {
    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_typescript(false)
        .with_module(true)
        .with_jsx(true);

    let expr = Parser::new(&allocator, code, source_type)
        .parse_expression()
        .map_err(|errors| {
            let detail = errors
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "syntax error".to_string());
            MorphError::structural(tree, id, format!("invalid expression `{}`: {}", code, detail))
        })?;

    let free = free_identifiers(&expr);
    if !tree.in_list(id) {
        if let Some(local) = LOOP_LOCALS.iter().find(|l| free.contains(**l)) {
            return Err(MorphError::structural(
                tree,
                id,
                format!("`{}` is only available inside a List", local),
            ));
        }
    }

    Ok(())
}

fn free_identifiers(expr: &Expression) -> HashSet<String> {
    let mut collector = ReferenceCollector {
        references: vec![],
        bindings: HashSet::new(),
    };
    collector.visit_expression(expr);

    collector
        .references
        .into_iter()
        .filter(|r| !collector.bindings.contains(r))
        .collect()
}

struct ReferenceCollector {
    references: Vec<String>,
    bindings: HashSet<String>,
}

impl<'a> Visit<'a> for ReferenceCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.references.push(ident.name.to_string());
    }

    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.bindings.insert(ident.name.to_string());
    }
}
