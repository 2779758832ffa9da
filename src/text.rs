//! Text content
//!
//! Resolution order for a Text block's content: scoped text, dynamic binding,
//! localized variants, formatted literal, plain literal.

use std::collections::BTreeMap;

use crate::ir::{quote, NodeId, ValueNode};
use crate::scope::scoped_chain;
use crate::state::FormatKind;
use crate::validate::MorphError;
use crate::visitor::MorphContext;

pub fn resolve_text(
    cx: &mut MorphContext<'_>,
    block: NodeId,
    value: &ValueNode,
) -> Result<String, MorphError> {
    let node = cx.tree.node(block);

    if node.has_scoped("text") {
        let fallback = match node.properties.iter().find(|p| p.raw_key() == "text" && !p.is_scoped()) {
            Some(base) => crate::scope::property_js(base),
            None => value.to_js(),
        };
        return Ok(format!("{{{}}}", scoped_chain(node, "text", fallback)));
    }

    if let Some(expr) = value.expression() {
        return Ok(format!("{{{}}}", expr));
    }

    let text = value.raw();

    let variants: BTreeMap<String, String> = cx
        .options
        .locale_list
        .iter()
        .filter(|lang| **lang != cx.state.local)
        .filter_map(|lang| node.prop(lang).map(|p| (lang.clone(), p.value.raw())))
        .collect();

    if !variants.is_empty() {
        let mut texts = variants;
        texts.insert(cx.state.local.clone(), text);
        let base = node.test_id().to_string();
        let key = cx.state.add_local(&base, texts);
        return Ok(format!("{{locals[local.state.lang][{}]}}", quote(&key)));
    }

    if let Some(format) = node.prop("format").map(|p| p.value.raw()) {
        let kind = FormatKind::parse(&format).ok_or_else(|| {
            MorphError::structural(cx.tree, block, format!("unknown text format '{}'", format))
        })?;
        let parsed = parse_format_value(&text, kind).ok_or_else(|| {
            MorphError::structural(
                cx.tree,
                block,
                format!("'{}' can't be formatted as {}", text, kind.as_str()),
            )
        })?;
        cx.state.formats.insert(kind);
        cx.state.use_block("ViewsFormatters", false);
        return Ok(format!(
            "{{ViewsFormatters.{}[local.state.lang].format({})}}",
            kind.as_str(),
            parsed
        ));
    }

    Ok(jsx_text(&text))
}

/// Turns a designer literal into the argument of the formatter.
pub fn parse_format_value(value: &str, kind: FormatKind) -> Option<String> {
    match kind {
        FormatKind::Percent => value.trim().parse::<f64>().ok().map(|v| (v / 100.0).to_string()),
        FormatKind::Date => Some(format!("Date.parse({})", single_quote(value))),
        FormatKind::Time => {
            // Fixed reference date; only the time of day is formatted.
            let mut out = String::from("Date.UTC(2018, 14, 3");
            for part in value.split(':') {
                let n = part.trim().parse::<i64>().ok()?;
                out.push_str(&format!(", {}", n));
            }
            out.push(')');
            Some(out)
        }
    }
}

fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// JSX text can hold anything but braces and angle brackets.
pub fn jsx_text(text: &str) -> String {
    if text.contains(['{', '}', '<', '>']) {
        format!("{{{}}}", quote(text))
    } else {
        text.to_string()
    }
}
