//! JSX pipeline
//!
//! The handler chain shared by the DOM and native targets. `BlockName` opens the
//! tag, these passes fill in its attributes and `Children` closes it. Everything
//! that differs between the two targets comes from the `BackendProfile`.

use crate::block_name::{final_name, image_asset, is_remote_source};
use crate::host::FontDescriptor;
use crate::ir::{quote, Literal, NodeId, PropertyNode, Tag, ValueNode, ViewNode, ViewTree};
use crate::scope::{property_js, resolve_value};
use crate::text::resolve_text;
use crate::validate::MorphError;
use crate::visitor::{Flow, MorphContext, MorphPass};

// ═══════════════════════════════════════════════════════════════════════════════
// CAPTURE
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Capture;

impl MorphPass for Capture {
    fn enter(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<Flow, MorphError> {
        let node = cx.tree.node(id);
        if !node.flags.is_capture || node.name == "CaptureTextArea" {
            return Ok(Flow::Continue);
        }

        let attributes = match node.prop("type").map(|p| &p.value) {
            Some(ValueNode::Slot(expr)) | Some(ValueNode::Code(expr)) => {
                dynamic_capture_type(cx.profile.is_native(), expr)
            }
            Some(ValueNode::Literal(kind)) => literal_capture_type(cx, id, &kind.as_text())?,
            None => {
                let kind = capture_kind_from_name(&node.name);
                literal_capture_type(cx, id, &kind)?
            }
        };

        cx.state.render.push(attributes);
        Ok(Flow::Continue)
    }
}

/// `CaptureEmail` -> `email`, plain `Capture` -> `text`.
fn capture_kind_from_name(name: &str) -> String {
    match name.strip_prefix("Capture") {
        Some("") | None => "text".to_string(),
        Some(kind) => kind.to_lowercase(),
    }
}

fn literal_capture_type(
    cx: &MorphContext<'_>,
    id: NodeId,
    kind: &str,
) -> Result<String, MorphError> {
    if cx.profile.is_native() {
        // Every capture is a TextInput; kinds without keyboard hints get none.
        return Ok(match cx.profile.capture_type(kind) {
            Some(mapped) => mapped.to_string(),
            None => {
                log::debug!("{}: no keyboard hints for capture type '{}'", cx.tree.path(id), kind);
                String::new()
            }
        });
    }

    let mapped = cx.profile.capture_type(kind).ok_or_else(|| {
        MorphError::structural(cx.tree, id, format!("unknown capture type '{}'", kind))
    })?;

    // iOS Safari only shows the numeric keypad with these hints
    let mut out = format!(" type={}", quote(mapped));
    if kind == "number" || kind == "phone" {
        out.push_str(" inputMode=\"numeric\" pattern=\"[0-9]*\"");
    }
    Ok(out)
}

fn dynamic_capture_type(native: bool, expr: &str) -> String {
    let numeric = format!("{e} === 'number' || {e} === 'phone'", e = expr);
    if native {
        format!(
            " keyboardType={{{} ? \"numeric\" : \"default\"}} secureTextEntry={{{} === 'secure'}}",
            numeric, expr
        )
    } else {
        format!(
            " type={{{}}} inputMode={{{} ? \"numeric\" : undefined}} pattern={{{} ? \"[0-9]*\" : undefined}}",
            expr, numeric, numeric
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES AND STYLES
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Properties;

impl MorphPass for Properties {
    fn enter(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<Flow, MorphError> {
        if cx.tree.node(id).flags.is_fragment {
            return Ok(Flow::Continue);
        }

        let mut out = String::new();
        let (keys, style_keys) = {
            let node = cx.tree.node(id);
            if node.flags.is_basic {
                partition_keys(node)
            } else {
                // Other views receive everything as props, styles included.
                (unique_keys(node.properties.iter()), vec![])
            }
        };

        for key in keys {
            if let Some(attribute) = attribute(cx, id, &key)? {
                out.push_str(&attribute);
            }
        }

        register_font(cx, id);
        out.push_str(&styles(cx, id, &style_keys)?);

        let node = cx.tree.node(id);
        if cx.tree.parent(id).map_or(false, |p| p.is_list()) && !node.has_prop("key") {
            out.push_str(" key={index}");
        }

        cx.state.render.push(out);
        Ok(Flow::Continue)
    }
}

/// Splits property keys into attribute keys and `(stem, key)` style keys, both in
/// first-declaration order.
fn partition_keys(node: &ViewNode) -> (Vec<String>, Vec<(Stem, String)>) {
    let keys = unique_keys(node.properties.iter().filter(|p| !p.is_style()));
    let mut style_keys: Vec<(Stem, String)> = Vec::new();
    for prop in node.properties.iter().filter(|p| p.is_style()) {
        let entry = (Stem::of(prop), prop.raw_key().to_string());
        if !style_keys.contains(&entry) {
            style_keys.push(entry);
        }
    }
    (keys, style_keys)
}

fn unique_keys<'a>(props: impl Iterator<Item = &'a PropertyNode>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for prop in props {
        if !keys.iter().any(|k| k == prop.raw_key()) {
            keys.push(prop.raw_key().to_string());
        }
    }
    keys
}

/// Keys the engine turns into structure rather than attributes.
fn is_consumed(cx: &MorphContext<'_>, node: &ViewNode, key: &str) -> bool {
    match key {
        "onWhen" => true,
        "flow" => node.id == cx.tree.root,
        "from" => node.is_list() || node.name == "Table",
        "text" | "format" => node.is_text_block(),
        "type" => node.flags.is_capture,
        _ => node.is_text_block() && key != cx.state.local && cx.options.is_locale(key),
    }
}

fn attribute(cx: &mut MorphContext<'_>, id: NodeId, key: &str) -> Result<Option<String>, MorphError> {
    let node = cx.tree.node(id);
    if node.flags.is_basic && is_consumed(cx, node, key) {
        return Ok(None);
    }

    let value = match resolve_value(node, key) {
        Some(value) => value,
        None => return Ok(None),
    };
    let native = cx.profile.is_native();
    let name = final_name(node).to_string();

    if !node.flags.is_basic {
        if key == "onWhen" {
            return Ok(None);
        }
        return Ok(Some(jsx_attribute(key, node, key, &value)));
    }

    let attribute = match key {
        "onClick" => {
            let handler = tracked_handler(cx, id, &value);
            let event = if native { "onPress" } else { "onClick" };
            Some(format!(" {}={{{}}}", event, handler))
        }
        "teleportTo" => {
            if name == "Link" {
                Some(jsx_attribute("to", node, key, &value))
            } else {
                None
            }
        }
        "goTo" => {
            if native {
                cx.state.use_block("Linking", false);
                Some(format!(" onPress={{() => Linking.openURL({})}}", value))
            } else if name == "a" {
                Some(format!("{} target=\"_blank\"", jsx_attribute("href", node, key, &value)))
            } else {
                None
            }
        }
        "source" if node.name == "Image" => Some(image_source(cx, id, &value)?),
        "backgroundImage" if native => {
            if name.ends_with("Image") {
                Some(image_source(cx, id, &value)?)
            } else {
                None
            }
        }
        _ => {
            if cx.profile.allows_property(key) {
                Some(jsx_attribute(key, node, key, &value))
            } else {
                None
            }
        }
    };

    Ok(attribute)
}

/// Plain string literals become `name="value"`, everything else `name={expr}`.
fn jsx_attribute(name: &str, node: &ViewNode, key: &str, value: &str) -> String {
    let literal = node
        .prop(key)
        .filter(|p| !node.has_scoped(key) && !p.tags.contains(&Tag::Code))
        .and_then(|p| match &p.value {
            ValueNode::Literal(Literal::String(s)) if !s.contains('"') => Some(s.clone()),
            _ => None,
        });

    match literal {
        Some(s) => format!(" {}=\"{}\"", name, s),
        None => format!(" {}={{{}}}", name, value),
    }
}

/// With tracking on, click handlers report the block before running.
fn tracked_handler(cx: &MorphContext<'_>, id: NodeId, handler: &str) -> String {
    if !cx.state.track {
        return handler.to_string();
    }
    let block = format!("{}.{}", cx.state.name, cx.tree.node(id).test_id());
    format!(
        "event => {{ track({{ block: {}, action: \"click\", event }}); ({})(event) }}",
        quote(&block),
        handler
    )
}

fn image_source(cx: &mut MorphContext<'_>, id: NodeId, value: &str) -> Result<String, MorphError> {
    let native = cx.profile.is_native();
    let node = cx.tree.node(id);
    let key = if node.name == "Image" { "source" } else { "backgroundImage" };
    let prop = match node.prop(key) {
        Some(prop) => prop.clone(),
        None => return Err(MorphError::structural(cx.tree, id, "image without a source")),
    };

    let js = if prop.value.is_dynamic() || node.has_scoped(key) {
        value.to_string()
    } else {
        let file = prop.value.raw();
        if is_remote_source(&file) {
            quote(&file)
        } else {
            let name = image_asset(cx, &file);
            return Ok(if native {
                format!(" source={{{}}}", name)
            } else {
                format!(" src={{{}}}", name)
            });
        }
    };

    Ok(if native {
        format!(" source={{{{ uri: {} }}}}", js)
    } else {
        format!(" src={{{}}}", js)
    })
}

fn register_font(cx: &mut MorphContext<'_>, id: NodeId) {
    let node = cx.tree.node(id);
    let literal = |key: &str| {
        node.properties
            .iter()
            .find(|p| p.raw_key() == key && !p.is_scoped() && !p.value.is_dynamic())
            .map(|p| p.value.raw())
    };

    if let Some(family) = literal("fontFamily") {
        let font = FontDescriptor {
            family: family.split(',').next().unwrap_or(&family).trim().to_string(),
            weight: literal("fontWeight").unwrap_or_else(|| "400".to_string()),
            style: literal("fontStyle").unwrap_or_else(|| "normal".to_string()),
        };
        cx.state.fonts.insert(font);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stem {
    Base,
    Hover,
    Focus,
    Disabled,
    Placeholder,
    Print,
}

impl Stem {
    fn of(prop: &PropertyNode) -> Stem {
        [
            (Tag::Hover, Stem::Hover),
            (Tag::Focus, Stem::Focus),
            (Tag::Placeholder, Stem::Placeholder),
            (Tag::Disabled, Stem::Disabled),
            (Tag::Print, Stem::Print),
        ]
        .iter()
        .find(|(tag, _)| prop.tags.contains(tag))
        .map(|(_, stem)| *stem)
        .unwrap_or(Stem::Base)
    }

    fn selector(&self) -> &'static str {
        match self {
            Stem::Base => "",
            Stem::Hover => "&:hover",
            Stem::Focus => "&:focus",
            Stem::Disabled => "&:disabled",
            Stem::Placeholder => "&::placeholder",
            Stem::Print => "@media print",
        }
    }
}

fn allowed_stems(tree: &ViewTree, id: NodeId) -> &'static [Stem] {
    let node = tree.node(id);
    if node.flags.is_capture {
        &[Stem::Base, Stem::Focus, Stem::Hover, Stem::Disabled, Stem::Placeholder, Stem::Print]
    } else if node.flags.action || tree.actionable_ancestor(id).is_some() {
        &[Stem::Base, Stem::Focus, Stem::Hover, Stem::Disabled, Stem::Print]
    } else {
        &[Stem::Base, Stem::Focus, Stem::Print]
    }
}

/// Style value of `key` within one stem, folding scoped overrides of that stem.
fn style_value(node: &ViewNode, stem: Stem, key: &str) -> (String, bool) {
    let declarations: Vec<&PropertyNode> = node
        .properties
        .iter()
        .filter(|p| p.is_style() && p.raw_key() == key && Stem::of(p) == stem)
        .collect();

    let mut dynamic = false;
    let mut value = "null".to_string();
    if let Some(base) = declarations.iter().find(|p| !p.is_scoped()) {
        dynamic |= base.value.is_dynamic();
        value = property_js(base);
    }
    for prop in declarations.iter().filter(|p| p.is_scoped()) {
        dynamic = true;
        if let Some(scope) = &prop.in_scope {
            value = format!("{} ? {} : {}", scope, property_js(prop), value);
        }
    }
    (value, dynamic)
}

fn styles(
    cx: &mut MorphContext<'_>,
    id: NodeId,
    style_keys: &[(Stem, String)],
) -> Result<String, MorphError> {
    if style_keys.is_empty() {
        return Ok(String::new());
    }

    let native = cx.profile.is_native();
    let allowed = allowed_stems(cx.tree, id);
    let mut groups: Vec<(Stem, Vec<String>)> = Vec::new();
    let mut dynamic = false;
    let mut source = String::new();

    for (stem, key) in style_keys {
        if !allowed.contains(stem) || (native && *stem != Stem::Base) {
            log::debug!(
                "{}: dropping style '{}' ({:?} is not allowed here)",
                cx.tree.path(id),
                key,
                stem
            );
            continue;
        }

        let node = cx.tree.node(id);
        let (mut value, is_dynamic) = style_value(node, *stem, key);
        dynamic |= is_dynamic;

        if key == "backgroundImage" {
            if native {
                if final_name(node).ends_with("Image") {
                    source = image_source(cx, id, &value)?;
                }
                continue;
            }
            value = if is_dynamic {
                format!("`url(${{{}}})`", value)
            } else {
                let file = node.prop(key).map(|p| p.value.raw()).unwrap_or_default();
                if is_remote_source(&file) {
                    quote(&format!("url({})", file))
                } else {
                    let name = image_asset(cx, &file);
                    format!("`url(${{{}}})`", name)
                }
            };
        }

        let entry = format!("{}: {}", quote(key), value);
        match groups.iter_mut().find(|(s, _)| s == stem) {
            Some((_, entries)) => entries.push(entry),
            None => groups.push((*stem, vec![entry])),
        }
    }

    if groups.is_empty() {
        return Ok(source);
    }

    if native {
        let entries = groups.into_iter().flat_map(|(_, e)| e).collect::<Vec<_>>();
        return Ok(format!("{} style={{{{{}}}}}", source, entries.join(", ")));
    }

    if dynamic {
        cx.state.css_dynamic = true;
    } else {
        cx.state.css_static = true;
    }

    let mut object: Vec<String> = Vec::new();
    for (stem, entries) in groups {
        if stem == Stem::Base {
            object.extend(entries);
        } else {
            object.push(format!("{}: {{{}}}", quote(stem.selector()), entries.join(", ")));
        }
    }
    Ok(format!(" className={{css({{{}}})}}", object.join(", ")))
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEST ID
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TestId;

impl MorphPass for TestId {
    fn enter(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<Flow, MorphError> {
        let node = cx.tree.node(id);
        if node.flags.is_fragment {
            return Ok(Flow::Continue);
        }

        let key = &cx.state.test_id_key;
        let value = if node.parent.is_some() {
            format!("\"{}.{}\"", cx.state.name, node.test_id())
        } else {
            // The root lets its parent view override the id.
            format!("{{`${{props['{}'] || '{}'}}`}}", key, node.test_id())
        };
        let attribute = format!(" {}={}", key, value);
        cx.state.render.push(attribute);
        Ok(Flow::Continue)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHILDREN
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Children;

impl MorphPass for Children {
    fn enter(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<Flow, MorphError> {
        let node = cx.tree.node(id);

        if node.is_list() {
            let from = resolve_value(node, "from").unwrap_or_else(|| "[]".to_string());
            let opener = if final_name(node).ends_with("FlatList") {
                cx.tree.node_mut(id).flags.self_closed = true;
                format!(
                    " data={{{}}} keyExtractor={{(item, index) => String(index)}} renderItem={{({{ item, index }}) => ",
                    from
                )
            } else {
                format!(">{{{}.map((item, index) => ", from)
            };
            cx.state.render.push(opener);
            return Ok(Flow::Continue);
        }

        // Scoped-only text falls back to the text child, rendered by `visit_text`.
        if node.is_text_block() && node.has_base("text") {
            let value = node
                .properties
                .iter()
                .find(|p| p.raw_key() == "text" && !p.is_scoped())
                .map(|p| p.value.clone())
                .unwrap_or_else(|| ValueNode::string(""));
            let content = resolve_text(cx, id, &value)?;
            cx.state.render.push(format!(">{}", content));
            return Ok(Flow::Continue);
        }

        if node.children.is_empty() {
            cx.tree.node_mut(id).flags.self_closed = true;
            cx.state.render.push(" />");
        } else {
            cx.state.render.push(">");
        }
        Ok(Flow::Continue)
    }

    fn leave(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<(), MorphError> {
        let node = cx.tree.node(id);
        if node.is_list() {
            let closer = if node.flags.self_closed { "} />" } else { ")}" };
            cx.state.render.push(closer);
        }
        Ok(())
    }

    fn visit_text(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<(), MorphError> {
        let node = cx.tree.node(id);
        let (parent, value) = match (node.parent, node.value.clone()) {
            (Some(parent), Some(value)) => (parent, value),
            _ => return Err(MorphError::structural(cx.tree, id, "text outside of a block")),
        };
        // A `text` property already rendered the content.
        if cx.tree.node(parent).is_text_block() && cx.tree.node(parent).has_base("text") {
            return Ok(());
        }

        let content = resolve_text(cx, parent, &value)?;
        cx.state.render.push(content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::ir::RawNode;
    use crate::options::MorphOptions;
    use crate::state::MorphState;
    use crate::visitor::walk_view;

    fn render_with(options: MorphOptions, raw: RawNode) -> (String, MorphState) {
        let mut tree = ViewTree::from_raw(raw);
        let mut state = MorphState::new(&options);
        {
            let mut cx = MorphContext {
                tree: &mut tree,
                state: &mut state,
                options: &options,
                profile: options.backend.profile(),
            };
            walk_view(&mut cx).unwrap();
        }
        (state.render.concat(), state)
    }

    fn render(backend: Backend, raw: RawNode) -> (String, MorphState) {
        render_with(MorphOptions::new(backend, "Form"), raw)
    }

    fn capture(kind: ValueNode) -> RawNode {
        RawNode::block("Vertical").child(
            RawNode::block("Capture")
                .named("Input")
                .prop(PropertyNode::new("type", kind)),
        )
    }

    #[test]
    fn test_dom_capture_text() {
        let (out, _) = render(Backend::ReactDom, capture(ValueNode::string("text")));
        assert!(out.contains("<input type=\"text\""));
        assert!(!out.contains("inputMode"));
    }

    #[test]
    fn test_dom_capture_number_hints() {
        let (out, _) = render(Backend::ReactDom, capture(ValueNode::string("number")));
        assert!(out.contains(" type=\"number\" inputMode=\"numeric\" pattern=\"[0-9]*\""));
        let (out, _) = render(Backend::ReactDom, capture(ValueNode::string("phone")));
        assert!(out.contains(" type=\"tel\" inputMode=\"numeric\""));
    }

    #[test]
    fn test_dom_capture_dynamic_type() {
        let (out, _) = render(Backend::ReactDom, capture(ValueNode::slot("props.kind")));
        assert!(out.contains(" type={props.kind}"));
        assert!(out.contains(
            "inputMode={props.kind === 'number' || props.kind === 'phone' ? \"numeric\" : undefined}"
        ));
        assert!(!out.contains("type=\"props.kind\""));
    }

    #[test]
    fn test_native_capture_keyboard() {
        let (out, _) = render(Backend::ReactNative, capture(ValueNode::string("email")));
        assert!(out.contains("<TextInput keyboardType=\"email-address\""));
        assert!(!out.contains(" type="));
    }

    #[test]
    fn test_native_capture_without_keyboard_hints() {
        let raw = RawNode::block("Vertical").child(RawNode::block("CaptureFile").named("Upload"));
        let (out, _) = render(Backend::ReactNative, raw.clone());
        assert!(out.contains("<TextInput testID=\"Form.Upload\" />"));
        let (out, _) = render(Backend::ReactDom, raw);
        assert!(out.contains("<input type=\"file\" data-testid=\"Form.Upload\" />"));
    }

    #[test]
    fn test_scoped_text_falls_back_to_text_child() {
        let raw = RawNode::block("Text")
            .prop(PropertyNode::scoped("text", "props.on", ValueNode::string("On")))
            .child(RawNode::text(ValueNode::string("Off")));
        let (out, _) = render(Backend::ReactDom, raw);
        assert!(out.ends_with(r#">{props.on ? "On" : "Off"}</span>"#));
    }

    #[test]
    fn test_unknown_capture_type() {
        let mut tree = ViewTree::from_raw(capture(ValueNode::string("color")));
        let options = MorphOptions::default();
        let mut state = MorphState::new(&options);
        let mut cx = MorphContext {
            tree: &mut tree,
            state: &mut state,
            options: &options,
            profile: Backend::ReactDom.profile(),
        };
        let err = walk_view(&mut cx).unwrap_err();
        assert!(err.to_string().contains("unknown capture type 'color'"));
    }

    #[test]
    fn test_dom_deny_list() {
        let raw = RawNode::block("Vertical")
            .prop(PropertyNode::new("scaleX", ValueNode::number(2.0)))
            .prop(PropertyNode::new("onChange", ValueNode::slot("props.onChange")));
        let (out, _) = render(Backend::ReactDom, raw.clone());
        assert!(!out.contains("scaleX"));
        assert!(out.contains(" onChange={props.onChange}"));
        let (out, _) = render(Backend::ReactNative, raw);
        assert!(out.contains(" scaleX={2}"));
    }

    #[test]
    fn test_dom_styles_by_stem() {
        let card = RawNode::block("Vertical")
            .named("Card")
            .prop(PropertyNode::new("onClick", ValueNode::slot("props.onClick")))
            .prop(PropertyNode::style("color", ValueNode::string("red")))
            .prop(PropertyNode::style("color", ValueNode::string("blue")).with_tag(Tag::Hover))
            .child(
                RawNode::block("Text")
                    .prop(PropertyNode::new("text", ValueNode::string("Hi")))
                    .prop(PropertyNode::style("color", ValueNode::string("green")).with_tag(Tag::Hover)),
            );
        let raw = RawNode::block("Vertical")
            .child(card)
            .child(
                RawNode::block("Vertical")
                    .named("Outside")
                    .prop(PropertyNode::style("opacity", ValueNode::number(0.5)).with_tag(Tag::Disabled)),
            );
        let (out, state) = render(Backend::ReactDom, raw);
        assert!(out.contains(r#"className={css({"color": "red", "&:hover": {"color": "blue"}})}"#));
        assert!(out.contains(r#"className={css({"&:hover": {"color": "green"}})}"#));
        assert!(!out.contains("opacity"));
        assert!(state.css_static);
        assert!(!state.css_dynamic);
    }

    #[test]
    fn test_scoped_style_is_dynamic() {
        let raw = RawNode::block("Vertical")
            .prop(PropertyNode::style("color", ValueNode::string("red")))
            .prop(PropertyNode::scoped("color", "props.active", ValueNode::string("blue")).with_tag(Tag::Style));
        let (out, state) = render(Backend::ReactDom, raw);
        assert!(out.contains(r#""color": props.active ? "blue" : "red""#));
        assert!(state.css_dynamic);
    }

    #[test]
    fn test_native_style_object() {
        let raw = RawNode::block("Vertical")
            .prop(PropertyNode::style("flexDirection", ValueNode::string("row")))
            .prop(PropertyNode::style("color", ValueNode::string("blue")).with_tag(Tag::Focus));
        let (out, _) = render(Backend::ReactNative, raw);
        assert!(out.contains(r#"<View style={{"flexDirection": "row"}}"#));
        assert!(!out.contains("blue"));
    }

    #[test]
    fn test_test_ids() {
        let raw = RawNode::block("Vertical")
            .named("Root")
            .child(RawNode::block("Vertical").named("Card").child(RawNode::block("Text")));
        let (out, _) = render(Backend::ReactDom, raw.clone());
        assert!(out.contains(" data-testid={`${props['data-testid'] || 'Root'}`}"));
        assert!(out.contains(" data-testid=\"Form.Card\""));
        let (out, _) = render(Backend::ReactNative, raw);
        assert!(out.contains(" testID=\"Form.Card\""));
    }

    #[test]
    fn test_dom_list() {
        let raw = RawNode::block("List")
            .named("Items")
            .prop(PropertyNode::new("from", ValueNode::slot("props.items")))
            .child(
                RawNode::block("Text")
                    .named("Row")
                    .prop(PropertyNode::new("text", ValueNode::slot("item.name"))),
            );
        let (out, _) = render(Backend::ReactDom, raw);
        assert_eq!(
            out,
            "<div data-testid={`${props['data-testid'] || 'Items'}`}>{props.items.map((item, index) => \
             <span key={index} data-testid=\"Form.Row\">{item.name}</span>)}</div>"
        );
    }

    #[test]
    fn test_native_flat_list() {
        let raw = RawNode::block("List")
            .prop(PropertyNode::new("from", ValueNode::slot("props.items")))
            .prop(PropertyNode::style("overflowY", ValueNode::string("auto")))
            .child(RawNode::block("Text").prop(PropertyNode::new("text", ValueNode::slot("item"))));
        let (out, _) = render(Backend::ReactNative, raw);
        assert!(out.starts_with("<FlatList style={{\"overflowY\": \"auto\"}}"));
        assert!(out.contains(" data={props.items} keyExtractor={(item, index) => String(index)} renderItem={({ item, index }) => <Text"));
        assert!(out.ends_with("</Text>} />"));
        assert!(!out.contains("</FlatList>"));
    }

    #[test]
    fn test_navigation() {
        let raw = RawNode::block("Vertical")
            .child(RawNode::block("Vertical").prop(PropertyNode::new("teleportTo", ValueNode::string("/home"))))
            .child(RawNode::block("Vertical").prop(PropertyNode::new("goTo", ValueNode::string("https://views.tools"))));
        let (out, _) = render(Backend::ReactDom, raw.clone());
        assert!(out.contains("<Link to=\"/home\""));
        assert!(out.contains("<a href=\"https://views.tools\" target=\"_blank\""));
        let (out, state) = render(Backend::ReactNative, raw);
        assert!(out.contains(" onPress={() => Linking.openURL(\"https://views.tools\")}"));
        assert!(state.uses.contains(&"Linking".to_string()));
    }

    #[test]
    fn test_tracked_click() {
        let options = MorphOptions {
            tracking_enabled: true,
            ..MorphOptions::new(Backend::ReactDom, "Form")
        };
        let raw = RawNode::block("Vertical").child(
            RawNode::block("Vertical")
                .named("Submit")
                .prop(PropertyNode::new("onClick", ValueNode::slot("props.onSubmit"))),
        );
        let (out, _) = render_with(options, raw);
        assert!(out.contains(
            r#" onClick={event => { track({ block: "Form.Submit", action: "click", event }); (props.onSubmit)(event) }}"#
        ));
    }

    #[test]
    fn test_images() {
        let raw = RawNode::block("Vertical")
            .child(RawNode::block("Image").prop(PropertyNode::new("source", ValueNode::string("./images/hero.png"))))
            .child(RawNode::block("Image").prop(PropertyNode::new("source", ValueNode::string("https://x.y/a.png"))));
        let (out, state) = render(Backend::ReactDom, raw.clone());
        assert!(out.contains("<img src={ImagesHeroPng}"));
        assert!(out.contains("<img src={\"https://x.y/a.png\"}"));
        assert_eq!(state.images.len(), 1);
        let (out, _) = render(Backend::ReactNative, raw);
        assert!(out.contains("<Image source={ImagesHeroPng}"));
        assert!(out.contains("<Image source={{ uri: \"https://x.y/a.png\" }}"));
    }

    #[test]
    fn test_fonts_registered() {
        let raw = RawNode::block("Text")
            .prop(PropertyNode::new("text", ValueNode::string("Hi")))
            .prop(PropertyNode::style("fontFamily", ValueNode::string("Inter, sans-serif")))
            .prop(PropertyNode::style("fontWeight", ValueNode::number(700.0)));
        let (_, state) = render(Backend::ReactDom, raw);
        let font = state.fonts.iter().next().unwrap();
        assert_eq!(font.family, "Inter");
        assert_eq!(font.weight, "700");
        assert_eq!(font.style, "normal");
    }
}
