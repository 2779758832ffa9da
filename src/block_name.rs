//! Block-name resolution
//!
//! Maps a view block onto the component the target renders it with. DOM targets
//! get host elements (`div`, `span`, `input`), native targets get React Native
//! primitives, harness targets keep the designer name.

use lazy_static::lazy_static;
use regex::Regex;

use crate::backend::BlockNames;
use crate::ir::{NodeId, ViewNode, SVG_BLOCKS};
use crate::scope::resolve_value;
use crate::state::{ImageAsset, SvgAsset};
use crate::validate::MorphError;
use crate::visibility::is_story;
use crate::visitor::{Flow, MorphContext, MorphPass};

const FRAGMENT: &str = "React.Fragment";

lazy_static! {
    static ref COMPONENT_NAME: Regex = Regex::new(r"^[A-Z][A-Za-z0-9]*$").unwrap();
}

pub struct BlockName;

impl MorphPass for BlockName {
    fn enter(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<Flow, MorphError> {
        let node = cx.tree.node(id);
        if node.flags.is_fragment && node.children.is_empty() {
            return Ok(Flow::Skip);
        }

        if id == cx.tree.root && node.flags.is_fragment && node.name == "View" {
            cx.state.flow = node.prop("flow").map(|p| p.value.raw());
        }

        if is_story(cx.tree, cx.state, id) {
            cx.state.uses_flow = true;
            cx.state.use_block("ViewsUseFlow", false);
        }

        let name = resolve_block_name(cx, id)?;

        if cx.tree.node(id).flags.is_svg {
            cx.state.render.push(format!("<{} />", name));
            return Ok(Flow::Skip);
        }

        if cx.tree.node(id).flags.is_table {
            open_table(cx, id, &name);
        } else {
            cx.state.render.push(format!("<{}", name));
        }
        Ok(Flow::Continue)
    }

    fn leave(&self, cx: &mut MorphContext<'_>, id: NodeId) -> Result<(), MorphError> {
        let node = cx.tree.node(id);
        if !node.flags.self_closed {
            if let Some(name) = &node.flags.name_final {
                let close = format!("</{}>", name);
                cx.state.render.push(close);
            }
        }
        if cx.tree.node(id).flags.is_table {
            cx.state.render.push(")}</AutoSizer>");
        }
        Ok(())
    }
}

/// Resolves, registers and records the final component name of a block.
pub fn resolve_block_name(cx: &mut MorphContext<'_>, id: NodeId) -> Result<String, MorphError> {
    set_navigation_flags(cx, id);

    let node = cx.tree.node(id);
    if !is_component_name(&node.name) {
        return Err(MorphError::UnknownBlockKind {
            path: cx.tree.path(id),
            name: node.name.clone(),
        });
    }

    let base = match cx.profile.block_names {
        BlockNames::Dom => dom_block_name(cx, id),
        BlockNames::Native => native_block_name(cx, id),
        BlockNames::Passthrough => return Ok(node.test_id().to_string()),
    };

    let node = cx.tree.node(id);
    let is_lazy = node.flags.is_lazy;
    let is_proxy = node.flags.is_proxy && !node.flags.is_basic;
    let animation = if node.flags.is_svg || base == "Link" || base == FRAGMENT {
        None
    } else {
        node.animation
    };

    if is_importable(&base) && !node.flags.is_svg {
        cx.state.use_block(&base, is_lazy);
    }

    let mut name = base.clone();
    if let Some(kind) = animation {
        cx.state.use_animation(kind);
        cx.state.animated.insert(base.clone());
        name = if is_importable(&base) {
            format!("Animated{}", base)
        } else {
            format!("animated.{}", base)
        };
    }

    if is_proxy {
        name = format!("props.proxy{}", name);
    }

    cx.tree.node_mut(id).flags.name_final = Some(name.clone());
    Ok(name)
}

/// Teleport, external link and click action are mutually exclusive, in that order.
fn set_navigation_flags(cx: &mut MorphContext<'_>, id: NodeId) {
    let node = cx.tree.node_mut(id);
    if node.has_prop("teleportTo") {
        node.flags.teleport = true;
    } else if node.has_prop("goTo") {
        node.flags.go_to = true;
    } else if node.has_prop("onClick") {
        node.flags.action = true;
    }
}

fn dom_block_name(cx: &mut MorphContext<'_>, id: NodeId) -> String {
    let node = cx.tree.node(id);
    if node.flags.is_capture {
        return if node.name == "CaptureTextArea" {
            "textarea".to_string()
        } else {
            "input".to_string()
        };
    }

    let name = node.name.clone();
    match name.as_str() {
        "Horizontal" | "Vertical" | "View" => {
            if node.flags.is_fragment {
                FRAGMENT.to_string()
            } else if node.flags.teleport {
                "Link".to_string()
            } else if node.flags.go_to {
                "a".to_string()
            } else {
                "div".to_string()
            }
        }
        "List" => "div".to_string(),
        "Text" => "span".to_string(),
        "Image" => image_block_name(cx, id, "img"),
        "Table" => table_block_name(cx, id),
        name if SVG_BLOCKS.contains(name) => dom_svg_name(name),
        name => name.to_string(),
    }
}

fn native_block_name(cx: &mut MorphContext<'_>, id: NodeId) -> String {
    let node = cx.tree.node(id);
    if node.flags.is_capture {
        return "TextInput".to_string();
    }

    let name = node.name.clone();
    match name.as_str() {
        "Horizontal" | "Vertical" | "View" => {
            if node.flags.is_fragment {
                FRAGMENT.to_string()
            } else if node.flags.teleport {
                "Link".to_string()
            } else if node.has_prop_matching(|k| k == "overflowY", is_scrollable) {
                "ScrollView".to_string()
            } else if node.has_prop("backgroundImage") {
                "Image".to_string()
            } else {
                "View".to_string()
            }
        }
        "List" => {
            if node.has_prop_matching(|k| k.starts_with("overflow"), is_scrollable) {
                "FlatList".to_string()
            } else {
                "View".to_string()
            }
        }
        "Text" => "Text".to_string(),
        "Image" => image_block_name(cx, id, "Image"),
        "Table" => table_block_name(cx, id),
        name => name.to_string(),
    }
}

fn is_scrollable(value: &crate::ir::ValueNode) -> bool {
    matches!(value.raw().as_str(), "auto" | "scroll")
}

/// `.svg` sources render as an inline component generated next to the view.
fn image_block_name(cx: &mut MorphContext<'_>, id: NodeId, default: &str) -> String {
    let node = cx.tree.node(id);
    let source = match node.prop("source") {
        Some(p) if !p.value.is_dynamic() => p.value.raw(),
        _ => return default.to_string(),
    };
    if !source.ends_with(".svg") {
        return default.to_string();
    }

    let view = format!("{}Inline", to_pascal_case(&source));
    cx.state.svgs.insert(SvgAsset {
        source,
        view: view.clone(),
    });
    cx.tree.node_mut(id).flags.is_svg = true;
    view
}

fn table_block_name(cx: &mut MorphContext<'_>, id: NodeId) -> String {
    cx.tree.node_mut(id).flags.is_table = true;
    cx.state.is_table = true;
    "Table".to_string()
}

fn dom_svg_name(name: &str) -> String {
    match name {
        "Svg" => "svg".to_string(),
        "SvgGroup" => "g".to_string(),
        _ => {
            let rest = &name[3..];
            let mut chars = rest.chars();
            match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => rest.to_string(),
            }
        }
    }
}

/// `<AutoSizer>{({ width, height }) => (` opens around the table; `from` feeds the rows.
fn open_table(cx: &mut MorphContext<'_>, id: NodeId, name: &str) {
    let from = resolve_value(cx.tree.node(id), "from").unwrap_or_else(|| "[]".to_string());
    cx.state.use_block("AutoSizer", false);
    cx.state.use_block("Column", false);
    cx.state
        .render
        .push("<AutoSizer>{({ width, height }) => (".to_string());
    cx.state.render.push(format!(
        "<{name} width={{width}} height={{height}} rowCount={{{from}.length}} rowGetter={{({{ index }}) => {from}[index]}}",
        name = name,
        from = from
    ));
}

/// Registers an image asset for a relative source and returns the binding name.
pub fn image_asset(cx: &mut MorphContext<'_>, file: &str) -> String {
    let name = to_pascal_case(file);
    cx.state.images.insert(ImageAsset {
        name: name.clone(),
        file: file.to_string(),
    });
    name
}

pub fn is_remote_source(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://") || source.starts_with("data:")
}

/// `./icons/arrowLeft.svg` -> `IconsArrowLeftSvg`.
pub fn to_pascal_case(value: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in value.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| {
            let lower = w.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn is_component_name(name: &str) -> bool {
    COMPONENT_NAME.is_match(name)
}

/// Capitalized identifiers are imported; host elements and `React.Fragment` aren't.
fn is_importable(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_ascii_uppercase()) && !name.contains('.')
}

pub fn final_name(node: &ViewNode) -> &str {
    node.flags.name_final.as_deref().unwrap_or(&node.name)
}
