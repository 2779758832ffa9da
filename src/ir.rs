//! View Tree IR
//!
//! The parsed view tree handed to the morpher by the DSL parser. Nodes live in an
//! arena (`ViewTree::nodes`) and point at their parent by index, so upward lookups
//! never hold an owning reference.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::validate::MorphError;

pub type NodeId = usize;

lazy_static! {
    /// Blocks the morpher knows how to render natively. Any other capitalized
    /// name is a reference to another view.
    pub static ref BASIC_BLOCKS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("Capture");
        s.insert("CaptureEmail");
        s.insert("CaptureFile");
        s.insert("CaptureNumber");
        s.insert("CapturePhone");
        s.insert("CaptureSecure");
        s.insert("CaptureText");
        s.insert("CaptureTextArea");
        s.insert("Column");
        s.insert("Horizontal");
        s.insert("Image");
        s.insert("List");
        s.insert("Table");
        s.insert("Text");
        s.insert("Vertical");
        s.insert("View");
        for svg in SVG_BLOCKS.iter() {
            s.insert(*svg);
        }
        s
    };

    pub static ref SVG_BLOCKS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("Svg");
        s.insert("SvgCircle");
        s.insert("SvgDefs");
        s.insert("SvgEllipse");
        s.insert("SvgGroup");
        s.insert("SvgLine");
        s.insert("SvgLinearGradient");
        s.insert("SvgPath");
        s.insert("SvgPolygon");
        s.insert("SvgPolyline");
        s.insert("SvgRadialGradient");
        s.insert("SvgRect");
        s.insert("SvgStop");
        s.insert("SvgSymbol");
        s.insert("SvgText");
        s.insert("SvgUse");
        s
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUES AND PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    #[default]
    Block,
    Property,
    Text,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tag {
    Code,
    Style,
    Hover,
    Focus,
    Placeholder,
    Disabled,
    Print,
}

pub type Tags = BTreeSet<Tag>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Literal {
    pub fn as_text(&self) -> String {
        match self {
            Literal::Bool(b) => b.to_string(),
            Literal::Number(n) => n.to_string(),
            Literal::String(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum ValueNode {
    Literal(Literal),
    /// Dynamic reference bound to a prop or a loop variable (`props.title`, `item.name`).
    Slot(String),
    /// Verbatim expression text.
    Code(String),
}

impl ValueNode {
    pub fn string(s: &str) -> Self {
        ValueNode::Literal(Literal::String(s.to_string()))
    }

    pub fn number(n: f64) -> Self {
        ValueNode::Literal(Literal::Number(n))
    }

    pub fn slot(expr: &str) -> Self {
        ValueNode::Slot(expr.to_string())
    }

    pub fn is_dynamic(&self) -> bool {
        !matches!(self, ValueNode::Literal(_))
    }

    /// Expression text for slots and code values.
    pub fn expression(&self) -> Option<&str> {
        match self {
            ValueNode::Slot(e) | ValueNode::Code(e) => Some(e),
            ValueNode::Literal(_) => None,
        }
    }

    /// Raw text: literal content or expression source.
    pub fn raw(&self) -> String {
        match self {
            ValueNode::Literal(l) => l.as_text(),
            ValueNode::Slot(e) | ValueNode::Code(e) => e.clone(),
        }
    }

    /// The value as a JS expression. Strings are quoted, everything else is verbatim.
    pub fn to_js(&self) -> String {
        match self {
            ValueNode::Literal(Literal::String(s)) => quote(s),
            ValueNode::Literal(l) => l.as_text(),
            ValueNode::Slot(e) | ValueNode::Code(e) => e.clone(),
        }
    }
}

/// JSON string quoting, which is also a valid JS string literal.
pub fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyNode {
    pub key: String,
    /// Undecorated key used to match scoped overrides against their base.
    #[serde(default)]
    pub key_raw: String,
    pub value: ValueNode,
    #[serde(default)]
    pub in_scope: Option<String>,
    #[serde(default)]
    pub tags: Tags,
}

impl PropertyNode {
    pub fn new(key: &str, value: ValueNode) -> Self {
        Self {
            key: key.to_string(),
            key_raw: key.to_string(),
            value,
            in_scope: None,
            tags: Tags::new(),
        }
    }

    pub fn scoped(key: &str, scope: &str, value: ValueNode) -> Self {
        Self {
            in_scope: Some(scope.to_string()),
            ..Self::new(key, value)
        }
    }

    pub fn style(key: &str, value: ValueNode) -> Self {
        Self::new(key, value).with_tag(Tag::Style)
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn raw_key(&self) -> &str {
        if self.key_raw.is_empty() {
            &self.key
        } else {
            &self.key_raw
        }
    }

    pub fn is_style(&self) -> bool {
        self.tags.contains(&Tag::Style)
    }

    pub fn is_scoped(&self) -> bool {
        self.in_scope.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Spring,
    Timing,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSER OUTPUT CONTRACT
// ═══════════════════════════════════════════════════════════════════════════════

/// Nested node as produced by the DSL parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub name: String,
    #[serde(default)]
    pub kind: NodeKind,
    /// Designer-given name (`Title Text` has `is = "Title"`).
    #[serde(default)]
    pub is: Option<String>,
    #[serde(default)]
    pub children: Vec<RawNode>,
    #[serde(default)]
    pub properties: Vec<PropertyNode>,
    #[serde(default)]
    pub tags: Tags,
    /// Scope conditions declared on this block (`when props.isSelected`).
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Content of text and value nodes.
    #[serde(default)]
    pub value: Option<ValueNode>,
    #[serde(default)]
    pub is_fragment: bool,
    #[serde(default)]
    pub animation: Option<AnimationKind>,
    #[serde(default)]
    pub is_proxy: bool,
    #[serde(default)]
    pub is_lazy: bool,
}

impl RawNode {
    pub fn block(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn text(value: ValueNode) -> Self {
        Self {
            name: "text".to_string(),
            kind: NodeKind::Text,
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn named(mut self, is: &str) -> Self {
        self.is = Some(is.to_string());
        self
    }

    pub fn prop(mut self, property: PropertyNode) -> Self {
        if let Some(scope) = &property.in_scope {
            if !self.scopes.contains(scope) {
                self.scopes.push(scope.clone());
            }
        }
        self.properties.push(property);
        self
    }

    pub fn child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn fragment(mut self) -> Self {
        self.is_fragment = true;
        self
    }

    pub fn animated(mut self, kind: AnimationKind) -> Self {
        self.animation = Some(kind);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ARENA TREE
// ═══════════════════════════════════════════════════════════════════════════════

/// Flags computed before or during a compile. Passes set these on the node they
/// are visiting for later passes of the same visit.
#[derive(Debug, Clone, Default)]
pub struct NodeFlags {
    pub is_fragment: bool,
    pub is_capture: bool,
    pub is_animated: bool,
    pub is_basic: bool,
    pub is_proxy: bool,
    pub is_lazy: bool,
    pub is_svg: bool,
    pub is_table: bool,
    pub teleport: bool,
    pub go_to: bool,
    pub action: bool,
    pub on_when: bool,
    pub self_closed: bool,
    pub name_final: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ViewNode {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub name: String,
    pub is: Option<String>,
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub properties: Vec<PropertyNode>,
    pub tags: Tags,
    pub scopes: Vec<String>,
    pub value: Option<ValueNode>,
    pub animation: Option<AnimationKind>,
    pub flags: NodeFlags,
}

impl ViewNode {
    /// The unscoped declaration of `key`, or the first scoped one when no base exists.
    pub fn prop(&self, key: &str) -> Option<&PropertyNode> {
        self.properties
            .iter()
            .find(|p| p.key == key && !p.is_scoped())
            .or_else(|| self.properties.iter().find(|p| p.key == key))
    }

    pub fn has_prop(&self, key: &str) -> bool {
        self.prop(key).is_some()
    }

    pub fn has_prop_matching<K, V>(&self, key: K, value: V) -> bool
    where
        K: Fn(&str) -> bool,
        V: Fn(&ValueNode) -> bool,
    {
        self.properties
            .iter()
            .find(|p| key(p.key.as_str()))
            .map(|p| value(&p.value))
            .unwrap_or(false)
    }

    /// Whether `key` has a declaration outside of any scope.
    pub fn has_base(&self, key: &str) -> bool {
        self.properties
            .iter()
            .any(|p| p.raw_key() == key && !p.is_scoped())
    }

    pub fn has_scoped(&self, key: &str) -> bool {
        self.properties
            .iter()
            .any(|p| p.raw_key() == key && p.is_scoped())
    }

    pub fn test_id(&self) -> &str {
        self.is.as_deref().unwrap_or(&self.name)
    }

    pub fn is_block(&self) -> bool {
        self.kind == NodeKind::Block
    }

    pub fn is_list(&self) -> bool {
        self.is_block() && self.name == "List"
    }

    pub fn is_text_block(&self) -> bool {
        self.is_block() && self.name == "Text"
    }
}

#[derive(Debug, Clone)]
pub struct ViewTree {
    pub nodes: Vec<ViewNode>,
    pub root: NodeId,
}

impl ViewTree {
    pub fn from_raw(raw: RawNode) -> Self {
        let mut tree = ViewTree {
            nodes: Vec::new(),
            root: 0,
        };
        tree.root = tree.insert(raw, None);
        tree
    }

    pub fn from_json(json: &str) -> Result<Self, MorphError> {
        let raw: RawNode = serde_json::from_str(json).map_err(|e| MorphError::InvalidInput {
            reason: format!("Failed to parse view tree JSON: {}", e),
        })?;
        Ok(Self::from_raw(raw))
    }

    fn insert(&mut self, raw: RawNode, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        let flags = NodeFlags {
            is_fragment: raw.is_fragment,
            is_capture: raw.kind == NodeKind::Block && raw.name.starts_with("Capture"),
            is_animated: raw.animation.is_some(),
            is_basic: BASIC_BLOCKS.contains(raw.name.as_str()),
            is_proxy: raw.is_proxy,
            is_lazy: raw.is_lazy,
            ..Default::default()
        };

        self.nodes.push(ViewNode {
            id,
            parent,
            name: raw.name,
            is: raw.is,
            kind: raw.kind,
            children: Vec::with_capacity(raw.children.len()),
            properties: raw.properties,
            tags: raw.tags,
            scopes: raw.scopes,
            value: raw.value,
            animation: raw.animation,
            flags,
        });

        for child in raw.children {
            let child_id = self.insert(child, Some(id));
            self.nodes[id].children.push(child_id);
        }

        id
    }

    pub fn node(&self, id: NodeId) -> &ViewNode {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut ViewNode {
        &mut self.nodes[id]
    }

    pub fn parent(&self, id: NodeId) -> Option<&ViewNode> {
        self.nodes[id].parent.map(|p| &self.nodes[p])
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &ViewNode> + '_ {
        std::iter::successors(self.parent(id), move |n| self.parent(n.id))
    }

    pub fn actionable_ancestor(&self, id: NodeId) -> Option<&ViewNode> {
        self.ancestors(id).find(|n| n.flags.action)
    }

    /// Whether any ancestor is a List, i.e. `item`/`index` are in scope.
    pub fn in_list(&self, id: NodeId) -> bool {
        self.ancestors(id).any(|n| n.is_list())
    }

    /// `View/Header/Button` style path used in error messages.
    pub fn path(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = self.ancestors(id).map(|n| n.test_id()).collect();
        parts.reverse();
        parts.push(self.nodes[id].test_id());
        parts.join("/")
    }

    pub fn iter(&self) -> impl Iterator<Item = &ViewNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ViewTree {
        ViewTree::from_raw(
            RawNode::block("View").fragment().child(
                RawNode::block("Vertical")
                    .named("Card")
                    .prop(PropertyNode::new("onClick", ValueNode::slot("props.onClick")))
                    .child(RawNode::block("Text").named("Title")),
            ),
        )
    }

    #[test]
    fn test_parent_links_and_path() {
        let tree = sample();
        let title = tree.iter().find(|n| n.test_id() == "Title").unwrap();
        assert_eq!(tree.parent(title.id).unwrap().test_id(), "Card");
        assert_eq!(tree.path(title.id), "View/Card/Title");
    }

    #[test]
    fn test_actionable_ancestor() {
        let mut tree = sample();
        let card = tree.iter().find(|n| n.test_id() == "Card").unwrap().id;
        tree.node_mut(card).flags.action = true;
        let title = tree.iter().find(|n| n.test_id() == "Title").unwrap().id;
        assert_eq!(tree.actionable_ancestor(title).unwrap().id, card);
        assert!(tree.actionable_ancestor(card).is_none());
    }

    #[test]
    fn test_basic_and_capture_flags() {
        let tree = ViewTree::from_raw(
            RawNode::block("View")
                .child(RawNode::block("CaptureEmail"))
                .child(RawNode::block("Profile")),
        );
        assert!(tree.node(1).flags.is_capture);
        assert!(tree.node(1).flags.is_basic);
        assert!(!tree.node(2).flags.is_basic);
    }

    #[test]
    fn test_from_json_input_contract() {
        let json = r#"{
            "name": "Text",
            "properties": [
                { "key": "text", "value": { "type": "literal", "value": "Hi" } },
                { "key": "color", "value": { "type": "slot", "value": "props.color" }, "tags": ["style"] }
            ]
        }"#;
        let tree = ViewTree::from_json(json).unwrap();
        let root = tree.node(tree.root);
        assert_eq!(root.prop("text").unwrap().value, ValueNode::string("Hi"));
        assert!(root.prop("color").unwrap().is_style());
        assert_eq!(root.prop("color").unwrap().raw_key(), "color");
    }

    #[test]
    fn test_value_to_js() {
        assert_eq!(ValueNode::string("a \"b\"").to_js(), r#""a \"b\"""#);
        assert_eq!(ValueNode::number(12.0).to_js(), "12");
        assert_eq!(ValueNode::slot("props.x").to_js(), "props.x");
    }
}
