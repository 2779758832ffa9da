//! Morph State
//!
//! The mutable context threaded through one view's traversal. Created fresh per
//! compile and dropped once the source text exists.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::backend::Backend;
use crate::host::FontDescriptor;
use crate::ir::AnimationKind;
use crate::options::MorphOptions;

// ═══════════════════════════════════════════════════════════════════════════════
// ORDERED SET
// ═══════════════════════════════════════════════════════════════════════════════

/// Insertion-ordered set without duplicates. Import assembly re-sorts its output,
/// so insertion order only affects traversal-time bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct OrderedSet<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Clone + Eq + std::hash::Hash> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Returns false when the item was already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    pub fn contains(&self, item: &T) -> bool {
        self.seen.contains(item)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDER BUFFER
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only sequence of source fragments in document order.
#[derive(Debug, Clone, Default)]
pub struct RenderBuffer {
    fragments: Vec<String>,
}

impl RenderBuffer {
    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn concat(&self) -> String {
        self.fragments.concat()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SvgAsset {
    pub source: String,
    pub view: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageAsset {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormatKind {
    Percent,
    Date,
    Time,
}

impl FormatKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "percent" => Some(FormatKind::Percent),
            "date" => Some(FormatKind::Date),
            "time" => Some(FormatKind::Time),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Percent => "percent",
            FormatKind::Date => "date",
            FormatKind::Time => "time",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MORPH STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct MorphState {
    pub name: String,
    pub backend: Backend,
    pub render: RenderBuffer,
    /// Component dependencies in discovery order.
    pub uses: OrderedSet<String>,
    pub lazy: BTreeMap<String, bool>,
    /// Base names wrapped as `Animated<Base>`.
    pub animated: OrderedSet<String>,
    pub has_spring_animation: bool,
    pub has_timing_animation: bool,
    pub fonts: OrderedSet<FontDescriptor>,
    pub svgs: OrderedSet<SvgAsset>,
    pub images: OrderedSet<ImageAsset>,
    pub formats: BTreeSet<FormatKind>,
    /// Localized strings: key -> language -> text.
    pub locals: BTreeMap<String, BTreeMap<String, String>>,
    pub locale_list: Vec<String>,
    pub local: String,
    pub css_static: bool,
    pub css_dynamic: bool,
    pub track: bool,
    pub is_table: bool,
    pub flow: Option<String>,
    pub path_to_story: String,
    pub uses_flow: bool,
    pub test_id_key: String,
    pub should_write_both: bool,
    /// Free-form entries for the harness backends (tests, e2e, data).
    pub entries: Vec<(String, String)>,
}

impl MorphState {
    pub fn new(options: &MorphOptions) -> Self {
        let backend = options.backend;
        Self {
            name: options.name.clone(),
            backend,
            render: RenderBuffer::default(),
            uses: OrderedSet::new(),
            lazy: BTreeMap::new(),
            animated: OrderedSet::new(),
            has_spring_animation: false,
            has_timing_animation: false,
            fonts: OrderedSet::new(),
            svgs: OrderedSet::new(),
            images: OrderedSet::new(),
            formats: BTreeSet::new(),
            locals: BTreeMap::new(),
            locale_list: options.locale_list.clone(),
            local: options.active_locale.clone(),
            css_static: false,
            css_dynamic: false,
            track: options.tracking_enabled,
            is_table: false,
            flow: None,
            path_to_story: options
                .flow_path
                .clone()
                .unwrap_or_else(|| format!("/{}", options.name)),
            uses_flow: false,
            test_id_key: options
                .test_id_property_key
                .clone()
                .unwrap_or_else(|| backend.profile().test_id_key.to_string()),
            should_write_both: options.should_write_both,
            entries: Vec::new(),
        }
    }

    pub fn is_react_native(&self) -> bool {
        self.backend == Backend::ReactNative
    }

    /// Registers a component dependency. A name used both lazily and eagerly is
    /// imported eagerly.
    pub fn use_block(&mut self, name: &str, is_lazy: bool) {
        self.uses.insert(name.to_string());
        let entry = self.lazy.entry(name.to_string()).or_insert(is_lazy);
        *entry = *entry && is_lazy;
    }

    pub fn use_animation(&mut self, kind: AnimationKind) {
        match kind {
            AnimationKind::Spring => self.has_spring_animation = true,
            AnimationKind::Timing => self.has_timing_animation = true,
        }
    }

    pub fn is_animated(&self) -> bool {
        self.has_spring_animation || self.has_timing_animation
    }

    pub fn has_locals(&self) -> bool {
        !self.locals.is_empty() || !self.formats.is_empty()
    }

    /// Records a localized string table entry and returns its key. Keys are unique
    /// per view; repeated block names get a numeric suffix.
    pub fn add_local(&mut self, base: &str, texts: BTreeMap<String, String>) -> String {
        let mut key = base.to_string();
        let mut n = 1;
        while self.locals.contains_key(&key) {
            key = format!("{}{}", base, n);
            n += 1;
        }
        self.locals.insert(key.clone(), texts);
        key
    }
}
