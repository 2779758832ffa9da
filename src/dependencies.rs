//! Dependency resolution
//!
//! Turns the usage sets collected during the walk into the import block. The
//! result is re-sorted at the end, so discovery order never shows in the output.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::backend::{Backend, Boilerplate};
use crate::host::{ImportRequest, ImportResolution, MorphHost};
use crate::ir::{quote, SVG_BLOCKS};
use crate::options::MorphOptions;
use crate::state::MorphState;

/// React Native primitives merged into one `react-native` import.
pub const NATIVE_PRIMITIVES: [&str; 12] = [
    "Animated",
    "FlatList",
    "Image",
    "KeyboardAvoidingView",
    "Linking",
    "ScrollView",
    "StyleSheet",
    "Text",
    "TextInput",
    "TouchableHighlight",
    "TouchableWithoutFeedback",
    "View",
];

/// Table components come from one grouped import.
const TABLE_COMPONENTS: [&str; 3] = ["AutoSizer", "Column", "Table"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dependencies {
    /// Import statements followed by other top-level statements, in output order.
    pub lines: Vec<String>,
    /// One entry per referenced view that the host couldn't resolve.
    pub warnings: Vec<String>,
    /// npm packages the generated file imports from.
    pub packages: BTreeSet<String>,
}

impl Dependencies {
    fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        if !line.is_empty() && !self.lines.contains(&line) {
            self.lines.push(line);
        }
    }

    fn import(&mut self, line: impl Into<String>, package: &str) {
        self.push(line);
        self.packages.insert(package.to_string());
    }
}

pub fn get_dependencies(state: &MorphState, options: &MorphOptions, host: &dyn MorphHost) -> Dependencies {
    let mut deps = Dependencies::default();
    let profile = state.backend.profile();

    if profile.boilerplate == Boilerplate::ExportObject {
        if state.backend == Backend::E2e {
            deps.import("import { Selector } from 'testcafe'", "testcafe");
        }
        deps.lines.sort_by(|a, b| imports_first(a, b));
        return deps;
    }

    let native = state.is_react_native();
    let extension = profile.file_extension(state.should_write_both);
    deps.import("import React from 'react'", "react");

    let mut uses_native: Vec<&str> = Vec::new();
    let mut uses_svg: Vec<String> = Vec::new();
    let mut uses: Vec<&String> = state.uses.iter().collect();
    uses.sort();

    for name in uses {
        let name = name.as_str();
        if native && NATIVE_PRIMITIVES.contains(&name) {
            uses_native.push(name);
        } else if native && SVG_BLOCKS.contains(name) {
            uses_svg.push(svg_import(name));
        } else if TABLE_COMPONENTS.contains(&name) {
            continue;
        } else if name == "Link" {
            let router = if native { "react-router-native" } else { "react-router-dom" };
            deps.import(format!("import {{ Link }} from '{}'", router), router);
        } else {
            resolve_view(&mut deps, state, options, host, name, extension);
        }
    }

    for svg in state.svgs.iter() {
        deps.push(format!("import {} from \"./{}{}\"", svg.view, svg.view, extension));
    }

    if !native {
        resolve_view(&mut deps, state, options, host, "ViewsBaseCss", extension);
        for font in state.fonts.iter() {
            if let Some(file) = host.resolve_font(font) {
                deps.push(format!("import {}", quote(&file)));
            }
        }
    }

    for image in state.images.iter() {
        deps.push(format!("import {} from {}", image.name, quote(&image.file)));
    }

    if !native && (state.css_static || state.css_dynamic) {
        deps.import("import { css } from \"emotion\"", "emotion");
    }

    if state.is_animated() {
        let mut animations = vec!["animated"];
        if state.has_spring_animation || (state.has_timing_animation && native) {
            animations.push("Spring");
        }
        deps.import(
            format!("import {{ {} }} from \"react-spring\"", animations.join(", ")),
            "react-spring",
        );
        if state.has_timing_animation && native {
            deps.import("import * as Easing from 'd3-ease'", "d3-ease");
        }
    }

    for base in state.animated.iter() {
        if base.chars().next().map_or(false, |c| c.is_ascii_uppercase()) {
            deps.push(format!("let Animated{} = animated({})", base, base));
        }
    }

    if state.is_table {
        let package = format!("@viewstools/tables/{}", if native { "native" } else { "dom" });
        deps.push(format!("import {{ AutoSizer, Column, Table }} from \"{}\"", package));
        deps.packages.insert("@viewstools/tables".to_string());
    }

    if !uses_svg.is_empty() {
        let named: Vec<&str> = uses_svg.iter().map(String::as_str).filter(|s| *s != "Svg").collect();
        deps.import(
            format!("import Svg, {{ {} }} from 'react-native-svg'", named.join(", ")),
            "react-native-svg",
        );
    }

    if !uses_native.is_empty() {
        deps.import(
            format!("import {{ {} }} from 'react-native'", uses_native.join(", ")),
            "react-native",
        );
    }

    if state.track {
        resolve_view(&mut deps, state, options, host, "TrackContext", extension);
    }

    if state.has_locals() {
        deps.import("import { Subscribe } from \"unstated\"", "unstated");
        resolve_view(&mut deps, state, options, host, "LocalContainer", extension);
    }

    if !state.locals.is_empty() {
        deps.push(locals_table(state));
    }

    deps.lines.sort_by(|a, b| imports_first(a, b));
    deps
}

fn resolve_view(
    deps: &mut Dependencies,
    state: &MorphState,
    options: &MorphOptions,
    host: &dyn MorphHost,
    name: &str,
    extension: &str,
) {
    let request = ImportRequest {
        name,
        is_lazy: state.lazy.get(name).copied().unwrap_or(false),
        file_name: options
            .view_lookup
            .get(name)
            .map(|file| format!("{}{}", file, extension)),
        backend: state.backend,
        system_root: &options.system_root,
    };

    match host.resolve_import(&request) {
        ImportResolution::Resolved(line) => deps.push(line),
        ImportResolution::Missing => {
            let placeholder = host.view_not_found(&request);
            log::warn!("{}", placeholder.warning);
            if !deps.warnings.contains(&placeholder.warning) {
                deps.warnings.push(placeholder.warning);
            }
            deps.push(placeholder.code);
        }
    }
}

/// `Svg` stays the default export, `SvgGroup` is `G`, the rest drop the prefix.
fn svg_import(name: &str) -> String {
    match name {
        "Svg" => "Svg".to_string(),
        "SvgGroup" => "G as SvgGroup".to_string(),
        _ => format!("{} as {}", name.trim_start_matches("Svg"), name),
    }
}

/// `let locals = { en: { ... }, es: { ... } }`; languages without a variant fall
/// back to the active locale's text.
fn locals_table(state: &MorphState) -> String {
    let mut languages: Vec<&String> = state.locale_list.iter().collect();
    if !languages.contains(&&state.local) {
        languages.push(&state.local);
    }

    let tables: Vec<String> = languages
        .iter()
        .map(|lang| {
            let entries: Vec<String> = state
                .locals
                .iter()
                .map(|(key, texts)| {
                    let text = texts
                        .get(*lang)
                        .or_else(|| texts.get(&state.local))
                        .cloned()
                        .unwrap_or_default();
                    format!("{}: {}", quote(key), quote(&text))
                })
                .collect();
            format!("{}: {{ {} }}", quote(lang), entries.join(", "))
        })
        .collect();

    format!("let locals = {{ {} }}", tables.join(", "))
}

/// Imports before other statements; each group sorted by text.
pub fn imports_first(a: &str, b: &str) -> Ordering {
    let a_import = a.starts_with("import");
    let b_import = b.starts_with("import");
    match (a_import, b_import) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.cmp(b),
    }
}
