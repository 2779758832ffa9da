//! Injected capabilities
//!
//! The morpher never touches the filesystem. Import statements, font files and
//! placeholders for views that haven't been discovered yet come from the host.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::backend::Backend;
use crate::ir::quote;

lazy_static! {
    /// Support modules generated next to the views rather than discovered.
    pub static ref SYSTEM_IMPORTS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("LocalContainer");
        s.insert("TrackContext");
        s.insert("ViewsBaseCss");
        s.insert("ViewsFormatters");
        s.insert("ViewsUseFlow");
        s
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontDescriptor {
    pub family: String,
    pub weight: String,
    pub style: String,
}

#[derive(Debug, Clone)]
pub struct ImportRequest<'a> {
    pub name: &'a str,
    pub is_lazy: bool,
    /// File the view was registered under, with the backend's extension applied.
    pub file_name: Option<String>,
    pub backend: Backend,
    pub system_root: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportResolution {
    Resolved(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub code: String,
    pub warning: String,
}

pub trait MorphHost: Sync {
    fn resolve_import(&self, request: &ImportRequest<'_>) -> ImportResolution;

    fn resolve_font(&self, _font: &FontDescriptor) -> Option<String> {
        None
    }

    /// Stub for a view that is referenced but not registered (yet). File
    /// discovery order isn't guaranteed, so this must never fail.
    fn view_not_found(&self, request: &ImportRequest<'_>) -> Placeholder {
        placeholder(request.name)
    }
}

pub fn placeholder(name: &str) -> Placeholder {
    let warning = format!("{} doesn't exist but it is being used. Create the file!", name);
    Placeholder {
        code: format!(
            "let {} = () => {{ console.warn({}); return null }}",
            name,
            quote(&warning)
        ),
        warning,
    }
}

/// Host used by the CLI harness and the tests: system modules come from
/// `systemRoot`, views from the lookup table, fonts from `./Fonts`.
#[derive(Debug, Clone, Default)]
pub struct DefaultHost;

impl MorphHost for DefaultHost {
    fn resolve_import(&self, request: &ImportRequest<'_>) -> ImportResolution {
        let name = request.name;
        let file = if SYSTEM_IMPORTS.contains(name) {
            format!("{}/{}.js", request.system_root, name)
        } else if let Some(file) = &request.file_name {
            file.clone()
        } else {
            return ImportResolution::Missing;
        };

        ImportResolution::Resolved(if request.is_lazy {
            format!("const {} = React.lazy(() => import('{}'))", name, file)
        } else {
            format!("import {} from '{}'", name, file)
        })
    }

    fn resolve_font(&self, font: &FontDescriptor) -> Option<String> {
        Some(format!(
            "./Fonts/{}-{}{}",
            font.family,
            font.weight,
            if font.style == "italic" { "-italic" } else { "" }
        ))
    }
}
