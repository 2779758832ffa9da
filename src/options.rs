use serde::Deserialize;
use std::collections::BTreeMap;

use crate::backend::Backend;
use crate::validate::MorphError;

/// Options for one view compile. Mirrors the morpher CLI defaults: react-dom,
/// English, no tracking, pretty output.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MorphOptions {
    #[serde(rename = "as", alias = "backend")]
    pub backend: Backend,
    /// Logical view name, used for the component name and test ids.
    pub name: String,
    /// View file relative to the source root.
    pub file: Option<String>,
    pub locale_list: Vec<String>,
    pub active_locale: String,
    pub tracking_enabled: bool,
    pub pretty: bool,
    /// View name -> file, populated by file discovery. Read-only here.
    pub view_lookup: BTreeMap<String, String>,
    pub test_id_property_key: Option<String>,
    pub flow_path: Option<String>,
    pub should_write_both: bool,
    pub system_root: String,
}

impl Default for MorphOptions {
    fn default() -> Self {
        Self {
            backend: Backend::ReactDom,
            name: "View".to_string(),
            file: None,
            locale_list: vec!["en".to_string()],
            active_locale: "en".to_string(),
            tracking_enabled: false,
            pretty: true,
            view_lookup: BTreeMap::new(),
            test_id_property_key: None,
            flow_path: None,
            should_write_both: false,
            system_root: "./Views".to_string(),
        }
    }
}

impl MorphOptions {
    pub fn new(backend: Backend, name: &str) -> Self {
        Self {
            backend,
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, MorphError> {
        serde_json::from_str(json).map_err(|e| MorphError::InvalidInput {
            reason: format!("Failed to parse morph options: {}", e),
        })
    }

    /// Locales other than the active one that a block may declare variants for.
    pub fn is_locale(&self, key: &str) -> bool {
        self.locale_list.iter().any(|l| l == key)
    }
}
