//! Backend Parameterization
//!
//! One `BackendProfile` per target. A profile picks the block-name rules, the
//! property filter, the capture type map and the handler pipeline the walker runs.
//! Adding a target means adding a variant and a profile; nothing else changes.

use serde::{Deserialize, Serialize};

use crate::block_name::BlockName;
use crate::harness::{DataEntry, PageObjectEntry, TestCase};
use crate::passes::{Capture, Children, Properties, TestId};
use crate::visibility::OffWhen;
use crate::visitor::MorphPass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    ReactDom,
    ReactNative,
    Tests,
    E2e,
    Data,
}

impl Backend {
    pub fn profile(&self) -> &'static BackendProfile {
        match self {
            Backend::ReactDom => &REACT_DOM,
            Backend::ReactNative => &REACT_NATIVE,
            Backend::Tests => &TESTS,
            Backend::E2e => &E2E,
            Backend::Data => &DATA,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::ReactDom => "react-dom",
            Backend::ReactNative => "react-native",
            Backend::Tests => "tests",
            Backend::E2e => "e2e",
            Backend::Data => "data",
        }
    }
}

/// Which Block-Name Resolver applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockNames {
    Dom,
    Native,
    /// Harness targets name blocks by their designer name.
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyFilter {
    /// Drops DSL-only keywords that would otherwise leak into DOM attributes.
    DomDenyList,
    None,
}

/// Shape of the module wrapped around the render buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boilerplate {
    Component,
    ExportObject,
}

pub type PassList = &'static [&'static (dyn MorphPass + Sync)];

pub struct BackendProfile {
    pub backend: Backend,
    pub block_names: BlockNames,
    pub property_filter: PropertyFilter,
    /// Capture kind -> target value. DOM targets map to an `input` type, native
    /// targets to the TextInput attributes that configure the keyboard.
    pub capture_types: &'static [(&'static str, &'static str)],
    pub passes: PassList,
    pub boilerplate: Boilerplate,
    pub test_id_key: &'static str,
    pub extension: &'static str,
}

const DOM_DENY_LIST: [&str; 14] = [
    "classname",
    "format",
    "goto",
    "isfragment",
    "onclickusediv",
    "perspective",
    "rotatez",
    "scalex",
    "scaley",
    "scalez",
    "teleportto",
    "transformoriginz",
    "translatez",
    "type",
];

const DOM_CAPTURE_TYPES: [(&str, &str); 6] = [
    ("email", "email"),
    ("file", "file"),
    ("number", "number"),
    ("phone", "tel"),
    ("secure", "password"),
    ("text", "text"),
];

const NATIVE_CAPTURE_TYPES: [(&str, &str); 5] = [
    ("email", " keyboardType=\"email-address\""),
    ("number", " keyboardType=\"numeric\""),
    ("phone", " keyboardType=\"phone-pad\""),
    ("secure", " secureTextEntry"),
    ("text", ""),
];

const JSX_PASSES: PassList = &[&OffWhen, &BlockName, &Capture, &Properties, &TestId, &Children];

pub static REACT_DOM: BackendProfile = BackendProfile {
    backend: Backend::ReactDom,
    block_names: BlockNames::Dom,
    property_filter: PropertyFilter::DomDenyList,
    capture_types: &DOM_CAPTURE_TYPES,
    passes: JSX_PASSES,
    boilerplate: Boilerplate::Component,
    test_id_key: "data-testid",
    extension: ".js",
};

pub static REACT_NATIVE: BackendProfile = BackendProfile {
    backend: Backend::ReactNative,
    block_names: BlockNames::Native,
    property_filter: PropertyFilter::None,
    capture_types: &NATIVE_CAPTURE_TYPES,
    passes: JSX_PASSES,
    boilerplate: Boilerplate::Component,
    test_id_key: "testID",
    extension: ".js",
};

pub static TESTS: BackendProfile = BackendProfile {
    backend: Backend::Tests,
    block_names: BlockNames::Passthrough,
    property_filter: PropertyFilter::None,
    capture_types: &[],
    passes: &[&TestCase],
    boilerplate: Boilerplate::ExportObject,
    test_id_key: "data-testid",
    extension: ".js",
};

pub static E2E: BackendProfile = BackendProfile {
    backend: Backend::E2e,
    block_names: BlockNames::Passthrough,
    property_filter: PropertyFilter::None,
    capture_types: &[],
    passes: &[&PageObjectEntry],
    boilerplate: Boilerplate::ExportObject,
    test_id_key: "data-testid",
    extension: ".page.js",
};

pub static DATA: BackendProfile = BackendProfile {
    backend: Backend::Data,
    block_names: BlockNames::Passthrough,
    property_filter: PropertyFilter::None,
    capture_types: &[],
    passes: &[&DataEntry],
    boilerplate: Boilerplate::ExportObject,
    test_id_key: "data-testid",
    extension: ".js",
};

impl BackendProfile {
    pub fn allows_property(&self, key: &str) -> bool {
        match self.property_filter {
            PropertyFilter::DomDenyList => {
                let lower = key.to_lowercase();
                !DOM_DENY_LIST.contains(&lower.as_str())
            }
            PropertyFilter::None => true,
        }
    }

    pub fn capture_type(&self, kind: &str) -> Option<&'static str> {
        self.capture_types
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| *v)
    }

    pub fn is_native(&self) -> bool {
        self.block_names == BlockNames::Native
    }

    /// Extension of sibling component files. Writing both targets side by side
    /// needs platform suffixes.
    pub fn file_extension(&self, should_write_both: bool) -> &'static str {
        match (self.backend, should_write_both) {
            (Backend::ReactDom, true) => ".web.js",
            (Backend::ReactNative, true) => ".native.js",
            _ => self.extension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_backend_has_its_profile() {
        for backend in [
            Backend::ReactDom,
            Backend::ReactNative,
            Backend::Tests,
            Backend::E2e,
            Backend::Data,
        ] {
            assert_eq!(backend.profile().backend, backend);
            assert!(!backend.profile().passes.is_empty());
        }
    }

    #[test]
    fn test_dom_deny_list_is_case_insensitive() {
        assert!(!REACT_DOM.allows_property("teleportTo"));
        assert!(!REACT_DOM.allows_property("className"));
        assert!(REACT_DOM.allows_property("onChange"));
        assert!(REACT_NATIVE.allows_property("teleportTo"));
    }

    #[test]
    fn test_capture_maps() {
        assert_eq!(REACT_DOM.capture_type("phone"), Some("tel"));
        assert_eq!(REACT_DOM.capture_type("secure"), Some("password"));
        assert_eq!(
            REACT_NATIVE.capture_type("number"),
            Some(" keyboardType=\"numeric\"")
        );
        assert_eq!(REACT_NATIVE.capture_type("file"), None);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(REACT_DOM.file_extension(true), ".web.js");
        assert_eq!(REACT_NATIVE.file_extension(true), ".native.js");
        assert_eq!(REACT_NATIVE.file_extension(false), ".js");
        assert_eq!(E2E.file_extension(true), ".page.js");
    }
}
