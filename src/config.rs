//! Host customisation of the editor.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::category::{build_category_hash, CategoryHash, Registry};
use crate::error::{ElementError, RegistryError};
use crate::inputs::standard_registry;
use crate::loader::load_document;

/// Customisations a host layers over the built-in behaviour.
///
/// Read from JSON with camelCase keys:
///
/// ```json
/// {
///   "customFormInputs": { "slug": { "matchIf": [{ "types": ["string"], "widget": "slug" }] } },
///   "deactivatedFormInputs": ["password"],
///   "newElementDefaultDataOptions": { "title": "Question", "type": "string" },
///   "newElementDefaultUiSchema": { "ui:autofocus": true }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mods {
    /// Input types added to, or replacing entries of, the standard registry.
    #[serde(default)]
    pub custom_form_inputs: Registry,
    /// Categories removed from the registry.
    #[serde(default)]
    pub deactivated_form_inputs: Vec<String>,
    /// Data options of new cards. The title gets the element number appended.
    #[serde(default)]
    pub new_element_default_data_options: Option<Map<String, Value>>,
    /// Ui options of new cards.
    #[serde(default)]
    pub new_element_default_ui_schema: Option<Map<String, Value>>,
}

impl Mods {
    /// Load mods from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ElementError> {
        let value = load_document(path)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ElementError> {
        serde_json::from_value(value).map_err(|source| ElementError::InvalidJson { source })
    }

    /// The standard registry with custom inputs applied and deactivated ones removed.
    pub fn registry(&self) -> Registry {
        let mut registry = standard_registry();
        for (category, input) in self.custom_form_inputs.iter() {
            registry.insert(category, input.clone());
        }
        for category in &self.deactivated_form_inputs {
            registry.remove(category);
        }
        registry
    }

    /// Lookup table for the effective registry.
    pub fn category_hash(&self) -> Result<CategoryHash, RegistryError> {
        build_category_hash(&self.registry())
    }
}
