//! Card classification.
//!
//! Every registered input type declares match rules over a card's data
//! type, widget, field, format and whether it carries a `$ref` or an `enum`.
//! The rules are expanded into a lookup table keyed by a canonical string
//! so classifying a card is a single hash lookup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RegistryError;
use crate::types::{FALLBACK_CATEGORY, REF_CATEGORY};

/// Declarative predicate matching cards to a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRule {
    /// Data types this rule applies to; `"null"` stands for "no type".
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "$ref", default)]
    pub reference: bool,
    #[serde(rename = "enum", default)]
    pub enumerated: bool,
}

impl MatchRule {
    /// Rule matching plain cards of the given types.
    pub fn types(types: &[&str]) -> Self {
        Self {
            types: types.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn widget(mut self, widget: &str) -> Self {
        self.widget = Some(widget.to_string());
        self
    }

    pub fn field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn reference(mut self) -> Self {
        self.reference = true;
        self
    }

    pub fn enumerated(mut self) -> Self {
        self.enumerated = true;
        self
    }
}

/// One registered input type.
///
/// The engine only reads these fields; rendering belongs to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    #[serde(default)]
    pub display_name: String,
    pub match_if: Vec<MatchRule>,
    #[serde(default)]
    pub default_data_schema: Map<String, Value>,
    #[serde(default)]
    pub default_ui_schema: Map<String, Value>,
    /// Data type written when a card switches to this category.
    #[serde(rename = "type", default)]
    pub data_type: String,
    /// Keys accepted under `ui:options` for this input type.
    #[serde(default)]
    pub possible_options: Vec<String>,
}

/// Ordered registry of input types keyed by category name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Registry {
    inputs: Vec<(String, FormInput)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an input type, replacing any existing entry of the same name in place.
    pub fn insert(&mut self, category: impl Into<String>, input: FormInput) {
        let category = category.into();
        match self.inputs.iter_mut().find(|(name, _)| *name == category) {
            Some(slot) => slot.1 = input,
            None => self.inputs.push((category, input)),
        }
    }

    /// Builder form of [`Registry::insert`].
    pub fn with(mut self, category: impl Into<String>, input: FormInput) -> Self {
        self.insert(category, input);
        self
    }

    pub fn remove(&mut self, category: &str) -> Option<FormInput> {
        let index = self.inputs.iter().position(|(name, _)| name == category)?;
        Some(self.inputs.remove(index).1)
    }

    pub fn get(&self, category: &str) -> Option<&FormInput> {
        self.inputs
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, input)| input)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormInput)> {
        self.inputs.iter().map(|(name, input)| (name.as_str(), input))
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl TryFrom<Map<String, Value>> for Registry {
    type Error = RegistryError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut registry = Registry::new();
        for (category, value) in map {
            let input = serde_json::from_value(value).map_err(|source| {
                RegistryError::InvalidInput {
                    category: category.clone(),
                    source,
                }
            })?;
            registry.insert(category, input);
        }
        Ok(registry)
    }
}

/// Lookup table from canonical match keys to category names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryHash {
    entries: HashMap<String, String>,
}

impl CategoryHash {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Canonical key for one combination of match criteria.
///
/// A `"null"` type is normalized to the empty string.
pub fn category_key(
    data_type: &str,
    widget: &str,
    field: &str,
    format: &str,
    reference: bool,
    enumerated: bool,
) -> String {
    let data_type = if data_type == "null" { "" } else { data_type };
    format!(
        "type:{};widget:{};field:{};format:{};$ref:{};enum:{}",
        data_type, widget, field, format, reference, enumerated
    )
}

/// Expand every match rule of every registered input type into the lookup table.
///
/// # Errors
///
/// Returns `RegistryError::DuplicateKey` if two rules produce the same key.
pub fn build_category_hash(registry: &Registry) -> Result<CategoryHash, RegistryError> {
    let mut entries: HashMap<String, String> = HashMap::new();

    for (category, input) in registry.iter() {
        for rule in &input.match_if {
            for data_type in &rule.types {
                let key = category_key(
                    data_type,
                    rule.widget.as_deref().unwrap_or(""),
                    rule.field.as_deref().unwrap_or(""),
                    rule.format.as_deref().unwrap_or(""),
                    rule.reference,
                    rule.enumerated,
                );
                if let Some(existing) = entries.get(&key) {
                    return Err(RegistryError::DuplicateKey {
                        key,
                        existing: existing.clone(),
                        category: category.to_string(),
                    });
                }
                entries.insert(key, category.to_string());
            }
        }
    }

    Ok(CategoryHash { entries })
}

/// Classify a card from its resolved data and ui options.
///
/// Unmatched cards fall back to the reference category when they carry a
/// `$ref`, otherwise to the free-text category with a logged warning.
pub fn classify(
    data_options: &Map<String, Value>,
    ui_options: &Map<String, Value>,
    reference: Option<&str>,
    hash: &CategoryHash,
) -> String {
    let str_of = |map: &Map<String, Value>, key: &str| {
        map.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };

    let key = category_key(
        &str_of(data_options, "type"),
        &str_of(ui_options, "ui:widget"),
        &str_of(ui_options, "ui:field"),
        &str_of(data_options, "format"),
        reference.is_some(),
        data_options.get("enum").is_some_and(|e| !e.is_null()),
    );

    match hash.get(&key) {
        Some(category) => category.to_string(),
        None if reference.is_some() => REF_CATEGORY.to_string(),
        None => {
            tracing::warn!(%key, "no category matches card, using {}", FALLBACK_CATEGORY);
            FALLBACK_CATEGORY.to_string()
        }
    }
}
