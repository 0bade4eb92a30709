//! The element model: one card or section per schema property.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flat descriptor for one property of a schema level.
///
/// Elements are derived fresh from a schema / ui schema pair on every read;
/// `name` is their only identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Property name, unique among siblings.
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Definition this element was read from (`#/definitions/<key>`).
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Conditional groups this element triggers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependents: Vec<Dependents>,
    /// True when the element only exists conditionally on `parent`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dependent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Every sibling name at this level, for rename validation.
    #[serde(default)]
    pub neighbor_names: Vec<String>,
}

/// Card or section payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "propType", rename_all = "lowercase")]
pub enum ElementKind {
    /// Leaf field.
    #[serde(rename_all = "camelCase")]
    Card {
        data_options: Map<String, Value>,
        ui_options: Map<String, Value>,
        category: String,
    },
    /// Nested object, itself a schema / ui schema pair.
    Section {
        schema: Map<String, Value>,
        uischema: Map<String, Value>,
    },
}

/// One conditional group: the children shown for a parent value.
///
/// `value` is present for the value-keyed `oneOf` form and absent for the
/// single keyed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependents {
    pub children: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Element {
    /// New card with no reference or dependency relations.
    pub fn card(
        name: impl Into<String>,
        data_options: Map<String, Value>,
        ui_options: Map<String, Value>,
        category: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            name.into(),
            ElementKind::Card {
                data_options,
                ui_options,
                category: category.into(),
            },
        )
    }

    /// New section with no reference or dependency relations.
    pub fn section(
        name: impl Into<String>,
        schema: Map<String, Value>,
        uischema: Map<String, Value>,
    ) -> Self {
        Self::with_kind(name.into(), ElementKind::Section { schema, uischema })
    }

    fn with_kind(name: String, kind: ElementKind) -> Self {
        Self {
            name,
            required: false,
            kind,
            reference: None,
            dependents: Vec::new(),
            dependent: false,
            parent: None,
            neighbor_names: Vec::new(),
        }
    }

    pub fn is_card(&self) -> bool {
        matches!(self.kind, ElementKind::Card { .. })
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, ElementKind::Section { .. })
    }

    /// Category of a card; `None` for sections.
    pub fn category(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Card { category, .. } => Some(category),
            ElementKind::Section { .. } => None,
        }
    }

    /// The schema-side fields of this element: data options of a card,
    /// the nested schema of a section.
    pub fn data(&self) -> &Map<String, Value> {
        match &self.kind {
            ElementKind::Card { data_options, .. } => data_options,
            ElementKind::Section { schema, .. } => schema,
        }
    }

    /// Whether `name` is free for this element to take.
    pub fn can_rename_to(&self, name: &str) -> bool {
        name == self.name || !self.neighbor_names.iter().any(|n| n == name)
    }
}
