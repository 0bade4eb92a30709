//! Core types and constants shared by the element transformations.

use serde_json::{Map, Value};

/// Prefix of auto-generated element names (`newInput1`, `newInput2`, ...).
pub const DEFAULT_INPUT_NAME: &str = "newInput";

/// Prefix every `$ref` handled by the editor must start with.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Marks a ui option whose key collides with a data option key.
pub const UI_ESCAPE_PREFIX: &str = "ui:*";

/// Category assigned to unmatched cards.
pub const FALLBACK_CATEGORY: &str = "shortAnswer";

/// Category assigned to unmatched cards that carry a `$ref`.
pub const REF_CATEGORY: &str = "ref";

/// Card category that serializes as a bare object.
pub const SECTION_CATEGORY: &str = "section";

/// Data option keys that belong to the editor and never reach the schema.
pub const EDITOR_ONLY_KEYS: &[&str] = &[
    "category",
    "hideKey",
    "path",
    "definitionData",
    "definitionUi",
    "allFormInputs",
];

/// JSON Schema keywords the editor understands on objects and properties.
pub const SUPPORTED_PROPERTY_PARAMETERS: &[&str] = &[
    "title",
    "description",
    "enum",
    "enumNames",
    "minLength",
    "maxLength",
    "multipleOf",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "format",
    "pattern",
    "type",
    "default",
    "required",
    "properties",
    "items",
    "minItems",
    "maxItems",
    "definitions",
    "dependencies",
    "additionalProperties",
    "$ref",
    "$id",
    "$schema",
    "meta",
];

/// `ui:*` directives the editor understands.
pub const SUPPORTED_UI_PARAMETERS: &[&str] = &[
    "ui:order",
    "ui:widget",
    "ui:field",
    "ui:options",
    "ui:column",
    "ui:placeholder",
    "ui:autofocus",
    "ui:autocomplete",
    "items",
    "definitions",
];

/// Primitive property types the editor can display.
pub const SUPPORTED_PROPERTY_TYPES: &[&str] =
    &["string", "number", "integer", "array", "boolean", "null"];

/// Shared `definitions` tables visible while reading or writing one level
/// of a document.
///
/// At the document root these are the `definitions` blocks of the schema
/// and ui schema themselves; nested sections inherit the root tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionTables<'a> {
    /// Schema-side definitions (`schema.definitions`).
    pub schema: Option<&'a Map<String, Value>>,
    /// Ui-side definitions (`uiSchema.definitions`).
    pub ui: Option<&'a Map<String, Value>>,
}

impl<'a> DefinitionTables<'a> {
    /// Tables read from the `definitions` blocks of a document pair.
    pub fn from_documents(schema: &'a Value, uischema: &'a Value) -> Self {
        Self {
            schema: schema.get("definitions").and_then(Value::as_object),
            ui: uischema.get("definitions").and_then(Value::as_object),
        }
    }

    /// No definitions at all.
    pub fn none() -> Self {
        Self::default()
    }
}
