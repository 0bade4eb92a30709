//! Form Schema Builder
//!
//! Bidirectional transformation between a JSON Schema / ui schema pair and a
//! flat, ordered list of editable form elements.
//!
//! Every edit re-reads the current level into [`Element`]s, changes the list
//! and writes it back over the original documents, so keywords the editor
//! does not own survive untouched.
//!
//! # Example
//!
//! ```
//! use form_schema_builder::{add_card, build_category_hash, standard_registry, EditContext};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string", "title": "Name" }
//!     }
//! });
//! let uischema = json!({});
//!
//! let hash = build_category_hash(&standard_registry()).unwrap();
//! let ctx = EditContext::new(&schema, &uischema, &hash);
//!
//! let elements = ctx.elements().unwrap();
//! assert_eq!(elements[0].category(), Some("shortAnswer"));
//!
//! let written = add_card(&ctx, None).unwrap();
//! assert!(written.schema["properties"].get("newInput1").is_some());
//! assert_eq!(written.ui_schema["ui:order"], json!(["name", "newInput1"]));
//! ```
//!
//! # Element kinds
//!
//! | Kind | Schema shape | Carries |
//! |------|--------------|---------|
//! | card | any non-object property | data options, ui options, category |
//! | section | `type: object` | nested schema and ui schema |
//!
//! # Categories
//!
//! A card's category is looked up from its `type`, `ui:widget`, `ui:field`,
//! `format`, and whether it has a `$ref` or an `enum`. The lookup table is
//! built from a [`Registry`] of input types that hosts extend through
//! [`Mods`].

mod audit;
mod category;
mod config;
mod element;
mod error;
mod extract;
mod inputs;
mod loader;
mod mutate;
mod serialize;
mod types;

pub use audit::check_unsupported_features;
pub use category::{
    build_category_hash, category_key, classify, CategoryHash, FormInput, MatchRule, Registry,
};
pub use config::Mods;
pub use element::{Dependents, Element, ElementKind};
pub use error::{ElementError, RegistryError, RenameError};
pub use extract::extract_elements;
pub use inputs::standard_registry;
pub use loader::{
    load_document, navigate_definition, parse, stringify, stringify_pretty, write_document,
};
pub use mutate::{
    add_card, add_section, change_category, delete_element, move_down, move_up,
    next_default_index, propagate_definition_changes, rename_element, reorder, set_required,
    update_card, EditContext,
};
pub use serialize::{element_schema, generate_schema, generate_ui_schema, update_schemas, SchemaPair};
pub use types::{
    DefinitionTables, DEFAULT_INPUT_NAME, DEFINITIONS_PREFIX, EDITOR_ONLY_KEYS,
    SUPPORTED_PROPERTY_PARAMETERS, SUPPORTED_PROPERTY_TYPES, SUPPORTED_UI_PARAMETERS,
    UI_ESCAPE_PREFIX,
};
