//! Editing operations.
//!
//! Every operation re-reads the current level into elements, changes the
//! element list in memory and writes it back. Nothing is kept between
//! calls: the caller stores the returned [`SchemaPair`] and passes it in
//! again for the next edit.

use serde_json::{json, Map, Value};

use crate::category::{classify, CategoryHash, Registry};
use crate::config::Mods;
use crate::element::{Element, ElementKind};
use crate::error::{ElementError, RenameError};
use crate::extract::extract_elements;
use crate::serialize::{update_schemas, SchemaPair};
use crate::types::{DefinitionTables, DEFAULT_INPUT_NAME, DEFINITIONS_PREFIX};

/// The level being edited and everything needed to read and write it.
#[derive(Debug, Clone, Copy)]
pub struct EditContext<'a> {
    pub schema: &'a Value,
    pub uischema: &'a Value,
    pub definitions: DefinitionTables<'a>,
    pub category_hash: &'a CategoryHash,
    pub mods: Option<&'a Mods>,
}

impl<'a> EditContext<'a> {
    /// Context for a document root; definitions come from the documents themselves.
    pub fn new(schema: &'a Value, uischema: &'a Value, category_hash: &'a CategoryHash) -> Self {
        Self {
            schema,
            uischema,
            definitions: DefinitionTables::from_documents(schema, uischema),
            category_hash,
            mods: None,
        }
    }

    /// Use the definitions of an enclosing document (for nested sections).
    pub fn with_definitions(mut self, definitions: DefinitionTables<'a>) -> Self {
        self.definitions = definitions;
        self
    }

    pub fn with_mods(mut self, mods: &'a Mods) -> Self {
        self.mods = Some(mods);
        self
    }

    /// Read the current elements of this level.
    pub fn elements(&self) -> Result<Vec<Element>, ElementError> {
        extract_elements(
            self.schema,
            self.uischema,
            self.definitions,
            self.category_hash,
        )
    }

    /// Write an element list back over this level.
    pub fn commit(&self, elements: &[Element]) -> SchemaPair {
        update_schemas(elements, self.schema, self.uischema, self.definitions)
    }
}

/// Number for the next auto-named element: one past the highest
/// `newInput<n>` suffix among `elements`, or 1.
///
/// When the highest suffix is `u64::MAX`, the lowest unused number is taken
/// instead.
pub fn next_default_index(elements: &[Element]) -> u64 {
    let highest = elements
        .iter()
        .filter_map(|e| e.name.strip_prefix(DEFAULT_INPUT_NAME))
        .map(|suffix| {
            let digits: String = suffix.chars().take_while(char::is_ascii_digit).collect();
            digits.parse::<u64>().unwrap_or(0)
        })
        .max()
        .unwrap_or(0);

    highest.checked_add(1).unwrap_or_else(|| {
        (1..u64::MAX)
            .find(|n| {
                let name = format!("{}{}", DEFAULT_INPUT_NAME, n);
                !elements.iter().any(|e| e.name == name)
            })
            .unwrap_or(1)
    })
}

fn new_card(index: u64, ctx: &EditContext<'_>) -> Element {
    let defaults = ctx
        .mods
        .and_then(|m| m.new_element_default_data_options.as_ref());
    let data_options = match defaults {
        Some(defaults) => {
            let mut data = defaults.clone();
            let title = defaults
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("New Input");
            data.insert("title".to_string(), json!(format!("{} {}", title, index)));
            data
        }
        None => object(json!({
            "title": format!("New Input {}", index),
            "type": "string",
            "default": ""
        })),
    };
    let ui_options = ctx
        .mods
        .and_then(|m| m.new_element_default_ui_schema.clone())
        .unwrap_or_default();

    let category = classify(&data_options, &ui_options, None, ctx.category_hash);
    Element::card(
        format!("{}{}", DEFAULT_INPUT_NAME, index),
        data_options,
        ui_options,
        category,
    )
}

fn new_section(index: u64) -> Element {
    Element::section(
        format!("{}{}", DEFAULT_INPUT_NAME, index),
        object(json!({ "title": format!("New Section {}", index), "type": "object" })),
        Map::new(),
    )
}

fn insert_at(elements: &mut Vec<Element>, element: Element, index: Option<usize>) {
    match index {
        Some(index) => elements.insert(index.min(elements.len()), element),
        None => elements.push(element),
    }
}

/// Add a new card at `index` (appended when `None`).
pub fn add_card(ctx: &EditContext<'_>, index: Option<usize>) -> Result<SchemaPair, ElementError> {
    let mut elements = ctx.elements()?;
    let card = new_card(next_default_index(&elements), ctx);
    tracing::debug!(name = %card.name, "adding card");
    insert_at(&mut elements, card, index);
    Ok(ctx.commit(&elements))
}

/// Add a new empty section at `index` (appended when `None`).
pub fn add_section(
    ctx: &EditContext<'_>,
    index: Option<usize>,
) -> Result<SchemaPair, ElementError> {
    let mut elements = ctx.elements()?;
    let section = new_section(next_default_index(&elements));
    tracing::debug!(name = %section.name, "adding section");
    insert_at(&mut elements, section, index);
    Ok(ctx.commit(&elements))
}

fn check_index(elements: &[Element], index: usize) -> Result<(), ElementError> {
    if index < elements.len() {
        Ok(())
    } else {
        Err(ElementError::IndexOutOfRange {
            index,
            len: elements.len(),
        })
    }
}

/// Remove the element at `index`.
///
/// Children of a removed dependency parent become ordinary elements.
pub fn delete_element(ctx: &EditContext<'_>, index: usize) -> Result<SchemaPair, ElementError> {
    let mut elements = ctx.elements()?;
    check_index(&elements, index)?;
    let removed = elements.remove(index);
    for element in &mut elements {
        if element.parent.as_deref() == Some(removed.name.as_str()) {
            element.parent = None;
            element.dependent = false;
        }
    }
    tracing::debug!(name = %removed.name, "deleted element");
    Ok(ctx.commit(&elements))
}

/// Swap the element at `index` with the one before it. No-op on the first element.
pub fn move_up(ctx: &EditContext<'_>, index: usize) -> Result<SchemaPair, ElementError> {
    let mut elements = ctx.elements()?;
    check_index(&elements, index)?;
    if index > 0 {
        elements.swap(index, index - 1);
    }
    Ok(ctx.commit(&elements))
}

/// Swap the element at `index` with the one after it. No-op on the last element.
pub fn move_down(ctx: &EditContext<'_>, index: usize) -> Result<SchemaPair, ElementError> {
    let mut elements = ctx.elements()?;
    check_index(&elements, index)?;
    if index + 1 < elements.len() {
        elements.swap(index, index + 1);
    }
    Ok(ctx.commit(&elements))
}

/// Drag-and-drop: swap the elements at `source` and `destination`.
///
/// This is a pairwise swap, not a move-to-index.
pub fn reorder(
    ctx: &EditContext<'_>,
    source: usize,
    destination: usize,
) -> Result<SchemaPair, ElementError> {
    let mut elements = ctx.elements()?;
    check_index(&elements, source)?;
    check_index(&elements, destination)?;
    elements.swap(source, destination);
    tracing::debug!(source, destination, "reordered elements");
    Ok(ctx.commit(&elements))
}

fn find_mut<'e>(elements: &'e mut [Element], name: &str) -> Result<&'e mut Element, ElementError> {
    elements
        .iter_mut()
        .find(|e| e.name == name)
        .ok_or_else(|| ElementError::UnknownElement {
            name: name.to_string(),
        })
}

/// Rename an element, keeping dependency links pointing at it.
///
/// # Errors
///
/// Returns `RenameError::NameTaken` when a sibling already uses `new_name`;
/// nothing is written in that case.
pub fn rename_element(
    ctx: &EditContext<'_>,
    old_name: &str,
    new_name: &str,
) -> Result<SchemaPair, RenameError> {
    let mut elements = ctx.elements()?;
    let element = find_mut(&mut elements, old_name)?;
    if !element.can_rename_to(new_name) {
        return Err(RenameError::NameTaken {
            name: new_name.to_string(),
        });
    }

    for element in &mut elements {
        if element.name == old_name {
            element.name = new_name.to_string();
        }
        if element.parent.as_deref() == Some(old_name) {
            element.parent = Some(new_name.to_string());
        }
        for group in &mut element.dependents {
            for child in &mut group.children {
                if child == old_name {
                    *child = new_name.to_string();
                }
            }
        }
    }
    tracing::debug!(old_name, new_name, "renamed element");
    Ok(ctx.commit(&elements))
}

/// Replace the data and ui options of a card.
pub fn update_card(
    ctx: &EditContext<'_>,
    name: &str,
    data_options: Map<String, Value>,
    ui_options: Map<String, Value>,
) -> Result<SchemaPair, ElementError> {
    let mut elements = ctx.elements()?;
    let element = find_mut(&mut elements, name)?;
    let reference = element.reference.clone();
    let ElementKind::Card {
        data_options: data,
        ui_options: ui,
        category,
    } = &mut element.kind
    else {
        return Err(ElementError::NotACard {
            name: name.to_string(),
        });
    };
    *category = classify(&data_options, &ui_options, reference.as_deref(), ctx.category_hash);
    *data = data_options;
    *ui = ui_options;
    Ok(ctx.commit(&elements))
}

/// Set whether an element is required.
pub fn set_required(
    ctx: &EditContext<'_>,
    name: &str,
    required: bool,
) -> Result<SchemaPair, ElementError> {
    let mut elements = ctx.elements()?;
    find_mut(&mut elements, name)?.required = required;
    Ok(ctx.commit(&elements))
}

/// Switch a card to another category, resetting it to that category's defaults.
///
/// Name, requiredness and title are kept. Switching to a category whose
/// default data carries a `$ref` points the card at the first definition.
pub fn change_category(
    ctx: &EditContext<'_>,
    name: &str,
    category: &str,
    registry: &Registry,
) -> Result<SchemaPair, ElementError> {
    let input = registry
        .get(category)
        .ok_or_else(|| ElementError::UnknownCategory {
            category: category.to_string(),
        })?;

    let mut elements = ctx.elements()?;
    let element = find_mut(&mut elements, name)?;
    let ElementKind::Card { data_options, .. } = &element.kind else {
        return Err(ElementError::NotACard {
            name: name.to_string(),
        });
    };

    let mut data = input.default_data_schema.clone();
    if !data.contains_key("title") {
        if let Some(title) = data_options.get("title") {
            data.insert("title".to_string(), title.clone());
        }
    }
    if !data.contains_key("type") && !input.data_type.is_empty() && input.data_type != "null" {
        data.insert("type".to_string(), Value::String(input.data_type.clone()));
    }

    element.reference = match data.get("$ref") {
        Some(Value::String(reference)) if reference.starts_with(DEFINITIONS_PREFIX) => {
            Some(reference.clone())
        }
        Some(_) => Some(first_definition_ref(ctx.definitions)),
        None => None,
    };
    let data: Map<String, Value> = data.into_iter().filter(|(k, _)| k != "$ref").collect();

    element.kind = ElementKind::Card {
        data_options: data,
        ui_options: input.default_ui_schema.clone(),
        category: category.to_string(),
    };
    tracing::debug!(name, category, "changed card category");
    Ok(ctx.commit(&elements))
}

fn first_definition_ref(definitions: DefinitionTables<'_>) -> String {
    let first = definitions
        .schema
        .and_then(|table| table.keys().next())
        .map(String::as_str)
        .unwrap_or("empty");
    format!("{}{}", DEFINITIONS_PREFIX, first)
}

/// Re-read and re-write every section of a document so that content taken
/// from `definitions` reflects the current definitions.
///
/// Nested sections are rewritten first.
pub fn propagate_definition_changes(
    schema: &Value,
    uischema: &Value,
    category_hash: &CategoryHash,
) -> Result<SchemaPair, ElementError> {
    let definitions = DefinitionTables::from_documents(schema, uischema);
    propagate_level(schema, uischema, definitions, category_hash)
}

fn propagate_level(
    schema: &Value,
    uischema: &Value,
    definitions: DefinitionTables<'_>,
    category_hash: &CategoryHash,
) -> Result<SchemaPair, ElementError> {
    let mut elements = extract_elements(schema, uischema, definitions, category_hash)?;

    for element in &mut elements {
        if element.reference.is_some() {
            continue;
        }
        let ElementKind::Section {
            schema: section_schema,
            uischema: section_ui,
        } = &mut element.kind
        else {
            continue;
        };
        if !section_schema.contains_key("properties") {
            continue;
        }

        let pair = propagate_level(
            &Value::Object(section_schema.clone()),
            &Value::Object(section_ui.clone()),
            definitions,
            category_hash,
        )?;
        if let (Value::Object(new_schema), Value::Object(new_ui)) = (pair.schema, pair.ui_schema) {
            *section_schema = new_schema;
            *section_ui = new_ui;
        }
    }

    Ok(update_schemas(&elements, schema, uischema, definitions))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
