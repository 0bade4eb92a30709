//! Element extraction - reads a schema level into an ordered element list.
//!
//! Properties are read in document order, `$ref` properties are merged with
//! their definition (local fields win), conditional `dependencies` are
//! flattened into parent/child elements, and the result is reordered by
//! `ui:order`.

use serde_json::{Map, Value};

use crate::category::{classify, CategoryHash};
use crate::element::{Dependents, Element};
use crate::error::ElementError;
use crate::loader::navigate_definition;
use crate::types::{DefinitionTables, DEFINITIONS_PREFIX, UI_ESCAPE_PREFIX};

/// Definition keys never copied onto a dependency child.
const DEPENDENT_SKIPPED_DEFINITION_KEYS: &[&str] = &["title"];

/// Read the elements of one schema level.
///
/// Returns an empty list when the schema has no `properties`.
///
/// # Errors
///
/// Returns `ElementError::InvalidRef` if a property carries a `$ref` that
/// does not point into `#/definitions/`.
pub fn extract_elements(
    schema: &Value,
    uischema: &Value,
    definitions: DefinitionTables<'_>,
    hash: &CategoryHash,
) -> Result<Vec<Element>, ElementError> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let required = string_list(schema.get("required"));
    let mut elements: Vec<Element> = Vec::new();

    for (name, property) in properties {
        let mut element = build_element(
            name,
            property,
            uischema.get(name),
            definitions,
            hash,
            &[],
        )?;
        element.required = required.contains(name);
        upsert(&mut elements, element);
    }

    if let Some(dependencies) = schema.get("dependencies").and_then(Value::as_object) {
        for (parent, group) in dependencies {
            expand_dependency(parent, group, uischema, definitions, hash, &mut elements)?;
        }
    }

    let neighbor_names: Vec<String> = elements.iter().map(|e| e.name.clone()).collect();
    let mut ordered = apply_ui_order(elements, uischema.get("ui:order"));
    for element in &mut ordered {
        element.neighbor_names = neighbor_names.clone();
    }

    tracing::debug!(count = ordered.len(), "extracted elements");
    Ok(ordered)
}

/// Build one element from a property and its ui entry.
///
/// `skipped_definition_keys` are left out when merging a referenced
/// definition underneath the local fields.
fn build_element(
    name: &str,
    property: &Value,
    local_ui: Option<&Value>,
    definitions: DefinitionTables<'_>,
    hash: &CategoryHash,
    skipped_definition_keys: &[&str],
) -> Result<Element, ElementError> {
    let local = property.as_object().cloned().unwrap_or_default();
    let local_ui = local_ui
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let reference = match local.get("$ref") {
        None => None,
        Some(Value::String(reference)) if reference.starts_with(DEFINITIONS_PREFIX) => {
            Some(reference.clone())
        }
        Some(other) => {
            return Err(ElementError::InvalidRef {
                name: name.to_string(),
                reference: other.as_str().map(String::from).unwrap_or_else(|| other.to_string()),
            })
        }
    };

    let (data, ui) = match &reference {
        Some(reference) => {
            let definition = lookup_definition(definitions.schema, reference);
            if definition.is_none() {
                tracing::warn!(element = name, %reference, "referenced definition not found");
            }
            let definition_ui = lookup_definition(definitions.ui, reference);
            (
                merge_under(definition, local, skipped_definition_keys),
                merge_under(definition_ui, local_ui, &[]),
            )
        }
        None => (local, local_ui),
    };

    let is_object = data.get("type").and_then(Value::as_str) == Some("object");
    let mut element = if is_object {
        Element::section(name, data, ui)
    } else {
        let ui = escape_ui_collisions(&data, ui);
        let category = classify(&data, &ui, reference.as_deref(), hash);
        Element::card(name, data, ui, category)
    };
    element.reference = reference;
    Ok(element)
}

fn lookup_definition<'a>(
    table: Option<&'a Map<String, Value>>,
    reference: &str,
) -> Option<&'a Map<String, Value>> {
    table
        .and_then(|table| navigate_definition(table, reference))
        .and_then(Value::as_object)
}

/// Merge `base` underneath `local`: local keys win, `$ref` is dropped from both.
fn merge_under(
    base: Option<&Map<String, Value>>,
    local: Map<String, Value>,
    skipped: &[&str],
) -> Map<String, Value> {
    let mut merged = Map::new();
    if let Some(base) = base {
        for (key, value) in base {
            if key != "$ref" && !skipped.contains(&key.as_str()) {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    for (key, value) in local {
        if key != "$ref" {
            merged.insert(key, value);
        }
    }
    merged
}

/// Prefix ui keys that would clobber a data key of the same name.
fn escape_ui_collisions(data: &Map<String, Value>, ui: Map<String, Value>) -> Map<String, Value> {
    ui.into_iter()
        .map(|(key, value)| {
            if data.contains_key(&key) {
                (format!("{}{}", UI_ESCAPE_PREFIX, key), value)
            } else {
                (key, value)
            }
        })
        .collect()
}

fn expand_dependency(
    parent: &str,
    group: &Value,
    uischema: &Value,
    definitions: DefinitionTables<'_>,
    hash: &CategoryHash,
    elements: &mut Vec<Element>,
) -> Result<(), ElementError> {
    if let Some(alternatives) = group.get("oneOf").and_then(Value::as_array) {
        for alternative in alternatives {
            let properties = alternative.get("properties").and_then(Value::as_object);
            let required = string_list(alternative.get("required"));
            let children = add_dependent_children(
                parent,
                properties,
                &required,
                uischema,
                definitions,
                hash,
                elements,
            )?;
            let value = properties.and_then(|p| p.get(parent)).cloned();

            if let Some(parent_element) = elements.iter_mut().find(|e| e.name == parent) {
                parent_element.dependents.push(Dependents { children, value });
            }
        }
    } else if let Some(properties) = group.get("properties").and_then(Value::as_object) {
        let required = string_list(group.get("required"));
        let children = add_dependent_children(
            parent,
            Some(properties),
            &required,
            uischema,
            definitions,
            hash,
            elements,
        )?;

        if let Some(parent_element) = elements.iter_mut().find(|e| e.name == parent) {
            parent_element.dependents = vec![Dependents {
                children,
                value: None,
            }];
        }
    } else {
        tracing::warn!(parent, "unsupported dependency shape, skipping group");
    }
    Ok(())
}

/// Synthesize the child elements of one dependency alternative and return their names.
fn add_dependent_children(
    parent: &str,
    properties: Option<&Map<String, Value>>,
    required: &[String],
    uischema: &Value,
    definitions: DefinitionTables<'_>,
    hash: &CategoryHash,
    elements: &mut Vec<Element>,
) -> Result<Vec<String>, ElementError> {
    let mut children = Vec::new();
    let Some(properties) = properties else {
        return Ok(children);
    };

    for (child, property) in properties {
        if child == parent {
            continue;
        }
        let mut element = build_element(
            child,
            property,
            uischema.get(child),
            definitions,
            hash,
            DEPENDENT_SKIPPED_DEFINITION_KEYS,
        )?;
        element.required = required.contains(child);
        element.dependent = true;
        element.parent = Some(parent.to_string());
        upsert(elements, element);
        children.push(child.clone());
    }
    Ok(children)
}

/// Insert an element, replacing a same-named one in place.
///
/// Dependency groups already recorded on the replaced element are kept.
fn upsert(elements: &mut Vec<Element>, mut element: Element) {
    match elements.iter_mut().find(|e| e.name == element.name) {
        Some(existing) => {
            if element.dependents.is_empty() {
                element.dependents = std::mem::take(&mut existing.dependents);
            }
            *existing = element;
        }
        None => elements.push(element),
    }
}

/// Reorder elements by `ui:order`.
///
/// A `*` entry expands to every element not named in the order, in document
/// order. Without a `*`, unnamed elements are left out of the list.
fn apply_ui_order(elements: Vec<Element>, order: Option<&Value>) -> Vec<Element> {
    let Some(order) = order.and_then(Value::as_array) else {
        return elements;
    };
    let order: Vec<&str> = order.iter().filter_map(Value::as_str).collect();

    let mut slots: Vec<Option<Element>> = elements.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());

    for entry in &order {
        if *entry == "*" {
            for slot in slots.iter_mut() {
                let unlisted = slot
                    .as_ref()
                    .is_some_and(|e| !order.contains(&e.name.as_str()));
                if unlisted {
                    ordered.extend(slot.take());
                }
            }
        } else if let Some(slot) = slots
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|e| e.name == *entry))
        {
            ordered.extend(slot.take());
        }
    }
    ordered
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
