//! Element re-serialization - writes an element list back into a schema
//! and ui schema.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::element::{Dependents, Element, ElementKind};
use crate::types::{DefinitionTables, EDITOR_ONLY_KEYS, SECTION_CATEGORY, UI_ESCAPE_PREFIX};

/// A schema / ui schema pair produced by a write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaPair {
    pub schema: Value,
    pub ui_schema: Value,
}

/// Build `properties`, `dependencies` and `required` from an element list.
///
/// Elements listed as a child of some dependency group only appear nested
/// under `dependencies`, and their requiredness is expressed there.
pub fn generate_schema(elements: &[Element]) -> Map<String, Value> {
    let by_name: HashMap<&str, &Element> =
        elements.iter().map(|e| (e.name.as_str(), e)).collect();
    let dependent_names: HashSet<&str> = elements
        .iter()
        .flat_map(|e| e.dependents.iter())
        .flat_map(|d| d.children.iter())
        .map(String::as_str)
        .collect();

    let mut properties = Map::new();
    let mut dependencies = Map::new();

    for element in elements {
        if let Some(first) = element.dependents.first() {
            let group = if first.value.as_ref().is_some_and(is_truthy) {
                let alternatives: Vec<Value> = element
                    .dependents
                    .iter()
                    .map(|possibility| value_alternative(&element.name, possibility, &by_name))
                    .collect();
                json!({ "oneOf": alternatives })
            } else {
                let (children, required) = children_schema(&first.children, &by_name);
                json!({ "properties": children, "required": required })
            };
            dependencies.insert(element.name.clone(), group);
        }

        if !dependent_names.contains(element.name.as_str()) {
            properties.insert(element.name.clone(), element_schema(element));
        }
    }

    let required: Vec<Value> = elements
        .iter()
        .filter(|e| e.required && !e.dependent)
        .map(|e| Value::String(e.name.clone()))
        .collect();

    let mut schema = Map::new();
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("dependencies".to_string(), Value::Object(dependencies));
    schema.insert("required".to_string(), Value::Array(required));
    schema
}

/// One `oneOf` alternative: the parent's triggering value plus its children.
fn value_alternative(
    parent: &str,
    possibility: &Dependents,
    by_name: &HashMap<&str, &Element>,
) -> Value {
    let (children, required) = children_schema(&possibility.children, by_name);
    let mut properties = Map::new();
    if let Some(value) = &possibility.value {
        properties.insert(parent.to_string(), value.clone());
    }
    properties.extend(children);
    json!({ "properties": properties, "required": required })
}

fn children_schema(
    children: &[String],
    by_name: &HashMap<&str, &Element>,
) -> (Map<String, Value>, Vec<Value>) {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for child in children {
        // Children removed from the list since extraction are skipped.
        let Some(element) = by_name.get(child.as_str()) else {
            continue;
        };
        properties.insert(child.clone(), element_schema(element));
        if element.required {
            required.push(Value::String(child.clone()));
        }
    }
    (properties, required)
}

/// Schema fragment for a single element.
pub fn element_schema(element: &Element) -> Value {
    if let Some(reference) = &element.reference {
        let data = element.data();
        let mut fragment = Map::new();
        fragment.insert("$ref".to_string(), Value::String(reference.clone()));
        for key in ["title", "description"] {
            if let Some(value) = data.get(key) {
                fragment.insert(key.to_string(), value.clone());
            }
        }
        if let ElementKind::Section { schema, .. } = &element.kind {
            if let Some(required) = schema.get("required").filter(|r| is_non_empty_array(r)) {
                fragment.insert("required".to_string(), required.clone());
            }
        }
        return Value::Object(fragment);
    }

    match &element.kind {
        ElementKind::Card { category, .. } if category == SECTION_CATEGORY => {
            json!({ "type": "object" })
        }
        ElementKind::Card { data_options, .. } => Value::Object(
            data_options
                .iter()
                .filter(|(key, value)| {
                    !EDITOR_ONLY_KEYS.contains(&key.as_str()) && value.as_str() != Some("")
                })
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        ElementKind::Section { schema, .. } => Value::Object(schema.clone()),
    }
}

/// Build the ui schema entries and `ui:order` from an element list.
///
/// A `$ref` element starts from the same-named entry of `definition_ui`;
/// card ui options are layered on top with the collision escape prefix
/// removed.
pub fn generate_ui_schema(
    elements: &[Element],
    definition_ui: Option<&Map<String, Value>>,
) -> Map<String, Value> {
    let mut uischema = Map::new();
    let mut order = Vec::with_capacity(elements.len());

    for element in elements {
        order.push(Value::String(element.name.clone()));

        if element.reference.is_some() {
            if let Some(ui) = definition_ui.and_then(|table| table.get(&element.name)) {
                uischema.insert(element.name.clone(), ui.clone());
            }
        }

        match &element.kind {
            ElementKind::Card { ui_options, .. } if !ui_options.is_empty() => {
                let entry = uischema
                    .entry(element.name.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Some(entry) = entry.as_object_mut() {
                    for (key, value) in ui_options {
                        let key = key.strip_prefix(UI_ESCAPE_PREFIX).unwrap_or(key);
                        entry.insert(key.to_string(), value.clone());
                    }
                }
            }
            ElementKind::Section { uischema: ui, .. } if !ui.is_empty() => {
                uischema.insert(element.name.clone(), Value::Object(ui.clone()));
            }
            _ => {}
        }
    }

    uischema.insert("ui:order".to_string(), Value::Array(order));
    uischema
}

/// Write an element list back over the schema level it was read from.
///
/// Keys of `schema` and `uischema` the element list does not own are kept
/// as they were. The schema's `type` is always forced to `object`, and the
/// ui schema's `definitions` block is carried over verbatim.
pub fn update_schemas(
    elements: &[Element],
    schema: &Value,
    uischema: &Value,
    definitions: DefinitionTables<'_>,
) -> SchemaPair {
    let base_schema = schema.as_object().cloned().unwrap_or_default();
    let base_ui = uischema.as_object().cloned().unwrap_or_default();

    let mut generated = generate_schema(elements);
    let hidden = hidden_names(schema, uischema, elements);
    if !hidden.is_empty() {
        keep_hidden(&mut generated, &hidden, schema, elements);
    }

    let mut new_schema = overlay_schema(&base_schema, generated);
    new_schema.insert("type".to_string(), Value::String("object".to_string()));

    let mut owned = owned_names(schema, elements);
    owned.retain(|name| !hidden.contains(name));
    let mut new_ui = overlay_ui(&base_ui, generate_ui_schema(elements, definitions.ui), &owned);
    if let Some(ui_definitions) = base_ui.get("definitions") {
        new_ui.insert("definitions".to_string(), ui_definitions.clone());
    }

    SchemaPair {
        schema: Value::Object(new_schema),
        ui_schema: Value::Object(new_ui),
    }
}

/// Names left out of a `ui:order` that has no `*`: top-level properties and
/// dependency children that were never read as elements. They stay in the
/// document.
fn hidden_names(schema: &Value, uischema: &Value, elements: &[Element]) -> HashSet<String> {
    let Some(order) = uischema.get("ui:order").and_then(Value::as_array) else {
        return HashSet::new();
    };
    if order.iter().any(|entry| entry == "*") {
        return HashSet::new();
    }

    owned_names(schema, &[])
        .into_iter()
        .filter(|name| {
            !order.iter().any(|entry| entry.as_str() == Some(name.as_str()))
                && !elements.iter().any(|e| e.name == *name)
        })
        .collect()
}

/// Carry hidden properties, their `required` entries and their dependency
/// groups over from the original schema, and put hidden dependency children
/// back under their visible parents.
fn keep_hidden(
    generated: &mut Map<String, Value>,
    hidden: &HashSet<String>,
    schema: &Value,
    elements: &[Element],
) {
    let by_name: HashMap<&str, &Element> =
        elements.iter().map(|e| (e.name.as_str(), e)).collect();
    let mut nested_children = HashSet::new();

    if let (Some(Value::Object(dependencies)), Some(original)) = (
        generated.get_mut("dependencies"),
        schema.get("dependencies").and_then(Value::as_object),
    ) {
        for (parent, group) in original {
            if hidden.contains(parent) {
                let group = refresh_group(parent, group, &by_name, &mut nested_children);
                dependencies.insert(parent.clone(), group);
            }
        }
        for element in elements {
            if let Some(group) = dependencies.get_mut(&element.name) {
                restore_hidden_children(group, element, original, hidden);
            }
        }
    }

    if let (Some(Value::Object(properties)), Some(original)) = (
        generated.get_mut("properties"),
        schema.get("properties").and_then(Value::as_object),
    ) {
        let mut kept: Map<String, Value> = std::mem::take(properties)
            .into_iter()
            .filter(|(name, _)| !nested_children.contains(name))
            .collect();
        for (name, property) in original {
            if hidden.contains(name) {
                kept.insert(name.clone(), property.clone());
            }
        }
        *properties = kept;
    }

    let previously_required = schema
        .get("required")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    if let Some(Value::Array(required)) = generated.get_mut("required") {
        for name in previously_required {
            let is_hidden = name.as_str().is_some_and(|n| hidden.contains(n));
            if is_hidden && !required.contains(&name) {
                required.push(name);
            }
        }
    }
}

/// The original group of a hidden parent, with children that are still
/// elements rewritten from those elements. Their names are added to `nested`.
fn refresh_group(
    parent: &str,
    group: &Value,
    by_name: &HashMap<&str, &Element>,
    nested: &mut HashSet<String>,
) -> Value {
    let mut group = group.clone();
    for alternative in alternatives_mut(&mut group) {
        let mut updates = Vec::new();
        if let Some(Value::Object(properties)) = alternative.get_mut("properties") {
            for (child, property) in properties.iter_mut() {
                if child == parent {
                    continue;
                }
                if let Some(element) = by_name.get(child.as_str()) {
                    *property = element_schema(element);
                    updates.push((child.clone(), element.required));
                    nested.insert(child.clone());
                }
            }
        }
        for (child, required) in updates {
            mark_required(alternative, &child, required);
        }
    }
    group
}

/// Put children hidden by `ui:order` back into the regenerated group of a
/// visible parent, with their original schema and requiredness.
fn restore_hidden_children(
    group: &mut Value,
    element: &Element,
    original: &Map<String, Value>,
    hidden: &HashSet<String>,
) {
    let mut targets = alternatives_mut(group);
    for (index, possibility) in element.dependents.iter().enumerate() {
        let Some(target) = targets.get_mut(index) else {
            continue;
        };
        for child in possibility.children.iter().filter(|c| hidden.contains(*c)) {
            let Some((property, required)) = original_child(original, &element.name, index, child)
            else {
                continue;
            };
            if let Value::Object(properties) = target
                .entry("properties")
                .or_insert_with(|| Value::Object(Map::new()))
            {
                properties.insert(child.clone(), property.clone());
            }
            if required {
                mark_required(target, child, true);
            }
        }
    }
}

/// Schema and requiredness of `child` in the original dependencies: the
/// same alternative of the same parent if present, else any alternative
/// listing it.
fn original_child<'s>(
    original: &'s Map<String, Value>,
    parent: &str,
    index: usize,
    child: &str,
) -> Option<(&'s Value, bool)> {
    let lookup = |alternative: &'s Map<String, Value>| {
        let property = alternative.get("properties")?.get(child)?;
        let required = alternative
            .get("required")
            .and_then(Value::as_array)
            .is_some_and(|r| r.iter().any(|v| v == child));
        Some((property, required))
    };

    original
        .get(parent)
        .and_then(|group| alternatives(group).get(index).copied())
        .and_then(lookup)
        .or_else(|| {
            original
                .iter()
                .filter(|(key, _)| key.as_str() != child)
                .flat_map(|(_, group)| alternatives(group))
                .find_map(lookup)
        })
}

fn mark_required(alternative: &mut Map<String, Value>, name: &str, required: bool) {
    let present = alternative
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(|r| r.iter().any(|v| v == name));
    if required == present {
        return;
    }
    if required {
        if let Value::Array(list) = alternative
            .entry("required")
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            list.push(Value::String(name.to_string()));
        }
    } else if let Some(Value::Array(list)) = alternative.get_mut("required") {
        list.retain(|v| v != name);
    }
}

/// The alternatives of a dependency group: each `oneOf` entry, or the group
/// itself in the keyed form.
fn alternatives(group: &Value) -> Vec<&Map<String, Value>> {
    match group.get("oneOf").and_then(Value::as_array) {
        Some(entries) => entries.iter().filter_map(Value::as_object).collect(),
        None => group.as_object().into_iter().collect(),
    }
}

fn alternatives_mut(group: &mut Value) -> Vec<&mut Map<String, Value>> {
    if group.get("oneOf").is_some_and(Value::is_array) {
        match group.get_mut("oneOf") {
            Some(Value::Array(entries)) => entries.iter_mut().filter_map(Value::as_object_mut).collect(),
            _ => Vec::new(),
        }
    } else {
        group.as_object_mut().into_iter().collect()
    }
}

/// Replace the generated keys in place. Empty `required` / `dependencies`
/// are only written when the original schema had them.
fn overlay_schema(base: &Map<String, Value>, generated: Map<String, Value>) -> Map<String, Value> {
    let mut result = base.clone();
    for (key, value) in generated {
        let optional = matches!(key.as_str(), "required" | "dependencies");
        if optional && is_empty_container(&value) && !base.contains_key(&key) {
            continue;
        }
        result.insert(key, value);
    }
    result
}

/// Ui entries for names this level owns are replaced by the generated ones;
/// everything else in the base ui schema is left untouched.
fn overlay_ui(
    base: &Map<String, Value>,
    generated: Map<String, Value>,
    owned: &HashSet<String>,
) -> Map<String, Value> {
    let mut result = Map::new();
    for (key, value) in base {
        if let Some(fresh) = generated.get(key) {
            result.insert(key.clone(), fresh.clone());
        } else if !owned.contains(key) {
            result.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in generated {
        if !result.contains_key(&key) {
            result.insert(key, value);
        }
    }
    result
}

/// Property names of the pre-edit schema level plus the current element names.
fn owned_names(schema: &Value, elements: &[Element]) -> HashSet<String> {
    let mut owned: HashSet<String> = elements.iter().map(|e| e.name.clone()).collect();
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        owned.extend(properties.keys().cloned());
    }
    if let Some(dependencies) = schema.get("dependencies").and_then(Value::as_object) {
        for group in dependencies.values() {
            for alternative in alternatives(group) {
                if let Some(properties) = alternative.get("properties").and_then(Value::as_object) {
                    owned.extend(properties.keys().cloned());
                }
            }
        }
    }
    owned
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_non_empty_array(value: &Value) -> bool {
    value.as_array().is_some_and(|a| !a.is_empty())
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
