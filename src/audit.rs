//! Unsupported-feature audit.
//!
//! Walks a schema / ui schema pair and reports every keyword, type, widget,
//! field or `ui:options` entry the editor cannot display. Findings are
//! advisory: editing keeps working on documents that produce them.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::category::Registry;
use crate::types::{
    SUPPORTED_PROPERTY_PARAMETERS, SUPPORTED_PROPERTY_TYPES, SUPPORTED_UI_PARAMETERS,
};

/// Widgets, fields and `ui:options` keys contributed by a registry.
#[derive(Debug, Default)]
struct Recognized {
    widgets: HashSet<String>,
    fields: HashSet<String>,
    options: HashSet<String>,
}

impl Recognized {
    fn from_registry(registry: &Registry) -> Self {
        let mut recognized = Recognized::default();
        for (_, input) in registry.iter() {
            for rule in &input.match_if {
                recognized.widgets.extend(rule.widget.clone());
                recognized.fields.extend(rule.field.clone());
            }
            recognized
                .options
                .extend(input.possible_options.iter().cloned());
        }
        recognized
    }
}

/// List human-readable warnings for everything in the documents the editor
/// does not support. Never fails.
pub fn check_unsupported_features(
    schema: &Value,
    uischema: &Value,
    registry: &Registry,
) -> Vec<String> {
    let recognized = Recognized::from_registry(registry);
    let mut findings = Vec::new();

    match schema.as_object() {
        Some(map) if map.get("type").and_then(Value::as_str) == Some("object") => {
            for key in map.keys() {
                if !SUPPORTED_PROPERTY_PARAMETERS.contains(&key.as_str()) {
                    findings.push(format!("Unrecognized Object Property: {}", key));
                }
            }
        }
        _ => findings.push("jsonSchema form is not of type object".to_string()),
    }

    check_level(schema, uischema, &recognized, &mut findings);

    if let Some(definitions) = schema.get("definitions").and_then(Value::as_object) {
        let ui_definitions = uischema.get("definitions");
        for (name, definition) in definitions {
            if definition.get("properties").is_some() {
                let ui = ui_definitions
                    .and_then(|d| d.get(name))
                    .unwrap_or(&Value::Null);
                check_level(definition, ui, &recognized, &mut findings);
            }
        }
    }

    findings
}

/// Check one object level: its ui keys, then each property (recursing into
/// nested objects).
fn check_level(
    schema: &Value,
    uischema: &Value,
    recognized: &Recognized,
    findings: &mut Vec<String>,
) {
    let properties = schema.get("properties").and_then(Value::as_object);
    let dependency_properties = dependency_properties(schema);

    if let Some(ui) = uischema.as_object() {
        for key in ui.keys() {
            let known = SUPPORTED_UI_PARAMETERS.contains(&key.as_str())
                || properties.is_some_and(|p| p.contains_key(key))
                || dependency_properties.iter().any(|(name, _)| *name == key);
            if !known {
                findings.push(format!("Unrecognized UI schema property: {}", key));
            }
        }
    }

    let all_properties = properties
        .into_iter()
        .flat_map(|p| p.iter())
        .chain(dependency_properties.iter().copied());

    for (name, property) in all_properties {
        check_property(name, property, uischema.get(name), recognized, findings);
    }
}

fn check_property(
    name: &str,
    property: &Value,
    ui: Option<&Value>,
    recognized: &Recognized,
    findings: &mut Vec<String>,
) {
    let data_type = property.get("type");
    match data_type {
        Some(Value::String(t)) if t == "object" || SUPPORTED_PROPERTY_TYPES.contains(&t.as_str()) => {}
        Some(Value::String(t)) => findings.push(format!("Unrecognized type: {} in {}", t, name)),
        Some(other) => findings.push(format!("Unrecognized type: {} in {}", other, name)),
        None => {}
    }

    if let Some(map) = property.as_object() {
        for key in map.keys() {
            if !SUPPORTED_PROPERTY_PARAMETERS.contains(&key.as_str()) {
                findings.push(format!("Property Parameter: {} in {}", key, name));
            }
        }
    }

    if data_type.and_then(Value::as_str) == Some("object") {
        check_level(property, ui.unwrap_or(&Value::Null), recognized, findings);
        return;
    }

    let Some(ui) = ui.and_then(Value::as_object) else {
        return;
    };
    check_card_ui(name, ui, recognized, findings);
}

fn check_card_ui(
    name: &str,
    ui: &Map<String, Value>,
    recognized: &Recognized,
    findings: &mut Vec<String>,
) {
    for (key, value) in ui {
        if !SUPPORTED_UI_PARAMETERS.contains(&key.as_str()) {
            findings.push(format!("UI Property: {} for {}", key, name));
        }
        match key.as_str() {
            "ui:widget" => {
                let widget = display(value);
                if !recognized.widgets.contains(&widget) {
                    findings.push(format!("UI Widget: {} for {}", widget, name));
                }
            }
            "ui:field" => {
                let field = display(value);
                if !recognized.fields.contains(&field) {
                    findings.push(format!("UI Field: {} for {}", field, name));
                }
            }
            "ui:options" => {
                for option in value.as_object().into_iter().flat_map(|o| o.keys()) {
                    if !recognized.options.contains(option) {
                        findings.push(format!("UI Property: ui:options.{} for {}", option, name));
                    }
                }
            }
            _ => {}
        }
    }
}

/// Properties introduced by `dependencies`, excluding each group's own parent.
fn dependency_properties(schema: &Value) -> Vec<(&String, &Value)> {
    let mut found = Vec::new();
    let Some(dependencies) = schema.get("dependencies").and_then(Value::as_object) else {
        return found;
    };

    for (parent, group) in dependencies {
        let alternatives: Vec<&Value> = match group.get("oneOf").and_then(Value::as_array) {
            Some(alternatives) => alternatives.iter().collect(),
            None => vec![group],
        };
        for alternative in alternatives {
            let Some(properties) = alternative.get("properties").and_then(Value::as_object) else {
                continue;
            };
            for (name, property) in properties {
                if name != parent && !found.iter().any(|(seen, _)| *seen == name) {
                    found.push((name, property));
                }
            }
        }
    }
    found
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
