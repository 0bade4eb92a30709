//! Built-in input types.
//!
//! Only the data the engine reads is described here: match rules, the
//! defaults a card receives when switched to the category, and the
//! `ui:options` keys the category accepts.

use serde_json::{json, Map, Value};

use crate::category::{FormInput, MatchRule, Registry};

/// Types an enumerated card may carry.
const ENUM_TYPES: &[&str] = &["string", "number", "integer", "array", "boolean", "null"];

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn input(
    display_name: &str,
    data_type: &str,
    match_if: Vec<MatchRule>,
    default_data_schema: Value,
    default_ui_schema: Value,
    possible_options: &[&str],
) -> FormInput {
    FormInput {
        display_name: display_name.to_string(),
        match_if,
        default_data_schema: object(default_data_schema),
        default_ui_schema: object(default_ui_schema),
        data_type: data_type.to_string(),
        possible_options: possible_options.iter().map(|o| o.to_string()).collect(),
    }
}

/// Registry of the input types available without host customisation.
pub fn standard_registry() -> Registry {
    let string = || MatchRule::types(&["string"]);

    Registry::new()
        .with(
            "shortAnswer",
            input(
                "Short answer",
                "string",
                vec![
                    string(),
                    string().format("email"),
                    string().format("hostname"),
                    string().format("uri"),
                    string().format("regex"),
                ],
                json!({}),
                json!({}),
                &["inputType"],
            ),
        )
        .with(
            "password",
            input(
                "Password",
                "string",
                vec![string().widget("password")],
                json!({}),
                json!({ "ui:widget": "password" }),
                &[],
            ),
        )
        .with(
            "longAnswer",
            input(
                "Long answer",
                "string",
                vec![string().widget("textarea")],
                json!({}),
                json!({ "ui:widget": "textarea" }),
                &["rows"],
            ),
        )
        .with(
            "date",
            input(
                "Date",
                "string",
                vec![string().format("date")],
                json!({ "format": "date" }),
                json!({}),
                &["yearsRange", "hideNowButton", "hideClearButton"],
            ),
        )
        .with(
            "time",
            input(
                "Time",
                "string",
                vec![string().format("time")],
                json!({ "format": "time" }),
                json!({}),
                &[],
            ),
        )
        .with(
            "dateTime",
            input(
                "Date-Time",
                "string",
                vec![string().format("date-time")],
                json!({ "format": "date-time" }),
                json!({}),
                &["yearsRange", "hideNowButton", "hideClearButton"],
            ),
        )
        .with(
            "checkbox",
            input(
                "Checkbox",
                "boolean",
                vec![MatchRule::types(&["boolean"])],
                json!({}),
                json!({}),
                &[],
            ),
        )
        .with(
            "number",
            input(
                "Number",
                "number",
                vec![MatchRule::types(&["number"])],
                json!({}),
                json!({}),
                &[],
            ),
        )
        .with(
            "integer",
            input(
                "Integer",
                "integer",
                vec![MatchRule::types(&["integer"])],
                json!({}),
                json!({}),
                &[],
            ),
        )
        .with(
            "dropdown",
            input(
                "Dropdown",
                "string",
                vec![MatchRule::types(ENUM_TYPES).enumerated()],
                json!({ "enum": ["a", "b", "c"] }),
                json!({}),
                &[],
            ),
        )
        .with(
            "radio",
            input(
                "Radio",
                "string",
                vec![MatchRule::types(ENUM_TYPES).widget("radio").enumerated()],
                json!({ "enum": ["a", "b", "c"] }),
                json!({ "ui:widget": "radio" }),
                &["inline"],
            ),
        )
        .with(
            "array",
            input(
                "Array",
                "array",
                vec![MatchRule::types(&["array"])],
                json!({ "items": { "type": "string" } }),
                json!({}),
                &["orderable", "addable", "removable"],
            ),
        )
        .with(
            "multipleChoice",
            input(
                "Multiple choice",
                "array",
                vec![MatchRule::types(&["array"]).widget("checkboxes")],
                json!({
                    "items": { "type": "string", "enum": ["a", "b", "c"] },
                    "uniqueItems": true
                }),
                json!({ "ui:widget": "checkboxes" }),
                &["inline"],
            ),
        )
        .with(
            "ref",
            input(
                "Reference",
                "null",
                vec![MatchRule::types(&["null"]).reference()],
                json!({ "$ref": "" }),
                json!({}),
                &[],
            ),
        )
}
