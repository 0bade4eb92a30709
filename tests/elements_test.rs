//! Integration tests for element extraction, re-serialization and editing.

use form_schema_builder::{
    add_card, add_section, build_category_hash, change_category, check_unsupported_features,
    delete_element, extract_elements, move_down, move_up, propagate_definition_changes,
    rename_element, reorder, set_required, standard_registry, update_card, update_schemas,
    CategoryHash, DefinitionTables, EditContext, Element, ElementError, ElementKind, Mods,
    RenameError,
};
use serde_json::{json, Value};

fn hash() -> CategoryHash {
    build_category_hash(&standard_registry()).unwrap()
}

fn extract(schema: &Value, uischema: &Value) -> Vec<Element> {
    extract_elements(
        schema,
        uischema,
        DefinitionTables::from_documents(schema, uischema),
        &hash(),
    )
    .unwrap()
}

fn names(elements: &[Element]) -> Vec<&str> {
    elements.iter().map(|e| e.name.as_str()).collect()
}

fn find<'a>(elements: &'a [Element], name: &str) -> &'a Element {
    elements.iter().find(|e| e.name == name).unwrap()
}

fn three_objects() -> Value {
    json!({
        "type": "object",
        "properties": {
            "obj1": { "type": "string", "title": "One" },
            "obj2": { "type": "number", "title": "Two" },
            "obj3": { "type": "boolean", "title": "Three" }
        }
    })
}

// === Ordering ===

mod ordering {
    use super::*;

    #[test]
    fn ui_order_sets_element_order() {
        let uischema = json!({ "ui:order": ["obj2", "obj3", "obj1"] });
        let elements = extract(&three_objects(), &uischema);
        assert_eq!(names(&elements), ["obj2", "obj3", "obj1"]);
    }

    #[test]
    fn document_order_without_ui_order() {
        let elements = extract(&three_objects(), &json!({}));
        assert_eq!(names(&elements), ["obj1", "obj2", "obj3"]);
    }

    #[test]
    fn wildcard_fills_in_unlisted_names() {
        let uischema = json!({ "ui:order": ["obj3", "*"] });
        let elements = extract(&three_objects(), &uischema);
        assert_eq!(names(&elements), ["obj3", "obj1", "obj2"]);
    }

    #[test]
    fn neighbor_names_cover_every_sibling() {
        let elements = extract(&three_objects(), &json!({}));
        for element in &elements {
            assert_eq!(element.neighbor_names, ["obj1", "obj2", "obj3"]);
        }
    }

    #[test]
    fn write_emits_ui_order_from_element_order() {
        let schema = three_objects();
        let uischema = json!({ "ui:order": ["obj2", "obj3", "obj1"] });
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = move_down(&ctx, 0).unwrap();
        assert_eq!(
            written.ui_schema["ui:order"],
            json!(["obj3", "obj2", "obj1"])
        );
    }
}

// === Category Classification ===

mod classification {
    use super::*;

    fn category_of(property: Value, ui: Value) -> String {
        let schema = json!({
            "type": "object",
            "properties": { "q": property },
            "definitions": { "x": { "type": "string", "title": "X" } }
        });
        let uischema = json!({ "q": ui });
        let elements = extract(&schema, &uischema);
        elements[0].category().unwrap().to_string()
    }

    #[test]
    fn builtin_categories() {
        assert_eq!(category_of(json!({ "type": "string" }), json!({})), "shortAnswer");
        assert_eq!(
            category_of(json!({ "type": "string" }), json!({ "ui:widget": "password" })),
            "password"
        );
        assert_eq!(category_of(json!({ "type": "boolean" }), json!({})), "checkbox");
        assert_eq!(category_of(json!({ "enum": ["a", "b"] }), json!({})), "dropdown");
        assert_eq!(
            category_of(json!({ "enum": ["a", "b"] }), json!({ "ui:widget": "radio" })),
            "radio"
        );
        assert_eq!(category_of(json!({ "$ref": "#/definitions/x" }), json!({})), "ref");
    }

    #[test]
    fn unmatched_card_falls_back_to_short_answer() {
        assert_eq!(
            category_of(json!({ "type": "string" }), json!({ "ui:widget": "color" })),
            "shortAnswer"
        );
    }

    #[test]
    fn object_property_is_a_section() {
        let schema = json!({
            "type": "object",
            "properties": { "inner": { "type": "object", "properties": {} } }
        });
        let elements = extract(&schema, &json!({}));
        assert!(elements[0].is_section());
        assert_eq!(elements[0].category(), None);
    }

    #[test]
    fn custom_inputs_from_mods() {
        let mods = Mods::from_value(json!({
            "customFormInputs": {
                "slug": { "matchIf": [{ "types": ["string"], "widget": "slug" }], "type": "string" }
            }
        }))
        .unwrap();
        let hash = mods.category_hash().unwrap();
        let schema = json!({ "type": "object", "properties": { "q": { "type": "string" } } });
        let uischema = json!({ "q": { "ui:widget": "slug" } });

        let elements =
            extract_elements(&schema, &uischema, DefinitionTables::none(), &hash).unwrap();
        assert_eq!(elements[0].category(), Some("slug"));
    }
}

// === $ref Handling ===

mod references {
    use super::*;

    #[test]
    fn local_fields_override_definition() {
        let schema = json!({
            "type": "object",
            "properties": { "q": { "$ref": "#/definitions/x", "title": "Custom Title" } },
            "definitions": { "x": { "title": "Definition Title", "type": "string" } }
        });
        let elements = extract(&schema, &json!({}));
        let q = &elements[0];
        assert_eq!(q.data()["title"], "Custom Title");
        assert_eq!(q.data()["type"], "string");
        assert_eq!(q.reference.as_deref(), Some("#/definitions/x"));
    }

    #[test]
    fn ref_outside_definitions_is_rejected() {
        let schema = json!({
            "type": "object",
            "properties": { "q": { "$ref": "#/components/x" } }
        });
        let result = extract_elements(&schema, &json!({}), DefinitionTables::none(), &hash());
        assert!(matches!(result, Err(ElementError::InvalidRef { .. })));
    }

    #[test]
    fn missing_definition_keeps_local_fields() {
        let schema = json!({
            "type": "object",
            "properties": { "q": { "$ref": "#/definitions/gone", "title": "Still here" } }
        });
        let elements = extract(&schema, &json!({}));
        assert_eq!(elements[0].data()["title"], "Still here");
        assert_eq!(elements[0].category(), Some("ref"));
    }

    #[test]
    fn nested_definition_path() {
        let schema = json!({
            "type": "object",
            "properties": { "q": { "$ref": "#/definitions/group/inner" } },
            "definitions": { "group": { "inner": { "type": "boolean", "title": "Inner" } } }
        });
        let elements = extract(&schema, &json!({}));
        assert_eq!(elements[0].data()["title"], "Inner");
    }

    #[test]
    fn ref_writes_back_as_reference() {
        let schema = json!({
            "type": "object",
            "properties": {
                "q": { "$ref": "#/definitions/x", "title": "Custom", "description": "Local" }
            },
            "definitions": { "x": { "title": "Definition", "type": "string", "minLength": 2 } }
        });
        let uischema = json!({ "definitions": { "x": { "ui:widget": "textarea" } } });
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = set_required(&ctx, "q", true).unwrap();
        assert_eq!(
            written.schema["properties"]["q"],
            json!({ "$ref": "#/definitions/x", "title": "Custom", "description": "Local" })
        );
        assert_eq!(written.schema["required"], json!(["q"]));
        assert_eq!(written.schema["definitions"], schema["definitions"]);
        assert_eq!(written.ui_schema["q"], json!({ "ui:widget": "textarea" }));
        assert_eq!(written.ui_schema["definitions"], uischema["definitions"]);
    }
}

// === Dependencies ===

mod dependencies {
    use super::*;

    fn conditional_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "parent": { "type": "string", "enum": ["a", "b"] } },
            "dependencies": {
                "parent": {
                    "oneOf": [{
                        "properties": {
                            "parent": { "enum": ["a"] },
                            "child": { "type": "string" }
                        },
                        "required": []
                    }]
                }
            }
        })
    }

    #[test]
    fn extracts_parent_and_child() {
        let elements = extract(&conditional_schema(), &json!({}));
        assert_eq!(names(&elements), ["parent", "child"]);

        let parent = find(&elements, "parent");
        assert_eq!(parent.dependents.len(), 1);
        assert_eq!(parent.dependents[0].value, Some(json!({ "enum": ["a"] })));
        assert_eq!(parent.dependents[0].children, ["child"]);

        let child = find(&elements, "child");
        assert!(child.dependent);
        assert_eq!(child.parent.as_deref(), Some("parent"));
    }

    #[test]
    fn round_trips_one_of_structure() {
        let schema = conditional_schema();
        let uischema = json!({});
        let elements = extract(&schema, &uischema);
        let written = update_schemas(&elements, &schema, &uischema, DefinitionTables::none());

        assert_eq!(written.schema["dependencies"], schema["dependencies"]);
        assert_eq!(written.schema["properties"], schema["properties"]);
        assert!(written.schema["properties"].get("child").is_none());
    }

    #[test]
    fn keyed_properties_form() {
        let schema = json!({
            "type": "object",
            "properties": { "flag": { "type": "boolean" } },
            "dependencies": {
                "flag": { "properties": { "extra": { "type": "string" } }, "required": ["extra"] }
            }
        });
        let elements = extract(&schema, &json!({}));
        let flag = find(&elements, "flag");
        assert_eq!(flag.dependents[0].value, None);
        assert!(find(&elements, "extra").required);

        let written = update_schemas(&elements, &schema, &json!({}), DefinitionTables::none());
        assert_eq!(written.schema["dependencies"], schema["dependencies"]);
        assert!(written.schema.get("required").is_none());
    }

    #[test]
    fn unknown_group_shape_is_skipped() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "dependencies": { "a": ["b"] }
        });
        let elements = extract(&schema, &json!({}));
        assert_eq!(names(&elements), ["a"]);
        assert!(elements[0].dependents.is_empty());
    }

    #[test]
    fn dependent_child_ignores_definition_title() {
        let schema = json!({
            "type": "object",
            "properties": { "parent": { "type": "boolean" } },
            "dependencies": {
                "parent": { "properties": { "child": { "$ref": "#/definitions/x" } } }
            },
            "definitions": { "x": { "title": "Definition Title", "type": "string" } }
        });
        let elements = extract(&schema, &json!({}));
        let child = find(&elements, "child");
        assert!(child.data().get("title").is_none());
        assert_eq!(child.data()["type"], "string");
    }

    #[test]
    fn renaming_parent_rewrites_dependencies() {
        let schema = conditional_schema();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = rename_element(&ctx, "parent", "trigger").unwrap();
        let one_of = &written.schema["dependencies"]["trigger"]["oneOf"][0];
        assert_eq!(one_of["properties"]["trigger"], json!({ "enum": ["a"] }));
        assert!(written.schema["dependencies"].get("parent").is_none());
        assert!(written.schema["properties"].get("trigger").is_some());
    }

    #[test]
    fn deleting_parent_promotes_children() {
        let schema = conditional_schema();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = delete_element(&ctx, 0).unwrap();
        assert_eq!(
            written.schema["properties"],
            json!({ "child": { "type": "string" } })
        );
        assert!(written.schema["dependencies"].get("parent").is_none());

        let elements = extract(&written.schema, &written.ui_schema);
        assert_eq!(names(&elements), ["child"]);
        assert!(!elements[0].dependent);
        assert_eq!(elements[0].parent, None);
    }

    #[test]
    fn child_hidden_by_ui_order_survives_an_edit() {
        let mut schema = conditional_schema();
        schema["properties"]["other"] = json!({ "type": "number" });
        let uischema = json!({ "ui:order": ["parent", "other"] });
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        assert_eq!(names(&ctx.elements().unwrap()), ["parent", "other"]);
        let written = move_down(&ctx, 0).unwrap();

        assert_eq!(written.schema["dependencies"], schema["dependencies"]);
        assert_eq!(
            written.schema["dependencies"]["parent"]["oneOf"][0]["properties"]["child"],
            json!({ "type": "string" })
        );
        assert!(written.schema["properties"].get("child").is_none());
        assert_eq!(written.ui_schema["ui:order"], json!(["other", "parent"]));
    }

    #[test]
    fn parent_hidden_by_ui_order_keeps_its_group() {
        let schema = json!({
            "type": "object",
            "properties": {
                "shown": { "type": "string" },
                "flag": { "type": "boolean" }
            },
            "dependencies": {
                "flag": { "properties": { "extra": { "type": "string" } }, "required": ["extra"] }
            }
        });
        let uischema = json!({ "ui:order": ["shown"] });
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        assert_eq!(names(&ctx.elements().unwrap()), ["shown"]);
        let written = set_required(&ctx, "shown", true).unwrap();

        assert_eq!(written.schema["required"], json!(["shown"]));
        assert_eq!(written.schema["dependencies"], schema["dependencies"]);
        assert_eq!(written.schema["properties"]["flag"], json!({ "type": "boolean" }));
        assert!(written.schema["properties"].get("extra").is_none());
    }
}

// === Editing ===

mod editing {
    use super::*;

    fn numbered_inputs(count: u32) -> Value {
        let properties: serde_json::Map<String, Value> = (1..=count)
            .map(|i| (format!("newInput{}", i), json!({ "type": "string" })))
            .collect();
        json!({ "type": "object", "properties": properties })
    }

    #[test]
    fn add_card_after_ten_inputs_is_eleven() {
        let schema = numbered_inputs(10);
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = add_card(&ctx, None).unwrap();
        assert_eq!(
            written.schema["properties"]["newInput11"],
            json!({ "title": "New Input 11", "type": "string" })
        );
    }

    #[test]
    fn add_card_without_default_names_is_one() {
        let schema = three_objects();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = add_card(&ctx, Some(1)).unwrap();
        assert_eq!(
            written.ui_schema["ui:order"],
            json!(["obj1", "newInput1", "obj2", "obj3"])
        );
    }

    #[test]
    fn add_section_shares_the_counter() {
        let schema = numbered_inputs(2);
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = add_section(&ctx, None).unwrap();
        assert_eq!(
            written.schema["properties"]["newInput3"],
            json!({ "title": "New Section 3", "type": "object" })
        );
    }

    #[test]
    fn new_card_uses_mods_defaults() {
        let schema = three_objects();
        let uischema = json!({});
        let hash = hash();
        let mods = Mods::from_value(json!({
            "newElementDefaultDataOptions": { "title": "Question", "type": "boolean" },
            "newElementDefaultUiSchema": { "ui:autofocus": true }
        }))
        .unwrap();
        let ctx = EditContext::new(&schema, &uischema, &hash).with_mods(&mods);

        let written = add_card(&ctx, None).unwrap();
        assert_eq!(
            written.schema["properties"]["newInput1"],
            json!({ "title": "Question 1", "type": "boolean" })
        );
        assert_eq!(written.ui_schema["newInput1"], json!({ "ui:autofocus": true }));
    }

    #[test]
    fn delete_removes_property_ui_and_required() {
        let mut schema = three_objects();
        schema["required"] = json!(["obj2"]);
        let uischema = json!({ "obj2": { "ui:widget": "updown" }, "ui:order": ["obj2", "obj1", "obj3"] });
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = delete_element(&ctx, 0).unwrap();
        assert!(written.schema["properties"].get("obj2").is_none());
        assert_eq!(written.schema["required"], json!([]));
        assert!(written.ui_schema.get("obj2").is_none());
        assert_eq!(written.ui_schema["ui:order"], json!(["obj1", "obj3"]));
    }

    #[test]
    fn moves_at_boundaries_are_no_ops() {
        let schema = three_objects();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let up = move_up(&ctx, 0).unwrap();
        assert_eq!(up.ui_schema["ui:order"], json!(["obj1", "obj2", "obj3"]));
        let down = move_down(&ctx, 2).unwrap();
        assert_eq!(down.ui_schema["ui:order"], json!(["obj1", "obj2", "obj3"]));
    }

    #[test]
    fn reorder_swaps_two_elements() {
        let schema = three_objects();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = reorder(&ctx, 0, 2).unwrap();
        assert_eq!(written.ui_schema["ui:order"], json!(["obj3", "obj2", "obj1"]));
    }

    #[test]
    fn index_out_of_range() {
        let schema = three_objects();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        assert!(matches!(
            delete_element(&ctx, 3),
            Err(ElementError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn rename_to_sibling_name_is_rejected() {
        let schema = three_objects();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let result = rename_element(&ctx, "obj1", "obj2");
        assert!(matches!(result, Err(RenameError::NameTaken { ref name }) if name == "obj2"));
    }

    #[test]
    fn rename_moves_ui_entry() {
        let schema = three_objects();
        let uischema = json!({ "obj1": { "ui:widget": "textarea" } });
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = rename_element(&ctx, "obj1", "summary").unwrap();
        assert!(written.schema["properties"].get("obj1").is_none());
        assert_eq!(written.schema["properties"]["summary"]["title"], "One");
        assert_eq!(written.ui_schema["summary"], json!({ "ui:widget": "textarea" }));
        assert!(written.ui_schema.get("obj1").is_none());
    }

    #[test]
    fn update_card_reclassifies() {
        let schema = three_objects();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let data = json!({ "type": "string", "title": "One" });
        let ui = json!({ "ui:widget": "password" });
        let written = update_card(
            &ctx,
            "obj1",
            data.as_object().unwrap().clone(),
            ui.as_object().unwrap().clone(),
        )
        .unwrap();
        assert_eq!(written.ui_schema["obj1"], ui);

        let elements = extract(&written.schema, &written.ui_schema);
        assert_eq!(find(&elements, "obj1").category(), Some("password"));
    }

    #[test]
    fn update_card_on_section_fails() {
        let schema = json!({
            "type": "object",
            "properties": { "inner": { "type": "object", "properties": {} } }
        });
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let result = update_card(&ctx, "inner", Default::default(), Default::default());
        assert!(matches!(result, Err(ElementError::NotACard { .. })));
    }

    #[test]
    fn change_category_keeps_title() {
        let schema = three_objects();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = change_category(&ctx, "obj1", "checkbox", &standard_registry()).unwrap();
        assert_eq!(
            written.schema["properties"]["obj1"],
            json!({ "title": "One", "type": "boolean" })
        );
    }

    #[test]
    fn change_category_to_reference_points_at_first_definition() {
        let mut schema = three_objects();
        schema["definitions"] = json!({ "address": { "type": "string" } });
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = change_category(&ctx, "obj1", "ref", &standard_registry()).unwrap();
        assert_eq!(
            written.schema["properties"]["obj1"]["$ref"],
            "#/definitions/address"
        );
    }

    #[test]
    fn change_category_unknown() {
        let schema = three_objects();
        let uischema = json!({});
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let result = change_category(&ctx, "obj1", "hologram", &standard_registry());
        assert!(matches!(result, Err(ElementError::UnknownCategory { .. })));
    }

    #[test]
    fn unowned_keys_survive_edits() {
        let mut schema = three_objects();
        schema["title"] = json!("Survey");
        schema["$schema"] = json!("http://json-schema.org/draft-07/schema#");
        let uischema = json!({ "ui:submitButtonOptions": { "norender": true } });
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        let written = move_down(&ctx, 0).unwrap();
        assert_eq!(written.schema["title"], "Survey");
        assert_eq!(written.schema["$schema"], schema["$schema"]);
        assert_eq!(
            written.ui_schema["ui:submitButtonOptions"],
            json!({ "norender": true })
        );
    }

    #[test]
    fn nested_section_edit_with_parent_definitions() {
        let root = json!({
            "type": "object",
            "properties": {
                "home": {
                    "type": "object",
                    "properties": { "street": { "$ref": "#/definitions/street" } }
                }
            },
            "definitions": { "street": { "type": "string", "title": "Street" } }
        });
        let root_ui = json!({});
        let hash = hash();
        let section = &root["properties"]["home"];
        let section_ui = json!({});
        let ctx = EditContext::new(section, &section_ui, &hash)
            .with_definitions(DefinitionTables::from_documents(&root, &root_ui));

        let elements = ctx.elements().unwrap();
        assert_eq!(elements[0].data()["title"], "Street");
        assert_eq!(elements[0].category(), Some("ref"));
    }
}

// === Definition Propagation ===

mod propagation {
    use super::*;

    #[test]
    fn sections_pick_up_definition_changes() {
        let schema = json!({
            "type": "object",
            "properties": {
                "home": {
                    "type": "object",
                    "title": "Home",
                    "properties": {
                        "addr": { "$ref": "#/definitions/street", "title": "Street" }
                    }
                }
            },
            "definitions": { "street": { "type": "string", "description": "Updated" } }
        });
        let uischema = json!({});

        let written = propagate_definition_changes(&schema, &uischema, &hash()).unwrap();
        let addr = &written.schema["properties"]["home"]["properties"]["addr"];
        assert_eq!(addr["title"], "Street");
        assert_eq!(addr["description"], "Updated");
        assert_eq!(written.schema["properties"]["home"]["title"], "Home");
    }

    #[test]
    fn documents_without_sections_are_unchanged() {
        let schema = three_objects();
        let uischema = json!({ "ui:order": ["obj1", "obj2", "obj3"] });

        let written = propagate_definition_changes(&schema, &uischema, &hash()).unwrap();
        assert_eq!(written.schema, schema);
        assert_eq!(written.ui_schema, uischema);
    }
}

// === Unsupported Features ===

mod unsupported_features {
    use super::*;

    #[test]
    fn reports_ui_key_and_property_parameter() {
        let schema = json!({
            "type": "object",
            "properties": { "obj2": { "type": "number", "badSideProp": "asdf" } }
        });
        let uischema = json!({ "invalidUiProp": "asdf" });

        let findings = check_unsupported_features(&schema, &uischema, &standard_registry());
        assert_eq!(
            findings,
            [
                "Unrecognized UI schema property: invalidUiProp",
                "Property Parameter: badSideProp in obj2",
            ]
        );
    }

    #[test]
    fn custom_widgets_are_recognized() {
        let mods = Mods::from_value(json!({
            "customFormInputs": {
                "slug": { "matchIf": [{ "types": ["string"], "widget": "slug" }], "type": "string" }
            }
        }))
        .unwrap();
        let schema = json!({ "type": "object", "properties": { "q": { "type": "string" } } });
        let uischema = json!({ "q": { "ui:widget": "slug" } });

        assert!(check_unsupported_features(&schema, &uischema, &mods.registry()).is_empty());
        assert_eq!(
            check_unsupported_features(&schema, &uischema, &standard_registry()),
            ["UI Widget: slug for q"]
        );
    }
}

// === Round Trip ===

mod round_trip {
    use super::*;

    #[test]
    fn cards_and_sections_survive_a_write() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "pick": { "enum": ["a", "b"], "title": "Pick" },
                "name": { "type": "string", "title": "Name", "minLength": 1 },
                "address": {
                    "type": "object",
                    "title": "Address",
                    "properties": { "city": { "type": "string" } }
                }
            }
        });
        let uischema = json!({
            "ui:order": ["pick", "name", "address"],
            "pick": { "ui:widget": "radio" },
            "address": { "city": { "ui:autofocus": true } }
        });

        let elements = extract(&schema, &uischema);
        let written = update_schemas(&elements, &schema, &uischema, DefinitionTables::none());
        let again = extract(&written.schema, &written.ui_schema);

        assert_eq!(again, elements);
        assert_eq!(written.schema, schema);
        assert_eq!(written.ui_schema, uischema);
    }

    #[test]
    fn ui_key_colliding_with_data_key_is_escaped() {
        let schema = json!({
            "type": "object",
            "properties": { "q": { "type": "string", "title": "Data title" } }
        });
        let uischema = json!({ "q": { "title": "Ui title" } });

        let elements = extract(&schema, &uischema);
        let ElementKind::Card { ui_options, .. } = &elements[0].kind else {
            panic!("expected a card");
        };
        assert_eq!(ui_options["ui:*title"], "Ui title");

        let written = update_schemas(&elements, &schema, &uischema, DefinitionTables::none());
        assert_eq!(written.ui_schema["q"], json!({ "title": "Ui title" }));
        assert_eq!(written.schema["properties"]["q"]["title"], "Data title");
    }

    #[test]
    fn properties_hidden_by_ui_order_are_kept() {
        let schema = three_objects();
        let uischema = json!({ "ui:order": ["obj1", "obj2"] });
        let hash = hash();
        let ctx = EditContext::new(&schema, &uischema, &hash);

        assert_eq!(names(&ctx.elements().unwrap()), ["obj1", "obj2"]);
        let written = move_down(&ctx, 0).unwrap();
        assert!(written.schema["properties"].get("obj3").is_some());
        assert_eq!(written.ui_schema["ui:order"], json!(["obj2", "obj1"]));
    }
}

// === Properties ===

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn property_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(json!({ "type": "string", "title": "Text" })),
            Just(json!({ "type": "string", "format": "email" })),
            Just(json!({ "type": "number", "minimum": 1 })),
            Just(json!({ "type": "boolean" })),
            Just(json!({ "enum": ["a", "b"] })),
            Just(json!({ "type": "object", "properties": { "x": { "type": "string" } } })),
        ]
    }

    fn document_strategy() -> impl Strategy<Value = (Value, Value)> {
        (
            prop::collection::btree_map("[a-z]{1,6}", (property_strategy(), any::<bool>()), 0..6),
            any::<bool>(),
        )
            .prop_map(|(entries, reversed)| {
                let properties: serde_json::Map<String, Value> = entries
                    .iter()
                    .map(|(name, (property, _))| (name.clone(), property.clone()))
                    .collect();
                let required: Vec<&String> = entries
                    .iter()
                    .filter(|(_, (_, required))| *required)
                    .map(|(name, _)| name)
                    .collect();
                let schema = json!({
                    "type": "object",
                    "properties": properties,
                    "required": required
                });

                let mut order: Vec<&String> = entries.keys().collect();
                if reversed {
                    order.reverse();
                }
                (schema, json!({ "ui:order": order }))
            })
    }

    fn sorted_neighbors(mut elements: Vec<Element>) -> Vec<Element> {
        for element in &mut elements {
            element.neighbor_names.sort();
        }
        elements
    }

    proptest! {
        #[test]
        fn write_then_read_is_identity((schema, uischema) in document_strategy()) {
            let elements = extract(&schema, &uischema);
            let written = update_schemas(&elements, &schema, &uischema, DefinitionTables::none());
            let again = extract(&written.schema, &written.ui_schema);

            prop_assert_eq!(sorted_neighbors(again), sorted_neighbors(elements));
        }

        #[test]
        fn new_card_is_one_past_highest_suffix(
            suffixes in prop::collection::btree_set(1u64..200, 0..8),
            others in prop::collection::btree_set("[a-z]{1,6}", 0..4),
        ) {
            let mut properties = serde_json::Map::new();
            for suffix in &suffixes {
                properties.insert(format!("newInput{}", suffix), json!({ "type": "string" }));
            }
            for name in &others {
                properties.insert(name.clone(), json!({ "type": "boolean" }));
            }
            let schema = json!({ "type": "object", "properties": properties });
            let uischema = json!({});
            let hash = hash();
            let ctx = EditContext::new(&schema, &uischema, &hash);

            let expected = format!("newInput{}", suffixes.iter().max().copied().unwrap_or(0) + 1);
            let written = add_card(&ctx, None).unwrap();
            prop_assert!(written.schema["properties"].get(&expected).is_some());
            let order = written.ui_schema["ui:order"].as_array().unwrap();
            prop_assert_eq!(order.last().unwrap(), &json!(expected));
        }
    }
}
