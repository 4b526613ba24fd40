//! Recursive walk of the declared schema properties.

use serde_json::Value;

use crate::entity::{ArrayItems, Attribute, Entity, EntityGraph};

/// First character uppercased, the rest lowercased ("orderLines" →
/// "Orderlines"). Nested entity names are derived this way, which is why
/// graph lookups are case-insensitive.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Nested single objects keep their name when it already carries an
/// uppercase letter ("Product" stays "Product", "supplier" → "Supplier").
fn nested_entity_name(s: &str) -> String {
    if s.chars().any(|c| c.is_uppercase()) {
        s.to_string()
    } else {
        capitalize(s)
    }
}

/// Extract every entity reachable from the schema root.
///
/// The root is `{properties: {Collection: {...}, ...}}`; a root without a
/// `properties` wrapper is treated as the property map itself. Extraction
/// never raises: non-object nodes are skipped and logged.
pub fn extract(schema: &Value) -> EntityGraph {
    let mut graph = EntityGraph::default();
    let props = schema
        .get("properties")
        .and_then(Value::as_object)
        .or_else(|| schema.as_object());

    let Some(props) = props else {
        tracing::debug!("schema root is not an object; nothing extracted");
        return graph;
    };

    for (name, def) in props {
        extract_entity(name, def, None, &mut graph);
    }
    graph
}

fn extract_entity(name: &str, def: &Value, parent: Option<&str>, graph: &mut EntityGraph) {
    let Some(def) = def.as_object() else {
        tracing::debug!(entity = name, "skipping non-object schema node");
        return;
    };

    let required: Vec<&str> = def
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let is_required = |prop: &str| required.contains(&prop);

    let mut attributes = Vec::new();
    let mut nested_objects: Vec<(&str, &Value)> = Vec::new();

    let props = def
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    for (prop_name, prop_def) in &props {
        let Some(prop_obj) = prop_def.as_object() else {
            tracing::debug!(entity = name, attr = %prop_name, "skipping non-object property");
            continue;
        };
        let declared = prop_obj.get("type").and_then(Value::as_str);

        match declared {
            Some("object") if prop_obj.contains_key("properties") => {
                nested_objects.push((prop_name, prop_def));
                attributes.push(Attribute::Reference {
                    name: prop_name.clone(),
                    target: prop_name.clone(),
                    required: is_required(prop_name),
                });
            }
            Some("object") => {
                attributes.push(Attribute::InlineObject {
                    name: prop_name.clone(),
                    required: is_required(prop_name),
                });
            }
            Some("array") => {
                let items = prop_obj.get("items");
                let item_props = items
                    .and_then(|i| i.get("properties"))
                    .and_then(Value::as_object);

                let is_object_array = item_props.is_some_and(|p| !p.is_empty());
                if is_object_array {
                    attributes.push(Attribute::Array {
                        name: prop_name.clone(),
                        items: ArrayItems::Objects,
                        required: is_required(prop_name),
                    });
                    // Arrays of objects spawn a nested entity named from the
                    // singular-capitalized attribute name.
                    extract_entity(
                        &capitalize(prop_name),
                        items.unwrap_or(&Value::Null),
                        Some(name),
                        graph,
                    );
                } else {
                    let declared_item = items
                        .and_then(|i| i.get("type"))
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    attributes.push(Attribute::Array {
                        name: prop_name.clone(),
                        items: ArrayItems::Primitive {
                            declared: declared_item,
                        },
                        required: is_required(prop_name),
                    });
                }
            }
            _ => {
                attributes.push(Attribute::Primitive {
                    name: prop_name.clone(),
                    declared: declared.map(str::to_string),
                    required: is_required(prop_name),
                });
            }
        }
    }

    graph.insert(Entity {
        name: name.to_string(),
        parent: parent.map(str::to_string),
        attributes,
    });

    for (nested_name, nested_def) in nested_objects {
        extract_entity(&nested_entity_name(nested_name), nested_def, Some(name), graph);
    }
}
