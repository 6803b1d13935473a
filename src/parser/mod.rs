//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Definition parsing: raw schema documents into the typed model.

/// JSON-schema-node to Rust-type mapping.
pub mod typemap;

/// Declaration-order recovery from raw JSON bytes.
pub mod rawscan;

use crate::model::Action;
use crate::model::ActionParameter;
use crate::model::Definition;
use crate::model::EnumValue;
use crate::model::Link;
use crate::model::Property;
use crate::model::SchemaVersion;
use crate::naming;
use crate::schema::SchemaDocument;
use crate::Error;
use serde_json::Map;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Hand-maintained infrastructure types that are never emitted.
const EXCLUDED_DEFINITIONS: &[&str] = &[
    "Actions",
    "OemActions",
    "Links",
    "Entity",
    "Link",
    "Resource",
    "ReferenceableMember",
    "ResourceCollection",
];

/// Properties supplied by the embedded `Entity` base.
const ENTITY_PROPERTIES: &[&str] = &[
    "Name",
    "Id",
    "Description",
    "@odata.id",
    "@odata.etag",
    "@Message.ExtendedInfo",
];

/// JSON names that never participate in diff-based PATCH.
const EXCLUDE_READ_WRITE: &[&str] = &["Oem", "@odata.context", "@odata.type"];

/// Parse base and versioned schema files, merging definitions with
/// versioned entries overriding base entries of the same name.
///
/// # Errors
///
/// Returns an error when the versioned file cannot be read or parsed.
/// A broken base file only loses the base-only definitions.
pub fn parse_with_base(base_file: &Path, versioned_file: &Path) -> Result<Vec<Definition>, Error> {
    let base_defs = match SchemaDocument::load(base_file) {
        Ok(doc) => parse_schema(&doc).unwrap_or_default(),
        Err(_) => Vec::new(),
    };

    let versioned_doc = SchemaDocument::load(versioned_file)?;
    let versioned = parse_schema(&versioned_doc)?;

    let in_versioned: Vec<&str> = versioned.iter().map(|d| d.original_name.as_str()).collect();
    let mut merged: Vec<Definition> = base_defs
        .into_iter()
        .filter(|d| !in_versioned.contains(&d.original_name.as_str()))
        .collect();
    merged.extend(versioned);
    Ok(merged)
}

/// Parse all definitions of one schema document.
///
/// # Errors
///
/// Returns `NoDefinitions` when the document has no definitions map.
pub fn parse_schema(doc: &SchemaDocument) -> Result<Vec<Definition>, Error> {
    let defs_map = doc.definitions()?;
    let version = SchemaVersion::find_in(doc.stem())
        .map(|v| v.to_string())
        .unwrap_or_default();

    let mut definitions = Vec::new();
    for (def_name, def_value) in defs_map {
        if should_skip_definition(def_name) {
            continue;
        }
        let def_map = match def_value.as_object() {
            Some(m) => m,
            None => continue,
        };

        let mut def = if let Some(enum_values) = def_map.get("enum").and_then(Value::as_array) {
            parse_enum_definition(def_name, def_map, enum_values)
        } else if is_object_definition(def_map) {
            if def_map
                .get("properties")
                .and_then(Value::as_object)
                .map_or(false, is_action_definition)
            {
                continue;
            }
            parse_object_definition(def_name, def_map, doc)
        } else {
            continue;
        };

        def.version = version.clone();
        def.release = doc.release().to_string();
        def.title = doc.title().to_string();
        def.schema_id = doc.schema_id().to_string();
        definitions.push(def);
    }

    Ok(definitions)
}

fn should_skip_definition(name: &str) -> bool {
    EXCLUDED_DEFINITIONS.contains(&name)
}

fn is_object_definition(def_map: &Map<String, Value>) -> bool {
    def_map.get("type").and_then(Value::as_str) == Some("object")
        || def_map.get("properties").is_some()
}

/// Action definitions carry `target` and `title` properties; they are
/// folded into the owning resource, not emitted as types.
fn is_action_definition(props: &Map<String, Value>) -> bool {
    props.contains_key("target") && props.contains_key("title")
}

fn parse_enum_definition(
    name: &str,
    def_map: &Map<String, Value>,
    enum_values: &[Value],
) -> Definition {
    let clean_name = naming::clean_identifier(name);
    let mut def = Definition {
        name: clean_name,
        original_name: name.to_string(),
        is_enum: true,
        description: description_lines(def_map),
        ..Definition::default()
    };

    let mut value_docs: HashMap<&str, &str> = HashMap::new();
    for key in &["enumDescriptions", "enumLongDescriptions"] {
        if let Some(map) = def_map.get(*key).and_then(Value::as_object) {
            for (value, text) in map {
                if let Some(text) = text.as_str() {
                    value_docs.insert(value, text);
                }
            }
        }
    }

    for value in enum_values {
        if let Some(value) = value.as_str() {
            def.enum_values.push(EnumValue {
                name: naming::variant_name(value),
                value: value.to_string(),
                description: value_docs
                    .get(value)
                    .map(|d| naming::wrap_description(d))
                    .unwrap_or_default(),
            });
        }
    }
    def
}

fn parse_object_definition(name: &str, def_map: &Map<String, Value>, doc: &SchemaDocument) -> Definition {
    let clean_name = naming::clean_identifier(name);
    let mut def = Definition {
        name: clean_name,
        original_name: name.to_string(),
        description: description_lines(def_map),
        ..Definition::default()
    };

    let props_map = match def_map.get("properties").and_then(Value::as_object) {
        Some(m) => m,
        None => return def,
    };

    def.is_entity = props_map.contains_key("@odata.id") || props_map.contains_key("@odata.type");

    for (prop_name, prop_value) in props_map {
        if def.is_entity && ENTITY_PROPERTIES.contains(&prop_name.as_str()) {
            continue;
        }
        // Actions and Links are folded in below.
        if prop_name == "Actions" || prop_name == "Links" || prop_name == "OemActions" {
            continue;
        }
        let prop_map = match prop_value.as_object() {
            Some(m) => m,
            None => continue,
        };

        let prop = parse_property(prop_name, prop_map, prop_value);
        if !prop.is_read_only && !EXCLUDE_READ_WRITE.contains(&prop.json_name.as_str()) {
            def.read_write_properties.push(prop.json_name.clone());
        }
        def.properties.push(prop);
    }

    def.properties.sort_by(|a, b| a.name.cmp(&b.name));
    def.read_write_properties.sort();

    if props_map.contains_key("Actions") {
        if let Ok(defs_map) = doc.definitions() {
            if let Some(actions_def) = defs_map.get("Actions").and_then(Value::as_object) {
                def.actions = parse_actions(actions_def, defs_map, &doc.raw);
            }
        }
    }

    if props_map.contains_key("Links") {
        if let Ok(defs_map) = doc.definitions() {
            if let Some(links_def) = defs_map.get("Links").and_then(Value::as_object) {
                def.links = parse_links(links_def);
            }
        }
    }

    def
}

fn parse_property(prop_name: &str, prop_map: &Map<String, Value>, prop_value: &Value) -> Property {
    let mapped = typemap::map_type(prop_name, prop_value);
    let is_link = mapped.name != "String" && typemap::is_link_property(prop_name, prop_value);
    let is_collection = typemap::is_collection_property(prop_value);

    let mut description = description_lines(prop_map);

    let mut version_added = String::new();
    if let Some(revisions) = prop_map.get("Redfish.Revisions").and_then(Value::as_array) {
        if let Some(version) = revisions
            .first()
            .and_then(|r| r.get("Version"))
            .and_then(Value::as_str)
        {
            version_added = naming::dotted_version(version);
        }
    }
    if let Some(version) = prop_map.get("versionAdded").and_then(Value::as_str) {
        version_added = naming::dotted_version(version);
    }
    if !version_added.is_empty() {
        description.push(String::new());
        description.push(format!("Version added: {}", version_added));
    }

    let (is_deprecated, deprecation_msg) = match prop_map.get("deprecated") {
        Some(Value::Bool(flag)) => (*flag, String::new()),
        Some(Value::String(msg)) => (true, msg.clone()),
        _ => (false, String::new()),
    };
    if is_deprecated {
        let version = prop_map
            .get("versionDeprecated")
            .and_then(Value::as_str)
            .map(naming::dotted_version);
        description.push(String::new());
        match version {
            Some(v) => description.push(format!("Deprecated: {}", v)),
            None => description.push("Deprecated".to_string()),
        }
        description.extend(naming::wrap_description(&deprecation_msg));
    }

    let is_private = is_link || is_collection;
    Property {
        name: naming::snake_field_name(prop_name),
        json_name: prop_name.to_string(),
        type_name: mapped.name,
        is_pointer: mapped.is_pointer,
        is_array: mapped.is_array,
        is_read_only: is_read_only(prop_map),
        is_link,
        is_collection,
        is_private,
        version_added,
        is_deprecated,
        description,
    }
}

/// Schemas omit `readonly` to mean read-only; only an explicit
/// `"readonly": false` makes a property writable.
fn is_read_only(prop_map: &Map<String, Value>) -> bool {
    prop_map
        .get("readonly")
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

fn parse_actions(
    actions_def: &Map<String, Value>,
    defs_map: &Map<String, Value>,
    raw: &str,
) -> Vec<Action> {
    let props_map = match actions_def.get("properties").and_then(Value::as_object) {
        Some(m) => m,
        None => return Vec::new(),
    };

    let mut actions = Vec::new();
    for (action_name, action_value) in props_map {
        if action_name.contains("Oem") || !action_name.starts_with('#') {
            continue;
        }

        let mut action = Action {
            json_name: action_name.clone(),
            name: action_name
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_string(),
            ..Action::default()
        };

        let reference = action_value.get("$ref").and_then(Value::as_str);
        let def_name = reference.and_then(|r| r.strip_prefix("#/definitions/"));
        let action_def = def_name
            .and_then(|n| defs_map.get(n))
            .and_then(Value::as_object);
        let action_def = match (def_name, action_def) {
            (Some(_), Some(found)) => found,
            _ => {
                // Upstream bundles occasionally ship dangling action refs.
                debug!(action = %action_name, "skipping action with unresolved definition");
                continue;
            }
        };
        let def_name = def_name.unwrap_or_default();

        action.description = description_lines(action_def);

        if let Some(params_map) = action_def.get("parameters").and_then(Value::as_object) {
            action.parameters = parse_action_parameters(def_name, params_map, raw);
        }

        if let Some(reference) = action_def
            .get("actionResponse")
            .and_then(|r| r.get("$ref"))
            .and_then(Value::as_str)
        {
            action.response_type =
                naming::clean_identifier(reference.rsplit('/').next().unwrap_or_default());
        }

        actions.push(action);
    }

    actions.sort_by(|a, b| a.name.cmp(&b.name));
    actions
}

fn parse_action_parameters(
    action_def_name: &str,
    params_map: &Map<String, Value>,
    raw: &str,
) -> Vec<ActionParameter> {
    // Declared order is semantic; recover it from the raw bytes.
    let path = format!("definitions.{}.parameters", action_def_name);
    let recovered = rawscan::key_order(raw, &path);

    let mut ordinals: HashMap<&str, usize> = HashMap::new();
    for (i, name) in recovered.iter().enumerate() {
        ordinals.insert(name.as_str(), i);
    }
    // Anything the scanner missed is appended in lexical order; the
    // map iteration is already sorted.
    let mut next = recovered.len();
    for name in params_map.keys() {
        ordinals.entry(name.as_str()).or_insert_with(|| {
            let ordinal = next;
            next += 1;
            ordinal
        });
    }

    let mut parameters = Vec::new();
    for (param_name, param_value) in params_map {
        let param_map = match param_value.as_object() {
            Some(m) => m,
            None => continue,
        };

        let mut parameter = ActionParameter {
            name: naming::snake_field_name(param_name),
            original_name: param_name.clone(),
            type_name: "String".to_string(),
            ordinal: ordinals.get(param_name.as_str()).copied().unwrap_or(0),
            required: param_map
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            description: description_lines(param_map),
            ..ActionParameter::default()
        };

        let is_link = typemap::is_link_property(param_name, param_value);
        if param_map.contains_key("type") {
            let mapped = typemap::map_type(param_name, param_value);
            parameter.type_name = if is_link {
                "String".to_string()
            } else {
                mapped.name
            };
            parameter.is_array = mapped.is_array;
        }
        if let Some(reference) = param_map.get("$ref").and_then(Value::as_str) {
            parameter.type_name = if is_link {
                "String".to_string()
            } else {
                typemap::map_ref(reference).name
            };
        }

        parameters.push(parameter);
    }

    parameters.sort_by_key(|p| p.ordinal);
    parameters
}

fn parse_links(links_def: &Map<String, Value>) -> Vec<Link> {
    let props_map = match links_def.get("properties").and_then(Value::as_object) {
        Some(m) => m,
        None => return Vec::new(),
    };

    let mut links = Vec::new();
    for (link_name, link_value) in props_map {
        if link_name.contains("Oem") || link_name.contains("@odata.count") {
            continue;
        }
        let link_map = match link_value.as_object() {
            Some(m) => m,
            None => continue,
        };

        let mut link = Link {
            name: naming::snake_field_name(link_name),
            json_name: link_name.clone(),
            deprecated: link_map.contains_key("deprecated"),
            is_array: link_map.contains_key("items"),
            description: description_lines(link_map),
            ..Link::default()
        };

        if let Some(reference) = link_map.get("$ref").and_then(Value::as_str) {
            link.type_name = link_target_type(reference);
        } else if let Some(any_of) = link_map.get("anyOf").and_then(Value::as_array) {
            for entry in any_of {
                if let Some(reference) = entry.get("$ref").and_then(Value::as_str) {
                    link.type_name = link_target_type(reference);
                    break;
                }
            }
        } else if let Some(reference) = link_map
            .get("items")
            .and_then(|i| i.get("$ref"))
            .and_then(Value::as_str)
        {
            link.type_name = link_target_type(reference);
        }

        if link.type_name.is_empty() {
            // De-pluralize the property name as a last resort.
            let singular = link_name.strip_suffix('s').unwrap_or(link_name);
            link.type_name = naming::clean_identifier(singular);
        }

        links.push(link);
    }

    links.sort_by(|a, b| a.name.cmp(&b.name));
    links
}

/// Target type from a link `$ref`, with generic `Link`/`Links` targets
/// filtered out so the name-based fallback can take over.
fn link_target_type(reference: &str) -> String {
    let type_name = typemap::extract_ref_type(reference);
    if type_name == "Link" || type_name == "Links" || type_name == "idRef" {
        return String::new();
    }
    naming::clean_identifier(&type_name)
}

/// Doc lines for a node, preferring `longDescription`.
fn description_lines(map: &Map<String, Value>) -> Vec<String> {
    let text = map
        .get("longDescription")
        .or_else(|| map.get("description"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    naming::wrap_description(text)
}
