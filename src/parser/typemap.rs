//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Mapping from JSON Schema property nodes to Rust types.
//!
//! Pure functions over the property node: no I/O, deterministic for a
//! given input. The result is a type path plus nullability and array
//! flags; link and collection detection are derived separately.

use crate::naming::clean_identifier;
use serde_json::Value;

/// Result of mapping a property node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// Rust type path, possibly `common::` qualified.
    pub name: String,
    /// Nullable value; rendered as `Option<T>`.
    pub is_pointer: bool,
    pub is_array: bool,
}

impl MappedType {
    fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_pointer: false,
            is_array: false,
        }
    }

    fn array(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_pointer: false,
            is_array: true,
        }
    }
}

/// Well-known property names with fixed target types.
const COMMON_TYPES: &[(&str, &str)] = &[
    ("Status", "common::Status"),
    ("Identifier", "common::Identifier"),
    ("Location", "common::Location"),
    ("Protocol", "common::Protocol"),
    ("Condition", "common::Condition"),
    ("ElectricalContext", "common::ElectricalContext"),
    ("EventType", "common::EventType"),
    ("Health", "common::Health"),
    ("IndicatorLED", "common::IndicatorLED"),
    ("LogicalContext", "common::LogicalContext"),
    ("OperationType", "common::OperationType"),
    ("PowerState", "common::PowerState"),
    ("PrivilegeType", "common::PrivilegeType"),
    ("Redundancy", "common::Redundancy"),
    ("RedundantGroup", "common::RedundantGroup"),
    ("ResetType", "common::ResetType"),
    ("Schedule", "common::Schedule"),
    ("Oem", "serde_json::Value"),
];

/// Property names that always map to plain strings.
const STRING_NAMES: &[&str] = &["ID", "Id", "Description", "Name", "UUID"];

/// Map a property node to its Rust type.
#[must_use]
pub fn map_type(prop_name: &str, prop: &Value) -> MappedType {
    if let Some((_, target)) = COMMON_TYPES.iter().find(|(n, _)| *n == prop_name) {
        return MappedType::plain(target);
    }

    if STRING_NAMES.contains(&prop_name) {
        return MappedType::plain("String");
    }

    // OData annotations are always carried as strings.
    if prop_name.starts_with("@odata.") {
        return MappedType::plain("String");
    }

    // A lowercase-initial property that is not declared a string and
    // does not mention odata carries a URI; the parser downgrades the
    // storage to a string and generates a typed getter.
    if prop_name
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_lowercase())
        && prop.get("type").and_then(Value::as_str) != Some("string")
        && !prop_name.to_lowercase().contains("odata")
    {
        return MappedType::plain("common::Link");
    }

    if let Some(reference) = prop.get("$ref").and_then(Value::as_str) {
        return map_ref(reference);
    }

    if let Some(items) = prop.get("items") {
        if let Some(reference) = items.get("$ref").and_then(Value::as_str) {
            let mut mapped = map_ref(reference);
            mapped.is_array = true;
            return mapped;
        }
        if let Some(any_of) = items.get("anyOf").and_then(Value::as_array) {
            for entry in any_of {
                if let Some(reference) = entry.get("$ref").and_then(Value::as_str) {
                    let mut mapped = map_ref(reference);
                    mapped.is_array = true;
                    return mapped;
                }
            }
        }
    }

    if let Some(any_of) = prop.get("anyOf").and_then(Value::as_array) {
        for entry in any_of {
            if let Some(reference) = entry.get("$ref").and_then(Value::as_str) {
                return map_ref(reference);
            }
        }
    }

    let (type_str, nullable) = extract_type_and_nullable(prop.get("type"));
    match type_str.as_str() {
        "object" => MappedType::plain(&clean_identifier(prop_name)),
        "integer" => {
            let minimum = prop.get("minimum").and_then(Value::as_f64);
            let name = if minimum.map_or(false, |m| m >= 0.0) {
                "u64"
            } else {
                "i64"
            };
            MappedType {
                name: name.to_string(),
                is_pointer: nullable,
                is_array: false,
            }
        }
        "number" | "numeric" => {
            let name = if prop_name.to_lowercase().ends_with("count") {
                "i64"
            } else {
                "f64"
            };
            MappedType {
                name: name.to_string(),
                is_pointer: nullable,
                is_array: false,
            }
        }
        "boolean" => MappedType {
            name: "bool".to_string(),
            is_pointer: nullable,
            is_array: false,
        },
        "array" => {
            // Arrays with items were handled above; untyped arrays
            // decay to strings.
            match prop.get("items") {
                Some(items) => {
                    let element = map_type(prop_name, items);
                    MappedType {
                        name: element.name,
                        is_pointer: element.is_pointer,
                        is_array: true,
                    }
                }
                None => MappedType::array("String"),
            }
        }
        _ => MappedType {
            name: "String".to_string(),
            is_pointer: nullable,
            is_array: false,
        },
    }
}

/// Map a `$ref` target to a type name.
#[must_use]
pub fn map_ref(reference: &str) -> MappedType {
    let ref_type = extract_ref_type(reference);

    // OData primitive references.
    if reference.contains("odata-v4.json") {
        match ref_type.as_str() {
            "count" => return MappedType::plain("i64"),
            "idRef" => return MappedType::plain("common::Entity"),
            _ => {}
        }
    }

    if STRING_NAMES.contains(&ref_type.as_str()) {
        return MappedType::plain("String");
    }

    if let Some((_, target)) = COMMON_TYPES.iter().find(|(n, _)| *n == ref_type) {
        return MappedType::plain(target);
    }

    MappedType::plain(&clean_identifier(&ref_type))
}

/// Last path segment of a `$ref`, with a `Collection` suffix stripped:
/// collections resolve to the element type.
#[must_use]
pub fn extract_ref_type(reference: &str) -> String {
    let last = reference.rsplit('/').next().unwrap_or(reference);
    match last.strip_suffix("Collection") {
        Some(stripped) => stripped.to_string(),
        None => last.to_string(),
    }
}

/// `type` can be a plain string or `["X", "null"]`.
fn extract_type_and_nullable(type_value: Option<&Value>) -> (String, bool) {
    match type_value {
        Some(Value::String(s)) => (s.clone(), false),
        Some(Value::Array(items)) => {
            let mut nullable = false;
            let mut actual = "string".to_string();
            for item in items {
                match item.as_str() {
                    Some("null") => nullable = true,
                    Some(other) => actual = other.to_string(),
                    None => {}
                }
            }
            (actual, nullable)
        }
        _ => ("string".to_string(), false),
    }
}

/// Description phrases that mark a property as a reference to another
/// resource.
const LINK_PHRASES: &[&str] = &[
    "link to a resource",
    "link to the resource",
    "link to an instance",
    "link to a collection",
    "shall contain a link",
    "shall contain links",
    "an array of links",
];

/// Property names whose values happen to look link-shaped but are not
/// references.
const LINK_DENYLIST: &[&str] = &[
    "Capacity",
    "IOStatistics",
    "PhysicalContext",
    "ProvidedCapacity",
    "ProvidedClassOfService",
    "Manifest",
    "Scheduler",
    "ResolutionStep",
    "MetricReportDefinition",
];

/// Decide whether a property is a link to another resource.
#[must_use]
pub fn is_link_property(prop_name: &str, prop: &Value) -> bool {
    if LINK_DENYLIST.contains(&prop_name) {
        return false;
    }

    if prop_name.ends_with("URI") || prop_name.ends_with("Uri") {
        return true;
    }

    match prop.get("format").and_then(Value::as_str) {
        Some("uri-reference") | Some("uri") => return true,
        _ => {}
    }

    if let Some(reference) = prop.get("$ref").and_then(Value::as_str) {
        if reference.contains("Collection") || reference.contains("idRef") {
            return true;
        }
        if ref_names_standalone_resource(reference) {
            return true;
        }
    }

    if let Some(reference) = prop
        .get("items")
        .and_then(|i| i.get("$ref"))
        .and_then(Value::as_str)
    {
        if ref_names_standalone_resource(reference) {
            return true;
        }
    }

    let description = prop
        .get("longDescription")
        .or_else(|| prop.get("description"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();
    LINK_PHRASES.iter().any(|p| description.contains(p))
}

/// True when the `$ref` points at a schema file whose name matches the
/// referenced definition, i.e. a standalone resource.
fn ref_names_standalone_resource(reference: &str) -> bool {
    let (file_part, fragment) = match reference.split_once('#') {
        Some(pair) => pair,
        None => return false,
    };
    let def_name = match fragment.rsplit('/').next() {
        Some(n) if !n.is_empty() => n,
        _ => return false,
    };
    let file_name = file_part.rsplit('/').next().unwrap_or(file_part);
    let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
    // Drop a version segment: LogService.v1_2_0 -> LogService.
    let stem = stem.split('.').next().unwrap_or(stem);
    !file_part.is_empty() && stem == def_name
}

/// True when the `$ref` names a `*Collection` schema.
#[must_use]
pub fn is_collection_property(prop: &Value) -> bool {
    prop.get("$ref")
        .and_then(Value::as_str)
        .map_or(false, |r| r.contains("Collection"))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_common_type_names() {
        assert_eq!(map_type("Status", &json!({})).name, "common::Status");
        assert_eq!(map_type("Oem", &json!({})).name, "serde_json::Value");
        assert_eq!(map_type("UUID", &json!({})).name, "String");
        assert_eq!(map_type("Description", &json!({})).name, "String");
    }

    #[test]
    fn test_odata_names_are_strings() {
        assert_eq!(map_type("@odata.id", &json!({})).name, "String");
        assert_eq!(map_type("@odata.type", &json!({})).name, "String");
    }

    #[test]
    fn test_lowercase_initial_is_link() {
        let mapped = map_type("target", &json!({ "type": "object" }));
        assert_eq!(mapped.name, "common::Link");
    }

    #[test]
    fn test_odata_primitive_refs() {
        let prop = json!({
            "$ref": "http://redfish.dmtf.org/schemas/v1/odata-v4.json#/definitions/count"
        });
        assert_eq!(map_type("MembersCount", &prop).name, "i64");

        let prop = json!({
            "$ref": "http://redfish.dmtf.org/schemas/v1/odata-v4.json#/definitions/idRef"
        });
        assert_eq!(map_type("ManagedBy", &prop).name, "common::Entity");
    }

    #[test]
    fn test_ref_strips_collection() {
        let prop = json!({
            "$ref": "http://redfish.dmtf.org/schemas/v1/EndpointCollection.json#/definitions/EndpointCollection"
        });
        let mapped = map_type("Endpoints", &prop);
        assert_eq!(mapped.name, "Endpoint");
        assert!(!mapped.is_array);
        assert!(is_collection_property(&prop));
    }

    #[test]
    fn test_items_ref_is_array() {
        let prop = json!({
            "type": "array",
            "items": { "$ref": "#/definitions/ProcessorSummary" }
        });
        let mapped = map_type("Processors", &prop);
        assert_eq!(mapped.name, "ProcessorSummary");
        assert!(mapped.is_array);
    }

    #[test]
    fn test_items_any_of_ref() {
        let prop = json!({
            "type": "array",
            "items": { "anyOf": [
                { "type": "null" },
                { "$ref": "#/definitions/Fan" }
            ]}
        });
        let mapped = map_type("Fans", &prop);
        assert_eq!(mapped.name, "Fan");
        assert!(mapped.is_array);
    }

    #[test]
    fn test_top_level_any_of() {
        let prop = json!({
            "anyOf": [
                { "$ref": "#/definitions/Boot" },
                { "type": "null" }
            ]
        });
        assert_eq!(map_type("Boot", &prop).name, "Boot");
    }

    #[test]
    fn test_scalar_types() {
        assert_eq!(map_type("Model", &json!({ "type": "string" })).name, "String");
        assert_eq!(map_type("Enabled", &json!({ "type": "boolean" })).name, "bool");
        assert_eq!(
            map_type("TotalCores", &json!({ "type": "integer", "minimum": 0 })).name,
            "u64"
        );
        assert_eq!(
            map_type("Offset", &json!({ "type": "integer" })).name,
            "i64"
        );
        assert_eq!(
            map_type("ReadingCelsius", &json!({ "type": "number" })).name,
            "f64"
        );
        assert_eq!(
            map_type("ErrorCount", &json!({ "type": "number" })).name,
            "i64"
        );
    }

    #[test]
    fn test_nullable_union() {
        let mapped = map_type("SpeedMHz", &json!({ "type": ["number", "null"] }));
        assert_eq!(mapped.name, "f64");
        assert!(mapped.is_pointer);
    }

    #[test]
    fn test_object_named_after_property() {
        assert_eq!(
            map_type("TrustedModules", &json!({ "type": "object" })).name,
            "TrustedModules"
        );
    }

    #[test]
    fn test_untyped_array() {
        let mapped = map_type("Values", &json!({ "type": "array" }));
        assert_eq!(mapped.name, "String");
        assert!(mapped.is_array);
    }

    #[test]
    fn test_purity() {
        let prop = json!({ "type": ["integer", "null"], "minimum": 0 });
        assert_eq!(map_type("Slots", &prop), map_type("Slots", &prop));
    }

    #[test]
    fn test_link_by_name_suffix() {
        assert!(is_link_property("SystemURI", &json!({})));
        assert!(is_link_property("HttpBootUri", &json!({})));
    }

    #[test]
    fn test_link_by_format() {
        assert!(is_link_property("Image", &json!({ "format": "uri-reference" })));
    }

    #[test]
    fn test_link_by_ref_shape() {
        assert!(is_link_property(
            "Endpoints",
            &json!({ "$ref": "EndpointCollection.json#/definitions/EndpointCollection" })
        ));
        assert!(is_link_property(
            "ManagedBy",
            &json!({ "$ref": "odata-v4.json#/definitions/idRef" })
        ));
        assert!(is_link_property(
            "Processor",
            &json!({ "$ref": "http://redfish.dmtf.org/schemas/v1/Processor.json#/definitions/Processor" })
        ));
        // Versioned standalone resource references still match.
        assert!(is_link_property(
            "Processor",
            &json!({ "$ref": "Processor.v1_2_0.json#/definitions/Processor" })
        ));
        // A local helper definition is not a standalone resource.
        assert!(!is_link_property(
            "Boot",
            &json!({ "$ref": "#/definitions/Boot" })
        ));
    }

    #[test]
    fn test_link_by_description() {
        assert!(is_link_property(
            "Drive",
            &json!({ "longDescription": "This property shall contain a link to a resource of type Drive." })
        ));
        assert!(!is_link_property(
            "Model",
            &json!({ "longDescription": "The product model number." })
        ));
    }

    #[test]
    fn test_link_denylist() {
        assert!(!is_link_property(
            "Capacity",
            &json!({ "longDescription": "shall contain a link style description" })
        ));
        assert!(!is_link_property(
            "PhysicalContext",
            &json!({ "$ref": "PhysicalContext.json#/definitions/PhysicalContext" })
        ));
    }
}
