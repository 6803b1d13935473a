//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Redfish vs Swordfish origin detection and the conflict table.
//!
//! A handful of schema names exist in both bundles. For an identity
//! duplicate the Swordfish copy is skipped outright; for a genuinely
//! different type the Swordfish type is renamed with an `SF` prefix.
//! Redfish-origin schemas never trigger either action.

use crate::schema::SchemaDocument;

/// Which bundle a schema document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOrigin {
    Redfish,
    Swordfish,
}

/// Resolution for a schema name published by both bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
    /// Both bundles publish the same SNIA schema; drop the Swordfish
    /// copy.
    SkipSwordfish,
    /// The types differ; emit the Swordfish one as `SF<Name>`.
    PrefixSwordfish,
}

/// Names shared between the Redfish and Swordfish bundles.
const SCHEMA_CONFLICTS: &[(&str, ConflictAction)] = &[
    ("EndpointGroup", ConflictAction::SkipSwordfish),
    ("Volume", ConflictAction::SkipSwordfish),
    ("Schedule", ConflictAction::PrefixSwordfish),
];

/// Look up the conflict action for a schema name.
#[must_use]
pub fn conflict_action(name: &str) -> Option<ConflictAction> {
    SCHEMA_CONFLICTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, action)| *action)
}

/// Classify a document by `owningEntity`, `$id`, and `copyright`.
///
/// Anything not recognizably SNIA is treated as Redfish.
#[must_use]
pub fn determine_origin(doc: &SchemaDocument) -> SchemaOrigin {
    if doc.owning_entity() == "SNIA" {
        return SchemaOrigin::Swordfish;
    }
    if doc.schema_id().contains("swordfish") {
        return SchemaOrigin::Swordfish;
    }
    if doc.copyright().to_lowercase().contains("snia") {
        return SchemaOrigin::Swordfish;
    }
    SchemaOrigin::Redfish
}

/// True when the Swordfish copy of `name` must be dropped.
#[must_use]
pub fn skip_schema(name: &str, origin: SchemaOrigin) -> bool {
    origin == SchemaOrigin::Swordfish
        && conflict_action(name) == Some(ConflictAction::SkipSwordfish)
}

/// True when the types of `name` must be emitted with an `SF` prefix.
#[must_use]
pub fn needs_sf_prefix(name: &str, origin: SchemaOrigin) -> bool {
    origin == SchemaOrigin::Swordfish
        && conflict_action(name) == Some(ConflictAction::PrefixSwordfish)
}

#[cfg(test)]
mod test {
    use super::*;

    fn doc(body: serde_json::Value) -> SchemaDocument {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("X.json");
        std::fs::write(&path, serde_json::to_string(&body).unwrap()).unwrap();
        SchemaDocument::load(&path).unwrap()
    }

    #[test]
    fn test_origin_from_owning_entity() {
        let d = doc(serde_json::json!({ "owningEntity": "SNIA", "definitions": {} }));
        assert_eq!(determine_origin(&d), SchemaOrigin::Swordfish);
        let d = doc(serde_json::json!({ "owningEntity": "DMTF", "definitions": {} }));
        assert_eq!(determine_origin(&d), SchemaOrigin::Redfish);
    }

    #[test]
    fn test_origin_from_id() {
        let d = doc(serde_json::json!({
            "$id": "http://redfish.dmtf.org/schemas/swordfish/v1/Volume.json",
            "definitions": {}
        }));
        assert_eq!(determine_origin(&d), SchemaOrigin::Swordfish);
    }

    #[test]
    fn test_origin_from_copyright() {
        let d = doc(serde_json::json!({
            "copyright": "Copyright 2016-2023 SNIA. All rights reserved.",
            "definitions": {}
        }));
        assert_eq!(determine_origin(&d), SchemaOrigin::Swordfish);
    }

    #[test]
    fn test_origin_default_redfish() {
        let d = doc(serde_json::json!({ "definitions": {} }));
        assert_eq!(determine_origin(&d), SchemaOrigin::Redfish);
    }

    #[test]
    fn test_conflict_actions() {
        assert!(skip_schema("EndpointGroup", SchemaOrigin::Swordfish));
        assert!(skip_schema("Volume", SchemaOrigin::Swordfish));
        assert!(!skip_schema("EndpointGroup", SchemaOrigin::Redfish));
        assert!(needs_sf_prefix("Schedule", SchemaOrigin::Swordfish));
        assert!(!needs_sf_prefix("Schedule", SchemaOrigin::Redfish));
        assert!(!needs_sf_prefix("Volume", SchemaOrigin::Swordfish));
        assert_eq!(conflict_action("ComputerSystem"), None);
    }
}
