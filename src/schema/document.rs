//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Loading of a JSON Schema file into a generic tree.
//!
//! The raw bytes are kept next to the parsed tree: the generic tree has
//! no key order, and action-parameter order is recovered by re-scanning
//! the bytes later.

use crate::Error;
use serde_json::Map;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// A schema file read fully into memory.
#[derive(Debug)]
pub struct SchemaDocument {
    /// Path the document was read from.
    pub path: PathBuf,
    /// Raw file contents, for declaration-order scanning.
    pub raw: String,
    /// Parsed document tree.
    pub root: Value,
}

impl SchemaDocument {
    /// Read and parse a schema file.
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be read and `Parse` when it is
    /// not valid JSON.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path).map_err(|e| Error::Io(path.to_path_buf(), e))?;
        let root: Value =
            serde_json::from_str(&raw).map_err(|e| Error::Parse(path.to_path_buf(), e))?;
        Ok(Self {
            path: path.to_path_buf(),
            raw,
            root,
        })
    }

    /// The `definitions` map of the document.
    ///
    /// # Errors
    ///
    /// Returns `NoDefinitions` when the document has none.
    pub fn definitions(&self) -> Result<&Map<String, Value>, Error> {
        self.root
            .get("definitions")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::NoDefinitions(self.path.clone()))
    }

    /// Top-level `$id`.
    #[must_use]
    pub fn schema_id(&self) -> &str {
        self.top_str("$id")
    }

    /// Top-level `release`, e.g. `2018.3`.
    #[must_use]
    pub fn release(&self) -> &str {
        self.top_str("release")
    }

    /// Top-level `title`, e.g. `#LogService.v1_2_0.LogService`.
    #[must_use]
    pub fn title(&self) -> &str {
        self.top_str("title")
    }

    /// Top-level `owningEntity`, e.g. `DMTF` or `SNIA`.
    #[must_use]
    pub fn owning_entity(&self) -> &str {
        self.top_str("owningEntity")
    }

    /// Top-level `copyright` notice.
    #[must_use]
    pub fn copyright(&self) -> &str {
        self.top_str("copyright")
    }

    /// Name of the principal definition: the target of the top-level
    /// `$ref` when it points into `#/definitions/`, otherwise the file
    /// stem.
    #[must_use]
    pub fn principal_definition(&self) -> String {
        if let Some(rest) = self
            .root
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix("#/definitions/"))
        {
            return rest.to_string();
        }
        self.stem().to_string()
    }

    /// File stem without the `.json` suffix.
    #[must_use]
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    fn top_str(&self, key: &str) -> &str {
        self.root.get(key).and_then(Value::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::SchemaDocument;
    use std::io::Write as _;

    fn write_doc(dir: &tempfile::TempDir, name: &str, body: &serde_json::Value) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(serde_json::to_string_pretty(body).unwrap().as_bytes())
            .unwrap();
        path
    }

    #[test]
    fn test_load_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(
            &dir,
            "LogService.json",
            &serde_json::json!({
                "$id": "http://redfish.dmtf.org/schemas/v1/LogService.json",
                "$ref": "#/definitions/LogService",
                "release": "2017.1",
                "title": "#LogService.LogService",
                "owningEntity": "DMTF",
                "copyright": "Copyright 2014-2023 DMTF",
                "definitions": { "LogService": { "type": "object" } }
            }),
        );
        let doc = SchemaDocument::load(&path).unwrap();
        assert_eq!(doc.schema_id(), "http://redfish.dmtf.org/schemas/v1/LogService.json");
        assert_eq!(doc.release(), "2017.1");
        assert_eq!(doc.title(), "#LogService.LogService");
        assert_eq!(doc.owning_entity(), "DMTF");
        assert_eq!(doc.principal_definition(), "LogService");
        assert_eq!(doc.stem(), "LogService");
        assert_eq!(doc.definitions().unwrap().len(), 1);
    }

    #[test]
    fn test_principal_definition_from_ref() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(
            &dir,
            "Capacity.json",
            &serde_json::json!({
                "$ref": "#/definitions/CapacitySource",
                "definitions": { "CapacitySource": { "type": "object" } }
            }),
        );
        let doc = SchemaDocument::load(&path).unwrap();
        assert_eq!(doc.principal_definition(), "CapacitySource");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = SchemaDocument::load(std::path::Path::new("/nonexistent/Nope.json")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(..)));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = SchemaDocument::load(&path).unwrap_err();
        assert!(matches!(err, crate::Error::Parse(..)));
    }

    #[test]
    fn test_no_definitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_doc(&dir, "Empty.json", &serde_json::json!({ "title": "x" }));
        let doc = SchemaDocument::load(&path).unwrap();
        assert!(matches!(
            doc.definitions().unwrap_err(),
            crate::Error::NoDefinitions(..)
        ));
    }
}
