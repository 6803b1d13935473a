//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Latest-version resolution for a base schema file.
//!
//! A base `X.json` usually advertises its versioned revisions through
//! an `anyOf` list of `$ref`s on the principal definition. Utility
//! schemas without that list fall back to globbing `X.v*.json` in the
//! same directory. When nothing matches, the base file itself is the
//! right file to parse.

use crate::model::SchemaVersion;
use crate::schema::SchemaDocument;
use crate::Error;
use serde_json::Value;
use std::path::Path;
use std::path::PathBuf;

/// Find the latest-version sibling of `base_file` in `schema_dir`.
///
/// # Errors
///
/// Returns an error when the base file cannot be read or parsed.
/// A missing principal definition is not an error: the base file is a
/// valid outcome for utility schemas.
pub fn resolve_latest_version(base_file: &Path, schema_dir: &Path) -> Result<PathBuf, Error> {
    let doc = SchemaDocument::load(base_file)?;
    let definitions = doc.definitions()?;

    let principal = doc.principal_definition();
    let def = definitions
        .get(&principal)
        .or_else(|| definitions.get(doc.stem()));

    let any_of = def.and_then(|d| d.get("anyOf")).and_then(Value::as_array);
    let any_of = match any_of {
        Some(list) => list,
        None => return resolve_by_glob(doc.stem(), schema_dir, base_file),
    };

    let mut best: Option<(SchemaVersion, PathBuf)> = None;
    for item in any_of {
        let reference = match item.get("$ref").and_then(Value::as_str) {
            Some(r) => r,
            None => continue,
        };
        // The generic idRef entry carries no version.
        if reference.contains("idRef") {
            continue;
        }
        let version = match SchemaVersion::find_in(reference) {
            Some(v) => v,
            None => continue,
        };
        if best.as_ref().map_or(true, |(v, _)| version > *v) {
            // Resolve the referenced file as a sibling of the base.
            let file = reference.split('#').next().unwrap_or(reference);
            let name = file.rsplit('/').next().unwrap_or(file);
            best = Some((version, schema_dir.join(name)));
        }
    }

    match best {
        Some((_, path)) => Ok(path),
        None => Ok(base_file.to_path_buf()),
    }
}

/// Glob `<stem>.v*.json` and keep the maximum parsed version.
fn resolve_by_glob(stem: &str, schema_dir: &Path, base_file: &Path) -> Result<PathBuf, Error> {
    let pattern = schema_dir.join(format!("{}.v*.json", stem));
    let matches = match glob::glob(&pattern.to_string_lossy()) {
        Ok(paths) => paths,
        Err(_) => return Ok(base_file.to_path_buf()),
    };

    let mut best: Option<(SchemaVersion, PathBuf)> = None;
    for entry in matches.flatten() {
        let name = match entry.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        let version = match SchemaVersion::find_in(name) {
            Some(v) => v,
            None => continue,
        };
        if best.as_ref().map_or(true, |(v, _)| version > *v) {
            best = Some((version, entry));
        }
    }

    match best {
        Some((_, path)) => Ok(path),
        None => Ok(base_file.to_path_buf()),
    }
}
