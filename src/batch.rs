//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Batch orchestration over whole schema bundles.
//!
//! Discovery walks each schema directory for base (unversioned) files,
//! then every schema runs the full pipeline independently: origin and
//! conflict checks, version resolution, parsing, generation, and the
//! output write. A failing schema is logged and counted, never fatal;
//! single-object mode is the exception and propagates its error.

use crate::generator;
use crate::generator::GenerateOptions;
use crate::model::Package;
use crate::naming;
use crate::parser;
use crate::schema;
use crate::schema::SchemaDocument;
use crate::Error;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::thread;
use tracing::debug;
use tracing::error;
use tracing::info;

/// Worker count for the default parallel run.
const WORKER_COUNT: usize = 8;

/// Hand-maintained or structural schemas that are never generated.
const EXCLUDED_FILES: &[&str] = &["redfish-schema.json", "Protocol.json"];

/// Orchestrator settings from the command line.
#[derive(Debug, Default, Clone)]
pub struct BatchOptions {
    /// Schema directories to read.
    pub schema_dirs: Vec<PathBuf>,
    /// Output root; packages become subdirectories.
    pub output_dir: PathBuf,
    /// Process schemas one at a time.
    pub sequential: bool,
}

/// Counts reported after a batch run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Summary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Outcome of one schema's pipeline.
#[derive(Debug)]
enum Outcome {
    /// Generated into the named module file.
    Generated(String),
    /// Dropped by the conflict table.
    Skipped,
}

/// Generate every discovered schema.
///
/// # Errors
///
/// Returns an error when a schema directory cannot be read or the
/// output directory cannot be prepared; per-schema failures are logged
/// and counted.
pub fn run(options: &BatchOptions) -> Result<Summary, Error> {
    let work = discover(&options.schema_dirs)?;
    info!(schemas = work.len(), "discovered base schema files");

    let schemas_dir = options.output_dir.join("schemas");
    fs::create_dir_all(&schemas_dir)
        .map_err(|e| Error::WriteOutput(schemas_dir.clone(), e))?;

    let counters = Arc::new(Mutex::new(Summary::default()));
    let queue = Arc::new(Mutex::new(work));
    let workers = if options.sequential { 1 } else { WORKER_COUNT };

    let mut handles = Vec::new();
    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let counters = Arc::clone(&counters);
        let output_dir = options.output_dir.clone();
        handles.push(thread::spawn(move || loop {
            let item = queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop();
            let (base_file, schema_dir) = match item {
                Some(w) => w,
                None => break,
            };
            let outcome = process_schema(&base_file, &schema_dir, &output_dir);
            let mut counters = counters.lock().unwrap_or_else(PoisonError::into_inner);
            match outcome {
                Ok(Outcome::Generated(module)) => {
                    debug!(schema = %base_file.display(), %module, "generated");
                    counters.generated += 1;
                }
                Ok(Outcome::Skipped) => {
                    debug!(schema = %base_file.display(), "skipped by conflict table");
                    counters.skipped += 1;
                }
                Err(e) => {
                    error!(schema = %base_file.display(), error = %e, "generation failed");
                    counters.failed += 1;
                }
            }
        }));
    }
    for handle in handles {
        if handle.join().is_err() {
            error!("worker thread panicked");
            counters.lock().unwrap_or_else(PoisonError::into_inner).failed += 1;
        }
    }

    write_mod_rs(&schemas_dir)?;

    let summary = *counters.lock().unwrap_or_else(PoisonError::into_inner);
    info!(
        generated = summary.generated,
        skipped = summary.skipped,
        failed = summary.failed,
        "batch complete"
    );
    Ok(summary)
}

/// Generate one schema by name, searching every schema directory.
///
/// # Errors
///
/// Unlike batch mode, any pipeline failure is fatal here, including the
/// schema file not being found at all.
pub fn run_single(name: &str, options: &BatchOptions) -> Result<(), Error> {
    let file_name = format!("{}.json", name);
    let found = options
        .schema_dirs
        .iter()
        .map(|d| d.join(&file_name))
        .find(|p| p.is_file());
    let base_file = match found {
        Some(p) => p,
        None => {
            return Err(Error::SchemaNotFound(
                name.to_string(),
                options.schema_dirs.clone(),
            ))
        }
    };
    let schema_dir = base_file.parent().unwrap_or(Path::new(".")).to_path_buf();

    let schemas_dir = options.output_dir.join("schemas");
    fs::create_dir_all(&schemas_dir)
        .map_err(|e| Error::WriteOutput(schemas_dir.clone(), e))?;

    match process_schema(&base_file, &schema_dir, &options.output_dir)? {
        Outcome::Generated(module) => info!(%module, "generated"),
        Outcome::Skipped => info!(schema = name, "skipped by conflict table"),
    }
    write_mod_rs(&schemas_dir)
}

/// Base schema files across all directories, newest directories last so
/// they pop first.
///
/// An unreadable schema directory is a configuration error, not a
/// per-schema failure.
fn discover(schema_dirs: &[PathBuf]) -> Result<Vec<(PathBuf, PathBuf)>, Error> {
    let mut work = Vec::new();
    for dir in schema_dirs {
        let entries = fs::read_dir(dir).map_err(|e| Error::Io(dir.clone(), e))?;
        for entry in entries.flatten() {
            let path = entry.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) => n,
                None => continue,
            };
            if is_base_schema(name) {
                work.push((path, dir.clone()));
            }
        }
    }
    work.sort();
    Ok(work)
}

/// A candidate for generation: an unversioned resource schema.
fn is_base_schema(name: &str) -> bool {
    name.ends_with(".json")
        && !name.contains(".v")
        && !name.contains("Collection")
        && !name.starts_with("odata")
        && !EXCLUDED_FILES.contains(&name)
}

fn process_schema(
    base_file: &Path,
    schema_dir: &Path,
    output_dir: &Path,
) -> Result<Outcome, Error> {
    let doc = SchemaDocument::load(base_file)?;
    let origin = schema::determine_origin(&doc);
    let stem = doc.stem().to_string();

    if schema::skip_schema(&stem, origin) {
        return Ok(Outcome::Skipped);
    }
    let prefix_sf = schema::needs_sf_prefix(&stem, origin);
    let main_type = doc.principal_definition();

    let resolved = schema::resolve_latest_version(base_file, schema_dir)?;
    let mut definitions = parser::parse_with_base(base_file, &resolved)?;

    // Everything is routed to the schemas package; the service root is
    // the one type that lives in the output root, renamed to the
    // client-facing name.
    let package = if stem == "ServiceRoot" {
        Package::Rustfish
    } else {
        Package::Schemas
    };
    for def in &mut definitions {
        def.package = Some(package);
    }

    let mut options = GenerateOptions {
        main_type,
        prefix_sf,
        ..GenerateOptions::default()
    };

    let mut module = naming::camel_to_snake(&naming::clean_identifier(&stem));
    if prefix_sf {
        module = format!("sf_{}", module);
    }
    let (out_path, module) = match package.subdir() {
        Some(subdir) => (
            output_dir.join(subdir).join(format!("{}.rs", module)),
            module,
        ),
        None => {
            options
                .type_renames
                .push(("ServiceRoot".to_string(), "Service".to_string()));
            (
                output_dir.join("service_root.rs"),
                "service_root".to_string(),
            )
        }
    };

    let text = generator::generate_file(&definitions, &options)?;
    fs::write(&out_path, text).map_err(|e| Error::WriteOutput(out_path.clone(), e))?;
    Ok(Outcome::Generated(module))
}

/// Regenerate the package `mod.rs` from the files present, sorted.
fn write_mod_rs(package_dir: &Path) -> Result<(), Error> {
    let mut modules = Vec::new();
    let entries =
        fs::read_dir(package_dir).map_err(|e| Error::Io(package_dir.to_path_buf(), e))?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = match name.to_str() {
            Some(n) => n,
            None => continue,
        };
        if let Some(module) = name.strip_suffix(".rs") {
            if module != "mod" {
                modules.push(module.to_string());
            }
        }
    }
    modules.sort();

    let mut content = String::from("//\n// SPDX-License-Identifier: BSD-3-Clause\n//\n\n");
    for module in &modules {
        content.push_str(&format!("mod {};\n", module));
    }
    content.push('\n');
    for module in &modules {
        content.push_str(&format!("pub use {}::*;\n", module));
    }

    let path = package_dir.join("mod.rs");
    fs::write(&path, content).map_err(|e| Error::WriteOutput(path, e))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, body: &serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(body).unwrap()).unwrap();
        path
    }

    fn sensor_base() -> serde_json::Value {
        json!({
            "$id": "http://redfish.dmtf.org/schemas/v1/Sensor.json",
            "$ref": "#/definitions/Sensor",
            "owningEntity": "DMTF",
            "definitions": {
                "Sensor": {
                    "anyOf": [
                        { "$ref": "http://redfish.dmtf.org/schemas/v1/odata-v4.json#/definitions/idRef" },
                        { "$ref": "http://redfish.dmtf.org/schemas/v1/Sensor.v1_1_0.json#/definitions/Sensor" }
                    ]
                }
            }
        })
    }

    fn sensor_versioned() -> serde_json::Value {
        json!({
            "$id": "http://redfish.dmtf.org/schemas/v1/Sensor.v1_1_0.json",
            "release": "2019.1",
            "title": "#Sensor.v1_1_0.Sensor",
            "definitions": {
                "Sensor": {
                    "type": "object",
                    "properties": {
                        "@odata.id": { "type": "string" },
                        "Reading": { "type": "number" }
                    }
                }
            }
        })
    }

    #[test]
    fn test_is_base_schema() {
        assert!(is_base_schema("Sensor.json"));
        assert!(!is_base_schema("Sensor.v1_1_0.json"));
        assert!(!is_base_schema("SensorCollection.json"));
        assert!(!is_base_schema("odata-v4.json"));
        assert!(!is_base_schema("redfish-schema.json"));
        assert!(!is_base_schema("Protocol.json"));
        assert!(!is_base_schema("README.md"));
    }

    #[test]
    fn test_run_generates_and_writes_mod_rs() {
        let schemas = tempfile::tempdir().unwrap();
        write(schemas.path(), "Sensor.json", &sensor_base());
        write(schemas.path(), "Sensor.v1_1_0.json", &sensor_versioned());

        let out = tempfile::tempdir().unwrap();
        let options = BatchOptions {
            schema_dirs: vec![schemas.path().to_path_buf()],
            output_dir: out.path().to_path_buf(),
            sequential: true,
        };
        let summary = run(&options).unwrap();
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.failed, 0);

        let generated = fs::read_to_string(out.path().join("schemas/sensor.rs")).unwrap();
        assert!(generated.contains("pub struct Sensor"));
        assert!(generated.contains("// Release 2019.1: #Sensor.v1_1_0.Sensor"));

        let mod_rs = fs::read_to_string(out.path().join("schemas/mod.rs")).unwrap();
        assert!(mod_rs.contains("mod sensor;"));
        assert!(mod_rs.contains("pub use sensor::*;"));
    }

    #[test]
    fn test_swordfish_conflict_skip() {
        let schemas = tempfile::tempdir().unwrap();
        write(
            schemas.path(),
            "Volume.json",
            &json!({
                "$ref": "#/definitions/Volume",
                "owningEntity": "SNIA",
                "definitions": {
                    "Volume": {
                        "type": "object",
                        "properties": { "@odata.id": { "type": "string" } }
                    }
                }
            }),
        );
        let out = tempfile::tempdir().unwrap();
        let options = BatchOptions {
            schema_dirs: vec![schemas.path().to_path_buf()],
            output_dir: out.path().to_path_buf(),
            sequential: true,
        };
        let summary = run(&options).unwrap();
        assert_eq!(summary.generated, 0);
        assert_eq!(summary.skipped, 1);
        assert!(!out.path().join("schemas/volume.rs").exists());
    }

    #[test]
    fn test_swordfish_conflict_prefix() {
        let schemas = tempfile::tempdir().unwrap();
        write(
            schemas.path(),
            "Schedule.json",
            &json!({
                "$ref": "#/definitions/Schedule",
                "owningEntity": "SNIA",
                "definitions": {
                    "Schedule": {
                        "type": "object",
                        "properties": {
                            "@odata.id": { "type": "string" },
                            "Lifetime": { "type": "string", "readonly": false }
                        }
                    }
                }
            }),
        );
        let out = tempfile::tempdir().unwrap();
        let options = BatchOptions {
            schema_dirs: vec![schemas.path().to_path_buf()],
            output_dir: out.path().to_path_buf(),
            sequential: true,
        };
        let summary = run(&options).unwrap();
        assert_eq!(summary.generated, 1);

        let generated =
            fs::read_to_string(out.path().join("schemas/sf_schedule.rs")).unwrap();
        assert!(generated.contains("pub struct SFSchedule"));
    }

    #[test]
    fn test_service_root_lands_in_output_root() {
        let schemas = tempfile::tempdir().unwrap();
        write(
            schemas.path(),
            "ServiceRoot.json",
            &json!({
                "$ref": "#/definitions/ServiceRoot",
                "owningEntity": "DMTF",
                "definitions": {
                    "ServiceRoot": {
                        "type": "object",
                        "properties": { "@odata.id": { "type": "string" } }
                    }
                }
            }),
        );
        let out = tempfile::tempdir().unwrap();
        let options = BatchOptions {
            schema_dirs: vec![schemas.path().to_path_buf()],
            output_dir: out.path().to_path_buf(),
            sequential: true,
        };
        let summary = run(&options).unwrap();
        assert_eq!(summary.generated, 1);

        let generated = fs::read_to_string(out.path().join("service_root.rs")).unwrap();
        assert!(generated.contains("pub struct Service"));
        assert!(!generated.contains("pub struct ServiceRoot"));
    }

    #[test]
    fn test_broken_schema_is_counted_not_fatal() {
        let schemas = tempfile::tempdir().unwrap();
        fs::write(schemas.path().join("Broken.json"), "{ not json").unwrap();
        write(schemas.path(), "Sensor.json", &sensor_base());
        write(schemas.path(), "Sensor.v1_1_0.json", &sensor_versioned());

        let out = tempfile::tempdir().unwrap();
        let options = BatchOptions {
            schema_dirs: vec![schemas.path().to_path_buf()],
            output_dir: out.path().to_path_buf(),
            sequential: true,
        };
        let summary = run(&options).unwrap();
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_unreadable_schema_dir_is_fatal() {
        let out = tempfile::tempdir().unwrap();
        let options = BatchOptions {
            schema_dirs: vec![PathBuf::from("/nonexistent/schema/dir")],
            output_dir: out.path().to_path_buf(),
            sequential: true,
        };
        let err = run(&options).unwrap_err();
        assert!(matches!(err, Error::Io(..)));
    }

    #[test]
    fn test_run_single_not_found() {
        let schemas = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let options = BatchOptions {
            schema_dirs: vec![schemas.path().to_path_buf()],
            output_dir: out.path().to_path_buf(),
            sequential: true,
        };
        let err = run_single("NoSuchSchema", &options).unwrap_err();
        assert!(matches!(err, Error::SchemaNotFound(..)));
    }

    #[test]
    fn test_run_single_generates_one() {
        let schemas = tempfile::tempdir().unwrap();
        write(schemas.path(), "Sensor.json", &sensor_base());
        write(schemas.path(), "Sensor.v1_1_0.json", &sensor_versioned());

        let out = tempfile::tempdir().unwrap();
        let options = BatchOptions {
            schema_dirs: vec![schemas.path().to_path_buf()],
            output_dir: out.path().to_path_buf(),
            sequential: true,
        };
        run_single("Sensor", &options).unwrap();
        assert!(out.path().join("schemas/sensor.rs").exists());
    }
}
