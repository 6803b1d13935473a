//
// SPDX-License-Identifier: BSD-3-Clause
//

use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::io::Error as IoError;
use std::path::PathBuf;

/// Schema compiler errors.
///
/// Each variant carries enough context to point at the offending file;
/// the batch orchestrator logs these and keeps going, single-object
/// mode turns them into process exit.
#[derive(Debug)]
pub enum Error {
    /// Reading a schema file failed.
    Io(PathBuf, IoError),
    /// A schema file is not valid JSON.
    Parse(PathBuf, serde_json::Error),
    /// A schema document has no `definitions` map.
    NoDefinitions(PathBuf),
    /// Writing an output file failed.
    WriteOutput(PathBuf, IoError),
    /// Single-object mode could not find the named schema.
    SchemaNotFound(String, Vec<PathBuf>),
    /// The schema fetcher failed to clone an upstream bundle.
    Fetch(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Io(path, error) => {
                write!(f, "input/output error: {}: {}", path.display(), error)
            }
            Self::Parse(path, error) => {
                write!(f, "JSON parse error: {}: {}", path.display(), error)
            }
            Self::NoDefinitions(path) => {
                write!(f, "no definitions found in schema: {}", path.display())
            }
            Self::WriteOutput(path, error) => {
                write!(f, "failed to write output file: {}: {}", path.display(), error)
            }
            Self::SchemaNotFound(name, dirs) => {
                write!(f, "schema file for {} not found in", name)?;
                for d in dirs {
                    write!(f, " {}", d.display())?;
                }
                Ok(())
            }
            Self::Fetch(message) => write!(f, "schema fetch failed: {}", message),
        }
    }
}

impl StdError for Error {}
