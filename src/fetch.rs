//
// SPDX-License-Identifier: BSD-3-Clause
//

//! Fetching of the upstream schema bundles.
//!
//! Used when no local schema directories are given: the DMTF and SNIA
//! publication repositories are shallow-cloned into a temporary
//! directory that is removed on drop.

use crate::Error;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;
use tracing::info;

const REDFISH_REPO: &str = "https://github.com/DMTF/Redfish-Publications.git";
const SWORDFISH_REPO: &str = "https://github.com/SNIA/Swordfish-Publications.git";

/// Relative location of the JSON Schema bundle inside each repository.
const SCHEMA_SUBDIR: &str = "json-schema";

/// Freshly cloned schema bundles, deleted when dropped.
#[derive(Debug)]
pub struct FetchedSchemas {
    dir: TempDir,
}

impl FetchedSchemas {
    /// Clone both upstream bundles.
    ///
    /// # Errors
    ///
    /// Returns `Fetch` when the temporary directory cannot be created
    /// or a clone fails.
    pub fn fetch() -> Result<Self, Error> {
        let dir = tempfile::tempdir().map_err(|e| Error::Fetch(e.to_string()))?;
        clone(REDFISH_REPO, &dir.path().join("redfish"))?;
        clone(SWORDFISH_REPO, &dir.path().join("swordfish"))?;
        Ok(Self { dir })
    }

    /// Schema directories inside the clones, Redfish first.
    #[must_use]
    pub fn schema_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.dir.path().join("redfish").join(SCHEMA_SUBDIR),
            self.dir.path().join("swordfish").join(SCHEMA_SUBDIR),
        ]
    }
}

fn clone(url: &str, dest: &std::path::Path) -> Result<(), Error> {
    info!(%url, "cloning schema bundle");
    let output = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg(url)
        .arg(dest)
        .output()
        .map_err(|e| Error::Fetch(format!("{}: {}", url, e)))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Fetch(format!("{}: {}", url, stderr.trim())));
    }
    Ok(())
}
