//! Lockfile (`bpm.json`) management.
//!
//! The lockfile records the whole resolved graph: every dependency's fetch URL,
//! pinned branch and commit, and its own nested dependencies.
//!
//! ```json
//! {
//!   "package": "github.com/acme/tool",
//!   "dependencies": {
//!     "github.com/acme/lib": {
//!       "url": "https://github.com/acme/lib",
//!       "branch": "main",
//!       "commit": "9f2c...",
//!       "dependencies": {}
//!     }
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LOCKFILE_NAME;

/// Dependencies keyed by package identifier (`host/org/repo`).
pub type Dependencies = BTreeMap<String, Entry>;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct LockFile {
    #[serde(default)]
    pub package: String,
    #[serde(default, deserialize_with = "nullable_map")]
    pub dependencies: Dependencies,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub branch: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub commit: String,
    #[serde(default, deserialize_with = "nullable_map")]
    pub dependencies: Dependencies,
}

// Older lockfiles write `"dependencies": null` for leaf packages.
fn nullable_map<'de, D>(deserializer: D) -> std::result::Result<Dependencies, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Dependencies>::deserialize(deserializer)?.unwrap_or_default())
}

impl Entry {
    pub fn new(
        url: impl Into<String>,
        branch: impl Into<String>,
        commit: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            branch: branch.into(),
            commit: commit.into(),
            dependencies: Dependencies::new(),
        }
    }
}

impl LockFile {
    pub fn new(package: impl Into<String>, dependencies: Dependencies) -> Self {
        Self {
            package: package.into(),
            dependencies,
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Two-space indented JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        Ok(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Number of entries in the whole graph, nested ones included.
    pub fn package_count(&self) -> usize {
        fn count(deps: &Dependencies) -> usize {
            deps.values().map(|entry| 1 + count(&entry.dependencies)).sum()
        }
        count(&self.dependencies)
    }
}

/// Nearest directory, starting at `start` and walking up, that holds a lockfile.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(LOCKFILE_NAME).is_file())
        .map(Path::to_path_buf)
}
