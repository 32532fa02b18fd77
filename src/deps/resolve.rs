use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;

use super::{Engine, package_dir};
use crate::config::VENDOR_DIR;
use crate::discover;
use crate::lock::Dependencies;
use crate::ui;

impl Engine<'_> {
    /// Build the full dependency graph of the project in `dir`.
    ///
    /// Discovers the packages `dir` imports, fetches them into `dir/vendor`, then
    /// does the same inside each fetched checkout. A package that is already
    /// being resolved further up the current path is recorded but not descended
    /// into, so import cycles terminate.
    pub fn resolve(&self, dir: &Path, self_id: &str) -> Result<Dependencies> {
        let mut active = vec![self_id.to_string()];
        self.resolve_level(dir, self_id, &mut active)
    }

    /// External packages imported by the sources in `dir`, minus `self_id`.
    pub fn discover(&self, dir: &Path, self_id: &str) -> Result<BTreeSet<String>> {
        let files = discover::source_files(dir)?;
        ui::detail(format!("Found files: {}", files.len()));

        let imports = self.pool.install(|| discover::collect_imports(&files))?;
        let ids = discover::package_ids(imports.iter().map(String::as_str), self_id);
        for id in &ids {
            ui::detail(format!("Found package: {}", id));
        }
        Ok(ids)
    }

    fn resolve_level(
        &self,
        dir: &Path,
        self_id: &str,
        active: &mut Vec<String>,
    ) -> Result<Dependencies> {
        let ids = self.discover(dir, self_id)?;
        if ids.is_empty() {
            return Ok(Dependencies::new());
        }

        let vendor = dir.join(VENDOR_DIR);
        let mut deps = self.fetch(&ids, &vendor)?;

        for (id, entry) in deps.iter_mut() {
            if active.contains(id) {
                ui::warn(format!(
                    "Import cycle: {} imports {}, which is already being resolved",
                    self_id, id
                ));
                continue;
            }
            active.push(id.clone());
            let nested = self.resolve_level(&package_dir(&vendor, id), id, active);
            active.pop();
            entry.dependencies = nested?;
        }

        Ok(deps)
    }
}
