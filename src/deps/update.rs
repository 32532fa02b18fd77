use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::Path;

use super::{Engine, package_dir};
use crate::lock::{Dependencies, Entry};
use crate::ui;

impl Engine<'_> {
    /// Fast-forward top-level packages to the tip of their pinned branch.
    ///
    /// Only `only` is touched when given, otherwise every entry. Checkouts must
    /// already match the lockfile (see [`Engine::reconcile`]). A package that
    /// moved gets its nested graph re-resolved from its new sources, reusing the
    /// checkouts already vendored beneath it. Returns the identifiers whose
    /// commit changed.
    pub fn refresh(
        &self,
        entries: &mut Dependencies,
        vendor: &Path,
        only: Option<&str>,
    ) -> Result<Vec<String>> {
        let selected = entries
            .keys()
            .filter(|id| only.is_none_or(|wanted| wanted == id.as_str()))
            .count();
        if selected == 0 {
            return Ok(Vec::new());
        }

        let pb = ui::level_progress(selected, "Updating");
        let moved: Result<Vec<Option<String>>> = self.pool.install(|| {
            entries
                .par_iter_mut()
                .filter(|(id, _)| only.is_none_or(|wanted| wanted == id.as_str()))
                .map(|(id, entry)| {
                    let result = self.fast_forward(id, entry, vendor);
                    pb.inc(1);
                    result
                })
                .collect()
        });
        pb.finish_and_clear();
        let moved: Vec<String> = moved?.into_iter().flatten().collect();

        for id in &moved {
            if let Some(entry) = entries.get_mut(id) {
                entry.dependencies = self.resolve(&package_dir(vendor, id), id)?;
            }
        }
        Ok(moved)
    }

    fn fast_forward(
        &self,
        id: &str,
        entry: &mut Entry,
        vendor: &Path,
    ) -> Result<Option<String>> {
        if entry.branch.is_empty() {
            ui::warn(format!(
                "{} is not on a branch; keeping {}",
                id,
                ui::short_hash(&entry.commit)
            ));
            return Ok(None);
        }

        let dest = package_dir(vendor, id);
        self.vcs
            .pull(&dest, &entry.branch)
            .with_context(|| format!("Failed to update {} on branch {}", id, entry.branch))?;
        let commit = self
            .vcs
            .current_commit(&dest)
            .with_context(|| format!("Failed to read the commit of {}", id))?;

        if commit == entry.commit {
            return Ok(None);
        }
        ui::detail(format!(
            "{} {} -> {}",
            id,
            ui::short_hash(&entry.commit),
            ui::short_hash(&commit)
        ));
        entry.commit = commit;
        Ok(Some(id.to_string()))
    }
}
