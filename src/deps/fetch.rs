use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::{Engine, package_dir};
use crate::lock::{Dependencies, Entry};
use crate::ui;
use crate::vcs::VcsError;

impl Engine<'_> {
    /// Clone every package in `ids` into `vendor`, one task per package.
    ///
    /// A package whose clone or HEAD lookup fails is left out of the result with
    /// a warning; its siblings are unaffected. Packages that are already checked
    /// out are reused as they are.
    pub fn fetch(&self, ids: &BTreeSet<String>, vendor: &Path) -> Result<Dependencies> {
        if ids.is_empty() {
            return Ok(Dependencies::new());
        }
        fs::create_dir_all(vendor)
            .with_context(|| format!("Failed to create {}", vendor.display()))?;

        ui::step(format!(
            "Fetching {} packages into {}",
            ids.len(),
            vendor.display()
        ));
        let pb = ui::level_progress(ids.len(), "Fetching");

        let results: Vec<(&String, Result<Entry, VcsError>)> = self.pool.install(|| {
            ids.par_iter()
                .map(|id| {
                    let result = self.fetch_one(id, vendor);
                    pb.inc(1);
                    (id, result)
                })
                .collect()
        });
        pb.finish_and_clear();

        let mut deps = Dependencies::new();
        for (id, result) in results {
            match result {
                Ok(entry) => {
                    ui::detail(format!(
                        "{} {} @ {}",
                        id,
                        if entry.branch.is_empty() {
                            "(detached)"
                        } else {
                            entry.branch.as_str()
                        },
                        ui::short_hash(&entry.commit)
                    ));
                    deps.insert(id.clone(), entry);
                }
                Err(err) => ui::warn(format!("Skipping {}: {}", id, err)),
            }
        }
        Ok(deps)
    }

    fn fetch_one(&self, id: &str, vendor: &Path) -> Result<Entry, VcsError> {
        let dest = package_dir(vendor, id);
        let url = self.config.source_url(id);

        if self.vcs.is_repo(&dest) {
            ui::detail(format!("Using vendored {}", id));
            return self.read_head(url, &dest);
        }

        ui::detail(format!("Pulling package {} in {}...", url, dest.display()));
        let existed = dest.exists();
        let fetched = self
            .vcs
            .clone_repo(&url, &dest)
            .and_then(|()| self.read_head(url, &dest));
        if fetched.is_err() && !existed {
            let _ = fs::remove_dir_all(&dest);
        }
        fetched
    }

    fn read_head(&self, url: String, dest: &Path) -> Result<Entry, VcsError> {
        let branch = self.vcs.current_branch(dest)?;
        let commit = self.vcs.current_commit(dest)?;
        Ok(Entry::new(url, branch, commit))
    }
}
