use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::fs;
use std::ops::{Add, AddAssign};
use std::path::Path;

use super::{Engine, package_dir};
use crate::config::VENDOR_DIR;
use crate::discover::is_package_id;
use crate::lock::{Dependencies, Entry};
use crate::ui;

/// What a reconciliation had to do to match the lockfile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PinReport {
    pub cloned: usize,
    pub checkouts: usize,
}

impl Add for PinReport {
    type Output = PinReport;

    fn add(self, other: PinReport) -> PinReport {
        PinReport {
            cloned: self.cloned + other.cloned,
            checkouts: self.checkouts + other.checkouts,
        }
    }
}

impl AddAssign for PinReport {
    fn add_assign(&mut self, other: PinReport) {
        *self = *self + other;
    }
}

impl Engine<'_> {
    /// Bring the checkouts under `vendor` in line with `entries`, level by level.
    ///
    /// Missing checkouts are cloned, drifted branches and commits are checked
    /// out, and empty `url`/`branch`/`commit` fields are filled in from what is
    /// on disk. Any failure aborts the whole reconciliation, as does a key that
    /// is not a plain `host/org/repo` identifier.
    pub fn reconcile(&self, entries: &mut Dependencies, vendor: &Path) -> Result<PinReport> {
        if entries.is_empty() {
            return Ok(PinReport::default());
        }
        if let Some(id) = entries.keys().find(|id| !is_package_id(id)) {
            bail!("Invalid package identifier in lockfile: '{}'", id);
        }

        let pb = ui::level_progress(entries.len(), "Pinning");
        let reports: Result<Vec<PinReport>> = self.pool.install(|| {
            entries
                .par_iter_mut()
                .map(|(id, entry)| {
                    let report = self.pin(id, entry, vendor, &pb);
                    pb.inc(1);
                    report
                })
                .collect()
        });
        pb.finish_and_clear();

        let mut total = reports?
            .into_iter()
            .fold(PinReport::default(), |acc, report| acc + report);

        for (id, entry) in entries.iter_mut() {
            let nested_vendor = package_dir(vendor, id).join(VENDOR_DIR);
            total += self.reconcile(&mut entry.dependencies, &nested_vendor)?;
        }
        Ok(total)
    }

    fn pin(
        &self,
        id: &str,
        entry: &mut Entry,
        vendor: &Path,
        pb: &ProgressBar,
    ) -> Result<PinReport> {
        let dest = package_dir(vendor, id);
        let mut report = PinReport::default();

        if entry.url.is_empty() {
            entry.url = self.config.source_url(id);
        }

        if !self.vcs.is_repo(&dest) {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            self.vcs
                .clone_repo(&entry.url, &dest)
                .with_context(|| format!("Failed to clone {}", id))?;
            report.cloned += 1;
        }

        let branch = self
            .vcs
            .current_branch(&dest)
            .with_context(|| format!("Failed to read the branch of {}", id))?;
        if !entry.branch.is_empty() && branch != entry.branch {
            self.vcs
                .checkout_branch(&dest, &entry.branch)
                .with_context(|| {
                    format!("Failed to check out branch {} of {}", entry.branch, id)
                })?;
            pb.suspend(|| ui::pinned(format!("{} -> branch {}", id, entry.branch)));
            report.checkouts += 1;
        }

        let commit = self
            .vcs
            .current_commit(&dest)
            .with_context(|| format!("Failed to read the commit of {}", id))?;
        if !entry.commit.is_empty() && commit != entry.commit {
            self.vcs
                .checkout_commit(&dest, &entry.commit)
                .with_context(|| {
                    format!("Failed to check out commit {} of {}", entry.commit, id)
                })?;
            pb.suspend(|| ui::pinned(format!("{} -> {}", id, ui::short_hash(&entry.commit))));
            report.checkouts += 1;
        }

        if entry.branch.is_empty() {
            entry.branch = branch;
        }
        if entry.commit.is_empty() {
            entry.commit = commit;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_add_up() {
        let mut total = PinReport {
            cloned: 1,
            checkouts: 0,
        };
        total += PinReport {
            cloned: 0,
            checkouts: 2,
        };
        assert_eq!(
            total,
            PinReport {
                cloned: 1,
                checkouts: 2
            }
        );
    }
}
