use anyhow::{Context, Result};
use colored::*;
use std::fs;

use super::project_identity;
use crate::config::{Config, LOCKFILE_NAME};
use crate::deps::Engine;
use crate::lock::LockFile;
use crate::ui;
use crate::vcs::Vcs;

/// `bpm init`: discover and fetch every dependency, then write a new lockfile.
pub fn init(config: &Config, vcs: &dyn Vcs) -> Result<Option<LockFile>> {
    let lock_path = config.lockfile_path();
    if lock_path.exists() {
        ui::warn(format!(
            "{} already exists: {}",
            LOCKFILE_NAME,
            lock_path.display()
        ));
        return Ok(None);
    }

    let Some(package) = project_identity(config, vcs)? else {
        ui::warn("Nothing to resolve.");
        return Ok(None);
    };
    write_graph(config, vcs, package).map(Some)
}

/// `bpm rebuild`: drop the vendor tree and resolve everything from scratch.
pub fn rebuild(config: &Config, vcs: &dyn Vcs) -> Result<Option<LockFile>> {
    let Some(package) = project_identity(config, vcs)? else {
        ui::warn("Nothing to resolve.");
        return Ok(None);
    };

    let vendor = config.vendor_dir();
    if vendor.exists() {
        ui::step(format!("Removing {}", vendor.display()));
        fs::remove_dir_all(&vendor)
            .with_context(|| format!("Failed to remove {}", vendor.display()))?;
    }
    write_graph(config, vcs, package).map(Some)
}

fn write_graph(config: &Config, vcs: &dyn Vcs, package: String) -> Result<LockFile> {
    ui::step(format!("Resolving dependencies of {}", package.bold()));

    let engine = Engine::new(config, vcs)?;
    let dependencies = engine.resolve(&config.project_dir, &package)?;
    let lock = LockFile::new(package, dependencies);

    let lock_path = config.lockfile_path();
    lock.save(&lock_path)?;
    ui::success(format!(
        "Locked {} packages in {}",
        lock.package_count(),
        lock_path.display()
    ));
    Ok(lock)
}
