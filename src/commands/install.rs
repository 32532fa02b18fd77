use anyhow::Result;
use std::path::PathBuf;

use crate::config::{Config, LOCKFILE_NAME};
use crate::deps::Engine;
use crate::lock::LockFile;
use crate::ui;
use crate::vcs::Vcs;

fn existing_lockfile(config: &Config) -> Option<PathBuf> {
    let path = config.lockfile_path();
    if path.exists() {
        Some(path)
    } else {
        ui::warn(format!(
            "No {} found in {}. Run 'bpm init' first.",
            LOCKFILE_NAME,
            config.project_dir.display()
        ));
        None
    }
}

/// `bpm install`: pin every vendored checkout to the lockfile.
pub fn install(config: &Config, vcs: &dyn Vcs) -> Result<Option<LockFile>> {
    let Some(lock_path) = existing_lockfile(config) else {
        return Ok(None);
    };
    let mut lock = LockFile::load(&lock_path)?;
    ui::step(format!("Installing {} packages", lock.package_count()));

    let engine = Engine::new(config, vcs)?;
    let report = engine.reconcile(&mut lock.dependencies, &config.vendor_dir())?;
    lock.save(&lock_path)?;

    ui::success(format!(
        "Installed {} packages ({} cloned, {} checkouts)",
        lock.package_count(),
        report.cloned,
        report.checkouts
    ));
    Ok(Some(lock))
}

/// `bpm update`: move one package, or all top-level ones, to the tip of the
/// pinned branch and record the new commits.
pub fn update(config: &Config, vcs: &dyn Vcs, only: Option<&str>) -> Result<Option<LockFile>> {
    let Some(lock_path) = existing_lockfile(config) else {
        return Ok(None);
    };
    let mut lock = LockFile::load(&lock_path)?;

    if let Some(id) = only
        && !lock.dependencies.contains_key(id)
    {
        ui::warn(format!(
            "'{}' is not a direct dependency in {}",
            id, LOCKFILE_NAME
        ));
        return Ok(None);
    }

    let engine = Engine::new(config, vcs)?;
    let vendor = config.vendor_dir();
    engine.reconcile(&mut lock.dependencies, &vendor)?;
    let moved = engine.refresh(&mut lock.dependencies, &vendor, only)?;
    lock.save(&lock_path)?;

    if moved.is_empty() {
        ui::success("Everything is up to date.");
    } else {
        ui::success(format!("Updated {}", moved.join(", ")));
    }
    Ok(Some(lock))
}
