//! Dependency resolution and fetching.
//!
//! Everything here runs on an [`Engine`], which owns a fixed-size worker pool
//! and the version control adapter. The graph is processed one level at a
//! time: every sibling at a level is handled concurrently, and the level is
//! joined before descending into children.
//!
//! - [`Engine::resolve`] discovers imports, fetches and recurses (`init`, `rebuild`)
//! - [`Engine::fetch`] clones one level of packages
//! - [`Engine::reconcile`] pins checkouts to a lockfile (`install`)
//! - [`Engine::refresh`] moves selected packages to their branch tip (`update`)

mod fetch;
mod reconcile;
mod resolve;
mod update;

pub use reconcile::PinReport;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::vcs::Vcs;

pub struct Engine<'a> {
    config: &'a Config,
    vcs: &'a dyn Vcs,
    pool: rayon::ThreadPool,
}

impl<'a> Engine<'a> {
    pub fn new(config: &'a Config, vcs: &'a dyn Vcs) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_count())
            .thread_name(|idx| format!("bpm-worker-{}", idx))
            .build()
            .context("Failed to start worker pool")?;
        Ok(Self { config, vcs, pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }
}

/// Checkout directory of `id` inside `vendor`: one path component per
/// identifier segment, so `host/org/repo` lands in `vendor/host/org/repo`.
pub fn package_dir(vendor: &Path, id: &str) -> PathBuf {
    id.split('/')
        .filter(|segment| !segment.is_empty())
        .fold(vendor.to_path_buf(), |dir, segment| dir.join(segment))
}
