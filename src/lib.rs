//! # bpm - Basic Package Manager
//!
//! bpm vendors the external packages a Go project imports and pins each of
//! them to an exact commit in `bpm.json`.
//!
//! ## Features
//!
//! - **Import Discovery**: Scans `.go` files and keeps `host.tld/org/repo` imports
//! - **Recursive Vendoring**: Every dependency gets its own `vendor/` tree
//! - **Reproducible Installs**: Branch and commit pinning from the lockfile
//! - **Parallel Fetching**: One task per package, on a bounded worker pool
//!
//! ## Quick Start
//!
//! ```bash
//! # Discover, fetch and lock everything
//! bpm init --dir path/to/project
//!
//! # On a fresh checkout, restore the exact same tree
//! bpm install --dir path/to/project
//! ```
//!
//! ## Module Organization
//!
//! - [`discover`] - Source scanning, import parsing and package matching
//! - [`deps`] - Resolution, fetching and reconciliation engine
//! - [`vcs`] - Version control adapter
//! - [`lock`] - Lockfile codec
//! - [`commands`] - CLI command handlers

/// CLI command handlers.
pub mod commands;

/// Run configuration (`bpm.toml`, `~/.bpm/config.toml`).
pub mod config;

/// Dependency resolution, fetching and pinning.
pub mod deps;

/// Import discovery.
pub mod discover;

/// Lockfile (`bpm.json`) management.
pub mod lock;

/// Dependency tree visualization.
pub mod tree;

/// Terminal output helpers.
pub mod ui;

/// Version control adapter.
pub mod vcs;
