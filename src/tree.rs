//! Dependency tree visualization.
//!
//! This module provides the `bpm tree` command which displays the locked
//! dependency graph in a hierarchical, ASCII tree format.
//!
//! ## Example Output
//!
//! ```text
//! github.com/acme/tool
//! ├── github.com/acme/lib (main@9f2c1e0)
//! │   └── golang.org/x/text (master@4b1d6aa)
//! └── gopkg.in/check.v1/x (1a2b3c4)
//! ```

use anyhow::Result;
use colored::*;

use crate::config::{Config, LOCKFILE_NAME};
use crate::lock::{Dependencies, Entry, LockFile};
use crate::ui;

pub fn print_tree(config: &Config) -> Result<()> {
    let path = config.lockfile_path();
    if !path.exists() {
        ui::warn(format!(
            "No {} found in {}",
            LOCKFILE_NAME,
            config.project_dir.display()
        ));
        return Ok(());
    }

    let lock = LockFile::load(&path)?;
    let mut lines = render_tree(&lock).into_iter();
    if let Some(root) = lines.next() {
        println!("{}", root.bold().cyan());
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// The tree as plain lines, root first.
pub fn render_tree(lock: &LockFile) -> Vec<String> {
    let root = if lock.package.is_empty() {
        "(unnamed project)".to_string()
    } else {
        lock.package.clone()
    };

    let mut lines = vec![root];
    if lock.dependencies.is_empty() {
        lines.push("└── (no dependencies)".to_string());
    } else {
        render_level(&lock.dependencies, "", &mut lines);
    }
    lines
}

fn render_level(deps: &Dependencies, indent: &str, lines: &mut Vec<String>) {
    let count = deps.len();
    for (i, (id, entry)) in deps.iter().enumerate() {
        let is_last = i == count - 1;
        let prefix = if is_last { "└──" } else { "├──" };
        lines.push(format!("{}{} {} ({})", indent, prefix, id, pin_label(entry)));

        let child_indent = format!("{}{}", indent, if is_last { "    " } else { "│   " });
        render_level(&entry.dependencies, &child_indent, lines);
    }
}

fn pin_label(entry: &Entry) -> String {
    let commit = if entry.commit.is_empty() {
        "unpinned"
    } else {
        ui::short_hash(&entry.commit)
    };
    if entry.branch.is_empty() {
        commit.to_string()
    } else {
        format!("{}@{}", entry.branch, commit)
    }
}
