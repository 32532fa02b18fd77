//! Version control adapter.
//!
//! The engine only talks to source control through the [`Vcs`] trait. The real
//! implementation, [`Git`], shells out to the `git` executable; every call
//! blocks until that process exits.

mod git;

pub use git::Git;

use std::fmt;
use std::io;
use std::path::Path;

/// Name of the repository metadata directory inside a checkout.
pub const METADATA_DIR: &str = ".git";

#[derive(Debug)]
pub enum VcsError {
    /// The tool could not be started at all.
    Spawn { command: String, source: io::Error },
    /// The tool ran and exited unsuccessfully.
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    /// There is no repository at the given path.
    Missing(String),
}

impl fmt::Display for VcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsError::Spawn { command, source } => {
                write!(f, "could not run `{}`: {}", command, source)
            }
            VcsError::Failed {
                command,
                code,
                stderr,
            } => {
                match code {
                    Some(code) => write!(f, "`{}` exited with status {}", command, code)?,
                    None => write!(f, "`{}` was terminated", command)?,
                }
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
            VcsError::Missing(path) => write!(f, "no repository at {}", path),
        }
    }
}

impl std::error::Error for VcsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VcsError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Source control operations the resolver and reconciler need.
///
/// Implementations are shared by every worker thread of a level.
pub trait Vcs: Send + Sync {
    /// Fetch the full repository at `url` into `dest`.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), VcsError>;

    /// Symbolic name of the checked-out branch, or `""` when HEAD is detached.
    fn current_branch(&self, dir: &Path) -> Result<String, VcsError>;

    /// Full hash of HEAD.
    fn current_commit(&self, dir: &Path) -> Result<String, VcsError>;

    fn checkout_branch(&self, dir: &Path, branch: &str) -> Result<(), VcsError>;

    /// Make the working tree match `commit`, keeping the current branch name.
    fn checkout_commit(&self, dir: &Path, commit: &str) -> Result<(), VcsError>;

    /// Fast-forward `branch` to the tip of its upstream.
    fn pull(&self, dir: &Path, branch: &str) -> Result<(), VcsError>;

    /// URL of the `origin` remote, if `dir` is a repository that has one.
    fn origin_url(&self, dir: &Path) -> Result<Option<String>, VcsError>;

    fn is_repo(&self, dir: &Path) -> bool {
        dir.join(METADATA_DIR).exists()
    }
}
