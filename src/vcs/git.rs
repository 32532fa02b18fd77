use git2::{ErrorCode, Repository};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{Vcs, VcsError};
use crate::ui;

/// [`Vcs`] backed by the `git` executable.
///
/// Remote lookups go through libgit2 instead of a child process, so asking a
/// plain directory for its `origin` is not an error.
#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
}

impl Default for Git {
    fn default() -> Self {
        Self::new()
    }
}

impl Git {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run git with `args`, returning trimmed stdout.
    fn run<I, S>(&self, dir: Option<&Path>, args: I) -> Result<String, VcsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        // A missing repository must fail, not wait for credentials.
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let command = describe(&cmd);
        ui::detail(&command);

        let output = cmd.output().map_err(|source| VcsError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(VcsError::Failed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn run_in(&self, dir: &Path, args: &[&str]) -> Result<String, VcsError> {
        if !self.is_repo(dir) {
            return Err(VcsError::Missing(dir.display().to_string()));
        }
        self.run(Some(dir), args)
    }
}

fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().to_string()];
    parts.extend(cmd.get_args().map(|arg| arg.to_string_lossy().to_string()));
    parts.join(" ")
}

/// `rev-parse --abbrev-ref HEAD` prints `HEAD` for a detached checkout.
fn branch_name(abbrev_ref: &str) -> String {
    match abbrev_ref.trim() {
        "HEAD" => String::new(),
        name => name.to_string(),
    }
}

impl Vcs for Git {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), VcsError> {
        self.run(
            None,
            [OsStr::new("clone"), OsStr::new(url), dest.as_os_str()],
        )?;
        Ok(())
    }

    fn current_branch(&self, dir: &Path) -> Result<String, VcsError> {
        let out = self.run_in(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(branch_name(&out))
    }

    fn current_commit(&self, dir: &Path) -> Result<String, VcsError> {
        self.run_in(dir, &["rev-parse", "HEAD"])
    }

    fn checkout_branch(&self, dir: &Path, branch: &str) -> Result<(), VcsError> {
        self.run_in(dir, &["checkout", branch, "--"])?;
        Ok(())
    }

    fn checkout_commit(&self, dir: &Path, commit: &str) -> Result<(), VcsError> {
        self.run_in(dir, &["reset", "--hard", commit])?;
        Ok(())
    }

    fn pull(&self, dir: &Path, branch: &str) -> Result<(), VcsError> {
        self.run_in(dir, &["pull", "--ff-only", "origin", branch])?;
        Ok(())
    }

    fn origin_url(&self, dir: &Path) -> Result<Option<String>, VcsError> {
        let repo = match Repository::open(dir) {
            Ok(repo) => repo,
            Err(err) if err.code() == ErrorCode::NotFound => return Ok(None),
            Err(err) => {
                return Err(VcsError::Failed {
                    command: format!("open repository {}", dir.display()),
                    code: None,
                    stderr: err.message().to_string(),
                });
            }
        };

        match repo.find_remote("origin") {
            Ok(remote) => Ok(remote.url().map(str::to_string)),
            Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
            Err(err) => Err(VcsError::Failed {
                command: format!("find remote origin in {}", dir.display()),
                code: None,
                stderr: err.message().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_head_has_no_branch() {
        assert_eq!(branch_name("HEAD\n"), "");
        assert_eq!(branch_name("main"), "main");
        assert_eq!(branch_name("feature/x"), "feature/x");
    }

    #[test]
    fn test_describe_joins_program_and_args() {
        let mut cmd = Command::new("git");
        cmd.args(["rev-parse", "HEAD"]);
        assert_eq!(describe(&cmd), "git rev-parse HEAD");
    }

    #[test]
    fn test_queries_outside_a_repo_are_missing() {
        let dir = tempfile::tempdir().unwrap();
        let git = Git::new();
        assert!(matches!(
            git.current_commit(dir.path()),
            Err(VcsError::Missing(_))
        ));
        assert_eq!(git.origin_url(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_unknown_program_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let git = Git::with_program("definitely-not-a-real-vcs-binary");
        let err = git
            .clone_repo("https://example.com/a/b", &dir.path().join("b"))
            .unwrap_err();
        assert!(matches!(err, VcsError::Spawn { .. }));
    }
}
