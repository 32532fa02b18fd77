//! Shared fixtures: a scripted version control adapter and project builders.

#![allow(dead_code)]

use bpm::vcs::{Vcs, VcsError};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const SELF_ID: &str = "example.com/acme/app";

#[derive(Debug, Clone)]
struct Remote {
    branch: String,
    commit: String,
    files: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Head {
    pub url: String,
    pub branch: String,
    pub commit: String,
}

/// In-memory [`Vcs`]. A "clone" writes the scripted files plus a `.git`
/// directory into the destination and remembers the checkout's HEAD.
#[derive(Default)]
pub struct FakeVcs {
    origin: Option<String>,
    remotes: HashMap<String, Remote>,
    broken_remotes: HashSet<String>,
    broken_commits: HashSet<String>,
    broken_heads: HashSet<String>,
    heads: Mutex<HashMap<PathBuf, Head>>,
    clones: AtomicUsize,
    checkouts: AtomicUsize,
}

pub fn url_of(id: &str) -> String {
    format!("https://{}", id)
}

pub fn commit_of(id: &str) -> String {
    format!("c-{}", id.replace('/', "-"))
}

fn failed(command: String, stderr: &str) -> VcsError {
    VcsError::Failed {
        command,
        code: Some(128),
        stderr: stderr.to_string(),
    }
}

impl FakeVcs {
    pub fn new() -> Self {
        Self {
            origin: Some(format!("git@{}.git", SELF_ID.replacen('/', ":", 1))),
            ..Self::default()
        }
    }

    pub fn without_origin() -> Self {
        Self::default()
    }

    /// A package on branch `main` whose sources import `imports`.
    pub fn package(mut self, id: &str, imports: &[&str]) -> Self {
        let name = id.rsplit('/').next().unwrap_or("pkg").replace(['.', '-'], "_");
        self.remotes.insert(
            url_of(id),
            Remote {
                branch: "main".to_string(),
                commit: commit_of(id),
                files: vec![(format!("{}.go", name), go_source(&name, imports))],
            },
        );
        self
    }

    pub fn with_file(mut self, id: &str, rel: &str, content: &str) -> Self {
        if let Some(remote) = self.remotes.get_mut(&url_of(id)) {
            remote.files.push((rel.to_string(), content.to_string()));
        }
        self
    }

    pub fn broken_remote(mut self, id: &str) -> Self {
        self.broken_remotes.insert(url_of(id));
        self
    }

    pub fn broken_commit(mut self, commit: &str) -> Self {
        self.broken_commits.insert(commit.to_string());
        self
    }

    /// Clones of `id` succeed, but reading their HEAD fails.
    pub fn broken_head(mut self, id: &str) -> Self {
        self.broken_heads.insert(url_of(id));
        self
    }

    /// Pretend new commits landed upstream.
    pub fn advance(&mut self, id: &str, commit: &str) {
        if let Some(remote) = self.remotes.get_mut(&url_of(id)) {
            remote.commit = commit.to_string();
        }
    }

    pub fn head(&self, dir: &Path) -> Option<Head> {
        self.heads.lock().unwrap().get(dir).cloned()
    }

    /// Move a checkout behind the engine's back.
    pub fn set_head(&self, dir: &Path, branch: &str, commit: &str) {
        let mut heads = self.heads.lock().unwrap();
        let head = heads.get_mut(dir).expect("checkout exists");
        head.branch = branch.to_string();
        head.commit = commit.to_string();
    }

    pub fn clone_count(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }

    pub fn checkout_count(&self) -> usize {
        self.checkouts.load(Ordering::SeqCst)
    }

    fn with_head<T>(&self, dir: &Path, f: impl FnOnce(&mut Head) -> T) -> Result<T, VcsError> {
        let mut heads = self.heads.lock().unwrap();
        heads
            .get_mut(dir)
            .map(f)
            .ok_or_else(|| VcsError::Missing(dir.display().to_string()))
    }
}

impl Vcs for FakeVcs {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), VcsError> {
        let command = format!("git clone {} {}", url, dest.display());
        if self.broken_remotes.contains(url) {
            return Err(failed(command, "fatal: unable to access remote"));
        }
        let Some(remote) = self.remotes.get(url) else {
            return Err(failed(command, "fatal: repository not found"));
        };

        let write = || -> std::io::Result<()> {
            fs::create_dir_all(dest.join(".git"))?;
            for (rel, content) in &remote.files {
                let path = dest.join(rel);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, content)?;
            }
            Ok(())
        };
        write().map_err(|err| failed(command, &err.to_string()))?;

        self.heads.lock().unwrap().insert(
            dest.to_path_buf(),
            Head {
                url: url.to_string(),
                branch: remote.branch.clone(),
                commit: remote.commit.clone(),
            },
        );
        self.clones.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn current_branch(&self, dir: &Path) -> Result<String, VcsError> {
        let head = self.with_head(dir, |head| head.clone())?;
        if self.broken_heads.contains(&head.url) {
            return Err(failed(
                "git rev-parse --abbrev-ref HEAD".to_string(),
                "fatal: bad HEAD",
            ));
        }
        Ok(head.branch)
    }

    fn current_commit(&self, dir: &Path) -> Result<String, VcsError> {
        self.with_head(dir, |head| head.commit.clone())
    }

    fn checkout_branch(&self, dir: &Path, branch: &str) -> Result<(), VcsError> {
        self.checkouts.fetch_add(1, Ordering::SeqCst);
        self.with_head(dir, |head| head.branch = branch.to_string())
    }

    fn checkout_commit(&self, dir: &Path, commit: &str) -> Result<(), VcsError> {
        self.checkouts.fetch_add(1, Ordering::SeqCst);
        if self.broken_commits.contains(commit) {
            return Err(failed(
                format!("git reset --hard {}", commit),
                "fatal: ambiguous argument",
            ));
        }
        self.with_head(dir, |head| head.commit = commit.to_string())
    }

    fn pull(&self, dir: &Path, _branch: &str) -> Result<(), VcsError> {
        let url = self.with_head(dir, |head| head.url.clone())?;
        let tip = self
            .remotes
            .get(&url)
            .map(|remote| remote.commit.clone())
            .ok_or_else(|| failed(format!("git pull {}", url), "fatal: no upstream"))?;
        self.with_head(dir, |head| head.commit = tip)
    }

    fn origin_url(&self, _dir: &Path) -> Result<Option<String>, VcsError> {
        Ok(self.origin.clone())
    }
}

pub fn go_source(package: &str, imports: &[&str]) -> String {
    let mut src = format!("package {}\n\nimport (\n\t\"fmt\"\n", package);
    for import in imports {
        src.push_str(&format!("\t\"{}\"\n", import));
    }
    src.push_str(")\n\nfunc Hello() { fmt.Println(\"hi\") }\n");
    src
}

/// A project directory with a single `main.go` importing `imports`.
pub fn project(imports: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("main.go"), go_source("main", imports)).expect("write main.go");
    dir
}
