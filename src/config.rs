//! Run configuration.
//!
//! A [`Config`] is built once from the parsed command line and handed to every
//! command by reference. Optional settings come from two TOML files, the
//! user-wide `~/.bpm/config.toml` and the project's own `bpm.toml`:
//!
//! ```toml
//! jobs = 4
//! scheme = "https"
//! package = "github.com/acme/tool"
//!
//! [sources]
//! "github.com/acme/private" = "git@github.com:acme/private.git"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Lockfile name, relative to the project root.
pub const LOCKFILE_NAME: &str = "bpm.json";
/// Project settings file name, relative to the project root.
pub const SETTINGS_NAME: &str = "bpm.toml";
/// Directory holding vendored checkouts, at every level of the graph.
pub const VENDOR_DIR: &str = "vendor";

const DEFAULT_SCHEME: &str = "https";

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Worker pool size. `0` means one worker per CPU.
    pub jobs: Option<usize>,
    /// Scheme used to turn a package identifier into a fetch URL.
    pub scheme: Option<String>,
    /// Project identity, when the `origin` remote can't provide one.
    pub package: Option<String>,
    #[serde(default)]
    pub sources: BTreeMap<String, String>,
}

impl Settings {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(settings))
    }

    /// Layer `other` on top of `self`. Scalars in `other` win when set; source
    /// overrides merge key by key.
    pub fn merge(mut self, other: Settings) -> Self {
        if other.jobs.is_some() {
            self.jobs = other.jobs;
        }
        if other.scheme.is_some() {
            self.scheme = other.scheme;
        }
        if other.package.is_some() {
            self.package = other.package;
        }
        self.sources.extend(other.sources);
        self
    }
}

fn user_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".bpm").join("config.toml"))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    /// `--jobs` from the command line; wins over the settings files.
    pub jobs: Option<usize>,
    pub settings: Settings,
}

impl Config {
    /// Configuration with default settings and no files consulted.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            jobs: None,
            settings: Settings::default(),
        }
    }

    /// Read the user and project settings files, in that order of precedence.
    pub fn load(project_dir: impl Into<PathBuf>, jobs: Option<usize>) -> Result<Self> {
        let project_dir = project_dir.into();
        let mut settings = Settings::default();

        if let Some(path) = user_settings_path()
            && let Some(user) = Settings::load_file(&path)?
        {
            settings = settings.merge(user);
        }
        if let Some(project) = Settings::load_file(&project_dir.join(SETTINGS_NAME))? {
            settings = settings.merge(project);
        }

        Ok(Self {
            project_dir,
            jobs,
            settings,
        })
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.project_dir.join(LOCKFILE_NAME)
    }

    pub fn vendor_dir(&self) -> PathBuf {
        self.project_dir.join(VENDOR_DIR)
    }

    /// Worker count for the engine's pool; `0` lets rayon pick.
    pub fn worker_count(&self) -> usize {
        self.jobs.or(self.settings.jobs).unwrap_or(0)
    }

    /// Fetch URL for a package identifier, honouring `[sources]` overrides.
    pub fn source_url(&self, id: &str) -> String {
        if let Some(url) = self.settings.sources.get(id) {
            return url.clone();
        }
        let scheme = self.settings.scheme.as_deref().unwrap_or(DEFAULT_SCHEME);
        format!("{}://{}", scheme, id)
    }
}
