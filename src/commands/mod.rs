//! CLI command handlers.
//!
//! Each handler takes the run [`Config`] and a version control adapter, and
//! returns the lockfile it wrote, or `None` when there was nothing to do.

mod init;
mod install;

pub use init::{init, rebuild};
pub use install::{install, update};

use anyhow::Result;

use crate::config::Config;
use crate::discover::{package_id, package_id_from_remote};
use crate::ui;
use crate::vcs::Vcs;

/// The project's own package identifier: the `package` setting if present,
/// otherwise derived from the `origin` remote.
pub fn project_identity(config: &Config, vcs: &dyn Vcs) -> Result<Option<String>> {
    if let Some(package) = &config.settings.package {
        return match package_id(package) {
            Some(id) => Ok(Some(id.to_string())),
            None => {
                ui::warn(format!(
                    "Configured package '{}' is not of the form host.tld/org/repo",
                    package
                ));
                Ok(None)
            }
        };
    }

    let Some(url) = vcs.origin_url(&config.project_dir)? else {
        ui::warn(format!(
            "No origin remote found in {}",
            config.project_dir.display()
        ));
        return Ok(None);
    };

    match package_id_from_remote(&url) {
        Some(id) => Ok(Some(id)),
        None => {
            ui::warn(format!(
                "Remote '{}' does not name a host.tld/org/repo package",
                url
            ));
            Ok(None)
        }
    }
}
