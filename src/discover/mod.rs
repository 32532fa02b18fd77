//! Dependency discovery.
//!
//! Turns a project directory into the set of external packages it imports:
//!
//! - [`sources`] finds the Go files, skipping `vendor/`
//! - [`imports`] reads their import declarations
//! - [`matcher`] keeps the `host/org/repo` identifiers of external repositories

pub mod imports;
pub mod matcher;
pub mod sources;

pub use imports::{ParseError, collect_imports, parse_imports};
pub use matcher::{is_package_id, package_id, package_id_from_remote, package_ids};
pub use sources::source_files;
