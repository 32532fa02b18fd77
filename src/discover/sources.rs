use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::VENDOR_DIR;
use crate::ui;

const SOURCE_EXTENSION: &str = "go";

/// Every Go source file under `root`, skipping `vendor/` directories at any depth.
pub fn source_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        let skip =
            entry.depth() > 0 && entry.file_type().is_dir() && entry.file_name() == VENDOR_DIR;
        if skip {
            ui::detail(format!("Skipping vendor folder: {}", entry.path().display()));
        }
        !skip
    });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            ui::detail(format!("File: {}", path.display()));
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "package x\n").unwrap();
    }

    #[test]
    fn test_vendor_is_skipped_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "main.go");
        touch(root, "internal/util/util.go");
        touch(root, "README.md");
        touch(root, "vendor/example.com/org/lib/lib.go");
        touch(root, "internal/vendor/hidden.go");
        touch(root, "cmd/tool/vendor/deep/deeper.go");

        let files = source_files(root).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["internal/util/util.go", "main.go"]);
    }

    #[test]
    fn test_root_named_vendor_is_still_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("vendor");
        touch(&root, "lib.go");
        assert_eq!(source_files(&root).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(source_files(&dir.path().join("nope")).is_err());
    }
}
