use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

// A DNS-like host ending in a short TLD, then exactly two more segments.
// Anything deeper is a sub-package of the same repository.
static PACKAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^/]+\.[^./]{1,6}/[^/]+/[^/]+").expect("package pattern is valid")
});

/// Package identifier (`host/org/repo`) an import path belongs to, if it names
/// an external repository at all. `.` and `..` segments never qualify.
pub fn package_id(import: &str) -> Option<&str> {
    PACKAGE_PATTERN
        .find(import)
        .map(|m| m.as_str())
        .filter(|id| id.split('/').all(|segment| segment != "." && segment != ".."))
}

/// Whether `id` is exactly a package identifier, with nothing after `repo`.
pub fn is_package_id(id: &str) -> bool {
    package_id(id) == Some(id)
}

/// Distinct package identifiers among `imports`, leaving out `self_id`.
pub fn package_ids<'a, I>(imports: I, self_id: &str) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    imports
        .into_iter()
        .filter_map(package_id)
        .filter(|id| *id != self_id)
        .map(str::to_string)
        .collect()
}

/// Package identifier named by a Git remote URL.
///
/// Accepts `https://host/org/repo(.git)`, `ssh://git@host/org/repo` and the
/// scp-like `git@host:org/repo.git`.
pub fn package_id_from_remote(url: &str) -> Option<String> {
    let url = url.trim();
    let (rest, has_scheme) = match url.split_once("://") {
        Some((_, rest)) => (rest, true),
        None => (url, false),
    };

    let rest = match rest.split_once('@') {
        Some((user, host_path)) if !user.contains('/') => host_path,
        _ => rest,
    };

    let normalized = if has_scheme {
        rest.to_string()
    } else {
        match rest.split_once(':') {
            Some((host, path)) if !host.contains('/') => format!("{}/{}", host, path),
            _ => rest.to_string(),
        }
    };

    let trimmed = normalized.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    package_id(trimmed).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_packages_collapse_and_short_paths_drop() {
        let imports = ["example.com/org/repo/sub/pkg", "fmt", "example.com/org/repo"];
        let ids = package_ids(imports, "example.com/org/self");
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["example.com/org/repo"]);
    }

    #[test]
    fn test_self_is_excluded() {
        let imports = [
            "github.com/acme/tool/internal/config",
            "github.com/acme/tool",
            "github.com/acme/lib/v2",
        ];
        let ids = package_ids(imports, "github.com/acme/tool");
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["github.com/acme/lib"]);
    }

    #[test]
    fn test_pattern_boundaries() {
        assert_eq!(package_id("golang.org/x/net/context"), Some("golang.org/x/net"));
        assert_eq!(package_id("gopkg.in/yaml.v2"), None);
        assert_eq!(package_id("net/http"), None);
        assert_eq!(package_id("example.com/org"), None);
        // TLD longer than six characters.
        assert_eq!(package_id("example.company/org/repo"), None);
        assert_eq!(package_id("sub.example.io/org/repo"), Some("sub.example.io/org/repo"));
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        assert_eq!(package_id("a.bc/../.."), None);
        assert_eq!(package_id("example.com/org/.."), None);
        assert_eq!(package_id("example.com/./repo/sub"), None);

        let ids = package_ids(["a.bc/../../escape", "example.com/org/ok"], "x.com/a/b");
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["example.com/org/ok"]);
    }

    #[test]
    fn test_is_package_id() {
        assert!(is_package_id("example.com/org/repo"));
        assert!(!is_package_id("example.com/org/repo/sub"));
        assert!(!is_package_id("example.com/../../escaped"));
        assert!(!is_package_id("example.com//repo"));
        assert!(!is_package_id(""));
    }

    #[test]
    fn test_remote_urls() {
        for url in [
            "https://github.com/acme/tool",
            "https://github.com/acme/tool.git",
            "https://github.com/acme/tool/",
            "ssh://git@github.com/acme/tool.git",
            "git@github.com:acme/tool.git",
            "https://user@github.com/acme/tool\n",
        ] {
            assert_eq!(
                package_id_from_remote(url).as_deref(),
                Some("github.com/acme/tool"),
                "{url}"
            );
        }
        assert_eq!(package_id_from_remote("/srv/git/tool"), None);
        assert_eq!(package_id_from_remote(""), None);
    }
}
