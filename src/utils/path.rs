//! Path normalization utilities.

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to the path itself if absolute, else joined with cwd.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Expand a leading `~` and anchor relative paths at `base`.
pub fn resolve_against(path: &Path, base: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    if expanded.is_relative() {
        base.join(expanded)
    } else {
        expanded
    }
}

/// Whether `outer` is `inner` or one of its ancestors.
///
/// Both paths are normalized first, so `out/../docs` contains `docs`.
pub fn contains_or_equals(outer: &Path, inner: &Path) -> bool {
    normalize_path(inner).starts_with(normalize_path(outer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_relative() {
        let normalized = normalize_path(Path::new("relative/path/file.md"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_resolve_against_base() {
        assert_eq!(
            resolve_against(Path::new("docs"), Path::new("/project")),
            PathBuf::from("/project/docs")
        );
        assert_eq!(
            resolve_against(Path::new("/abs/docs"), Path::new("/project")),
            PathBuf::from("/abs/docs")
        );
    }

    #[test]
    fn test_resolve_against_tilde() {
        let resolved = resolve_against(Path::new("~/docs"), Path::new("/project"));
        assert!(!resolved.starts_with("~"));
        assert!(resolved.ends_with("docs"));
    }

    #[test]
    fn test_contains_or_equals() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("docs");
        std::fs::create_dir_all(&input).unwrap();

        assert!(contains_or_equals(&input, &input));
        assert!(contains_or_equals(dir.path(), &input));
        assert!(!contains_or_equals(&input, dir.path()));
        assert!(!contains_or_equals(&dir.path().join("out"), &input));
        assert!(contains_or_equals(&input.join("..").join("docs"), &input));
    }
}
