//! Source discovery and loading.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use super::error::MigrateError;

const MARKDOWN_EXTENSION: &str = "md";

/// One Markdown file of the legacy tree.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name with extension; the key links use to refer to it.
    pub name: String,
    /// File name without extension; the title fallback.
    pub stem: String,
    pub text: String,
}

impl SourceFile {
    /// Read `path`. Invalid UTF-8 is replaced, a leading BOM dropped.
    pub fn read(path: &Path) -> Result<Self, MigrateError> {
        let bytes = fs::read(path).map_err(|e| MigrateError::Read(path.to_path_buf(), e))?;
        let text = match String::from_utf8_lossy(&bytes) {
            Cow::Borrowed(s) => s.to_string(),
            Cow::Owned(s) => s,
        };
        Ok(Self::from_text(path, text))
    }

    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = match text.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_string(),
            None => text,
        };
        Self {
            path,
            name,
            stem,
            text,
        }
    }
}

/// Markdown files under `root`, sorted by path.
///
/// Only the top level is scanned unless `recursive` is set. The extension
/// match ignores ASCII case.
pub fn collect_sources(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, MigrateError> {
    if !root.exists() {
        return Err(MigrateError::MissingInput(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(MigrateError::NotADirectory(root.to_path_buf()));
    }

    let walker = WalkDir::new(root).skip_hidden(false);
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut files = Vec::new();
    for entry in walker {
        let mut entry = entry.map_err(|e| walk_error(root, e))?;
        // An unreadable directory still yields its own entry
        if let Some(err) = entry.read_children_error.take() {
            return Err(walk_error(&entry.path(), err));
        }
        if entry.file_type().is_file() {
            let path = entry.path();
            if is_markdown(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn walk_error(fallback: &Path, err: jwalk::Error) -> MigrateError {
    let path = err.path().map_or_else(|| fallback.to_path_buf(), Path::to_path_buf);
    MigrateError::Read(path, err.into())
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION))
}
