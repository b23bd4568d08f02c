//! Output tree writer.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use rayon::prelude::*;

use super::error::MigrateError;
use super::route::OutputGroup;
use crate::logger::ProgressLine;
use crate::markdown::render;

/// Default text placed between documents merged into one file.
pub const DEFAULT_SEPARATOR: &str = "\n";

/// Replace `output_root` with one file per group. Returns bytes written.
///
/// The root is deleted first. Groups are written in parallel; distinct
/// keys never share a path.
pub fn emit(
    groups: &[OutputGroup],
    output_root: &Path,
    separator: &str,
    progress: Option<&ProgressLine>,
) -> Result<u64, MigrateError> {
    clear_dir(output_root)?;

    groups
        .par_iter()
        .map(|group| {
            let content = render_group(group, separator)?;
            let path = group.key.output_path(output_root);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| MigrateError::Write(parent.to_path_buf(), e))?;
            }
            fs::write(&path, &content).map_err(|e| MigrateError::Write(path.clone(), e))?;
            if let Some(p) = progress {
                p.inc("files");
            }
            Ok(content.len() as u64)
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))
}

/// Render each document of `group` and join them with `separator`.
pub fn render_group(group: &OutputGroup, separator: &str) -> Result<String, MigrateError> {
    let parts = group
        .documents
        .iter()
        .map(|doc| render(&doc.document))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| MigrateError::Render(group.key.relative_path(), e))?;
    Ok(parts.join(separator))
}

/// Remove `dir` recursively if present, then recreate it empty.
fn clear_dir(dir: &Path) -> Result<(), MigrateError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(MigrateError::Clear(dir.to_path_buf(), e)),
    }
    fs::create_dir_all(dir).map_err(|e| MigrateError::Clear(dir.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{MarkdownOptions, parse};
    use crate::migrate::route::{ClassifiedDoc, RouteKey};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn group(file: &str, bucket: &str, bodies: &[&str]) -> OutputGroup {
        OutputGroup {
            key: RouteKey::new(file, bucket),
            documents: bodies
                .iter()
                .enumerate()
                .map(|(i, body)| ClassifiedDoc {
                    source: PathBuf::from(format!("{i}.md")),
                    document: parse(body, &MarkdownOptions::all()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_render_group_joins_with_blank_line() {
        let g = group("x.md", "b", &["First", "Second"]);
        assert_eq!(render_group(&g, DEFAULT_SEPARATOR).unwrap(), "First\n\nSecond\n");
    }

    #[test]
    fn test_emit_writes_buckets_and_root_files() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let groups = vec![
            group("x.md", "bucket1", &["# X"]),
            group("Top.md", "", &["Top"]),
        ];

        let bytes = emit(&groups, &out, DEFAULT_SEPARATOR, None).unwrap();
        assert!(bytes > 0);
        assert_eq!(fs::read_to_string(out.join("bucket1/x.md")).unwrap(), "# X\n");
        assert_eq!(fs::read_to_string(out.join("Top.md")).unwrap(), "Top\n");
    }

    #[test]
    fn test_emit_clears_previous_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("stale")).unwrap();
        fs::write(out.join("stale/old.md"), "old").unwrap();

        emit(&[group("new.md", "fresh", &["New"])], &out, "\n", None).unwrap();
        assert!(!out.join("stale").exists());
        assert!(out.join("fresh/new.md").exists());
    }

    #[test]
    fn test_emit_empty_groups_leaves_empty_root() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        assert_eq!(emit(&[], &out, "\n", None).unwrap(), 0);
        assert!(out.is_dir());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }
}
