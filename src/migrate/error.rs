//! Migration error types.

use std::path::PathBuf;

use thiserror::Error;

use super::frontmatter::FrontMatterError;
use super::route::RouteKey;
use crate::html::HtmlError;
use crate::markdown::RenderError;

/// Any failure that aborts a migration run.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("input directory `{0}` does not exist")]
    MissingInput(PathBuf),

    #[error("input `{0}` is not a directory")]
    NotADirectory(PathBuf),

    #[error("output `{output}` overlaps input `{input}`")]
    Overlap { input: PathBuf, output: PathBuf },

    #[error("failed to read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("bad front-matter in `{0}`")]
    FrontMatter(PathBuf, #[source] FrontMatterError),

    #[error("`{0}` routes outside the output directory: `{1}`")]
    UnsafeRoute(PathBuf, RouteKey),

    #[error("failed to convert HTML in `{0}`")]
    Html(PathBuf, #[source] HtmlError),

    #[error("failed to render `{0}`")]
    Render(String, #[source] RenderError),

    #[error("failed to clear output directory `{0}`")]
    Clear(PathBuf, #[source] std::io::Error),

    #[error("failed to write `{0}`")]
    Write(PathBuf, #[source] std::io::Error),
}
