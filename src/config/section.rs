//! Configuration sections of `mdmigrate.toml`.
//!
//! ```toml
//! [paths]
//! input = "legacy-docs"      # Tree of Markdown sources
//! output = "~/site/docs"     # Deleted and rebuilt on every run
//! recursive = true           # Descend into subdirectories
//!
//! [route]
//! file_separators = [" "]
//! bucket_separators = [" ", "(", "_", "-"]
//! extension = "md"
//!
//! [html]
//! unknown_tags = "drop"      # drop | bypass | raise | pass
//! github_flavored = true
//! remove_comments = true
//!
//! [emit]
//! separator = "\n"           # Between documents merged into one file
//!
//! [run]
//! jobs = 0                   # 0 = all cores, 1 = sequential
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::migrate::DEFAULT_SEPARATOR;

/// `[paths]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub recursive: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            recursive: true,
        }
    }
}

/// `[emit]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    pub separator: String,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// `[run]` section, plus the run flags only the command line sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Worker threads. 0 uses every core.
    pub jobs: usize,

    #[serde(skip)]
    pub dry_run: bool,

    #[serde(skip)]
    pub quiet: bool,
}
