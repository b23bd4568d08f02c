//! Run configuration: `mdmigrate.toml` merged with command-line flags.
//!
//! ```text
//! config/
//! ├── section.rs   # [paths] [emit] [run]
//! ├── error.rs     # ConfigError
//! └── mod.rs       # MigrateConfig (this file)
//! ```
//!
//! | Section   | Purpose                                         |
//! |-----------|-------------------------------------------------|
//! | `[paths]` | Input tree, output tree, recursion              |
//! | `[route]` | Title and TOC title truncation, file extension  |
//! | `[html]`  | HTML block conversion policy                    |
//! | `[emit]`  | Separator between merged documents              |
//! | `[run]`   | Worker threads                                  |

mod error;
mod section;

pub use error::ConfigError;
pub use section::{EmitConfig, PathsConfig, RunConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::html::HtmlOptions;
use crate::log;
use crate::migrate::classify::RouteRules;
use crate::utils::path::{contains_or_equals, resolve_against};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG: &str = "mdmigrate.toml";

/// Upper bound for `jobs`; larger values are clamped.
const MAX_JOBS: usize = 256;

/// Root configuration structure representing mdmigrate.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Config file the values were read from, if any
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    pub paths: PathsConfig,
    pub route: RouteRules,
    pub html: HtmlOptions,
    pub emit: EmitConfig,
    pub run: RunConfig,
}

impl MigrateConfig {
    /// Load configuration from CLI arguments.
    ///
    /// An explicit `--config` must exist; the default file is optional.
    /// Paths from the file are relative to the file, paths from the
    /// command line relative to the working directory.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::Io(PathBuf::from("."), e))?;

        let config_path = match &cli.config {
            Some(path) => {
                let path = resolve_against(path, &cwd);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => Some(cwd.join(DEFAULT_CONFIG)).filter(|p| p.is_file()),
        };

        let mut config = match &config_path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };

        config.apply_cli(cli, &cwd);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        let base = path.parent().unwrap_or(Path::new("."));
        config.paths.input = config.paths.input.map(|p| resolve_against(&p, base));
        config.paths.output = config.paths.output.map(|p| resolve_against(&p, base));
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Command-line values override the file.
    fn apply_cli(&mut self, cli: &Cli, cwd: &Path) {
        if let Some(input) = &cli.input {
            self.paths.input = Some(resolve_against(input, cwd));
        }
        if let Some(output) = &cli.output {
            self.paths.output = Some(resolve_against(output, cwd));
        }
        Self::update_option(&mut self.paths.recursive, cli.recursive);
        Self::update_option(&mut self.run.jobs, cli.jobs);
        self.run.dry_run = cli.dry_run;
        self.run.quiet = cli.quiet;
    }

    fn update_option<T: Clone>(target: &mut T, value: Option<T>) {
        if let Some(v) = value {
            *target = v;
        }
    }

    /// Check the merged configuration. Clamps `jobs` instead of failing.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let input = self
            .paths
            .input
            .as_deref()
            .ok_or_else(|| ConfigError::invalid("paths.input", "no input directory given"))?;
        let output = self
            .paths
            .output
            .as_deref()
            .ok_or_else(|| ConfigError::invalid("paths.output", "no output directory given"))?;

        if contains_or_equals(output, input) {
            return Err(ConfigError::invalid(
                "paths.output",
                format!(
                    "`{}` is or contains the input directory and would be deleted",
                    output.display()
                ),
            ));
        }

        let separators = self
            .route
            .file_separators
            .iter()
            .map(|s| ("route.file_separators", s))
            .chain(
                self.route
                    .bucket_separators
                    .iter()
                    .map(|s| ("route.bucket_separators", s)),
            );
        for (field, separator) in separators {
            if separator.is_empty() {
                return Err(ConfigError::invalid(field, "separators must not be empty"));
            }
        }

        let extension = &self.route.extension;
        if extension.is_empty() || extension.contains(['/', '\\', '.']) {
            return Err(ConfigError::invalid(
                "route.extension",
                format!("`{extension}` is not a plain file extension"),
            ));
        }

        if self.run.jobs > MAX_JOBS {
            log!("warning"; "jobs = {} is too large, using {}", self.run.jobs, MAX_JOBS);
            self.run.jobs = MAX_JOBS;
        }

        Ok(())
    }

    /// Validated input directory.
    pub fn input_dir(&self) -> &Path {
        self.paths.input.as_deref().unwrap_or(Path::new("."))
    }

    /// Validated output directory.
    pub fn output_dir(&self) -> &Path {
        self.paths.output.as_deref().unwrap_or(Path::new("."))
    }
}
