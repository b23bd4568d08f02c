//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Migrate a legacy Markdown documentation tree into TOC-bucketed folders
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Legacy documentation directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub input: Option<PathBuf>,

    /// Output directory (deleted and rebuilt)
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: mdmigrate.toml if present)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Worker threads (0 = all cores, 1 = sequential)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Descend into subdirectories of the input
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub recursive: Option<bool>,

    /// Run both passes and print the plan without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Hide progress lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Show per-file debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
