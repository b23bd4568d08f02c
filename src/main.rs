//! mdmigrate - Migrate a legacy Markdown documentation tree.

#![allow(dead_code)]

mod cli;
mod config;
mod html;
mod logger;
mod markdown;
mod migrate;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::MigrateConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = MigrateConfig::load(&cli)?;
    if let Some(path) = &config.config_path {
        debug!("config"; "loaded {}", path.display());
    }

    // Run errors are already logged with their full chain
    if cli::migrate::run(&config).is_err() {
        std::process::exit(1);
    }
    Ok(())
}
