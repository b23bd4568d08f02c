//! The `mdmigrate` run: discovery, both passes, emission.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::MigrateConfig;
use crate::logger::ProgressLine;
use crate::migrate::{self, Pipeline, Sealed, collect_sources, emit, rewrite_links};
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrateReport {
    /// Source files classified
    pub files: usize,
    /// Output files (one per route key)
    pub groups: usize,
    /// Output files built from more than one source
    pub merged_groups: usize,
    pub html_blocks: usize,
    pub links_rewritten: usize,
    /// Zero on a dry run
    pub bytes_written: u64,
}

/// Run the migration described by `config`.
pub fn run(config: &MigrateConfig) -> Result<MigrateReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.run.jobs)
        .build()
        .context("failed to build worker pool")?;

    pool.install(|| run_phases(config)).inspect_err(|e| {
        log!("error"; "{:#}", e);
    })
}

fn run_phases(config: &MigrateConfig) -> Result<MigrateReport> {
    let input = config.input_dir();
    let output = config.output_dir();
    let quiet = config.run.quiet;
    let pipeline = Pipeline::new(config.html.clone(), config.route.clone());

    let paths = collect_sources(input, config.paths.recursive)?;
    log!(
        "migrate";
        "{} in {}",
        plural_count(paths.len(), "source file"),
        input.display()
    );

    // Pass 1
    let progress = (!quiet).then(|| ProgressLine::new("classify", &[("files", paths.len())]));
    let classification = migrate::classify_all(&paths, &pipeline, progress.as_ref())?;
    if let Some(p) = progress {
        p.finish();
    }

    // Barrier: no link is rewritten before every file is registered
    let mut sealed = classification.catalog.seal();

    // Pass 2
    let progress = (!quiet).then(|| ProgressLine::new("links", &[("groups", sealed.groups.len())]));
    let links_rewritten = rewrite_links(&mut sealed.groups, &sealed.index, progress.as_ref());
    if let Some(p) = progress {
        p.finish();
    }

    let mut report = MigrateReport {
        files: sealed.document_count(),
        groups: sealed.groups.len(),
        merged_groups: sealed.merged_groups().count(),
        html_blocks: classification.html_blocks,
        links_rewritten,
        bytes_written: 0,
    };

    if config.run.dry_run {
        log_plan(&sealed, output);
    } else {
        let progress = (!quiet).then(|| ProgressLine::new("emit", &[("files", sealed.groups.len())]));
        report.bytes_written = emit(&sealed.groups, output, &config.emit.separator, progress.as_ref())?;
        if let Some(p) = progress {
            p.finish();
        }
    }

    log_summary(&report, output, config.run.dry_run);
    Ok(report)
}

fn log_plan(sealed: &Sealed, output: &Path) {
    for (old_name, key) in sealed.index.sorted() {
        log!("plan"; "{} -> {}", old_name, key);
    }
    for group in sealed.merged_groups() {
        log!(
            "plan";
            "{} merges {}",
            group.key,
            plural_count(group.documents.len(), "document")
        );
        for doc in &group.documents {
            debug!("plan"; "  {}", doc.source.display());
        }
    }
    log!("plan"; "dry run, {} left untouched", output.display());
}

fn log_summary(report: &MigrateReport, output: &Path, dry_run: bool) {
    let verb = if dry_run { "would write" } else { "wrote" };
    log!(
        "done";
        "{} {} ({} merged) from {}, {} and {} rewritten, into {}",
        verb,
        plural_count(report.groups, "file"),
        report.merged_groups,
        plural_count(report.files, "source"),
        plural_count(report.links_rewritten, "link"),
        plural_count(report.html_blocks, "HTML block"),
        output.display()
    );
}
