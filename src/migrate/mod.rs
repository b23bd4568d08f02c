//! Two-pass documentation migration.
//!
//! ```text
//! sources ─▶ classify (par) ─▶ seal ─▶ rewrite_links (par) ─▶ emit (par)
//!              │                 │            │                   │
//!         front-matter,      barrier:    old name → new       one file per
//!         HTML rewrite,      Catalog →   bucket/file path     RouteKey
//!         register           Sealed
//! ```
//!
//! Each phase finishes completely before the next starts. Every unit of
//! work owns exactly one document (pass 1) or one group (pass 2, emit).

pub mod classify;
pub mod emit;
pub mod error;
pub mod frontmatter;
pub mod links;
pub mod name;
pub mod rewrite;
pub mod route;
pub mod source;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::html::{HtmlConverter, HtmlOptions};
use crate::logger::ProgressLine;
use crate::markdown::{self, Document, MarkdownOptions};
use classify::{Classified, RouteRules};
use route::Catalog;
use source::SourceFile;

pub use emit::{DEFAULT_SEPARATOR, emit};
pub use error::MigrateError;
pub use links::rewrite_links;
pub use route::{OldNameIndex, OutputGroup, RouteKey, Sealed};
pub use source::collect_sources;

/// Parser, converter and routing rules shared by every worker.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub markdown: MarkdownOptions,
    pub html: HtmlConverter,
    pub rules: RouteRules,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(HtmlOptions::default(), RouteRules::default())
    }
}

impl Pipeline {
    pub fn new(html: HtmlOptions, rules: RouteRules) -> Self {
        Self {
            markdown: MarkdownOptions::all(),
            html: HtmlConverter::new(html),
            rules,
        }
    }

    pub fn parse(&self, text: &str) -> Document {
        markdown::parse(text, &self.markdown)
    }

    /// Parse and classify one file into `catalog`.
    pub fn classify(&self, file: &SourceFile, catalog: &Catalog) -> Result<Classified, MigrateError> {
        let doc = self.parse(&file.text);
        classify::classify(file, doc, &self.rules, &self.html, &self.markdown, catalog)
    }
}

/// Result of pass 1.
#[derive(Debug)]
pub struct Classification {
    pub catalog: Catalog,
    pub html_blocks: usize,
}

/// Read and classify every path in parallel. The first failure aborts.
pub fn classify_all(
    paths: &[PathBuf],
    pipeline: &Pipeline,
    progress: Option<&ProgressLine>,
) -> Result<Classification, MigrateError> {
    let catalog = Catalog::new();
    let html_blocks = AtomicUsize::new(0);

    paths.par_iter().try_for_each(|path| {
        let file = SourceFile::read(path)?;
        let classified = pipeline.classify(&file, &catalog)?;
        html_blocks.fetch_add(classified.html_blocks, Ordering::Relaxed);
        crate::debug!("classify"; "{} -> {}", file.name, classified.key);
        if let Some(p) = progress {
            p.inc("files");
        }
        Ok::<(), MigrateError>(())
    })?;

    Ok(Classification {
        catalog,
        html_blocks: html_blocks.into_inner(),
    })
}

/// Run both passes over in-memory sources.
pub fn migrate_sources(files: &[SourceFile], pipeline: &Pipeline) -> Result<Sealed, MigrateError> {
    let catalog = Catalog::new();
    files
        .par_iter()
        .try_for_each(|file| pipeline.classify(file, &catalog).map(|_| ()))?;

    let mut sealed = catalog.seal();
    rewrite_links(&mut sealed.groups, &sealed.index, None);
    Ok(sealed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::render;
    use super::emit::render_group;

    fn source(name: &str, text: &str) -> SourceFile {
        SourceFile::from_text(format!("docs/{name}"), text)
    }

    fn rendered(sealed: &Sealed, key: &RouteKey) -> String {
        render_group(sealed.group(key).unwrap(), DEFAULT_SEPARATOR).unwrap()
    }

    #[test]
    fn test_link_to_later_file_is_rewritten() {
        // The link target is listed after the file linking to it
        let files = vec![
            source("b.md", "See [a](a.md).\n"),
            source("a.md", "---\ntitle: x\nTOCTitle: bucket1\n---\n\nA body\n"),
        ];
        let sealed = migrate_sources(&files, &Pipeline::default()).unwrap();

        let out = rendered(&sealed, &RouteKey::new("b.md", ""));
        assert!(out.contains("(bucket1/x.md)"), "{out}");
        assert_eq!(
            sealed.index.get("a.md"),
            Some(&RouteKey::new("x.md", "bucket1"))
        );
    }

    #[test]
    fn test_same_key_both_present() {
        let files = vec![
            source("one.md", "---\ntitle: Intro part one\nTOCTitle: Basics\n---\n\nFirst\n"),
            source("two.md", "---\ntitle: Intro part two\nTOCTitle: Basics\n---\n\nSecond\n"),
        ];
        let sealed = migrate_sources(&files, &Pipeline::default()).unwrap();

        assert_eq!(sealed.groups.len(), 1);
        let out = rendered(&sealed, &RouteKey::new("Intro.md", "Basics"));
        assert_eq!(out, "First\n\nSecond\n");
    }

    #[test]
    fn test_html_block_replaced_in_output() {
        let files = vec![source("h.md", "Intro\n\n<div><b>hi</b></div>\n")];
        let sealed = migrate_sources(&files, &Pipeline::default()).unwrap();

        let out = rendered(&sealed, &RouteKey::new("h.md", ""));
        assert!(out.contains("**hi**"));
        assert!(!out.contains("<div>"));
        assert!(!out.contains("<b>"));
    }

    #[test]
    fn test_plain_document_round_trips() {
        let body = "# Heading\n\nSome *text* and a list:\n\n- one\n- two\n";
        let files = vec![source(
            "plain.md",
            &format!("---\ntitle: Plain\n---\n\n{body}"),
        )];
        let sealed = migrate_sources(&files, &Pipeline::default()).unwrap();

        let expected = render(&Pipeline::default().parse(body)).unwrap();
        assert_eq!(rendered(&sealed, &RouteKey::new("Plain.md", "")), expected);
    }

    #[test]
    fn test_every_index_key_has_group() {
        let files: Vec<_> = (0..40)
            .map(|i| {
                source(
                    &format!("f{i}.md"),
                    &format!("---\ntitle: T{} x\nTOCTitle: B{}\n---\n\n[n](f{}.md)\n", i % 5, i % 3, (i + 1) % 40),
                )
            })
            .collect();

        let sealed = migrate_sources(&files, &Pipeline::default()).unwrap();
        assert_eq!(sealed.index.len(), 40);
        assert_eq!(sealed.document_count(), 40);
        for (_, key) in sealed.index.sorted() {
            assert!(sealed.group(key).is_some());
        }
        // Every link points into the new tree
        for group in &sealed.groups {
            for doc in &group.documents {
                for target in doc.document.link_targets() {
                    assert!(target.starts_with('B'), "{target}");
                }
            }
        }
    }

    #[test]
    fn test_pool_size_does_not_change_result() {
        const FILES: usize = 12;
        let files: Vec<_> = (0..FILES)
            .map(|i| {
                source(
                    &format!("d{i}.md"),
                    &format!("---\ntitle: Doc{i} x\nTOCTitle: B{}\n---\n\n[next](d{}.md)\n", i % 3, (i + 1) % FILES),
                )
            })
            .collect();
        let pipeline = Pipeline::default();

        let outputs: Vec<Vec<(RouteKey, String)>> = [1, 2, FILES]
            .into_iter()
            .map(|threads| {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build().unwrap();
                let sealed = pool.install(|| migrate_sources(&files, &pipeline)).unwrap();
                assert_eq!(sealed.index.len(), FILES, "{threads} threads");
                assert_eq!(sealed.document_count(), FILES, "{threads} threads");
                sealed
                    .groups
                    .iter()
                    .map(|g| (g.key.clone(), rendered(&sealed, &g.key)))
                    .collect()
            })
            .collect();

        assert_eq!(outputs[0].len(), FILES);
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[0], outputs[2]);
    }

    #[test]
    fn test_bad_front_matter_aborts() {
        let files = vec![
            source("ok.md", "Fine\n"),
            source("bad.md", "---\ntitle: [\n---\n\nText\n"),
        ];
        let err = migrate_sources(&files, &Pipeline::default()).unwrap_err();
        assert!(matches!(err, MigrateError::FrontMatter(..)));
    }
}
