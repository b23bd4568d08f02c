//! Pass 1: route a parsed document and register it in the catalog.

use serde::{Deserialize, Serialize};

use super::error::MigrateError;
use super::frontmatter;
use super::name::{self, BUCKET_SEPARATORS, FILE_SEPARATORS};
use super::rewrite::rewrite_html;
use super::route::{Catalog, ClassifiedDoc, RouteKey};
use super::source::SourceFile;
use crate::html::HtmlConverter;
use crate::markdown::{Document, MarkdownOptions};

/// How titles become file and bucket names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteRules {
    pub file_separators: Vec<String>,
    pub bucket_separators: Vec<String>,
    /// Extension appended to the file stem, without the dot.
    pub extension: String,
}

impl Default for RouteRules {
    fn default() -> Self {
        Self {
            file_separators: FILE_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            bucket_separators: BUCKET_SEPARATORS.iter().map(|s| s.to_string()).collect(),
            extension: "md".to_string(),
        }
    }
}

impl RouteRules {
    /// Route key for an extracted `(title, bucket)` pair.
    pub fn route(&self, title: &str, bucket: &str) -> RouteKey {
        let stem = name::normalize(title, &self.file_separators);
        RouteKey::new(
            format!("{stem}.{}", self.extension),
            name::normalize(bucket, &self.bucket_separators),
        )
    }
}

/// Outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub key: RouteKey,
    pub html_blocks: usize,
}

/// Extract front-matter, rewrite HTML blocks, route the document and
/// register it under `file.name`.
pub fn classify(
    file: &SourceFile,
    mut doc: Document,
    rules: &RouteRules,
    converter: &HtmlConverter,
    options: &MarkdownOptions,
    catalog: &Catalog,
) -> Result<Classified, MigrateError> {
    let (title, bucket) = frontmatter::extract(&mut doc, &file.stem)
        .map_err(|e| MigrateError::FrontMatter(file.path.clone(), e))?;

    let html_blocks = rewrite_html(doc.nodes_mut(), converter, options)
        .map_err(|e| MigrateError::Html(file.path.clone(), e))?;

    let key = rules.route(&title, &bucket);
    if !key.is_contained() {
        return Err(MigrateError::UnsafeRoute(file.path.clone(), key));
    }
    catalog.register(
        &file.name,
        key.clone(),
        ClassifiedDoc {
            source: file.path.clone(),
            document: doc,
        },
    );

    Ok(Classified { key, html_blocks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{parse, render};

    fn run(name: &str, text: &str, catalog: &Catalog) -> Result<Classified, MigrateError> {
        let options = MarkdownOptions::all();
        let file = SourceFile::from_text(format!("docs/{name}"), text);
        let doc = parse(&file.text, &options);
        classify(
            &file,
            doc,
            &RouteRules::default(),
            &HtmlConverter::default(),
            &options,
            catalog,
        )
    }

    #[test]
    fn test_route_from_front_matter() {
        let catalog = Catalog::new();
        let classified = run(
            "seq.md",
            "---\ntitle: \"Creating a Sequence\"\nTOCTitle: \"Observable Sequences\"\n---\n\nBody\n",
            &catalog,
        )
        .unwrap();
        assert_eq!(classified.key, RouteKey::new("Creating.md", "Observable"));

        let sealed = catalog.seal();
        assert_eq!(
            sealed.index.get("seq.md"),
            Some(&RouteKey::new("Creating.md", "Observable"))
        );
    }

    #[test]
    fn test_fallback_to_stem() {
        let catalog = Catalog::new();
        let classified = run("Getting Started.md", "Text\n", &catalog).unwrap();
        assert_eq!(classified.key, RouteKey::new("Getting.md", ""));
    }

    #[test]
    fn test_html_rewritten_and_front_matter_removed() {
        let catalog = Catalog::new();
        let classified = run(
            "a.md",
            "---\ntitle: A\n---\n\n<div><b>hi</b></div>\n",
            &catalog,
        )
        .unwrap();
        assert_eq!(classified.html_blocks, 1);

        let sealed = catalog.seal();
        let out = render(&sealed.groups[0].documents[0].document).unwrap();
        assert_eq!(out, "**hi**\n");
    }

    #[test]
    fn test_bad_yaml_names_file() {
        let catalog = Catalog::new();
        let err = run("broken.md", "---\ntitle: [x\n---\n\nText\n", &catalog).unwrap_err();
        match err {
            MigrateError::FrontMatter(path, _) => assert!(path.ends_with("broken.md")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_escaping_title_rejected() {
        let catalog = Catalog::new();
        for text in [
            "---\ntitle: ../escaped\n---\n\nText\n",
            "---\ntitle: /some/where\n---\n\nText\n",
            "---\ntitle: A\nTOCTitle: /abs\n---\n\nText\n",
            "---\ntitle: A\nTOCTitle: ..\n---\n\nText\n",
        ] {
            let err = run("evil.md", text, &catalog).unwrap_err();
            match err {
                MigrateError::UnsafeRoute(path, _) => assert!(path.ends_with("evil.md")),
                other => panic!("unexpected error: {other}"),
            }
        }
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_custom_rules() {
        let rules = RouteRules {
            file_separators: vec![":".to_string()],
            bucket_separators: vec![],
            extension: "markdown".to_string(),
        };
        assert_eq!(
            rules.route("Intro: basics", "Part One"),
            RouteKey::new("Intro.markdown", "Part One")
        );
    }
}
