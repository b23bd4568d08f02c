//! Routing metadata from the YAML front-matter block.
//!
//! The block is located structurally (a `MetadataBlock` node at the top of
//! the parsed tree), so `---` lines inside code blocks never match.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::markdown::{Document, Node};

const TITLE_KEY: &str = "title";
const TOC_TITLE_KEY: &str = "TOCTitle";

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("invalid YAML")]
    Yaml(#[from] serde_yaml::Error),

    #[error("expected a mapping at the top level")]
    NotAMapping,

    #[error("field `{0}` is not a scalar")]
    NotAScalar(&'static str),
}

/// Fields read from the block, before defaults are applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub toc_title: Option<String>,
}

impl FrontMatter {
    /// Parse the text of a front-matter block.
    pub fn parse(block: &str) -> Result<Self, FrontMatterError> {
        let yaml = strip_delimiters(block);
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(mapping) => Ok(Self {
                title: scalar(&mapping, TITLE_KEY)?,
                toc_title: scalar(&mapping, TOC_TITLE_KEY)?,
            }),
            Value::Null => Ok(Self::default()),
            _ => Err(FrontMatterError::NotAMapping),
        }
    }
}

/// Extract `(title, bucket)` and remove the front-matter block from `doc`.
///
/// Without a block: `(fallback_title, "")`. A missing or null `title`
/// falls back to `fallback_title`; a missing or null `TOCTitle` gives an
/// empty bucket, otherwise its spaces become hyphens.
pub fn extract(doc: &mut Document, fallback_title: &str) -> Result<(String, String), FrontMatterError> {
    let Some(index) = doc.position(Node::is_front_matter) else {
        return Ok((fallback_title.to_string(), String::new()));
    };

    // Removed before parsing: the block never survives, valid or not
    let block = doc.remove(index);
    let front_matter = FrontMatter::parse(&block.text())?;

    let title = front_matter
        .title
        .unwrap_or_else(|| fallback_title.to_string());
    let bucket = front_matter
        .toc_title
        .map(|toc| toc.replace(' ', "-"))
        .unwrap_or_default();

    Ok((title, bucket))
}

fn scalar(mapping: &Mapping, key: &'static str) -> Result<Option<String>, FrontMatterError> {
    match mapping.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(FrontMatterError::NotAScalar(key)),
    }
}

/// Drop `---` / `...` delimiter lines if the block text still carries them.
fn strip_delimiters(block: &str) -> &str {
    let is_delimiter = |line: &str| matches!(line.trim_end(), "---" | "...");

    let mut body = block.trim_start_matches('\u{feff}');
    if let Some((first, rest)) = body.split_once('\n')
        && is_delimiter(first)
    {
        body = rest;
    }
    let trimmed = body.trim_end();
    match trimmed.rsplit_once('\n') {
        Some((rest, last)) if is_delimiter(last) => rest,
        None if is_delimiter(trimmed) => "",
        _ => body,
    }
}
