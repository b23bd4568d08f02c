//! Document tree back to normalized Markdown text.

use pulldown_cmark::Event;
use thiserror::Error;

use super::{Document, Node};

#[derive(Debug, Error)]
#[error("markdown rendering failed: {0}")]
pub struct RenderError(String);

/// Render a document as normalized Markdown.
///
/// Non-empty output always ends with exactly one newline.
pub fn render(doc: &Document) -> Result<String, RenderError> {
    let mut events = Vec::new();
    flatten(doc.nodes(), &mut events);

    let mut out = String::new();
    pulldown_cmark_to_cmark::cmark(events.iter(), &mut out)
        .map_err(|err| RenderError(format!("{err:?}")))?;

    let len = out.trim_end().len();
    out.truncate(len);
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

fn flatten(nodes: &[Node], events: &mut Vec<Event<'static>>) {
    for node in nodes {
        match node {
            Node::Container { tag, children } => {
                events.push(Event::Start(tag.clone()));
                flatten(children, events);
                events.push(Event::End(tag.to_end()));
            }
            Node::Leaf(event) => events.push(event.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{MarkdownOptions, parse};

    fn roundtrip(markdown: &str) -> String {
        render(&parse(markdown, &MarkdownOptions::all())).unwrap()
    }

    #[test]
    fn test_render_heading_and_paragraph() {
        let out = roundtrip("# Title\n\nSome *text*.");
        assert!(out.starts_with("# Title"));
        assert!(out.contains("*text*"));
        assert!(out.ends_with(".\n"));
    }

    #[test]
    fn test_render_is_stable() {
        let once = roundtrip("Intro\n\n* one\n* two\n\n> quote\n");
        let twice = roundtrip(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_render_empty_document() {
        assert_eq!(render(&Document::default()).unwrap(), "");
    }

    #[test]
    fn test_render_reference_link_inline() {
        let out = roundtrip("[a][r]\n\n[r]: target.md\n");
        assert!(out.contains("[a](target.md)"));
    }
}
