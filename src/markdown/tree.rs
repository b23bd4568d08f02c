//! Owned, mutable Markdown tree.

use pulldown_cmark::{CowStr, Event, LinkType, MetadataBlockKind, Tag};

/// A block or inline node.
///
/// Containers hold the opening tag and their children; the closing tag is
/// derived on render (`Tag::to_end`). Everything else is a leaf event.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Container {
        tag: Tag<'static>,
        children: Vec<Node>,
    },
    Leaf(Event<'static>),
}

impl Node {
    pub fn tag(&self) -> Option<&Tag<'static>> {
        match self {
            Self::Container { tag, .. } => Some(tag),
            Self::Leaf(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Self::Container { children, .. } => children,
            Self::Leaf(_) => &[],
        }
    }

    /// Raw HTML block (`Tag::HtmlBlock`).
    pub fn is_html_block(&self) -> bool {
        matches!(self.tag(), Some(Tag::HtmlBlock))
    }

    /// YAML front-matter block (`---` ... `---`).
    pub fn is_front_matter(&self) -> bool {
        matches!(
            self.tag(),
            Some(Tag::MetadataBlock(MetadataBlockKind::YamlStyle))
        )
    }

    /// Concatenated literal content of this node and its descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Container { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Self::Leaf(Event::Text(s) | Event::Code(s) | Event::Html(s) | Event::InlineHtml(s)) => {
                out.push_str(s);
            }
            Self::Leaf(Event::SoftBreak | Event::HardBreak) => out.push('\n'),
            Self::Leaf(_) => {}
        }
    }
}

/// A parsed Markdown document: its top-level blocks in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the first top-level node matching `pred`.
    pub fn position(&self, pred: impl Fn(&Node) -> bool) -> Option<usize> {
        self.nodes.iter().position(pred)
    }

    pub fn remove(&mut self, index: usize) -> Node {
        self.nodes.remove(index)
    }

    /// Visit the target of every link and image, depth-first in document order.
    ///
    /// Autolinks and email links are skipped: their visible text is the
    /// target itself, so rewriting one would desynchronize the two.
    pub fn for_each_link_mut(&mut self, mut f: impl FnMut(&mut CowStr<'static>)) {
        visit_links(&mut self.nodes, &mut f);
    }

    /// Targets of every link and image, in document order.
    pub fn link_targets(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_links(&self.nodes, &mut out);
        out
    }
}

fn is_rewritable(link_type: LinkType) -> bool {
    !matches!(link_type, LinkType::Autolink | LinkType::Email)
}

fn visit_links(nodes: &mut [Node], f: &mut impl FnMut(&mut CowStr<'static>)) {
    for node in nodes {
        if let Node::Container { tag, children } = node {
            match tag {
                Tag::Link {
                    link_type,
                    dest_url,
                    ..
                }
                | Tag::Image {
                    link_type,
                    dest_url,
                    ..
                } if is_rewritable(*link_type) => f(dest_url),
                _ => {}
            }
            visit_links(children, f);
        }
    }
}

fn collect_links(nodes: &[Node], out: &mut Vec<String>) {
    for node in nodes {
        if let Node::Container { tag, children } = node {
            if let Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } = tag {
                out.push(dest_url.to_string());
            }
            collect_links(children, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{MarkdownOptions, parse};

    #[test]
    fn test_link_visit_reaches_nested_links() {
        let mut doc = parse(
            "- [a](a.md)\n  > [b](b.md)\n\n![img](c.md)\n",
            &MarkdownOptions::all(),
        );
        let mut seen = Vec::new();
        doc.for_each_link_mut(|url| seen.push(url.to_string()));
        assert_eq!(seen, vec!["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn test_link_visit_skips_autolinks() {
        let mut doc = parse("<https://example.com> and [x](x.md)", &MarkdownOptions::all());
        let mut seen = Vec::new();
        doc.for_each_link_mut(|url| seen.push(url.to_string()));
        assert_eq!(seen, vec!["x.md"]);
        assert_eq!(doc.link_targets().len(), 2);
    }

    #[test]
    fn test_link_mutation_in_place() {
        let mut doc = parse("[a](a.md)", &MarkdownOptions::all());
        doc.for_each_link_mut(|url| *url = CowStr::from("new/a.md".to_string()));
        assert_eq!(doc.link_targets(), vec!["new/a.md"]);
    }

    #[test]
    fn test_position_and_remove() {
        let mut doc = parse("# One\n\nTwo\n", &MarkdownOptions::all());
        let index = doc
            .position(|n| matches!(n.tag(), Some(Tag::Paragraph)))
            .unwrap();
        assert_eq!(index, 1);
        let removed = doc.remove(index);
        assert_eq!(removed.text(), "Two");
        assert_eq!(doc.len(), 1);
    }
}
