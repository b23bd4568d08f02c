//! Replace raw HTML blocks with their Markdown equivalent.

use crate::html::{HtmlConverter, HtmlError};
use crate::markdown::{self, MarkdownOptions, Node};

/// Convert every HTML block of `nodes` (and of nested block containers)
/// into re-parsed Markdown, in place. Returns the number of blocks replaced.
///
/// Blocks are snapshotted and converted before anything is replaced, so a
/// failed conversion leaves the level untouched and replacement never
/// shifts the position of a block still waiting in the snapshot.
pub fn rewrite_html(
    nodes: &mut Vec<Node>,
    converter: &HtmlConverter,
    options: &MarkdownOptions,
) -> Result<usize, HtmlError> {
    let replacements = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_html_block())
        .map(|(index, node)| {
            let converted = converter.convert(&node.text())?;
            Ok((index, markdown::parse(&converted, options).into_nodes()))
        })
        .collect::<Result<Vec<_>, HtmlError>>()?;

    let mut replaced = replacements.len();

    if !replacements.is_empty() {
        let mut replacements = replacements.into_iter().peekable();
        let original = std::mem::take(nodes);
        for (index, node) in original.into_iter().enumerate() {
            match replacements.next_if(|(at, _)| *at == index) {
                Some((_, subtree)) => nodes.extend(subtree),
                None => nodes.push(node),
            }
        }
    }

    for node in nodes.iter_mut() {
        if let Node::Container { children, .. } = node {
            replaced += rewrite_html(children, converter, options)?;
        }
    }

    Ok(replaced)
}
