//! Markdown to document tree conversion using pulldown-cmark.

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag};

use super::{Document, Node};

/// Options for markdown parsing.
///
/// The same options are used for the main parse and for re-parsing
/// converted HTML islands, so both produce compatible subtrees.
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
    /// Recognize a leading `---` block as YAML front-matter
    pub metadata_blocks: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
            metadata_blocks: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        if self.metadata_blocks {
            opts.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        }
        opts
    }
}

/// Open container waiting for its end event
struct StackFrame {
    tag: Tag<'static>,
    children: Vec<Node>,
}

/// Event stream to tree folder
#[derive(Default)]
struct TreeBuilder {
    /// Stack of open containers (for nested structures)
    stack: Vec<StackFrame>,
    /// Top-level blocks (collected when stack is empty)
    root: Vec<Node>,
}

impl TreeBuilder {
    fn build<'a>(mut self, events: impl Iterator<Item = Event<'a>>) -> Document {
        for event in events {
            self.handle_event(event);
        }

        // Unbalanced input cannot come out of pulldown-cmark, but close
        // anything left open rather than dropping it.
        while let Some(frame) = self.stack.pop() {
            self.add_node(Node::Container {
                tag: frame.tag,
                children: frame.children,
            });
        }

        Document::from_nodes(self.root)
    }

    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.stack.push(StackFrame {
                tag: inline_link_style(tag.into_static()),
                children: Vec::new(),
            }),
            Event::End(_) => {
                if let Some(frame) = self.stack.pop() {
                    self.add_node(Node::Container {
                        tag: frame.tag,
                        children: frame.children,
                    });
                }
            }
            Event::Text(text) if text.is_empty() => {}
            event => self.add_node(Node::Leaf(event.into_static())),
        }
    }

    /// Add a node to current context (top of stack or root)
    fn add_node(&mut self, node: Node) {
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(node);
        } else {
            self.root.push(node);
        }
    }
}

/// Rewrite reference-style links and images as inline ones.
///
/// Reference definitions are resolved by the parser and never surface as
/// events, so a reference link would lose its definition on render.
fn inline_link_style(tag: Tag<'static>) -> Tag<'static> {
    match tag {
        Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        } => {
            let (link_type, id) = flatten_reference(link_type, id);
            Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }
        }
        Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        } => {
            let (link_type, id) = flatten_reference(link_type, id);
            Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }
        }
        other => other,
    }
}

fn flatten_reference(link_type: LinkType, id: CowStr<'static>) -> (LinkType, CowStr<'static>) {
    match link_type {
        LinkType::Reference
        | LinkType::ReferenceUnknown
        | LinkType::Collapsed
        | LinkType::CollapsedUnknown
        | LinkType::Shortcut
        | LinkType::ShortcutUnknown => (LinkType::Inline, CowStr::Borrowed("")),
        other => (other, id),
    }
}

/// Parse markdown text into an owned document tree
pub fn parse(markdown: &str, options: &MarkdownOptions) -> Document {
    let parser = Parser::new_ext(markdown, options.to_pulldown_options());
    TreeBuilder::default().build(parser)
}
