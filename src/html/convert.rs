//! `tl` node walker producing Markdown text.

use tl::{HTMLTag, Node, NodeHandle, Parser};

use super::{HtmlError, HtmlOptions, UnknownTags, decode_entities};

/// Characters that would otherwise be read as Markdown syntax.
const ESCAPED: &[char] = &['\\', '*', '_', '`', '[', ']', '<'];

/// Largest ordered-list marker Markdown accepts (nine digits).
const MAX_LIST_NUMBER: u64 = 999_999_999;

pub(super) struct Walker<'p, 'a> {
    parser: &'p Parser<'a>,
    options: &'p HtmlOptions,
}

impl<'p, 'a> Walker<'p, 'a> {
    pub(super) fn new(parser: &'p Parser<'a>, options: &'p HtmlOptions) -> Self {
        Self { parser, options }
    }

    /// Convert a run of sibling nodes.
    pub(super) fn nodes(&self, handles: &[NodeHandle]) -> Result<String, HtmlError> {
        let mut out = String::new();
        for handle in handles {
            out.push_str(&self.node(*handle)?);
        }
        Ok(out)
    }

    fn node(&self, handle: NodeHandle) -> Result<String, HtmlError> {
        match handle.get(self.parser) {
            Some(Node::Tag(tag)) => self.element(tag),
            Some(Node::Raw(bytes)) => Ok(text(&bytes.as_utf8_str())),
            Some(Node::Comment(bytes)) if !self.options.remove_comments => {
                Ok(comment(&bytes.as_utf8_str()))
            }
            Some(Node::Comment(_)) | None => Ok(String::new()),
        }
    }

    fn children(&self, tag: &HTMLTag<'a>) -> Result<String, HtmlError> {
        self.nodes(&child_handles(tag))
    }

    fn element(&self, tag: &HTMLTag<'a>) -> Result<String, HtmlError> {
        let name = tag_name(tag);
        match name.as_str() {
            // Never content
            "script" | "style" | "head" | "title" | "meta" | "link" | "template" => {
                Ok(String::new())
            }

            // Transparent wrappers
            "html" | "body" | "span" | "font" | "small" | "big" | "u" | "sup" | "sub" | "abbr"
            | "cite" | "label" | "thead" | "tbody" | "tfoot" => self.children(tag),

            // Block containers
            "div" | "p" | "section" | "article" | "header" | "footer" | "main" | "aside"
            | "nav" | "figure" | "figcaption" | "center" | "caption" | "dl" | "dt" | "dd"
            | "tr" => Ok(block(&self.children(tag)?)),

            // Table cells outside of a table
            "th" | "td" => Ok(format!("{} ", self.children(tag)?)),

            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = usize::from(name.as_bytes()[1] - b'0');
                let content = single_line(&self.children(tag)?);
                if content.is_empty() {
                    return Ok(String::new());
                }
                Ok(block(&format!("{} {}", "#".repeat(level), content)))
            }

            "br" => Ok("\\\n".to_string()),
            "hr" => Ok(block("***")),

            "b" | "strong" => Ok(wrap(&self.children(tag)?, "**")),
            "i" | "em" => Ok(wrap(&self.children(tag)?, "*")),
            "s" | "del" | "strike" if self.options.github_flavored => {
                Ok(wrap(&self.children(tag)?, "~~"))
            }
            "s" | "del" | "strike" => self.children(tag),

            "code" | "kbd" | "tt" => Ok(inline_code(&decode_entities(
                &tag.inner_text(self.parser),
            ))),
            "pre" => Ok(self.code_block(tag)),

            "a" => self.link(tag),
            "img" => Ok(image(tag)),

            "ul" => self.list(tag, false),
            "ol" => self.list(tag, true),
            "li" => Ok(block(&list_item("- ", &self.children(tag)?))),

            "blockquote" => Ok(block(&quote(&self.children(tag)?))),
            "table" => self.table(tag),

            _ => match self.options.unknown_tags {
                UnknownTags::Drop => Ok(String::new()),
                UnknownTags::Bypass => self.children(tag),
                UnknownTags::Raise => Err(HtmlError::UnknownTag(name)),
                UnknownTags::Pass => Ok(tag.outer_html(self.parser)),
            },
        }
    }

    fn link(&self, tag: &HTMLTag<'a>) -> Result<String, HtmlError> {
        let content = single_line(&self.children(tag)?);
        let Some(href) = attr(tag, "href").filter(|href| !href.is_empty()) else {
            return Ok(content);
        };
        let content = if content.is_empty() {
            escape(&href)
        } else {
            content
        };
        Ok(format!(
            "[{content}]({}{})",
            destination(&href),
            title_suffix(attr(tag, "title"))
        ))
    }

    fn code_block(&self, tag: &HTMLTag<'a>) -> String {
        let language = code_language(tag)
            .or_else(|| {
                child_handles(tag)
                    .into_iter()
                    .find_map(|handle| match handle.get(self.parser) {
                        Some(Node::Tag(child)) if tag_name(child) == "code" => Some(child),
                        _ => None,
                    })
                    .and_then(code_language)
            })
            .unwrap_or_default();

        let raw = decode_entities(&tag.inner_text(self.parser));
        let code = raw.strip_prefix('\n').unwrap_or(&raw).trim_end();
        if code.is_empty() {
            return String::new();
        }

        if self.options.github_flavored {
            let fence = "`".repeat(longest_run(code, '`').max(2) + 1);
            format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
        } else {
            let indented: Vec<_> = code.lines().map(|line| format!("    {line}")).collect();
            format!("\n\n{}\n\n", indented.join("\n"))
        }
    }

    fn list(&self, tag: &HTMLTag<'a>, ordered: bool) -> Result<String, HtmlError> {
        let mut number = if ordered {
            attr(tag, "start")
                .and_then(|start| start.trim().parse::<u64>().ok())
                .unwrap_or(1)
                .min(MAX_LIST_NUMBER)
        } else {
            1
        };

        // (marker width, rendered item)
        let mut items: Vec<(usize, String)> = Vec::new();

        for handle in child_handles(tag) {
            match handle.get(self.parser) {
                Some(Node::Tag(child)) if tag_name(child) == "li" => {
                    let marker = if ordered {
                        format!("{number}. ")
                    } else {
                        "- ".to_string()
                    };
                    number = number.saturating_add(1).min(MAX_LIST_NUMBER);
                    items.push((marker.len(), list_item(&marker, &self.children(child)?)));
                }
                Some(Node::Raw(bytes)) if bytes.as_utf8_str().trim().is_empty() => {}
                _ => {
                    // Stray content, usually a nested list placed directly in the list
                    let content = tidy(&self.node(handle)?);
                    if content.is_empty() {
                        continue;
                    }
                    match items.last_mut() {
                        Some((width, item)) => {
                            item.push('\n');
                            item.push_str(&indent(&content, *width));
                        }
                        None => items.push((2, list_item("- ", &content))),
                    }
                }
            }
        }

        let rendered: Vec<_> = items.into_iter().map(|(_, item)| item).collect();
        Ok(block(&rendered.join("\n")))
    }

    fn table(&self, tag: &HTMLTag<'a>) -> Result<String, HtmlError> {
        let mut rows = Vec::new();
        let mut caption = String::new();
        self.collect_rows(tag, &mut rows, &mut caption)?;

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut lines = Vec::with_capacity(rows.len() + 1);
        for (index, mut row) in rows.into_iter().enumerate() {
            row.resize(width, String::new());
            lines.push(format!("| {} |", row.join(" | ")));
            if index == 0 {
                lines.push(format!("|{}", " --- |".repeat(width)));
            }
        }

        let mut out = String::new();
        if !caption.is_empty() {
            out.push_str(&block(&caption));
        }
        if width > 0 {
            out.push_str(&block(&lines.join("\n")));
        }
        Ok(out)
    }

    fn collect_rows(
        &self,
        tag: &HTMLTag<'a>,
        rows: &mut Vec<Vec<String>>,
        caption: &mut String,
    ) -> Result<(), HtmlError> {
        for handle in child_handles(tag) {
            let Some(Node::Tag(child)) = handle.get(self.parser) else {
                continue;
            };
            match tag_name(child).as_str() {
                "thead" | "tbody" | "tfoot" => self.collect_rows(child, rows, caption)?,
                "caption" => *caption = single_line(&self.children(child)?),
                "tr" => {
                    let mut cells = Vec::new();
                    for cell_handle in child_handles(child) {
                        if let Some(Node::Tag(cell)) = cell_handle.get(self.parser)
                            && matches!(tag_name(cell).as_str(), "th" | "td")
                        {
                            cells.push(single_line(&self.children(cell)?).replace('|', "\\|"));
                        }
                    }
                    rows.push(cells);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn tag_name(tag: &HTMLTag<'_>) -> String {
    tag.name().as_utf8_str().to_ascii_lowercase()
}

fn child_handles(tag: &HTMLTag<'_>) -> Vec<NodeHandle> {
    tag.children().top().iter().copied().collect()
}

fn attr(tag: &HTMLTag<'_>, name: &'static str) -> Option<String> {
    tag.attributes()
        .get(name)
        .flatten()
        .map(|value| decode_entities(&value.as_utf8_str()))
}

fn code_language(tag: &HTMLTag<'_>) -> Option<String> {
    attr(tag, "class")?.split_whitespace().find_map(|class| {
        class
            .strip_prefix("language-")
            .or_else(|| class.strip_prefix("lang-"))
            .map(str::to_string)
    })
}

/// Text node: decode, collapse whitespace, escape.
///
/// Whitespace-only text spanning a line break is formatting between
/// elements and is dropped; a bare space between inline elements is kept.
fn text(raw: &str) -> String {
    let decoded = decode_entities(raw);
    if decoded.trim().is_empty() {
        return if decoded.is_empty() || decoded.contains('\n') {
            String::new()
        } else {
            " ".to_string()
        };
    }
    escape(&collapse_whitespace(&decoded))
}

fn comment(raw: &str) -> String {
    if raw.starts_with("<!--") {
        raw.to_string()
    } else {
        format!("<!--{raw}-->")
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ESCAPED.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Flatten block content to one line (headings, link text, table cells).
fn single_line(content: &str) -> String {
    collapse_whitespace(&content.replace("\\\n", " "))
        .trim()
        .to_string()
}

fn block(content: &str) -> String {
    format!("\n\n{}\n\n", content.trim_matches('\n'))
}

/// Surround inline content with `marker`, keeping outer spacing outside it.
fn wrap(inner: &str, marker: &str) -> String {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return inner.to_string();
    }
    let lead = if inner.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if inner.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{lead}{marker}{trimmed}{marker}{trail}")
}

fn longest_run(text: &str, needle: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == needle {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn inline_code(code: &str) -> String {
    let code = code.replace('\n', " ");
    if code.trim().is_empty() {
        return String::new();
    }
    let fence = "`".repeat(longest_run(&code, '`') + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

fn destination(href: &str) -> String {
    if href.contains(&[' ', '(', ')', '<', '>'][..]) {
        format!("<{}>", href.replace('<', "%3C").replace('>', "%3E"))
    } else {
        href.to_string()
    }
}

fn title_suffix(title: Option<String>) -> String {
    match title {
        Some(title) if !title.is_empty() => format!(" \"{}\"", title.replace('"', "\\\"")),
        _ => String::new(),
    }
}

fn image(tag: &HTMLTag<'_>) -> String {
    let Some(src) = attr(tag, "src").filter(|src| !src.is_empty()) else {
        return String::new();
    };
    let alt = escape(&single_line(&attr(tag, "alt").unwrap_or_default()));
    format!(
        "![{alt}]({}{})",
        destination(&src),
        title_suffix(attr(tag, "title"))
    )
}

fn indent(content: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    content
        .lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn list_item(marker: &str, content: &str) -> String {
    let body = tidy(content);
    if body.is_empty() {
        return marker.trim_end().to_string();
    }
    let rest = indent(&body, marker.len());
    // First line carries the marker instead of the padding
    format!("{marker}{}", &rest[marker.len()..])
}

fn quote(content: &str) -> String {
    tidy(content)
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize converter output.
///
/// Outside code fences: trailing whitespace is trimmed, blank-line runs
/// collapse to one, and a hard break before a blank line is dropped.
/// Leading and trailing blank lines are removed.
pub(super) fn tidy(markdown: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        let is_fence = {
            let start = line.trim_start();
            start.starts_with("```") || start.starts_with("~~~")
        };

        if in_fence {
            lines.push(line.to_string());
            in_fence = !is_fence;
            continue;
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            match lines.last_mut() {
                None => {}
                Some(last) if last.is_empty() => {}
                Some(last) => {
                    drop_dangling_break(last);
                    lines.push(String::new());
                }
            }
            continue;
        }

        lines.push(trimmed.to_string());
        in_fence = is_fence;
    }

    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    if !in_fence && let Some(last) = lines.last_mut() {
        drop_dangling_break(last);
    }

    lines.join("\n")
}

fn drop_dangling_break(line: &mut String) {
    if line.ends_with('\\') && !line.ends_with("\\\\") {
        line.pop();
        let len = line.trim_end().len();
        line.truncate(len);
    }
}
