//! HTML to Markdown conversion.
//!
//! Raw HTML islands are parsed with `tl` and walked into Markdown text.
//! The result is plain Markdown meant to be re-parsed, not rendered HTML.

mod convert;
mod entity;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use entity::decode_entities;

/// What to do with tags the converter has no Markdown mapping for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownTags {
    /// Remove the tag and everything inside it.
    #[default]
    Drop,
    /// Remove the tag, convert its content.
    Bypass,
    /// Fail the conversion.
    Raise,
    /// Keep the tag verbatim as HTML.
    Pass,
}

/// Converter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlOptions {
    pub unknown_tags: UnknownTags,
    /// Fenced code blocks and `~~strikethrough~~`.
    pub github_flavored: bool,
    pub remove_comments: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            unknown_tags: UnknownTags::Drop,
            github_flavored: true,
            remove_comments: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum HtmlError {
    #[error("failed to parse HTML: {0}")]
    Parse(String),

    #[error("unknown HTML tag <{0}>")]
    UnknownTag(String),
}

/// HTML fragment to Markdown text converter.
#[derive(Debug, Clone, Default)]
pub struct HtmlConverter {
    options: HtmlOptions,
}

impl HtmlConverter {
    pub fn new(options: HtmlOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HtmlOptions {
        &self.options
    }

    /// Convert an HTML fragment to Markdown text.
    pub fn convert(&self, html: &str) -> Result<String, HtmlError> {
        let dom = tl::parse(html, tl::ParserOptions::default())
            .map_err(|err| HtmlError::Parse(format!("{err:?}")))?;
        let walker = convert::Walker::new(dom.parser(), &self.options);
        let markdown = walker.nodes(dom.children())?;
        Ok(convert::tidy(&markdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(html: &str) -> String {
        HtmlConverter::default().convert(html).unwrap()
    }

    fn md_with(html: &str, unknown_tags: UnknownTags) -> Result<String, HtmlError> {
        HtmlConverter::new(HtmlOptions {
            unknown_tags,
            ..HtmlOptions::default()
        })
        .convert(html)
    }

    #[test]
    fn test_bold_in_div() {
        assert_eq!(md("<div><b>hi</b></div>"), "**hi**");
    }

    #[test]
    fn test_paragraphs_are_separated() {
        assert_eq!(md("<p>one</p><p>two</p>"), "one\n\ntwo");
    }

    #[test]
    fn test_inline_formatting() {
        assert_eq!(
            md("<p>a <em>b</em> <strong>c</strong> <code>d</code></p>"),
            "a *b* **c** `d`"
        );
    }

    #[test]
    fn test_heading() {
        assert_eq!(md("<h2>Sub  title</h2>"), "## Sub title");
    }

    #[test]
    fn test_link_and_image() {
        assert_eq!(
            md(r#"<a href="other.md" title="Other">see</a>"#),
            r#"[see](other.md "Other")"#
        );
        assert_eq!(md(r#"<img src="x.png" alt="X">"#), "![X](x.png)");
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(md("<ul><li>one</li><li>two</li></ul>"), "- one\n- two");
    }

    #[test]
    fn test_ordered_list_with_start() {
        assert_eq!(
            md(r#"<ol start="3"><li>c</li><li>d</li></ol>"#),
            "3. c\n4. d"
        );
    }

    #[test]
    fn test_ordered_list_huge_start_clamped() {
        assert_eq!(
            md(r#"<ol start="18446744073709551615"><li>a</li><li>b</li></ol>"#),
            "999999999. a\n999999999. b"
        );
        assert_eq!(
            md(r#"<ol start="999999998"><li>a</li><li>b</li><li>c</li></ol>"#),
            "999999998. a\n999999999. b\n999999999. c"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(md("<blockquote><p>quoted</p></blockquote>"), "> quoted");
    }

    #[test]
    fn test_pre_code_fenced_with_language() {
        let out = md("<pre><code class=\"language-csharp\">var x = 1;\nvar y = 2;</code></pre>");
        assert_eq!(out, "```csharp\nvar x = 1;\nvar y = 2;\n```");
    }

    #[test]
    fn test_pre_code_indented_without_gfm() {
        let converter = HtmlConverter::new(HtmlOptions {
            github_flavored: false,
            ..HtmlOptions::default()
        });
        let out = converter.convert("<pre>a &lt; b</pre>").unwrap();
        assert_eq!(out, "    a < b");
    }

    #[test]
    fn test_table() {
        let out = md(
            "<table><thead><tr><th>A</th><th>B</th></tr></thead>\
             <tbody><tr><td>1</td><td>2|3</td></tr></tbody></table>",
        );
        assert_eq!(out, "| A | B |\n| --- | --- |\n| 1 | 2\\|3 |");
    }

    #[test]
    fn test_entities_and_escaping() {
        assert_eq!(md("<p>a &amp; b *c*</p>"), "a & b \\*c\\*");
    }

    #[test]
    fn test_unknown_tag_dropped() {
        assert_eq!(md("<div>keep<blink>gone</blink></div>"), "keep");
    }

    #[test]
    fn test_unknown_tag_bypassed() {
        let out = md_with("<div>keep <blink>shown</blink></div>", UnknownTags::Bypass).unwrap();
        assert_eq!(out, "keep shown");
    }

    #[test]
    fn test_unknown_tag_raised() {
        let err = md_with("<blink>x</blink>", UnknownTags::Raise).unwrap_err();
        assert!(matches!(err, HtmlError::UnknownTag(tag) if tag == "blink"));
    }

    #[test]
    fn test_script_always_removed() {
        let out = md_with("<p>a</p><script>alert(1)</script>", UnknownTags::Bypass).unwrap();
        assert_eq!(out, "a");
    }

    #[test]
    fn test_comments_removed_by_default() {
        assert_eq!(md("<p>a<!-- note --></p>"), "a");
    }

    #[test]
    fn test_unknown_tags_policy_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            html: HtmlOptions,
        }
        let parsed: Wrapper = toml::from_str("[html]\nunknown_tags = \"bypass\"").unwrap();
        assert_eq!(parsed.html.unknown_tags, UnknownTags::Bypass);
        assert!(parsed.html.github_flavored);
    }
}
