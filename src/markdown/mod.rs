//! Markdown document model.
//!
//! - [`convert`] - `pulldown-cmark` event stream → owned [`Document`] tree
//! - [`tree`] - [`Document`] / [`Node`] and in-place mutation helpers
//! - [`render`] - [`Document`] → normalized Markdown text via `pulldown-cmark-to-cmark`

pub mod convert;
pub mod render;
pub mod tree;

pub use convert::{MarkdownOptions, parse};
pub use render::{RenderError, render};
pub use tree::{Document, Node};
