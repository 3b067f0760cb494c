//! # Folio HTML Compiler
//!
//! Serializes a document tree to HTML, renders and parses the inline markup
//! of text nodes, and converts tables to and from markdown.

mod compiler;
pub mod inline;
pub mod markdown;

pub use compiler::{compile_node, compile_to_html, CompileError, CompileOptions};
pub use inline::{parse_inline, render_inline, text_segments};
pub use markdown::{parse_markdown_table, parse_table_content, table_to_markdown, MarkdownError};
