// SPDX-License-Identifier: AGPL-3.0-or-later
//! Parser and Renderer traits, their configuration, and the conversion error type

use crate::ast::{Document, SourceFormat};

/// Error type for parsing and rendering
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("cannot decode input as {encoding}: {message}")]
    Encoding { encoding: String, message: String },

    #[error("no AsciiDoc mapping for {kind} node at line {line}, column {column}")]
    UnsupportedNode {
        kind: String,
        line: u32,
        column: u32,
    },

    #[error("footnote reference [^{label}] has no definition")]
    UnresolvedFootnote { label: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Front matter delimiter used when none is configured
pub const DEFAULT_FRONT_MATTER_DELIMITER: &str = "---";

/// Configuration for parsing
///
/// Built once and handed to every call; the engine never mutates it.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Record source positions on blocks for error reporting
    pub preserve_spans: bool,
    /// Keep raw source on the document
    pub preserve_raw_source: bool,
    /// Custom front matter delimiter (default: "---")
    pub front_matter_delimiter: Option<String>,
    /// Convert straight quotes and dashes to typographic ones
    pub smart_punctuation: bool,
    /// Recognise `$...$` and `$$...$$` math
    pub math: bool,
    /// Read `__text__` as underline instead of strong
    pub underline: bool,
}

impl ParseConfig {
    pub fn front_matter_delimiter(&self) -> &str {
        self.front_matter_delimiter
            .as_deref()
            .unwrap_or(DEFAULT_FRONT_MATTER_DELIMITER)
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            preserve_spans: true,
            preserve_raw_source: false,
            front_matter_delimiter: None,
            smart_punctuation: false,
            math: true,
            underline: false,
        }
    }
}

/// Configuration for rendering
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Render soft line breaks as hard breaks
    pub hard_breaks: bool,
    /// Turn menu-path and keyboard idioms into `menu:`/`kbd:` macros
    pub ui_macros: bool,
    /// Rewrite links to `.md` files as `xref:` to the `.adoc` sibling
    pub rewrite_markdown_links: bool,
    /// Pad table cells so columns line up in the source
    pub align_tables: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            hard_breaks: false,
            ui_macros: true,
            rewrite_markdown_links: true,
            align_tables: false,
        }
    }
}

/// Parser trait: convert source text to a Document
pub trait Parser: Send + Sync {
    /// The source format this parser handles
    fn format(&self) -> SourceFormat;

    /// Parse a string into a Document
    fn parse(&self, input: &str, config: &ParseConfig) -> Result<Document>;
}

/// Renderer trait: convert a Document to target text
pub trait Renderer: Send + Sync {
    /// The target format this renderer produces
    fn format(&self) -> SourceFormat;

    /// Render a Document to a string
    fn render(&self, doc: &Document, config: &RenderConfig) -> Result<String>;
}
