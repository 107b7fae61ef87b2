// SPDX-License-Identifier: AGPL-3.0-or-later
//! Document node tree consumed by the AsciiDoc renderer
//!
//! The tree is produced once by a parser adapter and is immutable afterwards.
//! Parents own their children; nothing in here points back up the tree.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Document attributes (`:name: value` header entries).
///
/// An empty value renders as a valueless attribute, e.g. `:experimental:`.
pub type Attributes = BTreeMap<String, String>;

/// Format a raw block or inline was captured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Markdown,
    AsciiDoc,
    Html,
}

impl SourceFormat {
    /// File extension for this format
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::AsciiDoc => "adoc",
            Self::Html => "html",
        }
    }

    /// Short display name
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Markdown => "MD",
            Self::AsciiDoc => "ADOC",
            Self::Html => "HTML",
        }
    }
}

/// Source position of a block, 1-based, as reported by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

/// Document metadata taken from the front matter block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub date: Option<String>,
    pub language: Option<String>,
    /// Remaining front matter keys
    pub custom: HashMap<String, MetaValue>,
}

impl DocumentMeta {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_empty()
            && self.date.is_none()
            && self.language.is_none()
            && self.custom.is_empty()
    }
}

/// Metadata value (recursive for nested structures)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
    List(Vec<MetaValue>),
    Map(HashMap<String, MetaValue>),
}

impl MetaValue {
    /// Scalar rendering used for attribute values; `None` for null and
    /// nested values, which have no attribute form.
    pub fn as_scalar(&self) -> Option<String> {
        match self {
            MetaValue::String(s) => Some(s.clone()),
            MetaValue::Bool(b) => Some(b.to_string()),
            MetaValue::Integer(i) => Some(i.to_string()),
            MetaValue::Float(f) => Some(f.to_string()),
            MetaValue::Null | MetaValue::List(_) | MetaValue::Map(_) => None,
        }
    }
}

/// The root document node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub source_format: SourceFormat,
    pub meta: DocumentMeta,
    pub content: Vec<Block>,
    /// Preserved raw source (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_source: Option<String>,
}

impl Document {
    /// Create a new empty document
    pub fn new(format: SourceFormat) -> Self {
        Self {
            source_format: format,
            meta: DocumentMeta::default(),
            content: Vec::new(),
            raw_source: None,
        }
    }
}

/// Block-level elements (structural)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Plain paragraph
    Paragraph {
        content: Vec<Inline>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Heading with level 1-6
    Heading {
        level: u8,
        content: Vec<Inline>,
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Code block with optional language
    CodeBlock {
        language: Option<String>,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Block quote (may be nested)
    BlockQuote {
        content: Vec<Block>,
        attribution: Option<Vec<Inline>>,
        admonition: Option<AdmonitionType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Bullet, ordered or task list
    List {
        kind: ListKind,
        items: Vec<ListItem>,
        start: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Definition list (term + definitions)
    DefinitionList {
        items: Vec<DefinitionItem>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Table
    Table {
        caption: Option<Vec<Inline>>,
        columns: Vec<ColumnSpec>,
        header: Option<TableRow>,
        body: Vec<TableRow>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Horizontal rule / thematic break
    ThematicBreak {
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Math block (display mode)
    MathBlock {
        content: String,
        notation: MathNotation,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Generic container with id and roles
    Container {
        id: Option<String>,
        classes: Vec<String>,
        content: Vec<Block>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Figure with caption
    Figure {
        content: Vec<Block>,
        caption: Option<Vec<Inline>>,
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// HTML comment block; `content` excludes the `<!--`/`-->` markers
    Comment {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Raw content passed through from the source
    Raw {
        format: SourceFormat,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Footnote definition
    FootnoteDefinition {
        label: String,
        content: Vec<Block>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },

    /// Table of contents placeholder
    TableOfContents {
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<Span>,
    },
}

impl Block {
    /// Source position, if the parser recorded one
    pub fn span(&self) -> Option<Span> {
        match self {
            Block::Paragraph { span, .. }
            | Block::Heading { span, .. }
            | Block::CodeBlock { span, .. }
            | Block::BlockQuote { span, .. }
            | Block::List { span, .. }
            | Block::DefinitionList { span, .. }
            | Block::Table { span, .. }
            | Block::ThematicBreak { span }
            | Block::MathBlock { span, .. }
            | Block::Container { span, .. }
            | Block::Figure { span, .. }
            | Block::Comment { span, .. }
            | Block::Raw { span, .. }
            | Block::FootnoteDefinition { span, .. }
            | Block::TableOfContents { span } => *span,
        }
    }

    /// Node kind name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { .. } => "heading",
            Block::CodeBlock { .. } => "code_block",
            Block::BlockQuote { .. } => "block_quote",
            Block::List { .. } => "list",
            Block::DefinitionList { .. } => "definition_list",
            Block::Table { .. } => "table",
            Block::ThematicBreak { .. } => "thematic_break",
            Block::MathBlock { .. } => "math_block",
            Block::Container { .. } => "container",
            Block::Figure { .. } => "figure",
            Block::Comment { .. } => "comment",
            Block::Raw { .. } => "raw",
            Block::FootnoteDefinition { .. } => "footnote_definition",
            Block::TableOfContents { .. } => "table_of_contents",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Ordered,
    Task,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub content: Vec<Block>,
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionItem {
    pub term: Vec<Inline>,
    pub definitions: Vec<Vec<Block>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlignment {
    Left,
    Center,
    Right,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub alignment: ColumnAlignment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub content: Vec<Inline>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmonitionType {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AdmonitionType {
    /// Parse a GitHub alert label such as `NOTE` (case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "NOTE" => Some(Self::Note),
            "TIP" => Some(Self::Tip),
            "IMPORTANT" => Some(Self::Important),
            "WARNING" => Some(Self::Warning),
            "CAUTION" => Some(Self::Caution),
            _ => None,
        }
    }

    /// AsciiDoc admonition style name
    pub const fn style(&self) -> &'static str {
        match self {
            Self::Note => "NOTE",
            Self::Tip => "TIP",
            Self::Important => "IMPORTANT",
            Self::Warning => "WARNING",
            Self::Caution => "CAUTION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathNotation {
    LaTeX,
    AsciiMath,
}

/// Inline elements (character-level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// Plain text
    Text { content: String },

    /// Emphasis (usually italic)
    Emphasis { content: Vec<Inline> },

    /// Strong emphasis (usually bold)
    Strong { content: Vec<Inline> },

    Strikethrough { content: Vec<Inline> },

    Underline { content: Vec<Inline> },

    Superscript { content: Vec<Inline> },

    Subscript { content: Vec<Inline> },

    SmallCaps { content: Vec<Inline> },

    /// Inline code
    Code { content: String },

    /// Inline math
    Math { content: String, notation: MathNotation },

    /// Hyperlink
    Link {
        url: String,
        title: Option<String>,
        content: Vec<Inline>,
        link_type: LinkType,
    },

    /// Image
    Image {
        url: String,
        alt: String,
        title: Option<String>,
        width: Option<String>,
        height: Option<String>,
    },

    /// Footnote reference
    FootnoteRef { label: String },

    /// Citation
    Citation { keys: Vec<String> },

    /// Line break (hard break)
    LineBreak,

    /// Soft break (may become space or newline)
    SoftBreak,

    NonBreakingSpace,

    /// Generic span with roles
    Span {
        id: Option<String>,
        classes: Vec<String>,
        content: Vec<Inline>,
    },

    /// Raw inline content from the source
    RawInline { format: SourceFormat, content: String },

    /// Quoted text
    Quoted {
        quote_type: QuoteType,
        content: Vec<Inline>,
    },

    /// Keyboard input
    Keyboard { content: String },

    /// Highlight/mark
    Highlight { content: Vec<Inline> },
}

impl Inline {
    /// Concatenated text of this element and its descendants, without markup
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Inline::Text { content } | Inline::Code { content } | Inline::Keyboard { content } => {
                out.push_str(content)
            }
            Inline::Math { content, .. } => out.push_str(content),
            Inline::Emphasis { content }
            | Inline::Strong { content }
            | Inline::Strikethrough { content }
            | Inline::Underline { content }
            | Inline::Superscript { content }
            | Inline::Subscript { content }
            | Inline::SmallCaps { content }
            | Inline::Highlight { content }
            | Inline::Link { content, .. }
            | Inline::Span { content, .. }
            | Inline::Quoted { content, .. } => {
                for inline in content {
                    inline.collect_text(out);
                }
            }
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak | Inline::LineBreak | Inline::NonBreakingSpace => out.push(' '),
            Inline::FootnoteRef { .. } | Inline::Citation { .. } | Inline::RawInline { .. } => {}
        }
    }
}

/// Plain text of a run of inlines
pub fn plain_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Inline,
    Reference,
    AutoLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteType {
    Single,
    Double,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Inline {
        Inline::Text {
            content: s.to_string(),
        }
    }

    #[test]
    fn test_document_new() {
        let doc = Document::new(SourceFormat::Markdown);
        assert_eq!(doc.source_format, SourceFormat::Markdown);
        assert!(doc.content.is_empty());
        assert!(doc.meta.is_empty());
    }

    #[test]
    fn test_plain_text_flattens_markup() {
        let inlines = vec![
            text("File "),
            Inline::Strong {
                content: vec![text("> "), Inline::Emphasis { content: vec![text("Save")] }],
            },
            Inline::FootnoteRef {
                label: "1".to_string(),
            },
        ];
        assert_eq!(plain_text(&inlines), "File > Save");
    }

    #[test]
    fn test_admonition_labels() {
        assert_eq!(AdmonitionType::from_label("note"), Some(AdmonitionType::Note));
        assert_eq!(AdmonitionType::from_label("CAUTION"), Some(AdmonitionType::Caution));
        assert_eq!(AdmonitionType::from_label("danger"), None);
        assert_eq!(AdmonitionType::Tip.style(), "TIP");
    }

    #[test]
    fn test_meta_value_scalars() {
        assert_eq!(MetaValue::Integer(3).as_scalar().as_deref(), Some("3"));
        assert_eq!(MetaValue::Bool(true).as_scalar().as_deref(), Some("true"));
        assert_eq!(MetaValue::Null.as_scalar(), None);
        assert_eq!(MetaValue::List(vec![]).as_scalar(), None);
    }

    #[test]
    fn test_block_span_and_kind() {
        let span = Span {
            line: 3,
            column: 1,
            end_line: 3,
            end_column: 8,
        };
        let block = Block::ThematicBreak { span: Some(span) };
        assert_eq!(block.span(), Some(span));
        assert_eq!(block.kind(), "thematic_break");
    }
}
