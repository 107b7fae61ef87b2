// SPDX-License-Identifier: AGPL-3.0-or-later
//! Markdown parser adapter using comrak
//!
//! comrak does the Markdown grammar; this module only maps its arena tree
//! onto the crate's owned node tree. A comrak node without a mapping is an
//! error, never a silent drop.

use crate::ast::{
    plain_text, AdmonitionType, Block, ColumnAlignment, ColumnSpec, DefinitionItem, Document,
    DocumentMeta, Inline, LinkType, ListItem, ListKind, MathNotation, SourceFormat, Span,
    TableCell, TableRow,
};
use crate::front_matter;
use crate::traits::{ConversionError, ParseConfig, Parser, Result};
use comrak::nodes::{AstNode, ListType, NodeValue, TableAlignment};
use comrak::{parse_document, Arena, Options};

/// Markdown parser using comrak (GFM-compatible)
pub struct MarkdownHandler;

impl MarkdownHandler {
    pub fn new() -> Self {
        Self
    }

    fn comrak_options(config: &ParseConfig) -> Options<'static> {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.description_lists = true;
        options.extension.superscript = true;
        options.extension.math_dollars = config.math;
        options.extension.underline = config.underline;
        options.parse.smart = config.smart_punctuation;
        options
    }

    /// Parse a body whose front matter has already been split off
    pub fn parse_body(
        &self,
        body: &str,
        meta: DocumentMeta,
        config: &ParseConfig,
    ) -> Result<Document> {
        let arena = Arena::new();
        let options = Self::comrak_options(config);
        let root = parse_document(&arena, body, &options);

        let content = parse_children(root, config)?;

        Ok(Document {
            source_format: SourceFormat::Markdown,
            meta,
            content,
            raw_source: if config.preserve_raw_source {
                Some(body.to_string())
            } else {
                None
            },
        })
    }
}

impl Default for MarkdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for MarkdownHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::Markdown
    }

    fn parse(&self, input: &str, config: &ParseConfig) -> Result<Document> {
        let (meta, body) = front_matter::extract(input, config.front_matter_delimiter());
        let mut doc = self.parse_body(body, meta, config)?;
        if config.preserve_raw_source {
            doc.raw_source = Some(input.to_string());
        }
        Ok(doc)
    }
}

fn span_of<'a>(node: &'a AstNode<'a>, config: &ParseConfig) -> Option<Span> {
    if !config.preserve_spans {
        return None;
    }
    let pos = node.data.borrow().sourcepos;
    Some(Span {
        line: to_u32(pos.start.line),
        column: to_u32(pos.start.column),
        end_line: to_u32(pos.end.line),
        end_column: to_u32(pos.end.column),
    })
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// `Strikethrough` -> `strikethrough`, `HtmlInline("..")` -> `html_inline`
fn node_kind(value: &NodeValue) -> String {
    let debug = format!("{value:?}");
    let name: String = debug.chars().take_while(|c| c.is_alphanumeric()).collect();
    let mut kind = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                kind.push('_');
            }
            kind.extend(c.to_lowercase());
        } else {
            kind.push(c);
        }
    }
    kind
}

fn unsupported<'a>(node: &'a AstNode<'a>) -> ConversionError {
    let data = node.data.borrow();
    ConversionError::UnsupportedNode {
        kind: node_kind(&data.value),
        line: to_u32(data.sourcepos.start.line),
        column: to_u32(data.sourcepos.start.column),
    }
}

fn parse_children<'a>(node: &'a AstNode<'a>, config: &ParseConfig) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();
    for child in node.children() {
        if let Some(block) = parse_node(child, config)? {
            blocks.push(block);
        }
    }
    Ok(blocks)
}

fn parse_node<'a>(node: &'a AstNode<'a>, config: &ParseConfig) -> Result<Option<Block>> {
    let span = span_of(node, config);
    let data = node.data.borrow();

    let block = match &data.value {
        NodeValue::Document => return Ok(None),

        NodeValue::Paragraph => {
            if let Some(math) = display_math(node) {
                Block::MathBlock {
                    content: math,
                    notation: MathNotation::LaTeX,
                    span,
                }
            } else {
                let content = parse_inlines(node)?;
                if is_toc_marker(&content) {
                    Block::TableOfContents { span }
                } else {
                    Block::Paragraph { content, span }
                }
            }
        }

        NodeValue::Heading(heading) => Block::Heading {
            level: heading.level,
            content: parse_inlines(node)?,
            id: None,
            span,
        },

        NodeValue::CodeBlock(code) => Block::CodeBlock {
            language: code.info.split_whitespace().next().map(str::to_string),
            content: code.literal.clone(),
            span,
        },

        NodeValue::BlockQuote => {
            let mut content = parse_children(node, config)?;
            let admonition = take_alert_marker(&mut content);
            Block::BlockQuote {
                content,
                attribution: None,
                admonition,
                span,
            }
        }

        NodeValue::List(list) => {
            let kind = if list.list_type == ListType::Ordered {
                ListKind::Ordered
            } else {
                let is_task = node
                    .children()
                    .any(|child| matches!(child.data.borrow().value, NodeValue::TaskItem { .. }));
                if is_task {
                    ListKind::Task
                } else {
                    ListKind::Bullet
                }
            };

            let mut items = Vec::new();
            for child in node.children() {
                let checked = match child.data.borrow().value {
                    NodeValue::TaskItem(symbol) => Some(symbol.is_some()),
                    _ => None,
                };
                items.push(ListItem {
                    content: parse_children(child, config)?,
                    checked,
                });
            }

            Block::List {
                kind,
                items,
                start: if kind == ListKind::Ordered && list.start != 1 {
                    Some(to_u32(list.start))
                } else {
                    None
                },
                span,
            }
        }

        // Handled by List
        NodeValue::Item(_) | NodeValue::TaskItem(_) => return Ok(None),

        NodeValue::DescriptionList => {
            let mut items = Vec::new();
            for item in node.children() {
                let mut term = Vec::new();
                let mut definitions = Vec::new();
                for part in item.children() {
                    match part.data.borrow().value {
                        NodeValue::DescriptionTerm => {
                            for paragraph in part.children() {
                                term.extend(parse_inlines(paragraph)?);
                            }
                        }
                        NodeValue::DescriptionDetails => {
                            definitions.push(parse_children(part, config)?);
                        }
                        _ => return Err(unsupported(part)),
                    }
                }
                items.push(DefinitionItem { term, definitions });
            }
            Block::DefinitionList { items, span }
        }

        NodeValue::ThematicBreak => Block::ThematicBreak { span },

        NodeValue::Table(table) => {
            let columns = table
                .alignments
                .iter()
                .map(|alignment| ColumnSpec {
                    alignment: match alignment {
                        TableAlignment::Left => ColumnAlignment::Left,
                        TableAlignment::Center => ColumnAlignment::Center,
                        TableAlignment::Right => ColumnAlignment::Right,
                        TableAlignment::None => ColumnAlignment::Default,
                    },
                })
                .collect();

            let mut header = None;
            let mut body = Vec::new();
            for child in node.children() {
                let is_header = match child.data.borrow().value {
                    NodeValue::TableRow(is_header) => is_header,
                    _ => return Err(unsupported(child)),
                };
                let mut cells = Vec::new();
                for cell in child.children() {
                    cells.push(TableCell {
                        content: parse_inlines(cell)?,
                    });
                }
                let row = TableRow { cells };
                if is_header {
                    header = Some(row);
                } else {
                    body.push(row);
                }
            }

            Block::Table {
                caption: None,
                columns,
                header,
                body,
                span,
            }
        }

        NodeValue::FootnoteDefinition(def) => Block::FootnoteDefinition {
            label: def.name.clone(),
            content: parse_children(node, config)?,
            span,
        },

        NodeValue::HtmlBlock(html) => match comment_body(&html.literal) {
            Some(comment) => Block::Comment {
                content: comment.to_string(),
                span,
            },
            None => Block::Raw {
                format: SourceFormat::Html,
                content: html.literal.trim_end_matches('\n').to_string(),
                span,
            },
        },

        _ => return Err(unsupported(node)),
    };

    Ok(Some(block))
}

/// Inner text of an HTML block made of exactly one comment
fn comment_body(literal: &str) -> Option<&str> {
    let trimmed = literal.trim();
    let inner = trimmed.strip_prefix("<!--")?.strip_suffix("-->")?;
    if inner.contains("-->") {
        return None;
    }
    Some(inner)
}

/// A paragraph holding nothing but `$$...$$` is a display math block
fn display_math<'a>(node: &'a AstNode<'a>) -> Option<String> {
    let mut children = node.children();
    let only = children.next()?;
    if children.next().is_some() {
        return None;
    }
    match &only.data.borrow().value {
        NodeValue::Math(math) if math.display_math => Some(math.literal.clone()),
        _ => None,
    }
}

fn is_toc_marker(content: &[Inline]) -> bool {
    matches!(content, [Inline::Text { content }] if content.trim().eq_ignore_ascii_case("[TOC]"))
}

/// Strip a GitHub alert marker (`[!NOTE]`) from the start of a quote
fn take_alert_marker(content: &mut Vec<Block>) -> Option<AdmonitionType> {
    let Some(Block::Paragraph { content: inlines, .. }) = content.first_mut() else {
        return None;
    };
    let Some(Inline::Text { content: first }) = inlines.first_mut() else {
        return None;
    };
    let rest = first.strip_prefix("[!")?;
    let (label, after) = rest.split_once(']')?;
    let admonition = AdmonitionType::from_label(label)?;

    let after = after.trim_start().to_string();
    if after.is_empty() {
        inlines.remove(0);
        if matches!(inlines.first(), Some(Inline::SoftBreak | Inline::LineBreak)) {
            inlines.remove(0);
        }
    } else {
        *first = after;
    }
    if inlines.is_empty() {
        content.remove(0);
    }
    Some(admonition)
}

fn parse_inlines<'a>(node: &'a AstNode<'a>) -> Result<Vec<Inline>> {
    let mut inlines = Vec::new();
    for child in node.children() {
        inlines.push(parse_inline(child)?);
    }
    Ok(fold_keyboard(merge_text(inlines)))
}

fn parse_inline<'a>(node: &'a AstNode<'a>) -> Result<Inline> {
    let data = node.data.borrow();

    let inline = match &data.value {
        NodeValue::Text(text) => Inline::Text {
            content: text.clone(),
        },

        NodeValue::SoftBreak => Inline::SoftBreak,

        NodeValue::LineBreak => Inline::LineBreak,

        NodeValue::Code(code) => Inline::Code {
            content: code.literal.clone(),
        },

        NodeValue::Emph => Inline::Emphasis {
            content: parse_inlines(node)?,
        },

        NodeValue::Strong => Inline::Strong {
            content: parse_inlines(node)?,
        },

        NodeValue::Strikethrough => Inline::Strikethrough {
            content: parse_inlines(node)?,
        },

        NodeValue::Superscript => Inline::Superscript {
            content: parse_inlines(node)?,
        },

        NodeValue::Underline => Inline::Underline {
            content: parse_inlines(node)?,
        },

        NodeValue::Link(link) => {
            let content = parse_inlines(node)?;
            let text = plain_text(&content);
            let link_type = if text == link.url || format!("mailto:{text}") == link.url {
                LinkType::AutoLink
            } else {
                LinkType::Inline
            };
            Inline::Link {
                url: link.url.clone(),
                title: if link.title.is_empty() {
                    None
                } else {
                    Some(link.title.clone())
                },
                content,
                link_type,
            }
        }

        NodeValue::Image(image) => Inline::Image {
            url: image.url.clone(),
            alt: plain_text(&parse_inlines(node)?),
            title: if image.title.is_empty() {
                None
            } else {
                Some(image.title.clone())
            },
            width: None,
            height: None,
        },

        NodeValue::FootnoteReference(fr) => Inline::FootnoteRef {
            label: fr.name.clone(),
        },

        NodeValue::HtmlInline(html) => Inline::RawInline {
            format: SourceFormat::Html,
            content: html.clone(),
        },

        NodeValue::Math(math) => Inline::Math {
            content: math.literal.clone(),
            notation: MathNotation::LaTeX,
        },

        _ => return Err(unsupported(node)),
    };

    Ok(inline)
}

/// comrak leaves bracket and delimiter runs as separate text nodes
fn merge_text(inlines: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(inlines.len());
    for inline in inlines {
        match (merged.last_mut(), inline) {
            (Some(Inline::Text { content: prev }), Inline::Text { content }) => {
                prev.push_str(&content)
            }
            (_, inline) => merged.push(inline),
        }
    }
    merged
}

fn is_tag(inline: Option<&Inline>, tag: &str) -> bool {
    matches!(inline, Some(Inline::RawInline { content, .. }) if content.trim().eq_ignore_ascii_case(tag))
}

/// `<kbd>Ctrl</kbd>+<kbd>C</kbd>` becomes a single `Keyboard { "Ctrl+C" }`
fn fold_keyboard(inlines: Vec<Inline>) -> Vec<Inline> {
    if !inlines.iter().any(|i| is_tag(Some(i), "<kbd>")) {
        return inlines;
    }

    let mut out: Vec<Inline> = Vec::with_capacity(inlines.len());
    let mut iter = inlines.into_iter().peekable();
    while let Some(inline) = iter.next() {
        if is_tag(Some(&inline), "<kbd>") {
            if let Some(Inline::Text { content }) = iter.peek().cloned() {
                iter.next();
                if is_tag(iter.peek(), "</kbd>") {
                    iter.next();
                    push_key(&mut out, content);
                    continue;
                }
                out.push(inline);
                out.push(Inline::Text { content });
                continue;
            }
        }
        out.push(inline);
    }
    out
}

fn push_key(out: &mut Vec<Inline>, key: String) {
    let chord = matches!(
        out.as_slice(),
        [.., Inline::Keyboard { .. }, Inline::Text { content }] if content == "+"
    );
    if chord {
        out.pop();
        if let Some(Inline::Keyboard { content }) = out.last_mut() {
            content.push('+');
            content.push_str(&key);
        }
    } else {
        out.push(Inline::Keyboard { content: key });
    }
}
