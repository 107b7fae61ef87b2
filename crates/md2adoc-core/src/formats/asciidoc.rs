// SPDX-License-Identifier: AGPL-3.0-or-later
//! AsciiDoc renderer
//!
//! Walks the node tree once and writes AsciiDoc. Besides the text it
//! produces, rendering fills in document attributes: `doctype` for books,
//! `experimental` when a UI macro is emitted, `stem` for math and `toc` for
//! a table of contents marker. Attributes already present in the mapping are
//! never overwritten.

use crate::ast::{
    plain_text, Attributes, Block, ColumnAlignment, ColumnSpec, DefinitionItem, Document,
    DocumentMeta, Inline, LinkType, ListItem, ListKind, MathNotation, QuoteType, SourceFormat,
    Span, TableRow,
};
use crate::structure::Structure;
use crate::traits::{ConversionError, RenderConfig, Renderer, Result};
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Deepest section marker AsciiDoc understands (`======`, level 5)
const MAX_SECTION_MARKERS: usize = 6;

/// AsciiDoc renderer
pub struct AsciiDocHandler;

impl AsciiDocHandler {
    pub fn new() -> Self {
        Self
    }

    /// Render `doc`, adding document-derived attributes to `attributes`.
    ///
    /// Entries already in `attributes` win over derived ones. Every entry of
    /// the final mapping is written to the document header.
    pub fn render_with_attributes(
        &self,
        doc: &Document,
        config: &RenderConfig,
        attributes: &mut Attributes,
    ) -> Result<String> {
        let structure = Structure::scan(&doc.content);
        let footnotes = collect_footnotes(&doc.content);

        let mut ctx = RenderContext {
            config,
            attributes,
            level_offset: structure.level_offset,
            lists: Vec::new(),
            quote_depth: 0,
            dlist_depth: 0,
            block_depth: 0,
            inline_depth: 0,
            span: None,
            footnotes,
            emitted_footnotes: HashSet::new(),
        };

        if structure.is_book() {
            ctx.require_attribute("doctype", "book");
        }

        // Comments may sit above the title; they stay above the header
        let lead = doc
            .content
            .iter()
            .take_while(|block| matches!(block, Block::Comment { .. }))
            .count();
        let (prologue, title, body_blocks) = match doc.content[lead..].split_first() {
            Some((Block::Heading { level: 1, content, span, .. }, rest)) => {
                ctx.span = *span;
                let mut title = String::new();
                ctx.inline(|ctx| ctx.render_inlines(&mut title, content))?;
                (&doc.content[..lead], Some(title), rest)
            }
            _ => (&doc.content[..0], doc.meta.title.clone(), doc.content.as_slice()),
        };

        ctx.seed_meta(&doc.meta);

        let mut output = String::new();
        ctx.render_blocks(&mut output, prologue)?;
        if !output.is_empty() {
            output.push('\n');
        }

        let mut body = String::new();
        ctx.render_blocks(&mut body, body_blocks)?;

        output.push_str(&header(title.as_deref(), ctx.attributes));
        if !output.is_empty() && !body.is_empty() {
            output.push('\n');
        }
        output.push_str(&body);
        output.truncate(output.trim_end_matches('\n').len());
        Ok(output)
    }
}

impl Default for AsciiDocHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for AsciiDocHandler {
    fn format(&self) -> SourceFormat {
        SourceFormat::AsciiDoc
    }

    fn render(&self, doc: &Document, config: &RenderConfig) -> Result<String> {
        let mut attributes = Attributes::new();
        self.render_with_attributes(doc, config, &mut attributes)
    }
}

/// `= Title` followed by attribute entries, `doctype` first
fn header(title: Option<&str>, attributes: &Attributes) -> String {
    let mut output = String::new();
    if let Some(title) = title {
        output.push_str("= ");
        output.push_str(&single_line(title));
        output.push('\n');
    }

    let doctype = attributes.get_key_value("doctype");
    let rest = attributes.iter().filter(|(key, _)| key.as_str() != "doctype");
    for (key, value) in doctype.into_iter().chain(rest) {
        output.push(':');
        output.push_str(key);
        output.push(':');
        let value = single_line(value);
        if !value.is_empty() {
            output.push(' ');
            output.push_str(&value);
        }
        output.push('\n');
    }
    output
}

/// A line break would end the header early, so header values are folded
/// onto one line
fn single_line(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn collect_footnotes(blocks: &[Block]) -> HashMap<&str, &[Block]> {
    let mut footnotes = HashMap::new();
    for block in blocks {
        match block {
            Block::FootnoteDefinition { label, content, .. } => {
                footnotes.insert(label.as_str(), content.as_slice());
            }
            Block::BlockQuote { content, .. }
            | Block::Container { content, .. }
            | Block::Figure { content, .. } => footnotes.extend(collect_footnotes(content)),
            _ => {}
        }
    }
    footnotes
}

/// Attribute names are lowercase word characters and hyphens
fn attribute_name(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Per-call walk state. Nothing here outlives a single render.
struct RenderContext<'d, 'a> {
    config: &'d RenderConfig,
    attributes: &'a mut Attributes,
    /// Added to section heading levels, decided once before rendering
    level_offset: u8,
    /// Enclosing lists, innermost last
    lists: Vec<ListKind>,
    quote_depth: usize,
    dlist_depth: usize,
    /// Greater than zero inside quotes, list items and other containers
    block_depth: usize,
    /// Greater than zero while inline content goes to its own buffer
    inline_depth: usize,
    /// Position of the block being rendered, for diagnostics
    span: Option<Span>,
    footnotes: HashMap<&'d str, &'d [Block]>,
    emitted_footnotes: HashSet<String>,
}

impl<'d, 'a> RenderContext<'d, 'a> {
    fn require_attribute(&mut self, name: &str, value: &str) {
        if !self.attributes.contains_key(name) {
            tracing::trace!(name, value, "registering document attribute");
            self.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn seed_meta(&mut self, meta: &DocumentMeta) {
        if !meta.authors.is_empty() {
            let authors = meta.authors.join(", ");
            self.require_attribute("author", &authors);
        }
        if let Some(date) = &meta.date {
            self.require_attribute("revdate", date);
        }
        if let Some(language) = &meta.language {
            self.require_attribute("lang", language);
        }
        let mut custom: Vec<_> = meta.custom.iter().collect();
        custom.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in custom {
            if let Some(value) = value.as_scalar() {
                self.require_attribute(&attribute_name(key), &value);
            }
        }
    }

    fn unsupported(&self, kind: impl Into<String>) -> ConversionError {
        let (line, column) = self.span.map_or((0, 0), |s| (s.line, s.column));
        ConversionError::UnsupportedNode {
            kind: kind.into(),
            line,
            column,
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.block_depth += 1;
        let result = f(self);
        self.block_depth -= 1;
        result
    }

    fn inline<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.inline_depth += 1;
        let result = f(self);
        self.inline_depth -= 1;
        result
    }

    fn render_blocks(&mut self, output: &mut String, blocks: &[Block]) -> Result<()> {
        let mut previous_list = false;
        for block in blocks {
            let mut fragment = String::new();
            self.render_block(&mut fragment, block)?;
            if fragment.is_empty() {
                continue;
            }
            let is_list = matches!(block, Block::List { .. });
            if !output.is_empty() {
                // Two lists in a row would otherwise merge into one
                output.push_str(if previous_list && is_list {
                    "\n\n//-\n\n"
                } else {
                    "\n\n"
                });
            }
            output.push_str(&fragment);
            previous_list = is_list;
        }
        Ok(())
    }

    fn render_block(&mut self, output: &mut String, block: &Block) -> Result<()> {
        if block.span().is_some() {
            self.span = block.span();
        }

        match block {
            Block::Paragraph { content, .. } => match content.as_slice() {
                [Inline::Image {
                    url,
                    alt,
                    title,
                    width,
                    height,
                }] => {
                    if let Some(title) = title {
                        output.push('.');
                        output.push_str(title);
                        output.push('\n');
                    }
                    output.push_str(&image_macro(
                        "image::",
                        url,
                        alt,
                        width.as_deref(),
                        height.as_deref(),
                    ));
                }
                _ => self.render_inlines(output, content)?,
            },

            Block::Heading {
                level, content, id, ..
            } => {
                if self.block_depth > 0 {
                    output.push_str("[discrete]\n");
                }
                if let Some(id) = id {
                    output.push_str(&format!("[[{id}]]\n"));
                }
                let markers = (usize::from(*level) + usize::from(self.level_offset))
                    .clamp(1, MAX_SECTION_MARKERS);
                output.push_str(&"=".repeat(markers));
                output.push(' ');
                self.render_inlines(output, content)?;
            }

            Block::CodeBlock {
                language, content, ..
            } => {
                if let Some(lang) = language {
                    output.push_str(&format!("[source,{lang}]\n"));
                }
                let content = content.strip_suffix('\n').unwrap_or(content);
                let fence = delimiter_for('-', content);
                output.push_str(&fence);
                output.push('\n');
                if !content.is_empty() {
                    output.push_str(content);
                    output.push('\n');
                }
                output.push_str(&fence);
            }

            Block::BlockQuote {
                content,
                attribution,
                admonition,
                ..
            } => {
                let depth = self.quote_depth;
                let fence = match admonition {
                    Some(kind) => {
                        output.push_str(&format!("[{}]\n", kind.style()));
                        "=".repeat(4 + depth)
                    }
                    None => {
                        if let Some(attribution) = attribution {
                            let mut source = String::new();
                            self.inline(|ctx| ctx.render_inlines(&mut source, attribution))?;
                            output.push_str(&format!("[quote, {source}]\n"));
                        }
                        "_".repeat(4 + depth)
                    }
                };
                let mut inner = String::new();
                self.quote_depth += 1;
                let result = self.nested(|ctx| ctx.render_blocks(&mut inner, content));
                self.quote_depth -= 1;
                result?;

                output.push_str(&fence);
                output.push('\n');
                if !inner.is_empty() {
                    output.push_str(&inner);
                    output.push('\n');
                }
                output.push_str(&fence);
            }

            Block::List {
                kind, items, start, ..
            } => self.render_list(output, *kind, items, *start)?,

            Block::DefinitionList { items, .. } => self.render_definition_list(output, items)?,

            Block::Table {
                caption,
                columns,
                header,
                body,
                ..
            } => {
                if let Some(caption) = caption {
                    output.push('.');
                    self.render_inlines(output, caption)?;
                    output.push('\n');
                }
                self.render_table(output, columns, header.as_ref(), body)?;
            }

            Block::ThematicBreak { .. } => output.push_str("'''"),

            Block::MathBlock {
                content, notation, ..
            } => {
                self.require_attribute("stem", stem_name(*notation));
                output.push_str("[stem]\n++++\n");
                output.push_str(content.trim_end_matches('\n'));
                output.push_str("\n++++");
            }

            Block::Container {
                id,
                classes,
                content,
                ..
            } => {
                let mut style = String::new();
                if let Some(id) = id {
                    style.push('#');
                    style.push_str(id);
                }
                for class in classes {
                    style.push('.');
                    style.push_str(class);
                }
                if !style.is_empty() {
                    output.push_str(&format!("[{style}]\n"));
                }
                let mut inner = String::new();
                self.nested(|ctx| ctx.render_blocks(&mut inner, content))?;
                output.push_str("--\n");
                if !inner.is_empty() {
                    output.push_str(&inner);
                    output.push('\n');
                }
                output.push_str("--");
            }

            Block::Figure {
                content,
                caption,
                id,
                ..
            } => {
                if let Some(id) = id {
                    output.push_str(&format!("[[{id}]]\n"));
                }
                if let Some(caption) = caption {
                    output.push('.');
                    self.render_inlines(output, caption)?;
                    output.push('\n');
                }
                let mut inner = String::new();
                self.render_blocks(&mut inner, content)?;
                output.push_str(&inner);
            }

            Block::Comment { content, .. } => {
                output.push_str("////\n");
                let body = strip_indentation(content);
                if !body.is_empty() {
                    output.push_str(&body);
                    output.push('\n');
                }
                output.push_str("////");
            }

            Block::Raw {
                format: SourceFormat::Html,
                content,
                ..
            } => {
                output.push_str("++++\n");
                output.push_str(content);
                output.push_str("\n++++");
            }

            Block::Raw {
                format: SourceFormat::AsciiDoc,
                content,
                ..
            } => output.push_str(content.trim_end_matches('\n')),

            Block::Raw { format, .. } => {
                return Err(self.unsupported(format!("raw_{}", format.extension())));
            }

            // Emitted where first referenced
            Block::FootnoteDefinition { .. } => {}

            Block::TableOfContents { .. } => {
                self.require_attribute("toc", "macro");
                output.push_str("toc::[]");
            }
        }

        Ok(())
    }

    fn render_list(
        &mut self,
        output: &mut String,
        kind: ListKind,
        items: &[ListItem],
        start: Option<u32>,
    ) -> Result<()> {
        self.lists.push(kind);
        let depth = self.lists.len();
        let marker = match kind {
            ListKind::Ordered => ".".repeat(depth),
            ListKind::Bullet | ListKind::Task => "*".repeat(depth),
        };

        if let (ListKind::Ordered, Some(start)) = (kind, start) {
            output.push_str(&format!("[start={start}]\n"));
        }

        let mut result = Ok(());
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            let mut prefix = format!("{marker} ");
            if kind == ListKind::Task {
                prefix.push_str(if item.checked.unwrap_or(false) {
                    "[x] "
                } else {
                    "[ ] "
                });
            }
            output.push_str(&prefix);
            let indent = " ".repeat(prefix.chars().count());
            result = self.nested(|ctx| ctx.render_item_body(output, &indent, &item.content));
            if result.is_err() {
                break;
            }
        }

        self.lists.pop();
        result
    }

    /// Item text on the current line, extra blocks attached below it.
    ///
    /// Continuation lines of the first paragraph line up with the item text.
    fn render_item_body(&mut self, output: &mut String, indent: &str, blocks: &[Block]) -> Result<()> {
        let rest = match blocks.split_first() {
            Some((Block::Paragraph { content, .. }, rest)) if !is_single_image(content) => {
                let mut text = String::new();
                self.inline(|ctx| ctx.render_inlines(&mut text, content))?;
                output.push_str(&text.replace('\n', &format!("\n{indent}")));
                rest
            }
            _ => {
                output.push_str("{empty}");
                blocks
            }
        };

        for block in rest {
            let mut fragment = String::new();
            self.render_block(&mut fragment, block)?;
            if fragment.is_empty() {
                continue;
            }
            if matches!(block, Block::List { .. } | Block::DefinitionList { .. }) {
                output.push('\n');
            } else {
                output.push_str("\n+\n");
            }
            output.push_str(&fragment);
        }
        Ok(())
    }

    fn render_definition_list(&mut self, output: &mut String, items: &[DefinitionItem]) -> Result<()> {
        self.dlist_depth += 1;
        let separator = ":".repeat(self.dlist_depth + 1);

        let mut result = Ok(());
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            result = self.render_inlines(output, &item.term);
            if result.is_err() {
                break;
            }
            output.push_str(&separator);
            for (j, definition) in item.definitions.iter().enumerate() {
                output.push_str(if j == 0 { "\n  " } else { "\n+\n  " });
                result = self.nested(|ctx| ctx.render_item_body(output, "  ", definition));
                if result.is_err() {
                    break;
                }
            }
            if result.is_err() {
                break;
            }
        }

        self.dlist_depth -= 1;
        result
    }

    fn render_table(
        &mut self,
        output: &mut String,
        columns: &[ColumnSpec],
        header: Option<&TableRow>,
        body: &[TableRow],
    ) -> Result<()> {
        let width = header
            .iter()
            .copied()
            .chain(body)
            .map(|row| row.cells.len())
            .chain(std::iter::once(columns.len()))
            .max()
            .unwrap_or(0);

        let mut options = Vec::new();
        if columns.iter().any(|c| c.alignment != ColumnAlignment::Default) {
            let cols: Vec<&str> = (0..width)
                .map(|i| match columns.get(i).map(|c| c.alignment) {
                    Some(ColumnAlignment::Left) => "<",
                    Some(ColumnAlignment::Center) => "^",
                    Some(ColumnAlignment::Right) => ">",
                    Some(ColumnAlignment::Default) | None => "1",
                })
                .collect();
            options.push(format!("cols=\"{}\"", cols.join(",")));
        }
        if header.is_some() {
            options.push("options=\"header\"".to_string());
        }
        if !options.is_empty() {
            output.push_str(&format!("[{}]\n", options.join(",")));
        }

        let mut rows = Vec::with_capacity(body.len() + 1);
        for row in header.iter().copied().chain(body) {
            let mut cells = Vec::with_capacity(width);
            for cell in &row.cells {
                let mut text = String::new();
                self.inline(|ctx| ctx.render_inlines(&mut text, &cell.content))?;
                cells.push(text.replace('\n', " ").replace('|', "\\|"));
            }
            // Short rows are padded so every row spans the full width
            cells.resize(width, String::new());
            rows.push(cells);
        }

        let widths: Vec<usize> = if self.config.align_tables {
            (0..width)
                .map(|i| {
                    rows.iter()
                        .map(|row| row[i].graphemes(true).count())
                        .max()
                        .unwrap_or(0)
                })
                .collect()
        } else {
            vec![0; width]
        };

        output.push_str("|===\n");
        for (i, row) in rows.iter().enumerate() {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &w)| {
                    let pad = w.saturating_sub(cell.graphemes(true).count());
                    format!("| {cell}{}", " ".repeat(pad))
                })
                .collect();
            output.push_str(line.join(" ").trim_end());
            output.push('\n');
            if i == 0 && header.is_some() {
                output.push('\n');
            }
        }
        output.push_str("|===");
        Ok(())
    }

    fn render_inlines(&mut self, output: &mut String, inlines: &[Inline]) -> Result<()> {
        for (i, inline) in inlines.iter().enumerate() {
            self.render_inline(output, inline, &inlines[i + 1..])?;
        }
        Ok(())
    }

    /// `following` are the later siblings. The first one decides between
    /// constrained and unconstrained marks; text looks further ahead for the
    /// closing half of anything it might open.
    fn render_inline(&mut self, output: &mut String, inline: &Inline, following: &[Inline]) -> Result<()> {
        let next = following.first();
        match inline {
            Inline::Text { content } => self.render_text(output, content, following),

            Inline::Emphasis { content } => self.render_marked(output, "", "_", content, next)?,

            Inline::Strong { content } => match self.menu_path(content) {
                Some((menu, items)) => {
                    self.require_attribute("experimental", "");
                    output.push_str(&format!("menu:{menu}[{}]", escape_brackets(&items)));
                }
                None => self.render_marked(output, "", "*", content, next)?,
            },

            Inline::Strikethrough { content } => {
                self.render_marked(output, "[.line-through]", "#", content, next)?
            }

            Inline::Underline { content } => {
                self.render_marked(output, "[.underline]", "#", content, next)?
            }

            Inline::SmallCaps { content } => {
                self.render_marked(output, "[.small-caps]", "#", content, next)?
            }

            Inline::Highlight { content } => self.render_marked(output, "", "#", content, next)?,

            Inline::Superscript { content } => {
                output.push('^');
                self.render_inlines(output, content)?;
                output.push('^');
            }

            Inline::Subscript { content } => {
                output.push('~');
                self.render_inlines(output, content)?;
                output.push('~');
            }

            Inline::Span {
                id,
                classes,
                content,
            } => {
                let mut role = String::new();
                if let Some(id) = id {
                    role.push('#');
                    role.push_str(id);
                }
                for class in classes {
                    role.push('.');
                    role.push_str(class);
                }
                if role.is_empty() {
                    self.render_inlines(output, content)?;
                } else {
                    self.render_marked(output, &format!("[{role}]"), "#", content, next)?;
                }
            }

            Inline::Quoted {
                quote_type,
                content,
            } => {
                let (open, close) = match quote_type {
                    QuoteType::Double => ("\"`", "`\""),
                    QuoteType::Single => ("'`", "`'"),
                };
                output.push_str(open);
                self.render_inlines(output, content)?;
                output.push_str(close);
            }

            Inline::Code { content } => output.push_str(&code_span(content)),

            Inline::Math { content, notation } => {
                self.require_attribute("stem", stem_name(*notation));
                output.push_str(&format!("stem:[{}]", escape_brackets(content)));
            }

            Inline::Link {
                url,
                title,
                content,
                link_type,
            } => self.render_link(output, url, title.as_deref(), content, *link_type)?,

            Inline::Image {
                url,
                alt,
                width,
                height,
                ..
            } => output.push_str(&image_macro(
                "image:",
                url,
                alt,
                width.as_deref(),
                height.as_deref(),
            )),

            Inline::FootnoteRef { label } => self.render_footnote(output, label)?,

            Inline::Citation { keys } => {
                let refs: Vec<String> = keys.iter().map(|k| format!("<<{k}>>")).collect();
                output.push_str(&refs.join(", "));
            }

            Inline::LineBreak => output.push_str(" +\n"),

            Inline::SoftBreak => {
                output.push_str(if self.config.hard_breaks { " +\n" } else { "\n" })
            }

            Inline::NonBreakingSpace => output.push_str("{nbsp}"),

            Inline::RawInline { format, content } => match format {
                SourceFormat::Html => {
                    output.push_str("+++");
                    output.push_str(content);
                    output.push_str("+++");
                }
                SourceFormat::AsciiDoc => output.push_str(content),
                SourceFormat::Markdown => {
                    return Err(self.unsupported(format!("raw_inline_{}", format.extension())))
                }
            },

            Inline::Keyboard { content } => {
                if self.config.ui_macros {
                    self.require_attribute("experimental", "");
                    output.push_str(&format!("kbd:[{}]", escape_brackets(content)));
                } else {
                    output.push_str(&code_span(content));
                }
            }
        }

        Ok(())
    }

    /// Literal text, with anything AsciiDoc would read as markup escaped
    fn render_text(&self, output: &mut String, content: &str, following: &[Inline]) {
        let line_start = output.ends_with('\n') || (output.is_empty() && self.inline_depth == 0);
        let prev = output.chars().next_back();
        let lookahead = if content.contains(INLINE_MARKS) {
            plain_text(following)
        } else {
            String::new()
        };
        output.push_str(&escape_text(content, prev, line_start, &lookahead));
    }

    /// Wrap `content` in formatting marks, doubling them when the span touches
    /// a word character or its own edges are blank.
    fn render_marked(
        &mut self,
        output: &mut String,
        role: &str,
        mark: &str,
        content: &[Inline],
        next: Option<&Inline>,
    ) -> Result<()> {
        let mut inner = String::new();
        self.inline(|ctx| ctx.render_inlines(&mut inner, content))?;

        let after_word = output.chars().next_back().is_some_and(is_word_char);
        let before_word = next.is_some_and(|n| match n {
            Inline::Text { content } => content.chars().next().is_some_and(is_word_char),
            _ => false,
        });
        let blank_edge = inner.starts_with(char::is_whitespace) || inner.ends_with(char::is_whitespace);

        let mark = if after_word || before_word || blank_edge {
            mark.repeat(2)
        } else {
            mark.to_string()
        };
        output.push_str(role);
        output.push_str(&mark);
        output.push_str(&inner);
        output.push_str(&mark);
        Ok(())
    }

    /// `**File > Save As**` is the menu path idiom; returns the menu and the
    /// `>`-joined item path.
    fn menu_path(&self, content: &[Inline]) -> Option<(String, String)> {
        if !self.config.ui_macros || !content.iter().all(|i| matches!(i, Inline::Text { .. })) {
            return None;
        }
        let text = plain_text(content);
        if !text.contains(" > ") {
            return None;
        }
        let parts: Vec<&str> = text.split('>').map(str::trim).collect();
        if parts.len() < 2 || parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        // The menu name is the macro target and cannot hold spaces or brackets
        if parts[0].contains(|c: char| c.is_whitespace() || c == '[') {
            return None;
        }
        Some((parts[0].to_string(), parts[1..].join(" > ")))
    }

    fn render_link(
        &mut self,
        output: &mut String,
        url: &str,
        title: Option<&str>,
        content: &[Inline],
        link_type: LinkType,
    ) -> Result<()> {
        let mut text = String::new();
        self.inline(|ctx| ctx.render_inlines(&mut text, content))?;
        let text = escape_brackets(&text);
        let url = url.replace(' ', "%20");

        if let Some(anchor) = url.strip_prefix('#') {
            if text.is_empty() {
                output.push_str(&format!("<<{anchor}>>"));
            } else {
                output.push_str(&format!("<<{anchor},{text}>>"));
            }
            return Ok(());
        }

        let attrs = match title {
            Some(title) => format!("{},title={}", quoted(&text), quoted(title)),
            None => text.clone(),
        };

        if has_scheme(&url) {
            if link_type == LinkType::AutoLink && title.is_none() {
                // Bare URLs and email addresses are linked by AsciiDoc itself
                output.push_str(url.strip_prefix("mailto:").unwrap_or(&url));
            } else {
                output.push_str(&format!("{url}[{attrs}]"));
            }
        } else if let Some(target) = self
            .config
            .rewrite_markdown_links
            .then(|| adoc_target(&url))
            .flatten()
        {
            output.push_str(&format!("xref:{target}[{attrs}]"));
        } else {
            output.push_str(&format!("link:{url}[{attrs}]"));
        }
        Ok(())
    }

    fn render_footnote(&mut self, output: &mut String, label: &str) -> Result<()> {
        let blocks: &[Block] = *self
            .footnotes
            .get(label)
            .ok_or_else(|| ConversionError::UnresolvedFootnote {
                label: label.to_string(),
            })?;
        let id = footnote_id(label);

        if !self.emitted_footnotes.insert(label.to_string()) {
            output.push_str(&format!("footnote:{id}[]"));
            return Ok(());
        }

        let mut parts = Vec::with_capacity(blocks.len());
        for block in blocks {
            let mut part = String::new();
            match block {
                Block::Paragraph { content, .. } => {
                    self.inline(|ctx| ctx.render_inlines(&mut part, content))?
                }
                other => self.nested(|ctx| ctx.render_block(&mut part, other))?,
            }
            parts.push(part.replace('\n', " "));
        }
        output.push_str(&format!("footnote:{id}[{}]", escape_brackets(&parts.join(" "))));
        Ok(())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_single_image(content: &[Inline]) -> bool {
    matches!(content, [Inline::Image { .. }])
}

fn stem_name(notation: MathNotation) -> &'static str {
    match notation {
        MathNotation::LaTeX => "latexmath",
        MathNotation::AsciiMath => "asciimath",
    }
}

fn escape_brackets(text: &str) -> String {
    text.replace(']', "\\]")
}

/// Double-quoted attribute value
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "&quot;"))
}

/// Monospace span; literal when the code holds characters AsciiDoc would
/// otherwise interpret.
fn code_span(content: &str) -> String {
    const MARKUP: &[char] = &['*', '_', '#', '^', '~', '`', '\'', '{', '[', '<', '\\'];
    // A backslash right before the closing mark would escape it
    let body = content.trim_end_matches('\\');
    let trailing = "{backslash}".repeat(content.len() - body.len());
    let body = if body.contains('+') {
        format!("pass:[{}]", escape_brackets(body))
    } else if body.contains(MARKUP) {
        format!("+{body}+")
    } else {
        body.to_string()
    };
    format!("`{body}{trailing}`")
}

/// Characters that open constrained or unconstrained formatting
const INLINE_MARKS: &[char] = &['*', '_', '`', '#', '^', '~'];

/// Escape literal text so AsciiDoc shows it as written.
///
/// `prev` is the character already written before the text and
/// `line_start` says whether the text begins a line. `following` is the
/// plain text of the later siblings, searched for closing marks so that only
/// marks which would really pair up get escaped.
fn escape_text(text: &str, prev: Option<char>, line_start: bool, following: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    if line_start && opens_block(text) {
        escaped.push_str("{blank}");
    }

    let mut prev = prev;
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        let rest = &text[i + c.len_utf8()..];
        match c {
            '\n' => {
                escaped.push('\n');
                if opens_block(rest) {
                    escaped.push_str("{blank}");
                }
            }
            // A backslash escapes whatever markup comes after it, even in the next node
            '\\' if rest.is_empty()
                || rest.starts_with(|n: char| INLINE_MARKS.contains(&n) || matches!(n, '{' | '\\')) =>
            {
                escaped.push_str("{backslash}");
            }
            '{' if is_attribute_reference(rest) => escaped.push_str("\\{"),
            '*' | '_' | '`' | '#' if rest.starts_with(c) && closes(&rest[1..], c, true, following) => {
                // Unconstrained pairs need a double backslash
                escaped.push_str("\\\\");
                escaped.push(c);
                escaped.push(c);
                chars.next();
            }
            '*' | '_' | '`' | '#'
                if !prev.is_some_and(|p| is_word_char(p) || matches!(p, ';' | ':' | '}'))
                    && closes(rest, c, false, following) =>
            {
                escaped.push('\\');
                escaped.push(c);
            }
            '^' | '~' if closes_tight(rest, c, following) => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
        prev = Some(c);
    }
    escaped
}

/// Whether `after`, the text right after an opening mark, holds a matching
/// closing mark (`doubled` for the two-character form)
fn closes(after: &str, mark: char, doubled: bool, following: &str) -> bool {
    if !after.starts_with(|c: char| !c.is_whitespace()) {
        return false;
    }
    let chars: Vec<char> = after.chars().chain(following.chars()).collect();
    (1..chars.len()).any(|j| {
        if doubled {
            chars[j] == mark && chars.get(j + 1) == Some(&mark)
        } else {
            chars[j] == mark
                && !chars[j - 1].is_whitespace()
                && !chars.get(j + 1).copied().is_some_and(is_word_char)
        }
    })
}

/// Superscript and subscript close before the next whitespace
fn closes_tight(after: &str, mark: char, following: &str) -> bool {
    after
        .chars()
        .chain(following.chars())
        .take_while(|c| !c.is_whitespace())
        .skip(1)
        .any(|c| c == mark)
}

/// `{name}` is an attribute reference
fn is_attribute_reference(after_brace: &str) -> bool {
    let name_len = after_brace
        .find(|c: char| !(is_word_char(c) || c == '-'))
        .unwrap_or(after_brace.len());
    name_len > 0
        && !after_brace.starts_with('-')
        && after_brace[name_len..].starts_with('}')
}

/// Whether a line beginning with `text` would be read as block syntax: a
/// list item, section title, block title, delimiter, attribute entry,
/// block attribute line, comment or admonition paragraph.
fn opens_block(text: &str) -> bool {
    let line = text.lines().next().unwrap_or("");
    let Some(first) = line.chars().next() else {
        return false;
    };
    let run = line.chars().take_while(|&c| c == first).count();
    let after = &line[run * first.len_utf8()..];

    if matches!(first, '*' | '-' | '.' | '#' | '=' | '>') && after.starts_with([' ', '\t']) {
        return true;
    }
    if matches!(first, '-' | '=' | '.' | '*' | '_' | '+' | '/' | '\'' | '<') && after.is_empty() {
        return run >= 2 || first == '+';
    }
    if line.starts_with("//") || line.starts_with("|===") {
        return true;
    }
    if first == '.' && run == 1 && !after.is_empty() && !after.starts_with(char::is_whitespace) {
        return true;
    }
    if first == '[' && line.trim_end().ends_with(']') {
        return true;
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && line[digits..].starts_with(". ") {
        return true;
    }
    if first.is_ascii_alphabetic() && line[1..].starts_with(". ") {
        return true;
    }

    if let Some(entry) = line.strip_prefix(':') {
        if let Some(end) = entry.find(':') {
            let name = entry[..end].trim_end_matches('!');
            let value = &entry[end + 1..];
            if !name.is_empty()
                && name.chars().all(|c| is_word_char(c) || c == '-')
                && (value.is_empty() || value.starts_with(' '))
            {
                return true;
            }
        }
    }

    ["NOTE: ", "TIP: ", "IMPORTANT: ", "WARNING: ", "CAUTION: "]
        .iter()
        .any(|label| line.starts_with(label))
}

fn image_macro(
    prefix: &str,
    url: &str,
    alt: &str,
    width: Option<&str>,
    height: Option<&str>,
) -> String {
    let alt = escape_brackets(alt);
    let mut attrs = if alt.contains([',', '"']) {
        quoted(&alt)
    } else {
        alt
    };
    match (width, height) {
        (Some(w), Some(h)) => attrs.push_str(&format!(",{w},{h}")),
        (Some(w), None) => attrs.push_str(&format!(",{w}")),
        (None, Some(h)) => attrs.push_str(&format!(",height={h}")),
        (None, None) => {}
    }
    format!("{prefix}{}[{attrs}]", url.replace(' ', "%20"))
}

fn has_scheme(url: &str) -> bool {
    if url.starts_with("mailto:") {
        return true;
    }
    match url.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// `guide.md#setup` -> `guide.adoc#setup`; `None` for non-Markdown targets
fn adoc_target(url: &str) -> Option<String> {
    let (path, fragment) = match url.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (url, None),
    };
    let lower = path.to_ascii_lowercase();
    let stem = if lower.ends_with(".md") {
        &path[..path.len() - 3]
    } else if lower.ends_with(".markdown") {
        &path[..path.len() - 9]
    } else {
        return None;
    };
    Some(match fragment {
        Some(fragment) => format!("{stem}.adoc#{fragment}"),
        None => format!("{stem}.adoc"),
    })
}

fn footnote_id(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Delimiter of at least four `c`, longer than any line of `c` in `content`
fn delimiter_for(c: char, content: &str) -> String {
    let longest = content
        .lines()
        .filter(|line| !line.is_empty() && line.chars().all(|ch| ch == c))
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    c.to_string().repeat(longest.max(3) + 1)
}

/// Every line trimmed to its text, surrounding blank lines dropped
fn strip_indentation(content: &str) -> String {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

#[cfg(all(test, feature = "markdown"))]
mod tests {
    use super::*;
    use crate::formats::markdown::MarkdownHandler;
    use crate::traits::{ParseConfig, Parser};
    use pretty_assertions::assert_eq;

    fn convert(md: &str) -> String {
        convert_with(md, &RenderConfig::default())
    }

    fn convert_with(md: &str, config: &RenderConfig) -> String {
        let doc = MarkdownHandler::new()
            .parse(md, &ParseConfig::default())
            .unwrap();
        AsciiDocHandler::new().render(&doc, config).unwrap()
    }

    fn text(s: &str) -> Inline {
        Inline::Text {
            content: s.to_string(),
        }
    }

    fn doc(content: Vec<Block>) -> Document {
        Document {
            source_format: SourceFormat::Markdown,
            meta: DocumentMeta::default(),
            content,
            raw_source: None,
        }
    }

    #[test]
    fn test_title_and_sections() {
        assert_eq!(
            convert("# Title\n\nBody.\n\n## Section\n\n### Sub\n"),
            "= Title\n\nBody.\n\n== Section\n\n=== Sub"
        );
    }

    #[test]
    fn test_book_promotion() {
        assert_eq!(
            convert("# Document Title\n\n# Part 1\n\n## Chapter A\n"),
            "= Document Title\n:doctype: book\n\n== Part 1\n\n=== Chapter A"
        );
    }

    #[test]
    fn test_front_matter_title() {
        assert_eq!(
            convert("---\ntitle: Document Title\n---\n\nBody content.\n"),
            "= Document Title\n\nBody content."
        );
    }

    #[test]
    fn test_front_matter_attributes() {
        assert_eq!(
            convert("---\ntitle: T\nauthor: Ada\nlang: en\n---\nBody\n"),
            "= T\n:author: Ada\n:lang: en\n\nBody"
        );
    }

    #[test]
    fn test_inline_marks() {
        assert_eq!(
            convert("Some *em* and **strong** and ~~gone~~ and `code`.\n"),
            "Some _em_ and *strong* and [.line-through]#gone# and `code`."
        );
    }

    #[test]
    fn test_intraword_marks_are_unconstrained() {
        assert_eq!(convert("un*frigging*believable\n"), "un__frigging__believable");
    }

    #[test]
    fn test_code_with_markup_is_literal() {
        assert_eq!(convert("Use `*ptr` here\n"), "Use `+*ptr+` here");
        assert_eq!(convert("Use `a+b` here\n"), "Use `pass:[a+b]` here");
    }

    #[test]
    fn test_menu_idiom_registers_experimental_once() {
        let md = "Open **File > Save** now.\n\nThen **Edit > Copy > Special**.\n";
        let doc = MarkdownHandler::new()
            .parse(md, &ParseConfig::default())
            .unwrap();
        let mut attributes = Attributes::new();
        let output = AsciiDocHandler::new()
            .render_with_attributes(&doc, &RenderConfig::default(), &mut attributes)
            .unwrap();
        assert_eq!(
            output,
            ":experimental:\n\nOpen menu:File[Save] now.\n\nThen menu:Edit[Copy > Special]."
        );
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes.get("experimental").map(String::as_str), Some(""));
    }

    #[test]
    fn test_menu_idiom_can_be_disabled() {
        let config = RenderConfig {
            ui_macros: false,
            ..RenderConfig::default()
        };
        assert_eq!(convert_with("**File > Save**\n", &config), "*File > Save*");
    }

    #[test]
    fn test_keyboard_macro() {
        assert_eq!(
            convert("Press <kbd>Ctrl</kbd>+<kbd>C</kbd>.\n"),
            ":experimental:\n\nPress kbd:[Ctrl+C]."
        );
    }

    #[test]
    fn test_comment_block_is_dedented() {
        assert_eq!(
            convert("<!--\n    indented\n      more\n-->\n\nText\n"),
            "////\nindented\nmore\n////\n\nText"
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            convert("- a\n- b\n  - c\n- d\n"),
            "* a\n* b\n** c\n* d"
        );
        assert_eq!(convert("1. one\n2. two\n"), ". one\n. two");
        assert_eq!(convert("4. four\n5. five\n"), "[start=4]\n. four\n. five");
        assert_eq!(
            convert("- [x] done\n- [ ] todo\n"),
            "* [x] done\n* [ ] todo"
        );
    }

    #[test]
    fn test_list_continuation() {
        assert_eq!(
            convert("- first line\n  second line\n- item\n\n  ```\n  code\n  ```\n"),
            "* first line\n  second line\n* item\n+\n----\ncode\n----"
        );
    }

    #[test]
    fn test_adjacent_lists_are_separated() {
        assert_eq!(convert("- a\n\n1. b\n"), "* a\n\n//-\n\n. b");
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            convert("```rust\nfn main() {}\n```\n"),
            "[source,rust]\n----\nfn main() {}\n----"
        );
        assert_eq!(
            convert("```\n----\n```\n"),
            "-----\n----\n-----"
        );
    }

    #[test]
    fn test_quotes_and_alerts() {
        assert_eq!(convert("> quoted\n"), "____\nquoted\n____");
        assert_eq!(
            convert("> a\n>\n> > b\n"),
            "____\na\n\n_____\nb\n_____\n____"
        );
        assert_eq!(
            convert("> [!NOTE]\n> Remember.\n"),
            "[NOTE]\n====\nRemember.\n===="
        );
        assert_eq!(
            convert("> ## Inside\n"),
            "____\n[discrete]\n== Inside\n____"
        );
    }

    #[test]
    fn test_table() {
        assert_eq!(
            convert("| a | b |\n|---|---|\n| 1 | 2 |\n"),
            "[options=\"header\"]\n|===\n| a | b\n\n| 1 | 2\n|==="
        );
        assert_eq!(
            convert("| a | b |\n|:--|:-:|\n| x\\|y | 2 |\n"),
            "[cols=\"<,^\",options=\"header\"]\n|===\n| a | b\n\n| x\\|y | 2\n|==="
        );
    }

    #[test]
    fn test_uneven_table_rows_are_padded() {
        let row = |cells: &[&str]| TableRow {
            cells: cells
                .iter()
                .map(|c| crate::ast::TableCell {
                    content: vec![text(c)],
                })
                .collect(),
        };
        let table = Block::Table {
            caption: Some(vec![text("Results")]),
            columns: vec![],
            header: None,
            body: vec![row(&["1", "2", "3"]), row(&["4"])],
            span: None,
        };
        assert_eq!(
            AsciiDocHandler::new()
                .render(&doc(vec![table]), &RenderConfig::default())
                .unwrap(),
            ".Results\n|===\n| 1 | 2 | 3\n| 4 | |\n|==="
        );
    }

    #[test]
    fn test_aligned_table() {
        let config = RenderConfig {
            align_tables: true,
            ..RenderConfig::default()
        };
        assert_eq!(
            convert_with("| name | n |\n|---|---|\n| café | 10 |\n", &config),
            "[options=\"header\"]\n|===\n| name | n\n\n| café | 10\n|==="
        );
        assert_eq!(
            convert_with("| a | b |\n|---|---|\n| long | x |\n", &config),
            "[options=\"header\"]\n|===\n| a    | b\n\n| long | x\n|==="
        );
    }

    #[test]
    fn test_links() {
        assert_eq!(
            convert("[site](https://example.com)\n"),
            "https://example.com[site]"
        );
        assert_eq!(convert("<https://example.com>\n"), "https://example.com");
        assert_eq!(convert("[doc](other.md#sec)\n"), "xref:other.adoc#sec[doc]");
        assert_eq!(convert("[x](#intro)\n"), "<<intro,x>>");
        assert_eq!(convert("[f](files/a.pdf)\n"), "link:files/a.pdf[f]");
        assert_eq!(
            convert("[t](https://e.org \"Home\")\n"),
            "https://e.org[\"t\",title=\"Home\"]"
        );
    }

    #[test]
    fn test_images() {
        assert_eq!(convert("![Alt](img.png)\n"), "image::img.png[Alt]");
        assert_eq!(
            convert("see ![i](a.png) here\n"),
            "see image:a.png[i] here"
        );
    }

    #[test]
    fn test_footnotes() {
        assert_eq!(
            convert("One[^n] and two[^n].\n\n[^n]: The note.\n"),
            "Onefootnote:n[The note.] and twofootnote:n[]."
        );
    }

    #[test]
    fn test_unresolved_footnote_is_an_error() {
        let document = doc(vec![Block::Paragraph {
            content: vec![Inline::FootnoteRef {
                label: "missing".to_string(),
            }],
            span: None,
        }]);
        let err = AsciiDocHandler::new()
            .render(&document, &RenderConfig::default())
            .unwrap_err();
        assert!(matches!(err, ConversionError::UnresolvedFootnote { label } if label == "missing"));
    }

    #[test]
    fn test_raw_markdown_has_no_mapping() {
        let span = Span {
            line: 7,
            column: 1,
            end_line: 7,
            end_column: 5,
        };
        let document = doc(vec![Block::Raw {
            format: SourceFormat::Markdown,
            content: "*x*".to_string(),
            span: Some(span),
        }]);
        let err = AsciiDocHandler::new()
            .render(&document, &RenderConfig::default())
            .unwrap_err();
        match err {
            ConversionError::UnsupportedNode { kind, line, .. } => {
                assert_eq!(kind, "raw_md");
                assert_eq!(line, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_breaks() {
        assert_eq!(convert("a  \nb\n"), "a +\nb");
        assert_eq!(convert("a\nb\n"), "a\nb");
        let config = RenderConfig {
            hard_breaks: true,
            ..RenderConfig::default()
        };
        assert_eq!(convert_with("a\nb\n", &config), "a +\nb");
        assert_eq!(convert("a\n\n---\n\nb\n"), "a\n\n'''\n\nb");
    }

    #[test]
    fn test_toc_and_math() {
        assert_eq!(
            convert("[TOC]\n\nEuler: $e^{i\\pi}$\n"),
            ":stem: latexmath\n:toc: macro\n\ntoc::[]\n\nEuler: stem:[e^{i\\pi}]"
        );
    }

    #[test]
    fn test_html_block_passthrough() {
        assert_eq!(
            convert("<div>\nhi\n</div>\n"),
            "++++\n<div>\nhi\n</div>\n++++"
        );
    }

    #[test]
    fn test_caller_attributes_are_kept() {
        let document = MarkdownHandler::new()
            .parse("# A\n\n# B\n", &ParseConfig::default())
            .unwrap();
        let mut attributes = Attributes::from([
            ("doctype".to_string(), "article".to_string()),
            ("toc".to_string(), "left".to_string()),
        ]);
        let output = AsciiDocHandler::new()
            .render_with_attributes(&document, &RenderConfig::default(), &mut attributes)
            .unwrap();
        assert_eq!(output, "= A\n:doctype: article\n:toc: left\n\n== B");
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn test_definition_list() {
        let list = Block::DefinitionList {
            items: vec![DefinitionItem {
                term: vec![text("CPU")],
                definitions: vec![vec![Block::Paragraph {
                    content: vec![text("The brain.")],
                    span: None,
                }]],
            }],
            span: None,
        };
        assert_eq!(
            AsciiDocHandler::new()
                .render(&doc(vec![list]), &RenderConfig::default())
                .unwrap(),
            "CPU::\n  The brain."
        );
    }

    fn render_inlines(content: Vec<Inline>) -> String {
        render_blocks(vec![Block::Paragraph { content, span: None }])
    }

    fn render_blocks(content: Vec<Block>) -> String {
        AsciiDocHandler::new()
            .render(&doc(content), &RenderConfig::default())
            .unwrap()
    }

    #[test]
    fn test_escaped_marks_stay_literal() {
        assert_eq!(convert("\\*not bold\\*\n"), "\\*not bold*");
        assert_eq!(convert("\\_\\_init\\_\\_ and snake_case\n"), "\\\\__init__ and snake_case");
        assert_eq!(convert("\\`tick\\`\n"), "\\`tick`");
        assert_eq!(convert("2\\^10\\^ bytes\n"), "2\\^10^ bytes");
        assert_eq!(convert("Price {total}\n"), "Price \\{total}");
    }

    #[test]
    fn test_lone_marks_are_left_alone() {
        assert_eq!(
            convert("2 * 3 and a_b and C# and ~5 and {a b}\n"),
            "2 * 3 and a_b and C# and ~5 and {a b}"
        );
    }

    #[test]
    fn test_block_markers_are_neutralized() {
        assert_eq!(convert("1\\. not a list\n"), "{blank}1. not a list");
        assert_eq!(convert("\\# not a heading\n"), "{blank}# not a heading");
        assert_eq!(convert("a\n\\* b\n"), "a\n{blank}* b");
        assert_eq!(convert("a\n\\- b\n"), "a\n{blank}- b");
        assert_eq!(convert(".gitignore is read first\n"), "{blank}.gitignore is read first");
        assert_eq!(convert("NOTE: plain text\n"), "{blank}NOTE: plain text");
        assert_eq!(convert("\\= not a title\n"), "{blank}= not a title");
        assert_eq!(convert("// not a comment\n"), "{blank}// not a comment");
    }

    #[test]
    fn test_markers_inside_inline_spans_are_kept() {
        assert_eq!(convert("# 1. Intro\n"), "= 1. Intro");
        assert_eq!(convert("- .gitignore\n"), "* .gitignore");
    }

    #[test]
    fn test_backslash_before_markup() {
        assert_eq!(convert("a\\\\**b**\n"), "a{backslash}*b*");
        assert_eq!(convert("C:\\\\Users\\\\me\n"), "C:\\Users\\me");
    }

    #[test]
    fn test_comment_above_title() {
        assert_eq!(
            convert("<!-- note -->\n\n# Title\n\nSee **File > Save**.\n"),
            "////\nnote\n////\n= Title\n:experimental:\n\nSee menu:File[Save]."
        );
    }

    #[test]
    fn test_multiline_values_fold_into_header() {
        assert_eq!(
            convert("---\ntitle: T\ndescription: |\n  line one\n  line two\n---\nBody\n"),
            "= T\n:description: line one line two\n\nBody"
        );
        assert_eq!(header(Some("Two\nlines"), &Attributes::new()), "= Two lines\n");
    }

    #[test]
    fn test_code_ending_in_backslash() {
        assert_eq!(
            convert("Use `C:\\dir\\` here\n"),
            "Use `+C:\\dir+{backslash}` here"
        );
        assert_eq!(code_span("\\"), "`{backslash}`");
        assert_eq!(code_span("a+b\\"), "`pass:[a+b]{backslash}`");
    }

    #[test]
    fn test_link_text_quotes_are_escaped() {
        assert_eq!(
            convert("[say \"hi\"](https://e.org \"Home\")\n"),
            "https://e.org[\"say &quot;hi&quot;\",title=\"Home\"]"
        );
    }

    #[test]
    fn test_underline_small_caps_and_highlight() {
        assert_eq!(
            render_inlines(vec![
                text("a "),
                Inline::Underline { content: vec![text("b")] },
                text(" "),
                Inline::SmallCaps { content: vec![text("c")] },
                text(" "),
                Inline::Highlight { content: vec![text("d")] },
            ]),
            "a [.underline]#b# [.small-caps]#c# #d#"
        );
        assert_eq!(
            render_inlines(vec![
                text("x"),
                Inline::Highlight { content: vec![text("y")] },
                text("z"),
            ]),
            "x##y##z"
        );
    }

    #[test]
    fn test_subscript_and_superscript() {
        assert_eq!(
            render_inlines(vec![
                text("H"),
                Inline::Subscript { content: vec![text("2")] },
                text("O and E=mc"),
                Inline::Superscript { content: vec![text("2")] },
            ]),
            "H~2~O and E=mc^2^"
        );
    }

    #[test]
    fn test_spans_and_quotes() {
        assert_eq!(
            render_inlines(vec![
                Inline::Span {
                    id: Some("k".to_string()),
                    classes: vec!["big".to_string()],
                    content: vec![text("w")],
                },
                text(" "),
                Inline::Span {
                    id: None,
                    classes: vec![],
                    content: vec![text("plain")],
                },
            ]),
            "[#k.big]#w# plain"
        );
        assert_eq!(
            render_inlines(vec![
                Inline::Quoted {
                    quote_type: QuoteType::Double,
                    content: vec![text("q")],
                },
                text(" "),
                Inline::Quoted {
                    quote_type: QuoteType::Single,
                    content: vec![text("s")],
                },
            ]),
            "\"`q`\" '`s`'"
        );
    }

    #[test]
    fn test_citations_and_non_breaking_space() {
        assert_eq!(
            render_inlines(vec![
                text("See"),
                Inline::NonBreakingSpace,
                Inline::Citation {
                    keys: vec!["knuth".to_string(), "lamport".to_string()],
                },
            ]),
            "See{nbsp}<<knuth>>, <<lamport>>"
        );
    }

    #[test]
    fn test_container_block() {
        let container = Block::Container {
            id: Some("box".to_string()),
            classes: vec!["note".to_string()],
            content: vec![Block::Paragraph {
                content: vec![text("inside")],
                span: None,
            }],
            span: None,
        };
        assert_eq!(render_blocks(vec![container]), "[#box.note]\n--\ninside\n--");

        let bare = Block::Container {
            id: None,
            classes: vec![],
            content: vec![],
            span: None,
        };
        assert_eq!(render_blocks(vec![bare]), "--\n--");
    }

    #[test]
    fn test_figure_block() {
        let figure = Block::Figure {
            content: vec![Block::Paragraph {
                content: vec![Inline::Image {
                    url: "a.png".to_string(),
                    alt: "A".to_string(),
                    title: None,
                    width: None,
                    height: None,
                }],
                span: None,
            }],
            caption: Some(vec![text("Cap")]),
            id: Some("fig1".to_string()),
            span: None,
        };
        assert_eq!(render_blocks(vec![figure]), "[[fig1]]\n.Cap\nimage::a.png[A]");
    }

    #[test]
    fn test_underline_from_markdown() {
        let doc = MarkdownHandler::new()
            .parse(
                "a __u__ b\n",
                &ParseConfig {
                    underline: true,
                    ..ParseConfig::default()
                },
            )
            .unwrap();
        assert_eq!(
            AsciiDocHandler::new()
                .render(&doc, &RenderConfig::default())
                .unwrap(),
            "a [.underline]#u# b"
        );
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(convert(""), "");
    }

    #[test]
    fn test_helpers() {
        assert_eq!(adoc_target("a/b.MD"), Some("a/b.adoc".to_string()));
        assert_eq!(adoc_target("x.pdf"), None);
        assert!(has_scheme("irc://host"));
        assert!(!has_scheme("docs/x"));
        assert_eq!(strip_indentation("\n  a\n    b\n\n"), "a\nb");
        assert_eq!(strip_indentation(" note \n  more  "), "note\nmore");
        assert!(is_attribute_reference("total}"));
        assert!(!is_attribute_reference("a b}"));
        assert!(!opens_block("plain words"));
        assert!(opens_block("----"));
        assert!(opens_block(":toc: left"));
        assert!(opens_block("[source]"));
        assert_eq!(attribute_name("Cover Image"), "cover-image");
        assert_eq!(delimiter_for('-', "x"), "----");
    }
}
