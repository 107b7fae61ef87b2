// SPDX-License-Identifier: AGPL-3.0-or-later
//! Caller-supplied text transforms run around parsing and rendering
//!
//! Preprocessors rewrite the Markdown body before it is parsed and may edit
//! the front matter metadata. Postprocessors rewrite the rendered AsciiDoc;
//! returning `None` keeps the text as it was. Both run in list order and the
//! first error aborts the conversion.

use md2adoc_core::{Document, DocumentMeta};
use std::fmt;
use std::sync::Arc;

/// Error raised by a pre- or postprocessor, passed through untouched
pub type ExtensionError = Box<dyn std::error::Error + Send + Sync>;

pub type ExtensionResult<T> = std::result::Result<T, ExtensionError>;

type TextFn = dyn Fn(&str) -> ExtensionResult<String> + Send + Sync;
type MetaFn = dyn Fn(&str, &mut DocumentMeta) -> ExtensionResult<String> + Send + Sync;
type RenderedFn = dyn Fn(&str) -> ExtensionResult<Option<String>> + Send + Sync;
type DocumentFn = dyn Fn(&str, &Document) -> ExtensionResult<Option<String>> + Send + Sync;

/// Transform applied to the source text before parsing
#[derive(Clone)]
pub enum Preprocessor {
    Text(Arc<TextFn>),
    WithMeta(Arc<MetaFn>),
}

impl Preprocessor {
    pub fn text<F>(f: F) -> Self
    where
        F: Fn(&str) -> ExtensionResult<String> + Send + Sync + 'static,
    {
        Self::Text(Arc::new(f))
    }

    /// Preprocessor that can also edit the front matter
    pub fn with_meta<F>(f: F) -> Self
    where
        F: Fn(&str, &mut DocumentMeta) -> ExtensionResult<String> + Send + Sync + 'static,
    {
        Self::WithMeta(Arc::new(f))
    }

    pub fn apply(&self, text: &str, meta: &mut DocumentMeta) -> ExtensionResult<String> {
        match self {
            Self::Text(f) => f(text),
            Self::WithMeta(f) => f(text, meta),
        }
    }
}

impl fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Preprocessor::Text(..)"),
            Self::WithMeta(_) => f.write_str("Preprocessor::WithMeta(..)"),
        }
    }
}

/// Transform applied to the rendered text
#[derive(Clone)]
pub enum Postprocessor {
    Text(Arc<RenderedFn>),
    WithDocument(Arc<DocumentFn>),
}

impl Postprocessor {
    pub fn text<F>(f: F) -> Self
    where
        F: Fn(&str) -> ExtensionResult<Option<String>> + Send + Sync + 'static,
    {
        Self::Text(Arc::new(f))
    }

    /// Postprocessor that also sees the parsed document
    pub fn with_document<F>(f: F) -> Self
    where
        F: Fn(&str, &Document) -> ExtensionResult<Option<String>> + Send + Sync + 'static,
    {
        Self::WithDocument(Arc::new(f))
    }

    pub fn apply(&self, text: &str, doc: &Document) -> ExtensionResult<Option<String>> {
        match self {
            Self::Text(f) => f(text),
            Self::WithDocument(f) => f(text, doc),
        }
    }
}

impl fmt::Debug for Postprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(_) => f.write_str("Postprocessor::Text(..)"),
            Self::WithDocument(_) => f.write_str("Postprocessor::WithDocument(..)"),
        }
    }
}

/// Run `preprocessors` over `text` in order. `None` and an empty list both
/// leave the text alone.
pub fn apply_preprocessors(
    preprocessors: Option<&[Preprocessor]>,
    text: String,
    meta: &mut DocumentMeta,
) -> ExtensionResult<String> {
    let Some(preprocessors) = preprocessors else {
        return Ok(text);
    };
    let mut text = text;
    for (index, preprocessor) in preprocessors.iter().enumerate() {
        tracing::trace!(index, "running preprocessor");
        text = preprocessor.apply(&text, meta)?;
    }
    Ok(text)
}

/// Run `postprocessors` over the rendered `text` in order
pub fn apply_postprocessors(
    postprocessors: Option<&[Postprocessor]>,
    text: String,
    doc: &Document,
) -> ExtensionResult<String> {
    let Some(postprocessors) = postprocessors else {
        return Ok(text);
    };
    let mut text = text;
    for (index, postprocessor) in postprocessors.iter().enumerate() {
        match postprocessor.apply(&text, doc)? {
            Some(replacement) => text = replacement,
            None => tracing::trace!(index, "postprocessor kept the text"),
        }
    }
    Ok(text)
}
