// SPDX-License-Identifier: AGPL-3.0-or-later
//! md2adoc core - document node tree, Markdown front end and AsciiDoc renderer
//!
//! This crate provides:
//! - Text normalization (encoding detection, line endings)
//! - Front matter extraction into [`DocumentMeta`]
//! - A format-neutral node tree that parsers produce and renderers consume
//! - Book promotion for multi-part documents
//! - Parser and renderer traits with Markdown and AsciiDoc handlers

pub mod ast;
pub mod formats;
pub mod front_matter;
pub mod normalize;
pub mod structure;
pub mod traits;

pub use ast::{Attributes, Block, Document, DocumentMeta, Inline, SourceFormat};
pub use normalize::Input;
pub use structure::Structure;
pub use traits::{ConversionError, ParseConfig, Parser, RenderConfig, Renderer, Result};
