// SPDX-License-Identifier: AGPL-3.0-or-later
//! md2adoc pipeline - Markdown to AsciiDoc conversion entry points
//!
//! A conversion runs these stages in order, synchronously:
//! - Normalize: decode the input and canonicalize line endings
//! - Front matter: split off the YAML header
//! - Preprocess: caller transforms over the Markdown body
//! - Parse: Markdown into the node tree
//! - Render: node tree into AsciiDoc, filling in document attributes
//! - Postprocess: caller transforms over the AsciiDoc
//! - Emit: return, write to a file, or write to a stream

pub mod extensions;
pub mod sink;

pub use extensions::{ExtensionError, ExtensionResult, Postprocessor, Preprocessor};
pub use sink::Destination;

use md2adoc_core::formats::{AsciiDocHandler, MarkdownHandler};
use md2adoc_core::normalize::{self, Input};
use md2adoc_core::{
    front_matter, Attributes, ConversionError, ParseConfig, RenderConfig, SourceFormat,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Raised by a pre- or postprocessor
    #[error(transparent)]
    Extension(ExtensionError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output stream: {0}")]
    Stream(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Reusable conversion settings.
///
/// A converter is never modified by a conversion, so one instance can be
/// shared between threads and calls.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    parse: ParseConfig,
    render: RenderConfig,
    preprocessors: Option<Vec<Preprocessor>>,
    postprocessors: Option<Vec<Postprocessor>>,
    encoding: Option<String>,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse_config(mut self, config: ParseConfig) -> Self {
        self.parse = config;
        self
    }

    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.render = config;
        self
    }

    pub fn with_preprocessors(mut self, preprocessors: impl IntoIterator<Item = Preprocessor>) -> Self {
        self.preprocessors = Some(preprocessors.into_iter().collect());
        self
    }

    pub fn with_postprocessors(
        mut self,
        postprocessors: impl IntoIterator<Item = Postprocessor>,
    ) -> Self {
        self.postprocessors = Some(postprocessors.into_iter().collect());
        self
    }

    /// Single postprocessor, replacing any list set before
    pub fn with_postprocess(self, postprocessor: Postprocessor) -> Self {
        self.with_postprocessors([postprocessor])
    }

    /// Encoding label used for byte input without a byte-order mark
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    pub fn parse_config(&self) -> &ParseConfig {
        &self.parse
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    /// Convert Markdown to AsciiDoc.
    ///
    /// Document-derived attributes are added to `attributes` when given;
    /// existing entries are kept. Returns the text only for
    /// [`Destination::Return`].
    pub fn convert<'i, 'w>(
        &self,
        input: impl Into<Input<'i>>,
        to: impl Into<Destination<'w>>,
        attributes: Option<&mut Attributes>,
    ) -> Result<Option<String>> {
        let span = tracing::debug_span!("convert");
        let _enter = span.enter();

        let text = normalize::normalize(input.into(), self.encoding.as_deref())?;
        let (mut meta, body) = front_matter::extract(&text, self.parse.front_matter_delimiter());
        tracing::debug!(title = ?meta.title, "front matter extracted");

        let body = extensions::apply_preprocessors(
            self.preprocessors.as_deref(),
            body.to_string(),
            &mut meta,
        )
        .map_err(PipelineError::Extension)?;

        let mut doc = MarkdownHandler::new().parse_body(&body, meta, &self.parse)?;
        if self.parse.preserve_raw_source {
            doc.raw_source = Some(text);
        }
        tracing::debug!(blocks = doc.content.len(), "parsed");

        let mut scratch = Attributes::new();
        let attributes = attributes.unwrap_or(&mut scratch);
        let rendered = AsciiDocHandler::new().render_with_attributes(&doc, &self.render, attributes)?;
        tracing::debug!(attributes = attributes.len(), "rendered");

        let rendered = extensions::apply_postprocessors(
            self.postprocessors.as_deref(),
            rendered,
            &doc,
        )
        .map_err(PipelineError::Extension)?;

        sink::emit(rendered, to.into())
    }

    /// Convert a Markdown file or open stream.
    ///
    /// With [`Destination::Return`] and a path source, the output goes next
    /// to the source with the extension replaced by `adoc`.
    pub fn convert_file<'w>(
        &self,
        source: FileSource<'_>,
        to: impl Into<Destination<'w>>,
        attributes: Option<&mut Attributes>,
    ) -> Result<Option<String>> {
        match source {
            FileSource::Path(path) => {
                let bytes = std::fs::read(&path).map_err(|source| PipelineError::Io {
                    path: path.clone(),
                    source,
                })?;
                let to = match to.into() {
                    Destination::Return => Destination::Path(output_path(&path)?),
                    other => other,
                };
                self.convert(Input::Bytes(&bytes), to, attributes)
            }
            FileSource::Reader(reader) => self.convert(Input::Reader(reader), to, attributes),
        }
    }
}

/// Sibling path with the AsciiDoc extension
fn output_path(source: &Path) -> Result<PathBuf> {
    let target = source.with_extension(SourceFormat::AsciiDoc.extension());
    if target == source {
        return Err(PipelineError::Io {
            path: target,
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "output path would overwrite the source file",
            ),
        });
    }
    Ok(target)
}

/// Input for [`Converter::convert_file`]
pub enum FileSource<'r> {
    Path(PathBuf),
    Reader(&'r mut dyn Read),
}

impl From<&str> for FileSource<'_> {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<&Path> for FileSource<'_> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for FileSource<'_> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Per-call options for [`convert`] and [`convert_file`]
#[derive(Default)]
pub struct ConvertOptions<'a> {
    pub to: Destination<'a>,
    pub attributes: Option<&'a mut Attributes>,
    pub preprocessors: Option<Vec<Preprocessor>>,
    pub postprocessors: Option<Vec<Postprocessor>>,
    pub parse: ParseConfig,
    pub render: RenderConfig,
    pub encoding: Option<String>,
}

impl<'a> ConvertOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to(mut self, to: impl Into<Destination<'a>>) -> Self {
        self.to = to.into();
        self
    }

    pub fn attributes(mut self, attributes: &'a mut Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn preprocessors(mut self, preprocessors: impl IntoIterator<Item = Preprocessor>) -> Self {
        self.preprocessors = Some(preprocessors.into_iter().collect());
        self
    }

    pub fn postprocessors(mut self, postprocessors: impl IntoIterator<Item = Postprocessor>) -> Self {
        self.postprocessors = Some(postprocessors.into_iter().collect());
        self
    }

    pub fn postprocess(self, postprocessor: Postprocessor) -> Self {
        self.postprocessors([postprocessor])
    }

    fn into_parts(self) -> (Converter, Destination<'a>, Option<&'a mut Attributes>) {
        let converter = Converter {
            parse: self.parse,
            render: self.render,
            preprocessors: self.preprocessors,
            postprocessors: self.postprocessors,
            encoding: self.encoding,
        };
        (converter, self.to, self.attributes)
    }
}

/// One-shot conversion with per-call options
pub fn convert<'i>(input: impl Into<Input<'i>>, options: ConvertOptions<'_>) -> Result<Option<String>> {
    let (converter, to, attributes) = options.into_parts();
    converter.convert(input, to, attributes)
}

/// One-shot file conversion with per-call options
pub fn convert_file(source: FileSource<'_>, options: ConvertOptions<'_>) -> Result<Option<String>> {
    let (converter, to, attributes) = options.into_parts();
    converter.convert_file(source, to, attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_convert_returns_text() {
        let out = Converter::new()
            .convert("# Title\n\nBody.\n", Destination::Return, None)
            .unwrap();
        assert_eq!(out.as_deref(), Some("= Title\n\nBody.\n"));
    }

    #[test]
    fn test_converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
    }

    #[test]
    fn test_converter_is_unchanged_by_a_call() {
        let converter = Converter::new()
            .with_preprocessors([Preprocessor::text(|t| Ok(t.to_uppercase()))])
            .with_encoding("utf-8");
        let before = format!("{converter:?}");
        let mut attributes = Attributes::new();
        converter
            .convert("# A\n\n# B\n", Destination::Return, Some(&mut attributes))
            .unwrap();
        assert_eq!(format!("{converter:?}"), before);
        assert_eq!(attributes.get("doctype").map(String::as_str), Some("book"));
    }

    #[test]
    fn test_bytes_with_encoding_label() {
        let out = Converter::new()
            .with_encoding("windows-1252")
            .convert(&b"caf\xE9\r\n"[..], Destination::Return, None)
            .unwrap();
        assert_eq!(out.as_deref(), Some("café\n"));
    }

    #[test]
    fn test_encoding_error() {
        let err = Converter::new()
            .convert(&b"caf\xE9"[..], Destination::Return, None)
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Conversion(ConversionError::Encoding { .. })
        ));
    }

    #[test]
    fn test_output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("docs/guide.md")).unwrap(),
            PathBuf::from("docs/guide.adoc")
        );
        assert!(output_path(Path::new("guide.adoc")).is_err());
    }
}
