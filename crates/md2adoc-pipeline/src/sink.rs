// SPDX-License-Identifier: AGPL-3.0-or-later
//! Output sink
//!
//! Delivers the final text exactly once: back to the caller, to a file, or
//! to an open stream.

use crate::{PipelineError, Result};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where converted text goes
#[derive(Default)]
pub enum Destination<'w> {
    /// Hand the text back to the caller
    #[default]
    Return,
    /// Replace the file at this path, creating parent directories
    Path(PathBuf),
    /// Write to an open stream
    Writer(&'w mut dyn Write),
}

impl fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Return => f.write_str("Return"),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

impl From<&str> for Destination<'_> {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<&Path> for Destination<'_> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Destination<'_> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl<'w, W: Write> From<&'w mut W> for Destination<'w> {
    fn from(writer: &'w mut W) -> Self {
        Self::Writer(writer)
    }
}

/// Non-empty text ends with exactly one newline; empty text stays empty
pub fn finalize(text: String) -> String {
    let trimmed = text.trim_end_matches('\n').len();
    if trimmed == 0 {
        return String::new();
    }
    let mut text = text;
    text.truncate(trimmed);
    text.push('\n');
    text
}

/// Finalize `text` and deliver it. Only [`Destination::Return`] gives the
/// text back.
pub fn emit(text: String, destination: Destination<'_>) -> Result<Option<String>> {
    let text = finalize(text);
    match destination {
        Destination::Return => Ok(Some(text)),
        Destination::Path(path) => {
            tracing::info!(path = %path.display(), bytes = text.len(), "writing output file");
            write_atomic(&path, text.as_bytes())?;
            Ok(None)
        }
        Destination::Writer(writer) => {
            writer.write_all(text.as_bytes())?;
            writer.flush()?;
            Ok(None)
        }
    }
}

/// Write through a temporary sibling that replaces `path` only once it is
/// complete.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_error = |source: io::Error| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    create_dir_all(dir).map_err(io_error)?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(bytes).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

/// Racing creators of the same directory all succeed
fn create_dir_all(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finalize() {
        assert_eq!(finalize(String::new()), "");
        assert_eq!(finalize("\n\n".to_string()), "");
        assert_eq!(finalize("a".to_string()), "a\n");
        assert_eq!(finalize("a\n\n\n".to_string()), "a\n");
        assert_eq!(finalize("a \n".to_string()), "a \n");
    }

    #[test]
    fn test_return_gives_text_back() {
        assert_eq!(
            emit("x".to_string(), Destination::Return).unwrap(),
            Some("x\n".to_string())
        );
    }

    #[test]
    fn test_writer_destination() {
        let mut buffer: Vec<u8> = Vec::new();
        let result = emit("x".to_string(), Destination::from(&mut buffer)).unwrap();
        assert_eq!(result, None);
        assert_eq!(buffer, b"x\n");
    }

    #[test]
    fn test_path_destination_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/out.adoc");
        assert_eq!(emit("x".to_string(), target.as_path().into()).unwrap(), None);
        assert_eq!(fs::read_to_string(&target).unwrap(), "x\n");

        // Replacing an existing file
        emit("y".to_string(), target.as_path().into()).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "y\n");
    }

    #[test]
    fn test_empty_text_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("empty.adoc");
        emit(String::new(), target.clone().into()).unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"");
    }

    #[test]
    fn test_existing_directory_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        create_dir_all(dir.path()).unwrap();
        create_dir_all(dir.path()).unwrap();
    }
}
