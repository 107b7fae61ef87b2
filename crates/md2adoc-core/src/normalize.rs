// SPDX-License-Identifier: AGPL-3.0-or-later
//! Text normalization: decode input to UTF-8 and canonicalize line endings
//!
//! Everything downstream of this module works on `\n`-terminated UTF-8 text.

use crate::traits::{ConversionError, Result};
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::io::Read;

/// Raw conversion input
pub enum Input<'a> {
    /// Already-decoded text
    Str(&'a str),
    /// Encoded bytes; see [`decode`] for how the encoding is chosen
    Bytes(&'a [u8]),
    /// Readable stream, consumed to the end
    Reader(&'a mut dyn Read),
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(s: &'a str) -> Self {
        Input::Str(s)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(s: &'a String) -> Self {
        Input::Str(s.as_str())
    }
}

impl<'a> From<&'a [u8]> for Input<'a> {
    fn from(b: &'a [u8]) -> Self {
        Input::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for Input<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Input::Bytes(b.as_slice())
    }
}

/// Decode bytes to a string.
///
/// A byte-order mark (UTF-8, UTF-16LE, UTF-16BE) always wins. Without one,
/// the encoding named by `label` is used, falling back to UTF-8. Malformed
/// sequences are an error; nothing is replaced or guessed.
pub fn decode(bytes: &[u8], label: Option<&str>) -> Result<String> {
    let (encoding, bom_len) = match Encoding::for_bom(bytes) {
        Some(found) => found,
        None => (encoding_for_label(label)?, 0),
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .map(Cow::into_owned)
        .ok_or_else(|| ConversionError::Encoding {
            encoding: encoding.name().to_string(),
            message: "malformed byte sequence".to_string(),
        })
}

fn encoding_for_label(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        None => Ok(UTF_8),
        Some(name) => {
            Encoding::for_label(name.trim().as_bytes()).ok_or_else(|| ConversionError::Encoding {
                encoding: name.to_string(),
                message: "unknown encoding label".to_string(),
            })
        }
    }
}

/// Rewrite `\r\n` and lone `\r` to `\n`. Borrows when nothing changes.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Produce canonical text from any supported input
pub fn normalize(input: Input<'_>, label: Option<&str>) -> Result<String> {
    let text = match input {
        Input::Str(s) => s.strip_prefix('\u{feff}').unwrap_or(s).to_string(),
        Input::Bytes(bytes) => decode(bytes, label)?,
        Input::Reader(reader) => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            decode(&bytes, label)?
        }
    };

    Ok(match normalize_newlines(&text) {
        Cow::Borrowed(_) => text,
        Cow::Owned(normalized) => normalized,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(text in "[a-z \r\n]{0,64}") {
            let once = normalize(Input::Str(&text), None).unwrap();
            let twice = normalize(Input::Str(&once), None).unwrap();
            prop_assert!(!once.contains('\r'));
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_canonical_text_is_untouched(text in "[a-zA-Z0-9 .\n]{0,64}") {
            prop_assert_eq!(normalize(Input::Str(&text), None).unwrap(), text);
        }
    }
}
