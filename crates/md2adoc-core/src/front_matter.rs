// SPDX-License-Identifier: AGPL-3.0-or-later
//! Front matter extraction
//!
//! A YAML block fenced by the delimiter on the very first line is split off
//! the body and turned into [`DocumentMeta`]. Anything that does not look
//! like a complete YAML mapping leaves the text untouched.

use crate::ast::{DocumentMeta, MetaValue};
use std::collections::HashMap;

/// Closing line accepted in addition to the opening delimiter
const YAML_DOCUMENT_END: &str = "...";

/// Split front matter off `text`.
///
/// Returns empty metadata and the original text when the first line is not
/// `delimiter`, when the block is never closed, or when its content is not a
/// YAML mapping.
pub fn extract<'a>(text: &'a str, delimiter: &str) -> (DocumentMeta, &'a str) {
    let Some((first, rest)) = text.split_once('\n') else {
        return (DocumentMeta::default(), text);
    };
    if first.trim_end() != delimiter {
        return (DocumentMeta::default(), text);
    }

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let bare = line.trim_end();
        if bare == delimiter || bare == YAML_DOCUMENT_END {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return match parse_block(block) {
                Some(meta) => (meta, body.strip_prefix('\n').unwrap_or(body)),
                None => (DocumentMeta::default(), text),
            };
        }
        offset += line.len();
    }

    tracing::debug!("front matter delimiter is never closed, treating it as body text");
    (DocumentMeta::default(), text)
}

fn parse_block(block: &str) -> Option<DocumentMeta> {
    if block.trim().is_empty() {
        return Some(DocumentMeta::default());
    }
    match serde_yaml::from_str::<HashMap<String, MetaValue>>(block) {
        Ok(map) => Some(meta_from_map(map)),
        Err(err) => {
            tracing::debug!(error = %err, "front matter is not a YAML mapping, treating it as body text");
            None
        }
    }
}

fn meta_from_map(map: HashMap<String, MetaValue>) -> DocumentMeta {
    let mut meta = DocumentMeta::default();
    for (key, value) in map {
        match key.as_str() {
            "title" => meta.title = value.as_scalar(),
            "author" | "authors" => meta.authors.extend(string_list(value)),
            "date" => meta.date = value.as_scalar(),
            "lang" | "language" => meta.language = value.as_scalar(),
            _ => {
                meta.custom.insert(key, value);
            }
        }
    }
    meta
}

fn string_list(value: MetaValue) -> Vec<String> {
    match value {
        MetaValue::List(items) => items.iter().filter_map(MetaValue::as_scalar).collect(),
        other => other.as_scalar().into_iter().collect(),
    }
}
