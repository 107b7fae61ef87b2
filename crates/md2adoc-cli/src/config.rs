// SPDX-License-Identifier: AGPL-3.0-or-later
//! `md2adoc.toml` configuration file
//!
//! ```toml
//! encoding = "windows-1252"
//!
//! [parse]
//! smart_punctuation = true
//!
//! [render]
//! align_tables = true
//!
//! [attributes]
//! toc = "left"
//! sectnums = true
//! ```

use anyhow::{Context, Result};
use md2adoc_core::{Attributes, ParseConfig, RenderConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "md2adoc.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub encoding: Option<String>,
    pub parse: ParseSection,
    pub render: RenderSection,
    attributes: BTreeMap<String, toml::Value>,
}

/// Overrides for [`ParseConfig`]; unset keys keep the defaults
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseSection {
    pub preserve_spans: Option<bool>,
    pub front_matter_delimiter: Option<String>,
    pub smart_punctuation: Option<bool>,
    pub math: Option<bool>,
    pub underline: Option<bool>,
}

/// Overrides for [`RenderConfig`]
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    pub hard_breaks: Option<bool>,
    pub ui_macros: Option<bool>,
    pub rewrite_markdown_links: Option<bool>,
    pub align_tables: Option<bool>,
}

impl Config {
    /// Load `path`, or the default file if present, or nothing
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn parse_config(&self) -> ParseConfig {
        let mut config = ParseConfig::default();
        let section = &self.parse;
        if let Some(value) = section.preserve_spans {
            config.preserve_spans = value;
        }
        if let Some(delimiter) = &section.front_matter_delimiter {
            config.front_matter_delimiter = Some(delimiter.clone());
        }
        if let Some(value) = section.smart_punctuation {
            config.smart_punctuation = value;
        }
        if let Some(value) = section.math {
            config.math = value;
        }
        if let Some(value) = section.underline {
            config.underline = value;
        }
        config
    }

    pub fn render_config(&self) -> RenderConfig {
        let mut config = RenderConfig::default();
        let section = &self.render;
        if let Some(value) = section.hard_breaks {
            config.hard_breaks = value;
        }
        if let Some(value) = section.ui_macros {
            config.ui_macros = value;
        }
        if let Some(value) = section.rewrite_markdown_links {
            config.rewrite_markdown_links = value;
        }
        if let Some(value) = section.align_tables {
            config.align_tables = value;
        }
        config
    }

    /// Document attributes from the `[attributes]` table.
    ///
    /// `true` sets an attribute with an empty value, `false` leaves it out.
    pub fn attributes(&self) -> Result<Attributes> {
        let mut attributes = Attributes::new();
        for (name, value) in &self.attributes {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(true) => String::new(),
                toml::Value::Boolean(false) => continue,
                other => anyhow::bail!(
                    "attribute `{name}` must be a string, number or boolean, not {}",
                    other.type_str()
                ),
            };
            attributes.insert(name.clone(), value);
        }
        Ok(attributes)
    }
}
