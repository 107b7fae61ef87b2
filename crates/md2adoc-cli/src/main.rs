// SPDX-License-Identifier: AGPL-3.0-or-later
//! md2adoc - convert Markdown documents to AsciiDoc
//!
//! Reads a Markdown file (or stdin) and writes AsciiDoc next to it, to
//! `--output`, or to stdout.

mod config;

use anyhow::{bail, Context, Result};
use clap::Parser;
use config::Config;
use md2adoc_core::formats::MarkdownHandler;
use md2adoc_core::normalize::{self, Input};
use md2adoc_core::{Attributes, Parser as _};
use md2adoc_pipeline::{Converter, Destination, FileSource};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Convert Markdown to AsciiDoc
#[derive(Parser)]
#[command(name = "md2adoc", version, about)]
struct Cli {
    /// Markdown file to convert; omit or use `-` to read stdin
    input: Option<PathBuf>,

    /// Output file; `-` writes to stdout. Defaults to the input path with an
    /// `.adoc` extension, or stdout when reading stdin.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Document attribute, repeatable
    #[arg(short = 'a', long = "attribute", value_name = "KEY[=VALUE]")]
    attributes: Vec<String>,

    /// Configuration file [default: md2adoc.toml if present]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Input encoding for files without a byte-order mark
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Print the parsed document tree as JSON instead of converting
    #[arg(long)]
    ast: bool,

    /// Log conversion details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // --verbose forces debug, otherwise RUST_LOG or warn
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let mut attributes = config.attributes()?;
    for entry in &cli.attributes {
        let (name, value) = parse_attribute(entry)?;
        attributes.insert(name, value);
    }

    let encoding = cli.encoding.clone().or_else(|| config.encoding.clone());
    let input = cli.input.as_deref().filter(|path| !is_stdio(path));

    if cli.ast {
        return print_ast(input, encoding.as_deref(), &config);
    }

    let mut converter = Converter::new()
        .with_parse_config(config.parse_config())
        .with_render_config(config.render_config());
    if let Some(label) = encoding {
        converter = converter.with_encoding(label);
    }

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let output = cli.output.as_deref();
    let to = match output {
        Some(path) if is_stdio(path) => Destination::from(&mut stdout),
        Some(path) => Destination::from(path),
        None if input.is_none() => Destination::from(&mut stdout),
        None => Destination::Return,
    };

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let source = match input {
        Some(path) => FileSource::from(path),
        None => FileSource::Reader(&mut stdin),
    };

    let name = input.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
    converter
        .convert_file(source, to, Some(&mut attributes))
        .with_context(|| format!("failed to convert {name}"))?;
    Ok(())
}

fn print_ast(input: Option<&Path>, encoding: Option<&str>, config: &Config) -> Result<()> {
    let bytes = match input {
        Some(path) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => {
            let mut bytes = Vec::new();
            io::stdin().read_to_end(&mut bytes)?;
            bytes
        }
    };
    let text = normalize::normalize(Input::Bytes(&bytes), encoding)?;
    let doc = MarkdownHandler::new().parse(&text, &config.parse_config())?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &doc)?;
    writeln!(stdout)?;
    Ok(())
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// `name=value` sets a value, a bare `name` sets an empty one
fn parse_attribute(entry: &str) -> Result<(String, String)> {
    let (name, value) = match entry.split_once('=') {
        Some((name, value)) => (name.trim(), value.trim()),
        None => (entry.trim(), ""),
    };
    if name.is_empty() {
        bail!("attribute `{entry}` has no name");
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute("toc=left").unwrap(),
            ("toc".to_string(), "left".to_string())
        );
        assert_eq!(
            parse_attribute("sectnums").unwrap(),
            ("sectnums".to_string(), String::new())
        );
        assert_eq!(
            parse_attribute("source-highlighter = rouge").unwrap(),
            ("source-highlighter".to_string(), "rouge".to_string())
        );
        assert!(parse_attribute("=x").is_err());
    }

    #[test]
    fn test_args() {
        let cli = Cli::try_parse_from(["md2adoc", "in.md", "-o", "-", "-a", "toc", "-a", "x=1"]).unwrap();
        assert_eq!(cli.input.as_deref(), Some(Path::new("in.md")));
        assert!(cli.output.as_deref().is_some_and(is_stdio));
        assert_eq!(cli.attributes, vec!["toc", "x=1"]);
        assert!(!cli.ast);
    }
}
