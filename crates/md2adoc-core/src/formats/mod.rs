// SPDX-License-Identifier: AGPL-3.0-or-later
//! Format handlers

#[cfg(feature = "markdown")]
pub mod markdown;
#[cfg(feature = "asciidoc")]
pub mod asciidoc;

#[cfg(feature = "markdown")]
pub use markdown::MarkdownHandler;
#[cfg(feature = "asciidoc")]
pub use asciidoc::AsciiDocHandler;
