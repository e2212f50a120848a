// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

//! Reading and writing NFS Ganesha style block configuration files.
//!
//! A file is a sequence of blocks (`EXPORT { ... }`) holding `KEY = VALUE;` stanzas and nested
//! blocks, plus `%url`-style directive lines. [`parse`] turns the text into a list of [`Block`]s,
//! which can be inspected and edited, then written back out with [`Block::serialize`].

mod block;
mod normalize;
mod parser;

use std::fmt;

pub use block::{Block, Value, QUOTED_ATTRIBUTES, SECTION_VALUE};
pub use normalize::normalize;
pub use parser::{parse_value, Parser};

pub type Result<T> = std::result::Result<T, ParseError>;

/// Parses a whole configuration file. Any error aborts the parse; nothing is returned for the
/// part of the file that was read before the error.
pub fn parse(raw: &str) -> Result<Vec<Block>> {
    Parser::new(raw).parse()
}

/// A fatal error while parsing, together with the surrounding (normalized) text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The text around the point of failure, with `<here>` marking the parser's position.
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParseErrorKind {
    /// Expected a block, but there is no `{` left in the input.
    MissingBlockStart,

    /// A stanza has no `=` before its terminating `;`.
    MalformedStanza,

    /// A block body contains text that is neither a stanza nor a nested block.
    MissingSemicolon,

    /// The input ended inside a block.
    MissingClosingBrace,

    /// The parser failed to consume any input, and would loop forever.
    NoProgress,
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at \"{}\"", self.kind, self.context)
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::MissingBlockStart => "Cannot find block name",
                Self::MalformedStanza => "Malformed stanza: no equal symbol found",
                Self::MissingSemicolon => "Malformed stanza: no semicolon found",
                Self::MissingClosingBrace => "No closing bracket '}' found at the end of block",
                Self::NoProgress => "Infinite loop while parsing block content",
            }
        )
    }
}
