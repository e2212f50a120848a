// SPDX-License-Identifier: BSD-3-Clause
// Copyright 2025. Triad National Security, LLC.

use log::*;

use crate::block::{Block, Value};
use crate::normalize::normalize;
use crate::{ParseError, ParseErrorKind};

/// How much of the stream on either side of the cursor to include in error messages.
const CONTEXT_LEN: usize = 30;

/// A recursive-descent parser over the normalized text. The cursor only ever moves forward.
pub struct Parser {
    text: String,
    pos: usize,
}

impl Parser {
    pub fn new(raw: &str) -> Self {
        Parser {
            text: normalize(raw),
            pos: 0,
        }
    }

    /// Parses the whole document into its top-level blocks and directives, in file order.
    pub fn parse(&mut self) -> crate::Result<Vec<Block>> {
        let mut blocks = Vec::new();
        while !self.stream().is_empty() {
            blocks.push(self.block_or_section()?);
        }
        debug!("parsed {} top-level blocks", blocks.len());
        Ok(blocks)
    }

    /// The unconsumed remainder of the text.
    fn stream(&self) -> &str {
        &self.text[self.pos..]
    }

    fn block_or_section(&mut self) -> crate::Result<Block> {
        if let Some(section) = self.section() {
            return Ok(section);
        }

        let mut block = Block::new(self.block_name()?.to_uppercase());
        trace!("parsing block {}", block.tag());
        self.block_body(&mut block)?;
        if !self.stream().starts_with('}') {
            return Err(self.error(ParseErrorKind::MissingClosingBrace));
        }
        self.pos += 1;
        Ok(block)
    }

    /// A directive is `%name` followed by a space, and runs to the end of its line.
    fn section(&mut self) -> Option<Block> {
        let stream = self.stream();
        if !stream.starts_with('%') {
            return None;
        }
        let (line, consumed) = match stream.find('\n') {
            Some(idx) => (&stream[..idx], idx + 1),
            None => (stream, stream.len()),
        };
        let (name, value) = line.split_once(' ')?;
        let section = Block::section(name, value);
        self.pos += consumed;
        trace!("parsed directive {}", section.tag());
        Some(section)
    }

    fn block_name(&mut self) -> crate::Result<String> {
        let Some(idx) = self.stream().find('{') else {
            return Err(self.error(ParseErrorKind::MissingBlockStart));
        };
        let name = self.stream()[..idx].to_string();
        self.pos += idx + 1;
        Ok(name)
    }

    fn block_body(&mut self, block: &mut Block) -> crate::Result<()> {
        while !self.stream().starts_with('}') {
            if self.stream().is_empty() {
                return Err(self.error(ParseErrorKind::MissingClosingBrace));
            }
            let last_pos = self.pos;

            let semicolon = self.stream().find(';');
            let left_brace = self.stream().find('{');
            match (semicolon, left_brace) {
                (Some(s), Some(b)) if s < b => self.stanza(block)?,
                (Some(_), None) => self.stanza(block)?,
                (_, Some(_)) => block.push_child(self.block_or_section()?),
                (None, None) => return Err(self.error(ParseErrorKind::MissingSemicolon)),
            }

            if self.pos == last_pos {
                return Err(self.error(ParseErrorKind::NoProgress));
            }
        }
        Ok(())
    }

    fn stanza(&mut self, block: &mut Block) -> crate::Result<()> {
        let stream = self.stream();
        let Some(semicolon) = stream.find(';') else {
            return Err(self.error(ParseErrorKind::MissingSemicolon));
        };
        let equal = match stream.find('=') {
            Some(idx) if idx < semicolon => idx,
            _ => return Err(self.error(ParseErrorKind::MalformedStanza)),
        };

        let key = stream[..equal].to_string();
        let value = parse_value(&stream[equal + 1..semicolon]);
        trace!("stanza {key} = {value:?}");
        block.set_attribute(key, value);
        self.pos += semicolon + 1;
        Ok(())
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        let mut start = self.pos.saturating_sub(CONTEXT_LEN);
        while !self.text.is_char_boundary(start) {
            start -= 1;
        }
        let mut end = (self.pos + CONTEXT_LEN).min(self.text.len());
        while !self.text.is_char_boundary(end) {
            end += 1;
        }
        let context = format!(
            "...{}<here>{}",
            &self.text[start..self.pos],
            &self.text[self.pos..end]
        );
        ParseError { kind, context }
    }
}

/// Interprets the raw text between `=` and `;`.
///
/// Comma separated text becomes a list, each element parsed on its own (elements never contain
/// commas, so lists are never nested). Otherwise, in order of preference: an integer, `true` or
/// `false`, a double-quoted string with its quotes removed, or the raw text.
pub fn parse_value(raw: &str) -> Value {
    if raw.contains(',') {
        return Value::List(raw.split(',').map(|v| parse_value(v.trim())).collect());
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Int(n);
    }
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Some(rest) = raw.strip_prefix('"') {
        // Drop the last character, whatever it is.
        let mut chars = rest.chars();
        chars.next_back();
        return Value::Str(chars.as_str().to_string());
    }
    Value::Str(raw.to_string())
}
