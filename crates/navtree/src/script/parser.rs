use serde_json::Value;
use std::fmt::Display;

use super::NavScript;
use crate::error::NavError;

const KEYWORDS: [&str; 3] = ["var", "let", "const"];

/// Deepest array or object nesting accepted in a literal. Every entry level of a
/// tree uses two: its child list and the entry itself.
pub(crate) const MAX_NESTING: usize = 120;

/// Tokens that end a bare literal such as `null` or `42`.
const BARE_LITERAL_ENDS: [&str; 4] = [";", "\n", "//", "/*"];

pub(crate) struct ScriptParser<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> ScriptParser<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self { source, offset: 0 }
    }

    pub(crate) fn parse(mut self) -> Result<NavScript, NavError> {
        let mut script = NavScript::default();

        loop {
            self.skip_trivia()?;

            if self.rest().is_empty() {
                break;
            }

            let (name, value) = self.parse_assignment()?;
            script.insert(name, value);
        }

        Ok(script)
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    /// Provides the line and column of the current offset.
    fn position(&self) -> Position {
        let previous = self.source[..self.offset].as_bytes();
        let line = memchr::Memchr::new(b'\n', previous).count() + 1;
        let start_of_line = memchr::memrchr(b'\n', previous).map_or(0, |newline| newline + 1);
        let column = self.source[start_of_line..self.offset].chars().count() + 1;

        Position { line, column }
    }

    /// Skips whitespace, block comments and line comments.
    fn skip_trivia(&mut self) -> Result<(), NavError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.offset += rest.len() - trimmed.len();

            if let Some(comment) = trimmed.strip_prefix("/*") {
                let Some(end) = memchr::memmem::find(comment.as_bytes(), b"*/") else {
                    return Err(self.error("unterminated block comment"));
                };

                self.offset += end + 4;
            } else if trimmed.starts_with("//") {
                match memchr::memchr(b'\n', trimmed.as_bytes()) {
                    Some(end) => self.offset += end + 1,
                    None => self.offset = self.source.len(),
                }
            } else {
                return Ok(());
            }
        }
    }

    fn parse_assignment(&mut self) -> Result<(String, Value), NavError> {
        self.parse_keyword()?;
        self.skip_trivia()?;
        let name = self.parse_identifier()?;
        self.skip_trivia()?;

        if !self.rest().starts_with('=') {
            return Err(self.error(format_args!("expected `=` after `{}`", name)));
        }

        self.offset += 1;
        self.skip_trivia()?;
        let value = self.parse_value()?;
        self.skip_trivia()?;

        if self.rest().starts_with(';') {
            self.offset += 1;
        }

        Ok((name, value))
    }

    fn parse_keyword(&mut self) -> Result<(), NavError> {
        let rest = self.rest();
        let keyword = KEYWORDS.iter().find(|keyword| {
            matches!(
                rest.strip_prefix(**keyword).and_then(|after| after.chars().next()),
                Some(next) if next.is_whitespace()
            )
        });

        match keyword {
            Some(keyword) => {
                self.offset += keyword.len();
                Ok(())
            }
            None => Err(self.error("expected a `var` assignment")),
        }
    }

    fn parse_identifier(&mut self) -> Result<String, NavError> {
        let rest = self.rest();
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        let name = &rest[..end];

        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(self.error("expected a variable name"));
        }

        self.offset += end;

        Ok(name.to_owned())
    }

    fn parse_value(&mut self) -> Result<Value, NavError> {
        let rest = self.rest();

        if let Some(body) = rest.strip_prefix('\'') {
            return self.parse_single_quoted(body);
        }

        // NOTE: Arrays, objects and strings end themselves. Anything else runs up to
        // the end of the statement.
        if rest.starts_with(&['[', '{', '"'][..]) {
            if let Some(overflow) = nesting_overflow(rest) {
                self.offset += overflow;
                return Err(self.error(format_args!(
                    "literal nests arrays or objects deeper than {} levels",
                    MAX_NESTING
                )));
            }

            let mut values = serde_json::Deserializer::from_str(rest).into_iter::<Value>();

            return match values.next() {
                Some(Ok(value)) => {
                    self.offset += values.byte_offset();
                    Ok(value)
                }
                Some(Err(err)) => Err(self.error(format_args!("invalid literal: {}", err))),
                None => Err(self.error("expected a literal value")),
            };
        }

        let end = BARE_LITERAL_ENDS
            .iter()
            .filter_map(|token| rest.find(token))
            .min()
            .unwrap_or(rest.len());
        let literal = rest[..end].trim_end();

        match serde_json::from_str(literal) {
            Ok(value) => {
                self.offset += literal.len();
                Ok(value)
            }
            Err(err) => Err(self.error(format_args!("invalid literal `{}`: {}", literal, err))),
        }
    }

    fn parse_single_quoted(&mut self, body: &str) -> Result<Value, NavError> {
        let mut text = String::new();
        let mut chars = body.char_indices();

        while let Some((index, c)) = chars.next() {
            match c {
                '\'' => {
                    // NOTE: Both quotes are one byte wide.
                    self.offset += index + 2;
                    return Ok(Value::String(text));
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, escaped)) => text.push(escaped),
                    None => break,
                },
                '\n' => break,
                c => text.push(c),
            }
        }

        Err(self.error("unterminated string literal"))
    }

    fn error(&self, message: impl Display) -> NavError {
        NavError::malformed(self.position(), message)
    }
}

/// Finds the opening bracket that takes `literal` past [`MAX_NESTING`], stopping
/// at the end of the first value.
fn nesting_overflow(literal: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, byte) in literal.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }

            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;

                if depth > MAX_NESTING {
                    return Some(index);
                }
            }
            b']' | b'}' => {
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }

        if depth == 0 {
            return None;
        }
    }

    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Display for Position {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "line: {}, column: {}", self.line, self.column)
    }
}
