//! G-Code line tokenizer
//!
//! Turns one program line into a [`Command`]. Lines whose first word is not a
//! `G` or `M` code are not commands and yield `Ok(None)`; a malformed field
//! value is an error.

use regex::Regex;

use crate::command::{Command, Field};
use crate::error::GcodeError;

/// Line tokenizer that tracks the current line number for error reporting
#[derive(Debug, Default)]
pub struct GcodeParser {
    line_number: u32,
}

impl GcodeParser {
    /// Create a new parser positioned before the first line
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Parse the next line of the program
    pub fn parse(&mut self, line: &str) -> Result<Option<Command>, GcodeError> {
        self.line_number += 1;
        parse_line(line, self.line_number)
    }
}

/// Parse a single line
///
/// `line_number` is only used in error values.
pub fn parse_line(line: &str, line_number: u32) -> Result<Option<Command>, GcodeError> {
    let cleaned = remove_comments(line);
    let mut words = cleaned.split_whitespace();

    let Some(tag) = words.next() else {
        return Ok(None);
    };
    if !tag.starts_with(['G', 'M']) {
        return Ok(None);
    }

    let mut command = Command::new(tag);
    for word in words {
        let mut chars = word.chars();
        let letter = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase(),
            _ => {
                return Err(GcodeError::InvalidFieldCode {
                    line_number,
                    token: word.to_string(),
                })
            }
        };

        let text = chars.as_str();
        if text.is_empty() {
            return Err(GcodeError::EmptyField {
                line_number,
                field: letter,
            });
        }
        let value = text
            .parse::<f64>()
            .map_err(|_| GcodeError::InvalidNumber {
                line_number,
                field: letter,
                value: text.to_string(),
            })?;

        match Field::from_letter(letter) {
            Some(field) => command.set(field, value),
            None => command.set_extra(letter, value),
        }
    }

    Ok(Some(command))
}

/// Strip `;` and `(` comments
fn remove_comments(line: &str) -> std::borrow::Cow<'_, str> {
    static COMMENT_REGEX: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    let regex = COMMENT_REGEX.get_or_init(|| Regex::new(r"[;(].*").expect("invalid regex pattern"));
    regex.replace(line, "")
}
