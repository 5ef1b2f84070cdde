//! Error handling for LeakComp
//!
//! Provides the error types shared by every layer of the post-processor:
//! - G-Code errors (tokenizing a line into a command)
//! - I/O errors (reading the program, writing the rewritten program)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Represents errors raised while turning a raw program line into a command.
/// Every variant is fatal for the run: the tokenizer never guesses a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// A field letter was followed by text that is not a number
    #[error("Invalid number for field '{field}' at line {line_number}: {value:?}")]
    InvalidNumber {
        /// The line number where the field was found.
        line_number: u32,
        /// The field letter.
        field: char,
        /// The text that failed to parse.
        value: String,
    },

    /// A field letter with nothing after it
    #[error("Missing value for field '{field}' at line {line_number}")]
    EmptyField {
        /// The line number where the field was found.
        line_number: u32,
        /// The field letter.
        field: char,
    },

    /// A token that does not start with a field letter
    #[error("Invalid field code at line {line_number}: {token:?}")]
    InvalidFieldCode {
        /// The line number where the token was found.
        line_number: u32,
        /// The offending token.
        token: String,
    },
}

impl GcodeError {
    /// Line number the error was raised on
    pub fn line_number(&self) -> u32 {
        match self {
            Self::InvalidNumber { line_number, .. }
            | Self::EmptyField { line_number, .. }
            | Self::InvalidFieldCode { line_number, .. } => *line_number,
        }
    }
}

/// Main error type for LeakComp
///
/// A unified error type that can represent any error from the library crates.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
