//! # LeakComp Core
//!
//! Core types for LeakComp.
//! Provides the command model, the line tokenizer that produces it, the
//! emitter that writes it back out, and the shared error types.

pub mod command;
pub mod error;
pub mod parser;
pub mod writer;

pub use command::{Command, Field, Point, LINEAR_MOVE, SET_ACCELERATION};
pub use error::{Error, GcodeError, Result};
pub use parser::{parse_line, GcodeParser};
pub use writer::{format_command, GcodeWriter, DEFAULT_PRECISION};

/// Default leak coefficient `C` (leaked volume per unit of mean speed)
pub const DEFAULT_LEAK_COEFFICIENT: f64 = 0.001;
