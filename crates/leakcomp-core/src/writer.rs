//! G-Code emitter
//!
//! Writes commands one per line: the tag, then every present field as
//! `<letter><value>` with a fixed number of decimals.

use std::fmt::Write as _;
use std::io::Write;

use crate::command::Command;
use crate::error::Result;

/// Decimal places used for every field value
pub const DEFAULT_PRECISION: usize = 3;

/// Format a command as a single line (without terminator)
pub fn format_command(command: &Command, precision: usize) -> String {
    let mut line = String::from(command.output_tag());
    for (field, value) in command.fields() {
        let _ = write!(line, " {}{:.*}", field.letter(), precision, value);
    }
    for (letter, value) in &command.extra {
        let _ = write!(line, " {}{:.*}", letter, precision, value);
    }
    line
}

/// Line-oriented command writer
pub struct GcodeWriter<W: Write> {
    inner: W,
    precision: usize,
    commands_written: u64,
}

impl<W: Write> GcodeWriter<W> {
    /// Create a writer using [`DEFAULT_PRECISION`]
    pub fn new(inner: W) -> Self {
        Self::with_precision(inner, DEFAULT_PRECISION)
    }

    /// Create a writer with a specific number of decimal places
    pub fn with_precision(inner: W, precision: usize) -> Self {
        Self {
            inner,
            precision,
            commands_written: 0,
        }
    }

    /// Write one command
    pub fn write_command(&mut self, command: &Command) -> Result<()> {
        writeln!(self.inner, "{}", format_command(command, self.precision))?;
        self.commands_written += 1;
        Ok(())
    }

    /// Write an ordered list of commands
    pub fn write_block(&mut self, commands: &[Command]) -> Result<()> {
        commands
            .iter()
            .try_for_each(|command| self.write_command(command))
    }

    /// Number of commands written so far
    pub fn commands_written(&self) -> u64 {
        self.commands_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}
