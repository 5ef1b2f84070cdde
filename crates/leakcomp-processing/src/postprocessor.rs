//! Streaming post-processor
//!
//! Reads a program line by line, runs each command through the segmenter and
//! writes whatever the segmenter releases, in lock-step.

use std::io::{BufRead, Write};

use leakcomp_core::{GcodeParser, GcodeWriter, Result, DEFAULT_PRECISION};
use serde::{Deserialize, Serialize};

use crate::block::BlockKind;
use crate::segmenter::{Emission, Segmenter};

/// Statistics for one run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub lines_read: u64,
    /// Lines that were not commands and produced no output
    pub lines_dropped: u64,
    pub commands_written: u64,
    pub travel_blocks: u64,
    pub extrude_blocks: u64,
    /// Extrude blocks left uncompensated (zero distance or acceleration)
    pub degenerate_blocks: u64,
    /// Moves split in two
    pub splits: u64,
    /// Total extrusion removed across all blocks
    pub leak_volume_removed: f64,
}

impl RunSummary {
    fn record(&mut self, emission: &Emission) {
        match emission.kind {
            BlockKind::Travel => self.travel_blocks += 1,
            BlockKind::Extrude => self.extrude_blocks += 1,
            BlockKind::Other => {}
        }
        if emission.report.degenerate {
            self.degenerate_blocks += 1;
        }
        if emission.report.split_index.is_some() {
            self.splits += 1;
        }
        self.leak_volume_removed += emission.report.removed_volume;
    }
}

/// Drives parse, segmentation, compensation and emission over a stream
pub struct PostProcessor {
    segmenter: Segmenter,
    precision: usize,
}

impl PostProcessor {
    pub fn new(segmenter: Segmenter) -> Self {
        Self {
            segmenter,
            precision: DEFAULT_PRECISION,
        }
    }

    /// Set the number of decimal places written for every field
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Process a whole program
    ///
    /// Lines are decoded lossily, so non-UTF-8 bytes (typically in slicer
    /// comments) never stop a run. Stops at the first malformed field;
    /// whatever was already written stays in `writer`.
    pub fn process<R: BufRead, W: Write>(
        mut self,
        mut reader: R,
        writer: W,
    ) -> Result<RunSummary> {
        let mut parser = GcodeParser::new();
        let mut writer = GcodeWriter::with_precision(writer, self.precision);
        let mut summary = RunSummary::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            summary.lines_read += 1;
            let line = String::from_utf8_lossy(&buf);

            let Some(command) = parser.parse(&line)? else {
                tracing::debug!(line_number = parser.line_number(), "Dropped non-command line");
                summary.lines_dropped += 1;
                continue;
            };

            for emission in self.segmenter.push(command) {
                summary.record(&emission);
                writer.write_block(&emission.commands)?;
            }
        }

        if let Some(emission) = self.segmenter.finish() {
            summary.record(&emission);
            writer.write_block(&emission.commands)?;
        }

        summary.commands_written = writer.commands_written();
        writer.flush()?;
        Ok(summary)
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new(Segmenter::default())
    }
}

/// Process a program held in memory
pub fn process_str(segmenter: Segmenter, program: &str) -> Result<(String, RunSummary)> {
    let mut output = Vec::new();
    let summary = PostProcessor::new(segmenter).process(program.as_bytes(), &mut output)?;
    let output = String::from_utf8(output)
        .map_err(|e| leakcomp_core::Error::other(format!("Output is not UTF-8: {}", e)))?;
    Ok((output, summary))
}
