//! # LeakComp
//!
//! Offline G-code post-processor that compensates extruder leakage.
//!
//! A pressurised nozzle keeps oozing for a short while after the extruder
//! stops pushing. LeakComp groups the moves of a sliced program into blocks
//! of continuous extrusion, estimates how much material leaks at the end of
//! each block from its velocity profile, and removes that amount from the
//! block's trailing moves.
//!
//! ## Architecture
//!
//! LeakComp is organized as a workspace with multiple crates:
//!
//! 1. **leakcomp-core** - Command model, line parser, writer, error types
//! 2. **leakcomp-processing** - Classifier, segmenter, compensators, streaming driver
//! 3. **leakcomp-settings** - Configuration loading and validation
//! 4. **leakcomp** - Binary and file-level entry points

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::Context;

pub use leakcomp_core::{Command, Error, GcodeError, Result};
pub use leakcomp_processing::{PostProcessor, RunSummary, Segmenter};
pub use leakcomp_settings::{Config, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr
/// - RUST_LOG environment variable support (INFO when unset)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Output path for `input`: the first `.` of the file name becomes
/// `{suffix}.`
///
/// `part.gcode` with suffix `_parsed` gives `part_parsed.gcode`. A file name
/// without a dot gets the suffix appended.
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let Some(name) = input.file_name() else {
        let mut path = input.as_os_str().to_owned();
        path.push(suffix);
        return PathBuf::from(path);
    };

    let name = name.to_string_lossy();
    let renamed = match name.split_once('.') {
        Some((stem, rest)) => format!("{}{}.{}", stem, suffix, rest),
        None => format!("{}{}", name, suffix),
    };

    input.with_file_name(OsString::from(renamed))
}

/// Post-process `input` into its derived output file
///
/// The input is opened before the output is created, so a missing input
/// never leaves an empty output file behind.
pub fn run(input: &Path, config: &Config) -> anyhow::Result<RunSummary> {
    config.validate().context("Invalid configuration")?;

    let reader = File::open(input)
        .with_context(|| format!("Failed to open input file {}", input.display()))?;

    let output = derive_output_path(input, &config.output.suffix);
    let writer = File::create(&output)
        .with_context(|| format!("Failed to create output file {}", output.display()))?;

    let coefficient = config.compensation.effective_coefficient();
    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        coefficient,
        "Starting leak compensation"
    );

    let summary = PostProcessor::new(Segmenter::with_leak_coefficient(coefficient))
        .with_precision(config.output.precision)
        .process(BufReader::new(reader), BufWriter::new(writer))
        .with_context(|| format!("Failed to process {}", input.display()))?;

    let summary_json = serde_json::to_string(&summary).unwrap_or_default();
    tracing::info!(summary = %summary_json, "Finished {}", output.display());

    Ok(summary)
}
