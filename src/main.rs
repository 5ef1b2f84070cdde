use std::path::PathBuf;

use anyhow::Context;
use leakcomp::{init_logging, run, Config, BUILD_DATE, VERSION};

const USAGE: &str = "Usage: leakcomp <path/to/file.gcode>";

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let Some(input) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("Error: Include path to gcode file.");
        eprintln!("{}", USAGE);
        return Ok(());
    };

    tracing::debug!(version = VERSION, build_date = BUILD_DATE, "leakcomp");

    let config = Config::discover().context("Failed to load configuration")?;
    run(&input, &config)?;

    Ok(())
}
