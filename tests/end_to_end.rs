//! File-level runs of the post-processor.
//! Covers output path derivation, the written file and failure handling.

use leakcomp::{derive_output_path, run, Config};
use tempfile::TempDir;

const PROGRAM: &str = "\
; generated by a slicer
M204 S500
G1 X10.000 Y0.000 E5.000 F1200.000
G1 X20.000 Y0.000
";

#[test]
fn test_run_writes_compensated_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("part.gcode");
    std::fs::write(&input, PROGRAM).unwrap();

    let summary = run(&input, &Config::default()).unwrap();

    let output = dir.path().join("part_parsed.gcode");
    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        text,
        "M204 S500.000\nG1 X10.000 Y0.000 E4.965 F1200.000\nG1 X20.000 Y0.000\n"
    );
    assert_eq!(summary.lines_read, 4);
    assert_eq!(summary.lines_dropped, 1);
    assert_eq!(summary.extrude_blocks, 1);
    assert_eq!(summary.travel_blocks, 1);
}

#[test]
fn test_disabled_compensation_keeps_extrusion() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("part.gcode");
    std::fs::write(&input, PROGRAM).unwrap();

    let mut config = Config::default();
    config.compensation.enabled = false;
    config.output.suffix = "_raw".to_string();
    run(&input, &config).unwrap();

    let text = std::fs::read_to_string(dir.path().join("part_raw.gcode")).unwrap();
    assert!(text.contains("G1 X10.000 Y0.000 E5.000 F1200.000"));
}

#[test]
fn test_precision_from_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("part.gcode");
    std::fs::write(&input, "G28 X1.5\n").unwrap();

    let mut config = Config::default();
    config.output.precision = 1;
    run(&input, &config).unwrap();

    let text = std::fs::read_to_string(derive_output_path(&input, "_parsed")).unwrap();
    assert_eq!(text, "G28 X1.5\n");
}

#[test]
fn test_missing_input_creates_no_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.gcode");

    let err = run(&input, &Config::default()).unwrap_err();
    assert!(err.to_string().contains("Failed to open input file"));
    assert!(!dir.path().join("missing_parsed.gcode").exists());
}

#[test]
fn test_malformed_line_fails_the_run() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.gcode");
    std::fs::write(&input, "G28\nG1 X1..2 Y0\n").unwrap();

    let err = run(&input, &Config::default()).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("line 2"), "{}", chain);
}

#[test]
fn test_latin1_comment_does_not_stop_the_run() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("part.gcode");
    std::fs::write(&input, b"M204 S500\n; temp\xE9rature 210\nG1 X10 Y0 E5 F1200\n").unwrap();

    let summary = run(&input, &Config::default()).unwrap();

    let text = std::fs::read_to_string(dir.path().join("part_parsed.gcode")).unwrap();
    assert_eq!(text, "M204 S500.000\nG1 X10.000 Y0.000 E4.965 F1200.000\n");
    assert_eq!(summary.lines_dropped, 1);
}
