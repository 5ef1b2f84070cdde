//! End-to-end scenarios for the segmenter and leak compensator.
//! Each test feeds a small program through the post-processor and checks the
//! exact rewritten text.

use leakcomp_processing::{process_str, BlockKind, Segmenter};
use leakcomp_core::{parse_line, Command};

fn run(program: &str) -> Vec<String> {
    let (out, _) = process_str(Segmenter::default(), program).unwrap();
    out.lines().map(str::to_string).collect()
}

fn parse(line: &str) -> Command {
    parse_line(line, 1).unwrap().unwrap()
}

#[test]
fn test_single_extrude_move_loses_leak_volume() {
    // D = 10, F = 1200, A = 500: feedrate not reached, peak = sqrt(5000),
    // mean = peak / 2, leak = 0.001 * mean ~= 0.035355
    let out = run("M204 S500\nG1 X10.000 Y0.000 E5.000 F1200.000\n");
    assert_eq!(
        out,
        vec!["M204 S500.000", "G1 X10.000 Y0.000 E4.965 F1200.000"]
    );
}

#[test]
fn test_single_extrude_move_smaller_than_leak_drops_e() {
    let out = run("M204 S500\nG1 X10.000 Y0.000 E0.020 F1200.000\n");
    assert_eq!(out, vec!["M204 S500.000", "G1 X10.000 Y0.000 F1200.000"]);
}

#[test]
fn test_extrude_block_closed_by_travel() {
    // D = 30, A = 1000: peak = sqrt(30000), leak ~= 0.0866 taken off the last move
    let out = run(concat!(
        "M204 S1000\n",
        "G1 X10 Y0 E1 F600\n",
        "G1 X20 Y0 E2\n",
        "G1 X30 Y0 E3\n",
        "G1 X40 Y0\n",
    ));
    assert_eq!(
        out,
        vec![
            "M204 S1000.000",
            "G1 X10.000 Y0.000 E1.000 F600.000",
            "G1 X20.000 Y0.000 E2.000 F600.000",
            "G1 X29.134 Y0.000 E2.913 F600.000",
            "G1 X30.000 Y0.000",
            "G1 X40.000 Y0.000",
        ]
    );
}

#[test]
fn test_travel_after_extrude_starts_at_extrude_end() {
    let mut seg = Segmenter::default();
    seg.push(parse("M204 S1000"));
    seg.push(parse("G1 X10 Y0 E1 F600"));
    seg.push(parse("G1 X20 Y0 E2"));
    let closed = seg.push(parse("G1 X20 Y7"));
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].kind, BlockKind::Extrude);
    assert_eq!(closed[0].distance, 20.0);

    let travel = seg.finish().unwrap();
    assert_eq!(travel.kind, BlockKind::Travel);
    assert_eq!(travel.distance, 7.0);
}

#[test]
fn test_comment_line_does_not_disturb_open_block() {
    let with_comment = run(concat!(
        "M204 S1000\n",
        "G1 X10 Y0 E1 F600\n",
        "; layer change\n",
        "G1 X20 Y0 E2\n",
    ));
    let without_comment = run(concat!(
        "M204 S1000\n",
        "G1 X10 Y0 E1 F600\n",
        "G1 X20 Y0 E2\n",
    ));
    assert_eq!(with_comment, without_comment);
    assert_eq!(with_comment.len(), 4);
}

#[test]
fn test_m204_mid_block_closes_with_old_acceleration() {
    // The block closes under A = 1000 before the new value takes effect.
    let out = run(concat!(
        "M204 S1000\n",
        "G1 X10 Y0 E1 F600\n",
        "G1 X20 Y0 E2\n",
        "M204 S800\n",
        "G1 X30 Y0 E3\n",
    ));
    // D = 20, A = 1000: leak = 0.001 * sqrt(20000) / 2 ~= 0.070711
    assert_eq!(
        out[..5],
        [
            "M204 S1000.000",
            "G1 X10.000 Y0.000 E1.000 F600.000",
            "G1 X19.293 Y0.000 E1.929 F600.000",
            "G1 X20.000 Y0.000",
            "M204 S800.000",
        ]
    );
    // Second block: D = 10, A = 800: leak = 0.001 * sqrt(8000) / 2 ~= 0.044721
    assert_eq!(out[5], "G1 X30.000 Y0.000 E2.955 F600.000");
}

#[test]
fn test_z_move_is_passed_through_and_closes_block() {
    let out = run(concat!(
        "M204 S1000\n",
        "G1 X10 Y0 E1 F600\n",
        "G1 Z5.000\n",
        "G1 X20 Y0 E1\n",
    ));
    assert_eq!(out[1], "G1 X10.000 Y0.000 E0.950 F600.000");
    assert_eq!(out[2], "G1 Z5.000");
    assert_eq!(out.len(), 4);
}

#[test]
fn test_without_acceleration_blocks_are_left_alone() {
    let out = run("G1 X10 Y0 E1 F600\nG1 X20 Y0 E2\n");
    assert_eq!(
        out,
        vec![
            "G1 X10.000 Y0.000 E1.000 F600.000",
            "G1 X20.000 Y0.000 E2.000 F600.000",
        ]
    );
}

#[test]
fn test_summary_counts() {
    let (_, summary) = process_str(
        Segmenter::default(),
        concat!(
            "; start\n",
            "M204 S1000\n",
            "G1 X10 Y0 F3000\n",
            "G1 X20 Y0 E1 F600\n",
            "G1 X30 Y0 E2\n",
            "G1 Z0.4\n",
            "G1 X0 Y0 E1\n",
        ),
    )
    .unwrap();

    assert_eq!(summary.lines_read, 7);
    assert_eq!(summary.lines_dropped, 1);
    assert_eq!(summary.travel_blocks, 1);
    assert_eq!(summary.extrude_blocks, 2);
    assert_eq!(summary.degenerate_blocks, 0);
    assert_eq!(summary.splits, 1);
    assert_eq!(summary.commands_written, 7);
    assert!(summary.leak_volume_removed > 0.0);
}
