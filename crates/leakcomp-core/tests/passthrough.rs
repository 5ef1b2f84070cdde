//! Pass-through tests for the tokenizer and emitter.
//! A command that is parsed and written back must keep its tag and every field;
//! only the numeric formatting changes.

use leakcomp_core::{format_command, parse_line, Field};
use proptest::prelude::*;

#[test]
fn test_other_command_keeps_fields() {
    let cmd = parse_line("M104 S210 T1", 1).unwrap().unwrap();
    assert_eq!(format_command(&cmd, 3), "M104 S210.000 T1.000");

    let cmd = parse_line("G2 X10 Y5 I-5 J0 E1.2", 1).unwrap().unwrap();
    assert_eq!(
        format_command(&cmd, 3),
        "G2 X10.000 Y5.000 E1.200 I-5.000 J0.000"
    );
}

#[test]
fn test_z_move_passes_through() {
    let cmd = parse_line("G1 Z5.000", 1).unwrap().unwrap();
    assert_eq!(cmd.get(Field::Z), Some(5.0));
    assert_eq!(format_command(&cmd, 3), "G1 Z5.000");
}

fn field_value() -> impl Strategy<Value = f64> {
    // Values already on the 3-decimal grid so reformatting is lossless.
    (-100_000i64..100_000).prop_map(|v| v as f64 / 1000.0)
}

proptest! {
    #[test]
    fn prop_reformatted_command_parses_to_same_fields(
        tag in prop::sample::select(vec!["G0", "G1", "G2", "G28", "M104", "M204", "M106"]),
        x in prop::option::of(field_value()),
        z in prop::option::of(field_value()),
        e in prop::option::of(field_value()),
        s in prop::option::of(field_value()),
        p in prop::option::of(field_value()),
    ) {
        let mut line = tag.to_string();
        for (letter, value) in [('X', x), ('Z', z), ('E', e), ('S', s), ('P', p)] {
            if let Some(value) = value {
                line.push_str(&format!(" {}{}", letter, value));
            }
        }

        let first = parse_line(&line, 1).unwrap().unwrap();
        let written = format_command(&first, 3);
        let second = parse_line(&written, 2).unwrap().unwrap();

        prop_assert_eq!(&first.tag, &second.tag);
        for field in Field::ALL {
            match (first.get(field), second.get(field)) {
                (Some(a), Some(b)) => prop_assert!((a - b).abs() < 1e-9),
                (None, None) => {}
                other => prop_assert!(false, "field {} differs: {:?}", field, other),
            }
        }
        prop_assert_eq!(first.extra.len(), second.extra.len());
    }
}
