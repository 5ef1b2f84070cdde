//! G-Code command model
//!
//! A command is a tag (`G1`, `M204`, ...) plus a small fixed set of optional
//! numeric fields. Field codes the post-processor does not interpret are kept
//! verbatim in [`Command::extra`] so they survive a round trip.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear move tag
pub const LINEAR_MOVE: &str = "G1";

/// Set acceleration tag (`S` carries the new maximum)
pub const SET_ACCELERATION: &str = "M204";

/// Tags whose `X`/`Y` fields move (or redefine) the planar position
const POSITION_TAGS: [&str; 5] = ["G0", "G1", "G2", "G3", "G92"];

/// Recognized field codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// X position
    X,
    /// Y position
    Y,
    /// Z position
    Z,
    /// Extrude amount
    E,
    /// Feedrate
    F,
    /// Generic setting value
    S,
    /// Tool select
    T,
}

impl Field {
    /// All recognized fields, in output order
    pub const ALL: [Field; 7] = [
        Field::X,
        Field::Y,
        Field::Z,
        Field::E,
        Field::F,
        Field::S,
        Field::T,
    ];

    /// Look up a field by its letter (case-insensitive)
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            'E' => Some(Self::E),
            'F' => Some(Self::F),
            'S' => Some(Self::S),
            'T' => Some(Self::T),
            _ => None,
        }
    }

    /// Letter used on the wire
    pub fn letter(self) -> char {
        match self {
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
            Self::E => 'E',
            Self::F => 'F',
            Self::S => 'S',
            Self::T => 'T',
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Point in the XY plane
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Machine origin
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point at `fraction` of the way from `self` to `other`
    pub fn lerp(&self, other: Point, fraction: f64) -> Point {
        Point {
            x: self.x + fraction * (other.x - self.x),
            y: self.y + fraction * (other.y - self.y),
        }
    }
}

/// One parsed program instruction
///
/// Each recognized field appears at most once; setting a field again replaces
/// its value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Command {
    /// Command tag, e.g. `G1`. An empty tag is written as [`LINEAR_MOVE`].
    pub tag: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub e: Option<f64>,
    pub f: Option<f64>,
    pub s: Option<f64>,
    pub t: Option<f64>,
    /// Unrecognized fields in input order (letters are upper case)
    pub extra: Vec<(char, f64)>,
}

impl Command {
    /// Create an empty command with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Create an empty linear move
    pub fn linear_move() -> Self {
        Self::new(LINEAR_MOVE)
    }

    /// Builder-style field setter
    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.set(field, value);
        self
    }

    /// Read a recognized field
    pub fn get(&self, field: Field) -> Option<f64> {
        *self.slot(field)
    }

    /// Set a recognized field, replacing any previous value
    pub fn set(&mut self, field: Field, value: f64) {
        *self.slot_mut(field) = Some(value);
    }

    /// Set an unrecognized field, replacing any previous value for the letter
    pub fn set_extra(&mut self, letter: char, value: f64) {
        let letter = letter.to_ascii_uppercase();
        match self.extra.iter_mut().find(|(l, _)| *l == letter) {
            Some(slot) => slot.1 = value,
            None => self.extra.push((letter, value)),
        }
    }

    /// Tag as written on output
    pub fn output_tag(&self) -> &str {
        if self.tag.is_empty() {
            LINEAR_MOVE
        } else {
            &self.tag
        }
    }

    pub fn is_tag(&self, tag: &str) -> bool {
        self.output_tag() == tag
    }

    /// Whether `X` or `Y` is present
    pub fn has_planar(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    /// Whether this command moves or redefines the planar position
    pub fn updates_position(&self) -> bool {
        self.has_planar() && POSITION_TAGS.contains(&self.output_tag())
    }

    /// Planar target, filling absent axes from `fallback`
    pub fn point_or(&self, fallback: Point) -> Point {
        Point {
            x: self.x.unwrap_or(fallback.x),
            y: self.y.unwrap_or(fallback.y),
        }
    }

    /// Set both planar axes
    pub fn set_point(&mut self, point: Point) {
        self.x = Some(point.x);
        self.y = Some(point.y);
    }

    /// Present recognized fields, in output order
    pub fn fields(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }

    fn slot(&self, field: Field) -> &Option<f64> {
        match field {
            Field::X => &self.x,
            Field::Y => &self.y,
            Field::Z => &self.z,
            Field::E => &self.e,
            Field::F => &self.f,
            Field::S => &self.s,
            Field::T => &self.t,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<f64> {
        match field {
            Field::X => &mut self.x,
            Field::Y => &mut self.y,
            Field::Z => &mut self.z,
            Field::E => &mut self.e,
            Field::F => &mut self.f,
            Field::S => &mut self.s,
            Field::T => &mut self.t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_letters() {
        for field in Field::ALL {
            assert_eq!(Field::from_letter(field.letter()), Some(field));
        }
        assert_eq!(Field::from_letter('e'), Some(Field::E));
        assert_eq!(Field::from_letter('I'), None);
    }

    #[test]
    fn test_set_replaces() {
        let mut cmd = Command::linear_move().with(Field::X, 1.0);
        cmd.set(Field::X, 2.0);
        assert_eq!(cmd.get(Field::X), Some(2.0));
        assert_eq!(cmd.get(Field::Y), None);
    }

    #[test]
    fn test_set_extra_replaces() {
        let mut cmd = Command::new("G2");
        cmd.set_extra('i', 1.0);
        cmd.set_extra('J', 2.0);
        cmd.set_extra('I', 3.0);
        assert_eq!(cmd.extra, vec![('I', 3.0), ('J', 2.0)]);
    }

    #[test]
    fn test_output_tag_defaults_to_linear_move() {
        let cmd = Command::default();
        assert_eq!(cmd.output_tag(), "G1");
        assert!(cmd.is_tag(LINEAR_MOVE));
    }

    #[test]
    fn test_updates_position() {
        assert!(Command::linear_move().with(Field::Y, 1.0).updates_position());
        assert!(Command::new("G92").with(Field::X, 0.0).updates_position());
        assert!(!Command::linear_move().with(Field::Z, 1.0).updates_position());
        assert!(!Command::new("M204").with(Field::S, 500.0).updates_position());
    }

    #[test]
    fn test_point_or_fills_missing_axes() {
        let cmd = Command::linear_move().with(Field::X, 4.0);
        assert_eq!(cmd.point_or(Point::new(1.0, 2.0)), Point::new(4.0, 2.0));
    }

    #[test]
    fn test_point_math() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(a.lerp(b, 0.5), Point::new(1.5, 2.0));
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_fields_in_output_order() {
        let cmd = Command::linear_move()
            .with(Field::F, 1200.0)
            .with(Field::E, 1.0)
            .with(Field::X, 5.0);
        let fields: Vec<_> = cmd.fields().collect();
        assert_eq!(
            fields,
            vec![(Field::X, 5.0), (Field::E, 1.0), (Field::F, 1200.0)]
        );
    }
}
