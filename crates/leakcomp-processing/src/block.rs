//! Motion blocks
//!
//! A block is a maximal run of same-class planar moves. It remembers where it
//! started so the first move's length, and any split of it, can be computed.

use leakcomp_core::{Command, Point};
use serde::{Deserialize, Serialize};

/// Kind of emitted output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Travel,
    Extrude,
    /// A standalone pass-through command
    Other,
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Travel => write!(f, "travel"),
            Self::Extrude => write!(f, "extrude"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A buffered move with its resolved planar end point
pub trait PlanarMove {
    fn end(&self) -> Point;
    fn into_command(self) -> Command;
}

/// Buffered travel move
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMove {
    pub command: Command,
    pub end: Point,
}

impl PlanarMove for TravelMove {
    fn end(&self) -> Point {
        self.end
    }

    fn into_command(self) -> Command {
        self.command
    }
}

/// Buffered extrude move
///
/// `e` mirrors the command's `E` field and is the value the compensator
/// works with.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudeMove {
    pub command: Command,
    pub end: Point,
    pub e: f64,
}

impl PlanarMove for ExtrudeMove {
    fn end(&self) -> Point {
        self.end
    }

    fn into_command(self) -> Command {
        self.command
    }
}

/// Ordered run of moves plus its accumulated planar length
#[derive(Debug, Clone, PartialEq)]
pub struct Block<M> {
    origin: Point,
    moves: Vec<M>,
    distance: f64,
}

pub type TravelBlock = Block<TravelMove>;
pub type ExtrudeBlock = Block<ExtrudeMove>;

impl<M: PlanarMove> Block<M> {
    /// Empty block starting at `origin`
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            moves: Vec::new(),
            distance: 0.0,
        }
    }

    /// Block starting at `origin` holding one move
    pub fn starting_with(origin: Point, first: M) -> Self {
        let mut block = Self::new(origin);
        block.push(first);
        block
    }

    /// Append a move, adding its length to the running distance
    pub fn push(&mut self, mv: M) {
        self.distance += self.last_point().distance_to(mv.end());
        self.moves.push(mv);
    }

    /// End point of the last move, or the origin when empty
    pub fn last_point(&self) -> Point {
        self.moves.last().map_or(self.origin, PlanarMove::end)
    }

    /// Start point of the move at `index`
    pub fn start_of(&self, index: usize) -> Point {
        match index {
            0 => self.origin,
            i => self.moves[i - 1].end(),
        }
    }

    /// Cumulative planar distance
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn moves(&self) -> &[M] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn into_moves(self) -> Vec<M> {
        self.moves
    }

    /// Unwrap into plain commands, in order
    pub fn into_commands(self) -> Vec<Command> {
        self.moves.into_iter().map(PlanarMove::into_command).collect()
    }
}

impl ExtrudeBlock {
    /// Total extruded amount (the last move's `E`)
    pub fn total_extrusion(&self) -> f64 {
        self.moves.last().map_or(0.0, |mv| mv.e)
    }

    /// Per-move extrude deltas
    pub fn extrusion_deltas(&self) -> Vec<f64> {
        let mut previous = 0.0;
        self.moves
            .iter()
            .map(|mv| {
                let delta = mv.e - previous;
                previous = mv.e;
                delta
            })
            .collect()
    }
}
