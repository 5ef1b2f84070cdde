//! Block compensator framework
//!
//! A compensator receives a finished block together with the motion limits in
//! effect and returns the commands to emit in its place. Compensators are pure:
//! they never touch the segmenter's machine state.

use leakcomp_core::Command;
use serde::{Deserialize, Serialize};

use crate::block::{Block, TravelMove};

/// Motion parameters in effect when a block closes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionLimits {
    /// Current feedrate
    pub feedrate: f64,
    /// Current maximum acceleration (from `M204 S`)
    pub max_acceleration: f64,
}

/// What a compensator did to a block
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CompensationReport {
    /// Leak volume estimated for the block
    pub leak_volume: f64,
    /// Extrusion actually removed
    pub removed_volume: f64,
    /// Output index of the shortened command when a move was split
    pub split_index: Option<usize>,
    /// Block could not be modelled (zero distance or acceleration)
    pub degenerate: bool,
}

/// Rewritten block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockOutput {
    pub commands: Vec<Command>,
    pub report: CompensationReport,
}

impl BlockOutput {
    /// Output that carries the commands through untouched
    pub fn unchanged(commands: Vec<Command>) -> Self {
        Self {
            commands,
            report: CompensationReport::default(),
        }
    }
}

/// Trait for block compensators
///
/// Implementations may only shorten or extend the command list at the tail of
/// a move; existing geometry must end where it ended before.
pub trait BlockCompensator<M>: Send + Sync {
    /// Get the name/identifier of this compensator
    fn name(&self) -> &str;

    /// Get a description of what this compensator does
    fn description(&self) -> &str;

    /// Rewrite a finished block
    fn compensate(&self, block: Block<M>, limits: &MotionLimits) -> BlockOutput;
}

/// Travel block compensator
///
/// Returns travel blocks unchanged. This is where purge-on-travel logic would
/// append commands; it must keep existing commands' geometry intact.
#[derive(Debug, Clone, Default)]
pub struct TravelCompensator;

impl TravelCompensator {
    pub fn new() -> Self {
        Self
    }
}

impl BlockCompensator<TravelMove> for TravelCompensator {
    fn name(&self) -> &str {
        "travel"
    }

    fn description(&self) -> &str {
        "Passes travel blocks through unchanged"
    }

    fn compensate(&self, block: Block<TravelMove>, _limits: &MotionLimits) -> BlockOutput {
        BlockOutput::unchanged(block.into_commands())
    }
}
