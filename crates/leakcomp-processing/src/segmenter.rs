//! Motion block segmenter
//!
//! Consumes commands in program order and groups consecutive planar moves of
//! the same class into blocks. A block closes when a command of another class
//! arrives (or the stream ends); closed blocks go through their compensator
//! and come back out as an [`Emission`]. Every other command is emitted on its
//! own, right after any block it interrupted.
//!
//! Machine state (feedrate, maximum acceleration, last planar position) lives
//! here for the whole run.

use leakcomp_core::{Command, Point, SET_ACCELERATION};
use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockKind, ExtrudeBlock, ExtrudeMove, TravelBlock, TravelMove};
use crate::classifier::{classify, MoveClass};
use crate::compensator::{
    BlockCompensator, BlockOutput, CompensationReport, MotionLimits, TravelCompensator,
};
use crate::leak::LeakCompensator;

/// Persistent machine state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MachineState {
    /// Last `F` seen on any command
    pub feedrate: f64,
    /// Last `S` seen on an `M204` command
    pub max_acceleration: f64,
    /// Last planar position reached
    pub position: Point,
}

impl MachineState {
    pub fn limits(&self) -> MotionLimits {
        MotionLimits {
            feedrate: self.feedrate,
            max_acceleration: self.max_acceleration,
        }
    }
}

/// Segmenter state: which block, if any, is being accumulated
#[derive(Debug, Default)]
enum OpenBlock {
    #[default]
    Idle,
    Travel(TravelBlock),
    Extrude(ExtrudeBlock),
}

/// Commands ready to be written, in order
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub kind: BlockKind,
    /// Planar length of the block (zero for pass-through commands)
    pub distance: f64,
    pub commands: Vec<Command>,
    pub report: CompensationReport,
}

impl Emission {
    fn block(kind: BlockKind, distance: f64, output: BlockOutput) -> Self {
        Self {
            kind,
            distance,
            commands: output.commands,
            report: output.report,
        }
    }

    fn passthrough(command: Command) -> Self {
        Self {
            kind: BlockKind::Other,
            distance: 0.0,
            commands: vec![command],
            report: CompensationReport::default(),
        }
    }
}

/// Block segmentation state machine
pub struct Segmenter {
    state: MachineState,
    open: OpenBlock,
    extrude: Box<dyn BlockCompensator<ExtrudeMove>>,
    travel: Box<dyn BlockCompensator<TravelMove>>,
}

impl Segmenter {
    /// Create a segmenter with explicit compensators
    pub fn new(
        extrude: Box<dyn BlockCompensator<ExtrudeMove>>,
        travel: Box<dyn BlockCompensator<TravelMove>>,
    ) -> Self {
        tracing::debug!(
            extrude = extrude.name(),
            travel = travel.name(),
            "Segmenter using {}; {}",
            extrude.description(),
            travel.description()
        );
        Self {
            state: MachineState::default(),
            open: OpenBlock::Idle,
            extrude,
            travel,
        }
    }

    /// Create a segmenter using [`LeakCompensator`] with coefficient `C`
    pub fn with_leak_coefficient(coefficient: f64) -> Self {
        Self::new(
            Box::new(LeakCompensator::new(coefficient)),
            Box::new(TravelCompensator::new()),
        )
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    /// Whether a block is being accumulated
    pub fn has_open_block(&self) -> bool {
        !matches!(self.open, OpenBlock::Idle)
    }

    /// Feed the next command
    ///
    /// Returns what became ready to write: at most the block this command
    /// closed, followed by the command itself when it is not buffered.
    pub fn push(&mut self, command: Command) -> Vec<Emission> {
        let mut emitted = Vec::new();

        if let Some(feedrate) = command.f {
            self.state.feedrate = feedrate;
        }

        let class = classify(&command);
        let continues_block = matches!(
            (&self.open, class),
            (OpenBlock::Idle, _)
                | (OpenBlock::Travel(_), MoveClass::Travel)
                | (OpenBlock::Extrude(_), MoveClass::Extrude { .. })
        );
        if !continues_block {
            emitted.extend(self.close());
        }

        let origin = self.state.position;
        let end = command.point_or(origin);
        let updates_position = command.updates_position();

        match class {
            MoveClass::Extrude { e } => {
                let mut command = command;
                if self.state.feedrate > 0.0 {
                    command.f = Some(self.state.feedrate);
                }
                let mv = ExtrudeMove { command, end, e };
                match &mut self.open {
                    OpenBlock::Extrude(block) => block.push(mv),
                    open => *open = OpenBlock::Extrude(Block::starting_with(origin, mv)),
                }
            }
            MoveClass::Travel => {
                let mv = TravelMove { command, end };
                match &mut self.open {
                    OpenBlock::Travel(block) => block.push(mv),
                    open => *open = OpenBlock::Travel(Block::starting_with(origin, mv)),
                }
            }
            MoveClass::Other => {
                if command.is_tag(SET_ACCELERATION) {
                    if let Some(acceleration) = command.s {
                        self.state.max_acceleration = acceleration;
                    }
                }
                emitted.push(Emission::passthrough(command));
            }
        }

        if updates_position {
            self.state.position = end;
        }
        emitted
    }

    /// Close the open block, if any
    ///
    /// Called at end of stream; the segmenter is idle afterwards.
    pub fn finish(&mut self) -> Option<Emission> {
        self.close()
    }

    fn close(&mut self) -> Option<Emission> {
        let limits = self.state.limits();
        let (emission, compensator) = match std::mem::take(&mut self.open) {
            OpenBlock::Idle => return None,
            OpenBlock::Travel(block) => {
                let distance = block.distance();
                let output = self.travel.compensate(block, &limits);
                (
                    Emission::block(BlockKind::Travel, distance, output),
                    self.travel.name(),
                )
            }
            OpenBlock::Extrude(block) => {
                let distance = block.distance();
                let output = self.extrude.compensate(block, &limits);
                (
                    Emission::block(BlockKind::Extrude, distance, output),
                    self.extrude.name(),
                )
            }
        };
        tracing::debug!(
            kind = %emission.kind,
            compensator,
            commands = emission.commands.len(),
            distance = emission.distance,
            "Closed block"
        );
        Some(emission)
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(
            Box::<LeakCompensator>::default(),
            Box::new(TravelCompensator::new()),
        )
    }
}
