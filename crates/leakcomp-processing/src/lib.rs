//! # LeakComp Processing
//!
//! Segmentation and compensation of G-code motion.
//!
//! ## Pipeline
//!
//! 1. **Classifier** - tags each command as travel, extrude or other
//! 2. **Segmenter** - groups consecutive same-class moves into blocks and
//!    tracks feedrate, acceleration and position
//! 3. **Compensators** - rewrite closed blocks (leak removal for extrude
//!    blocks, pass-through for travel blocks)
//! 4. **PostProcessor** - drives the above over a line stream

pub mod block;
pub mod classifier;
pub mod compensator;
pub mod leak;
pub mod postprocessor;
pub mod segmenter;

pub use block::{
    Block, BlockKind, ExtrudeBlock, ExtrudeMove, PlanarMove, TravelBlock, TravelMove,
};
pub use classifier::{classify, MoveClass};
pub use compensator::{
    BlockCompensator, BlockOutput, CompensationReport, MotionLimits, TravelCompensator,
};
pub use leak::{LeakCompensator, VelocityProfile};
pub use leakcomp_core::DEFAULT_LEAK_COEFFICIENT;
pub use postprocessor::{process_str, PostProcessor, RunSummary};
pub use segmenter::{Emission, MachineState, Segmenter};
