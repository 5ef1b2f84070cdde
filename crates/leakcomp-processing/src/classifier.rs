//! Move classification
//!
//! Only planar linear moves are segmented. Anything that touches `Z`, lacks
//! both `X` and `Y`, or uses another tag is [`MoveClass::Other`] and is passed
//! through untouched.

use leakcomp_core::{Command, LINEAR_MOVE};
use serde::{Deserialize, Serialize};

/// Classification of a single command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoveClass {
    /// Planar linear move without extrusion
    Travel,
    /// Planar linear move with extrusion; carries the command's `E` value
    Extrude { e: f64 },
    /// Everything else
    Other,
}

/// Classify a command by its tag and field presence
pub fn classify(command: &Command) -> MoveClass {
    if !command.is_tag(LINEAR_MOVE) || !command.has_planar() || command.z.is_some() {
        return MoveClass::Other;
    }
    match command.e {
        Some(e) => MoveClass::Extrude { e },
        None => MoveClass::Travel,
    }
}
