//! Leak compensation for extrude blocks
//!
//! The extruder keeps pushing material while the head decelerates at the end
//! of a continuous extrusion. The leaked volume is estimated from a symmetric
//! trapezoidal velocity profile over the whole block (starting and ending at
//! rest) and then removed from the tail of the block:
//!
//! 1. The block reaches the programmed feedrate `F` when `F / A < sqrt(D / A)`,
//!    i.e. when the ramp-up plus ramp-down distance `F² / A` is shorter than
//!    the block length `D`. The ramps then cover `(F² / A) / D` of the block.
//! 2. Otherwise the ramps cover the whole block and the peak speed is
//!    `sqrt(D · A)`.
//! 3. Ramps average half the peak speed, so the mean speed is
//!    `peak / 2 · ramp + peak · (1 - ramp)`.
//! 4. The leak volume is `C · mean speed`.
//!
//! Removal walks the block backwards: whole moves whose extrude delta fits in
//! the remaining budget lose their `E` field, and the first move that does not
//! fit is split into a shortened extruding move plus a dry move to the
//! original end point.

use leakcomp_core::{Command, Point, DEFAULT_LEAK_COEFFICIENT};
use serde::{Deserialize, Serialize};

use crate::block::{ExtrudeBlock, ExtrudeMove};
use crate::compensator::{BlockCompensator, BlockOutput, CompensationReport, MotionLimits};

/// Symmetric trapezoidal velocity profile of one block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityProfile {
    /// Highest speed reached
    pub peak_speed: f64,
    /// Fraction of the block spent accelerating or decelerating
    pub ramp_fraction: f64,
    /// Whether the programmed feedrate is reached
    pub reaches_feedrate: bool,
}

impl VelocityProfile {
    /// Model a block of length `distance`
    ///
    /// Returns `None` when the block has no length or the acceleration is not
    /// positive, since neither yields a meaningful profile.
    pub fn trapezoidal(distance: f64, feedrate: f64, acceleration: f64) -> Option<Self> {
        if !(distance > 0.0 && acceleration > 0.0) || !distance.is_finite() || !feedrate.is_finite()
        {
            return None;
        }

        let profile = if feedrate / acceleration < (distance / acceleration).sqrt() {
            Self {
                peak_speed: feedrate,
                ramp_fraction: (feedrate * feedrate / acceleration) / distance,
                reaches_feedrate: true,
            }
        } else {
            Self {
                peak_speed: (distance * acceleration).sqrt(),
                ramp_fraction: 1.0,
                reaches_feedrate: false,
            }
        };
        profile.average_speed().is_finite().then_some(profile)
    }

    /// Mean speed over the block
    pub fn average_speed(&self) -> f64 {
        (self.peak_speed / 2.0) * self.ramp_fraction + self.peak_speed * (1.0 - self.ramp_fraction)
    }
}

/// Where the shortened move ends
#[derive(Debug, Clone, Copy, PartialEq)]
struct Split {
    index: usize,
    /// Fraction of the move that still extrudes
    fraction: f64,
    /// Extrusion taken off the move
    amount: f64,
}

/// Removal computed over the untouched block
#[derive(Debug, Clone, Copy, PartialEq)]
enum Removal {
    /// Single-move block: new `E`, or `None` to drop it
    Single { e: Option<f64>, removed: f64 },
    /// Moves from `first_dropped` on lose `E`; `split` (if any) sits just before
    Tail {
        first_dropped: usize,
        split: Option<Split>,
        removed: f64,
    },
}

/// Removes the estimated leak volume from the tail of extrude blocks
#[derive(Debug, Clone)]
pub struct LeakCompensator {
    coefficient: f64,
}

impl LeakCompensator {
    /// Create a compensator with leak coefficient `C`
    pub fn new(coefficient: f64) -> Self {
        Self { coefficient }
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Estimated leak volume for a block moving along `profile`
    pub fn leak_volume(&self, profile: &VelocityProfile) -> f64 {
        self.coefficient * profile.average_speed()
    }

    fn plan(block: &ExtrudeBlock, leak: f64) -> Removal {
        let moves = block.moves();
        if let [only] = moves {
            return if leak < only.e {
                Removal::Single {
                    e: Some(only.e - leak),
                    removed: leak,
                }
            } else {
                Removal::Single {
                    e: None,
                    removed: only.e,
                }
            };
        }

        let deltas = block.extrusion_deltas();
        let mut budget = leak;
        let mut first_dropped = moves.len();
        let mut split = None;

        for (index, &delta) in deltas.iter().enumerate().rev() {
            if budget <= 0.0 {
                break;
            }
            if budget >= delta {
                budget -= delta.max(0.0);
                first_dropped = index;
                continue;
            }
            split = Some(Split {
                index,
                fraction: 1.0 - budget / delta,
                amount: budget,
            });
            budget = 0.0;
            break;
        }

        Removal::Tail {
            first_dropped,
            split,
            removed: leak - budget,
        }
    }

    fn apply(block: ExtrudeBlock, removal: Removal) -> Vec<Command> {
        match removal {
            Removal::Single { e, .. } => block
                .into_moves()
                .into_iter()
                .map(|mut mv| {
                    mv.command.e = e;
                    mv.command
                })
                .collect(),
            Removal::Tail {
                first_dropped,
                split,
                ..
            } => {
                let split_start = split.map(|s| block.start_of(s.index));
                let mut commands = Vec::with_capacity(block.len() + 1);

                for (index, ExtrudeMove { mut command, end, e }) in
                    block.into_moves().into_iter().enumerate()
                {
                    match (split, split_start) {
                        (Some(s), Some(start)) if s.index == index => {
                            command.set_point(start.lerp(end, s.fraction));
                            command.e = Some(e - s.amount);
                            commands.push(command);
                            commands.push(dry_move_to(end));
                        }
                        _ => {
                            if index >= first_dropped {
                                command.e = None;
                            }
                            commands.push(command);
                        }
                    }
                }
                commands
            }
        }
    }
}

impl Default for LeakCompensator {
    fn default() -> Self {
        Self::new(DEFAULT_LEAK_COEFFICIENT)
    }
}

impl BlockCompensator<ExtrudeMove> for LeakCompensator {
    fn name(&self) -> &str {
        "leak"
    }

    fn description(&self) -> &str {
        "Removes estimated end-of-move leak volume from the tail of extrude blocks"
    }

    fn compensate(&self, block: ExtrudeBlock, limits: &MotionLimits) -> BlockOutput {
        if block.is_empty() {
            return BlockOutput::default();
        }

        let profile = VelocityProfile::trapezoidal(
            block.distance(),
            limits.feedrate,
            limits.max_acceleration,
        );
        let Some(profile) = profile else {
            tracing::warn!(
                distance = block.distance(),
                acceleration = limits.max_acceleration,
                "Extrude block cannot be modelled, leaving it uncompensated"
            );
            let mut output = BlockOutput::unchanged(block.into_commands());
            output.report.degenerate = true;
            return output;
        };
        let leak = self.leak_volume(&profile);
        if leak <= 0.0 {
            return BlockOutput::unchanged(block.into_commands());
        }

        let removal = Self::plan(&block, leak);
        let (removed_volume, split_index) = match removal {
            Removal::Single { removed, .. } => (removed, None),
            Removal::Tail { split, removed, .. } => (removed, split.map(|s| s.index)),
        };
        tracing::debug!(
            moves = block.len(),
            distance = block.distance(),
            total_extrusion = block.total_extrusion(),
            peak_speed = profile.peak_speed,
            average_speed = profile.average_speed(),
            reaches_feedrate = profile.reaches_feedrate,
            leak,
            removed_volume,
            ?split_index,
            "Compensated extrude block"
        );

        BlockOutput {
            commands: Self::apply(block, removal),
            report: CompensationReport {
                leak_volume: leak,
                removed_volume,
                split_index,
                degenerate: false,
            },
        }
    }
}

/// Non-extruding linear move to `end`
fn dry_move_to(end: Point) -> Command {
    let mut command = Command::linear_move();
    command.set_point(end);
    command
}
