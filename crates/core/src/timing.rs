//! Lock & timing state machine
//!
//! Two independent cadences drive the game: gravity, whose period shrinks with the level, and a
//! fixed 20 Hz logic cadence that handles horizontal auto-repeat, soft drop and lock-delay
//! bookkeeping. Both are fixed-step: elapsed wall-clock time accumulates and whole periods are
//! drained as integer step counts, independent of the caller's frame rate.

use serde::Serialize;

use crate::types::{
    BOARD_HEIGHT, GRAVITY_BASE_EPSILON, GRAVITY_PERIOD_FLOOR_SECS, LOCK_DELAY_STEPS,
    LOGIC_STEP_SECS, MOVE_RESET_LIMIT,
};

/// Where the active piece is in its lock lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LockPhase {
    /// Free to fall
    Falling,
    /// Resting on the stack or floor, lock delay running
    Grounded,
    /// Committed: the piece locked and a clear is being resolved
    Locking,
}

/// Gravity period in seconds: `max(eps, 0.8 - (level - 1) * 0.007) ^ (level - 1)`
///
/// The curve collapses towards zero at high levels. That is the intended rule; the result is
/// only floored so the cadence never divides by zero.
pub fn gravity_period_secs(level: u32) -> f64 {
    let steps = level.saturating_sub(1) as f64;
    let base = (0.8 - steps * 0.007).max(GRAVITY_BASE_EPSILON);
    base.powf(steps).max(GRAVITY_PERIOD_FLOOR_SECS)
}

/// Gravity steps beyond this per batch cannot move a piece further
const MAX_FALL_STEPS_PER_BATCH: u64 = BOARD_HEIGHT as u64 + 4;

/// Fixed-step accumulators for both cadences
#[derive(Debug, Clone, PartialEq)]
pub struct Cadence {
    fall_accum: f64,
    logic_accum: f64,
    gravity_period: f64,
}

/// Whole steps drained from the accumulators by one [`Cadence::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepCounts {
    pub logic: u64,
    pub fall: u64,
}

impl Cadence {
    pub fn new(level: u32) -> Self {
        Self {
            fall_accum: 0.0,
            logic_accum: 0.0,
            gravity_period: gravity_period_secs(level),
        }
    }

    pub fn gravity_period(&self) -> f64 {
        self.gravity_period
    }

    pub fn set_level(&mut self, level: u32) {
        self.gravity_period = gravity_period_secs(level);
    }

    /// Add elapsed time and drain whole periods from both accumulators
    pub fn advance(&mut self, elapsed_secs: f64) -> StepCounts {
        let elapsed = elapsed_secs.max(0.0);
        self.fall_accum += elapsed;
        self.logic_accum += elapsed;

        let logic = drain(&mut self.logic_accum, LOGIC_STEP_SECS);
        let fall = drain(&mut self.fall_accum, self.gravity_period);
        StepCounts {
            logic,
            fall: fall.min(MAX_FALL_STEPS_PER_BATCH),
        }
    }

    /// Drop any partially accumulated time
    pub fn reset(&mut self) {
        self.fall_accum = 0.0;
        self.logic_accum = 0.0;
    }
}

fn drain(accum: &mut f64, period: f64) -> u64 {
    let steps = (*accum / period).floor();
    *accum -= steps * period;
    steps as u64
}

/// Lock-delay counters for the active piece
///
/// `steps_on_ground` counts consecutive grounded logic steps; `move_resets` counts how many
/// times a grounded move has restarted that count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockDelay {
    steps_on_ground: u32,
    move_resets: u32,
}

impl LockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps_on_ground(&self) -> u32 {
        self.steps_on_ground
    }

    pub fn move_resets(&self) -> u32 {
        self.move_resets
    }

    pub fn budget_exhausted(&self) -> bool {
        self.move_resets >= MOVE_RESET_LIMIT
    }

    /// Restart the grounded count without spending budget (the piece left the ground)
    pub fn restart(&mut self) {
        self.steps_on_ground = 0;
    }

    /// Spend one reset on a grounded move. Returns false once the budget is gone; the piece is
    /// then due on its next grounded step.
    pub fn try_reset(&mut self) -> bool {
        if self.budget_exhausted() {
            return false;
        }
        self.move_resets += 1;
        self.steps_on_ground = 0;
        true
    }

    /// Whether a grounded piece must lock now
    pub fn is_due(&self) -> bool {
        self.steps_on_ground > LOCK_DELAY_STEPS || self.budget_exhausted()
    }

    pub fn count_grounded_step(&mut self) {
        self.steps_on_ground = self.steps_on_ground.saturating_add(1);
    }
}
