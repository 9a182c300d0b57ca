//! Input buffer - press/release edges in, per-tick intents out
//!
//! Each intent has a held level and a tap flag. The tap is set on a press edge and survives a
//! release, so a press and release that both land between two ticks still registers once.
//! Rotations, hard drop and hold are read once per tick batch; left, right and soft drop are
//! read once per logic step.

use serde::Serialize;

use crate::types::Intent;

const INTENT_COUNT: usize = 7;

fn slot(intent: Intent) -> usize {
    match intent {
        Intent::Left => 0,
        Intent::Right => 1,
        Intent::SoftDrop => 2,
        Intent::HardDrop => 3,
        Intent::RotateCw => 4,
        Intent::RotateCcw => 5,
        Intent::Hold => 6,
    }
}

/// One-shot intents drained at the start of a tick batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OneShots {
    pub rotate_ccw: bool,
    pub rotate_cw: bool,
    pub hard_drop: bool,
    pub hold: bool,
}

/// Cosmetic camera axes, copied through to snapshots untouched
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CameraAxes {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    held: [bool; INTENT_COUNT],
    tapped: [bool; INTENT_COUNT],
    camera: CameraAxes,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press; repeated presses while held are not new edges
    pub fn press(&mut self, intent: Intent) {
        let i = slot(intent);
        if !self.held[i] {
            self.tapped[i] = true;
        }
        self.held[i] = true;
    }

    pub fn release(&mut self, intent: Intent) {
        self.held[slot(intent)] = false;
    }

    pub fn is_held(&self, intent: Intent) -> bool {
        self.held[slot(intent)]
    }

    pub fn set_camera_axes(&mut self, x: f32, y: f32) {
        self.camera = CameraAxes { x, y };
    }

    pub fn camera(&self) -> CameraAxes {
        self.camera
    }

    fn take(&mut self, intent: Intent) -> bool {
        std::mem::take(&mut self.tapped[slot(intent)])
    }

    /// Held-or-tapped state for a logic-step intent, consuming the tap
    fn take_level(&mut self, intent: Intent) -> bool {
        let tapped = self.take(intent);
        tapped || self.is_held(intent)
    }

    /// -1 for left, 1 for right, 0 for neither or both
    pub fn take_direction(&mut self) -> i8 {
        let left = self.take_level(Intent::Left);
        let right = self.take_level(Intent::Right);
        match (left, right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }

    pub fn take_soft_drop(&mut self) -> bool {
        self.take_level(Intent::SoftDrop)
    }

    pub fn take_one_shots(&mut self) -> OneShots {
        OneShots {
            rotate_ccw: self.take(Intent::RotateCcw),
            rotate_cw: self.take(Intent::RotateCw),
            hard_drop: self.take(Intent::HardDrop),
            hold: self.take(Intent::Hold),
        }
    }
}
