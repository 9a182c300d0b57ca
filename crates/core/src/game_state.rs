//! Game state module - the single aggregate the simulation mutates
//!
//! This module ties together all core components: board, bag, controller, lock timing and
//! scoring. [`GameState::tick`] advances one batch of simulated time; everything a renderer
//! needs comes out of [`GameState::snapshot`].
//!
//! Within one batch the order is fixed: the clear pause (if any) runs first, then the one-shot
//! intents (rotate ccw, rotate cw, hard drop, hold), then every due logic step, then every due
//! gravity step. A lock that starts a clear or ends the game stops the batch.

use log::{debug, warn};

use crate::board::{Board, RowSet};
use crate::config::RuleConfig;
use crate::controller::{ActivePiece, PieceControl, ShiftRepeat};
use crate::input::InputBuffer;
use crate::rng::NextQueue;
use crate::scoring::{classify_tspin, LockOutcome, MessageList, Progress};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::timing::{Cadence, LockPhase};
use crate::types::{
    Cell, ClearMessage, GameAction, Intent, PieceKind, RotationDir, BOARD_HEIGHT, BOARD_WIDTH,
    HARD_DROP_POINTS_PER_ROW, NEXT_QUEUE_LEN, SOFT_DROP_POINTS_PER_ROW, VISIBLE_HEIGHT,
};

/// Rows that locked full and are waiting out the clear pause
#[derive(Debug, Clone, PartialEq)]
struct PendingClear {
    rows: RowSet,
    elapsed: f64,
}

/// What one [`GameState::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    pub logic_steps: u64,
    pub fall_steps: u64,
    pub locks: u32,
    pub clear_finished: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    active: Option<ActivePiece>,
    control: PieceControl,
    repeat: ShiftRepeat,
    hold: Option<PieceKind>,
    can_hold: bool,
    queue: NextQueue,
    progress: Progress,
    rules: RuleConfig,
    cadence: Cadence,
    input: InputBuffer,
    messages: MessageList,
    messages_timestamp: f64,
    last_outcome: Option<LockOutcome>,
    pending_clear: Option<PendingClear>,
    /// Engine clock in seconds
    clock: f64,
    locks_this_batch: u32,
    game_over: bool,
}

impl GameState {
    /// Create a new game with the given RNG seed and default rules
    pub fn new(seed: u32) -> Self {
        Self::with_rules(RuleConfig::with_seed(seed))
    }

    /// Create a new game and spawn its first piece
    pub fn with_rules(rules: RuleConfig) -> Self {
        let progress = Progress::new(rules.start_level());
        let mut state = Self {
            board: Board::new(),
            active: None,
            control: PieceControl::new(),
            repeat: ShiftRepeat::new(),
            hold: None,
            can_hold: true,
            queue: NextQueue::new(rules.seed),
            cadence: Cadence::new(progress.level),
            progress,
            rules,
            input: InputBuffer::new(),
            messages: MessageList::new(),
            messages_timestamp: 0.0,
            last_outcome: None,
            pending_clear: None,
            clock: 0.0,
            locks_this_batch: 0,
            game_over: false,
        };
        state.spawn_next();
        state
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<ActivePiece> {
        self.active
    }

    pub fn control(&self) -> &PieceControl {
        &self.control
    }

    pub fn hold_piece(&self) -> Option<PieceKind> {
        self.hold
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn next_queue(&self) -> [PieceKind; NEXT_QUEUE_LEN] {
        self.queue.as_array()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn level(&self) -> u32 {
        self.progress.level
    }

    pub fn lines(&self) -> u32 {
        self.progress.lines
    }

    pub fn combo(&self) -> i32 {
        self.progress.combo
    }

    pub fn back_to_back(&self) -> bool {
        self.progress.back_to_back
    }

    pub fn messages(&self) -> &[ClearMessage] {
        &self.messages
    }

    pub fn messages_timestamp(&self) -> f64 {
        self.messages_timestamp
    }

    pub fn last_outcome(&self) -> Option<&LockOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn gravity_period(&self) -> f64 {
        self.cadence.gravity_period()
    }

    /// Rows locked full and waiting for compaction
    pub fn clearing_rows(&self) -> &[usize] {
        self.pending_clear
            .as_ref()
            .map(|pending| pending.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn phase(&self) -> LockPhase {
        if self.pending_clear.is_some() {
            LockPhase::Locking
        } else {
            self.control.phase()
        }
    }

    /// Whether moves and steps apply right now
    fn is_live(&self) -> bool {
        !self.game_over && self.pending_clear.is_none() && self.active.is_some()
    }

    pub fn press(&mut self, intent: Intent) {
        self.input.press(intent);
    }

    pub fn release(&mut self, intent: Intent) {
        self.input.release(intent);
    }

    pub fn set_camera_axes(&mut self, x: f32, y: f32) {
        self.input.set_camera_axes(x, y);
    }

    /// Where the active piece would land
    pub fn ghost_y(&self) -> Option<i8> {
        self.active.map(|piece| self.board.lowest_resting_y(&piece))
    }

    /// Advance the simulation by `elapsed_secs` of wall-clock time
    pub fn tick(&mut self, elapsed_secs: f64) -> TickSummary {
        let mut summary = TickSummary::default();
        if self.game_over || !elapsed_secs.is_finite() {
            return summary;
        }
        let elapsed = elapsed_secs.max(0.0);
        self.clock += elapsed;
        self.locks_this_batch = 0;

        if let Some(pending) = self.pending_clear.as_mut() {
            pending.elapsed += elapsed;
            if pending.elapsed < self.rules.line_clear_pause().as_secs_f64() {
                return summary;
            }
            self.finish_line_clear();
            summary.clear_finished = true;
            return summary;
        }

        let shots = self.input.take_one_shots();
        if shots.rotate_ccw {
            self.try_rotate(RotationDir::Ccw);
        }
        if shots.rotate_cw {
            self.try_rotate(RotationDir::Cw);
        }
        if shots.hard_drop {
            self.hard_drop();
        }
        if shots.hold {
            self.hold();
        }

        let steps = self.cadence.advance(elapsed);
        for _ in 0..steps.logic {
            if !self.is_live() {
                break;
            }
            self.logic_step();
            summary.logic_steps += 1;
        }
        for _ in 0..steps.fall {
            if !self.is_live() {
                break;
            }
            self.fall_step();
            summary.fall_steps += 1;
        }

        summary.locks = self.locks_this_batch;
        summary
    }

    /// One 20 Hz step: auto-repeat, soft drop and lock-delay bookkeeping
    fn logic_step(&mut self) {
        let Some(mut piece) = self.active else {
            return;
        };
        self.control.begin_logic_step(&self.board, &piece);

        let dir = self.input.take_direction();
        if self.repeat.step(dir) {
            self.control.try_shift(&self.board, &mut piece, dir);
        }
        if self.input.take_soft_drop() && self.control.try_descend(&self.board, &mut piece) {
            self.progress.add_drop_points(1, SOFT_DROP_POINTS_PER_ROW);
        }
        self.active = Some(piece);

        if self.control.lock_due() {
            self.lock_piece();
            return;
        }
        self.control.end_logic_step();
    }

    /// One gravity step; gravity alone never locks a piece
    fn fall_step(&mut self) {
        let Some(mut piece) = self.active else {
            return;
        };
        self.control.try_descend(&self.board, &mut piece);
        self.active = Some(piece);
    }

    /// Move the active piece one column; false if blocked or not in play
    pub fn try_shift(&mut self, dx: i8) -> bool {
        if !self.is_live() {
            return false;
        }
        let Some(mut piece) = self.active else {
            return false;
        };
        let moved = self.control.try_shift(&self.board, &mut piece, dx);
        self.active = Some(piece);
        moved
    }

    pub fn try_rotate(&mut self, dir: RotationDir) -> bool {
        if !self.is_live() {
            return false;
        }
        let Some(mut piece) = self.active else {
            return false;
        };
        let rotated = self.control.try_rotate(&self.board, &mut piece, dir);
        self.active = Some(piece);
        rotated
    }

    /// Move down one row, scoring it as a soft drop
    pub fn soft_drop(&mut self) -> bool {
        if !self.is_live() {
            return false;
        }
        let Some(mut piece) = self.active else {
            return false;
        };
        let moved = self.control.try_descend(&self.board, &mut piece);
        self.active = Some(piece);
        if moved {
            self.progress.add_drop_points(1, SOFT_DROP_POINTS_PER_ROW);
        }
        moved
    }

    /// Drop to the resting row and lock; returns the rows descended
    pub fn hard_drop(&mut self) -> u32 {
        if !self.is_live() {
            return 0;
        }
        let Some(mut piece) = self.active else {
            return 0;
        };
        let rows = self.control.hard_drop(&self.board, &mut piece);
        self.progress.add_drop_points(rows, HARD_DROP_POINTS_PER_ROW);
        self.active = Some(piece);
        self.lock_piece();
        rows
    }

    /// Swap the active piece with the hold slot (or stash it and draw from the queue)
    pub fn hold(&mut self) -> bool {
        if !self.can_hold || !self.is_live() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };

        let kind = match self.hold.replace(active.kind) {
            Some(held) => held,
            None => self.queue.pop(),
        };
        self.can_hold = false;
        self.spawn(kind);
        true
    }

    /// Apply a discrete action immediately, outside the tick cadence
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.try_shift(-1),
            GameAction::MoveRight => self.try_shift(1),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::HardDrop => {
                if !self.is_live() {
                    return false;
                }
                self.hard_drop();
                true
            }
            GameAction::RotateCw => self.try_rotate(RotationDir::Cw),
            GameAction::RotateCcw => self.try_rotate(RotationDir::Ccw),
            GameAction::Hold => self.hold(),
        }
    }

    /// Lock the active piece onto the board and score it
    pub fn lock_piece(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };

        let tspin = classify_tspin(
            &self.board,
            &piece,
            self.control.last_move_rotate(),
            self.control.last_kick(),
        );
        if !self.board.lock_piece(&piece) {
            warn!("locking {:?} at an invalid position {:?}", piece.kind, piece);
        }
        self.locks_this_batch += 1;

        let rows = self.board.find_full_rows();
        let outcome = self
            .progress
            .score_lock(tspin, rows.len(), self.rules.combo_rule);
        self.messages = outcome.messages.clone();
        self.messages_timestamp = self.clock;
        self.last_outcome = Some(outcome);

        if rows.is_empty() {
            self.can_hold = true;
            self.spawn_next();
            return;
        }

        self.pending_clear = Some(PendingClear { rows, elapsed: 0.0 });
        if self.rules.line_clear_pause_ms == 0 {
            self.finish_line_clear();
        }
    }

    /// Compact the pending rows, count them and bring in the next piece
    pub fn finish_line_clear(&mut self) {
        let Some(pending) = self.pending_clear.take() else {
            return;
        };
        self.board.clear_and_compact(&pending.rows);
        if self.progress.add_lines(pending.rows.len()) {
            self.cadence.set_level(self.progress.level);
        }
        self.cadence.reset();
        debug!(
            "cleared rows {:?}; lines={} level={}",
            pending.rows.as_slice(),
            self.progress.lines,
            self.progress.level
        );
        self.can_hold = true;
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let kind = self.queue.pop();
        self.spawn(kind);
    }

    /// Put `kind` at its spawn transform with fresh lock bookkeeping
    fn spawn(&mut self, kind: PieceKind) -> bool {
        let piece = ActivePiece::spawn(kind);
        self.control = PieceControl::new();
        if !self.board.is_valid_position(&piece) {
            warn!(
                "top out: {:?} cannot spawn; score={} lines={}",
                kind, self.progress.score, self.progress.lines
            );
            self.active = None;
            self.game_over = true;
            return false;
        }
        self.active = Some(piece);
        true
    }

    /// The active piece sits inside the grid on open cells, or there is none
    pub fn is_consistent(&self) -> bool {
        self.board
            .compose::<BOARD_HEIGHT>(self.active.as_ref(), false, false)
            .is_some()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot, include_ghost: bool) {
        out.board = self
            .board
            .compose::<VISIBLE_HEIGHT>(self.active.as_ref(), include_ghost, true)
            .unwrap_or([[Cell::Empty; BOARD_WIDTH]; VISIBLE_HEIGHT]);
        out.active = self.active.map(ActiveSnapshot::from);
        out.ghost_y = if include_ghost { self.ghost_y() } else { None };
        out.hold = self.hold;
        out.can_hold = self.can_hold;
        out.next = self.queue.as_array();
        out.score = self.progress.score;
        out.level = self.progress.level;
        out.lines = self.progress.lines;
        out.combo = self.progress.combo;
        out.back_to_back = self.progress.back_to_back;
        out.messages = self.messages.clone();
        out.messages_timestamp = self.messages_timestamp;
        out.clock = self.clock;
        out.on_ground = self.control.on_ground();
        out.phase = self.phase();
        out.clearing_rows = self
            .pending_clear
            .as_ref()
            .map(|pending| pending.rows.clone())
            .unwrap_or_default();
        out.clear_elapsed = self
            .pending_clear
            .as_ref()
            .map_or(0.0, |pending| pending.elapsed);
        out.game_over = self.game_over;
        out.camera = self.input.camera();
    }

    pub fn snapshot(&self, include_ghost: bool) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s, include_ghost);
        s
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    #[cfg(test)]
    pub(crate) fn set_active(&mut self, piece: ActivePiece) {
        self.active = Some(piece);
        self.control = PieceControl::new();
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}
