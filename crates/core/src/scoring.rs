//! Scoring module - lock classification, points and progression
//!
//! A lock is described by an ordered tag list (`[B2B] [MINI] [TSPIN] [SINGLE..TETRIS] [COMBO]`).
//! Base points are an exact-match lookup over the middle part of that list, so combinations the
//! table does not name (a mini T-spin triple, a bare lock) are worth nothing.
//!
//! Notes:
//! - Base points are multiplied by the level at lock time.
//! - B2B applies a 3/2 multiplier to the base points (before the combo bonus).
//! - The combo bonus depends on the configured [`ComboRule`].

use arrayvec::ArrayVec;
use log::{debug, info};
use serde::Serialize;

use crate::board::Board;
use crate::config::ComboRule;
use crate::controller::ActivePiece;
use crate::types::{
    ClearMessage, PieceKind, Rotation, TSpinKind, B2B_DENOMINATOR, B2B_NUMERATOR, LINES_PER_LEVEL,
};

/// Tags describing one lock, in display order
pub type MessageList = ArrayVec<ClearMessage, 5>;

/// Kick index that always promotes a three-corner T-spin to a full one
const PROMOTING_KICK: u8 = 3;

/// Classify a T-spin for a piece about to lock
///
/// Only a T whose last successful move was a rotation qualifies. The four corners of its 3x3
/// box are tested, with anything outside the grid counting as solid.
pub fn classify_tspin(
    board: &Board,
    piece: &ActivePiece,
    last_move_rotate: bool,
    last_kick: Option<u8>,
) -> TSpinKind {
    if piece.kind != PieceKind::T || !last_move_rotate {
        return TSpinKind::None;
    }

    let (x, y) = (piece.x, piece.y);
    let corners = [
        board.is_solid_or_outside(x, y),
        board.is_solid_or_outside(x, y + 2),
        board.is_solid_or_outside(x + 2, y),
        board.is_solid_or_outside(x + 2, y + 2),
    ];
    let count = corners.iter().filter(|&&solid| solid).count();

    if count < 3 {
        return TSpinKind::None;
    }
    if count == 4 || last_kick == Some(PROMOTING_KICK) {
        return TSpinKind::Full;
    }

    // The pair of corners on the side the T points at
    let (a, b) = match piece.rotation {
        Rotation::Spawn => (1, 3),
        Rotation::Right => (2, 3),
        Rotation::Flipped => (0, 2),
        Rotation::Left => (0, 1),
    };
    if corners[a] && corners[b] {
        TSpinKind::Full
    } else {
        TSpinKind::Mini
    }
}

/// `[MINI] [TSPIN] [SINGLE..TETRIS]` for a lock
pub fn line_messages(tspin: TSpinKind, rows: usize) -> MessageList {
    let mut messages = MessageList::new();
    match tspin {
        TSpinKind::Mini => {
            messages.push(ClearMessage::Mini);
            messages.push(ClearMessage::TSpin);
        }
        TSpinKind::Full => messages.push(ClearMessage::TSpin),
        TSpinKind::None => {}
    }
    if let Some(line) = ClearMessage::for_rows(rows) {
        messages.push(line);
    }
    messages
}

/// Base points (level 1) for an exact tag list
pub fn base_points(messages: &[ClearMessage]) -> u32 {
    use ClearMessage::*;

    match messages {
        [Single] => 100,
        [Double] => 300,
        [Triple] => 500,
        [Tetris] => 800,
        [Mini, TSpin] => 100,
        [TSpin] => 400,
        [Mini, TSpin, Single] => 200,
        [TSpin, Single] => 800,
        [Mini, TSpin, Double] => 400,
        [TSpin, Double] => 1200,
        [TSpin, Triple] => 1600,
        _ => 0,
    }
}

/// Whether a clear builds (or keeps) back-to-back eligibility
pub fn is_difficult(tspin: TSpinKind, rows: usize) -> bool {
    rows > 0 && (rows == 4 || tspin != TSpinKind::None)
}

/// Apply the B2B multiplier (3/2, truncating)
pub fn apply_b2b_multiplier(points: u32) -> u32 {
    points.saturating_mul(B2B_NUMERATOR) / B2B_DENOMINATOR
}

/// Level earned by a line total, never below `current`
pub fn level_for_lines(lines: u32, current: u32) -> u32 {
    current.max(lines / LINES_PER_LEVEL + 1)
}

/// What one lock produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockOutcome {
    pub messages: MessageList,
    pub tspin: TSpinKind,
    pub rows: usize,
    /// Points awarded, combo bonus included
    pub points: u32,
    pub combo_bonus: u32,
    pub b2b_applied: bool,
}

/// Score, level, lines, combo streak and back-to-back eligibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    /// -1 means no streak
    pub combo: i32,
    pub back_to_back: bool,
}

impl Progress {
    pub fn new(start_level: u32) -> Self {
        Self {
            score: 0,
            level: start_level.max(1),
            lines: 0,
            combo: -1,
            back_to_back: false,
        }
    }

    /// Score a lock of `rows` full rows
    ///
    /// Lines and level are left alone; they move when the rows are actually compacted.
    pub fn score_lock(&mut self, tspin: TSpinKind, rows: usize, rule: ComboRule) -> LockOutcome {
        let mut messages = line_messages(tspin, rows);
        let mut points = base_points(&messages).saturating_mul(self.level);

        self.combo = if rows == 0 { -1 } else { self.combo + 1 };

        let mut b2b_applied = false;
        if is_difficult(tspin, rows) {
            if self.back_to_back {
                points = apply_b2b_multiplier(points);
                messages.insert(0, ClearMessage::B2b);
                b2b_applied = true;
            }
            self.back_to_back = true;
        } else if rows > 0 {
            self.back_to_back = false;
        }

        let combo_bonus = rule.bonus(self.combo, self.level);
        if combo_bonus > 0 {
            messages.push(ClearMessage::Combo);
        }
        points = points.saturating_add(combo_bonus);
        self.score = self.score.saturating_add(points);

        debug!(
            "lock: rows={} tspin={:?} messages={:?} points={} combo={}",
            rows, tspin, messages, points, self.combo
        );

        LockOutcome {
            messages,
            tspin,
            rows,
            points,
            combo_bonus,
            b2b_applied,
        }
    }

    /// Count compacted rows; returns true when the level went up
    pub fn add_lines(&mut self, rows: usize) -> bool {
        self.lines = self.lines.saturating_add(rows as u32);
        let level = level_for_lines(self.lines, self.level);
        if level > self.level {
            info!("level up: {} -> {} at {} lines", self.level, level, self.lines);
            self.level = level;
            return true;
        }
        false
    }

    /// Soft (1/row) or hard (2/row) drop points
    pub fn add_drop_points(&mut self, rows: u32, per_row: u32) {
        self.score = self.score.saturating_add(rows.saturating_mul(per_row));
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, ClearMessage::*};

    fn t_at(x: i8, y: i8, rotation: Rotation) -> ActivePiece {
        ActivePiece {
            kind: PieceKind::T,
            x,
            y,
            rotation,
        }
    }

    fn solid(board: &mut Board, cells: &[(i8, i8)]) {
        for &(x, y) in cells {
            board.set(x, y, Cell::Block(PieceKind::Z));
        }
    }

    #[test]
    fn test_point_table() {
        assert_eq!(base_points(&[Single]), 100);
        assert_eq!(base_points(&[Double]), 300);
        assert_eq!(base_points(&[Triple]), 500);
        assert_eq!(base_points(&[Tetris]), 800);
        assert_eq!(base_points(&[Mini, TSpin]), 100);
        assert_eq!(base_points(&[TSpin]), 400);
        assert_eq!(base_points(&[Mini, TSpin, Single]), 200);
        assert_eq!(base_points(&[TSpin, Single]), 800);
        assert_eq!(base_points(&[Mini, TSpin, Double]), 400);
        assert_eq!(base_points(&[TSpin, Double]), 1200);
        assert_eq!(base_points(&[TSpin, Triple]), 1600);
        assert_eq!(base_points(&[Mini, TSpin, Triple]), 0);
        assert_eq!(base_points(&[]), 0);
    }

    #[test]
    fn test_tspin_needs_a_rotation() {
        let mut board = Board::new();
        solid(&mut board, &[(3, 0), (5, 0), (3, 2), (5, 2)]);
        let t = t_at(3, 0, Rotation::Flipped);
        assert_eq!(classify_tspin(&board, &t, false, None), TSpinKind::None);
        assert_eq!(classify_tspin(&board, &t, true, None), TSpinKind::Full);
    }

    #[test]
    fn test_tspin_four_corners_is_full() {
        let mut board = Board::new();
        solid(&mut board, &[(3, 1), (5, 1), (3, 3), (5, 3)]);
        let t = t_at(3, 1, Rotation::Spawn);
        assert_eq!(classify_tspin(&board, &t, true, Some(0)), TSpinKind::Full);
    }

    #[test]
    fn test_tspin_floor_counts_as_solid() {
        let mut board = Board::new();
        // T resting on the floor: both lower corners sit below row 0.
        let t = t_at(3, -1, Rotation::Spawn);
        assert!(board.is_valid_position(&t));
        solid(&mut board, &[(3, 1)]);
        assert_eq!(classify_tspin(&board, &t, true, None), TSpinKind::Mini);
        solid(&mut board, &[(5, 1)]);
        assert_eq!(classify_tspin(&board, &t, true, None), TSpinKind::Full);
    }

    #[test]
    fn test_three_corners_with_last_kick_is_full() {
        let mut board = Board::new();
        // Spawn state points up; upper pair (c1, c3) is missing c3.
        solid(&mut board, &[(3, 1), (5, 1), (3, 3)]);
        let t = t_at(3, 1, Rotation::Spawn);
        assert_eq!(classify_tspin(&board, &t, true, Some(3)), TSpinKind::Full);
        assert_eq!(classify_tspin(&board, &t, true, Some(2)), TSpinKind::Mini);
    }

    #[test]
    fn test_three_corners_front_pair_decides() {
        let mut board = Board::new();
        solid(&mut board, &[(3, 1), (3, 3), (5, 3)]);
        let up = t_at(3, 1, Rotation::Spawn);
        assert_eq!(classify_tspin(&board, &up, true, None), TSpinKind::Full);
        let right = t_at(3, 1, Rotation::Right);
        assert_eq!(classify_tspin(&board, &right, true, None), TSpinKind::Mini);
        let left = t_at(3, 1, Rotation::Left);
        assert_eq!(classify_tspin(&board, &left, true, None), TSpinKind::Full);
    }

    #[test]
    fn test_two_corners_is_not_a_tspin() {
        let mut board = Board::new();
        solid(&mut board, &[(3, 1), (5, 1)]);
        let t = t_at(3, 1, Rotation::Spawn);
        assert_eq!(classify_tspin(&board, &t, true, Some(3)), TSpinKind::None);
    }

    #[test]
    fn test_back_to_back_tetris() {
        let mut progress = Progress::new(1);
        progress.back_to_back = true;
        let outcome = progress.score_lock(TSpinKind::None, 4, ComboRule::Flat);
        assert_eq!(outcome.points, 1200);
        assert_eq!(outcome.messages.as_slice(), &[B2b, Tetris]);
        assert!(outcome.b2b_applied);
        assert!(progress.back_to_back);
    }

    #[test]
    fn test_first_tetris_only_arms_back_to_back() {
        let mut progress = Progress::new(2);
        let outcome = progress.score_lock(TSpinKind::None, 4, ComboRule::Flat);
        assert_eq!(outcome.points, 1600);
        assert!(!outcome.b2b_applied);
        assert!(progress.back_to_back);
    }

    #[test]
    fn test_single_resets_back_to_back_but_empty_lock_does_not() {
        let mut progress = Progress::new(1);
        progress.back_to_back = true;
        progress.score_lock(TSpinKind::None, 0, ComboRule::Flat);
        assert!(progress.back_to_back);
        progress.score_lock(TSpinKind::None, 1, ComboRule::Flat);
        assert!(!progress.back_to_back);
    }

    #[test]
    fn test_zero_row_tspin_scores_without_b2b() {
        let mut progress = Progress::new(1);
        progress.back_to_back = true;
        let outcome = progress.score_lock(TSpinKind::Full, 0, ComboRule::Flat);
        assert_eq!(outcome.points, 400);
        assert_eq!(outcome.messages.as_slice(), &[TSpin]);
        assert!(!outcome.b2b_applied);
    }

    #[test]
    fn test_combo_streak_over_three_singles() {
        let mut progress = Progress::new(1);
        assert_eq!(progress.combo, -1);

        let first = progress.score_lock(TSpinKind::None, 1, ComboRule::Flat);
        assert_eq!(progress.combo, 0);
        assert_eq!(first.points, 100);
        assert_eq!(first.messages.as_slice(), &[Single]);

        progress.score_lock(TSpinKind::None, 1, ComboRule::Flat);
        assert_eq!(progress.combo, 1);

        let third = progress.score_lock(TSpinKind::None, 1, ComboRule::Flat);
        assert_eq!(progress.combo, 2);
        assert_eq!(third.messages.as_slice(), &[Single, Combo]);
        assert_eq!(third.combo_bonus, 50);
        assert_eq!(third.points, 150);

        progress.score_lock(TSpinKind::None, 0, ComboRule::Flat);
        assert_eq!(progress.combo, -1);
    }

    #[test]
    fn test_scaled_combo() {
        let mut progress = Progress::new(1);
        progress.combo = 1;
        let outcome = progress.score_lock(TSpinKind::None, 1, ComboRule::Scaled);
        assert_eq!(outcome.combo_bonus, 100);
        assert_eq!(outcome.points, 200);
    }

    #[test]
    fn test_level_follows_lines() {
        let mut progress = Progress::new(1);
        assert!(!progress.add_lines(9));
        assert!(progress.add_lines(1));
        assert_eq!(progress.level, 2);

        let mut fast_start = Progress::new(5);
        assert!(!fast_start.add_lines(20));
        assert_eq!(fast_start.level, 5);
    }

    #[test]
    fn test_b2b_multiplier_truncates() {
        assert_eq!(apply_b2b_multiplier(1200), 1800);
        assert_eq!(apply_b2b_multiplier(101), 151);
    }
}
