//! Controller module - the falling piece and the moves applied to it
//!
//! [`ActivePiece`] is a `Copy` transform (kind, box origin, rotation). Every move is probed on a
//! candidate copy and only written back once the board accepts it, so a rejected move never
//! leaves partial state behind.
//!
//! [`PieceControl`] carries the per-piece bookkeeping that the lock rules and T-spin detection
//! read: ground contact, the lock-delay counters, and what the last successful move was.

use log::trace;

use crate::board::Board;
use crate::pieces::{get_shape, kick_row, spawn_origin, PieceShape};
use crate::timing::{LockDelay, LockPhase};
use crate::types::{PieceKind, Rotation, RotationDir, DAS_STEPS};

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    pub kind: PieceKind,
    /// Bottom-left corner of the bounding box, board space
    pub x: i8,
    pub y: i8,
    pub rotation: Rotation,
}

impl ActivePiece {
    /// Create a piece at the spawn transform for its kind
    pub fn spawn(kind: PieceKind) -> Self {
        let (x, y) = spawn_origin(kind);
        Self {
            kind,
            x,
            y,
            rotation: Rotation::Spawn,
        }
    }

    /// Mino offsets for the current rotation
    pub fn shape(&self) -> PieceShape {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute board coordinates of the four minos
    pub fn cells(&self) -> [(i8, i8); 4] {
        self.shape().map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    pub fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// The same piece turned `steps` quarter turns clockwise (negative for counter-clockwise)
    pub fn turned(&self, steps: i32) -> Self {
        Self {
            rotation: Rotation::from_index(self.rotation.index() as i32 + steps),
            ..*self
        }
    }
}

/// Would `piece` be legal after moving by (dx, dy) and turning `drot` quarter turns?
pub fn would_be_valid(board: &Board, piece: &ActivePiece, dx: i8, dy: i8, drot: i32) -> bool {
    board.is_valid_position(&piece.shifted(dx, dy).turned(drot))
}

/// Whether the piece is resting on the floor or the stack
pub fn is_grounded(board: &Board, piece: &ActivePiece) -> bool {
    !would_be_valid(board, piece, 0, -1, 0)
}

/// An accepted rotation and the kick that made it fit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotated {
    pub piece: ActivePiece,
    /// Index into the kick row, `None` when the unkicked rotation fit
    pub kick: Option<u8>,
}

/// Resolve a rotation against the board, trying the kick table in order
///
/// Returns `None` when neither the unkicked position nor any kick offset is legal.
pub fn resolve_rotation(board: &Board, piece: &ActivePiece, dir: RotationDir) -> Option<Rotated> {
    let turned = piece.turned(dir.delta());
    if board.is_valid_position(&turned) {
        return Some(Rotated {
            piece: turned,
            kick: None,
        });
    }

    let row = kick_row(piece.kind, piece.rotation, dir)?;
    row.iter().enumerate().find_map(|(i, &(dx, dy))| {
        let candidate = turned.shifted(dx, dy);
        board.is_valid_position(&candidate).then(|| {
            trace!(
                "kick {} ({}, {}) for {:?} {:?} -> {:?}",
                i,
                dx,
                dy,
                piece.kind,
                piece.rotation,
                candidate.rotation
            );
            Rotated {
                piece: candidate,
                kick: Some(i as u8),
            }
        })
    })
}

/// Horizontal auto-repeat
///
/// A held direction moves on the first logic step, waits, then moves on every step once the
/// hold count exceeds [`DAS_STEPS`]. Changing or releasing the direction restarts the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShiftRepeat {
    held_steps: u32,
    last_dir: i8,
}

impl ShiftRepeat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this step's resolved direction (-1, 0 or 1); returns whether to shift now
    pub fn step(&mut self, dir: i8) -> bool {
        if dir == 0 || dir != self.last_dir {
            self.held_steps = 0;
        } else {
            self.held_steps = self.held_steps.saturating_add(1);
        }
        self.last_dir = dir;
        dir != 0 && (self.held_steps == 0 || self.held_steps > DAS_STEPS)
    }

    pub fn last_dir(&self) -> i8 {
        self.last_dir
    }

    pub fn held_steps(&self) -> u32 {
        self.held_steps
    }
}

/// Lock and move bookkeeping for the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PieceControl {
    lock: LockDelay,
    on_ground: bool,
    last_move_rotate: bool,
    last_kick: Option<u8>,
}

impl PieceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn last_move_rotate(&self) -> bool {
        self.last_move_rotate
    }

    pub fn last_kick(&self) -> Option<u8> {
        self.last_kick
    }

    pub fn lock_delay(&self) -> &LockDelay {
        &self.lock
    }

    pub fn phase(&self) -> LockPhase {
        if self.on_ground {
            LockPhase::Grounded
        } else {
            LockPhase::Falling
        }
    }

    /// Start of a logic step: a piece in the air has no lock count
    pub fn begin_logic_step(&mut self, board: &Board, piece: &ActivePiece) {
        if !self.on_ground {
            self.lock.restart();
        }
        self.on_ground = is_grounded(board, piece);
    }

    /// End of a logic step: count it if the piece is resting
    pub fn end_logic_step(&mut self) {
        if self.on_ground {
            self.lock.count_grounded_step();
        }
    }

    /// Whether the piece must lock now
    pub fn lock_due(&self) -> bool {
        self.on_ground && self.lock.is_due()
    }

    /// Move one column left or right
    pub fn try_shift(&mut self, board: &Board, piece: &mut ActivePiece, dx: i8) -> bool {
        if !would_be_valid(board, piece, dx, 0, 0) {
            return false;
        }
        *piece = piece.shifted(dx, 0);
        self.last_move_rotate = false;
        self.after_grounded_move(board, piece);
        true
    }

    /// Rotate with kicks; the kick index is recorded only when the rotation is accepted
    pub fn try_rotate(&mut self, board: &Board, piece: &mut ActivePiece, dir: RotationDir) -> bool {
        let Some(rotated) = resolve_rotation(board, piece, dir) else {
            return false;
        };
        *piece = rotated.piece;
        self.last_move_rotate = true;
        self.last_kick = rotated.kick;
        self.after_grounded_move(board, piece);
        true
    }

    /// Move one row down (gravity or soft drop)
    ///
    /// A blocked descent marks the piece as grounded; an accepted one re-probes contact.
    pub fn try_descend(&mut self, board: &Board, piece: &mut ActivePiece) -> bool {
        if !would_be_valid(board, piece, 0, -1, 0) {
            if !self.on_ground {
                self.on_ground = true;
                self.lock.restart();
            }
            return false;
        }
        *piece = piece.shifted(0, -1);
        self.last_move_rotate = false;
        self.on_ground = is_grounded(board, piece);
        true
    }

    /// Drop to the resting row; returns the number of rows descended
    pub fn hard_drop(&mut self, board: &Board, piece: &mut ActivePiece) -> u32 {
        let resting = board.lowest_resting_y(piece);
        let rows = (piece.y - resting).max(0) as u32;
        if rows > 0 {
            self.last_move_rotate = false;
        }
        piece.y = resting;
        rows
    }

    /// A move made while grounded either lifts the piece off the ground or spends one
    /// lock-delay reset
    fn after_grounded_move(&mut self, board: &Board, piece: &ActivePiece) {
        if !self.on_ground {
            return;
        }
        if is_grounded(board, piece) {
            self.lock.try_reset();
        } else {
            self.on_ground = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, MOVE_RESET_LIMIT};

    fn at(kind: PieceKind, x: i8, y: i8, rotation: Rotation) -> ActivePiece {
        ActivePiece {
            kind,
            x,
            y,
            rotation,
        }
    }

    #[test]
    fn test_cells_are_absolute() {
        let t = at(PieceKind::T, 3, 5, Rotation::Spawn);
        assert_eq!(t.cells(), [(3, 6), (4, 6), (5, 6), (4, 7)]);
    }

    #[test]
    fn test_would_be_valid_is_pure() {
        let board = Board::new();
        let t = at(PieceKind::T, 0, 5, Rotation::Spawn);
        assert!(!would_be_valid(&board, &t, -1, 0, 0));
        assert!(would_be_valid(&board, &t, 1, 0, 1));
        assert_eq!(t, at(PieceKind::T, 0, 5, Rotation::Spawn));
    }

    #[test]
    fn test_shift_blocked_by_wall_changes_nothing() {
        let board = Board::new();
        let mut control = PieceControl::new();
        let mut piece = at(PieceKind::O, 0, 5, Rotation::Spawn);
        assert!(!control.try_shift(&board, &mut piece, -1));
        assert_eq!(piece.x, 0);
        assert!(control.try_shift(&board, &mut piece, 1));
        assert_eq!(piece.x, 1);
    }

    #[test]
    fn test_unkicked_rotation_records_no_kick() {
        let board = Board::new();
        let mut control = PieceControl::new();
        let mut piece = at(PieceKind::T, 3, 10, Rotation::Spawn);
        assert!(control.try_rotate(&board, &mut piece, RotationDir::Cw));
        assert_eq!(piece.rotation, Rotation::Right);
        assert_eq!((piece.x, piece.y), (3, 10));
        assert_eq!(control.last_kick(), None);
        assert!(control.last_move_rotate());
    }

    #[test]
    fn test_rotation_kicks_off_the_left_wall() {
        let board = Board::new();
        let mut control = PieceControl::new();
        // Right state leaves box column 0 empty, so x = -1 is legal.
        let mut piece = at(PieceKind::T, -1, 10, Rotation::Right);
        assert!(board.is_valid_position(&piece));
        assert!(control.try_rotate(&board, &mut piece, RotationDir::Cw));
        assert_eq!(piece.rotation, Rotation::Flipped);
        assert_eq!(piece.x, 0);
        assert_eq!(control.last_kick(), Some(0));
    }

    #[test]
    fn test_rejected_rotation_keeps_previous_kick() {
        let mut board = Board::new();
        for y in 0..6 {
            board.fill_row_except(y, &[0, 1, 2], PieceKind::Z);
        }
        let mut control = PieceControl::new();
        let mut piece = at(PieceKind::I, 0, 0, Rotation::Right);
        // Vertical I in column 2, boxed in by the stack on the right.
        board.set(1, 0, Cell::Block(PieceKind::J));
        board.set(1, 1, Cell::Block(PieceKind::J));
        board.set(1, 2, Cell::Block(PieceKind::J));
        board.set(1, 3, Cell::Block(PieceKind::J));
        board.set(1, 4, Cell::Block(PieceKind::J));
        assert!(board.is_valid_position(&piece));
        let before = piece;
        assert!(!control.try_rotate(&board, &mut piece, RotationDir::Cw));
        assert_eq!(piece, before);
        assert_eq!(control.last_kick(), None);
        assert!(!control.last_move_rotate());
    }

    #[test]
    fn test_descend_sets_ground_contact() {
        let board = Board::new();
        let mut control = PieceControl::new();
        let mut piece = at(PieceKind::O, 4, 1, Rotation::Spawn);
        assert!(control.try_descend(&board, &mut piece));
        assert_eq!(piece.y, 0);
        assert!(control.on_ground());
        assert!(!control.try_descend(&board, &mut piece));
        assert_eq!(control.phase(), LockPhase::Grounded);
    }

    #[test]
    fn test_grounded_shift_spends_reset_budget() {
        let board = Board::new();
        let mut control = PieceControl::new();
        let mut piece = at(PieceKind::O, 0, 0, Rotation::Spawn);
        control.begin_logic_step(&board, &piece);
        assert!(control.on_ground());

        for i in 0..MOVE_RESET_LIMIT {
            let dx = if i % 2 == 0 { 1 } else { -1 };
            assert!(control.try_shift(&board, &mut piece, dx));
        }
        assert_eq!(control.lock_delay().move_resets(), MOVE_RESET_LIMIT);
        assert!(control.lock_due());
    }

    #[test]
    fn test_shift_off_a_ledge_lifts_the_piece() {
        let mut board = Board::new();
        board.set(0, 0, Cell::Block(PieceKind::Z));
        board.set(1, 0, Cell::Block(PieceKind::Z));
        let mut control = PieceControl::new();
        let mut piece = at(PieceKind::O, 0, 1, Rotation::Spawn);
        control.begin_logic_step(&board, &piece);
        assert!(control.on_ground());

        assert!(control.try_shift(&board, &mut piece, 1));
        assert!(control.on_ground());
        assert!(control.try_shift(&board, &mut piece, 1));
        assert!(!control.on_ground());
        assert_eq!(control.lock_delay().move_resets(), 1);
    }

    #[test]
    fn test_hard_drop_reports_rows() {
        let board = Board::new();
        let mut control = PieceControl::new();
        let mut piece = ActivePiece::spawn(PieceKind::O);
        assert_eq!(control.hard_drop(&board, &mut piece), 20);
        assert_eq!(piece.y, 0);
        assert_eq!(control.hard_drop(&board, &mut piece), 0);
    }

    #[test]
    fn test_shift_repeat_waits_before_repeating() {
        let mut repeat = ShiftRepeat::new();
        let moves: Vec<bool> = (0..7).map(|_| repeat.step(1)).collect();
        assert_eq!(moves, [true, false, false, false, true, true, true]);
        assert!(!repeat.step(0));
        assert!(repeat.step(-1));
        assert!(repeat.step(1));
    }
}
