//! Snapshot module - the copy of game state handed to renderers
//!
//! A snapshot is plain data: the visible grid already composed with the active piece (and its
//! ghost when asked for), plus every counter a HUD shows. Nothing in it points back into the
//! live [`GameState`](crate::game_state::GameState).

use serde::Serialize;

use crate::board::{Grid, RowSet};
use crate::controller::ActivePiece;
use crate::input::CameraAxes;
use crate::scoring::MessageList;
use crate::timing::LockPhase;
use crate::types::{Cell, PieceKind, Rotation, BOARD_WIDTH, NEXT_QUEUE_LEN, VISIBLE_HEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i8,
    pub y: i8,
}

impl From<ActivePiece> for ActiveSnapshot {
    fn from(value: ActivePiece) -> Self {
        Self {
            kind: value.kind,
            rotation: value.rotation,
            x: value.x,
            y: value.y,
        }
    }
}

/// Everything a renderer reads, copied out in one go
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    /// Visible rows composed with the active piece, bottom row first
    pub board: Grid<VISIBLE_HEIGHT>,
    pub active: Option<ActiveSnapshot>,
    pub ghost_y: Option<i8>,
    pub hold: Option<PieceKind>,
    pub can_hold: bool,
    pub next: [PieceKind; NEXT_QUEUE_LEN],
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub combo: i32,
    pub back_to_back: bool,
    pub messages: MessageList,
    pub messages_timestamp: f64,
    pub clock: f64,
    pub on_ground: bool,
    pub phase: LockPhase,
    /// Rows waiting to be compacted, for the clear animation
    pub clearing_rows: RowSet,
    pub clear_elapsed: f64,
    pub game_over: bool,
    pub camera: CameraAxes,
}

impl GameSnapshot {
    /// Number of composed cells matching `pred`
    pub fn count_cells(&self, pred: impl Fn(Cell) -> bool) -> usize {
        self.board
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&cell| pred(cell))
            .count()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            board: [[Cell::Empty; BOARD_WIDTH]; VISIBLE_HEIGHT],
            active: None,
            ghost_y: None,
            hold: None,
            can_hold: true,
            next: [PieceKind::I; NEXT_QUEUE_LEN],
            score: 0,
            level: 1,
            lines: 0,
            combo: -1,
            back_to_back: false,
            messages: MessageList::new(),
            messages_timestamp: 0.0,
            clock: 0.0,
            on_ground: false,
            phase: LockPhase::Falling,
            clearing_rows: RowSet::new(),
            clear_elapsed: 0.0,
            game_over: false,
            camera: CameraAxes::default(),
        }
    }
}
