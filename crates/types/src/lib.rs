//! Core types module - shared data structures and constants
//!
//! This crate defines the vocabulary shared by the rules engine, the concurrency shell and any
//! presentation collaborator (renderer, input capture). All types are plain data with no
//! behavior beyond small conversions.
//!
//! # Board Geometry
//!
//! - **Width**: 10 columns (indexed 0-9, left to right)
//! - **Visible height**: 20 rows
//! - **Internal height**: 40 rows (spawn buffer and overflow above the visible area)
//! - Row 0 is the bottom row; y grows upward.
//!
//! # Timing Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `LOGIC_STEP_SECS` | 0.05 | Fixed logic cadence (20 Hz) |
//! | `LOCK_DELAY_STEPS` | 10 | Grounded logic steps tolerated before a forced lock |
//! | `MOVE_RESET_LIMIT` | 15 | Lock-delay resets available per piece |
//! | `LINE_CLEAR_PAUSE_MS` | 1000 | Clear animation pause before compaction |
//! | `DAS_STEPS` | 3 | Logic steps a direction is held before auto-repeat |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{PieceKind, Rotation, RotationDir, BOARD_WIDTH, VISIBLE_HEIGHT};
//!
//! assert_eq!(PieceKind::from_index(5), Some(PieceKind::T));
//! assert_eq!(Rotation::Spawn.rotated(RotationDir::Ccw), Rotation::Left);
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(VISIBLE_HEIGHT, 20);
//! ```

use serde::{Deserialize, Serialize};

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: usize = 10;

/// Rows shown to the player
pub const VISIBLE_HEIGHT: usize = 20;

/// Rows stored by the playfield, including the spawn buffer
pub const BOARD_HEIGHT: usize = 40;

/// Rows between the visible top and the top of a freshly spawned bounding box
pub const SPAWN_HEADROOM: usize = 2;

/// Lowest y the drop search will probe before giving up
pub const DROP_SEARCH_FLOOR: i8 = -4;

/// Number of upcoming pieces kept in the preview queue
pub const NEXT_QUEUE_LEN: usize = 4;

/// Number of distinct piece kinds (and the size of one bag)
pub const PIECE_COUNT: usize = 7;

/// Fixed logic cadence period in seconds (20 Hz)
pub const LOGIC_STEP_SECS: f64 = 0.05;

/// Grounded logic steps tolerated before the piece is forced to lock
pub const LOCK_DELAY_STEPS: u32 = 10;

/// Maximum number of lock-delay resets per piece
pub const MOVE_RESET_LIMIT: u32 = 15;

/// Logic steps a held direction waits before auto-repeat kicks in
pub const DAS_STEPS: u32 = 3;

/// Pause between a line clear and the deferred compaction (1 second)
pub const LINE_CLEAR_PAUSE_MS: u64 = 1000;

/// Points per row for a hard drop
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Points per row for a soft drop
pub const SOFT_DROP_POINTS_PER_ROW: u32 = 1;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Combo scoring base value (50 points, multiplied by level)
pub const COMBO_BASE: u32 = 50;

/// Back-to-back bonus numerator (3/2 = 1.5x multiplier)
pub const B2B_NUMERATOR: u32 = 3;

/// Back-to-back bonus denominator
pub const B2B_DENOMINATOR: u32 = 2;

/// Floor applied to the gravity base before exponentiation
pub const GRAVITY_BASE_EPSILON: f64 = 1e-3;

/// Smallest gravity period the cadence will divide by
pub const GRAVITY_PERIOD_FLOOR_SECS: f64 = 1e-6;

/// The seven tetromino piece kinds, in catalog order
///
/// - **I**: Cyan, 4-long bar
/// - **J**: Blue
/// - **L**: Orange
/// - **O**: Yellow, 2x2 square
/// - **S**: Green
/// - **T**: Purple
/// - **Z**: Red
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// All kinds in catalog order (index 0-6)
    pub const ALL: [PieceKind; PIECE_COUNT] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Catalog index (0-6)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a kind by catalog index
    ///
    /// ```
    /// use blockfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_index(0), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_index(7), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn color(self) -> BlockColor {
        match self {
            PieceKind::I => BlockColor::Cyan,
            PieceKind::J => BlockColor::Blue,
            PieceKind::L => BlockColor::Orange,
            PieceKind::O => BlockColor::Yellow,
            PieceKind::S => BlockColor::Green,
            PieceKind::T => BlockColor::Purple,
            PieceKind::Z => BlockColor::Red,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::J => "j",
            PieceKind::L => "l",
            PieceKind::O => "o",
            PieceKind::S => "s",
            PieceKind::T => "t",
            PieceKind::Z => "z",
        }
    }
}

/// Tile color used by renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockColor {
    Cyan,
    Blue,
    Orange,
    Yellow,
    Green,
    Purple,
    Red,
}

/// Rotation states following the Super Rotation System (SRS)
///
/// The cycle goes: Spawn (0) → Right (R) → Flipped (2) → Left (L) → Spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    Spawn,
    Right,
    Flipped,
    Left,
}

impl Rotation {
    /// Rotation index in `0..4`
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rotation for any integer index, normalized into `0..4`
    ///
    /// ```
    /// use blockfall_types::Rotation;
    ///
    /// assert_eq!(Rotation::from_index(-1), Rotation::Left);
    /// assert_eq!(Rotation::from_index(6), Rotation::Flipped);
    /// ```
    pub fn from_index(index: i32) -> Self {
        match index.rem_euclid(4) {
            0 => Rotation::Spawn,
            1 => Rotation::Right,
            2 => Rotation::Flipped,
            _ => Rotation::Left,
        }
    }

    /// Rotate one step in the given direction
    ///
    /// ```
    /// use blockfall_types::{Rotation, RotationDir};
    ///
    /// assert_eq!(Rotation::Spawn.rotated(RotationDir::Cw), Rotation::Right);
    /// assert_eq!(Rotation::Left.rotated(RotationDir::Cw), Rotation::Spawn);
    /// assert_eq!(Rotation::Spawn.rotated(RotationDir::Ccw), Rotation::Left);
    /// ```
    pub fn rotated(self, dir: RotationDir) -> Self {
        Self::from_index(self.index() as i32 + dir.delta())
    }
}

/// Direction of a rotation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationDir {
    Cw,
    Ccw,
}

impl RotationDir {
    /// Signed rotation delta (+1 clockwise, -1 counter-clockwise)
    pub fn delta(self) -> i32 {
        match self {
            RotationDir::Cw => 1,
            RotationDir::Ccw => -1,
        }
    }
}

/// A cell of the board or of a composed render grid
///
/// `Ghost` only ever appears in composed grids; the solid playfield never stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Block(PieceKind),
    Ghost,
}

impl Cell {
    /// True for cells that block movement
    pub fn is_solid(self) -> bool {
        matches!(self, Cell::Block(_))
    }
}

/// Semantic tags describing one lock event, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearMessage {
    B2b,
    Mini,
    TSpin,
    Single,
    Double,
    Triple,
    Tetris,
    Combo,
}

impl ClearMessage {
    /// Line-count message for 1-4 cleared rows
    pub fn for_rows(rows: usize) -> Option<Self> {
        match rows {
            1 => Some(ClearMessage::Single),
            2 => Some(ClearMessage::Double),
            3 => Some(ClearMessage::Triple),
            4 => Some(ClearMessage::Tetris),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClearMessage::B2b => "B2B",
            ClearMessage::Mini => "MINI",
            ClearMessage::TSpin => "TSPIN",
            ClearMessage::Single => "SINGLE",
            ClearMessage::Double => "DOUBLE",
            ClearMessage::Triple => "TRIPLE",
            ClearMessage::Tetris => "TETRIS",
            ClearMessage::Combo => "COMBO",
        }
    }
}

/// T-Spin detection result
///
/// - **None**: Not a T-spin
/// - **Mini**: three corners solid, front pair not both solid
/// - **Full**: four corners, a last-kick rotation, or the front pair solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TSpinKind {
    None,
    Mini,
    Full,
}

/// Input intents delivered by the input-capture collaborator
///
/// The engine consumes press/release edges of these, never raw scan codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Left,
    Right,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    Hold,
}

/// Discrete actions applied immediately to a game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Drop piece one cell down (with soft drop scoring)
    SoftDrop,
    /// Instantly drop piece to lowest valid position and lock it
    HardDrop,
    /// Rotate piece 90° clockwise
    RotateCw,
    /// Rotate piece 90° counter-clockwise
    RotateCcw,
    /// Hold current piece (if available)
    Hold,
}

impl GameAction {
    /// Parse action from string (case-insensitive)
    ///
    /// ```
    /// use blockfall_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("harddrop"), Some(GameAction::HardDrop));
    /// assert_eq!(GameAction::from_str("pause"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "harddrop" => Some(GameAction::HardDrop),
            "rotatecw" => Some(GameAction::RotateCw),
            "rotateccw" => Some(GameAction::RotateCcw),
            "hold" => Some(GameAction::Hold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::RotateCw => "rotateCw",
            GameAction::RotateCcw => "rotateCcw",
            GameAction::Hold => "hold",
        }
    }
}
