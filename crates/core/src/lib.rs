//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains all the game rules, state management, and simulation logic.
//! It has **no dependencies** on threads, rendering, audio or windowing, making it:
//!
//! - **Deterministic**: Same seed and same inputs produce identical games
//! - **Testable**: Unit tests for all game rules
//! - **Portable**: Can run headless, inside the engine shell, or in a bench
//!
//! # Module Structure
//!
//! - [`pieces`]: Tetromino catalog and SRS kick tables
//! - [`rng`]: 7-bag random piece generation and the preview queue
//! - [`board`]: 10x40 playfield with collision detection and row compaction
//! - [`controller`]: The active piece, kicks, auto-repeat and lock bookkeeping
//! - [`timing`]: Gravity and logic cadences, lock delay
//! - [`scoring`]: T-spin detection, point table, combo and back-to-back
//! - [`input`]: Press/release edges buffered between ticks
//! - [`config`]: Per-session rule settings
//! - [`game_state`]: The aggregate that ties it all together
//! - [`snapshot`]: Renderer-facing copy of the state
//!
//! # Game Rules
//!
//! - **7-Bag Randomizer**: Every bag of seven draws holds each kind once
//! - **SRS Rotation**: Four-entry kick tables, one for I and one shared by the rest
//! - **Lock Delay**: A grounded piece locks on its 12th grounded logic step, with 15 resets
//! - **Hold**: Once per piece, re-enabled on lock
//! - **T-Spin Detection**: Three-corner rule with front-pair and last-kick promotion
//! - **Line Clear Pause**: Full rows stay visible for a second before compaction
//!
//! # Example
//!
//! ```
//! use blockfall_core::GameState;
//! use blockfall_types::GameAction;
//!
//! let mut game = GameState::new(12345);
//!
//! game.apply_action(GameAction::MoveRight);
//! game.apply_action(GameAction::RotateCw);
//! game.apply_action(GameAction::HardDrop);
//!
//! assert!(game.score() > 0); // Hard drop awards points
//! ```
//!
//! # Timing
//!
//! - **Logic cadence**: 50ms (20 Hz) for auto-repeat, soft drop and lock delay
//! - **Gravity**: 1s at level 1, shrinking with every level
//!
//! Call [`GameState::tick`](game_state::GameState::tick) with the elapsed seconds since the
//! previous call.

pub mod board;
pub mod config;
pub mod controller;
pub mod game_state;
pub mod input;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod timing;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use config::{ComboRule, RuleConfig};
pub use controller::{would_be_valid, ActivePiece};
pub use game_state::{GameState, TickSummary};
pub use pieces::{get_shape, kick_row};
pub use rng::{NextQueue, PieceBag, SimpleRng};
pub use scoring::{base_points, classify_tspin, LockOutcome, MessageList, Progress};
pub use snapshot::{ActiveSnapshot, GameSnapshot};
pub use timing::{gravity_period_secs, LockPhase};
