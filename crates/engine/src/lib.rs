//! Concurrency shell around the rules engine.
//!
//! [`Engine`] owns the one [`GameState`](blockfall_core::GameState) of a session behind an
//! `Arc<Mutex<_>>`, runs the simulation on its own thread, and gives renderers and input
//! capture a locked copy-out / press-release surface.
//!
//! ```no_run
//! use blockfall_engine::{Engine, EngineConfig};
//! use blockfall_types::Intent;
//!
//! fn main() -> anyhow::Result<()> {
//!     let engine = Engine::start(EngineConfig::from_env())?;
//!     engine.press(Intent::HardDrop)?;
//!     let snapshot = engine.snapshot(true)?;
//!     println!("score {}", snapshot.score);
//!     engine.stop()
//! }
//! ```

pub mod config;
pub mod runtime;

pub use config::EngineConfig;
pub use runtime::Engine;
