//! blockfall (workspace facade crate).
//!
//! Re-exports the member crates under one roof: `blockfall::{types, core, engine}`. The rules
//! live in `core`, the threaded shell in `engine`, and the shared vocabulary in `types`.

pub use blockfall_core as core;
pub use blockfall_engine as engine;
pub use blockfall_types as types;
