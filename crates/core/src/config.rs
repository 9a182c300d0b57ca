//! Rule configuration
//!
//! Everything a session may vary without changing the rules themselves: the piece seed, the
//! starting level, how combos are paid out, and how long a line clear pauses play.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{COMBO_BASE, LINE_CLEAR_PAUSE_MS};

/// How the combo bonus grows with the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComboRule {
    /// `50 x level` for any positive streak
    #[default]
    Flat,
    /// `streak x 50 x level`
    Scaled,
}

impl ComboRule {
    /// Parse a rule name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "flat" => Some(ComboRule::Flat),
            "scaled" => Some(ComboRule::Scaled),
            _ => None,
        }
    }

    /// Bonus for a lock that extends the streak to `streak`
    pub fn bonus(self, streak: i32, level: u32) -> u32 {
        if streak <= 0 {
            return 0;
        }
        let flat = COMBO_BASE.saturating_mul(level);
        match self {
            ComboRule::Flat => flat,
            ComboRule::Scaled => flat.saturating_mul(streak as u32),
        }
    }
}

/// Per-session rule settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub seed: u32,
    pub start_level: u32,
    pub combo_rule: ComboRule,
    /// Pause between a clear and compaction; 0 compacts in the same tick
    pub line_clear_pause_ms: u64,
}

impl RuleConfig {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn line_clear_pause(&self) -> Duration {
        Duration::from_millis(self.line_clear_pause_ms)
    }

    /// Start level clamped to at least 1
    pub fn start_level(&self) -> u32 {
        self.start_level.max(1)
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            start_level: 1,
            combo_rule: ComboRule::Flat,
            line_clear_pause_ms: LINE_CLEAR_PAUSE_MS,
        }
    }
}
