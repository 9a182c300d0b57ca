//! Engine configuration
//!
//! Rule settings plus the simulation thread's tick wait, read from `BLOCKFALL_*` environment
//! variables in the same way for every embedder.

use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use blockfall_core::{ComboRule, RuleConfig};

/// Default wait between simulation batches
pub const DEFAULT_TICK_WAIT_MS: u64 = 10;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub rules: RuleConfig,
    /// Upper bound on the wait between batches; shutdown interrupts it
    pub tick_wait: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: RuleConfig::default(),
            tick_wait: Duration::from_millis(DEFAULT_TICK_WAIT_MS),
        }
    }
}

impl EngineConfig {
    pub fn with_rules(rules: RuleConfig) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Create from environment variables
    ///
    /// Unset or unparsable values fall back to the defaults; an unset seed is taken from the
    /// system clock.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any `BLOCKFALL_*` key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let seed = parse_key(&lookup, "BLOCKFALL_SEED").unwrap_or_else(clock_seed);
        let start_level = parse_key(&lookup, "BLOCKFALL_START_LEVEL").unwrap_or(1);
        let combo_rule = lookup("BLOCKFALL_COMBO_RULE")
            .and_then(|s| ComboRule::from_str(&s))
            .unwrap_or_default();
        let line_clear_pause_ms = parse_key(&lookup, "BLOCKFALL_LINE_CLEAR_PAUSE_MS")
            .unwrap_or(RuleConfig::default().line_clear_pause_ms);
        let tick_wait_ms =
            parse_key(&lookup, "BLOCKFALL_TICK_WAIT_MS").unwrap_or(DEFAULT_TICK_WAIT_MS);

        Self {
            rules: RuleConfig {
                seed,
                start_level,
                combo_rule,
                line_clear_pause_ms,
            },
            tick_wait: Duration::from_millis(tick_wait_ms),
        }
    }
}

fn parse_key<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|s| s.trim().parse().ok())
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}
