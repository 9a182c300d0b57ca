//! Engine shell tests - threaded simulation, input edges and serialized snapshots

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use blockfall::core::{ComboRule, RuleConfig};
use blockfall::engine::{Engine, EngineConfig};
use blockfall::types::{Intent, VISIBLE_HEIGHT};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(seed: u32) -> EngineConfig {
    EngineConfig {
        rules: RuleConfig {
            seed,
            combo_rule: ComboRule::Scaled,
            ..RuleConfig::default()
        },
        tick_wait: Duration::from_millis(2),
    }
}

fn eventually(engine: &Engine, mut cond: impl FnMut(&Engine) -> Result<bool>) -> Result<bool> {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if cond(engine)? {
            return Ok(true);
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond(engine)
}

#[test]
fn test_snapshot_serializes_to_json() -> Result<()> {
    init_logger();
    let engine = Engine::start(config(11))?;
    let snapshot = engine.snapshot(true)?;

    let value = serde_json::to_value(&snapshot)?;
    assert_eq!(value["score"], 0);
    assert_eq!(value["level"], 1);
    assert_eq!(value["game_over"], false);
    assert_eq!(value["board"].as_array().map(Vec::len), Some(VISIBLE_HEIGHT));
    assert_eq!(value["next"].as_array().map(Vec::len), Some(4));
    assert!(value["active"].is_object());

    engine.stop()
}

#[test]
fn test_pieces_fall_under_gravity() -> Result<()> {
    init_logger();
    let engine = Engine::start(config(12))?;
    let start_y = engine.snapshot(false)?.active.map(|a| a.y);

    // Level 1 gravity moves one row per second.
    let fell = eventually(&engine, |e| {
        Ok(e.snapshot(false)?.active.map(|a| a.y) != start_y)
    })?;
    assert!(fell);
    engine.stop()
}

#[test]
fn test_hold_through_engine() -> Result<()> {
    init_logger();
    let engine = Engine::start(config(13))?;
    let first = engine.snapshot(false)?.active.map(|a| a.kind);

    engine.press(Intent::Hold)?;
    engine.release(Intent::Hold)?;

    let held = eventually(&engine, |e| Ok(e.snapshot(false)?.hold.is_some()))?;
    assert!(held);
    let snapshot = engine.snapshot(false)?;
    assert_eq!(snapshot.hold, first);
    assert!(!snapshot.can_hold);
    engine.stop()
}

#[test]
fn test_engine_drop_stops_the_thread() -> Result<()> {
    init_logger();
    let engine = Engine::start(config(14))?;
    assert!(engine.is_running());
    drop(engine);
    Ok(())
}
