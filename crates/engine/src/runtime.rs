//! Engine runtime.
//!
//! Runs the simulation on a dedicated thread and shares the game state with callers through one
//! mutex. The simulation holds the lock for a whole tick batch; callers hold it for one input
//! edge or one snapshot copy.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};

use blockfall_core::{GameSnapshot, GameState};
use blockfall_types::Intent;

use crate::config::EngineConfig;

/// Running engine instance.
pub struct Engine {
    state: Arc<Mutex<GameState>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    worker: Option<JoinHandle<Result<()>>>,
}

impl Engine {
    /// Build the game state and start the simulation thread.
    pub fn start(config: EngineConfig) -> Result<Self> {
        let seed = config.rules.seed;
        let state = Arc::new(Mutex::new(GameState::with_rules(config.rules)));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let shared = Arc::clone(&state);
        let tick_wait = config.tick_wait;
        let worker = thread::Builder::new()
            .name("blockfall-sim".to_string())
            .spawn(move || run_simulation(shared, shutdown_rx, tick_wait))
            .context("failed to spawn simulation thread")?;

        info!("engine started (seed {}, tick wait {:?})", seed, tick_wait);
        Ok(Self {
            state,
            shutdown_tx: Some(shutdown_tx),
            worker: Some(worker),
        })
    }

    /// Run `f` with exclusive access to the game state.
    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> Result<R> {
        let mut guard = self.state.lock().map_err(|_| {
            error!("game state lock poisoned");
            anyhow!("game state lock poisoned")
        })?;
        Ok(f(&mut guard))
    }

    /// Read the game state under the lock. Mutation goes through input edges only.
    pub fn read_state<R>(&self, f: impl FnOnce(&GameState) -> R) -> Result<R> {
        self.with_state(|state| f(state))
    }

    pub fn press(&self, intent: Intent) -> Result<()> {
        self.with_state(|state| state.press(intent))
            .with_context(|| format!("press {:?}", intent))
    }

    pub fn release(&self, intent: Intent) -> Result<()> {
        self.with_state(|state| state.release(intent))
            .with_context(|| format!("release {:?}", intent))
    }

    pub fn set_camera_axes(&self, x: f32, y: f32) -> Result<()> {
        self.with_state(|state| state.set_camera_axes(x, y))
    }

    /// Copy out everything a renderer needs.
    pub fn snapshot(&self, include_ghost: bool) -> Result<GameSnapshot> {
        self.with_state(|state| state.snapshot(include_ghost))
            .context("snapshot")
    }

    /// Whether the simulation thread is still running.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map_or(false, |worker| !worker.is_finished())
    }

    /// Signal shutdown and wait for the simulation thread.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The thread may already be gone; a closed channel stops it just the same.
            let _ = tx.send(());
        }
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let outcome = worker
            .join()
            .map_err(|_| anyhow!("simulation thread panicked"))?;
        info!("engine stopped");
        outcome.context("simulation thread failed")
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!("engine shutdown: {:#}", err);
        }
    }
}

/// Simulation loop: wait up to `tick_wait` for a shutdown signal, then run one tick batch with
/// the wall-clock time elapsed since the previous batch.
fn run_simulation(
    state: Arc<Mutex<GameState>>,
    shutdown_rx: mpsc::Receiver<()>,
    tick_wait: Duration,
) -> Result<()> {
    let mut last = Instant::now();
    loop {
        match shutdown_rx.recv_timeout(tick_wait) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64();
        last = now;

        let mut game = state.lock().map_err(|_| {
            error!("game state lock poisoned; stopping simulation");
            anyhow!("game state lock poisoned")
        })?;
        let summary = game.tick(elapsed);
        if summary.clear_finished {
            debug!("line clear finished at {:.3}s", game.clock());
        }
    }
    debug!("simulation loop exited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall_core::RuleConfig;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn test_config(seed: u32) -> EngineConfig {
        EngineConfig {
            rules: RuleConfig {
                seed,
                line_clear_pause_ms: 0,
                ..RuleConfig::default()
            },
            tick_wait: Duration::from_millis(2),
        }
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        cond()
    }

    #[test]
    fn test_start_and_stop() {
        init_logger();
        let engine = Engine::start(test_config(1)).unwrap();
        assert!(engine.is_running());
        engine.stop().unwrap();
    }

    #[test]
    fn test_hard_drop_through_engine() {
        init_logger();
        let engine = Engine::start(test_config(2)).unwrap();
        engine.press(Intent::HardDrop).unwrap();
        engine.release(Intent::HardDrop).unwrap();

        assert!(wait_until(|| engine.snapshot(false).unwrap().score > 0));
        let snap = engine.snapshot(true).unwrap();
        assert!(!snap.game_over);
        engine.stop().unwrap();
    }

    #[test]
    fn test_clock_advances() {
        init_logger();
        let engine = Engine::start(test_config(3)).unwrap();
        assert!(wait_until(|| engine.snapshot(false).unwrap().clock > 0.02));
    }

    #[test]
    fn test_camera_axes_reach_snapshot() {
        init_logger();
        let engine = Engine::start(test_config(4)).unwrap();
        engine.set_camera_axes(0.25, -0.5).unwrap();
        let snap = engine.snapshot(false).unwrap();
        assert_eq!((snap.camera.x, snap.camera.y), (0.25, -0.5));
    }

    #[test]
    fn test_read_state_sees_input_applied_by_the_simulation() {
        init_logger();
        let engine = Engine::start(test_config(6)).unwrap();
        assert_eq!(engine.read_state(|state| state.board().filled_count()).unwrap(), 0);

        engine.press(Intent::HardDrop).unwrap();
        assert!(wait_until(|| {
            engine
                .read_state(|state| state.board().filled_count() == 4)
                .unwrap()
        }));
        let consistent = engine.read_state(GameState::is_consistent).unwrap();
        assert!(consistent);
        engine.stop().unwrap();
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        init_logger();
        let engine = Engine::start(test_config(5)).unwrap();
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = engine.with_state(|_| panic!("poison the lock"));
        }));
        assert!(poisoned.is_err());

        assert!(engine.snapshot(false).is_err());
        assert!(wait_until(|| !engine.is_running()));
        assert!(engine.stop().is_err());
    }
}
