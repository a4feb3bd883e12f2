//! Mechanics executor module
//!
//! The single background scheduler driving all live sessions:
//! - One worker task, one tick loop, fixed cadence
//! - Every tick calls `GameMechanics::tick`, the sole mutation point
//! - Explicit start/stop lifecycle so shutdown is deterministic

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::game::mechanics::GameMechanics;

/// Target tick cadence in milliseconds
pub const STEP_TIME_MS: u64 = 50;

/// The tick scheduler owning the mechanics worker task
pub struct MechanicsExecutor {
    mechanics: Arc<GameMechanics>,
    step_time_ms: u64,
    /// Current tick number
    tick: AtomicU64,
    /// Whether the worker loop is running
    running: AtomicBool,
    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,
    /// Handle of the spawned worker, joined on stop
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl MechanicsExecutor {
    /// Create an executor over the given mechanics service, using the
    /// cadence from its configuration
    pub fn new(mechanics: Arc<GameMechanics>) -> Self {
        let step_time_ms = mechanics.config().step_time_ms;
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            mechanics,
            step_time_ms,
            tick: AtomicU64::new(0),
            running: AtomicBool::new(false),
            shutdown_tx,
            worker: Mutex::new(None),
        }
    }

    /// Get the mechanics service driven by this executor
    pub fn mechanics(&self) -> &Arc<GameMechanics> {
        &self.mechanics
    }

    /// Get the current tick number
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::SeqCst)
    }

    /// Check if the worker loop is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn the worker task and start ticking.
    ///
    /// Must be called from within a tokio runtime. A second call while
    /// the worker is running is ignored.
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Mechanics executor already running");
            return;
        }

        let executor = Arc::clone(&self);
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move {
            executor.run(&mut shutdown_rx).await;
        });
        *self.worker.lock() = Some(handle);

        info!(step_time_ms = self.step_time_ms, "Mechanics executor started");
    }

    /// Signal the worker to stop and join it.
    ///
    /// Safe to call when the executor was never started.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("Mechanics executor already stopped");
            return;
        }

        // Worker may have exited on its own; a send failure is fine
        let _ = self.shutdown_tx.send(());

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Mechanics worker did not shut down cleanly");
            }
        }
    }

    /// The worker loop: tick at the configured cadence until stopped
    async fn run(&self, shutdown_rx: &mut broadcast::Receiver<()>) {
        let mut ticker = interval(Duration::from_millis(self.step_time_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.is_running() {
                        break;
                    }
                    self.process_tick();
                }
                _ = shutdown_rx.recv() => {
                    info!("Mechanics executor received shutdown signal");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!(total_ticks = self.tick(), "Mechanics executor stopped");
    }

    /// Process a single tick
    fn process_tick(&self) {
        let tick = self.tick.fetch_add(1, Ordering::SeqCst);

        // Log periodically
        if tick % 1000 == 0 {
            debug!(
                tick,
                sessions = self.mechanics.session_count(),
                "Tick milestone"
            );
        }

        self.mechanics.tick(tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MechanicsConfig;
    use crate::error::{MechanicsError, Result};
    use crate::game::rules::{NeverFinishes, PlayerAction, TurnRules};
    use crate::game::session::{GameSession, Player, SessionState};

    /// Route worker logs through the test harness
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn fast_config() -> MechanicsConfig {
        MechanicsConfig {
            step_time_ms: 5,
            ..Default::default()
        }
    }

    fn roster(nicknames: &[&str]) -> Vec<Player> {
        nicknames.iter().map(|n| Player::new(*n)).collect()
    }

    /// Rules whose update step fails for one session id
    struct BrokenFor(u64);

    impl TurnRules for BrokenFor {
        fn apply_action(&self, _: &GameSession, _: &PlayerAction) -> Result<()> {
            Ok(())
        }

        fn advance(&self, session: &GameSession, _tick: u64) -> Result<()> {
            if session.id() == self.0 {
                return Err(MechanicsError::Internal("scripted failure".into()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_executor_start_stop() {
        init_tracing();
        let mechanics = Arc::new(GameMechanics::new(fast_config()));
        mechanics.create_session(roster(&["alice", "bob"])).unwrap();

        let executor = Arc::new(MechanicsExecutor::new(Arc::clone(&mechanics)));
        assert!(!executor.is_running());

        Arc::clone(&executor).start();
        assert!(executor.is_running());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(executor.tick() > 0, "executor should have ticked");

        executor.stop().await;
        assert!(!executor.is_running());

        // Stopping again is a no-op
        executor.stop().await;
        assert!(!executor.is_running());
    }

    #[tokio::test]
    async fn test_start_twice_spawns_one_worker() {
        init_tracing();
        let mechanics = Arc::new(GameMechanics::new(fast_config()));
        let executor = Arc::new(MechanicsExecutor::new(mechanics));

        Arc::clone(&executor).start();
        Arc::clone(&executor).start();
        assert!(executor.is_running());

        executor.stop().await;
        assert!(!executor.is_running());
    }

    #[tokio::test]
    async fn test_executor_survives_failing_session() {
        init_tracing();
        let mechanics = Arc::new(GameMechanics::with_rules(
            fast_config(),
            Box::new(BrokenFor(0)),
            Box::new(NeverFinishes),
        ));
        let broken = mechanics.create_session(roster(&["alice"])).unwrap();
        let healthy = mechanics.create_session(roster(&["bob"])).unwrap();
        assert_eq!(broken, 0);

        let executor = Arc::new(MechanicsExecutor::new(Arc::clone(&mechanics)));
        Arc::clone(&executor).start();

        tokio::time::sleep(Duration::from_millis(50)).await;

        // The failing session never stopped the loop or its neighbor
        assert!(executor.is_running());
        assert!(executor.tick() > 1);
        assert_eq!(
            mechanics.session(healthy).unwrap().state(),
            SessionState::Active
        );

        executor.stop().await;
    }

    #[tokio::test]
    async fn test_executor_consumes_commands() {
        init_tracing();
        use crate::game::mechanics::SessionCommand;

        let mechanics = Arc::new(GameMechanics::new(fast_config()));
        let id = mechanics.create_session(roster(&["alice"])).unwrap();
        let session = mechanics.session(id).unwrap();

        let executor = Arc::new(MechanicsExecutor::new(Arc::clone(&mechanics)));
        Arc::clone(&executor).start();

        mechanics.submit(SessionCommand::Finish { session: id });
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(mechanics.session_count(), 0);

        executor.stop().await;
    }
}
