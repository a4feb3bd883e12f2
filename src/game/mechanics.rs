//! Game mechanics service
//!
//! Owns the live session registry, the identity generators, the rules
//! collaborators, and the command queue feeding the tick worker. This is
//! the surface the API layer calls.
//!
//! Single-writer discipline: once the scheduler runs, all session and
//! entity mutation happens inside `tick`, which only the
//! `MechanicsExecutor` drives. Collaborators submit `SessionCommand`s
//! instead of touching sessions directly; roster reads, part getters,
//! and map snapshots are safe from any thread.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::MechanicsConfig;
use crate::error::{Result, SessionError};
use crate::game::id::{IdGenerator, SessionId};
use crate::game::map::TacticalMap;
use crate::game::object::GameObject;
use crate::game::rules::{IdleRules, NeverFinishes, PlayerAction, TurnRules, WinPolicy};
use crate::game::session::{GameSession, Player};

/// A request for the tick worker to mutate game state.
///
/// Submitted from any thread via `GameMechanics::submit`; consumed on
/// the next tick.
#[derive(Debug)]
pub enum SessionCommand {
    /// Apply a player action through the turn rules
    Action {
        session: SessionId,
        action: PlayerAction,
    },
    /// Force the session into the Finished state
    Finish { session: SessionId },
    /// Replace the session's map wholesale
    ReplaceMap {
        session: SessionId,
        map: TacticalMap,
    },
}

/// The mechanics service owning all live sessions
pub struct GameMechanics {
    config: MechanicsConfig,
    sessions: DashMap<SessionId, Arc<GameSession>>,
    session_ids: IdGenerator,
    object_ids: IdGenerator,
    rules: Box<dyn TurnRules>,
    policy: Box<dyn WinPolicy>,
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    /// Drained only by the tick worker
    command_rx: Mutex<mpsc::UnboundedReceiver<SessionCommand>>,
}

impl GameMechanics {
    /// Create a mechanics service with the default (no-op) rules and the
    /// never-finishing win policy
    pub fn new(config: MechanicsConfig) -> Self {
        Self::with_rules(config, Box::new(IdleRules), Box::new(NeverFinishes))
    }

    /// Create a mechanics service with injected rules collaborators
    pub fn with_rules(
        config: MechanicsConfig,
        rules: Box<dyn TurnRules>,
        policy: Box<dyn WinPolicy>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        Self {
            config,
            sessions: DashMap::new(),
            session_ids: IdGenerator::new(),
            object_ids: IdGenerator::new(),
            rules,
            policy,
            command_tx,
            command_rx: Mutex::new(command_rx),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &MechanicsConfig {
        &self.config
    }

    /// Start a match for the given roster.
    ///
    /// Assigns a fresh unique session id and a fresh map sized from the
    /// configuration. Fails if the roster is empty.
    pub fn create_session(&self, players: Vec<Player>) -> Result<SessionId> {
        let id = self.session_ids.next_id();
        let map = TacticalMap::new(self.config.map_width, self.config.map_height);
        let session = Arc::new(GameSession::new(id, players, map)?);

        info!(
            session_id = id,
            players = session.players().len(),
            "Session registered"
        );
        self.sessions.insert(id, session);
        Ok(id)
    }

    /// Look up a live session
    pub fn session(&self, id: SessionId) -> Result<Arc<GameSession>> {
        self.sessions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SessionError::NotFound(id).into())
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The nickname following `current` in the session's turn order.
    ///
    /// See `GameSession::next_player` for the wrap-around and
    /// unknown-nickname contract.
    pub fn next_player(&self, session: SessionId, current: &str) -> Result<String> {
        Ok(self.session(session)?.next_player(current).nickname.clone())
    }

    /// Run `f` against a snapshot of the session's map
    pub fn with_map<R>(&self, session: SessionId, f: impl FnOnce(&TacticalMap) -> R) -> Result<R> {
        let session = self.session(session)?;
        let map = session.map();
        Ok(f(&map))
    }

    /// Replace a session's map.
    ///
    /// Direct replacement is meant for setup, before the scheduler
    /// drives the session; afterwards submit
    /// `SessionCommand::ReplaceMap` instead.
    pub fn set_map(&self, session: SessionId, map: TacticalMap) -> Result<()> {
        self.session(session)?.set_map(map);
        Ok(())
    }

    /// Mint a new entity with a fresh unique id.
    ///
    /// Parts are attached on the object itself before it is placed on a
    /// session's map.
    pub fn create_object(&self) -> GameObject {
        GameObject::new(self.object_ids.next_id())
    }

    /// Queue a command for the next tick
    pub fn submit(&self, command: SessionCommand) {
        if self.command_tx.send(command).is_err() {
            // Receiver lives as long as self; send can only fail during teardown
            warn!("Command dropped: mechanics service is shutting down");
        }
    }

    /// Advance every live session by one step.
    ///
    /// Called only by the `MechanicsExecutor` worker. Order per tick:
    /// drain queued commands, advance time-based rules, evaluate the win
    /// policy, then terminate and drop sessions that are done. A failure
    /// in one session is logged and never stops the tick or the other
    /// sessions.
    pub fn tick(&self, tick: u64) {
        self.drain_commands();
        self.advance_sessions(tick);
        self.reap_sessions();
    }

    /// Consume every command queued since the previous tick
    fn drain_commands(&self) {
        let mut rx = self.command_rx.lock();
        while let Ok(command) = rx.try_recv() {
            if let Err(e) = self.apply_command(command) {
                error!(error = %e, "Command failed");
            }
        }
    }

    fn apply_command(&self, command: SessionCommand) -> Result<()> {
        match command {
            SessionCommand::Action { session, action } => {
                let session = self.session(session)?;
                if !session.has_player(&action.player) {
                    return Err(SessionError::PlayerNotInSession {
                        session: session.id(),
                        player: action.player,
                    }
                    .into());
                }
                if !session.state().is_active() {
                    warn!(
                        session_id = session.id(),
                        player = %action.player,
                        "Action dropped: session is no longer active"
                    );
                    return Ok(());
                }
                self.rules.apply_action(&session, &action)
            }
            SessionCommand::Finish { session } => {
                self.session(session)?.set_finished();
                Ok(())
            }
            SessionCommand::ReplaceMap { session, map } => {
                self.session(session)?.set_map(map);
                Ok(())
            }
        }
    }

    /// Advance time-based rules and evaluate the win policy
    fn advance_sessions(&self, tick: u64) {
        for entry in self.sessions.iter() {
            let session = entry.value();
            if !session.state().is_active() {
                continue;
            }
            if let Err(e) = self.rules.advance(session, tick) {
                error!(
                    session_id = session.id(),
                    error = %e,
                    "Session update step failed"
                );
                continue;
            }
            session.try_finish_game(self.policy.as_ref());
        }
    }

    /// Terminate and drop sessions that left the Active state
    fn reap_sessions(&self) {
        let done: Vec<Arc<GameSession>> = self
            .sessions
            .iter()
            .filter(|entry| !entry.value().state().is_active())
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for session in done {
            session.terminate();
            self.sessions.remove(&session.id());
            info!(session_id = session.id(), "Session terminated and removed");
        }
    }
}

impl std::fmt::Debug for GameMechanics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameMechanics")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
