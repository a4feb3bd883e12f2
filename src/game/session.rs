//! Game session module
//!
//! Manages one in-progress match:
//! - Fixed, ordered player roster (roster position defines turn order)
//! - The session's tactical map
//! - Lifecycle state machine (Active -> Finished -> Terminated)
//!
//! Fields behind locks are mutated only by the tick worker once the
//! scheduler runs; readers on other threads observe the state from
//! between ticks.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::game::id::{ObjectId, SessionId};
use crate::game::map::TacticalMap;
use crate::game::rules::WinPolicy;

/// A participant in a session. Roster position defines turn order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Nickname used to address the player, unique within the session
    pub nickname: String,
    /// Board entity controlled by this player, once one is placed
    pub object: Option<ObjectId>,
}

impl Player {
    /// Create a player with no board entity yet
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            object: None,
        }
    }

    /// Create a player linked to a board entity
    pub fn with_object(nickname: impl Into<String>, object: ObjectId) -> Self {
        Self {
            nickname: nickname.into(),
            object: Some(object),
        }
    }
}

/// Session state in the match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Match in progress - the tick worker advances it every step
    Active,
    /// Match over - awaiting resource release by the tick worker
    Finished,
    /// Resources released - terminal state
    Terminated,
}

impl SessionState {
    /// Check if the session is still being advanced by the tick worker
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }

    /// Get a human-readable name for the state
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Active => "Active",
            SessionState::Finished => "Finished",
            SessionState::Terminated => "Terminated",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One in-progress match
pub struct GameSession {
    /// Unique session identifier, assigned at construction
    id: SessionId,
    /// Ordered roster, fixed for the session's lifetime
    players: Vec<Player>,
    /// Board state owned by this session
    map: RwLock<TacticalMap>,
    /// Lifecycle state
    state: RwLock<SessionState>,
}

impl GameSession {
    /// Create a session over a fresh map.
    ///
    /// The roster must contain at least one player; turn operations have
    /// no meaning otherwise.
    pub fn new(
        id: SessionId,
        players: Vec<Player>,
        map: TacticalMap,
    ) -> Result<Self, SessionError> {
        if players.is_empty() {
            return Err(SessionError::EmptyRoster);
        }

        debug!(session_id = id, players = players.len(), "Session created");

        Ok(Self {
            id,
            players,
            map: RwLock::new(map),
            state: RwLock::new(SessionState::Active),
        })
    }

    /// Get the session's immutable identity
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Read-only view of the roster, in turn order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Whether `nickname` is in the roster
    pub fn has_player(&self, nickname: &str) -> bool {
        self.players.iter().any(|p| p.nickname == nickname)
    }

    /// The player whose turn follows `current` in roster order.
    ///
    /// Scans the roster from the front for the first nickname equal to
    /// `current`; a match at the last position wraps around to the first
    /// player. An unrecognized nickname also yields the first player
    /// rather than an error - callers that need strict membership must
    /// check `has_player` first. This fallback is part of the contract
    /// relied on by the turn-order layer; do not tighten it here.
    pub fn next_player(&self, current: &str) -> &Player {
        if let Some(i) = self.players.iter().position(|p| p.nickname == current) {
            if i + 1 < self.players.len() {
                return &self.players[i + 1];
            }
        }
        &self.players[0]
    }

    /// Read access to the map
    pub fn map(&self) -> RwLockReadGuard<'_, TacticalMap> {
        self.map.read()
    }

    /// Write access to the map. Tick worker only once the scheduler runs.
    pub fn map_mut(&self) -> RwLockWriteGuard<'_, TacticalMap> {
        self.map.write()
    }

    /// Replace the map wholesale. No validation of map content.
    pub fn set_map(&self, map: TacticalMap) {
        *self.map.write() = map;
    }

    /// Get the current lifecycle state
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Set the lifecycle state
    fn set_state(&self, new_state: SessionState) {
        let mut state = self.state.write();
        let old_state = *state;
        *state = new_state;
        debug!(
            session_id = self.id,
            old_state = %old_state,
            new_state = %new_state,
            "Session state changed"
        );
    }

    /// Evaluate the win policy and finish the session if it is satisfied.
    ///
    /// Idempotent and callable every tick; returns whether the session
    /// transitioned to Finished on this call.
    pub fn try_finish_game(&self, policy: &dyn WinPolicy) -> bool {
        if self.state() != SessionState::Active {
            return false;
        }
        if !policy.is_finished(self) {
            return false;
        }
        self.set_state(SessionState::Finished);
        info!(session_id = self.id, "Session finished by win policy");
        true
    }

    /// Force the session into the Finished state.
    ///
    /// Idempotent; has no effect on a session that is already Finished
    /// or Terminated.
    pub fn set_finished(&self) {
        if self.state() != SessionState::Active {
            return;
        }
        self.set_state(SessionState::Finished);
    }

    /// Release the session's resources.
    ///
    /// Takes effect once, on a Finished session: clears the map's object
    /// registry and moves to the terminal Terminated state. Subsequent
    /// calls are no-ops. Runs before the session is dropped from the
    /// live set.
    pub fn terminate(&self) {
        match self.state() {
            SessionState::Active => {
                warn!(
                    session_id = self.id,
                    "terminate called on an active session; finish it first"
                );
            }
            SessionState::Finished => {
                self.map.write().clear();
                self.set_state(SessionState::Terminated);
            }
            SessionState::Terminated => {}
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("players", &self.players.len())
            .field("state", &self.state())
            .finish()
    }
}
