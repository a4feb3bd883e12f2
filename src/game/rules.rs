//! Rules contracts module
//!
//! The core does not know any concrete game. Win conditions and per-turn
//! rules are supplied by the game-rules crate through the traits below;
//! the defaults shipped here keep a backend runnable before any rules
//! exist (sessions idle along and end only on explicit request).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::session::GameSession;

/// An action submitted by a player, opaque to the core.
///
/// The payload is passed through to `TurnRules::apply_action` untouched;
/// its schema is whatever the rules crate defines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAction {
    /// Nickname of the acting player
    pub player: String,
    /// Rule-defined payload
    pub payload: serde_json::Value,
}

impl PlayerAction {
    /// Create an action for the given player
    pub fn new(player: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            player: player.into(),
            payload,
        }
    }
}

/// Win/termination policy, evaluated once per tick per session
pub trait WinPolicy: Send + Sync {
    /// Whether the session satisfies the termination condition.
    ///
    /// Must be cheap and side-effect free; the tick worker calls it
    /// every step for every active session.
    fn is_finished(&self, session: &GameSession) -> bool;
}

/// Default policy: sessions never finish on their own.
///
/// Until a real policy is injected, games end only via an explicit
/// `SessionCommand::Finish`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverFinishes;

impl WinPolicy for NeverFinishes {
    fn is_finished(&self, _session: &GameSession) -> bool {
        false
    }
}

/// Per-tick game rules: how actions and time advance a session.
///
/// Both methods are called from the tick worker only, so implementations
/// may mutate session state through the map accessors without further
/// synchronization.
pub trait TurnRules: Send + Sync {
    /// Apply one queued player action to the session.
    ///
    /// Implementations reject rule-violating actions (out of turn,
    /// illegal move) with `SessionError::ActionRejected`; the tick
    /// worker logs the rejection and moves on.
    fn apply_action(&self, session: &GameSession, action: &PlayerAction) -> Result<()>;

    /// Advance time-based rules by one tick
    fn advance(&self, session: &GameSession, tick: u64) -> Result<()>;
}

/// Default rules: actions and ticks are accepted and ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleRules;

impl TurnRules for IdleRules {
    fn apply_action(&self, _session: &GameSession, _action: &PlayerAction) -> Result<()> {
        Ok(())
    }

    fn advance(&self, _session: &GameSession, _tick: u64) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MechanicsError, SessionError};
    use crate::game::map::TacticalMap;
    use crate::game::session::Player;

    /// Rules that refuse every action
    struct StrictRules;

    impl TurnRules for StrictRules {
        fn apply_action(&self, _session: &GameSession, action: &PlayerAction) -> Result<()> {
            Err(SessionError::ActionRejected {
                player: action.player.clone(),
                reason: "not this player's turn".into(),
            }
            .into())
        }

        fn advance(&self, _session: &GameSession, _tick: u64) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_never_finishes() {
        let session =
            GameSession::new(0, vec![Player::new("alice")], TacticalMap::new(10, 10)).unwrap();
        assert!(!NeverFinishes.is_finished(&session));
    }

    #[test]
    fn test_idle_rules_accept_everything() {
        let session =
            GameSession::new(0, vec![Player::new("alice")], TacticalMap::new(10, 10)).unwrap();
        let action = PlayerAction::new("alice", serde_json::json!({ "move": "north" }));
        assert!(IdleRules.apply_action(&session, &action).is_ok());
        assert!(IdleRules.advance(&session, 0).is_ok());
    }

    #[test]
    fn test_rejected_action_names_player_and_reason() {
        let session =
            GameSession::new(0, vec![Player::new("alice")], TacticalMap::new(10, 10)).unwrap();
        let action = PlayerAction::new("bob", serde_json::Value::Null);

        let err = StrictRules.apply_action(&session, &action).unwrap_err();
        match err {
            MechanicsError::Session(SessionError::ActionRejected { player, reason }) => {
                assert_eq!(player, "bob");
                assert_eq!(reason, "not this player's turn");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_player_action_round_trips_through_json() {
        let action = PlayerAction::new("bob", serde_json::json!({ "attack": 3 }));
        let text = serde_json::to_string(&action).unwrap();
        let back: PlayerAction = serde_json::from_str(&text).unwrap();
        assert_eq!(back.player, "bob");
        assert_eq!(back.payload["attack"], 3);
    }
}
