//! Error handling module
//!
//! Defines custom error types for the mechanics core.

use thiserror::Error;

use crate::game::id::{ObjectId, SessionId};

/// Main error type for the mechanics core
#[derive(Error, Debug)]
pub enum MechanicsError {
    /// Session-related errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Entity-related errors
    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Session-specific errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("A session requires at least one player")]
    EmptyRoster,

    #[error("Player {player} is not in session {session}")]
    PlayerNotInSession { session: SessionId, player: String },

    #[error("Rules rejected action from {player}: {reason}")]
    ActionRejected { player: String, reason: String },
}

/// Entity-specific errors
#[derive(Error, Debug)]
pub enum EntityError {
    /// A `claim_part` precondition failure. Callers that can handle
    /// absence should use `get_part` instead, which returns an `Option`.
    #[error("Object {object} has no part of type {part}")]
    PartMissing { object: ObjectId, part: &'static str },
}

/// Result type alias for mechanics operations
pub type Result<T> = std::result::Result<T, MechanicsError>;
