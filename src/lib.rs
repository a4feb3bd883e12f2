//! Tactica Mechanics Library
//!
//! This library provides the game-session and entity mechanics core for
//! the Tactica multiplayer backend. The HTTP layer (controllers, session
//! cookies, user accounts) lives in a separate crate and consumes this
//! one; everything here is transport-agnostic.
//!
//! ## Modules
//!
//! - `config` - Mechanics configuration management
//! - `error` - Error types and result definitions
//! - `game` - Sessions, entities, and the tick scheduler

pub mod config;
pub mod error;
pub mod game;

// Re-export commonly used types
pub use config::MechanicsConfig;
pub use error::{MechanicsError, Result};
pub use game::executor::MechanicsExecutor;
pub use game::mechanics::{GameMechanics, SessionCommand};
pub use game::session::GameSession;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
