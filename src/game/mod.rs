//! Game module
//!
//! This module contains the core mechanics for the Tactica backend:
//! - Identity generation for sessions and objects
//! - Game objects and their capability parts
//! - Tactical map board state
//! - Session lifecycle and turn rotation
//! - Pluggable rules contracts (win policy, turn rules)
//! - The tick scheduler driving all live sessions

pub mod executor;
pub mod id;
pub mod map;
pub mod mechanics;
pub mod object;
pub mod rules;
pub mod session;
