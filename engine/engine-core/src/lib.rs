//! Core traits and types for the arena game engine
//!
//! This crate provides the narrow interface that search and orchestration
//! code use to drive a game:
//! - `Game`: clone / move / query trait for two-player, perfect-information games
//! - `Player`: the two seats, addressed as 0 and 1
//! - `GameOutcome`: how a finished game ended
//! - `MoveError`: illegal move rejections

pub mod error;
pub mod game;
pub mod player;

// Re-export main types for convenience
pub use error::MoveError;
pub use game::{Game, GameOutcome};
pub use player::Player;
