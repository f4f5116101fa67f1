//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! by the arena binary and anything else that drives the engine crates.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`ARENA_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! ARENA_<SECTION>_<KEY>=value
//!
//! Examples:
//!     ARENA_COMMON_DATA_DIR=/data
//!     ARENA_COMMON_SEED=7
//!     ARENA_GAME_BOARD_WIDTH=8
//!     ARENA_MCTS_BACKUP=per_node_mover
//!     ARENA_ARENA_OPPONENT_ITERATIONS=16,64,256
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_PATH_ENV, CONFIG_SEARCH_PATHS,
};
pub use structs::*;

#[cfg(test)]
mod tests;
