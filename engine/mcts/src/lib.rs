//! Monte Carlo Tree Search (MCTS) opponent for two-player games.
//!
//! This crate provides a game-agnostic UCT search that works with any game
//! implementing the `engine-core` [`Game`](engine_core::Game) trait. It only
//! ever clones states, applies moves and asks queries, so the engine's
//! internals stay private.
//!
//! # Overview
//!
//! Each simulation round consists of four phases:
//!
//! 1. **Selection**: Starting at the root, descend through fully expanded
//!    nodes to the child with the highest UCT score
//!    `mean + sqrt(2 ln N_parent / N)`; ties go to the later child
//! 2. **Expansion**: Materialize one untried move, chosen uniformly at random
//! 3. **Rollout**: Play uniformly random legal moves until the game ends
//! 4. **Backpropagation**: Credit the terminal score to every node on the
//!    path (see [`BackupMode`])
//!
//! After the budget is spent the root child with the best mean value wins.
//!
//! # Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use games_connect4::{Connect4, Game};
//! use mcts::select_move;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! let mut state = Connect4::standard();
//! for column in [3, 0, 3, 0, 3, 0] {
//!     state.apply_move(column).unwrap();
//! }
//!
//! let mut rng = ChaCha20Rng::seed_from_u64(42);
//! let result = select_move(&state, 400, Duration::from_secs(5), &mut rng).unwrap();
//! assert_eq!(result.best_move, 3);
//! ```
//!
//! # Configuration
//!
//! The [`MctsConfig`] struct controls search behavior:
//!
//! - `max_iterations`: Simulation rounds per search (default: 128)
//! - `time_budget`: Wall-clock budget checked after each round (default: 1s)
//! - `backup`: Backpropagation convention (default: expansion perspective)
//!
//! # Architecture
//!
//! ```text
//! +-----------------------------------------------+
//! |                  MctsSearch                   |
//! |  +-------------+            +--------------+  |
//! |  |  MctsTree   |            |  Game state  |  |
//! |  |  (arena)    |            |  (clones)    |  |
//! |  +------+------+            +------+-------+  |
//! |         |                          |          |
//! |         v                          v          |
//! |  select -> expand -> rollout -> backpropagate |
//! +-----------------------------------------------+
//! ```

pub mod config;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{BackupMode, MctsConfig};
pub use node::{MctsNode, NodeId};
pub use search::{
    run_mcts, select_move, ChildStats, MctsSearch, SearchError, SearchResult, SearchStats,
};
pub use tree::{MctsTree, TreeStats};
