//! MCTS search implementation.
//!
//! Implements plain UCT with random rollouts:
//! 1. Selection: descend fully expanded nodes by UCT score
//! 2. Expansion: materialize one untried move, picked uniformly at random
//! 3. Rollout: play uniformly random legal moves to a terminal state
//! 4. Backpropagation: credit the terminal score along the path to the root

use std::time::{Duration, Instant};

use engine_core::{Game, MoveError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

use crate::config::{BackupMode, MctsConfig};
use crate::node::NodeId;
use crate::tree::{MctsTree, TreeStats};

/// Errors that can occur during MCTS search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("Invalid MCTS configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Cannot search from a terminal state")]
    TerminalState,

    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Engine error: {0}")]
    Engine(#[from] MoveError),
}

/// Visit statistics for one root child.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildStats<M> {
    pub mv: M,
    pub visits: u32,
    pub mean_value: f64,
}

/// Diagnostics for a completed search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStats {
    /// Simulation rounds actually performed
    pub iterations: u32,
    /// Random moves played across all rollouts
    pub rollout_moves: u64,
    pub elapsed: Duration,
    /// Whether the time budget ended the search before `max_iterations`
    pub timed_out: bool,
    pub tree: TreeStats,
}

/// Result of an MCTS search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<M> {
    /// Root child with the highest mean value
    pub best_move: M,

    /// Mean value of the chosen child, from its mover's perspective
    pub value: f64,

    /// Root children in expansion order
    pub children: Vec<ChildStats<M>>,

    pub stats: SearchStats,
}

/// MCTS search state.
pub struct MctsSearch<G: Game> {
    tree: MctsTree<G>,
    config: MctsConfig,
    rollout_moves: u64,
}

impl<G: Game> MctsSearch<G> {
    /// Create a new MCTS search from the given game state.
    pub fn new(state: G, config: MctsConfig) -> Result<Self, SearchError> {
        config.validate()?;
        if state.is_terminal() {
            return Err(SearchError::TerminalState);
        }

        Ok(Self {
            tree: MctsTree::new(state),
            config,
            rollout_moves: 0,
        })
    }

    /// Run the search until the iteration cap or the time budget is reached.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<SearchResult<G::Move>, SearchError> {
        let start = Instant::now();
        let mut iterations = 0;
        let mut timed_out = false;

        while iterations < self.config.max_iterations {
            self.simulate(rng)?;
            iterations += 1;

            if start.elapsed() >= self.config.time_budget {
                timed_out = iterations < self.config.max_iterations;
                break;
            }
        }

        let best_id = self.tree.best_child().ok_or(SearchError::NoLegalMoves)?;
        let best = self.tree.get(best_id);
        let best_move = best.move_taken.ok_or(SearchError::NoLegalMoves)?;

        let children = self
            .tree
            .get(self.tree.root())
            .children
            .iter()
            .filter_map(|&id| {
                let child = self.tree.get(id);
                child.move_taken.map(|mv| ChildStats {
                    mv,
                    visits: child.visit_count,
                    mean_value: child.mean_value(),
                })
            })
            .collect();

        let stats = SearchStats {
            iterations,
            rollout_moves: self.rollout_moves,
            elapsed: start.elapsed(),
            timed_out,
            tree: self.tree.stats(),
        };

        trace!(
            best_move = ?best_move,
            value = best.mean_value(),
            iterations,
            nodes = stats.tree.total_nodes,
            timed_out,
            "MCTS search complete"
        );

        Ok(SearchResult {
            best_move,
            value: best.mean_value(),
            children,
            stats,
        })
    }

    /// Run a single simulation (select -> expand -> rollout -> backpropagate).
    fn simulate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SearchError> {
        let leaf_id = self.select();
        let node_id = self.expand(leaf_id, rng)?;

        let mut state = self.tree.get(node_id).state.clone();
        let moves = self.rollout(&mut state, rng)?;
        self.rollout_moves += moves;

        match self.config.backup {
            BackupMode::ExpansionPerspective => {
                let value = state.score(self.tree.get(node_id).mover);
                self.tree.backpropagate(node_id, value);
            }
            BackupMode::PerNodeMover => {
                self.tree
                    .backpropagate_with(node_id, |node| state.score(node.mover));
            }
        }

        Ok(())
    }

    /// Descend while the current node is fully expanded and has children.
    fn select(&self) -> NodeId {
        let mut current = self.tree.root();
        loop {
            let node = self.tree.get(current);
            if !node.is_fully_expanded() || node.is_leaf() {
                return current;
            }
            match self.tree.select_child(current) {
                Some(child_id) => current = child_id,
                None => return current,
            }
        }
    }

    /// Expand one random untried move of `node_id`, returning the new child.
    /// Terminal nodes have no untried moves and are returned unchanged.
    fn expand<R: Rng + ?Sized>(
        &mut self,
        node_id: NodeId,
        rng: &mut R,
    ) -> Result<NodeId, SearchError> {
        let node = self.tree.get_mut(node_id);
        if node.untried_moves.is_empty() {
            return Ok(node_id);
        }

        let index = rng.gen_range(0..node.untried_moves.len());
        let mv = node.untried_moves.swap_remove(index);
        let mut state = node.state.clone();
        state.apply_move(mv)?;

        Ok(self.tree.add_child(node_id, mv, state))
    }

    /// Play uniformly random legal moves until the game ends.
    fn rollout<R: Rng + ?Sized>(&self, state: &mut G, rng: &mut R) -> Result<u64, SearchError> {
        let mut moves = 0;
        while let Some(&mv) = state.legal_moves().choose(rng) {
            state.apply_move(mv)?;
            moves += 1;
        }
        Ok(moves)
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &MctsTree<G> {
        &self.tree
    }
}

/// Pick a move for the side to move in `state`.
///
/// Runs up to `max_iterations` rounds, stopping early once `time_budget` has
/// elapsed. `state` must be non-terminal.
pub fn select_move<G: Game, R: Rng + ?Sized>(
    state: &G,
    max_iterations: u32,
    time_budget: Duration,
    rng: &mut R,
) -> Result<SearchResult<G::Move>, SearchError> {
    let config = MctsConfig::default()
        .with_iterations(max_iterations)
        .with_time_budget(time_budget);
    run_mcts(state, config, rng)
}

/// Convenience function to run a single MCTS search with a full config.
pub fn run_mcts<G: Game, R: Rng + ?Sized>(
    state: &G,
    config: MctsConfig,
    rng: &mut R,
) -> Result<SearchResult<G::Move>, SearchError> {
    let mut search = MctsSearch::new(state.clone(), config)?;
    search.run(rng)
}
