//! Move selection agents for arena episodes

use anyhow::{anyhow, Result};
use games_connect4::{Connect4, Game};
use mcts::{run_mcts, MctsConfig};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;
use tracing::trace;

use crate::config::Config;

/// Elo identifier of the agent under evaluation.
pub const CANDIDATE_NAME: &str = "candidate";

/// Elo identifier of the uniform random opponent.
pub const RANDOM_NAME: &str = "random";

/// Trait for move selection agents.
///
/// Agents are shared between workers, so any per-game randomness comes from
/// the caller's generator.
pub trait Agent: Send + Sync {
    /// Identifier used for Elo ratings and bandit arm labels.
    fn name(&self) -> &str;

    /// Pick a column for the side to move in `state`.
    fn select_move(&self, state: &Connect4, rng: &mut ChaCha20Rng) -> Result<usize>;
}

/// Agent that plays a uniformly random legal column.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    name: String,
}

impl RandomAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&self, state: &Connect4, rng: &mut ChaCha20Rng) -> Result<usize> {
        state
            .legal_moves()
            .choose(rng)
            .copied()
            .ok_or_else(|| anyhow!("{} has no legal moves", self.name))
    }
}

/// Agent that runs a fresh MCTS search for every move.
#[derive(Debug, Clone)]
pub struct MctsAgent {
    name: String,
    config: MctsConfig,
}

impl MctsAgent {
    pub fn new(name: impl Into<String>, config: MctsConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }
}

impl Agent for MctsAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&self, state: &Connect4, rng: &mut ChaCha20Rng) -> Result<usize> {
        let result = run_mcts(state, self.config.clone(), rng)?;
        trace!(
            agent = %self.name,
            column = result.best_move,
            value = result.value,
            iterations = result.stats.iterations,
            "Agent selected move"
        );
        Ok(result.best_move)
    }
}

/// The agent under evaluation.
pub fn build_candidate(config: &Config) -> Result<Arc<dyn Agent>> {
    let mcts_config = config.mcts_config(config.candidate_iterations)?;
    Ok(Arc::new(MctsAgent::new(CANDIDATE_NAME, mcts_config)))
}

/// Opponent pool in bandit arm order: one MCTS agent per configured budget,
/// then the random agent if enabled.
pub fn build_opponents(config: &Config) -> Result<Vec<Arc<dyn Agent>>> {
    let mut opponents: Vec<Arc<dyn Agent>> = Vec::new();
    for &iterations in &config.opponent_iterations {
        let mcts_config = config.mcts_config(iterations)?;
        opponents.push(Arc::new(MctsAgent::new(
            format!("mcts-{}", iterations),
            mcts_config,
        )));
    }
    if config.include_random {
        opponents.push(Arc::new(RandomAgent::new(RANDOM_NAME)));
    }
    if opponents.is_empty() {
        return Err(anyhow!("opponent pool is empty"));
    }
    Ok(opponents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::base_config;
    use rand::SeedableRng;

    #[test]
    fn random_agent_plays_legal_columns() {
        let agent = RandomAgent::new("r");
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut state = Connect4::standard();
        // Fill column 0 so it can never be chosen
        for _ in 0..6 {
            state.apply_move(0).unwrap();
        }
        for _ in 0..50 {
            let column = agent.select_move(&state, &mut rng).unwrap();
            assert!(state.is_valid_move(column));
            assert_ne!(column, 0);
        }
    }

    #[test]
    fn random_agent_fails_on_finished_game() {
        let agent = RandomAgent::new("r");
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mut state = Connect4::standard();
        for column in [3, 0, 3, 0, 3, 0, 3] {
            state.apply_move(column).unwrap();
        }
        let err = agent.select_move(&state, &mut rng).unwrap_err();
        assert!(err.to_string().contains("no legal moves"));
    }

    #[test]
    fn mcts_agent_completes_vertical_four() {
        let agent = MctsAgent::new("m", MctsConfig::for_testing().with_iterations(300));
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let mut state = Connect4::standard();
        for column in [3, 0, 3, 0, 3, 0] {
            state.apply_move(column).unwrap();
        }
        assert_eq!(agent.select_move(&state, &mut rng).unwrap(), 3);
    }

    #[test]
    fn mcts_agent_surfaces_search_errors() {
        let agent = MctsAgent::new("m", MctsConfig::for_testing());
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let mut state = Connect4::standard();
        for column in [3, 0, 3, 0, 3, 0, 3] {
            state.apply_move(column).unwrap();
        }
        assert!(agent.select_move(&state, &mut rng).is_err());
    }

    #[test]
    fn opponent_pool_follows_config() {
        let cfg = base_config();
        let opponents = build_opponents(&cfg).unwrap();
        let names: Vec<&str> = opponents.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["mcts-4", "mcts-8", "random"]);
    }

    #[test]
    fn opponent_pool_without_random() {
        let mut cfg = base_config();
        cfg.include_random = false;
        let opponents = build_opponents(&cfg).unwrap();
        assert_eq!(opponents.len(), 2);

        cfg.opponent_iterations.clear();
        assert!(build_opponents(&cfg).is_err());
    }

    #[test]
    fn candidate_uses_candidate_iterations() {
        let cfg = base_config();
        let candidate = build_candidate(&cfg).unwrap();
        assert_eq!(candidate.name(), CANDIDATE_NAME);
    }
}
