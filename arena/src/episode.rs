//! A single candidate-versus-opponent game

use anyhow::{anyhow, Result};
use elo::Outcome;
use games_connect4::{Connect4, Connect4Config, Game, GameOutcome, Player};
use rand_chacha::ChaCha20Rng;

use crate::agent::Agent;

/// Final state of one episode, seen from the candidate's seat.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeResult {
    pub moves: u32,
    pub outcome: GameOutcome,
    pub candidate_seat: Player,
    /// Engine score of the candidate's seat in the final state
    pub candidate_score: f64,
    /// Engine score of the opponent's seat in the final state
    pub opponent_score: f64,
}

impl EpisodeResult {
    pub fn candidate_won(&self) -> bool {
        self.outcome.winner() == Some(self.candidate_seat)
    }

    pub fn opponent_won(&self) -> bool {
        self.outcome.winner() == Some(self.candidate_seat.other())
    }

    /// Elo result with the candidate as agent A.
    pub fn elo_outcome(&self) -> Outcome {
        match self.outcome {
            GameOutcome::Draw => Outcome::Draw,
            GameOutcome::Win(winner) if winner == self.candidate_seat => Outcome::AWins,
            GameOutcome::Win(_) => Outcome::BWins,
        }
    }

    /// Exp3 reward for the opponent's arm: its score against the candidate,
    /// clamped into the bandit's reward range.
    pub fn bandit_reward(&self) -> f64 {
        self.opponent_score.clamp(0.0, 1.0)
    }
}

/// Seat for the candidate: first on even episodes, second on odd ones.
pub fn candidate_seat(episode: u32) -> Player {
    if episode % 2 == 0 {
        Player::First
    } else {
        Player::Second
    }
}

/// Play one game to completion.
pub fn play_episode(
    game_config: Connect4Config,
    candidate: &dyn Agent,
    opponent: &dyn Agent,
    candidate_seat: Player,
    rng: &mut ChaCha20Rng,
) -> Result<EpisodeResult> {
    let mut state =
        Connect4::new(game_config).map_err(|e| anyhow!("invalid game configuration: {}", e))?;
    let mut moves = 0u32;

    let outcome = loop {
        if let Some(outcome) = state.outcome() {
            break outcome;
        }

        let agent = if state.side_to_move() == candidate_seat {
            candidate
        } else {
            opponent
        };
        let column = agent.select_move(&state, rng)?;
        state
            .apply_move(column)
            .map_err(|e| anyhow!("{} chose column {}: {}", agent.name(), column, e))?;
        moves += 1;
    };

    Ok(EpisodeResult {
        moves,
        outcome,
        candidate_seat,
        candidate_score: state.score(candidate_seat),
        opponent_score: state.score(candidate_seat.other()),
    })
}
