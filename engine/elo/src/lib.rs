//! Elo ratings for agents that play pairwise matches.
//!
//! After a match between A and B the expected score of A is
//! `1 / (1 + 10^((R_b - R_a) / 400))`, and each rating moves by
//! `k_factor * (actual - expected)`. With one shared `k_factor` the two
//! deltas always cancel.
//!
//! ```rust
//! use elo::{EloRater, Outcome};
//!
//! let mut rater = EloRater::new(32.0, 1200.0).unwrap();
//! let ratings = rater.rate("candidate", "mcts_64", Outcome::AWins);
//! assert_eq!(ratings["candidate"], 1216.0);
//! assert_eq!(ratings["mcts_64"], 1184.0);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Agent id to rating. Returned by value so callers never alias internal state.
pub type Ratings = BTreeMap<String, f64>;

pub const DEFAULT_K_FACTOR: f64 = 32.0;
pub const DEFAULT_RATING: f64 = 1200.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EloError {
    #[error("invalid Elo configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown match outcome '{0}' (expected a_wins, b_wins or draw)")]
    UnknownOutcome(String),

    #[error("unknown agent '{0}'")]
    UnknownAgent(String),
}

/// Result of one match, from agent A's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    AWins,
    BWins,
    Draw,
}

impl Outcome {
    /// Actual scores `(a, b)`.
    pub fn scores(self) -> (f64, f64) {
        match self {
            Outcome::AWins => (1.0, 0.0),
            Outcome::BWins => (0.0, 1.0),
            Outcome::Draw => (0.5, 0.5),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AWins => write!(f, "a_wins"),
            Outcome::BWins => write!(f, "b_wins"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

impl FromStr for Outcome {
    type Err = EloError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "a_wins" => Ok(Outcome::AWins),
            "b" | "b_wins" => Ok(Outcome::BWins),
            "draw" => Ok(Outcome::Draw),
            _ => Err(EloError::UnknownOutcome(s.to_string())),
        }
    }
}

/// Ratings table with a fixed k-factor and starting rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloRater {
    ratings: Ratings,
    k_factor: f64,
    default_rating: f64,
}

impl Default for EloRater {
    fn default() -> Self {
        Self {
            ratings: Ratings::new(),
            k_factor: DEFAULT_K_FACTOR,
            default_rating: DEFAULT_RATING,
        }
    }
}

impl EloRater {
    pub fn new(k_factor: f64, default_rating: f64) -> Result<Self, EloError> {
        if !(k_factor.is_finite() && k_factor > 0.0) {
            return Err(EloError::InvalidConfiguration(format!(
                "k_factor must be positive and finite, got {}",
                k_factor
            )));
        }
        if !default_rating.is_finite() {
            return Err(EloError::InvalidConfiguration(format!(
                "default_rating must be finite, got {}",
                default_rating
            )));
        }

        Ok(Self {
            ratings: Ratings::new(),
            k_factor,
            default_rating,
        })
    }

    /// Create a rater with `agents` already registered.
    pub fn with_agents<I, S>(agents: I, k_factor: f64, default_rating: f64) -> Result<Self, EloError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rater = Self::new(k_factor, default_rating)?;
        for agent in agents {
            rater.register(agent);
        }
        Ok(rater)
    }

    pub fn k_factor(&self) -> f64 {
        self.k_factor
    }

    pub fn default_rating(&self) -> f64 {
        self.default_rating
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn contains(&self, agent: &str) -> bool {
        self.ratings.contains_key(agent)
    }

    /// Seed `agent` at the default rating if absent. Returns its rating.
    pub fn register(&mut self, agent: impl Into<String>) -> f64 {
        *self
            .ratings
            .entry(agent.into())
            .or_insert(self.default_rating)
    }

    /// Expected score of a player rated `rating` against `opponent_rating`.
    pub fn win_probability(rating: f64, opponent_rating: f64) -> f64 {
        1.0 / (1.0 + 10f64.powf((opponent_rating - rating) / 400.0))
    }

    /// Record a match between `a` and `b` and return a copy of all ratings.
    ///
    /// Agents not seen before start at the default rating.
    pub fn rate(&mut self, a: &str, b: &str, outcome: Outcome) -> Ratings {
        let rating_a = self.register(a);
        let rating_b = self.register(b);

        let expected_a = Self::win_probability(rating_a, rating_b);
        let expected_b = Self::win_probability(rating_b, rating_a);
        let (score_a, score_b) = outcome.scores();

        // Both deltas are computed before either is applied, so a == b is a no-op
        let delta_a = self.k_factor * (score_a - expected_a);
        let delta_b = self.k_factor * (score_b - expected_b);
        *self.ratings.entry(a.to_string()).or_insert(self.default_rating) += delta_a;
        *self.ratings.entry(b.to_string()).or_insert(self.default_rating) += delta_b;

        debug!(
            a,
            b,
            %outcome,
            expected_a,
            delta_a,
            delta_b,
            "Elo update"
        );

        self.ratings()
    }

    /// Like [`EloRater::rate`], with the outcome given as a token
    /// (`a_wins`, `b_wins`, `draw`).
    pub fn rate_token(&mut self, a: &str, b: &str, outcome: &str) -> Result<Ratings, EloError> {
        let outcome = outcome.parse::<Outcome>()?;
        Ok(self.rate(a, b, outcome))
    }

    pub fn rating(&self, agent: &str) -> Result<f64, EloError> {
        self.ratings
            .get(agent)
            .copied()
            .ok_or_else(|| EloError::UnknownAgent(agent.to_string()))
    }

    /// Snapshot of every rating.
    pub fn ratings(&self) -> Ratings {
        self.ratings.clone()
    }

    /// Agents sorted by rating, highest first; equal ratings sort by id.
    pub fn leaderboard(&self) -> Vec<(String, f64)> {
        let mut board: Vec<(String, f64)> = self
            .ratings
            .iter()
            .map(|(agent, &rating)| (agent.clone(), rating))
            .collect();
        board.sort_by(|(id_a, r_a), (id_b, r_b)| r_b.total_cmp(r_a).then_with(|| id_a.cmp(id_b)));
        board
    }
}
