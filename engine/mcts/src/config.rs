//! MCTS configuration parameters.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::search::SearchError;

/// How a rollout's terminal score is credited along the selected path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupMode {
    /// Score the terminal state once, from the expanded node's mover, and add
    /// that same value to every node on the path.
    #[default]
    ExpansionPerspective,

    /// Score the terminal state separately for each node's own mover.
    PerNodeMover,
}

impl fmt::Display for BackupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupMode::ExpansionPerspective => write!(f, "expansion_perspective"),
            BackupMode::PerNodeMover => write!(f, "per_node_mover"),
        }
    }
}

impl FromStr for BackupMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expansion_perspective" | "expansion" => Ok(BackupMode::ExpansionPerspective),
            "per_node_mover" | "per_node" => Ok(BackupMode::PerNodeMover),
            other => Err(SearchError::InvalidConfiguration(format!(
                "unknown backup mode '{}'",
                other
            ))),
        }
    }
}

/// Largest accepted iteration cap. Each round adds at most one node to a tree
/// that starts with the root, so every id stays below `NodeId::NONE`.
pub const MAX_ITERATIONS: u32 = u32::MAX - 1;

/// Configuration for Monte Carlo Tree Search.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Upper bound on simulation rounds per search. Must be positive.
    pub max_iterations: u32,

    /// Wall-clock budget, checked after every round. The search may overrun
    /// it by up to one round.
    pub time_budget: Duration,

    /// Backpropagation convention.
    pub backup: BackupMode,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 128,
            time_budget: Duration::from_secs(1),
            backup: BackupMode::ExpansionPerspective,
        }
    }
}

impl MctsConfig {
    /// Create a fast config for testing. The time budget is generous so that
    /// seeded runs are limited by iterations only.
    pub fn for_testing() -> Self {
        Self {
            max_iterations: 64,
            time_budget: Duration::from_secs(60),
            backup: BackupMode::ExpansionPerspective,
        }
    }

    /// Builder pattern: set the iteration cap.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    /// Builder pattern: set the time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Builder pattern: set the backup mode.
    pub fn with_backup(mut self, backup: BackupMode) -> Self {
        self.backup = backup;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_iterations == 0 {
            return Err(SearchError::InvalidConfiguration(
                "max_iterations must be positive".into(),
            ));
        }
        if self.max_iterations > MAX_ITERATIONS {
            return Err(SearchError::InvalidConfiguration(format!(
                "max_iterations must be at most {}",
                MAX_ITERATIONS
            )));
        }
        Ok(())
    }
}
