//! Configuration for the arena binary
//!
//! Configuration is loaded from config.toml with environment variable overrides.
//! CLI arguments take highest priority, followed by env vars, then config.toml.

use anyhow::{anyhow, Result};
use clap::Parser;
use engine_config::{load_config, CentralConfig};
use games_connect4::Connect4Config;
use mcts::{BackupMode, MctsConfig};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// File written to `data_dir` when a run finishes.
pub const RESULTS_FILE: &str = "arena_results.json";

// Load central config once at startup
static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

// Default value functions that read from central config
fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

fn default_data_dir() -> String {
    CENTRAL_CONFIG.common.data_dir.clone()
}

fn default_seed() -> u64 {
    CENTRAL_CONFIG.common.seed
}

fn default_episodes() -> u32 {
    CENTRAL_CONFIG.arena.episodes
}

fn default_concurrency() -> usize {
    CENTRAL_CONFIG.arena.concurrency
}

fn default_candidate_iterations() -> u32 {
    CENTRAL_CONFIG.mcts.max_iterations
}

fn default_opponent_iterations() -> Vec<u32> {
    CENTRAL_CONFIG.arena.opponent_iterations.clone()
}

fn default_include_random() -> bool {
    CENTRAL_CONFIG.arena.include_random
}

fn default_log_interval() -> u32 {
    CENTRAL_CONFIG.arena.log_interval
}

fn default_time_budget_ms() -> u64 {
    CENTRAL_CONFIG.mcts.time_budget_ms
}

fn default_backup() -> String {
    CENTRAL_CONFIG.mcts.backup.clone()
}

fn default_gamma() -> f64 {
    CENTRAL_CONFIG.bandit.gamma
}

fn default_renormalize_interval() -> u64 {
    CENTRAL_CONFIG.bandit.renormalize_interval
}

fn default_channel_capacity() -> usize {
    CENTRAL_CONFIG.bandit.channel_capacity
}

fn default_k_factor() -> f64 {
    CENTRAL_CONFIG.elo.k_factor
}

fn default_rating() -> f64 {
    CENTRAL_CONFIG.elo.default_rating
}

fn default_board_height() -> usize {
    CENTRAL_CONFIG.game.board_height
}

fn default_board_width() -> usize {
    CENTRAL_CONFIG.game.board_width
}

fn default_win_length() -> usize {
    CENTRAL_CONFIG.game.win_length
}

fn default_reward_win() -> f64 {
    CENTRAL_CONFIG.game.reward_win
}

fn default_reward_draw() -> f64 {
    CENTRAL_CONFIG.game.reward_draw
}

fn default_reward_lose() -> f64 {
    CENTRAL_CONFIG.game.reward_lose
}

fn default_reward_step() -> f64 {
    CENTRAL_CONFIG.game.reward_step
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "arena")]
#[command(about = "Connect-Four evaluation arena")]
#[command(
    long_about = "Plays a candidate MCTS agent against a pool of opponents. An Exp3 bandit
picks the opponent for every episode and an Elo rater tracks the results.

Configuration is loaded from config.toml with ARENA_* environment variable
overrides. CLI arguments take highest priority."
)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value_t = default_log_level())]
    pub log_level: String,

    /// Directory for arena_results.json
    #[arg(long, default_value_t = default_data_dir())]
    pub data_dir: String,

    /// Base seed; worker N plays with seed + N
    #[arg(long, default_value_t = default_seed())]
    pub seed: u64,

    /// Episodes to play across all workers
    #[arg(long, default_value_t = default_episodes())]
    pub episodes: u32,

    /// Concurrent episode workers
    #[arg(long, default_value_t = default_concurrency())]
    pub concurrency: usize,

    /// MCTS iterations per move for the candidate
    #[arg(long, default_value_t = default_candidate_iterations())]
    pub candidate_iterations: u32,

    /// MCTS iterations per move for each opponent (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = default_opponent_iterations())]
    pub opponent_iterations: Vec<u32>,

    /// Add a uniform random opponent to the pool
    #[arg(long, default_value_t = default_include_random(), action = clap::ArgAction::Set)]
    pub include_random: bool,

    /// Log progress every N episodes (0 to disable)
    #[arg(long, default_value_t = default_log_interval())]
    pub log_interval: u32,

    /// Wall-clock budget per MCTS move in milliseconds
    #[arg(long, default_value_t = default_time_budget_ms())]
    pub time_budget_ms: u64,

    /// MCTS backpropagation convention (expansion_perspective, per_node_mover)
    #[arg(long, default_value_t = default_backup())]
    pub backup: String,

    /// Exp3 exploration rate in (0, 1]
    #[arg(long, default_value_t = default_gamma())]
    pub gamma: f64,

    /// Observations between bandit weight renormalizations (0 = only on overflow)
    #[arg(long, default_value_t = default_renormalize_interval())]
    pub renormalize_interval: u64,

    /// Queued bandit requests before workers wait
    #[arg(long, default_value_t = default_channel_capacity())]
    pub channel_capacity: usize,

    /// Elo k-factor
    #[arg(long, default_value_t = default_k_factor())]
    pub k_factor: f64,

    /// Starting Elo rating
    #[arg(long, default_value_t = default_rating())]
    pub default_rating: f64,

    #[arg(long, default_value_t = default_board_height())]
    pub board_height: usize,

    #[arg(long, default_value_t = default_board_width())]
    pub board_width: usize,

    #[arg(long, default_value_t = default_win_length())]
    pub win_length: usize,

    /// Terminal score for the winner
    #[arg(long, default_value_t = default_reward_win(), allow_negative_numbers = true)]
    pub reward_win: f64,

    /// Terminal score for both players on a draw
    #[arg(long, default_value_t = default_reward_draw(), allow_negative_numbers = true)]
    pub reward_draw: f64,

    /// Terminal score for the loser
    #[arg(long, default_value_t = default_reward_lose(), allow_negative_numbers = true)]
    pub reward_lose: f64,

    /// Score for a non-terminal state
    #[arg(long, default_value_t = default_reward_step(), allow_negative_numbers = true)]
    pub reward_step: f64,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.is_empty() {
            return Err(anyhow!("data_dir cannot be empty"));
        }

        if self.episodes == 0 {
            return Err(anyhow!("episodes must be greater than 0"));
        }

        if self.concurrency == 0 {
            return Err(anyhow!("concurrency must be greater than 0"));
        }

        if self.candidate_iterations == 0 {
            return Err(anyhow!("candidate_iterations must be greater than 0"));
        }

        if self.opponent_iterations.contains(&0) {
            return Err(anyhow!("opponent_iterations entries must be greater than 0"));
        }

        if self.opponent_iterations.is_empty() && !self.include_random {
            return Err(anyhow!(
                "opponent pool is empty: set opponent_iterations or include_random"
            ));
        }

        if self.log_level.parse::<LevelFilter>().is_err() {
            return Err(anyhow!(
                "invalid log level '{}', expected one of trace, debug, info, warn, error",
                self.log_level
            ));
        }

        self.backup_mode()?;

        let budgets = std::iter::once(&self.candidate_iterations).chain(&self.opponent_iterations);
        for &iterations in budgets {
            self.mcts_config(iterations)?
                .validate()
                .map_err(|e| anyhow!("invalid search configuration: {}", e))?;
        }

        if !(self.gamma.is_finite() && self.gamma > 0.0 && self.gamma <= 1.0) {
            return Err(anyhow!("gamma must be in (0, 1], got {}", self.gamma));
        }

        if !(self.k_factor.is_finite() && self.k_factor > 0.0) {
            return Err(anyhow!("k_factor must be positive, got {}", self.k_factor));
        }

        if !self.default_rating.is_finite() {
            return Err(anyhow!("default_rating must be finite"));
        }

        self.game_config()
            .validate()
            .map_err(|e| anyhow!("invalid game configuration: {}", e))?;

        Ok(())
    }

    /// Engine parameters for every game in the run.
    pub fn game_config(&self) -> Connect4Config {
        Connect4Config::default()
            .with_board(self.board_height, self.board_width, self.win_length)
            .with_rewards(
                self.reward_win,
                self.reward_draw,
                self.reward_lose,
                self.reward_step,
            )
    }

    pub fn backup_mode(&self) -> Result<BackupMode> {
        self.backup
            .parse()
            .map_err(|e| anyhow!("invalid backup mode: {}", e))
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Search settings for an agent running `iterations` rounds per move.
    pub fn mcts_config(&self, iterations: u32) -> Result<MctsConfig> {
        Ok(MctsConfig::default()
            .with_iterations(iterations)
            .with_time_budget(self.time_budget())
            .with_backup(self.backup_mode()?))
    }

    pub fn results_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(RESULTS_FILE)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn base_config() -> Config {
        Config {
            log_level: "info".into(),
            data_dir: "../data".into(),
            seed: 7,
            episodes: 10,
            concurrency: 2,
            candidate_iterations: 16,
            opponent_iterations: vec![4, 8],
            include_random: true,
            log_interval: 0,
            time_budget_ms: 5_000,
            backup: "expansion_perspective".into(),
            gamma: 0.1,
            renormalize_interval: 100,
            channel_capacity: 8,
            k_factor: 32.0,
            default_rating: 1200.0,
            board_height: 6,
            board_width: 7,
            win_length: 4,
            reward_win: 1.0,
            reward_draw: 0.5,
            reward_lose: 0.0,
            reward_step: 0.0,
        }
    }

    #[test]
    fn validate_accepts_valid_configuration() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_episodes() {
        let mut cfg = base_config();
        cfg.episodes = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("episodes"));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut cfg = base_config();
        cfg.concurrency = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn validate_rejects_zero_opponent_iterations() {
        let mut cfg = base_config();
        cfg.opponent_iterations = vec![8, 0];
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("opponent_iterations"));
    }

    #[test]
    fn validate_rejects_iterations_above_search_cap() {
        let mut cfg = base_config();
        cfg.candidate_iterations = u32::MAX;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid search configuration"));

        let mut cfg = base_config();
        cfg.opponent_iterations = vec![8, u32::MAX];
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_pool() {
        let mut cfg = base_config();
        cfg.opponent_iterations.clear();
        cfg.include_random = false;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("opponent pool is empty"));
    }

    #[test]
    fn validate_accepts_random_only_pool() {
        let mut cfg = base_config();
        cfg.opponent_iterations.clear();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "nope".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid log level"));
    }

    #[test]
    fn validate_rejects_unknown_backup() {
        let mut cfg = base_config();
        cfg.backup = "sideways".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("backup"));
    }

    #[test]
    fn validate_rejects_gamma_out_of_range() {
        let mut cfg = base_config();
        cfg.gamma = 0.0;
        assert!(cfg.validate().is_err());
        cfg.gamma = 1.5;
        assert!(cfg.validate().is_err());
        cfg.gamma = 1.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_board() {
        let mut cfg = base_config();
        cfg.win_length = 9;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid game configuration"));
    }

    #[test]
    fn mcts_config_uses_cli_values() {
        let mut cfg = base_config();
        cfg.backup = "per_node_mover".into();
        cfg.time_budget_ms = 250;
        let mcts = cfg.mcts_config(32).unwrap();
        assert_eq!(mcts.max_iterations, 32);
        assert_eq!(mcts.time_budget, Duration::from_millis(250));
        assert_eq!(mcts.backup, BackupMode::PerNodeMover);
    }

    #[test]
    fn game_config_uses_board_flags() {
        let mut cfg = base_config();
        cfg.board_height = 5;
        cfg.board_width = 8;
        cfg.win_length = 3;
        let game = cfg.game_config();
        assert_eq!(game.board_height, 5);
        assert_eq!(game.board_width, 8);
        assert_eq!(game.win_length, 3);
    }

    #[test]
    fn game_config_uses_reward_flags() {
        let mut cfg = base_config();
        cfg.reward_win = 2.0;
        cfg.reward_draw = 0.25;
        cfg.reward_lose = -1.0;
        cfg.reward_step = 0.01;
        let game = cfg.game_config();
        assert_eq!(game.reward_win, 2.0);
        assert_eq!(game.reward_draw, 0.25);
        assert_eq!(game.reward_lose, -1.0);
        assert_eq!(game.reward_step, 0.01);
    }

    #[test]
    fn validate_rejects_non_finite_reward() {
        let mut cfg = base_config();
        cfg.reward_draw = f64::NAN;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("invalid game configuration"));
    }

    #[test]
    fn candidate_iterations_default_to_mcts_budget() {
        let cfg = Config::try_parse_from(["arena"]).unwrap();
        assert_eq!(cfg.candidate_iterations, CENTRAL_CONFIG.mcts.max_iterations);
        assert_eq!(
            default_candidate_iterations(),
            CENTRAL_CONFIG.mcts.max_iterations
        );
    }

    #[test]
    fn results_path_constructs_correctly() {
        let cfg = base_config();
        assert_eq!(
            cfg.results_path(),
            PathBuf::from("../data").join("arena_results.json")
        );
    }

    #[test]
    fn parses_cli_flags() {
        let cfg = Config::try_parse_from([
            "arena",
            "--episodes",
            "3",
            "--opponent-iterations",
            "2,4,8",
            "--include-random",
            "false",
            "--reward-lose",
            "-1",
        ])
        .unwrap();
        assert_eq!(cfg.episodes, 3);
        assert_eq!(cfg.opponent_iterations, vec![2, 4, 8]);
        assert!(!cfg.include_random);
        assert_eq!(cfg.reward_lose, -1.0);
        assert_eq!(cfg.game_config().reward_lose, -1.0);
    }
}
