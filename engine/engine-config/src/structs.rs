//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::{Deserialize, Serialize};

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_board_height() -> usize {
    defaults::board_height()
}
fn d_board_width() -> usize {
    defaults::board_width()
}
fn d_win_length() -> usize {
    defaults::win_length()
}
fn d_reward_win() -> f64 {
    defaults::reward_win()
}
fn d_reward_draw() -> f64 {
    defaults::reward_draw()
}
fn d_reward_lose() -> f64 {
    defaults::reward_lose()
}
fn d_reward_step() -> f64 {
    defaults::reward_step()
}
fn d_max_iterations() -> u32 {
    defaults::max_iterations()
}
fn d_time_budget_ms() -> u64 {
    defaults::time_budget_ms()
}
fn d_backup() -> String {
    defaults::backup().into()
}
fn d_gamma() -> f64 {
    defaults::gamma()
}
fn d_renormalize_interval() -> u64 {
    defaults::renormalize_interval()
}
fn d_channel_capacity() -> usize {
    defaults::channel_capacity()
}
fn d_k_factor() -> f64 {
    defaults::k_factor()
}
fn d_default_rating() -> f64 {
    defaults::default_rating()
}
fn d_episodes() -> u32 {
    defaults::episodes()
}
fn d_concurrency() -> usize {
    defaults::concurrency()
}
fn d_opponent_iterations() -> Vec<u32> {
    defaults::opponent_iterations().to_vec()
}
fn d_include_random() -> bool {
    defaults::include_random()
}
fn d_log_interval() -> u32 {
    defaults::log_interval()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub bandit: BanditConfig,
    #[serde(default)]
    pub elo: EloConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
    #[serde(default = "d_log_level")]
    pub log_level: String,
    /// Base seed; each worker derives its own stream from it
    #[serde(default = "d_seed")]
    pub seed: u64,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir().into(),
            log_level: defaults::log_level().into(),
            seed: defaults::seed(),
        }
    }
}

/// Board geometry and rewards for the Connect-Four engine
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    #[serde(default = "d_board_height")]
    pub board_height: usize,
    #[serde(default = "d_board_width")]
    pub board_width: usize,
    #[serde(default = "d_win_length")]
    pub win_length: usize,
    #[serde(default = "d_reward_win")]
    pub reward_win: f64,
    #[serde(default = "d_reward_draw")]
    pub reward_draw: f64,
    #[serde(default = "d_reward_lose")]
    pub reward_lose: f64,
    #[serde(default = "d_reward_step")]
    pub reward_step: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_height: defaults::board_height(),
            board_width: defaults::board_width(),
            win_length: defaults::win_length(),
            reward_win: defaults::reward_win(),
            reward_draw: defaults::reward_draw(),
            reward_lose: defaults::reward_lose(),
            reward_step: defaults::reward_step(),
        }
    }
}

/// MCTS (Monte Carlo Tree Search) configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "d_time_budget_ms")]
    pub time_budget_ms: u64,
    /// "expansion_perspective" or "per_node_mover"
    #[serde(default = "d_backup")]
    pub backup: String,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            max_iterations: defaults::max_iterations(),
            time_budget_ms: defaults::time_budget_ms(),
            backup: defaults::backup().into(),
        }
    }
}

/// Exp3 opponent-selection bandit
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BanditConfig {
    #[serde(default = "d_gamma")]
    pub gamma: f64,
    /// Observations between weight renormalizations (0 = only on overflow)
    #[serde(default = "d_renormalize_interval")]
    pub renormalize_interval: u64,
    /// Bound on queued bandit commands
    #[serde(default = "d_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            gamma: defaults::gamma(),
            renormalize_interval: defaults::renormalize_interval(),
            channel_capacity: defaults::channel_capacity(),
        }
    }
}

/// Elo rating parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EloConfig {
    #[serde(default = "d_k_factor")]
    pub k_factor: f64,
    #[serde(default = "d_default_rating")]
    pub default_rating: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k_factor: defaults::k_factor(),
            default_rating: defaults::default_rating(),
        }
    }
}

/// Evaluation arena driver
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    #[serde(default = "d_episodes")]
    pub episodes: u32,
    /// Number of concurrent episode workers
    #[serde(default = "d_concurrency")]
    pub concurrency: usize,
    /// One MCTS opponent per entry
    #[serde(default = "d_opponent_iterations")]
    pub opponent_iterations: Vec<u32>,
    #[serde(default = "d_include_random")]
    pub include_random: bool,
    #[serde(default = "d_log_interval")]
    pub log_interval: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            episodes: defaults::episodes(),
            concurrency: defaults::concurrency(),
            opponent_iterations: defaults::opponent_iterations().to_vec(),
            include_random: defaults::include_random(),
            log_interval: defaults::log_interval(),
        }
    }
}
