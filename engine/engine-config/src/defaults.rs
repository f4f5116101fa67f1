//! Default configuration values loaded from config.defaults.toml.
//!
//! This module loads defaults from the shared TOML file at compile time,
//! so the binary, the docs and the example config agree on every value.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use).
///
/// The file is embedded at compile time and covered by tests, so a parse
/// failure here is a build defect rather than a runtime condition.
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    game: GameDefaults,
    mcts: MctsDefaults,
    bandit: BanditDefaults,
    elo: EloDefaults,
    arena: ArenaDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    data_dir: String,
    log_level: String,
    seed: u64,
}

#[derive(Debug, Deserialize)]
struct GameDefaults {
    board_height: usize,
    board_width: usize,
    win_length: usize,
    reward_win: f64,
    reward_draw: f64,
    reward_lose: f64,
    reward_step: f64,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    max_iterations: u32,
    time_budget_ms: u64,
    backup: String,
}

#[derive(Debug, Deserialize)]
struct BanditDefaults {
    gamma: f64,
    renormalize_interval: u64,
    channel_capacity: usize,
}

#[derive(Debug, Deserialize)]
struct EloDefaults {
    k_factor: f64,
    default_rating: f64,
}

#[derive(Debug, Deserialize)]
struct ArenaDefaults {
    episodes: u32,
    concurrency: usize,
    opponent_iterations: Vec<u32>,
    include_random: bool,
    log_interval: u32,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}
pub fn seed() -> u64 {
    DEFAULTS.common.seed
}

// Game
pub fn board_height() -> usize {
    DEFAULTS.game.board_height
}
pub fn board_width() -> usize {
    DEFAULTS.game.board_width
}
pub fn win_length() -> usize {
    DEFAULTS.game.win_length
}
pub fn reward_win() -> f64 {
    DEFAULTS.game.reward_win
}
pub fn reward_draw() -> f64 {
    DEFAULTS.game.reward_draw
}
pub fn reward_lose() -> f64 {
    DEFAULTS.game.reward_lose
}
pub fn reward_step() -> f64 {
    DEFAULTS.game.reward_step
}

// MCTS
pub fn max_iterations() -> u32 {
    DEFAULTS.mcts.max_iterations
}
pub fn time_budget_ms() -> u64 {
    DEFAULTS.mcts.time_budget_ms
}
pub fn backup() -> &'static str {
    &DEFAULTS.mcts.backup
}

// Bandit
pub fn gamma() -> f64 {
    DEFAULTS.bandit.gamma
}
pub fn renormalize_interval() -> u64 {
    DEFAULTS.bandit.renormalize_interval
}
pub fn channel_capacity() -> usize {
    DEFAULTS.bandit.channel_capacity
}

// Elo
pub fn k_factor() -> f64 {
    DEFAULTS.elo.k_factor
}
pub fn default_rating() -> f64 {
    DEFAULTS.elo.default_rating
}

// Arena
pub fn episodes() -> u32 {
    DEFAULTS.arena.episodes
}
pub fn concurrency() -> usize {
    DEFAULTS.arena.concurrency
}
pub fn opponent_iterations() -> &'static [u32] {
    &DEFAULTS.arena.opponent_iterations
}
pub fn include_random() -> bool {
    DEFAULTS.arena.include_random
}
pub fn log_interval() -> u32 {
    DEFAULTS.arena.log_interval
}
