//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "ARENA_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Docker container
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by the ARENA_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    // Check for explicit config path
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_PATH_ENV, path.display());
            return load_from_path(&path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    // Search default locations
    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    // Fall back to defaults
    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
///
/// Unreadable or malformed files fall back to the built-in defaults.
pub fn load_from_path(path: &Path) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, u64, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.trim().parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparseable {}", $key),
            Err(_) => {}
        }
    };
    // Comma-separated list of parseable values
    ($config:expr, $section:ident . $field:ident, $key:expr, list) => {
        if let Ok(s) = std::env::var($key) {
            let parsed: Result<Vec<_>, _> = s
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::parse)
                .collect();
            match parsed {
                Ok(v) => $config.$section.$field = v,
                Err(_) => warn!("Ignoring unparseable {}", $key),
            }
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: ARENA_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.data_dir, "ARENA_COMMON_DATA_DIR");
    env_override!(config, common.log_level, "ARENA_COMMON_LOG_LEVEL");
    env_override!(config, common.seed, "ARENA_COMMON_SEED", parse);

    // Game
    env_override!(config, game.board_height, "ARENA_GAME_BOARD_HEIGHT", parse);
    env_override!(config, game.board_width, "ARENA_GAME_BOARD_WIDTH", parse);
    env_override!(config, game.win_length, "ARENA_GAME_WIN_LENGTH", parse);
    env_override!(config, game.reward_win, "ARENA_GAME_REWARD_WIN", parse);
    env_override!(config, game.reward_draw, "ARENA_GAME_REWARD_DRAW", parse);
    env_override!(config, game.reward_lose, "ARENA_GAME_REWARD_LOSE", parse);
    env_override!(config, game.reward_step, "ARENA_GAME_REWARD_STEP", parse);

    // MCTS
    env_override!(
        config,
        mcts.max_iterations,
        "ARENA_MCTS_MAX_ITERATIONS",
        parse
    );
    env_override!(
        config,
        mcts.time_budget_ms,
        "ARENA_MCTS_TIME_BUDGET_MS",
        parse
    );
    env_override!(config, mcts.backup, "ARENA_MCTS_BACKUP");

    // Bandit
    env_override!(config, bandit.gamma, "ARENA_BANDIT_GAMMA", parse);
    env_override!(
        config,
        bandit.renormalize_interval,
        "ARENA_BANDIT_RENORMALIZE_INTERVAL",
        parse
    );
    env_override!(
        config,
        bandit.channel_capacity,
        "ARENA_BANDIT_CHANNEL_CAPACITY",
        parse
    );

    // Elo
    env_override!(config, elo.k_factor, "ARENA_ELO_K_FACTOR", parse);
    env_override!(
        config,
        elo.default_rating,
        "ARENA_ELO_DEFAULT_RATING",
        parse
    );

    // Arena
    env_override!(config, arena.episodes, "ARENA_ARENA_EPISODES", parse);
    env_override!(config, arena.concurrency, "ARENA_ARENA_CONCURRENCY", parse);
    env_override!(
        config,
        arena.opponent_iterations,
        "ARENA_ARENA_OPPONENT_ITERATIONS",
        list
    );
    env_override!(
        config,
        arena.include_random,
        "ARENA_ARENA_INCLUDE_RANDOM",
        parse
    );
    env_override!(
        config,
        arena.log_interval,
        "ARENA_ARENA_LOG_INTERVAL",
        parse
    );

    config
}
