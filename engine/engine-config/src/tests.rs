//! Tests for the configuration module.
//!
//! Tests run in parallel and share the process environment, so each env
//! override test owns its variables and asserts only on the fields they touch.

use super::*;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.data_dir, "./data");
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.common.seed, 42);
    assert_eq!(config.mcts.max_iterations, 128);
    assert_eq!(config.mcts.time_budget_ms, 1000);
    assert_eq!(config.mcts.backup, "expansion_perspective");
}

#[test]
fn test_game_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.game.board_height, 6);
    assert_eq!(config.game.board_width, 7);
    assert_eq!(config.game.win_length, 4);
    assert!((config.game.reward_win - 1.0).abs() < f64::EPSILON);
    assert!((config.game.reward_draw - 0.5).abs() < f64::EPSILON);
    assert!(config.game.reward_lose.abs() < f64::EPSILON);
    assert!(config.game.reward_step.abs() < f64::EPSILON);
}

#[test]
fn test_bandit_and_elo_defaults() {
    let config = CentralConfig::default();
    assert!((config.bandit.gamma - 0.07).abs() < f64::EPSILON);
    assert_eq!(config.bandit.renormalize_interval, 1000);
    assert_eq!(config.bandit.channel_capacity, 64);
    assert!((config.elo.k_factor - 32.0).abs() < f64::EPSILON);
    assert!((config.elo.default_rating - 1200.0).abs() < f64::EPSILON);
}

#[test]
fn test_arena_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.arena.episodes, 200);
    assert_eq!(config.arena.concurrency, 4);
    assert_eq!(config.arena.opponent_iterations, vec![32, 64, 128]);
    assert!(config.arena.include_random);
    assert_eq!(config.arena.log_interval, 25);
}

#[test]
fn test_defaults_accessors_match_structs() {
    let config = CentralConfig::default();
    assert_eq!(defaults::board_width(), config.game.board_width);
    assert_eq!(defaults::opponent_iterations(), &config.arena.opponent_iterations[..]);
    assert_eq!(defaults::backup(), config.mcts.backup);
}

#[test]
fn test_env_overrides() {
    std::env::set_var("ARENA_COMMON_SEED", "7");
    std::env::set_var("ARENA_MCTS_BACKUP", "per_node_mover");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.common.seed, 7);
    assert_eq!(config.mcts.backup, "per_node_mover");

    std::env::remove_var("ARENA_COMMON_SEED");
    std::env::remove_var("ARENA_MCTS_BACKUP");
}

#[test]
fn test_env_override_list() {
    std::env::set_var("ARENA_ARENA_OPPONENT_ITERATIONS", "16, 256,,1024");

    let config = apply_env_overrides(CentralConfig::default());
    assert_eq!(config.arena.opponent_iterations, vec![16, 256, 1024]);

    std::env::remove_var("ARENA_ARENA_OPPONENT_ITERATIONS");
}

#[test]
fn test_unparseable_env_override_is_ignored() {
    std::env::set_var("ARENA_BANDIT_GAMMA", "lots");
    std::env::set_var("ARENA_BANDIT_CHANNEL_CAPACITY", "-3");

    let config = apply_env_overrides(CentralConfig::default());
    assert!((config.bandit.gamma - 0.07).abs() < f64::EPSILON);
    assert_eq!(config.bandit.channel_capacity, 64);

    std::env::remove_var("ARENA_BANDIT_GAMMA");
    std::env::remove_var("ARENA_BANDIT_CHANNEL_CAPACITY");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
data_dir = "/custom/data"
seed = 99

[game]
board_height = 5
board_width = 8

[mcts]
max_iterations = 512
backup = "per_node_mover"

[arena]
episodes = 10
opponent_iterations = [8, 16]
include_random = false
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.data_dir, "/custom/data");
    assert_eq!(config.common.seed, 99);
    assert_eq!(config.game.board_height, 5);
    assert_eq!(config.game.board_width, 8);
    assert_eq!(config.game.win_length, 4); // Default
    assert_eq!(config.mcts.max_iterations, 512);
    assert_eq!(config.mcts.backup, "per_node_mover");
    assert_eq!(config.arena.episodes, 10);
    assert_eq!(config.arena.opponent_iterations, vec![8, 16]);
    assert!(!config.arena.include_random);
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[elo]
k_factor = 16.0
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert!((config.elo.k_factor - 16.0).abs() < f64::EPSILON);
    assert!((config.elo.default_rating - 1200.0).abs() < f64::EPSILON); // Default
    assert_eq!(config.common.data_dir, "./data"); // Default
    assert_eq!(config, CentralConfig {
        elo: EloConfig {
            k_factor: 16.0,
            ..EloConfig::default()
        },
        ..CentralConfig::default()
    });
}

#[test]
fn test_load_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[game]\nboard_width = 9\nwin_length = 5\n\n[elo]\ndefault_rating = 1500.0"
    )
    .unwrap();

    let config = load_from_path(file.path());
    assert_eq!(config.game.board_width, 9);
    assert_eq!(config.game.win_length, 5);
    assert!((config.elo.default_rating - 1500.0).abs() < f64::EPSILON);
    assert_eq!(config.arena.log_interval, 25);
}

#[test]
fn test_load_from_malformed_path_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[game\nboard_width = ").unwrap();

    let config = load_from_path(file.path());
    assert_eq!(config.game.board_width, 7);
    assert_eq!(config.arena.episodes, 200);
}

#[test]
fn test_load_from_missing_path_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_from_path(&dir.path().join("absent.toml"));
    assert_eq!(config.game.board_height, 6);
    assert_eq!(config.mcts.max_iterations, 128);
}

#[test]
fn test_config_roundtrips_through_toml() {
    let config = CentralConfig::default();
    let text = toml::to_string(&config).unwrap();
    let parsed: CentralConfig = toml::from_str(&text).unwrap();
    assert_eq!(config, parsed);
}
