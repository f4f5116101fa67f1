//! Arena statistics tracking and persistence.
//!
//! This module provides statistics tracking for an arena run, including:
//! - Episode counts and candidate outcomes
//! - Per-opponent game counts
//! - Timing information
//!
//! Final results are written to a JSON file in the data directory.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::episode::EpisodeResult;

/// Per-opponent counters, one per bandit arm.
#[derive(Debug, Default)]
struct ArmCounters {
    games: AtomicU32,
    candidate_wins: AtomicU32,
    opponent_wins: AtomicU32,
    draws: AtomicU32,
}

/// Aggregated arena statistics, designed for lock-free updates.
#[derive(Debug)]
pub struct ArenaStats {
    arm_names: Vec<String>,
    arms: Vec<ArmCounters>,
    /// Number of episodes completed
    episodes_completed: AtomicU32,
    /// Moves across all episodes
    total_moves: AtomicU64,
    /// Start time for rate calculations
    start_time: Instant,
}

/// Serializable per-opponent stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmStatsSnapshot {
    pub opponent: String,
    pub games: u32,
    pub candidate_wins: u32,
    pub opponent_wins: u32,
    pub draws: u32,
}

/// Serializable stats for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaStatsSnapshot {
    pub episodes_completed: u32,
    pub candidate_wins: u32,
    pub candidate_losses: u32,
    pub draws: u32,
    pub total_moves: u64,
    pub avg_episode_length: f64,
    pub episodes_per_second: f64,
    pub runtime_seconds: f64,
    pub arms: Vec<ArmStatsSnapshot>,
}

impl ArenaStatsSnapshot {
    /// Candidate score rate: wins plus half the draws, over all episodes.
    pub fn candidate_score_rate(&self) -> f64 {
        if self.episodes_completed == 0 {
            return 0.0;
        }
        (self.candidate_wins as f64 + 0.5 * self.draws as f64) / self.episodes_completed as f64
    }
}

/// One row of the final leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntry {
    pub agent: String,
    pub rating: f64,
}

/// Final bandit state, labelled by opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanditReport {
    pub arms: Vec<String>,
    pub weights: Vec<f64>,
    pub probabilities: Vec<f64>,
    pub gamma: f64,
    pub observations: u64,
}

/// Everything written to arena_results.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaResults {
    pub stats: ArenaStatsSnapshot,
    pub leaderboard: Vec<RatingEntry>,
    pub bandit: BanditReport,
    pub timestamp: u64,
}

impl ArenaStats {
    /// Create a tracker with one counter set per opponent.
    pub fn new(arm_names: Vec<String>) -> Self {
        let arms = arm_names.iter().map(|_| ArmCounters::default()).collect();
        Self {
            arm_names,
            arms,
            episodes_completed: AtomicU32::new(0),
            total_moves: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a completed episode against opponent `arm`.
    ///
    /// Returns the number of episodes completed so far, including this one.
    pub fn record_episode(&self, arm: usize, result: &EpisodeResult) -> u32 {
        if let Some(counters) = self.arms.get(arm) {
            counters.games.fetch_add(1, Ordering::Relaxed);
            if result.candidate_won() {
                counters.candidate_wins.fetch_add(1, Ordering::Relaxed);
            } else if result.opponent_won() {
                counters.opponent_wins.fetch_add(1, Ordering::Relaxed);
            } else {
                counters.draws.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.total_moves
            .fetch_add(u64::from(result.moves), Ordering::Relaxed);
        self.episodes_completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Get a snapshot of current stats.
    pub fn snapshot(&self) -> ArenaStatsSnapshot {
        let episodes = self.episodes_completed.load(Ordering::Relaxed);
        let total_moves = self.total_moves.load(Ordering::Relaxed);
        let runtime = self.start_time.elapsed().as_secs_f64();

        let arms: Vec<ArmStatsSnapshot> = self
            .arm_names
            .iter()
            .zip(&self.arms)
            .map(|(name, counters)| ArmStatsSnapshot {
                opponent: name.clone(),
                games: counters.games.load(Ordering::Relaxed),
                candidate_wins: counters.candidate_wins.load(Ordering::Relaxed),
                opponent_wins: counters.opponent_wins.load(Ordering::Relaxed),
                draws: counters.draws.load(Ordering::Relaxed),
            })
            .collect();

        let avg_episode_length = if episodes > 0 {
            total_moves as f64 / episodes as f64
        } else {
            0.0
        };

        let episodes_per_second = if runtime > 0.0 {
            episodes as f64 / runtime
        } else {
            0.0
        };

        ArenaStatsSnapshot {
            episodes_completed: episodes,
            candidate_wins: arms.iter().map(|a| a.candidate_wins).sum(),
            candidate_losses: arms.iter().map(|a| a.opponent_wins).sum(),
            draws: arms.iter().map(|a| a.draws).sum(),
            total_moves,
            avg_episode_length,
            episodes_per_second,
            runtime_seconds: runtime,
            arms,
        }
    }
}

/// Seconds since the Unix epoch, 0 if the clock is before it.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Write results to JSON (atomic write-then-rename).
pub fn write_results(path: &Path, results: &ArenaResults) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .map_err(|e| anyhow!("Failed to create {}: {}", dir.display(), e))?;
        }
    }

    let json = serde_json::to_string_pretty(results)
        .map_err(|e| anyhow!("Failed to serialize arena results: {}", e))?;

    // Write to temp file then rename (atomic on most filesystems)
    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path)
        .map_err(|e| anyhow!("Failed to create {}: {}", temp_path.display(), e))?;
    file.write_all(json.as_bytes())
        .map_err(|e| anyhow!("Failed to write {}: {}", temp_path.display(), e))?;
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        // Try to clean up temp file
        let _ = fs::remove_file(&temp_path);
        return Err(anyhow!("Failed to rename {}: {}", temp_path.display(), e));
    }

    debug!("Wrote arena results to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use games_connect4::{GameOutcome, Player};

    fn result(outcome: GameOutcome, candidate_seat: Player, moves: u32) -> EpisodeResult {
        let (candidate_score, opponent_score) = match outcome.winner() {
            Some(p) if p == candidate_seat => (1.0, 0.0),
            Some(_) => (0.0, 1.0),
            None => (0.5, 0.5),
        };
        EpisodeResult {
            moves,
            outcome,
            candidate_seat,
            candidate_score,
            opponent_score,
        }
    }

    fn sample_results() -> ArenaResults {
        let stats = ArenaStats::new(vec!["mcts-8".into(), "random".into()]);
        stats.record_episode(0, &result(GameOutcome::Draw, Player::First, 42));
        ArenaResults {
            stats: stats.snapshot(),
            leaderboard: vec![
                RatingEntry {
                    agent: "candidate".into(),
                    rating: 1216.0,
                },
                RatingEntry {
                    agent: "random".into(),
                    rating: 1184.0,
                },
            ],
            bandit: BanditReport {
                arms: vec!["mcts-8".into(), "random".into()],
                weights: vec![1.0, 1.2],
                probabilities: vec![0.46, 0.54],
                gamma: 0.1,
                observations: 1,
            },
            timestamp: unix_timestamp(),
        }
    }

    #[test]
    fn new_stats_are_empty() {
        let stats = ArenaStats::new(vec!["a".into(), "b".into()]);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.episodes_completed, 0);
        assert_eq!(snapshot.avg_episode_length, 0.0);
        assert_eq!(snapshot.candidate_score_rate(), 0.0);
        assert_eq!(snapshot.arms.len(), 2);
        assert!(snapshot.arms.iter().all(|a| a.games == 0));
    }

    #[test]
    fn record_episode_updates_counts() {
        let stats = ArenaStats::new(vec!["mcts-8".into(), "random".into()]);

        assert_eq!(
            stats.record_episode(0, &result(GameOutcome::Win(Player::First), Player::First, 7)),
            1
        );
        stats.record_episode(0, &result(GameOutcome::Win(Player::First), Player::Second, 9));
        stats.record_episode(1, &result(GameOutcome::Draw, Player::First, 42));
        stats.record_episode(1, &result(GameOutcome::Win(Player::Second), Player::Second, 12));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.episodes_completed, 4);
        assert_eq!(snapshot.candidate_wins, 2);
        assert_eq!(snapshot.candidate_losses, 1);
        assert_eq!(snapshot.draws, 1);
        assert_eq!(snapshot.total_moves, 70);
        assert!((snapshot.avg_episode_length - 17.5).abs() < 1e-12);
        assert!((snapshot.candidate_score_rate() - 0.625).abs() < 1e-12);

        assert_eq!(
            snapshot.arms[0],
            ArmStatsSnapshot {
                opponent: "mcts-8".into(),
                games: 2,
                candidate_wins: 1,
                opponent_wins: 1,
                draws: 0,
            }
        );
        assert_eq!(snapshot.arms[1].games, 2);
        assert_eq!(snapshot.arms[1].draws, 1);
    }

    #[test]
    fn write_results_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("arena_results.json");
        let results = sample_results();

        write_results(&path, &results).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let parsed: ArenaResults = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed.stats.episodes_completed, 1);
        assert_eq!(parsed.stats.arms, results.stats.arms);
        assert_eq!(parsed.leaderboard, results.leaderboard);
        assert_eq!(parsed.bandit, results.bandit);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn write_results_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arena_results.json");
        let mut results = sample_results();

        write_results(&path, &results).unwrap();
        results.bandit.observations = 99;
        write_results(&path, &results).unwrap();

        let parsed: ArenaResults =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.bandit.observations, 99);
    }
}
