//! Arena runner: concurrent episodes against a bandit-fielded opponent pool

use anyhow::{anyhow, Result};
use bandit::{spawn_bandit, BanditHandle, Exp3};
use elo::EloRater;
use games_connect4::Connect4Config;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::agent::{build_candidate, build_opponents, Agent, CANDIDATE_NAME};
use crate::config::Config;
use crate::episode::{candidate_seat, play_episode, EpisodeResult};
use crate::stats::{unix_timestamp, write_results, ArenaResults, ArenaStats, BanditReport, RatingEntry};

/// ChaCha stream reserved for the bandit's generator; workers use stream 0.
const BANDIT_STREAM: u64 = 1;

pub struct Arena {
    config: Config,
    game_config: Connect4Config,
    candidate: Arc<dyn Agent>,
    opponents: Vec<Arc<dyn Agent>>,
    stats: ArenaStats,
    elo: Mutex<EloRater>,
    next_episode: AtomicU32,
    shutdown_signal: AtomicBool,
}

impl Arena {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let game_config = config.game_config();
        let candidate = build_candidate(&config)?;
        let opponents = build_opponents(&config)?;
        let arm_names: Vec<String> = opponents.iter().map(|a| a.name().to_string()).collect();

        let agents = std::iter::once(CANDIDATE_NAME.to_string()).chain(arm_names.iter().cloned());
        let elo = EloRater::with_agents(agents, config.k_factor, config.default_rating)
            .map_err(|e| anyhow!("invalid Elo configuration: {}", e))?;

        info!(
            opponents = ?arm_names,
            candidate_iterations = config.candidate_iterations,
            board = format!(
                "{}x{} connect {}",
                game_config.board_height, game_config.board_width, game_config.win_length
            ),
            "Arena initialized"
        );

        Ok(Self {
            game_config,
            candidate,
            opponents,
            stats: ArenaStats::new(arm_names),
            elo: Mutex::new(elo),
            next_episode: AtomicU32::new(0),
            shutdown_signal: AtomicBool::new(false),
            config,
        })
    }

    /// Run all episodes, write arena_results.json and return the results.
    pub async fn run(self: Arc<Self>) -> Result<ArenaResults> {
        info!(
            episodes = self.config.episodes,
            concurrency = self.config.concurrency,
            seed = self.config.seed,
            "Arena starting"
        );
        let start = Instant::now();

        let exp3 = Exp3::new(self.opponents.len(), self.config.gamma)?
            .with_renormalize_interval(self.config.renormalize_interval);
        let mut bandit_rng = ChaCha20Rng::seed_from_u64(self.config.seed);
        bandit_rng.set_stream(BANDIT_STREAM);
        let (handle, bandit_task) =
            spawn_bandit(exp3, bandit_rng, self.config.channel_capacity);

        let progress = self.progress_bar()?;

        let workers: Vec<_> = (0..self.config.concurrency)
            .map(|worker_index| {
                tokio::spawn(Arc::clone(&self).worker(
                    worker_index,
                    handle.clone(),
                    progress.clone(),
                ))
            })
            .collect();

        // The bandit task ends once the last worker drops its handle
        drop(handle);

        let mut first_error = None;
        for (worker_index, worker) in workers.into_iter().enumerate() {
            match worker.await {
                Ok(Ok(played)) => debug!(worker = worker_index, played, "Worker finished"),
                Ok(Err(e)) => {
                    error!(worker = worker_index, "Worker failed: {}", e);
                    first_error.get_or_insert(e);
                }
                Err(e) => {
                    error!(worker = worker_index, "Worker panicked: {}", e);
                    first_error.get_or_insert(anyhow!("worker {} panicked: {}", worker_index, e));
                }
            }
        }

        let bandit = bandit_task
            .await
            .map_err(|e| anyhow!("Bandit task failed: {}", e))?;

        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let results = self.results(&bandit)?;
        let path = self.config.results_path();
        write_results(&path, &results)?;

        info!(
            episodes = results.stats.episodes_completed,
            candidate_wins = results.stats.candidate_wins,
            candidate_losses = results.stats.candidate_losses,
            draws = results.stats.draws,
            elapsed_secs = format!("{:.1}", start.elapsed().as_secs_f64()),
            "Arena finished, results written to {}",
            path.display()
        );
        for (rank, entry) in results.leaderboard.iter().enumerate() {
            info!("#{} {} {:.1}", rank + 1, entry.agent, entry.rating);
        }

        Ok(results)
    }

    /// Stop workers after their current episode.
    pub fn shutdown(&self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        info!("Shutdown signal set");
    }

    async fn worker(
        self: Arc<Self>,
        worker_index: usize,
        bandit: BanditHandle,
        progress: Option<ProgressBar>,
    ) -> Result<u32> {
        let mut rng = ChaCha20Rng::seed_from_u64(self.config.seed.wrapping_add(worker_index as u64));
        let mut played = 0;

        loop {
            if self.shutdown_signal.load(Ordering::Relaxed) {
                debug!(worker = worker_index, "Shutdown signal received, stopping worker");
                break;
            }

            let episode = self.next_episode.fetch_add(1, Ordering::Relaxed);
            if episode >= self.config.episodes {
                break;
            }

            let arm = bandit.select_arm().await?;
            let opponent = Arc::clone(&self.opponents[arm]);
            let candidate = Arc::clone(&self.candidate);
            let game_config = self.game_config;
            let seat = candidate_seat(episode);

            // Searches are CPU-bound; keep them off the async workers
            let (outcome, returned_rng) = tokio::task::spawn_blocking(move || {
                let outcome =
                    play_episode(game_config, candidate.as_ref(), opponent.as_ref(), seat, &mut rng);
                (outcome, rng)
            })
            .await
            .map_err(|e| anyhow!("Episode {} task failed: {}", episode, e))?;
            rng = returned_rng;

            match outcome {
                Ok(result) => {
                    self.record(&bandit, episode, arm, &result, progress.as_ref())
                        .await?;
                    played += 1;
                }
                Err(e) => {
                    // Continue with next episode rather than stopping
                    error!(
                        episode,
                        opponent = self.opponents[arm].name(),
                        "Episode failed: {}",
                        e
                    );
                }
            }
        }

        Ok(played)
    }

    /// Feed one finished episode to the bandit, the rater and the stats.
    async fn record(
        &self,
        bandit: &BanditHandle,
        episode: u32,
        arm: usize,
        result: &EpisodeResult,
        progress: Option<&ProgressBar>,
    ) -> Result<()> {
        let opponent = self.opponents[arm].name();
        bandit.observe(arm, result.bandit_reward()).await?;

        let candidate_rating = {
            let mut elo = self.lock_elo()?;
            let ratings = elo.rate(CANDIDATE_NAME, opponent, result.elo_outcome());
            ratings.get(CANDIDATE_NAME).copied().unwrap_or(self.config.default_rating)
        };

        let completed = self.stats.record_episode(arm, result);
        debug!(
            episode,
            opponent,
            outcome = %result.elo_outcome(),
            moves = result.moves,
            candidate_rating,
            "Episode completed"
        );

        if let Some(pb) = progress {
            pb.inc(1);
        }

        if self.config.log_interval > 0 && completed % self.config.log_interval == 0 {
            let snapshot = self.stats.snapshot();
            let probabilities = match bandit.probabilities().await {
                Ok(p) => p,
                Err(e) => {
                    warn!("Failed to read bandit probabilities: {}", e);
                    Vec::new()
                }
            };
            let log = || {
                info!(
                    episodes = completed,
                    candidate_wins = snapshot.candidate_wins,
                    candidate_losses = snapshot.candidate_losses,
                    draws = snapshot.draws,
                    score_rate = format!("{:.3}", snapshot.candidate_score_rate()),
                    candidate_rating = format!("{:.1}", candidate_rating),
                    arm_probabilities = ?probabilities,
                    "Arena progress"
                );
            };
            // Suspend progress bar while logging to avoid visual glitches
            match progress {
                Some(pb) => pb.suspend(log),
                None => log(),
            }
        }

        Ok(())
    }

    fn results(&self, bandit: &Exp3) -> Result<ArenaResults> {
        let leaderboard = self
            .lock_elo()?
            .leaderboard()
            .into_iter()
            .map(|(agent, rating)| RatingEntry { agent, rating })
            .collect();

        Ok(ArenaResults {
            stats: self.stats.snapshot(),
            leaderboard,
            bandit: BanditReport {
                arms: self.opponents.iter().map(|a| a.name().to_string()).collect(),
                weights: bandit.weights().to_vec(),
                probabilities: bandit.probabilities(),
                gamma: bandit.gamma(),
                observations: bandit.observations(),
            },
            timestamp: unix_timestamp(),
        })
    }

    /// Progress bar for the run, only when stderr is a TTY.
    fn progress_bar(&self) -> Result<Option<ProgressBar>> {
        if !std::io::IsTerminal::is_terminal(&std::io::stderr()) {
            return Ok(None);
        }
        let pb = ProgressBar::new(u64::from(self.config.episodes));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} episodes ({eta})")
                .map_err(|e| anyhow!("Invalid progress template: {}", e))?
                .progress_chars("#>-"),
        );
        Ok(Some(pb))
    }

    /// Acquire Elo lock with consistent error handling
    fn lock_elo(&self) -> Result<MutexGuard<'_, EloRater>> {
        self.elo
            .lock()
            .map_err(|e| anyhow!("Elo lock poisoned: {}", e))
    }
}
