//! Arena - Connect-Four evaluation driver
//!
//! A bounded batch process that:
//! 1. Builds a candidate MCTS agent and a pool of opponents
//! 2. Lets an Exp3 bandit pick the opponent for every episode
//! 3. Runs episodes on concurrent workers, rating every result with Elo
//! 4. Writes `arena_results.json` (stats, leaderboard, bandit state) to the data directory

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

mod agent;
mod arena;
mod config;
mod episode;
mod stats;

use crate::arena::Arena;
use crate::config::Config;

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Validate configuration
    config.validate()?;

    // Initialize tracing
    init_tracing(&config.log_level)?;
    info!(log_level = %config.log_level, "Tracing initialized");

    info!(
        episodes = config.episodes,
        concurrency = config.concurrency,
        backup = %config.backup,
        "Starting arena"
    );

    // Create arena instance
    let arena = Arc::new(Arena::new(config)?);

    // Setup graceful shutdown
    let shutdown_arena = Arc::clone(&arena);
    let shutdown_handle = tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl+c: {}", e);
            return;
        }
        info!("Shutdown signal received, finishing current episodes...");
        shutdown_arena.shutdown();
    });

    // Run the arena
    let run_result = arena.run().await;

    // Wait for shutdown to complete
    shutdown_handle.abort();

    match run_result {
        Ok(results) => {
            info!(
                episodes = results.stats.episodes_completed,
                score_rate = format!("{:.3}", results.stats.candidate_score_rate()),
                "Arena completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!("Arena failed: {}", e);
            Err(e)
        }
    }
}
