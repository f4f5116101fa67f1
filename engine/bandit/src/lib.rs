//! Exp3 adversarial bandit for picking which opponent a learner faces.
//!
//! - [`Exp3`]: the synchronous weight vector and update rule
//! - [`spawn_bandit`] / [`BanditHandle`]: a single-owner tokio task that
//!   serializes `select_arm` and `observe` calls from many episode runners
//!
//! # Usage
//!
//! ```rust
//! use bandit::{spawn_bandit, Exp3};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), bandit::BanditError> {
//! let (bandit, _task) = spawn_bandit(Exp3::new(3, 0.07)?, ChaCha20Rng::seed_from_u64(42), 64);
//!
//! let arm = bandit.select_arm().await?;
//! bandit.observe(arm, 1.0).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod exp3;
mod service;

pub use error::BanditError;
pub use exp3::{Exp3, Exp3Snapshot, DEFAULT_RENORMALIZE_INTERVAL, RENORMALIZE_THRESHOLD};
pub use service::{spawn_bandit, BanditHandle};
