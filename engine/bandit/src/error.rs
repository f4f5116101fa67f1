//! Bandit error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BanditError {
    #[error("invalid bandit configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown arm {arm} (bandit has {num_arms} arms)")]
    UnknownArm { arm: usize, num_arms: usize },

    #[error("reward {0} is outside [0, 1]")]
    InvalidReward(f64),

    #[error("bandit service has stopped")]
    ServiceStopped,
}
