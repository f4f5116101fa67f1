//! Synchronous Exp3 core.
//!
//! Arms are drawn from `p_i = (1 - gamma) * w_i / sum(w) + gamma / K`, and an
//! observed reward `r` in `[0, 1]` for arm `i` multiplies its weight by
//! `exp(gamma * r / (K * p_i))`, with `p_i` recomputed from the current
//! weights. Because `p_i >= gamma / K`, a single update grows a weight by at
//! most a factor of `e`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BanditError;

/// Weight sum above which the vector is renormalized regardless of interval.
pub const RENORMALIZE_THRESHOLD: f64 = 1e100;

/// Default number of observations between renormalizations.
pub const DEFAULT_RENORMALIZE_INTERVAL: u64 = 1000;

/// Serializable bandit state, for persistence by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exp3Snapshot {
    pub weights: Vec<f64>,
    pub gamma: f64,
    pub renormalize_interval: u64,
    pub observations: u64,
}

/// Exp3 adversarial multi-armed bandit.
///
/// Not synchronized; share it through [`crate::BanditHandle`].
#[derive(Debug, Clone, PartialEq)]
pub struct Exp3 {
    weights: Vec<f64>,
    gamma: f64,
    /// Renormalize every this many observations; 0 disables the schedule
    renormalize_interval: u64,
    observations: u64,
}

fn validate_gamma(gamma: f64) -> Result<(), BanditError> {
    if gamma.is_finite() && gamma > 0.0 && gamma <= 1.0 {
        Ok(())
    } else {
        Err(BanditError::InvalidConfiguration(format!(
            "gamma must be in (0, 1], got {}",
            gamma
        )))
    }
}

impl Exp3 {
    /// Create a bandit with `num_arms` arms, all weights 1.0.
    pub fn new(num_arms: usize, gamma: f64) -> Result<Self, BanditError> {
        if num_arms == 0 {
            return Err(BanditError::InvalidConfiguration(
                "num_arms must be positive".into(),
            ));
        }
        validate_gamma(gamma)?;

        Ok(Self {
            weights: vec![1.0; num_arms],
            gamma,
            renormalize_interval: DEFAULT_RENORMALIZE_INTERVAL,
            observations: 0,
        })
    }

    /// Builder pattern: set the renormalization interval (0 = threshold only).
    pub fn with_renormalize_interval(mut self, interval: u64) -> Self {
        self.renormalize_interval = interval;
        self
    }

    pub fn num_arms(&self) -> usize {
        self.weights.len()
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Rewards observed so far.
    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Selection distribution implied by the current weights.
    pub fn probabilities(&self) -> Vec<f64> {
        let total: f64 = self.weights.iter().sum();
        let k = self.weights.len() as f64;
        self.weights
            .iter()
            .map(|w| (1.0 - self.gamma) * w / total + self.gamma / k)
            .collect()
    }

    /// Selection probability of a single arm.
    pub fn probability(&self, arm: usize) -> Result<f64, BanditError> {
        self.check_arm(arm)?;
        let total: f64 = self.weights.iter().sum();
        let k = self.weights.len() as f64;
        Ok((1.0 - self.gamma) * self.weights[arm] / total + self.gamma / k)
    }

    /// Draw an arm index in `[0, num_arms)`.
    pub fn select_arm<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let probabilities = self.probabilities();
        let r: f64 = rng.gen();
        let mut cumsum = 0.0;

        for (arm, &p) in probabilities.iter().enumerate() {
            cumsum += p;
            if r < cumsum {
                return arm;
            }
        }

        // Rounding left the cumulative sum just short of 1.0
        probabilities.len() - 1
    }

    /// Apply the Exp3 update for `reward` observed on `arm`.
    pub fn observe(&mut self, arm: usize, reward: f64) -> Result<(), BanditError> {
        let p = self.probability(arm)?;
        if !(0.0..=1.0).contains(&reward) {
            return Err(BanditError::InvalidReward(reward));
        }

        let k = self.weights.len() as f64;
        let growth = (self.gamma * reward / (k * p)).exp();
        let weight = &mut self.weights[arm];
        *weight = (*weight * growth).max(f64::MIN_POSITIVE);
        self.observations += 1;

        debug!(
            arm,
            reward,
            p,
            weight = self.weights[arm],
            observations = self.observations,
            "Exp3 update"
        );

        let scheduled = self.renormalize_interval > 0
            && self.observations % self.renormalize_interval == 0;
        if scheduled || self.weights.iter().sum::<f64>() > RENORMALIZE_THRESHOLD {
            self.renormalize();
        }

        Ok(())
    }

    /// Divide every weight by the total. The selection distribution is
    /// unchanged up to rounding; weights stay strictly positive.
    pub fn renormalize(&mut self) {
        let total: f64 = self.weights.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return;
        }
        for weight in &mut self.weights {
            *weight = (*weight / total).max(f64::MIN_POSITIVE);
        }
    }

    pub fn snapshot(&self) -> Exp3Snapshot {
        Exp3Snapshot {
            weights: self.weights.clone(),
            gamma: self.gamma,
            renormalize_interval: self.renormalize_interval,
            observations: self.observations,
        }
    }

    /// Restore a bandit from a snapshot, validating it first.
    pub fn from_snapshot(snapshot: Exp3Snapshot) -> Result<Self, BanditError> {
        if snapshot.weights.is_empty() {
            return Err(BanditError::InvalidConfiguration(
                "snapshot has no arms".into(),
            ));
        }
        validate_gamma(snapshot.gamma)?;
        if let Some(bad) = snapshot
            .weights
            .iter()
            .find(|w| !(w.is_finite() && **w > 0.0))
        {
            return Err(BanditError::InvalidConfiguration(format!(
                "snapshot weight {} is not strictly positive",
                bad
            )));
        }

        Ok(Self {
            weights: snapshot.weights,
            gamma: snapshot.gamma,
            renormalize_interval: snapshot.renormalize_interval,
            observations: snapshot.observations,
        })
    }

    fn check_arm(&self, arm: usize) -> Result<(), BanditError> {
        if arm < self.weights.len() {
            Ok(())
        } else {
            Err(BanditError::UnknownArm {
                arm,
                num_arms: self.weights.len(),
            })
        }
    }
}
