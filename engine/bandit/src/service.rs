//! Serialized bandit service.
//!
//! A single tokio task owns the [`Exp3`] weights and its random source;
//! callers talk to it through a cloneable [`BanditHandle`]. Commands are
//! processed one at a time in arrival order, so every draw sees either all
//! of a preceding update or none of it.

use rand::Rng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::BanditError;
use crate::exp3::{Exp3, Exp3Snapshot};

enum Command {
    SelectArm {
        reply: oneshot::Sender<usize>,
    },
    Observe {
        arm: usize,
        reward: f64,
        reply: oneshot::Sender<Result<(), BanditError>>,
    },
    Probabilities {
        reply: oneshot::Sender<Vec<f64>>,
    },
    Snapshot {
        reply: oneshot::Sender<Exp3Snapshot>,
    },
}

/// Cloneable front-end to a running bandit task.
#[derive(Debug, Clone)]
pub struct BanditHandle {
    sender: mpsc::Sender<Command>,
    num_arms: usize,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::SelectArm { .. } => write!(f, "SelectArm"),
            Command::Observe { arm, reward, .. } => write!(f, "Observe({}, {})", arm, reward),
            Command::Probabilities { .. } => write!(f, "Probabilities"),
            Command::Snapshot { .. } => write!(f, "Snapshot"),
        }
    }
}

/// Start the bandit task on the current tokio runtime.
///
/// The task exits once every handle has been dropped and returns the final
/// bandit state through the join handle. `capacity` bounds the number of
/// queued commands (at least 1).
pub fn spawn_bandit<R>(
    bandit: Exp3,
    mut rng: R,
    capacity: usize,
) -> (BanditHandle, JoinHandle<Exp3>)
where
    R: Rng + Send + 'static,
{
    let (sender, mut receiver) = mpsc::channel::<Command>(capacity.max(1));
    let num_arms = bandit.num_arms();

    let task = tokio::spawn(async move {
        let mut bandit = bandit;
        while let Some(command) = receiver.recv().await {
            // A dropped reply receiver only means the caller gave up waiting
            match command {
                Command::SelectArm { reply } => {
                    let _ = reply.send(bandit.select_arm(&mut rng));
                }
                Command::Observe { arm, reward, reply } => {
                    let _ = reply.send(bandit.observe(arm, reward));
                }
                Command::Probabilities { reply } => {
                    let _ = reply.send(bandit.probabilities());
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(bandit.snapshot());
                }
            }
        }
        debug!(
            observations = bandit.observations(),
            "Bandit service stopped"
        );
        bandit
    });

    (BanditHandle { sender, num_arms }, task)
}

impl BanditHandle {
    pub fn num_arms(&self) -> usize {
        self.num_arms
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, BanditError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make(reply))
            .await
            .map_err(|_| BanditError::ServiceStopped)?;
        response.await.map_err(|_| BanditError::ServiceStopped)
    }

    /// Draw an arm from the current distribution.
    pub async fn select_arm(&self) -> Result<usize, BanditError> {
        self.request(|reply| Command::SelectArm { reply }).await
    }

    /// Report `reward` in `[0, 1]` for `arm`.
    pub async fn observe(&self, arm: usize, reward: f64) -> Result<(), BanditError> {
        self.request(|reply| Command::Observe { arm, reward, reply })
            .await?
    }

    pub async fn probabilities(&self) -> Result<Vec<f64>, BanditError> {
        self.request(|reply| Command::Probabilities { reply }).await
    }

    pub async fn snapshot(&self) -> Result<Exp3Snapshot, BanditError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }
}
