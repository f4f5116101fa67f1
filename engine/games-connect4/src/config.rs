//! Board geometry and reward configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of bits available in a player mask.
pub const MAX_BOARD_BITS: usize = u128::BITS as usize;

/// Errors raised for malformed engine configuration or board snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board dimensions must be positive, got {height}x{width}")]
    InvalidDimensions { height: usize, width: usize },

    #[error(
        "board {height}x{width} needs {needed} bitboard cells, at most {} are available",
        MAX_BOARD_BITS
    )]
    BoardTooLarge {
        height: usize,
        width: usize,
        needed: usize,
    },

    #[error("win_length {win_length} must be in 1..={max} for a {height}x{width} board")]
    InvalidWinLength {
        win_length: usize,
        max: usize,
        height: usize,
        width: usize,
    },

    #[error("reward_{0} must be finite")]
    NonFiniteReward(&'static str),

    #[error("invalid board snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Engine parameters, fixed for the lifetime of a game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connect4Config {
    pub board_height: usize,
    pub board_width: usize,
    pub win_length: usize,
    pub reward_win: f64,
    pub reward_draw: f64,
    pub reward_lose: f64,
    pub reward_step: f64,
}

impl Default for Connect4Config {
    fn default() -> Self {
        Self {
            board_height: 6,
            board_width: 7,
            win_length: 4,
            reward_win: 1.0,
            reward_draw: 0.5,
            reward_lose: 0.0,
            reward_step: 0.0,
        }
    }
}

impl Connect4Config {
    /// Builder pattern: set board geometry.
    pub fn with_board(mut self, height: usize, width: usize, win_length: usize) -> Self {
        self.board_height = height;
        self.board_width = width;
        self.win_length = win_length;
        self
    }

    /// Builder pattern: set win / draw / lose / step rewards.
    pub fn with_rewards(mut self, win: f64, draw: f64, lose: f64, step: f64) -> Self {
        self.reward_win = win;
        self.reward_draw = draw;
        self.reward_lose = lose;
        self.reward_step = step;
        self
    }

    /// Number of bits one column occupies, guard row included.
    #[inline]
    pub fn column_stride(&self) -> usize {
        self.board_height + 1
    }

    /// Check that the geometry fits a `u128` bitboard and the rewards are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (height, width) = (self.board_height, self.board_width);
        if height == 0 || width == 0 {
            return Err(ConfigError::InvalidDimensions { height, width });
        }

        let needed = self.column_stride().saturating_mul(width);
        if needed > MAX_BOARD_BITS {
            return Err(ConfigError::BoardTooLarge {
                height,
                width,
                needed,
            });
        }

        if self.win_length == 0 || self.win_length > height.max(width) {
            return Err(ConfigError::InvalidWinLength {
                win_length: self.win_length,
                max: height.max(width),
                height,
                width,
            });
        }

        for (name, value) in [
            ("win", self.reward_win),
            ("draw", self.reward_draw),
            ("lose", self.reward_lose),
            ("step", self.reward_step),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteReward(name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Connect4Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.column_stride(), 7);
        assert!((config.reward_draw - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let config = Connect4Config::default().with_board(0, 7, 4);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDimensions {
                height: 0,
                width: 7
            })
        );
    }

    #[test]
    fn test_rejects_board_too_large() {
        // 16 * 8 = 128 fits, 16 * 9 does not
        assert!(Connect4Config::default()
            .with_board(15, 8, 4)
            .validate()
            .is_ok());
        let err = Connect4Config::default()
            .with_board(15, 9, 4)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::BoardTooLarge { needed: 144, .. }));
    }

    #[test]
    fn test_rejects_malformed_win_length() {
        assert!(Connect4Config::default()
            .with_board(6, 7, 0)
            .validate()
            .is_err());
        assert!(Connect4Config::default()
            .with_board(6, 7, 8)
            .validate()
            .is_err());
        assert!(Connect4Config::default()
            .with_board(6, 7, 7)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_rejects_non_finite_reward() {
        let config = Connect4Config::default().with_rewards(f64::NAN, 0.5, 0.0, 0.0);
        assert_eq!(config.validate(), Err(ConfigError::NonFiniteReward("win")));
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::InvalidWinLength {
            win_length: 9,
            max: 7,
            height: 6,
            width: 7,
        };
        assert_eq!(
            err.to_string(),
            "win_length 9 must be in 1..=7 for a 6x7 board"
        );
    }
}
