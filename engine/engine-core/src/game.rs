//! The game interface consumed by search and orchestration.
//!
//! Search never inspects a game's internals: it clones states, applies moves
//! and asks the queries below. Implementations must keep every query pure so
//! that `clone()` followed by `apply_move` on the copy never disturbs the
//! original.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::MoveError;
use crate::player::Player;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win(Player),
    Draw,
}

impl GameOutcome {
    /// The winning seat, if the game was not drawn.
    pub fn winner(self) -> Option<Player> {
        match self {
            GameOutcome::Win(player) => Some(player),
            GameOutcome::Draw => None,
        }
    }
}

/// A two-player, alternating-move, perfect-information game.
pub trait Game: Clone + Debug {
    /// Action type. Connect-Four uses the column index.
    type Move: Copy + Eq + Debug;

    /// Seat whose turn it is.
    fn side_to_move(&self) -> Player;

    /// Seat that made the most recent move.
    ///
    /// Before any move has been made this is the opponent of the opening
    /// player, so that `last_mover() == side_to_move().other()` always holds.
    fn last_mover(&self) -> Player {
        self.side_to_move().other()
    }

    /// Ordered legal moves. Empty once the game is terminal.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Apply a move for the side to move. The only mutating operation.
    fn apply_move(&mut self, mv: Self::Move) -> Result<(), MoveError>;

    /// Whether `player` has completed a winning pattern.
    fn is_winner(&self, player: Player) -> bool;

    /// No legal moves remain and neither seat has won.
    fn is_draw(&self) -> bool {
        !self.is_winner(Player::First)
            && !self.is_winner(Player::Second)
            && self.legal_moves().is_empty()
    }

    /// Either seat has won or the game is drawn.
    fn is_terminal(&self) -> bool {
        self.is_winner(Player::First) || self.is_winner(Player::Second) || self.is_draw()
    }

    /// Reward for `player` in the current state (step reward while ongoing).
    fn score(&self, player: Player) -> f64;

    /// Outcome of a terminal state, `None` while the game is still running.
    fn outcome(&self) -> Option<GameOutcome> {
        if self.is_winner(Player::First) {
            Some(GameOutcome::Win(Player::First))
        } else if self.is_winner(Player::Second) {
            Some(GameOutcome::Win(Player::Second))
        } else if self.is_draw() {
            Some(GameOutcome::Draw)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Race to exactly 5: each turn adds 1 or 2; hitting 5 wins, overshooting is illegal.
    #[derive(Debug, Clone, Default)]
    struct RaceToFive {
        total: u8,
        turn: usize,
        winner: Option<Player>,
    }

    impl Game for RaceToFive {
        type Move = u8;

        fn side_to_move(&self) -> Player {
            Player::from_index(self.turn % 2).unwrap()
        }

        fn legal_moves(&self) -> Vec<u8> {
            if self.winner.is_some() {
                return Vec::new();
            }
            [1, 2].into_iter().filter(|step| self.total + step <= 5).collect()
        }

        fn apply_move(&mut self, mv: u8) -> Result<(), MoveError> {
            if self.winner.is_some() {
                return Err(MoveError::GameOver);
            }
            if !self.legal_moves().contains(&mv) {
                return Err(MoveError::OutOfRange {
                    column: mv as usize,
                    width: 2,
                });
            }
            self.total += mv;
            if self.total == 5 {
                self.winner = Some(self.side_to_move());
            }
            self.turn += 1;
            Ok(())
        }

        fn is_winner(&self, player: Player) -> bool {
            self.winner == Some(player)
        }

        fn score(&self, player: Player) -> f64 {
            match self.winner {
                Some(w) if w == player => 1.0,
                Some(_) => 0.0,
                None => 0.0,
            }
        }
    }

    #[test]
    fn test_default_queries_on_fresh_game() {
        let game = RaceToFive::default();
        assert_eq!(game.side_to_move(), Player::First);
        assert_eq!(game.last_mover(), Player::Second);
        assert!(!game.is_draw());
        assert!(!game.is_terminal());
        assert_eq!(game.outcome(), None);
    }

    #[test]
    fn test_outcome_after_win() {
        let mut game = RaceToFive::default();
        for mv in [2, 1, 2] {
            game.apply_move(mv).unwrap();
        }
        assert!(game.is_terminal());
        assert!(!game.is_draw());
        assert_eq!(game.outcome(), Some(GameOutcome::Win(Player::First)));
        assert_eq!(game.last_mover(), Player::First);
        assert_eq!(game.apply_move(1), Err(MoveError::GameOver));
    }

    #[test]
    fn test_outcome_winner() {
        assert_eq!(GameOutcome::Win(Player::Second).winner(), Some(Player::Second));
        assert_eq!(GameOutcome::Draw.winner(), None);
    }
}
