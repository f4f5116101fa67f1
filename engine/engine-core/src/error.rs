//! Errors raised by game implementations.

use thiserror::Error;

/// A move that the game refused to apply.
///
/// Always a caller error: the state is left untouched and nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move: column {column} is full")]
    ColumnFull { column: usize },

    #[error("illegal move: column {column} is out of range (board width {width})")]
    OutOfRange { column: usize, width: usize },

    #[error("illegal move: the game is already over")]
    GameOver,
}
