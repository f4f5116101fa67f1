//! Connect 4 game implementation for the arena engine
//!
//! Connect 4 is a two-player connection game where players drop discs into a
//! vertically suspended grid. The first player to line up `win_length` discs
//! horizontally, vertically or diagonally wins. Board height, width, win
//! length and rewards are all configurable; the defaults are the classic
//! 6x7 board with four in a row.
//!
//! # Bitboard Layout
//!
//! Each player owns one `u128` mask. Cells are addressed column-major with
//! one unused guard row on top of every column:
//! ```text
//! bit = column * (board_height + 1) + row
//!
//!          6 13 20 27 34 41 48   <- guard row (always empty)
//! Row 5:   5 12 19 26 33 40 47   <- Top
//! Row 4:   4 11 18 25 32 39 46
//! Row 3:   3 10 17 24 31 38 45
//! Row 2:   2  9 16 23 30 37 44
//! Row 1:   1  8 15 22 29 36 43
//! Row 0:   0  7 14 21 28 35 42   <- Bottom
//!        Col 0  1  2  3  4  5  6
//! ```
//!
//! Win detection shifts a mask by a direction offset (vertical 1, horizontal
//! `height + 1`, diagonals `height` and `height + 2`) and ANDs it with
//! itself. The guard row keeps runs from wrapping into the next column.
//!
//! # Usage
//!
//! ```rust
//! use games_connect4::{Connect4, Game, Player};
//!
//! let mut game = Connect4::standard();
//! for column in [3, 0, 3, 0, 3, 0, 3] {
//!     game.apply_move(column).unwrap();
//! }
//! assert!(game.is_winner(Player::First));
//! assert!(game.legal_moves().is_empty());
//! ```

mod config;
mod snapshot;
mod state;

pub use config::{ConfigError, Connect4Config, MAX_BOARD_BITS};
pub use snapshot::{EMPTY, FIRST_PLAYER, SECOND_PLAYER};
pub use state::{Connect4, MAX_WIDTH};

// The engine is consumed through the shared game interface
pub use engine_core::{Game, GameOutcome, MoveError, Player};
