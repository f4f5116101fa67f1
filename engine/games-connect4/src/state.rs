//! Bitboard game state.

use engine_core::{Game, MoveError, Player};

use crate::config::{ConfigError, Connect4Config};

/// Widest board a `u128` mask can hold: one playable row plus the guard row per column.
pub const MAX_WIDTH: usize = u128::BITS as usize / 2;

/// Connect4 game state
///
/// Holds one stone mask per player, the per-column stone counts and the side
/// to move. Cloning is a plain copy of fixed-size arrays, so search can
/// duplicate states freely.
#[derive(Debug, Clone, PartialEq)]
pub struct Connect4 {
    config: Connect4Config,
    /// Stone mask per seat, indexed by `Player::index()`
    stones: [u128; 2],
    /// Stones per column; also the row index of the next free cell
    column_height: [u8; MAX_WIDTH],
    side_to_move: Player,
    /// Shift offsets: vertical, horizontal, and the two diagonals
    directions: [usize; 4],
}

impl Connect4 {
    /// Create an empty board with the given configuration.
    pub fn new(config: Connect4Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new_unchecked(config))
    }

    /// Empty 6x7 board, four in a row, default rewards.
    pub fn standard() -> Self {
        Self::new_unchecked(Connect4Config::default())
    }

    pub(crate) fn new_unchecked(config: Connect4Config) -> Self {
        let stride = config.column_stride();
        Self {
            config,
            stones: [0; 2],
            column_height: [0; MAX_WIDTH],
            side_to_move: Player::First,
            directions: [1, stride, stride - 1, stride + 1],
        }
    }

    pub fn config(&self) -> &Connect4Config {
        &self.config
    }

    pub fn board_height(&self) -> usize {
        self.config.board_height
    }

    pub fn board_width(&self) -> usize {
        self.config.board_width
    }

    pub fn win_length(&self) -> usize {
        self.config.win_length
    }

    /// Raw stone mask for `player`.
    pub fn stones(&self, player: Player) -> u128 {
        self.stones[player.index()]
    }

    /// Stone count per column, `board_width` entries.
    pub fn column_heights(&self) -> &[u8] {
        &self.column_height[..self.config.board_width]
    }

    /// Total stones on the board.
    pub fn moves_played(&self) -> usize {
        self.column_heights().iter().map(|&h| h as usize).sum()
    }

    /// Bit index of a cell; row 0 is the bottom row.
    #[inline]
    pub fn bit_index(&self, column: usize, row: usize) -> usize {
        column * self.config.column_stride() + row
    }

    /// Owner of a cell, `None` if empty or off the board.
    pub fn cell(&self, column: usize, row: usize) -> Option<Player> {
        if column >= self.config.board_width || row >= self.config.board_height {
            return None;
        }
        let bit = 1u128 << self.bit_index(column, row);
        Player::BOTH
            .into_iter()
            .find(|player| self.stones[player.index()] & bit != 0)
    }

    /// Whether a stone can be dropped into `column` (ignores wins).
    pub fn is_valid_move(&self, column: usize) -> bool {
        column < self.config.board_width
            && (self.column_height[column] as usize) < self.config.board_height
    }

    /// Per-column mask: 1 where the column still has room, 0 where it is full.
    pub fn action_mask(&self) -> Vec<u8> {
        (0..self.config.board_width)
            .map(|column| u8::from(self.is_valid_move(column)))
            .collect()
    }

    fn has_winner(&self) -> bool {
        self.is_winner(Player::First) || self.is_winner(Player::Second)
    }

    fn is_board_full(&self) -> bool {
        self.column_heights()
            .iter()
            .all(|&h| h as usize == self.config.board_height)
    }

    /// Place a stone for `player` without any legality checks.
    pub(crate) fn place_unchecked(&mut self, column: usize, player: Player) {
        let row = self.column_height[column] as usize;
        self.stones[player.index()] |= 1u128 << self.bit_index(column, row);
        self.column_height[column] += 1;
    }

    pub(crate) fn set_side_to_move(&mut self, player: Player) {
        self.side_to_move = player;
    }
}

/// Right shift that yields an empty mask once the shift leaves the board.
#[inline]
fn shift_right(mask: u128, shift: usize) -> u128 {
    u32::try_from(shift)
        .ok()
        .and_then(|s| mask.checked_shr(s))
        .unwrap_or(0)
}

impl Game for Connect4 {
    type Move = usize;

    fn side_to_move(&self) -> Player {
        self.side_to_move
    }

    fn legal_moves(&self) -> Vec<usize> {
        // A won position is terminal even if columns remain open
        if self.has_winner() {
            return Vec::new();
        }
        (0..self.config.board_width)
            .filter(|&column| self.is_valid_move(column))
            .collect()
    }

    fn apply_move(&mut self, column: usize) -> Result<(), MoveError> {
        if column >= self.config.board_width {
            return Err(MoveError::OutOfRange {
                column,
                width: self.config.board_width,
            });
        }
        if self.has_winner() {
            return Err(MoveError::GameOver);
        }
        if !self.is_valid_move(column) {
            return Err(MoveError::ColumnFull { column });
        }

        self.place_unchecked(column, self.side_to_move);
        self.side_to_move = self.side_to_move.other();
        Ok(())
    }

    fn is_winner(&self, player: Player) -> bool {
        let mask = self.stones[player.index()];
        if mask == 0 {
            return false;
        }

        self.directions.iter().any(|&direction| {
            let mut run = mask;
            for step in 1..self.config.win_length {
                run &= shift_right(mask, step * direction);
                if run == 0 {
                    break;
                }
            }
            run != 0
        })
    }

    fn is_draw(&self) -> bool {
        self.is_board_full() && !self.has_winner()
    }

    fn is_terminal(&self) -> bool {
        self.has_winner() || self.is_board_full()
    }

    fn score(&self, player: Player) -> f64 {
        if self.is_winner(player) {
            self.config.reward_win
        } else if self.is_winner(player.other()) {
            self.config.reward_lose
        } else if self.is_draw() {
            self.config.reward_draw
        } else {
            self.config.reward_step
        }
    }
}

impl Default for Connect4 {
    fn default() -> Self {
        Self::standard()
    }
}
