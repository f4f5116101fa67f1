//! Building states from externally supplied board grids, and rendering them.
//!
//! Grids are row-major with row 0 the TOP row, the layout observations use.

use std::fmt;

use engine_core::{Game, Player};

use crate::config::{ConfigError, Connect4Config};
use crate::state::Connect4;

/// Grid marker for an empty cell.
pub const EMPTY: u8 = 0;
/// Grid marker for a `Player::First` stone.
pub const FIRST_PLAYER: u8 = 1;
/// Grid marker for a `Player::Second` stone.
pub const SECOND_PLAYER: u8 = 2;

fn marker_owner(marker: u8) -> Option<Option<Player>> {
    match marker {
        EMPTY => Some(None),
        FIRST_PLAYER => Some(Some(Player::First)),
        SECOND_PLAYER => Some(Some(Player::Second)),
        _ => None,
    }
}

fn snapshot_error(msg: impl Into<String>) -> ConfigError {
    ConfigError::InvalidSnapshot(msg.into())
}

impl Connect4 {
    /// Seed a state from a board snapshot.
    ///
    /// `grid` must be `board_height` rows of `board_width` markers. Stones
    /// must rest on the bottom or on another stone. The side to move follows
    /// from the stone counts, assuming `Player::First` opened the game; an
    /// explicit `side_to_move` that disagrees with them is rejected.
    pub fn from_snapshot<R: AsRef<[u8]>>(
        config: Connect4Config,
        grid: &[R],
        side_to_move: Option<Player>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (height, width) = (config.board_height, config.board_width);

        if grid.len() != height {
            return Err(snapshot_error(format!(
                "expected {} rows, got {}",
                height,
                grid.len()
            )));
        }
        for (row, cells) in grid.iter().enumerate() {
            if cells.as_ref().len() != width {
                return Err(snapshot_error(format!(
                    "row {} has {} cells, expected {}",
                    row,
                    cells.as_ref().len(),
                    width
                )));
            }
        }

        let mut state = Connect4::new_unchecked(config);
        let mut counts = [0usize; 2];

        for column in 0..width {
            let mut gap_seen = false;
            // Walk bottom-up so stones land in drop order
            for (grid_row, cells) in grid.iter().enumerate().rev() {
                let marker = cells.as_ref()[column];
                let owner = marker_owner(marker).ok_or_else(|| {
                    snapshot_error(format!(
                        "unknown marker {} at row {}, column {}",
                        marker, grid_row, column
                    ))
                })?;
                match owner {
                    None => gap_seen = true,
                    Some(_) if gap_seen => {
                        return Err(snapshot_error(format!(
                            "floating stone at row {}, column {}",
                            grid_row, column
                        )));
                    }
                    Some(player) => {
                        state.place_unchecked(column, player);
                        counts[player.index()] += 1;
                    }
                }
            }
        }

        let [first, second] = counts;
        let side = if first == second {
            Player::First
        } else if first == second + 1 {
            Player::Second
        } else {
            return Err(snapshot_error(format!(
                "stone counts {} and {} are not reachable by alternating moves",
                first, second
            )));
        };
        // An explicit side must agree with the counts
        if let Some(player) = side_to_move {
            if player != side {
                return Err(snapshot_error(format!(
                    "{:?} cannot be to move with stone counts {} and {}",
                    player, first, second
                )));
            }
        }
        state.set_side_to_move(side);

        Ok(state)
    }

    /// Inverse of [`Connect4::from_snapshot`]: row 0 is the top row.
    pub fn to_grid(&self) -> Vec<Vec<u8>> {
        (0..self.board_height())
            .rev()
            .map(|row| {
                (0..self.board_width())
                    .map(|column| match self.cell(column, row) {
                        None => EMPTY,
                        Some(Player::First) => FIRST_PLAYER,
                        Some(Player::Second) => SECOND_PLAYER,
                    })
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Connect4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.board_height()).rev() {
            let line: String = (0..self.board_width())
                .map(|column| match self.cell(column, row) {
                    None => '.',
                    Some(Player::First) => 'X',
                    Some(Player::Second) => 'O',
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        let footer: String = (0..self.board_width())
            .map(|column| std::char::from_digit((column % 10) as u32, 10).unwrap_or('?'))
            .collect();
        write!(f, "{}", footer)?;
        if !self.is_terminal() {
            write!(f, "  ({} to move)", self.side_to_move())?;
        }
        Ok(())
    }
}
