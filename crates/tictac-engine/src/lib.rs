//! Tic-Tac-Toe board engine.
//!
//! Pure, allocation-free rules for the 3×3 game: winner detection over the eight
//! fixed lines, legal move enumeration, terminal checks, and the player-relative
//! normalization that every network input goes through.
//!
//! # Cell Encoding
//!
//! A [`Board`] stores nine cells, each in `{+1, -1, 0}`:
//!
//! - `+1` - a mark placed by [`Player::X`] (or, after normalization, by the mover)
//! - `-1` - a mark placed by [`Player::O`] (or, after normalization, by the opponent)
//! - `0` - an empty cell
//!
//! Cell indices run row by row from the top-left corner:
//!
//! ```text
//!  0 | 1 | 2
//! ---+---+---
//!  3 | 4 | 5
//! ---+---+---
//!  6 | 7 | 8
//! ```
//!
//! # Example
//!
//! ```
//! use tictac_engine::{Board, Player};
//!
//! let mut board = Board::EMPTY;
//! board.play(4, Player::X).unwrap();
//! board.play(0, Player::O).unwrap();
//!
//! assert_eq!(board.legal_moves().len(), 7);
//! assert_eq!(board.side_to_move(), Some(Player::X));
//!
//! // The mover's marks become +1 regardless of which side is moving.
//! let view = board.normalize(Player::O);
//! assert_eq!(view.cells()[0], 1);
//! assert_eq!(view.cells()[4], -1);
//! ```

pub use self::{board::*, player::*};

mod board;
mod player;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 9;

/// Error returned when a move cannot be applied to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    #[display("cell index {index} is out of range")]
    OutOfRange { index: usize },
    #[display("cell {index} is already occupied")]
    Occupied { index: usize },
}

/// Error returned when raw cell values do not describe a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid value {value} at cell {index} (expected -1, 0 or 1)")]
pub struct InvalidCellError {
    pub index: usize,
    pub value: i8,
}

/// Error returned when board notation cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("unexpected character {ch:?} in board notation")]
    InvalidChar { ch: char },
    #[display("board notation must describe 9 cells, found {count}")]
    WrongLength { count: usize },
}
