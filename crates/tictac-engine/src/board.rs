use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{CELL_COUNT, InvalidCellError, MoveError, ParseBoardError, Player};

/// The eight winning lines: three rows, three columns, two diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

pub const CENTER: usize = 4;
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];

/// Legal moves of a board, in ascending cell order.
pub type MoveList = ArrayVec<usize, CELL_COUNT>;

/// Final result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum Outcome {
    #[display("{_0} wins")]
    Win(Player),
    #[display("draw")]
    Draw,
}

impl Outcome {
    #[must_use]
    pub fn winner(self) -> Option<Player> {
        match self {
            Self::Win(player) => Some(player),
            Self::Draw => None,
        }
    }
}

/// A 3×3 board with cells in `{+1, -1, 0}`.
///
/// Boards are small `Copy` values. Search code works on modified copies
/// ([`Board::with_move`]) instead of mutating and restoring a shared buffer.
///
/// Serialized as a flat array of nine integers; deserialization rejects any
/// value outside `{-1, 0, 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "[i8; CELL_COUNT]", into = "[i8; CELL_COUNT]")]
pub struct Board {
    cells: [i8; CELL_COUNT],
}

impl Board {
    pub const EMPTY: Self = Self {
        cells: [0; CELL_COUNT],
    };

    /// Builds a board from raw cell values.
    pub fn from_cells(cells: [i8; CELL_COUNT]) -> Result<Self, InvalidCellError> {
        if let Some((index, &value)) = cells
            .iter()
            .enumerate()
            .find(|(_, v)| !(-1..=1).contains(*v))
        {
            return Err(InvalidCellError { index, value });
        }
        Ok(Self { cells })
    }

    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[i8; CELL_COUNT] {
        &self.cells
    }

    /// Returns the player occupying `index`, if any.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 9`.
    #[inline]
    #[must_use]
    pub fn mark_at(&self, index: usize) -> Option<Player> {
        Player::from_sign(self.cells[index])
    }

    #[inline]
    #[must_use]
    pub fn is_empty_cell(&self, index: usize) -> bool {
        self.cells.get(index) == Some(&0)
    }

    /// Returns the owner of the first complete line, scanning [`WIN_LINES`] in order.
    ///
    /// Boards reached by legal play have at most one winner; if several lines
    /// are complete the first one found wins.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        WIN_LINES.iter().find_map(|&[a, b, c]| {
            let v = self.cells[a];
            if v == self.cells[b] && v == self.cells[c] {
                Player::from_sign(v)
            } else {
                None
            }
        })
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&c| c != 0)
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        if let Some(winner) = self.winner() {
            Some(Outcome::Win(winner))
        } else if self.is_full() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }

    /// Returns the empty cells in ascending index order.
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        (0..CELL_COUNT).filter(|&i| self.cells[i] == 0).collect()
    }

    #[must_use]
    pub fn moves_played(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    /// Infers whose turn it is from the mark counts, assuming X moved first.
    ///
    /// Returns `None` when the counts cannot arise from alternating play.
    #[must_use]
    pub fn side_to_move(&self) -> Option<Player> {
        let x = self.cells.iter().filter(|&&c| c == 1).count();
        let o = self.cells.iter().filter(|&&c| c == -1).count();
        if x == o {
            Some(Player::X)
        } else if x == o + 1 {
            Some(Player::O)
        } else {
            None
        }
    }

    /// Rewrites the board from `player`'s point of view.
    ///
    /// Every cell is multiplied by `player.sign()`, so the mover's marks become
    /// `+1` and the opponent's marks become `-1`.
    #[must_use]
    pub fn normalize(&self, player: Player) -> Self {
        let sign = player.sign();
        Self {
            cells: self.cells.map(|c| c * sign),
        }
    }

    /// Places `player`'s mark at `index`.
    pub fn play(&mut self, index: usize, player: Player) -> Result<(), MoveError> {
        match self.cells.get(index) {
            None => Err(MoveError::OutOfRange { index }),
            Some(&c) if c != 0 => Err(MoveError::Occupied { index }),
            Some(_) => {
                self.cells[index] = player.sign();
                Ok(())
            }
        }
    }

    /// Returns a copy of the board with `player`'s mark at `index`.
    ///
    /// The caller must pass an index from [`Board::legal_moves`].
    #[inline]
    #[must_use]
    pub fn with_move(&self, index: usize, player: Player) -> Self {
        debug_assert!(self.is_empty_cell(index), "cell {index} is not empty");
        let mut next = *self;
        next.cells[index] = player.sign();
        next
    }

    /// Returns the compact 9-character notation (`X`, `O`, `.`).
    #[must_use]
    pub fn to_notation(&self) -> String {
        self.cells.iter().map(|&c| cell_symbol(c)).collect()
    }
}

fn cell_symbol(value: i8) -> char {
    Player::from_sign(value).map_or('.', Player::symbol)
}

impl TryFrom<[i8; CELL_COUNT]> for Board {
    type Error = InvalidCellError;

    fn try_from(cells: [i8; CELL_COUNT]) -> Result<Self, Self::Error> {
        Self::from_cells(cells)
    }
}

impl From<Board> for [i8; CELL_COUNT] {
    fn from(board: Board) -> Self {
        board.cells
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for (col, &c) in cells.iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", cell_symbol(c))?;
            }
        }
        Ok(())
    }
}

/// Parses 9 cells from `X`/`x`, `O`/`o` and `.`/`-`/`_`.
///
/// Whitespace and `/` are ignored, so `"XO./.X./..O"` and the multi-line
/// [`Display`](fmt::Display) output both parse.
impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = ArrayVec::<i8, CELL_COUNT>::new();
        let mut count = 0;
        for ch in s.chars().filter(|ch| !ch.is_whitespace() && *ch != '/') {
            let value = match ch {
                'X' | 'x' => Player::X.sign(),
                'O' | 'o' => Player::O.sign(),
                '.' | '-' | '_' => 0,
                _ => return Err(ParseBoardError::InvalidChar { ch }),
            };
            count += 1;
            // keep counting past nine cells so the error reports the real length
            let _ = cells.try_push(value);
        }
        let cells = cells
            .into_inner()
            .map_err(|_| ParseBoardError::WrongLength { count })?;
        if count != CELL_COUNT {
            return Err(ParseBoardError::WrongLength { count });
        }
        Ok(Self { cells })
    }
}
