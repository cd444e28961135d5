//! Move oracles: policies that pick a move for a board and a player.
//!
//! Two independent oracles label training positions:
//!
//! 1. **Rule-based** ([`rule_based`]) - A fixed priority chain (win, block, center,
//!    corner, anything) with injectable randomness for the corner and fallback rules.
//!
//! 2. **Minimax** ([`minimax`]) - Exact negamax search with a memo table keyed by
//!    board and acting player. Always returns an optimal move.
//!
//! Both implement [`MoveOracle`], as does the trained network in `tictac-training`,
//! so data generation, self-play and arena matches never depend on a concrete policy.
//!
//! # No Legal Move
//!
//! An oracle queried on a finished board (a winner is present, or the board is full)
//! returns `None`. Callers treat this as "skip and retry", never as a failure.
//!
//! # Example
//!
//! ```
//! use tictac_engine::{Board, Player};
//! use tictac_oracle::{MoveOracle, minimax::MinimaxOracle};
//!
//! let board: Board = "XX./OO./...".parse().unwrap();
//! let mut oracle = MinimaxOracle::new();
//! assert_eq!(oracle.select_move(&board, Player::X), Some(2));
//! ```

use std::fmt;

use tictac_engine::{Board, Player};

pub mod minimax;
pub mod rule_based;

/// A policy that chooses a move for `player` on `board`.
pub trait MoveOracle: fmt::Debug {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Returns the chosen cell index, or `None` if the board has no legal move
    /// (it is full or already won).
    fn select_move(&mut self, board: &Board, player: Player) -> Option<usize>;
}

impl<T> MoveOracle for Box<T>
where
    T: MoveOracle + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn select_move(&mut self, board: &Board, player: Player) -> Option<usize> {
        (**self).select_move(board, player)
    }
}

impl<T> MoveOracle for &mut T
where
    T: MoveOracle + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn select_move(&mut self, board: &Board, player: Player) -> Option<usize> {
        (**self).select_move(board, player)
    }
}
