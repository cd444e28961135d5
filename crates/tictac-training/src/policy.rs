//! Playing with a trained network.

use rand::{Rng, seq::IndexedRandom as _};
use tictac_engine::{Board, CELL_COUNT, Player};
use tictac_oracle::MoveOracle;

use crate::mlp::Mlp;

/// Network input for `player` to move on `board`: the mover-normalized cells.
#[must_use]
pub fn encode(board: &Board, player: Player) -> [f32; CELL_COUNT] {
    board.normalize(player).cells().map(f32::from)
}

/// Oracle backed by a trained [`Mlp`].
///
/// Occupied cells are never chosen: the move is the legal cell with the highest
/// probability. If no legal cell has a positive finite score the move is drawn
/// uniformly from the legal cells instead.
#[derive(Debug, Clone)]
pub struct NetworkOracle<R> {
    mlp: Mlp,
    rng: R,
}

impl<R> NetworkOracle<R>
where
    R: Rng,
{
    #[must_use]
    pub fn new(mlp: Mlp, rng: R) -> Self {
        Self { mlp, rng }
    }

    #[must_use]
    pub fn mlp(&self) -> &Mlp {
        &self.mlp
    }

    /// Move probabilities for `player` on `board` (absolute marks).
    #[must_use]
    pub fn scores(&self, board: &Board, player: Player) -> [f32; CELL_COUNT] {
        self.mlp.predict(&encode(board, player))
    }

    /// The highest scoring legal cell, ignoring the random fallback.
    ///
    /// Ties go to the lowest index.
    #[must_use]
    pub fn best_legal_move(&self, board: &Board, player: Player) -> Option<usize> {
        let scores = self.scores(board, player);
        let mut best: Option<usize> = None;
        for index in board.legal_moves() {
            let score = scores[index];
            if !score.is_finite() || score <= 0.0 {
                continue;
            }
            if best.is_none_or(|b| score > scores[b]) {
                best = Some(index);
            }
        }
        best
    }
}

impl<R> MoveOracle for NetworkOracle<R>
where
    R: Rng + std::fmt::Debug,
{
    fn name(&self) -> &'static str {
        "network"
    }

    fn select_move(&mut self, board: &Board, player: Player) -> Option<usize> {
        if board.is_terminal() {
            return None;
        }
        if let Some(index) = self.best_legal_move(board, player) {
            return Some(index);
        }
        log::debug!("no positive legal score on {}, playing randomly", board.to_notation());
        board.legal_moves().choose(&mut self.rng).copied()
    }
}
