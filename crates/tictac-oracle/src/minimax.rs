//! Exact negamax oracle with memoization.
//!
//! The value of a position is computed from the point of view of the player about
//! to act: `+10` if that player has already won, `-10` if the opponent has, `0` for
//! a full board. Otherwise every legal move is tried in ascending order, the child
//! is scored for the opponent and negated, and the move with the strictly greatest
//! score is kept, so ties go to the lowest cell index.
//!
//! Results are stored in a [`MemoTable`] keyed by the exact board and the acting
//! player. The table belongs to the oracle (or is passed explicitly to
//! [`evaluate_with`]); there is no process-wide cache. A data generation run owns
//! one oracle and clears it when it starts.

use std::collections::HashMap;

use tictac_engine::{Board, Player};

use crate::MoveOracle;

/// Score of a won position for the winner.
pub const WIN_SCORE: i32 = 10;

/// Game value of a position for the acting player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub score: i32,
    /// Best move, or `None` for finished positions.
    pub best_move: Option<usize>,
}

impl Evaluation {
    const fn terminal(score: i32) -> Self {
        Self {
            score,
            best_move: None,
        }
    }
}

/// Memo table mapping `(board, acting player)` to its [`Evaluation`].
#[derive(Debug, Clone, Default)]
pub struct MemoTable {
    entries: HashMap<(Board, Player), Evaluation>,
}

impl MemoTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, board: &Board, player: Player) -> Option<Evaluation> {
        self.entries.get(&(*board, player)).copied()
    }

    fn insert(&mut self, board: Board, player: Player, evaluation: Evaluation) {
        self.entries.insert((board, player), evaluation);
    }
}

/// Computes the negamax value of `board` for `player`, reading and filling `memo`.
pub fn evaluate_with(memo: &mut MemoTable, board: &Board, player: Player) -> Evaluation {
    if let Some(evaluation) = memo.get(board, player) {
        return evaluation;
    }

    let evaluation = match board.winner() {
        Some(winner) if winner == player => Evaluation::terminal(WIN_SCORE),
        Some(_) => Evaluation::terminal(-WIN_SCORE),
        None if board.is_full() => Evaluation::terminal(0),
        None => {
            let mut best = Evaluation {
                score: i32::MIN,
                best_move: None,
            };
            for index in board.legal_moves() {
                let child = board.with_move(index, player);
                let score = -evaluate_with(memo, &child, player.opponent()).score;
                if score > best.score {
                    best = Evaluation {
                        score,
                        best_move: Some(index),
                    };
                }
            }
            best
        }
    };

    memo.insert(*board, player, evaluation);
    evaluation
}

#[derive(Debug, Clone, Default)]
pub struct MinimaxOracle {
    memo: MemoTable,
}

impl MinimaxOracle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an oracle that continues from an existing memo table.
    #[must_use]
    pub fn with_memo(memo: MemoTable) -> Self {
        Self { memo }
    }

    pub fn evaluate(&mut self, board: &Board, player: Player) -> Evaluation {
        evaluate_with(&mut self.memo, board, player)
    }

    #[must_use]
    pub fn memo(&self) -> &MemoTable {
        &self.memo
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.memo.len()
    }

    pub fn clear_cache(&mut self) {
        log::debug!("clearing minimax memo table ({} entries)", self.memo.len());
        self.memo.clear();
    }

    #[must_use]
    pub fn into_memo(self) -> MemoTable {
        self.memo
    }
}

impl MoveOracle for MinimaxOracle {
    fn name(&self) -> &'static str {
        "minimax"
    }

    fn select_move(&mut self, board: &Board, player: Player) -> Option<usize> {
        self.evaluate(board, player).best_move
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(notation: &str) -> Board {
        notation.parse().unwrap()
    }

    #[test]
    fn test_immediate_win() {
        let b = Board::from_cells([1, 1, 0, -1, -1, 0, 0, 0, 0]).unwrap();
        let eval = MinimaxOracle::new().evaluate(&b, Player::X);
        assert_eq!(
            eval,
            Evaluation {
                score: WIN_SCORE,
                best_move: Some(2)
            }
        );
    }

    #[test]
    fn test_empty_board_is_a_draw() {
        let mut oracle = MinimaxOracle::new();
        let first = oracle.evaluate(&Board::EMPTY, Player::X);
        assert_eq!(first.score, 0);
        assert!(first.best_move.is_some());

        oracle.clear_cache();
        assert_eq!(oracle.cache_len(), 0);
        let second = oracle.evaluate(&Board::EMPTY, Player::X);
        assert_eq!(first, second);
    }

    #[test]
    fn test_blocks_when_no_win_available() {
        // O threatens 8; every move except the block loses
        let b = board(".X./..X/OO.");
        let eval = MinimaxOracle::new().evaluate(&b, Player::X);
        assert_eq!(eval.best_move, Some(8));
        assert!(eval.score >= 0);
    }

    #[test]
    fn test_terminal_positions() {
        let mut oracle = MinimaxOracle::new();
        let won = board("XXX/OO./...");
        assert_eq!(oracle.evaluate(&won, Player::X), Evaluation::terminal(WIN_SCORE));
        assert_eq!(oracle.evaluate(&won, Player::O), Evaluation::terminal(-WIN_SCORE));
        let draw = board("XOX/XOO/OXX");
        assert_eq!(oracle.evaluate(&draw, Player::X), Evaluation::terminal(0));
        assert_eq!(oracle.select_move(&draw, Player::X), None);
    }

    #[test]
    fn test_ties_go_to_lowest_index() {
        // from the empty board every opening draws, so the first cell is kept
        let eval = MinimaxOracle::new().evaluate(&Board::EMPTY, Player::X);
        assert_eq!(eval.best_move, Some(0));
    }

    #[test]
    fn test_memo_is_reused_across_calls() {
        let mut memo = MemoTable::new();
        let eval = evaluate_with(&mut memo, &Board::EMPTY, Player::X);
        let filled = memo.len();
        assert!(filled > 0);
        assert!(filled < 10_000);

        let mut oracle = MinimaxOracle::with_memo(memo);
        assert_eq!(oracle.evaluate(&Board::EMPTY, Player::X), eval);
        assert_eq!(oracle.cache_len(), filled);
    }

    #[test]
    fn test_optimal_play_never_loses() {
        // minimax against itself from every opening reaches a draw
        for opening in Board::EMPTY.legal_moves() {
            let mut oracle = MinimaxOracle::new();
            let mut b = Board::EMPTY.with_move(opening, Player::X);
            let mut player = Player::O;
            while let Some(index) = oracle.select_move(&b, player) {
                b.play(index, player).unwrap();
                player = player.opponent();
            }
            assert_eq!(b.winner(), None, "opening {opening}:\n{b}");
        }
    }
}
