//! Heuristic oracle built from a fixed rule chain.
//!
//! Rules are tried in priority order and the first applicable one decides:
//!
//! | Rule | Move |
//! |---|---|
//! | [`Rule::Win`] | first legal move that wins immediately |
//! | [`Rule::Block`] | first legal move that takes the opponent's immediate win |
//! | [`Rule::Center`] | cell 4 if empty |
//! | [`Rule::Corner`] | uniformly random empty corner |
//! | [`Rule::Any`] | uniformly random legal move |
//!
//! "First" means first in ascending cell order. Only the last two rules consume
//! randomness, drawn from the injected generator.

use arrayvec::ArrayVec;
use rand::{Rng, seq::IndexedRandom as _};
use tictac_engine::{Board, CENTER, CORNERS, Player};

use crate::MoveOracle;

/// The rule that produced a [`Decision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum Rule {
    Win,
    Block,
    Center,
    Corner,
    Any,
}

impl Rule {
    pub const ALL: [Self; 5] = [Self::Win, Self::Block, Self::Center, Self::Corner, Self::Any];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rule: Rule,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub struct RuleBasedOracle<R> {
    rng: R,
}

impl<R> RuleBasedOracle<R>
where
    R: Rng,
{
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Runs the rule chain and reports which rule fired.
    ///
    /// Returns `None` on finished boards.
    pub fn decide(&mut self, board: &Board, player: Player) -> Option<Decision> {
        if board.is_terminal() {
            return None;
        }
        let moves = board.legal_moves();
        let completes_line = |who: Player| {
            moves
                .iter()
                .copied()
                .find(|&i| board.with_move(i, who).winner() == Some(who))
        };

        let decision = |rule, index| Decision { rule, index };
        if let Some(index) = completes_line(player) {
            return Some(decision(Rule::Win, index));
        }
        if let Some(index) = completes_line(player.opponent()) {
            return Some(decision(Rule::Block, index));
        }
        if board.is_empty_cell(CENTER) {
            return Some(decision(Rule::Center, CENTER));
        }
        let corners = CORNERS
            .into_iter()
            .filter(|&i| board.is_empty_cell(i))
            .collect::<ArrayVec<usize, 4>>();
        if let Some(&index) = corners.choose(&mut self.rng) {
            return Some(decision(Rule::Corner, index));
        }
        moves
            .choose(&mut self.rng)
            .map(|&index| decision(Rule::Any, index))
    }
}

impl<R> MoveOracle for RuleBasedOracle<R>
where
    R: Rng + std::fmt::Debug,
{
    fn name(&self) -> &'static str {
        "rule-based"
    }

    fn select_move(&mut self, board: &Board, player: Player) -> Option<usize> {
        self.decide(board, player).map(|d| d.index)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn oracle() -> RuleBasedOracle<Pcg32> {
        RuleBasedOracle::new(Pcg32::seed_from_u64(7))
    }

    fn board(notation: &str) -> Board {
        notation.parse().unwrap()
    }

    #[test]
    fn test_win_takes_priority_over_block() {
        let b = board("XX./OO./...");
        let d = oracle().decide(&b, Player::X).unwrap();
        assert_eq!(d, Decision { rule: Rule::Win, index: 2 });
    }

    #[test]
    fn test_blocks_opponent_threat() {
        let b = board("XX./.O./...");
        let d = oracle().decide(&b, Player::O).unwrap();
        assert_eq!(d, Decision { rule: Rule::Block, index: 2 });
    }

    #[test]
    fn test_takes_center() {
        let b = board("X../.../...");
        let d = oracle().decide(&b, Player::O).unwrap();
        assert_eq!(d, Decision { rule: Rule::Center, index: CENTER });
    }

    #[test]
    fn test_corner_is_random_among_empty_corners() {
        let b = board(".../.X./..O");
        let mut oracle = oracle();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let d = oracle.decide(&b, Player::X).unwrap();
            assert_eq!(d.rule, Rule::Corner);
            seen.insert(d.index);
        }
        assert_eq!(seen, HashSet::from([0, 2, 6]));
    }

    #[test]
    fn test_falls_back_to_any_legal_move() {
        // corners and center taken, no threats on either side
        let b = board("OXO/.X./XOX");
        let mut oracle = oracle();
        for _ in 0..50 {
            let d = oracle.decide(&b, Player::O).unwrap();
            assert_eq!(d.rule, Rule::Any);
            assert!([3, 5].contains(&d.index));
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let b = board(".../.X./...");
        let mut a = oracle();
        let mut c = oracle();
        for _ in 0..20 {
            assert_eq!(a.select_move(&b, Player::O), c.select_move(&b, Player::O));
        }
    }

    #[test]
    fn test_no_move_on_finished_board() {
        assert_eq!(oracle().select_move(&board("XXX/OO./..."), Player::O), None);
        assert_eq!(oracle().select_move(&board("XOX/XOO/OXX"), Player::X), None);
    }
}
