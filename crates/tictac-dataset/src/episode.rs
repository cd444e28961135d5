//! Whole games played move by move.
//!
//! An [`Episode`] records every ply from a starting [`Position`] until the game is
//! finished or the move source gives up. Each recorded ply can be turned into a
//! training [`Sample`], which is how self-play data is produced.

use tictac_engine::{Board, MoveError, Outcome, Player};
use tictac_oracle::MoveOracle;

use crate::sample::Sample;

/// A board together with the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub board: Board,
    pub to_move: Player,
}

impl Position {
    pub const INITIAL: Self = Self {
        board: Board::EMPTY,
        to_move: Player::X,
    };
}

/// One move of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ply {
    /// Board before the move.
    pub before: Board,
    pub player: Player,
    pub index: usize,
}

impl Ply {
    #[must_use]
    pub fn to_sample(&self) -> Sample {
        Sample::new(&self.before, self.player, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    start: Position,
    plies: Vec<Ply>,
    board: Board,
}

impl Episode {
    #[must_use]
    pub fn start(&self) -> Position {
        self.start
    }

    #[must_use]
    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }

    /// Board after the last ply.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Result of the game, or `None` if the move source stopped before the end.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.board.outcome()
    }

    /// Converts every ply into a mover-normalized sample.
    #[must_use]
    pub fn samples(&self) -> Vec<Sample> {
        self.plies.iter().map(Ply::to_sample).collect()
    }
}

/// Plays from `start`, asking `choose` for each move until the board is finished.
///
/// A `None` from `choose` ends the episode early. An illegal index is an error.
pub fn play_episode<F>(start: Position, mut choose: F) -> Result<Episode, MoveError>
where
    F: FnMut(&Board, Player) -> Option<usize>,
{
    let mut board = start.board;
    let mut player = start.to_move;
    let mut plies = vec![];
    while !board.is_terminal() {
        let Some(index) = choose(&board, player) else {
            break;
        };
        let before = board;
        board.play(index, player)?;
        plies.push(Ply {
            before,
            player,
            index,
        });
        player = player.opponent();
    }
    Ok(Episode {
        start,
        plies,
        board,
    })
}

/// Plays one game where `oracle` moves for both sides.
pub fn self_play<O>(oracle: &mut O, start: Position) -> Result<Episode, MoveError>
where
    O: MoveOracle + ?Sized,
{
    play_episode(start, |board, player| oracle.select_move(board, player))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use tictac_oracle::{minimax::MinimaxOracle, rule_based::RuleBasedOracle};

    use super::*;

    fn assert_legal_replay(episode: &Episode) {
        let mut board = episode.start().board;
        let mut player = episode.start().to_move;
        for ply in episode.plies() {
            assert_eq!(ply.before, board);
            assert_eq!(ply.player, player);
            assert!(board.legal_moves().contains(&ply.index));
            board.play(ply.index, player).unwrap();
            player = player.opponent();
        }
        assert_eq!(&board, episode.board());
    }

    #[test]
    fn test_minimax_self_play_from_empty_board() {
        let mut oracle = MinimaxOracle::new();
        let episode = self_play(&mut oracle, Position::INITIAL).unwrap();
        assert_legal_replay(&episode);
        let board = episode.board();
        assert!(board.winner().is_some() || board.is_full());
        // optimal play on both sides draws
        assert_eq!(episode.outcome(), Some(Outcome::Draw));
        assert_eq!(episode.plies().len(), 9);
    }

    #[test]
    fn test_rule_based_self_play_terminates() {
        let mut oracle = RuleBasedOracle::new(Pcg32::seed_from_u64(3));
        for _ in 0..20 {
            let episode = self_play(&mut oracle, Position::INITIAL).unwrap();
            assert_legal_replay(&episode);
            assert!(episode.outcome().is_some());
        }
    }

    #[test]
    fn test_samples_match_plies() {
        let mut oracle = MinimaxOracle::new();
        let episode = self_play(&mut oracle, Position::INITIAL).unwrap();
        let samples = episode.samples();
        assert_eq!(samples.len(), episode.plies().len());
        for (sample, ply) in samples.iter().zip(episode.plies()) {
            assert_eq!(sample.target_move(), ply.index);
            assert_eq!(sample.board(), &ply.before.normalize(ply.player));
        }
    }

    #[test]
    fn test_early_stop_and_illegal_moves() {
        let episode = play_episode(Position::INITIAL, |_, _| None).unwrap();
        assert!(episode.plies().is_empty());
        assert_eq!(episode.outcome(), None);

        let err = play_episode(Position::INITIAL, |_, _| Some(4)).unwrap_err();
        assert_eq!(err, MoveError::Occupied { index: 4 });
    }
}
