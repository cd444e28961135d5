//! Random-opening sample generation.
//!
//! Each sample starts from a random opening: a ply count is drawn uniformly from
//! `0..=8` and that many uniformly random legal moves are played from the empty
//! board, X first. If the game is already over at any point, including right after
//! the last random move, the opening is discarded and a fresh one is drawn. The
//! chosen oracle then picks a move for the side to move; a refusal (`None`) also
//! discards the opening.
//!
//! All randomness comes from the generator passed to [`Synthesizer::new`], so a
//! seeded generator reproduces the same dataset.

use std::fmt;

use rand::{Rng, SeedableRng, seq::IndexedRandom as _};
use tictac_engine::{Board, CELL_COUNT, Player};
use tictac_oracle::{MoveOracle, minimax::MinimaxOracle, rule_based::RuleBasedOracle};

use crate::{
    episode::{self, Position},
    sample::{Dataset, Sample},
};

/// Longest random opening; a ninth move would always fill the board.
pub const MAX_OPENING_PLIES: usize = CELL_COUNT - 1;

/// Consecutive discarded attempts after which a pass gives up and returns
/// what it has collected.
pub const MAX_CONSECUTIVE_DISCARDS: usize = 10_000;

/// A random opening reached a finished position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("random opening finished after {plies} of {requested} plies")]
pub struct DegenerateStateError {
    pub plies: usize,
    pub requested: usize,
}

/// How positions are turned into samples.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::FromStr,
)]
pub enum GenerationMode {
    /// One sample per random opening.
    #[default]
    Positions,
    /// Play the game out from a random opening and keep every ply.
    SelfPlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Target number of samples for each source.
    pub samples_per_source: usize,
    pub mode: GenerationMode,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            samples_per_source: 5000,
            mode: GenerationMode::default(),
        }
    }
}

/// Counters for discarded work during a generation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub degenerate_openings: usize,
    pub skipped_no_move: usize,
    pub episodes: usize,
    /// The pass stopped early after [`MAX_CONSECUTIVE_DISCARDS`] discards in a row.
    pub stalled: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub samples: Vec<Sample>,
    pub stats: GenerationStats,
}

#[derive(Debug, Clone, Default)]
pub struct GeneratedDataset {
    pub dataset: Dataset,
    pub rule_based: GenerationStats,
    pub minimax: GenerationStats,
}

#[derive(Debug, Clone)]
pub struct Synthesizer<R> {
    rng: R,
}

impl<R> Synthesizer<R>
where
    R: Rng,
{
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Plays a random number of random legal moves from the empty board.
    pub fn random_position(&mut self) -> Result<Position, DegenerateStateError> {
        let requested = self.rng.random_range(0..=MAX_OPENING_PLIES);
        let mut board = Board::EMPTY;
        let mut player = Player::X;
        for plies in 0..requested {
            if board.is_terminal() {
                return Err(DegenerateStateError { plies, requested });
            }
            let Some(&index) = board.legal_moves().choose(&mut self.rng) else {
                return Err(DegenerateStateError { plies, requested });
            };
            board = board.with_move(index, player);
            player = player.opponent();
        }
        if board.is_terminal() {
            return Err(DegenerateStateError {
                plies: requested,
                requested,
            });
        }
        Ok(Position {
            board,
            to_move: player,
        })
    }

    /// Labels `count` random openings with `oracle`, retrying discarded ones.
    pub fn generate<O>(&mut self, oracle: &mut O, count: usize) -> Generated
    where
        O: MoveOracle + ?Sized,
    {
        let mut generated = Generated {
            samples: Vec::with_capacity(count),
            stats: GenerationStats::default(),
        };
        let mut discards = 0;
        while generated.samples.len() < count {
            if discards >= MAX_CONSECUTIVE_DISCARDS {
                stall(oracle.name(), &mut generated, count);
                break;
            }
            let position = match self.random_position() {
                Ok(position) => position,
                Err(e) => {
                    log::trace!("discarding opening: {e}");
                    generated.stats.degenerate_openings += 1;
                    discards += 1;
                    continue;
                }
            };
            match oracle.select_move(&position.board, position.to_move) {
                Some(index) => {
                    generated
                        .samples
                        .push(Sample::new(&position.board, position.to_move, index));
                    discards = 0;
                }
                None => {
                    generated.stats.skipped_no_move += 1;
                    discards += 1;
                }
            }
        }
        log_pass(oracle.name(), &generated);
        generated
    }

    /// Collects samples from self-play games that start at random openings.
    ///
    /// The last game is cut so exactly `count` samples are returned.
    pub fn generate_self_play<O>(&mut self, oracle: &mut O, count: usize) -> Generated
    where
        O: MoveOracle + ?Sized,
    {
        let mut generated = Generated {
            samples: Vec::with_capacity(count),
            stats: GenerationStats::default(),
        };
        let mut discards = 0;
        while generated.samples.len() < count {
            if discards >= MAX_CONSECUTIVE_DISCARDS {
                stall(oracle.name(), &mut generated, count);
                break;
            }
            let start = match self.random_position() {
                Ok(position) => position,
                Err(e) => {
                    log::trace!("discarding opening: {e}");
                    generated.stats.degenerate_openings += 1;
                    discards += 1;
                    continue;
                }
            };
            let episode = match episode::self_play(oracle, start) {
                Ok(episode) => episode,
                Err(e) => {
                    log::warn!("{} played an illegal move: {e}", oracle.name());
                    generated.stats.skipped_no_move += 1;
                    discards += 1;
                    continue;
                }
            };
            generated.stats.episodes += 1;
            if episode.plies().is_empty() {
                generated.stats.skipped_no_move += 1;
                discards += 1;
                continue;
            }
            discards = 0;
            let remaining = count - generated.samples.len();
            generated
                .samples
                .extend(episode.samples().into_iter().take(remaining));
        }
        log_pass(oracle.name(), &generated);
        generated
    }

    /// Runs one pass with `mode` for a single oracle.
    pub fn generate_with_mode<O>(
        &mut self,
        oracle: &mut O,
        count: usize,
        mode: GenerationMode,
    ) -> Generated
    where
        O: MoveOracle + ?Sized,
    {
        match mode {
            GenerationMode::Positions => self.generate(oracle, count),
            GenerationMode::SelfPlay => self.generate_self_play(oracle, count),
        }
    }

    /// Produces both sources with caller-provided oracles.
    ///
    /// The minimax memo table is cleared first so separate runs never share state.
    pub fn generate_dataset_with<O>(
        &mut self,
        rule_based: &mut O,
        minimax: &mut MinimaxOracle,
        config: &GenerateConfig,
    ) -> GeneratedDataset
    where
        O: MoveOracle + ?Sized,
    {
        minimax.clear_cache();
        let GenerateConfig {
            samples_per_source,
            mode,
        } = *config;
        let rules = self.generate_with_mode(rule_based, samples_per_source, mode);
        let optimal = self.generate_with_mode(minimax, samples_per_source, mode);
        log::debug!("minimax memo table holds {} entries", minimax.cache_len());
        GeneratedDataset {
            dataset: Dataset {
                rule_based: rules.samples,
                minimax: optimal.samples,
            },
            rule_based: rules.stats,
            minimax: optimal.stats,
        }
    }
}

impl<R> Synthesizer<R>
where
    R: Rng + SeedableRng + fmt::Debug,
{
    /// Produces both sources with a fresh rule-based oracle (seeded from this
    /// synthesizer's generator) and a fresh minimax oracle owned by this run.
    pub fn generate_dataset(&mut self, config: &GenerateConfig) -> GeneratedDataset {
        let mut rule_based = RuleBasedOracle::new(R::from_rng(&mut self.rng));
        let mut minimax = MinimaxOracle::new();
        self.generate_dataset_with(&mut rule_based, &mut minimax, config)
    }
}

fn stall(name: &str, generated: &mut Generated, count: usize) {
    log::warn!(
        "{name}: giving up after {MAX_CONSECUTIVE_DISCARDS} discarded attempts in a row ({} of {count} samples)",
        generated.samples.len(),
    );
    generated.stats.stalled = true;
}

fn log_pass(name: &str, generated: &Generated) {
    let GenerationStats {
        degenerate_openings,
        skipped_no_move,
        episodes,
        stalled: _,
    } = generated.stats;
    log::info!(
        "{name}: {} samples ({degenerate_openings} degenerate openings, {skipped_no_move} skipped, {episodes} episodes)",
        generated.samples.len(),
    );
}

#[cfg(test)]
mod tests {
    use rand_pcg::Pcg32;
    use tictac_oracle::minimax;

    use super::*;

    fn synthesizer(seed: u64) -> Synthesizer<Pcg32> {
        Synthesizer::new(Pcg32::seed_from_u64(seed))
    }

    #[test]
    fn test_random_positions_are_live_and_consistent() {
        let mut synth = synthesizer(1);
        let mut live = 0;
        let mut degenerate = 0;
        for _ in 0..500 {
            match synth.random_position() {
                Ok(position) => {
                    live += 1;
                    assert!(!position.board.is_terminal());
                    assert_eq!(position.board.side_to_move(), Some(position.to_move));
                }
                Err(e) => {
                    degenerate += 1;
                    assert!(e.plies <= e.requested);
                    assert!(e.requested >= 5, "no game ends before the fifth ply");
                }
            }
        }
        assert!(live > 0);
        assert!(degenerate > 0);
    }

    #[test]
    fn test_samples_are_normalized_one_hot_and_legal() {
        let mut synth = synthesizer(2);
        let mut oracle = RuleBasedOracle::new(Pcg32::seed_from_u64(9));
        let generated = synth.generate(&mut oracle, 300);
        assert_eq!(generated.samples.len(), 300);
        for sample in &generated.samples {
            let cells = sample.board().cells();
            let own = cells.iter().filter(|&&c| c == 1).count();
            let opp = cells.iter().filter(|&&c| c == -1).count();
            // the mover has placed as many marks as the opponent, or one fewer
            assert!(opp == own || opp == own + 1, "{cells:?}");
            assert!(sample.board().is_empty_cell(sample.target_move()));
            assert_eq!(sample.target().iter().sum::<f32>(), 1.0);
            assert!(!sample.board().is_terminal());
        }
    }

    #[test]
    fn test_minimax_samples_match_search() {
        let mut synth = synthesizer(3);
        let mut oracle = MinimaxOracle::new();
        let generated = synth.generate(&mut oracle, 200);
        let mut memo = minimax::MemoTable::new();
        for sample in &generated.samples {
            // on a normalized board the mover is always the +1 side
            let eval = minimax::evaluate_with(&mut memo, sample.board(), Player::X);
            assert_eq!(eval.best_move, Some(sample.target_move()));
        }
    }

    #[test]
    fn test_same_seed_same_dataset() {
        let config = GenerateConfig {
            samples_per_source: 100,
            mode: GenerationMode::Positions,
        };
        let a = synthesizer(42).generate_dataset(&config);
        let b = synthesizer(42).generate_dataset(&config);
        assert_eq!(a.dataset, b.dataset);
        assert_eq!(a.dataset.rule_based.len(), 100);
        assert_eq!(a.dataset.minimax.len(), 100);
    }

    #[test]
    fn test_self_play_mode_collects_exact_count() {
        let mut synth = synthesizer(4);
        let mut oracle = MinimaxOracle::new();
        let generated = synth.generate_self_play(&mut oracle, 250);
        assert_eq!(generated.samples.len(), 250);
        assert!(generated.stats.episodes > 0);
        for sample in &generated.samples {
            assert!(sample.board().is_empty_cell(sample.target_move()));
        }
    }

    #[test]
    fn test_generation_clears_minimax_cache() {
        // O never moves first in generated openings, so this entry can only
        // survive if the table is carried over from before the run
        let mut minimax = MinimaxOracle::new();
        minimax.evaluate(&Board::EMPTY, Player::O);
        assert!(minimax.memo().get(&Board::EMPTY, Player::O).is_some());

        let mut rule_based = RuleBasedOracle::new(Pcg32::seed_from_u64(5));
        let config = GenerateConfig {
            samples_per_source: 10,
            mode: GenerationMode::Positions,
        };
        synthesizer(5).generate_dataset_with(&mut rule_based, &mut minimax, &config);
        assert!(minimax.cache_len() > 0);
        assert!(minimax.memo().get(&Board::EMPTY, Player::O).is_none());
    }

    /// Never proposes a move.
    #[derive(Debug)]
    struct Refusing;

    impl MoveOracle for Refusing {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn select_move(&mut self, _board: &Board, _player: Player) -> Option<usize> {
            None
        }
    }

    #[test]
    fn test_refusing_oracle_stops_instead_of_spinning() {
        let generated = synthesizer(6).generate(&mut Refusing, 10);
        assert!(generated.samples.is_empty());
        assert!(generated.stats.stalled);
        assert!(generated.stats.skipped_no_move > 0);

        let generated = synthesizer(7).generate_self_play(&mut Refusing, 10);
        assert!(generated.samples.is_empty());
        assert!(generated.stats.stalled);
        assert!(generated.stats.episodes > 0);
    }

    #[test]
    fn test_regular_pass_is_not_stalled() {
        let mut oracle = RuleBasedOracle::new(Pcg32::seed_from_u64(8));
        let generated = synthesizer(8).generate(&mut oracle, 50);
        assert_eq!(generated.samples.len(), 50);
        assert!(!generated.stats.stalled);
    }

    #[test]
    fn test_generation_mode_from_str() {
        assert_eq!("positions".parse::<GenerationMode>().unwrap(), GenerationMode::Positions);
        assert_eq!("selfplay".parse::<GenerationMode>().unwrap(), GenerationMode::SelfPlay);
    }
}
