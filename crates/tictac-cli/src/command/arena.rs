use std::path::PathBuf;

use tictac_dataset::episode::{self, Position};
use tictac_engine::Player;
use tictac_oracle::{MoveOracle, minimax::MinimaxOracle, rule_based::RuleBasedOracle};

use crate::util;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum Opponent {
    #[default]
    Minimax,
    RuleBased,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ArenaArg {
    /// Weight bundle produced by `train`
    #[arg(long)]
    weights: PathBuf,
    /// Oracle to play against (minimax or rulebased)
    #[arg(long, default_value = "minimax")]
    opponent: Opponent,
    /// Number of games; the network alternates between X and O
    #[arg(long, default_value_t = 100)]
    games: usize,
    /// Seed for reproducible matches
    #[arg(long)]
    seed: Option<u64>,
}

/// Results from the network's point of view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    wins: usize,
    draws: usize,
    losses: usize,
}

impl Tally {
    fn record(&mut self, winner: Option<Player>, network: Player) {
        match winner {
            Some(p) if p == network => self.wins += 1,
            Some(_) => self.losses += 1,
            None => self.draws += 1,
        }
    }

    fn total(&self) -> usize {
        self.wins + self.draws + self.losses
    }
}

pub(crate) fn run(arg: &ArenaArg) -> anyhow::Result<()> {
    let ArenaArg {
        weights,
        opponent,
        games,
        seed,
    } = arg;
    let mut network = util::load_network(weights, *seed)?;
    let mut opponent: Box<dyn MoveOracle> = match opponent {
        Opponent::Minimax => Box::new(MinimaxOracle::new()),
        Opponent::RuleBased => Box::new(RuleBasedOracle::new(util::build_rng(
            seed.map(|s| s.wrapping_add(1)),
        ))),
    };

    eprintln!(
        "Playing {games} games: {} vs {}",
        network.name(),
        opponent.name()
    );

    let mut as_x = Tally::default();
    let mut as_o = Tally::default();
    for game in 0..*games {
        let network_side = if game % 2 == 0 { Player::X } else { Player::O };
        let episode = episode::play_episode(Position::INITIAL, |board, player| {
            if player == network_side {
                network.select_move(board, player)
            } else {
                opponent.select_move(board, player)
            }
        })?;
        let winner = episode.outcome().and_then(|o| o.winner());
        log::debug!(
            "game {game}: network as {network_side}, {} plies, {}",
            episode.plies().len(),
            episode
                .outcome()
                .map_or_else(|| "unfinished".to_owned(), |o| o.to_string()),
        );
        match network_side {
            Player::X => as_x.record(winner, network_side),
            Player::O => as_o.record(winner, network_side),
        }
    }

    println!("{:>8} | {:>5} {:>5} {:>5}", "network", "win", "draw", "loss");
    for (label, tally) in [("as X", as_x), ("as O", as_o)] {
        print_row(label, tally);
    }
    let total = Tally {
        wins: as_x.wins + as_o.wins,
        draws: as_x.draws + as_o.draws,
        losses: as_x.losses + as_o.losses,
    };
    print_row("total", total);
    Ok(())
}

fn print_row(label: &str, tally: Tally) {
    let Tally {
        wins,
        draws,
        losses,
    } = tally;
    println!(
        "{label:>8} | {wins:>5} {draws:>5} {losses:>5}  ({} games)",
        tally.total()
    );
}
