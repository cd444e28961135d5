use std::{
    io::{self, BufRead as _, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;
use tictac_engine::{Board, Player};
use tictac_oracle::MoveOracle as _;

use crate::util::{self, Side};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Weight bundle produced by `train`
    #[arg(long)]
    weights: PathBuf,
    /// Side played by the human (x moves first)
    #[arg(long, default_value = "x")]
    human: Side,
    /// Seed for the network's random fallback move
    #[arg(long)]
    seed: Option<u64>,
}

const CELL_GUIDE: &str = "0 1 2\n3 4 5\n6 7 8";

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        weights,
        human,
        seed,
    } = arg;
    let human = Player::from(*human);
    let mut network = util::load_network(weights, *seed)?;

    println!("You play {human}. Enter a cell index, or q to quit:");
    println!("{CELL_GUIDE}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut board = Board::EMPTY;
    let mut player = Player::X;
    while !board.is_terminal() {
        let index = if player == human {
            print!("\n{board}\n> ");
            io::stdout().flush().context("Failed to flush stdout")?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line.context("Failed to read from stdin")?;
            let line = line.trim();
            if line.eq_ignore_ascii_case("q") {
                return Ok(());
            }
            match parse_move(&board, line) {
                Ok(index) => index,
                Err(message) => {
                    println!("{message}");
                    continue;
                }
            }
        } else {
            let index = network
                .select_move(&board, player)
                .context("Network found no legal move")?;
            println!("\nNetwork plays {index}");
            index
        };
        board.play(index, player)?;
        player = player.opponent();
    }

    println!("\n{board}\n");
    match board.outcome().and_then(|o| o.winner()) {
        Some(winner) if winner == human => println!("You win!"),
        Some(_) => println!("The network wins."),
        None => println!("Draw."),
    }
    Ok(())
}

fn parse_move(board: &Board, input: &str) -> Result<usize, String> {
    let index = input
        .parse::<usize>()
        .map_err(|_| format!("Not a cell index: {input:?}"))?;
    if index >= tictac_engine::CELL_COUNT {
        return Err(format!("Cell {index} is out of range (0-8)"));
    }
    if !board.is_empty_cell(index) {
        return Err(format!("Cell {index} is already taken"));
    }
    Ok(index)
}
