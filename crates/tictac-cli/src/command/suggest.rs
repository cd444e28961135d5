use std::path::PathBuf;

use anyhow::{Context as _, bail};
use tictac_engine::{Board, Player};
use tictac_oracle::MoveOracle as _;

use crate::util::{self, Side};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SuggestArg {
    /// Weight bundle produced by `train`
    #[arg(long)]
    weights: PathBuf,
    /// Board in 9-character notation (X, O and . for empty; / and spaces ignored)
    #[arg(long)]
    board: String,
    /// Side to move (x or o); inferred from the mark counts when omitted
    #[arg(long)]
    side: Option<Side>,
    /// Seed for the random fallback move
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &SuggestArg) -> anyhow::Result<()> {
    let SuggestArg {
        weights,
        board,
        side,
        seed,
    } = arg;
    let board: Board = board
        .parse()
        .with_context(|| format!("Invalid board: {board}"))?;
    let player = match side {
        Some(side) => Player::from(*side),
        None => board
            .side_to_move()
            .context("Cannot infer the side to move; pass --side")?,
    };
    if let Some(outcome) = board.outcome() {
        bail!("The game is already over ({outcome})");
    }

    let mut oracle = util::load_network(weights, *seed)?;
    let scores = oracle.scores(&board, player);

    println!("{board}");
    println!();
    println!("Scores for {player}:");
    for (index, score) in scores.iter().enumerate() {
        let marker = if board.is_empty_cell(index) { " " } else { "*" };
        println!("  {index}{marker} {score:.4}");
    }
    let index = oracle
        .select_move(&board, player)
        .context("No legal move")?;
    println!();
    println!("Suggested move: {index}");
    Ok(())
}
