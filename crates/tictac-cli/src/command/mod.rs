use clap::{Parser, Subcommand};

use self::{
    arena::ArenaArg, generate_data::GenerateDataArg, play::PlayArg, suggest::SuggestArg,
    train::TrainArg,
};

mod arena;
mod generate_data;
mod play;
mod suggest;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Generate labeled training samples from the rule-based and minimax oracles
    GenerateData(#[clap(flatten)] GenerateDataArg),
    /// Train the move-prediction network on a dataset file
    Train(#[clap(flatten)] TrainArg),
    /// Print the network's move for a board
    Suggest(#[clap(flatten)] SuggestArg),
    /// Play against the network on the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Play the network against an oracle and report the results
    Arena(#[clap(flatten)] ArenaArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::GenerateData(arg) => generate_data::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Suggest(arg) => suggest::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Arena(arg) => arena::run(&arg)?,
    }
    Ok(())
}
