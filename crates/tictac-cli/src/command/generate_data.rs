use std::{fmt, path::PathBuf};

use rand::Rng;
use tictac_dataset::{
    sample::Sample,
    synthesizer::{GenerateConfig, GenerationMode, GenerationStats, Synthesizer},
};
use tictac_engine::{Board, CELL_COUNT, Player};
use tictac_oracle::{
    MoveOracle,
    minimax::MinimaxOracle,
    rule_based::{Rule, RuleBasedOracle},
};

use crate::util::{self, Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct GenerateDataArg {
    /// Number of samples to generate for each oracle
    #[arg(long, default_value_t = 5000)]
    count: usize,
    /// How samples are collected (positions or selfplay)
    #[arg(long, default_value = "positions")]
    mode: GenerationMode,
    /// Seed for reproducible generation
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Rule-based oracle that counts which rule produced each move.
#[derive(Debug)]
struct RuleTally<R> {
    oracle: RuleBasedOracle<R>,
    counts: [usize; Rule::ALL.len()],
}

impl<R> RuleTally<R>
where
    R: Rng,
{
    fn new(oracle: RuleBasedOracle<R>) -> Self {
        Self {
            oracle,
            counts: [0; Rule::ALL.len()],
        }
    }

    fn histogram(&self) -> impl Iterator<Item = (Rule, usize)> + '_ {
        Rule::ALL.into_iter().zip(self.counts.iter().copied())
    }
}

impl<R> MoveOracle for RuleTally<R>
where
    R: Rng + fmt::Debug,
{
    fn name(&self) -> &'static str {
        self.oracle.name()
    }

    fn select_move(&mut self, board: &Board, player: Player) -> Option<usize> {
        let decision = self.oracle.decide(board, player)?;
        if let Some(i) = Rule::ALL.iter().position(|r| *r == decision.rule) {
            self.counts[i] += 1;
        }
        Some(decision.index)
    }
}

pub(crate) fn run(arg: &GenerateDataArg) -> anyhow::Result<()> {
    let GenerateDataArg {
        count,
        mode,
        seed,
        output,
    } = arg;
    let config = GenerateConfig {
        samples_per_source: *count,
        mode: *mode,
    };

    eprintln!("Generating {count} samples per oracle ({mode} mode)...");

    let mut synthesizer = Synthesizer::new(util::build_rng(*seed));
    let oracle_rng = util::build_rng(seed.map(|s| s.wrapping_add(1)));
    let mut rule_based = RuleTally::new(RuleBasedOracle::new(oracle_rng));
    let mut minimax = MinimaxOracle::new();
    let generated = synthesizer.generate_dataset_with(&mut rule_based, &mut minimax, &config);

    eprintln!();
    print_stats("rule-based", &generated.rule_based);
    print_stats("minimax", &generated.minimax);
    eprintln!("  Minimax memo entries: {}", minimax.cache_len());

    eprintln!();
    eprintln!("Rule histogram:");
    print_histogram(rule_based.histogram());

    eprintln!();
    eprintln!("Rule-based move histogram:");
    print_histogram(move_histogram(&generated.dataset.rule_based));

    eprintln!();
    eprintln!("Minimax move histogram:");
    print_histogram(move_histogram(&generated.dataset.minimax));

    Output::save_json(&generated.dataset, output.clone())?;

    eprintln!();
    eprintln!("Dataset saved successfully");
    if let Some(path) = output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Samples: {}", generated.dataset.len());

    Ok(())
}

fn print_stats(name: &str, stats: &GenerationStats) {
    let GenerationStats {
        degenerate_openings,
        skipped_no_move,
        episodes,
        stalled,
    } = stats;
    eprintln!("{name}:");
    eprintln!("  Degenerate openings: {degenerate_openings}");
    eprintln!("  Skipped (no move):   {skipped_no_move}");
    if *episodes > 0 {
        eprintln!("  Episodes:            {episodes}");
    }
    if *stalled {
        eprintln!("  Stopped early: too many discarded attempts in a row");
    }
}

fn move_histogram(samples: &[Sample]) -> impl Iterator<Item = (usize, usize)> {
    let mut counts = [0; CELL_COUNT];
    for sample in samples {
        counts[sample.target_move()] += 1;
    }
    counts.into_iter().enumerate()
}

const BAR_WIDTH: usize = 40;

fn print_histogram<I, S>(rows: I)
where
    I: IntoIterator<Item = (S, usize)>,
    S: fmt::Display,
{
    for line in histogram_lines(rows) {
        eprintln!("{line}");
    }
}

/// Renders `label | count share% bar`, bars scaled to the largest count.
#[expect(clippy::cast_precision_loss)]
fn histogram_lines<I, S>(rows: I) -> Vec<String>
where
    I: IntoIterator<Item = (S, usize)>,
    S: fmt::Display,
{
    let rows = rows.into_iter().collect::<Vec<_>>();
    let total = rows.iter().map(|(_, n)| n).sum::<usize>();
    let Some(peak) = rows.iter().map(|(_, n)| *n).max().filter(|&n| n > 0) else {
        return rows
            .iter()
            .map(|(label, n)| format!("{label:>10} | {n:>6}"))
            .collect();
    };
    rows.iter()
        .map(|(label, n)| {
            let share = *n as f64 * 100.0 / total as f64;
            let bar = "#".repeat(n * BAR_WIDTH / peak);
            format!("{label:>10} | {n:>6} {share:>5.1}% {bar}")
        })
        .collect()
}
