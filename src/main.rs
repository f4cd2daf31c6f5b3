use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uc_events::{PolicyKind, SimulationConfig, Simulator};

const LONG_ABOUT: &str = "\
Given a target sequence of chunks T and a number of generations n, this program
generates all rearrangements made from a 'reference' haplotype (made up by linearly
ordering chunks), by n generations of unequal crossover events.
The first (leftmost in the target) and last (rightmost in the target) chunk
are considered flanking chunks and never involved in recombination,
other chunks must be between these in ASCII order.

example: simulate_uc_events 01215456 2";

#[derive(Parser, Debug)]
#[command(
    name = "simulate_uc_events",
    version,
    about = "Enumerate unequal-crossover histories that reach a target copy-number profile",
    long_about = LONG_ABOUT
)]
struct Cli {
    /// Target chunk sequence, e.g. 01215456.
    target: String,

    /// Number of generations of unequal crossover (at most 3).
    generations: usize,

    /// Which events to keep while breeding.
    #[arg(long, value_enum, default_value_t = PolicyKind::TargetOrFrontier)]
    record: PolicyKind,

    /// Worker threads for breeding (default: all logical CPUs).
    #[arg(short = 't', long)]
    threads: Option<usize>,

    /// Write the report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// More diagnostic output on stderr (repeat for trace).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only warnings and errors on stderr.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut config = SimulationConfig::new(&cli.target, cli.generations)
        .context("invalid simulation parameters")?
        .with_policy(cli.record);
    if let Some(threads) = cli.threads {
        config = config.with_threads(threads);
    }

    let simulator = Simulator::new(config).context("failed to initialise simulator")?;
    let result = simulator.run();

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create report file {}", path.display()))?;
            write_report(BufWriter::new(file), &result)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
        }
        None => write_report(io::stdout().lock(), &result).context("failed to write report")?,
    }

    info!("Thanks for using simulate_uc_events!");
    Ok(())
}

fn write_report<W: Write>(mut out: W, result: &uc_events::SimulationResult) -> io::Result<()> {
    result.report().write_to(&mut out)?;
    out.flush()
}

fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}
