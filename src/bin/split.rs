use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use ldakit::{split::read_lines, write_split, Sampler, SplitConfig};
use tracing_subscriber::EnvFilter;

/// Randomly split a line corpus into a train file and a test file.
#[derive(Debug, Parser)]
#[command(name = "split", version, about)]
struct Args {
    /// Corpus with one record per line.
    input: PathBuf,

    /// Fraction of lines that go to the test file, e.g. 0.1.
    test_ratio: f64,

    /// Output file for train lines.
    train_output: PathBuf,

    /// Output file for test lines.
    test_output: PathBuf,

    /// Seed for a reproducible split. Unseeded by default.
    #[arg(long)]
    seed: Option<u64>,
}

impl From<&Args> for SplitConfig {
    fn from(args: &Args) -> Self {
        SplitConfig {
            input: args.input.clone(),
            test_ratio: args.test_ratio,
            train_output: args.train_output.clone(),
            test_output: args.test_output.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = SplitConfig::from(&args);
    let mut sampler = Sampler::from(args.seed);

    config.check()?;
    let lines = read_lines(&config.input)
        .with_context(|| format!("read {}", config.input.display()))?;
    println!("total = {}", lines.len());

    let summary = write_split(&config, lines, &mut sampler)
        .with_context(|| format!("split {}", config.input.display()))?;
    println!(
        "num train = {}, num test = {}",
        summary.num_train, summary.num_test
    );
    Ok(())
}
