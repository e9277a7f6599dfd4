use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::Context as _;
use clap::Parser;
use ldakit::{Extractor, MalformedPolicy};
use tracing_subscriber::EnvFilter;

/// Extract elapsed time, perplexity and log-likelihood of each evaluated iteration
/// from a trainer log. The table goes to stdout.
#[derive(Debug, Parser)]
#[command(name = "time_perp_ll", version, about)]
struct Args {
    /// Log file written by the trainer.
    log_file: PathBuf,

    /// Warn about and skip marker lines without a numeric value instead of aborting.
    #[arg(long)]
    skip_malformed: bool,
}

impl From<&Args> for MalformedPolicy {
    fn from(args: &Args) -> Self {
        if args.skip_malformed {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Abort
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let file = File::open(&args.log_file)
        .with_context(|| format!("open {}", args.log_file.display()))?;

    let stdout = io::stdout();
    let trace = Extractor::new(MalformedPolicy::from(&args))
        .run(BufReader::new(file), stdout.lock())
        .with_context(|| format!("extract {}", args.log_file.display()))?;

    if let Some(summary) = trace.summary() {
        tracing::info!(
            rows = summary.rows,
            total_time = summary.total_time,
            final_perplexity = summary.final_perplexity,
            best_loglikelihood = summary.best_loglikelihood,
            best_row = summary.best_row,
            "trace summary"
        );
    }
    Ok(())
}
