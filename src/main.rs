use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use log::error;
use symnmf::io::{load_points, write_matrix};
use symnmf::nmf::{EPSILON, MAX_ITER};
use symnmf::pipeline::DEFAULT_SEED;
use symnmf::{Goal, Pipeline, SymNmfBuilder};

const FAILURE_MESSAGE: &str = "An Error Has Occurred";

#[derive(Parser)]
#[command(
    name = "symnmf",
    version,
    about = "Graph-based symmetric NMF: similarity, degree and normalized matrices, or the cluster factor H"
)]
struct Cli {
    /// What to compute: symnmf, sym, ddg or norm
    goal: Goal,
    /// Comma-separated input points, one per line
    file: PathBuf,
    /// Number of clusters (required for symnmf)
    #[arg(short, long)]
    k: Option<usize>,
    /// Iteration cap for the H optimizer
    #[arg(long, default_value_t = MAX_ITER)]
    max_iter: usize,
    /// Convergence threshold on the squared change of H
    #[arg(long, default_value_t = EPSILON)]
    epsilon: f64,
    /// Seed for the random initial H
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let points = load_points(&cli.file)?;

    let nmf = SymNmfBuilder::new()
        .max_iter(cli.max_iter)
        .epsilon(cli.epsilon)
        .build();
    let mut pipeline = Pipeline::new(nmf).seed(cli.seed);
    if let Some(k) = cli.k {
        pipeline = pipeline.k(k);
    }

    let result = pipeline.evaluate(cli.goal, points.view())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_matrix(&mut out, result.view())?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            error!("{}", e);
            println!("{}", FAILURE_MESSAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            println!("{}", FAILURE_MESSAGE);
            ExitCode::FAILURE
        }
    }
}
