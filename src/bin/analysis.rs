use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use log::error;
use symnmf::clustering::{KMeans, KMEANS_MAX_ITER};
use symnmf::io::load_points;
use symnmf::nmf::assign_clusters;
use symnmf::pipeline::DEFAULT_SEED;
use symnmf::statistics::silhouette_score;
use symnmf::Pipeline;

const FAILURE_MESSAGE: &str = "An Error Has Occurred";

#[derive(Parser)]
#[command(
    name = "symnmf-analysis",
    version,
    about = "Compare symNMF and k-means clusterings of the same points by silhouette score"
)]
struct Cli {
    /// Number of clusters
    k: usize,
    /// Comma-separated input points, one per line
    file: PathBuf,
    /// Seed for the random initial H
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

fn run(cli: Cli) -> anyhow::Result<(f64, f64)> {
    let points = load_points(&cli.file)?;

    let h = Pipeline::default()
        .k(cli.k)
        .seed(cli.seed)
        .factorize(points.view())?;
    let nmf_labels = assign_clusters(h.view());
    let nmf_score = silhouette_score(points.view(), &nmf_labels)?;

    let kmeans = KMeans::new(cli.k)
        .max_iter(KMEANS_MAX_ITER)
        .fit(points.view())?;
    let kmeans_score = silhouette_score(points.view(), &kmeans.labels)?;

    Ok((nmf_score, kmeans_score))
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
        Ok((nmf, kmeans)) => {
            println!("nmf: {:.4}", nmf);
            println!("kmeans: {:.4}", kmeans);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            println!("{}", FAILURE_MESSAGE);
            ExitCode::FAILURE
        }
    }
}
