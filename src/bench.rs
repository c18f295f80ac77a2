use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use std::time::Instant;

use nbpath::baseline::dijkstra_all;
use nbpath::logging::init_tracing;
use nbpath::{path_info, AdjacencyGraph};

#[derive(Parser, Debug)]
#[command(name = "nbpath-bench")]
#[command(about = "Time repeated searches over a `src,dst,weight` CSV graph.", long_about = None)]
struct Cli {
    /// Path to the .csv file
    #[arg(short, long)]
    csv: String,

    /// Number of runs. Searches from vertex ids 0, 1, 2, ... num_runs - 1.
    #[arg(short, long)]
    num_runs: usize,

    #[arg(short, long, value_enum, default_value_t = Algorithm::NonBacktracking)]
    algorithm: Algorithm,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    NonBacktracking,
    Dijkstra,
}

impl Algorithm {
    /// Returns the number of vertices reached.
    fn run(&self, graph: &AdjacencyGraph, start: usize) -> usize {
        match self {
            Algorithm::NonBacktracking => path_info(&graph.node(start), None).len(),
            Algorithm::Dijkstra => dijkstra_all(graph, start)
                .iter()
                .filter(|d| d.is_finite())
                .count(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, None).map_err(|e| anyhow!("initializing logging: {e}"))?;

    let graph = AdjacencyGraph::from_csv_path(&cli.csv)
        .with_context(|| format!("reading CSV {}", &cli.csv))?;
    let runs = cli.num_runs.min(graph.vertex_count());

    let mut duration_millis = Vec::with_capacity(runs);
    for src_idx in 0..runs {
        let now = Instant::now();
        let reached = cli.algorithm.run(&graph, src_idx);
        duration_millis.push(now.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(source = src_idx, reached, "run finished");
    }
    println!("{:?}", duration_millis);

    Ok(())
}
