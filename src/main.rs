use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use csv::Writer;
use ordered_float::OrderedFloat;
use std::path::Path;
use std::time::Instant;

use nbpath::baseline::dijkstra_all;
use nbpath::logging::init_tracing;
use nbpath::{
    find_non_backtracking_path, path_info, shortest_non_backtracking_path, AdjacencyGraph, Edge,
    Link, Node,
};

#[derive(Parser, Debug)]
#[command(name = "nbpath")]
#[command(about = "Load a weighted directed graph and find shortest non-backtracking paths from a source vertex.", long_about = None)]
struct Cli {
    /// Graph file: `src,dst,weight` CSV, or one `A -> B [w]` / `A -- B [w]` edge per line
    #[arg(short, long)]
    graph: String,

    /// Input format. Inferred from the file extension if omitted.
    #[arg(long, value_enum)]
    format: Option<GraphFormat>,

    /// Source vertex label
    #[arg(short, long)]
    source: String,

    /// Destination vertex label. If omitted, reports every reachable vertex.
    #[arg(short, long)]
    target: Option<String>,

    /// Label of the vertex we arrived from; the first step may not return to it
    #[arg(short, long)]
    previous: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Algorithm::NonBacktracking)]
    algorithm: Algorithm,

    /// Stop the search once the target is settled. Only affects the single-path printout;
    /// reports always sweep the whole reachable region.
    #[arg(long, default_value_t = false)]
    early_exit: bool,

    /// Output CSV (vertex, distance, via). If omitted, prints a summary to stdout.
    #[arg(short, long)]
    out: Option<String>,

    /// Include unreachable vertices in output with infinite distance
    #[arg(long, default_value_t = false)]
    include_unreachable: bool,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Log filter, e.g. `debug` or `nbpath=trace`
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GraphFormat {
    Csv,
    Text,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Dijkstra without immediate U-turns
    NonBacktracking,
    /// Plain Dijkstra, distances only
    Dijkstra,
}

struct Row {
    vertex: String,
    distance: f64,
    via: String,
}

fn load_graph(path: &str, format: Option<GraphFormat>) -> Result<AdjacencyGraph> {
    let format = format.unwrap_or_else(|| {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => GraphFormat::Csv,
            _ => GraphFormat::Text,
        }
    });
    let graph = match format {
        GraphFormat::Csv => {
            AdjacencyGraph::from_csv_path(path).with_context(|| format!("reading CSV {path}"))?
        }
        GraphFormat::Text => {
            let text =
                std::fs::read_to_string(path).with_context(|| format!("opening {path}"))?;
            AdjacencyGraph::from_text(&text).with_context(|| format!("parsing {path}"))?
        }
    };
    Ok(graph)
}

fn lookup<'g>(graph: &'g AdjacencyGraph, label: &str) -> Result<Node<'g>> {
    graph
        .vertex(label)
        .ok_or_else(|| anyhow!("vertex `{label}` is not in the graph"))
}

fn describe(path: &[Link<'_>], src: Node<'_>) -> String {
    std::iter::once(src.label())
        .chain(path.iter().map(|l| l.dst().label()))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Report rows need final distances for every vertex, so this always runs the full sweep.
fn rows_non_backtracking<'g>(
    graph: &'g AdjacencyGraph,
    src: Node<'g>,
    previous: Option<&Link<'g>>,
) -> Vec<Row> {
    let info = path_info(&src, previous);
    graph
        .nodes()
        .map(|v| match info.get(&v) {
            Some(end) => Row {
                vertex: v.label().to_owned(),
                distance: end.distance(),
                via: end
                    .last_edge()
                    .map(|e| e.src().label().to_owned())
                    .unwrap_or_default(),
            },
            None => Row {
                vertex: v.label().to_owned(),
                distance: f64::INFINITY,
                via: String::new(),
            },
        })
        .collect()
}

fn rows_dijkstra(graph: &AdjacencyGraph, src: Node<'_>) -> Vec<Row> {
    let dist = dijkstra_all(graph, src.id());
    graph
        .nodes()
        .map(|v| Row {
            vertex: v.label().to_owned(),
            distance: dist[v.id()],
            via: String::new(),
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_level.as_deref())
        .map_err(|e| anyhow!("initializing logging: {e}"))?;

    let graph = load_graph(&cli.graph, cli.format)?;
    println!(
        "Graph: {} vertices, {} directed edges",
        graph.vertex_count(),
        graph.edge_count()
    );

    let src = lookup(&graph, &cli.source)?;
    let previous = match &cli.previous {
        Some(label) => {
            let from = lookup(&graph, label)?;
            let edge = graph
                .edge(from, src)
                .ok_or_else(|| anyhow!("no edge `{label}` -> `{}`", cli.source))?;
            Some(edge)
        }
        None => None,
    };
    let target = cli
        .target
        .as_deref()
        .map(|label| lookup(&graph, label))
        .transpose()?;

    if cli.algorithm == Algorithm::Dijkstra && previous.is_some() {
        bail!("--previous only applies to the non-backtracking search");
    }

    // Single destination with the non-backtracking search: print the path itself.
    if let (Some(dst), Algorithm::NonBacktracking, None) = (target, cli.algorithm, &cli.out) {
        let now = Instant::now();
        let path = if cli.early_exit {
            find_non_backtracking_path(&src, &dst, previous.as_ref())
        } else {
            shortest_non_backtracking_path(&src, &dst, previous.as_ref())
        };
        tracing::info!(elapsed = ?now.elapsed(), "search finished");
        println!("{:.6} s", now.elapsed().as_secs_f64());
        match path {
            Some(path) => {
                let total: f64 = path.iter().map(Edge::weight).sum();
                println!("{} (distance {:.6})", describe(&path, src), total);
            }
            None => println!("no path from {} to {}", src, dst),
        }
        return Ok(());
    }

    if cli.early_exit {
        tracing::warn!("--early-exit ignored: reports need the full sweep");
    }
    let now = Instant::now();
    let mut rows = match cli.algorithm {
        Algorithm::NonBacktracking => rows_non_backtracking(&graph, src, previous.as_ref()),
        Algorithm::Dijkstra => rows_dijkstra(&graph, src),
    };
    tracing::info!(elapsed = ?now.elapsed(), algorithm = ?cli.algorithm, "search finished");
    println!("{:.6} s", now.elapsed().as_secs_f64());

    if let Some(out_path) = cli.out {
        let mut wtr =
            Writer::from_path(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        wtr.write_record(["vertex", "distance", "via"])?;
        rows.sort_by_key(|r| OrderedFloat(r.distance));
        let mut written = 0;
        for row in &rows {
            if row.distance.is_finite() || cli.include_unreachable {
                let val = if row.distance.is_finite() {
                    format!("{:.6}", row.distance)
                } else {
                    String::from("inf")
                };
                wtr.write_record([row.vertex.as_str(), val.as_str(), row.via.as_str()])?;
                written += 1;
            }
        }
        wtr.flush()?;
        println!("Wrote distances for {} vertices to {}", written, out_path);
    } else {
        let reachable = rows.iter().filter(|r| r.distance.is_finite()).count();
        println!("Vertices: {}", rows.len());
        println!("Reachable from {}: {}", src, reachable);
        if let Some(dst) = target {
            let d = rows[dst.id()].distance;
            println!("Distance to {}: {:.6}", dst, d);
        }
        if reachable > 0 {
            let maxd = rows
                .iter()
                .map(|r| r.distance)
                .filter(|d| d.is_finite())
                .fold(0.0_f64, f64::max);
            println!("Max finite distance: {:.2}", maxd);
        }
    }

    Ok(())
}
