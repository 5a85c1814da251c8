//! Command-line front end: run every `.mcf` query in a directory against
//! every `.aut` graph in the same directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use log::info;

use mucalc_rs::checker::CheckerOutput;
use mucalc_rs::depths;
use mucalc_rs::emerson::EmersonLeiChecker;
use mucalc_rs::formula::Formula;
use mucalc_rs::graph::Graph;
use mucalc_rs::naive::NaiveChecker;
use mucalc_rs::parser::parse_query;
use mucalc_rs::tree::FixpointTree;

/// Explicit-state modal mu-calculus model checker
#[derive(Parser, Debug)]
struct Args {
    /// directory holding .aut graphs and .mcf queries
    dirpath: PathBuf,

    /// run only this graph file
    #[arg(short, long)]
    graph: Option<String>,

    /// use the Emerson-Lei checker instead of the naive one
    #[arg(short, long, default_value_t = false)]
    emerson: bool,

    /// print depth metrics for every query
    #[arg(short, long, default_value_t = false)]
    depths: bool,

    /// verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

struct Query {
    formula: Formula,
    variables: BTreeSet<String>,
    source: String,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let (query_files, graph_files) = collect_files(&args)?;
    if graph_files.is_empty() {
        return Err(eyre!("no graph files to run in {}", args.dirpath.display()));
    }

    let mut queries = Vec::new();
    for path in &query_files {
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read {}", path.display()))?;
        let (formula, variables) =
            parse_query(&text).map_err(|e| eyre!("{}: {}", path.display(), e))?;
        let source = formula.to_string();
        queries.push(Query {
            formula,
            variables,
            source,
        });
    }

    info!(
        "using the {} checker",
        if args.emerson { "Emerson-Lei" } else { "naive" }
    );

    for path in &graph_files {
        let graph = Graph::from_file(path).map_err(|e| eyre!(e))?;
        println!("############################");
        println!("Processing file {}", path.display());
        println!("############################");
        for query in &queries {
            run_query(&graph, query, &args);
        }
    }

    Ok(())
}

fn run_query(graph: &Graph, query: &Query, args: &Args) {
    println!("Query={}", query.source);
    if args.depths {
        let tree = FixpointTree::build(&query.formula);
        let metrics = depths::compute(&query.formula, &tree);
        println!(
            "Depths: nested={} alternation={} dependent-alternation={}",
            metrics.nested, metrics.alternation, metrics.dependent_alternation
        );
    }

    let output: CheckerOutput = if args.emerson {
        EmersonLeiChecker::new(graph).solve_formula(&query.variables, &query.formula)
    } else {
        NaiveChecker::new(graph).solve_formula(&query.variables, &query.formula)
    };

    let mut counts: Vec<_> = output.num_iter.iter().collect();
    counts.sort();
    for (variable, iterations) in counts {
        println!("Variable={} Num Iterations={}", variable, iterations);
    }
    println!("Duration={}ms", output.running_time.as_millis());
    println!("Satisfying States={}", output.satisfied_states.len());
    if graph.num_nodes() > 0 {
        println!(
            "Initial state {} {} the formula",
            graph.first_state(),
            if output.satisfied_states.contains(graph.first_state()) {
                "satisfies"
            } else {
                "does not satisfy"
            }
        );
    }
    println!("---------------------------------------");
    println!();
}

/// Splits the directory's contents into query and graph files, both sorted.
fn collect_files(args: &Args) -> color_eyre::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut query_files = Vec::new();
    let mut graph_files = Vec::new();
    let entries = fs::read_dir(&args.dirpath)
        .wrap_err_with(|| format!("cannot list {}", args.dirpath.display()))?;
    for entry in entries {
        let path = entry?.path();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("mcf") => query_files.push(path),
            Some("aut") => graph_files.push(path),
            _ => {}
        }
    }
    if let Some(only) = &args.graph {
        graph_files.retain(|p| p.file_name().and_then(|n| n.to_str()) == Some(only.as_str()));
    }
    query_files.sort();
    graph_files.sort();
    Ok((query_files, graph_files))
}
