//! PathPlanner CLI
//!
//! Diagnostic front end for the planner:
//! - `plan`: shortest path between two nodes, printed or published to a
//!   simulated register window
//! - `reach`: BFS distance from one node to every other node
//! - `graph`: dump the adjacency table in use
//!
//! Exit codes: 0 when a path exists, 2 when the end node is unreachable,
//! 1 on any error.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

use pathplanner_core::{
    parse_node, plan, plan_via_registers, AdjacencyGraph, ConsoleReporter, GraphSource,
    HardwarePort, MemoryPort, NodeId, PathFinder, PathOutcome, PlanRequest, PlannerConfig,
    RegisterGraphLoader, RegisterMap, Target,
};

#[derive(Parser)]
#[command(name = "pathplanner")]
#[command(author, version, about = "Shortest paths across a 32-node field graph")]
struct Cli {
    /// JSON config file (graph source, output target, register map).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Adjacency table as JSON (32 masks or `{"adjacency": [[...], ...]}`).
    /// Overrides the config file.
    #[arg(long, global = true)]
    graph: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the shortest path from START to END.
    Plan {
        /// Start node (0-31)
        start: String,
        /// End node (0-31)
        end: String,
        /// Where to publish the plan. Overrides the config file.
        #[arg(long, value_enum)]
        target: Option<TargetArg>,
        /// Print the outcome as JSON instead of the plan block.
        #[arg(long)]
        json: bool,
    },

    /// Print the BFS distance from START to every node.
    Reach {
        /// Start node (0-31)
        start: String,
    },

    /// Print the adjacency lists of the graph in use.
    Graph,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum TargetArg {
    Console,
    Registers,
}

impl From<TargetArg> for Target {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Console => Target::Console,
            TargetArg::Registers => Target::Registers,
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<PlannerConfig> {
    let mut config = match &cli.config {
        Some(path) => PlannerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    if let Some(graph) = &cli.graph {
        config.graph = GraphSource::File(graph.clone());
    }
    Ok(config)
}

fn load_graph(config: &PlannerConfig) -> Result<AdjacencyGraph> {
    config.graph.load().context("loading graph")
}

fn cmd_plan(
    config: &PlannerConfig,
    start: &str,
    end: &str,
    target: Target,
    json: bool,
) -> Result<PathOutcome> {
    let request = PlanRequest::from_args(start, end)?;
    let graph = load_graph(config)?;

    match target {
        Target::Console if json => {
            let outcome = PathFinder::new(&graph).find(request.start, request.end);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(outcome)
        }
        Target::Console => {
            let mut reporter = ConsoleReporter::new(io::stdout().lock());
            Ok(plan(&graph, request, &mut reporter)?)
        }
        Target::Registers => {
            let map = config.registers;
            let mut port = MemoryPort::new();
            RegisterGraphLoader::store(&mut port, &map, &graph)?;
            write_request(&mut port, &map, request);
            let outcome = plan_via_registers(&mut port, &map)?;
            print_registers(&port, &map, json)?;
            Ok(outcome)
        }
    }
}

/// Host-side stand-in for whoever writes the start/end registers.
fn write_request(port: &mut MemoryPort, map: &RegisterMap, request: PlanRequest) {
    port.write_u8(map.start, request.start.raw());
    port.write_u8(map.end, request.end.raw());
    port.clear_history();
}

fn print_registers(port: &MemoryPort, map: &RegisterMap, json: bool) -> Result<()> {
    let length = port.peek(map.path_length, 1)[0];
    let node_point = port.writes_to(map.node_point);
    let buffered = port.peek(map.path_base, (length as usize).min(map.path_capacity()));
    let done = port.peek(map.cpu_done, 1)[0];

    if json {
        let dump = serde_json::json!({
            "path_length": length,
            "node_point_writes": node_point,
            "path_buffer": buffered,
            "cpu_done": done,
        });
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Register window".bold())?;
    writeln!(out, "  PATH_LENGTH @ {:#010x} = {}", map.path_length, length)?;
    writeln!(out, "  PATH_BUF    @ {:#010x} = {:?}", map.path_base, buffered)?;
    writeln!(out, "  NODE_POINT  @ {:#010x} <- {:?}", map.node_point, node_point)?;
    writeln!(out, "  CPU_DONE    @ {:#010x} = {}", map.cpu_done, done)?;
    Ok(())
}

fn cmd_reach(config: &PlannerConfig, start: &str) -> Result<()> {
    let start = parse_node(start)?;
    let graph = load_graph(config)?;
    let distances = PathFinder::new(&graph).distances_from(start);

    let mut out = io::stdout().lock();
    writeln!(out, "{}", format!("Distances from node {start}").bold())?;
    for (node, distance) in NodeId::all().zip(distances) {
        match distance {
            Some(d) => writeln!(out, "{node:>4}: {d}")?,
            None => writeln!(out, "{node:>4}: {}", "unreachable".dimmed())?,
        }
    }
    Ok(())
}

fn cmd_graph(config: &PlannerConfig) -> Result<()> {
    let graph = load_graph(config)?;
    print!("{graph}");
    if !graph.is_symmetric() {
        eprintln!("{} graph has one-way edges", "note:".yellow());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = (|| -> Result<ExitCode> {
        let config = load_config(&cli)?;
        match &cli.command {
            Commands::Plan {
                start,
                end,
                target,
                json,
            } => {
                let target = target.map(Target::from).unwrap_or(config.target);
                let outcome = cmd_plan(&config, start, end, target, *json)?;
                if outcome.is_found() {
                    Ok(ExitCode::SUCCESS)
                } else {
                    eprintln!(
                        "{} node {end} is not reachable from node {start}",
                        "unreachable:".yellow()
                    );
                    Ok(ExitCode::from(2))
                }
            }
            Commands::Reach { start } => {
                cmd_reach(&config, start)?;
                Ok(ExitCode::SUCCESS)
            }
            Commands::Graph => {
                cmd_graph(&config)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    })();

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
