//! PathPlanner: shortest routes across a fixed 32-node field graph
//!
//! The field is a directed graph of exactly [`NODE_COUNT`] nodes. Each node
//! stores its outgoing edges as one 32-bit adjacency mask, and each search
//! tracks visited nodes in a single 32-bit word, so a whole query runs in a
//! few hundred bytes of stack.
//!
//! ## Module Organization
//!
//! - `node`: validated node indices
//! - `graph`: adjacency masks, the reference field layout, JSON loading
//! - `visited` / `frontier`: per-search BFS state
//! - `path_finder`: breadth-first search and path reconstruction
//! - `port`: register window access (simulated or memory-mapped)
//! - `adapter`: argument/register inputs and console/register outputs
//! - `config`: JSON configuration
//!
//! ## Example
//!
//! ```
//! use pathplanner_core::{AdjacencyGraph, NodeId, PathFinder, PathOutcome};
//!
//! let graph = AdjacencyGraph::sample();
//! let finder = PathFinder::new(&graph);
//! let outcome = finder.find(NodeId::new(0).unwrap(), NodeId::new(31).unwrap());
//! match outcome {
//!     PathOutcome::Found(path) => assert_eq!(path.as_bytes(), vec![0, 10, 24, 23, 30, 31]),
//!     PathOutcome::Unreachable => unreachable!(),
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod node;
pub mod path_finder;
pub mod port;
pub mod visited;

// Re-export key types
pub use adapter::{
    parse_node, ConsoleReporter, PathReporter, PlanRequest, RegisterGraphLoader, RegisterInput,
    RegisterReporter,
};
pub use config::{GraphSource, PlannerConfig, Target};
pub use error::{PlannerError, Result};
pub use frontier::FrontierQueue;
pub use graph::{AdjacencyGraph, SAMPLE_MASKS};
pub use node::{NodeId, NODE_COUNT};
pub use path_finder::{Path, PathFinder, PathOutcome};
pub use port::{HardwarePort, MemoryPort, RegisterMap};
#[cfg(feature = "mmio")]
pub use port::MmioPort;
pub use visited::VisitedMask;

/// Run one plan end to end: search `graph` and hand the outcome to `reporter`.
pub fn plan<R: PathReporter + ?Sized>(
    graph: &AdjacencyGraph,
    request: PlanRequest,
    reporter: &mut R,
) -> Result<PathOutcome> {
    let outcome = PathFinder::new(graph).find(request.start, request.end);
    reporter.report(&outcome)?;
    Ok(outcome)
}

/// The embedded flow: graph, request, and result all travel through `port`.
///
/// The adjacency table is expected to be present at `map.graph_base`
/// already (see [`RegisterGraphLoader::store`]). A request whose start or
/// end register is out of range still raises `cpu_done` (with length 0)
/// before the error is returned, so a polling host is never left waiting.
pub fn plan_via_registers<P: HardwarePort>(port: &mut P, map: &RegisterMap) -> Result<PathOutcome> {
    let graph = RegisterGraphLoader::load(port, map)?;
    let request = RegisterInput::read(port, map);
    let mut reporter = RegisterReporter::new(port, *map);
    let request = match request {
        Ok(request) => request,
        Err(err) => {
            reporter.report_rejected(&err)?;
            return Err(err);
        }
    };
    plan(&graph, request, &mut reporter)
}
