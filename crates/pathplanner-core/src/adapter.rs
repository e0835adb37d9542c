//! Adapters between the path finder and its surroundings.
//!
//! Inputs arrive either as process arguments or as bytes in the register
//! window; results leave either as console text or as register writes. Both
//! sides validate or format only, the search itself lives in
//! [`path_finder`](crate::path_finder).

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::error::{PlannerError, Result};
use crate::graph::AdjacencyGraph;
use crate::node::{NodeId, NODE_COUNT};
use crate::path_finder::PathOutcome;
use crate::port::{HardwarePort, RegisterMap};

const PLAN_HEADER: &str = "######### Planned Path #########";
const PLAN_FOOTER: &str = "################################";

/// A validated start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub start: NodeId,
    pub end: NodeId,
}

impl PlanRequest {
    pub fn new(start: NodeId, end: NodeId) -> Self {
        Self { start, end }
    }

    /// Parse the two positional arguments of the diagnostic build.
    pub fn from_args(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: parse_node(start)?,
            end: parse_node(end)?,
        })
    }
}

/// Parse one node argument, rejecting non-numbers and indices past the last node.
pub fn parse_node(arg: &str) -> Result<NodeId> {
    let value: u64 = arg
        .trim()
        .parse()
        .map_err(|err: std::num::ParseIntError| PlannerError::InvalidArgument {
            value: arg.to_string(),
            reason: err.to_string(),
        })?;
    if value >= NODE_COUNT as u64 {
        return Err(PlannerError::InvalidIndex { index: value });
    }
    NodeId::try_from(value as usize)
}

/// Reads the start/end registers.
pub struct RegisterInput;

impl RegisterInput {
    pub fn read<P: HardwarePort>(port: &mut P, map: &RegisterMap) -> Result<PlanRequest> {
        let start = port.read_u8(map.start);
        let end = port.read_u8(map.end);
        tracing::debug!(start, end, "read plan request from registers");
        Ok(PlanRequest::new(NodeId::new(start)?, NodeId::new(end)?))
    }
}

/// Moves the adjacency table in and out of the register window.
pub struct RegisterGraphLoader;

impl RegisterGraphLoader {
    pub fn store<P: HardwarePort>(
        port: &mut P,
        map: &RegisterMap,
        graph: &AdjacencyGraph,
    ) -> Result<()> {
        map.validate()?;
        for (index, mask) in graph.masks().iter().enumerate() {
            port.write_u32(map.graph_word(index), *mask);
        }
        tracing::debug!(base = map.graph_base, "stored adjacency table");
        Ok(())
    }

    pub fn load<P: HardwarePort>(port: &mut P, map: &RegisterMap) -> Result<AdjacencyGraph> {
        map.validate()?;
        let mut masks = [0u32; NODE_COUNT];
        for (index, mask) in masks.iter_mut().enumerate() {
            *mask = port.read_u32(map.graph_word(index));
        }
        Ok(AdjacencyGraph::from_masks(masks))
    }
}

/// Publishes a search result.
pub trait PathReporter {
    fn report(&mut self, outcome: &PathOutcome) -> Result<()>;
}

/// Writes the plan as text, one node per line.
pub struct ConsoleReporter<W> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PathReporter for ConsoleReporter<W> {
    fn report(&mut self, outcome: &PathOutcome) -> Result<()> {
        match outcome {
            PathOutcome::Found(path) => {
                writeln!(self.out, "Path length: {}", path.len())?;
                writeln!(self.out, "{PLAN_HEADER}")?;
                for node in path.nodes() {
                    writeln!(self.out, "{node}")?;
                }
                writeln!(self.out, "{PLAN_FOOTER}")?;
            }
            PathOutcome::Unreachable => {
                writeln!(self.out, "No path found")?;
                writeln!(self.out, "Path length: 0")?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Publishes the plan through the register window.
///
/// Order of writes: path buffer, `path_length`, one `node_point` write per
/// node, then `cpu_done = 1`. An unreachable end or a rejected request
/// publishes length 0 and still raises `cpu_done` so the host does not wait
/// forever.
pub struct RegisterReporter<P> {
    port: P,
    map: RegisterMap,
}

impl<P: HardwarePort> RegisterReporter<P> {
    pub fn new(port: P, map: RegisterMap) -> Self {
        Self { port, map }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn into_port(self) -> P {
        self.port
    }

    /// Publish an empty plan for a request that could not be served.
    pub fn report_rejected(&mut self, err: &PlannerError) -> Result<()> {
        self.map.validate()?;
        tracing::warn!(error = %err, "rejected plan request");
        self.port.write_u8(self.map.path_length, 0);
        self.port.write_u8(self.map.cpu_done, 1);
        Ok(())
    }
}

impl<P: HardwarePort> PathReporter for RegisterReporter<P> {
    fn report(&mut self, outcome: &PathOutcome) -> Result<()> {
        self.map.validate()?;
        let bytes = outcome.path().map(|p| p.as_bytes()).unwrap_or_default();

        let capacity = self.map.path_capacity();
        if bytes.len() > capacity {
            tracing::warn!(
                nodes = bytes.len(),
                capacity,
                "path longer than the path buffer; buffer holds a prefix"
            );
        }
        for (offset, byte) in bytes.iter().take(capacity).enumerate() {
            self.port.write_u8(self.map.path_base + offset as u32, *byte);
        }

        self.port.write_u8(self.map.path_length, bytes.len() as u8);
        for byte in &bytes {
            self.port.write_u8(self.map.node_point, *byte);
        }
        self.port.write_u8(self.map.cpu_done, 1);

        tracing::info!(
            nodes = bytes.len(),
            found = outcome.is_found(),
            "published plan to registers"
        );
        Ok(())
    }
}
