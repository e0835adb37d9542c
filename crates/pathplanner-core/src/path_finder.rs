//! Breadth-first shortest paths with parent-map reconstruction.
//!
//! Every search owns a fresh visited mask, parent map, and frontier, so a
//! `PathFinder` can be shared freely between threads.
//!
//! Neighbors are scanned in ascending index order. Among several shortest
//! paths this picks the one whose nodes are discovered first, which makes the
//! result deterministic for a given graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::frontier::FrontierQueue;
use crate::graph::AdjacencyGraph;
use crate::node::{NodeId, NODE_COUNT};
use crate::visited::VisitedMask;

/// BFS predecessor of every discovered node.
type ParentMap = [Option<NodeId>; NODE_COUNT];

/// An ordered start-to-end node sequence (both ends included).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    nodes: Vec<NodeId>,
}

impl Path {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of nodes on the path (a single-node path has length 1).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges walked.
    pub fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn end(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Raw node indices, as written to the path register window.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.nodes.iter().map(|n| n.raw()).collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

/// Result of a single search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "path", rename_all = "snake_case")]
pub enum PathOutcome {
    Found(Path),
    /// BFS finished without discovering the end node.
    Unreachable,
}

impl PathOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            PathOutcome::Found(path) => Some(path),
            PathOutcome::Unreachable => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PathOutcome::Found(_))
    }

    /// Node count reported to output adapters (0 when unreachable).
    pub fn reported_len(&self) -> usize {
        self.path().map_or(0, Path::len)
    }
}

/// Shortest-path search over a borrowed [`AdjacencyGraph`].
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g> {
    graph: &'g AdjacencyGraph,
}

impl<'g> PathFinder<'g> {
    pub fn new(graph: &'g AdjacencyGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &'g AdjacencyGraph {
        self.graph
    }

    /// Like [`find`](Self::find), but validates raw indices first.
    pub fn find_raw(&self, start: u8, end: u8) -> Result<PathOutcome> {
        Ok(self.find(NodeId::new(start)?, NodeId::new(end)?))
    }

    /// Shortest path (by edge count) from `start` to `end`.
    pub fn find(&self, start: NodeId, end: NodeId) -> PathOutcome {
        if start == end {
            tracing::debug!(%start, "start equals end");
            return PathOutcome::Found(Path { nodes: vec![start] });
        }

        let mut parents: ParentMap = [None; NODE_COUNT];
        let visited = self.search(start, Some(end), &mut parents, |_, _| {});

        let outcome = if visited.contains(end) {
            PathOutcome::Found(reconstruct(&parents, start, end))
        } else {
            PathOutcome::Unreachable
        };
        match &outcome {
            PathOutcome::Found(path) => {
                tracing::debug!(%start, %end, nodes = path.len(), %path, "path found")
            }
            PathOutcome::Unreachable => {
                tracing::debug!(%start, %end, visited = visited.len(), "end not reachable")
            }
        }
        outcome
    }

    /// Every node reachable from `start`, `start` included.
    pub fn reachable_from(&self, start: NodeId) -> VisitedMask {
        let mut parents: ParentMap = [None; NODE_COUNT];
        self.search(start, None, &mut parents, |_, _| {})
    }

    /// BFS edge distance from `start` to each node, `None` when unreachable.
    pub fn distances_from(&self, start: NodeId) -> [Option<u8>; NODE_COUNT] {
        let mut distances = [None; NODE_COUNT];
        distances[start.index()] = Some(0);
        let mut parents: ParentMap = [None; NODE_COUNT];
        self.search(start, None, &mut parents, |parent, child| {
            let depth = distances[parent.index()].map_or(0, |d: u8| d + 1);
            distances[child.index()] = Some(depth);
        });
        distances
    }

    /// Level-order expansion from `start`, recording each discovery in
    /// `parents` and reporting it to `on_discover(parent, child)`.
    /// Stops as soon as `stop_at` is discovered.
    fn search(
        &self,
        start: NodeId,
        stop_at: Option<NodeId>,
        parents: &mut ParentMap,
        mut on_discover: impl FnMut(NodeId, NodeId),
    ) -> VisitedMask {
        let mut visited = VisitedMask::new();
        let mut frontier = FrontierQueue::new();
        visited.insert(start);
        frontier.push_back(start);

        let mut expansions = 0usize;
        'expand: while let Some(current) = frontier.pop_front() {
            expansions += 1;
            let edges = self.graph.mask(current);
            for neighbor in NodeId::all() {
                if edges & neighbor.bit() == 0 || !visited.insert(neighbor) {
                    continue;
                }
                parents[neighbor.index()] = Some(current);
                frontier.push_back(neighbor);
                on_discover(current, neighbor);
                if Some(neighbor) == stop_at {
                    break 'expand;
                }
            }
        }

        tracing::trace!(
            %start,
            expansions,
            enqueued = frontier.enqueued(),
            visited = visited.bits(),
            "bfs finished"
        );
        visited
    }
}

/// Walk parents back from `end` to `start`, then flip into start-to-end order.
fn reconstruct(parents: &ParentMap, start: NodeId, end: NodeId) -> Path {
    let mut nodes = Vec::with_capacity(NODE_COUNT);
    let mut current = end;
    while current != start {
        nodes.push(current);
        match parents[current.index()] {
            Some(parent) => current = parent,
            // Only called for visited `end`; every visited node but `start`
            // has a parent.
            None => unreachable!("visited node {current} has no BFS parent"),
        }
    }
    nodes.push(start);
    nodes.reverse();
    Path { nodes }
}
