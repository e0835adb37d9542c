//! Fixed 32-node directed graph stored as one adjacency mask per node.
//!
//! Bit `j` of `masks[i]` is set when the edge `i -> j` exists.
//!
//! Graphs can be loaded from JSON in either of two shapes:
//!
//! ```json
//! [1090, 2053, 58, ...]                      // 32 raw masks
//! { "adjacency": [[1, 6, 10], [0, 2, 11], ...] }  // 32 neighbor lists
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{PlannerError, Result};
use crate::node::{NodeId, NODE_COUNT};

/// Adjacency table of the reference 32-node field layout.
pub const SAMPLE_MASKS: [u32; NODE_COUNT] = [
    0b00000000000000000000010001000010, // 0
    0b00000000000000000000100000000101, // 1
    0b00000000000000000000000000111010, // 2
    0b00000000000000000000000000000100, // 3
    0b00000000000000000000000000000100, // 4
    0b00000000000000000000000000000100, // 5
    0b00000000000000000000001110000001, // 6
    0b00000000000000000000000001000000, // 7
    0b00000000000000000000000001000000, // 8
    0b00000000000000000000000001000000, // 9
    0b00000101000000000000000000000001, // 10
    0b00000000000010000001000000000010, // 11
    0b00000000000000000110100000000000, // 12
    0b00000000000000000001000000000000, // 13
    0b00000000000000011001000000000000, // 14
    0b00000000000000000100000000000000, // 15
    0b00000000000001100100000000000000, // 16
    0b00000000000000010000000000000000, // 17
    0b00000000001010010000000000000000, // 18
    0b00000000000101000000100000000000, // 19
    0b00000000000010000000000000000000, // 20
    0b00000000110001000000000000000000, // 21
    0b00000000001000000000000000000000, // 22
    0b01000001001000000000000000000000, // 23
    0b00000010100000000000010000000000, // 24
    0b00000001000000000000000000000000, // 25
    0b00011000000000000000010000000000, // 26
    0b00000100000000000000000000000000, // 27
    0b01100100000000000000000000000000, // 28
    0b00010000000000000000000000000000, // 29
    0b10010000100000000000000000000000, // 30
    0b01000000000000000000000000000000, // 31
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[u32; NODE_COUNT]", try_from = "GraphFile")]
pub struct AdjacencyGraph {
    masks: [u32; NODE_COUNT],
}

impl AdjacencyGraph {
    /// A graph with no edges.
    pub const fn empty() -> Self {
        Self {
            masks: [0; NODE_COUNT],
        }
    }

    pub const fn from_masks(masks: [u32; NODE_COUNT]) -> Self {
        Self { masks }
    }

    /// The reference field layout (see [`SAMPLE_MASKS`]).
    pub const fn sample() -> Self {
        Self::from_masks(SAMPLE_MASKS)
    }

    /// Build a graph from one neighbor list per node.
    pub fn from_neighbor_lists<L, N>(lists: L) -> Result<Self>
    where
        L: IntoIterator<Item = N>,
        N: IntoIterator<Item = u32>,
    {
        let mut graph = Self::empty();
        let mut rows = 0usize;
        for (from, neighbors) in lists.into_iter().enumerate() {
            if from >= NODE_COUNT {
                return Err(PlannerError::MalformedGraph(format!(
                    "expected {NODE_COUNT} neighbor lists, got more"
                )));
            }
            let from = NodeId::from_index(from);
            for to in neighbors {
                let to = NodeId::try_from(to).map_err(|_| {
                    PlannerError::MalformedGraph(format!(
                        "node {from} lists neighbor {to}, which is out of range"
                    ))
                })?;
                graph.add_edge(from, to);
            }
            rows += 1;
        }
        if rows != NODE_COUNT {
            return Err(PlannerError::MalformedGraph(format!(
                "expected {NODE_COUNT} neighbor lists, got {rows}"
            )));
        }
        Ok(graph)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a graph from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PlannerError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let graph = Self::from_json_str(&text)?;
        tracing::info!(path = %path.display(), edges = graph.edge_count(), "loaded graph");
        if !graph.is_symmetric() {
            tracing::warn!(path = %path.display(), "graph has one-way edges");
        }
        Ok(graph)
    }

    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.masks[from.index()] |= to.bit();
    }

    pub fn add_undirected_edge(&mut self, a: NodeId, b: NodeId) {
        self.add_edge(a, b);
        self.add_edge(b, a);
    }

    /// Builder form of [`add_edge`](Self::add_edge).
    pub fn with_edge(mut self, from: NodeId, to: NodeId) -> Self {
        self.add_edge(from, to);
        self
    }

    #[inline]
    pub const fn has_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.masks[from.index()] & to.bit() != 0
    }

    #[inline]
    pub const fn mask(&self, node: NodeId) -> u32 {
        self.masks[node.index()]
    }

    pub const fn masks(&self) -> &[u32; NODE_COUNT] {
        &self.masks
    }

    /// Outgoing neighbors of `node` in ascending index order.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mask = self.mask(node);
        NodeId::all().filter(move |n| mask & n.bit() != 0)
    }

    pub fn edge_count(&self) -> usize {
        self.masks.iter().map(|m| m.count_ones() as usize).sum()
    }

    /// `true` when every edge has a matching reverse edge.
    pub fn is_symmetric(&self) -> bool {
        NodeId::all().all(|from| self.neighbors(from).all(|to| self.has_edge(to, from)))
    }
}

impl Default for AdjacencyGraph {
    fn default() -> Self {
        Self::sample()
    }
}

impl From<AdjacencyGraph> for [u32; NODE_COUNT] {
    fn from(graph: AdjacencyGraph) -> Self {
        graph.masks
    }
}

impl fmt::Display for AdjacencyGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in NodeId::all() {
            let neighbors: Vec<String> = self.neighbors(node).map(|n| n.to_string()).collect();
            writeln!(f, "{node:>2}: {}", neighbors.join(", "))?;
        }
        Ok(())
    }
}

/// On-disk shapes accepted by the JSON loader.
#[derive(Deserialize)]
#[serde(untagged)]
enum GraphFile {
    Masks(Vec<u32>),
    Lists { adjacency: Vec<Vec<u32>> },
}

impl TryFrom<GraphFile> for AdjacencyGraph {
    type Error = PlannerError;

    fn try_from(file: GraphFile) -> Result<Self> {
        match file {
            GraphFile::Masks(masks) => {
                let count = masks.len();
                let masks: [u32; NODE_COUNT] = masks.try_into().map_err(|_| {
                    PlannerError::MalformedGraph(format!(
                        "expected {NODE_COUNT} adjacency masks, got {count}"
                    ))
                })?;
                Ok(Self::from_masks(masks))
            }
            GraphFile::Lists { adjacency } => Self::from_neighbor_lists(adjacency),
        }
    }
}
