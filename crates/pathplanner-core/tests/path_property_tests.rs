use pathplanner_core::{AdjacencyGraph, NodeId, PathFinder, PathOutcome, NODE_COUNT};
use proptest::prelude::*;

const MAX_OUT_DEGREE: usize = 3;
const UNREACHED: u32 = u32::MAX;

/// Sparse random graphs: each node gets a handful of outgoing edges, which
/// leaves plenty of disconnected pairs.
fn sparse_graph_strategy() -> impl Strategy<Value = AdjacencyGraph> {
    prop::collection::vec(
        prop::collection::vec(0u32..NODE_COUNT as u32, 0..=MAX_OUT_DEGREE),
        NODE_COUNT,
    )
    .prop_map(|lists| AdjacencyGraph::from_neighbor_lists(lists).expect("indices are in range"))
}

/// Dense random graphs built by intersecting random words.
fn dense_graph_strategy() -> impl Strategy<Value = AdjacencyGraph> {
    prop::collection::vec((any::<u32>(), any::<u32>()), NODE_COUNT).prop_map(|words| {
        let mut masks = [0u32; NODE_COUNT];
        for (mask, (a, b)) in masks.iter_mut().zip(words) {
            *mask = a & b;
        }
        AdjacencyGraph::from_masks(masks)
    })
}

fn node_strategy() -> impl Strategy<Value = NodeId> {
    (0u8..NODE_COUNT as u8).prop_map(|raw| NodeId::new(raw).expect("raw is in range"))
}

/// All-pairs edge distances by Floyd–Warshall, independent of the BFS.
fn reference_distances(graph: &AdjacencyGraph) -> Vec<Vec<u32>> {
    let mut dist = vec![vec![UNREACHED; NODE_COUNT]; NODE_COUNT];
    for from in NodeId::all() {
        dist[from.index()][from.index()] = 0;
        for to in NodeId::all() {
            if from != to && graph.has_edge(from, to) {
                dist[from.index()][to.index()] = 1;
            }
        }
    }
    for k in 0..NODE_COUNT {
        for i in 0..NODE_COUNT {
            for j in 0..NODE_COUNT {
                let (ik, kj) = (dist[i][k], dist[k][j]);
                if ik != UNREACHED && kj != UNREACHED && ik + kj < dist[i][j] {
                    dist[i][j] = ik + kj;
                }
            }
        }
    }
    dist
}

fn check_outcome(
    graph: &AdjacencyGraph,
    start: NodeId,
    end: NodeId,
    expected: u32,
) -> Result<(), TestCaseError> {
    match PathFinder::new(graph).find(start, end) {
        PathOutcome::Unreachable => {
            prop_assert_eq!(expected, UNREACHED, "BFS missed a path {} -> {}", start, end);
        }
        PathOutcome::Found(path) => {
            prop_assert_ne!(expected, UNREACHED, "BFS invented a path {} -> {}", start, end);
            let nodes = path.nodes();
            prop_assert_eq!(nodes[0], start);
            prop_assert_eq!(nodes[nodes.len() - 1], end);
            prop_assert_eq!(path.edge_count() as u32, expected);
            for pair in nodes.windows(2) {
                prop_assert!(graph.has_edge(pair[0], pair[1]));
            }
            let mut seen = 0u32;
            for n in nodes {
                prop_assert_eq!(seen & n.bit(), 0, "node {} repeats", n);
                seen |= n.bit();
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn sparse_paths_are_shortest_simple_walks(
        graph in sparse_graph_strategy(),
        start in node_strategy(),
        end in node_strategy(),
    ) {
        let dist = reference_distances(&graph);
        check_outcome(&graph, start, end, dist[start.index()][end.index()])?;
    }

    #[test]
    fn dense_paths_are_shortest_simple_walks(
        graph in dense_graph_strategy(),
        start in node_strategy(),
        end in node_strategy(),
    ) {
        let dist = reference_distances(&graph);
        check_outcome(&graph, start, end, dist[start.index()][end.index()])?;
    }

    #[test]
    fn distances_match_reference(graph in sparse_graph_strategy(), start in node_strategy()) {
        let dist = reference_distances(&graph);
        let bfs = PathFinder::new(&graph).distances_from(start);
        for end in NodeId::all() {
            let expected = dist[start.index()][end.index()];
            let got = bfs[end.index()].map_or(UNREACHED, u32::from);
            prop_assert_eq!(got, expected, "distance {} -> {}", start, end);
        }
    }

    #[test]
    fn reachable_set_matches_found_outcomes(graph in sparse_graph_strategy(), start in node_strategy()) {
        let finder = PathFinder::new(&graph);
        let reach = finder.reachable_from(start);
        for end in NodeId::all() {
            prop_assert_eq!(reach.contains(end), finder.find(start, end).is_found());
        }
    }

    #[test]
    fn self_route_is_single_node(graph in dense_graph_strategy(), start in node_strategy()) {
        let outcome = PathFinder::new(&graph).find(start, start);
        let path = outcome.path().expect("a node always reaches itself");
        prop_assert_eq!(path.nodes(), &[start][..]);
        prop_assert_eq!(path.len(), 1);
    }
}
