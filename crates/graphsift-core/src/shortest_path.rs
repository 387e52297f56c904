//! Single-pair shortest paths (Dijkstra).

use std::cmp::Ordering;

use anyhow::{bail, Result};
use graphsift_common::bundle::{KEY_FROM_NODE, KEY_TO_NODE};
use graphsift_common::{ArgumentsBundle, EdgeId, Graph, GraphError, NodeId, Progress};

use crate::algorithm::Algorithm;
use crate::structs::IndexedHeap;

/// Tentative distance in a Dijkstra frontier: nearer first, then the smaller
/// node id.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frontier {
    pub(crate) distance: f64,
    pub(crate) node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShortestPathOptions {
    pub from_node: Option<String>,
    pub to_node: Option<String>,
}

impl ShortestPathOptions {
    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self {
            from_node: bundle.from_node().map(str::to_string),
            to_node: bundle.to_node().map(str::to_string),
        }
    }

    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_node: Some(from.into()),
            to_node: Some(to.into()),
        }
    }
}

/// A found path: its nodes from source to destination and the edges between
/// consecutive nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
    pub weight: f64,
}

/// Dijkstra over edge weights. Directed edges are followed from source to
/// target only; self-loops never shorten a path. Of several equally short
/// paths the first one settled wins.
#[derive(Debug, Clone, Default)]
pub struct Dijkstra {
    options: ShortestPathOptions,
}

impl Dijkstra {
    pub fn new(options: ShortestPathOptions) -> Self {
        Self { options }
    }

    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self::new(ShortestPathOptions::from_bundle(bundle))
    }

    /// Shortest path from `from` to `to`, or `None` when `to` is unreachable.
    pub fn find(&self, graph: &Graph, from: NodeId, to: NodeId, progress: &mut Progress<'_>) -> Result<Option<Path>> {
        if let Some(edge) = graph.edges().iter().find(|e| e.weight() < 0.0) {
            bail!(GraphError::invalid_argument(
                "weight",
                format!(
                    "negative weight {} on {} -> {}",
                    edge.weight(),
                    graph.label(edge.source()),
                    graph.label(edge.target())
                ),
            ));
        }

        let n = graph.node_count();
        let mut distance: Vec<Option<f64>> = vec![None; n];
        let mut via: Vec<Option<EdgeId>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut settled_count = 0;
        let mut frontier: IndexedHeap<NodeId, Frontier> = IndexedHeap::new();

        distance[from.index()] = Some(0.0);
        frontier.push_or_update(from, Frontier { distance: 0.0, node: from });

        while let Some((u, reached)) = frontier.pop() {
            progress.checkpoint()?;
            settled[u.index()] = true;
            settled_count += 1;
            if u == to {
                break;
            }
            for (e, w) in graph.neighbors(u) {
                if w == u || settled[w.index()] {
                    continue;
                }
                let candidate = reached.distance + graph.edge(e).weight();
                if distance[w.index()].map_or(true, |known| candidate < known) {
                    distance[w.index()] = Some(candidate);
                    via[w.index()] = Some(e);
                    frontier.push_or_update(w, Frontier { distance: candidate, node: w });
                }
            }
            progress.report_ratio(settled_count, n)?;
        }

        let Some(weight) = distance[to.index()].filter(|_| settled[to.index()]) else {
            return Ok(None);
        };

        let mut nodes = vec![to];
        let mut edges = Vec::new();
        let mut current = to;
        while current != from {
            let Some(e) = via[current.index()] else {
                bail!(GraphError::invariant(format!(
                    "shortest path to {} lost its predecessor",
                    graph.label(current)
                )));
            };
            current = graph.edge(e).opposite(current).unwrap_or(current);
            edges.push(e);
            nodes.push(current);
        }
        nodes.reverse();
        edges.reverse();
        Ok(Some(Path { nodes, edges, weight }))
    }

    fn endpoint(&self, graph: &Graph, key: &str, label: Option<&str>) -> Result<NodeId> {
        let Some(label) = label else {
            bail!(GraphError::invalid_argument(key, "no node given"));
        };
        match graph.node_id(label) {
            Some(id) => Ok(id),
            None => bail!(GraphError::UnknownNode(label.to_string())),
        }
    }
}

impl Algorithm for Dijkstra {
    fn name(&self) -> &'static str {
        "Dijkstra"
    }

    fn process(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Graph>> {
        let from = self.endpoint(graph, KEY_FROM_NODE, self.options.from_node.as_deref())?;
        let to = self.endpoint(graph, KEY_TO_NODE, self.options.to_node.as_deref())?;
        tracing::info!(
            "Dijkstra: searching {} for a path from {} to {}",
            graph.name(),
            graph.label(from),
            graph.label(to)
        );
        progress.report(0.0)?;

        let found = self.find(graph, from, to, progress)?;
        progress.report(1.0)?;
        let Some(path) = found else {
            tracing::info!("Dijkstra: {} is unreachable from {}", graph.label(to), graph.label(from));
            return Ok(Vec::new());
        };

        let mut result = Graph::new(format!(
            "{} Shortest Path from {} to {} W(T) = {}",
            graph.name(),
            graph.label(from),
            graph.label(to),
            path.weight
        ));
        for &id in &path.nodes {
            result.add_node(graph.label(id))?;
        }
        for &e in &path.edges {
            let edge = graph.edge(e);
            result.add_edge(
                graph.label(edge.source()),
                graph.label(edge.target()),
                edge.weight(),
                edge.is_directed(),
            )?;
        }

        tracing::info!("Dijkstra: {} hop(s), total weight {}", path.edges.len(), path.weight);
        Ok(vec![result])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roads() -> Graph {
        Graph::from_undirected_edges(
            "roads",
            &[
                ("A", "B", 7.0),
                ("A", "C", 9.0),
                ("A", "F", 14.0),
                ("B", "C", 10.0),
                ("B", "D", 15.0),
                ("C", "D", 11.0),
                ("C", "F", 2.0),
                ("D", "E", 6.0),
                ("E", "F", 9.0),
            ],
        )
    }

    fn labels(graph: &Graph, path: &Path) -> Vec<String> {
        path.nodes.iter().map(|&id| graph.label(id).to_string()).collect()
    }

    #[test]
    fn test_classic_network() {
        let g = roads();
        let (a, e) = (g.node_id("A").unwrap(), g.node_id("E").unwrap());
        let path = Dijkstra::default().find(&g, a, e, &mut Progress::silent()).unwrap().unwrap();
        assert_eq!(labels(&g, &path), vec!["A", "C", "F", "E"]);
        assert_eq!(path.weight, 20.0);
        assert_eq!(path.edges.len(), 3);
    }

    #[test]
    fn test_process_builds_path_graph() {
        let dijkstra = Dijkstra::new(ShortestPathOptions::between("A", "D"));
        let graphs = dijkstra.process(&roads(), &mut Progress::silent()).unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].name(), "roads Shortest Path from A to D W(T) = 20");
        assert_eq!(graphs[0].node_list(), vec!["A", "C", "D"]);
        assert_eq!(graphs[0].total_weight(), 20.0);
    }

    #[test]
    fn test_directed_edges_one_way() {
        let g = Graph::from_parts(
            "oneway",
            ["A", "B", "C"],
            [("A", "B", 1.0, true), ("B", "C", 1.0, true), ("C", "A", 5.0, false)],
        )
        .unwrap();
        let ids = |l: &str| g.node_id(l).unwrap();
        let forward = Dijkstra::default()
            .find(&g, ids("A"), ids("C"), &mut Progress::silent())
            .unwrap()
            .unwrap();
        assert_eq!(forward.weight, 2.0);
        // against the arrows only the undirected edge helps
        let backward = Dijkstra::default()
            .find(&g, ids("C"), ids("B"), &mut Progress::silent())
            .unwrap()
            .unwrap();
        assert_eq!(labels(&g, &backward), vec!["C", "A", "B"]);
        assert_eq!(backward.weight, 6.0);
    }

    #[test]
    fn test_unreachable_and_same_node() {
        let g = Graph::from_undirected_edges("split", &[("A", "B", 1.0), ("C", "D", 1.0)]);
        let dijkstra = Dijkstra::new(ShortestPathOptions::between("A", "D"));
        assert!(dijkstra.process(&g, &mut Progress::silent()).unwrap().is_empty());

        let same = Dijkstra::new(ShortestPathOptions::between("C", "C"));
        let graphs = same.process(&g, &mut Progress::silent()).unwrap();
        assert_eq!(graphs[0].node_list(), vec!["C"]);
        assert_eq!(graphs[0].edge_count(), 0);
    }

    #[test]
    fn test_missing_or_unknown_endpoints() {
        let g = roads();
        let err = Dijkstra::default().process(&g, &mut Progress::silent()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraphError>(),
            Some(GraphError::InvalidArgument { .. })
        ));

        let err = Dijkstra::new(ShortestPathOptions::between("A", "Q"))
            .process(&g, &mut Progress::silent())
            .unwrap_err();
        assert_eq!(err.downcast_ref::<GraphError>(), Some(&GraphError::UnknownNode("Q".into())));
    }

    #[test]
    fn test_negative_weights_rejected() {
        let g = Graph::from_undirected_edges("neg", &[("A", "B", -1.0)]);
        let err = Dijkstra::new(ShortestPathOptions::between("A", "B"))
            .process(&g, &mut Progress::silent())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraphError>(),
            Some(GraphError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_frontier_orders_nearest_first() {
        let mut heap: IndexedHeap<NodeId, Frontier> = IndexedHeap::new();
        heap.push_or_update(NodeId(2), Frontier { distance: 3.0, node: NodeId(2) });
        heap.push_or_update(NodeId(1), Frontier { distance: 1.5, node: NodeId(1) });
        heap.push_or_update(NodeId(0), Frontier { distance: 1.5, node: NodeId(0) });
        assert_eq!(heap.pop().map(|(k, _)| k), Some(NodeId(0)));
        assert_eq!(heap.pop().map(|(k, _)| k), Some(NodeId(1)));
    }
}
