use anyhow::Result;
use graphsift_common::{ArgumentsBundle, EdgeId, Graph, NodeId, Progress};

use super::{assemble, Ranked, SpanningTreeOptions};
use crate::algorithm::Algorithm;
use crate::structs::IndexedHeap;

/// Prim's algorithm, grown in phases.
///
/// A phase starts from `start_node` when it is still unvisited, otherwise
/// from the smallest-labelled unvisited node. Edges are followed regardless
/// of direction. When the candidate queue runs dry the next phase picks a
/// fresh seed, so disconnected input produces a forest. When the best
/// candidate fails the threshold the whole search stops, unlike Kruskal,
/// which only skips that edge.
#[derive(Debug, Clone, Default)]
pub struct Prim {
    options: SpanningTreeOptions,
}

impl Prim {
    pub fn new(options: SpanningTreeOptions) -> Self {
        Self { options }
    }

    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self::new(SpanningTreeOptions::from_bundle(bundle))
    }

    pub fn options(&self) -> &SpanningTreeOptions {
        &self.options
    }

    pub fn select_edges(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<EdgeId>> {
        let n = graph.node_count();
        let by_label = graph.sorted_node_ids();
        let start = self.options.start_node.as_deref().and_then(|l| graph.node_id(l));
        let adjacency = graph.adjacency_ignoring_direction();

        let mut visited = vec![false; n];
        let mut visited_count = 0;
        let mut candidates: IndexedHeap<NodeId, Ranked> = IndexedHeap::new();
        let mut chosen = Vec::with_capacity(n.saturating_sub(1));
        let mut phases = 0usize;

        'search: while visited_count < n {
            let seed = match start.filter(|s| !visited[s.index()]) {
                Some(s) => s,
                None => match by_label.iter().copied().find(|id| !visited[id.index()]) {
                    Some(s) => s,
                    None => break,
                },
            };
            phases += 1;
            candidates.clear();
            visited[seed.index()] = true;
            visited_count += 1;
            self.offer(graph, &adjacency[seed.index()], &visited, &mut candidates);

            while let Some((target, rank)) = candidates.pop() {
                progress.checkpoint()?;
                if visited[target.index()] {
                    continue;
                }
                if !self.options.admits(graph.edge(rank.edge).weight()) {
                    tracing::debug!(
                        "Prim: {} fails the threshold, stopping",
                        graph.label(target)
                    );
                    break 'search;
                }
                visited[target.index()] = true;
                visited_count += 1;
                chosen.push(rank.edge);
                self.offer(graph, &adjacency[target.index()], &visited, &mut candidates);
                progress.report_ratio(visited_count, n)?;
            }
        }

        tracing::debug!("Prim: grew {} phase(s) over {} nodes", phases, n);
        Ok(chosen)
    }

    /// Queues the edges touching a node towards unvisited nodes, keeping only
    /// the best edge per target.
    fn offer(
        &self,
        graph: &Graph,
        touching: &[(EdgeId, NodeId)],
        visited: &[bool],
        candidates: &mut IndexedHeap<NodeId, Ranked>,
    ) {
        let mut neighbours: Vec<(EdgeId, NodeId)> = touching
            .iter()
            .copied()
            .filter(|&(_, other)| !visited[other.index()])
            .collect();
        neighbours.sort_by(|a, b| graph.label(a.1).cmp(graph.label(b.1)));
        for (edge, other) in neighbours {
            candidates.push_if_better(other, self.options.rank(graph, edge));
        }
    }
}

impl Algorithm for Prim {
    fn name(&self) -> &'static str {
        "Prim"
    }

    fn process(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Graph>> {
        if graph.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!("Prim: searching {} for a spanning tree", graph.name());

        progress.report(0.0)?;
        let chosen = self.select_edges(graph, progress)?;
        let tree = assemble(graph, &self.options, self.name(), &chosen);
        progress.report(1.0)?;

        tracing::info!("Prim: finished with {} edges, {}", tree.edge_count(), tree.name());
        Ok(vec![tree])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_islands() -> Graph {
        Graph::from_undirected_edges(
            "islands",
            &[
                ("A", "B", 4.0),
                ("B", "C", 1.0),
                ("A", "C", 2.0),
                ("X", "Y", 7.0),
            ],
        )
    }

    #[test]
    fn test_forest_over_disconnected_graph() {
        let trees = Prim::default().process(&two_islands(), &mut Progress::silent()).unwrap();
        let tree = &trees[0];
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.edge_count(), 3);
        assert_eq!(tree.total_weight(), 10.0);
        assert!(tree.name().starts_with("islands Prim Minimum Spanning Tree"));
    }

    #[test]
    fn test_maximum_with_start_node() {
        let options = SpanningTreeOptions::maximum().with_start_node("C");
        let prim = Prim::new(options);
        let chosen = prim.select_edges(&two_islands(), &mut Progress::silent()).unwrap();
        let g = two_islands();
        // from C the heaviest edge is A-C, then A-B
        assert_eq!(chosen[0], g.edge_between_labels("A", "C").unwrap());
        assert_eq!(chosen[1], g.edge_between_labels("A", "B").unwrap());
        assert_eq!(chosen.len(), 3);
    }

    #[test]
    fn test_unknown_start_node_falls_back() {
        let options = SpanningTreeOptions::default().with_start_node("nope");
        let trees = Prim::new(options).process(&two_islands(), &mut Progress::silent()).unwrap();
        assert_eq!(trees[0].total_weight(), 10.0);
    }

    #[test]
    fn test_threshold_stops_before_next_island() {
        let options = SpanningTreeOptions::default().with_threshold(2.0);
        let trees = Prim::new(options).process(&two_islands(), &mut Progress::silent()).unwrap();
        // B-C and A-C qualify; X-Y fails and ends the search
        assert_eq!(trees[0].edge_count(), 2);
        assert_eq!(trees[0].total_weight(), 3.0);
    }

    #[test]
    fn test_threshold_break_ends_whole_search() {
        let g = Graph::from_undirected_edges("chain", &[("A", "B", 1.0), ("B", "C", 5.0), ("C", "D", 1.0)]);
        let options = SpanningTreeOptions::default().with_threshold(2.0);
        let chosen = Prim::new(options.clone())
            .select_edges(&g, &mut Progress::silent())
            .unwrap();
        assert_eq!(chosen, vec![g.edge_between_labels("A", "B").unwrap()]);

        // Kruskal skips B-C and still takes C-D
        let kruskal = crate::spanning_tree::Kruskal::new(options)
            .select_edges(&g, &mut Progress::silent())
            .unwrap();
        assert_eq!(kruskal.len(), 2);
    }

    #[test]
    fn test_directed_edges_followed_both_ways() {
        let g = Graph::from_parts(
            "dir",
            ["A", "B", "C"],
            [("A", "B", 1.0, true), ("C", "B", 2.0, true)],
        )
        .unwrap();
        let prim = Prim::default().process(&g, &mut Progress::silent()).unwrap();
        let kruskal = crate::spanning_tree::Kruskal::default()
            .process(&g, &mut Progress::silent())
            .unwrap();
        assert_eq!(prim[0].edge_count(), 2);
        assert_eq!(kruskal[0].edge_count(), 2);
        assert_eq!(prim[0].total_weight(), kruskal[0].total_weight());
    }

    #[test]
    fn test_cancellation() {
        let mut token = graphsift_common::CancelToken::new();
        token.cancel();
        let err = Prim::default()
            .process(&two_islands(), &mut Progress::new(&mut token))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<graphsift_common::GraphError>(),
            Some(graphsift_common::GraphError::Cancelled)
        ));
    }
}
