use std::collections::BinaryHeap;

use anyhow::Result;
use graphsift_common::{ArgumentsBundle, EdgeId, Graph, NodeId, Progress};

use super::{assemble, Ranked, SpanningTreeOptions};
use crate::algorithm::Algorithm;
use crate::structs::DisjointSet;

/// Kruskal's algorithm over a priority queue of admissible edges.
#[derive(Debug, Clone, Default)]
pub struct Kruskal {
    options: SpanningTreeOptions,
}

impl Kruskal {
    pub fn new(options: SpanningTreeOptions) -> Self {
        Self { options }
    }

    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self::new(SpanningTreeOptions::from_bundle(bundle))
    }

    pub fn options(&self) -> &SpanningTreeOptions {
        &self.options
    }

    /// Selected edges in the order they were accepted.
    pub fn select_edges(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<EdgeId>> {
        let n = graph.node_count();
        let mut partitions: DisjointSet<NodeId> = DisjointSet::new();
        for id in graph.node_ids() {
            partitions.make_set(id);
        }

        let mut queue: BinaryHeap<Ranked> = graph
            .edge_ids()
            .filter(|&e| {
                let edge = graph.edge(e);
                !edge.is_loop() && self.options.admits(edge.weight())
            })
            .map(|e| self.options.rank(graph, e))
            .collect();

        tracing::debug!(
            "Kruskal: {} admissible edges over {} nodes",
            queue.len(),
            n
        );

        let mut chosen = Vec::with_capacity(n.saturating_sub(1));
        while partitions.size() > 1 {
            progress.checkpoint()?;
            let Some(next) = queue.pop() else {
                break;
            };
            let edge = graph.edge(next.edge);
            let (s, t) = (edge.source(), edge.target());
            if partitions.disjoint_elements(&s, &t)? {
                partitions.merge(&s, &t);
                chosen.push(next.edge);
                progress.report_ratio(n - partitions.size(), n)?;
            }
        }
        Ok(chosen)
    }
}

impl Algorithm for Kruskal {
    fn name(&self) -> &'static str {
        "Kruskal"
    }

    fn process(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Graph>> {
        if graph.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!("Kruskal: searching {} for a spanning tree", graph.name());

        let chosen = self.select_edges(graph, progress)?;
        let tree = assemble(graph, &self.options, self.name(), &chosen);
        progress.report(1.0)?;

        tracing::info!(
            "Kruskal: finished with {} edges, {}",
            tree.edge_count(),
            tree.name()
        );
        Ok(vec![tree])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphsift_common::ProgressLog;

    fn weighted_square() -> Graph {
        // A-B 1, B-C 2, C-D 3, D-A 4, A-C 5
        Graph::from_undirected_edges(
            "square",
            &[
                ("A", "B", 1.0),
                ("B", "C", 2.0),
                ("C", "D", 3.0),
                ("D", "A", 4.0),
                ("A", "C", 5.0),
            ],
        )
    }

    #[test]
    fn test_minimum_tree() {
        let trees = Kruskal::default()
            .process(&weighted_square(), &mut Progress::silent())
            .unwrap();
        assert_eq!(trees.len(), 1);
        let tree = &trees[0];
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.edge_count(), 3);
        assert_eq!(tree.total_weight(), 6.0);
        assert!(tree.name().starts_with("square Kruskal Minimum Spanning Tree"));
    }

    #[test]
    fn test_maximum_tree() {
        let trees = Kruskal::new(SpanningTreeOptions::maximum())
            .process(&weighted_square(), &mut Progress::silent())
            .unwrap();
        assert_eq!(trees[0].total_weight(), 11.0);
        assert!(trees[0].edge_between_labels("A", "C").is_some());
    }

    #[test]
    fn test_threshold_yields_forest() {
        let options = SpanningTreeOptions::default().with_threshold(2.0);
        let trees = Kruskal::new(options)
            .process(&weighted_square(), &mut Progress::silent())
            .unwrap();
        // only A-B and B-C qualify, D stays isolated
        assert_eq!(trees[0].edge_count(), 2);
        assert_eq!(trees[0].node_count(), 4);
    }

    #[test]
    fn test_empty_graph_has_no_tree() {
        let trees = Kruskal::default()
            .process(&Graph::new("empty"), &mut Progress::silent())
            .unwrap();
        assert!(trees.is_empty());
    }

    #[test]
    fn test_self_loops_ignored() {
        let g = Graph::from_parts(
            "loops",
            ["A", "B"],
            [("A", "A", 0.0, false), ("A", "B", 3.0, false)],
        )
        .unwrap();
        let trees = Kruskal::default().process(&g, &mut Progress::silent()).unwrap();
        assert_eq!(trees[0].edge_count(), 1);
        assert_eq!(trees[0].total_weight(), 3.0);
    }

    #[test]
    fn test_progress_reaches_one() {
        let mut log = ProgressLog::new();
        Kruskal::default()
            .process(&weighted_square(), &mut Progress::new(&mut log))
            .unwrap();
        assert_eq!(log.last(), Some(1.0));
        assert!(log.is_monotonic());
        assert_eq!(log.fractions[0], 0.25);
    }
}
