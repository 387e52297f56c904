//! Condition-driven subgraph searches.
//!
//! Every node in turn roots a traversal that grows a [`ConditionedGraph`]:
//! a neighbour joins together with the edge that reached it only if the
//! subgraph still satisfies every condition afterwards. Directed edges are
//! followed from source to target.

use std::collections::{HashSet, VecDeque};

use anyhow::Result;
use graphsift_common::{ArgumentsBundle, Condition, ConditionedGraph, EdgeId, Graph, NodeId, Progress};

use crate::algorithm::Algorithm;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// Conditions every found subgraph must keep satisfying.
    pub conditions: Vec<Condition>,
    /// Add a node together with all its edges back into the subgraph found
    /// so far, instead of only the edge that reached it.
    pub edge_preservation: bool,
}

impl SearchOptions {
    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self {
            conditions: bundle.conditions().to_vec(),
            edge_preservation: bundle.edge_preservation(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    BreadthFirst,
    DepthFirst,
}

impl Traversal {
    fn tag(&self) -> &'static str {
        match self {
            Traversal::BreadthFirst => "BFS",
            Traversal::DepthFirst => "DFS",
        }
    }
}

/// One subgraph grown from one root.
struct Growth<'g> {
    graph: &'g Graph,
    preserve: bool,
    /// A clique needs both directions of a directed pair.
    mirror: bool,
    sub: ConditionedGraph,
    taken: HashSet<EdgeId>,
    visited: Vec<bool>,
}

impl<'g> Growth<'g> {
    fn new(graph: &'g Graph, options: &SearchOptions, name: String) -> Self {
        Self {
            graph,
            preserve: options.edge_preservation,
            mirror: options.conditions.contains(&Condition::Clique),
            sub: ConditionedGraph::new(name, options.conditions.clone()),
            taken: HashSet::new(),
            visited: vec![false; graph.node_count()],
        }
    }

    fn holds(&self, id: NodeId) -> bool {
        self.sub.node_id(self.graph.label(id)).is_some()
    }

    /// `edge` plus, when mirroring, the directed edge running the other way.
    fn with_mirror(&self, edge: EdgeId, out: &mut Vec<EdgeId>) {
        out.push(edge);
        let e = self.graph.edge(edge);
        if self.mirror && e.is_directed() {
            if let Some(reverse) = self.graph.edge_between(e.target(), e.source()).filter(|&r| r != edge) {
                out.push(reverse);
            }
        }
    }

    /// Adds nodes and edges as one batch; `Ok(false)` when the conditions
    /// refuse it.
    fn add_batch(&mut self, nodes: &[NodeId], edges: &[EdgeId]) -> Result<bool> {
        let graph = self.graph;
        let labels: Vec<&str> = nodes.iter().map(|&id| graph.label(id)).collect();
        let tuples: Vec<(&str, &str, f64, bool)> = edges
            .iter()
            .map(|&e| {
                let edge = graph.edge(e);
                (
                    graph.label(edge.source()),
                    graph.label(edge.target()),
                    edge.weight(),
                    edge.is_directed(),
                )
            })
            .collect();
        if !self.sub.add_partial(&labels, &tuples)? {
            return Ok(false);
        }
        self.taken.extend(edges.iter().copied());
        Ok(true)
    }

    fn start(&mut self, root: NodeId) -> Result<bool> {
        self.add_batch(&[root], &[])
    }

    /// Tries the edges from `current` to nodes already in the subgraph, one
    /// at a time.
    fn add_back_edges(&mut self, current: NodeId) -> Result<()> {
        let mut pending = Vec::new();
        for (e, other) in self.graph.neighbors(current) {
            if self.holds(other) {
                self.with_mirror(e, &mut pending);
            }
        }
        for e in pending {
            if !self.taken.contains(&e) {
                self.add_batch(&[], &[e])?;
            }
        }
        Ok(())
    }

    /// Adds `neighbour` through `edge`, with its edges back into the
    /// subgraph when preserving. `Ok(false)` when nothing new was added.
    fn reach(&mut self, edge: EdgeId, neighbour: NodeId) -> Result<bool> {
        let nodes: Vec<NodeId> = if self.holds(neighbour) {
            Vec::new()
        } else {
            vec![neighbour]
        };
        let mut edges = Vec::new();
        self.with_mirror(edge, &mut edges);
        if self.preserve {
            for (e, other) in self.graph.neighbors(neighbour) {
                if self.holds(other) {
                    self.with_mirror(e, &mut edges);
                }
            }
        }
        let mut seen = HashSet::new();
        edges.retain(|e| !self.taken.contains(e) && seen.insert(*e));

        if nodes.is_empty() && edges.is_empty() {
            return Ok(false);
        }
        self.add_batch(&nodes, &edges)
    }

    fn breadth_first(mut self, root: NodeId) -> Result<Graph> {
        if !self.start(root)? {
            return Ok(self.sub.into_graph());
        }
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            if self.visited[current.index()] {
                continue;
            }
            self.visited[current.index()] = true;
            self.add_back_edges(current)?;

            let neighbours: Vec<(EdgeId, NodeId)> = self.graph.neighbors(current).collect();
            for (e, next) in neighbours {
                if next == current || self.visited[next.index()] {
                    continue;
                }
                if self.reach(e, next)? {
                    queue.push_back(next);
                }
            }
        }
        Ok(self.sub.into_graph())
    }

    fn depth_first(mut self, root: NodeId) -> Result<Graph> {
        if !self.start(root)? {
            return Ok(self.sub.into_graph());
        }
        self.visited[root.index()] = true;
        self.add_back_edges(root)?;

        // (node, position in its incidence list)
        let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
        while let Some(&(current, position)) = stack.last() {
            let Some(&e) = self.graph.node(current).incident().get(position) else {
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }
            let next = self.graph.edge(e).opposite(current).unwrap_or(current);
            if next == current {
                continue;
            }
            if self.visited[next.index()] {
                self.reach(e, next)?;
                continue;
            }
            if self.reach(e, next)? {
                self.visited[next.index()] = true;
                self.add_back_edges(next)?;
                stack.push((next, 0));
            }
        }
        Ok(self.sub.into_graph())
    }
}

/// Grows one conditioned subgraph per node by breadth- or depth-first
/// traversal. Results repeat and overlap freely; `run` culls them.
#[derive(Debug, Clone)]
pub struct TraversalSearch {
    traversal: Traversal,
    options: SearchOptions,
}

impl TraversalSearch {
    pub fn new(traversal: Traversal, options: SearchOptions) -> Self {
        Self { traversal, options }
    }

    pub fn breadth_first(options: SearchOptions) -> Self {
        Self::new(Traversal::BreadthFirst, options)
    }

    pub fn depth_first(options: SearchOptions) -> Self {
        Self::new(Traversal::DepthFirst, options)
    }

    pub fn from_bundle(traversal: Traversal, bundle: &ArgumentsBundle) -> Self {
        Self::new(traversal, SearchOptions::from_bundle(bundle))
    }

    /// The subgraph grown from `root`.
    pub fn search_from(&self, graph: &Graph, root: NodeId) -> Result<Graph> {
        let name = format!("{} {} {}", graph.name(), self.traversal.tag(), graph.label(root));
        let growth = Growth::new(graph, &self.options, name);
        match self.traversal {
            Traversal::BreadthFirst => growth.breadth_first(root),
            Traversal::DepthFirst => growth.depth_first(root),
        }
    }
}

impl Algorithm for TraversalSearch {
    fn name(&self) -> &'static str {
        match self.traversal {
            Traversal::BreadthFirst => "BreadthFirstSearch",
            Traversal::DepthFirst => "DepthFirstSearch",
        }
    }

    fn process(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Graph>> {
        tracing::info!(
            "{}: searching {} under {} condition(s)",
            self.name(),
            graph.name(),
            self.options.conditions.len()
        );
        let n = graph.node_count();
        let mut found = Vec::with_capacity(n);
        for (done, root) in graph.node_ids().enumerate() {
            progress.checkpoint()?;
            let sub = self.search_from(graph, root)?;
            tracing::debug!(
                "{}: root {} grew {} node(s), {} edge(s)",
                self.name(),
                graph.label(root),
                sub.node_count(),
                sub.edge_count()
            );
            found.push(sub);
            progress.report_ratio(done + 1, n)?;
        }
        tracing::info!("{}: {} subgraph(s) found", self.name(), found.len());
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        Graph::from_undirected_edges("tri", &[("A", "B", 1.0), ("A", "C", 1.0), ("B", "C", 1.0)])
    }

    fn bipartite() -> SearchOptions {
        SearchOptions {
            conditions: vec![Condition::Bipartite],
            edge_preservation: false,
        }
    }

    fn edge_labels(graph: &Graph) -> Vec<(String, String)> {
        let mut edges: Vec<(String, String)> = graph
            .edge_list()
            .into_iter()
            .map(|(s, t, _, _)| (s.to_string(), t.to_string()))
            .collect();
        edges.sort();
        edges
    }

    #[test]
    fn test_breadth_first_keeps_bipartite() {
        let g = Graph::from_undirected_edges(
            "tailed",
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0), ("C", "D", 1.0)],
        );
        let search = TraversalSearch::breadth_first(bipartite());
        let sub = search.search_from(&g, g.node_id("A").unwrap()).unwrap();
        assert_eq!(sub.name(), "tailed BFS A");
        assert_eq!(sub.node_count(), 4);
        assert_eq!(sub.edge_count(), 3);
        assert!(sub.is_bipartite());
        assert!(sub.edge_between_labels("B", "C").is_none());
    }

    #[test]
    fn test_traversal_order_decides_which_edge_is_dropped() {
        let g = triangle();
        let a = g.node_id("A").unwrap();
        let bfs = TraversalSearch::breadth_first(bipartite()).search_from(&g, a).unwrap();
        let dfs = TraversalSearch::depth_first(bipartite()).search_from(&g, a).unwrap();
        let pair = |s: &str, t: &str| (s.to_string(), t.to_string());
        assert_eq!(edge_labels(&bfs), vec![pair("A", "B"), pair("A", "C")]);
        assert_eq!(edge_labels(&dfs), vec![pair("A", "B"), pair("B", "C")]);
        assert_eq!(dfs.name(), "tri DFS A");
    }

    #[test]
    fn test_clique_search_mirrors_directed_pairs() {
        let mut edges = Vec::new();
        for (s, t) in [("A", "B"), ("B", "C"), ("A", "C")] {
            edges.push((s, t, 1.0, true));
            edges.push((t, s, 1.0, true));
        }
        edges.push(("A", "D", 1.0, true));
        let g = Graph::from_parts("digraph", ["A", "B", "C", "D"], edges).unwrap();
        let a = g.node_id("A").unwrap();

        let mut options = SearchOptions {
            conditions: vec![Condition::Clique],
            edge_preservation: false,
        };
        let plain = TraversalSearch::breadth_first(options.clone()).search_from(&g, a).unwrap();
        // C arrives with only its edges to A, so B-C is missing
        assert_eq!(plain.node_list(), vec!["A", "B"]);
        assert_eq!(plain.edge_count(), 2);

        options.edge_preservation = true;
        let preserved = TraversalSearch::breadth_first(options).search_from(&g, a).unwrap();
        assert_eq!(preserved.node_count(), 3);
        assert_eq!(preserved.edge_count(), 6);
        assert!(preserved.is_clique());
    }

    #[test]
    fn test_no_conditions_follow_reachability() {
        let g = Graph::from_parts(
            "oneway",
            ["A", "B", "C"],
            [("A", "B", 1.0, true), ("C", "B", 1.0, true)],
        )
        .unwrap();
        let search = TraversalSearch::depth_first(SearchOptions::default());
        let from_a = search.search_from(&g, g.node_id("A").unwrap()).unwrap();
        assert_eq!(from_a.node_list(), vec!["A", "B"]);
        let from_b = search.search_from(&g, g.node_id("B").unwrap()).unwrap();
        assert_eq!(from_b.node_count(), 1);
    }

    #[test]
    fn test_loop_free_condition_rejects_self_loops() {
        let g = Graph::from_parts(
            "loops",
            ["A", "B"],
            [("A", "A", 1.0, false), ("A", "B", 1.0, false)],
        )
        .unwrap();
        let options = SearchOptions {
            conditions: vec![Condition::LoopFree],
            edge_preservation: false,
        };
        let sub = TraversalSearch::breadth_first(options)
            .search_from(&g, g.node_id("A").unwrap())
            .unwrap();
        assert_eq!(sub.edge_count(), 1);

        let unrestricted = TraversalSearch::breadth_first(SearchOptions::default())
            .search_from(&g, g.node_id("A").unwrap())
            .unwrap();
        assert_eq!(unrestricted.edge_count(), 2);
    }

    #[test]
    fn test_process_roots_every_node() {
        let g = triangle();
        let mut log = graphsift_common::ProgressLog::new();
        let graphs = TraversalSearch::depth_first(bipartite())
            .process(&g, &mut Progress::new(&mut log))
            .unwrap();
        assert_eq!(graphs.len(), 3);
        assert!(graphs.iter().all(|sub| sub.node_count() == 3 && sub.edge_count() == 2));
        assert_eq!(log.last(), Some(1.0));
        assert!(log.is_monotonic());
    }
}
