//! Betweenness centrality (Brandes).
//!
//! One single-source shortest-path pass per node, followed by dependency
//! accumulation in reverse discovery order. Unweighted mode uses BFS;
//! weighted mode uses Dijkstra over the edge weights. Every score is halved at
//! the end since each pair is reached from both of its endpoints.

use std::collections::VecDeque;

use graphsift_common::{ArgumentsBundle, EdgeId, Graph, NodeId, Progress, Result};
use serde_json::{Map, Value};

use crate::shortest_path::Frontier;
use crate::structs::IndexedHeap;

/// Per-source scratch space, reused across sources.
struct Pass {
    distance: Vec<f64>,
    sigma: Vec<f64>,
    delta: Vec<f64>,
    incoming: Vec<Vec<EdgeId>>,
    order: Vec<NodeId>,
}

impl Pass {
    fn new(n: usize) -> Self {
        Self {
            distance: vec![-1.0; n],
            sigma: vec![0.0; n],
            delta: vec![0.0; n],
            incoming: vec![Vec::new(); n],
            order: Vec::with_capacity(n),
        }
    }

    fn reset(&mut self, source: NodeId) {
        self.distance.fill(-1.0);
        self.sigma.fill(0.0);
        self.delta.fill(0.0);
        self.incoming.iter_mut().for_each(Vec::clear);
        self.order.clear();
        self.distance[source.index()] = 0.0;
        self.sigma[source.index()] = 1.0;
    }
}

/// Vertex and edge betweenness scores of one graph.
#[derive(Debug, Clone)]
pub struct BetweennessCentrality<'g> {
    graph: &'g Graph,
    weighted: bool,
    vertex: Vec<f64>,
    edge: Vec<f64>,
}

impl<'g> BetweennessCentrality<'g> {
    pub fn new(graph: &'g Graph, weighted: bool) -> Result<Self> {
        Self::compute(graph, weighted, &mut Progress::silent())
    }

    /// Weighting comes from the bundle's centrality key, never from the
    /// community one.
    pub fn from_bundle(graph: &'g Graph, bundle: &ArgumentsBundle, progress: &mut Progress<'_>) -> Result<Self> {
        Self::compute(graph, bundle.centrality_weighted(), progress)
    }

    pub fn compute(graph: &'g Graph, weighted: bool, progress: &mut Progress<'_>) -> Result<Self> {
        let n = graph.node_count();
        let mut scores = Self {
            graph,
            weighted,
            vertex: vec![0.0; n],
            edge: vec![0.0; graph.edge_count()],
        };

        let mut pass = Pass::new(n);
        for (done, source) in graph.node_ids().enumerate() {
            progress.checkpoint()?;
            pass.reset(source);
            if weighted {
                scores.dijkstra(source, &mut pass);
            } else {
                scores.bfs(source, &mut pass);
            }
            scores.accumulate(source, &mut pass);
            progress.report_ratio(done + 1, n)?;
        }

        scores.vertex.iter_mut().for_each(|s| *s /= 2.0);
        scores.edge.iter_mut().for_each(|s| *s /= 2.0);

        tracing::debug!(
            "Betweenness: scored {} nodes and {} edges (weighted: {})",
            n,
            graph.edge_count(),
            weighted
        );
        Ok(scores)
    }

    fn bfs(&self, source: NodeId, pass: &mut Pass) {
        let mut queue = VecDeque::from([source]);
        while let Some(u) = queue.pop_front() {
            pass.order.push(u);
            let next = pass.distance[u.index()] + 1.0;
            for (e, w) in self.graph.neighbors(u) {
                if w == u {
                    continue;
                }
                if pass.distance[w.index()] < 0.0 {
                    pass.distance[w.index()] = next;
                    queue.push_back(w);
                }
                if pass.distance[w.index()] == next {
                    pass.sigma[w.index()] += pass.sigma[u.index()];
                    pass.incoming[w.index()].push(e);
                }
            }
        }
    }

    fn dijkstra(&self, source: NodeId, pass: &mut Pass) {
        let mut settled = vec![false; self.graph.node_count()];
        let mut frontier: IndexedHeap<NodeId, Frontier> = IndexedHeap::new();
        frontier.push_or_update(source, Frontier { distance: 0.0, node: source });

        while let Some((u, _)) = frontier.pop() {
            settled[u.index()] = true;
            pass.order.push(u);
            for (e, w) in self.graph.neighbors(u) {
                if w == u || settled[w.index()] {
                    continue;
                }
                let candidate = pass.distance[u.index()] + self.graph.edge(e).weight();
                let known = pass.distance[w.index()];
                if known < 0.0 || candidate < known {
                    // a strictly shorter route replaces every earlier one
                    pass.distance[w.index()] = candidate;
                    pass.sigma[w.index()] = pass.sigma[u.index()];
                    pass.incoming[w.index()].clear();
                    pass.incoming[w.index()].push(e);
                    frontier.push_or_update(w, Frontier { distance: candidate, node: w });
                } else if candidate == known {
                    pass.sigma[w.index()] += pass.sigma[u.index()];
                    pass.incoming[w.index()].push(e);
                }
            }
        }
    }

    fn accumulate(&mut self, source: NodeId, pass: &mut Pass) {
        while let Some(w) = pass.order.pop() {
            let wi = w.index();
            let coefficient = (1.0 + pass.delta[wi]) / pass.sigma[wi];
            for &e in &pass.incoming[wi] {
                let v = self.graph.edge(e).opposite(w).unwrap_or(w);
                let share = pass.sigma[v.index()] * coefficient;
                self.edge[e.index()] += share;
                pass.delta[v.index()] += share;
            }
            if w != source {
                self.vertex[wi] += pass.delta[wi];
            }
        }
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn vertex_score(&self, label: &str) -> Option<f64> {
        self.graph.node_id(label).map(|id| self.vertex[id.index()])
    }

    /// Score of the edge from `source` to `target` (either way for undirected
    /// edges).
    pub fn edge_score(&self, source: &str, target: &str) -> Option<f64> {
        self.graph
            .edge_between_labels(source, target)
            .map(|id| self.edge[id.index()])
    }

    pub fn vertex_score_by_id(&self, id: NodeId) -> f64 {
        self.vertex[id.index()]
    }

    pub fn edge_score_by_id(&self, id: EdgeId) -> f64 {
        self.edge[id.index()]
    }

    pub fn vertex_scores(&self) -> &[f64] {
        &self.vertex
    }

    pub fn edge_scores(&self) -> &[f64] {
        &self.edge
    }

    /// Nodes by descending score, ties in node order.
    pub fn ranked_vertices(&self) -> Vec<(NodeId, f64)> {
        let mut ranked: Vec<(NodeId, f64)> = self.graph.node_ids().map(|id| (id, self.vertex[id.index()])).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Edge with the highest score; the first in edge order wins ties.
    pub fn max_edge(&self) -> Option<(EdgeId, f64)> {
        self.graph.edge_ids().fold(None, |best, id| {
            let score = self.edge[id.index()];
            match best {
                Some((_, top)) if score <= top => best,
                _ => Some((id, score)),
            }
        })
    }

    /// Vertex scores keyed by label.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for id in self.graph.node_ids() {
            map.insert(self.graph.label(id).to_string(), Value::from(self.vertex[id.index()]));
        }
        Value::Object(map)
    }
}
