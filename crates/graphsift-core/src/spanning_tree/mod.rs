// Extremum spanning trees
//
// Kruskal and Prim share one option set: `max` flips the extremum, and
// `threshold` admits only edges on the near side of it (weight >= threshold
// when maximising, weight <= threshold when minimising). Both return the input
// node set plus the selected edges, which forms a forest when the admissible
// edges do not connect the graph.

mod kruskal;
mod prim;

pub use kruskal::Kruskal;
pub use prim::Prim;

use std::cmp::Ordering;

use graphsift_common::{ArgumentsBundle, EdgeId, Graph};

#[derive(Debug, Clone, PartialEq)]
pub struct SpanningTreeOptions {
    pub max: bool,
    pub threshold: f64,
    pub start_node: Option<String>,
    pub weight_name: String,
}

impl Default for SpanningTreeOptions {
    fn default() -> Self {
        Self::from_bundle(&ArgumentsBundle::new())
    }
}

impl SpanningTreeOptions {
    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self {
            max: bundle.max(),
            threshold: bundle.threshold(),
            start_node: bundle.start_node().map(str::to_string),
            weight_name: bundle.weight_name().to_string(),
        }
    }

    pub fn maximum() -> Self {
        Self {
            max: true,
            threshold: f64::NEG_INFINITY,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_start_node(mut self, label: impl Into<String>) -> Self {
        self.start_node = Some(label.into());
        self
    }

    /// Whether an edge of this weight may enter the tree.
    pub fn admits(&self, weight: f64) -> bool {
        if self.max {
            weight >= self.threshold
        } else {
            weight <= self.threshold
        }
    }

    fn extremum(&self) -> &'static str {
        if self.max {
            "Maximum"
        } else {
            "Minimum"
        }
    }

    pub(crate) fn result_name(&self, graph: &Graph, algorithm: &str, total: f64) -> String {
        format!(
            "{} {} {} Spanning Tree for attribute {} W(T) = {}",
            graph.name(),
            algorithm,
            self.extremum(),
            self.weight_name,
            total
        )
    }

    /// Priority of an edge: larger is extracted first.
    pub(crate) fn rank(&self, graph: &Graph, edge: EdgeId) -> Ranked {
        let weight = graph.edge(edge).weight();
        Ranked {
            key: if self.max { weight } else { -weight },
            edge,
        }
    }
}

/// Edge priority under the configured extremum. Ties go to the smaller edge
/// index so extraction order is reproducible.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ranked {
    key: f64,
    pub(crate) edge: EdgeId,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| other.edge.cmp(&self.edge))
    }
}

/// Builds the result graph: every node of `graph` plus `edges`.
pub(crate) fn assemble(graph: &Graph, options: &SpanningTreeOptions, algorithm: &str, edges: &[EdgeId]) -> Graph {
    let total: f64 = edges.iter().map(|&e| graph.edge(e).weight()).sum();
    graph.with_edges(options.result_name(graph, algorithm, total), edges)
}
