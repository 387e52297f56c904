//! Weakly connected components.

use std::collections::HashMap;

use anyhow::Result;
use graphsift_common::{Graph, NodeId, Progress};

use crate::algorithm::Algorithm;
use crate::structs::DisjointSet;

/// Groups nodes into weakly connected components, ignoring edge direction.
/// Components are ordered by their first node, members by node order.
pub fn weak_components(graph: &Graph) -> Vec<Vec<NodeId>> {
    let mut sets: DisjointSet<NodeId> = DisjointSet::new();
    for id in graph.node_ids() {
        sets.make_set(id);
    }
    for edge in graph.edges() {
        sets.merge(&edge.source(), &edge.target());
    }

    let mut slot: HashMap<NodeId, usize> = HashMap::with_capacity(sets.size());
    let mut components: Vec<Vec<NodeId>> = Vec::with_capacity(sets.size());
    for id in graph.node_ids() {
        let Some(&rep) = sets.find(&id) else {
            continue;
        };
        let index = *slot.entry(rep).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[index].push(id);
    }
    components
}

/// Emits each weak component as an induced subgraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponents;

impl Algorithm for ConnectedComponents {
    fn name(&self) -> &'static str {
        "ConnectedComponents"
    }

    fn process(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Graph>> {
        if graph.is_empty() {
            return Ok(Vec::new());
        }
        progress.checkpoint()?;

        let components = weak_components(graph);
        tracing::info!("ConnectedComponents: {} has {} component(s)", graph.name(), components.len());

        let graphs = components
            .iter()
            .enumerate()
            .map(|(i, members)| graph.induced_subgraph(format!("{} Component {}", graph.name(), i + 1), members))
            .collect();
        progress.report(1.0)?;
        Ok(graphs)
    }
}
