use anyhow::{Context, Result};
use graphsift_common::{ArgumentsBundle, Graph, NodeId, Progress};

use super::{modularity, CommunityOptions, CommunityResult};
use crate::algorithm::Algorithm;
use crate::centrality::BetweennessCentrality;
use crate::components::weak_components;

/// Divisive community detection by edge betweenness.
///
/// Repeatedly removes the edge with the highest betweenness (first in edge
/// order on ties) and scores the weak components against the original graph
/// whenever their number changes. The best-scoring partition wins.
#[derive(Debug, Clone, Default)]
pub struct GirvanNewman {
    options: CommunityOptions,
}

impl GirvanNewman {
    pub fn new(options: CommunityOptions) -> Self {
        Self { options }
    }

    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self::new(CommunityOptions::from_bundle(bundle))
    }

    pub fn detect(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<CommunityResult> {
        let weighted = self.options.weighted;
        let total_edges = graph.edge_count();

        let mut best: Vec<Vec<NodeId>> = weak_components(graph);
        let mut best_q = modularity(graph, &best, weighted);
        let mut component_count = best.len();

        let mut working = graph.clone();
        while working.edge_count() > 0 {
            progress.checkpoint()?;

            let (cut, score) = {
                let scores = BetweennessCentrality::new(&working, weighted)?;
                scores.max_edge().context("graph with edges has no scored edge")?
            };
            tracing::debug!(
                "GirvanNewman: removing edge {} with betweenness {:.4}",
                cut.index(),
                score
            );
            working = working.without_edge(cut);

            let components = weak_components(&working);
            if components.len() != component_count {
                component_count = components.len();
                let q = modularity(graph, &components, weighted);
                tracing::debug!(
                    "GirvanNewman: {} components, modularity {:.6}",
                    component_count,
                    q
                );
                if q > best_q {
                    best_q = q;
                    best = components;
                }
            }
            progress.report_ratio(total_edges - working.edge_count(), total_edges)?;
        }

        Ok(CommunityResult::from_partition(graph, best, weighted, Vec::new()))
    }
}

impl Algorithm for GirvanNewman {
    fn name(&self) -> &'static str {
        "Edge Betweenness"
    }

    fn process(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Graph>> {
        if graph.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!("GirvanNewman: searching {}", graph.name());

        progress.report(0.0)?;
        let result = self.detect(graph, progress)?;
        progress.report(1.0)?;

        tracing::info!(
            "GirvanNewman: {} communities, modularity {:.6}",
            result.num_communities,
            result.modularity
        );
        Ok(result.to_graphs(graph, self.name(), &self.options))
    }
}
