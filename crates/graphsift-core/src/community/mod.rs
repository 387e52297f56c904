// Community Detection Module
//
// Provides modularity-based community detection:
// - FastGreedy: agglomerative merging driven by modularity gain (CNM)
// - GirvanNewman: divisive, removes the edge of highest betweenness
//
// Both treat the graph as undirected and share the modularity evaluation and
// result naming below.

mod fast_greedy;
mod girvan_newman;

pub use fast_greedy::FastGreedy;
pub use girvan_newman::GirvanNewman;

use std::collections::HashMap;

use graphsift_common::{ArgumentsBundle, Graph, NodeId};
use serde::Serialize;

/// Options shared by the clustering algorithms.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityOptions {
    /// Use edge weights instead of counting each edge as 1.
    pub weighted: bool,
    pub weight_name: String,
}

impl Default for CommunityOptions {
    fn default() -> Self {
        Self::from_bundle(&ArgumentsBundle::new())
    }
}

impl CommunityOptions {
    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self {
            weighted: bundle.weighted(),
            weight_name: bundle.weight_name().to_string(),
        }
    }

    pub fn weighted() -> Self {
        Self {
            weighted: true,
            ..Self::default()
        }
    }
}

/// One agglomeration step: community `absorbed` joined `into`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MergeStep {
    pub absorbed: NodeId,
    pub into: NodeId,
    /// Modularity gain of the step.
    pub delta: f64,
}

/// Community detection result
#[derive(Debug, Clone, Serialize)]
pub struct CommunityResult {
    /// Members of each community, in node order
    pub communities: Vec<Vec<NodeId>>,
    /// Node to community index
    pub node_to_community: HashMap<NodeId, usize>,
    /// Modularity of the partition
    pub modularity: f64,
    pub num_communities: usize,
    /// Merge steps applied to reach this partition (empty for divisive methods)
    pub merges: Vec<MergeStep>,
}

impl CommunityResult {
    pub fn from_partition(graph: &Graph, mut communities: Vec<Vec<NodeId>>, weighted: bool, merges: Vec<MergeStep>) -> Self {
        communities.retain(|c| !c.is_empty());
        for community in &mut communities {
            community.sort_unstable();
        }
        communities.sort_by_key(|c| c[0]);

        let mut node_to_community = HashMap::with_capacity(graph.node_count());
        for (index, community) in communities.iter().enumerate() {
            for &node in community {
                node_to_community.insert(node, index);
            }
        }

        let modularity = modularity(graph, &communities, weighted);
        let num_communities = communities.len();
        Self {
            communities,
            node_to_community,
            modularity,
            num_communities,
            merges,
        }
    }

    pub fn community_of(&self, node: NodeId) -> Option<usize> {
        self.node_to_community.get(&node).copied()
    }

    /// Each community as an induced subgraph named
    /// `"<graph> <algorithm> Community <n>"`, numbered from 1.
    pub fn to_graphs(&self, graph: &Graph, algorithm: &str, options: &CommunityOptions) -> Vec<Graph> {
        self.communities
            .iter()
            .enumerate()
            .map(|(index, members)| {
                let mut name = format!("{} {} Community {}", graph.name(), algorithm, index + 1);
                if options.weighted {
                    name.push_str(&format!(" on attribute {}", options.weight_name));
                }
                graph.induced_subgraph(name, members)
            })
            .collect()
    }
}

/// Undirected reading of a graph: per-node strength and the non-loop edge
/// list, with every edge counted once.
#[derive(Debug, Clone)]
pub(crate) struct UndirectedView {
    pub strength: Vec<f64>,
    pub links: Vec<(usize, usize, f64)>,
    pub loops: Vec<f64>,
    /// Twice the total weight.
    pub m2: f64,
}

impl UndirectedView {
    pub fn new(graph: &Graph, weighted: bool) -> Self {
        let n = graph.node_count();
        let mut strength = vec![0.0; n];
        let mut loops = vec![0.0; n];
        let mut links = Vec::with_capacity(graph.edge_count());
        for edge in graph.edges() {
            let w = if weighted { edge.weight() } else { 1.0 };
            let (s, t) = (edge.source().index(), edge.target().index());
            if s == t {
                strength[s] += 2.0 * w;
                loops[s] += w;
            } else {
                strength[s] += w;
                strength[t] += w;
                links.push((s, t, w));
            }
        }
        let m2 = strength.iter().sum();
        Self {
            strength,
            links,
            loops,
            m2,
        }
    }
}

/// Newman modularity of a partition:
/// `Q = sum_c [ 2 L_c / m2 - (K_c / m2)^2 ]`, where `L_c` is the weight inside
/// community `c`, `K_c` its total strength and `m2` twice the total weight.
/// Nodes missing from the partition count as singletons. Graphs without
/// edges score 0.
pub fn modularity(graph: &Graph, communities: &[Vec<NodeId>], weighted: bool) -> f64 {
    let view = UndirectedView::new(graph, weighted);
    if view.m2 <= 0.0 {
        return 0.0;
    }

    let n = graph.node_count();
    let mut label: Vec<usize> = (0..n).map(|i| communities.len() + i).collect();
    for (index, community) in communities.iter().enumerate() {
        for node in community {
            label[node.index()] = index;
        }
    }

    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut total: HashMap<usize, f64> = HashMap::new();
    for node in 0..n {
        *total.entry(label[node]).or_default() += view.strength[node];
        *internal.entry(label[node]).or_default() += view.loops[node];
    }
    for &(s, t, w) in &view.links {
        if label[s] == label[t] {
            *internal.entry(label[s]).or_default() += w;
        }
    }

    total
        .iter()
        .map(|(c, k)| {
            let l = internal.get(c).copied().unwrap_or(0.0);
            2.0 * l / view.m2 - (k / view.m2).powi(2)
        })
        .sum()
}
