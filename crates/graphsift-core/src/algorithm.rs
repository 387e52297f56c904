//! Algorithm dispatch and result post-processing.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use graphsift_common::bundle::{DEFAULT_MIN_NODE_COUNT, DEFAULT_WEIGHT_NAME};
use graphsift_common::{ArgumentsBundle, Graph, GraphError, Progress, SortOrder};

use crate::cliques::BronKerbosch;
use crate::community::{FastGreedy, GirvanNewman};
use crate::components::ConnectedComponents;
use crate::search::{Traversal, TraversalSearch};
use crate::shortest_path::Dijkstra;
use crate::spanning_tree::{Kruskal, Prim};

/// A graph algorithm producing zero or more result graphs.
pub trait Algorithm {
    fn name(&self) -> &'static str;

    /// Runs over `graph`, reporting through `progress`. Cancellation surfaces
    /// as a [`GraphError::Cancelled`] inside the returned error.
    fn process(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Graph>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    Kruskal,
    Prim,
    FastGreedy,
    GirvanNewman,
    ConnectedComponents,
    BronKerbosch,
    BreadthFirstSearch,
    DepthFirstSearch,
    Dijkstra,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 9] = [
        AlgorithmKind::Kruskal,
        AlgorithmKind::Prim,
        AlgorithmKind::FastGreedy,
        AlgorithmKind::GirvanNewman,
        AlgorithmKind::ConnectedComponents,
        AlgorithmKind::BronKerbosch,
        AlgorithmKind::BreadthFirstSearch,
        AlgorithmKind::DepthFirstSearch,
        AlgorithmKind::Dijkstra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmKind::Kruskal => "kruskal",
            AlgorithmKind::Prim => "prim",
            AlgorithmKind::FastGreedy => "fast_greedy",
            AlgorithmKind::GirvanNewman => "girvan_newman",
            AlgorithmKind::ConnectedComponents => "connected_components",
            AlgorithmKind::BronKerbosch => "bron_kerbosch",
            AlgorithmKind::BreadthFirstSearch => "breadth_first_search",
            AlgorithmKind::DepthFirstSearch => "depth_first_search",
            AlgorithmKind::Dijkstra => "dijkstra",
        }
    }

    /// Searches grow their results under the bundle's conditions; every
    /// other kind requires the input graph to satisfy them.
    pub fn conditions_shape_results(&self) -> bool {
        matches!(self, AlgorithmKind::BreadthFirstSearch | AlgorithmKind::DepthFirstSearch)
    }

    /// Instantiates the algorithm with options read from `bundle`.
    pub fn build(&self, bundle: &ArgumentsBundle) -> Box<dyn Algorithm> {
        match self {
            AlgorithmKind::Kruskal => Box::new(Kruskal::from_bundle(bundle)),
            AlgorithmKind::Prim => Box::new(Prim::from_bundle(bundle)),
            AlgorithmKind::FastGreedy => Box::new(FastGreedy::from_bundle(bundle)),
            AlgorithmKind::GirvanNewman => Box::new(GirvanNewman::from_bundle(bundle)),
            AlgorithmKind::ConnectedComponents => Box::new(ConnectedComponents),
            AlgorithmKind::BronKerbosch => Box::new(BronKerbosch::from_bundle(bundle)),
            AlgorithmKind::BreadthFirstSearch => {
                Box::new(TraversalSearch::from_bundle(Traversal::BreadthFirst, bundle))
            }
            AlgorithmKind::DepthFirstSearch => Box::new(TraversalSearch::from_bundle(Traversal::DepthFirst, bundle)),
            AlgorithmKind::Dijkstra => Box::new(Dijkstra::from_bundle(bundle)),
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmKind {
    type Err = GraphError;

    fn from_str(s: &str) -> graphsift_common::Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "kruskal" => Ok(AlgorithmKind::Kruskal),
            "prim" => Ok(AlgorithmKind::Prim),
            "fastgreedy" => Ok(AlgorithmKind::FastGreedy),
            "girvannewman" | "edgebetweenness" => Ok(AlgorithmKind::GirvanNewman),
            "connectedcomponents" | "components" => Ok(AlgorithmKind::ConnectedComponents),
            "bronkerbosch" | "cliques" => Ok(AlgorithmKind::BronKerbosch),
            "breadthfirstsearch" | "bfs" => Ok(AlgorithmKind::BreadthFirstSearch),
            "depthfirstsearch" | "dfs" => Ok(AlgorithmKind::DepthFirstSearch),
            "dijkstra" | "shortestpath" => Ok(AlgorithmKind::Dijkstra),
            _ => Err(GraphError::invalid_argument("algorithm", format!("unknown algorithm '{}'", s))),
        }
    }
}

/// Post-processing applied to every algorithm's output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    pub min_node_count: usize,
    pub sort_order: SortOrder,
    pub weight_name: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            min_node_count: DEFAULT_MIN_NODE_COUNT as usize,
            sort_order: SortOrder::None,
            weight_name: DEFAULT_WEIGHT_NAME.to_string(),
        }
    }
}

impl OutputOptions {
    pub fn from_bundle(bundle: &ArgumentsBundle) -> graphsift_common::Result<Self> {
        Ok(Self {
            min_node_count: bundle.min_node_count(),
            sort_order: bundle.sort_order()?,
            weight_name: bundle.weight_name().to_string(),
        })
    }
}

fn average_weight(graph: &Graph) -> f64 {
    if graph.edge_count() == 0 {
        0.0
    } else {
        graph.total_weight() / graph.edge_count() as f64
    }
}

fn by_size(a: &Graph, b: &Graph) -> Ordering {
    a.node_count()
        .cmp(&b.node_count())
        .then_with(|| a.edge_count().cmp(&b.edge_count()))
}

/// Filters and orders result graphs.
///
/// Drops graphs with fewer than `min_node_count` nodes and graphs contained
/// in another result. Of two identical results only the first survives.
/// Sorting is stable.
pub fn cull(graphs: Vec<Graph>, options: &OutputOptions) -> Vec<Graph> {
    let sized: Vec<Graph> = graphs
        .into_iter()
        .filter(|g| g.node_count() >= options.min_node_count)
        .collect();

    let redundant: Vec<bool> = sized
        .iter()
        .enumerate()
        .map(|(i, g)| {
            sized.iter().enumerate().any(|(j, other)| {
                i != j && g.is_subgraph_of(other) && (j < i || !other.is_subgraph_of(g))
            })
        })
        .collect();

    let mut kept: Vec<Graph> = sized
        .into_iter()
        .zip(redundant)
        .filter_map(|(g, drop)| (!drop).then_some(g))
        .collect();

    match options.sort_order {
        SortOrder::None => {}
        SortOrder::Ascending => kept.sort_by(by_size),
        SortOrder::Descending => kept.sort_by(|a, b| by_size(b, a)),
        SortOrder::AverageWeight => kept.sort_by(|a, b| average_weight(a).total_cmp(&average_weight(b))),
    }
    kept
}

/// Checks the bundle's conditions, runs `kind` on `graph` and culls the output.
/// For the searches the conditions constrain the results instead of the input.
pub fn run(kind: AlgorithmKind, graph: &Graph, bundle: &ArgumentsBundle, progress: &mut Progress<'_>) -> Result<Vec<Graph>> {
    let input_conditions: &[_] = if kind.conditions_shape_results() {
        &[]
    } else {
        bundle.conditions()
    };
    for condition in input_conditions {
        let verdict = condition.evaluate(graph);
        if !verdict.satisfied {
            let message = verdict.message.unwrap_or_else(|| format!("{} does not hold", condition));
            tracing::warn!("{}: rejected {}: {}", kind, graph.name(), message);
            bail!(GraphError::invalid_argument("conditions", message));
        }
    }

    let output = OutputOptions::from_bundle(bundle)?;
    let algorithm = kind.build(bundle);
    tracing::info!(
        "Running {} on {} ({} nodes, {} edges)",
        algorithm.name(),
        graph.name(),
        graph.node_count(),
        graph.edge_count()
    );

    let graphs = algorithm.process(graph, progress)?;
    let produced = graphs.len();
    let kept = cull(graphs, &output);
    tracing::info!("{}: {} result graph(s), {} after culling", algorithm.name(), produced, kept.len());
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphsift_common::bundle::{KEY_MAX, KEY_MIN_NODE_COUNT, KEY_SORT_ORDER};
    use graphsift_common::{CancelToken, Condition};

    fn graph(name: &str, edges: &[(&str, &str, f64)]) -> Graph {
        Graph::from_undirected_edges(name, edges)
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Kruskal".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::Kruskal);
        assert_eq!("fast-greedy".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::FastGreedy);
        assert_eq!("Edge Betweenness".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::GirvanNewman);
        for kind in AlgorithmKind::ALL {
            assert_eq!(kind.as_str().parse::<AlgorithmKind>().unwrap(), kind);
        }
        assert_eq!("BFS".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::BreadthFirstSearch);
        assert_eq!("shortest-path".parse::<AlgorithmKind>().unwrap(), AlgorithmKind::Dijkstra);
        assert!("walktrap".parse::<AlgorithmKind>().is_err());
    }

    #[test]
    fn test_cull_drops_small_and_contained() {
        let big = graph("big", &[("A", "B", 1.0), ("B", "C", 1.0)]);
        let inside = graph("inside", &[("A", "B", 1.0)]);
        let single = Graph::from_parts("single", ["Z"], Vec::<(&str, &str, f64, bool)>::new()).unwrap();
        let other = graph("other", &[("X", "Y", 1.0)]);

        let options = OutputOptions {
            min_node_count: 2,
            ..OutputOptions::default()
        };
        let kept = cull(vec![inside, big, single, other], &options);
        let names: Vec<&str> = kept.iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["big", "other"]);
    }

    #[test]
    fn test_cull_keeps_one_of_duplicates() {
        let a = graph("first", &[("A", "B", 1.0)]);
        let b = graph("second", &[("A", "B", 1.0)]);
        let kept = cull(vec![a, b], &OutputOptions::default());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name(), "first");
    }

    #[test]
    fn test_cull_sort_orders() {
        let make = || {
            vec![
                graph("mid", &[("A", "B", 5.0), ("B", "C", 5.0)]),
                graph("small", &[("D", "E", 9.0)]),
                graph("large", &[("F", "G", 1.0), ("G", "H", 1.0), ("H", "I", 1.0)]),
            ]
        };
        let names = |graphs: Vec<Graph>| graphs.iter().map(|g| g.name().to_string()).collect::<Vec<_>>();

        let mut options = OutputOptions::default();
        options.sort_order = SortOrder::Ascending;
        assert_eq!(names(cull(make(), &options)), vec!["small", "mid", "large"]);
        options.sort_order = SortOrder::Descending;
        assert_eq!(names(cull(make(), &options)), vec!["large", "mid", "small"]);
        options.sort_order = SortOrder::AverageWeight;
        assert_eq!(names(cull(make(), &options)), vec!["large", "mid", "small"]);
        options.sort_order = SortOrder::None;
        assert_eq!(names(cull(make(), &options)), vec!["mid", "small", "large"]);
    }

    #[test]
    fn test_run_kruskal_max() {
        let g = graph("g", &[("A", "B", 1.0), ("B", "C", 2.0), ("A", "C", 3.0)]);
        let bundle = ArgumentsBundle::new().with_bool(KEY_MAX, true);
        let graphs = run(AlgorithmKind::Kruskal, &g, &bundle, &mut Progress::silent()).unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].total_weight(), 5.0);
    }

    #[test]
    fn test_run_rejects_unmet_condition() {
        let g = Graph::from_parts("d", ["A", "B"], [("A", "B", 1.0, true)]).unwrap();
        let bundle = ArgumentsBundle::new().with_condition(Condition::Undirected);
        let err = run(AlgorithmKind::Prim, &g, &bundle, &mut Progress::silent()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GraphError>(),
            Some(GraphError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_run_search_conditions_constrain_results() {
        let g = graph("tri", &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)]);
        let bundle = ArgumentsBundle::new().with_condition(Condition::Bipartite);
        assert!(run(AlgorithmKind::Kruskal, &g, &bundle, &mut Progress::silent()).is_err());

        for kind in [AlgorithmKind::BreadthFirstSearch, AlgorithmKind::DepthFirstSearch] {
            let graphs = run(kind, &g, &bundle, &mut Progress::silent()).unwrap();
            assert!(!graphs.is_empty());
            assert!(graphs.iter().all(|sub| sub.is_bipartite() && sub.edge_count() == 2));
        }
    }

    #[test]
    fn test_run_applies_min_node_count() {
        let g = graph("g", &[("A", "B", 1.0), ("C", "D", 1.0), ("D", "E", 1.0)]);
        let bundle = ArgumentsBundle::new().with_int(KEY_MIN_NODE_COUNT, 3);
        let graphs = run(AlgorithmKind::ConnectedComponents, &g, &bundle, &mut Progress::silent()).unwrap();
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].node_list(), vec!["C", "D", "E"]);
    }

    #[test]
    fn test_run_rejects_bad_sort_order() {
        let g = graph("g", &[("A", "B", 1.0)]);
        let bundle = ArgumentsBundle::new().with_object(KEY_SORT_ORDER, "sideways");
        assert!(run(AlgorithmKind::Kruskal, &g, &bundle, &mut Progress::silent()).is_err());
    }

    #[test]
    fn test_run_surfaces_cancellation() {
        let g = graph("g", &[("A", "B", 1.0), ("B", "C", 1.0)]);
        let token = CancelToken::new();
        token.cancel();
        let mut listener = token.clone();
        for kind in [AlgorithmKind::Kruskal, AlgorithmKind::FastGreedy, AlgorithmKind::GirvanNewman] {
            let err = run(kind, &g, &ArgumentsBundle::new(), &mut Progress::new(&mut listener)).unwrap_err();
            assert_eq!(err.downcast_ref::<GraphError>(), Some(&GraphError::Cancelled));
        }
    }
}
