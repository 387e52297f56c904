pub mod algorithm;
pub mod centrality;
pub mod cliques;
pub mod community;
pub mod components;
pub mod search;
pub mod shortest_path;
pub mod spanning_tree;
pub mod structs;

pub use algorithm::{cull, run, Algorithm, AlgorithmKind, OutputOptions};
pub use centrality::BetweennessCentrality;
pub use cliques::{BronKerbosch, CliqueOptions};
pub use community::{modularity, CommunityOptions, CommunityResult, FastGreedy, GirvanNewman, MergeStep};
pub use components::{weak_components, ConnectedComponents};
pub use search::{SearchOptions, Traversal, TraversalSearch};
pub use shortest_path::{Dijkstra, Path, ShortestPathOptions};
pub use spanning_tree::{Kruskal, Prim, SpanningTreeOptions};

// Re-export common types for convenience
pub use graphsift_common::{
    ArgumentsBundle, CancelToken, Condition, ConditionedGraph, Edge, EdgeId, FinderConfig, Graph, GraphError, Node,
    NodeId, Progress, ProgressListener, ProgressLog, SortOrder,
};
