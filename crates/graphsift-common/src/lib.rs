pub mod bundle;
pub mod condition;
pub mod config;
pub mod error;
pub mod graph;
pub mod progress;

pub use bundle::{ArgumentsBundle, SortOrder};
pub use condition::{all_satisfied, Condition, ConditionedGraph, Verdict};
pub use config::FinderConfig;
pub use error::{GraphError, Result};
pub use graph::{Edge, EdgeId, Graph, Node, NodeId, DEFAULT_EDGE_WEIGHT};
pub use progress::{CancelToken, Progress, ProgressListener, ProgressLog};

/// Tolerance for floating-point equality in modularity bookkeeping.
pub const EPSILON: f64 = 1e-14;

/// Equality within [`EPSILON`].
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Rounds `value` to the nearest multiple of [`EPSILON`], expressed in units
/// of the grid. Comparing snapped values is a total preorder, unlike
/// [`approx_eq`], which is not transitive.
pub fn snap(value: f64) -> f64 {
    (value / EPSILON).round()
}

/// Orders two values by their [`snap`] buckets.
pub fn snapped_cmp(a: f64, b: f64) -> std::cmp::Ordering {
    snap(a).total_cmp(&snap(b))
}
