use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condition::Condition;
use crate::error::{GraphError, Result};

pub const KEY_MAX: &str = "max";
pub const KEY_THRESHOLD: &str = "threshold";
pub const KEY_START_NODE: &str = "startNode";
pub const KEY_WEIGHTED: &str = "weighted";
pub const KEY_CENTRALITY_WEIGHTED: &str = "centralityWeighted";
pub const KEY_BIPARTITE: &str = "bipartite";
pub const KEY_EDGE_PRESERVATION: &str = "edgePreservation";
pub const KEY_FROM_NODE: &str = "fromNode";
pub const KEY_TO_NODE: &str = "toNode";
pub const KEY_MIN_NODE_COUNT: &str = "minNodeCount";
pub const KEY_SORT_ORDER: &str = "sortOrder";
pub const KEY_WEIGHT_NAME: &str = "weightName";

pub const DEFAULT_MIN_NODE_COUNT: i64 = 1;
pub const DEFAULT_WEIGHT_NAME: &str = "weight";

/// How result graphs are ordered before being handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
    AverageWeight,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::None => "none",
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
            SortOrder::AverageWeight => "average_weight",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(SortOrder::None),
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            "average_weight" | "average-weight" => Ok(SortOrder::AverageWeight),
            other => Err(GraphError::invalid_argument(
                KEY_SORT_ORDER,
                format!("unknown sort order '{}'", other),
            )),
        }
    }
}

/// Typed option map handed to algorithm constructors. Unknown keys are
/// carried along and ignored by algorithms that do not read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentsBundle {
    booleans: HashMap<String, bool>,
    doubles: HashMap<String, f64>,
    integers: HashMap<String, i64>,
    objects: HashMap<String, Value>,
    conditions: Vec<Condition>,
}

impl ArgumentsBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) {
        self.booleans.insert(key.into(), value);
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.booleans.get(key).copied()
    }

    pub fn remove_bool(&mut self, key: &str) -> Option<bool> {
        self.booleans.remove(key)
    }

    pub fn put_double(&mut self, key: impl Into<String>, value: f64) {
        self.doubles.insert(key.into(), value);
    }

    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.doubles.get(key).copied()
    }

    pub fn remove_double(&mut self, key: &str) -> Option<f64> {
        self.doubles.remove(key)
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i64) {
        self.integers.insert(key.into(), value);
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.integers.get(key).copied()
    }

    pub fn remove_int(&mut self, key: &str) -> Option<i64> {
        self.integers.remove(key)
    }

    pub fn put_object(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.objects.insert(key.into(), value.into());
    }

    pub fn get_object(&self, key: &str) -> Option<&Value> {
        self.objects.get(key)
    }

    pub fn remove_object(&mut self, key: &str) -> Option<Value> {
        self.objects.remove(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.objects.get(key).and_then(Value::as_str)
    }

    pub fn put_condition(&mut self, condition: Condition) {
        if !self.conditions.contains(&condition) {
            self.conditions.push(condition);
        }
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn with_bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.put_bool(key, value);
        self
    }

    pub fn with_double(mut self, key: impl Into<String>, value: f64) -> Self {
        self.put_double(key, value);
        self
    }

    pub fn with_int(mut self, key: impl Into<String>, value: i64) -> Self {
        self.put_int(key, value);
        self
    }

    pub fn with_object(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put_object(key, value);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.put_condition(condition);
        self
    }

    // Well-known keys with their documented defaults.

    pub fn max(&self) -> bool {
        self.get_bool(KEY_MAX).unwrap_or(false)
    }

    /// Explicit threshold, or the identity value for the extremum direction:
    /// `-inf` when maximising and `+inf` when minimising.
    pub fn threshold(&self) -> f64 {
        self.get_double(KEY_THRESHOLD).unwrap_or(if self.max() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        })
    }

    pub fn start_node(&self) -> Option<&str> {
        self.get_str(KEY_START_NODE)
    }

    /// Community detection weighting.
    pub fn weighted(&self) -> bool {
        self.get_bool(KEY_WEIGHTED).unwrap_or(false)
    }

    /// Betweenness weighting, independent of [`ArgumentsBundle::weighted`].
    pub fn centrality_weighted(&self) -> bool {
        self.get_bool(KEY_CENTRALITY_WEIGHTED).unwrap_or(false)
    }

    /// Bron-Kerbosch looks for bicliques instead of cliques.
    pub fn bipartite(&self) -> bool {
        self.get_bool(KEY_BIPARTITE).unwrap_or(false)
    }

    /// Traversal searches add a node together with all its edges back into
    /// the subgraph found so far.
    pub fn edge_preservation(&self) -> bool {
        self.get_bool(KEY_EDGE_PRESERVATION).unwrap_or(false)
    }

    pub fn from_node(&self) -> Option<&str> {
        self.get_str(KEY_FROM_NODE)
    }

    pub fn to_node(&self) -> Option<&str> {
        self.get_str(KEY_TO_NODE)
    }

    pub fn min_node_count(&self) -> usize {
        let count = self.get_int(KEY_MIN_NODE_COUNT).unwrap_or(DEFAULT_MIN_NODE_COUNT);
        usize::try_from(count).unwrap_or(0)
    }

    pub fn sort_order(&self) -> Result<SortOrder> {
        match self.get_str(KEY_SORT_ORDER) {
            Some(raw) => raw.parse(),
            None => Ok(SortOrder::None),
        }
    }

    pub fn weight_name(&self) -> &str {
        self.get_str(KEY_WEIGHT_NAME).unwrap_or(DEFAULT_WEIGHT_NAME)
    }
}
