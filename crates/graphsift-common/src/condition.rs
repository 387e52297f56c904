//! Structural predicates over graphs and a graph wrapper that enforces them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::{EdgeId, Graph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Bipartite,
    Clique,
    DirectedClique,
    Undirected,
    Directed,
    LoopFree,
}

/// Outcome of a condition check. A failed check carries a diagnostic for the
/// caller; it is never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub satisfied: bool,
    pub message: Option<String>,
}

impl Verdict {
    fn pass() -> Self {
        Self {
            satisfied: true,
            message: None,
        }
    }

    fn fail(message: String) -> Self {
        Self {
            satisfied: false,
            message: Some(message),
        }
    }
}

impl Condition {
    pub const ALL: [Condition; 6] = [
        Condition::Bipartite,
        Condition::Clique,
        Condition::DirectedClique,
        Condition::Undirected,
        Condition::Directed,
        Condition::LoopFree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Bipartite => "bipartite",
            Condition::Clique => "clique",
            Condition::DirectedClique => "directed_clique",
            Condition::Undirected => "undirected",
            Condition::Directed => "directed",
            Condition::LoopFree => "loop_free",
        }
    }

    pub fn satisfies(&self, graph: &Graph) -> bool {
        self.evaluate(graph).satisfied
    }

    pub fn evaluate(&self, graph: &Graph) -> Verdict {
        match self {
            Condition::Bipartite => {
                if graph.node_count() == 1 || graph.is_bipartite() {
                    Verdict::pass()
                } else {
                    Verdict::fail(format!("{} is not bipartite", graph.name()))
                }
            }
            Condition::Clique => {
                if graph.is_clique() {
                    Verdict::pass()
                } else {
                    Verdict::fail(format!("{} is not a clique", graph.name()))
                }
            }
            Condition::DirectedClique => {
                if graph.is_directed_clique() {
                    Verdict::pass()
                } else {
                    Verdict::fail(format!("{} is not a directed clique", graph.name()))
                }
            }
            Condition::Undirected => match first_edge(graph, |g, e| g.edge(e).is_directed()) {
                None => Verdict::pass(),
                Some(e) => Verdict::fail(format!(
                    "{} must be undirected but contains directed edge {}",
                    graph.name(),
                    describe(graph, e)
                )),
            },
            Condition::Directed => match first_edge(graph, |g, e| !g.edge(e).is_directed()) {
                None => Verdict::pass(),
                Some(e) => Verdict::fail(format!(
                    "{} must be directed but contains undirected edge {}",
                    graph.name(),
                    describe(graph, e)
                )),
            },
            Condition::LoopFree => match first_edge(graph, |g, e| g.edge(e).is_loop()) {
                None => Verdict::pass(),
                Some(e) => Verdict::fail(format!(
                    "{} must be loop-free but contains self-loop {}",
                    graph.name(),
                    describe(graph, e)
                )),
            },
        }
    }
}

fn first_edge(graph: &Graph, pred: impl Fn(&Graph, EdgeId) -> bool) -> Option<EdgeId> {
    graph.edge_ids().find(|&e| pred(graph, e))
}

fn describe(graph: &Graph, id: EdgeId) -> String {
    let edge = graph.edge(id);
    format!("{} -> {}", graph.label(edge.source()), graph.label(edge.target()))
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| GraphError::invalid_argument("condition", format!("unknown condition '{}'", s)))
    }
}

/// Conjunction of `conditions` over `graph`. Empty lists are vacuously true.
pub fn all_satisfied(conditions: &[Condition], graph: &Graph) -> bool {
    conditions.iter().all(|c| c.satisfies(graph))
}

/// A graph that carries the conditions it must keep satisfying.
///
/// With `force_on_add` set (the default), every addition is first applied to
/// a scratch copy and kept only if all conditions still hold.
#[derive(Debug, Clone)]
pub struct ConditionedGraph {
    graph: Graph,
    conditions: Vec<Condition>,
    force_on_add: bool,
}

impl ConditionedGraph {
    pub fn new(name: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self {
            graph: Graph::new(name),
            conditions,
            force_on_add: true,
        }
    }

    /// Wraps an existing graph without validating it.
    pub fn wrap(graph: Graph, conditions: Vec<Condition>) -> Self {
        Self {
            graph,
            conditions,
            force_on_add: true,
        }
    }

    pub fn with_force_on_add(mut self, force: bool) -> Self {
        self.force_on_add = force;
        self
    }

    pub fn forces_on_add(&self) -> bool {
        self.force_on_add
    }

    pub fn set_force_on_add(&mut self, force: bool) {
        self.force_on_add = force;
    }

    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn remove_condition(&mut self, condition: Condition) {
        self.conditions.retain(|c| *c != condition);
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    pub fn query_satisfaction(&self) -> bool {
        all_satisfied(&self.conditions, &self.graph)
    }

    /// Adds a node. `Ok(false)` means the conditions rejected it.
    pub fn add_node(&mut self, label: &str) -> Result<bool> {
        self.add_partial(&[label], &[])
    }

    /// Adds an edge between existing nodes. `Ok(false)` means the conditions
    /// rejected it.
    pub fn add_edge(&mut self, source: &str, target: &str, weight: f64, directed: bool) -> Result<bool> {
        self.add_partial(&[], &[(source, target, weight, directed)])
    }

    /// Adds a batch of nodes and edges atomically with respect to the
    /// conditions: either all of them are kept or none.
    pub fn add_partial(&mut self, labels: &[&str], edges: &[(&str, &str, f64, bool)]) -> Result<bool> {
        if self.force_on_add {
            let mut scratch = self.graph.clone();
            apply(&mut scratch, labels, edges)?;
            if !all_satisfied(&self.conditions, &scratch) {
                tracing::debug!(graph = %self.graph.name(), "Addition rejected by conditions");
                return Ok(false);
            }
            self.graph = scratch;
            return Ok(true);
        }
        apply(&mut self.graph, labels, edges)?;
        Ok(true)
    }

    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.graph.node_id(label)
    }
}

fn apply(graph: &mut Graph, labels: &[&str], edges: &[(&str, &str, f64, bool)]) -> Result<()> {
    for label in labels {
        graph.add_node(label)?;
    }
    for &(source, target, weight, directed) in edges {
        graph.add_edge(source, target, weight, directed)?;
    }
    Ok(())
}

impl fmt::Display for ConditionedGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.conditions.iter().map(|c| c.as_str()).collect();
        write!(f, "{}\nConditions: [{}]", self.graph, names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_node_is_bipartite() {
        let mut g = Graph::new("single");
        g.add_node("A").unwrap();
        assert!(Condition::Bipartite.satisfies(&g));
        assert!(!g.is_bipartite());
    }

    #[test]
    fn test_shape_conditions_report_messages() {
        let g = Graph::from_parts("mixed", ["A", "B"], [("A", "B", 1.0, true), ("B", "B", 1.0, false)]).unwrap();

        let verdict = Condition::Undirected.evaluate(&g);
        assert!(!verdict.satisfied);
        assert!(verdict.message.unwrap().contains("A -> B"));

        let verdict = Condition::LoopFree.evaluate(&g);
        assert!(!verdict.satisfied);
        assert!(verdict.message.unwrap().contains("self-loop"));

        assert!(!Condition::Directed.satisfies(&g));
        assert_eq!(Condition::Clique.evaluate(&Graph::new("empty")), Verdict::pass());
    }

    #[test]
    fn test_all_satisfied_is_conjunction() {
        let g = Graph::from_undirected_edges("pair", &[("A", "B", 1.0)]);
        assert!(all_satisfied(&[], &g));
        assert!(all_satisfied(&[Condition::Clique, Condition::Bipartite], &g));
        assert!(!all_satisfied(&[Condition::Clique, Condition::Directed], &g));
    }

    #[test]
    fn test_condition_names() {
        assert_eq!("Directed-Clique".parse::<Condition>().unwrap(), Condition::DirectedClique);
        assert_eq!("loop_free".parse::<Condition>().unwrap(), Condition::LoopFree);
        assert!("planar".parse::<Condition>().is_err());
        for c in Condition::ALL {
            assert_eq!(c.to_string().parse::<Condition>().unwrap(), c);
        }
    }

    #[test]
    fn test_conditioned_graph_rejects_violations() {
        let mut g = ConditionedGraph::new("bip", vec![Condition::Bipartite]);
        assert!(g.add_partial(&["A", "B", "C"], &[("A", "B", 1.0, false), ("B", "C", 1.0, false)]).unwrap());
        assert!(!g.add_edge("C", "A", 1.0, false).unwrap());
        assert_eq!(g.graph().edge_count(), 2);
        assert!(g.query_satisfaction());
    }

    #[test]
    fn test_conditioned_graph_without_force() {
        let mut g = ConditionedGraph::new("bip", vec![Condition::Clique]).with_force_on_add(false);
        assert!(g.add_node("A").unwrap());
        assert!(g.add_node("B").unwrap());
        assert!(!g.query_satisfaction());
        assert!(g.add_edge("A", "B", 1.0, false).unwrap());
        assert!(g.query_satisfaction());
    }

    #[test]
    fn test_conditioned_graph_propagates_model_errors() {
        let mut g = ConditionedGraph::new("g", vec![]);
        assert!(g.add_node("A").unwrap());
        assert!(matches!(g.add_node("A"), Err(GraphError::DuplicateNode(_))));
    }

    #[test]
    fn test_condition_serde_names() {
        let parsed: Vec<Condition> = serde_json::from_str(r#"["bipartite", "loop_free"]"#).unwrap();
        assert_eq!(parsed, vec![Condition::Bipartite, Condition::LoopFree]);
    }
}
