//! Arena-backed graph model.
//!
//! Nodes and edges live in flat vectors and refer to each other through
//! [`NodeId`] / [`EdgeId`] indices, so a graph is a plain value: cloning it
//! never aliases another graph's topology.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

pub const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A labelled vertex. Identity, equality and ordering are by label only.
#[derive(Debug, Clone)]
pub struct Node {
    label: String,
    /// Undirected edges are recorded at both endpoints, directed ones only at
    /// their source.
    incident: Vec<EdgeId>,
}

impl Node {
    fn new(label: String) -> Self {
        Self {
            label,
            incident: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn incident(&self) -> &[EdgeId] {
        &self.incident
    }

    pub fn degree(&self) -> usize {
        self.incident.len()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label.cmp(&other.label)
    }
}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.label.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// A weighted connection between two nodes of the same graph.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
    weight: f64,
    directed: bool,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, weight: f64, directed: bool) -> Self {
        Self {
            source,
            target,
            weight,
            directed,
        }
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Self-loop ("pseudo" edge).
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn opposite(&self, node: NodeId) -> Option<NodeId> {
        if node == self.source {
            Some(self.target)
        } else if node == self.target {
            Some(self.source)
        } else {
            None
        }
    }

    /// Whether the edge leads from `a` to `b`. Undirected edges connect both
    /// ways.
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (!self.directed && self.source == b && self.target == a)
    }

    /// Whether the edge is recorded in `node`'s incidence list.
    pub fn recorded_at(&self, node: NodeId) -> bool {
        node == self.source || (!self.directed && node == self.target)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        if self.directed != other.directed {
            return false;
        }
        let same = self.source == other.source && self.target == other.target;
        let swapped = self.source == other.target && self.target == other.source;
        same || (!self.directed && swapped)
    }
}

/// Label-level identity of an edge, comparable across graphs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EdgeKey {
    source: String,
    target: String,
    directed: bool,
}

#[derive(Debug, Clone)]
pub struct Graph {
    name: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    labels: HashMap<String, NodeId>,
    /// `(source, target, directed)` of every stored edge.
    endpoints: HashMap<(NodeId, NodeId, bool), EdgeId>,
    total_weight: f64,
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            labels: HashMap::new(),
            endpoints: HashMap::new(),
            total_weight: 0.0,
        }
    }

    /// Builds a graph from a node list and an edge list of
    /// `(source, target, weight, directed)` tuples. Nodes are added first.
    pub fn from_parts<N, E, S>(name: impl Into<String>, labels: N, edges: E) -> Result<Self>
    where
        N: IntoIterator<Item = S>,
        E: IntoIterator<Item = (S, S, f64, bool)>,
        S: AsRef<str>,
    {
        let mut graph = Graph::new(name);
        for label in labels {
            graph.add_node(label.as_ref())?;
        }
        for (source, target, weight, directed) in edges {
            graph.add_edge(source.as_ref(), target.as_ref(), weight, directed)?;
        }
        Ok(graph)
    }

    /// Builds an undirected graph from weighted pairs, creating nodes in order
    /// of first appearance.
    pub fn from_undirected_edges(name: impl Into<String>, edges: &[(&str, &str, f64)]) -> Self {
        let mut graph = Graph::new(name);
        for &(source, target, weight) in edges {
            let s = graph.ensure_node(source);
            let t = graph.ensure_node(target);
            graph.insert_edge(Edge::new(s, t, weight, false));
        }
        graph
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.rename(name);
        self
    }

    pub fn add_node(&mut self, label: &str) -> Result<NodeId> {
        if self.labels.contains_key(label) {
            return Err(GraphError::DuplicateNode(label.to_string()));
        }
        Ok(self.push_node(label))
    }

    fn push_node(&mut self, label: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(label.to_string()));
        self.labels.insert(label.to_string(), id);
        id
    }

    fn ensure_node(&mut self, label: &str) -> NodeId {
        match self.labels.get(label) {
            Some(&id) => id,
            None => self.push_node(label),
        }
    }

    /// Adds an edge between two existing nodes. An edge equal to one already
    /// present (same endpoints and directedness, either orientation when
    /// undirected) is not added twice; the existing id is returned instead.
    /// A directed and an undirected edge over the same pair are distinct.
    pub fn add_edge(&mut self, source: &str, target: &str, weight: f64, directed: bool) -> Result<EdgeId> {
        let s = self
            .node_id(source)
            .ok_or_else(|| GraphError::UnknownNode(source.to_string()))?;
        let t = self
            .node_id(target)
            .ok_or_else(|| GraphError::UnknownNode(target.to_string()))?;
        Ok(self.insert_edge(Edge::new(s, t, weight, directed)))
    }

    /// Id-based variant of [`Graph::add_edge`].
    pub fn add_edge_between(&mut self, source: NodeId, target: NodeId, weight: f64, directed: bool) -> Result<EdgeId> {
        for id in [source, target] {
            if id.0 >= self.nodes.len() {
                return Err(GraphError::UnknownNode(format!("#{}", id.0)));
            }
        }
        Ok(self.insert_edge(Edge::new(source, target, weight, directed)))
    }

    /// Id of the stored edge equal to `edge` under [`Edge`]'s `PartialEq`.
    fn find_equal(&self, edge: &Edge) -> Option<EdgeId> {
        if let Some(&id) = self.endpoints.get(&(edge.source, edge.target, edge.directed)) {
            return Some(id);
        }
        if edge.directed {
            return None;
        }
        self.endpoints.get(&(edge.target, edge.source, false)).copied()
    }

    fn insert_edge(&mut self, edge: Edge) -> EdgeId {
        if let Some(existing) = self.find_equal(&edge) {
            return existing;
        }

        let id = EdgeId(self.edges.len());
        self.nodes[edge.source.0].incident.push(id);
        if !edge.directed && !edge.is_loop() {
            self.nodes[edge.target.0].incident.push(id);
        }
        self.endpoints.insert((edge.source, edge.target, edge.directed), id);
        self.total_weight += edge.weight;
        self.edges.push(edge);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id.0].label
    }

    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.labels.get(label).copied()
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.labels.contains_key(label)
    }

    /// Finds an edge leading from `a` to `b`: directed `a -> b` first, then an
    /// undirected edge over the pair.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.endpoints
            .get(&(a, b, true))
            .or_else(|| self.endpoints.get(&(a, b, false)))
            .or_else(|| self.endpoints.get(&(b, a, false)))
            .copied()
    }

    pub fn edge_between_labels(&self, a: &str, b: &str) -> Option<EdgeId> {
        self.edge_between(self.node_id(a)?, self.node_id(b)?)
    }

    /// Every non-loop edge touching each node regardless of direction, paired
    /// with the node on the other end. Indexed by node id.
    pub fn adjacency_ignoring_direction(&self) -> Vec<Vec<(EdgeId, NodeId)>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for (index, edge) in self.edges.iter().enumerate() {
            if edge.is_loop() {
                continue;
            }
            adjacency[edge.source.0].push((EdgeId(index), edge.target));
            adjacency[edge.target.0].push((EdgeId(index), edge.source));
        }
        adjacency
    }

    /// Incident edges recorded at `id`, paired with the node on the other end.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        self.nodes[id.0].incident.iter().map(move |&e| {
            let edge = &self.edges[e.0];
            (e, edge.opposite(id).unwrap_or(id))
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId)
    }

    /// Node ids ordered by label.
    pub fn sorted_node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.node_ids().collect();
        ids.sort_by(|a, b| self.label(*a).cmp(self.label(*b)));
        ids
    }

    /// Node labels in insertion order.
    pub fn node_list(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    /// Edges as `(source, target, weight, directed)` in insertion order.
    pub fn edge_list(&self) -> Vec<(&str, &str, f64, bool)> {
        self.edges
            .iter()
            .map(|e| (self.label(e.source), self.label(e.target), e.weight, e.directed))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Sum of the weights of the edges recorded at `id`.
    pub fn strength(&self, id: NodeId) -> f64 {
        self.nodes[id.0]
            .incident
            .iter()
            .map(|e| self.edges[e.0].weight)
            .sum()
    }

    /// Subgraph induced by `ids`: the given nodes (in the given order) and
    /// every edge whose endpoints are both among them.
    pub fn induced_subgraph(&self, name: impl Into<String>, ids: &[NodeId]) -> Graph {
        let mut sub = Graph::new(name);
        let mut mapping: HashMap<NodeId, NodeId> = HashMap::with_capacity(ids.len());
        for &id in ids {
            if !mapping.contains_key(&id) {
                mapping.insert(id, sub.push_node(self.label(id)));
            }
        }
        for edge in &self.edges {
            if let (Some(&s), Some(&t)) = (mapping.get(&edge.source), mapping.get(&edge.target)) {
                sub.insert_edge(Edge::new(s, t, edge.weight, edge.directed));
            }
        }
        sub
    }

    /// Builds a new graph with the same nodes and only the selected edges.
    pub fn with_edges(&self, name: impl Into<String>, edge_ids: &[EdgeId]) -> Graph {
        let mut out = Graph::new(name);
        for node in &self.nodes {
            out.push_node(&node.label);
        }
        // node ids coincide because nodes were pushed in the same order
        for &id in edge_ids {
            out.insert_edge(self.edges[id.0]);
        }
        out
    }

    /// Copy of this graph without the given edge.
    pub fn without_edge(&self, removed: EdgeId) -> Graph {
        let kept: Vec<EdgeId> = self.edge_ids().filter(|&id| id != removed).collect();
        self.with_edges(self.name.clone(), &kept)
    }

    fn edge_key(&self, edge: &Edge) -> EdgeKey {
        let mut source = self.label(edge.source).to_string();
        let mut target = self.label(edge.target).to_string();
        if !edge.directed && target < source {
            std::mem::swap(&mut source, &mut target);
        }
        EdgeKey {
            source,
            target,
            directed: edge.directed,
        }
    }

    fn edge_keys(&self) -> HashSet<EdgeKey> {
        self.edges.iter().map(|e| self.edge_key(e)).collect()
    }

    fn combine(&self, name: String, labels: Vec<String>, edges: Vec<(Edge, &Graph)>) -> Graph {
        let mut out = Graph::new(name);
        for label in labels {
            out.ensure_node(&label);
        }
        for (edge, owner) in edges {
            let (s, t) = (owner.label(edge.source), owner.label(edge.target));
            if let (Some(s), Some(t)) = (out.node_id(s), out.node_id(t)) {
                out.insert_edge(Edge::new(s, t, edge.weight, edge.directed));
            }
        }
        out
    }

    pub fn union(&self, other: &Graph) -> Graph {
        let mut labels: Vec<String> = self.nodes.iter().map(|n| n.label.clone()).collect();
        labels.extend(
            other
                .nodes
                .iter()
                .filter(|n| !self.contains_node(&n.label))
                .map(|n| n.label.clone()),
        );
        let mut edges: Vec<(Edge, &Graph)> = self.edges.iter().map(|e| (*e, self)).collect();
        let mine = self.edge_keys();
        edges.extend(
            other
                .edges
                .iter()
                .filter(|e| !mine.contains(&other.edge_key(e)))
                .map(|e| (*e, other)),
        );
        self.combine(format!("{} union {}", self.name, other.name), labels, edges)
    }

    pub fn intersection(&self, other: &Graph) -> Graph {
        let labels: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| other.contains_node(&n.label))
            .map(|n| n.label.clone())
            .collect();
        let theirs = other.edge_keys();
        let edges = self
            .edges
            .iter()
            .filter(|e| theirs.contains(&self.edge_key(e)))
            .map(|e| (*e, self))
            .collect();
        self.combine(format!("{} intersection {}", self.name, other.name), labels, edges)
    }

    pub fn difference(&self, other: &Graph) -> Graph {
        let labels: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| !other.contains_node(&n.label))
            .map(|n| n.label.clone())
            .collect();
        let theirs = other.edge_keys();
        let edges = self
            .edges
            .iter()
            .filter(|e| !theirs.contains(&self.edge_key(e)))
            .map(|e| (*e, self))
            .collect();
        self.combine(format!("{} difference {}", self.name, other.name), labels, edges)
    }

    /// Whether every node and edge of `self` also appears in `other`.
    pub fn is_subgraph_of(&self, other: &Graph) -> bool {
        if self.node_count() > other.node_count() || self.edge_count() > other.edge_count() {
            return false;
        }
        if !self.nodes.iter().all(|n| other.contains_node(&n.label)) {
            return false;
        }
        let theirs = other.edge_keys();
        self.edges.iter().all(|e| theirs.contains(&self.edge_key(e)))
    }

    /// Every node reaches every other node through an edge recorded at it.
    pub fn is_clique(&self) -> bool {
        self.node_ids().all(|a| {
            self.node_ids()
                .filter(|&b| b != a)
                .all(|b| self.edge_between(a, b).is_some())
        })
    }

    /// Every pair of distinct nodes is joined by an edge in at least one
    /// direction.
    pub fn is_directed_clique(&self) -> bool {
        self.node_ids().all(|a| {
            self.node_ids()
                .filter(|&b| b != a)
                .all(|b| self.edge_between(a, b).is_some() || self.edge_between(b, a).is_some())
        })
    }

    /// Two-colours the graph, ignoring edge direction. Returns `None` when an
    /// odd cycle (or a self-loop) makes that impossible.
    pub fn partite_sets(&self) -> Option<(Vec<NodeId>, Vec<NodeId>)> {
        let mut adjacency: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        for edge in &self.edges {
            adjacency[edge.source.0].push(edge.target);
            adjacency[edge.target.0].push(edge.source);
        }

        let mut side: Vec<Option<bool>> = vec![None; self.nodes.len()];
        for start in self.node_ids() {
            if side[start.0].is_some() {
                continue;
            }
            side[start.0] = Some(false);
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                let colour = side[current.0] == Some(true);
                for &next in &adjacency[current.0] {
                    match side[next.0] {
                        None => {
                            side[next.0] = Some(!colour);
                            queue.push_back(next);
                        }
                        Some(c) if c == colour => return None,
                        Some(_) => {}
                    }
                }
            }
        }

        let (left, right): (Vec<NodeId>, Vec<NodeId>) =
            self.node_ids().partition(|id| side[id.0] != Some(true));
        Some((left, right))
    }

    /// Bipartite when two-colourable with both partite sets non-empty.
    pub fn is_bipartite(&self) -> bool {
        matches!(self.partite_sets(), Some((a, b)) if !a.is_empty() && !b.is_empty())
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut labels = self.node_list();
        labels.sort_unstable();
        let mut edges: Vec<String> = self
            .edge_list()
            .into_iter()
            .map(|(s, t, w, d)| format!("[{}, {}, {}]:{}", s, t, w, if d { "D" } else { "U" }))
            .collect();
        edges.sort();
        write!(
            f,
            "{}\n|V|: {} |E|: {}\nV: [{}]\nE: [{}]",
            self.name,
            self.node_count(),
            self.edge_count(),
            labels.join(", "),
            edges.join(", ")
        )
    }
}
