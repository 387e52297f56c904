//! Maximum cliques and bicliques (Bron–Kerbosch with pivoting).

use std::collections::BTreeSet;

use anyhow::Result;
use graphsift_common::{ArgumentsBundle, Graph, NodeId, Progress};

use crate::algorithm::Algorithm;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliqueOptions {
    /// Look for complete bipartite subgraphs of a bipartite graph instead.
    pub bipartite: bool,
}

impl CliqueOptions {
    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self {
            bipartite: bundle.bipartite(),
        }
    }
}

/// Neighbour sets over label ranks, so every set iterates in label order.
struct RankedAdjacency {
    ids: Vec<NodeId>,
    neighbours: Vec<BTreeSet<usize>>,
}

impl RankedAdjacency {
    /// Adjacency ignoring direction and self-loops.
    fn new(graph: &Graph) -> Self {
        let ids = graph.sorted_node_ids();
        let mut rank = vec![0; graph.node_count()];
        for (r, id) in ids.iter().enumerate() {
            rank[id.index()] = r;
        }
        let mut neighbours = vec![BTreeSet::new(); ids.len()];
        for edge in graph.edges().iter().filter(|e| !e.is_loop()) {
            let (s, t) = (rank[edge.source().index()], rank[edge.target().index()]);
            neighbours[s].insert(t);
            neighbours[t].insert(s);
        }
        Self { ids, neighbours }
    }

    /// Joins every pair inside `side`.
    fn complete(&mut self, side: &[usize]) {
        for (i, &a) in side.iter().enumerate() {
            for &b in &side[i + 1..] {
                self.neighbours[a].insert(b);
                self.neighbours[b].insert(a);
            }
        }
    }

    /// Every maximal clique, as label ranks in ascending order.
    fn maximal_cliques(&self, progress: &mut Progress<'_>) -> Result<Vec<Vec<usize>>> {
        let mut found = Vec::new();
        let candidates: BTreeSet<usize> = (0..self.ids.len()).collect();
        self.expand(&mut Vec::new(), candidates, BTreeSet::new(), &mut found, progress)?;
        Ok(found)
    }

    fn expand(
        &self,
        clique: &mut Vec<usize>,
        mut candidates: BTreeSet<usize>,
        mut excluded: BTreeSet<usize>,
        found: &mut Vec<Vec<usize>>,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        progress.checkpoint()?;
        if candidates.is_empty() {
            if excluded.is_empty() {
                let mut members = clique.clone();
                members.sort_unstable();
                found.push(members);
            }
            return Ok(());
        }

        // pivot on the node with most neighbours among the candidates
        let mut pivot = None;
        let mut best = 0;
        for &u in candidates.iter().chain(excluded.iter()) {
            let reach = self.neighbours[u].intersection(&candidates).count();
            if pivot.is_none() || reach > best {
                pivot = Some(u);
                best = reach;
            }
        }
        let branches: Vec<usize> = match pivot {
            Some(p) => candidates.difference(&self.neighbours[p]).copied().collect(),
            None => Vec::new(),
        };

        for v in branches {
            let adjacent = &self.neighbours[v];
            clique.push(v);
            self.expand(
                clique,
                candidates.intersection(adjacent).copied().collect(),
                excluded.intersection(adjacent).copied().collect(),
                found,
                progress,
            )?;
            clique.pop();
            candidates.remove(&v);
            excluded.insert(v);
        }
        Ok(())
    }

    fn to_ids(&self, ranks: &[usize]) -> Vec<NodeId> {
        ranks.iter().map(|&r| self.ids[r]).collect()
    }
}

/// Keeps only the largest node sets.
fn largest(sets: Vec<Vec<NodeId>>) -> Vec<Vec<NodeId>> {
    let top = sets.iter().map(Vec::len).max().unwrap_or(0);
    sets.into_iter().filter(|s| s.len() == top).collect()
}

/// Finds the maximum cliques of a graph, or its maximum bicliques.
///
/// Edge direction is ignored. Bicliques are found by completing both partite
/// sets, running the clique search and dropping the artificial edges again;
/// a non-bipartite graph has none.
#[derive(Debug, Clone, Default)]
pub struct BronKerbosch {
    options: CliqueOptions,
}

impl BronKerbosch {
    pub fn new(options: CliqueOptions) -> Self {
        Self { options }
    }

    pub fn from_bundle(bundle: &ArgumentsBundle) -> Self {
        Self::new(CliqueOptions::from_bundle(bundle))
    }

    /// Every maximal clique, members in label order.
    pub fn maximal_cliques(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Vec<NodeId>>> {
        let adjacency = RankedAdjacency::new(graph);
        let cliques = adjacency.maximal_cliques(progress)?;
        Ok(cliques.iter().map(|c| adjacency.to_ids(c)).collect())
    }

    /// Every maximal biclique with at least one real edge, or a lone node.
    pub fn maximal_bicliques(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Vec<NodeId>>> {
        let Some((left, right)) = graph.partite_sets() else {
            return Ok(Vec::new());
        };
        if left.is_empty() || right.is_empty() {
            return Ok(Vec::new());
        }

        let mut adjacency = RankedAdjacency::new(graph);
        let mut rank = vec![0; graph.node_count()];
        for (r, id) in adjacency.ids.iter().enumerate() {
            rank[id.index()] = r;
        }
        let side = |ids: &[NodeId]| ids.iter().map(|id| rank[id.index()]).collect::<Vec<_>>();
        adjacency.complete(&side(&left));
        adjacency.complete(&side(&right));

        let mut bicliques = Vec::new();
        for ranks in adjacency.maximal_cliques(progress)? {
            let members = adjacency.to_ids(&ranks);
            let sub = graph.induced_subgraph("biclique", &members);
            // only artificial edges held these together
            if members.len() > 1 && sub.edge_count() == 0 {
                continue;
            }
            bicliques.push(members);
        }
        Ok(bicliques)
    }
}

impl Algorithm for BronKerbosch {
    fn name(&self) -> &'static str {
        "BronKerbosch"
    }

    fn process(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Graph>> {
        if graph.node_count() <= 1 {
            return Ok(Vec::new());
        }
        let kind = if self.options.bipartite { "Biclique" } else { "Clique" };
        tracing::info!("BronKerbosch: searching {} for maximum {}s", graph.name(), kind.to_lowercase());
        progress.report(0.0)?;

        let candidates = if self.options.bipartite {
            self.maximal_bicliques(graph, progress)?
        } else {
            self.maximal_cliques(graph, progress)?
        };
        let found = candidates.len();
        let graphs: Vec<Graph> = largest(candidates)
            .iter()
            .enumerate()
            .map(|(i, members)| graph.induced_subgraph(format!("{} Maximum {} {}", graph.name(), kind, i + 1), members))
            .collect();
        progress.report(1.0)?;

        tracing::info!(
            "BronKerbosch: {} maximal, {} maximum {}(s)",
            found,
            graphs.len(),
            kind.to_lowercase()
        );
        Ok(graphs)
    }
}
