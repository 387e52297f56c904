// Greedy modularity optimisation (Clauset, Newman & Moore)
//
// Every node starts as its own community. Row `i` of the sparse matrix holds
// the modularity gain dQ_ij = 2 (e_ij - a_i a_j) of merging community `i`
// with each adjacent community `j`; a keyed heap holds the best entry of
// every row. Each step merges the globally best pair, folds the absorbed
// row into the surviving one and patches every affected neighbour.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::{Context, Result};
use graphsift_common::{approx_eq, snapped_cmp, Graph, NodeId, Progress};

use super::{CommunityOptions, CommunityResult, MergeStep, UndirectedView};
use crate::algorithm::Algorithm;
use crate::structs::{IndexedHeap, SparseMatrix};

/// Best gain in a row. Larger gains first, ties to the smaller row.
#[derive(Debug, Clone, Copy)]
struct RowMax {
    row: usize,
    column: usize,
    delta: f64,
}

impl PartialEq for RowMax {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RowMax {}

impl PartialOrd for RowMax {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RowMax {
    fn cmp(&self, other: &Self) -> Ordering {
        snapped_cmp(self.delta, other.delta).then_with(|| other.row.cmp(&self.row))
    }
}

/// Mutable state of one run.
struct Agglomeration {
    matrix: SparseMatrix,
    best: IndexedHeap<usize, RowMax>,
    a: Vec<f64>,
    modularity: f64,
}

impl Agglomeration {
    fn new(view: &UndirectedView) -> Result<Self> {
        let n = view.strength.len();
        let a: Vec<f64> = view.strength.iter().map(|k| k / view.m2).collect();

        let mut rows: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); n];
        for &(s, t, w) in &view.links {
            *rows[s].entry(t).or_default() += w / view.m2;
            *rows[t].entry(s).or_default() += w / view.m2;
        }

        let mut matrix = SparseMatrix::new(n);
        for (i, row) in rows.iter().enumerate() {
            for (&j, &e) in row {
                matrix.add(i, j, 2.0 * (e - a[i] * a[j]))?;
            }
        }

        let modularity = (0..n)
            .map(|i| 2.0 * view.loops[i] / view.m2 - a[i] * a[i])
            .sum();

        let mut state = Self {
            matrix,
            best: IndexedHeap::new(),
            a,
            modularity,
        };
        for i in 0..n {
            state.refresh(i)?;
        }
        Ok(state)
    }

    /// Re-reads row `i`'s maximum into the global heap.
    fn refresh(&mut self, i: usize) -> Result<()> {
        match self.matrix.get_max(i)? {
            Some((column, delta)) => {
                self.best.push_or_update(i, RowMax { row: i, column, delta });
            }
            None => {
                self.best.remove(&i);
            }
        }
        Ok(())
    }

    /// Merges the best pair. Returns `(absorbed, into, gain)`, or `None` when
    /// no two communities are adjacent.
    fn step(&mut self) -> Result<Option<(usize, usize, f64)>> {
        let Some((i, top)) = self.best.pop() else {
            return Ok(None);
        };
        let j = top.column;
        let (ai, aj) = (self.a[i], self.a[j]);

        let from_i: Vec<usize> = self.matrix.columns(i).into_iter().filter(|&k| k != j).collect();
        let from_j: Vec<usize> = self.matrix.columns(j).into_iter().filter(|&k| k != i).collect();

        self.matrix.remove(j, i)?;
        self.matrix.merge_trees(j, i)?;
        for &k in &from_i {
            if from_j.binary_search(&k).is_err() {
                self.matrix.adjust(j, k, -2.0 * aj * self.a[k])?;
            }
        }
        for &k in &from_j {
            if from_i.binary_search(&k).is_err() {
                self.matrix.adjust(j, k, -2.0 * ai * self.a[k])?;
            }
        }
        self.matrix.rebuild_heap(j)?;

        let mut touched = from_i;
        touched.extend(from_j);
        touched.sort_unstable();
        touched.dedup();
        for &k in &touched {
            let delta = self
                .matrix
                .get(j, k)
                .with_context(|| format!("merged row {} lost column {}", j, k))?;
            self.matrix.remove(k, i)?;
            self.matrix.set(k, j, delta)?;
            self.refresh(k)?;
        }

        self.matrix.clear_row(i)?;
        self.refresh(j)?;

        self.a[j] += ai;
        self.a[i] = 0.0;
        self.modularity += top.delta;
        Ok(Some((i, j, top.delta)))
    }
}

/// Fast greedy modularity community detection.
///
/// Merges until no adjacent communities remain and returns the partition with
/// the highest modularity seen along the way, preferring the earliest one on
/// ties.
#[derive(Debug, Clone, Default)]
pub struct FastGreedy {
    options: CommunityOptions,
}

impl FastGreedy {
    pub fn new(options: CommunityOptions) -> Self {
        Self { options }
    }

    pub fn from_bundle(bundle: &graphsift_common::ArgumentsBundle) -> Self {
        Self::new(CommunityOptions::from_bundle(bundle))
    }

    pub fn detect(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<CommunityResult> {
        let n = graph.node_count();
        let singletons: Vec<Vec<NodeId>> = graph.node_ids().map(|id| vec![id]).collect();

        let view = UndirectedView::new(graph, self.options.weighted);
        if view.m2 <= 0.0 {
            return Ok(CommunityResult::from_partition(graph, singletons, self.options.weighted, Vec::new()));
        }

        let mut state = Agglomeration::new(&view)?;
        tracing::debug!(
            "FastGreedy: {} nodes, {} links, initial modularity {:.6}",
            n,
            view.links.len(),
            state.modularity
        );

        let mut merges: Vec<MergeStep> = Vec::new();
        let mut best_q = state.modularity;
        let mut best_len = 0;
        let total_steps = n.saturating_sub(1);

        loop {
            progress.checkpoint()?;
            let Some((absorbed, into, delta)) = state.step()? else {
                break;
            };
            merges.push(MergeStep {
                absorbed: NodeId(absorbed),
                into: NodeId(into),
                delta,
            });
            if state.modularity > best_q && !approx_eq(state.modularity, best_q) {
                best_q = state.modularity;
                best_len = merges.len();
            }
            progress.report_ratio(merges.len(), total_steps)?;
        }

        tracing::debug!(
            "FastGreedy: {} merges performed, best modularity {:.6} after {}",
            merges.len(),
            best_q,
            best_len
        );

        merges.truncate(best_len);
        let mut members = singletons;
        for step in &merges {
            let moved = std::mem::take(&mut members[step.absorbed.index()]);
            members[step.into.index()].extend(moved);
        }
        Ok(CommunityResult::from_partition(graph, members, self.options.weighted, merges))
    }
}

impl Algorithm for FastGreedy {
    fn name(&self) -> &'static str {
        "FastGreedy"
    }

    fn process(&self, graph: &Graph, progress: &mut Progress<'_>) -> Result<Vec<Graph>> {
        if graph.is_empty() {
            return Ok(Vec::new());
        }
        tracing::info!("FastGreedy: searching {}", graph.name());

        let result = self.detect(graph, progress)?;
        progress.report(1.0)?;

        tracing::info!(
            "FastGreedy: {} communities, modularity {:.6}",
            result.num_communities,
            result.modularity
        );
        Ok(result.to_graphs(graph, self.name(), &self.options))
    }
}
