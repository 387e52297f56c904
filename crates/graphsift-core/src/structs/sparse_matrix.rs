use std::cmp::Ordering;
use std::collections::BinaryHeap;

use graphsift_common::{snapped_cmp, GraphError, Result};

use super::search_tree::SearchTree;

/// Heap entry ordered by value snapped to the epsilon grid, then by smaller
/// column.
#[derive(Debug, Clone, Copy)]
pub struct HeapEntry {
    pub column: usize,
    pub value: f64,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        snapped_cmp(self.value, other.value).then_with(|| other.column.cmp(&self.column))
    }
}

#[derive(Debug, Clone, Default)]
struct Row {
    heap: BinaryHeap<HeapEntry>,
    tree: SearchTree,
    /// The tree was edited without touching the heap.
    dirty: bool,
}

/// Square sparse matrix whose rows keep a value-ordered heap and a
/// column-ordered tree over the same `(column, value)` entries.
///
/// `set`, `add` and `remove` keep both halves in step immediately. `adjust`
/// and `merge_trees` touch only the tree and leave the heap to be rebuilt,
/// which happens on the next `get_max` at the latest.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    rows: Vec<Row>,
}

impl SparseMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            rows: vec![Row::default(); size],
        }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    fn row(&self, i: usize) -> Result<&Row> {
        self.rows
            .get(i)
            .ok_or_else(|| GraphError::invariant(format!("sparse matrix row {} out of range", i)))
    }

    fn row_mut(&mut self, i: usize) -> Result<&mut Row> {
        self.rows
            .get_mut(i)
            .ok_or_else(|| GraphError::invariant(format!("sparse matrix row {} out of range", i)))
    }

    /// Inserts a new entry. The column must not already be present.
    pub fn add(&mut self, i: usize, j: usize, value: f64) -> Result<()> {
        let row = self.row_mut(i)?;
        if row.tree.contains(j) {
            return Err(GraphError::invariant(format!("entry ({}, {}) already present", i, j)));
        }
        row.tree.insert(j, value);
        if !row.dirty {
            row.heap.push(HeapEntry { column: j, value });
        }
        Ok(())
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.rows.get(i)?.tree.get(j)
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.get(i, j).is_some()
    }

    /// Updates or inserts an entry. The heap is reconciled by popping until
    /// the stale entry surfaces and pushing everything back.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<()> {
        let row = self.row_mut(i)?;
        let existed = row.tree.contains(j);
        row.tree.set(j, value);
        if row.dirty {
            return Ok(());
        }
        if existed {
            let mut held = Vec::new();
            let mut found = false;
            while let Some(entry) = row.heap.pop() {
                if entry.column == j {
                    found = true;
                    break;
                }
                held.push(entry);
            }
            row.heap.extend(held);
            if !found {
                return Err(GraphError::invariant(format!(
                    "entry ({}, {}) present in tree but missing from heap",
                    i, j
                )));
            }
        }
        row.heap.push(HeapEntry { column: j, value });
        Ok(())
    }

    pub fn remove(&mut self, i: usize, j: usize) -> Result<Option<f64>> {
        let row = self.row_mut(i)?;
        let removed = row.tree.remove(j);
        if removed.is_some() && !row.dirty {
            row.heap.retain(|e| e.column != j);
        }
        Ok(removed)
    }

    /// Adds `delta` to an existing entry, deferring the heap update.
    pub fn adjust(&mut self, i: usize, j: usize, delta: f64) -> Result<()> {
        let row = self.row_mut(i)?;
        if !row.tree.adjust(j, delta) {
            return Err(GraphError::invariant(format!("entry ({}, {}) missing", i, j)));
        }
        row.dirty = true;
        Ok(())
    }

    /// Folds row `i`'s tree into row `j`'s, summing shared columns and
    /// skipping column `j` itself. Row `i` is left untouched; row `j`'s heap
    /// is stale until rebuilt.
    pub fn merge_trees(&mut self, j: usize, i: usize) -> Result<()> {
        if i == j {
            return Err(GraphError::invariant(format!("cannot merge row {} into itself", i)));
        }
        let absorbed: Vec<(usize, f64)> = self.row(i)?.tree.iter().filter(|&(k, _)| k != j).collect();
        let target = self.row_mut(j)?;
        for (k, value) in absorbed {
            target.tree.insert(k, value);
        }
        target.dirty = true;
        Ok(())
    }

    pub fn rebuild_heap(&mut self, i: usize) -> Result<()> {
        let row = self.row_mut(i)?;
        row.heap = row
            .tree
            .iter()
            .map(|(column, value)| HeapEntry { column, value })
            .collect();
        row.dirty = false;
        Ok(())
    }

    /// Largest entry of row `i`, ties resolved towards the smaller column.
    pub fn get_max(&mut self, i: usize) -> Result<Option<(usize, f64)>> {
        if self.row(i)?.dirty {
            self.rebuild_heap(i)?;
        }
        Ok(self.row(i)?.heap.peek().map(|e| (e.column, e.value)))
    }

    pub fn clear_row(&mut self, i: usize) -> Result<()> {
        let row = self.row_mut(i)?;
        row.heap.clear();
        row.tree.clear();
        row.dirty = false;
        Ok(())
    }

    pub fn row_len(&self, i: usize) -> usize {
        self.rows.get(i).map_or(0, |r| r.tree.len())
    }

    /// Entries of row `i` in column order.
    pub fn entries(&self, i: usize) -> Vec<(usize, f64)> {
        self.rows.get(i).map_or_else(Vec::new, |r| r.tree.iter().collect())
    }

    pub fn columns(&self, i: usize) -> Vec<usize> {
        self.rows.get(i).map_or_else(Vec::new, |r| r.tree.keys().collect())
    }

    /// Verifies that row `i`'s heap and tree hold the same entries.
    pub fn check_row(&self, i: usize) -> Result<()> {
        let row = self.row(i)?;
        if row.dirty {
            return Err(GraphError::invariant(format!("row {} has a stale heap", i)));
        }
        let mut from_heap: Vec<(usize, f64)> = row.heap.iter().map(|e| (e.column, e.value)).collect();
        from_heap.sort_by_key(|&(column, _)| column);
        let from_tree: Vec<(usize, f64)> = row.tree.iter().collect();
        if from_heap != from_tree {
            return Err(GraphError::invariant(format!(
                "row {} heap {:?} differs from tree {:?}",
                i, from_heap, from_tree
            )));
        }
        if let (Some(top), Some(best)) = (row.heap.peek(), row.tree.max_entry()) {
            if top.column != best.0 {
                return Err(GraphError::invariant(format!(
                    "row {} heap top column {} but tree maximum at column {}",
                    i, top.column, best.0
                )));
            }
        }
        Ok(())
    }

    pub fn check(&self) -> Result<()> {
        (0..self.rows.len()).try_for_each(|i| self.check_row(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_entry_ordering() {
        let a = HeapEntry { column: 2, value: 0.5 };
        let b = HeapEntry { column: 1, value: 0.5 + 1e-16 };
        let c = HeapEntry { column: 0, value: 0.25 };
        assert!(b > a);
        assert!(a > c);
        let mut heap: BinaryHeap<HeapEntry> = [a, b, c].into_iter().collect();
        assert_eq!(heap.pop().map(|e| e.column), Some(1));
    }

    #[test]
    fn test_heap_order_is_transitive_on_near_values() {
        // neighbours differ by less than the tolerance, the ends by more
        let entries: Vec<HeapEntry> = (0..6)
            .map(|i| HeapEntry {
                column: 5 - i,
                value: 0.75 + i as f64 * 0.7e-14,
            })
            .collect();
        for a in &entries {
            for b in &entries {
                for c in &entries {
                    if a >= b && b >= c {
                        assert!(a >= c);
                    }
                }
            }
        }

        let mut shuffled = entries.clone();
        shuffled.reverse();
        shuffled.swap(1, 4);
        let mut heap: BinaryHeap<HeapEntry> = shuffled.into_iter().collect();
        let mut popped = Vec::new();
        while let Some(entry) = heap.pop() {
            popped.push(entry);
        }
        assert!(popped.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(popped[0].column, 0);
    }

    #[test]
    fn test_tree_max_agrees_with_heap_top() {
        let mut m = SparseMatrix::new(1);
        for (column, value) in [(4, 0.5), (2, 0.5 + 0.4e-14), (6, 0.5 + 0.9e-14)] {
            m.add(0, column, value).unwrap();
        }
        m.check_row(0).unwrap();
        assert_eq!(m.get_max(0).unwrap().map(|(c, _)| c), Some(6));
    }

    #[test]
    fn test_add_set_remove_keep_halves_in_step() {
        let mut m = SparseMatrix::new(3);
        m.add(0, 1, 0.2).unwrap();
        m.add(0, 2, 0.4).unwrap();
        assert!(m.add(0, 2, 1.0).is_err());
        assert_eq!(m.get_max(0).unwrap(), Some((2, 0.4)));

        m.set(0, 1, 0.9).unwrap();
        m.check_row(0).unwrap();
        assert_eq!(m.get_max(0).unwrap(), Some((1, 0.9)));

        m.set(0, 0, 0.1).unwrap();
        assert_eq!(m.row_len(0), 3);
        assert_eq!(m.remove(0, 1).unwrap(), Some(0.9));
        assert_eq!(m.remove(0, 1).unwrap(), None);
        m.check_row(0).unwrap();
        assert_eq!(m.get_max(0).unwrap(), Some((2, 0.4)));
    }

    #[test]
    fn test_adjust_is_lazy_until_get_max() {
        let mut m = SparseMatrix::new(2);
        m.add(1, 0, 0.5).unwrap();
        m.adjust(1, 0, -0.25).unwrap();
        assert!(m.check_row(1).is_err());
        assert_eq!(m.get_max(1).unwrap(), Some((0, 0.25)));
        m.check_row(1).unwrap();
        assert!(m.adjust(1, 1, 1.0).is_err());
    }

    #[test]
    fn test_merge_trees_sums_and_skips_target() {
        let mut m = SparseMatrix::new(4);
        // row 0: {1: 0.1, 2: 0.2}; row 1: {0: 0.1, 2: 0.3, 3: 0.05}
        m.add(0, 1, 0.1).unwrap();
        m.add(0, 2, 0.2).unwrap();
        m.add(1, 0, 0.1).unwrap();
        m.add(1, 2, 0.3).unwrap();
        m.add(1, 3, 0.05).unwrap();

        m.remove(0, 1).unwrap();
        m.merge_trees(0, 1).unwrap();
        m.rebuild_heap(0).unwrap();
        m.check().unwrap_or_else(|e| panic!("{}", e));

        let merged = m.entries(0);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].0, 2);
        assert!((merged[0].1 - 0.5).abs() < 1e-12);
        assert_eq!(merged[1], (3, 0.05));
        assert!(m.merge_trees(2, 2).is_err());
    }

    #[test]
    fn test_ties_prefer_smaller_column() {
        let mut m = SparseMatrix::new(1);
        for column in [7, 3, 5] {
            m.add(0, column, 1.0).unwrap();
        }
        assert_eq!(m.get_max(0).unwrap(), Some((3, 1.0)));
        m.clear_row(0).unwrap();
        assert_eq!(m.get_max(0).unwrap(), None);
    }

    #[test]
    fn test_out_of_range_row() {
        let mut m = SparseMatrix::new(1);
        assert!(matches!(m.add(4, 0, 1.0), Err(GraphError::InvariantViolated(_))));
        assert_eq!(m.get(4, 0), None);
    }
}
