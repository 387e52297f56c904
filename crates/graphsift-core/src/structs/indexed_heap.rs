use std::collections::HashMap;
use std::hash::Hash;

/// Binary max-heap addressable by key, supporting in-place priority updates
/// and removal of arbitrary keys in `O(log n)`.
///
/// The greatest priority (by `Ord`) sits at the top. Wrap priorities in
/// [`std::cmp::Reverse`] or a custom ordering for min-heap behaviour.
#[derive(Debug, Clone)]
pub struct IndexedHeap<K, P> {
    entries: Vec<(K, P)>,
    positions: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone, P: Ord> Default for IndexedHeap<K, P> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, P: Ord> IndexedHeap<K, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&P> {
        self.positions.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn peek(&self) -> Option<(&K, &P)> {
        self.entries.first().map(|(k, p)| (k, p))
    }

    /// Inserts `key` or replaces its priority, returning the previous one.
    pub fn push_or_update(&mut self, key: K, priority: P) -> Option<P> {
        if let Some(&pos) = self.positions.get(&key) {
            let old = std::mem::replace(&mut self.entries[pos].1, priority);
            self.restore(pos);
            return Some(old);
        }
        let pos = self.entries.len();
        self.positions.insert(key.clone(), pos);
        self.entries.push((key, priority));
        self.sift_up(pos);
        None
    }

    /// Inserts `key`, or raises its priority if `priority` is greater than
    /// the current one. Returns whether the heap changed.
    pub fn push_if_better(&mut self, key: K, priority: P) -> bool {
        let better = match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1 < priority,
            None => true,
        };
        if better {
            self.push_or_update(key, priority);
        }
        better
    }

    pub fn pop(&mut self) -> Option<(K, P)> {
        self.remove_at(0)
    }

    pub fn remove(&mut self, key: &K) -> Option<P> {
        let pos = *self.positions.get(key)?;
        self.remove_at(pos).map(|(_, p)| p)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &P)> {
        self.entries.iter().map(|(k, p)| (k, p))
    }

    fn remove_at(&mut self, pos: usize) -> Option<(K, P)> {
        let last = self.entries.len().checked_sub(1)?;
        self.swap(pos, last);
        let (key, priority) = self.entries.pop()?;
        self.positions.remove(&key);
        if pos < self.entries.len() {
            self.restore(pos);
        }
        Some((key, priority))
    }

    fn restore(&mut self, pos: usize) {
        let pos = self.sift_up(pos);
        self.sift_down(pos);
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.entries.swap(a, b);
        self.positions.insert(self.entries[a].0.clone(), a);
        self.positions.insert(self.entries[b].0.clone(), b);
    }

    fn sift_up(&mut self, mut pos: usize) -> usize {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.entries[pos].1 <= self.entries[parent].1 {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
        pos
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut largest = pos;
            if left < len && self.entries[left].1 > self.entries[largest].1 {
                largest = left;
            }
            if right < len && self.entries[right].1 > self.entries[largest].1 {
                largest = right;
            }
            if largest == pos {
                break;
            }
            self.swap(pos, largest);
            pos = largest;
        }
    }
}
