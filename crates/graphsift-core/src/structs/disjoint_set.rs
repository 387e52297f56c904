use std::collections::HashMap;
use std::hash::Hash;

use graphsift_common::{GraphError, Result};

/// Union-find over explicit groups.
///
/// Each partition is a `Vec` whose first element is the representative.
/// Merging appends the smaller group onto the larger one and vacates the
/// smaller group's slot by swapping in the last slot.
#[derive(Debug, Clone)]
pub struct DisjointSet<T> {
    groups: Vec<Vec<T>>,
    slot_of: HashMap<T, usize>,
}

impl<T: Hash + Eq + Clone> Default for DisjointSet<T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            slot_of: HashMap::new(),
        }
    }
}

impl<T: Hash + Eq + Clone> DisjointSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `element` as a singleton. Returns `false` if it was already known.
    pub fn make_set(&mut self, element: T) -> bool {
        if self.slot_of.contains_key(&element) {
            return false;
        }
        self.slot_of.insert(element.clone(), self.groups.len());
        self.groups.push(vec![element]);
        true
    }

    /// Representative of the partition holding `element`, or `None` if it
    /// was never added.
    pub fn find(&self, element: &T) -> Option<&T> {
        let slot = *self.slot_of.get(element)?;
        self.groups[slot].first()
    }

    pub fn contains(&self, element: &T) -> bool {
        self.slot_of.contains_key(element)
    }

    /// Unites the partitions of `a` and `b`. Returns `true` when two distinct
    /// partitions were merged; absent elements and already-joined pairs are a
    /// no-op.
    pub fn merge(&mut self, a: &T, b: &T) -> bool {
        let (Some(&sa), Some(&sb)) = (self.slot_of.get(a), self.slot_of.get(b)) else {
            return false;
        };
        if sa == sb {
            return false;
        }

        let (keep, gone) = if self.groups[sa].len() >= self.groups[sb].len() {
            (sa, sb)
        } else {
            (sb, sa)
        };

        let moved = std::mem::take(&mut self.groups[gone]);
        for element in &moved {
            self.slot_of.insert(element.clone(), keep);
        }
        self.groups[keep].extend(moved);

        let last = self.groups.len() - 1;
        self.groups.swap_remove(gone);
        if gone != last {
            // the former last group now lives in `gone`
            for element in &self.groups[gone] {
                self.slot_of.insert(element.clone(), gone);
            }
        }
        true
    }

    /// Whether `a` and `b` lie in different partitions. Fails if either
    /// element is unknown.
    pub fn disjoint_elements(&self, a: &T, b: &T) -> Result<bool> {
        let sa = self
            .slot_of
            .get(a)
            .ok_or_else(|| GraphError::invariant("disjoint-set element was never added"))?;
        let sb = self
            .slot_of
            .get(b)
            .ok_or_else(|| GraphError::invariant("disjoint-set element was never added"))?;
        Ok(sa != sb)
    }

    /// Number of partitions.
    pub fn size(&self) -> usize {
        self.groups.len()
    }

    pub fn element_count(&self) -> usize {
        self.slot_of.len()
    }

    pub fn partitions(&self) -> impl Iterator<Item = &[T]> {
        self.groups.iter().map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(n: usize) -> DisjointSet<usize> {
        let mut set = DisjointSet::new();
        for i in 0..n {
            assert!(set.make_set(i));
        }
        set
    }

    #[test]
    fn test_find_unknown_is_none() {
        let set = seeded(2);
        assert_eq!(set.find(&7), None);
        assert_eq!(set.find(&1), Some(&1));
    }

    #[test]
    fn test_merge_reduces_size_by_one() {
        let mut set = seeded(4);
        assert_eq!(set.size(), 4);
        assert!(set.merge(&0, &1));
        assert_eq!(set.size(), 3);
        assert!(!set.disjoint_elements(&0, &1).unwrap());
        assert!(set.disjoint_elements(&0, &2).unwrap());

        // already joined
        assert!(!set.merge(&1, &0));
        assert_eq!(set.size(), 3);

        // unknown element
        assert!(!set.merge(&1, &99));
        assert_eq!(set.size(), 3);
    }

    #[test]
    fn test_find_is_idempotent_and_shared() {
        let mut set = seeded(5);
        set.merge(&0, &1);
        set.merge(&2, &3);
        set.merge(&1, &3);
        let rep = *set.find(&3).unwrap();
        assert_eq!(set.find(&rep), Some(&rep));
        for i in 0..4 {
            assert_eq!(set.find(&i), Some(&rep));
        }
        assert_ne!(set.find(&4), Some(&rep));
        assert_eq!(set.size(), 2);
        assert_eq!(set.element_count(), 5);
    }

    #[test]
    fn test_swap_with_last_keeps_slots_consistent() {
        let mut set = seeded(6);
        // merging the first group vacates slot 0 and moves slot 5 into it
        set.merge(&1, &0);
        set.merge(&5, &4);
        set.merge(&2, &5);
        assert_eq!(set.size(), 3);
        assert!(!set.disjoint_elements(&2, &4).unwrap());
        assert!(set.disjoint_elements(&0, &3).unwrap());
        let total: usize = set.partitions().map(|p| p.len()).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_disjoint_elements_unknown_fails() {
        let set = seeded(1);
        assert!(matches!(
            set.disjoint_elements(&0, &3),
            Err(GraphError::InvariantViolated(_))
        ));
    }

    #[test]
    fn test_duplicate_make_set() {
        let mut set = seeded(1);
        assert!(!set.make_set(0));
        assert_eq!(set.size(), 1);
    }
}
