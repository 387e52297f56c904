use std::cmp::Ordering;

use graphsift_common::snapped_cmp;

type Link = Option<Box<TreeNode>>;

#[derive(Debug, Clone)]
struct TreeNode {
    key: usize,
    value: f64,
    height: i32,
    left: Link,
    right: Link,
}

impl TreeNode {
    fn leaf(key: usize, value: f64) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        })
    }
}

fn height(link: &Link) -> i32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn update(node: &mut TreeNode) {
    node.height = 1 + height(&node.left).max(height(&node.right));
}

fn balance_factor(node: &TreeNode) -> i32 {
    height(&node.left) - height(&node.right)
}

fn rotate_right(mut node: Box<TreeNode>) -> Box<TreeNode> {
    match node.left.take() {
        Some(mut pivot) => {
            node.left = pivot.right.take();
            update(&mut node);
            pivot.right = Some(node);
            update(&mut pivot);
            pivot
        }
        None => node,
    }
}

fn rotate_left(mut node: Box<TreeNode>) -> Box<TreeNode> {
    match node.right.take() {
        Some(mut pivot) => {
            node.right = pivot.left.take();
            update(&mut node);
            pivot.left = Some(node);
            update(&mut pivot);
            pivot
        }
        None => node,
    }
}

fn rebalance(mut node: Box<TreeNode>) -> Box<TreeNode> {
    update(&mut node);
    let bf = balance_factor(&node);
    if bf > 1 {
        if node.left.as_deref().map_or(0, balance_factor) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if bf < -1 {
        if node.right.as_deref().map_or(0, balance_factor) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

/// Inserts `key`, combining with an existing value through `combine`.
/// The flag reports whether a new key was created.
fn insert(link: Link, key: usize, value: f64, combine: fn(f64, f64) -> f64) -> (Box<TreeNode>, bool) {
    match link {
        None => (TreeNode::leaf(key, value), true),
        Some(mut node) => {
            let created = match key.cmp(&node.key) {
                Ordering::Less => {
                    let (child, created) = insert(node.left.take(), key, value, combine);
                    node.left = Some(child);
                    created
                }
                Ordering::Greater => {
                    let (child, created) = insert(node.right.take(), key, value, combine);
                    node.right = Some(child);
                    created
                }
                Ordering::Equal => {
                    node.value = combine(node.value, value);
                    false
                }
            };
            (rebalance(node), created)
        }
    }
}

fn take_min(mut node: Box<TreeNode>) -> (Link, Box<TreeNode>) {
    match node.left.take() {
        None => (node.right.take(), node),
        Some(left) => {
            let (rest, min) = take_min(left);
            node.left = rest;
            (Some(rebalance(node)), min)
        }
    }
}

fn remove(link: Link, key: usize) -> (Link, Option<f64>) {
    let Some(mut node) = link else {
        return (None, None);
    };
    match key.cmp(&node.key) {
        Ordering::Less => {
            let (child, removed) = remove(node.left.take(), key);
            node.left = child;
            (Some(rebalance(node)), removed)
        }
        Ordering::Greater => {
            let (child, removed) = remove(node.right.take(), key);
            node.right = child;
            (Some(rebalance(node)), removed)
        }
        Ordering::Equal => {
            let value = node.value;
            let replacement = match (node.left.take(), node.right.take()) {
                (None, None) => None,
                (Some(only), None) | (None, Some(only)) => Some(only),
                (Some(left), Some(right)) => {
                    let (rest, mut successor) = take_min(right);
                    successor.left = Some(left);
                    successor.right = rest;
                    Some(rebalance(successor))
                }
            };
            (replacement, Some(value))
        }
    }
}

/// AVL tree from column index to value, used as the column-ordered half of a
/// sparse matrix row.
#[derive(Debug, Clone, Default)]
pub struct SearchTree {
    root: Link,
    len: usize,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `key`; an existing value for the same key is summed with
    /// `value`.
    pub fn insert(&mut self, key: usize, value: f64) {
        self.upsert(key, value, |old, new| old + new);
    }

    /// Inserts or overwrites.
    pub fn set(&mut self, key: usize, value: f64) {
        self.upsert(key, value, |_, new| new);
    }

    fn upsert(&mut self, key: usize, value: f64, combine: fn(f64, f64) -> f64) {
        let (root, created) = insert(self.root.take(), key, value, combine);
        self.root = Some(root);
        if created {
            self.len += 1;
        }
    }

    pub fn get(&self, key: usize) -> Option<f64> {
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node.value),
            };
        }
        None
    }

    pub fn contains(&self, key: usize) -> bool {
        self.get(key).is_some()
    }

    /// Adds `delta` to an existing entry. Returns `false` if `key` is absent.
    pub fn adjust(&mut self, key: usize, delta: f64) -> bool {
        let mut cursor = self.root.as_deref_mut();
        while let Some(node) = cursor {
            cursor = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
                Ordering::Equal => {
                    node.value += delta;
                    return true;
                }
            };
        }
        false
    }

    pub fn remove(&mut self, key: usize) -> Option<f64> {
        let (root, removed) = remove(self.root.take(), key);
        self.root = root;
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Entry with the largest value; ties go to the smallest key.
    pub fn max_entry(&self) -> Option<(usize, f64)> {
        self.iter().fold(None, |best, (k, v)| match best {
            Some((_, bv)) if snapped_cmp(v, bv) != Ordering::Greater => best,
            _ => Some((k, v)),
        })
    }

    /// Folds every entry of `other` into `self`, summing values of shared
    /// keys.
    pub fn merge(&mut self, other: &SearchTree) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    pub fn height(&self) -> i32 {
        height(&self.root)
    }
}

pub struct Iter<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iter<'a> {
    fn push_left(&mut self, mut cursor: Option<&'a TreeNode>) {
        while let Some(node) = cursor {
            self.stack.push(node);
            cursor = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some((node.key, node.value))
    }
}
