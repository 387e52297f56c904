// Auxiliary ordered structures
//
// - DisjointSet: union-find over explicit groups (Kruskal)
// - IndexedHeap: keyed max-heap with decrease/increase-key (Prim, Brandes, fast-greedy)
// - SearchTree: AVL map from column to value
// - SparseMatrix: per-row heap + tree pairs (fast-greedy)

pub mod disjoint_set;
pub mod indexed_heap;
pub mod search_tree;
pub mod sparse_matrix;

pub use disjoint_set::DisjointSet;
pub use indexed_heap::IndexedHeap;
pub use search_tree::SearchTree;
pub use sparse_matrix::{HeapEntry, SparseMatrix};
