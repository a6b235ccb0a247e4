//! Stream-resident R-tree over bounding boxes.
//!
//! [`RTreeWriter`] builds the tree by Guttman insertion with quadratic split,
//! assigns every node its absolute byte offset in one pre-order pass, then
//! writes the nodes in that same order. [`RTreeReader`] needs nothing but the
//! header: a search seeks to a node, reads its entries and follows the child
//! offsets of those that touch the query.
//!
//! Layout (all big-endian):
//!
//! ```text
//! header: node_low_size i32 | node_high_size i32
//! node:   is_leaf bool | count i32 | count x (handle i64 | xmin ymin xmax ymax f64)
//! ```
//!
//! In a leaf `handle` is the caller's record handle; in an inner node it is
//! the absolute offset of the child node.

mod rtree_impl;
mod rtree_iter;
mod rtree_node;
mod rtree_reader;
mod rtree_split;
mod rtree_writer;

pub use rtree_impl::RTree;
pub use rtree_iter::RTreeIter;
pub use rtree_node::{NodeEntries, RTreeNode, StoredNode};
pub use rtree_reader::RTreeReader;
pub use rtree_writer::RTreeWriter;
