//! Stream-resident region quadtree for point data.
//!
//! The write path builds the tree in memory ([`QuadTreeWriter`]), then runs a
//! bottom-up size pass and a pre-order serialization pass. Each internal node
//! stores the byte length of its four child subtrees, which lets the read path
//! ([`QuadTreeReader`]) seek straight to any child without an offset table.
//!
//! Layout (all big-endian):
//!
//! ```text
//! header: bucket_size i32 | root_level i32 | maximum_level i32 | minimum_level i32
//!         root_width f64 | root_min (x, y) f64 | root_max (x, y) f64
//!         overflow_count i32 | overflow points (x f64, y f64, address i64)...
//! node:   point_count i32 | points... | has_children bool
//!         [ four subtree lengths i64 | child 0 | child 1 | child 2 | child 3 ]
//! ```

mod quadtree_impl;
mod quadtree_node;
mod quadtree_reader;
mod quadtree_writer;
mod search_iter;

pub use quadtree_impl::QuadTree;
pub use quadtree_node::QuadTreeNode;
pub use quadtree_reader::{NodeVisit, QuadTreeReader};
pub use quadtree_writer::QuadTreeWriter;
pub use search_iter::SearchIter;
