//! Constants for the quadtree and R-tree indexes.

/// Level assigned to a freshly created quadtree root
pub const START_LEVEL: i32 = 16;

/// Buckets at this level are never subdivided
pub const MINIMUM_LEVEL: i32 = 0;

/// Once the root reaches this level, out-of-bounds points go to the overflow list
pub const MAXIMUM_LEVEL: i32 = 25;

/// Default quadtree bucket size before a leaf subdivides
pub const DEFAULT_BUCKET_SIZE: usize = 32;

/// Default intended minimum R-tree node fill (accepted, not enforced)
pub const DEFAULT_NODE_LOW_SIZE: usize = 10;

/// Default maximum R-tree node fill; reaching it triggers a split
pub const DEFAULT_NODE_HIGH_SIZE: usize = 20;

/// Tolerance used when re-checking cached extents during serialization
pub const EXTENT_TOLERANCE: f64 = 1e-6;

/// Serialized point triple: x (f64), y (f64), address (i64)
pub const POINT_RECORD_SIZE: u64 = 24;

/// Serialized R-tree entry: handle (i64) + extent (4 x f64)
pub const RTREE_ENTRY_SIZE: u64 = 40;

/// Serialized R-tree node header: leaf flag (bool) + entry count (i32)
pub const RTREE_NODE_HEADER_SIZE: u64 = 5;
