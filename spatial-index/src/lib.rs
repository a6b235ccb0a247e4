//! # Spatial Index - stream-resident quadtree and R-tree
//!
//! Two write-once, read-many spatial indexes that live in a seekable byte
//! stream. Records are inserted once, the structure is serialized in a single
//! pass, and later window queries read back only the nodes they touch.
//!
//! ## Features
//!
//! - **Region quadtree** for points: grows upward when points fall outside
//!   the root, subdivides buckets downward, keeps an overflow list once fully
//!   grown
//! - **R-tree** for bounding boxes: Guttman insertion with quadratic split
//! - **Lazy search**: stack-based iterators that seek and decode one node at
//!   a time and drop it once consumed
//! - **Plain binary layout**: fixed-width big-endian fields with embedded
//!   byte offsets, no compression
//!
//! ## Quadtree
//!
//! ```rust
//! use spatial_index::{Extent, PointData, QuadTreeReader, QuadTreeWriter};
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), spatial_index::SpatialError> {
//! let mut writer = QuadTreeWriter::new(Vec::new(), 32, &Extent::new(0.0, 0.0, 100.0, 100.0))?;
//! for i in 0..1000 {
//!     writer.add_point(PointData::new((i % 100) as f64, (i / 10) as f64, i))?;
//! }
//! let bytes = writer.finish()?;
//!
//! let mut reader = QuadTreeReader::new(Cursor::new(bytes))?;
//! let mut hits = 0;
//! for point in reader.search(&Extent::new(10.0, 10.0, 20.0, 20.0)) {
//!     let point = point?;
//!     assert!(point.x >= 10.0 && point.x <= 20.0);
//!     hits += 1;
//! }
//! assert!(hits > 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## R-Tree
//!
//! ```rust
//! use spatial_index::{Extent, MBRHandle, RTreeReader, RTreeWriter, SpatialReader};
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), spatial_index::SpatialError> {
//! let mut writer = RTreeWriter::new(Vec::new(), 10, 20)?;
//! writer.add(MBRHandle::new(Extent::new(0.0, 0.0, 10.0, 10.0), 1))?;
//! writer.add(MBRHandle::new(Extent::new(20.0, 20.0, 30.0, 30.0), 2))?;
//! let bytes = writer.finish()?;
//!
//! let mut reader = RTreeReader::new(Cursor::new(bytes))?;
//! let found = reader.collect_extent(&Extent::new(5.0, 5.0, 15.0, 15.0))?;
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].handle, 1);
//! # Ok(())
//! # }
//! ```

pub mod data_stream;
pub mod extent;
pub mod index_config;
pub mod index_constants;
pub mod index_types;
pub mod quadtree;
pub mod rtree;
pub mod spatial_reader;

pub use extent::Extent;
pub use index_config::{QuadTreeConfig, RTreeConfig};
pub use index_types::{MBRHandle, PointData, RTreeData, RecordHandle, SpatialError, SpatialResult};
pub use quadtree::{NodeVisit, QuadTree, QuadTreeNode, QuadTreeReader, QuadTreeWriter, SearchIter};
pub use rtree::{RTree, RTreeIter, RTreeNode, RTreeReader, RTreeWriter, StoredNode};
pub use spatial_reader::SpatialReader;
