//! Read side of the R-tree.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::data_stream::{current_position, open_index_file, IndexRead};
use crate::extent::Extent;
use crate::index_config::RTreeConfig;
use crate::index_types::{MBRHandle, SpatialError, SpatialResult};
use crate::spatial_reader::{drain_into, SpatialReader};

use super::rtree_iter::RTreeIter;
use super::rtree_node::StoredNode;

/// Searches an R-tree serialized by [`RTreeWriter`](super::RTreeWriter).
///
/// Opening reads the two-integer header only; the root node starts right
/// after it. Nodes are read one seek at a time while a search runs.
pub struct RTreeReader<R: Read + Seek> {
    stream: R,
    config: RTreeConfig,
    root_handle: u64,
}

impl<R: Read + Seek> RTreeReader<R> {
    /// Reads the header at the stream's current position.
    pub fn new(mut stream: R) -> SpatialResult<Self> {
        let low = stream.read_count()?;
        let high = stream.read_count()?;
        let config = RTreeConfig::new(low, high);
        config
            .validate()
            .map_err(|e| SpatialError::Corrupt(format!("bad R-tree header: {}", e)))?;

        let root_handle = current_position(&mut stream)?;
        log::debug!(
            "opened R-tree: fan-out {}..{}, root at {}",
            low,
            high,
            root_handle
        );
        Ok(Self {
            stream,
            config,
            root_handle,
        })
    }

    /// Lazily iterates the data handles whose box is not disjoint from `extent`.
    pub fn search(&mut self, extent: &Extent) -> RTreeIter<'_, R> {
        RTreeIter::new(&mut self.stream, *extent, self.root_handle)
    }

    /// Reads the full node record at `handle`.
    pub fn read_node(&mut self, handle: u64) -> SpatialResult<StoredNode> {
        StoredNode::read_at(&mut self.stream, handle, |_| true)
    }

    /// Absolute offset of the root node.
    pub fn root_handle(&self) -> u64 {
        self.root_handle
    }

    /// Fan-out settings stored in the header.
    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    pub fn into_inner(self) -> R {
        self.stream
    }
}

impl RTreeReader<BufReader<File>> {
    /// Opens an R-tree index file.
    pub fn open(path: impl AsRef<Path>) -> SpatialResult<Self> {
        log::debug!("opening R-tree index at {:?}", path.as_ref());
        Self::new(open_index_file(path.as_ref())?)
    }
}

impl<R: Read + Seek> SpatialReader for RTreeReader<R> {
    type Record = MBRHandle;

    fn search_each(
        &mut self,
        extent: &Extent,
        f: &mut dyn FnMut(MBRHandle),
    ) -> SpatialResult<usize> {
        drain_into(self.search(extent), f)
    }
}
