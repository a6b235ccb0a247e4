//! Lazy extent search over a stream-backed R-tree.

use std::io::{Read, Seek};

use crate::extent::Extent;
use crate::index_types::{MBRHandle, SpatialError, SpatialResult};

use super::rtree_node::StoredNode;

/// Depth-first iterator over the data handles whose box touches an extent.
///
/// Only node offsets are kept on the stack; a node record is read when its
/// offset is popped and discarded once its matching entries are buffered.
/// Yields `Err` at most once; the iterator is exhausted after an error.
pub struct RTreeIter<'a, R: Read + Seek> {
    input: &'a mut R,
    query: Extent,
    nodes: Vec<u64>,
    found: Vec<MBRHandle>,
    failed: bool,
}

impl<'a, R: Read + Seek> RTreeIter<'a, R> {
    pub(crate) fn new(input: &'a mut R, query: Extent, root_handle: u64) -> Self {
        Self {
            input,
            query,
            nodes: vec![root_handle],
            found: Vec::new(),
            failed: false,
        }
    }

    /// The query window.
    pub fn extent(&self) -> &Extent {
        &self.query
    }

    fn visit(&mut self, handle: u64) -> SpatialResult<()> {
        let query = self.query;
        let node = StoredNode::read_at(&mut *self.input, handle, |e| !e.is_disjoint(&query))?;
        log::trace!(
            "read R-tree node at {}: leaf {}, {} matching entries",
            handle,
            node.is_leaf,
            node.entries.len()
        );

        if node.is_leaf {
            self.found.extend(node.entries);
        } else {
            for entry in node.entries {
                let child = u64::try_from(entry.handle).map_err(|_| {
                    SpatialError::Corrupt(format!(
                        "negative child offset {} in node at {}",
                        entry.handle, handle
                    ))
                })?;
                self.nodes.push(child);
            }
        }
        Ok(())
    }
}

impl<R: Read + Seek> Iterator for RTreeIter<'_, R> {
    type Item = SpatialResult<MBRHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(found) = self.found.pop() {
                return Some(Ok(found));
            }
            let handle = self.nodes.pop()?;
            if let Err(e) = self.visit(handle) {
                self.failed = true;
                self.nodes.clear();
                self.found.clear();
                return Some(Err(e));
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for RTreeIter<'_, R> {}
