//! R-tree node types and their stream layout.

use std::io::{Read, Seek, Write};

use crate::data_stream::{seek_to, IndexRead, IndexWrite, PositionedWriter};
use crate::extent::Extent;
use crate::index_constants::{EXTENT_TOLERANCE, RTREE_ENTRY_SIZE, RTREE_NODE_HEADER_SIZE};
use crate::index_types::{MBRHandle, RTreeData, SpatialError, SpatialResult};

/// Entries of a node: data handles in a leaf, child nodes in an inner node.
#[derive(Debug, Clone)]
pub enum NodeEntries {
    Leaf(Vec<MBRHandle>),
    Inner(Vec<RTreeNode>),
}

/// A node of the in-memory R-tree.
///
/// The extent is kept as the union of the entries' extents on every insert.
/// The handle is the absolute byte offset the node is written at; it is only
/// meaningful after [`RTreeNode::calculate_handles`].
#[derive(Debug, Clone)]
pub struct RTreeNode {
    pub(crate) entries: NodeEntries,
    pub(crate) extent: Extent,
    pub(crate) handle: i64,
}

impl RTreeData for RTreeNode {
    fn extent(&self) -> &Extent {
        &self.extent
    }

    fn handle(&self) -> i64 {
        self.handle
    }
}

impl RTreeNode {
    pub fn new_leaf() -> Self {
        Self::leaf_from(Vec::new())
    }

    pub fn new_inner() -> Self {
        Self::inner_from(Vec::new())
    }

    pub(crate) fn leaf_from(entries: Vec<MBRHandle>) -> Self {
        Self {
            extent: union_extent(&entries),
            entries: NodeEntries::Leaf(entries),
            handle: 0,
        }
    }

    pub(crate) fn inner_from(children: Vec<RTreeNode>) -> Self {
        Self {
            extent: union_extent(&children),
            entries: NodeEntries::Inner(children),
            handle: 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.entries, NodeEntries::Leaf(_))
    }

    /// Number of entries (data handles or children).
    pub fn len(&self) -> usize {
        match &self.entries {
            NodeEntries::Leaf(items) => items.len(),
            NodeEntries::Inner(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> &NodeEntries {
        &self.entries
    }

    /// Data handles, if this is a leaf.
    pub fn leaf_entries(&self) -> Option<&[MBRHandle]> {
        match &self.entries {
            NodeEntries::Leaf(items) => Some(items),
            NodeEntries::Inner(_) => None,
        }
    }

    /// Child nodes, if this is an inner node.
    pub fn children(&self) -> Option<&[RTreeNode]> {
        match &self.entries {
            NodeEntries::Leaf(_) => None,
            NodeEntries::Inner(children) => Some(children),
        }
    }

    /// Adds a child to an inner node without any split check.
    pub(crate) fn push_child(&mut self, child: RTreeNode) -> SpatialResult<()> {
        match &mut self.entries {
            NodeEntries::Inner(children) => {
                self.extent.union_in_place(&child.extent);
                children.push(child);
                Ok(())
            }
            NodeEntries::Leaf(_) => Err(SpatialError::Consistency(
                "cannot add a child node to an R-tree leaf".into(),
            )),
        }
    }

    /// Levels from this node down to the leaves, this node included.
    pub fn height(&self) -> usize {
        match &self.entries {
            NodeEntries::Leaf(_) => 1,
            NodeEntries::Inner(children) => 1 + children.first().map_or(0, |c| c.height()),
        }
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match &self.entries {
            NodeEntries::Leaf(_) => 1,
            NodeEntries::Inner(children) => {
                1 + children.iter().map(|c| c.node_count()).sum::<usize>()
            }
        }
    }

    /// Union of the entries' extents, recomputed from scratch.
    pub(crate) fn computed_extent(&self) -> Extent {
        match &self.entries {
            NodeEntries::Leaf(items) => union_extent(items),
            NodeEntries::Inner(children) => union_extent(children),
        }
    }

    /// Assigns pre-order byte offsets starting at `start`.
    ///
    /// Returns the offset just past this subtree.
    pub(crate) fn calculate_handles(&mut self, start: u64) -> SpatialResult<u64> {
        self.handle = i64::try_from(start).map_err(|_| {
            SpatialError::Consistency(format!("node offset {} does not fit in i64", start))
        })?;
        let mut next = start + RTREE_ENTRY_SIZE * self.len() as u64 + RTREE_NODE_HEADER_SIZE;
        if let NodeEntries::Inner(children) = &mut self.entries {
            for child in children.iter_mut() {
                next = child.calculate_handles(next)?;
            }
        }
        Ok(next)
    }

    /// Writes this subtree pre-order.
    ///
    /// Every node must land exactly at its precomputed handle and its cached
    /// extent must still match its entries.
    pub(crate) fn write_to<W: Write>(&self, out: &mut PositionedWriter<W>) -> SpatialResult<()> {
        if out.position() as i64 != self.handle {
            return Err(SpatialError::Consistency(format!(
                "node handle {} written at position {}",
                self.handle,
                out.position()
            )));
        }

        let computed = self.computed_extent();
        if !(self.extent == computed || self.extent.is_equal(&computed, EXTENT_TOLERANCE)) {
            return Err(SpatialError::Consistency(format!(
                "cached node extent {} differs from entries {}",
                self.extent, computed
            )));
        }

        out.write_bool(self.is_leaf())?;
        out.write_count(self.len())?;
        match &self.entries {
            NodeEntries::Leaf(items) => write_entries(out, items)?,
            NodeEntries::Inner(children) => {
                write_entries(out, children)?;
                for child in children {
                    child.write_to(out)?;
                }
            }
        }
        Ok(())
    }
}

fn write_entries<W: Write, T: RTreeData>(out: &mut W, items: &[T]) -> SpatialResult<()> {
    for item in items {
        out.write_long(item.handle())?;
        out.write_extent(item.extent())?;
    }
    Ok(())
}

/// Union of the extents of `items`; the null extent when empty.
pub(crate) fn union_extent<T: RTreeData>(items: &[T]) -> Extent {
    let mut extent = Extent::NULL_EXTENT;
    for item in items {
        extent.union_in_place(item.extent());
    }
    extent
}

/// A node record as stored on the stream.
///
/// For inner nodes each entry's `handle` is the absolute offset of a child.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub is_leaf: bool,
    pub entries: Vec<MBRHandle>,
}

impl StoredNode {
    /// Reads the node record at `offset`, keeping the entries `keep` accepts.
    pub(crate) fn read_at<R, F>(input: &mut R, offset: u64, mut keep: F) -> SpatialResult<Self>
    where
        R: Read + Seek,
        F: FnMut(&Extent) -> bool,
    {
        seek_to(input, offset)?;
        let is_leaf = input.read_bool()?;
        let count = input.read_count()?;

        let mut entries = Vec::new();
        for _ in 0..count {
            let handle = input.read_long()?;
            let extent = input.read_extent()?;
            if keep(&extent) {
                entries.push(MBRHandle::new(extent, handle));
            }
        }
        Ok(Self { is_leaf, entries })
    }
}
