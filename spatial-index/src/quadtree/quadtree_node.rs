//! Quadtree node: a bucket of points plus an optional set of four children.
//!
//! Quadrant order is fixed everywhere (insertion, layout, search):
//! `0 = (low x, low y)`, `1 = (low x, high y)`, `2 = (high x, low y)`,
//! `3 = (high x, high y)`.

use std::io::{Read, Seek, Write};

use crate::data_stream::{current_position, seek_to, IndexRead, IndexWrite};
use crate::index_constants::POINT_RECORD_SIZE;
use crate::index_types::{PointData, SpatialError, SpatialResult};

/// Bytes of a node record without children: flag + count
const LEAF_RECORD_OVERHEAD: u64 = 1 + 4;

/// Bytes of a node record with children: flag + four subtree lengths + count
const INTERNAL_RECORD_OVERHEAD: u64 = 1 + 4 * 8 + 4;

/// Child state of a node.
#[derive(Debug, Clone)]
pub(crate) enum Children {
    /// A leaf.
    None,
    /// Read from a stream but not yet expanded: absolute child offsets.
    Deferred([u64; 4]),
    /// Materialized children.
    Loaded(Box<[QuadTreeNode; 4]>),
}

/// A node of the region quadtree.
///
/// Write-side nodes are built by insertion and always have `Loaded` children;
/// read-side nodes start out `Deferred` and are expanded by the search and
/// visitor drivers, which drop them again once consumed.
#[derive(Debug, Clone)]
pub struct QuadTreeNode {
    data: Vec<PointData>,
    children: Children,
    /// Serialized size of this node and everything below; set by `measure`.
    subtree_size: u64,
}

impl Default for QuadTreeNode {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadTreeNode {
    /// Creates an empty leaf.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            children: Children::None,
            subtree_size: 0,
        }
    }

    pub(crate) fn with_children(children: [QuadTreeNode; 4]) -> Self {
        Self {
            data: Vec::new(),
            children: Children::Loaded(Box::new(children)),
            subtree_size: 0,
        }
    }

    /// Points stored directly at this node.
    pub fn data(&self) -> &[PointData] {
        &self.data
    }

    /// True when the node has no children (loaded or deferred).
    pub fn is_leaf(&self) -> bool {
        matches!(self.children, Children::None)
    }

    /// Loaded children, if any.
    pub fn children(&self) -> Option<&[QuadTreeNode; 4]> {
        match &self.children {
            Children::Loaded(children) => Some(children),
            _ => None,
        }
    }

    /// Inserts a point into the subtree rooted at this node.
    ///
    /// `(x, y)` is the lower-left corner of the node square, `width` its side
    /// and `level` its level. A leaf whose bucket grows past `bucket_size`
    /// while above `minimum_level` is split once into four children.
    pub(crate) fn add_point(
        &mut self,
        point: PointData,
        x: f64,
        y: f64,
        width: f64,
        level: i32,
        bucket_size: usize,
        minimum_level: i32,
    ) -> SpatialResult<()> {
        let half = width * 0.5;
        let (cx, cy) = (x + half, y + half);

        match &mut self.children {
            Children::Loaded(children) => {
                let slot = quadrant(&point, cx, cy);
                let (qx, qy) = child_origin(slot, x, y, half);
                return children[slot].add_point(
                    point,
                    qx,
                    qy,
                    half,
                    level - 1,
                    bucket_size,
                    minimum_level,
                );
            }
            Children::Deferred(_) => {
                return Err(SpatialError::Consistency(
                    "cannot insert into a quadtree node read from a stream".into(),
                ))
            }
            Children::None => {}
        }

        self.data.push(point);
        if self.data.len() > bucket_size && level > minimum_level {
            self.subdivide(x, y, width, level, bucket_size, minimum_level)?;
        }
        Ok(())
    }

    /// Moves the bucket into four fresh children, re-inserting each point so
    /// an over-full child subdivides in turn.
    fn subdivide(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        level: i32,
        bucket_size: usize,
        minimum_level: i32,
    ) -> SpatialResult<()> {
        let half = width * 0.5;
        let (cx, cy) = (x + half, y + half);
        let mut children: [QuadTreeNode; 4] = std::array::from_fn(|_| QuadTreeNode::new());
        for point in std::mem::take(&mut self.data) {
            let slot = quadrant(&point, cx, cy);
            let (qx, qy) = child_origin(slot, x, y, half);
            children[slot].add_point(point, qx, qy, half, level - 1, bucket_size, minimum_level)?;
        }
        self.children = Children::Loaded(Box::new(children));
        Ok(())
    }

    /// Size of this node's own record.
    pub(crate) fn record_size(&self) -> u64 {
        let overhead = if self.is_leaf() {
            LEAF_RECORD_OVERHEAD
        } else {
            INTERNAL_RECORD_OVERHEAD
        };
        overhead + POINT_RECORD_SIZE * self.data.len() as u64
    }

    /// Computes and caches subtree sizes bottom-up; returns this subtree's size.
    pub(crate) fn measure(&mut self) -> u64 {
        let mut size = self.record_size();
        if let Children::Loaded(children) = &mut self.children {
            for child in children.iter_mut() {
                size += child.measure();
            }
        }
        self.subtree_size = size;
        size
    }

    /// Number of nodes in the loaded subtree.
    pub(crate) fn node_count(&self) -> usize {
        match &self.children {
            Children::Loaded(children) => 1 + children.iter().map(|c| c.node_count()).sum::<usize>(),
            _ => 1,
        }
    }

    /// Writes this subtree pre-order. `measure` must have run first.
    pub(crate) fn write_to<W: Write>(&self, out: &mut W) -> SpatialResult<()> {
        out.write_count(self.data.len())?;
        for point in &self.data {
            out.write_point(point)?;
        }

        match &self.children {
            Children::None => out.write_bool(false)?,
            Children::Loaded(children) => {
                out.write_bool(true)?;
                for child in children.iter() {
                    let size = i64::try_from(child.subtree_size).map_err(|_| {
                        SpatialError::Consistency(format!(
                            "subtree size {} does not fit in i64",
                            child.subtree_size
                        ))
                    })?;
                    out.write_long(size)?;
                }
                for child in children.iter() {
                    child.write_to(out)?;
                }
            }
            Children::Deferred(_) => {
                return Err(SpatialError::Consistency(
                    "cannot serialize an unexpanded quadtree node".into(),
                ))
            }
        }
        Ok(())
    }

    /// Reads one node record at the current position; children stay deferred.
    pub(crate) fn read_from<R: Read + Seek>(input: &mut R) -> SpatialResult<Self> {
        let count = input.read_count()?;
        let mut data = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            data.push(input.read_point()?);
        }

        let children = if input.read_bool()? {
            let mut sizes = [0u64; 4];
            for size in sizes.iter_mut() {
                let raw = input.read_long()?;
                *size = u64::try_from(raw).map_err(|_| {
                    SpatialError::Corrupt(format!("negative quadtree subtree size {}", raw))
                })?;
            }
            let base = current_position(input)?;
            let mut offsets = [0u64; 4];
            let mut next = base;
            for (offset, size) in offsets.iter_mut().zip(sizes) {
                *offset = next;
                next = next.checked_add(size).ok_or_else(|| {
                    SpatialError::Corrupt(format!("quadtree child offset overflow at {}", base))
                })?;
            }
            Children::Deferred(offsets)
        } else {
            Children::None
        };

        Ok(Self {
            data,
            children,
            subtree_size: 0,
        })
    }

    /// Consumes the node, returning its bucket and its children.
    ///
    /// Deferred children are read from `input` here; this is the only place a
    /// lazy node touches the stream.
    pub(crate) fn expand<R: Read + Seek>(
        self,
        input: &mut R,
    ) -> SpatialResult<(Vec<PointData>, Option<Box<[QuadTreeNode; 4]>>)> {
        match self.children {
            Children::None => Ok((self.data, None)),
            Children::Loaded(children) => Ok((self.data, Some(children))),
            Children::Deferred(offsets) => {
                log::trace!("expanding quadtree node with children at {:?}", offsets);
                let mut read_at = |offset: u64| -> SpatialResult<QuadTreeNode> {
                    seek_to(&mut *input, offset)?;
                    QuadTreeNode::read_from(&mut *input)
                };
                let children = Box::new([
                    read_at(offsets[0])?,
                    read_at(offsets[1])?,
                    read_at(offsets[2])?,
                    read_at(offsets[3])?,
                ]);
                Ok((self.data, Some(children)))
            }
        }
    }
}

/// Quadrant of `point` relative to the center `(cx, cy)`; ties go high.
pub(crate) fn quadrant(point: &PointData, cx: f64, cy: f64) -> usize {
    let high_x = if point.x < cx { 0 } else { 2 };
    let high_y = if point.y < cy { 0 } else { 1 };
    high_x + high_y
}

/// Lower-left corner of child `slot` of the square at `(x, y)` with half side `half`.
pub(crate) fn child_origin(slot: usize, x: f64, y: f64, half: f64) -> (f64, f64) {
    match slot {
        0 => (x, y),
        1 => (x, y + half),
        2 => (x + half, y),
        _ => (x + half, y + half),
    }
}
