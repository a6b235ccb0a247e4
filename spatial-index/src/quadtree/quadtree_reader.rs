//! Read side of the quadtree: lazy searches over a serialized tree.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use crate::data_stream::open_index_file;
use crate::extent::Extent;
use crate::index_types::{PointData, SpatialResult};
use crate::spatial_reader::{drain_into, SpatialReader};

use super::quadtree_impl::QuadTree;
use super::quadtree_node::{child_origin, QuadTreeNode};
use super::search_iter::SearchIter;

/// A node as seen by [`QuadTreeReader::depth_first_search`].
#[derive(Debug, Clone, Copy)]
pub struct NodeVisit<'a> {
    /// Points stored at the node
    pub data: &'a [PointData],
    /// Lower-left corner of the node square
    pub x: f64,
    pub y: f64,
    /// Side of the node square
    pub width: f64,
    /// Node level; the root has the highest level and children are one lower
    pub level: i32,
    pub is_leaf: bool,
}

/// Searches a quadtree serialized by [`QuadTreeWriter`](super::QuadTreeWriter).
///
/// Opening reads only the header and the root record. Every search expands
/// the nodes it needs from the stream and drops them again; the reader itself
/// never grows.
pub struct QuadTreeReader<R: Read + Seek> {
    stream: R,
    tree: QuadTree,
}

impl<R: Read + Seek> QuadTreeReader<R> {
    /// Reads the tree header at the stream's current position.
    pub fn new(mut stream: R) -> SpatialResult<Self> {
        let tree = QuadTree::read_from(&mut stream)?;
        log::debug!(
            "opened quadtree: level {}, root {}, {} overflow points",
            tree.root_level(),
            tree.root_bounds(),
            tree.overflow().len()
        );
        Ok(Self { stream, tree })
    }

    /// Lazily iterates the points inside `extent` (edges inclusive).
    pub fn search(&mut self, extent: &Extent) -> SearchIter<'_, R> {
        self.tree.search(&mut self.stream, *extent)
    }

    /// Visits every node depth-first in quadrant order, expanding lazily.
    ///
    /// Children are read when their parent is visited and released once
    /// their own subtree is done.
    pub fn depth_first_search<F>(&mut self, mut visitor: F) -> SpatialResult<()>
    where
        F: FnMut(&NodeVisit<'_>),
    {
        let bounds = self.tree.root_bounds();
        let mut stack: Vec<(QuadTreeNode, f64, f64, f64, i32)> = vec![(
            self.tree.root().clone(),
            bounds.xmin,
            bounds.ymin,
            self.tree.root_width(),
            self.tree.root_level(),
        )];

        while let Some((node, x, y, width, level)) = stack.pop() {
            let (data, children) = node.expand(&mut self.stream)?;
            visitor(&NodeVisit {
                data: &data,
                x,
                y,
                width,
                level,
                is_leaf: children.is_none(),
            });

            if let Some(children) = children {
                let half = width * 0.5;
                for (slot, child) in IntoIterator::into_iter(*children).enumerate().rev() {
                    let (cx, cy) = child_origin(slot, x, y, half);
                    stack.push((child, cx, cy, half, level - 1));
                }
            }
        }
        Ok(())
    }

    /// Header information and overflow list of the opened tree.
    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn into_inner(self) -> R {
        self.stream
    }
}

impl QuadTreeReader<BufReader<File>> {
    /// Opens a quadtree index file.
    pub fn open(path: impl AsRef<Path>) -> SpatialResult<Self> {
        log::debug!("opening quadtree index at {:?}", path.as_ref());
        Self::new(open_index_file(path.as_ref())?)
    }
}

impl<R: Read + Seek> SpatialReader for QuadTreeReader<R> {
    type Record = PointData;

    fn search_each(
        &mut self,
        extent: &Extent,
        f: &mut dyn FnMut(PointData),
    ) -> SpatialResult<usize> {
        drain_into(self.search(extent), f)
    }
}
