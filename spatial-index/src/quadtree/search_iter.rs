//! Lazy extent search over a stream-backed quadtree.

use std::io::{Read, Seek};

use crate::extent::Extent;
use crate::index_types::{PointData, SpatialResult};

use super::quadtree_node::{child_origin, QuadTreeNode};

/// A node waiting to be visited, with its square.
///
/// Squares are half-open except along the root's own right and top edges,
/// where insertion keeps points on the edge inside the tree.
struct Frame {
    node: QuadTreeNode,
    x: f64,
    y: f64,
    width: f64,
    on_max_x: bool,
    on_max_y: bool,
}

/// Depth-first iterator over the points of a quadtree inside an extent.
///
/// Each call to `next` either hands out a buffered point or pops one node,
/// expands it from the stream and buffers its matches (or pushes its
/// children). A popped node is dropped as soon as it has been processed, so
/// only the current frontier is ever held in memory.
///
/// Yields `Err` at most once; the iterator is exhausted after an error.
pub struct SearchIter<'a, R: Read + Seek> {
    input: &'a mut R,
    query: Extent,
    nodes: Vec<Frame>,
    points: Vec<PointData>,
    failed: bool,
}

impl<'a, R: Read + Seek> SearchIter<'a, R> {
    pub(crate) fn new(
        input: &'a mut R,
        query: Extent,
        root: QuadTreeNode,
        x: f64,
        y: f64,
        width: f64,
        overflow_hits: Vec<PointData>,
    ) -> Self {
        Self {
            input,
            query,
            nodes: vec![Frame {
                node: root,
                x,
                y,
                width,
                on_max_x: true,
                on_max_y: true,
            }],
            points: overflow_hits,
            failed: false,
        }
    }

    /// The query window.
    pub fn extent(&self) -> &Extent {
        &self.query
    }

    fn participates(&self, frame: &Frame) -> bool {
        let q = &self.query;
        let (right, top) = (frame.x + frame.width, frame.y + frame.width);
        let reaches_x = q.xmin < right || (frame.on_max_x && q.xmin <= right);
        let reaches_y = q.ymin < top || (frame.on_max_y && q.ymin <= top);
        reaches_x && q.xmax >= frame.x && q.ymax >= frame.y && reaches_y
    }

    fn covers(&self, frame: &Frame) -> bool {
        let q = &self.query;
        q.xmin <= frame.x
            && q.ymin <= frame.y
            && q.xmax > frame.x + frame.width
            && q.ymax > frame.y + frame.width
    }

    fn visit(&mut self, frame: Frame) -> SpatialResult<()> {
        if !self.participates(&frame) {
            return Ok(());
        }

        let covered = self.covers(&frame);
        let Frame {
            node,
            x,
            y,
            width,
            on_max_x,
            on_max_y,
        } = frame;
        let (data, children) = node.expand(&mut *self.input)?;

        match children {
            None => {
                if covered {
                    self.points.extend(data);
                } else {
                    let query = self.query;
                    self.points
                        .extend(data.into_iter().filter(|pt| query.contains_point(pt.x, pt.y)));
                }
            }
            Some(children) => {
                let half = width * 0.5;
                for (slot, child) in IntoIterator::into_iter(*children).enumerate() {
                    let (cx, cy) = child_origin(slot, x, y, half);
                    self.nodes.push(Frame {
                        node: child,
                        x: cx,
                        y: cy,
                        width: half,
                        on_max_x: on_max_x && slot >= 2,
                        on_max_y: on_max_y && slot % 2 == 1,
                    });
                }
            }
        }
        Ok(())
    }
}

impl<R: Read + Seek> Iterator for SearchIter<'_, R> {
    type Item = SpatialResult<PointData>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(point) = self.points.pop() {
                return Some(Ok(point));
            }
            let frame = self.nodes.pop()?;
            if let Err(e) = self.visit(frame) {
                self.failed = true;
                self.nodes.clear();
                self.points.clear();
                return Some(Err(e));
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for SearchIter<'_, R> {}
