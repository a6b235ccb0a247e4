//! The quadtree: root square bookkeeping, upward growth, overflow and layout.

use std::io::{Read, Seek, Write};

use crate::data_stream::{IndexRead, IndexWrite};
use crate::extent::Extent;
use crate::index_config::{validate_start_extent, QuadTreeConfig};
use crate::index_types::{PointData, SpatialError, SpatialResult};

use super::quadtree_node::QuadTreeNode;
use super::search_iter::SearchIter;

/// Adaptive region quadtree that grows upward and subdivides downward.
///
/// The root is a square with lower-left corner `root_bounds().xmin/ymin` and
/// side `root_width()`. Points outside it make the tree grow: a new root of
/// twice the width adopts the old one. Once the root reaches the maximum
/// level such points are kept in an overflow list instead.
#[derive(Debug, Clone)]
pub struct QuadTree {
    root: QuadTreeNode,
    root_bounds: Extent,
    root_width: f64,
    root_level: i32,
    config: QuadTreeConfig,
    overflow: Vec<PointData>,
    len: usize,
}

impl QuadTree {
    /// Creates an empty tree whose root square starts at the lower-left corner
    /// of `start_extent` with side `start_extent.width()`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an invalid config or starting extent.
    pub fn new(config: QuadTreeConfig, start_extent: &Extent) -> SpatialResult<Self> {
        config.validate()?;
        validate_start_extent(start_extent)?;

        let width = start_extent.width();
        let root_bounds = Extent::new(
            start_extent.xmin,
            start_extent.ymin,
            start_extent.xmin + width,
            start_extent.ymin + width,
        );
        Ok(Self {
            root: QuadTreeNode::new(),
            root_bounds,
            root_width: width,
            root_level: config.get_start_level(),
            config,
            overflow: Vec::new(),
            len: 0,
        })
    }

    /// Inserts a point, growing the root as needed.
    pub fn add_point(&mut self, point: PointData) -> SpatialResult<()> {
        while self.is_outside_root(&point) {
            if self.root_level >= self.config.get_maximum_level() {
                self.overflow.push(point);
                self.len += 1;
                return Ok(());
            }
            self.grow_toward(&point);
        }

        self.root.add_point(
            point,
            self.root_bounds.xmin,
            self.root_bounds.ymin,
            self.root_width,
            self.root_level,
            self.config.get_bucket_size(),
            self.config.get_minimum_level(),
        )?;
        self.len += 1;
        Ok(())
    }

    fn is_outside_root(&self, point: &PointData) -> bool {
        point.x < self.root_bounds.xmin
            || point.y < self.root_bounds.ymin
            || point.x > self.root_bounds.xmax
            || point.y > self.root_bounds.ymax
    }

    /// Replaces the root by one twice as wide, placing the old root in the
    /// quadrant that keeps it farthest from `point`.
    fn grow_toward(&mut self, point: &PointData) {
        let width = self.root_width;
        let bounds = &mut self.root_bounds;

        let slot = if point.x < bounds.xmin {
            if point.y < bounds.ymin {
                bounds.xmin -= width;
                bounds.ymin -= width;
                3
            } else {
                bounds.xmin -= width;
                bounds.ymax += width;
                2
            }
        } else if point.y < bounds.ymin {
            bounds.xmax += width;
            bounds.ymin -= width;
            1
        } else {
            bounds.xmax += width;
            bounds.ymax += width;
            0
        };

        let old_root = std::mem::replace(&mut self.root, QuadTreeNode::new());
        let mut old_root = Some(old_root);
        let children: [QuadTreeNode; 4] = std::array::from_fn(|i| {
            if i == slot {
                old_root.take().unwrap_or_default()
            } else {
                QuadTreeNode::new()
            }
        });
        self.root = QuadTreeNode::with_children(children);
        self.root_width *= 2.0;
        self.root_level += 1;

        log::trace!(
            "quadtree grew to level {} covering {}",
            self.root_level,
            self.root_bounds
        );
    }

    /// Number of points inserted, overflow included.
    ///
    /// A tree read back from a stream only knows its overflow points here;
    /// the node points stay on the stream.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Points that fell outside the fully grown root.
    pub fn overflow(&self) -> &[PointData] {
        &self.overflow
    }

    /// Current root square as an extent.
    pub fn root_bounds(&self) -> Extent {
        self.root_bounds
    }

    pub fn root_width(&self) -> f64 {
        self.root_width
    }

    pub fn root_level(&self) -> i32 {
        self.root_level
    }

    pub fn root(&self) -> &QuadTreeNode {
        &self.root
    }

    pub fn config(&self) -> &QuadTreeConfig {
        &self.config
    }

    /// Size of the header (levels, root square, overflow list) in bytes.
    fn header_size(&self) -> u64 {
        4 * 4 + 8 + 4 * 8 + 4 + 24 * self.overflow.len() as u64
    }

    /// Serializes the whole tree at the writer's current position.
    ///
    /// Runs the bottom-up size pass first, then writes the header and the
    /// nodes in pre-order. Returns the number of bytes written.
    pub fn write_to<W: Write>(&mut self, out: &mut W) -> SpatialResult<u64> {
        let body = self.root.measure();

        out.write_count(self.config.get_bucket_size())?;
        out.write_int(self.root_level)?;
        out.write_int(self.config.get_maximum_level())?;
        out.write_int(self.config.get_minimum_level())?;
        out.write_double(self.root_width)?;
        out.write_double(self.root_bounds.xmin)?;
        out.write_double(self.root_bounds.ymin)?;
        out.write_double(self.root_bounds.xmax)?;
        out.write_double(self.root_bounds.ymax)?;
        out.write_count(self.overflow.len())?;
        for point in &self.overflow {
            out.write_point(point)?;
        }
        self.root.write_to(out)?;

        let total = self.header_size() + body;
        log::debug!(
            "wrote quadtree: {} points, {} nodes, {} overflow, {} bytes",
            self.len,
            self.root.node_count(),
            self.overflow.len(),
            total
        );
        Ok(total)
    }

    /// Reads the header and the root node at the reader's current position.
    ///
    /// The root's children stay on the stream until a search reaches them.
    pub fn read_from<R: Read + Seek>(input: &mut R) -> SpatialResult<Self> {
        let bucket_size = input.read_count()?;
        let root_level = input.read_int()?;
        let maximum_level = input.read_int()?;
        let minimum_level = input.read_int()?;
        let root_width = input.read_double()?;
        let root_min = (input.read_double()?, input.read_double()?);
        let root_max = (input.read_double()?, input.read_double()?);

        let config = QuadTreeConfig::new()
            .bucket_size(bucket_size)
            .start_level(root_level)
            .minimum_level(minimum_level)
            .maximum_level(maximum_level);
        config
            .validate()
            .map_err(|e| SpatialError::Corrupt(format!("bad quadtree header: {}", e)))?;

        let overflow_count = input.read_count()?;
        let mut overflow = Vec::with_capacity(overflow_count.min(1024));
        for _ in 0..overflow_count {
            overflow.push(input.read_point()?);
        }

        let root = QuadTreeNode::read_from(input)?;

        Ok(Self {
            root,
            root_bounds: Extent::new(root_min.0, root_min.1, root_max.0, root_max.1),
            root_width,
            root_level,
            config,
            len: overflow.len(),
            overflow,
        })
    }

    /// Starts an extent search over a tree read from `input`.
    ///
    /// The search works on a copy of the root, so repeated searches on the
    /// same reader see the same tree.
    pub(crate) fn search<'a, R: Read + Seek>(
        &self,
        input: &'a mut R,
        query: Extent,
    ) -> SearchIter<'a, R> {
        let mut overflow_hits = Vec::new();
        if !self.overflow.is_empty() && !self.query_inside_root(&query) {
            overflow_hits.extend(
                self.overflow
                    .iter()
                    .filter(|pt| query.contains_point(pt.x, pt.y))
                    .copied(),
            );
        }

        SearchIter::new(
            input,
            query,
            self.root.clone(),
            self.root_bounds.xmin,
            self.root_bounds.ymin,
            self.root_width,
            overflow_hits,
        )
    }

    fn query_inside_root(&self, query: &Extent) -> bool {
        query.xmax <= self.root_bounds.xmax
            && query.ymax <= self.root_bounds.ymax
            && query.xmin >= self.root_bounds.xmin
            && query.ymin >= self.root_bounds.ymin
    }
}
