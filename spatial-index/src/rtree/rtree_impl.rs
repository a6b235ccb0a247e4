//! In-memory R-tree with Guttman insertion, serialized once when complete.

use std::io::Write;

use crate::data_stream::{IndexWrite, PositionedWriter};
use crate::extent::Extent;
use crate::index_config::RTreeConfig;
use crate::index_types::{MBRHandle, SpatialError, SpatialResult};

use super::rtree_node::{union_extent, NodeEntries, RTreeNode};
use super::rtree_split::quadratic_split;

/// Height-balanced R-tree over [`MBRHandle`]s.
///
/// Built by insertion only. A node holding `node_high_size` entries is split
/// when one more arrives; splits propagate upward and a split root is wrapped
/// in a new inner root, so every leaf stays at the same depth.
#[derive(Debug, Clone)]
pub struct RTree {
    root: RTreeNode,
    config: RTreeConfig,
    len: usize,
}

impl RTree {
    /// Creates an empty tree (a single empty leaf).
    pub fn new(config: RTreeConfig) -> SpatialResult<Self> {
        config.validate()?;
        Ok(Self {
            root: RTreeNode::new_leaf(),
            config,
            len: 0,
        })
    }

    /// Inserts one data handle.
    pub fn insert(&mut self, data: MBRHandle) -> SpatialResult<()> {
        let high = self.config.node_high_size();
        if let Some(sibling) = insert_into(&mut self.root, data, high)? {
            let old_root = std::mem::replace(&mut self.root, RTreeNode::new_inner());
            self.root.push_child(old_root)?;
            self.root.push_child(sibling)?;
            log::trace!("R-tree root split, height now {}", self.root.height());
        }
        self.len += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of node levels, leaves included.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    pub fn root(&self) -> &RTreeNode {
        &self.root
    }

    /// Union of everything inserted; the null extent for an empty tree.
    pub fn extent(&self) -> Extent {
        self.root.extent
    }

    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    /// Serializes the header and every node at the writer's position.
    ///
    /// Node handles are computed in a first pass from the writer's absolute
    /// position, then each node is checked against the position it actually
    /// lands at. Returns the number of bytes written.
    pub fn write_to<W: Write>(&mut self, out: &mut PositionedWriter<W>) -> SpatialResult<u64> {
        let start = out.position();
        out.write_count(self.config.node_low_size())?;
        out.write_count(self.config.node_high_size())?;

        let end = self.root.calculate_handles(out.position())?;
        self.root.write_to(out)?;
        if out.position() != end {
            return Err(SpatialError::Consistency(format!(
                "R-tree ended at {} but handles were computed up to {}",
                out.position(),
                end
            )));
        }

        let total = end - start;
        log::debug!(
            "wrote R-tree: {} entries, {} nodes, height {}, {} bytes",
            self.len,
            self.root.node_count(),
            self.root.height(),
            total
        );
        Ok(total)
    }
}

/// Inserts `data` below `node`, returning the new sibling if `node` split.
fn insert_into(
    node: &mut RTreeNode,
    data: MBRHandle,
    high: usize,
) -> SpatialResult<Option<RTreeNode>> {
    match &mut node.entries {
        NodeEntries::Leaf(items) => {
            if items.len() >= high {
                let (kept, moved) = quadratic_split(std::mem::take(items), data);
                node.extent = union_extent(&kept);
                *items = kept;
                return Ok(Some(RTreeNode::leaf_from(moved)));
            }
            node.extent.union_in_place(&data.extent);
            items.push(data);
            Ok(None)
        }
        NodeEntries::Inner(children) => {
            let best = choose_subtree(children, &data.extent).ok_or_else(|| {
                SpatialError::Consistency("inner R-tree node has no entries".into())
            })?;
            let data_extent = data.extent;

            let split = insert_into(&mut children[best], data, high)?;
            node.extent.union_in_place(&data_extent);

            let sibling = match split {
                Some(sibling) => sibling,
                None => return Ok(None),
            };
            if children.len() >= high {
                let (kept, moved) = quadratic_split(std::mem::take(children), sibling);
                node.extent = union_extent(&kept);
                *children = kept;
                return Ok(Some(RTreeNode::inner_from(moved)));
            }
            node.extent.union_in_place(&sibling.extent);
            children.push(sibling);
            Ok(None)
        }
    }
}

/// Child needing the least enlargement to cover `extent`; ties go to the
/// smaller child.
fn choose_subtree(children: &[RTreeNode], extent: &Extent) -> Option<usize> {
    let mut best: Option<(usize, f64, f64)> = None;
    for (i, child) in children.iter().enumerate() {
        let enlargement = child.extent.enlargement(extent);
        let area = child.extent.area();
        let better = match best {
            None => true,
            Some((_, best_enlargement, best_area)) => {
                enlargement < best_enlargement
                    || (enlargement == best_enlargement && area < best_area)
            }
        };
        if better {
            best = Some((i, enlargement, area));
        }
    }
    best.map(|(i, _, _)| i)
}
