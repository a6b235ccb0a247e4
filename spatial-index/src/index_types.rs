//! Core types shared by the quadtree and R-tree indexes.
//!
//! This module defines:
//! - Error types and the result alias
//! - The two payload record shapes (`PointData`, `MBRHandle`)
//! - The `RTreeData` capability shared by R-tree entries and nodes

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::io;
use thiserror::Error;

use crate::extent::Extent;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while building, writing or searching an index
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Corrupt index data: {0}")]
    Corrupt(String),

    #[error("Index consistency violation: {0}")]
    Consistency(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Index writer is closed")]
    Closed,
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Opaque 64-bit handle into external record storage.
pub type RecordHandle = i64;

// ============================================================================
// Payload Records
// ============================================================================

/// A point paired with an opaque handle, the quadtree payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointData {
    pub x: f64,
    pub y: f64,
    /// Handle to the point record; never interpreted by the index.
    pub address: RecordHandle,
}

impl PointData {
    pub fn new(x: f64, y: f64, address: RecordHandle) -> Self {
        Self { x, y, address }
    }
}

impl std::fmt::Display for PointData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PointData{{x={}, y={}, address={}}}", self.x, self.y, self.address)
    }
}

/// A bounding rectangle paired with an opaque handle, the R-tree leaf datum.
///
/// Two handles compare equal when their record handles match, whatever
/// their extents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MBRHandle {
    pub extent: Extent,
    pub handle: RecordHandle,
}

impl MBRHandle {
    pub fn new(extent: Extent, handle: RecordHandle) -> Self {
        Self { extent, handle }
    }
}

impl PartialEq for MBRHandle {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for MBRHandle {}

impl Hash for MBRHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

// ============================================================================
// R-Tree Entry Capability
// ============================================================================

/// Anything an R-tree node can hold as an entry.
///
/// Leaf nodes hold [`MBRHandle`]s; inner nodes hold child nodes, whose handle
/// is their serialized byte offset and whose extent is the union of their
/// contents.
pub trait RTreeData {
    /// Bounding rectangle of the entry
    fn extent(&self) -> &Extent;

    /// Record handle, or the absolute byte offset of a child node
    fn handle(&self) -> i64;
}

impl RTreeData for MBRHandle {
    fn extent(&self) -> &Extent {
        &self.extent
    }

    fn handle(&self) -> i64 {
        self.handle
    }
}
