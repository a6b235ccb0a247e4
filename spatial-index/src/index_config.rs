//! Construction-time configuration for both index kinds.

use crate::extent::Extent;
use crate::index_constants::{
    DEFAULT_BUCKET_SIZE, DEFAULT_NODE_HIGH_SIZE, DEFAULT_NODE_LOW_SIZE, MAXIMUM_LEVEL,
    MINIMUM_LEVEL, START_LEVEL,
};
use crate::index_types::{SpatialError, SpatialResult};

/// Quadtree decomposition settings.
///
/// # Examples
///
/// ```rust
/// use spatial_index::QuadTreeConfig;
///
/// let config = QuadTreeConfig::default().bucket_size(2).maximum_level(18);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.get_bucket_size(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadTreeConfig {
    bucket_size: usize,
    start_level: i32,
    minimum_level: i32,
    maximum_level: i32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            start_level: START_LEVEL,
            minimum_level: MINIMUM_LEVEL,
            maximum_level: MAXIMUM_LEVEL,
        }
    }
}

impl QuadTreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points a leaf may hold before it subdivides.
    pub fn bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Level of the initial root.
    pub fn start_level(mut self, level: i32) -> Self {
        self.start_level = level;
        self
    }

    /// Level below which leaves never subdivide.
    pub fn minimum_level(mut self, level: i32) -> Self {
        self.minimum_level = level;
        self
    }

    /// Level at which the root stops growing upward.
    pub fn maximum_level(mut self, level: i32) -> Self {
        self.maximum_level = level;
        self
    }

    pub fn get_bucket_size(&self) -> usize {
        self.bucket_size
    }

    pub fn get_start_level(&self) -> i32 {
        self.start_level
    }

    pub fn get_minimum_level(&self) -> i32 {
        self.minimum_level
    }

    pub fn get_maximum_level(&self) -> i32 {
        self.maximum_level
    }

    /// Checks the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for a zero (or unencodable) bucket size
    /// or when the start level is outside `[minimum_level, maximum_level]`.
    pub fn validate(&self) -> SpatialResult<()> {
        if self.bucket_size == 0 || i32::try_from(self.bucket_size).is_err() {
            return Err(SpatialError::InvalidConfiguration(format!(
                "bucket size must be between 1 and {}, got {}",
                i32::MAX,
                self.bucket_size
            )));
        }
        if self.minimum_level > self.start_level || self.start_level > self.maximum_level {
            return Err(SpatialError::InvalidConfiguration(format!(
                "levels must satisfy minimum <= start <= maximum, got {} <= {} <= {}",
                self.minimum_level, self.start_level, self.maximum_level
            )));
        }
        Ok(())
    }
}

/// Checks a starting extent guess for a quadtree root.
pub(crate) fn validate_start_extent(extent: &Extent) -> SpatialResult<()> {
    let finite = extent.xmin.is_finite()
        && extent.ymin.is_finite()
        && extent.xmax.is_finite()
        && extent.ymax.is_finite();
    if !finite || extent.width() <= 0.0 || extent.height() < 0.0 {
        return Err(SpatialError::InvalidConfiguration(format!(
            "starting extent must be finite with positive width, got {}",
            extent
        )));
    }
    Ok(())
}

/// R-tree fan-out settings.
///
/// `node_low_size` is carried into the file header but never enforced when
/// splitting; `node_high_size` is the hard cap that triggers a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RTreeConfig {
    node_low_size: usize,
    node_high_size: usize,
}

impl Default for RTreeConfig {
    fn default() -> Self {
        Self {
            node_low_size: DEFAULT_NODE_LOW_SIZE,
            node_high_size: DEFAULT_NODE_HIGH_SIZE,
        }
    }
}

impl RTreeConfig {
    pub fn new(node_low_size: usize, node_high_size: usize) -> Self {
        Self {
            node_low_size,
            node_high_size,
        }
    }

    pub fn node_low_size(&self) -> usize {
        self.node_low_size
    }

    pub fn node_high_size(&self) -> usize {
        self.node_high_size
    }

    /// Checks the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` when the high size is below 2 (a split
    /// needs two seeds), the low size is zero or above the high size, or
    /// either does not fit the on-disk `i32`.
    pub fn validate(&self) -> SpatialResult<()> {
        if self.node_high_size < 2 || i32::try_from(self.node_high_size).is_err() {
            return Err(SpatialError::InvalidConfiguration(format!(
                "node high size must be between 2 and {}, got {}",
                i32::MAX,
                self.node_high_size
            )));
        }
        if self.node_low_size == 0 || self.node_low_size > self.node_high_size {
            return Err(SpatialError::InvalidConfiguration(format!(
                "node low size must be between 1 and {}, got {}",
                self.node_high_size, self.node_low_size
            )));
        }
        Ok(())
    }
}
