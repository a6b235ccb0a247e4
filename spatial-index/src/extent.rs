use std::hash::Hash;

/// An axis-aligned bounding box in 2D space.
///
/// `Extent` is used both as the bounding rectangle of R-tree entries and as
/// the query window for every search in this crate. A valid region satisfies
/// `xmin <= xmax` and `ymin <= ymax`.
///
/// [`Extent::NULL_EXTENT`] (`{+inf, +inf, -inf, -inf}`) is the identity for
/// union and stands for the empty set. It is an accumulator seed only and
/// must not be used as a query region.
///
/// # Examples
///
/// ```rust
/// use spatial_index::Extent;
///
/// let mut acc = Extent::NULL_EXTENT;
/// acc.union_in_place(&Extent::new(0.0, 0.0, 1.0, 1.0));
/// acc.union_in_place(&Extent::new(2.0, -1.0, 3.0, 0.5));
///
/// assert_eq!(acc, Extent::new(0.0, -1.0, 3.0, 1.0));
/// assert!(acc.contains_point(3.0, 1.0));
/// ```
#[derive(Clone, Copy, PartialEq, Debug, serde::Deserialize, serde::Serialize)]
pub struct Extent {
    /// Minimum X coordinate
    pub xmin: f64,
    /// Minimum Y coordinate
    pub ymin: f64,
    /// Maximum X coordinate
    pub xmax: f64,
    /// Maximum Y coordinate
    pub ymax: f64,
}

impl Eq for Extent {}

impl Hash for Extent {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.xmin.to_bits().hash(state);
        self.ymin.to_bits().hash(state);
        self.xmax.to_bits().hash(state);
        self.ymax.to_bits().hash(state);
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::NULL_EXTENT
    }
}

impl std::fmt::Display for Extent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Extent{{xmin={}, ymin={}, xmax={}, ymax={}}}",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}

impl Extent {
    /// The empty extent; unioning with it leaves the other operand unchanged.
    pub const NULL_EXTENT: Extent = Extent {
        xmin: f64::INFINITY,
        ymin: f64::INFINITY,
        xmax: f64::NEG_INFINITY,
        ymax: f64::NEG_INFINITY,
    };

    /// Creates a new extent with the specified coordinates.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Extent {
        Extent {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Creates a degenerate extent covering a single point.
    pub fn from_point(x: f64, y: f64) -> Extent {
        Extent::new(x, y, x, y)
    }

    /// Overwrites this extent with the values of `other`.
    pub fn set(&mut self, other: &Extent) {
        *self = *other;
    }

    /// Overwrites this extent with the given coordinates.
    pub fn set_coords(&mut self, xmin: f64, ymin: f64, xmax: f64, ymax: f64) {
        self.xmin = xmin;
        self.ymin = ymin;
        self.xmax = xmax;
        self.ymax = ymax;
    }

    /// Returns the width of the extent.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Returns the height of the extent.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Returns the area of the extent.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Checks if this extent is the empty accumulator (or otherwise inverted).
    pub fn is_null(&self) -> bool {
        self.xmin > self.xmax || self.ymin > self.ymax
    }

    /// Checks if the two extents fail to overlap on either axis.
    ///
    /// Extents that only share an edge or a corner are not disjoint.
    pub fn is_disjoint(&self, other: &Extent) -> bool {
        other.xmax < self.xmin
            || other.xmin > self.xmax
            || other.ymax < self.ymin
            || other.ymin > self.ymax
    }

    /// Checks if the point lies inside the extent or on its boundary.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.xmin <= x && self.ymin <= y && x <= self.xmax && y <= self.ymax
    }

    /// Returns the union of this extent with another.
    pub fn union(&self, other: &Extent) -> Extent {
        let mut copy = *self;
        copy.union_in_place(other);
        copy
    }

    /// Widens this extent in place so that it also covers `other`.
    pub fn union_in_place(&mut self, other: &Extent) {
        if other.xmin < self.xmin {
            self.xmin = other.xmin;
        }
        if other.xmax > self.xmax {
            self.xmax = other.xmax;
        }
        if other.ymin < self.ymin {
            self.ymin = other.ymin;
        }
        if other.ymax > self.ymax {
            self.ymax = other.ymax;
        }
    }

    /// Compares every coordinate within an absolute tolerance.
    pub fn is_equal(&self, other: &Extent, tolerance: f64) -> bool {
        (other.xmin - self.xmin).abs() <= tolerance
            && (other.ymin - self.ymin).abs() <= tolerance
            && (other.xmax - self.xmax).abs() <= tolerance
            && (other.ymax - self.ymax).abs() <= tolerance
    }

    /// Area increase needed for this extent to also cover `other`.
    pub(crate) fn enlargement(&self, other: &Extent) -> f64 {
        self.union(other).area() - self.area()
    }
}
