//! Push-style search shared by both stream-backed readers.

use crate::extent::Extent;
use crate::index_types::SpatialResult;

/// A serialized spatial index that can be searched by extent.
///
/// Both readers expose a pull-style iterator as their primitive; this trait
/// is the push-style form derived from it by pulling to exhaustion.
pub trait SpatialReader {
    /// The record type a search produces.
    type Record;

    /// Calls `f` once for every record matching `extent`.
    ///
    /// Returns the number of matches. Stops at the first stream error.
    fn search_each(
        &mut self,
        extent: &Extent,
        f: &mut dyn FnMut(Self::Record),
    ) -> SpatialResult<usize>;

    /// Collects every record matching `extent`.
    fn collect_extent(&mut self, extent: &Extent) -> SpatialResult<Vec<Self::Record>> {
        let mut found = Vec::new();
        self.search_each(extent, &mut |record| found.push(record))?;
        Ok(found)
    }

    /// Counts the records matching `extent`.
    fn count_extent(&mut self, extent: &Extent) -> SpatialResult<usize> {
        self.search_each(extent, &mut |_| {})
    }
}

/// Drains a fallible iterator into `f`, returning how many items it produced.
pub(crate) fn drain_into<T, I>(iter: I, f: &mut dyn FnMut(T)) -> SpatialResult<usize>
where
    I: Iterator<Item = SpatialResult<T>>,
{
    let mut count = 0;
    for item in iter {
        f(item?);
        count += 1;
    }
    Ok(count)
}
