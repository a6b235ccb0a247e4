//! Write side of the quadtree: insert points, serialize once.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data_stream::create_index_file;
use crate::extent::Extent;
use crate::index_config::QuadTreeConfig;
use crate::index_types::{PointData, SpatialError, SpatialResult};

use super::quadtree_impl::QuadTree;

/// Builds a quadtree in memory and writes it to a stream when finished.
///
/// The tree is serialized at the stream's position at `finish`/`close` time,
/// so an index can follow other data in the same stream. After either call
/// the writer is consumed; dropping it unclosed discards the points.
///
/// # Examples
///
/// ```rust
/// use spatial_index::{Extent, PointData, QuadTreeReader, QuadTreeWriter, SpatialReader};
/// use std::io::Cursor;
///
/// let mut writer = QuadTreeWriter::new(Vec::new(), 2, &Extent::new(0.0, 0.0, 50.0, 50.0)).unwrap();
/// writer.add_point(PointData::new(10.0, 10.0, 1)).unwrap();
/// writer.add_point(PointData::new(-20.0, 60.0, 2)).unwrap();
/// let bytes = writer.finish().unwrap();
///
/// let mut reader = QuadTreeReader::new(Cursor::new(bytes)).unwrap();
/// let found = reader.collect_extent(&Extent::new(-30.0, 50.0, 0.0, 70.0)).unwrap();
/// assert_eq!(found, vec![PointData::new(-20.0, 60.0, 2)]);
/// ```
pub struct QuadTreeWriter<W: Write> {
    stream: Option<W>,
    tree: Option<QuadTree>,
}

impl<W: Write> QuadTreeWriter<W> {
    /// Creates a writer with the default levels and the given bucket size.
    pub fn new(stream: W, bucket_size: usize, start_extent: &Extent) -> SpatialResult<Self> {
        Self::with_config(
            stream,
            QuadTreeConfig::default().bucket_size(bucket_size),
            start_extent,
        )
    }

    /// Creates a writer with explicit quadtree settings.
    pub fn with_config(
        stream: W,
        config: QuadTreeConfig,
        start_extent: &Extent,
    ) -> SpatialResult<Self> {
        let tree = QuadTree::new(config, start_extent)?;
        log::debug!(
            "quadtree writer created: bucket size {}, root {}",
            config.get_bucket_size(),
            tree.root_bounds()
        );
        Ok(Self {
            stream: Some(stream),
            tree: Some(tree),
        })
    }

    /// Inserts one point.
    pub fn add_point(&mut self, point: PointData) -> SpatialResult<()> {
        self.tree.as_mut().ok_or(SpatialError::Closed)?.add_point(point)
    }

    /// Inserts every point of an iterator.
    pub fn add_points<I>(&mut self, points: I) -> SpatialResult<()>
    where
        I: IntoIterator<Item = PointData>,
    {
        let tree = self.tree.as_mut().ok_or(SpatialError::Closed)?;
        for point in points {
            tree.add_point(point)?;
        }
        Ok(())
    }

    /// The tree built so far.
    pub fn tree(&self) -> SpatialResult<&QuadTree> {
        self.tree.as_ref().ok_or(SpatialError::Closed)
    }

    /// Serializes the tree, flushes the stream and hands it back.
    ///
    /// The in-memory tree is released and the flush attempted even when
    /// serialization fails; the first error wins.
    pub fn finish(mut self) -> SpatialResult<W> {
        let mut stream = self.stream.take().ok_or(SpatialError::Closed)?;
        let written = match self.tree.take() {
            Some(mut tree) => tree.write_to(&mut stream).map(|_| ()),
            None => Err(SpatialError::Closed),
        };
        let flushed = stream.flush();

        written?;
        flushed?;
        Ok(stream)
    }

    /// Serializes the tree and closes the stream.
    pub fn close(self) -> SpatialResult<()> {
        self.finish().map(drop)
    }
}

impl QuadTreeWriter<BufWriter<File>> {
    /// Creates (or truncates) an index file and a writer over it.
    pub fn create(
        path: impl AsRef<Path>,
        bucket_size: usize,
        start_extent: &Extent,
    ) -> SpatialResult<Self> {
        let stream = create_index_file(path.as_ref())?;
        log::debug!("creating quadtree index at {:?}", path.as_ref());
        Self::new(stream, bucket_size, start_extent)
    }
}

impl<W: Write> Drop for QuadTreeWriter<W> {
    fn drop(&mut self) {
        if let Some(tree) = self.tree.take() {
            log::warn!(
                "quadtree writer dropped without close, {} points discarded",
                tree.len()
            );
        }
        if let Some(stream) = self.stream.as_mut() {
            let _ = stream.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadtree::QuadTreeReader;
    use crate::spatial_reader::SpatialReader;
    use std::io::{self, Cursor};
    use tempfile::tempdir;

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_finish_returns_stream() {
        let mut writer =
            QuadTreeWriter::new(Vec::new(), 4, &Extent::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        writer.add_point(PointData::new(1.0, 2.0, 3)).unwrap();
        assert_eq!(writer.tree().unwrap().len(), 1);

        let bytes = writer.finish().unwrap();
        assert!(!bytes.is_empty());

        let mut reader = QuadTreeReader::new(Cursor::new(bytes)).unwrap();
        let found = reader
            .collect_extent(&Extent::new(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        assert_eq!(found, vec![PointData::new(1.0, 2.0, 3)]);
    }

    #[test]
    fn test_index_after_prefix() {
        let mut prefix = Cursor::new(Vec::new());
        prefix.write_all(b"header bytes").unwrap();

        let mut writer =
            QuadTreeWriter::new(prefix, 2, &Extent::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        writer
            .add_points((0..10).map(|i| PointData::new(i as f64, i as f64, i)))
            .unwrap();
        let mut stream = writer.finish().unwrap();

        stream.set_position(12);
        let mut reader = QuadTreeReader::new(stream).unwrap();
        let found = reader
            .collect_extent(&Extent::new(2.5, 2.5, 5.5, 5.5))
            .unwrap();
        let mut addresses: Vec<i64> = found.iter().map(|p| p.address).collect();
        addresses.sort_unstable();
        assert_eq!(addresses, vec![3, 4, 5]);
    }

    #[test]
    fn test_write_failure_propagates() {
        let mut writer =
            QuadTreeWriter::new(FailingSink, 2, &Extent::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        writer.add_point(PointData::new(1.0, 1.0, 1)).unwrap();
        assert!(matches!(writer.close(), Err(SpatialError::Io(_))));
    }

    #[test]
    fn test_create_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("points.qt");

        let mut writer = QuadTreeWriter::create(&path, 8, &Extent::new(0.0, 0.0, 1.0, 1.0)).unwrap();
        writer.add_point(PointData::new(0.5, 0.5, 9)).unwrap();
        writer.close().unwrap();

        let mut reader = QuadTreeReader::open(&path).unwrap();
        assert_eq!(
            reader.count_extent(&Extent::new(0.0, 0.0, 1.0, 1.0)).unwrap(),
            1
        );
    }

    #[test]
    fn test_invalid_start_extent() {
        let result = QuadTreeWriter::new(Vec::new(), 2, &Extent::NULL_EXTENT);
        assert!(matches!(result, Err(SpatialError::InvalidConfiguration(_))));
    }
}
