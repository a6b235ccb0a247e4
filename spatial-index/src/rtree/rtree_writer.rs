//! Write side of the R-tree: insert boxes, serialize once.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use crate::data_stream::{create_index_file, PositionedWriter};
use crate::index_config::RTreeConfig;
use crate::index_types::{MBRHandle, SpatialError, SpatialResult};

use super::rtree_impl::RTree;

/// Builds an R-tree in memory and writes it to a stream when finished.
///
/// Inner-node entries store absolute child offsets, so the writer must know
/// where in the stream the index begins: `0` for [`RTreeWriter::new`], an
/// explicit offset for [`RTreeWriter::with_offset`], or the current position
/// of a seekable stream for [`RTreeWriter::at_current_position`].
///
/// # Examples
///
/// ```rust
/// use spatial_index::{Extent, MBRHandle, RTreeReader, RTreeWriter, SpatialReader};
/// use std::io::Cursor;
///
/// let mut writer = RTreeWriter::new(Vec::new(), 2, 4).unwrap();
/// writer.add(MBRHandle::new(Extent::new(0.0, 0.0, 1.0, 1.0), 7)).unwrap();
/// writer.add(MBRHandle::new(Extent::new(5.0, 5.0, 6.0, 6.0), 8)).unwrap();
/// let bytes = writer.finish().unwrap();
///
/// let mut reader = RTreeReader::new(Cursor::new(bytes)).unwrap();
/// let found = reader.collect_extent(&Extent::new(1.0, 1.0, 2.0, 2.0)).unwrap();
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].handle, 7);
/// ```
pub struct RTreeWriter<W: Write> {
    stream: Option<PositionedWriter<W>>,
    tree: Option<RTree>,
}

impl<W: Write> RTreeWriter<W> {
    /// Creates a writer for an index starting at offset 0 of `stream`.
    pub fn new(stream: W, node_low_size: usize, node_high_size: usize) -> SpatialResult<Self> {
        Self::with_offset(stream, RTreeConfig::new(node_low_size, node_high_size), 0)
    }

    /// Creates a writer whose next byte lands at absolute offset `start`.
    pub fn with_offset(stream: W, config: RTreeConfig, start: u64) -> SpatialResult<Self> {
        Self::from_positioned(PositionedWriter::new(stream, start), config)
    }

    fn from_positioned(stream: PositionedWriter<W>, config: RTreeConfig) -> SpatialResult<Self> {
        let tree = RTree::new(config)?;
        log::debug!(
            "R-tree writer created: fan-out {}..{}, index at {}",
            config.node_low_size(),
            config.node_high_size(),
            stream.position()
        );
        Ok(Self {
            stream: Some(stream),
            tree: Some(tree),
        })
    }

    /// Inserts one box.
    pub fn add(&mut self, data: MBRHandle) -> SpatialResult<()> {
        self.tree.as_mut().ok_or(SpatialError::Closed)?.insert(data)
    }

    /// Inserts every box of an iterator.
    pub fn add_all<I>(&mut self, items: I) -> SpatialResult<()>
    where
        I: IntoIterator<Item = MBRHandle>,
    {
        let tree = self.tree.as_mut().ok_or(SpatialError::Closed)?;
        for item in items {
            tree.insert(item)?;
        }
        Ok(())
    }

    /// The tree built so far.
    pub fn tree(&self) -> SpatialResult<&RTree> {
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
        Ok(stream.into_inner())
    }

    /// Serializes the tree and closes the stream.
    pub fn close(self) -> SpatialResult<()> {
        self.finish().map(drop)
    }
}

impl<W: Write + Seek> RTreeWriter<W> {
    /// Creates a writer for an index starting at the stream's current position.
    pub fn at_current_position(stream: W, config: RTreeConfig) -> SpatialResult<Self> {
        Self::from_positioned(PositionedWriter::from_seekable(stream)?, config)
    }
}

impl RTreeWriter<BufWriter<File>> {
    /// Creates (or truncates) an index file and a writer over it.
    pub fn create(
        path: impl AsRef<Path>,
        node_low_size: usize,
        node_high_size: usize,
    ) -> SpatialResult<Self> {
        let stream = create_index_file(path.as_ref())?;
        log::debug!("creating R-tree index at {:?}", path.as_ref());
        Self::new(stream, node_low_size, node_high_size)
    }
}

impl<W: Write> Drop for RTreeWriter<W> {
    fn drop(&mut self) {
        if let Some(tree) = self.tree.take() {
            log::warn!(
                "R-tree writer dropped without close, {} entries discarded",
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
    use crate::extent::Extent;
    use crate::rtree::RTreeReader;
    use crate::spatial_reader::SpatialReader;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn boxes(n: i64) -> Vec<MBRHandle> {
        (0..n)
            .map(|i| {
                let x = (i % 10) as f64 * 3.0;
                let y = (i / 10) as f64 * 3.0;
                MBRHandle::new(Extent::new(x, y, x + 1.0, y + 1.0), i)
            })
            .collect()
    }

    #[test]
    fn test_index_after_prefix_with_seekable_stream() {
        let mut cursor = Cursor::new(Vec::new());
        cursor.write_all(&[0xAB; 17]).unwrap();

        let mut writer = RTreeWriter::at_current_position(cursor, RTreeConfig::new(2, 4)).unwrap();
        writer.add_all(boxes(30)).unwrap();
        let mut stream = writer.finish().unwrap();

        stream.set_position(17);
        let mut reader = RTreeReader::new(stream).unwrap();
        assert_eq!(reader.root_handle(), 25);
        assert_eq!(
            reader
                .count_extent(&Extent::new(-1.0, -1.0, 100.0, 100.0))
                .unwrap(),
            30
        );
    }

    #[test]
    fn test_explicit_offset() {
        let mut writer = RTreeWriter::with_offset(Vec::new(), RTreeConfig::new(2, 4), 100).unwrap();
        writer.add_all(boxes(12)).unwrap();
        let tail = writer.finish().unwrap();

        let mut data = vec![0u8; 100];
        data.extend_from_slice(&tail);
        let mut cursor = Cursor::new(data);
        cursor.set_position(100);

        let mut reader = RTreeReader::new(cursor).unwrap();
        let found = reader
            .collect_extent(&Extent::new(0.0, 0.0, 2.0, 2.0))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].handle, 0);
    }

    #[test]
    fn test_tree_inspection_before_finish() {
        let mut writer = RTreeWriter::new(Vec::new(), 2, 4).unwrap();
        writer.add(boxes(1)[0]).unwrap();
        assert_eq!(writer.tree().unwrap().len(), 1);
        assert!(writer.finish().is_ok());
    }

    #[test]
    fn test_create_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boxes.rt");

        let mut writer = RTreeWriter::create(&path, 4, 8).unwrap();
        writer.add_all(boxes(100)).unwrap();
        writer.close().unwrap();

        let mut reader = RTreeReader::open(&path).unwrap();
        let found = reader
            .collect_extent(&Extent::new(0.0, 0.0, 4.0, 4.0))
            .unwrap();
        let mut handles: Vec<i64> = found.iter().map(|f| f.handle).collect();
        handles.sort_unstable();
        assert_eq!(handles, vec![0, 1, 10, 11]);
    }

    #[test]
    fn test_invalid_fan_out() {
        assert!(matches!(
            RTreeWriter::new(Vec::new(), 3, 1),
            Err(SpatialError::InvalidConfiguration(_))
        ));
    }
}
