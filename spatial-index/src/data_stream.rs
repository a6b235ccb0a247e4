//! Byte-stream layer shared by both index formats.
//!
//! Every value is fixed width and big-endian: `i32` (4 bytes), `i64` and
//! `f64` (8 bytes), `bool` (1 byte, non-zero reads as true). There is no
//! variable-length encoding anywhere in either format.
//!
//! Readers need `Read + Seek` so nodes can be pulled on demand, one seek and
//! one decode at a time. Writers only need `Write`; the absolute position is
//! tracked by [`PositionedWriter`].

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::extent::Extent;
use crate::index_types::{PointData, SpatialError, SpatialResult};

/// Fixed-width big-endian decoding for index streams.
pub trait IndexRead: Read {
    fn read_int(&mut self) -> io::Result<i32> {
        self.read_i32::<BigEndian>()
    }

    fn read_long(&mut self) -> io::Result<i64> {
        self.read_i64::<BigEndian>()
    }

    fn read_double(&mut self) -> io::Result<f64> {
        self.read_f64::<BigEndian>()
    }

    fn read_bool(&mut self) -> io::Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Reads an `i32` element count, rejecting negative values.
    fn read_count(&mut self) -> SpatialResult<usize> {
        let count = self.read_int()?;
        usize::try_from(count)
            .map_err(|_| SpatialError::Corrupt(format!("negative element count {}", count)))
    }

    fn read_point(&mut self) -> io::Result<PointData> {
        let x = self.read_double()?;
        let y = self.read_double()?;
        let address = self.read_long()?;
        Ok(PointData::new(x, y, address))
    }

    fn read_extent(&mut self) -> io::Result<Extent> {
        let xmin = self.read_double()?;
        let ymin = self.read_double()?;
        let xmax = self.read_double()?;
        let ymax = self.read_double()?;
        Ok(Extent::new(xmin, ymin, xmax, ymax))
    }
}

impl<R: Read + ?Sized> IndexRead for R {}

/// Fixed-width big-endian encoding for index streams.
pub trait IndexWrite: Write {
    fn write_int(&mut self, value: i32) -> io::Result<()> {
        self.write_i32::<BigEndian>(value)
    }

    fn write_long(&mut self, value: i64) -> io::Result<()> {
        self.write_i64::<BigEndian>(value)
    }

    fn write_double(&mut self, value: f64) -> io::Result<()> {
        self.write_f64::<BigEndian>(value)
    }

    fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.write_u8(u8::from(value))
    }

    /// Writes an element count as `i32`.
    fn write_count(&mut self, count: usize) -> SpatialResult<()> {
        let count = i32::try_from(count).map_err(|_| {
            SpatialError::Consistency(format!("element count {} does not fit in i32", count))
        })?;
        Ok(self.write_int(count)?)
    }

    fn write_point(&mut self, point: &PointData) -> io::Result<()> {
        self.write_double(point.x)?;
        self.write_double(point.y)?;
        self.write_long(point.address)
    }

    fn write_extent(&mut self, extent: &Extent) -> io::Result<()> {
        self.write_double(extent.xmin)?;
        self.write_double(extent.ymin)?;
        self.write_double(extent.xmax)?;
        self.write_double(extent.ymax)
    }
}

impl<W: Write + ?Sized> IndexWrite for W {}

/// Returns the current absolute position of a seekable stream.
pub fn current_position<S: Seek + ?Sized>(stream: &mut S) -> SpatialResult<u64> {
    Ok(stream.stream_position()?)
}

/// Seeks a stream to an absolute byte offset.
pub fn seek_to<S: Seek + ?Sized>(stream: &mut S, offset: u64) -> SpatialResult<()> {
    stream.seek(io::SeekFrom::Start(offset))?;
    Ok(())
}

/// A writer that knows its absolute position in the underlying stream.
///
/// The start position is either given explicitly (for append-only sinks that
/// already hold a known number of bytes) or taken from a seekable stream.
#[derive(Debug)]
pub struct PositionedWriter<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> PositionedWriter<W> {
    /// Wraps a writer whose next byte lands at `start`.
    pub fn new(inner: W, start: u64) -> Self {
        Self {
            inner,
            position: start,
        }
    }

    /// Absolute offset of the next byte written.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> PositionedWriter<W> {
    /// Wraps a seekable writer at its current position.
    pub fn from_seekable(mut inner: W) -> SpatialResult<Self> {
        let start = current_position(&mut inner)?;
        Ok(Self::new(inner, start))
    }
}

impl<W: Write> Write for PositionedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.position += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Create (or truncate) an index file for writing
pub fn create_index_file(path: &Path) -> SpatialResult<BufWriter<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    Ok(BufWriter::new(file))
}

/// Open an existing index file for searching
pub fn open_index_file(path: &Path) -> SpatialResult<BufReader<File>> {
    let file = OpenOptions::new().read(true).open(path)?;
    Ok(BufReader::new(file))
}
