use std::io;
use std::sync::Arc;

use super::errors::{FsError, FsResult};
use super::store::ChunkStore;

/// Positioned write cursor over one file's content.
///
/// The handle is a thin cursor: it performs no synchronization of its own
/// beyond the store's per-call lock. Two independently opened handles on
/// the same file interleave their writes at per-call granularity, producing
/// interleaved rather than merged byte ranges; callers wanting a single
/// consistent stream must coordinate externally. Release is scoped: content
/// and metadata live with the entry, so dropping the handle is always safe.
pub struct WriteHandle {
    store: Arc<ChunkStore>,
    position: u64,
}

impl WriteHandle {
    pub(super) fn new(store: Arc<ChunkStore>, position: u64) -> Self {
        Self { store, position }
    }

    pub fn write(&mut self, data: &[u8]) {
        self.store.write(self.position, data);
        self.position += data.len() as u64;
    }

    /// Move the cursor. Positions past the current end are valid; the gap
    /// reads back as zeros once written over.
    pub fn seek(&mut self, position: u64) {
        self.position = position;
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}

impl io::Write for WriteHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        WriteHandle::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Seek for WriteHandle {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        self.position = resolve_seek(pos, self.position, self.store.size())?;
        Ok(self.position)
    }
}

/// Positioned read cursor over one file's content.
pub struct ReadHandle {
    store: Arc<ChunkStore>,
    position: u64,
}

impl ReadHandle {
    pub(super) fn new(store: Arc<ChunkStore>) -> Self {
        Self { store, position: 0 }
    }

    /// Read at the cursor, advancing it by the count returned. `None` is
    /// the end-of-stream sentinel; a `Some` count may be smaller than the
    /// buffer, so exact-count callers loop (or use [`read_fully`]).
    ///
    /// [`read_fully`]: ReadHandle::read_fully
    pub fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        let n = self.store.read(self.position, buf)?;
        self.position += n as u64;
        Some(n)
    }

    /// Read at an explicit position without touching the cursor.
    pub fn read_at(&self, position: u64, buf: &mut [u8]) -> Option<usize> {
        self.store.read(position, buf)
    }

    /// Fill `buf` from `position`, looping over partial reads. Fails with
    /// InvalidArgument when the content ends before the buffer is full.
    pub fn read_fully(&self, position: u64, buf: &mut [u8]) -> FsResult<()> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.store.read(position + filled as u64, &mut buf[filled..]) {
                Some(n) => filled += n,
                None => return Err(FsError::InvalidArgument),
            }
        }
        Ok(())
    }

    /// Move the cursor; positions past the logical size are rejected.
    pub fn seek(&mut self, position: u64) -> FsResult<()> {
        if position > self.store.size() {
            return Err(FsError::InvalidArgument);
        }
        self.position = position;
        Ok(())
    }

    pub fn position(&self) -> u64 {
        self.position
    }
}

impl io::Read for ReadHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Ok(0) is the io convention for end of stream.
        Ok(ReadHandle::read(self, buf).unwrap_or(0))
    }
}

impl io::Seek for ReadHandle {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let target = resolve_seek(pos, self.position, self.store.size())?;
        ReadHandle::seek(self, target)?;
        Ok(self.position)
    }
}

fn resolve_seek(pos: io::SeekFrom, current: u64, end: u64) -> Result<u64, FsError> {
    let (base, delta) = match pos {
        io::SeekFrom::Start(n) => return Ok(n),
        io::SeekFrom::Current(d) => (current, d),
        io::SeekFrom::End(d) => (end, d),
    };
    base.checked_add_signed(delta).ok_or(FsError::InvalidArgument)
}
