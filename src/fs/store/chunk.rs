use bytes::BytesMut;
use parking_lot::RwLock;

/// Chunked byte container backing one file's content.
///
/// Content is held as a sequence of fixed-size chunks allocated lazily:
/// a chunk is zero-filled to the full chunk size the first time it is
/// touched, so writes past the current end leave sparse zero gaps. The
/// logical size tracks the highest byte ever written, independent of
/// physical chunk capacity; bytes at positions >= the logical size are
/// never returned to readers.
///
/// One reader-writer lock guards the store: `write` and `truncate` take it
/// exclusively, `read`/`read_at`/`size` share it. Reads on distinct stores
/// proceed fully in parallel.
pub struct ChunkStore {
    chunk_size: usize,
    inner: RwLock<Chunks>,
}

struct Chunks {
    chunks: Vec<BytesMut>,
    size: u64,
}

impl ChunkStore {
    pub fn new(chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0);
        Self {
            chunk_size,
            inner: RwLock::new(Chunks {
                chunks: Vec::new(),
                size: 0,
            }),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Current logical size in bytes.
    pub fn size(&self) -> u64 {
        self.inner.read().size
    }

    /// Write `data` starting at `position`, extending the logical size if
    /// the write ends past it. There is no upper bound on `position` other
    /// than available memory.
    pub fn write(&self, position: u64, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        let mut inner = self.inner.write();
        let mut current = position;
        let mut written = 0usize;

        while written < data.len() {
            let chunk_index = (current / self.chunk_size as u64) as usize;
            let chunk_offset = (current % self.chunk_size as u64) as usize;

            let chunk_size = self.chunk_size;
            // Missing chunks up to the target are allocated zero-filled to
            // the full chunk size, which is what makes gaps read as zeros.
            while chunk_index >= inner.chunks.len() {
                inner.chunks.push(BytesMut::zeroed(chunk_size));
            }

            let chunk = &mut inner.chunks[chunk_index];
            // A truncated tail chunk re-extends to full length with zeros.
            if chunk.len() < chunk_size {
                chunk.resize(chunk_size, 0);
            }

            let space = chunk_size - chunk_offset;
            let step = (data.len() - written).min(space);
            chunk[chunk_offset..chunk_offset + step]
                .copy_from_slice(&data[written..written + step]);

            current += step as u64;
            written += step;
        }

        let end = position + data.len() as u64;
        if end > inner.size {
            inner.size = end;
        }
    }

    /// Read into `buf` starting at `position`.
    ///
    /// Returns `None` once `position` is at or past the logical size (end
    /// of stream, distinct from a zero-length read into an empty buffer).
    /// Otherwise returns the number of bytes copied, clipped so no byte at
    /// or beyond the logical size is returned; callers needing an exact
    /// count must loop.
    pub fn read(&self, position: u64, buf: &mut [u8]) -> Option<usize> {
        let inner = self.inner.read();
        if position >= inner.size {
            return None;
        }

        let mut current = position;
        let mut copied = 0usize;

        while copied < buf.len() && current < inner.size {
            let chunk_index = (current / self.chunk_size as u64) as usize;
            let chunk_offset = (current % self.chunk_size as u64) as usize;

            let chunk = &inner.chunks[chunk_index];
            let available = chunk.len() - chunk_offset;
            let mut step = (buf.len() - copied).min(available);
            if current + step as u64 > inner.size {
                step = (inner.size - current) as usize;
            }

            buf[copied..copied + step]
                .copy_from_slice(&chunk[chunk_offset..chunk_offset + step]);

            current += step as u64;
            copied += step;
        }

        Some(copied)
    }

    /// Shrink the content to `new_size` bytes. Growing is a no-op: for any
    /// `new_size >= size` the store is left unchanged.
    pub fn truncate(&self, new_size: u64) {
        let mut inner = self.inner.write();
        if new_size >= inner.size {
            return;
        }

        let keep = new_size.div_ceil(self.chunk_size as u64) as usize;
        inner.chunks.truncate(keep);

        let tail = (new_size % self.chunk_size as u64) as usize;
        if tail > 0
            && let Some(last) = inner.chunks.last_mut()
        {
            last.truncate(tail);
        }

        inner.size = new_size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn round_trip() {
        let store = ChunkStore::new(4);
        store.write(0, b"Hello, world!");

        let mut buf = [0u8; 13];
        assert_eq!(store.read(0, &mut buf), Some(13));
        assert_eq!(&buf, b"Hello, world!");
        assert_eq!(store.size(), 13);
    }

    #[test]
    fn sparse_gap_reads_as_zeros() {
        let store = ChunkStore::new(4);
        store.write(0, b"AB");
        store.write(10, b"CD");

        let mut buf = [0xffu8; 12];
        assert_eq!(store.read(0, &mut buf), Some(12));
        assert_eq!(&buf[..2], b"AB");
        assert_eq!(&buf[2..10], &[0u8; 8]);
        assert_eq!(&buf[10..], b"CD");
        assert_eq!(store.size(), 12);
    }

    #[test]
    fn read_past_end_is_end_of_stream() {
        let store = ChunkStore::new(4);
        store.write(0, b"abc");

        let mut buf = [0u8; 4];
        assert_eq!(store.read(3, &mut buf), None);
        assert_eq!(store.read(100, &mut buf), None);
        // Empty store: position 0 is already past the end.
        let empty = ChunkStore::new(4);
        assert_eq!(empty.read(0, &mut buf), None);
    }

    #[test]
    fn read_clips_at_logical_size() {
        let store = ChunkStore::new(8);
        store.write(0, b"abcde");

        let mut buf = [0u8; 16];
        assert_eq!(store.read(0, &mut buf), Some(5));
        assert_eq!(&buf[..5], b"abcde");
    }

    #[test]
    fn truncate_shrinks_and_never_grows() {
        let store = ChunkStore::new(4);
        store.write(0, b"0123456789");
        assert_eq!(store.size(), 10);

        store.truncate(20);
        assert_eq!(store.size(), 10);

        store.truncate(6);
        assert_eq!(store.size(), 6);
        let mut buf = [0u8; 10];
        assert_eq!(store.read(0, &mut buf), Some(6));
        assert_eq!(&buf[..6], b"012345");

        store.truncate(0);
        assert_eq!(store.size(), 0);
        assert_eq!(store.read(0, &mut buf), None);
    }

    #[test]
    fn write_after_truncate_zero_fills_tail_chunk() {
        let store = ChunkStore::new(4);
        store.write(0, b"abcdefgh");
        store.truncate(5);

        // The tail chunk was shrunk to one byte; writing past it must
        // re-extend it with zeros, not stale data.
        store.write(7, b"Z");
        let mut buf = [0u8; 8];
        assert_eq!(store.read(0, &mut buf), Some(8));
        assert_eq!(&buf, b"abcde\0\0Z");
    }

    #[test]
    fn write_spanning_many_chunks() {
        let store = ChunkStore::new(3);
        let data: Vec<u8> = (0..=255).collect();
        store.write(1, &data);

        let mut buf = vec![0u8; 256];
        assert_eq!(store.read(1, &mut buf), Some(256));
        assert_eq!(buf, data);
        assert_eq!(store.size(), 257);
    }

    #[test]
    fn concurrent_readers_see_consistent_data() {
        let store = Arc::new(ChunkStore::new(16));
        store.write(0, &[7u8; 1024]);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                let mut buf = [0u8; 1024];
                let mut position = 0u64;
                let mut total = 0usize;
                while let Some(n) = store.read(position, &mut buf[total..]) {
                    assert!(buf[total..total + n].iter().all(|&b| b == 7));
                    position += n as u64;
                    total += n;
                }
                assert_eq!(total, 1024);
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
