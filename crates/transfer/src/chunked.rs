use std::ops::Range;

use crate::TransferError;
use crate::types::Chunk;

/// Partition of a payload into fixed-size chunks.
///
/// Every chunk except possibly the last holds exactly `chunk_size` bytes;
/// the ranges cover `[0, total_size)` with no gaps or overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total_size: usize,
    chunk_size: usize,
    total_chunks: u32,
}

impl ChunkPlan {
    /// Plans `total_size` bytes in chunks of `chunk_size`.
    ///
    /// A zero-length payload yields a plan with no chunks.
    pub fn new(total_size: usize, chunk_size: usize) -> Result<Self, TransferError> {
        if chunk_size == 0 {
            return Err(TransferError::ZeroChunkSize);
        }
        let total_chunks = u32::try_from(total_size.div_ceil(chunk_size)).map_err(|_| {
            TransferError::TooManyChunks {
                total_size,
                max: u32::MAX,
            }
        })?;
        Ok(Self {
            total_size,
            chunk_size,
            total_chunks,
        })
    }

    /// Total payload size in bytes.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Nominal chunk size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// `ceil(total_size / chunk_size)`.
    pub fn total_chunks(&self) -> u32 {
        self.total_chunks
    }

    /// Byte range of chunk `index`.
    pub fn range(&self, index: u32) -> Result<Range<usize>, TransferError> {
        if index >= self.total_chunks {
            return Err(TransferError::ChunkOutOfRange {
                index,
                total: self.total_chunks,
            });
        }
        let start = index as usize * self.chunk_size;
        let end = (start + self.chunk_size).min(self.total_size);
        Ok(start..end)
    }

    /// Length of chunk `index` in bytes.
    pub fn chunk_len(&self, index: u32) -> Result<usize, TransferError> {
        self.range(index).map(|r| r.len())
    }

    /// Borrows chunk `index` out of `payload`.
    ///
    /// `payload` must be the buffer this plan was built for.
    pub fn chunk<'a>(&self, payload: &'a [u8], index: u32) -> Result<Chunk<'a>, TransferError> {
        debug_assert_eq!(payload.len(), self.total_size);
        let range = self.range(index)?;
        let offset = range.start;
        Ok(Chunk {
            index,
            offset,
            data: &payload[range],
        })
    }

    /// Iterates over every chunk of `payload` in index order.
    pub fn chunks<'a>(self, payload: &'a [u8]) -> impl Iterator<Item = Chunk<'a>> + 'a {
        (0..self.total_chunks).filter_map(move |i| self.chunk(payload, i).ok())
    }
}
