use crate::hash::digest;

/// A contiguous slice of an in-memory payload, uploaded as one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// 0-based chunk index.
    pub index: u32,
    /// Byte offset of the first byte within the payload.
    pub offset: usize,
    /// Raw, uncompressed chunk bytes.
    pub data: &'a [u8],
}

impl Chunk<'_> {
    /// Number of bytes in this chunk.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Tagged digest of the uncompressed bytes.
    pub fn hash(&self) -> String {
        digest(self.data)
    }
}
