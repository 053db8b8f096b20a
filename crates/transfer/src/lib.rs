//! Payload chunking, content digests and per-chunk compression.
//!
//! Everything here is pure and works on in-memory buffers; the network
//! side of an upload lives in `packsync-uploader`.

mod chunked;
mod compress;
mod hash;
mod progress;
mod types;
mod validation;

pub use chunked::ChunkPlan;
pub use compress::gzip;
pub use hash::{DIGEST_PREFIX, checksum_bytes, digest};
pub use progress::{
    CHUNKS_END, SETUP_END, SpeedCalculator, TOTAL, chunk_progress,
};
pub use types::Chunk;
pub use validation::normalize_entry_path;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    #[error("payload of {total_size} bytes needs more than {max} chunks")]
    TooManyChunks { total_size: usize, max: u32 },

    #[error("chunk index {index} out of range (total {total})")]
    ChunkOutOfRange { index: u32, total: u32 },

    #[error("invalid path: {0}")]
    InvalidPath(String),
}
