use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::TransferError;

/// Gzip-compresses a single chunk.
///
/// Chunks are compressed independently; the chunk digest is always taken
/// over the input, never over the output of this function.
pub fn gzip(data: &[u8]) -> Result<Vec<u8>, TransferError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
