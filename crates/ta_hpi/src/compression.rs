//! Block decompression handling.

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::{Decompress, FlushDecompress, Status};
use tracing::instrument;

use crate::error::DecodeError;

/// Size of the history window used by [`CompressionMethod::Lz77`]
pub const LZ77_WINDOW_SIZE: usize = 4096;

const LZ77_WINDOW_MASK: usize = LZ77_WINDOW_SIZE - 1;

/// Identifies the storage format used to compress a block inside the HPI file
///
/// The same tags are used by file descriptors and by chunk headers.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum CompressionMethod {
    /// Stores the data as it is
    #[default]
    None = 0,

    /// Compress the data using the archive's own LZ77 variant
    Lz77 = 1,

    /// Compress the data using Zlib
    Zlib = 2,
}

impl TryFrom<u8> for CompressionMethod {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressionMethod::None),
            1 => Ok(CompressionMethod::Lz77),
            2 => Ok(CompressionMethod::Zlib),
            other => Err(DecodeError::UnknownCompression(other)),
        }
    }
}

impl std::fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressionMethod::None => write!(f, "none"),
            CompressionMethod::Lz77 => write!(f, "lz77"),
            CompressionMethod::Zlib => write!(f, "zlib"),
        }
    }
}

impl CompressionMethod {
    /// Decompresses `input` into exactly `size` bytes.
    ///
    /// Any output that does not match `size` is rejected.
    #[instrument(skip(input), fields(input = input.len()), err)]
    pub fn decompress(self, input: &[u8], size: usize) -> Result<Vec<u8>, DecodeError> {
        let output = match self {
            CompressionMethod::None => input.to_vec(),
            CompressionMethod::Lz77 => decompress_lz77(input, size)?,
            CompressionMethod::Zlib => decompress_zlib(input, size)?,
        };

        if output.len() != size {
            return Err(DecodeError::SizeMismatch {
                expected: size as u64,
                actual: output.len() as u64,
            });
        }
        Ok(output)
    }
}

/// Decodes the LZ77 variant used by HPI chunks.
///
/// Each control byte supplies eight flags, least significant bit first. A clear flag copies one
/// literal byte. A set flag reads a little endian token whose upper twelve bits select a window
/// position and whose lower four bits plus two give the run length. Position zero ends the
/// stream. Output never grows beyond `limit` bytes.
pub fn decompress_lz77(input: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
    let mut output = Vec::with_capacity(limit.min(input.len().saturating_mul(9)));
    let mut window = [0u8; LZ77_WINDOW_SIZE];
    let mut cursor = 1usize;
    let mut reader = input;

    let truncated = |reader: &[u8]| DecodeError::Truncated(input.len() - reader.len());

    'stream: while output.len() < limit {
        let flags = reader.read_u8().map_err(|_| truncated(reader))?;

        for bit in 0..8 {
            if output.len() >= limit {
                break 'stream;
            }

            if flags & (1 << bit) == 0 {
                let byte = reader.read_u8().map_err(|_| truncated(reader))?;
                output.push(byte);
                window[cursor] = byte;
                cursor = (cursor + 1) & LZ77_WINDOW_MASK;
                continue;
            }

            let token = reader
                .read_u16::<LittleEndian>()
                .map_err(|_| truncated(reader))?;
            let mut position = (token >> 4) as usize;
            if position == 0 {
                break 'stream;
            }

            let count = (token & 0x0F) as usize + 2;
            for _ in 0..count.min(limit - output.len()) {
                let byte = window[position];
                output.push(byte);
                window[cursor] = byte;
                position = (position + 1) & LZ77_WINDOW_MASK;
                cursor = (cursor + 1) & LZ77_WINDOW_MASK;
            }
        }
    }

    Ok(output)
}

/// Inflates a zlib stream that must finish within `limit` bytes.
///
/// The output buffer grows on demand so a bogus declared size does not translate into a large
/// allocation up front.
pub fn decompress_zlib(input: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
    let mut output = Vec::with_capacity(limit.min(input.len().saturating_mul(4).max(1024)));
    let mut inflater = Decompress::new(true);

    loop {
        let (total_in, total_out) = (inflater.total_in(), inflater.total_out());
        let status = inflater
            .decompress_vec(
                &input[total_in as usize..],
                &mut output,
                FlushDecompress::Finish,
            )
            .map_err(|e| DecodeError::Inflate(e.to_string()))?;
        let progressed = inflater.total_in() != total_in || inflater.total_out() != total_out;

        match status {
            Status::StreamEnd if output.len() <= limit => return Ok(output),
            _ if output.len() >= limit => {
                return Err(DecodeError::Inflate(format!(
                    "stream did not finish within {limit} bytes"
                )))
            }
            _ if output.len() == output.capacity() => {
                let grow = output.len().max(1024).min(limit - output.len());
                output.reserve_exact(grow);
            }
            _ if progressed => continue,
            _ => return Err(DecodeError::Truncated(total_in as usize)),
        }
    }
}
