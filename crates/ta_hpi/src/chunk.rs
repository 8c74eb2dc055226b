//! `SQSH` chunk parsing and decoding.
//!
//! File data is stored as a sequence of self describing chunks. Each chunk carries its own
//! compression tag, encryption flag and checksum, so chunks can be verified and decoded
//! independently of each other.

use std::io::Cursor;

use binrw::BinRead;
use tracing::{instrument, trace};

use crate::cipher::decrypt_chunk_payload;
use crate::compression::CompressionMethod;
use crate::error::DecodeError;
use crate::types::{ChunkHeader, CHUNK_MARKER};

/// A chunk borrowed from a decrypted archive buffer
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    header: ChunkHeader,
    compression: CompressionMethod,
    payload: &'a [u8],
}

/// Whether `data` starts with a chunk marker.
pub fn is_chunk(data: &[u8]) -> bool {
    data.len() >= 4 && u32::from_le_bytes([data[0], data[1], data[2], data[3]]) == CHUNK_MARKER
}

/// Wrapping sum of every byte, the checksum stored in chunk headers.
pub fn checksum(data: &[u8]) -> u32 {
    data.iter()
        .fold(0u32, |sum, &byte| sum.wrapping_add(byte as u32))
}

impl<'a> Chunk<'a> {
    /// Parses the chunk at the start of `data`.
    ///
    /// The payload must be fully contained in `data`; trailing bytes are ignored.
    pub fn parse(data: &'a [u8]) -> Result<Chunk<'a>, DecodeError> {
        if data.len() < ChunkHeader::SIZE {
            return Err(DecodeError::Truncated(data.len()));
        }

        let header = ChunkHeader::read(&mut Cursor::new(&data[..ChunkHeader::SIZE]))
            .map_err(|_| DecodeError::Truncated(data.len()))?;
        if header.marker != CHUNK_MARKER {
            return Err(DecodeError::BadChunkMarker(header.marker));
        }
        let compression = CompressionMethod::try_from(header.compression)?;

        let end = ChunkHeader::SIZE as u64 + header.compressed_size as u64;
        if end > data.len() as u64 {
            return Err(DecodeError::Truncated(data.len()));
        }

        Ok(Chunk {
            header,
            compression,
            payload: &data[ChunkHeader::SIZE..end as usize],
        })
    }

    /// The parsed header
    pub fn header(&self) -> &ChunkHeader {
        &self.header
    }

    /// How the payload is compressed
    pub fn compression(&self) -> CompressionMethod {
        self.compression
    }

    /// Whether the payload is encrypted with the chunk cipher
    pub fn is_encrypted(&self) -> bool {
        self.header.encryption != 0
    }

    /// The stored payload, still compressed and encrypted
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Number of bytes the chunk occupies in the archive, header included
    pub fn stored_len(&self) -> usize {
        ChunkHeader::SIZE + self.payload.len()
    }

    /// Number of bytes the chunk declares once decoded
    pub fn decompressed_size(&self) -> usize {
        self.header.decompressed_size as usize
    }

    /// Checksum computed over the stored payload
    pub fn actual_checksum(&self) -> u32 {
        checksum(self.payload)
    }

    /// Whether the computed checksum matches the header
    pub fn verify(&self) -> bool {
        self.actual_checksum() == self.header.checksum
    }

    /// Decrypts and decompresses the payload.
    ///
    /// The checksum is not consulted; callers decide how to treat a mismatch.
    #[instrument(skip(self), fields(
        compression = %self.compression,
        encrypted = self.is_encrypted(),
        stored = self.payload.len(),
        size = self.header.decompressed_size,
    ), err)]
    pub fn decode(&self) -> Result<Vec<u8>, DecodeError> {
        let size = self.decompressed_size();

        if self.is_encrypted() {
            let mut payload = self.payload.to_vec();
            decrypt_chunk_payload(&mut payload);
            trace!("decrypted chunk payload");
            self.compression.decompress(&payload, size)
        } else {
            self.compression.decompress(self.payload, size)
        }
    }
}

/// Parses and decodes a standalone chunk, rejecting any checksum mismatch.
///
/// Used for metadata blocks, which must be intact for the archive to be usable.
pub fn decode(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let chunk = Chunk::parse(data)?;
    if !chunk.verify() {
        return Err(DecodeError::ChecksumMismatch {
            expected: chunk.header.checksum,
            actual: chunk.actual_checksum(),
        });
    }
    chunk.decode()
}
