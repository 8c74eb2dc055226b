//! Stream ciphers used by HPI archives.
//!
//! Two independent layers exist. The archive cipher is keyed by the `header_key` field of a
//! Total Annihilation header and covers every byte after the fixed header. The chunk cipher is
//! selected by a chunk's own encryption flag and covers only that chunk's payload.

/// Position dependent XOR cipher keyed by an archive header.
///
/// The keystream byte for absolute file position `p` is derived from `p` and the key alone, so
/// any range of the archive can be decoded without touching the bytes before it. Applying the
/// transform twice restores the input.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Cipher {
    key: u32,
}

impl Cipher {
    /// Derives the cipher from the raw `header_key` stored in the archive.
    ///
    /// A header key of zero disables the cipher.
    pub fn new(header_key: u32) -> Self {
        let key = if header_key == 0 {
            0
        } else {
            !((header_key << 2) | (header_key >> 6))
        };
        Cipher { key }
    }

    /// The derived key, or zero when the archive is not encrypted.
    pub fn key(&self) -> u32 {
        self.key
    }

    /// Whether this cipher changes any bytes.
    pub fn is_enabled(&self) -> bool {
        self.key != 0
    }

    /// Transforms `data` in place, treating `data[0]` as absolute position `start`.
    pub fn apply(&self, data: &mut [u8], start: u64) {
        if !self.is_enabled() {
            return;
        }
        for (index, byte) in data.iter_mut().enumerate() {
            let position = start.wrapping_add(index as u64) as u32;
            *byte ^= !(position ^ self.key) as u8;
        }
    }

    /// Returns a transformed copy of `data`, treating `data[0]` as absolute position `start`.
    pub fn transform(&self, data: &[u8], start: u64) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply(&mut out, start);
        out
    }
}

/// Reverses the payload cipher of a chunk whose encryption flag is set.
///
/// Byte `i` of the payload was stored as `(plain ^ i) + i`, with `i` truncated to a byte.
pub fn decrypt_chunk_payload(data: &mut [u8]) {
    for (index, byte) in data.iter_mut().enumerate() {
        let x = index as u8;
        *byte = byte.wrapping_sub(x) ^ x;
    }
}
