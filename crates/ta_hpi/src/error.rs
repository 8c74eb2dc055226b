//! Error types that can be emitted from this library
//!
//! Errors fall into two scopes. [`Error::Format`] and [`Error::Integrity`] are raised while
//! opening an archive and leave it unusable. [`Error::CorruptData`] and [`Error::Decode`] are
//! raised by a single extraction and leave the rest of the archive readable.

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is not a readable hpi archive
    #[error("file is not a readable hpi archive")]
    #[diagnostic(code(ta_hpi::format))]
    Format(#[from] FormatError),

    /// archive structure is damaged
    #[error("archive structure is damaged")]
    #[diagnostic(code(ta_hpi::integrity))]
    Integrity(#[from] IntegrityError),

    /// checksum mismatch, partial data is available
    #[error(
        "chunk {} checksum mismatch (expected {:#010x}, found {:#010x}), {} bytes recovered",
        .0.chunk, .0.expected, .0.actual, .0.partial.len()
    )]
    #[diagnostic(
        code(ta_hpi::corrupt_data),
        help("the recovered bytes may be inspected with `Error::partial_data`")
    )]
    CorruptData(Box<CorruptData>),

    /// unable to decode entry data
    #[error("unable to decode entry data")]
    #[diagnostic(code(ta_hpi::decode))]
    Decode(#[from] DecodeError),

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),
}

impl Error {
    /// Bytes recovered before a checksum mismatch was detected, if this error carries any.
    pub fn partial_data(&self) -> Option<&[u8]> {
        match self {
            Error::CorruptData(corrupt) => Some(&corrupt.partial),
            _ => None,
        }
    }

    /// Consumes the error and returns the recovered bytes of a [`Error::CorruptData`].
    pub fn into_partial_data(self) -> Option<Vec<u8>> {
        match self {
            Error::CorruptData(corrupt) => Some(corrupt.partial),
            _ => None,
        }
    }

    /// Whether the error invalidates the whole archive rather than a single entry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Format(_) | Error::Integrity(_) | Error::IOError(_) | Error::BinRWError(_)
        )
    }
}

/// Details of a chunk whose stored checksum did not match its contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptData {
    /// Index of the first failing chunk within the entry
    pub chunk: usize,
    /// Checksum declared by the chunk header
    pub expected: u32,
    /// Checksum computed over the stored payload
    pub actual: u32,
    /// Every byte decoded before extraction stopped
    pub partial: Vec<u8>,
}

/// Error type for problems with the archive header
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// bad marker {0:#010x}, expected HAPI
    #[error("bad marker {0:#010x}, expected HAPI")]
    BadMarker(u32),

    /// unknown archive version {0:#010x}
    #[error("unknown archive version {0:#010x}")]
    UnknownVersion(u32),

    /// archive version {0:#010x} is not supported
    #[error("archive version {0:#010x} is not supported")]
    Unsupported(u32),

    /// file of {0} bytes is too short for the archive header
    #[error("file of {0} bytes is too short for the archive header")]
    Truncated(usize),
}

/// Error type for offsets and references that cannot be trusted
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// {len} bytes at offset {offset} fall outside the {region} ({bound} bytes)
    #[error("{len} bytes at offset {offset:#x} fall outside the {region} ({bound:#x} bytes)")]
    OutOfBounds {
        /// Name of the region being read
        region: &'static str,
        /// Offset read from the archive
        offset: u64,
        /// Number of bytes requested
        len: u64,
        /// Size of the region
        bound: u64,
    },

    /// directory at offset {0} is referenced more than once
    #[error("directory at offset {0:#x} is referenced more than once")]
    Cycle(u64),

    /// name at offset {0} is not terminated
    #[error("name at offset {0:#x} is not terminated")]
    UnterminatedName(u64),

    /// directories are nested deeper than {0} levels
    #[error("directories are nested deeper than {0} levels")]
    TooDeep(usize),

    /// the {region} block cannot be decoded
    #[error("the {region} block cannot be decoded")]
    Block {
        /// Name of the metadata block
        region: &'static str,
        /// Why decoding failed
        #[source]
        source: DecodeError,
    },
}

/// Error type for malformed compressed data
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// bad chunk marker {0:#010x}, expected SQSH
    #[error("bad chunk marker {0:#010x}, expected SQSH")]
    BadChunkMarker(u32),

    /// unknown compression method {0}
    #[error("unknown compression method {0}")]
    UnknownCompression(u8),

    /// compressed stream ended early
    #[error("compressed stream ended after {0} bytes")]
    Truncated(usize),

    /// decoded {actual} bytes, expected {expected}
    #[error("decoded {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Declared size
        expected: u64,
        /// Produced size
        actual: u64,
    },

    /// chunk declares {size} decompressed bytes
    #[error("chunk declares {size} decompressed bytes, limit is {limit}")]
    ChunkTooLarge {
        /// Declared size
        size: u64,
        /// Largest size allowed
        limit: u64,
    },

    /// entry declares {size} bytes, limit is {limit}
    #[error("entry declares {size} bytes, limit is {limit}")]
    TooLarge {
        /// Declared size
        size: u64,
        /// Configured limit
        limit: u64,
    },

    /// checksum mismatch in a metadata chunk
    #[error("checksum mismatch (expected {expected:#010x}, found {actual:#010x})")]
    ChecksumMismatch {
        /// Checksum declared by the chunk header
        expected: u32,
        /// Checksum computed over the payload
        actual: u32,
    },

    /// zlib stream error
    #[error("zlib stream error: {0}")]
    Inflate(String),

    /// entry data range is out of bounds
    #[error("{len} bytes at offset {offset:#x} fall outside the archive")]
    OutOfBounds {
        /// Offset of the data
        offset: u64,
        /// Number of bytes requested
        len: u64,
    },
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// by path {0}
    #[error("by path {0}")]
    Path(String),

    /// by index {0}
    #[error("by index {0}")]
    Index(usize),

    /// {0} is a directory
    #[error("{0} is a directory")]
    IsDirectory(String),

    /// {0} is a file
    #[error("{0} is a file")]
    NotDirectory(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
