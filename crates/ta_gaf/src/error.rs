//! Error types that can be emitted from this library
//!

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

    /// File is not a GAF file
    #[error("unknown gaf version {0:#010x}")]
    #[diagnostic(code(ta_gaf::version))]
    InvalidVersion(u32),

    /// unable to decode sprite data
    #[error("unable to decode sprite data")]
    #[diagnostic(code(ta_gaf::decode))]
    Decode(#[from] DecodeError),

    /// No entry with the given index
    #[error("entry {0} does not exist")]
    EntryNotFound(usize),

    /// Palette file is too short
    #[error("palette has {0} bytes, expected 1024")]
    InvalidPalette(usize),
}

/// Error type for malformed sprite data
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// unknown frame encoding {0}
    #[error("unknown frame encoding {0}")]
    UnknownEncoding(u8),

    /// {len} bytes at offset {offset} fall outside the file
    #[error("{len} bytes at offset {offset:#x} fall outside the file")]
    OutOfBounds {
        /// Offset read from the file
        offset: u64,
        /// Number of bytes requested
        len: u64,
    },

    /// a run writes past the end of row {row}
    #[error("a run writes past the end of row {row}")]
    RowOverrun {
        /// Row being decoded
        row: usize,
    },

    /// row {row} reads past its encoded length
    #[error("row {row} reads past its encoded length")]
    LineOverrun {
        /// Row being decoded
        row: usize,
    },

    /// sub frames may not have sub frames of their own
    #[error("sub frames may not have sub frames of their own")]
    NestedSubFrame,

    /// sub frame layout {actual} does not match frame layout {expected}
    #[error("sub frame layout {actual} does not match frame layout {expected}")]
    LayoutMismatch {
        /// Layout of the parent frame
        expected: crate::types::PixelLayout,
        /// Layout of the sub frame
        actual: crate::types::PixelLayout,
    },

    /// frame of {width}x{height} pixels is larger than allowed
    #[error("frame of {width}x{height} pixels is larger than allowed")]
    TooLarge {
        /// Declared width
        width: u16,
        /// Declared height
        height: u16,
    },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
