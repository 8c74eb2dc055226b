//! # GAF Format Documentation
//!
//! This crate decodes the **GAF** sprite files used by *Total Annihilation* for unit
//! animations, build pictures and interface art, along with the **TAF** variant used by
//! *Total Annihilation: Kingdoms*. A file holds a list of named entries, each a sequence of
//! frames.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Version                | 4 bytes: 0x00010100                                        |
//! | 0x0004         | Entry Count            | 4 bytes: Number of entries                                 |
//! | 0x0008         | Unknown                | 4 bytes: Always zero                                       |
//! | 0x000C         | Entry Offsets          | 4 bytes per entry: Offset of each entry header             |
//!
//! ### Entry
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Frame Count            | 2 bytes: Number of frame table records                     |
//! | 0x0002         | Unknown                | 2 bytes: Always one                                        |
//! | 0x0004         | Unknown                | 4 bytes: Always zero                                       |
//! | 0x0008         | Name                   | 32 bytes: NUL padded name                                  |
//! | 0x0028         | Frame Table            | 8 bytes per frame: Frame offset and an unknown value       |
//!
//! ### Frame
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Width                  | 2 bytes                                                    |
//! | 0x0002         | Height                 | 2 bytes                                                    |
//! | 0x0004         | X Offset               | 2 bytes: Signed                                            |
//! | 0x0006         | Y Offset               | 2 bytes: Signed                                            |
//! | 0x0008         | Transparency           | 1 byte: Transparent palette index                          |
//! | 0x0009         | Compression            | 1 byte: `0` raw, `1` RLE, `4` ARGB4444, `5` ARGB1555       |
//! | 0x000A         | Sub Frame Count        | 2 bytes                                                    |
//! | 0x000C         | Unknown                | 4 bytes: Always zero                                       |
//! | 0x0010         | Data Offset            | 4 bytes: Pixel data, or the sub frame offset array         |
//! | 0x0014         | Unknown                | 4 bytes                                                    |
//!
//! A frame with sub frames owns no pixels. Its data offset points at an array of frame
//! offsets, and each sub frame is painted onto a zeroed canvas at the parent offset minus its
//! own offset.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.gaf`, `.taf`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod error;
pub mod palette;
pub mod read;
pub mod types;

pub use error::{DecodeError, Error, Result};
pub use palette::{Color, Palette};
pub use read::{
    decode, decode_rle, FrameInfo, GafEntry, GafFile, PixelBuffer, SpriteAtlas, SpriteFrame,
    SubFrameInfo,
};
pub use types::{Encoding, PixelLayout};
