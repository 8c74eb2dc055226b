//! This library handles reading **HPI** archives used by *Total Annihilation* and
//! *Total Annihilation: Kingdoms*.
//!
//! # HPI Archive Format Documentation
//!
//! HPI files bundle the game's assets (models, sprites, maps, scripts) into a single file with
//! an embedded directory tree. Mods ship the same format under the `.ufo`, `.gp3`, `.ccx` and
//! `.gpf` extensions.
//!
//! ## File Structure
//!
//! Every archive starts with the same fixed header, followed by an extension header whose
//! layout depends on the version.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Marker                 | 4 bytes: 0x49504148 ("HAPI")                               |
//! | 0x0004         | Version                | 4 bytes: 0x00010000 (TA) or 0x00020000 (Kingdoms)          |
//!
//! Saved games reuse the marker with the version "BANK" and are not supported.
//!
//! ### Total Annihilation
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0008         | Directory Size         | 4 bytes: Number of directory bytes to read                 |
//! | 0x000C         | Header Key             | 4 bytes: Archive cipher key, 0 when not encrypted          |
//! | 0x0010         | Directory Offset       | 4 bytes: Offset of the root directory header               |
//!
//! When the header key is non zero, every byte after the header is encrypted with a position
//! dependent XOR stream (see [`cipher::Cipher`]). Directory offsets are absolute file offsets.
//!
//! A directory header holds an entry count and the offset of its entry array. Each 9 byte
//! entry holds a name offset, a data offset and a flag byte whose lowest bit marks a nested
//! directory. A file's data offset points at a 9 byte descriptor:
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Data Offset            | 4 bytes: Offset of the file data                           |
//! | 0x0004         | Size                   | 4 bytes: Size of the file once extracted                   |
//! | 0x0008         | Compression            | 1 byte: `0` none, `1` LZ77, `2` zlib                       |
//!
//! Compressed files begin with a table of `ceil(size / 65536)` chunk sizes followed by the
//! chunks themselves.
//!
//! ### Total Annihilation: Kingdoms
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0008         | Directory Offset       | 4 bytes: Offset of the directory block                     |
//! | 0x000C         | Directory Size         | 4 bytes: Size of the directory block                       |
//! | 0x0010         | Names Offset           | 4 bytes: Offset of the name block                          |
//! | 0x0014         | Names Size             | 4 bytes: Size of the name block                            |
//! | 0x0018         | Data Offset            | 4 bytes: Offset of the first data chunk                    |
//! | 0x001C         | Verification Offset    | 4 bytes: Offset of the vendor verification bytes           |
//!
//! Both blocks are either stored raw or wrapped in a single chunk. The directory block starts
//! with the root directory; offsets inside it are relative to the block, names are offsets
//! into the name block. File data is a run of chunks unless the file is stored.
//!
//! ### Chunks
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Marker                 | 4 bytes: 0x48535153 ("SQSH")                               |
//! | 0x0004         | Reserved               | 1 byte: Always 0x02                                        |
//! | 0x0005         | Compression            | 1 byte: `0` none, `1` LZ77, `2` zlib                       |
//! | 0x0006         | Encryption             | 1 byte: Non zero when the payload is encrypted             |
//! | 0x0007         | Compressed Size        | 4 bytes: Size of the payload                               |
//! | 0x000B         | Decompressed Size      | 4 bytes: Size of the payload once decoded                  |
//! | 0x000F         | Checksum               | 4 bytes: Wrapping sum of the stored payload bytes          |
//!
//! ## Additional Information
//!
//! - **File Extension**: `.hpi`, `.ufo`, `.gp3`, `.ccx`, `.gpf`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod chunk;
pub mod cipher;
pub mod compression;
pub mod error;
pub mod read;
pub mod tree;
pub mod types;
pub mod vfs;

pub use compression::CompressionMethod;
pub use read::{HpiArchive, HpiFile, HpiOptions};
pub use tree::{Directory, Entry, FileRecord, Item, ItemKind, Listing};
pub use types::HpiVersion;
pub use vfs::FileSystem;
