//! Base types for structure of HPI file.
//!
//! Every structure is tightly packed and little endian.

use binrw::BinRead;

/// Marker at the start of every HPI file ("HAPI")
pub const HPI_MARKER: u32 = 0x4950_4148;

/// Marker at the start of every data chunk ("SQSH")
pub const CHUNK_MARKER: u32 = 0x4853_5153;

/// Largest decompressed size of a file data chunk in a Total Annihilation archive
pub const MAX_CHUNK_SIZE: u32 = 65536;

/// Identifies which extension header follows the [`HpiHeader`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HpiVersion {
    /// Total Annihilation layout, followed by [`TaExtHeader`]
    Ta,

    /// Total Annihilation: Kingdoms layout, followed by [`TakExtHeader`]
    Kingdoms,
}

impl HpiVersion {
    /// Raw version value for Total Annihilation archives
    pub const TA: u32 = 0x0001_0000;

    /// Raw version value for Kingdoms archives
    pub const KINGDOMS: u32 = 0x0002_0000;

    /// Raw version value of saved games ("BANK"), which share the marker but not the layout
    pub const SAVEGAME: u32 = 0x4B4E_4142;
}

/// HPI file header
///
/// Defines the header of the HPI file which always starts with "HAPI" and then a version.
#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(little)]
pub struct HpiHeader {
    /// Should always be [`HPI_MARKER`]
    pub marker: u32,

    /// Selects the extension header layout
    pub version: u32,
}

impl HpiHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 8;
}

/// Extension header of a Total Annihilation archive
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct TaExtHeader {
    /// The number of bytes of directory data to read
    pub directory_size: u32,

    /// Key for the archive cipher, zero when the archive is not encrypted
    pub header_key: u32,

    /// The offset from the beginning of the file where the root directory header starts
    pub directory_offset: u32,
}

impl TaExtHeader {
    /// Size of the extension header in bytes
    pub const SIZE: usize = 12;
}

/// Header of a directory in a Total Annihilation archive
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct TaDirHeader {
    /// Number of [`TaEntry`] in this directory
    pub entries: u32,

    /// Absolute offset of the entry array
    pub entry_offset: u32,
}

impl TaDirHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 8;
}

/// An item of a directory in a Total Annihilation archive
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct TaEntry {
    /// Absolute offset of a NUL terminated name
    pub name_offset: u32,

    /// Absolute offset of a [`TaDirHeader`] or a [`TaFileEntry`]
    pub data_offset: u32,

    /// Bit 0 marks a directory
    pub flags: u8,
}

impl TaEntry {
    /// Size of the entry in bytes
    pub const SIZE: usize = 9;

    /// Whether the entry points at a nested directory
    pub fn is_directory(&self) -> bool {
        self.flags & 0x01 != 0
    }
}

/// Location and size of a file in a Total Annihilation archive
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct TaFileEntry {
    /// Absolute offset of the file data
    pub data_offset: u32,

    /// The size of the file once decompressed
    pub size: u32,

    /// Compression tag of the file data
    pub compression: u8,
}

impl TaFileEntry {
    /// Size of the entry in bytes
    pub const SIZE: usize = 9;
}

/// Extension header of a Kingdoms archive
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct TakExtHeader {
    /// Offset of the directory block
    pub directory_offset: u32,

    /// Size of the directory block
    pub directory_size: u32,

    /// Offset of the name block
    pub names_offset: u32,

    /// Size of the name block
    pub names_size: u32,

    /// Offset of the first data chunk
    pub data_offset: u32,

    /// Offset of the vendor verification bytes
    pub verification_offset: u32,
}

impl TakExtHeader {
    /// Size of the extension header in bytes
    pub const SIZE: usize = 24;
}

/// A directory in a Kingdoms archive
///
/// All offsets except the name are relative to the start of the directory block.
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct TakDirEntry {
    /// Offset of the directory name within the name block
    pub name_offset: u32,

    /// Offset of the sub directory array
    pub subdirectory_offset: u32,

    /// Number of sub directories
    pub subdirectories: u32,

    /// Offset of the file array
    pub file_offset: u32,

    /// Number of files
    pub files: u32,
}

impl TakDirEntry {
    /// Size of the entry in bytes
    pub const SIZE: usize = 20;
}

/// A file in a Kingdoms archive
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct TakFileEntry {
    /// Offset of the file name within the name block
    pub name_offset: u32,

    /// Absolute offset of the file data
    pub data_offset: u32,

    /// The size of the file once decompressed
    pub size: u32,

    /// The size of the stored chunks, zero when the file is stored as is
    pub compressed_size: u32,

    /// Timestamp of the file
    pub date: u32,

    /// Checksum of the file
    pub checksum: u32,
}

impl TakFileEntry {
    /// Size of the entry in bytes
    pub const SIZE: usize = 24;
}

/// Header preceding every data chunk
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct ChunkHeader {
    /// Should always be [`CHUNK_MARKER`]
    pub marker: u32,

    /// Always observed as 0x02
    pub reserved: u8,

    /// Compression tag of the payload
    pub compression: u8,

    /// Non zero when the payload is encrypted
    pub encryption: u8,

    /// Size of the payload
    pub compressed_size: u32,

    /// Size of the payload once decompressed
    pub decompressed_size: u32,

    /// Wrapping sum of the stored payload bytes
    pub checksum: u32,
}

impl ChunkHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 19;
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{
        ChunkHeader, HpiHeader, HpiVersion, TaEntry, TaExtHeader, TakDirEntry, CHUNK_MARKER,
        HPI_MARKER,
    };

    #[test]
    fn read_ta_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x48, 0x41, 0x50, 0x49,
            0x00, 0x00, 0x01, 0x00,
            0x40, 0x00, 0x00, 0x00,
            0x7D, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
        ]);

        let header = HpiHeader::read(&mut input)?;
        assert_eq!(header.marker, HPI_MARKER);
        assert_eq!(header.version, HpiVersion::TA);

        let expected = TaExtHeader {
            directory_size: 0x40,
            header_key: 0x7D,
            directory_offset: 0x14,
        };
        assert_eq!(TaExtHeader::read(&mut input)?, expected);
        assert_eq!(input.position() as usize, HpiHeader::SIZE + TaExtHeader::SIZE);

        Ok(())
    }

    #[test]
    fn read_ta_entry() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x20, 0x00, 0x00, 0x00,
            0x30, 0x00, 0x00, 0x00,
            0x01,
        ]);

        let entry = TaEntry::read(&mut input)?;
        assert_eq!(entry.name_offset, 0x20);
        assert_eq!(entry.data_offset, 0x30);
        assert!(entry.is_directory());
        assert_eq!(input.position() as usize, TaEntry::SIZE);

        Ok(())
    }

    #[test]
    fn read_tak_dir_entry() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x00, 0x00, 0x00, 0x00,
            0x14, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x3C, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
        ]);

        let expected = TakDirEntry {
            name_offset: 0,
            subdirectory_offset: 0x14,
            subdirectories: 2,
            file_offset: 0x3C,
            files: 1,
        };
        assert_eq!(TakDirEntry::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn read_chunk_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x53, 0x51, 0x53, 0x48,
            0x02,
            0x01,
            0x00,
            0x0A, 0x00, 0x00, 0x00,
            0x00, 0x10, 0x00, 0x00,
            0x34, 0x12, 0x00, 0x00,
        ]);

        let expected = ChunkHeader {
            marker: CHUNK_MARKER,
            reserved: 2,
            compression: 1,
            encryption: 0,
            compressed_size: 10,
            decompressed_size: 4096,
            checksum: 0x1234,
        };
        assert_eq!(ChunkHeader::read(&mut input)?, expected);
        assert_eq!(input.position() as usize, ChunkHeader::SIZE);

        Ok(())
    }
}
