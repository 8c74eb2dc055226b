//! Base types for structure of GAF file.

use binrw::BinRead;
use derive_more::derive::Display;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::DecodeError;

/// Version stored at the start of every GAF and TAF file
pub const GAF_VERSION: u32 = 0x0001_0100;

/// Palette index conventionally used for transparent pixels
pub const TRANSPARENT_INDEX: u8 = 9;

/// GAF file header
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct GafHeader {
    /// Should always be [`GAF_VERSION`]
    pub version: u32,

    /// Number of entries, each with its own offset following the header
    pub entries: u32,

    /// Always zero
    pub unknown: u32,
}

impl GafHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 12;
}

/// Header of a single entry, a named sequence of frames
#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(little)]
pub struct GafEntryHeader {
    /// Number of frame table records following the header
    pub frames: u16,

    /// Always one
    pub unknown_1: u16,

    /// Always zero
    pub unknown_2: u32,

    /// NUL padded name
    pub name: [u8; 32],
}

impl GafEntryHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = 40;

    /// The name up to the first NUL.
    pub fn name(&self) -> String {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

/// Frame table record
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct FrameEntry {
    /// Offset of the [`FrameData`]
    pub offset: u32,

    /// Animation related, meaning unknown
    pub unknown: u32,
}

impl FrameEntry {
    /// Size of the record in bytes
    pub const SIZE: usize = 8;
}

/// Description of a frame or sub frame
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct FrameData {
    /// Width of the frame in pixels
    pub width: u16,

    /// Height of the frame in pixels
    pub height: u16,

    /// Horizontal display offset
    pub x: i16,

    /// Vertical display offset
    pub y: i16,

    /// Palette index used for transparent pixels, usually 9
    pub transparency: u8,

    /// Pixel encoding tag, see [`Encoding`]
    pub compression: u8,

    /// Number of sub frames, zero when the frame holds its own pixels
    pub subframes: u16,

    /// Always zero
    pub unknown_2: u32,

    /// Offset of the pixel payload, or of the sub frame offset array
    pub offset: u32,

    /// Meaning unknown
    pub unknown_3: u32,
}

impl FrameData {
    /// Size of the record in bytes
    pub const SIZE: usize = 24;

    /// Number of pixels in the frame
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// How the pixels of a frame are stored
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Encoding {
    /// One palette index per pixel, row by row
    #[display("raw")]
    Raw,

    /// Run length encoded palette indices, see [`crate::read::decode_rle`]
    #[display("rle")]
    RunLength,

    /// Two bytes per pixel, four bits per channel
    #[display("argb4444")]
    Argb4444,

    /// Two bytes per pixel, one alpha bit and five bits per color channel
    #[display("argb1555")]
    Argb1555,
}

impl TryFrom<u8> for Encoding {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Encoding::Raw),
            1 => Ok(Encoding::RunLength),
            4 => Ok(Encoding::Argb4444),
            5 => Ok(Encoding::Argb1555),
            other => Err(DecodeError::UnknownEncoding(other)),
        }
    }
}

impl Encoding {
    /// The layout of the decoded pixels
    pub fn layout(self) -> PixelLayout {
        match self {
            Encoding::Raw | Encoding::RunLength => PixelLayout::Indexed8,
            Encoding::Argb4444 => PixelLayout::Argb4444,
            Encoding::Argb1555 => PixelLayout::Argb1555,
        }
    }
}

/// Channel layout of a decoded [`crate::read::PixelBuffer`]
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PixelLayout {
    /// One palette index per pixel
    #[display("indexed8")]
    Indexed8,

    /// Little endian `u16` per pixel, `AAAARRRRGGGGBBBB`
    #[display("argb4444")]
    Argb4444,

    /// Little endian `u16` per pixel, `ARRRRRGGGGGBBBBB`
    #[display("argb1555")]
    Argb1555,
}

impl PixelLayout {
    /// Number of bytes used by a single pixel
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Indexed8 => 1,
            PixelLayout::Argb4444 | PixelLayout::Argb1555 => 2,
        }
    }
}
