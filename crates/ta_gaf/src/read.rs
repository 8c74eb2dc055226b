//! Decoding GAF files into sprite atlases.

use std::io::Cursor;

use binrw::{BinRead, Endian};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use derive_more::derive::{Deref, Index, IntoIterator};
use tracing::{debug, instrument, trace};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{DecodeError, Error, Result};
use crate::palette::Palette;
use crate::types::{
    Encoding, FrameData, FrameEntry, GafEntryHeader, GafHeader, PixelLayout, GAF_VERSION,
};

/// Largest number of pixels a single frame may declare
pub const MAX_FRAME_PIXELS: usize = 1 << 24;

/// Size of an entry or sub frame offset
const OFFSET_SIZE: usize = 4;

/// Decoded pixels of a frame, row by row without padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// How `data` is laid out
    pub layout: PixelLayout,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// `width * height * layout.bytes_per_pixel()` bytes
    pub data: Vec<u8>,
}

impl PixelBuffer {
    /// A zero filled buffer
    pub fn blank(layout: PixelLayout, width: u16, height: u16) -> Self {
        let len = width as usize * height as usize * layout.bytes_per_pixel();
        PixelBuffer {
            layout,
            width,
            height,
            data: vec![0; len],
        }
    }

    /// Number of pixels in the buffer
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Copies `source` so that its top left corner lands on (`x`, `y`), clipping anything
    /// outside of this buffer.
    pub fn blit(&mut self, source: &PixelBuffer, x: i32, y: i32) {
        let bpp = self.layout.bytes_per_pixel();
        let (width, height) = (self.width as i32, self.height as i32);
        let source_width = source.width as i32;

        let left = x.max(0);
        let right = (x + source_width).min(width);
        if left >= right {
            return;
        }
        let span = (right - left) as usize * bpp;

        for row in 0..source.height as i32 {
            let target_row = y + row;
            if target_row < 0 || target_row >= height {
                continue;
            }
            let from = (row * source_width + (left - x)) as usize * bpp;
            let to = (target_row * width + left) as usize * bpp;
            self.data[to..to + span].copy_from_slice(&source.data[from..from + span]);
        }
    }

    /// Converts the pixels into interleaved RGBA bytes.
    ///
    /// Indexed pixels are looked up in `palette`, 16 bit pixels carry their own colors.
    pub fn to_rgba(&self, palette: &Palette) -> Vec<u8> {
        match self.layout {
            PixelLayout::Indexed8 => palette.map_rgba(&self.data),
            PixelLayout::Argb4444 => self
                .data
                .chunks_exact(2)
                .flat_map(|pixel| {
                    let value = LittleEndian::read_u16(pixel);
                    let channel = |shift: u16| ((value >> shift) & 0xF) as u8 * 17;
                    [channel(8), channel(4), channel(0), channel(12)]
                })
                .collect(),
            PixelLayout::Argb1555 => self
                .data
                .chunks_exact(2)
                .flat_map(|pixel| {
                    let value = LittleEndian::read_u16(pixel);
                    let channel = |shift: u16| {
                        let bits = ((value >> shift) & 0x1F) as u8;
                        (bits << 3) | (bits >> 2)
                    };
                    let alpha = if value & 0x8000 != 0 { 255 } else { 0 };
                    [channel(10), channel(5), channel(0), alpha]
                })
                .collect(),
        }
    }
}

/// Metadata of a top level frame, as stored in the file
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FrameInfo {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Horizontal display offset
    pub x: i16,
    /// Vertical display offset
    pub y: i16,
    /// Transparent palette index
    pub transparency: u8,
    /// Raw encoding tag
    pub compression: u8,
    /// Number of sub frames
    pub sub_frames: u16,
    #[cfg_attr(feature = "serde", serde(skip))]
    data: FrameData,
}

impl FrameInfo {
    fn new(data: FrameData) -> Self {
        FrameInfo {
            width: data.width,
            height: data.height,
            x: data.x,
            y: data.y,
            transparency: data.transparency,
            compression: data.compression,
            sub_frames: data.subframes,
            data,
        }
    }

    /// The decoded encoding tag
    pub fn encoding(&self) -> std::result::Result<Encoding, DecodeError> {
        Encoding::try_from(self.compression)
    }
}

/// Metadata of an entry: its name and frame descriptions
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GafEntry {
    /// Name of the entry
    pub name: String,
    /// Frames in playback order
    pub frames: Vec<FrameInfo>,
}

/// Placement of a sub frame composited into its parent
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SubFrameInfo {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Horizontal offset of the sub frame
    pub x: i16,
    /// Vertical offset of the sub frame
    pub y: i16,
    /// Encoding of the sub frame pixels
    pub encoding: Encoding,
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteFrame {
    /// Horizontal display offset
    pub x: i16,
    /// Vertical display offset
    pub y: i16,
    /// Transparent palette index
    pub transparency: u8,
    /// Final pixels, with sub frames composited
    pub pixels: PixelBuffer,
    /// Sub frames in the order they were painted
    pub sub_frames: Vec<SubFrameInfo>,
}

impl SpriteFrame {
    /// Width in pixels
    pub fn width(&self) -> u16 {
        self.pixels.width
    }

    /// Height in pixels
    pub fn height(&self) -> u16 {
        self.pixels.height
    }
}

/// A named sequence of decoded frames
#[derive(Debug, Clone, PartialEq, Deref, Index, IntoIterator)]
pub struct SpriteAtlas {
    /// Name of the entry
    pub name: String,

    /// Frames in playback order
    #[deref]
    #[index]
    #[into_iterator(owned, ref)]
    pub frames: Vec<SpriteFrame>,
}

/// Parsed GAF file borrowing its bytes.
///
/// Parsing only reads the entry and frame tables, pixels are decoded by [`GafFile::atlas`].
#[derive(Debug, Clone)]
pub struct GafFile<'a> {
    data: &'a [u8],
    entries: Vec<GafEntry>,
}

impl<'a> GafFile<'a> {
    /// Reads the header, entry headers and frame tables.
    #[instrument(skip_all, fields(len = data.len()))]
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let header: GafHeader = read_at(data, 0, GafHeader::SIZE)?;
        if header.version != GAF_VERSION {
            return Err(Error::InvalidVersion(header.version));
        }

        let offsets: Vec<u32> =
            read_array(data, GafHeader::SIZE as u64, header.entries as usize, OFFSET_SIZE)?;

        let mut entries = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let entry: GafEntryHeader = read_at(data, offset as u64, GafEntryHeader::SIZE)?;
            let name = entry.name();

            let table: Vec<FrameEntry> = read_array(
                data,
                offset as u64 + GafEntryHeader::SIZE as u64,
                entry.frames as usize,
                FrameEntry::SIZE,
            )?;
            let frames = table
                .iter()
                .map(|frame| read_at(data, frame.offset as u64, FrameData::SIZE).map(FrameInfo::new))
                .collect::<std::result::Result<Vec<_>, DecodeError>>()?;

            debug!(name, frames = frames.len(), "read entry");
            entries.push(GafEntry { name, frames });
        }

        Ok(GafFile { data, entries })
    }

    /// Entry metadata in file order
    pub fn entries(&self) -> &[GafEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the file has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes every frame of the entry at `index`.
    #[instrument(skip(self))]
    pub fn atlas(&self, index: usize) -> Result<SpriteAtlas> {
        let entry = self.entries.get(index).ok_or(Error::EntryNotFound(index))?;

        let frames = entry
            .frames
            .iter()
            .map(|frame| self.decode_frame(&frame.data))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(SpriteAtlas {
            name: entry.name.clone(),
            frames,
        })
    }

    /// Decodes every entry in file order.
    pub fn atlases(&self) -> impl Iterator<Item = Result<SpriteAtlas>> + '_ {
        (0..self.entries.len()).map(|index| self.atlas(index))
    }

    fn decode_frame(&self, frame: &FrameData) -> std::result::Result<SpriteFrame, DecodeError> {
        if frame.subframes == 0 {
            return Ok(SpriteFrame {
                x: frame.x,
                y: frame.y,
                transparency: frame.transparency,
                pixels: decode_pixels(self.data, frame)?,
                sub_frames: Vec::new(),
            });
        }

        let layout = Encoding::try_from(frame.compression)?.layout();
        check_area(frame)?;
        let mut canvas = PixelBuffer::blank(layout, frame.width, frame.height);

        let offsets: Vec<u32> = read_array(
            self.data,
            frame.offset as u64,
            frame.subframes as usize,
            OFFSET_SIZE,
        )?;
        let mut sub_frames = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let sub: FrameData = read_at(self.data, offset as u64, FrameData::SIZE)?;
            if sub.subframes != 0 {
                return Err(DecodeError::NestedSubFrame);
            }

            let encoding = Encoding::try_from(sub.compression)?;
            if encoding.layout() != layout {
                return Err(DecodeError::LayoutMismatch {
                    expected: layout,
                    actual: encoding.layout(),
                });
            }

            let pixels = decode_pixels(self.data, &sub)?;
            let (x, y) = (
                frame.x as i32 - sub.x as i32,
                frame.y as i32 - sub.y as i32,
            );
            trace!(x, y, width = sub.width, height = sub.height, "blit sub frame");
            canvas.blit(&pixels, x, y);

            sub_frames.push(SubFrameInfo {
                width: sub.width,
                height: sub.height,
                x: sub.x,
                y: sub.y,
                encoding,
            });
        }

        Ok(SpriteFrame {
            x: frame.x,
            y: frame.y,
            transparency: frame.transparency,
            pixels: canvas,
            sub_frames,
        })
    }
}

/// Parses `data` and decodes every entry.
pub fn decode(data: &[u8]) -> Result<Vec<SpriteAtlas>> {
    GafFile::parse(data)?.atlases().collect()
}

/// Decodes run length encoded palette indices.
///
/// Every row starts with a `u16` byte count followed by segments, each introduced by a mask byte:
///
/// | Mask            | Meaning                                             |
/// |-----------------|-----------------------------------------------------|
/// | `mask & 1 == 1` | skip `mask >> 1` pixels, leaving them transparent   |
/// | `mask & 2 == 2` | repeat the next byte `(mask >> 2) + 1` times        |
/// | otherwise       | copy the next `(mask >> 2) + 1` bytes               |
///
/// Skipped pixels stay zero.
pub fn decode_rle(
    input: &[u8],
    width: u16,
    height: u16,
) -> std::result::Result<Vec<u8>, DecodeError> {
    let width = width as usize;
    let mut output = vec![0u8; width * height as usize];
    if output.is_empty() {
        return Ok(output);
    }

    let mut reader = input;
    for (row, line) in output.chunks_exact_mut(width).enumerate() {
        let length = reader
            .read_u16::<LittleEndian>()
            .map_err(|_| DecodeError::LineOverrun { row })? as usize;
        if length > reader.len() {
            return Err(DecodeError::LineOverrun { row });
        }
        let (mut segments, rest) = reader.split_at(length);
        reader = rest;

        let mut column = 0usize;
        while let Some((&mask, tail)) = segments.split_first() {
            segments = tail;

            if mask & 0x01 != 0 {
                column += (mask >> 1) as usize;
                if column > width {
                    return Err(DecodeError::RowOverrun { row });
                }
                continue;
            }

            let count = (mask >> 2) as usize + 1;
            if column + count > width {
                return Err(DecodeError::RowOverrun { row });
            }

            if mask & 0x02 != 0 {
                let (&value, tail) = segments
                    .split_first()
                    .ok_or(DecodeError::LineOverrun { row })?;
                segments = tail;
                line[column..column + count].fill(value);
            } else {
                if segments.len() < count {
                    return Err(DecodeError::LineOverrun { row });
                }
                let (literal, tail) = segments.split_at(count);
                segments = tail;
                line[column..column + count].copy_from_slice(literal);
            }
            column += count;
        }
    }

    Ok(output)
}

fn check_area(frame: &FrameData) -> std::result::Result<(), DecodeError> {
    if frame.area() > MAX_FRAME_PIXELS {
        return Err(DecodeError::TooLarge {
            width: frame.width,
            height: frame.height,
        });
    }
    Ok(())
}

fn decode_pixels(data: &[u8], frame: &FrameData) -> std::result::Result<PixelBuffer, DecodeError> {
    let encoding = Encoding::try_from(frame.compression)?;
    check_area(frame)?;

    let layout = encoding.layout();
    let pixels = match encoding {
        Encoding::RunLength => {
            let start = frame.offset as usize;
            let input = data.get(start..).ok_or(DecodeError::OutOfBounds {
                offset: frame.offset as u64,
                len: 0,
            })?;
            decode_rle(input, frame.width, frame.height)?
        }
        Encoding::Raw | Encoding::Argb4444 | Encoding::Argb1555 => {
            let len = frame.area() * layout.bytes_per_pixel();
            slice(data, frame.offset as u64, len)?.to_vec()
        }
    };

    Ok(PixelBuffer {
        layout,
        width: frame.width,
        height: frame.height,
        data: pixels,
    })
}

fn slice(data: &[u8], offset: u64, len: usize) -> std::result::Result<&[u8], DecodeError> {
    let out_of_bounds = || DecodeError::OutOfBounds {
        offset,
        len: len as u64,
    };
    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
    data.get(start..end).ok_or_else(out_of_bounds)
}

fn read_at<T>(data: &[u8], offset: u64, size: usize) -> std::result::Result<T, DecodeError>
where
    T: for<'b> BinRead<Args<'b> = ()>,
{
    let bytes = slice(data, offset, size)?;
    T::read_options(&mut Cursor::new(bytes), Endian::Little, ()).map_err(|_| {
        DecodeError::OutOfBounds {
            offset,
            len: size as u64,
        }
    })
}

fn read_array<T>(
    data: &[u8],
    offset: u64,
    count: usize,
    size: usize,
) -> std::result::Result<Vec<T>, DecodeError>
where
    T: for<'b> BinRead<Args<'b> = ()>,
{
    let bytes = slice(data, offset, count.saturating_mul(size))?;
    let mut cursor = Cursor::new(bytes);
    (0..count)
        .map(|_| {
            T::read_options(&mut cursor, Endian::Little, ()).map_err(|_| DecodeError::OutOfBounds {
                offset,
                len: bytes.len() as u64,
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{decode_rle, GafFile, PixelBuffer};
    use crate::error::{DecodeError, Error, Result};
    use crate::palette::Palette;
    use crate::types::{PixelLayout, GAF_VERSION};

    struct Frame {
        width: u16,
        height: u16,
        x: i16,
        y: i16,
        compression: u8,
        payload: Vec<u8>,
        sub_frames: Vec<Frame>,
    }

    fn frame(width: u16, height: u16, compression: u8, payload: Vec<u8>) -> Frame {
        Frame {
            width,
            height,
            x: 0,
            y: 0,
            compression,
            payload,
            sub_frames: Vec::new(),
        }
    }

    fn write_frame(out: &mut Vec<u8>, frame: &Frame) -> u32 {
        let at = out.len();
        out.resize(at + 24, 0);

        let offset = if frame.sub_frames.is_empty() {
            let offset = out.len();
            out.extend_from_slice(&frame.payload);
            offset
        } else {
            let array = out.len();
            out.resize(array + 4 * frame.sub_frames.len(), 0);
            for (i, sub) in frame.sub_frames.iter().enumerate() {
                let sub_offset = write_frame(out, sub);
                out[array + 4 * i..array + 4 * i + 4].copy_from_slice(&sub_offset.to_le_bytes());
            }
            array
        };

        let mut record = Vec::with_capacity(24);
        record.extend_from_slice(&frame.width.to_le_bytes());
        record.extend_from_slice(&frame.height.to_le_bytes());
        record.extend_from_slice(&frame.x.to_le_bytes());
        record.extend_from_slice(&frame.y.to_le_bytes());
        record.push(9);
        record.push(frame.compression);
        record.extend_from_slice(&(frame.sub_frames.len() as u16).to_le_bytes());
        record.extend_from_slice(&0u32.to_le_bytes());
        record.extend_from_slice(&(offset as u32).to_le_bytes());
        record.extend_from_slice(&0u32.to_le_bytes());
        out[at..at + 24].copy_from_slice(&record);

        at as u32
    }

    fn gaf(name: &str, frames: &[Frame]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&GAF_VERSION.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&16u32.to_le_bytes());

        out.extend_from_slice(&(frames.len() as u16).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        let mut padded = name.as_bytes().to_vec();
        padded.resize(32, 0);
        out.extend_from_slice(&padded);

        let table = out.len();
        out.resize(table + 8 * frames.len(), 0);
        for (i, frame) in frames.iter().enumerate() {
            let offset = write_frame(&mut out, frame);
            out[table + 8 * i..table + 8 * i + 4].copy_from_slice(&offset.to_le_bytes());
        }
        out
    }

    #[test]
    fn decode_raw_frames() -> Result<()> {
        let data = gaf(
            "ARMCOM",
            &[frame(16, 16, 0, vec![1; 256]), frame(16, 16, 0, vec![2; 256])],
        );

        let file = GafFile::parse(&data)?;
        assert_eq!(file.len(), 1);
        assert_eq!(file.entries()[0].name, "ARMCOM");
        assert_eq!(file.entries()[0].frames[1].width, 16);

        let atlas = file.atlas(0)?;
        assert_eq!(atlas.name, "ARMCOM");
        assert_eq!(atlas.len(), 2);
        assert_eq!(atlas[0].pixels.data, vec![1; 256]);
        assert_eq!(atlas[1].pixels.data, vec![2; 256]);
        assert_eq!(atlas[1].pixels.layout, PixelLayout::Indexed8);

        Ok(())
    }

    #[test]
    fn decode_run_length_rows() -> std::result::Result<(), DecodeError> {
        #[rustfmt::skip]
        let input = [
            // skip 2, run of 3 x 7
            0x03, 0x00, 0x05, 0x0A, 0x07,
            // literal 1 2
            0x03, 0x00, 0x04, 0x01, 0x02,
        ];

        let pixels = decode_rle(&input, 5, 2)?;
        assert_eq!(pixels, vec![0, 0, 7, 7, 7, 1, 2, 0, 0, 0]);

        Ok(())
    }

    #[test]
    fn run_past_row_end() {
        // run of 4 into a row of 3
        let input = [0x02, 0x00, 0x0E, 0x07];
        assert_eq!(
            decode_rle(&input, 3, 1),
            Err(DecodeError::RowOverrun { row: 0 })
        );
    }

    #[test]
    fn literal_past_line_end() {
        // literal of 3 with only 1 byte left in the line
        let input = [0x02, 0x00, 0x08, 0x01, 0x02, 0x03];
        assert_eq!(
            decode_rle(&input, 4, 1),
            Err(DecodeError::LineOverrun { row: 0 })
        );
    }

    #[test]
    fn missing_row() {
        let input = [0x01, 0x00, 0x03];
        assert_eq!(
            decode_rle(&input, 4, 2),
            Err(DecodeError::LineOverrun { row: 1 })
        );
    }

    #[test]
    fn later_sub_frame_wins() -> Result<()> {
        let mut parent = frame(4, 1, 0, Vec::new());
        parent.sub_frames = vec![frame(3, 1, 0, vec![1, 1, 1]), {
            let mut second = frame(2, 1, 0, vec![2, 2]);
            second.x = -2;
            second
        }];
        let data = gaf("overlap", &[parent]);

        let atlas = GafFile::parse(&data)?.atlas(0)?;
        assert_eq!(atlas[0].pixels.data, vec![1, 1, 2, 2]);
        assert_eq!(atlas[0].sub_frames.len(), 2);

        Ok(())
    }

    #[test]
    fn sub_frame_clipped() {
        let mut canvas = PixelBuffer::blank(PixelLayout::Indexed8, 2, 2);
        let source = PixelBuffer {
            layout: PixelLayout::Indexed8,
            width: 2,
            height: 2,
            data: vec![1, 2, 3, 4],
        };

        canvas.blit(&source, -1, 1);
        assert_eq!(canvas.data, vec![0, 0, 2, 0]);
    }

    #[test]
    fn nested_sub_frame() -> Result<()> {
        let mut inner = frame(1, 1, 0, Vec::new());
        inner.sub_frames = vec![frame(1, 1, 0, vec![1])];
        let mut parent = frame(1, 1, 0, Vec::new());
        parent.sub_frames = vec![inner];
        let data = gaf("nested", &[parent]);

        let file = GafFile::parse(&data)?;
        assert!(matches!(
            file.atlas(0),
            Err(Error::Decode(DecodeError::NestedSubFrame))
        ));

        Ok(())
    }

    #[test]
    fn sub_frame_layout_mismatch() -> Result<()> {
        let mut parent = frame(1, 1, 0, Vec::new());
        parent.sub_frames = vec![frame(1, 1, 5, vec![0x00, 0x80])];
        let data = gaf("mixed", &[parent]);

        assert!(matches!(
            GafFile::parse(&data)?.atlas(0),
            Err(Error::Decode(DecodeError::LayoutMismatch {
                expected: PixelLayout::Indexed8,
                actual: PixelLayout::Argb1555,
            }))
        ));

        Ok(())
    }

    #[test]
    fn unknown_encoding() -> Result<()> {
        let data = gaf("odd", &[frame(1, 1, 3, vec![0])]);

        assert!(matches!(
            GafFile::parse(&data)?.atlas(0),
            Err(Error::Decode(DecodeError::UnknownEncoding(3)))
        ));

        Ok(())
    }

    #[test]
    fn sixteen_bit_pixels() -> Result<()> {
        let data = gaf(
            "hd",
            &[
                frame(1, 1, 4, 0xF8C4u16.to_le_bytes().to_vec()),
                frame(1, 1, 5, 0xFC00u16.to_le_bytes().to_vec()),
            ],
        );

        let atlas = GafFile::parse(&data)?.atlas(0)?;
        let palette = Palette::default();
        assert_eq!(atlas[0].pixels.to_rgba(&palette), vec![0x88, 0xCC, 0x44, 0xFF]);
        assert_eq!(atlas[1].pixels.to_rgba(&palette), vec![0xFF, 0x00, 0x00, 0xFF]);

        Ok(())
    }

    #[test]
    fn payload_out_of_bounds() -> Result<()> {
        let mut data = gaf("short", &[frame(4, 4, 0, vec![0; 16])]);
        data.truncate(data.len() - 1);

        assert!(matches!(
            GafFile::parse(&data)?.atlas(0),
            Err(Error::Decode(DecodeError::OutOfBounds { len: 16, .. }))
        ));

        Ok(())
    }

    #[test]
    fn invalid_version() {
        let data = [0u8; 16];
        assert!(matches!(
            GafFile::parse(&data),
            Err(Error::InvalidVersion(0))
        ));
    }

    #[test]
    fn tables_past_end_of_file() {
        let mut data = gaf("short", &[frame(1, 1, 0, vec![0])]);
        data[16..18].copy_from_slice(&0x1000u16.to_le_bytes());
        assert!(matches!(
            GafFile::parse(&data),
            Err(Error::Decode(DecodeError::OutOfBounds { offset: 56, len: 0x8000 }))
        ));

        let mut data = gaf("short", &[frame(1, 1, 0, vec![0])]);
        data[4..8].copy_from_slice(&1000u32.to_le_bytes());
        assert!(matches!(
            GafFile::parse(&data),
            Err(Error::Decode(DecodeError::OutOfBounds { offset: 12, len: 4000 }))
        ));
    }

    #[test]
    fn missing_entry() -> Result<()> {
        let data = gaf("one", &[]);

        let file = GafFile::parse(&data)?;
        assert!(matches!(file.atlas(1), Err(Error::EntryNotFound(1))));
        assert_eq!(file.atlas(0)?.len(), 0);

        Ok(())
    }
}
