//! Palettes that map 8 bit pixels to colors.
//!
//! Total Annihilation ships 256 color `.pal` files with four bytes per color. The fourth byte is
//! always zero in the shipped files, so it is replaced by full opacity when loading.

use std::io::Cursor;

use binrw::{BinRead, Endian};
use derive_more::derive::{Deref, Index};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{Error, Result};
use crate::types::TRANSPARENT_INDEX;

/// Palette index used for unit shadows
pub const SHADOW_INDEX: u8 = 10;

/// A single RGBA color
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[br(little)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Color {
    /// Red channel
    pub red: u8,
    /// Green channel
    pub green: u8,
    /// Blue channel
    pub blue: u8,
    /// Opacity, 255 is opaque
    pub alpha: u8,
}

impl Color {
    /// Opaque white
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    /// Opaque black
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    /// Translucent black used for shadows
    pub const SHADOW: Color = Color::rgba(0, 0, 0, 100);

    /// Creates a color from its channels
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Color {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// The channels in RGBA order
    pub fn to_array(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

/// 256 colors indexed by pixel value
#[derive(Debug, Clone, PartialEq, Eq, Deref, Index)]
pub struct Palette {
    #[deref]
    #[index]
    colors: [Color; 256],
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            colors: [Color::WHITE; 256],
        }
    }
}

impl Palette {
    /// Size of a `.pal` file in bytes
    pub const SIZE: usize = 256 * 4;

    /// Creates a palette from its colors.
    pub fn new(colors: [Color; 256]) -> Self {
        Palette { colors }
    }

    /// Reads a `.pal` file, making every color opaque.
    pub fn from_pal(data: &[u8]) -> Result<Palette> {
        if data.len() < Self::SIZE {
            return Err(Error::InvalidPalette(data.len()));
        }

        let mut colors =
            <[Color; 256]>::read_options(&mut Cursor::new(&data[..Self::SIZE]), Endian::Little, ())?;
        for color in colors.iter_mut() {
            color.alpha = 255;
        }
        Ok(Palette { colors })
    }

    /// A palette where every index maps to the gray of the same value.
    pub fn grayscale() -> Palette {
        let mut colors = [Color::BLACK; 256];
        for (value, color) in colors.iter_mut().enumerate() {
            let value = value as u8;
            *color = Color::rgba(value, value, value, 255);
        }
        Palette { colors }
    }

    /// Returns a copy with `alpha` applied to every index in `indices`.
    pub fn with_chroma_keys(mut self, indices: &[u8], alpha: u8) -> Palette {
        for &index in indices {
            self.colors[index as usize].alpha = alpha;
        }
        self
    }

    /// Returns a copy set up for drawing sprites.
    ///
    /// Index 0 and the transparency index become fully transparent and the shadow index becomes
    /// translucent black.
    pub fn for_sprites(self) -> Palette {
        let mut palette = self.with_chroma_keys(&[0, TRANSPARENT_INDEX], 0);
        palette.colors[SHADOW_INDEX as usize] = Color::SHADOW;
        palette
    }

    /// The color for a pixel value
    pub fn color(&self, index: u8) -> Color {
        self.colors[index as usize]
    }

    /// Maps palette indices to interleaved RGBA bytes.
    pub fn map_rgba(&self, indices: &[u8]) -> Vec<u8> {
        indices
            .iter()
            .flat_map(|&index| self.color(index).to_array())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{Color, Palette, SHADOW_INDEX};
    use crate::error::{Error, Result};

    #[test]
    fn read_pal_file() -> Result<()> {
        let mut data = vec![0u8; Palette::SIZE];
        data[4..8].copy_from_slice(&[0x80, 0x00, 0xFF, 0x00]);

        let palette = Palette::from_pal(&data)?;
        assert_eq!(palette.color(1), Color::rgba(0x80, 0x00, 0xFF, 255));
        assert_eq!(palette[0], Color::BLACK);
        assert_eq!(palette.len(), 256);

        Ok(())
    }

    #[test]
    fn short_pal_file() {
        assert!(matches!(
            Palette::from_pal(&[0u8; 100]),
            Err(Error::InvalidPalette(100))
        ));
    }

    #[test]
    fn sprite_transparency() {
        let palette = Palette::grayscale().for_sprites();

        assert_eq!(palette.color(0).alpha, 0);
        assert_eq!(palette.color(9).alpha, 0);
        assert_eq!(palette.color(SHADOW_INDEX), Color::SHADOW);
        assert_eq!(palette.color(11), Color::rgba(11, 11, 11, 255));
    }

    #[test]
    fn map_indices() {
        let palette = Palette::grayscale();

        assert_eq!(
            palette.map_rgba(&[1, 200]),
            vec![1, 1, 1, 255, 200, 200, 200, 255]
        );
    }
}
