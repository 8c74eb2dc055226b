use std::path::PathBuf;

use clap::{Args, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use ta_gaf::{GafFile, Palette, SpriteFrame};
use tracing::{debug, info};

use super::Source;
use crate::commands::hpi::output_path;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Decoded pixels as stored, one palette index or 16 bit value per pixel
    #[default]
    Raw,
    /// Four bytes per pixel after applying the palette
    Rgba,
}

#[derive(Args)]
pub struct ExtractArgs {
    #[command(flatten)]
    source: Source,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// How to write the pixels of each frame
    #[arg(long, value_enum, default_value_t = Format::Raw)]
    format: Format,

    /// A `.pal` file used for RGBA output, grayscale when missing
    #[arg(long, value_name = "PAL")]
    palette: Option<PathBuf>,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let palette = match &self.palette {
            Some(path) => {
                let data = std::fs::read(path)
                    .into_diagnostic()
                    .context(format!("path: {}", path.display()))?;
                Palette::from_pal(&data)?
            }
            None => Palette::grayscale(),
        }
        .for_sprites();

        let data = self.source.load()?;
        let file = GafFile::parse(&data)?;
        info!("decoding {} entries", file.len());

        for (index, entry) in file.entries().iter().enumerate() {
            let atlas = match file.atlas(index) {
                Ok(atlas) => atlas,
                Err(error) => {
                    eprintln!("{} {}: {error}", "unreadable".red().bold(), entry.name);
                    continue;
                }
            };

            let directory = output_path(&self.directory, &atlas.name);
            std::fs::create_dir_all(&directory)
                .into_diagnostic()
                .context(format!("creating {}", directory.display()))?;

            for (number, frame) in atlas.iter().enumerate() {
                let path = directory.join(self.file_name(number, frame));
                debug!("writing {}", path.display());

                let bytes = match self.format {
                    Format::Raw => frame.pixels.data.clone(),
                    Format::Rgba => frame.pixels.to_rgba(&palette),
                };
                std::fs::write(&path, bytes)
                    .into_diagnostic()
                    .context(format!("writing {}", path.display()))?;
            }

            println!("{} {} frames", atlas.name.bold(), atlas.len());
        }

        Ok(())
    }

    fn file_name(&self, number: usize, frame: &SpriteFrame) -> String {
        let extension = match self.format {
            Format::Raw => frame.pixels.layout.to_string(),
            Format::Rgba => "rgba".to_owned(),
        };
        format!(
            "{number:04}_{}x{}.{extension}",
            frame.width(),
            frame.height()
        )
    }
}
