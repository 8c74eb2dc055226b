use std::path::PathBuf;

use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use ta_hpi::HpiArchive;

use super::map_file;

pub mod extract;
pub mod info;

#[derive(clap::Subcommand)]
pub enum GafCommands {
    /// Describe the entries and frames of a sprite file as JSON
    Info(info::InfoArgs),
    /// Decode every frame of a sprite file into a directory
    Extract(extract::ExtractArgs),
}

impl GafCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            GafCommands::Info(info) => info.handle(),
            GafCommands::Extract(extract) => extract.handle(),
        }
    }
}

/// Where to read a sprite file from
#[derive(Args)]
pub struct Source {
    /// A GAF or TAF file, or its path inside `--archive`
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Read the sprite file out of this HPI archive
    #[arg(short, long, value_name = "ARCHIVE")]
    archive: Option<PathBuf>,
}

impl Source {
    pub fn load(&self) -> Result<Vec<u8>> {
        match &self.archive {
            Some(archive_path) => {
                let archive = HpiArchive::new(map_file(archive_path)?)
                    .context(format!("path: {}", archive_path.display()))?;
                let inner = self.file.to_string_lossy();
                Ok(archive
                    .extract_path(&inner)
                    .context(format!("extracting {inner}"))?)
            }
            None => std::fs::read(&self.file)
                .into_diagnostic()
                .context(format!("path: {}", self.file.display())),
        }
    }
}
