use std::{fs::File, path::Path};

use memmap2::Mmap;
use miette::{Context, IntoDiagnostic, Result};

pub mod gaf;
pub mod hpi;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle HPI archives
    Hpi {
        #[command(subcommand)]
        command: hpi::HpiCommands,
    },
    /// Handle GAF and TAF sprite files
    Gaf {
        #[command(subcommand)]
        command: gaf::GafCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> Result<()> {
        match self {
            Commands::Hpi { command } => command.handle(),
            Commands::Gaf { command } => command.handle(),
        }
    }
}

/// Maps a file into memory for reading.
pub fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))?;

    // SAFETY: the mapping is only read, and game data is not expected to change underneath us
    unsafe { Mmap::map(&file) }
        .into_diagnostic()
        .context(format!("mapping {}", path.display()))
}
