use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use rayon::prelude::*;
use ta_hpi::{FileRecord, HpiArchive, HpiOptions};
use tracing::{info, warn};

use super::{super::map_file, output_path};

#[derive(Args)]
pub struct ExtractArgs {
    /// An input HPI archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Refuse entries that extract to more than this many bytes
    #[arg(long, value_name = "BYTES")]
    max_entry_size: Option<u64>,

    /// Keep the recovered bytes of entries that fail their checksum
    #[arg(long, default_value_t = false)]
    keep_corrupt: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let options = HpiOptions::builder()
            .maybe_max_entry_size(self.max_entry_size)
            .build();
        let archive = HpiArchive::with_options(map_file(&self.file)?, options)
            .context(format!("path: {}", self.file.display()))?;

        let files: Vec<(&str, &FileRecord)> = archive.files().collect();
        info!("extracting {} files", files.len());

        let unreadable = AtomicUsize::new(0);
        files.par_iter().try_for_each(|(path, record)| {
            let target = output_path(&self.directory, path);

            let data = match archive.extract(record) {
                Ok(data) => data,
                Err(error) => {
                    unreadable.fetch_add(1, Ordering::Relaxed);
                    eprintln!("{} {path}: {error}", "unreadable".red().bold());

                    match error.into_partial_data() {
                        Some(partial) if self.keep_corrupt => partial,
                        _ => return Ok(()),
                    }
                }
            };

            self.write(&target, &data)
        })?;

        match unreadable.load(Ordering::Relaxed) {
            0 => Ok(()),
            count => {
                warn!("{count} of {} files were unreadable", files.len());
                Err(miette!("{count} files could not be extracted"))
            }
        }
    }

    fn write(&self, target: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .into_diagnostic()
                .context(format!("creating {}", parent.display()))?;
        }

        let mut out = if !self.overwrite {
            File::create_new(target)
                .into_diagnostic()
                .context(format!("creating {}", target.display()))?
        } else {
            File::create(target)
                .into_diagnostic()
                .context(format!("creating {}", target.display()))?
        };

        out.write_all(data).into_diagnostic()
    }
}
