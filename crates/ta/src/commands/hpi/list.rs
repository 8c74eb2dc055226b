use std::path::PathBuf;

use clap::Args;
use miette::{miette, Context, Result};
use owo_colors::OwoColorize;
use ta_hpi::{Directory, Entry, FileSystem, HpiArchive, Item};

use super::super::map_file;

#[derive(Args)]
pub struct ListArgs {
    /// An input HPI archive, or a directory whose archives are merged
    #[arg(short, long, value_name = "PATH")]
    file: PathBuf,

    /// A directory inside the archive to list
    #[arg(value_name = "DIR", default_value = "")]
    path: String,

    /// List sub directories as well
    #[arg(short, long, default_value_t = false)]
    recursive: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        if self.file.is_dir() {
            let vfs = FileSystem::open_dir(&self.file)
                .context(format!("path: {}", self.file.display()))?;
            for (path, archive) in vfs.archives() {
                println!(
                    "{} {} ({} files)",
                    "archive".dimmed(),
                    path.display(),
                    archive.len()
                );
            }
            return self.show(vfs.root());
        }

        let archive = HpiArchive::new(map_file(&self.file)?)
            .context(format!("path: {}", self.file.display()))?;
        println!(
            "{} {:?}, {} files, {} bytes extracted",
            "archive".dimmed(),
            archive.version(),
            archive.len(),
            archive.decompressed_size()
        );
        self.show(archive.root())
    }

    fn show<F: Entry>(&self, root: &Directory<F>) -> Result<()> {
        if self.path.trim_matches(['/', '\\']).is_empty() {
            self.print_directory(root, 0);
            return Ok(());
        }

        let item = root
            .resolve(&self.path)
            .ok_or_else(|| miette!("{} does not exist", self.path))?;
        match item {
            Item::File(file) => print_file(file, 0),
            Item::Directory(directory) => self.print_directory(directory, 0),
        }
        Ok(())
    }

    fn print_directory<F: Entry>(&self, directory: &Directory<F>, depth: usize) {
        for item in &directory.items {
            match item {
                Item::File(file) => print_file(file, depth),
                Item::Directory(child) => {
                    println!(
                        "{:>12}  {:indent$}{}/",
                        "",
                        "",
                        child.name.blue().bold(),
                        indent = depth * 2
                    );
                    if self.recursive {
                        self.print_directory(child, depth + 1);
                    }
                }
            }
        }
    }
}

fn print_file<F: Entry>(file: &F, depth: usize) {
    println!(
        "{:>12}  {:indent$}{}",
        file.size(),
        "",
        file.name(),
        indent = depth * 2
    );
}
