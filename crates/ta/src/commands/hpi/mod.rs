use std::path::{Component, Path, PathBuf};

pub mod extract;
pub mod list;

#[derive(clap::Subcommand)]
pub enum HpiCommands {
    /// List the contents of an HPI archive or a directory of archives
    List(list::ListArgs),
    /// Extract an HPI archive into a directory
    Extract(extract::ExtractArgs),
}

impl HpiCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            HpiCommands::List(list) => list.handle(),
            HpiCommands::Extract(extract) => extract.handle(),
        }
    }
}

/// Joins an archive path onto `base`, dropping components that would leave it.
pub fn output_path(base: &Path, archive_path: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for part in archive_path.split(['/', '\\']) {
        match Path::new(part).components().next() {
            Some(Component::Normal(name)) => path.push(name),
            _ => continue,
        }
    }
    path
}
