//! A virtual file system layered over several archives.
//!
//! The game loads every archive in its data directory and treats them as one tree. Archives
//! are visited in a fixed order by extension; the first archive to provide a file wins, and
//! directories with the same name are merged.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::{
    error::{FileNotFoundError, Result},
    read::HpiArchive,
    tree::{Directory, Entry, FileRecord, Item, Listing},
};

/// Archive extensions in load order; earlier extensions take priority.
pub const WEIGHTED_EXTENSIONS: [&str; 5] = ["ufo", "gp3", "ccx", "gpf", "hpi"];

/// A file in the merged tree, remembering which archive holds it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsFile {
    /// Index of the archive in [`FileSystem::archives`]
    pub archive: usize,
    /// The record within that archive
    pub record: FileRecord,
}

impl Entry for VfsFile {
    fn name(&self) -> &str {
        &self.record.name
    }

    fn size(&self) -> u64 {
        self.record.size
    }
}

/// Position of an archive in the load order, `None` for unknown extensions.
///
/// Unknown extensions sort before every known one.
pub fn archive_weight(path: &Path) -> Option<usize> {
    let extension = path.extension()?.to_str()?;
    WEIGHTED_EXTENSIONS
        .iter()
        .position(|known| known.eq_ignore_ascii_case(extension))
}

/// Several archives merged into a single tree
pub struct FileSystem<B> {
    archives: Vec<(PathBuf, HpiArchive<B>)>,
    root: Directory<VfsFile>,
}

impl<B> Default for FileSystem<B> {
    fn default() -> Self {
        FileSystem {
            archives: Vec::new(),
            root: Directory::default(),
        }
    }
}

impl<B> FileSystem<B> {
    /// An empty file system with no files or directories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges already opened archives.
    ///
    /// Archives are ordered by [`archive_weight`] and then by path before merging, so the
    /// argument order does not matter.
    pub fn from_archives(archives: impl IntoIterator<Item = (PathBuf, HpiArchive<B>)>) -> Self {
        let mut archives: Vec<_> = archives.into_iter().collect();
        archives.sort_by(|(a, _), (b, _)| {
            archive_weight(a)
                .cmp(&archive_weight(b))
                .then_with(|| a.cmp(b))
        });

        let mut root = Directory::default();
        for (index, (path, archive)) in archives.iter().enumerate() {
            debug!(archive = %path.display(), files = archive.len(), "merging archive");
            merge(&mut root, archive.root(), index);
        }

        FileSystem {
            archives,
            root: root.sorted(),
        }
    }

    /// The merged tree, sorted by name ignoring ASCII case
    pub fn root(&self) -> &Directory<VfsFile> {
        &self.root
    }

    /// The archives in load order
    pub fn archives(&self) -> impl Iterator<Item = (&Path, &HpiArchive<B>)> {
        self.archives
            .iter()
            .map(|(path, archive)| (path.as_path(), archive))
    }

    /// Resolves a `/` separated path, ignoring ASCII case.
    pub fn resolve(&self, path: &str) -> Result<&Item<VfsFile>> {
        self.root
            .resolve(path)
            .ok_or_else(|| FileNotFoundError::Path(path.to_owned()).into())
    }

    /// Lists the children of the directory at `path`, the root for an empty path.
    pub fn list(&self, path: &str) -> Result<Vec<Listing>> {
        if path.trim_matches(|c| c == '/' || c == '\\').is_empty() {
            return Ok(self.root.list());
        }

        match self.resolve(path)? {
            Item::Directory(directory) => Ok(directory.list()),
            Item::File(_) => Err(FileNotFoundError::NotDirectory(path.to_owned()).into()),
        }
    }
}

impl<B: AsRef<[u8]>> FileSystem<B> {
    /// Extracts a file from the archive that provided it.
    pub fn extract(&self, file: &VfsFile) -> Result<Vec<u8>> {
        let (_, archive) = self
            .archives
            .get(file.archive)
            .ok_or_else(|| FileNotFoundError::Path(file.record.name.to_string()))?;
        archive.extract(&file.record)
    }

    /// Extracts the file at `path`, ignoring ASCII case.
    pub fn extract_path(&self, path: &str) -> Result<Vec<u8>> {
        match self.resolve(path)? {
            Item::File(file) => self.extract(file),
            Item::Directory(_) => Err(FileNotFoundError::IsDirectory(path.to_owned()).into()),
        }
    }
}

impl FileSystem<Vec<u8>> {
    /// Loads every archive with a weighted extension directly inside `directory`.
    ///
    /// Sub directories are not searched. An archive that cannot be opened is skipped with a
    /// warning rather than failing the whole file system.
    #[instrument(skip_all, fields(directory = %directory.as_ref().display()), err)]
    pub fn open_dir(directory: impl AsRef<Path>) -> Result<Self> {
        let mut archives = Vec::new();

        for entry in std::fs::read_dir(directory.as_ref())? {
            let path = entry?.path();
            if !path.is_file() || archive_weight(&path).is_none() {
                continue;
            }

            match std::fs::read(&path).map_err(Into::into).and_then(HpiArchive::new) {
                Ok(archive) => archives.push((path, archive)),
                Err(error) => warn!(archive = %path.display(), %error, "skipping archive"),
            }
        }

        Ok(Self::from_archives(archives))
    }
}

/// Adds the items of `source` that `target` does not already have.
fn merge(target: &mut Directory<VfsFile>, source: &Directory, archive: usize) {
    for item in &source.items {
        let existing = target
            .items
            .iter()
            .position(|other| other.name().eq_ignore_ascii_case(item.name()));

        match (item, existing) {
            (Item::Directory(directory), Some(index)) => {
                if let Item::Directory(existing) = &mut target.items[index] {
                    merge(existing, directory, archive);
                }
            }
            (Item::Directory(directory), None) => {
                let mut merged = Directory::new(directory.name.clone(), Vec::new());
                merge(&mut merged, directory, archive);
                target.items.push(Item::Directory(merged));
            }
            (Item::File(_), Some(_)) => {}
            (Item::File(record), None) => target.items.push(Item::File(VfsFile {
                archive,
                record: record.clone(),
            })),
        }
    }
}
