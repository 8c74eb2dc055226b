//! The in-memory directory model shared by both archive layouts.
//!
//! Names are compared without regard to ASCII case, matching how the game resolves paths.

use crate::compression::CompressionMethod;

/// Metadata for a file stored in an archive.
///
/// The record is enough to extract the file again through
/// [`crate::read::HpiArchive::extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRecord {
    /// Name of the file within its directory
    pub name: Box<str>,
    /// Absolute offset of the stored data
    pub offset: u64,
    /// Number of stored bytes, when the layout records it
    ///
    /// Total Annihilation archives store a chunk size table in front of the data instead, so
    /// the stored size is only known once the table is read.
    pub compressed_size: Option<u64>,
    /// Size of the file once extracted
    pub size: u64,
    /// Method used to store the data
    pub compression: CompressionMethod,
}

/// Something stored as a file in a [`Directory`]
pub trait Entry {
    /// Name of the file within its directory
    fn name(&self) -> &str;

    /// Size of the file once extracted
    fn size(&self) -> u64;
}

impl Entry for FileRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }
}

impl FileRecord {
    /// Whether the file name ends with `extension`, ignoring case.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
    }

    /// The file name without its final extension
    pub fn base_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_ref(), |(base, _)| base)
    }
}

/// A file or directory in the archive tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<F = FileRecord> {
    /// A leaf that can be extracted
    File(F),
    /// A nested listing
    Directory(Directory<F>),
}

impl<F: Entry> Item<F> {
    /// Every item has a name which identifies it in its parent directory.
    pub fn name(&self) -> &str {
        match self {
            Item::File(file) => file.name(),
            Item::Directory(directory) => &directory.name,
        }
    }

    /// What kind of item this is
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::File(_) => ItemKind::File,
            Item::Directory(_) => ItemKind::Directory,
        }
    }

    /// The file record, if this item is a file
    pub fn as_file(&self) -> Option<&F> {
        match self {
            Item::File(file) => Some(file),
            Item::Directory(_) => None,
        }
    }

    /// The directory, if this item is a directory
    pub fn as_directory(&self) -> Option<&Directory<F>> {
        match self {
            Item::File(_) => None,
            Item::Directory(directory) => Some(directory),
        }
    }
}

/// Distinguishes files from directories in a [`Listing`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A file
    File,
    /// A directory
    Directory,
}

/// One child of a directory as reported by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Name of the child
    pub name: String,
    /// Kind of the child
    pub kind: ItemKind,
    /// Extracted size for files, zero for directories
    pub size: u64,
}

/// A named, ordered collection of items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory<F = FileRecord> {
    /// Name of the directory, empty for the root
    pub name: Box<str>,
    /// Children in archive order
    pub items: Vec<Item<F>>,
}

impl<F> Default for Directory<F> {
    fn default() -> Self {
        Directory {
            name: "".into(),
            items: Vec::new(),
        }
    }
}

impl<F: Entry> Directory<F> {
    /// Creates a directory from its parts
    pub fn new(name: impl Into<Box<str>>, items: Vec<Item<F>>) -> Self {
        Directory {
            name: name.into(),
            items,
        }
    }

    /// Finds a direct child by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&Item<F>> {
        self.items
            .iter()
            .find(|item| item.name().eq_ignore_ascii_case(name))
    }

    /// Finds a direct child file by name.
    pub fn file(&self, name: &str) -> Option<&F> {
        self.get(name).and_then(Item::as_file)
    }

    /// Finds a direct child directory by name.
    pub fn directory(&self, name: &str) -> Option<&Directory<F>> {
        self.get(name).and_then(Item::as_directory)
    }

    /// Resolves a `/` or `\` separated path relative to this directory.
    ///
    /// Empty components are skipped, so leading separators are allowed. An empty path resolves
    /// to `None`; use the directory itself in that case.
    pub fn resolve(&self, path: &str) -> Option<&Item<F>> {
        let mut components = path.split(|c: char| c == '/' || c == '\\').filter(|c| !c.is_empty());
        let mut current = self.get(components.next()?)?;

        for component in components {
            current = current.as_directory()?.get(component)?;
        }

        Some(current)
    }

    /// Lists the direct children of this directory.
    pub fn list(&self) -> Vec<Listing> {
        self.items
            .iter()
            .map(|item| Listing {
                name: item.name().to_owned(),
                kind: item.kind(),
                size: item.as_file().map_or(0, Entry::size),
            })
            .collect()
    }

    /// Returns a copy with every level sorted by name, ignoring ASCII case.
    pub fn sorted(&self) -> Directory<F>
    where
        F: Clone,
    {
        let mut items: Vec<Item<F>> = self
            .items
            .iter()
            .map(|item| match item {
                Item::File(_) => item.clone(),
                Item::Directory(directory) => Item::Directory(directory.sorted()),
            })
            .collect();
        items.sort_by_cached_key(|item| item.name().to_ascii_lowercase());

        Directory {
            name: self.name.clone(),
            items,
        }
    }

    /// Iterates over every file below this directory, depth first, with its `/` separated path.
    pub fn files(&self) -> Files<'_, F> {
        Files {
            stack: vec![(String::new(), self.items.iter())],
        }
    }

    /// Number of files below this directory
    pub fn file_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                Item::File(_) => 1,
                Item::Directory(directory) => directory.file_count(),
            })
            .sum()
    }
}

/// Depth first iterator returned by [`Directory::files`]
pub struct Files<'a, F = FileRecord> {
    stack: Vec<(String, std::slice::Iter<'a, Item<F>>)>,
}

impl<'a, F: Entry> Iterator for Files<'a, F> {
    type Item = (String, &'a F);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (prefix, iter) = self.stack.last_mut()?;
            let Some(item) = iter.next() else {
                self.stack.pop();
                continue;
            };

            let path = if prefix.is_empty() {
                item.name().to_owned()
            } else {
                format!("{prefix}/{}", item.name())
            };

            match item {
                Item::File(file) => return Some((path, file)),
                Item::Directory(directory) => self.stack.push((path, directory.items.iter())),
            }
        }
    }
}
