//! Types for reading HPI archives
//!

use binrw::{BinRead, Endian};
use bon::Builder;
use indexmap::IndexMap;
use std::{
    borrow::Cow,
    collections::HashSet,
    fmt::{self, Debug},
    io::{Cursor, Read},
};
use tracing::{debug, instrument, warn};

use crate::{
    chunk::{self, Chunk},
    cipher::Cipher,
    compression::CompressionMethod,
    error::{
        CorruptData, DecodeError, Error, FileNotFoundError, FormatError, IntegrityError, Result,
    },
    tree::{Directory, FileRecord, Item, Listing},
    types::{
        HpiHeader, HpiVersion, TaDirHeader, TaEntry, TaExtHeader, TaFileEntry, TakDirEntry,
        TakExtHeader, TakFileEntry, HPI_MARKER, MAX_CHUNK_SIZE,
    },
};

/// Deepest directory nesting accepted while walking an archive
pub const MAX_DEPTH: usize = 256;

/// Options controlling how an archive is read
///
/// ```
/// let options = ta_hpi::HpiOptions::builder()
///     .max_entry_size(64 * 1024 * 1024)
///     .build();
/// assert_eq!(options.max_entry_size, Some(64 * 1024 * 1024));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder)]
pub struct HpiOptions {
    /// Largest extracted size accepted for a single entry or metadata block
    pub max_entry_size: Option<u64>,
}

impl HpiOptions {
    fn check_size(&self, size: u64) -> std::result::Result<(), DecodeError> {
        match self.max_entry_size {
            Some(limit) if size > limit => Err(DecodeError::TooLarge { size, limit }),
            _ => Ok(()),
        }
    }
}

/// An extracted entry that can be consumed through [`Read`]
pub struct HpiFile<'a> {
    path: String,
    record: &'a FileRecord,
    reader: Cursor<Vec<u8>>,
}

impl Debug for HpiFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HpiFile({:#?})", self.record)
    }
}

/// Methods for retrieving information on HPI file entries
impl HpiFile<'_> {
    /// Get the `/` separated path of the file within the archive
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this path directly when extracting an archive. Names are taken
    /// from the archive as they are and may contain `..` components.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the name of the file within its directory
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Get the size of the file, in bytes, when extracted
    pub fn size(&self) -> u64 {
        self.record.size
    }

    /// Get the compression method used for this file
    pub fn compression_method(&self) -> CompressionMethod {
        self.record.compression
    }

    /// Get the starting offset of the data of the file
    pub fn data_start(&self) -> u64 {
        self.record.offset
    }

    /// Unwrap the extracted bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.reader.into_inner()
    }
}

impl Read for HpiFile<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

/// HPI archive reader
///
/// The whole archive is held in memory, typically as a `Vec<u8>` or a memory map. Opening
/// the archive validates the header and walks the directory tree; file data is only touched
/// by [`HpiArchive::extract`].
///
/// ```no_run
/// fn list_hpi_contents(path: &str) -> ta_hpi::error::Result<()> {
///     let archive = ta_hpi::HpiArchive::new(std::fs::read(path)?)?;
///
///     for (path, record) in archive.files() {
///         println!("{path}: {} bytes", record.size);
///         let data = archive.extract(record)?;
///         assert_eq!(data.len() as u64, record.size);
///     }
///
///     Ok(())
/// }
/// ```
pub struct HpiArchive<B> {
    data: B,
    version: HpiVersion,
    cipher: Cipher,
    root: Directory,
    files: IndexMap<Box<str>, FileRecord>,
    options: HpiOptions,
}

impl<B> Debug for HpiArchive<B> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("HpiArchive")
            .field("version", &self.version)
            .field("encrypted", &self.cipher.is_enabled())
            .field("files", &self.files.len())
            .field("options", &self.options)
            .finish()
    }
}

impl<B> HpiArchive<B> {
    /// Total size of the files in the archive once extracted
    pub fn decompressed_size(&self) -> u128 {
        self.files.values().map(|file| file.size as u128).sum()
    }

    /// Which layout the archive uses
    pub fn version(&self) -> HpiVersion {
        self.version
    }

    /// Whether the archive cipher is enabled
    pub fn is_encrypted(&self) -> bool {
        self.cipher.is_enabled()
    }

    /// The options the archive was opened with
    pub fn options(&self) -> &HpiOptions {
        &self.options
    }

    /// The root of the directory tree, in archive order
    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Number of files contained in this archive
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether this archive contains no files
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the `/` separated paths of every file, depth first.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_ref())
    }

    /// Returns an iterator over every file with its `/` separated path, depth first.
    pub fn files(&self) -> impl Iterator<Item = (&str, &FileRecord)> {
        self.files.iter().map(|(path, file)| (path.as_ref(), file))
    }

    /// Get the index of a file by path, ignoring ASCII case and accepting `\` separators.
    pub fn index_for_name(&self, path: &str) -> Option<usize> {
        if let Some(index) = self.files.get_index_of(path) {
            return Some(index);
        }

        let wanted: Vec<&str> = components(path).collect();
        self.files.keys().position(|candidate| {
            let mut parts = candidate.split('/');
            wanted
                .iter()
                .all(|w| parts.next().is_some_and(|p| p.eq_ignore_ascii_case(w)))
                && parts.next().is_none()
        })
    }

    /// Get the path of a file by index, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.files.get_index(index).map(|(name, _)| name.as_ref())
    }

    /// Resolves a `/` separated path to a file or directory, ignoring ASCII case.
    pub fn resolve(&self, path: &str) -> Result<&Item> {
        self.root
            .resolve(path)
            .ok_or_else(|| FileNotFoundError::Path(path.to_owned()).into())
    }

    /// Lists the children of the directory at `path`.
    ///
    /// An empty path, or one made only of separators, lists the root.
    pub fn list(&self, path: &str) -> Result<Vec<Listing>> {
        if components(path).next().is_none() {
            return Ok(self.root.list());
        }

        match self.resolve(path)? {
            Item::Directory(directory) => Ok(directory.list()),
            Item::File(_) => Err(FileNotFoundError::NotDirectory(path.to_owned()).into()),
        }
    }

    /// Unwrap and return the archive bytes
    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<B: AsRef<[u8]>> HpiArchive<B> {
    /// Opens an archive with default options.
    pub fn new(data: B) -> Result<HpiArchive<B>> {
        Self::with_options(data, HpiOptions::default())
    }

    /// Opens an archive, validating the header and reading the whole directory tree.
    #[instrument(skip_all, fields(len = data.as_ref().len()), err)]
    pub fn with_options(data: B, options: HpiOptions) -> Result<HpiArchive<B>> {
        let bytes = data.as_ref();
        let marker = match bytes.first_chunk::<4>() {
            Some(marker) => u32::from_le_bytes(*marker),
            None => return Err(FormatError::Truncated(bytes.len()).into()),
        };
        if marker != HPI_MARKER {
            return Err(FormatError::BadMarker(marker).into());
        }
        if bytes.len() < HpiHeader::SIZE {
            return Err(FormatError::Truncated(bytes.len()).into());
        }

        let header: HpiHeader = Region::new("archive", bytes).read(0, HpiHeader::SIZE)?;

        let (version, cipher, root) = match header.version {
            HpiVersion::TA => {
                let (cipher, root) = read_ta(bytes)?;
                (HpiVersion::Ta, cipher, root)
            }
            HpiVersion::KINGDOMS => {
                let root = read_tak(bytes, &options)?;
                (HpiVersion::Kingdoms, Cipher::default(), root)
            }
            HpiVersion::SAVEGAME => return Err(FormatError::Unsupported(header.version).into()),
            other => return Err(FormatError::UnknownVersion(other).into()),
        };

        let files: IndexMap<Box<str>, FileRecord> = root
            .files()
            .map(|(path, file)| (path.into_boxed_str(), file.clone()))
            .collect();
        debug!(
            ?version,
            encrypted = cipher.is_enabled(),
            files = files.len(),
            "opened archive"
        );

        Ok(HpiArchive {
            data,
            version,
            cipher,
            root,
            files,
            options,
        })
    }

    /// Search for a file by path and extract it
    pub fn by_name(&self, path: &str) -> Result<HpiFile<'_>> {
        let Some(index) = self.index_for_name(path) else {
            return Err(FileNotFoundError::Path(path.to_owned()).into());
        };
        self.by_index(index)
    }

    /// Extract a contained file by index
    pub fn by_index(&self, index: usize) -> Result<HpiFile<'_>> {
        let (path, record) = self
            .files
            .get_index(index)
            .ok_or(FileNotFoundError::Index(index))?;

        Ok(HpiFile {
            path: path.to_string(),
            record,
            reader: Cursor::new(self.extract(record)?),
        })
    }

    /// Extracts the file at `path`, ignoring ASCII case.
    pub fn extract_path(&self, path: &str) -> Result<Vec<u8>> {
        match self.resolve(path)? {
            Item::File(file) => self.extract(file),
            Item::Directory(_) => Err(FileNotFoundError::IsDirectory(path.to_owned()).into()),
        }
    }

    /// Extracts the contents of a file record.
    ///
    /// Returns exactly `file.size` bytes. A chunk whose checksum does not match is still
    /// decoded, and the whole entry is then reported as [`Error::CorruptData`] carrying the
    /// bytes recovered.
    #[instrument(skip(self, file), fields(name = %file.name, size = file.size), err)]
    pub fn extract(&self, file: &FileRecord) -> Result<Vec<u8>> {
        self.options.check_size(file.size)?;

        match (self.version, file.compression) {
            (_, CompressionMethod::None) => self.extract_stored(file),
            (HpiVersion::Ta, _) => self.extract_ta_chunks(file),
            (HpiVersion::Kingdoms, _) => self.extract_tak_chunks(file),
        }
    }

    fn data_region(&self) -> Region<'_> {
        Region::new("archive", self.data.as_ref())
    }

    fn extract_stored(&self, file: &FileRecord) -> Result<Vec<u8>> {
        let stored = self
            .data_region()
            .entry_slice(file.offset, file.size)?;
        Ok(self.cipher.transform(stored, file.offset))
    }

    fn extract_ta_chunks(&self, file: &FileRecord) -> Result<Vec<u8>> {
        let region = self.data_region();
        let count = file.size.div_ceil(MAX_CHUNK_SIZE as u64);

        let table = self
            .cipher
            .transform(region.entry_slice(file.offset, count * 4)?, file.offset);
        let sizes = table
            .chunks_exact(4)
            .map(|size| u32::from_le_bytes([size[0], size[1], size[2], size[3]]) as u64);

        let mut assembly = Assembly::new(file.size);
        let mut position = file.offset + count * 4;

        for size in sizes {
            let step = region
                .entry_slice(position, size)
                .map(|stored| self.cipher.transform(stored, position))
                .map_err(Error::from)
                .and_then(|stored| {
                    let chunk = Chunk::parse(&stored)?;
                    assembly.push(&chunk, Some(MAX_CHUNK_SIZE))
                });
            if let Err(error) = step {
                return Err(assembly.fail(error));
            }
            position += size;
        }

        assembly.finish()
    }

    fn extract_tak_chunks(&self, file: &FileRecord) -> Result<Vec<u8>> {
        let stored_len = file.compressed_size.unwrap_or_default();
        let stored = self.data_region().entry_slice(file.offset, stored_len)?;

        let mut assembly = Assembly::new(file.size);
        let mut position = 0usize;

        while assembly.remaining() > 0 {
            let step = Chunk::parse(&stored[position..])
                .map_err(Error::from)
                .and_then(|chunk| {
                    assembly.push(&chunk, None)?;
                    Ok(chunk.stored_len())
                });
            match step {
                Ok(len) => position += len,
                Err(error) => return Err(assembly.fail(error)),
            }
        }

        if position < stored.len() {
            debug!(trailing = stored.len() - position, "ignoring bytes after last chunk");
        }
        assembly.finish()
    }
}

fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(|c: char| c == '/' || c == '\\')
        .filter(|c| !c.is_empty())
}

/// Collects decoded chunks for a single entry.
struct Assembly {
    output: Vec<u8>,
    size: u64,
    chunks: usize,
    mismatch: Option<(usize, u32, u32)>,
}

impl Assembly {
    fn new(size: u64) -> Self {
        Assembly {
            output: Vec::new(),
            size,
            chunks: 0,
            mismatch: None,
        }
    }

    fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.output.len() as u64)
    }

    fn push(&mut self, chunk: &Chunk<'_>, chunk_limit: Option<u32>) -> Result<()> {
        let index = self.chunks;
        self.chunks += 1;

        let declared = chunk.header().decompressed_size;
        if let Some(limit) = chunk_limit.filter(|&limit| declared > limit) {
            return Err(DecodeError::ChunkTooLarge {
                size: declared as u64,
                limit: limit as u64,
            }
            .into());
        }
        if declared as u64 > self.remaining() {
            return Err(DecodeError::SizeMismatch {
                expected: self.size,
                actual: self.output.len() as u64 + declared as u64,
            }
            .into());
        }

        if !chunk.verify() {
            let (expected, actual) = (chunk.header().checksum, chunk.actual_checksum());
            warn!(chunk = index, expected, actual, "chunk checksum mismatch");
            self.mismatch.get_or_insert((index, expected, actual));
        }

        let decoded = chunk.decode()?;
        self.output.extend_from_slice(&decoded);
        Ok(())
    }

    fn corrupt(self) -> std::result::Result<Vec<u8>, Error> {
        match self.mismatch {
            Some((chunk, expected, actual)) => Err(Error::CorruptData(Box::new(CorruptData {
                chunk,
                expected,
                actual,
                partial: self.output,
            }))),
            None => Ok(self.output),
        }
    }

    /// A failure after a checksum mismatch is reported as corruption with the bytes recovered.
    fn fail(self, error: Error) -> Error {
        self.corrupt().err().unwrap_or(error)
    }

    fn finish(self) -> Result<Vec<u8>> {
        let size = self.size;
        let output = self.corrupt()?;
        if output.len() as u64 != size {
            return Err(DecodeError::SizeMismatch {
                expected: size,
                actual: output.len() as u64,
            }
            .into());
        }
        Ok(output)
    }
}

/// A named byte range whose reads are bounds checked.
#[derive(Clone, Copy)]
struct Region<'a> {
    name: &'static str,
    data: &'a [u8],
}

impl<'a> Region<'a> {
    fn new(name: &'static str, data: &'a [u8]) -> Self {
        Region { name, data }
    }

    fn out_of_bounds(&self, offset: u64, len: u64) -> IntegrityError {
        IntegrityError::OutOfBounds {
            region: self.name,
            offset,
            len,
            bound: self.data.len() as u64,
        }
    }

    fn slice(&self, offset: u64, len: u64) -> std::result::Result<&'a [u8], IntegrityError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() as u64 => {
                Ok(&self.data[offset as usize..end as usize])
            }
            _ => Err(self.out_of_bounds(offset, len)),
        }
    }

    /// Like [`Region::slice`], but failures are scoped to a single entry.
    fn entry_slice(&self, offset: u64, len: u64) -> std::result::Result<&'a [u8], DecodeError> {
        self.slice(offset, len)
            .map_err(|_| DecodeError::OutOfBounds { offset, len })
    }

    fn read<T>(&self, offset: u64, size: usize) -> Result<T>
    where
        T: for<'b> BinRead<Args<'b> = ()>,
    {
        let bytes = self.slice(offset, size as u64)?;
        Ok(T::read_options(&mut Cursor::new(bytes), Endian::Little, ())?)
    }

    fn read_array<T>(&self, offset: u64, count: u32, size: usize) -> Result<Vec<T>>
    where
        T: for<'b> BinRead<Args<'b> = ()>,
    {
        let bytes = self.slice(offset, count as u64 * size as u64)?;
        let mut cursor = Cursor::new(bytes);
        (0..count)
            .map(|_| T::read_options(&mut cursor, Endian::Little, ()).map_err(Error::from))
            .collect()
    }

    fn name(&self, offset: u64) -> Result<String> {
        let tail = self.slice(offset, 0).map(|_| &self.data[offset as usize..])?;
        let Some(end) = tail.iter().position(|&b| b == 0) else {
            return Err(IntegrityError::UnterminatedName(offset).into());
        };
        Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
    }
}

/// Reads the tree of a Total Annihilation archive.
#[instrument(skip_all, err)]
fn read_ta(data: &[u8]) -> Result<(Cipher, Directory)> {
    let ext: TaExtHeader =
        Region::new("header", data).read(HpiHeader::SIZE as u64, TaExtHeader::SIZE)?;
    let cipher = Cipher::new(ext.header_key);

    let start = ext.directory_offset as u64;
    if start > data.len() as u64 {
        return Err(IntegrityError::OutOfBounds {
            region: "archive",
            offset: start,
            len: ext.directory_size as u64,
            bound: data.len() as u64,
        }
        .into());
    }
    let end = start + ext.directory_size as u64;
    if end > data.len() as u64 {
        warn!(
            requested = ext.directory_size,
            available = data.len() as u64 - start,
            "directory extends past end of archive"
        );
    }
    let end = end.min(data.len() as u64) as usize;

    // Offsets inside the directory are absolute, so the decrypted block keeps its place in a
    // buffer that spans the file up to the end of the directory.
    let mut blob = vec![0u8; end];
    blob[start as usize..].copy_from_slice(&data[start as usize..end]);
    cipher.apply(&mut blob[start as usize..], start);
    debug!(start, end, key = cipher.key(), "decrypted directory");

    let mut walker = TaWalker {
        directory: Region::new("directory", &blob),
        start,
        visited: HashSet::new(),
    };
    let items = walker.directory(start, 0)?;
    Ok((cipher, Directory::new("", items)))
}

struct TaWalker<'a> {
    directory: Region<'a>,
    start: u64,
    visited: HashSet<u64>,
}

impl TaWalker<'_> {
    fn check(&self, offset: u64, len: u64) -> Result<()> {
        if offset < self.start {
            return Err(self.directory.out_of_bounds(offset, len).into());
        }
        self.directory.slice(offset, len)?;
        Ok(())
    }

    fn directory(&mut self, offset: u64, depth: usize) -> Result<Vec<Item>> {
        if depth > MAX_DEPTH {
            return Err(IntegrityError::TooDeep(MAX_DEPTH).into());
        }
        if !self.visited.insert(offset) {
            return Err(IntegrityError::Cycle(offset).into());
        }

        self.check(offset, TaDirHeader::SIZE as u64)?;
        let header: TaDirHeader = self.directory.read(offset, TaDirHeader::SIZE)?;
        self.check(
            header.entry_offset as u64,
            header.entries as u64 * TaEntry::SIZE as u64,
        )?;
        let entries: Vec<TaEntry> =
            self.directory
                .read_array(header.entry_offset as u64, header.entries, TaEntry::SIZE)?;

        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            self.check(entry.name_offset as u64, 1)?;
            let name = self.directory.name(entry.name_offset as u64)?;

            if entry.is_directory() {
                let children = self.directory(entry.data_offset as u64, depth + 1)?;
                items.push(Item::Directory(Directory::new(name, children)));
                continue;
            }

            self.check(entry.data_offset as u64, TaFileEntry::SIZE as u64)?;
            let file: TaFileEntry = self
                .directory
                .read(entry.data_offset as u64, TaFileEntry::SIZE)?;
            let compression = CompressionMethod::try_from(file.compression).unwrap_or_else(|_| {
                warn!(name, tag = file.compression, "unknown compression, treating as stored");
                CompressionMethod::None
            });
            items.push(Item::File(FileRecord {
                name: name.into(),
                offset: file.data_offset as u64,
                compressed_size: None,
                size: file.size as u64,
                compression,
            }));
        }

        Ok(items)
    }
}

/// Decodes a metadata block, which is either stored raw or wrapped in a single chunk.
fn read_block<'a>(
    data: &'a [u8],
    region: &'static str,
    offset: u32,
    size: u32,
    options: &HpiOptions,
) -> Result<Cow<'a, [u8]>> {
    let raw = Region::new("archive", data).slice(offset as u64, size as u64)?;
    if !chunk::is_chunk(raw) {
        return Ok(Cow::Borrowed(raw));
    }

    let block = |source| IntegrityError::Block { region, source };
    let parsed = Chunk::parse(raw).map_err(block)?;
    options
        .check_size(parsed.header().decompressed_size as u64)
        .map_err(block)?;
    let decoded = chunk::decode(raw).map_err(block)?;
    debug!(region, stored = raw.len(), size = decoded.len(), "decoded block");
    Ok(Cow::Owned(decoded))
}

/// Reads the tree of a Kingdoms archive.
#[instrument(skip_all, err)]
fn read_tak(data: &[u8], options: &HpiOptions) -> Result<Directory> {
    let ext: TakExtHeader =
        Region::new("header", data).read(HpiHeader::SIZE as u64, TakExtHeader::SIZE)?;

    let directory = read_block(
        data,
        "directory",
        ext.directory_offset,
        ext.directory_size,
        options,
    )?;
    let names = read_block(data, "names", ext.names_offset, ext.names_size, options)?;

    let mut walker = TakWalker {
        directory: Region::new("directory", &directory),
        names: Region::new("names", &names),
        visited: HashSet::new(),
    };
    let root: TakDirEntry = walker.directory.read(0, TakDirEntry::SIZE)?;
    let items = walker.directory(0, &root, 0)?;
    Ok(Directory::new("", items))
}

struct TakWalker<'a> {
    directory: Region<'a>,
    names: Region<'a>,
    visited: HashSet<u64>,
}

impl TakWalker<'_> {
    fn directory(&mut self, offset: u64, entry: &TakDirEntry, depth: usize) -> Result<Vec<Item>> {
        if depth > MAX_DEPTH {
            return Err(IntegrityError::TooDeep(MAX_DEPTH).into());
        }
        if !self.visited.insert(offset) {
            return Err(IntegrityError::Cycle(offset).into());
        }

        let subdirectories: Vec<TakDirEntry> = self.directory.read_array(
            entry.subdirectory_offset as u64,
            entry.subdirectories,
            TakDirEntry::SIZE,
        )?;
        let files: Vec<TakFileEntry> =
            self.directory
                .read_array(entry.file_offset as u64, entry.files, TakFileEntry::SIZE)?;

        let mut items = Vec::with_capacity(subdirectories.len() + files.len());
        for (index, subdirectory) in subdirectories.iter().enumerate() {
            let offset = entry.subdirectory_offset as u64 + (index * TakDirEntry::SIZE) as u64;
            let name = self.names.name(subdirectory.name_offset as u64)?;
            let children = self.directory(offset, subdirectory, depth + 1)?;
            items.push(Item::Directory(Directory::new(name, children)));
        }

        for file in files {
            let name = self.names.name(file.name_offset as u64)?;
            // Chunked files are reported as zlib; each chunk carries its own tag for decoding.
            let (compression, compressed_size) = match file.compressed_size {
                0 => (CompressionMethod::None, file.size),
                size => (CompressionMethod::Zlib, size),
            };
            items.push(Item::File(FileRecord {
                name: name.into(),
                offset: file.data_offset as u64,
                compressed_size: Some(compressed_size as u64),
                size: file.size as u64,
                compression,
            }));
        }

        Ok(items)
    }
}
