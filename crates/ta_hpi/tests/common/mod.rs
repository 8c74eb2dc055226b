//! Builders for small archives used by the integration tests.
#![allow(dead_code)]

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};
use ta_hpi::cipher::Cipher;

pub const TA_HEADER: usize = 20;
pub const TAK_HEADER: usize = 32;

pub enum Node {
    File {
        name: String,
        data: Vec<u8>,
        compression: u8,
    },
    Dir {
        name: String,
        children: Vec<Node>,
    },
}

pub fn file(name: &str, data: impl Into<Vec<u8>>, compression: u8) -> Node {
    Node::File {
        name: name.to_owned(),
        data: data.into(),
        compression,
    }
}

pub fn dir(name: &str, children: Vec<Node>) -> Node {
    Node::Dir {
        name: name.to_owned(),
        children,
    }
}

/// Deterministic filler that does not compress to nothing.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// An LZ77 stream made only of literals.
pub fn lz77_literals(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 8 + 1);
    for block in data.chunks(8) {
        out.push(0x00);
        out.extend_from_slice(block);
    }
    out
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A complete `SQSH` chunk holding `plain`.
pub fn chunk(compression: u8, encrypt: bool, plain: &[u8]) -> Vec<u8> {
    let mut stored = match compression {
        0 => plain.to_vec(),
        1 => lz77_literals(plain),
        2 => zlib(plain),
        other => panic!("no encoder for compression {other}"),
    };
    if encrypt {
        for (i, b) in stored.iter_mut().enumerate() {
            *b = (*b ^ i as u8).wrapping_add(i as u8);
        }
    }
    let checksum = stored
        .iter()
        .fold(0u32, |sum, &b| sum.wrapping_add(b as u32));

    let mut out = b"SQSH".to_vec();
    out.push(0x02);
    out.push(compression);
    out.push(encrypt as u8);
    out.extend_from_slice(&(stored.len() as u32).to_le_bytes());
    out.extend_from_slice(&(plain.len() as u32).to_le_bytes());
    out.extend_from_slice(&checksum.to_le_bytes());
    out.extend_from_slice(&stored);
    out
}

fn put(buffer: &mut [u8], at: usize, value: u32) {
    buffer[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Finds the `n`th occurrence of `needle`.
pub fn find_nth(haystack: &[u8], needle: &[u8], n: usize) -> Option<usize> {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .nth(n)
        .map(|(at, _)| at)
}

/// Builds a Total Annihilation archive.
///
/// The directory directly follows the header and file data follows the directory. Everything
/// after the header is encrypted when `header_key` is non zero.
pub fn ta_archive(root: &[Node], header_key: u32, encrypt_chunks: bool) -> Vec<u8> {
    let mut directory = Vec::new();
    let mut pending = Vec::new();
    write_ta_dir(&mut directory, root, &mut pending);

    let data_start = TA_HEADER + directory.len();
    let mut data = Vec::new();
    for (descriptor, content, compression) in pending {
        put(&mut directory, descriptor, (data_start + data.len()) as u32);

        if compression == 0 {
            data.extend_from_slice(content);
            continue;
        }

        let chunks: Vec<Vec<u8>> = content
            .chunks(65536)
            .map(|block| chunk(compression, encrypt_chunks, block))
            .collect();
        for stored in &chunks {
            data.extend_from_slice(&(stored.len() as u32).to_le_bytes());
        }
        for stored in chunks {
            data.extend_from_slice(&stored);
        }
    }

    let mut out = b"HAPI".to_vec();
    out.extend_from_slice(&0x0001_0000u32.to_le_bytes());
    out.extend_from_slice(&(directory.len() as u32).to_le_bytes());
    out.extend_from_slice(&header_key.to_le_bytes());
    out.extend_from_slice(&(TA_HEADER as u32).to_le_bytes());
    out.extend_from_slice(&directory);
    out.extend_from_slice(&data);

    Cipher::new(header_key).apply(&mut out[TA_HEADER..], TA_HEADER as u64);
    out
}

fn write_ta_dir<'a>(
    directory: &mut Vec<u8>,
    children: &'a [Node],
    pending: &mut Vec<(usize, &'a [u8], u8)>,
) -> u32 {
    let absolute = |position: usize| (TA_HEADER + position) as u32;

    let header = directory.len();
    directory.extend_from_slice(&[0; 8]);
    let entries = directory.len();
    directory.resize(entries + children.len() * 9, 0);
    put(directory, header, children.len() as u32);
    put(directory, header + 4, absolute(entries));

    for (index, child) in children.iter().enumerate() {
        let (name, data_offset, flags) = match child {
            Node::Dir { name, children } => (name, write_ta_dir(directory, children, pending), 1),
            Node::File {
                name,
                data,
                compression,
            } => {
                let descriptor = directory.len();
                directory.extend_from_slice(&[0; 4]);
                directory.extend_from_slice(&(data.len() as u32).to_le_bytes());
                directory.push(*compression);
                pending.push((descriptor, data.as_slice(), *compression));
                (name, absolute(descriptor), 0)
            }
        };

        let name_offset = absolute(directory.len());
        directory.extend_from_slice(name.as_bytes());
        directory.push(0);

        let at = entries + index * 9;
        put(directory, at, name_offset);
        put(directory, at + 4, data_offset);
        directory[at + 8] = flags;
    }

    absolute(header)
}

/// Builds a Kingdoms archive.
///
/// File data directly follows the header, then the directory block and the name block. Both
/// blocks are wrapped in a zlib chunk when `compress_blocks` is set.
pub fn tak_archive(root: &[Node], compress_blocks: bool) -> Vec<u8> {
    let mut data = Vec::new();
    let mut names = vec![0u8];
    let mut directory = vec![0u8; 20];
    write_tak_dir(&mut directory, 0, 0, root, &mut names, &mut data);

    let wrap = |block: Vec<u8>| {
        if compress_blocks {
            chunk(2, false, &block)
        } else {
            block
        }
    };
    let directory = wrap(directory);
    let names = wrap(names);

    let directory_offset = TAK_HEADER + data.len();
    let names_offset = directory_offset + directory.len();

    let mut out = b"HAPI".to_vec();
    for value in [
        0x0002_0000,
        directory_offset,
        directory.len(),
        names_offset,
        names.len(),
        TAK_HEADER,
        0,
    ] {
        out.extend_from_slice(&(value as u32).to_le_bytes());
    }
    out.extend_from_slice(&data);
    out.extend_from_slice(&directory);
    out.extend_from_slice(&names);
    out
}

fn add_name(names: &mut Vec<u8>, name: &str) -> u32 {
    let offset = names.len() as u32;
    names.extend_from_slice(name.as_bytes());
    names.push(0);
    offset
}

fn write_tak_dir(
    directory: &mut Vec<u8>,
    entry: usize,
    name_offset: u32,
    children: &[Node],
    names: &mut Vec<u8>,
    data: &mut Vec<u8>,
) {
    let subdirectories: Vec<(&String, &Vec<Node>)> = children
        .iter()
        .filter_map(|child| match child {
            Node::Dir { name, children } => Some((name, children)),
            Node::File { .. } => None,
        })
        .collect();
    let files: Vec<(&String, &Vec<u8>, u8)> = children
        .iter()
        .filter_map(|child| match child {
            Node::File {
                name,
                data,
                compression,
            } => Some((name, data, *compression)),
            Node::Dir { .. } => None,
        })
        .collect();

    let subdirectory_offset = directory.len();
    directory.resize(subdirectory_offset + subdirectories.len() * 20, 0);

    let file_offset = directory.len();
    for (name, content, compression) in &files {
        let name_offset = add_name(names, name);
        let offset = TAK_HEADER + data.len();
        let compressed_size = if *compression == 0 {
            data.extend_from_slice(content);
            0
        } else {
            let start = data.len();
            for block in content.chunks(65536) {
                data.extend_from_slice(&chunk(*compression, false, block));
            }
            data.len() - start
        };

        for value in [
            name_offset as usize,
            offset,
            content.len(),
            compressed_size,
            0,
            0,
        ] {
            directory.extend_from_slice(&(value as u32).to_le_bytes());
        }
    }

    put(directory, entry, name_offset);
    put(directory, entry + 4, subdirectory_offset as u32);
    put(directory, entry + 8, subdirectories.len() as u32);
    put(directory, entry + 12, file_offset as u32);
    put(directory, entry + 16, files.len() as u32);

    for (index, (name, children)) in subdirectories.into_iter().enumerate() {
        let name_offset = add_name(names, name);
        write_tak_dir(
            directory,
            subdirectory_offset + index * 20,
            name_offset,
            children,
            names,
            data,
        );
    }
}
