//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Builder of miniature on-disk SqPacks for the tests of this crate.
//!
//! There is no real game data in the repo, so the tests build their own: a `.index`, a
//! `.index2` and a `.dat0` with proper headers, locator tables and block-compressed Binary
//! entries, written through the same structures the readers decode.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::binary::WriteBytes;
use crate::compression::{COMPRESSED_SIZE_NOT_COMPRESSED, Compressible};
use crate::error::Result;
use crate::sqpack::entry::{BLOCK_HEADER_SIZE, ENTRY_HEADER_SIZE};
use crate::sqpack::index::{DataLocator, PAIR_HASH_LOCATOR_SIZE, TEXT_LOCATOR_SENTINEL};
use crate::sqpack::path_spec::PathSpec;

/// Offset of the first entry within the generated `.dat0`: past the fake headers region.
const FIRST_ENTRY_OFFSET: usize = 2048;

/// Offset of the first segment within the generated index files: past the two headers.
const FIRST_SEGMENT_OFFSET: u32 = 2048;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// One file to store in a generated SqPack.
pub(crate) struct FixtureFile {

    /// Path of the file within the SqPack.
    pub path: String,

    /// Contents of the file.
    pub data: Vec<u8>,

    /// If the file should be stored as a synonym, resolvable only through the text table.
    pub synonym: bool,

    /// Decompressed size of each block the contents get split into.
    pub block_size: usize,
}

impl FixtureFile {

    pub fn new(path: &str, data: &[u8]) -> Self {
        Self {
            path: path.to_owned(),
            data: data.to_vec(),
            synonym: false,
            block_size: 16000,
        }
    }

    pub fn synonym(mut self) -> Self {
        self.synonym = true;
        self
    }

    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }
}

//---------------------------------------------------------------------------//
//                              Builder functions
//---------------------------------------------------------------------------//

/// This function encodes a Binary entry: header, block locator table, and one block per
/// `block_size` bytes of data. Blocks that don't shrink under DEFLATE are stored raw.
pub(crate) fn encode_binary_entry(data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    let chunks = if data.is_empty() { vec![] } else { data.chunks(block_size).collect::<Vec<_>>() };

    let mut blocks: Vec<u8> = vec![];
    let mut locators: Vec<(u32, u16, u16)> = vec![];
    for chunk in &chunks {
        let offset = blocks.len() as u32;

        let compressed = chunk.compress()?;
        let (compressed_size, payload) = if compressed.len() < chunk.len() {
            (compressed.len() as u32, compressed)
        } else {
            (COMPRESSED_SIZE_NOT_COMPRESSED, chunk.to_vec())
        };

        blocks.write_u32(BLOCK_HEADER_SIZE as u32)?;
        blocks.write_u32(0)?;
        blocks.write_u32(compressed_size)?;
        blocks.write_u32(chunk.len() as u32)?;
        blocks.write_all(&payload)?;

        locators.push((offset, (BLOCK_HEADER_SIZE + payload.len()) as u16, chunk.len() as u16));
    }

    let header_size = (ENTRY_HEADER_SIZE + 8 * locators.len()) as u32;
    let total_size = header_size as u64 + blocks.len() as u64;

    let mut entry = vec![];
    entry.write_u32(header_size)?;
    entry.write_u32(2)?;
    entry.write_u32(data.len() as u32)?;
    entry.write_u32(0)?;
    entry.write_u32(((total_size + 0x7F) >> 7) as u32)?;
    entry.write_u32(locators.len() as u32)?;

    for (offset, stored_size, decompressed_size) in locators {
        entry.write_u32(offset)?;
        entry.write_u16(stored_size)?;
        entry.write_u16(decompressed_size)?;
    }

    entry.write_all(&blocks)?;
    Ok(entry)
}

/// This function writes a 1024-byte archive header.
fn write_sqpack_header(buffer: &mut Vec<u8>, kind: u32) -> Result<()> {
    buffer.write_all(b"SqPack\0\0\0\0\0\0")?;
    buffer.write_u32(1024)?;
    buffer.write_u32(0)?;
    buffer.write_u32(kind)?;
    buffer.write_u32(20240101)?;
    buffer.write_u32(0)?;
    buffer.write_u32(0)?;
    buffer.write_all(&vec![0; 0x3C0 - 36])?;
    buffer.write_all(&[0; 20])?;
    buffer.write_all(&[0; 0x2C])?;
    Ok(())
}

/// This function writes a 72-byte segment descriptor.
fn write_segment(buffer: &mut Vec<u8>, count: u32, offset: u32, size: u32) -> Result<()> {
    buffer.write_u32(count)?;
    buffer.write_u32(offset)?;
    buffer.write_u32(size)?;
    buffer.write_all(&[0; 20])?;
    buffer.write_all(&[0; 0x28])?;
    Ok(())
}

/// This function writes a 1024-byte index header. Segments come as `(count, offset, size)`.
fn write_index_header(buffer: &mut Vec<u8>, index_type: u32, hash: (u32, u32, u32), text: (u32, u32, u32), unknown: (u32, u32, u32), path: (u32, u32, u32)) -> Result<()> {
    buffer.write_u32(1024)?;
    write_segment(buffer, hash.0, hash.1, hash.2)?;
    buffer.write_all(&[0; 4])?;
    write_segment(buffer, text.0, text.1, text.2)?;
    write_segment(buffer, unknown.0, unknown.1, unknown.2)?;
    write_segment(buffer, path.0, path.1, path.2)?;
    buffer.write_all(&[0; 4])?;
    buffer.write_u32(index_type)?;
    buffer.write_all(&vec![0; 0x3C0 - 0x130])?;
    buffer.write_all(&[0; 20])?;
    buffer.write_all(&[0; 0x2C])?;
    Ok(())
}

/// This function writes one 256-byte text locator row.
fn write_text_locator(buffer: &mut Vec<u8>, hash_1: u32, hash_2: u32, locator: u32, conflict_index: u32, full_path: &str) -> Result<()> {
    buffer.write_u32(hash_1)?;
    buffer.write_u32(hash_2)?;
    buffer.write_u32(locator)?;
    buffer.write_u32(conflict_index)?;
    buffer.write_string_u8_0padded(full_path, 0xF0)?;
    Ok(())
}

/// This function builds a whole SqPack in the provided folder and returns the path of its
/// `.index` file.
///
/// Synonym files are stored last in the `.dat0`, and share a single pair-hash row per
/// colliding hash pair, with the synonym bit set.
pub(crate) fn build_archive(folder: &Path, name: &str, files: &[FixtureFile]) -> Result<PathBuf> {

    // Encode every entry into the dat file, non-synonyms first.
    let mut dat: Vec<u8> = vec![0; FIRST_ENTRY_OFFSET];
    let mut stored: Vec<(&FixtureFile, PathSpec, u64)> = vec![];
    for file in files.iter().filter(|file| !file.synonym).chain(files.iter().filter(|file| file.synonym)) {
        let offset = dat.len() as u64;
        let entry = encode_binary_entry(&file.data, file.block_size)?;
        dat.write_all(&entry)?;

        // Entries are 128-byte aligned.
        let padding = (128 - dat.len() % 128) % 128;
        dat.write_all(&vec![0; padding])?;

        stored.push((file, PathSpec::new(&file.path), offset));
    }

    // Pair-hash rows: one per regular file, one per colliding hash pair.
    let mut pair_rows: Vec<(u32, u32, u32)> = vec![];
    for (file, spec, offset) in &stored {
        let path_hash = spec.path_hash().unwrap();
        let name_hash = spec.name_hash().unwrap();
        if file.synonym {
            if !pair_rows.iter().any(|(path, name, _)| *path == path_hash && *name == name_hash) {
                pair_rows.push((path_hash, name_hash, DataLocator::new(0, *offset, true)?.raw()));
            }
        } else {
            pair_rows.push((path_hash, name_hash, DataLocator::new(0, *offset, false)?.raw()));
        }
    }
    pair_rows.sort_unstable_by_key(|(path_hash, name_hash, _)| (*path_hash, *name_hash));

    let mut pair_segment: Vec<u8> = vec![];
    for (path_hash, name_hash, locator) in &pair_rows {
        pair_segment.write_u32(*name_hash)?;
        pair_segment.write_u32(*path_hash)?;
        pair_segment.write_u32(*locator)?;
        pair_segment.write_u32(0)?;
    }

    // Path-hash rows: one per folder, delimiting its run of pair-hash rows.
    let mut path_rows: Vec<(u32, u32, u32)> = vec![];
    for (index, (path_hash, _, _)) in pair_rows.iter().enumerate() {
        let row_offset = FIRST_SEGMENT_OFFSET + index as u32 * PAIR_HASH_LOCATOR_SIZE;
        match path_rows.last_mut() {
            Some((last_hash, _, size)) if last_hash == path_hash => *size += PAIR_HASH_LOCATOR_SIZE,
            _ => path_rows.push((*path_hash, row_offset, PAIR_HASH_LOCATOR_SIZE)),
        }
    }

    let mut path_segment: Vec<u8> = vec![];
    for (path_hash, offset, size) in &path_rows {
        path_segment.write_u32(*path_hash)?;
        path_segment.write_u32(*offset)?;
        path_segment.write_u32(*size)?;
        path_segment.write_u32(0)?;
    }

    // Text rows: one per synonym file, sorted by hash pair, plus the sentinel.
    let mut text_rows: Vec<(&FixtureFile, &PathSpec, u64)> = stored.iter()
        .filter(|(file, _, _)| file.synonym)
        .map(|(file, spec, offset)| (*file, spec, *offset))
        .collect();
    text_rows.sort_unstable_by_key(|(_, spec, _)| (spec.path_hash().unwrap(), spec.name_hash().unwrap()));

    let mut text_segment: Vec<u8> = vec![];
    let mut conflict_index = 0;
    for (file, spec, offset) in &text_rows {
        let locator = DataLocator::new(0, *offset, true)?.raw();
        write_text_locator(&mut text_segment, spec.name_hash().unwrap(), spec.path_hash().unwrap(), locator, conflict_index, &file.path)?;
        conflict_index += 1;
    }
    write_text_locator(&mut text_segment, TEXT_LOCATOR_SENTINEL, TEXT_LOCATOR_SENTINEL, 0, TEXT_LOCATOR_SENTINEL, "")?;

    // Assemble the .index file. The text segment's count is the amount of dat files.
    let pair_offset = FIRST_SEGMENT_OFFSET;
    let text_offset = pair_offset + pair_segment.len() as u32;
    let path_offset = text_offset + text_segment.len() as u32;

    let mut index_1: Vec<u8> = vec![];
    write_sqpack_header(&mut index_1, 2)?;
    write_index_header(
        &mut index_1,
        0,
        (pair_rows.len() as u32, pair_offset, pair_segment.len() as u32),
        (1, text_offset, text_segment.len() as u32),
        (0, path_offset, 0),
        (path_rows.len() as u32, path_offset, path_segment.len() as u32),
    )?;
    index_1.write_all(&pair_segment)?;
    index_1.write_all(&text_segment)?;
    index_1.write_all(&path_segment)?;

    // Assemble the .index2 file: full-path-hash rows for everything, and just the sentinel in
    // its text table (the full hashes of the fixtures never collide).
    let mut full_rows: Vec<(u32, u32)> = stored.iter()
        .map(|(_, spec, offset)| Ok((spec.full_path_hash().unwrap(), DataLocator::new(0, *offset, false)?.raw())))
        .collect::<Result<Vec<_>>>()?;
    full_rows.sort_unstable_by_key(|(full_path_hash, _)| *full_path_hash);

    let mut full_segment: Vec<u8> = vec![];
    for (full_path_hash, locator) in &full_rows {
        full_segment.write_u32(*full_path_hash)?;
        full_segment.write_u32(*locator)?;
    }

    let mut full_text_segment: Vec<u8> = vec![];
    write_text_locator(&mut full_text_segment, TEXT_LOCATOR_SENTINEL, TEXT_LOCATOR_SENTINEL, 0, TEXT_LOCATOR_SENTINEL, "")?;

    let full_offset = FIRST_SEGMENT_OFFSET;
    let full_text_offset = full_offset + full_segment.len() as u32;
    let end_offset = full_text_offset + full_text_segment.len() as u32;

    let mut index_2: Vec<u8> = vec![];
    write_sqpack_header(&mut index_2, 2)?;
    write_index_header(
        &mut index_2,
        2,
        (full_rows.len() as u32, full_offset, full_segment.len() as u32),
        (1, full_text_offset, full_text_segment.len() as u32),
        (0, end_offset, 0),
        (0, end_offset, 0),
    )?;
    index_2.write_all(&full_segment)?;
    index_2.write_all(&full_text_segment)?;

    // And write the three files to disk.
    let index_path = folder.join(format!("{name}.index"));
    std::fs::write(&index_path, &index_1)?;
    std::fs::write(folder.join(format!("{name}.index2")), &index_2)?;
    std::fs::write(folder.join(format!("{name}.dat0")), &dat)?;

    Ok(index_path)
}
