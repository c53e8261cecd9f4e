//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! SqPacks are the container format the games keep their assets in: one `.index` file, one
//! `.index2` file, and up to eight `.datN` files per category.
//!
//! Files inside a SqPack are addressed by hash: the `.index` file keys its entries by a
//! (folder hash, name hash) pair, and the `.index2` file by a single full-path hash. The rare
//! entries whose hashes collide carry a synonym flag, and resolve through a table of literal
//! paths instead. The [`PathSpec`](path_spec::PathSpec) type carries whatever mix of paths
//! and hashes the caller has.
//!
//! [`SqpackReader`] is the type tying the whole container together: it owns the decoded
//! locator tables and the `.datN` handles, resolves specs to entries, and decodes entries
//! into the files they represent.

use itertools::Itertools;
use log::debug;

use std::cell::RefCell;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{RLibError, Result};
use crate::utils::starts_with_case_insensitive;

use self::entry::decode_entry;
use self::index::{DataLocator, SqIndexReader};
use self::path_spec::PathSpec;

pub mod entry;
pub mod index;
pub mod path_spec;

#[cfg(test)] pub(crate) mod fixtures;

/// Extension of the first index file of a SqPack.
pub const INDEX_EXTENSION: &str = "index";

/// Extension of the second index file of a SqPack.
pub const INDEX_2_EXTENSION: &str = "index2";

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This struct represents an open SqPack: its decoded index tables, plus open handles to all
/// its `.datN` files.
///
/// A reader is strictly single-threaded: the dat handles live behind [`RefCell`]s, so it can
/// resolve and decode entries through `&self`, but it's deliberately not `Sync`. To read the
/// same SqPack from several threads, open one reader per thread.
pub struct SqpackReader {

    /// Path of the SqPack, without the extension. For error reporting.
    name: String,

    /// The decoded locator tables of the `.index`/`.index2` pair.
    index: SqIndexReader,

    /// Open handles to the `.datN` files, in order.
    data_files: Vec<RefCell<BufReader<File>>>,

    /// Size in bytes of each `.datN` file.
    data_file_sizes: Vec<u64>,

    /// Sorted entry offsets in use within each `.datN` file. An entry's stored size is the
    /// distance to the next used offset, or to the end of the file.
    data_offsets: Vec<Vec<u64>>,
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

impl SqpackReader {

    /// This function opens a SqPack from the path of its `.index` file, deriving the paths of
    /// its `.index2` file and its `.datN` files from it.
    ///
    /// The amount of `.datN` files comes from the index's text-locator segment count.
    pub fn open(index_path: &Path) -> Result<Self> {
        let index_2_path = index_path.with_extension(INDEX_2_EXTENSION);
        let index = SqIndexReader::open(index_path, &index_2_path)?;
        let name = index_path.with_extension("").to_string_lossy().to_string();

        let data_file_count = *index.index_1().text_locator_segment().count() as usize;
        let mut data_files = Vec::with_capacity(data_file_count);
        let mut data_file_sizes = Vec::with_capacity(data_file_count);
        for data_file_index in 0..data_file_count {
            let path = index_path.with_extension(format!("dat{data_file_index}"));
            let file = File::open(&path)?;
            data_file_sizes.push(file.metadata()?.len());
            data_files.push(RefCell::new(BufReader::new(file)));
        }

        let data_offsets = (0..data_file_count)
            .map(|data_file_index| index.pair_hash_locators().iter()
                .map(|locator| *locator.locator())
                .filter(|locator| locator.data_file_index() as usize == data_file_index)
                .map(|locator| locator.offset())
                .sorted_unstable()
                .collect::<Vec<_>>())
            .collect::<Vec<_>>();

        debug!("opened sqpack {name} with {data_file_count} data files");

        Ok(Self {
            name,
            index,
            data_files,
            data_file_sizes,
            data_offsets,
        })
    }

    /// This function returns the decoded index tables of the SqPack.
    pub fn index(&self) -> &SqIndexReader {
        &self.index
    }

    /// This function returns the path of the SqPack, without the extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This function resolves a spec to the locator of its entry.
    ///
    /// Resolution first tries the (path, name) hash pair against the `.index` tables, then
    /// the full-path hash against the `.index2` tables. If the winning locator carries the
    /// synonym flag, the spec needs a literal path, which is matched (case-insensitively)
    /// against the text-locator table; a synonym hit without a literal path is ambiguous.
    pub fn locate(&self, spec: &PathSpec) -> Result<DataLocator> {
        if let (Some(path_hash), Some(name_hash)) = (spec.path_hash(), spec.name_hash()) {
            let files = self.index.name_hash_locators(path_hash)
                .map_err(|error| match error {
                    RLibError::PathNotFound(_) => RLibError::PathNotFound(format!("{spec} (in {})", self.name)),
                    error => error,
                })?;

            let position = files.partition_point(|file| *file.name_hash() < name_hash);
            let file = files.get(position)
                .filter(|file| *file.name_hash() == name_hash)
                .ok_or_else(|| RLibError::PathNotFound(format!("{spec} (in {})", self.name)))?;

            let locator = *file.locator();
            if !locator.synonym() {
                return Ok(locator);
            }

            let full_path = spec.full_path().ok_or_else(|| RLibError::PathAmbiguous(spec.to_string()))?;
            let rows = self.index.pair_hash_text_locators();
            let start = rows.partition_point(|row| (*row.path_hash(), *row.name_hash()) < (path_hash, name_hash));
            for row in &rows[start..] {
                if row.is_sentinel() {
                    break;
                }

                if caseless::canonical_caseless_match_str(row.full_path(), full_path) {
                    return Ok(*row.locator());
                }
            }

            return Err(RLibError::PathNotFound(format!("{spec} (not in the synonym table of {})", self.name)));
        }

        if let Some(full_path_hash) = spec.full_path_hash() {
            let files = self.index.full_hash_locators();
            let position = files.partition_point(|file| *file.full_path_hash() < full_path_hash);
            let file = files.get(position)
                .filter(|file| *file.full_path_hash() == full_path_hash)
                .ok_or_else(|| RLibError::PathNotFound(format!("{spec} (in {})", self.name)))?;

            let locator = *file.locator();
            if !locator.synonym() {
                return Ok(locator);
            }

            let full_path = spec.full_path().ok_or_else(|| RLibError::PathAmbiguous(spec.to_string()))?;
            let rows = self.index.full_hash_text_locators();
            let start = rows.partition_point(|row| *row.full_path_hash() < full_path_hash);
            for row in &rows[start..] {
                if row.is_sentinel() {
                    break;
                }

                if caseless::canonical_caseless_match_str(row.full_path(), full_path) {
                    return Ok(*row.locator());
                }
            }

            return Err(RLibError::PathNotFound(format!("{spec} (not in the synonym table of {})", self.name)));
        }

        Err(RLibError::PathEmpty)
    }

    /// This function returns the stored (on-disk, compressed) size of the entry behind the
    /// provided locator.
    ///
    /// Entries are not self-delimiting, so the size is the distance from the entry's offset
    /// to the next used offset of its `.datN` file, or to the end of said file.
    pub fn stored_size(&self, locator: DataLocator) -> Result<u64> {
        let data_file_index = locator.data_file_index() as usize;
        let offsets = self.data_offsets.get(data_file_index).ok_or(RLibError::DataFileIndexOutOfRange(data_file_index as u32))?;

        let position = offsets.partition_point(|offset| *offset < locator.offset()) + 1;
        let end = match offsets.get(position) {
            Some(offset) => *offset,
            None => self.data_file_sizes[data_file_index],
        };

        Ok(end.saturating_sub(locator.offset()))
    }

    /// This function resolves a spec and decodes its entry into the file it represents.
    pub fn read(&self, spec: &PathSpec) -> Result<Vec<u8>> {
        let locator = self.locate(spec)?;
        self.read_located(locator)
    }

    /// This function decodes the entry behind an already-resolved locator.
    pub fn read_located(&self, locator: DataLocator) -> Result<Vec<u8>> {
        let data_file_index = locator.data_file_index() as usize;
        let read_size = self.stored_size(locator)?;
        let mut data_file = self.data_files.get(data_file_index)
            .ok_or(RLibError::DataFileIndexOutOfRange(data_file_index as u32))?
            .borrow_mut();

        decode_entry(&mut *data_file, locator.offset(), read_size)
    }

    /// This function lists the files under the folder of the provided spec, which must carry
    /// a full path ending in `/`.
    ///
    /// Regular entries come back as hash-only specs (the container doesn't know their names);
    /// synonym entries come back with their literal paths, from the text-locator table.
    pub fn files_with_path(&self, spec: &PathSpec) -> Result<Vec<PathSpec>> {
        let full_path = spec.full_path().filter(|path| path.ends_with('/')).ok_or(RLibError::PathEmpty)?;
        let path_hash = spec.path_hash().ok_or(RLibError::PathEmpty)?;

        let mut result = vec![];
        for file in self.index.name_hash_locators(path_hash)? {
            if !file.locator().synonym() {
                result.push(PathSpec::from_pair_hashes(*file.path_hash(), *file.name_hash()));
            }
        }

        for row in self.index.pair_hash_text_locators() {
            if row.is_sentinel() {
                break;
            }

            if starts_with_case_insensitive(row.full_path(), full_path) {
                result.push(PathSpec::new(row.full_path()));
            }
        }

        Ok(result)
    }
}
