//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! This module contains the reader of the `.index`/`.index2` pair of a SqPack, where the
//! path-hash locator tables live.
//!
//! # Index Structure
//!
//! Both files share the same outer layout:
//!
//! | Bytes | Type                            | Data                                       |
//! | ----- | ------------------------------- | ------------------------------------------ |
//! | 1024  | [Archive header](#archive-header) | Common header of every SqPack file.      |
//! | 1024  | [Index header](#index-header)   | Descriptors of the four locator segments.  |
//! | *     | Segments                        | The locator tables, where the descriptors point. |
//!
//! ## Archive header
//!
//! | Bytes | Type      | Data                                         |
//! | ----- | --------- | -------------------------------------------- |
//! | 12    | &\[[u8]\] | Signature. Always "SqPack\0\0\0\0\0\0".      |
//! | 4     | [u32]     | Size of this header. Always 1024.            |
//! | 4     | [u32]     | Unknown.                                     |
//! | 4     | [u32]     | Kind: 0 Database, 1 Data, 2 Index.           |
//! | 4     | [u32]     | Build date, as yyyymmdd.                     |
//! | 4     | [u32]     | Build time.                                  |
//! | 4     | [u32]     | Unknown.                                     |
//! | 924   | &\[[u8]\] | Padding.                                     |
//! | 20    | &\[[u8]\] | SHA-1 of the header.                         |
//! | 44    | &\[[u8]\] | Padding.                                     |
//!
//! ## Index header
//!
//! | Bytes | Type      | Data                                         |
//! | ----- | --------- | -------------------------------------------- |
//! | 4     | [u32]     | Size of this header. Always 1024.            |
//! | 72    | Segment   | Hash-locator segment descriptor.             |
//! | 4     | &\[[u8]\] | Padding.                                     |
//! | 72    | Segment   | Text-locator segment descriptor. Its `count` doubles as the amount of `.datN` files. |
//! | 72    | Segment   | Unknown segment descriptor.                  |
//! | 72    | Segment   | Path-hash-locator segment descriptor.        |
//! | 4     | &\[[u8]\] | Padding.                                     |
//! | 4     | [u32]     | Index type: 0 for `.index`, 2 for `.index2`. |
//! | 656   | &\[[u8]\] | Padding.                                     |
//! | 20    | &\[[u8]\] | SHA-1 of the header.                         |
//! | 44    | &\[[u8]\] | Padding.                                     |
//!
//! Each segment descriptor is `count: u32, offset: u32, size: u32, sha1: [u8; 20]` plus 40
//! bytes of padding.
//!
//! The `.index` segments hold 16-byte pair-hash locators (sorted by path hash, then name
//! hash), 16-byte path-hash locators (sorted by path hash, delimiting the pair-locator run of
//! each folder) and 256-byte text locators for synonym entries. The `.index2` segments hold
//! 8-byte full-path-hash locators and their own 256-byte text locators. Text locator lists
//! end with a sentinel row whose hashes and conflict index are all `0xFFFFFFFF`.

use getset::Getters;

use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::Path;

use crate::binary::ReadBytes;
use crate::error::{RLibError, Result};

/// Signature every SqPack file starts with.
const SIGNATURE: &[u8; 12] = b"SqPack\0\0\0\0\0\0";

/// On-disk size of the archive header.
pub const SQPACK_HEADER_SIZE: u32 = 1024;

/// On-disk size of the index header.
pub const INDEX_HEADER_SIZE: u32 = 1024;

/// On-disk size of a pair-hash locator.
pub const PAIR_HASH_LOCATOR_SIZE: u32 = 16;

/// On-disk size of a path-hash locator.
pub const PATH_HASH_LOCATOR_SIZE: u32 = 16;

/// On-disk size of a full-path-hash locator.
pub const FULL_HASH_LOCATOR_SIZE: u32 = 8;

/// On-disk size of a text locator.
pub const TEXT_LOCATOR_SIZE: u32 = 256;

/// Value marking the sentinel row that terminates a text locator list.
pub const TEXT_LOCATOR_SENTINEL: u32 = 0xFFFF_FFFF;

/// Length of the path field of a text locator.
const TEXT_LOCATOR_PATH_SIZE: usize = 0xF0;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// Kinds of SqPack files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqpackKind {
    Database,
    Data,
    Index,
}

/// The 1024-byte header every SqPack file starts with.
#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct SqpackHeader {

    /// Kind of the file.
    kind: SqpackKind,

    /// Build date of the file, as yyyymmdd.
    yyyymmdd: u32,

    /// Build time of the file.
    time: u32,

    /// SHA-1 of the header.
    sha1: [u8; 20],
}

/// Descriptor of one segment of an index file.
#[derive(Clone, Copy, Debug, Getters)]
#[getset(get = "pub")]
pub struct SegmentDescriptor {

    /// Semantics depend on the segment. For the text-locator segment of an `.index` file,
    /// it's the amount of `.datN` files of the SqPack.
    count: u32,

    /// Offset of the segment within the file.
    offset: u32,

    /// Size in bytes of the segment.
    size: u32,

    /// SHA-1 of the segment.
    sha1: [u8; 20],
}

/// The 1024-byte header with the four segment descriptors of an index file.
#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct IndexHeader {

    /// Descriptor of the hash-locator segment.
    hash_locator_segment: SegmentDescriptor,

    /// Descriptor of the text-locator segment.
    text_locator_segment: SegmentDescriptor,

    /// Descriptor of the third segment, of unknown purpose.
    unknown_segment_3: SegmentDescriptor,

    /// Descriptor of the path-hash-locator segment.
    path_hash_locator_segment: SegmentDescriptor,

    /// Discriminator of the index flavour: 0 for `.index`, 2 for `.index2`.
    index_type: u32,
}

/// A packed reference to an entry inside one of the `.datN` files of a SqPack.
///
/// Bit 0 is the synonym flag, bits 1-3 are the dat file index, and the rest is the entry
/// offset divided by 8. Entries are 128-byte aligned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataLocator(u32);

/// A `.index` locator keyed by the (path, name) hash pair.
#[derive(Clone, Copy, Debug, Getters)]
#[getset(get = "pub")]
pub struct PairHashLocator {

    /// Hash of the name portion of the path.
    name_hash: u32,

    /// Hash of the path portion of the path.
    path_hash: u32,

    /// Where the entry lives.
    locator: DataLocator,
}

/// A `.index` locator delimiting the run of pair-hash locators of one folder.
#[derive(Clone, Copy, Debug, Getters)]
#[getset(get = "pub")]
pub struct PathHashLocator {

    /// Hash of the folder path.
    path_hash: u32,

    /// Offset (within the file) of the first pair-hash locator of the folder.
    pair_hash_locator_offset: u32,

    /// Size in bytes of the pair-hash locator run of the folder.
    pair_hash_locator_size: u32,
}

/// A `.index2` locator keyed by the full-path hash.
#[derive(Clone, Copy, Debug, Getters)]
#[getset(get = "pub")]
pub struct FullHashLocator {

    /// Hash of the full path.
    full_path_hash: u32,

    /// Where the entry lives.
    locator: DataLocator,
}

/// A `.index` text locator: the literal path of a synonym entry.
#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct PairHashTextLocator {

    /// Hash of the name portion of the path.
    name_hash: u32,

    /// Hash of the path portion of the path.
    path_hash: u32,

    /// Where the entry lives.
    locator: DataLocator,

    /// Ordinal of this entry among the ones sharing its hash pair.
    conflict_index: u32,

    /// The literal path of the entry.
    full_path: String,
}

/// A `.index2` text locator: the literal path of a synonym entry.
#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct FullHashTextLocator {

    /// Hash of the full path.
    full_path_hash: u32,

    /// Unused hash slot.
    unused_hash: u32,

    /// Where the entry lives.
    locator: DataLocator,

    /// Ordinal of this entry among the ones sharing its hash.
    conflict_index: u32,

    /// The literal path of the entry.
    full_path: String,
}

/// This struct holds the decoded locator tables of an `.index`/`.index2` pair.
///
/// The segments are slurped and validated when the pair is opened, so the file handles are
/// released as soon as this struct is built.
#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct SqIndexReader {

    /// Archive header of the `.index` file.
    header_1: SqpackHeader,

    /// Archive header of the `.index2` file.
    header_2: SqpackHeader,

    /// Index header of the `.index` file.
    index_1: IndexHeader,

    /// Index header of the `.index2` file.
    index_2: IndexHeader,

    /// Pair-hash locators, sorted by (path hash, name hash).
    pair_hash_locators: Vec<PairHashLocator>,

    /// Path-hash locators, sorted by path hash.
    path_hash_locators: Vec<PathHashLocator>,

    /// Full-path-hash locators, sorted by full-path hash.
    full_hash_locators: Vec<FullHashLocator>,

    /// Text locators of the `.index` file, sentinel row included.
    pair_hash_text_locators: Vec<PairHashTextLocator>,

    /// Text locators of the `.index2` file, sentinel row included.
    full_hash_text_locators: Vec<FullHashTextLocator>,
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

impl SqpackKind {
    fn try_from_value(value: u32) -> Result<Self> {
        match value {
            0 => Ok(Self::Database),
            1 => Ok(Self::Data),
            2 => Ok(Self::Index),
            _ => Err(RLibError::DecodingUnknownSqpackKind(value)),
        }
    }
}

impl SqpackHeader {

    /// This function reads and validates a whole 1024-byte archive header.
    pub fn decode<R: ReadBytes>(data: &mut R, file_name: &str) -> Result<Self> {
        if data.read_slice(12, false)? != SIGNATURE {
            return Err(RLibError::DecodingSqpackInvalidSignature(file_name.to_owned()));
        }

        let header_size = data.read_u32()?;
        if header_size != SQPACK_HEADER_SIZE {
            return Err(RLibError::DecodingSqpackHeaderSizeMismatch(file_name.to_owned(), header_size, SQPACK_HEADER_SIZE));
        }

        let _unknown = data.read_u32()?;
        let kind = SqpackKind::try_from_value(data.read_u32()?)?;
        let yyyymmdd = data.read_u32()?;
        let time = data.read_u32()?;
        let _unknown = data.read_u32()?;
        let _padding = data.read_slice(0x3C0 - 36, false)?;

        let mut sha1 = [0; 20];
        sha1.copy_from_slice(&data.read_slice(20, false)?);
        let _padding = data.read_slice(0x2C, false)?;

        Ok(Self {
            kind,
            yyyymmdd,
            time,
            sha1,
        })
    }
}

impl SegmentDescriptor {

    /// This function reads one 72-byte segment descriptor.
    fn decode<R: ReadBytes>(data: &mut R) -> Result<Self> {
        let count = data.read_u32()?;
        let offset = data.read_u32()?;
        let size = data.read_u32()?;

        let mut sha1 = [0; 20];
        sha1.copy_from_slice(&data.read_slice(20, false)?);
        let _padding = data.read_slice(0x28, false)?;

        Ok(Self {
            count,
            offset,
            size,
            sha1,
        })
    }

    /// This function validates the segment size is a whole amount of records, and returns
    /// said amount.
    fn record_count(&self, segment_name: &str, record_size: u32) -> Result<usize> {
        if self.size % record_size != 0 {
            return Err(RLibError::DecodingSqpackSegmentSizeMismatch(segment_name.to_owned(), self.size, record_size));
        }

        Ok((self.size / record_size) as usize)
    }
}

impl IndexHeader {

    /// This function reads and validates a whole 1024-byte index header.
    pub fn decode<R: ReadBytes>(data: &mut R, file_name: &str) -> Result<Self> {
        let header_size = data.read_u32()?;
        if header_size != INDEX_HEADER_SIZE {
            return Err(RLibError::DecodingSqpackHeaderSizeMismatch(file_name.to_owned(), header_size, INDEX_HEADER_SIZE));
        }

        let hash_locator_segment = SegmentDescriptor::decode(data)?;
        let _padding = data.read_slice(4, false)?;
        let text_locator_segment = SegmentDescriptor::decode(data)?;
        let unknown_segment_3 = SegmentDescriptor::decode(data)?;
        let path_hash_locator_segment = SegmentDescriptor::decode(data)?;
        let _padding = data.read_slice(4, false)?;
        let index_type = data.read_u32()?;
        let _padding = data.read_slice(0x3C0 - 0x130, false)?;
        let _sha1 = data.read_slice(20, false)?;
        let _padding = data.read_slice(0x2C, false)?;

        Ok(Self {
            hash_locator_segment,
            text_locator_segment,
            unknown_segment_3,
            path_hash_locator_segment,
            index_type,
        })
    }
}

impl DataLocator {

    /// This function builds a locator from its parts, validating the constraints the packed
    /// encoding imposes.
    pub fn new(data_file_index: u32, offset: u64, synonym: bool) -> Result<Self> {
        if data_file_index >= 8 {
            return Err(RLibError::DataFileIndexOutOfRange(data_file_index));
        }

        if offset & 0x7F != 0 {
            return Err(RLibError::DataOffsetNotAligned(offset));
        }

        if (offset >> 3) >= 1 << 32 {
            return Err(RLibError::DataOffsetNotAligned(offset));
        }

        Ok(Self(((offset >> 3) as u32) | (data_file_index << 1) | u32::from(synonym)))
    }

    /// This function builds a locator from its packed on-disk value.
    pub fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// This function returns the packed on-disk value of the locator.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// This function returns if the entry's hash is ambiguous and needs the text table to be
    /// resolved.
    pub fn synonym(self) -> bool {
        self.0 & 0x1 != 0
    }

    /// This function returns which `.datN` file the entry lives in.
    pub fn data_file_index(self) -> u32 {
        (self.0 & 0xF) >> 1
    }

    /// This function returns the byte offset of the entry within its `.datN` file.
    pub fn offset(self) -> u64 {
        ((self.0 & 0xFFFF_FFF0) as u64) << 3
    }
}

impl SqIndexReader {

    /// This function opens and reads an `.index`/`.index2` pair from disk.
    pub fn open(index_1_path: &Path, index_2_path: &Path) -> Result<Self> {
        let mut file_1 = BufReader::new(File::open(index_1_path)?);
        let mut file_2 = BufReader::new(File::open(index_2_path)?);

        Self::read(
            &mut file_1,
            &mut file_2,
            &index_1_path.to_string_lossy(),
            &index_2_path.to_string_lossy(),
        )
    }

    /// This function reads an `.index`/`.index2` pair from any pair of sources.
    pub fn read<R1: ReadBytes, R2: ReadBytes>(data_1: &mut R1, data_2: &mut R2, name_1: &str, name_2: &str) -> Result<Self> {
        let header_1 = SqpackHeader::decode(data_1, name_1)?;
        let index_1 = IndexHeader::decode(data_1, name_1)?;

        let header_2 = SqpackHeader::decode(data_2, name_2)?;
        let index_2 = IndexHeader::decode(data_2, name_2)?;

        // Slurp the four segments we care about. Doing it up front means the underlying files
        // are no longer needed once this returns.
        let segment = index_1.hash_locator_segment;
        let record_count = segment.record_count("hash locator", PAIR_HASH_LOCATOR_SIZE)?;
        let mut pair_hash_locators = Vec::with_capacity(record_count);
        data_1.seek(SeekFrom::Start(segment.offset as u64))?;
        for _ in 0..record_count {
            let name_hash = data_1.read_u32()?;
            let path_hash = data_1.read_u32()?;
            let locator = DataLocator::from_raw(data_1.read_u32()?);
            let _padding = data_1.read_u32()?;
            pair_hash_locators.push(PairHashLocator { name_hash, path_hash, locator });
        }

        let segment = index_1.path_hash_locator_segment;
        let record_count = segment.record_count("path-hash locator", PATH_HASH_LOCATOR_SIZE)?;
        let mut path_hash_locators = Vec::with_capacity(record_count);
        data_1.seek(SeekFrom::Start(segment.offset as u64))?;
        for _ in 0..record_count {
            let path_hash = data_1.read_u32()?;
            let pair_hash_locator_offset = data_1.read_u32()?;
            let pair_hash_locator_size = data_1.read_u32()?;
            let _padding = data_1.read_u32()?;
            path_hash_locators.push(PathHashLocator { path_hash, pair_hash_locator_offset, pair_hash_locator_size });
        }

        let segment = index_1.text_locator_segment;
        let record_count = segment.record_count("text locator", TEXT_LOCATOR_SIZE)?;
        let mut pair_hash_text_locators = Vec::with_capacity(record_count);
        data_1.seek(SeekFrom::Start(segment.offset as u64))?;
        for _ in 0..record_count {
            let name_hash = data_1.read_u32()?;
            let path_hash = data_1.read_u32()?;
            let locator = DataLocator::from_raw(data_1.read_u32()?);
            let conflict_index = data_1.read_u32()?;

            // The sentinel row's path field is not guaranteed to be text.
            let full_path = if name_hash == TEXT_LOCATOR_SENTINEL || path_hash == TEXT_LOCATOR_SENTINEL || conflict_index == TEXT_LOCATOR_SENTINEL {
                let _padding = data_1.read_slice(TEXT_LOCATOR_PATH_SIZE, false)?;
                String::new()
            } else {
                data_1.read_string_u8_0padded(TEXT_LOCATOR_PATH_SIZE)?
            };
            pair_hash_text_locators.push(PairHashTextLocator { name_hash, path_hash, locator, conflict_index, full_path });
        }

        let segment = index_2.hash_locator_segment;
        let record_count = segment.record_count("full-hash locator", FULL_HASH_LOCATOR_SIZE)?;
        let mut full_hash_locators = Vec::with_capacity(record_count);
        data_2.seek(SeekFrom::Start(segment.offset as u64))?;
        for _ in 0..record_count {
            let full_path_hash = data_2.read_u32()?;
            let locator = DataLocator::from_raw(data_2.read_u32()?);
            full_hash_locators.push(FullHashLocator { full_path_hash, locator });
        }

        let segment = index_2.text_locator_segment;
        let record_count = segment.record_count("text locator", TEXT_LOCATOR_SIZE)?;
        let mut full_hash_text_locators = Vec::with_capacity(record_count);
        data_2.seek(SeekFrom::Start(segment.offset as u64))?;
        for _ in 0..record_count {
            let full_path_hash = data_2.read_u32()?;
            let unused_hash = data_2.read_u32()?;
            let locator = DataLocator::from_raw(data_2.read_u32()?);
            let conflict_index = data_2.read_u32()?;

            // The sentinel row's path field is not guaranteed to be text.
            let full_path = if full_path_hash == TEXT_LOCATOR_SENTINEL || unused_hash == TEXT_LOCATOR_SENTINEL || conflict_index == TEXT_LOCATOR_SENTINEL {
                let _padding = data_2.read_slice(TEXT_LOCATOR_PATH_SIZE, false)?;
                String::new()
            } else {
                data_2.read_string_u8_0padded(TEXT_LOCATOR_PATH_SIZE)?
            };
            full_hash_text_locators.push(FullHashTextLocator { full_path_hash, unused_hash, locator, conflict_index, full_path });
        }

        Ok(Self {
            header_1,
            header_2,
            index_1,
            index_2,
            pair_hash_locators,
            path_hash_locators,
            full_hash_locators,
            pair_hash_text_locators,
            full_hash_text_locators,
        })
    }

    /// This function returns the pair-hash locators of the folder with the provided path
    /// hash: the candidates a name hash has to be bisected against.
    pub fn name_hash_locators(&self, path_hash: u32) -> Result<&[PairHashLocator]> {
        let folders = &self.path_hash_locators;
        let index = folders.partition_point(|folder| folder.path_hash < path_hash);
        let folder = folders.get(index)
            .filter(|folder| folder.path_hash == path_hash)
            .ok_or_else(|| RLibError::PathNotFound(format!("~{path_hash:08x}")))?;

        // The folder's run must lie entirely within the hash-locator segment.
        let segment = &self.index_1.hash_locator_segment;
        if folder.pair_hash_locator_offset < segment.offset
            || folder.pair_hash_locator_offset >= segment.offset + segment.size {
            return Err(RLibError::DecodingSqpackLocatorOutOfBounds(path_hash));
        }

        let start = ((folder.pair_hash_locator_offset - segment.offset) / PAIR_HASH_LOCATOR_SIZE) as usize;
        let end = (start + (folder.pair_hash_locator_size / PAIR_HASH_LOCATOR_SIZE) as usize).min(self.pair_hash_locators.len());
        Ok(&self.pair_hash_locators[start..end])
    }
}

impl PairHashTextLocator {

    /// This function returns if this row is the sentinel that terminates the list.
    pub fn is_sentinel(&self) -> bool {
        self.name_hash == TEXT_LOCATOR_SENTINEL
            || self.path_hash == TEXT_LOCATOR_SENTINEL
            || self.conflict_index == TEXT_LOCATOR_SENTINEL
    }
}

impl FullHashTextLocator {

    /// This function returns if this row is the sentinel that terminates the list.
    pub fn is_sentinel(&self) -> bool {
        self.full_path_hash == TEXT_LOCATOR_SENTINEL
            || self.unused_hash == TEXT_LOCATOR_SENTINEL
            || self.conflict_index == TEXT_LOCATOR_SENTINEL
    }
}
