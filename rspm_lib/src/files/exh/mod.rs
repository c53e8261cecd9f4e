//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Exh files are the headers of the Excel database: one per sheet, describing its columns,
//! its pages and the languages it's localised to.
//!
//! Unlike the SqPack container around them, Excel files are BigEndian.
//!
//! # Exh Structure
//!
//! ## Header
//!
//! | Bytes | Type      | Data                                              |
//! | ----- | --------- | ------------------------------------------------- |
//! | 4     | &\[[u8]\] | Signature. Always "EXHF".                         |
//! | 2     | [u16]     | Version.                                          |
//! | 2     | [u16]     | Size in bytes of the fixed data block of a row.   |
//! | 2     | [u16]     | Amount of columns.                                |
//! | 2     | [u16]     | Amount of pages.                                  |
//! | 2     | [u16]     | Amount of languages.                              |
//! | 2     | [u16]     | Unknown.                                          |
//! | 1     | [u8]      | Unknown.                                          |
//! | 1     | [u8]      | Depth: 1 for flat sheets, 2 for sub-rowed sheets. |
//! | 2     | &\[[u8]\] | Padding.                                          |
//! | 4     | [u32]     | Amount of rows, not counting skipped ids.         |
//! | 8     | &\[[u8]\] | Padding.                                          |
//!
//! ## Data
//!
//! | Bytes | Type  | Data                                                |
//! | ----- | ----- | --------------------------------------------------- |
//! | 4 * c | Column descriptors: `type: u16, offset: u16`.       |
//! | 8 * p | Page descriptors: `start_id: u32, row_count: u32`.  |
//! | 2 * l | Language codes. These ones are LittleEndian.        |

use getset::Getters;

use crate::binary::{ReadBytes, WriteBytes};
use crate::error::{RLibError, Result};
use crate::files::{DecodeableExtraData, Decodeable, EncodeableExtraData, Encodeable};

/// Signature every Exh file starts with.
const SIGNATURE: &[u8; 4] = b"EXHF";

/// Extension used by Exh files.
pub const EXTENSION: &str = ".exh";

#[cfg(test)] mod exh_test;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This holds an entire Exh file decoded in memory.
#[derive(PartialEq, Clone, Debug, Default, Getters)]
#[getset(get = "pub")]
pub struct Exh {

    /// Version of the file.
    version: u16,

    /// Size in bytes of the fixed data block of each row.
    fixed_data_size: u16,

    /// The columns of the sheet, in file order.
    columns: Vec<ExhColumn>,

    /// The pages of the sheet, sorted by their starting row id.
    pages: Vec<ExhPage>,

    /// The languages this sheet is localised to.
    languages: Vec<Language>,

    /// Whether the sheet has one body per row id, or many sub-rows per row id.
    depth: Depth,

    /// Amount of rows of the sheet, not counting skipped ids.
    row_count_without_skip: u32,
}

/// This represents a column of a sheet: its data type, and its offset within the fixed data
/// block of a row.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Getters)]
#[getset(get = "pub")]
pub struct ExhColumn {

    /// Data type of the column.
    column_type: ColumnType,

    /// Offset of the column within the fixed data of a row, in bytes.
    offset: u16,
}

/// This represents a page of a sheet: a contiguous range of row ids stored in one `.exd` file.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Getters)]
#[getset(get = "pub")]
pub struct ExhPage {

    /// First row id of the page.
    start_id: u32,

    /// Amount of row ids the page spans, including skipped ones.
    row_count_with_skip: u32,
}

/// Data types a column can have.
///
/// The eight packed booleans share a single byte: `PackedBool0` is bit 0 of the byte at the
/// column's offset, `PackedBool1` is bit 1, and so on.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ColumnType {
    String,
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Int64,
    UInt64,
    PackedBool0,
    PackedBool1,
    PackedBool2,
    PackedBool3,
    PackedBool4,
    PackedBool5,
    PackedBool6,
    PackedBool7,
}

/// Whether a sheet has one body per row id (flat), or many sub-rows per row id.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum Depth {
    #[default] Flat,
    SubRows,
}

/// Languages the games localise their sheets to.
///
/// A sheet declaring only `Undefined` is language-neutral: its pages have no language suffix.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Language {
    Undefined,
    Japanese,
    English,
    German,
    French,
    ChineseSimplified,
    ChineseTraditional,
    Korean,
}

//---------------------------------------------------------------------------//
//                           Implementation of Exh
//---------------------------------------------------------------------------//

impl Decodeable for Exh {

    fn decode<R: ReadBytes>(data: &mut R, _extra_data: &Option<DecodeableExtraData>) -> Result<Self> {
        if data.read_slice(4, false)? != SIGNATURE {
            return Err(RLibError::DecodingExcelNotAnExh);
        }

        let version = data.read_u16_be()?;
        let fixed_data_size = data.read_u16_be()?;
        let column_count = data.read_u16_be()?;
        let page_count = data.read_u16_be()?;
        let language_count = data.read_u16_be()?;
        let _unknown = data.read_u16_be()?;
        let _unknown_2 = data.read_u8()?;
        let depth = Depth::try_from(data.read_u8()?)?;
        let _padding = data.read_slice(2, false)?;
        let row_count_without_skip = data.read_u32_be()?;
        let _padding = data.read_slice(8, false)?;

        let mut columns = Vec::with_capacity(column_count as usize);
        for _ in 0..column_count {
            let column_type = ColumnType::try_from(data.read_u16_be()?)?;
            let offset = data.read_u16_be()?;
            columns.push(ExhColumn { column_type, offset });
        }

        let mut pages = Vec::with_capacity(page_count as usize);
        for _ in 0..page_count {
            let start_id = data.read_u32_be()?;
            let row_count_with_skip = data.read_u32_be()?;
            pages.push(ExhPage { start_id, row_count_with_skip });
        }

        // The page lookup bisects over the start ids, so they have to be strictly increasing.
        if pages.windows(2).any(|window| window[0].start_id >= window[1].start_id) {
            return Err(RLibError::DecodingExcelPagesOutOfOrder);
        }

        // The language codes are the only LittleEndian field of the Excel formats.
        let mut languages = Vec::with_capacity(language_count as usize);
        for _ in 0..language_count {
            languages.push(Language::try_from(data.read_u16()?)?);
        }

        Ok(Self {
            version,
            fixed_data_size,
            columns,
            pages,
            languages,
            depth,
            row_count_without_skip,
        })
    }
}

impl Encodeable for Exh {

    fn encode<W: WriteBytes>(&mut self, buffer: &mut W, _extra_data: &Option<EncodeableExtraData>) -> Result<()> {
        buffer.write_all(SIGNATURE)?;
        buffer.write_u16_be(self.version)?;
        buffer.write_u16_be(self.fixed_data_size)?;
        buffer.write_u16_be(self.columns.len() as u16)?;
        buffer.write_u16_be(self.pages.len() as u16)?;
        buffer.write_u16_be(self.languages.len() as u16)?;
        buffer.write_u16_be(0)?;
        buffer.write_u8(0)?;
        buffer.write_u8(self.depth.value())?;
        buffer.write_all(&[0; 2])?;
        buffer.write_u32_be(self.row_count_without_skip)?;
        buffer.write_all(&[0; 8])?;

        for column in &self.columns {
            buffer.write_u16_be(column.column_type.value())?;
            buffer.write_u16_be(column.offset)?;
        }

        for page in &self.pages {
            buffer.write_u32_be(page.start_id)?;
            buffer.write_u32_be(page.row_count_with_skip)?;
        }

        for language in &self.languages {
            buffer.write_u16(language.code())?;
        }

        Ok(())
    }
}

impl Exh {

    /// This function creates a new Exh from its parts. Mainly for tests and tooling.
    pub fn new(fixed_data_size: u16, columns: Vec<ExhColumn>, pages: Vec<ExhPage>, languages: Vec<Language>, depth: Depth, row_count_without_skip: u32) -> Self {
        Self {
            version: 2,
            fixed_data_size,
            columns,
            pages,
            languages,
            depth,
            row_count_without_skip,
        }
    }
}

impl ExhColumn {

    /// This function creates a new column descriptor.
    pub fn new(column_type: ColumnType, offset: u16) -> Self {
        Self { column_type, offset }
    }
}

impl ExhPage {

    /// This function creates a new page descriptor.
    pub fn new(start_id: u32, row_count_with_skip: u32) -> Self {
        Self { start_id, row_count_with_skip }
    }
}

impl ColumnType {

    /// This function returns the on-disk value of this column type.
    pub fn value(self) -> u16 {
        match self {
            Self::String => 0x0,
            Self::Bool => 0x1,
            Self::Int8 => 0x2,
            Self::UInt8 => 0x3,
            Self::Int16 => 0x4,
            Self::UInt16 => 0x5,
            Self::Int32 => 0x6,
            Self::UInt32 => 0x7,
            Self::Float32 => 0x9,
            Self::Int64 => 0xA,
            Self::UInt64 => 0xB,
            Self::PackedBool0 => 0x19,
            Self::PackedBool1 => 0x1A,
            Self::PackedBool2 => 0x1B,
            Self::PackedBool3 => 0x1C,
            Self::PackedBool4 => 0x1D,
            Self::PackedBool5 => 0x1E,
            Self::PackedBool6 => 0x1F,
            Self::PackedBool7 => 0x20,
        }
    }

    /// This function returns the bit this column reads within its byte, if it's a packed boolean.
    pub fn packed_bool_bit(self) -> Option<u8> {
        match self {
            Self::PackedBool0 => Some(0),
            Self::PackedBool1 => Some(1),
            Self::PackedBool2 => Some(2),
            Self::PackedBool3 => Some(3),
            Self::PackedBool4 => Some(4),
            Self::PackedBool5 => Some(5),
            Self::PackedBool6 => Some(6),
            Self::PackedBool7 => Some(7),
            _ => None,
        }
    }
}

impl TryFrom<u16> for ColumnType {
    type Error = RLibError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0x0 => Ok(Self::String),
            0x1 => Ok(Self::Bool),
            0x2 => Ok(Self::Int8),
            0x3 => Ok(Self::UInt8),
            0x4 => Ok(Self::Int16),
            0x5 => Ok(Self::UInt16),
            0x6 => Ok(Self::Int32),
            0x7 => Ok(Self::UInt32),
            0x9 => Ok(Self::Float32),
            0xA => Ok(Self::Int64),
            0xB => Ok(Self::UInt64),
            0x19 => Ok(Self::PackedBool0),
            0x1A => Ok(Self::PackedBool1),
            0x1B => Ok(Self::PackedBool2),
            0x1C => Ok(Self::PackedBool3),
            0x1D => Ok(Self::PackedBool4),
            0x1E => Ok(Self::PackedBool5),
            0x1F => Ok(Self::PackedBool6),
            0x20 => Ok(Self::PackedBool7),
            _ => Err(RLibError::DecodingUnknownColumnType(value)),
        }
    }
}

impl Depth {

    /// This function returns the on-disk value of this depth.
    pub fn value(self) -> u8 {
        match self {
            Self::Flat => 1,
            Self::SubRows => 2,
        }
    }
}

impl TryFrom<u8> for Depth {
    type Error = RLibError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Flat),
            2 => Ok(Self::SubRows),
            _ => Err(RLibError::DecodingUnknownExcelDepth(value)),
        }
    }
}

impl Language {

    /// This function returns the on-disk code of this language.
    pub fn code(self) -> u16 {
        match self {
            Self::Undefined => 0,
            Self::Japanese => 1,
            Self::English => 2,
            Self::German => 3,
            Self::French => 4,
            Self::ChineseSimplified => 5,
            Self::ChineseTraditional => 6,
            Self::Korean => 7,
        }
    }

    /// This function returns the suffix the pages of this language carry in their file names.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Undefined => "",
            Self::Japanese => "_ja",
            Self::English => "_en",
            Self::German => "_de",
            Self::French => "_fr",
            Self::ChineseSimplified => "_chs",
            Self::ChineseTraditional => "_cht",
            Self::Korean => "_ko",
        }
    }
}

impl TryFrom<u16> for Language {
    type Error = RLibError;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            0 => Ok(Self::Undefined),
            1 => Ok(Self::Japanese),
            2 => Ok(Self::English),
            3 => Ok(Self::German),
            4 => Ok(Self::French),
            5 => Ok(Self::ChineseSimplified),
            6 => Ok(Self::ChineseTraditional),
            7 => Ok(Self::Korean),
            _ => Err(RLibError::DecodingUnknownLanguage(value)),
        }
    }
}
