//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Exd files are the pages of the Excel database: the actual row data of a sheet, one file
//! per (page, language) pair.
//!
//! To decode one you need the [`Exh`] of its sheet, which describes the columns and the row
//! layout. Like the `.exh` files, everything here is BigEndian.
//!
//! # Exd Structure
//!
//! ## Header
//!
//! | Bytes | Type      | Data                                         |
//! | ----- | --------- | -------------------------------------------- |
//! | 4     | &\[[u8]\] | Signature. Always "EXDF".                    |
//! | 2     | [u16]     | Version.                                     |
//! | 2     | &\[[u8]\] | Padding.                                     |
//! | 4     | [u32]     | Size in bytes of the row locator list.       |
//! | 4     | [u32]     | Size in bytes of the row data that follows.  |
//! | 16    | &\[[u8]\] | Padding.                                     |
//!
//! ## Row locators
//!
//! `index_size / 8` entries of `row_id: u32, offset: u32`, sorted by row id. The offsets are
//! absolute within the file.
//!
//! ## Row bodies
//!
//! Each row body starts with a 6-byte packed header `data_size: u32, sub_row_count: u16`.
//!
//! In a flat sheet the body is `fixed_data_size` bytes of fixed data followed by the variable
//! data, and `sub_row_count` is meaningless. In a sub-rowed sheet the body holds
//! `sub_row_count` sub-rows of `2 + fixed_data_size` bytes each (the leading [u16] being the
//! sub-row id), and all of them share the variable data that follows the last one.
//!
//! String cells store a [u32] offset into the variable data; the string runs from there to
//! the next NUL byte.

use getset::Getters;

use std::io::{Cursor, Write};

use crate::binary::{ReadBytes, WriteBytes};
use crate::error::{RLibError, Result};
use crate::files::{DecodeableExtraData, Decodeable, EncodeableExtraData, Encodeable};
use crate::files::exh::{ColumnType, Depth, Exh, ExhColumn};
use crate::files::sestring::SeString;
use crate::utils::check_size_mismatch;

/// Signature every Exd file starts with.
const SIGNATURE: &[u8; 4] = b"EXDF";

/// Extension used by Exd files.
pub const EXTENSION: &str = ".exd";

/// Size in bytes of the file header.
const HEADER_SIZE: usize = 32;

/// Size in bytes of a row locator.
const ROW_LOCATOR_SIZE: usize = 8;

/// Size in bytes of the packed header preceding each row body.
const ROW_HEADER_SIZE: usize = 6;

#[cfg(test)] mod exd_test;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This holds an entire Exd page decoded in memory.
#[derive(PartialEq, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct Exd {

    /// Version of the file.
    version: u16,

    /// The rows of the page, sorted by row id.
    rows: Vec<(u32, RowData)>,
}

/// The decoded data of a single row id.
#[derive(PartialEq, Clone, Debug)]
pub enum RowData {

    /// One cell list per row id. Used by flat sheets.
    Flat(Vec<CellValue>),

    /// Many sub-rows per row id. Used by sub-rowed sheets.
    SubRows(Vec<SubRow>),
}

/// A single sub-row of a sub-rowed sheet.
#[derive(PartialEq, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct SubRow {

    /// Id of the sub-row within its row.
    id: u16,

    /// The cells of the sub-row, in column order.
    cells: Vec<CellValue>,
}

/// A single decoded cell.
#[derive(PartialEq, Clone, Debug)]
pub enum CellValue {
    String(SeString),
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
    I64(i64),
    U64(u64),
}

//---------------------------------------------------------------------------//
//                            Cell transform
//---------------------------------------------------------------------------//

/// This function decodes a single typed cell from the fixed and variable data of a row.
///
/// All reads are bounds-checked: a column pointing outside the fixed data, or a string with no
/// terminator in the variable data, is an error, not a panic.
pub fn transform_column(column: &ExhColumn, fixed_data: &[u8], variable_data: &[u8]) -> Result<CellValue> {
    let offset = *column.offset() as usize;
    let column_type = *column.column_type();

    if let Some(bit) = column_type.packed_bool_bit() {
        let byte = fixed_data.get(offset).ok_or(RLibError::DecodingColumnOutOfBounds(*column.offset()))?;
        return Ok(CellValue::Bool(byte & (1 << bit) != 0));
    }

    let size = match column_type {
        ColumnType::Bool | ColumnType::Int8 | ColumnType::UInt8 => 1,
        ColumnType::Int16 | ColumnType::UInt16 => 2,
        ColumnType::String | ColumnType::Int32 | ColumnType::UInt32 | ColumnType::Float32 => 4,
        ColumnType::Int64 | ColumnType::UInt64 => 8,
        _ => unreachable!("packed bools are handled above"),
    };

    let bytes = fixed_data.get(offset..offset + size).ok_or(RLibError::DecodingColumnOutOfBounds(*column.offset()))?;
    let mut cursor = Cursor::new(bytes);

    match column_type {
        ColumnType::String => {
            let string_offset = cursor.read_u32_be()? as usize;
            let tail = variable_data.get(string_offset..).ok_or(RLibError::DecodingStringMissingTerminator(string_offset))?;
            let end = memchr::memchr(0, tail).ok_or(RLibError::DecodingStringMissingTerminator(string_offset))?;
            Ok(CellValue::String(SeString::from_bytes(tail[..end].to_vec())))
        },
        ColumnType::Bool => Ok(CellValue::Bool(cursor.read_bool()?)),
        ColumnType::Int8 => Ok(CellValue::I8(cursor.read_i8()?)),
        ColumnType::UInt8 => Ok(CellValue::U8(cursor.read_u8()?)),
        ColumnType::Int16 => Ok(CellValue::I16(cursor.read_i16_be()?)),
        ColumnType::UInt16 => Ok(CellValue::U16(cursor.read_u16_be()?)),
        ColumnType::Int32 => Ok(CellValue::I32(cursor.read_i32_be()?)),
        ColumnType::UInt32 => Ok(CellValue::U32(cursor.read_u32_be()?)),
        ColumnType::Float32 => Ok(CellValue::F32(cursor.read_f32_be()?)),
        ColumnType::Int64 => Ok(CellValue::I64(cursor.read_i64_be()?)),
        ColumnType::UInt64 => Ok(CellValue::U64(cursor.read_u64_be()?)),
        _ => unreachable!("packed bools are handled above"),
    }
}

//---------------------------------------------------------------------------//
//                           Implementation of Exd
//---------------------------------------------------------------------------//

impl Decodeable for Exd {

    fn decode<R: ReadBytes>(data: &mut R, extra_data: &Option<DecodeableExtraData>) -> Result<Self> {
        let extra_data = extra_data.as_ref().ok_or(RLibError::DecodingMissingExtraData)?;
        let exh = extra_data.exh.ok_or_else(|| RLibError::DecodingMissingExtraDataField("exh".to_owned()))?;

        // The row offsets are absolute within the file, so work over the full buffer.
        let len = data.len()? as usize;
        let full = data.read_slice(len, false)?;
        if full.len() < HEADER_SIZE || &full[0..4] != SIGNATURE {
            return Err(RLibError::DecodingExcelNotAnExd);
        }

        let mut cursor = Cursor::new(&full);
        cursor.set_position(4);
        let version = cursor.read_u16_be()?;
        let _padding = cursor.read_u16_be()?;
        let index_size = cursor.read_u32_be()? as usize;
        let _data_size = cursor.read_u32_be()?;
        let _padding = cursor.read_slice(16, false)?;

        if index_size % ROW_LOCATOR_SIZE != 0 || HEADER_SIZE + index_size > full.len() {
            return Err(RLibError::DecodingExcelNotAnExd);
        }

        let mut locators = Vec::with_capacity(index_size / ROW_LOCATOR_SIZE);
        for _ in 0..index_size / ROW_LOCATOR_SIZE {
            let row_id = cursor.read_u32_be()?;
            let offset = cursor.read_u32_be()?;
            locators.push((row_id, offset));
        }

        // The row lookup bisects over the ids, so they have to be strictly increasing.
        if locators.windows(2).any(|window| window[0].0 >= window[1].0) {
            return Err(RLibError::DecodingExcelRowsOutOfOrder);
        }

        let fixed_data_size = *exh.fixed_data_size() as usize;
        let mut rows = Vec::with_capacity(locators.len());
        for (row_id, offset) in locators {
            let row = Self::read_row(&full, offset as usize, fixed_data_size, exh)?;
            rows.push((row_id, row));
        }

        Ok(Self {
            version,
            rows,
        })
    }
}

impl Encodeable for Exd {

    fn encode<W: WriteBytes>(&mut self, buffer: &mut W, extra_data: &Option<EncodeableExtraData>) -> Result<()> {
        let extra_data = extra_data.as_ref().ok_or(RLibError::DecodingMissingExtraData)?;
        let exh = extra_data.exh.ok_or_else(|| RLibError::DecodingMissingExtraDataField("exh".to_owned()))?;

        let index_size = self.rows.len() * ROW_LOCATOR_SIZE;
        let mut bodies: Vec<u8> = vec![];
        let mut locators: Vec<(u32, u32)> = Vec::with_capacity(self.rows.len());

        for (row_id, row) in &self.rows {
            let offset = HEADER_SIZE + index_size + bodies.len();
            locators.push((*row_id, offset as u32));
            Self::write_row(&mut bodies, row, exh)?;
        }

        buffer.write_all(SIGNATURE)?;
        buffer.write_u16_be(self.version)?;
        buffer.write_u16_be(0)?;
        buffer.write_u32_be(index_size as u32)?;
        buffer.write_u32_be(bodies.len() as u32)?;
        buffer.write_all(&[0; 16])?;

        for (row_id, offset) in locators {
            buffer.write_u32_be(row_id)?;
            buffer.write_u32_be(offset)?;
        }

        buffer.write_all(&bodies)?;
        Ok(())
    }
}

impl SubRow {

    /// This function creates a new sub-row from its id and its cells.
    pub fn new(id: u16, cells: Vec<CellValue>) -> Self {
        Self { id, cells }
    }
}

impl Exd {

    /// This function creates a new Exd page from its rows. Mainly for tests and tooling.
    pub fn new(rows: Vec<(u32, RowData)>) -> Self {
        Self {
            version: 2,
            rows,
        }
    }

    /// This function returns the ids of the rows of this page, in order.
    pub fn row_ids(&self) -> Vec<u32> {
        self.rows.iter().map(|(row_id, _)| *row_id).collect()
    }

    /// This function returns the data of the provided row id, or an error if the page doesn't
    /// contain it (skipped ids included).
    pub fn row(&self, row_id: u32) -> Result<&RowData> {
        self.rows.binary_search_by_key(&row_id, |(row_id, _)| *row_id)
            .map(|index| &self.rows[index].1)
            .map_err(|_| RLibError::RowNotFound(row_id))
    }

    /// This function reads one row body from the file buffer.
    fn read_row(full: &[u8], offset: usize, fixed_data_size: usize, exh: &Exh) -> Result<RowData> {
        let header = full.get(offset..offset + ROW_HEADER_SIZE).ok_or(RLibError::DecodingExcelNotAnExd)?;
        let mut cursor = Cursor::new(header);
        let data_size = cursor.read_u32_be()? as usize;
        let sub_row_count = cursor.read_u16_be()? as usize;

        let body = full.get(offset + ROW_HEADER_SIZE..offset + ROW_HEADER_SIZE + data_size).ok_or(RLibError::DecodingExcelNotAnExd)?;

        match exh.depth() {
            Depth::Flat => {
                let fixed_data = body.get(..fixed_data_size).ok_or(RLibError::DecodingExcelNotAnExd)?;
                let variable_data = &body[fixed_data_size..];

                let cells = exh.columns().iter()
                    .map(|column| transform_column(column, fixed_data, variable_data))
                    .collect::<Result<Vec<_>>>()?;
                Ok(RowData::Flat(cells))
            },

            Depth::SubRows => {
                let sub_rows_size = sub_row_count * (2 + fixed_data_size);
                let variable_data = body.get(sub_rows_size..).ok_or(RLibError::DecodingExcelNotAnExd)?;

                let mut sub_rows = Vec::with_capacity(sub_row_count);
                for index in 0..sub_row_count {
                    let sub_row_offset = index * (2 + fixed_data_size);
                    let id = Cursor::new(&body[sub_row_offset..sub_row_offset + 2]).read_u16_be()?;
                    let fixed_data = &body[sub_row_offset + 2..sub_row_offset + 2 + fixed_data_size];

                    let cells = exh.columns().iter()
                        .map(|column| transform_column(column, fixed_data, variable_data))
                        .collect::<Result<Vec<_>>>()?;
                    sub_rows.push(SubRow { id, cells });
                }

                Ok(RowData::SubRows(sub_rows))
            },
        }
    }

    /// This function writes one row body, header included, into the provided buffer.
    fn write_row(buffer: &mut Vec<u8>, row: &RowData, exh: &Exh) -> Result<()> {
        let fixed_data_size = *exh.fixed_data_size() as usize;

        match row {
            RowData::Flat(cells) => {
                let mut fixed_data = vec![0; fixed_data_size];
                let mut variable_data = vec![];
                Self::write_cells(&mut fixed_data, &mut variable_data, cells, exh)?;

                buffer.write_u32_be((fixed_data.len() + variable_data.len()) as u32)?;
                buffer.write_u16_be(1)?;
                buffer.write_all(&fixed_data)?;
                buffer.write_all(&variable_data)?;
            },

            RowData::SubRows(sub_rows) => {
                let mut sub_row_data = vec![];
                let mut variable_data = vec![];
                for sub_row in sub_rows {
                    let mut fixed_data = vec![0; fixed_data_size];
                    Self::write_cells(&mut fixed_data, &mut variable_data, sub_row.cells(), exh)?;
                    sub_row_data.write_u16_be(*sub_row.id())?;
                    sub_row_data.write_all(&fixed_data)?;
                }

                buffer.write_u32_be((sub_row_data.len() + variable_data.len()) as u32)?;
                buffer.write_u16_be(sub_rows.len() as u16)?;
                buffer.write_all(&sub_row_data)?;
                buffer.write_all(&variable_data)?;
            },
        }

        Ok(())
    }

    /// This function writes a cell list into a fixed data block, spilling strings into the
    /// shared variable data block.
    fn write_cells(fixed_data: &mut [u8], variable_data: &mut Vec<u8>, cells: &[CellValue], exh: &Exh) -> Result<()> {
        check_size_mismatch(cells.len(), exh.columns().len())?;

        for (index, (column, cell)) in exh.columns().iter().zip(cells.iter()).enumerate() {
            let offset = *column.offset() as usize;

            // Packed bools accumulate bits over whatever shares their byte.
            if let Some(bit) = column.column_type().packed_bool_bit() {
                match cell {
                    CellValue::Bool(value) => {
                        let byte = fixed_data.get_mut(offset).ok_or(RLibError::DecodingColumnOutOfBounds(*column.offset()))?;
                        if *value {
                            *byte |= 1 << bit;
                        }
                    },
                    _ => return Err(RLibError::EncodingCellTypeMismatch(index)),
                }
                continue;
            }

            let mut encoded = vec![];
            match (column.column_type(), cell) {
                (ColumnType::String, CellValue::String(value)) => {
                    encoded.write_u32_be(variable_data.len() as u32)?;
                    variable_data.write_all(value.as_bytes()?)?;
                    variable_data.write_u8(0)?;
                },
                (ColumnType::Bool, CellValue::Bool(value)) => encoded.write_bool(*value)?,
                (ColumnType::Int8, CellValue::I8(value)) => encoded.write_i8(*value)?,
                (ColumnType::UInt8, CellValue::U8(value)) => encoded.write_u8(*value)?,
                (ColumnType::Int16, CellValue::I16(value)) => encoded.write_i16_be(*value)?,
                (ColumnType::UInt16, CellValue::U16(value)) => encoded.write_u16_be(*value)?,
                (ColumnType::Int32, CellValue::I32(value)) => encoded.write_i32_be(*value)?,
                (ColumnType::UInt32, CellValue::U32(value)) => encoded.write_u32_be(*value)?,
                (ColumnType::Float32, CellValue::F32(value)) => encoded.write_f32_be(*value)?,
                (ColumnType::Int64, CellValue::I64(value)) => encoded.write_i64_be(*value)?,
                (ColumnType::UInt64, CellValue::U64(value)) => encoded.write_u64_be(*value)?,
                _ => return Err(RLibError::EncodingCellTypeMismatch(index)),
            }

            let slot = fixed_data.get_mut(offset..offset + encoded.len()).ok_or(RLibError::DecodingColumnOutOfBounds(*column.offset()))?;
            slot.copy_from_slice(&encoded);
        }

        Ok(())
    }
}
