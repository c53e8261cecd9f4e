//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Module containing tests for decoding/encoding `Exd` files.

use std::io::Cursor;

use crate::error::RLibError;
use crate::files::*;
use crate::files::exh::*;
use crate::files::sestring::SeString;

use super::*;

//---------------------------------------------------------------------------//
//                                  Tests
//---------------------------------------------------------------------------//

/// Header of a flat sheet exercising every column type.
fn flat_exh() -> Exh {
    Exh::new(
        34,
        vec![
            ExhColumn::new(ColumnType::String, 0),
            ExhColumn::new(ColumnType::Bool, 4),
            ExhColumn::new(ColumnType::Int8, 5),
            ExhColumn::new(ColumnType::UInt8, 6),
            ExhColumn::new(ColumnType::Int16, 8),
            ExhColumn::new(ColumnType::UInt16, 10),
            ExhColumn::new(ColumnType::Int32, 12),
            ExhColumn::new(ColumnType::UInt32, 16),
            ExhColumn::new(ColumnType::Float32, 20),
            ExhColumn::new(ColumnType::Int64, 24),
            ExhColumn::new(ColumnType::PackedBool0, 32),
            ExhColumn::new(ColumnType::PackedBool1, 32),
            ExhColumn::new(ColumnType::PackedBool7, 32),
        ],
        vec![ExhPage::new(0, 10)],
        vec![Language::Undefined],
        Depth::Flat,
        2,
    )
}

/// Row matching [`flat_exh`].
fn flat_row(text: &str, seed: i32) -> RowData {
    RowData::Flat(vec![
        CellValue::String(SeString::from_bytes(text.as_bytes().to_vec())),
        CellValue::Bool(seed % 2 == 0),
        CellValue::I8(-7),
        CellValue::U8(200),
        CellValue::I16(-3000),
        CellValue::U16(40000),
        CellValue::I32(seed),
        CellValue::U32(3_000_000_000),
        CellValue::F32(1.5),
        CellValue::I64(-5_000_000_000),
        CellValue::Bool(true),
        CellValue::Bool(false),
        CellValue::Bool(true),
    ])
}

/// Test a flat page survives an encode/decode cycle.
#[test]
fn test_encode_decode_exd_flat() {
    let exh = flat_exh();
    let mut extra_data = DecodeableExtraData::default();
    extra_data.set_exh(Some(&exh));
    let extra_data = Some(extra_data);

    let mut encode_extra_data = EncodeableExtraData::default();
    encode_extra_data.set_exh(Some(&exh));
    let encode_extra_data = Some(encode_extra_data);

    let mut before = Exd::new(vec![
        (0, flat_row("First", 1)),
        (3, flat_row("Second", 2)),
    ]);

    let mut encoded = vec![];
    before.encode(&mut encoded, &encode_extra_data).unwrap();
    assert_eq!(&encoded[0..4], b"EXDF");

    let after = Exd::decode(&mut Cursor::new(&encoded), &extra_data).unwrap();
    assert_eq!(before, after);

    // Row lookup: present ids resolve, absent ids (skipped) fail.
    assert_eq!(after.row_ids(), vec![0, 3]);
    assert!(after.row(3).is_ok());
    assert!(matches!(after.row(1), Err(RLibError::RowNotFound(1))));

    // The packed bools share the byte at offset 32: bits 0 and 7 set, bit 1 clear.
    match after.row(0).unwrap() {
        RowData::Flat(cells) => {
            assert_eq!(cells[10], CellValue::Bool(true));
            assert_eq!(cells[11], CellValue::Bool(false));
            assert_eq!(cells[12], CellValue::Bool(true));
        },
        _ => panic!("expected a flat row"),
    }
}

/// Test a sub-rowed page survives an encode/decode cycle.
#[test]
fn test_encode_decode_exd_sub_rows() {
    let exh = Exh::new(
        6,
        vec![
            ExhColumn::new(ColumnType::UInt16, 0),
            ExhColumn::new(ColumnType::String, 2),
        ],
        vec![ExhPage::new(0, 10)],
        vec![Language::Undefined],
        Depth::SubRows,
        1,
    );

    let mut extra_data = DecodeableExtraData::default();
    extra_data.set_exh(Some(&exh));
    let extra_data = Some(extra_data);

    let mut encode_extra_data = EncodeableExtraData::default();
    encode_extra_data.set_exh(Some(&exh));
    let encode_extra_data = Some(encode_extra_data);

    let sub_rows = RowData::SubRows(vec![
        SubRow::new(0, vec![CellValue::U16(10), CellValue::String(SeString::from_bytes(b"one".to_vec()))]),
        SubRow::new(1, vec![CellValue::U16(20), CellValue::String(SeString::from_bytes(b"two".to_vec()))]),
        SubRow::new(2, vec![CellValue::U16(30), CellValue::String(SeString::from_bytes(b"three".to_vec()))]),
    ]);

    let mut before = Exd::new(vec![(7, sub_rows)]);

    let mut encoded = vec![];
    before.encode(&mut encoded, &encode_extra_data).unwrap();

    let after = Exd::decode(&mut Cursor::new(&encoded), &extra_data).unwrap();
    assert_eq!(before, after);

    match after.row(7).unwrap() {
        RowData::SubRows(sub_rows) => {
            assert_eq!(sub_rows.len(), 3);
            assert_eq!(*sub_rows[2].id(), 2);
            match &sub_rows[2].cells()[1] {
                CellValue::String(string) => assert_eq!(string.text().unwrap(), "three"),
                _ => panic!("expected a string cell"),
            }
        },
        _ => panic!("expected a sub-rowed row"),
    }
}

/// Test the decoder rejects pages whose row ids are not strictly increasing.
#[test]
fn test_exd_rows_out_of_order() {
    let exh = flat_exh();
    let mut extra_data = DecodeableExtraData::default();
    extra_data.set_exh(Some(&exh));
    let extra_data = Some(extra_data);

    let mut encode_extra_data = EncodeableExtraData::default();
    encode_extra_data.set_exh(Some(&exh));
    let encode_extra_data = Some(encode_extra_data);

    let mut exd = Exd::new(vec![
        (3, flat_row("First", 1)),
        (0, flat_row("Second", 2)),
    ]);

    let mut encoded = vec![];
    exd.encode(&mut encoded, &encode_extra_data).unwrap();

    let result = Exd::decode(&mut Cursor::new(&encoded), &extra_data);
    assert!(matches!(result, Err(RLibError::DecodingExcelRowsOutOfOrder)));
}

/// Test the decoder requires the Exh in the extra data.
#[test]
fn test_exd_missing_extra_data() {
    let result = Exd::decode(&mut Cursor::new(b"EXDF".to_vec()), &None);
    assert!(matches!(result, Err(RLibError::DecodingMissingExtraData)));
}

/// Test the cell transform bounds-checks the fixed data.
#[test]
fn test_transform_column_out_of_bounds() {
    let column = ExhColumn::new(ColumnType::UInt32, 6);
    let fixed_data = [0u8; 8];

    let result = transform_column(&column, &fixed_data, &[]);
    assert!(matches!(result, Err(RLibError::DecodingColumnOutOfBounds(6))));
}

/// Test the cell transform requires a NUL terminator on string reads.
#[test]
fn test_transform_column_unterminated_string() {
    let column = ExhColumn::new(ColumnType::String, 0);
    let fixed_data = [0u8; 4];
    let variable_data = [b'a', b'b', b'c'];

    let result = transform_column(&column, &fixed_data, &variable_data);
    assert!(matches!(result, Err(RLibError::DecodingStringMissingTerminator(0))));
}

/// Test the cell transform against a hand-built row.
#[test]
fn test_transform_column_values() {
    let fixed_data = [
        0x00, 0x00, 0x00, 0x02,     // string offset 2.
        0x01,                       // bool.
        0xFE,                       // -2.
        0b0000_0101,                // packed bools: bits 0 and 2.
    ];
    let variable_data = [0x41, 0x00, 0x48, 0x69, 0x00];

    let cell = transform_column(&ExhColumn::new(ColumnType::String, 0), &fixed_data, &variable_data).unwrap();
    match cell {
        CellValue::String(string) => assert_eq!(string.text().unwrap(), "Hi"),
        _ => panic!("expected a string cell"),
    }

    assert_eq!(transform_column(&ExhColumn::new(ColumnType::Bool, 4), &fixed_data, &variable_data).unwrap(), CellValue::Bool(true));
    assert_eq!(transform_column(&ExhColumn::new(ColumnType::Int8, 5), &fixed_data, &variable_data).unwrap(), CellValue::I8(-2));
    assert_eq!(transform_column(&ExhColumn::new(ColumnType::PackedBool0, 6), &fixed_data, &variable_data).unwrap(), CellValue::Bool(true));
    assert_eq!(transform_column(&ExhColumn::new(ColumnType::PackedBool1, 6), &fixed_data, &variable_data).unwrap(), CellValue::Bool(false));
    assert_eq!(transform_column(&ExhColumn::new(ColumnType::PackedBool2, 6), &fixed_data, &variable_data).unwrap(), CellValue::Bool(true));
}
