//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Module containing tests for decoding/encoding `Exh` files.

use std::io::Cursor;

use crate::error::RLibError;
use crate::files::*;

use super::*;

//---------------------------------------------------------------------------//
//                                  Tests
//---------------------------------------------------------------------------//

/// Sample header covering every part of the format.
fn test_exh() -> Exh {
    Exh::new(
        12,
        vec![
            ExhColumn::new(ColumnType::String, 0),
            ExhColumn::new(ColumnType::UInt32, 4),
            ExhColumn::new(ColumnType::Bool, 8),
            ExhColumn::new(ColumnType::PackedBool0, 9),
            ExhColumn::new(ColumnType::PackedBool3, 9),
            ExhColumn::new(ColumnType::Int16, 10),
        ],
        vec![
            ExhPage::new(0, 100),
            ExhPage::new(100, 50),
        ],
        vec![Language::Japanese, Language::English],
        Depth::Flat,
        130,
    )
}

/// Test an Exh survives an encode/decode cycle.
#[test]
fn test_encode_decode_exh() {
    let mut before = test_exh();

    let mut encoded = vec![];
    before.encode(&mut encoded, &None).unwrap();

    let after = Exh::decode(&mut Cursor::new(&encoded), &None).unwrap();
    assert_eq!(before, after);

    // Re-encoding the decoded header has to produce the exact same bytes.
    let mut encoded_again = vec![];
    after.clone().encode(&mut encoded_again, &None).unwrap();
    assert_eq!(encoded, encoded_again);
}

/// Test the header layout: columns start right after the 32-byte header.
#[test]
fn test_exh_layout() {
    let mut exh = test_exh();
    let mut encoded = vec![];
    exh.encode(&mut encoded, &None).unwrap();

    assert_eq!(&encoded[0..4], b"EXHF");
    assert_eq!(encoded.len(), 32 + 6 * 4 + 2 * 8 + 2 * 2);

    // First column: type String (0), offset 0.
    assert_eq!(&encoded[32..36], &[0, 0, 0, 0]);

    // Language codes are LittleEndian.
    let languages_offset = encoded.len() - 4;
    assert_eq!(&encoded[languages_offset..], &[1, 0, 2, 0]);
}

/// Test a wrong signature is rejected.
#[test]
fn test_exh_bad_signature() {
    let result = Exh::decode(&mut Cursor::new(b"EXDFaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_vec()), &None);
    assert!(matches!(result, Err(RLibError::DecodingExcelNotAnExh)));
}

/// Test out-of-order pages are rejected.
#[test]
fn test_exh_pages_out_of_order() {
    let mut exh = test_exh();
    exh.pages = vec![ExhPage::new(100, 50), ExhPage::new(0, 100)];

    let mut encoded = vec![];
    exh.encode(&mut encoded, &None).unwrap();

    let result = Exh::decode(&mut Cursor::new(&encoded), &None);
    assert!(matches!(result, Err(RLibError::DecodingExcelPagesOutOfOrder)));
}
