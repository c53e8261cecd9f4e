//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Module containing tests for decoding/encoding `Exl` sheet lists.

use std::io::Cursor;

use crate::error::RLibError;
use crate::files::*;

use super::Exl;

//---------------------------------------------------------------------------//
//                                  Tests
//---------------------------------------------------------------------------//

/// Test an Exl survives an encode/decode cycle.
#[test]
fn test_encode_decode_exl() {
    let mut before = Exl::new(2, vec![
        ("Action".to_owned(), 4),
        ("Item".to_owned(), 10),
        ("ActionTransient".to_owned(), -1),
    ]);

    let mut encoded = vec![];
    before.encode(&mut encoded, &None).unwrap();
    assert!(encoded.starts_with(b"EXLT,2\r\n"));

    let after = Exl::decode(&mut Cursor::new(&encoded), &None).unwrap();
    assert_eq!(before, after);
}

/// Test the name/id lookups, including the -1 "no id" convention.
#[test]
fn test_exl_lookups() {
    let exl = Exl::new(2, vec![
        ("Action".to_owned(), 4),
        ("ActionTransient".to_owned(), -1),
    ]);

    assert_eq!(exl.id_by_name("Action"), Some(4));
    assert_eq!(exl.id_by_name("action"), Some(4));
    assert_eq!(exl.id_by_name("Nope"), None);

    assert_eq!(exl.name_by_id(4), Some("Action"));
    assert_eq!(exl.name_by_id(-1), None);
    assert_eq!(exl.name_by_id(99), None);
}

/// Test a file without the signature line is rejected.
#[test]
fn test_exl_bad_signature() {
    let result = Exl::decode(&mut Cursor::new(b"EXHF,2\r\nAction,4\r\n".to_vec()), &None);
    assert!(matches!(result, Err(RLibError::DecodingExcelNotAnExl)));
}
