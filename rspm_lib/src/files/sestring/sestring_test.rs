//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! Module containing tests for the SeString/SePayload/SeExpression codec.

use float_eq::assert_float_eq;

use std::io::Cursor;

use crate::error::RLibError;

use super::*;
use super::expression::{BinaryOperator, SeExpression, UnaryOperator};
use super::payload::{PlaceholderView, SePayload, SePayloadKind};

//---------------------------------------------------------------------------//
//                            Expression tests
//---------------------------------------------------------------------------//

/// Decode helper over a byte slice.
fn decode_expression(data: &[u8]) -> SeExpression {
    SeExpression::decode(&mut Cursor::new(data)).unwrap()
}

/// Encode helper into a byte vector.
fn encode_expression(expression: &SeExpression) -> Vec<u8> {
    let mut data = vec![];
    expression.encode(&mut data).unwrap();
    data
}

/// Test the single-byte integer forms.
#[test]
fn test_expression_single_byte_integers() {
    assert_eq!(decode_expression(&[0x01]), SeExpression::UInt32(0));
    assert_eq!(decode_expression(&[0xCF]), SeExpression::UInt32(0xCE));

    assert_eq!(encode_expression(&SeExpression::UInt32(0)), vec![0x01]);
    assert_eq!(encode_expression(&SeExpression::UInt32(0xCE)), vec![0xCF]);

    // 0xCF itself no longer fits the single-byte form.
    assert_eq!(encode_expression(&SeExpression::UInt32(0xCF)), vec![0xF0, 0xCF]);
}

/// Test the bitmasked integer forms.
#[test]
fn test_expression_packed_integers() {

    // Mask 0b1001: bytes at positions 3 and 0.
    assert_eq!(decode_expression(&[0xF8, 0x12, 0x34]), SeExpression::UInt32(0x1200_0034));
    assert_eq!(encode_expression(&SeExpression::UInt32(0x1200_0034)), vec![0xF8, 0x12, 0x34]);

    // Mask 0b1110: bytes at positions 3, 2 and 1.
    assert_eq!(decode_expression(&[0xFD, 0x12, 0x00, 0x34]), SeExpression::UInt32(0x1200_3400));

    // Mask 0b1111: all four bytes.
    assert_eq!(decode_expression(&[0xFE, 0xFF, 0xF6, 0x10, 0xBB]), SeExpression::UInt32(0xFFF6_10BB));
    assert_eq!(encode_expression(&SeExpression::UInt32(0xFFF6_10BB)), vec![0xFE, 0xFF, 0xF6, 0x10, 0xBB]);

    // Mask 0b0111: bytes at positions 2, 1 and 0.
    assert_eq!(decode_expression(&[0xF6, 0x02, 0x24, 0x4D]), SeExpression::UInt32(0x0002_244D));
}

/// Test that every integer survives an encode/decode cycle, and the encoding is the shortest
/// of its legal forms.
#[test]
fn test_expression_integer_round_trip() {
    let values = [
        0u32, 1, 0xCE, 0xCF, 0xFF, 0x100, 0xFF00, 0xFFFF, 0x0102_0304,
        0x1200_0034, 0x00FF_0000, 0xFFFF_FFFF, u32::MAX - 1,
    ];

    for value in values {
        let encoded = encode_expression(&SeExpression::UInt32(value));
        assert_eq!(decode_expression(&encoded), SeExpression::UInt32(value), "value {value:#x}");

        // Shortest form: one byte for small values, 1 + amount of non-zero bytes otherwise.
        let expected_len = if value <= 0xCE { 1 } else { 1 + value.to_be_bytes().iter().filter(|byte| **byte != 0).count() };
        assert_eq!(encoded.len(), expected_len, "value {value:#x}");
    }
}

/// Test the global parameter markers are preserved verbatim.
#[test]
fn test_expression_global_parameters() {
    for marker in (0xD0..=0xDF).chain([0xEC]) {
        let expression = decode_expression(&[marker]);
        assert_eq!(expression, SeExpression::GlobalParameter(marker));
        assert_eq!(encode_expression(&expression), vec![marker]);
    }
}

/// Test the unary and binary operator trees.
#[test]
fn test_expression_operators() {

    // E9 (PlayerParameter) applied to the integer 10.
    let expression = decode_expression(&[0xE9, 0x0B]);
    assert_eq!(expression, SeExpression::Unary(UnaryOperator::PlayerParameter, Box::new(SeExpression::UInt32(10))));
    assert_eq!(encode_expression(&expression), vec![0xE9, 0x0B]);

    // E4 (Equal) comparing a parameter lookup against the integer 2.
    let expression = decode_expression(&[0xE4, 0xE8, 0x02, 0x03]);
    assert_eq!(expression, SeExpression::Binary(
        BinaryOperator::Equal,
        Box::new(SeExpression::Unary(UnaryOperator::IntegerParameter, Box::new(SeExpression::UInt32(1)))),
        Box::new(SeExpression::UInt32(2)),
    ));
    assert_eq!(encode_expression(&expression), vec![0xE4, 0xE8, 0x02, 0x03]);
}

/// Test the nested string expression form.
#[test]
fn test_expression_nested_string() {
    let expression = decode_expression(&[0xFF, 0x03, 0x48, 0x69]);
    match &expression {
        SeExpression::String(string) => assert_eq!(string.text().unwrap(), "Hi"),
        _ => panic!("expected a string expression"),
    }

    assert_eq!(encode_expression(&expression), vec![0xFF, 0x03, 0x48, 0x69]);
}

/// Test the invalid markers are rejected.
#[test]
fn test_expression_invalid_marker() {
    for marker in [0x00u8, 0xE6, 0xE7, 0xED, 0xEF] {
        let result = SeExpression::decode(&mut Cursor::new([marker]));
        assert!(matches!(result, Err(RLibError::DecodingInvalidExpressionMarker(found)) if found == marker));
    }
}

//---------------------------------------------------------------------------//
//                              Payload tests
//---------------------------------------------------------------------------//

/// Test the expression count bounds are enforced on explicit construction.
#[test]
fn test_payload_count_constraint() {

    // NewLine takes no expressions.
    assert!(SePayload::new(SePayloadKind::NewLine, vec![]).is_ok());
    assert!(matches!(
        SePayload::new(SePayloadKind::NewLine, vec![SeExpression::UInt32(1)]),
        Err(RLibError::PayloadExpressionCountMismatch(..))
    ));

    // ColorFill takes exactly one.
    assert!(SePayload::new(SePayloadKind::ColorFill, vec![SeExpression::UInt32(1)]).is_ok());
    assert!(SePayload::new(SePayloadKind::ColorFill, vec![]).is_err());

    // DialoguePageBreak is declared with 0 expressions in one revision of the game data and
    // with 1 in another, so both have to pass.
    assert!(SePayload::new(SePayloadKind::DialoguePageBreak, vec![]).is_ok());
    assert!(SePayload::new(SePayloadKind::DialoguePageBreak, vec![SeExpression::UInt32(1)]).is_ok());
    assert!(SePayload::new(SePayloadKind::DialoguePageBreak, vec![SeExpression::UInt32(1), SeExpression::UInt32(2)]).is_err());

    // If takes at least a condition, with no upper bound.
    assert!(SePayload::new(SePayloadKind::If, vec![]).is_err());
    let expressions = (0..12).map(SeExpression::UInt32).collect::<Vec<_>>();
    assert!(SePayload::new(SePayloadKind::If, expressions).is_ok());
}

/// Test the actual expression count of a payload is surfaced to the caller.
#[test]
fn test_payload_expressions_surfaced() {
    let payload = SePayload::new(SePayloadKind::DialoguePageBreak, vec![SeExpression::UInt32(4)]).unwrap();
    assert_eq!(payload.expressions().unwrap().len(), 1);

    let payload = SePayload::new(SePayloadKind::DialoguePageBreak, vec![]).unwrap();
    assert_eq!(payload.expressions().unwrap().len(), 0);
}

/// Test the positional views of the conditional payloads.
#[test]
fn test_payload_views() {
    let payload = SePayload::new(SePayloadKind::If, vec![
        SeExpression::UInt32(1),
        SeExpression::UInt32(2),
        SeExpression::UInt32(3),
        SeExpression::UInt32(4),
    ]).unwrap();

    let view = payload.as_if().unwrap();
    assert_eq!(view.condition.as_uint32(), Some(1));
    assert_eq!(view.true_value.and_then(|expression| expression.as_uint32()), Some(2));
    assert_eq!(view.false_value.and_then(|expression| expression.as_uint32()), Some(3));
    assert_eq!(view.misc.len(), 1);

    // Asking for the wrong view fails loudly.
    assert!(matches!(payload.as_switch(), Err(RLibError::PayloadTypeMismatch(..))));

    let payload = SePayload::new(SePayloadKind::Switch, vec![
        SeExpression::UInt32(7),
        SeExpression::UInt32(10),
        SeExpression::UInt32(20),
    ]).unwrap();
    let view = payload.as_switch().unwrap();
    assert_eq!(view.condition.as_uint32(), Some(7));
    assert_eq!(view.cases.len(), 2);

    let payload = SePayload::new(SePayloadKind::SheetReference, vec![
        SeExpression::String(SeString::from_bytes(b"Item".to_vec())),
        SeExpression::UInt32(2000),
        SeExpression::UInt32(1),
    ]).unwrap();
    let view = payload.as_sheet_reference().unwrap();
    assert_eq!(view.row.as_uint32(), Some(2000));
    assert_eq!(view.column.and_then(|expression| expression.as_uint32()), Some(1));
    assert!(view.parameters.is_empty());
}

/// Test the Completion form of the Placeholder payload.
#[test]
fn test_payload_placeholder_completion() {
    let payload = SePayload::new(SePayloadKind::Placeholder, vec![
        SeExpression::UInt32(51),
        SeExpression::UInt32(2864),
    ]).unwrap();

    match payload.as_placeholder().unwrap() {
        PlaceholderView::Completion { group_id, row_id } => {
            assert_eq!(group_id.as_uint32(), Some(51));
            assert_eq!(row_id.as_uint32(), Some(2864));
        },
        _ => panic!("expected a completion placeholder"),
    }
}

/// Test the Position form of the Placeholder payload, with the display projection.
///
/// The sample is a map link to Zadnor recorded from the game, which the game renders as
/// coordinates (8.4, 24.2).
#[test]
fn test_payload_placeholder_position() {
    let body = vec![
        0xC9,                               // 200: complex placeholder marker.
        0x04,                               // 3: map position link.
        0xF2, 0x03, 0xCF,                   // territory 975.
        0xF2, 0x02, 0x99,                   // map 665.
        0xFE, 0xFF, 0xF6, 0x10, 0xBB,       // x: -658245.
        0xF6, 0x02, 0x24, 0x4D,             // y: 140365.
        0x01,                               // z: 0.
    ];
    let payload = SePayload::from_raw(0x2E, body);
    assert_eq!(payload.kind(), SePayloadKind::Placeholder);

    match payload.as_placeholder().unwrap() {
        PlaceholderView::Position(position) => {
            assert_eq!(position.territory, 975);
            assert_eq!(position.map, 665);
            assert_eq!(position.raw_x, -658_245);
            assert_eq!(position.raw_y, 140_365);
            assert_eq!(position.raw_z, 0);

            assert_float_eq!(position.display_x(100), 8.30, abs <= 0.1);
            assert_float_eq!(position.display_y(100), 24.24, abs <= 0.1);
        },
        _ => panic!("expected a position placeholder"),
    }
}

/// Test the SoundEffect form of the Placeholder payload.
#[test]
fn test_payload_placeholder_sound_effect() {
    let payload = SePayload::from_raw(0x2E, vec![0xC9, 0x06, 0x07]);
    match payload.as_placeholder().unwrap() {
        PlaceholderView::SoundEffect { se_id } => assert_eq!(se_id, 6),
        _ => panic!("expected a sound effect placeholder"),
    }
}

//---------------------------------------------------------------------------//
//                              SeString tests
//---------------------------------------------------------------------------//

/// Test a plain text string parses with no payloads.
#[test]
fn test_string_plain_text() {
    let string = SeString::from_bytes(b"Wahahahaha".to_vec());
    assert_eq!(string.text().unwrap(), "Wahahahaha");
    assert!(string.payloads().unwrap().is_empty());
    assert_eq!(string.as_bytes().unwrap(), b"Wahahahaha");
}

/// Test a string with a payload parses into text + payloads and re-encodes to its source.
#[test]
fn test_string_with_payload() {
    let raw = vec![0x48, 0x69, 0x02, 0x10, 0x01, 0x03, 0x21];
    let string = SeString::from_bytes(raw.to_vec());

    assert_eq!(string.text().unwrap(), "Hi\u{2}!");

    let payloads = string.payloads().unwrap();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].kind(), SePayloadKind::NewLine);
    assert!(payloads[0].expressions().unwrap().is_empty());

    assert_eq!(string.as_bytes().unwrap(), raw.as_slice());
}

/// Test the payload count always matches the sentinel count in the text.
#[test]
fn test_string_sentinel_invariant() {
    let raw = vec![
        0x41, 0x02, 0x10, 0x01, 0x03,
        0x42, 0x02, 0x13, 0x02, 0xFA, 0x03,
        0x43,
    ];
    let string = SeString::from_bytes(raw.to_vec());

    let sentinels = string.text().unwrap().matches('\u{2}').count();
    assert_eq!(sentinels, string.payloads().unwrap().len());
    assert_eq!(string.as_bytes().unwrap(), raw.as_slice());
}

/// Test an unknown payload type is preserved, not rejected.
#[test]
fn test_string_unknown_payload_preserved() {
    let raw = vec![0x02, 0x77, 0x03, 0xAA, 0xBB, 0x03];
    let string = SeString::from_bytes(raw.to_vec());

    let payloads = string.payloads().unwrap();
    assert_eq!(payloads[0].kind(), SePayloadKind::Unknown(0x77));
    assert_eq!(payloads[0].data(), &[0xAA, 0xBB]);

    assert_eq!(string.as_bytes().unwrap(), raw.as_slice());
}

/// Test a string built from parts encodes the payload framings.
#[test]
fn test_string_from_parts() {
    let payload = SePayload::new(SePayloadKind::NewLine, vec![]).unwrap();
    let string = SeString::new("Hi\u{2}!".to_owned(), vec![payload]).unwrap();
    assert_eq!(string.as_bytes().unwrap(), &[0x48, 0x69, 0x02, 0x10, 0x01, 0x03, 0x21]);

    // Mismatched sentinel/payload counts are rejected.
    assert!(matches!(
        SeString::new("Hi!".to_owned(), vec![SePayload::new(SePayloadKind::NewLine, vec![]).unwrap()]),
        Err(RLibError::SeStringPayloadCountMismatch(0, 1))
    ));
}

/// Test the framing errors: missing end byte and truncated payloads.
#[test]
fn test_string_bad_framing() {

    // Truncated after the type byte.
    let string = SeString::from_bytes(vec![0x02, 0x10]);
    assert!(matches!(string.text(), Err(RLibError::DecodingIncompletePayload(0))));

    // Body longer than the remaining data.
    let string = SeString::from_bytes(vec![0x02, 0x10, 0x05, 0x01, 0x03]);
    assert!(matches!(string.text(), Err(RLibError::DecodingIncompletePayload(0))));

    // Missing end byte.
    let string = SeString::from_bytes(vec![0x02, 0x10, 0x01, 0x04]);
    assert!(matches!(string.text(), Err(RLibError::DecodingPayloadMissingEndByte(0))));
}

/// Test the xml-like rendering of the Display implementation.
#[test]
fn test_string_display() {
    let raw = vec![0x48, 0x69, 0x02, 0x10, 0x01, 0x03, 0x21, 0x02, 0x13, 0x02, 0xFA, 0x03];
    let string = SeString::from_bytes(raw);
    assert_eq!(format!("{string}"), "Hi<NewLine />!<ColorFill>fa</ColorFill>");
}
