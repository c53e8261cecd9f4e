//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! SeExpressions are the value language used inside the payloads of a [`SeString`]: integers,
//! nested strings, global parameters, and unary/binary operations over them.
//!
//! # SeExpression Structure
//!
//! Each expression starts with a marker byte, which decides how the rest of it is read:
//!
//! | Marker      | Data                                                                           |
//! | ----------- | ------------------------------------------------------------------------------ |
//! | 0x01-0xCF   | The integer `marker - 1`. No more bytes are read.                              |
//! | 0xD0-0xDF   | A named global parameter (time of day, calendar values,...). No more bytes.    |
//! | 0xE0-0xE5   | A comparison between the two expressions that follow: >=, >, <=, <, ==, !=.    |
//! | 0xE8-0xEB   | A parameter lookup (Integer/Player/String/Object) of the expression that follows. |
//! | 0xEC        | Another global parameter. No more bytes.                                       |
//! | 0xF0-0xFE   | A packed u32: `(marker + 1) & 0xF` is a bitmask of which of the 4 BigEndian    |
//! |             | byte positions follow, highest first. Absent positions are zero.               |
//! | 0xFF        | A nested [`SeString`]: an integer expression with its length, then its bytes.  |
//!
//! The meaning of the individual global parameters varies between revisions of the game
//! data, so the marker is preserved verbatim and never interpreted.

use std::io::Cursor;

use crate::binary::{ReadBytes, WriteBytes};
use crate::error::{RLibError, Result};
use crate::files::sestring::SeString;

/// Markers under this one (exclusive) decode to `marker - 1` in a single byte.
const MAX_SINGLE_BYTE_MARKER: u8 = 0xD0;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This enum represents a single node of an SeExpression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum SeExpression {

    /// A plain unsigned integer, compactly encoded in 1-5 bytes.
    UInt32(u32),

    /// A global parameter. The marker byte is preserved verbatim, as its meaning is not stable
    /// across revisions of the game data.
    GlobalParameter(u8),

    /// A parameter lookup applied to a child expression.
    Unary(UnaryOperator, Box<SeExpression>),

    /// A comparison between two child expressions.
    Binary(BinaryOperator, Box<SeExpression>, Box<SeExpression>),

    /// A nested, length-prefixed string.
    String(SeString),
}

/// Parameter lookups available as unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    IntegerParameter,
    PlayerParameter,
    StringParameter,
    ObjectParameter,
}

/// Comparison operators available as binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    GreaterThanOrEqualTo,
    GreaterThan,
    LessThanOrEqualTo,
    LessThan,
    Equal,
    NotEqual,
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

impl SeExpression {

    /// This function reads a whole expression tree from the provided source.
    pub fn decode<R: ReadBytes>(data: &mut R) -> Result<Self> {
        let marker = data.read_u8()?;
        match marker {
            0x01..=0xCF => Ok(Self::UInt32(marker as u32 - 1)),
            0xD0..=0xDF | 0xEC => Ok(Self::GlobalParameter(marker)),
            0xE0..=0xE5 => {
                let operator = BinaryOperator::from_marker(marker);
                let left = Self::decode(data)?;
                let right = Self::decode(data)?;
                Ok(Self::Binary(operator, Box::new(left), Box::new(right)))
            },
            0xE8..=0xEB => {
                let operator = UnaryOperator::from_marker(marker);
                let child = Self::decode(data)?;
                Ok(Self::Unary(operator, Box::new(child)))
            },
            0xF0..=0xFE => {
                let mask = (marker.wrapping_add(1)) & 0xF;
                let mut value: u32 = 0;
                for i in (0..4u8).rev() {
                    value <<= 8;
                    if mask & (1 << i) != 0 {
                        value |= data.read_u8()? as u32;
                    }
                }
                Ok(Self::UInt32(value))
            },
            0xFF => {
                let length = match Self::decode(data)? {
                    Self::UInt32(length) => length as usize,
                    _ => return Err(RLibError::DecodingStringExpressionLength),
                };
                let bytes = data.read_slice(length, false)?;
                Ok(Self::String(SeString::from_bytes(bytes)))
            },
            _ => Err(RLibError::DecodingInvalidExpressionMarker(marker)),
        }
    }

    /// This function writes a whole expression tree to the provided buffer, always choosing
    /// the most compact integer form.
    pub fn encode<W: WriteBytes>(&self, buffer: &mut W) -> Result<()> {
        match self {
            Self::UInt32(value) => Self::encode_uint32(*value, buffer),
            Self::GlobalParameter(marker) => buffer.write_u8(*marker),
            Self::Binary(operator, left, right) => {
                buffer.write_u8(operator.marker())?;
                left.encode(buffer)?;
                right.encode(buffer)
            },
            Self::Unary(operator, child) => {
                buffer.write_u8(operator.marker())?;
                child.encode(buffer)
            },
            Self::String(string) => {
                let bytes = string.to_bytes()?;
                buffer.write_u8(0xFF)?;
                Self::encode_uint32(bytes.len() as u32, buffer)?;
                buffer.write_all(&bytes).map_err(From::from)
            },
        }
    }

    /// This function decodes a single compactly-encoded integer from the provided slice,
    /// returning it together with the amount of bytes it used.
    pub fn decode_uint32(data: &[u8]) -> Result<(u32, usize)> {
        let mut cursor = Cursor::new(data);
        match Self::decode(&mut cursor)? {
            Self::UInt32(value) => Ok((value, cursor.position() as usize)),
            _ => Err(RLibError::DecodingStringExpressionLength),
        }
    }

    /// This function writes an integer in its most compact encoded form: a single byte for
    /// values up to 0xCE, and a bitmasked form with only the non-zero bytes for the rest.
    pub fn encode_uint32<W: WriteBytes>(value: u32, buffer: &mut W) -> Result<()> {
        if value < MAX_SINGLE_BYTE_MARKER as u32 - 1 {
            return buffer.write_u8(value as u8 + 1);
        }

        let mut mask: u8 = 0;
        let mut bytes = Vec::with_capacity(4);
        for i in (0..4u8).rev() {
            let byte = (value >> (i * 8)) as u8;
            if byte != 0 {
                mask |= 1 << i;
                bytes.push(byte);
            }
        }

        buffer.write_u8(0xF0 + mask - 1)?;
        buffer.write_all(&bytes).map_err(From::from)
    }

    /// This function returns the value of this expression if it's a plain integer.
    pub fn as_uint32(&self) -> Option<u32> {
        match self {
            Self::UInt32(value) => Some(*value),
            _ => None,
        }
    }
}

impl UnaryOperator {

    /// This function returns the operator matching the provided marker byte.
    ///
    /// Only valid for markers in the 0xE8-0xEB range.
    fn from_marker(marker: u8) -> Self {
        match marker {
            0xE8 => Self::IntegerParameter,
            0xE9 => Self::PlayerParameter,
            0xEA => Self::StringParameter,
            _ => Self::ObjectParameter,
        }
    }

    /// This function returns the marker byte of this operator.
    pub fn marker(self) -> u8 {
        match self {
            Self::IntegerParameter => 0xE8,
            Self::PlayerParameter => 0xE9,
            Self::StringParameter => 0xEA,
            Self::ObjectParameter => 0xEB,
        }
    }
}

impl BinaryOperator {

    /// This function returns the operator matching the provided marker byte.
    ///
    /// Only valid for markers in the 0xE0-0xE5 range.
    fn from_marker(marker: u8) -> Self {
        match marker {
            0xE0 => Self::GreaterThanOrEqualTo,
            0xE1 => Self::GreaterThan,
            0xE2 => Self::LessThanOrEqualTo,
            0xE3 => Self::LessThan,
            0xE4 => Self::Equal,
            _ => Self::NotEqual,
        }
    }

    /// This function returns the marker byte of this operator.
    pub fn marker(self) -> u8 {
        match self {
            Self::GreaterThanOrEqualTo => 0xE0,
            Self::GreaterThan => 0xE1,
            Self::LessThanOrEqualTo => 0xE2,
            Self::LessThan => 0xE3,
            Self::Equal => 0xE4,
            Self::NotEqual => 0xE5,
        }
    }
}
