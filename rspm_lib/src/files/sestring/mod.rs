//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! SeStrings are the rich-text format used by the localised strings of the games: plain UTF-8
//! text with typed payloads inlined at `0x02` sentinels.
//!
//! # SeString Structure
//!
//! An SeString is a byte string. Most of it is ordinary UTF-8 text, but whenever a `0x02` byte
//! shows up, a payload follows it:
//!
//! | Bytes | Type         | Data                                           |
//! | ----- | ------------ | ---------------------------------------------- |
//! | 1     | [u8]         | Payload start sentinel. Always 0x02.           |
//! | 1     | [u8]         | Payload type.                                  |
//! | 1-5   | SeExpression | Length of the body, as an integer expression.  |
//! | *     | &\[[u8]\]    | Payload body.                                  |
//! | 1     | [u8]         | Payload end byte. Always 0x03.                 |
//!
//! Parsed, the string becomes a text (with the `0x02` sentinels kept in place, so the payload
//! positions are preserved) and a payload list. The amount of `0x02` bytes in the text always
//! matches the amount of payloads.
//!
//! Both forms are kept in a two-field lazy holder: a string built from bytes only parses when
//! the text or the payloads are first asked for, and a string built from parts only encodes
//! when the bytes are first asked for. Each direction runs at most once, and a string read
//! from game data always re-encodes to its exact source bytes.

use std::sync::OnceLock;
use std::fmt;

use crate::error::{RLibError, Result};
use crate::files::sestring::expression::SeExpression;
use crate::files::sestring::payload::SePayload;

pub mod expression;
pub mod payload;

#[cfg(test)] mod sestring_test;

/// Byte marking the start of a payload within the text.
pub const START_BYTE: u8 = 0x02;

/// Byte marking the end of a payload.
pub const END_BYTE: u8 = 0x03;

//---------------------------------------------------------------------------//
//                              Enum & Structs
//---------------------------------------------------------------------------//

/// This struct represents a single SeString, in raw and/or parsed form.
#[derive(Clone, Debug, Default)]
pub struct SeString {

    /// The raw bytes of the string, as stored in the game files.
    raw: OnceLock<Vec<u8>>,

    /// The parsed form of the string: its text and its payloads.
    parsed: OnceLock<ParsedString>,
}

/// The parsed form of an SeString.
#[derive(Clone, Debug, PartialEq)]
struct ParsedString {

    /// The text of the string, with one `0x02` character in place of each payload.
    text: String,

    /// The payloads of the string, in the order their sentinels appear in the text.
    payloads: Vec<SePayload>,
}

//---------------------------------------------------------------------------//
//                              Implementations
//---------------------------------------------------------------------------//

impl SeString {

    /// This function builds an SeString from its raw bytes. Parsing is deferred until the text
    /// or the payloads are requested.
    pub fn from_bytes(raw: Vec<u8>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(raw);

        Self {
            raw: cell,
            parsed: OnceLock::new(),
        }
    }

    /// This function builds an SeString from its parsed parts. Encoding is deferred until the
    /// bytes are requested.
    ///
    /// It fails if the amount of `0x02` characters in the text doesn't match the amount of
    /// payloads provided.
    pub fn new(text: String, payloads: Vec<SePayload>) -> Result<Self> {
        let sentinels = memchr::memchr_iter(START_BYTE, text.as_bytes()).count();
        if sentinels != payloads.len() {
            return Err(RLibError::SeStringPayloadCountMismatch(sentinels, payloads.len()));
        }

        let cell = OnceLock::new();
        let _ = cell.set(ParsedString { text, payloads });

        Ok(Self {
            raw: OnceLock::new(),
            parsed: cell,
        })
    }

    /// This function returns the text of the string, with one `0x02` character per payload.
    pub fn text(&self) -> Result<&str> {
        self.parsed().map(|parsed| &*parsed.text)
    }

    /// This function returns the payloads of the string.
    pub fn payloads(&self) -> Result<&[SePayload]> {
        self.parsed().map(|parsed| &*parsed.payloads)
    }

    /// This function returns the raw bytes of the string, encoding them from the parsed form
    /// if the string wasn't built from bytes.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        if let Some(raw) = self.raw.get() {
            return Ok(raw);
        }

        let raw = self.encode()?;
        Ok(self.raw.get_or_init(|| raw))
    }

    /// Same as [`Self::as_bytes`], but returning an owned copy.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.as_bytes().map(|raw| raw.to_vec())
    }

    /// This function returns if the string contains no text and no payloads.
    pub fn is_empty(&self) -> bool {
        if let Some(raw) = self.raw.get() {
            return raw.is_empty();
        }

        match self.parsed.get() {
            Some(parsed) => parsed.text.is_empty(),
            None => true,
        }
    }

    /// This function returns the parsed form of the string, parsing the raw bytes the first
    /// time it's called.
    fn parsed(&self) -> Result<&ParsedString> {
        if let Some(parsed) = self.parsed.get() {
            return Ok(parsed);
        }

        let parsed = match self.raw.get() {
            Some(raw) => Self::parse(raw)?,
            None => ParsedString { text: String::new(), payloads: vec![] },
        };

        Ok(self.parsed.get_or_init(|| parsed))
    }

    /// This function parses a raw SeString into its text and its payload list.
    fn parse(raw: &[u8]) -> Result<ParsedString> {
        let mut text = Vec::with_capacity(raw.len());
        let mut payloads = vec![];

        let mut index = 0;
        while index < raw.len() {
            let byte = raw[index];
            text.push(byte);
            index += 1;

            if byte != START_BYTE {
                continue;
            }

            let start = index - 1;
            let payload_type = *raw.get(index).ok_or(RLibError::DecodingIncompletePayload(start))?;
            index += 1;

            let (length, length_size) = SeExpression::decode_uint32(&raw[index..])
                .map_err(|_| RLibError::DecodingIncompletePayload(start))?;
            let length = length as usize;
            index += length_size;

            let body = raw.get(index..index + length).ok_or(RLibError::DecodingIncompletePayload(start))?;
            index += length;

            if raw.get(index) != Some(&END_BYTE) {
                return Err(RLibError::DecodingPayloadMissingEndByte(start));
            }
            index += 1;

            payloads.push(SePayload::from_raw(payload_type, body.to_vec()));
        }

        let text = String::from_utf8(text)?;
        Ok(ParsedString { text, payloads })
    }

    /// This function encodes the parsed form of the string back into raw bytes.
    fn encode(&self) -> Result<Vec<u8>> {
        let parsed = self.parsed()?;
        let mut raw = Vec::with_capacity(parsed.text.len());
        let mut payloads = parsed.payloads.iter();

        for &byte in parsed.text.as_bytes() {
            raw.push(byte);

            if byte != START_BYTE {
                continue;
            }

            // The constructors guarantee one payload per sentinel.
            let payload = payloads.next().ok_or(RLibError::SeStringPayloadCountMismatch(0, 0))?;
            raw.push(payload.kind().type_byte());
            SeExpression::encode_uint32(payload.data().len() as u32, &mut raw)?;
            raw.extend_from_slice(payload.data());
            raw.push(END_BYTE);
        }

        Ok(raw)
    }
}

/// Equality compares the encoded form, so a string built from bytes and one built from the
/// equivalent parts compare equal.
impl PartialEq for SeString {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_bytes(), other.as_bytes()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}

/// Human-readable rendering: the text, with each payload shown as an xml-like tag with its
/// body in hex.
impl fmt::Display for SeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parsed = match self.parsed() {
            Ok(parsed) => parsed,
            Err(_) => return write!(f, "(invalid)"),
        };

        let mut payloads = parsed.payloads.iter();
        for character in parsed.text.chars() {
            if character != START_BYTE as char {
                write!(f, "{character}")?;
                continue;
            }

            match payloads.next() {
                Some(payload) if payload.data().is_empty() => write!(f, "<{} />", payload.kind())?,
                Some(payload) => {
                    write!(f, "<{}>", payload.kind())?;
                    for byte in payload.data() {
                        write!(f, "{byte:02x}")?;
                    }
                    write!(f, "</{}>", payload.kind())?;
                },
                None => {},
            }
        }

        Ok(())
    }
}
