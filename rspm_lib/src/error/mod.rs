//---------------------------------------------------------------------------//
// Copyright (c) 2017-2024 Ismael Gutiérrez González. All rights reserved.
//
// This file is part of the Rusted SqPack Manager (RSPM) project,
// which can be found here: https://github.com/Frodo45127/rspm.
//
// This file is licensed under the MIT license, which can be found here:
// https://github.com/Frodo45127/rspm/blob/master/LICENSE.
//---------------------------------------------------------------------------//

//! This module contains all kind of errors used inside this crate.
//!
//! Not much to say appart of that, really.

use thiserror::Error;

/// Custom `Result` type, to always return our custom error.
pub type Result<T, E = RLibError> = core::result::Result<T, E>;

/// Custom error type for the lib.
#[derive(Error, Debug)]
pub enum RLibError {
    #[error("This is a compressed block and the decompression failed for some reason. This means this entry cannot be read by RSPM.")]
    DataCannotBeDecompressed,

    #[error("The decompressed block is '{0}' bytes long, but its header declared '{1}' bytes.")]
    DecompressedSizeMismatch(usize, usize),

    #[error("Error trying to encode an {0}: \"{1}\" has a length of {2} chars, but his length should be less or equal than {3}.")]
    EncodingPaddedStringError(String, String, usize, usize),

    #[error("This file's reported size is '{0}' bytes, but we expected it to be '{1}' bytes. This means the file is corrupted, or the decoding logic in RSPM is broken for this file.")]
    DecodingMismatchSizeError(usize, usize),

    #[error("Missing extra data required to decode the file. This means the programmer messed up the code that tries to decode files.")]
    DecodingMissingExtraData,

    #[error("Missing extra data field required to decode the file: {0}. This means the programmer messed up the code that tries to decode files.")]
    DecodingMissingExtraDataField(String),

    #[error("The file \"{0}\" is not a SqPack file: invalid signature.")]
    DecodingSqpackInvalidSignature(String),

    #[error("Unknown SqPack file kind: {0}.")]
    DecodingUnknownSqpackKind(u32),

    #[error("The header of \"{0}\" declares a size of '{1}' bytes, but the expected on-disk size is '{2}' bytes. The file is corrupt or unsupported.")]
    DecodingSqpackHeaderSizeMismatch(String, u32, u32),

    #[error("The \"{0}\" segment is '{1}' bytes long, which is not a multiple of its '{2}'-byte records. The index is corrupt.")]
    DecodingSqpackSegmentSizeMismatch(String, u32, u32),

    #[error("The path-hash locator for ~{0:08x} points outside the hash-locator segment. The index is corrupt.")]
    DecodingSqpackLocatorOutOfBounds(u32),

    #[error("Data file index must be in the range [0, 8): found {0}.")]
    DataFileIndexOutOfRange(u32),

    #[error("Entry offsets must be 128-byte aligned and below 1 << 35: found {0}.")]
    DataOffsetNotAligned(u64),

    #[error("The path \"{0}\" was not found in this SqPack.")]
    PathNotFound(String),

    #[error("The path \"{0}\" was found in this SqPack, but is ambiguous. A full path is required to disambiguate it.")]
    PathAmbiguous(String),

    #[error("The provided path is empty.")]
    PathEmpty,

    #[error("Unknown SqPack entry type: {0}.")]
    DecodingUnknownEntryType(u32),

    #[error("The block header at offset '{0}' lies outside the entry data. The entry is corrupt.")]
    DecodingBlockHeaderOutOfBounds(usize),

    #[error("The block at offset '{0}' declares more data than the entry contains. The entry is corrupt.")]
    DecodingBlockShortData(usize),

    #[error("This is either not an Exh file, or it's an Exh file but it's corrupted.")]
    DecodingExcelNotAnExh,

    #[error("This is either not an Exd file, or it's an Exd file but it's corrupted.")]
    DecodingExcelNotAnExd,

    #[error("This is either not an Exl file, or it's an Exl file but it's corrupted.")]
    DecodingExcelNotAnExl,

    #[error("The page start ids of this Exh are not strictly increasing. The file is corrupt.")]
    DecodingExcelPagesOutOfOrder,

    #[error("The row ids of this Exd are not strictly increasing. The file is corrupt.")]
    DecodingExcelRowsOutOfOrder,

    #[error("Unknown Excel column type: {0}.")]
    DecodingUnknownColumnType(u16),

    #[error("Unknown Excel sheet depth: {0}.")]
    DecodingUnknownExcelDepth(u8),

    #[error("Unknown Excel language code: {0}.")]
    DecodingUnknownLanguage(u16),

    #[error("None of the requested languages are provided by the sheet \"{0}\".")]
    LanguageNotSupported(String),

    #[error("The row '{0}' was not found in this sheet.")]
    RowNotFound(u32),

    #[error("The row '{0}' has sub-rows. Access its cells through the sub-row list.")]
    RowHasSubRows(u32),

    #[error("Error trying to decode the column at offset '{0}': the read lies outside the fixed data of the row.")]
    DecodingColumnOutOfBounds(u16),

    #[error("Error trying to decode a string column: no terminator found after offset '{0}' of the variable data.")]
    DecodingStringMissingTerminator(usize),

    #[error("Error trying to encode the cell at position '{0}': its value doesn't match the type of its column.")]
    EncodingCellTypeMismatch(usize),

    #[error("Invalid SeExpression marker: {0:#04x}.")]
    DecodingInvalidExpressionMarker(u8),

    #[error("Expected a plain integer expression, found an operator or a nested string.")]
    DecodingStringExpressionLength,

    #[error("The SeString payload at offset '{0}' is incomplete.")]
    DecodingIncompletePayload(usize),

    #[error("The SeString payload at offset '{0}' is not followed by the end byte.")]
    DecodingPayloadMissingEndByte(usize),

    #[error("The payload \"{0}\" expects between '{1}' and '{2}' expressions, but '{3}' were provided.")]
    PayloadExpressionCountMismatch(String, usize, String, usize),

    #[error("This payload is a \"{0}\" payload, not a \"{1}\" one.")]
    PayloadTypeMismatch(String, String),

    #[error("The text of an SeString must contain exactly one '\\x02' byte per payload: '{0}' found, '{1}' payloads provided.")]
    SeStringPayloadCountMismatch(usize, usize),

    #[error("The column \"{0}\" does not exist in the definition of the sheet \"{1}\".")]
    UnknownColumnName(String, String),

    /// Represents all other cases of `std::string::FromUtf8Error`.
    #[error(transparent)]
    DecodeUTF8Error(#[from] std::string::FromUtf8Error),

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Represents all other cases of `serde_json::Error`.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}
